//! Identifier sources for nodes that arrive without an `id`.
//! Compilers never mint ids themselves; they ask an injected [`IdGenerator`], so tests
//! can swap the random source for a counter and get byte-identical scripts.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces ids of the form `<prefix>_<suffix>`. The suffix is always `[A-Za-z0-9]`.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

pub type SharedIdGenerator = Arc<dyn IdGenerator>;

pub fn shared(generator: impl IdGenerator + 'static) -> SharedIdGenerator {
    Arc::new(generator)
}

/// Random v4 suffix. Not stable across compiles of the same node.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}_{}", Uuid::new_v4().simple())
    }
}

/// Monotonic counter shared by every prefix.
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequentialIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SequentialIdGenerator(next={})",
            self.next.load(Ordering::Relaxed)
        )
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}_{n}")
    }
}
