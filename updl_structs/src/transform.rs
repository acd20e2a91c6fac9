use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Vector3, to_number};

/// Position, Euler rotation in degrees, scale. Always three complete triples.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Transform {
    pub const DEFAULT: Self = Self {
        position: Vector3::ZERO,
        rotation: Vector3::ZERO,
        scale: Vector3::ONE,
    };

    pub const fn at(position: Vector3) -> Self {
        Self {
            position,
            ..Self::DEFAULT
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const POSITION_KEYS: &[&str] = &["pos", "position"];
const ROTATION_KEYS: &[&str] = &["rot", "rotation"];
const SCALE_KEYS: &[&str] = &["scale"];

/// Accepts a JSON-encoded string, an object with `pos`/`position`, `rot`/`rotation`, `scale`
/// (each an array of three or an `{x,y,z}` object), or nothing. Unparseable strings count as
/// nothing; malformed axes fall back to that axis' default.
pub fn normalize_transform(raw: Option<&Value>) -> Transform {
    let parsed;
    let source = match raw {
        Some(Value::String(s)) => {
            parsed = serde_json::from_str::<Value>(s).ok();
            parsed.as_ref()
        }
        other => other,
    };

    let Some(source) = source.filter(|v| v.is_object()) else {
        return Transform::DEFAULT;
    };

    Transform {
        position: normalize_triple(field(source, POSITION_KEYS), Vector3::ZERO),
        rotation: normalize_triple(field(source, ROTATION_KEYS), Vector3::ZERO),
        scale: normalize_triple(field(source, SCALE_KEYS), Vector3::ONE),
    }
}

fn field<'a>(source: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| source.get(*k).filter(|v| !v.is_null()))
}

/// `[x, y, z]` or `{x, y, z}`; each axis coerced on its own.
pub fn normalize_triple(raw: Option<&Value>, default: Vector3) -> Vector3 {
    match raw {
        Some(Value::Array(items)) => {
            let mut axes = default.to_array();
            for (i, axis) in axes.iter_mut().enumerate() {
                if let Some(n) = items.get(i).and_then(to_number) {
                    *axis = n;
                }
            }
            Vector3::from_axes(axes)
        }
        Some(Value::Object(map)) => {
            let axis = |key: &str, fallback: f64| map.get(key).and_then(to_number).unwrap_or(fallback);
            Vector3::new(
                axis("x", default.x),
                axis("y", default.y),
                axis("z", default.z),
            )
        }
        _ => default,
    }
}
