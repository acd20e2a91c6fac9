use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to serialize node data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{category} compilation failed: {source}")]
    Category {
        category: &'static str,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn in_category(category: &'static str, source: CompileError) -> Self {
        Self::Category {
            category,
            source: Box::new(source),
        }
    }
}
