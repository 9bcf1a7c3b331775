/// Coarse classification used by the transport layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    EmptyResult,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Archetype is required.")]
    MissingArchetype,
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),
    #[error("Archetype {0} has an empty plan")]
    EmptyPlan(String),
    #[error("Archetype {archetype} has a {role} slot with zero sets")]
    InvalidSlot { archetype: String, role: String },
    #[error("No suitable alternatives found for {0}.")]
    NoAlternativesFound(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::MissingArchetype => ErrorKind::Validation,
            EngineError::UnknownArchetype(_)
            | EngineError::EmptyPlan(_)
            | EngineError::InvalidSlot { .. } => ErrorKind::Configuration,
            EngineError::NoAlternativesFound(_) => ErrorKind::EmptyResult,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
