use gesture_catalog_compiler::CatalogCompilerError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("gesture `{gesture}`: {reason}")]
    InvalidDefinition { gesture: String, reason: String },
    #[error("duplicate gesture name `{0}`")]
    DuplicateName(String),
    #[error("catalog defines {count} gestures, at most {max} are supported")]
    TooManyGestures { count: usize, max: usize },
    #[error(transparent)]
    Load(#[from] CatalogCompilerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    #[error("reference range {start}..={end} is invalid for a recording of {len} samples")]
    InvalidReferenceRange { start: usize, end: usize, len: usize },
    #[error("a reference trajectory is already recorded")]
    ReferenceAlreadyRecorded,
    #[error("no reference trajectory recorded")]
    NoReference,
    #[error("no live session in progress")]
    NotRecording,
    #[error("live session captured no samples")]
    EmptyLiveSequence,
}
