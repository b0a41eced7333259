use crate::id::DeclId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not find struct \"{0}\" in index")]
    StructNotFound(DeclId),
    #[error("Could not find enum \"{0}\" in index")]
    EnumNotFound(DeclId),
    #[error("Could not find typedef \"{0}\" in index")]
    TypedefNotFound(DeclId),
    #[error("Could not find class \"{0}\" in index")]
    ClassNotFound(DeclId),
    #[error("Could not find function \"{0}\" in index")]
    FunctionNotFound(String),
    #[error("Could not find objc class or protocol \"{0}\" in index")]
    ObjCContainerNotFound(DeclId),
    #[error("Multiple matches for \"{0}\" were found")]
    MultipleMatches(String),
    #[error("Failed to read declaration index from \"{path}\"")]
    FailedToReadIndex {
        path: String,
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Failed to parse declaration index")]
    FailedToParseIndex(#[from] serde_json::Error),
    #[error("I/O error")]
    IoError(#[from] std::io::Error),
}
