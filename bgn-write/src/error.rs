use bgn_index::DeclId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Stub error")]
    StubError(#[from] bgn_stub::Error),
    #[error("Failed to generate bridge for \"{name}\"")]
    FailedToGenerateBridge {
        name: String,
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Could not find native declaration \"{0}\"")]
    DeclarationNotFound(DeclId),
    #[error("Could not find method {index} of class \"{owner}\"")]
    MethodNotFound { owner: DeclId, index: usize },
    #[error("Function \"{0}\" is dispatched by the runtime and has no native bridge")]
    NotNativelyBridged(String),
    #[error("Failed to emit \"{name}\"")]
    FailedToEmit {
        name: String,
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Failed to serialize metadata")]
    SerializeError(#[from] serde_json::Error),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}
