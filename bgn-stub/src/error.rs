use bgn_index::{DeclId, DeclKind};
use bgn_util::Trace;

use crate::stub::StubId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to build {kind} \"{name}\"")]
    FailedToBuild {
        kind: DeclKind,
        name: String,
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Type \"{spelling}\" cannot be represented in the target language")]
    Unrepresentable { spelling: String, source: Trace },
    #[error("Failed to map parameter \"{name}\"")]
    FailedToMapParameter {
        name: String,
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Failed to map return type")]
    FailedToMapResult {
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Failed to map method \"{name}\"")]
    FailedToMapMethod {
        name: String,
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Failed to map property \"{name}\"")]
    FailedToMapProperty {
        name: String,
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
    #[error("Unsupported feature: \"{description}\"")]
    Unsupported { description: String, source: Trace },
    #[error("Could not resolve declaration \"{0}\"")]
    UnresolvedReference(DeclId),
    #[error("Bridge metadata references stub {0} which was not produced by this build")]
    DanglingBridgeEntry(StubId),
    #[error("bgn-index error")]
    Index(#[from] bgn_index::Error),
}

impl Error {
    pub(crate) fn unrepresentable(spelling: &str) -> Error {
        Error::Unrepresentable {
            spelling: spelling.to_string(),
            source: Trace::new(),
        }
    }

    pub(crate) fn unsupported(description: impl Into<String>) -> Error {
        Error::Unsupported {
            description: description.into(),
            source: Trace::new(),
        }
    }

    /// returns true if the cause of this error is ultimately that there's an unsupported feature
    pub fn is_unsupported(&self) -> bool {
        if let Error::Unsupported { .. } | Error::Unrepresentable { .. } = self {
            return true;
        }

        use std::error::Error as _;
        if let Some(e) = self.source() {
            if let Some(e) = e.downcast_ref::<Error>() {
                e.is_unsupported()
            } else {
                false
            }
        } else {
            false
        }
    }
}
