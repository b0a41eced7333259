//! Turns a built stub tree into files: the native bridge file holding every synthesized shim, and the target
//! output rendered by a [`SourceEmitter`] or a [`MetadataEmitter`].
pub mod bridge;
pub mod bridge_file;
pub mod emit;
pub mod error;
pub mod wrapper;

pub use bridge::{BridgeBuildResult, BridgeBuilder, NativeBridgeBuilder, SubModule, SymbolTable};
pub use bridge_file::write_bridge_file;
pub use emit::{
    JsonMetadataEmitter, MetadataEmitter, MetadataFragment, MetadataModule, SourceEmitter,
    StubListingEmitter,
};
pub use error::Error;
pub use wrapper::{NativeCallable, WrapperArtifact, WrapperSynthesizer};
