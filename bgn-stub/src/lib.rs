//! Builds the target-language stub tree for a [`bgn_index::DeclarationIndex`].
//!
//! The entry point is [`StubBuilder`], which walks every declaration through a [`BuildingContext`] and returns the
//! stubs together with the frozen [`BridgeMetadata`] describing which of them need native bridges.
pub mod bridge_metadata;
pub mod builder;
mod classes;
pub mod context;
mod enums;
pub mod error;
mod functions;
mod globals;
mod macros;
pub mod mapper;
mod objc;
mod records;
pub mod stub;
mod typedefs;

use std::borrow::Cow;

pub use bridge_metadata::{BridgeMetadata, BridgeMetadataBuilder};
pub use builder::{BuildWarning, StubBuildResult, StubBuilder};
pub use context::{GenerationContext, UniqueIds};
pub use error::Error;
pub use functions::VARIADIC_PARAMETER;
pub use mapper::BuildingContext;

/// Replace every run of characters that can't appear in a C identifier with `_`
pub fn sanitize_name(name: &str) -> Cow<str> {
    regex::Regex::new("(?:[^a-zA-Z0-9_])+")
        .unwrap()
        .replace_all(name, "_")
}
