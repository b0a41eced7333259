//! The declaration index: native functions, globals, records, enums, typedefs, macros, C++ classes and
//! Objective-C containers, as resolved by an external header indexer.
//!
//! Nothing in here parses native source. The indexer writes an [`index::IndexFile`] (JSON) and everything
//! downstream reads it back as a [`DeclarationIndex`].

pub mod decl;
pub mod error;
pub mod id;
pub mod index;
pub mod index_map;
pub mod qualtype;

pub use decl::*;
pub use error::Error;
pub use id::DeclId;
pub use index::DeclarationIndex;
pub use qualtype::{QualType, TypeRef};
