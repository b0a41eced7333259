//! Dispatches every declaration of the index to its per-kind builder and collects the results
use std::fmt::Display;

use bgn_index::{DeclKind, Declaration, DeclarationIndex};
use bgn_util::{source_iter, Trace};
use hashbrown::HashSet;
use tracing::{debug, instrument, warn};

use crate::bridge_metadata::{BridgeMetadata, BridgeMetadataBuilder};
use crate::classes::build_class;
use crate::context::GenerationContext;
use crate::enums::build_enum;
use crate::error::Error;
use crate::functions::build_function;
use crate::globals::build_global;
use crate::macros::{build_macro_constant, build_wrapped_macro};
use crate::mapper::BuildingContext;
use crate::objc::{build_category, build_objc_class, build_protocol};
use crate::records::build_struct;
use crate::stub::{StubContainer, StubElement};
use crate::typedefs::build_typedef;

type Result<T, E = Error> = std::result::Result<T, E>;

/// A declaration that was skipped because it could not be built
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildWarning {
    pub kind: DeclKind,
    pub name: String,
    /// The whole chain of errors that led to the declaration being skipped
    pub reason: String,
}

impl Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} \"{}\" was skipped: {}", self.kind, self.name, self.reason)
    }
}

/// Everything one build produced
#[derive(Debug)]
pub struct StubBuildResult {
    pub stubs: StubContainer,
    pub metadata: BridgeMetadata,
    pub warnings: Vec<BuildWarning>,
}

/// Turns a [`DeclarationIndex`] into a stub tree
pub struct StubBuilder<'a> {
    context: BuildingContext<'a>,
}

impl<'a> StubBuilder<'a> {
    pub fn new(index: &'a DeclarationIndex, ctx: &'a mut GenerationContext) -> StubBuilder<'a> {
        StubBuilder {
            context: BuildingContext::new(index, ctx),
        }
    }

    /// Build every declaration of the index.
    ///
    /// A declaration that fails to build is reported in the result's warnings and leaves nothing behind, neither
    /// stubs nor bridge metadata. The only errors returned are internal inconsistencies.
    #[instrument(level = "trace", skip(self))]
    pub fn build(mut self) -> Result<StubBuildResult> {
        let index = self.context.index();
        self.warn_unmatched_exclusions();

        let mut stubs = StubContainer::new();
        let mut metadata = BridgeMetadataBuilder::new();
        let mut warnings = Vec::new();

        for decl in declarations(index) {
            if self.is_excluded(&decl) {
                debug!("{} {} is excluded", decl.kind(), decl.display_name());
                continue;
            }

            let mut scratch = BridgeMetadataBuilder::new();
            match build_declaration(&mut self.context, decl, &mut scratch) {
                Ok(elements) => {
                    for element in elements {
                        stubs.push(element);
                    }
                    metadata.merge(scratch);
                }
                Err(e) => {
                    let warning = BuildWarning {
                        kind: decl.kind(),
                        name: decl.display_name(),
                        reason: error_chain(&e),
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        let metadata = metadata.finalize();

        let produced = stubs.ids().into_iter().collect::<HashSet<_>>();
        if let Some(dangling) = metadata
            .referenced_stubs()
            .into_iter()
            .find(|id| !produced.contains(id))
        {
            return Err(Error::DanglingBridgeEntry(dangling));
        }

        Ok(StubBuildResult {
            stubs,
            metadata,
            warnings,
        })
    }

    fn is_excluded(&self, decl: &Declaration) -> bool {
        let config = self.context.context().config();
        match decl {
            Declaration::Function(f) => config.excluded_functions.contains(&f.name),
            Declaration::MacroConstant(m) => config.excluded_macros.contains(&m.name),
            Declaration::WrappedMacro(m) => config.excluded_macros.contains(&m.name),
            Declaration::Global(_)
            | Declaration::Struct(_)
            | Declaration::Enum(_)
            | Declaration::Typedef(_)
            | Declaration::ObjCProtocol(_)
            | Declaration::ObjCClass(_)
            | Declaration::ObjCCategory(_)
            | Declaration::NativeClass(_) => false,
        }
    }

    /// Exclusions that match nothing are usually typos
    fn warn_unmatched_exclusions(&self) {
        let index = self.context.index();
        let config = self.context.context().config();

        for name in &config.excluded_functions {
            if index.functions().iter().all(|f| &f.name != name) {
                warn!("excluded function \"{name}\" does not match any function");
                warn_suggestions(name, index.functions().iter().map(|f| f.name.as_str()));
            }
        }

        let macro_names = || {
            index
                .macro_constants()
                .iter()
                .map(|m| m.name.as_str())
                .chain(index.wrapped_macros().iter().map(|m| m.name.as_str()))
        };
        for name in &config.excluded_macros {
            if macro_names().all(|m| m != name.as_str()) {
                warn!("excluded macro \"{name}\" does not match any macro");
                warn_suggestions(name, macro_names());
            }
        }
    }
}

fn warn_suggestions<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) {
    let suggestions = bgn_index::index::suggest_names(name, candidates);
    if !suggestions.is_empty() {
        warn!("Did you mean one of:");
        for sug in suggestions {
            warn!("  {sug}");
        }
    }
}

/// Every declaration of the index in build order
fn declarations(index: &DeclarationIndex) -> Vec<Declaration<'_>> {
    let mut result = Vec::new();
    result.extend(index.structs().iter().map(Declaration::Struct));
    result.extend(index.enums().iter().map(Declaration::Enum));
    result.extend(index.typedefs().iter().map(Declaration::Typedef));
    result.extend(index.classes().iter().map(Declaration::NativeClass));
    result.extend(index.objc_protocols().iter().map(Declaration::ObjCProtocol));
    result.extend(index.objc_classes().iter().map(Declaration::ObjCClass));
    result.extend(index.objc_categories().iter().map(Declaration::ObjCCategory));
    result.extend(index.globals().iter().map(Declaration::Global));
    result.extend(index.functions().iter().map(Declaration::Function));
    result.extend(index.macro_constants().iter().map(Declaration::MacroConstant));
    result.extend(index.wrapped_macros().iter().map(Declaration::WrappedMacro));
    result
}

fn build_declaration(
    bc: &mut BuildingContext,
    decl: Declaration,
    metadata: &mut BridgeMetadataBuilder,
) -> Result<Vec<StubElement>> {
    let result = match decl {
        Declaration::Struct(d) => build_struct(bc, d),
        Declaration::Enum(d) => build_enum(bc, d, metadata),
        Declaration::Typedef(d) => build_typedef(bc, d),
        Declaration::NativeClass(d) => build_class(bc, d),
        Declaration::ObjCProtocol(d) => build_protocol(bc, d),
        Declaration::ObjCClass(d) => build_objc_class(bc, d),
        Declaration::ObjCCategory(d) => build_category(bc, d),
        Declaration::Global(d) => build_global(bc, d, metadata),
        Declaration::Function(d) => build_function(bc, d, metadata),
        Declaration::MacroConstant(d) => build_macro_constant(bc, d),
        Declaration::WrappedMacro(d) => build_wrapped_macro(bc, d, metadata),
    };

    result.map_err(|e| Error::FailedToBuild {
        kind: decl.kind(),
        name: decl.display_name(),
        source: Box::new(e),
    })
}

/// `error: cause: cause...` on one line. Backtraces are left to the log.
fn error_chain(error: &Error) -> String {
    let mut reason = error.to_string();
    for e in source_iter(error) {
        if e.is::<Trace>() {
            continue;
        }
        let msg = e.to_string();
        if !msg.is_empty() {
            reason = format!("{reason}: {msg}");
        }
    }
    reason
}
