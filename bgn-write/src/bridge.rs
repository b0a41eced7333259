//! Decides which stubs need native bridges and produces them
use std::collections::BTreeMap;

use bgn_index::DeclarationIndex;
use bgn_stub::stub::{CallKind, FunctionOrigin, FunctionStub, StubContainer, StubId};
use bgn_stub::{sanitize_name, BridgeMetadata, GenerationContext};
use tracing::{debug, instrument};

use crate::error::Error;
use crate::wrapper::{NativeCallable, WrapperSynthesizer};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Native symbols the target side links against, per stub
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    functions: BTreeMap<StubId, String>,
    getters: BTreeMap<StubId, String>,
    setters: BTreeMap<StubId, String>,
}

impl SymbolTable {
    pub fn function(&self, id: StubId) -> Option<&str> {
        self.functions.get(&id).map(|s| s.as_str())
    }

    pub fn getter(&self, id: StubId) -> Option<&str> {
        self.getters.get(&id).map(|s| s.as_str())
    }

    pub fn setter(&self, id: StubId) -> Option<&str> {
        self.setters.get(&id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.getters.len() + self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A unit of target output: some stubs and the symbols they use
#[derive(Clone, Debug, PartialEq)]
pub struct SubModule {
    /// Appended to the package to name this module's output. `None` for the main module.
    pub suffix: Option<String>,
    pub stubs: StubContainer,
    pub symbols: SymbolTable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BridgeBuildResult {
    /// Native source lines for the bridge file, in order
    pub native_lines: Vec<String>,
    pub modules: Vec<SubModule>,
}

/// Turns a finished stub tree into native bridges and sub-modules
pub trait BridgeBuilder {
    fn build(
        &self,
        index: &DeclarationIndex,
        ctx: &mut GenerationContext,
        stubs: StubContainer,
        metadata: &BridgeMetadata,
    ) -> Result<BridgeBuildResult>;
}

/// Puts the whole stub tree in one sub-module and bridges everything with synthesized C wrappers
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeBridgeBuilder;

impl BridgeBuilder for NativeBridgeBuilder {
    #[instrument(level = "trace", skip_all)]
    fn build(
        &self,
        index: &DeclarationIndex,
        ctx: &mut GenerationContext,
        stubs: StubContainer,
        metadata: &BridgeMetadata,
    ) -> Result<BridgeBuildResult> {
        let package = sanitize_name(ctx.package()).to_string();
        let mut native_lines = Vec::new();
        let mut symbols = SymbolTable::default();

        for function in stubs.all_functions() {
            match &function.call {
                CallKind::Direct { symbol } => {
                    symbols.functions.insert(function.id, symbol.clone());
                }
                CallKind::ObjCMessage => {}
                CallKind::Bridged => {
                    let symbol = format!(
                        "kni_{package}_{}_{}",
                        sanitize_name(&function.name),
                        function.id.get()
                    );
                    let callable =
                        resolve(index, function).map_err(|e| Error::FailedToGenerateBridge {
                            name: function.name.clone(),
                            source: Box::new(e),
                        })?;
                    let artifact =
                        WrapperSynthesizer::new(index, ctx.unique_ids()).synthesize(&callable, &symbol);
                    native_lines.extend(artifact.lines);
                    symbols.functions.insert(function.id, symbol);
                }
            }
        }

        for (id, getter) in metadata.getters() {
            let symbol = format!(
                "kni_{package}_{}_get_{}",
                sanitize_name(&getter.native_name),
                id.get()
            );
            let artifact = WrapperSynthesizer::new(index, ctx.unique_ids()).getter(getter, &symbol);
            native_lines.extend(artifact.lines);
            symbols.getters.insert(*id, symbol);
        }

        for (id, setter) in metadata.setters() {
            let symbol = format!(
                "kni_{package}_{}_set_{}",
                sanitize_name(&setter.native_name),
                id.get()
            );
            let artifact = WrapperSynthesizer::new(index, ctx.unique_ids()).setter(setter, &symbol);
            native_lines.extend(artifact.lines);
            symbols.setters.insert(*id, symbol);
        }

        debug!(
            "bridged {} symbols with {} lines of native code",
            symbols.len(),
            native_lines.len()
        );

        Ok(BridgeBuildResult {
            native_lines,
            modules: vec![SubModule {
                suffix: None,
                stubs,
                symbols,
            }],
        })
    }
}

/// The native function or method a bridged stub calls
fn resolve<'a>(index: &'a DeclarationIndex, function: &FunctionStub) -> Result<NativeCallable<'a>> {
    match &function.origin {
        FunctionOrigin::Native { decl } => index
            .get_function(*decl)
            .map(NativeCallable::Function)
            .ok_or(Error::DeclarationNotFound(*decl)),
        FunctionOrigin::Method { owner, index: i } => {
            let class = index
                .get_class(*owner)
                .ok_or(Error::DeclarationNotFound(*owner))?;
            let method = class.methods.get(*i).ok_or(Error::MethodNotFound {
                owner: *owner,
                index: *i,
            })?;
            Ok(NativeCallable::Method {
                owner: class,
                method,
            })
        }
        FunctionOrigin::ObjCMethod { .. } => Err(Error::NotNativelyBridged(function.name.clone())),
    }
}
