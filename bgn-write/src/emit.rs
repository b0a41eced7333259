//! Narrow interfaces to the renderers of target output, with a minimal implementation of each
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use bgn_stub::stub::{
    ClassKind, ClassStub, FunctionStub, ParameterStub, PropertyKind, PropertyStub, StubContainer,
    TypealiasStub,
};
use serde::{Deserialize, Serialize};

use crate::bridge::SubModule;
use crate::error::Error;

type Result<T, E = Error> = std::result::Result<T, E>;

/// Renders one sub-module as a target source unit
pub trait SourceEmitter {
    /// Extension of the files this emitter writes, without the dot
    fn file_extension(&self) -> &str;

    fn emit(&self, package: &str, module: &SubModule, out: &mut dyn Write) -> Result<()>;
}

/// One described declaration of a metadata module
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFragment {
    pub kind: String,
    pub name: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Everything a metadata-mode run produces, aggregated over all sub-modules
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataModule {
    pub package: String,
    pub manifest: BTreeMap<String, String>,
    pub fragments: Vec<MetadataFragment>,
    pub annotations: Vec<String>,
}

/// Describes sub-modules as serialized metadata instead of source
pub trait MetadataEmitter {
    fn file_name(&self, package: &str) -> String;

    fn fragments(&self, package: &str, module: &SubModule) -> Result<Vec<MetadataFragment>>;

    fn annotations(&self, package: &str, module: &SubModule) -> Vec<String>;

    fn write(&self, module: &MetadataModule, out: &mut dyn Write) -> Result<()>;
}

/// Writes a readable listing of the stubs of a sub-module, in the target's syntax
#[derive(Clone, Copy, Debug, Default)]
pub struct StubListingEmitter;

impl SourceEmitter for StubListingEmitter {
    fn file_extension(&self) -> &str {
        "kt"
    }

    fn emit(&self, package: &str, module: &SubModule, out: &mut dyn Write) -> Result<()> {
        let package = match &module.suffix {
            Some(suffix) => format!("{package}.{suffix}"),
            None => package.to_string(),
        };

        let mut s = format!("package {package}\n");
        write_container(&mut s, module, &module.stubs).map_err(|e| Error::FailedToEmit {
            name: package.clone(),
            source: Box::new(e),
        })?;

        out.write_all(s.as_bytes())?;
        Ok(())
    }
}

fn write_container(s: &mut String, module: &SubModule, stubs: &StubContainer) -> std::fmt::Result {
    for alias in &stubs.typealiases {
        writeln!(s)?;
        write_typealias(s, alias)?;
    }

    for class in &stubs.classes {
        writeln!(s)?;
        write_class(s, module, class)?;
    }

    for property in &stubs.properties {
        writeln!(s)?;
        write_property(s, module, property, "")?;
    }

    for function in &stubs.functions {
        writeln!(s)?;
        write_function(s, module, function, "")?;
    }

    for container in &stubs.containers {
        writeln!(s)?;
        writeln!(s, "// {}", container.name)?;
        write_container(s, module, &container.members)?;
    }

    Ok(())
}

fn write_typealias(s: &mut String, alias: &TypealiasStub) -> std::fmt::Result {
    writeln!(s, "typealias {} = {}", alias.alias.name(), alias.aliasee)
}

fn write_class(s: &mut String, module: &SubModule, class: &ClassStub) -> std::fmt::Result {
    let supertypes = class
        .supertypes
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let name = class.classifier.name();

    match &class.kind {
        ClassKind::Struct {
            size,
            align,
            is_union,
        } => {
            let what = if *is_union { "union" } else { "struct" };
            writeln!(s, "// {what}, size {size}, align {align}")?;
            writeln!(s, "class {name} : {supertypes} {{")?;
        }
        ClassKind::ForwardStruct => {
            writeln!(s, "class {name} : {supertypes}")?;
            return Ok(());
        }
        ClassKind::Enum { entries, base } => {
            writeln!(s, "enum class {name}(val value: {base}) : {supertypes} {{")?;
            for entry in entries {
                writeln!(s, "    {}({}),", entry.name, entry.constant)?;
            }
            writeln!(s, "}}")?;
            return Ok(());
        }
        ClassKind::NativeClass | ClassKind::ObjCClass => {
            writeln!(s, "class {name} : {supertypes} {{")?;
        }
        ClassKind::ObjCProtocol => {
            writeln!(s, "interface {name} : {supertypes} {{")?;
        }
    }

    for property in &class.properties {
        write_property(s, module, property, "    ")?;
    }
    for function in &class.functions {
        write_function(s, module, function, "    ")?;
    }
    writeln!(s, "}}")
}

fn write_property(
    s: &mut String,
    module: &SubModule,
    property: &PropertyStub,
    indent: &str,
) -> std::fmt::Result {
    let receiver = property
        .receiver
        .as_ref()
        .map(|r| format!("{r}."))
        .unwrap_or_default();
    let name = &property.name;
    let ty = &property.ty;

    match &property.kind {
        PropertyKind::Constant(value) => {
            writeln!(s, "{indent}const val {receiver}{name}: {ty} = {value}")
        }
        PropertyKind::Val { .. } => {
            write!(s, "{indent}val {receiver}{name}: {ty}")?;
            match module.symbols.getter(property.id) {
                Some(getter) => writeln!(s, " // get {getter}"),
                None => writeln!(s),
            }
        }
        PropertyKind::Var { .. } => {
            write!(s, "{indent}var {receiver}{name}: {ty}")?;
            match (
                module.symbols.getter(property.id),
                module.symbols.setter(property.id),
            ) {
                (Some(getter), Some(setter)) => writeln!(s, " // get {getter}, set {setter}"),
                _ => writeln!(s),
            }
        }
    }
}

fn write_function(
    s: &mut String,
    module: &SubModule,
    function: &FunctionStub,
    indent: &str,
) -> std::fmt::Result {
    if let Some(symbol) = module.symbols.function(function.id) {
        writeln!(s, "{indent}@CCall(\"{symbol}\")")?;
    }
    let receiver = function
        .receiver
        .as_ref()
        .map(|r| format!("{r}."))
        .unwrap_or_default();
    let modifier = if function.is_static { "static " } else { "" };

    writeln!(
        s,
        "{indent}{modifier}fun {receiver}{}({}): {}",
        function.name,
        parameter_list(&function.parameters),
        function.return_type
    )
}

fn parameter_list(parameters: &[ParameterStub]) -> String {
    parameters
        .iter()
        .map(|p| {
            if p.is_vararg {
                format!("vararg {}: {}", p.name, p.ty)
            } else {
                format!("{}: {}", p.name, p.ty)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes the metadata module as pretty-printed JSON
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonMetadataEmitter;

impl MetadataEmitter for JsonMetadataEmitter {
    fn file_name(&self, package: &str) -> String {
        format!("{package}.metadata.json")
    }

    fn fragments(&self, package: &str, module: &SubModule) -> Result<Vec<MetadataFragment>> {
        let package = match &module.suffix {
            Some(suffix) => format!("{package}.{suffix}"),
            None => package.to_string(),
        };
        let mut fragments = Vec::new();
        container_fragments(&package, module, &module.stubs, &mut fragments);
        Ok(fragments)
    }

    fn annotations(&self, _package: &str, module: &SubModule) -> Vec<String> {
        module
            .stubs
            .all_functions()
            .into_iter()
            .filter_map(|f| {
                module
                    .symbols
                    .function(f.id)
                    .map(|symbol| format!("@CCall(\"{symbol}\") {}", f.name))
            })
            .collect()
    }

    fn write(&self, module: &MetadataModule, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, module)?;
        writeln!(out)?;
        Ok(())
    }
}

fn container_fragments(
    prefix: &str,
    module: &SubModule,
    stubs: &StubContainer,
    fragments: &mut Vec<MetadataFragment>,
) {
    for alias in &stubs.typealiases {
        fragments.push(MetadataFragment {
            kind: "typealias".to_string(),
            name: alias.alias.fq_name(),
            signature: alias.aliasee.render(true),
            symbol: None,
        });
    }

    for class in &stubs.classes {
        let kind = match class.kind {
            ClassKind::Struct { .. } | ClassKind::ForwardStruct => "struct",
            ClassKind::Enum { .. } => "enum",
            ClassKind::NativeClass => "class",
            ClassKind::ObjCClass => "objc class",
            ClassKind::ObjCProtocol => "objc protocol",
        };
        fragments.push(MetadataFragment {
            kind: kind.to_string(),
            name: class.classifier.fq_name(),
            signature: class
                .supertypes
                .iter()
                .map(|t| t.render(true))
                .collect::<Vec<_>>()
                .join(", "),
            symbol: None,
        });

        let prefix = class.classifier.fq_name();
        for property in &class.properties {
            fragments.push(property_fragment(&prefix, module, property));
        }
        for function in &class.functions {
            fragments.push(function_fragment(&prefix, module, function));
        }
    }

    for property in &stubs.properties {
        fragments.push(property_fragment(prefix, module, property));
    }

    for function in &stubs.functions {
        fragments.push(function_fragment(prefix, module, function));
    }

    for container in &stubs.containers {
        let prefix = format!("{prefix}.{}", container.name);
        container_fragments(&prefix, module, &container.members, fragments);
    }
}

fn property_fragment(prefix: &str, module: &SubModule, property: &PropertyStub) -> MetadataFragment {
    MetadataFragment {
        kind: "property".to_string(),
        name: format!("{prefix}.{}", property.name),
        signature: property.ty.render(true),
        symbol: module.symbols.getter(property.id).map(|s| s.to_string()),
    }
}

fn function_fragment(prefix: &str, module: &SubModule, function: &FunctionStub) -> MetadataFragment {
    let parameters = function
        .parameters
        .iter()
        .map(|p| p.ty.render(true))
        .collect::<Vec<_>>()
        .join(", ");
    MetadataFragment {
        kind: "function".to_string(),
        name: format!("{prefix}.{}", function.name),
        signature: format!("({parameters}) -> {}", function.return_type.render(true)),
        symbol: module.symbols.function(function.id).map(|s| s.to_string()),
    }
}
