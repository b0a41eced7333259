//! Synthesizes the native shims that let the target runtime call symbols it cannot address directly.
//!
//! Every shim is a plain C-callable function, forced inline into a second symbol bound to a name chosen by the
//! caller:
//!
//! ```c
//! __attribute__((always_inline))
//! int knifunptr_org_sample1_add(int p0, int p1) {
//!     return add(p0, p1);
//! }
//! const void* kni_org_sample_add_3 __asm("kni_org_sample_add_3") = (const void*) &knifunptr_org_sample1_add;
//! ```
use bgn_index::{ClassDecl, DeclarationIndex, FunctionDecl, MethodDecl, Parameter, QualType, TypeRef};
use bgn_stub::bridge_metadata::{GetterBridgeInfo, SetterBridgeInfo};
use bgn_stub::UniqueIds;
use tracing::{instrument, trace};

/// Prefix of every synthesized wrapper function
pub const WRAPPER_PREFIX: &str = "knifunptr";

/// A native function or method that can be wrapped
#[derive(Clone, Copy, Debug)]
pub enum NativeCallable<'a> {
    Function(&'a FunctionDecl),
    Method {
        owner: &'a ClassDecl,
        method: &'a MethodDecl,
    },
}

impl<'a> NativeCallable<'a> {
    /// The name the native code refers to the callable by
    pub fn native_name(&self) -> String {
        match self {
            NativeCallable::Function(f) => f.name.clone(),
            NativeCallable::Method { owner, method } => format!("{}::{}", owner.name, method.name),
        }
    }

    pub fn is_variadic(&self) -> bool {
        match self {
            NativeCallable::Function(f) => f.is_variadic,
            NativeCallable::Method { method, .. } => method.is_variadic,
        }
    }

    fn result(&self) -> &'a QualType {
        match self {
            NativeCallable::Function(f) => &f.result,
            NativeCallable::Method { method, .. } => &method.result,
        }
    }

    fn parameters(&self) -> &'a [Parameter] {
        match self {
            NativeCallable::Function(f) => &f.parameters,
            NativeCallable::Method { method, .. } => &method.parameters,
        }
    }
}

/// Native source produced for one bridged declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperArtifact {
    /// Name of the synthesized wrapper. `None` when the requested symbol is bound straight to the native function.
    pub wrapper_name: Option<String>,
    pub lines: Vec<String>,
}

impl WrapperArtifact {
    pub fn source(&self) -> String {
        let mut source = self.lines.join("\n");
        source.push('\n');
        source
    }
}

/// Writes wrappers, drawing fresh names from the run's [`UniqueIds`]
pub struct WrapperSynthesizer<'a> {
    index: &'a DeclarationIndex,
    ids: &'a mut UniqueIds,
}

impl<'a> WrapperSynthesizer<'a> {
    pub fn new(index: &'a DeclarationIndex, ids: &'a mut UniqueIds) -> WrapperSynthesizer<'a> {
        WrapperSynthesizer { index, ids }
    }

    /// Make `callable` reachable as `requested_symbol`.
    ///
    /// Variadic callables can't be forwarded, so the symbol is bound to the native function itself and calls are not
    /// checked in any way.
    #[instrument(level = "trace", skip(self))]
    pub fn synthesize(&mut self, callable: &NativeCallable, requested_symbol: &str) -> WrapperArtifact {
        let native_name = callable.native_name();
        if callable.is_variadic() {
            return WrapperArtifact {
                wrapper_name: None,
                lines: vec![bind_symbol(requested_symbol, &native_name)],
            };
        }

        let wrapper_name = self.ids.next_name(WRAPPER_PREFIX, &native_name);

        let mut declarations = Vec::new();
        let mut arguments = Vec::new();

        let receiver = match callable {
            NativeCallable::Method { owner, method } if !method.is_static => {
                declarations.push(format!("{}* p0", owner.name));
                Some(owner)
            }
            _ => None,
        };

        for parameter in callable.parameters() {
            let name = format!("p{}", declarations.len());
            let (declaration, argument) = self.shim_parameter(&parameter.qual_type, &name);
            declarations.push(declaration);
            arguments.push(argument);
        }

        let arguments = arguments.join(", ");
        let call = match (callable, receiver) {
            (NativeCallable::Method { method, .. }, Some(owner)) => {
                format!("(({}*)p0)->{}({arguments})", owner.name, method.name)
            }
            _ => format!("{native_name}({arguments})"),
        };

        let result = callable.result();
        let (return_type, body) = match &self.index.canonical_type(result).type_ref {
            TypeRef::Void => ("void".to_string(), format!("{call};")),
            TypeRef::LValueReference { pointee } | TypeRef::RValueReference { pointee } => {
                (format!("{}*", pointee.spelling), format!("return &({call});"))
            }
            TypeRef::Record { .. } => (format!("{}*", result.spelling), format!("return &({call});")),
            _ => (result.spelling.clone(), format!("return {call};")),
        };

        trace!("wrapping {native_name} as {wrapper_name}");

        let lines = vec![
            "__attribute__((always_inline))".to_string(),
            format!(
                "{} {{",
                declare(
                    &return_type,
                    &format!("{wrapper_name}({})", declarations.join(", "))
                )
            ),
            format!("    {body}"),
            "}".to_string(),
            bind_symbol(requested_symbol, &wrapper_name),
        ];

        WrapperArtifact {
            wrapper_name: Some(wrapper_name),
            lines,
        }
    }

    /// A shim returning the value of a global, or its address when it is an aggregate
    pub fn getter(&mut self, info: &GetterBridgeInfo, requested_symbol: &str) -> WrapperArtifact {
        if info.is_aggregate {
            return self.pointer_getter(info, requested_symbol);
        }

        let wrapper_name = self
            .ids
            .next_name(WRAPPER_PREFIX, &format!("{}_getter", info.native_name));
        let lines = vec![
            "__attribute__((always_inline))".to_string(),
            format!(
                "{} {{",
                declare(&info.native_type.spelling, &format!("{wrapper_name}()"))
            ),
            format!("    return {};", info.native_name),
            "}".to_string(),
            bind_symbol(requested_symbol, &wrapper_name),
        ];

        WrapperArtifact {
            wrapper_name: Some(wrapper_name),
            lines,
        }
    }

    /// A shim returning the address of a global
    pub fn pointer_getter(&mut self, info: &GetterBridgeInfo, requested_symbol: &str) -> WrapperArtifact {
        let wrapper_name = self
            .ids
            .next_name(WRAPPER_PREFIX, &format!("{}_pointer_getter", info.native_name));
        let lines = vec![
            "__attribute__((always_inline))".to_string(),
            format!("void* {wrapper_name}() {{"),
            format!("    return (void*) &{};", info.native_name),
            "}".to_string(),
            bind_symbol(requested_symbol, &wrapper_name),
        ];

        WrapperArtifact {
            wrapper_name: Some(wrapper_name),
            lines,
        }
    }

    /// A shim assigning its argument to a global
    pub fn setter(&mut self, info: &SetterBridgeInfo, requested_symbol: &str) -> WrapperArtifact {
        let wrapper_name = self
            .ids
            .next_name(WRAPPER_PREFIX, &format!("{}_setter", info.native_name));
        let lines = vec![
            "__attribute__((always_inline))".to_string(),
            format!(
                "void {wrapper_name}({}) {{",
                declare(&info.native_type.spelling, "p0")
            ),
            format!("    {} = p0;", info.native_name),
            "}".to_string(),
            bind_symbol(requested_symbol, &wrapper_name),
        ];

        WrapperArtifact {
            wrapper_name: Some(wrapper_name),
            lines,
        }
    }

    /// The declaration of a shim parameter and the expression that forwards it.
    ///
    /// Records by value and references can't cross a C boundary, so they are passed as pointers and dereferenced.
    /// Typedefs are looked through to find them.
    fn shim_parameter(&self, qual_type: &QualType, name: &str) -> (String, String) {
        match &self.index.canonical_type(qual_type).type_ref {
            TypeRef::Record { .. } => (format!("{}* {name}", qual_type.spelling), format!("*{name}")),
            TypeRef::LValueReference { pointee } | TypeRef::RValueReference { pointee } => {
                (format!("{}* {name}", pointee.spelling), format!("*{name}"))
            }
            _ => (declare(&qual_type.spelling, name), name.to_string()),
        }
    }
}

/// Bind `symbol` to the address of `function` so the linker resolves it under that name
pub fn bind_symbol(symbol: &str, function: &str) -> String {
    format!("const void* {symbol} __asm(\"{symbol}\") = (const void*) &{function};")
}

/// Declare `name` with type `spelling`, putting the name inside function pointer declarators
fn declare(spelling: &str, name: &str) -> String {
    if spelling.contains("(*)") {
        spelling.replacen("(*)", &format!("(*{name})"), 1)
    } else {
        format!("{spelling} {name}")
    }
}

#[cfg(test)]
mod tests {
    use bgn_index::DeclId;
    use bgn_stub::stub::{Marshalling, TargetType, TypeInfo, TypeMirror};
    use indoc::indoc;

    use super::*;

    fn pointer_mirror() -> TypeMirror {
        TypeMirror {
            target: TargetType::interop("COpaquePointer").nullable(),
            pointed: TargetType::interop("COpaquePointerVar"),
            marshalling: Marshalling::ByPointer,
            info: TypeInfo::Pointer,
        }
    }

    #[test]
    fn function_pointer_parameters_are_named_inside_the_declarator() {
        assert_eq!(declare("void (*)(int)", "p2"), "void (*p2)(int)");
        assert_eq!(declare("const char *", "p0"), "const char * p0");
    }

    #[test]
    fn class_parameters_are_passed_by_pointer() {
        let index = DeclarationIndex::new();
        let mut ids = UniqueIds::new("org.sample");
        let synthesizer = WrapperSynthesizer::new(&index, &mut ids);

        let class = QualType::record("Vec3", DeclId::new("c:@S@Vec3"));
        assert_eq!(
            synthesizer.shim_parameter(&class, "p1"),
            ("Vec3* p1".to_string(), "*p1".to_string())
        );
        assert_eq!(
            synthesizer.shim_parameter(&QualType::reference_to(class.constant()), "p2"),
            ("const Vec3* p2".to_string(), "*p2".to_string())
        );
    }

    #[test]
    fn setter_assigns_its_argument() {
        let index = DeclarationIndex::new();
        let mut ids = UniqueIds::new("org.sample");
        let info = SetterBridgeInfo {
            native_name: "counter".to_string(),
            native_type: QualType::int(),
            type_mirror: TypeMirror {
                target: TargetType::primitive("Int"),
                pointed: TargetType::interop("IntVar"),
                marshalling: Marshalling::ByValue,
                info: TypeInfo::Primitive {
                    size: 4,
                    signed: true,
                    floating: false,
                },
            },
        };

        let artifact = WrapperSynthesizer::new(&index, &mut ids).setter(&info, "kni_counter_set");
        assert_eq!(
            artifact.source(),
            indoc!(
                r#"
                __attribute__((always_inline))
                void knifunptr_org_sample1_counter_setter(int p0) {
                    counter = p0;
                }
                const void* kni_counter_set __asm("kni_counter_set") = (const void*) &knifunptr_org_sample1_counter_setter;
                "#
            )
        );
    }

    #[test]
    fn function_pointer_getter_names_itself_inside_the_declarator() {
        let index = DeclarationIndex::new();
        let mut ids = UniqueIds::new("org.sample");
        let callback = QualType::pointer_to(QualType::new(
            "void (int)",
            false,
            TypeRef::FunctionProto {
                result: Box::new(QualType::void()),
                args: vec![QualType::int()],
                is_variadic: false,
            },
        ));
        let info = GetterBridgeInfo {
            native_name: "on_event".to_string(),
            native_type: QualType {
                spelling: "void (*)(int)".to_string(),
                ..callback
            },
            type_mirror: pointer_mirror(),
            is_aggregate: false,
        };

        let artifact = WrapperSynthesizer::new(&index, &mut ids).getter(&info, "kni_on_event_get");
        assert_eq!(
            artifact.source(),
            indoc!(
                r#"
                __attribute__((always_inline))
                void (*knifunptr_org_sample1_on_event_getter())(int) {
                    return on_event;
                }
                const void* kni_on_event_get __asm("kni_on_event_get") = (const void*) &knifunptr_org_sample1_on_event_getter;
                "#
            )
        );
    }
}
