//! Maps native declarations and types to their target-language names and representations
use bgn_index::{
    Declaration, DeclarationIndex, EnumDecl, QualType, StructDecl, TypeRef, TypedefDecl,
};
use bgn_util::TargetPlatform;
use hashbrown::HashSet;
use tracing::{debug, instrument};

use crate::context::GenerationContext;
use crate::error::Error;
use crate::stub::{
    Classifier, ConstantStub, Marshalling, StubId, TargetType, TypeInfo, TypeMirror,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Package for structs (and C++ classes) that are only forward-declared on the native platform
pub const CNAMES_STRUCTS: &str = "cnames.structs";
pub const OBJCNAMES_CLASSES: &str = "objcnames.classes";
pub const OBJCNAMES_PROTOCOLS: &str = "objcnames.protocols";

/// Character width of a string parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringKind {
    Narrow,
    Wide,
}

/// Resolves names and type mirrors for one build, caching what it learns in the [`GenerationContext`]
pub struct BuildingContext<'a> {
    index: &'a DeclarationIndex,
    ctx: &'a mut GenerationContext,
}

impl<'a> BuildingContext<'a> {
    pub fn new(index: &'a DeclarationIndex, ctx: &'a mut GenerationContext) -> BuildingContext<'a> {
        BuildingContext { index, ctx }
    }

    pub fn index(&self) -> &'a DeclarationIndex {
        self.index
    }

    pub fn context(&self) -> &GenerationContext {
        &*self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GenerationContext {
        &mut *self.ctx
    }

    pub fn package(&self) -> &str {
        self.ctx.package()
    }

    pub fn platform(&self) -> TargetPlatform {
        self.ctx.platform()
    }

    pub fn next_stub_id(&mut self) -> StubId {
        self.ctx.next_stub_id()
    }

    /// The target name of a type declaration. `None` for anonymous enums and for declarations that are not types.
    pub fn classifier(&mut self, decl: Declaration) -> Option<Classifier> {
        let id = match decl {
            Declaration::Struct(s) => s.id,
            Declaration::Enum(e) => e.id,
            Declaration::Typedef(t) => t.id,
            Declaration::NativeClass(c) => c.id,
            Declaration::ObjCProtocol(p) => p.id,
            Declaration::ObjCClass(c) => c.id,
            Declaration::Function(_)
            | Declaration::Global(_)
            | Declaration::MacroConstant(_)
            | Declaration::WrappedMacro(_)
            | Declaration::ObjCCategory(_) => return None,
        };

        if let Some(cached) = self.ctx.cached_classifier(id) {
            return cached.clone();
        }

        let classifier = self.derive_classifier(decl);
        self.ctx.cache_classifier(id, classifier.clone());
        classifier
    }

    fn derive_classifier(&mut self, decl: Declaration) -> Option<Classifier> {
        let package = self.ctx.package().to_string();
        let native = self.platform() == TargetPlatform::Native;

        match decl {
            Declaration::Struct(s) => match &s.name {
                None => Some(Classifier::new(
                    &package,
                    &self.ctx.anonymous_struct_name(s.id),
                )),
                Some(name) if s.is_forward() && native => {
                    Some(self.forward(CNAMES_STRUCTS, simple_name(name)))
                }
                Some(name) => {
                    let simple = simple_name(name);
                    if self.index.has_typedef_named(simple, Some(s.id)) {
                        debug!("struct {name} collides with a typedef and is renamed {simple}Struct");
                        Some(Classifier::new(&package, &format!("{simple}Struct")))
                    } else {
                        Some(Classifier::new(&package, simple))
                    }
                }
            },
            Declaration::Enum(e) => e
                .name
                .as_ref()
                .map(|name| Classifier::new(&package, simple_name(name))),
            Declaration::Typedef(t) => Some(Classifier::new(&package, simple_name(&t.name))),
            Declaration::NativeClass(c) => {
                if c.is_forward && native {
                    Some(self.forward(CNAMES_STRUCTS, simple_name(&c.name)))
                } else {
                    Some(Classifier::new(&package, simple_name(&c.name)))
                }
            }
            Declaration::ObjCProtocol(p) => {
                let name = format!("{}Protocol", p.name);
                if p.is_forward {
                    Some(self.forward(OBJCNAMES_PROTOCOLS, &name))
                } else {
                    Some(Classifier::new(&package, &name))
                }
            }
            Declaration::ObjCClass(c) => {
                if c.is_forward {
                    Some(self.forward(OBJCNAMES_CLASSES, &c.name))
                } else {
                    Some(Classifier::new(&package, &c.name))
                }
            }
            Declaration::Function(_)
            | Declaration::Global(_)
            | Declaration::MacroConstant(_)
            | Declaration::WrappedMacro(_)
            | Declaration::ObjCCategory(_) => None,
        }
    }

    fn forward(&mut self, package: &str, name: &str) -> Classifier {
        let classifier = Classifier::new(package, name);
        self.ctx.record_forward_declaration(name, &classifier);
        classifier
    }

    /// Should `decl` become a closed target enumeration?
    ///
    /// Configuration wins over the heuristic, which calls an enum strict when none of its constants has an explicit
    /// value. Anonymous enums are never strict.
    pub fn enum_strictness(&self, decl: &EnumDecl) -> bool {
        let name = match &decl.name {
            Some(name) => name,
            None => return false,
        };

        let config = self.ctx.config();
        if config.strict_enums.contains(name) {
            true
        } else if config.non_strict_enums.contains(name) {
            false
        } else {
            decl.constants.iter().all(|c| !c.is_explicit)
        }
    }

    /// The representation of `qual_type`, or `None` if the target cannot represent it
    #[instrument(level = "trace", skip(self))]
    pub fn mirror(&mut self, qual_type: &QualType) -> Option<TypeMirror> {
        let index = self.index;

        match &qual_type.type_ref {
            TypeRef::Void | TypeRef::FunctionProto { .. } | TypeRef::Unsupported { .. } => None,
            TypeRef::Bool => Some(TypeMirror {
                target: TargetType::primitive("Boolean"),
                pointed: TargetType::interop("BooleanVar"),
                marshalling: Marshalling::ByValue,
                info: TypeInfo::Boolean,
            }),
            TypeRef::Char { size, is_signed } | TypeRef::Integer { size, is_signed } => {
                self.integral_mirror(*size, *is_signed)
            }
            TypeRef::Float { size } => {
                let name = match size {
                    4 => "Float",
                    8 => "Double",
                    _ => return None,
                };
                Some(TypeMirror {
                    target: TargetType::primitive(name),
                    pointed: TargetType::interop(&format!("{name}Var")),
                    marshalling: Marshalling::ByValue,
                    info: TypeInfo::Primitive {
                        size: *size,
                        signed: true,
                        floating: true,
                    },
                })
            }
            TypeRef::Pointer { pointee } => self.pointer_mirror(pointee),
            TypeRef::LValueReference { pointee } | TypeRef::RValueReference { pointee } => {
                let pointee = self.mirror(pointee)?;
                Some(TypeMirror {
                    target: TargetType::generic(
                        Classifier::interop("CPointer"),
                        vec![pointee.pointed.clone()],
                    ),
                    pointed: TargetType::generic(
                        Classifier::interop("CPointerVar"),
                        vec![pointee.pointed],
                    ),
                    marshalling: Marshalling::ByReference,
                    info: TypeInfo::Pointer,
                })
            }
            TypeRef::Record { id } => {
                if let Some(st) = index.get_struct(*id) {
                    let def = st.def.as_ref()?;
                    let classifier = self.classifier(Declaration::Struct(st))?;
                    Some(TypeMirror {
                        target: TargetType::generic(
                            Classifier::interop("CValue"),
                            vec![TargetType::named(classifier.clone())],
                        ),
                        pointed: TargetType::named(classifier),
                        marshalling: Marshalling::ByReference,
                        info: TypeInfo::Struct {
                            size: def.size,
                            align: def.align,
                        },
                    })
                } else if let Some(class) = index.get_class(*id) {
                    let classifier = self.classifier(Declaration::NativeClass(class))?;
                    Some(TypeMirror {
                        target: TargetType::generic(
                            Classifier::interop("CValue"),
                            vec![TargetType::named(classifier.clone())],
                        ),
                        pointed: TargetType::named(classifier),
                        marshalling: Marshalling::ByReference,
                        info: TypeInfo::NativeClass,
                    })
                } else {
                    debug!("record {id} is not in the index");
                    None
                }
            }
            TypeRef::Enum { id } => {
                let decl = index.get_enum(*id)?;
                if decl.is_anonymous() {
                    return self.mirror(&decl.base_type);
                }

                let classifier = self.classifier(Declaration::Enum(decl))?;
                if self.enum_strictness(decl) {
                    Some(TypeMirror {
                        target: TargetType::named(classifier.clone()),
                        pointed: TargetType::named(classifier.nested("Var")),
                        marshalling: Marshalling::ByValue,
                        info: TypeInfo::Enum {
                            classifier,
                            strict: true,
                        },
                    })
                } else {
                    let base = self.mirror(&decl.base_type)?;
                    Some(TypeMirror {
                        target: TargetType::named(classifier.clone()),
                        pointed: TargetType::named(var_classifier(&classifier)),
                        marshalling: Marshalling::ByValue,
                        info: base.info,
                    })
                }
            }
            TypeRef::Typedef { id } => {
                let decl = index.get_typedef(*id)?;
                let aliased = self.mirror(&decl.aliased)?;
                if !self.is_aliased(decl, &aliased) {
                    return Some(aliased);
                }

                let classifier = self.classifier(Declaration::Typedef(decl))?;
                Some(TypeMirror {
                    target: TargetType::named(classifier.clone())
                        .with_nullable(aliased.target.is_nullable()),
                    pointed: TargetType::named(var_classifier(&classifier)),
                    marshalling: aliased.marshalling,
                    info: aliased.info,
                })
            }
            TypeRef::ConstantArray { element, len } => self.array_mirror(element, Some(*len)),
            TypeRef::IncompleteArray { element } => self.array_mirror(element, None),
            TypeRef::ObjCObjectPointer { id } => {
                let classifier = if let Some(class) = index.get_objc_class(*id) {
                    self.classifier(Declaration::ObjCClass(class))?
                } else {
                    let protocol = index.get_objc_protocol(*id)?;
                    self.classifier(Declaration::ObjCProtocol(protocol))?
                };
                Some(objc_mirror(TargetType::named(classifier).nullable()))
            }
            TypeRef::ObjCId => Some(objc_mirror(TargetType::primitive("Any").nullable())),
        }
    }

    fn integral_mirror(&self, size: u32, is_signed: bool) -> Option<TypeMirror> {
        let signed = is_signed || self.platform() == TargetPlatform::Jvm;
        let base = match size {
            1 => "Byte",
            2 => "Short",
            4 => "Int",
            8 => "Long",
            _ => return None,
        };
        let name = if signed {
            base.to_string()
        } else {
            format!("U{base}")
        };

        Some(TypeMirror {
            target: TargetType::primitive(&name),
            pointed: TargetType::interop(&format!("{name}Var")),
            marshalling: Marshalling::ByValue,
            info: TypeInfo::Primitive {
                size,
                signed,
                floating: false,
            },
        })
    }

    fn pointer_mirror(&mut self, pointee: &QualType) -> Option<TypeMirror> {
        // opaque handles: only the by-value use of an undefined struct is unrepresentable
        if let Some(st) = self.forward_struct(pointee) {
            let classifier = self.classifier(Declaration::Struct(st))?;
            return Some(TypeMirror {
                target: TargetType::generic(
                    Classifier::interop("CPointer"),
                    vec![TargetType::named(classifier.clone())],
                )
                .nullable(),
                pointed: TargetType::generic(
                    Classifier::interop("CPointerVar"),
                    vec![TargetType::named(classifier)],
                ),
                marshalling: Marshalling::ByPointer,
                info: TypeInfo::Pointer,
            });
        }

        let argument = match &pointee.type_ref {
            TypeRef::Void => None,
            TypeRef::FunctionProto {
                result,
                args,
                is_variadic,
            } => {
                if *is_variadic {
                    return None;
                }
                let parameters = args
                    .iter()
                    .map(|a| self.mirror(a).map(|m| m.target))
                    .collect::<Option<Vec<_>>>()?;
                let result = if result.type_ref.is_void() {
                    TargetType::unit()
                } else {
                    self.mirror(result)?.target
                };
                Some(TargetType::generic(
                    Classifier::interop("CFunction"),
                    vec![TargetType::Function {
                        parameters,
                        result: Box::new(result),
                    }],
                ))
            }
            _ => Some(self.mirror(pointee)?.pointed),
        };

        let (target, pointed) = match argument {
            Some(arg) => (
                TargetType::generic(Classifier::interop("CPointer"), vec![arg.clone()]),
                TargetType::generic(Classifier::interop("CPointerVar"), vec![arg]),
            ),
            None => (
                TargetType::interop("COpaquePointer"),
                TargetType::interop("COpaquePointerVar"),
            ),
        };

        Some(TypeMirror {
            target: target.nullable(),
            pointed,
            marshalling: Marshalling::ByPointer,
            info: TypeInfo::Pointer,
        })
    }

    fn array_mirror(&mut self, element: &QualType, len: Option<u64>) -> Option<TypeMirror> {
        let element = self.mirror(element)?;
        Some(TypeMirror {
            target: TargetType::generic(
                Classifier::interop("CArrayPointer"),
                vec![element.pointed.clone()],
            )
            .nullable(),
            pointed: TargetType::generic(
                Classifier::interop("CArrayPointerVar"),
                vec![element.pointed],
            ),
            marshalling: Marshalling::ByPointer,
            info: TypeInfo::Array { len },
        })
    }

    /// Does a use of `decl` keep the typedef's own name, rather than the name of what it aliases?
    ///
    /// Records, arrays and references are always used through their underlying type, as is a typedef that just
    /// repeats the name of the record or enum it aliases.
    pub fn is_aliased(&self, decl: &TypedefDecl, aliased: &TypeMirror) -> bool {
        if self.names_itself(decl) || aliased.marshalling == Marshalling::ByReference {
            return false;
        }

        matches!(
            aliased.info,
            TypeInfo::Primitive { .. }
                | TypeInfo::Boolean
                | TypeInfo::Enum { .. }
                | TypeInfo::Pointer
                | TypeInfo::ObjCPointer
                | TypeInfo::String { .. }
        )
    }

    /// Is this `typedef struct S S` (or the same for an enum)?
    pub fn names_itself(&self, decl: &TypedefDecl) -> bool {
        let aliased_name = match &decl.aliased.type_ref {
            TypeRef::Record { id } => self
                .index
                .get_struct(*id)
                .and_then(|s| s.name.as_deref())
                .or_else(|| self.index.get_class(*id).map(|c| c.name.as_str())),
            TypeRef::Enum { id } => self.index.get_enum(*id).and_then(|e| e.name.as_deref()),
            _ => None,
        };

        aliased_name.map(simple_name) == Some(simple_name(&decl.name))
    }

    /// Like [`BuildingContext::mirror`] but failing with [`Error::Unrepresentable`]
    pub fn require_mirror(&mut self, qual_type: &QualType) -> Result<TypeMirror> {
        self.mirror(qual_type)
            .ok_or_else(|| Error::unrepresentable(&qual_type.spelling))
    }

    /// The target type of a function result. `void` becomes `Unit`.
    pub fn result_type(&mut self, qual_type: &QualType) -> Result<TargetType> {
        if qual_type.type_ref.is_void() {
            Ok(TargetType::unit())
        } else {
            Ok(self.require_mirror(qual_type)?.target)
        }
    }

    /// Is `qual_type` a pointer to constant characters that should be passed as a target string?
    pub fn string_kind(&self, qual_type: &QualType) -> Option<StringKind> {
        let pointee = match &qual_type.type_ref {
            TypeRef::Pointer { pointee } => pointee,
            _ => return None,
        };

        if !pointee.is_const {
            return None;
        }

        match pointee.type_ref {
            TypeRef::Char { size: 1, .. } => Some(StringKind::Narrow),
            TypeRef::Char { size: 2, .. } => Some(StringKind::Wide),
            _ => None,
        }
    }

    /// An integer literal of type `qual_type`, if its width is one the target has
    pub fn integral_constant(&self, value: i64, qual_type: &QualType) -> Option<ConstantStub> {
        match self.underlying(qual_type)? {
            TypeRef::Integer { size, is_signed } | TypeRef::Char { size, is_signed }
                if matches!(size, 1 | 2 | 4 | 8) =>
            {
                Some(ConstantStub::Integer {
                    value,
                    size,
                    signed: is_signed || self.platform() == TargetPlatform::Jvm,
                })
            }
            _ => None,
        }
    }

    /// A floating point literal of type `qual_type`, if it is a `float` or a `double`
    pub fn floating_constant(&self, value: f64, qual_type: &QualType) -> Option<ConstantStub> {
        match self.underlying(qual_type)? {
            TypeRef::Float { size } if size == 4 || size == 8 => {
                Some(ConstantStub::Floating { value, size })
            }
            _ => None,
        }
    }

    /// The struct without a definition that `qual_type` names, looking through typedefs
    fn forward_struct(&self, qual_type: &QualType) -> Option<&'a StructDecl> {
        let index = self.index;
        match index.canonical_type(qual_type).type_ref {
            TypeRef::Record { id } => index.get_struct(id).filter(|s| s.is_forward()),
            _ => None,
        }
    }

    /// Strip typedefs and enums down to the primitive underneath
    fn underlying(&self, qual_type: &QualType) -> Option<TypeRef> {
        let mut current = qual_type.type_ref.clone();
        let mut seen = HashSet::new();
        loop {
            let next = match &current {
                TypeRef::Typedef { id } if seen.insert(*id) => {
                    self.index.get_typedef(*id)?.aliased.type_ref.clone()
                }
                TypeRef::Enum { id } if seen.insert(*id) => {
                    self.index.get_enum(*id)?.base_type.type_ref.clone()
                }
                TypeRef::Typedef { .. } | TypeRef::Enum { .. } => return None,
                other => return Some(other.clone()),
            };
            current = next;
        }
    }
}

fn objc_mirror(target: TargetType) -> TypeMirror {
    TypeMirror {
        pointed: TargetType::generic(Classifier::interop("ObjCObjectVar"), vec![target.clone()]),
        target,
        marshalling: Marshalling::ByValue,
        info: TypeInfo::ObjCPointer,
    }
}

/// `Foo` -> `FooVar`, the classifier of native memory holding a typealiased value
pub fn var_classifier(classifier: &Classifier) -> Classifier {
    Classifier::new(classifier.package(), &format!("{}Var", classifier.name()))
}

/// Last component of a qualified native name: `Outer::Inner` -> `Inner`
pub fn simple_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// `name`, or `name0`, `name1`... if it has already been used
pub fn get_unique_name(name: &str, used_names: &mut HashSet<String>) -> String {
    let mut result = name.to_string();

    let mut i = 0;
    while used_names.contains(&result) {
        result = format!("{name}{i}");
        i += 1
    }

    used_names.insert(result.clone());
    result
}

#[cfg(test)]
mod tests {
    use bgn_index::{
        DeclId, EnumConstant, Field, StructDecl, StructDef, TypedefDecl,
    };
    use bgn_util::GeneratorConfig;

    use super::*;

    fn enum_decl(name: Option<&str>, explicit: &[bool]) -> EnumDecl {
        EnumDecl {
            id: DeclId::new(&format!("c:@E@{}", name.unwrap_or("anon"))),
            name: name.map(|n| n.to_string()),
            base_type: QualType::uint(),
            constants: explicit
                .iter()
                .enumerate()
                .map(|(i, e)| EnumConstant {
                    name: format!("C{i}"),
                    value: i as i64,
                    is_explicit: *e,
                })
                .collect(),
        }
    }

    #[test]
    fn strictness_heuristic_and_overrides() {
        let index = DeclarationIndex::new();
        let mut config = GeneratorConfig::default();
        config.non_strict_enums.insert("Forced".to_string());
        config.strict_enums.insert("anon".to_string());
        let mut ctx = GenerationContext::new(config);
        let bc = BuildingContext::new(&index, &mut ctx);

        assert!(bc.enum_strictness(&enum_decl(Some("Color"), &[false, false, false])));
        assert!(!bc.enum_strictness(&enum_decl(Some("Color"), &[false, true, false])));
        assert!(!bc.enum_strictness(&enum_decl(Some("Forced"), &[false, false])));
        assert!(!bc.enum_strictness(&enum_decl(None, &[false])));
    }

    #[test]
    fn unsigned_integers_follow_the_platform() {
        let index = DeclarationIndex::new();

        let mut ctx = GenerationContext::new(GeneratorConfig::default());
        let mut bc = BuildingContext::new(&index, &mut ctx);
        let m = bc.mirror(&QualType::uint()).unwrap();
        assert_eq!(m.target.to_string(), "UInt");
        assert_eq!(m.pointed.to_string(), "UIntVar");

        let mut config = GeneratorConfig::default();
        config.platform = TargetPlatform::Jvm;
        let mut ctx = GenerationContext::new(config);
        let mut bc = BuildingContext::new(&index, &mut ctx);
        let m = bc.mirror(&QualType::uint()).unwrap();
        assert_eq!(m.target.to_string(), "Int");
        assert_eq!(
            m.info,
            TypeInfo::Primitive {
                size: 4,
                signed: true,
                floating: false
            }
        );

        assert!(bc.mirror(&QualType::integer("__int128", 16, true)).is_none());
        assert!(bc
            .mirror(&QualType::new("long double", false, TypeRef::Float { size: 16 }))
            .is_none());
    }

    #[test]
    fn pointers_and_records() {
        let mut index = DeclarationIndex::new();
        let point = DeclId::new("c:@S@Point");
        index.insert_struct(StructDecl {
            id: point,
            name: Some("Point".to_string()),
            def: Some(StructDef {
                size: 8,
                align: 4,
                fields: vec![Field {
                    name: "x".to_string(),
                    qual_type: QualType::int(),
                    offset: 0,
                    bit_width: None,
                }],
                is_union: false,
            }),
        });

        let mut config = GeneratorConfig::default();
        config.package = Some("org.sample".to_string());
        let mut ctx = GenerationContext::new(config);
        let mut bc = BuildingContext::new(&index, &mut ctx);

        let m = bc.mirror(&QualType::record("Point", point)).unwrap();
        assert_eq!(m.target.to_string(), "CValue<Point>");
        assert_eq!(m.marshalling, Marshalling::ByReference);

        let m = bc
            .mirror(&QualType::pointer_to(QualType::record("Point", point)))
            .unwrap();
        assert_eq!(m.target.to_string(), "CPointer<Point>?");
        assert_eq!(m.marshalling, Marshalling::ByPointer);

        let m = bc.mirror(&QualType::pointer_to(QualType::void())).unwrap();
        assert_eq!(m.target.to_string(), "COpaquePointer?");

        let m = bc.mirror(&QualType::reference_to(QualType::int())).unwrap();
        assert_eq!(m.target.to_string(), "CPointer<IntVar>");
        assert_eq!(m.marshalling, Marshalling::ByReference);

        let callback = QualType::new(
            "void (*)(int)",
            false,
            TypeRef::Pointer {
                pointee: Box::new(QualType::new(
                    "void (int)",
                    false,
                    TypeRef::FunctionProto {
                        result: Box::new(QualType::void()),
                        args: vec![QualType::int()],
                        is_variadic: false,
                    },
                )),
            },
        );
        let m = bc.mirror(&callback).unwrap();
        assert_eq!(m.target.to_string(), "CPointer<CFunction<(Int) -> Unit>>?");

        assert!(bc.mirror(&QualType::void()).is_none());
        assert_eq!(bc.result_type(&QualType::void()).unwrap().to_string(), "Unit");
    }

    #[test]
    fn typedefs_alias_primitives_but_not_records() {
        let mut index = DeclarationIndex::new();
        let handle = DeclId::new("c:@T@Handle");
        index.insert_typedef(TypedefDecl {
            id: handle,
            name: "Handle".to_string(),
            aliased: QualType::pointer_to(QualType::void()),
        });
        let point = DeclId::new("c:@S@Point");
        index.insert_struct(StructDecl {
            id: point,
            name: Some("Point".to_string()),
            def: Some(StructDef {
                size: 0,
                align: 1,
                fields: vec![],
                is_union: false,
            }),
        });
        let point_td = DeclId::new("c:@T@Point");
        index.insert_typedef(TypedefDecl {
            id: point_td,
            name: "Point".to_string(),
            aliased: QualType::record("struct Point", point),
        });

        let mut ctx = GenerationContext::new(GeneratorConfig::default());
        let mut bc = BuildingContext::new(&index, &mut ctx);

        let m = bc
            .mirror(&QualType::new("Handle", false, TypeRef::Typedef { id: handle }))
            .unwrap();
        assert_eq!(m.target.to_string(), "Handle?");
        assert_eq!(m.pointed.to_string(), "HandleVar");

        let m = bc
            .mirror(&QualType::new("Point", false, TypeRef::Typedef { id: point_td }))
            .unwrap();
        assert_eq!(m.target.to_string(), "CValue<Point>");
    }

    #[test]
    fn literal_widths() {
        let index = DeclarationIndex::new();
        let mut ctx = GenerationContext::new(GeneratorConfig::default());
        let bc = BuildingContext::new(&index, &mut ctx);

        assert_eq!(
            bc.integral_constant(42, &QualType::int()),
            Some(ConstantStub::Integer {
                value: 42,
                size: 4,
                signed: true
            })
        );
        assert_eq!(
            bc.integral_constant(1, &QualType::integer("__int128", 16, true)),
            None
        );
        assert_eq!(
            bc.floating_constant(0.5, &QualType::float()),
            Some(ConstantStub::Floating {
                value: 0.5,
                size: 4
            })
        );
        assert_eq!(bc.floating_constant(0.5, &QualType::int()), None);
    }

    #[test]
    fn unique_names() {
        let mut used = HashSet::new();
        assert_eq!(get_unique_name("arg", &mut used), "arg");
        assert_eq!(get_unique_name("arg", &mut used), "arg0");
        assert_eq!(get_unique_name("arg", &mut used), "arg1");
    }
}
