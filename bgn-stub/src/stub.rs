//! The stub tree: target-language declarations produced from native ones.
//!
//! Every element carries a [`StubId`] that is unique within the run. Side information that does not fit in the
//! tree itself (how to bridge a global, how to marshal a string parameter) is keyed by those ids in
//! [`crate::bridge_metadata::BridgeMetadata`].

use std::fmt::Display;

use bgn_index::DeclId;

/// Package holding the target language's primitive types
pub const PRIMITIVES_PACKAGE: &str = "kotlin";
/// Package holding the interop runtime types (pointers, vars, values)
pub const INTEROP_PACKAGE: &str = "kotlinx.cinterop";

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StubId(u64);

impl StubId {
    pub fn new(id: u64) -> StubId {
        StubId(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for StubId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A qualified target-language name
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Classifier {
    package: String,
    /// Simple name. Nested classifiers join their path with `.`, e.g. `Color.Var`.
    name: String,
}

impl Classifier {
    pub fn new(package: &str, name: &str) -> Classifier {
        Classifier {
            package: package.to_string(),
            name: name.to_string(),
        }
    }

    pub fn primitive(name: &str) -> Classifier {
        Classifier::new(PRIMITIVES_PACKAGE, name)
    }

    pub fn interop(name: &str) -> Classifier {
        Classifier::new(INTEROP_PACKAGE, name)
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The classifier for `name` declared inside this one
    pub fn nested(&self, name: &str) -> Classifier {
        Classifier {
            package: self.package.clone(),
            name: format!("{}.{name}", self.name),
        }
    }

    pub fn fq_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

impl Display for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fq_name())
    }
}

/// A reference to a target-language type
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TargetType {
    Named {
        classifier: Classifier,
        arguments: Vec<TargetType>,
        nullable: bool,
    },
    Function {
        parameters: Vec<TargetType>,
        result: Box<TargetType>,
    },
    /// Star projection, `*`
    Star,
}

impl TargetType {
    pub fn named(classifier: Classifier) -> TargetType {
        TargetType::Named {
            classifier,
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(classifier: Classifier, arguments: Vec<TargetType>) -> TargetType {
        TargetType::Named {
            classifier,
            arguments,
            nullable: false,
        }
    }

    pub fn primitive(name: &str) -> TargetType {
        TargetType::named(Classifier::primitive(name))
    }

    pub fn interop(name: &str) -> TargetType {
        TargetType::named(Classifier::interop(name))
    }

    pub fn unit() -> TargetType {
        TargetType::primitive("Unit")
    }

    pub fn string() -> TargetType {
        TargetType::primitive("String")
    }

    pub fn with_nullable(self, nullable: bool) -> TargetType {
        match self {
            TargetType::Named {
                classifier,
                arguments,
                ..
            } => TargetType::Named {
                classifier,
                arguments,
                nullable,
            },
            other => other,
        }
    }

    pub fn nullable(self) -> TargetType {
        self.with_nullable(true)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TargetType::Named { nullable: true, .. })
    }

    pub fn classifier(&self) -> Option<&Classifier> {
        match self {
            TargetType::Named { classifier, .. } => Some(classifier),
            _ => None,
        }
    }

    /// Render the type, with either fully-qualified or simple classifier names
    pub fn render(&self, qualified: bool) -> String {
        match self {
            TargetType::Named {
                classifier,
                arguments,
                nullable,
            } => {
                let mut s = if qualified {
                    classifier.fq_name()
                } else {
                    classifier.name().to_string()
                };
                if !arguments.is_empty() {
                    let args = arguments
                        .iter()
                        .map(|a| a.render(qualified))
                        .collect::<Vec<_>>();
                    s = format!("{s}<{}>", args.join(", "));
                }
                if *nullable {
                    s.push('?');
                }
                s
            }
            TargetType::Function { parameters, result } => {
                let params = parameters
                    .iter()
                    .map(|p| p.render(qualified))
                    .collect::<Vec<_>>();
                format!("({}) -> {}", params.join(", "), result.render(qualified))
            }
            TargetType::Star => "*".to_string(),
        }
    }
}

impl Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

/// How a value of a native type crosses the boundary
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Marshalling {
    /// Copied as a plain value (primitives, enums, object references)
    ByValue,
    /// Passed as a reference to native memory holding the value (records by value, C++ references)
    ByReference,
    /// Passed as a raw pointer (pointers, arrays)
    ByPointer,
}

/// What the mapper learned about a native type while choosing its representation
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeInfo {
    /// Integral or floating primitive, with the signedness chosen by the platform's policy
    Primitive { size: u32, signed: bool, floating: bool },
    Boolean,
    Enum { classifier: Classifier, strict: bool },
    Pointer,
    ObjCPointer,
    Struct { size: u64, align: u64 },
    /// A native C++ class used by value. Its layout is opaque.
    NativeClass,
    Array { len: Option<u64> },
    String { wide: bool },
}

/// The target representation chosen for one native type
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeMirror {
    /// Type of a value of this type on the target side
    pub target: TargetType,
    /// Type of the native memory holding such a value (`IntVar`, the struct class, ...)
    pub pointed: TargetType,
    pub marshalling: Marshalling,
    pub info: TypeInfo,
}

/// A literal value the target can embed directly
#[derive(Clone, PartialEq, Debug)]
pub enum ConstantStub {
    Integer { value: i64, size: u32, signed: bool },
    Floating { value: f64, size: u32 },
    String(String),
}

impl Display for ConstantStub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantStub::Integer { value, signed, .. } => {
                if *signed {
                    write!(f, "{value}")
                } else {
                    write!(f, "{}u", *value as u64)
                }
            }
            ConstantStub::Floating { value, size } => {
                if *size == 4 {
                    write!(f, "{value:?}f")
                } else {
                    write!(f, "{value:?}")
                }
            }
            ConstantStub::String(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct EnumEntryStub {
    pub name: String,
    pub constant: ConstantStub,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ClassKind {
    Struct { size: u64, align: u64, is_union: bool },
    /// A struct with no definition in the index; only usable through pointers
    ForwardStruct,
    Enum { entries: Vec<EnumEntryStub>, base: TargetType },
    NativeClass,
    ObjCClass,
    ObjCProtocol,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassStub {
    pub id: StubId,
    pub classifier: Classifier,
    pub kind: ClassKind,
    pub supertypes: Vec<TargetType>,
    pub properties: Vec<PropertyStub>,
    pub functions: Vec<FunctionStub>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ParameterStub {
    pub name: String,
    pub ty: TargetType,
    pub is_vararg: bool,
}

/// The native entity a function stub calls
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FunctionOrigin {
    Native { decl: DeclId },
    /// Method number `index` of the native class `owner`
    Method { owner: DeclId, index: usize },
    ObjCMethod {
        container: DeclId,
        selector: String,
        is_class_method: bool,
    },
}

/// How the target side reaches the native function
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CallKind {
    /// The native symbol is directly addressable under this name
    Direct { symbol: String },
    /// The function needs a bridge: a synthesized wrapper or a symbol alias
    Bridged,
    /// Dispatched through the Objective-C runtime
    ObjCMessage,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FunctionStub {
    pub id: StubId,
    pub name: String,
    pub parameters: Vec<ParameterStub>,
    pub return_type: TargetType,
    pub origin: FunctionOrigin,
    pub call: CallKind,
    /// Extension receiver, for members contributed by Objective-C categories
    pub receiver: Option<TargetType>,
    pub is_static: bool,
}

impl FunctionStub {
    pub fn is_vararg(&self) -> bool {
        self.parameters.iter().any(|p| p.is_vararg)
    }
}

/// How a property reads or writes its native storage
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Accessor {
    /// Through a native bridge recorded in the bridge metadata
    Bridge,
    /// A struct member at a byte offset
    MemberAt { offset: u64 },
    /// A bit field, offset and width in bits
    BitField { offset: u64, width: u32 },
    ObjCMessage { selector: String },
}

#[derive(Clone, PartialEq, Debug)]
pub enum PropertyKind {
    Val { getter: Accessor },
    Var { getter: Accessor, setter: Accessor },
    Constant(ConstantStub),
}

#[derive(Clone, PartialEq, Debug)]
pub struct PropertyStub {
    pub id: StubId,
    pub name: String,
    pub ty: TargetType,
    pub kind: PropertyKind,
    pub receiver: Option<TargetType>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TypealiasStub {
    pub id: StubId,
    pub alias: Classifier,
    pub aliasee: TargetType,
}

/// A named group of stubs, e.g. the members an Objective-C category adds to a class
#[derive(Clone, PartialEq, Debug)]
pub struct ContainerStub {
    pub id: StubId,
    pub name: String,
    pub members: StubContainer,
}

/// Anything a per-declaration builder can produce
#[derive(Clone, PartialEq, Debug)]
pub enum StubElement {
    Class(ClassStub),
    Function(FunctionStub),
    Property(PropertyStub),
    Typealias(TypealiasStub),
    Container(ContainerStub),
}

impl StubElement {
    pub fn id(&self) -> StubId {
        match self {
            StubElement::Class(c) => c.id,
            StubElement::Function(f) => f.id,
            StubElement::Property(p) => p.id,
            StubElement::Typealias(t) => t.id,
            StubElement::Container(c) => c.id,
        }
    }
}

/// Tree of produced stubs, one list per element kind
#[derive(Clone, PartialEq, Debug, Default)]
pub struct StubContainer {
    pub classes: Vec<ClassStub>,
    pub functions: Vec<FunctionStub>,
    pub properties: Vec<PropertyStub>,
    pub typealiases: Vec<TypealiasStub>,
    pub containers: Vec<ContainerStub>,
}

impl StubContainer {
    pub fn new() -> StubContainer {
        StubContainer::default()
    }

    /// Route `element` into the list for its kind
    pub fn push(&mut self, element: StubElement) {
        match element {
            StubElement::Class(c) => self.classes.push(c),
            StubElement::Function(f) => self.functions.push(f),
            StubElement::Property(p) => self.properties.push(p),
            StubElement::Typealias(t) => self.typealiases.push(t),
            StubElement::Container(c) => self.containers.push(c),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.functions.is_empty()
            && self.properties.is_empty()
            && self.typealiases.is_empty()
            && self.containers.is_empty()
    }

    /// Ids of every stub in the tree, including class members and nested containers
    pub fn ids(&self) -> Vec<StubId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<StubId>) {
        for class in &self.classes {
            ids.push(class.id);
            ids.extend(class.properties.iter().map(|p| p.id));
            ids.extend(class.functions.iter().map(|f| f.id));
        }
        ids.extend(self.functions.iter().map(|f| f.id));
        ids.extend(self.properties.iter().map(|p| p.id));
        ids.extend(self.typealiases.iter().map(|t| t.id));
        for container in &self.containers {
            ids.push(container.id);
            container.members.collect_ids(ids);
        }
    }

    /// Every function stub in the tree, members and nested containers included, in tree order
    pub fn all_functions(&self) -> Vec<&FunctionStub> {
        let mut result = Vec::new();
        for class in &self.classes {
            result.extend(class.functions.iter());
        }
        result.extend(self.functions.iter());
        for container in &self.containers {
            result.extend(container.members.all_functions());
        }
        result
    }

    /// Every property stub in the tree, members and nested containers included, in tree order
    pub fn all_properties(&self) -> Vec<&PropertyStub> {
        let mut result = Vec::new();
        for class in &self.classes {
            result.extend(class.properties.iter());
        }
        result.extend(self.properties.iter());
        for container in &self.containers {
            result.extend(container.members.all_properties());
        }
        result
    }

    /// Append every list of `other` onto this container
    pub fn extend(&mut self, other: StubContainer) {
        self.classes.extend(other.classes);
        self.functions.extend(other.functions);
        self.properties.extend(other.properties);
        self.typealiases.extend(other.typealiases);
        self.containers.extend(other.containers);
    }
}
