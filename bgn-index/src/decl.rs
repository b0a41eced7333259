use serde::{Deserialize, Serialize};

use crate::{id::DeclId, qualtype::QualType};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// May be empty: headers are free to leave parameters unnamed
    #[serde(default)]
    pub name: String,
    pub qual_type: QualType,
}

impl Parameter {
    pub fn new(name: &str, qual_type: QualType) -> Parameter {
        Parameter {
            name: name.to_string(),
            qual_type,
        }
    }
}

/// A free function. `name` may be qualified (`ns::f`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub id: DeclId,
    pub name: String,
    pub result: QualType,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub is_variadic: bool,
}

impl FunctionDecl {
    pub fn new(name: &str, result: QualType, parameters: Vec<Parameter>) -> FunctionDecl {
        FunctionDecl {
            id: DeclId::new(&format!("c:@F@{name}")),
            name: name.to_string(),
            result,
            parameters,
            is_variadic: false,
        }
    }

    pub fn variadic(mut self) -> FunctionDecl {
        self.is_variadic = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub id: DeclId,
    pub name: String,
    pub qual_type: QualType,
}

impl GlobalDecl {
    pub fn new(name: &str, qual_type: QualType) -> GlobalDecl {
        GlobalDecl {
            id: DeclId::new(&format!("c:@{name}")),
            name: name.to_string(),
            qual_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub qual_type: QualType,
    /// Offset from the start of the record, in bits
    pub offset: u64,
    #[serde(default)]
    pub bit_width: Option<u32>,
}

/// Layout and members of a struct that has a definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    pub size: u64,
    pub align: u64,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub is_union: bool,
}

/// A struct or union. `name` is `None` for anonymous records and `def` is `None` for forward declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub id: DeclId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub def: Option<StructDef>,
}

impl StructDecl {
    pub fn is_forward(&self) -> bool {
        self.def.is_none()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    pub value: i64,
    /// Was the value written out in the header, rather than assigned by counting up from the previous constant?
    #[serde(default)]
    pub is_explicit: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub id: DeclId,
    #[serde(default)]
    pub name: Option<String>,
    pub base_type: QualType,
    #[serde(default)]
    pub constants: Vec<EnumConstant>,
}

impl EnumDecl {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedefDecl {
    pub id: DeclId,
    pub name: String,
    pub aliased: QualType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroValue {
    Integer(i64),
    Float(f64),
    String(String),
}

/// A macro whose expansion the indexer evaluated to a literal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacroConstant {
    pub name: String,
    pub qual_type: QualType,
    pub value: MacroValue,
}

/// A macro that expands to an expression with no literal value (e.g. a call or a global lookup). It can only be
/// read through a native getter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WrappedMacro {
    pub name: String,
    pub qual_type: QualType,
}

/// A method of a native C++ class
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub result: QualType,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_variadic: bool,
}

impl MethodDecl {
    pub fn new(name: &str, result: QualType, parameters: Vec<Parameter>) -> MethodDecl {
        MethodDecl {
            name: name.to_string(),
            result,
            parameters,
            is_static: false,
            is_const: false,
            is_variadic: false,
        }
    }

    pub fn static_(mut self) -> MethodDecl {
        self.is_static = true;
        self
    }
}

/// A native C++ class exposing methods. `name` is the qualified name (`ns::Class`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub id: DeclId,
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub is_forward: bool,
}

impl ClassDecl {
    pub fn new(name: &str, methods: Vec<MethodDecl>) -> ClassDecl {
        ClassDecl {
            id: DeclId::new(&format!("c:@S@{}", name.replace("::", "@S@"))),
            name: name.to_string(),
            methods,
            is_forward: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjCMethod {
    pub selector: String,
    pub result: QualType,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub is_class_method: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub is_optional: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjCProperty {
    pub name: String,
    pub qual_type: QualType,
    pub getter: String,
    /// `None` for readonly properties
    #[serde(default)]
    pub setter: Option<String>,
    #[serde(default)]
    pub is_class_property: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjCProtocolDecl {
    pub id: DeclId,
    pub name: String,
    #[serde(default)]
    pub protocols: Vec<DeclId>,
    #[serde(default)]
    pub methods: Vec<ObjCMethod>,
    #[serde(default)]
    pub properties: Vec<ObjCProperty>,
    #[serde(default)]
    pub is_forward: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjCClassDecl {
    pub id: DeclId,
    pub name: String,
    #[serde(default)]
    pub superclass: Option<DeclId>,
    #[serde(default)]
    pub protocols: Vec<DeclId>,
    #[serde(default)]
    pub methods: Vec<ObjCMethod>,
    #[serde(default)]
    pub properties: Vec<ObjCProperty>,
    #[serde(default)]
    pub is_forward: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjCCategoryDecl {
    pub id: DeclId,
    pub name: String,
    pub class: DeclId,
    #[serde(default)]
    pub protocols: Vec<DeclId>,
    #[serde(default)]
    pub methods: Vec<ObjCMethod>,
    #[serde(default)]
    pub properties: Vec<ObjCProperty>,
}

/// The kinds of declaration the index can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Function,
    Global,
    Struct,
    Enum,
    Typedef,
    MacroConstant,
    WrappedMacro,
    ObjCProtocol,
    ObjCClass,
    ObjCCategory,
    NativeClass,
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeclKind::Function => "function",
            DeclKind::Global => "global",
            DeclKind::Struct => "struct",
            DeclKind::Enum => "enum",
            DeclKind::Typedef => "typedef",
            DeclKind::MacroConstant => "macro constant",
            DeclKind::WrappedMacro => "wrapped macro",
            DeclKind::ObjCProtocol => "objc protocol",
            DeclKind::ObjCClass => "objc class",
            DeclKind::ObjCCategory => "objc category",
            DeclKind::NativeClass => "native class",
        };
        write!(f, "{s}")
    }
}

/// A borrowed view of any declaration in the index
#[derive(Clone, Copy, Debug)]
pub enum Declaration<'a> {
    Function(&'a FunctionDecl),
    Global(&'a GlobalDecl),
    Struct(&'a StructDecl),
    Enum(&'a EnumDecl),
    Typedef(&'a TypedefDecl),
    MacroConstant(&'a MacroConstant),
    WrappedMacro(&'a WrappedMacro),
    ObjCProtocol(&'a ObjCProtocolDecl),
    ObjCClass(&'a ObjCClassDecl),
    ObjCCategory(&'a ObjCCategoryDecl),
    NativeClass(&'a ClassDecl),
}

impl<'a> Declaration<'a> {
    pub fn kind(&self) -> DeclKind {
        match self {
            Declaration::Function(_) => DeclKind::Function,
            Declaration::Global(_) => DeclKind::Global,
            Declaration::Struct(_) => DeclKind::Struct,
            Declaration::Enum(_) => DeclKind::Enum,
            Declaration::Typedef(_) => DeclKind::Typedef,
            Declaration::MacroConstant(_) => DeclKind::MacroConstant,
            Declaration::WrappedMacro(_) => DeclKind::WrappedMacro,
            Declaration::ObjCProtocol(_) => DeclKind::ObjCProtocol,
            Declaration::ObjCClass(_) => DeclKind::ObjCClass,
            Declaration::ObjCCategory(_) => DeclKind::ObjCCategory,
            Declaration::NativeClass(_) => DeclKind::NativeClass,
        }
    }

    /// The name used when reporting on this declaration
    pub fn display_name(&self) -> String {
        match self {
            Declaration::Function(f) => f.name.clone(),
            Declaration::Global(g) => g.name.clone(),
            Declaration::Struct(s) => s
                .name
                .clone()
                .unwrap_or_else(|| format!("<anonymous struct {}>", s.id)),
            Declaration::Enum(e) => e
                .name
                .clone()
                .unwrap_or_else(|| format!("<anonymous enum {}>", e.id)),
            Declaration::Typedef(t) => t.name.clone(),
            Declaration::MacroConstant(m) => m.name.clone(),
            Declaration::WrappedMacro(m) => m.name.clone(),
            Declaration::ObjCProtocol(p) => p.name.clone(),
            Declaration::ObjCClass(c) => c.name.clone(),
            Declaration::ObjCCategory(c) => c.name.clone(),
            Declaration::NativeClass(c) => c.name.clone(),
        }
    }
}
