use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::id::DeclId;

/// The shape of a native type, with the size and signedness facts resolved by the indexer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Void,
    Bool,
    /// A character type. Kept apart from `Integer` so that string parameters can be recognised.
    Char {
        size: u32,
        is_signed: bool,
    },
    Integer {
        size: u32,
        is_signed: bool,
    },
    Float {
        size: u32,
    },
    Pointer {
        pointee: Box<QualType>,
    },
    LValueReference {
        pointee: Box<QualType>,
    },
    RValueReference {
        pointee: Box<QualType>,
    },
    /// A struct, union or C++ class used by value
    Record {
        id: DeclId,
    },
    Enum {
        id: DeclId,
    },
    Typedef {
        id: DeclId,
    },
    ConstantArray {
        element: Box<QualType>,
        len: u64,
    },
    IncompleteArray {
        element: Box<QualType>,
    },
    FunctionProto {
        result: Box<QualType>,
        args: Vec<QualType>,
        is_variadic: bool,
    },
    #[serde(rename = "objc_object_pointer")]
    ObjCObjectPointer {
        id: DeclId,
    },
    #[serde(rename = "objc_id")]
    ObjCId,
    /// Anything the indexer could not classify (vectors, complex numbers, member pointers...)
    Unsupported {
        description: String,
    },
}

impl TypeRef {
    /// Is this a reference of either flavour?
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            TypeRef::LValueReference { .. } | TypeRef::RValueReference { .. }
        )
    }

    pub fn is_record(&self) -> bool {
        matches!(self, TypeRef::Record { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            TypeRef::ConstantArray { .. } | TypeRef::IncompleteArray { .. }
        )
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }
}

/// A native type as written in the header: its exact spelling, constness and resolved shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualType {
    pub spelling: String,
    #[serde(default)]
    pub is_const: bool,
    pub type_ref: TypeRef,
}

impl QualType {
    pub fn new(spelling: &str, is_const: bool, type_ref: TypeRef) -> QualType {
        QualType {
            spelling: spelling.to_string(),
            is_const,
            type_ref,
        }
    }

    pub fn void() -> QualType {
        QualType::new("void", false, TypeRef::Void)
    }

    pub fn bool() -> QualType {
        QualType::new("bool", false, TypeRef::Bool)
    }

    pub fn char() -> QualType {
        QualType::new(
            "char",
            false,
            TypeRef::Char {
                size: 1,
                is_signed: true,
            },
        )
    }

    pub fn int() -> QualType {
        QualType::integer("int", 4, true)
    }

    pub fn uint() -> QualType {
        QualType::integer("unsigned int", 4, false)
    }

    pub fn integer(spelling: &str, size: u32, is_signed: bool) -> QualType {
        QualType::new(spelling, false, TypeRef::Integer { size, is_signed })
    }

    pub fn float() -> QualType {
        QualType::new("float", false, TypeRef::Float { size: 4 })
    }

    pub fn double() -> QualType {
        QualType::new("double", false, TypeRef::Float { size: 8 })
    }

    /// A pointer to `pointee`, spelled the way clang would print it
    pub fn pointer_to(pointee: QualType) -> QualType {
        QualType {
            spelling: format!("{} *", pointee.spelling),
            is_const: false,
            type_ref: TypeRef::Pointer {
                pointee: Box::new(pointee),
            },
        }
    }

    pub fn reference_to(pointee: QualType) -> QualType {
        QualType {
            spelling: format!("{} &", pointee.spelling),
            is_const: false,
            type_ref: TypeRef::LValueReference {
                pointee: Box::new(pointee),
            },
        }
    }

    pub fn record(spelling: &str, id: DeclId) -> QualType {
        QualType::new(spelling, false, TypeRef::Record { id })
    }

    pub fn constant(mut self) -> QualType {
        if !self.is_const {
            self.is_const = true;
            self.spelling = format!("const {}", self.spelling);
        }
        self
    }

    /// The pointee of a pointer or reference
    pub fn pointee(&self) -> Option<&QualType> {
        match &self.type_ref {
            TypeRef::Pointer { pointee }
            | TypeRef::LValueReference { pointee }
            | TypeRef::RValueReference { pointee } => Some(pointee),
            _ => None,
        }
    }
}

impl Display for QualType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.spelling)
    }
}
