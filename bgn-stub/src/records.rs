use bgn_index::{Declaration, Field, StructDecl, TypeRef};
use tracing::{debug, warn};

use crate::error::Error;
use crate::mapper::BuildingContext;
use crate::stub::{
    Accessor, ClassKind, ClassStub, PropertyKind, PropertyStub, StubElement, TargetType, TypeInfo,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Build the class stub for a struct or union
pub(crate) fn build_struct(bc: &mut BuildingContext, decl: &StructDecl) -> Result<Vec<StubElement>> {
    let classifier = bc
        .classifier(Declaration::Struct(decl))
        .ok_or_else(|| Error::UnresolvedReference(decl.id))?;
    let id = bc.next_stub_id();

    let def = match &decl.def {
        Some(def) => def,
        None => {
            debug!("{} is forward-declared", classifier);
            return Ok(vec![StubElement::Class(ClassStub {
                id,
                classifier,
                kind: ClassKind::ForwardStruct,
                supertypes: vec![TargetType::interop("COpaque")],
                properties: Vec::new(),
                functions: Vec::new(),
            })]);
        }
    };

    let mut properties = Vec::new();
    for field in &def.fields {
        if field.name.is_empty() {
            debug!("skipping unnamed field of {classifier}");
            continue;
        }

        match build_field(bc, field) {
            Some(property) => properties.push(property),
            None => warn!(
                "field {}::{} of type \"{}\" cannot be represented and is skipped",
                classifier.name(),
                field.name,
                field.qual_type
            ),
        }
    }

    Ok(vec![StubElement::Class(ClassStub {
        id,
        classifier,
        kind: ClassKind::Struct {
            size: def.size,
            align: def.align,
            is_union: def.is_union,
        },
        supertypes: vec![TargetType::interop("CStructVar")],
        properties,
        functions: Vec::new(),
    })])
}

fn build_field(bc: &mut BuildingContext, field: &Field) -> Option<PropertyStub> {
    let mirror = bc.mirror(&field.qual_type)?;

    let accessor = match field.bit_width {
        Some(width) => {
            if !matches!(mirror.info, TypeInfo::Primitive { .. } | TypeInfo::Boolean)
                && !matches!(field.qual_type.type_ref, TypeRef::Enum { .. })
            {
                return None;
            }
            Accessor::BitField {
                offset: field.offset,
                width,
            }
        }
        None => Accessor::MemberAt {
            offset: field.offset / 8,
        },
    };

    // nested records are exposed as the memory they occupy rather than as a copy
    let (ty, kind) = match mirror.info {
        TypeInfo::Struct { .. } | TypeInfo::NativeClass => {
            (mirror.pointed, PropertyKind::Val { getter: accessor })
        }
        TypeInfo::Array { .. } => (
            mirror.target.with_nullable(false),
            PropertyKind::Val { getter: accessor },
        ),
        _ if field.qual_type.is_const => (mirror.target, PropertyKind::Val { getter: accessor }),
        _ => (
            mirror.target,
            PropertyKind::Var {
                getter: accessor.clone(),
                setter: accessor,
            },
        ),
    };

    Some(PropertyStub {
        id: bc.next_stub_id(),
        name: field.name.clone(),
        ty,
        kind,
        receiver: None,
    })
}
