use bgn_index::GlobalDecl;

use crate::bridge_metadata::{BridgeMetadataBuilder, GetterBridgeInfo, SetterBridgeInfo};
use crate::error::Error;
use crate::mapper::BuildingContext;
use crate::stub::{
    Accessor, PropertyKind, PropertyStub, StubElement, TargetType, TypeInfo, TypeMirror,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Aggregates are read in place, so their property exposes the pointed-to value instead of a copy
pub(crate) fn accessor_type(mirror: &TypeMirror) -> (bool, TargetType) {
    match mirror.info {
        TypeInfo::Struct { .. } | TypeInfo::NativeClass => (true, mirror.pointed.clone()),
        TypeInfo::Array { .. } => (true, mirror.target.clone().with_nullable(false)),
        _ => (false, mirror.target.clone()),
    }
}

/// Build a property reading (and, when mutable, writing) a global through native bridges
pub(crate) fn build_global(
    bc: &mut BuildingContext,
    decl: &GlobalDecl,
    metadata: &mut BridgeMetadataBuilder,
) -> Result<Vec<StubElement>> {
    let mirror = bc.require_mirror(&decl.qual_type)?;
    let id = bc.next_stub_id();

    let (is_aggregate, ty) = accessor_type(&mirror);

    metadata.insert_getter(
        id,
        GetterBridgeInfo {
            native_name: decl.name.clone(),
            native_type: decl.qual_type.clone(),
            type_mirror: mirror.clone(),
            is_aggregate,
        },
    );

    let kind = if decl.qual_type.is_const || is_aggregate {
        PropertyKind::Val {
            getter: Accessor::Bridge,
        }
    } else {
        metadata.insert_setter(
            id,
            SetterBridgeInfo {
                native_name: decl.name.clone(),
                native_type: decl.qual_type.clone(),
                type_mirror: mirror,
            },
        );
        PropertyKind::Var {
            getter: Accessor::Bridge,
            setter: Accessor::Bridge,
        }
    };

    Ok(vec![StubElement::Property(PropertyStub {
        id,
        name: decl.name.clone(),
        ty,
        kind,
        receiver: None,
    })])
}
