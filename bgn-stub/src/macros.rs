use bgn_index::{MacroConstant, MacroValue, WrappedMacro};
use tracing::debug;

use crate::bridge_metadata::{BridgeMetadataBuilder, GetterBridgeInfo};
use crate::error::Error;
use crate::globals::accessor_type;
use crate::mapper::BuildingContext;
use crate::stub::{Accessor, ConstantStub, PropertyKind, PropertyStub, StubElement, TargetType};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Build a constant property from a macro the indexer evaluated. Values the target cannot hold produce nothing.
pub(crate) fn build_macro_constant(
    bc: &mut BuildingContext,
    decl: &MacroConstant,
) -> Result<Vec<StubElement>> {
    let (ty, constant) = match &decl.value {
        MacroValue::String(s) => (TargetType::string(), ConstantStub::String(s.clone())),
        value => {
            let constant = match value {
                MacroValue::Integer(v) => bc.integral_constant(*v, &decl.qual_type),
                MacroValue::Float(v) => bc.floating_constant(*v, &decl.qual_type),
                MacroValue::String(_) => None,
            };
            match (constant, bc.mirror(&decl.qual_type)) {
                (Some(constant), Some(mirror)) => (mirror.target, constant),
                _ => {
                    debug!(
                        "macro {} of type \"{}\" has no target representation",
                        decl.name, decl.qual_type
                    );
                    return Ok(Vec::new());
                }
            }
        }
    };

    Ok(vec![StubElement::Property(PropertyStub {
        id: bc.next_stub_id(),
        name: decl.name.clone(),
        ty,
        kind: PropertyKind::Constant(constant),
        receiver: None,
    })])
}

/// Build a read-only property whose value comes from a native getter evaluating the macro
pub(crate) fn build_wrapped_macro(
    bc: &mut BuildingContext,
    decl: &WrappedMacro,
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
            type_mirror: mirror,
            is_aggregate,
        },
    );

    Ok(vec![StubElement::Property(PropertyStub {
        id,
        name: decl.name.clone(),
        ty,
        kind: PropertyKind::Val {
            getter: Accessor::Bridge,
        },
        receiver: None,
    })])
}
