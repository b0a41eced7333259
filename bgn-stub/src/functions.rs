use bgn_index::{FunctionDecl, Parameter};
use hashbrown::HashSet;

use crate::bridge_metadata::{BridgeMetadataBuilder, ParameterKey};
use crate::error::Error;
use crate::mapper::{get_unique_name, simple_name, BuildingContext, StringKind};
use crate::stub::{
    CallKind, FunctionOrigin, FunctionStub, ParameterStub, StubElement, StubId, TargetType,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Name of the trailing parameter collecting a variadic function's extra arguments
pub const VARIADIC_PARAMETER: &str = "variadicArguments";

pub(crate) fn build_function(
    bc: &mut BuildingContext,
    decl: &FunctionDecl,
    metadata: &mut BridgeMetadataBuilder,
) -> Result<Vec<StubElement>> {
    let id = bc.next_stub_id();
    let parameters =
        build_parameters(bc, id, &decl.parameters, decl.is_variadic, Some(metadata))?;
    let return_type = bc
        .result_type(&decl.result)
        .map_err(|e| Error::FailedToMapResult {
            source: Box::new(e),
        })?;

    // qualified names can't be linked against directly, and variadic calls need their symbol bound by the bridge
    let call = if decl.name.contains("::") || decl.is_variadic {
        CallKind::Bridged
    } else {
        CallKind::Direct {
            symbol: decl.name.clone(),
        }
    };

    Ok(vec![StubElement::Function(FunctionStub {
        id,
        name: simple_name(&decl.name).to_string(),
        parameters,
        return_type,
        origin: FunctionOrigin::Native { decl: decl.id },
        call,
        receiver: None,
        is_static: false,
    })])
}

/// Map the parameters of the function stub `function`.
///
/// Unnamed parameters are called `argN`. When `metadata` is given, constant character pointers become target
/// strings and are recorded there.
pub(crate) fn build_parameters(
    bc: &mut BuildingContext,
    function: StubId,
    parameters: &[Parameter],
    is_variadic: bool,
    mut metadata: Option<&mut BridgeMetadataBuilder>,
) -> Result<Vec<ParameterStub>> {
    let mut used_names = HashSet::new();
    let mut result = Vec::new();

    for (i, parameter) in parameters.iter().enumerate() {
        let name = if parameter.name.is_empty() {
            format!("arg{i}")
        } else {
            parameter.name.clone()
        };
        let name = get_unique_name(&name, &mut used_names);

        let string_kind = if metadata.is_some() {
            bc.string_kind(&parameter.qual_type)
        } else {
            None
        };

        let ty = match (string_kind, metadata.as_deref_mut()) {
            (Some(kind), Some(metadata)) => {
                let key = ParameterKey::new(function, i);
                match kind {
                    StringKind::Narrow => metadata.mark_narrow_string(key),
                    StringKind::Wide => metadata.mark_wide_string(key),
                }
                TargetType::string().nullable()
            }
            _ => {
                bc.require_mirror(&parameter.qual_type)
                    .map_err(|e| Error::FailedToMapParameter {
                        name: name.clone(),
                        source: Box::new(e),
                    })?
                    .target
            }
        };

        result.push(ParameterStub {
            name,
            ty,
            is_vararg: false,
        });
    }

    if is_variadic {
        result.push(ParameterStub {
            name: get_unique_name(VARIADIC_PARAMETER, &mut used_names),
            ty: TargetType::primitive("Any").nullable(),
            is_vararg: true,
        });
    }

    Ok(result)
}
