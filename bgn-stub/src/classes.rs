use bgn_index::{ClassDecl, Declaration, MethodDecl};

use crate::error::Error;
use crate::functions::build_parameters;
use crate::mapper::BuildingContext;
use crate::stub::{
    CallKind, ClassKind, ClassStub, FunctionOrigin, FunctionStub, StubElement, TargetType,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Build a native C++ class. Every method is reached through a synthesized wrapper.
pub(crate) fn build_class(bc: &mut BuildingContext, decl: &ClassDecl) -> Result<Vec<StubElement>> {
    let classifier = bc
        .classifier(Declaration::NativeClass(decl))
        .ok_or_else(|| Error::UnresolvedReference(decl.id))?;
    let id = bc.next_stub_id();

    let mut functions = Vec::new();
    for (index, method) in decl.methods.iter().enumerate() {
        let function = build_method(bc, decl, index, method).map_err(|e| {
            Error::FailedToMapMethod {
                name: method.name.clone(),
                source: Box::new(e),
            }
        })?;
        functions.push(function);
    }

    Ok(vec![StubElement::Class(ClassStub {
        id,
        classifier,
        kind: ClassKind::NativeClass,
        supertypes: vec![TargetType::interop("CStructVar")],
        properties: Vec::new(),
        functions,
    })])
}

fn build_method(
    bc: &mut BuildingContext,
    class: &ClassDecl,
    index: usize,
    method: &MethodDecl,
) -> Result<FunctionStub> {
    // a wrapper can't forward a variable argument list
    if method.is_variadic {
        return Err(Error::unsupported(format!(
            "variadic method {}::{}",
            class.name, method.name
        )));
    }

    let id = bc.next_stub_id();
    let parameters = build_parameters(bc, id, &method.parameters, false, None)?;
    let return_type = bc
        .result_type(&method.result)
        .map_err(|e| Error::FailedToMapResult {
            source: Box::new(e),
        })?;

    Ok(FunctionStub {
        id,
        name: method.name.clone(),
        parameters,
        return_type,
        origin: FunctionOrigin::Method {
            owner: class.id,
            index,
        },
        call: CallKind::Bridged,
        receiver: None,
        is_static: method.is_static,
    })
}
