use bgn_index::{
    DeclId, Declaration, ObjCCategoryDecl, ObjCClassDecl, ObjCMethod, ObjCProperty,
    ObjCProtocolDecl,
};

use crate::error::Error;
use crate::functions::build_parameters;
use crate::mapper::BuildingContext;
use crate::stub::{
    Accessor, CallKind, ClassKind, ClassStub, ContainerStub, FunctionOrigin, FunctionStub,
    PropertyKind, PropertyStub, StubContainer, StubElement, TargetType,
};

type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn build_protocol(
    bc: &mut BuildingContext,
    decl: &ObjCProtocolDecl,
) -> Result<Vec<StubElement>> {
    let classifier = bc
        .classifier(Declaration::ObjCProtocol(decl))
        .ok_or_else(|| Error::UnresolvedReference(decl.id))?;
    let id = bc.next_stub_id();

    let mut supertypes = vec![TargetType::interop("ObjCObject")];
    supertypes.extend(protocol_types(bc, &decl.protocols)?);

    let members = build_members(bc, decl.id, &decl.methods, &decl.properties, None)?;

    Ok(vec![StubElement::Class(ClassStub {
        id,
        classifier,
        kind: ClassKind::ObjCProtocol,
        supertypes,
        properties: members.properties,
        functions: members.functions,
    })])
}

pub(crate) fn build_objc_class(
    bc: &mut BuildingContext,
    decl: &ObjCClassDecl,
) -> Result<Vec<StubElement>> {
    let classifier = bc
        .classifier(Declaration::ObjCClass(decl))
        .ok_or_else(|| Error::UnresolvedReference(decl.id))?;
    let id = bc.next_stub_id();

    let mut supertypes = match decl.superclass {
        Some(superclass) => {
            let index = bc.index();
            let superclass = index
                .get_objc_class(superclass)
                .ok_or(Error::UnresolvedReference(superclass))?;
            let superclass = bc
                .classifier(Declaration::ObjCClass(superclass))
                .ok_or(Error::UnresolvedReference(superclass.id))?;
            vec![TargetType::named(superclass)]
        }
        None => vec![TargetType::interop("ObjCObjectBase")],
    };
    supertypes.extend(protocol_types(bc, &decl.protocols)?);

    let members = build_members(bc, decl.id, &decl.methods, &decl.properties, None)?;

    Ok(vec![StubElement::Class(ClassStub {
        id,
        classifier,
        kind: ClassKind::ObjCClass,
        supertypes,
        properties: members.properties,
        functions: members.functions,
    })])
}

/// Build a category as a container of extensions on the class it extends
pub(crate) fn build_category(
    bc: &mut BuildingContext,
    decl: &ObjCCategoryDecl,
) -> Result<Vec<StubElement>> {
    let index = bc.index();
    let class = index
        .get_objc_class(decl.class)
        .ok_or(Error::UnresolvedReference(decl.class))?;
    let classifier = bc
        .classifier(Declaration::ObjCClass(class))
        .ok_or(Error::UnresolvedReference(class.id))?;
    let id = bc.next_stub_id();

    let receiver = TargetType::named(classifier);
    let members = build_members(
        bc,
        decl.id,
        &decl.methods,
        &decl.properties,
        Some(receiver),
    )?;

    Ok(vec![StubElement::Container(ContainerStub {
        id,
        name: format!("{}+{}", class.name, decl.name),
        members,
    })])
}

fn protocol_types(bc: &mut BuildingContext, protocols: &[DeclId]) -> Result<Vec<TargetType>> {
    let index = bc.index();
    let mut result = Vec::new();
    for id in protocols {
        let protocol = index
            .get_objc_protocol(*id)
            .ok_or(Error::UnresolvedReference(*id))?;
        let classifier = bc
            .classifier(Declaration::ObjCProtocol(protocol))
            .ok_or(Error::UnresolvedReference(*id))?;
        result.push(TargetType::named(classifier));
    }
    Ok(result)
}

fn build_members(
    bc: &mut BuildingContext,
    container: DeclId,
    methods: &[ObjCMethod],
    properties: &[ObjCProperty],
    receiver: Option<TargetType>,
) -> Result<StubContainer> {
    let mut members = StubContainer::new();

    for method in methods {
        let function = build_method(bc, container, method, receiver.clone()).map_err(|e| {
            Error::FailedToMapMethod {
                name: method.selector.clone(),
                source: Box::new(e),
            }
        })?;
        members.push(StubElement::Function(function));
    }

    for property in properties {
        let stub = build_property(bc, property, receiver.clone()).map_err(|e| {
            Error::FailedToMapProperty {
                name: property.name.clone(),
                source: Box::new(e),
            }
        })?;
        members.push(StubElement::Property(stub));
    }

    Ok(members)
}

fn build_method(
    bc: &mut BuildingContext,
    container: DeclId,
    method: &ObjCMethod,
    receiver: Option<TargetType>,
) -> Result<FunctionStub> {
    if method.is_variadic {
        return Err(Error::unsupported(format!(
            "variadic method {}",
            method.selector
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
        name: selector_name(&method.selector).to_string(),
        parameters,
        return_type,
        origin: FunctionOrigin::ObjCMethod {
            container,
            selector: method.selector.clone(),
            is_class_method: method.is_class_method,
        },
        call: CallKind::ObjCMessage,
        receiver,
        is_static: method.is_class_method,
    })
}

fn build_property(
    bc: &mut BuildingContext,
    property: &ObjCProperty,
    receiver: Option<TargetType>,
) -> Result<PropertyStub> {
    let mirror = bc.require_mirror(&property.qual_type)?;
    let getter = Accessor::ObjCMessage {
        selector: property.getter.clone(),
    };

    let kind = match &property.setter {
        Some(setter) => PropertyKind::Var {
            getter,
            setter: Accessor::ObjCMessage {
                selector: setter.clone(),
            },
        },
        None => PropertyKind::Val { getter },
    };

    Ok(PropertyStub {
        id: bc.next_stub_id(),
        name: property.name.clone(),
        ty: mirror.target,
        kind,
        receiver,
    })
}

/// `initWithFrame:style:` -> `initWithFrame`
fn selector_name(selector: &str) -> &str {
    selector.split(':').next().unwrap_or(selector)
}
