use bgn_index::{Declaration, EnumDecl, QualType, TypeRef};

use crate::bridge_metadata::BridgeMetadataBuilder;
use crate::error::Error;
use crate::mapper::{var_classifier, BuildingContext};
use crate::stub::{
    ClassKind, ClassStub, EnumEntryStub, PropertyKind, PropertyStub, StubElement, TargetType,
    TypealiasStub,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Build an enum.
///
/// Strict enums become a closed enum class. Other named enums become a typealias of their base type with one
/// constant per enumerator, and anonymous enums are just the constants.
pub(crate) fn build_enum(
    bc: &mut BuildingContext,
    decl: &EnumDecl,
    metadata: &mut BridgeMetadataBuilder,
) -> Result<Vec<StubElement>> {
    let base = bc.require_mirror(&decl.base_type)?;
    let strict = bc.enum_strictness(decl);

    let mut constants = Vec::new();
    for constant in &decl.constants {
        let value = bc
            .integral_constant(constant.value, &decl.base_type)
            .ok_or_else(|| Error::unrepresentable(&decl.base_type.spelling))?;
        constants.push((constant.name.clone(), value));
    }

    let classifier = match bc.classifier(Declaration::Enum(decl)) {
        Some(classifier) => classifier,
        None => {
            let mut elements = Vec::new();
            for (name, constant) in constants {
                elements.push(StubElement::Property(PropertyStub {
                    id: bc.next_stub_id(),
                    name,
                    ty: base.target.clone(),
                    kind: PropertyKind::Constant(constant),
                    receiver: None,
                }));
            }
            return Ok(elements);
        }
    };

    if let Some(name) = &decl.name {
        bc.context_mut().record_enum(name, strict);
    }

    if strict {
        let id = bc.next_stub_id();
        let mirror = bc.require_mirror(&QualType::new(
            classifier.name(),
            false,
            TypeRef::Enum { id: decl.id },
        ))?;
        metadata.insert_enum_mirror(id, mirror);

        let entries = constants
            .into_iter()
            .map(|(name, constant)| EnumEntryStub { name, constant })
            .collect();

        Ok(vec![StubElement::Class(ClassStub {
            id,
            classifier,
            kind: ClassKind::Enum {
                entries,
                base: base.target,
            },
            supertypes: vec![TargetType::interop("CEnum")],
            properties: Vec::new(),
            functions: Vec::new(),
        })])
    } else {
        let mut elements = vec![
            StubElement::Typealias(TypealiasStub {
                id: bc.next_stub_id(),
                alias: classifier.clone(),
                aliasee: base.target,
            }),
            StubElement::Typealias(TypealiasStub {
                id: bc.next_stub_id(),
                alias: var_classifier(&classifier),
                aliasee: base.pointed,
            }),
        ];

        for (name, constant) in constants {
            elements.push(StubElement::Property(PropertyStub {
                id: bc.next_stub_id(),
                name,
                ty: TargetType::named(classifier.clone()),
                kind: PropertyKind::Constant(constant),
                receiver: None,
            }));
        }

        Ok(elements)
    }
}
