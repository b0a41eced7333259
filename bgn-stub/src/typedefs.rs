use bgn_index::{Declaration, TypedefDecl};
use tracing::debug;

use crate::error::Error;
use crate::mapper::{var_classifier, BuildingContext};
use crate::stub::{StubElement, TypeInfo, TypealiasStub};

type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn build_typedef(bc: &mut BuildingContext, decl: &TypedefDecl) -> Result<Vec<StubElement>> {
    if bc.names_itself(decl) {
        debug!("typedef {} just names its own record or enum", decl.name);
        return Ok(Vec::new());
    }

    let mirror = bc.require_mirror(&decl.aliased)?;
    let classifier = bc
        .classifier(Declaration::Typedef(decl))
        .ok_or_else(|| Error::UnresolvedReference(decl.id))?;

    // an alias of a struct names the struct itself, not a copy of it
    let aliasee = match mirror.info {
        TypeInfo::Struct { .. } | TypeInfo::NativeClass => mirror.pointed.clone(),
        _ => mirror.target.clone().with_nullable(false),
    };

    let mut elements = vec![StubElement::Typealias(TypealiasStub {
        id: bc.next_stub_id(),
        alias: classifier.clone(),
        aliasee,
    })];

    if bc.is_aliased(decl, &mirror) {
        elements.push(StubElement::Typealias(TypealiasStub {
            id: bc.next_stub_id(),
            alias: var_classifier(&classifier),
            aliasee: mirror.pointed,
        }));
    }

    Ok(elements)
}
