use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// Identity of a native declaration, stable for the duration of one run.
///
/// The indexer hands these out (typically the clang USR of the declaration) and every cross-reference between
/// declarations goes through them.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DeclId(Ustr);

impl DeclId {
    pub fn new(s: &str) -> DeclId {
        DeclId(Ustr::from(s))
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_str().is_empty()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for DeclId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for DeclId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<DeclId> for Ustr {
    fn from(u: DeclId) -> Self {
        u.0
    }
}

impl AsRef<Ustr> for DeclId {
    fn as_ref(&self) -> &Ustr {
        &self.0
    }
}

impl From<String> for DeclId {
    fn from(s: String) -> Self {
        DeclId::new(&s)
    }
}

impl From<DeclId> for String {
    fn from(id: DeclId) -> Self {
        id.as_str().to_string()
    }
}
