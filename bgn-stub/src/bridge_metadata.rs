//! Side tables recording how stubs reach native code.
//!
//! Builders fill a [`BridgeMetadataBuilder`]; once the stub tree is complete the builder is consumed by
//! [`BridgeMetadataBuilder::finalize`] and everything downstream reads the immutable [`BridgeMetadata`].
use std::collections::{BTreeMap, BTreeSet};

use bgn_index::QualType;

use crate::stub::{StubId, TypeMirror};

/// How to read a global (or a wrapped macro) through a native getter
#[derive(Clone, Debug, PartialEq)]
pub struct GetterBridgeInfo {
    /// Native expression the getter returns, usually just the global's name
    pub native_name: String,
    pub native_type: QualType,
    pub type_mirror: TypeMirror,
    /// Arrays and records are returned by address rather than by value
    pub is_aggregate: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetterBridgeInfo {
    pub native_name: String,
    pub native_type: QualType,
    pub type_mirror: TypeMirror,
}

/// A parameter of a function stub
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterKey {
    pub function: StubId,
    pub index: usize,
}

impl ParameterKey {
    pub fn new(function: StubId, index: usize) -> ParameterKey {
        ParameterKey { function, index }
    }
}

/// Mutable bridge metadata, filled while stubs are built
#[derive(Clone, Debug, Default)]
pub struct BridgeMetadataBuilder {
    getters: BTreeMap<StubId, GetterBridgeInfo>,
    setters: BTreeMap<StubId, SetterBridgeInfo>,
    enum_mirrors: BTreeMap<StubId, TypeMirror>,
    narrow_strings: BTreeSet<ParameterKey>,
    wide_strings: BTreeSet<ParameterKey>,
}

impl BridgeMetadataBuilder {
    pub fn new() -> BridgeMetadataBuilder {
        BridgeMetadataBuilder::default()
    }

    pub fn insert_getter(&mut self, property: StubId, info: GetterBridgeInfo) {
        self.getters.insert(property, info);
    }

    pub fn insert_setter(&mut self, property: StubId, info: SetterBridgeInfo) {
        self.setters.insert(property, info);
    }

    pub fn insert_enum_mirror(&mut self, class: StubId, mirror: TypeMirror) {
        self.enum_mirrors.insert(class, mirror);
    }

    /// Mark a parameter as taking a `const char*` string. A parameter is never both narrow and wide.
    pub fn mark_narrow_string(&mut self, key: ParameterKey) {
        self.wide_strings.remove(&key);
        self.narrow_strings.insert(key);
    }

    /// Mark a parameter as taking a 16-bit character string
    pub fn mark_wide_string(&mut self, key: ParameterKey) {
        self.narrow_strings.remove(&key);
        self.wide_strings.insert(key);
    }

    /// Move every entry of `other` into this table. Entries of `other` win on collision.
    pub fn merge(&mut self, other: BridgeMetadataBuilder) {
        self.getters.extend(other.getters);
        self.setters.extend(other.setters);
        self.enum_mirrors.extend(other.enum_mirrors);
        for key in other.narrow_strings {
            self.mark_narrow_string(key);
        }
        for key in other.wide_strings {
            self.mark_wide_string(key);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.getters.is_empty()
            && self.setters.is_empty()
            && self.enum_mirrors.is_empty()
            && self.narrow_strings.is_empty()
            && self.wide_strings.is_empty()
    }

    /// Freeze the tables
    pub fn finalize(self) -> BridgeMetadata {
        BridgeMetadata {
            getters: self.getters,
            setters: self.setters,
            enum_mirrors: self.enum_mirrors,
            narrow_strings: self.narrow_strings,
            wide_strings: self.wide_strings,
        }
    }
}

/// Read-only snapshot of the bridge metadata of one build
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BridgeMetadata {
    getters: BTreeMap<StubId, GetterBridgeInfo>,
    setters: BTreeMap<StubId, SetterBridgeInfo>,
    enum_mirrors: BTreeMap<StubId, TypeMirror>,
    narrow_strings: BTreeSet<ParameterKey>,
    wide_strings: BTreeSet<ParameterKey>,
}

impl BridgeMetadata {
    pub fn getter(&self, property: StubId) -> Option<&GetterBridgeInfo> {
        self.getters.get(&property)
    }

    pub fn setter(&self, property: StubId) -> Option<&SetterBridgeInfo> {
        self.setters.get(&property)
    }

    pub fn enum_mirror(&self, class: StubId) -> Option<&TypeMirror> {
        self.enum_mirrors.get(&class)
    }

    pub fn getters(&self) -> impl Iterator<Item = (&StubId, &GetterBridgeInfo)> {
        self.getters.iter()
    }

    pub fn setters(&self) -> impl Iterator<Item = (&StubId, &SetterBridgeInfo)> {
        self.setters.iter()
    }

    pub fn is_narrow_string(&self, key: ParameterKey) -> bool {
        self.narrow_strings.contains(&key)
    }

    pub fn is_wide_string(&self, key: ParameterKey) -> bool {
        self.wide_strings.contains(&key)
    }

    /// Every stub some entry refers to
    pub fn referenced_stubs(&self) -> BTreeSet<StubId> {
        self.getters
            .keys()
            .chain(self.setters.keys())
            .chain(self.enum_mirrors.keys())
            .copied()
            .chain(self.narrow_strings.iter().map(|k| k.function))
            .chain(self.wide_strings.iter().map(|k| k.function))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{Marshalling, TargetType, TypeInfo};

    fn int_mirror() -> TypeMirror {
        TypeMirror {
            target: TargetType::primitive("Int"),
            pointed: TargetType::interop("IntVar"),
            marshalling: Marshalling::ByValue,
            info: TypeInfo::Primitive {
                size: 4,
                signed: true,
                floating: false,
            },
        }
    }

    fn getter(name: &str) -> GetterBridgeInfo {
        GetterBridgeInfo {
            native_name: name.to_string(),
            native_type: QualType::int(),
            type_mirror: int_mirror(),
            is_aggregate: false,
        }
    }

    #[test]
    fn snapshot_is_unaffected_by_later_inserts() {
        let mut builder = BridgeMetadataBuilder::new();
        builder.insert_getter(StubId::new(1), getter("counter"));

        let mut later = builder.clone();
        let snapshot = builder.finalize();

        later.insert_getter(StubId::new(2), getter("other"));
        later.mark_narrow_string(ParameterKey::new(StubId::new(3), 0));

        assert!(snapshot.getter(StubId::new(1)).is_some());
        assert!(snapshot.getter(StubId::new(2)).is_none());
        assert!(!snapshot.is_narrow_string(ParameterKey::new(StubId::new(3), 0)));
        assert_eq!(snapshot.referenced_stubs().len(), 1);
    }

    #[test]
    fn string_markers_are_disjoint() {
        let key = ParameterKey::new(StubId::new(7), 1);
        let mut builder = BridgeMetadataBuilder::new();
        builder.mark_narrow_string(key);
        builder.mark_wide_string(key);

        let metadata = builder.finalize();
        assert!(metadata.is_wide_string(key));
        assert!(!metadata.is_narrow_string(key));
    }

    #[test]
    fn merge_moves_every_table() {
        let mut target = BridgeMetadataBuilder::new();
        let mut scratch = BridgeMetadataBuilder::new();
        scratch.insert_getter(StubId::new(4), getter("a"));
        scratch.insert_enum_mirror(StubId::new(5), int_mirror());
        scratch.mark_wide_string(ParameterKey::new(StubId::new(6), 0));
        target.merge(scratch);

        let metadata = target.finalize();
        assert_eq!(
            metadata.referenced_stubs().into_iter().collect::<Vec<_>>(),
            vec![StubId::new(4), StubId::new(5), StubId::new(6)]
        );
    }
}
