//! State that lives for a whole generation run
use std::collections::BTreeMap;

use bgn_index::DeclId;
use bgn_util::{GeneratorConfig, TargetPlatform};
use hashbrown::HashMap;
use tracing::debug;

use crate::sanitize_name;
use crate::stub::{Classifier, StubId};

/// Package used when neither the configured package nor the library name gives anything usable
pub const FALLBACK_PACKAGE: &str = "interop";

/// Run-scoped counter handing out names that are unique within one generation run
#[derive(Debug, Clone)]
pub struct UniqueIds {
    /// Sanitized package name mixed into every generated name
    package: String,
    next: u64,
}

impl UniqueIds {
    pub fn new(package: &str) -> UniqueIds {
        UniqueIds {
            package: sanitize_name(package).to_string(),
            next: 1,
        }
    }

    /// Produce `<prefix>_<package><n>_<base>` with a fresh `n`
    pub fn next_name(&mut self, prefix: &str, base: &str) -> String {
        let n = self.next;
        self.next += 1;
        format!("{prefix}_{}{n}_{}", self.package, sanitize_name(base))
    }
}

/// Everything a run carries from one declaration to the next: configuration, naming registries and counters.
///
/// There is exactly one of these per run and it is passed by `&mut` to every component that needs fresh names.
#[derive(Debug)]
pub struct GenerationContext {
    config: GeneratorConfig,
    package: String,
    anonymous_structs: HashMap<DeclId, String>,
    classifiers: HashMap<DeclId, Option<Classifier>>,
    forward_declarations: BTreeMap<String, Classifier>,
    enum_strictness: BTreeMap<String, bool>,
    next_stub_id: u64,
    unique_ids: UniqueIds,
}

impl GenerationContext {
    pub fn new(config: GeneratorConfig) -> GenerationContext {
        let package = match &config.package {
            Some(p) if !p.is_empty() => p.clone(),
            _ => derive_package(&config.library_name),
        };
        debug!("generating into package {package}");

        GenerationContext {
            unique_ids: UniqueIds::new(&package),
            config,
            package,
            anonymous_structs: HashMap::new(),
            classifiers: HashMap::new(),
            forward_declarations: BTreeMap::new(),
            enum_strictness: BTreeMap::new(),
            next_stub_id: 1,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn platform(&self) -> TargetPlatform {
        self.config.platform
    }

    /// Name of the anonymous struct `id`. Names are handed out as `anonymousStruct1`, `anonymousStruct2`, ... in
    /// the order structs are first asked about.
    pub fn anonymous_struct_name(&mut self, id: DeclId) -> String {
        let next = self.anonymous_structs.len() + 1;
        self.anonymous_structs
            .entry(id)
            .or_insert_with(|| format!("anonymousStruct{next}"))
            .clone()
    }

    pub(crate) fn cached_classifier(&self, id: DeclId) -> Option<&Option<Classifier>> {
        self.classifiers.get(&id)
    }

    pub(crate) fn cache_classifier(&mut self, id: DeclId, classifier: Option<Classifier>) {
        self.classifiers.insert(id, classifier);
    }

    pub(crate) fn record_forward_declaration(&mut self, name: &str, classifier: &Classifier) {
        self.forward_declarations
            .insert(name.to_string(), classifier.clone());
    }

    pub(crate) fn record_enum(&mut self, name: &str, strict: bool) {
        self.enum_strictness.insert(name.to_string(), strict);
    }

    pub fn next_stub_id(&mut self) -> StubId {
        let id = StubId::new(self.next_stub_id);
        self.next_stub_id += 1;
        id
    }

    pub fn unique_ids(&mut self) -> &mut UniqueIds {
        &mut self.unique_ids
    }

    /// Key/value properties describing the generated library, written alongside the metadata module
    pub fn manifest_properties(&self) -> BTreeMap<String, String> {
        let mut manifest = BTreeMap::new();
        manifest.insert("interop".to_string(), "true".to_string());
        manifest.insert("package".to_string(), self.package.clone());
        manifest.insert("platform".to_string(), self.config.platform.to_string());

        let exported = self
            .config
            .export_forward_declarations
            .iter()
            .map(|name| match self.forward_declarations.get(name) {
                Some(c) => c.fq_name(),
                None => Classifier::new(crate::mapper::CNAMES_STRUCTS, name).fq_name(),
            })
            .collect::<Vec<_>>();
        manifest.insert("exportForwardDeclarations".to_string(), exported.join(" "));

        let names = |strict: bool| {
            self.enum_strictness
                .iter()
                .filter(|(_, s)| **s == strict)
                .map(|(n, _)| n.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };
        manifest.insert("strictEnums".to_string(), names(true));
        manifest.insert("nonStrictEnums".to_string(), names(false));

        manifest
    }
}

/// Lowercase `library_name` and squash every run of characters that cannot appear in a package into `_`
pub fn derive_package(library_name: &str) -> String {
    let re = regex::Regex::new("[^a-z0-9_.]+").unwrap();
    let lower = library_name.to_lowercase();
    let replaced = re.replace_all(&lower, "_");
    let package = replaced
        .split('.')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".");

    if package.is_empty() {
        FALLBACK_PACKAGE.to_string()
    } else {
        package
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_from_library_name() {
        assert_eq!(derive_package("LibFoo"), "libfoo");
        assert_eq!(derive_package("my lib++.core"), "my_lib_.core");
        assert_eq!(derive_package("a..b"), "a.b");
        assert_eq!(derive_package(""), "interop");
        assert_eq!(derive_package("..."), "interop");
    }

    #[test]
    fn anonymous_struct_names_are_memoized() {
        let mut ctx = GenerationContext::new(GeneratorConfig::default());
        let a = DeclId::new("c:@SA@anon_a");
        let b = DeclId::new("c:@SA@anon_b");

        assert_eq!(ctx.anonymous_struct_name(a), "anonymousStruct1");
        assert_eq!(ctx.anonymous_struct_name(b), "anonymousStruct2");
        assert_eq!(ctx.anonymous_struct_name(a), "anonymousStruct1");
    }

    #[test]
    fn unique_names_never_repeat() {
        let mut ids = UniqueIds::new("org.sample");
        let first = ids.next_name("knifunptr", "run");
        let second = ids.next_name("knifunptr", "run");
        assert_eq!(first, "knifunptr_org_sample1_run");
        assert_eq!(second, "knifunptr_org_sample2_run");
    }

    #[test]
    fn manifest_lists_enums_and_forward_declarations() {
        let mut config = GeneratorConfig::default();
        config.package = Some("org.sample".to_string());
        config.export_forward_declarations = vec!["Opaque".to_string()];
        let mut ctx = GenerationContext::new(config);
        ctx.record_enum("Color", true);
        ctx.record_enum("Flags", false);

        let manifest = ctx.manifest_properties();
        assert_eq!(manifest["interop"], "true");
        assert_eq!(manifest["package"], "org.sample");
        assert_eq!(manifest["platform"], "native");
        assert_eq!(manifest["exportForwardDeclarations"], "cnames.structs.Opaque");
        assert_eq!(manifest["strictEnums"], "Color");
        assert_eq!(manifest["nonStrictEnums"], "Flags");
    }
}
