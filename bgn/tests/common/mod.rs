#![allow(dead_code)]

use std::path::PathBuf;

use bgn::{DeclarationIndex, GeneratorConfig};
use bgn_index::{FunctionDecl, GlobalDecl, Parameter, QualType, TypeRef};

pub fn init_log() {
    bgn_util::init_log();
}

/// A fresh output directory for `test`
pub fn out_dir(test: &str) -> std::io::Result<PathBuf> {
    let dir = std::env::temp_dir().join("bgn-tests").join(test);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    Ok(dir)
}

pub fn config() -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.package = Some("org.sample".to_string());
    config
}

pub fn sample_index() -> DeclarationIndex {
    let mut index = DeclarationIndex::new();
    index.add_preamble("#include \"sample.h\"");

    index.insert_global(GlobalDecl::new("counter", QualType::int()));
    index.insert_function(FunctionDecl::new(
        "add",
        QualType::int(),
        vec![
            Parameter::new("a", QualType::int()),
            Parameter::new("b", QualType::int()),
        ],
    ));
    index.insert_function(FunctionDecl::new(
        "take_vector",
        QualType::void(),
        vec![Parameter::new(
            "v",
            QualType::new(
                "__m128",
                false,
                TypeRef::Unsupported {
                    description: "vector".to_string(),
                },
            ),
        )],
    ));

    index
}
