#![allow(dead_code)]

use bgn_index::{ClassDecl, DeclarationIndex, FunctionDecl, MethodDecl, Parameter, QualType};
use bgn_util::GeneratorConfig;

pub fn init_log() {
    bgn_util::init_log();
}

pub fn config() -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.package = Some("org.sample".to_string());
    config
}

pub fn add() -> FunctionDecl {
    FunctionDecl::new(
        "add",
        QualType::int(),
        vec![
            Parameter::new("a", QualType::int()),
            Parameter::new("b", QualType::int()),
        ],
    )
}

/// Two classes that both have a `run()` method
pub fn runners() -> DeclarationIndex {
    let mut index = DeclarationIndex::new();
    for name in ["Engine", "Worker"] {
        index.insert_class(ClassDecl::new(
            name,
            vec![MethodDecl::new(
                "run",
                QualType::void(),
                vec![Parameter::new("speed", QualType::int())],
            )],
        ));
    }
    index
}
