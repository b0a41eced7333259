#![allow(dead_code)]

use bgn_index::{
    DeclId, DeclarationIndex, EnumConstant, EnumDecl, Field, FunctionDecl, GlobalDecl, Parameter,
    QualType, StructDecl, StructDef, TypeRef, TypedefDecl,
};
use bgn_util::GeneratorConfig;

pub fn init_log() {
    bgn_util::init_log();
}

pub fn config() -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.package = Some("org.sample".to_string());
    config
}

pub fn int_field(name: &str, offset: u64) -> Field {
    Field {
        name: name.to_string(),
        qual_type: QualType::int(),
        offset,
        bit_width: None,
    }
}

pub fn struct_decl(id: &str, name: Option<&str>, fields: Vec<Field>) -> StructDecl {
    StructDecl {
        id: DeclId::new(id),
        name: name.map(|n| n.to_string()),
        def: Some(StructDef {
            size: 4 * fields.len() as u64,
            align: 4,
            fields,
            is_union: false,
        }),
    }
}

pub fn enum_decl(name: &str, values: &[(&str, i64, bool)]) -> EnumDecl {
    EnumDecl {
        id: DeclId::new(&format!("c:@E@{name}")),
        name: Some(name.to_string()),
        base_type: QualType::uint(),
        constants: values
            .iter()
            .map(|(n, v, e)| EnumConstant {
                name: n.to_string(),
                value: *v,
                is_explicit: *e,
            })
            .collect(),
    }
}

pub fn typedef_decl(name: &str, aliased: QualType) -> TypedefDecl {
    TypedefDecl {
        id: DeclId::new(&format!("c:@T@{name}")),
        name: name.to_string(),
        aliased,
    }
}

/// A small C library: a couple of structs, an enum, globals and functions
pub fn sample_index() -> DeclarationIndex {
    let mut index = DeclarationIndex::new();
    index.add_preamble("#include \"sample.h\"");

    let point = struct_decl(
        "c:@S@Point",
        Some("Point"),
        vec![int_field("x", 0), int_field("y", 32)],
    );
    let point_id = point.id;
    index.insert_struct(point);
    index.insert_typedef(typedef_decl(
        "Point",
        QualType::record("struct Point", point_id),
    ));

    index.insert_enum(enum_decl(
        "Color",
        &[("RED", 0, false), ("GREEN", 1, false), ("BLUE", 2, false)],
    ));

    index.insert_global(GlobalDecl::new("counter", QualType::int()));
    index.insert_global(GlobalDecl::new("origin", QualType::record("Point", point_id)));
    index.insert_global(GlobalDecl::new("version", QualType::int().constant()));

    index.insert_function(FunctionDecl::new(
        "add",
        QualType::int(),
        vec![
            Parameter::new("a", QualType::int()),
            Parameter::new("b", QualType::int()),
        ],
    ));
    index.insert_function(
        FunctionDecl::new(
            "log_message",
            QualType::void(),
            vec![Parameter::new(
                "format",
                QualType::pointer_to(QualType::char().constant()),
            )],
        )
        .variadic(),
    );
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
    index.insert_function(FunctionDecl::new("internal_reset", QualType::void(), vec![]));

    index
}
