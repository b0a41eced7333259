mod common;

use bgn_index::{GlobalDecl, Parameter, QualType};
use bgn_stub::stub::CallKind;
use bgn_stub::{GenerationContext, StubBuilder};
use bgn_util::{compare, Error};
use bgn_write::{BridgeBuilder, NativeBridgeBuilder, SourceEmitter, StubListingEmitter};

#[test]
fn plain_functions_link_directly() -> Result<(), Error> {
    common::init_log();
    let mut index = bgn_index::DeclarationIndex::new();
    index.insert_function(common::add());

    let mut ctx = GenerationContext::new(common::config());
    let built = StubBuilder::new(&index, &mut ctx).build()?;
    let result = NativeBridgeBuilder.build(&index, &mut ctx, built.stubs, &built.metadata)?;

    assert!(result.native_lines.is_empty());
    assert_eq!(result.modules.len(), 1);

    let module = &result.modules[0];
    let add = &module.stubs.functions[0];
    assert_eq!(add.call, CallKind::Direct { symbol: "add".to_string() });
    assert_eq!(module.symbols.function(add.id), Some("add"));

    Ok(())
}

#[test]
fn variadic_functions_are_bound_to_a_requested_symbol() -> Result<(), Error> {
    common::init_log();
    let mut index = bgn_index::DeclarationIndex::new();
    index.insert_function(
        bgn_index::FunctionDecl::new(
            "log_message",
            QualType::void(),
            vec![Parameter::new("level", QualType::int())],
        )
        .variadic(),
    );

    let mut ctx = GenerationContext::new(common::config());
    let built = StubBuilder::new(&index, &mut ctx).build()?;
    let result = NativeBridgeBuilder.build(&index, &mut ctx, built.stubs, &built.metadata)?;

    let module = &result.modules[0];
    let function = &module.stubs.functions[0];
    let symbol = format!("kni_org_sample_log_message_{}", function.id.get());
    assert_eq!(module.symbols.function(function.id), Some(symbol.as_str()));
    assert_eq!(
        result.native_lines,
        vec![format!(
            "const void* {symbol} __asm(\"{symbol}\") = (const void*) &log_message;"
        )]
    );

    Ok(())
}

#[test]
fn globals_get_accessor_shims() -> Result<(), Error> {
    common::init_log();
    let mut index = bgn_index::DeclarationIndex::new();
    index.insert_global(GlobalDecl::new("counter", QualType::int()));
    index.insert_global(GlobalDecl::new("version", QualType::int().constant()));

    let mut ctx = GenerationContext::new(common::config());
    let built = StubBuilder::new(&index, &mut ctx).build()?;
    let result = NativeBridgeBuilder.build(&index, &mut ctx, built.stubs, &built.metadata)?;
    let module = &result.modules[0];

    let counter = &module.stubs.properties[0];
    let version = &module.stubs.properties[1];
    assert_eq!(counter.name, "counter");
    assert_eq!(version.name, "version");

    let counter_get = format!("kni_org_sample_counter_get_{}", counter.id.get());
    let counter_set = format!("kni_org_sample_counter_set_{}", counter.id.get());
    assert_eq!(module.symbols.getter(counter.id), Some(counter_get.as_str()));
    assert_eq!(module.symbols.setter(counter.id), Some(counter_set.as_str()));
    assert!(module.symbols.getter(version.id).is_some());
    assert_eq!(module.symbols.setter(version.id), None);
    assert_eq!(module.symbols.len(), 3);

    // every shim ends with the line binding its requested symbol
    let bound = result
        .native_lines
        .iter()
        .filter(|l| l.contains("__asm("))
        .count();
    assert_eq!(bound, 3);
    assert!(result
        .native_lines
        .iter()
        .any(|l| l.as_str() == "    counter = p0;"));

    Ok(())
}

#[test]
fn colliding_methods_get_distinct_wrappers() -> Result<(), Error> {
    common::init_log();
    let index = common::runners();

    let mut ctx = GenerationContext::new(common::config());
    let built = StubBuilder::new(&index, &mut ctx).build()?;
    assert!(built.warnings.is_empty());
    let result = NativeBridgeBuilder.build(&index, &mut ctx, built.stubs, &built.metadata)?;

    let wrappers = result
        .native_lines
        .iter()
        .filter(|l| l.starts_with("void knifunptr_"))
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(
        wrappers,
        vec![
            "void knifunptr_org_sample1_Engine_run(Engine* p0, int p1) {".to_string(),
            "void knifunptr_org_sample2_Worker_run(Worker* p0, int p1) {".to_string(),
        ]
    );

    let module = &result.modules[0];
    let symbols = module
        .stubs
        .all_functions()
        .into_iter()
        .filter_map(|f| module.symbols.function(f.id))
        .collect::<Vec<_>>();
    assert_eq!(symbols.len(), 2);
    assert_ne!(symbols[0], symbols[1]);

    Ok(())
}

#[test]
fn listing_shows_stubs_and_their_symbols() -> Result<(), Error> {
    common::init_log();
    let mut index = bgn_index::DeclarationIndex::new();
    index.insert_global(GlobalDecl::new("version", QualType::int().constant()));
    index.insert_function(common::add());

    let mut ctx = GenerationContext::new(common::config());
    let built = StubBuilder::new(&index, &mut ctx).build()?;
    let result = NativeBridgeBuilder.build(&index, &mut ctx, built.stubs, &built.metadata)?;
    let module = &result.modules[0];
    let version = module.stubs.properties[0].id;

    let mut out = Vec::new();
    StubListingEmitter.emit("org.sample", module, &mut out)?;

    compare(
        &String::from_utf8(out)?,
        &format!(
            "package org.sample\n\nval version: Int // get kni_org_sample_version_get_{}\n\n@CCall(\"add\")\nfun add(a: Int, b: Int): Int\n",
            version.get()
        ),
    )
}
