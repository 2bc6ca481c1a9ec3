use pmv_host::Type;
use pmv_render::{
    DisplayHint, DisplayPass, Error, FragmentPrinter, Printer, Registry, RenderSettings, RepeatCount,
    RepeatCountPrinter, pattern_matcher_printers,
};
use tests::fixture::*;

fn test_registry() -> Result<Registry, Error> {
    let mut registry = Registry::new("test");
    registry.register("ns::Box<int>", |value| Box::new(FragmentPrinter::new(value)));
    registry.register_template(
        "ns::Box",
        |value| Box::new(RepeatCountPrinter::new(value)),
        1,
    )?;
    registry.register_template(
        "ns::Pair",
        |value| Box::new(RepeatCountPrinter::new(value)),
        2,
    )?;
    Ok(registry)
}

fn resolved(registry: &Registry, type_name: &str) -> Option<String> {
    registry.resolve(type_name).map(|entry| entry.name.clone())
}

#[test]
fn exact_names_win_over_templates() -> anyhow::Result<()> {
    tests::init_logging();
    let registry = test_registry()?;
    assert_eq!(registry.name(), "test");
    assert_eq!(
        resolved(&registry, "ns::Box<int>").as_deref(),
        Some("ns::Box<int>")
    );
    assert_eq!(
        resolved(&registry, "ns::Box<long>").as_deref(),
        Some("ns::Box")
    );
    assert_eq!(
        resolved(&registry, "ns::Pair<int, long>").as_deref(),
        Some("ns::Pair")
    );
    assert_eq!(resolved(&registry, "ns::Pair<int>"), None);
    assert_eq!(resolved(&registry, "ns::Box"), None);
    assert_eq!(resolved(&registry, "other::Thing"), None);
    Ok(())
}

#[test]
fn disabled_printers_are_skipped() -> anyhow::Result<()> {
    let mut registry = test_registry()?;
    registry.set_enabled("ns::Box<int>", false)?;
    assert_eq!(
        resolved(&registry, "ns::Box<int>").as_deref(),
        Some("ns::Box")
    );

    registry.set_enabled("ns::Box", false)?;
    assert_eq!(resolved(&registry, "ns::Box<int>"), None);

    registry.set_enabled("ns::Box<int>", true)?;
    assert_eq!(
        resolved(&registry, "ns::Box<int>").as_deref(),
        Some("ns::Box<int>")
    );

    assert!(matches!(
        registry.set_enabled("ns::Nothing", false),
        Err(Error::UnknownPrinter(name)) if name == "ns::Nothing"
    ));

    let entries = registry
        .entries()
        .map(|e| (e.name.as_str(), e.enabled))
        .collect::<Vec<_>>();
    assert_eq!(
        entries,
        [("ns::Box<int>", true), ("ns::Box", false), ("ns::Pair", true)]
    );
    Ok(())
}

#[test]
fn lookup_sees_through_references_qualifiers_and_typedefs() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    image
        .snapshot
        .define_type(Type::typedef("pattern_matcher::FragmentAlias", FRAGMENT));
    image
        .snapshot
        .define_type(Type::const_of("pattern_matcher::FragmentAlias"));
    image
        .snapshot
        .define_type(Type::reference_to("const pattern_matcher::FragmentAlias"));
    let tok = image.literal(b"tok");

    let registry = pattern_matcher_printers(&RenderSettings::default())?;
    let value = image.value(tok, "const pattern_matcher::FragmentAlias &");
    let printer = registry
        .lookup(&image.snapshot, &value)?
        .expect("fragment printer");
    assert_eq!(printer.display_hint(), Some(DisplayHint::String));
    assert_eq!(
        printer.to_string(&DisplayPass::new(&image.snapshot))?,
        "tok"
    );

    // Pointers are not dereferenced for dispatch.
    let pointer = image.alloc(pmv_host::Object::Pointer(tok));
    let pointer = image.value(pointer, FRAGMENT_PTR);
    assert!(registry.lookup(&image.snapshot, &pointer)?.is_none());
    Ok(())
}

#[test]
fn lookup_sees_through_aliased_references() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    image.snapshot.define_type(Type::reference_to(FRAGMENT));
    image
        .snapshot
        .define_type(Type::typedef("FragmentRef", "pattern_matcher::Fragment &"));
    image.snapshot.define_type(Type::const_of("FragmentRef"));
    image
        .snapshot
        .define_type(Type::reference_to("const FragmentRef"));
    let tok = image.literal(b"tok");

    let registry = pattern_matcher_printers(&RenderSettings::default())?;
    let value = image.value(tok, "const FragmentRef &");
    let printer = registry
        .lookup(&image.snapshot, &value)?
        .expect("fragment printer");
    assert_eq!(
        printer.to_string(&DisplayPass::new(&image.snapshot))?,
        "tok"
    );
    Ok(())
}

#[test]
fn standalone_repeat_count() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let count = image.repeat_count(RepeatCount::new(2, 5));
    let unbounded = image.repeat_count(RepeatCount::at_least(0));

    let registry = pattern_matcher_printers(&RenderSettings::default())?;
    let pass = DisplayPass::new(&image.snapshot);
    let render = |address: pmv_host::Address| -> anyhow::Result<String> {
        let value = image.value(address, REPEAT_COUNT);
        let printer = registry
            .lookup(&image.snapshot, &value)?
            .expect("repeat count printer");
        Ok(printer.to_string(&pass)?)
    };
    assert_eq!(render(count)?, "(2-5)");
    assert_eq!(render(unbounded)?, "(0+)");
    Ok(())
}

#[test]
fn settings_select_namespace_and_disabled_printers() -> anyhow::Result<()> {
    let settings = RenderSettings {
        namespace: String::from("pm"),
        disabled: vec![String::from("pm::RepeatCount")],
        ..RenderSettings::default()
    };
    let registry = pattern_matcher_printers(&settings)?;
    assert_eq!(registry.name(), "pm");
    assert_eq!(resolved(&registry, "pm::Fragment").as_deref(), Some("pm::Fragment"));
    assert_eq!(resolved(&registry, "pm::RepeatCount"), None);
    assert_eq!(
        resolved(&registry, "pm::PatternMatcher<Foo>").as_deref(),
        Some("pm::PatternMatcher")
    );
    assert_eq!(resolved(&registry, "pattern_matcher::Fragment"), None);

    let settings = RenderSettings {
        disabled: vec![String::from("pattern_matcher::Nope")],
        ..RenderSettings::default()
    };
    assert!(matches!(
        pattern_matcher_printers(&settings),
        Err(Error::UnknownPrinter(_))
    ));
    Ok(())
}
