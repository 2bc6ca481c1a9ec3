use indexmap::IndexMap;
use pmv_host::{Host, HostError, MapObject, Object, SnapshotError, Type};
use pmv_render::{
    DisplayPass, Error, FragmentPrinter, NameLookup, PatternMatcherPrinter, Printer, RenderSettings,
    RepeatCount, pattern_matcher_printers,
};
use tests::fixture::*;

#[test]
fn summary() -> anyhow::Result<()> {
    tests::init_logging();
    let mut image = MatcherImage::new();
    let names = ["a", "b", "c", "d", "e", "f", "g"];
    let fragments = names
        .iter()
        .map(|name| (*name, image.literal(name.as_bytes())))
        .collect::<Vec<_>>();
    let matcher = image.matcher("Foo", &fragments, &[]);

    let pass = DisplayPass::new(&image.snapshot);
    let printer = PatternMatcherPrinter::new(matcher);
    assert_eq!(printer.to_string(&pass)?, "KeyType=Foo with 7 fragments");
    assert_eq!(printer.key_type_name(&image.snapshot)?, "Foo");
    Ok(())
}

#[test]
fn count_is_the_containers_size_field() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let name = image.define_matcher_type("Foo");
    let fragments = image.alloc(Object::Map(MapObject {
        len: 9,
        entries: Vec::new(),
    }));
    let literals = image.alloc(Object::Map(MapObject::default()));
    let address = image.alloc(Object::Struct(IndexMap::from_iter([
        (String::from("myFragments"), fragments),
        (String::from("myLiterals"), literals),
    ])));

    let pass = DisplayPass::new(&image.snapshot);
    let printer = PatternMatcherPrinter::new(image.value(address, &name));
    assert_eq!(printer.to_string(&pass)?, "KeyType=Foo with 9 fragments");
    Ok(())
}

#[test]
fn children_render_in_the_matchers_scope() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let digit = image.literal(b"0");
    let digits = image.repeat(Some(digit), RepeatCount::at_least(1));
    let sign = image.literal(b"-");
    let number = image.sequence(&[sign, digits]);
    let matcher = image.matcher(
        "Foo",
        &[("digits", digits), ("number", number)],
        &[(b'-', sign)],
    );

    let pass = DisplayPass::new(&image.snapshot);
    let printer = PatternMatcherPrinter::new(matcher);
    let children = printer.children(&pass)?;
    let labels = children.iter().map(|c| c.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, ["fragments", "literals"]);
    assert_eq!(children[0].value.ty().name, FRAGMENT_MAP);
    assert_eq!(children[1].value.ty().name, LITERAL_MAP);

    let child_pass = printer.child_pass(&pass)?;
    let number = FragmentPrinter::new(image.fragment(number));
    assert_eq!(number.to_string(&child_pass)?, "- digits");

    // Outside the matcher, the same fragment has no names.
    assert_eq!(number.to_string(&pass)?, format!("- {digits}"));
    Ok(())
}

#[test]
fn lookup_is_built_once_per_scope() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let a = image.literal(b"a");
    let word = image.repeat(Some(a), RepeatCount::at_least(1));
    let pair = image.sequence(&[word, word]);
    let choice = image.alternative(&[word, pair]);
    let matcher = image.matcher("Foo", &[("word", word), ("pair", pair), ("choice", choice)], &[]);

    let host = CountingHost::new(&image.snapshot);
    let pass = DisplayPass::new(&host);
    let printer = PatternMatcherPrinter::new(matcher);
    assert_eq!(printer.to_string(&pass)?, "KeyType=Foo with 3 fragments");

    let child_pass = printer.child_pass(&pass)?;
    assert!(!child_pass.has_built_names());
    assert_eq!(host.entries_calls.get(), 0);

    let render = |address: pmv_host::Address| FragmentPrinter::new(image.fragment(address)).to_string(&child_pass);
    assert_eq!(render(pair)?, "word word");
    assert_eq!(render(choice)?, "(word|pair)");
    assert_eq!(render(word)?, "a (1+)");
    assert!(child_pass.has_built_names());
    assert_eq!(host.entries_calls.get(), 1);

    // Clones share the scope; a new scope builds its own table.
    let clone = child_pass.clone();
    assert_eq!(FragmentPrinter::new(image.fragment(pair)).to_string(&clone)?, "word word");
    assert_eq!(host.entries_calls.get(), 1);

    let second = printer.child_pass(&pass)?;
    assert_eq!(FragmentPrinter::new(image.fragment(pair)).to_string(&second)?, "word word");
    assert_eq!(host.entries_calls.get(), 2);
    Ok(())
}

#[test]
fn scopes_are_not_shared_between_matchers() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let a = image.literal(b"a");
    let word = image.repeat(Some(a), RepeatCount::at_least(1));
    let line = image.sequence(&[word]);
    let first = image.matcher("Foo", &[("word", word), ("line", line)], &[]);
    let second = image.matcher("Bar", &[("other", line)], &[]);

    let pass = DisplayPass::new(&image.snapshot);
    let line = FragmentPrinter::new(image.fragment(line));

    let first_pass = PatternMatcherPrinter::new(first).child_pass(&pass)?;
    assert_eq!(line.to_string(&first_pass)?, "word");

    let second_pass = PatternMatcherPrinter::new(second).child_pass(&pass)?;
    assert_eq!(line.to_string(&second_pass)?, format!("{word}"));
    Ok(())
}

#[test]
fn key_type_declared_by_base_class() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let base = format!("{NS}::MatcherBase<Bar>");
    let derived = format!("{NS}::PatternMatcher<Bar>");
    image.snapshot.define_type(Type::structure("Bar"));
    image.snapshot.define_type(Type::typedef("BarAlias", "Bar"));
    image
        .snapshot
        .define_type(Type::typedef(format!("{base}::KeyType"), "BarAlias"));
    image.snapshot.define_type(
        Type::structure(&*base)
            .with_field("myFragments", FRAGMENT_MAP)
            .with_field("myLiterals", LITERAL_MAP),
    );
    image.snapshot.define_type(Type::typedef("MatcherBaseAlias", &base));
    image
        .snapshot
        .define_type(Type::structure(&*derived).with_base_class("MatcherBaseAlias"));

    let a = image.literal(b"a");
    let (fragments, literals) = image.containers(&[("a", a)], &[]);
    let base_object = image.alloc(Object::Struct(IndexMap::from_iter([
        (String::from("myFragments"), fragments),
        (String::from("myLiterals"), literals),
    ])));
    let address = image.alloc(Object::Struct(IndexMap::from_iter([(
        String::from("MatcherBaseAlias"),
        base_object,
    )])));

    let pass = DisplayPass::new(&image.snapshot);
    let printer = PatternMatcherPrinter::new(image.value(address, &derived));
    assert_eq!(printer.to_string(&pass)?, "KeyType=Bar with 1 fragments");
    Ok(())
}

#[test]
fn missing_key_type_fails_only_that_value() {
    let mut image = MatcherImage::new();
    let name = format!("{NS}::PatternMatcher<Baz>");
    image.snapshot.define_type(
        Type::structure(&*name)
            .with_field("myFragments", FRAGMENT_MAP)
            .with_field("myLiterals", LITERAL_MAP),
    );
    let (fragments, literals) = image.containers(&[], &[]);
    let address = image.alloc(Object::Struct(IndexMap::from_iter([
        (String::from("myFragments"), fragments),
        (String::from("myLiterals"), literals),
    ])));

    let pass = DisplayPass::new(&image.snapshot);
    let printer = PatternMatcherPrinter::new(image.value(address, &name));
    let err = printer.to_string(&pass).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot find type pattern_matcher::PatternMatcher<Baz>::KeyType"
    );
    assert!(matches!(
        err,
        Error::Host(HostError::CannotFindMember { .. })
    ));

    // Children do not need the key type.
    assert_eq!(printer.children(&pass).map(|c| c.len()).ok(), Some(2));
}

#[test]
fn matcher_inheriting_from_itself() {
    let mut image = MatcherImage::new();
    let name = format!("{NS}::PatternMatcher<Baz>");
    image.snapshot.define_type(
        Type::structure(&*name)
            .with_base_class("BazMatcher")
            .with_field("myFragments", FRAGMENT_MAP)
            .with_field("myLiterals", LITERAL_MAP),
    );
    image.snapshot.define_type(Type::typedef("BazMatcher", &name));
    let (fragments, literals) = image.containers(&[], &[]);
    // The base class subobject is the object itself.
    let address = image.alloc(Object::Struct(IndexMap::new()));
    image.snapshot.insert(
        address,
        Object::Struct(IndexMap::from_iter([
            (String::from("BazMatcher"), address),
            (String::from("myFragments"), fragments),
            (String::from("myLiterals"), literals),
        ])),
    );

    let value = image.value(address, &name);
    assert!(matches!(
        image.snapshot.find_member_type(value.ty(), "KeyType"),
        Err(HostError::CannotFindMember { .. })
    ));
    assert!(matches!(
        image.snapshot.field(&value, "myKeys"),
        Err(HostError::NoSuchField { .. })
    ));

    let pass = DisplayPass::new(&image.snapshot);
    let printer = PatternMatcherPrinter::new(value);
    assert!(matches!(
        printer.to_string(&pass),
        Err(Error::Host(HostError::CannotFindMember { .. }))
    ));
    assert_eq!(printer.children(&pass).map(|c| c.len()).ok(), Some(2));

    // Loading such an image is refused up front.
    assert!(matches!(
        image.snapshot.validate(),
        Err(SnapshotError::TypeCycle(_))
    ));
}

#[test]
fn registry_dispatches_matcher_values() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let a = image.literal(b"a");
    let matcher = image.matcher("Foo", &[("a", a)], &[]);

    let registry = pattern_matcher_printers(&RenderSettings::default())?;
    let pass = DisplayPass::new(&image.snapshot);
    let printer = registry
        .lookup(&image.snapshot, &matcher)?
        .expect("matcher printer");
    assert_eq!(printer.to_string(&pass)?, "KeyType=Foo with 1 fragments");
    Ok(())
}

#[test]
fn empty_or_unenumerable_containers_name_nothing() -> anyhow::Result<()> {
    let mut image = MatcherImage::new();
    let a = image.literal(b"a");
    let inner = image.alternative(&[a]);
    let outer = image.sequence(&[inner, a]);
    let matcher = image.matcher("Foo", &[], &[]);

    let pass = DisplayPass::new(&image.snapshot);
    let printer = PatternMatcherPrinter::new(matcher);
    assert_eq!(printer.to_string(&pass)?, "KeyType=Foo with 0 fragments");

    let child_pass = printer.child_pass(&pass)?;
    let outer = FragmentPrinter::new(image.fragment(outer));
    assert_eq!(outer.to_string(&child_pass)?, format!("{inner} a"));
    assert_eq!(child_pass.names().map(NameLookup::len), Some(0));

    // A scope over something that is not a map.
    let not_a_map = pass.scoped(image.fragment(inner));
    assert_eq!(outer.to_string(&not_a_map)?, format!("{inner} a"));
    assert!(not_a_map.names().is_some_and(NameLookup::is_empty));
    Ok(())
}
