mod bytes;
mod error;
mod fragment;
mod lookup;
mod matcher;
mod printer;
mod registry;
mod repeat;
mod settings;

pub use bytes::*;
pub use error::*;
pub use fragment::*;
pub use lookup::*;
pub use matcher::*;
pub use printer::*;
pub use registry::*;
pub use repeat::*;
pub use settings::*;

/// Registry with the printers for the pattern matcher library's types,
/// honoring the namespace and disabled printers in `settings`.
pub fn pattern_matcher_printers(settings: &RenderSettings) -> Result<Registry, Error> {
    let ns = &settings.namespace;
    let mut registry = Registry::new(ns.clone());

    registry.register(&format!("{ns}::Fragment"), |value| {
        Box::new(FragmentPrinter::new(value))
    });
    registry.register(&format!("{ns}::RepeatCount"), |value| {
        Box::new(RepeatCountPrinter::new(value))
    });
    registry.register_template(
        &format!("{ns}::PatternMatcher"),
        |value| Box::new(PatternMatcherPrinter::new(value)),
        1,
    )?;

    for name in &settings.disabled {
        registry.set_enabled(name, false)?;
    }

    Ok(registry)
}
