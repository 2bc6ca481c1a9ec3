use std::sync::Arc;

use indexmap::IndexMap;
use pmv_host::{Host, Value};

use crate::{Error, Printer};

pub type PrinterFactory = fn(Value) -> Box<dyn Printer>;

/// One registered printer.
#[derive(Debug, Clone)]
pub struct PrinterEntry {
    /// Name used to enable or disable the printer.
    pub name: String,
    pub enabled: bool,
    pub factory: PrinterFactory,
}

#[derive(Debug, Clone)]
struct TemplateEntry {
    base: String,
    arity: usize,
    regex: regex::Regex,
    entry: PrinterEntry,
}

/// Maps declared type names to printers.
///
/// Exact type names are checked before template patterns. Template patterns
/// match textually, so a template argument that is itself a template with
/// the same number of arguments may produce a false match.
#[derive(Debug, Clone)]
pub struct Registry {
    name: String,
    exact: IndexMap<String, PrinterEntry>,
    templates: Vec<TemplateEntry>,
}

impl Registry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exact: IndexMap::new(),
            templates: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a printer for one exact type name. The type name doubles as
    /// the printer's name.
    pub fn register(&mut self, type_name: &str, factory: PrinterFactory) {
        tracing::debug!("[{}] adding {type_name}", self.name);
        self.exact.insert(
            type_name.to_owned(),
            PrinterEntry {
                name: type_name.to_owned(),
                enabled: true,
                factory,
            },
        );
    }

    /// Register a printer for every instantiation of the template `base`
    /// with `arity` type arguments. The base name doubles as the printer's
    /// name.
    pub fn register_template(
        &mut self,
        base: &str,
        factory: PrinterFactory,
        arity: usize,
    ) -> Result<(), Error> {
        let regex = template_regex(base, arity).map_err(|error| Error::TemplatePattern {
            base: base.to_owned(),
            error: Arc::new(error),
        })?;
        tracing::debug!("[{}] adding {base}<...> ({arity})", self.name);
        self.templates.push(TemplateEntry {
            base: base.to_owned(),
            arity,
            regex,
            entry: PrinterEntry {
                name: base.to_owned(),
                enabled: true,
                factory,
            },
        });
        Ok(())
    }

    /// Find the enabled printer for a declared type name, if any.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<&PrinterEntry> {
        if let Some(entry) = self.exact.get(type_name).filter(|e| e.enabled) {
            tracing::trace!("{type_name} resolved to exact printer");
            return Some(entry);
        }

        let template = self
            .templates
            .iter()
            .filter(|t| t.entry.enabled)
            .find(|t| t.regex.is_match(type_name))?;
        tracing::trace!(
            "{type_name} resolved to template printer {}<{}>",
            template.base,
            template.arity
        );
        Some(&template.entry)
    }

    /// Create the printer for `value`, looking through references,
    /// qualifiers and typedefs of its type.
    pub fn lookup(&self, host: &dyn Host, value: &Value) -> Result<Option<Box<dyn Printer>>, Error> {
        let ty = host.basic_type(value.ty())?;
        let Some(tag) = ty.tag() else {
            return Ok(None);
        };
        Ok(self.resolve(tag).map(|entry| (entry.factory)(value.clone())))
    }

    /// Enable or disable the printer named `name`.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), Error> {
        let entry = match self.exact.get_mut(name) {
            Some(entry) => entry,
            None => self
                .templates
                .iter_mut()
                .map(|t| &mut t.entry)
                .find(|e| e.name == name)
                .ok_or_else(|| Error::UnknownPrinter(name.to_owned()))?,
        };
        entry.enabled = enabled;
        tracing::debug!(
            "[{}] {} {name}",
            self.name,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// All registered printers, exact entries first.
    pub fn entries(&self) -> impl Iterator<Item = &PrinterEntry> {
        self.exact
            .values()
            .chain(self.templates.iter().map(|t| &t.entry))
    }
}

/// `^base<ARG(, ?ARG)*>$` with one wildcard per type argument.
fn template_regex(base: &str, arity: usize) -> Result<regex::Regex, regex::Error> {
    let mut pattern = String::from("^");
    pattern.push_str(&regex::escape(base));
    pattern.push('<');
    for i in 0..arity.max(1) {
        if i != 0 {
            pattern.push_str(", ?");
        }
        pattern.push_str(".+");
    }
    pattern.push_str(">$");

    regex::RegexBuilder::new(&pattern).unicode(true).build()
}
