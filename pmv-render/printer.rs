use std::{cell::OnceCell, rc::Rc};

use pmv_host::{Host, Value};

use crate::{Error, NameLookup};

/// A custom renderer for one displayed value.
///
/// Printers are created on demand by the [`Registry`](crate::Registry) and
/// are invoked lazily by the host, once per displayed value. They must not
/// have side effects on the inspected process.
pub trait Printer {
    /// One-line summary of the value.
    fn to_string(&self, pass: &DisplayPass<'_>) -> Result<String, Error>;

    /// Labeled sub-values the host may expand.
    fn children(&self, pass: &DisplayPass<'_>) -> Result<Vec<Child>, Error> {
        _ = pass;
        Ok(Vec::new())
    }

    /// The display pass in which this value's children are rendered. Printers
    /// that establish a naming scope (see [`DisplayPass::scoped`]) override
    /// this.
    fn child_pass<'h>(&self, pass: &DisplayPass<'h>) -> Result<DisplayPass<'h>, Error> {
        Ok(pass.clone())
    }

    fn display_hint(&self) -> Option<DisplayHint> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub label: String,
    pub value: Value,
}

impl Child {
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Presentation hint for the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayHint {
    /// The summary is string-like and should be shown without decoration.
    String,
}

/// Context of one top-level render invocation.
///
/// A pass carries the host and, inside a pattern matcher, the naming scope
/// used to resolve sub-fragment references. The scope's [`NameLookup`] is
/// built on first use and shared by every pass cloned from the same scope.
/// Nothing is shared between scopes.
#[derive(Clone)]
pub struct DisplayPass<'h> {
    host: &'h dyn Host,
    scope: Option<Rc<NameScope>>,
}

struct NameScope {
    fragments: Value,
    lookup: OnceCell<NameLookup>,
}

impl<'h> DisplayPass<'h> {
    /// A pass with no naming scope. Sub-fragment references render as
    /// addresses.
    #[must_use]
    pub fn new(host: &'h dyn Host) -> Self {
        Self { host, scope: None }
    }

    /// A pass that names fragments by their keys in the `fragments`
    /// container.
    #[must_use]
    pub fn scoped(&self, fragments: Value) -> DisplayPass<'h> {
        DisplayPass {
            host: self.host,
            scope: Some(Rc::new(NameScope {
                fragments,
                lookup: OnceCell::new(),
            })),
        }
    }

    #[inline]
    #[must_use]
    pub fn host(&self) -> &'h dyn Host {
        self.host
    }

    /// The scope's name table, building it if this is the first lookup.
    #[must_use]
    pub fn names(&self) -> Option<&NameLookup> {
        let scope = self.scope.as_deref()?;
        Some(
            scope
                .lookup
                .get_or_init(|| NameLookup::build(self.host, &scope.fragments)),
        )
    }

    /// True if the scope's name table has been built.
    #[must_use]
    pub fn has_built_names(&self) -> bool {
        self.scope
            .as_deref()
            .is_some_and(|scope| scope.lookup.get().is_some())
    }
}
