use ahash::HashMap;
use pmv_host::{Address, Host, Value};

/// Side table from fragment storage address to the name of the key it is
/// stored under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameLookup {
    names: HashMap<Address, String>,
}

impl NameLookup {
    /// Build the table from an associative container of key → fragment.
    ///
    /// Containers the host cannot enumerate produce an empty table. Entries
    /// the host fails to read are skipped.
    pub fn build(host: &dyn Host, container: &Value) -> NameLookup {
        let mut lookup = NameLookup::default();
        let Some(entries) = host.entries(container) else {
            tracing::debug!(
                "`{}` at {} has no entry enumerator, names unavailable",
                container.ty(),
                container.address()
            );
            return lookup;
        };

        for entry in entries {
            match entry {
                Ok(entry) => {
                    let key = host.format(&entry.key);
                    lookup.insert(entry.value.address(), strip_quotes(&key));
                }
                Err(err) => {
                    tracing::warn!("skipping unreadable entry of {}: {err}", container.address());
                }
            }
        }

        tracing::debug!(
            "built name lookup for {} with {} names",
            container.address(),
            lookup.len()
        );
        lookup
    }

    pub fn insert(&mut self, address: Address, name: impl Into<String>) {
        self.names.insert(address, name.into());
    }

    #[inline]
    #[must_use]
    pub fn get(&self, address: Address) -> Option<&str> {
        self.names.get(&address).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Remove one pair of matching surrounding quotes, as produced when the host
/// formats a string or character key.
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
