use pmv_host::{Host, HostError, Value};

use crate::{DisplayHint, DisplayPass, Error, Printer, RepeatCount, render_bytes};

const TYPE_FIELD: &str = "myType";
const LITERAL_FIELD: &str = "myLiteral";
const SUB_FRAGMENTS_FIELD: &str = "mySubFragments";
const COUNT_FIELD: &str = "myCount";

/// Discriminant of a fragment node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FragmentType {
    /// Default-constructed node without payload.
    None,
    Literal,
    Sequence,
    Alternative,
    Repeat,
    /// Tag text that names none of the above, kept verbatim for display.
    Unknown(String),
}

impl FragmentType {
    /// Interpret the host's text for the `myType` enumerator. Only the last
    /// path segment is significant, so `ns::Fragment::Type::Literal` and
    /// `Literal` are the same tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let variant = tag.rsplit("::").next().unwrap_or(tag);
        match variant {
            "None" => FragmentType::None,
            "Literal" => FragmentType::Literal,
            "Sequence" => FragmentType::Sequence,
            "Alternative" => FragmentType::Alternative,
            "Repeat" => FragmentType::Repeat,
            _ => FragmentType::Unknown(tag.to_owned()),
        }
    }
}

/// Read-only view of one fragment in the process image.
///
/// Only the payload fields that the tag makes valid are ever read.
#[derive(Debug, Clone)]
pub struct Fragment {
    value: Value,
    ty: FragmentType,
}

impl Fragment {
    pub fn read(host: &dyn Host, value: &Value) -> Result<Self, Error> {
        let tag = host.read_enumerator(&host.field(value, TYPE_FIELD)?)?;
        Ok(Self {
            value: value.clone(),
            ty: FragmentType::from_tag(&tag),
        })
    }

    #[inline]
    #[must_use]
    pub fn fragment_type(&self) -> &FragmentType {
        &self.ty
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn literal(&self, host: &dyn Host) -> Result<Vec<u8>, Error> {
        Ok(host.read_bytes(&host.field(&self.value, LITERAL_FIELD)?)?)
    }

    /// References to sub-fragments. A list the host cannot enumerate is
    /// treated as empty.
    pub fn sub_fragments(&self, host: &dyn Host) -> Result<Vec<Value>, Error> {
        let list = host.field(&self.value, SUB_FRAGMENTS_FIELD)?;
        let Some(elements) = host.elements(&list) else {
            tracing::debug!("`{}` at {} is not enumerable", list.ty(), list.address());
            return Ok(Vec::new());
        };
        Ok(elements.collect::<Result<Vec<_>, HostError>>()?)
    }

    pub fn count(&self, host: &dyn Host) -> Result<RepeatCount, Error> {
        RepeatCount::read(host, &host.field(&self.value, COUNT_FIELD)?)
    }

    /// Render the fragment in grammar notation.
    pub fn render(&self, pass: &DisplayPass<'_>) -> Result<String, Error> {
        let host = pass.host();
        let text = match &self.ty {
            FragmentType::Literal => render_bytes(&self.literal(host)?),
            FragmentType::Sequence => self.sub_fragment_names(pass)?.join(" "),
            FragmentType::Alternative => {
                format!("({})", self.sub_fragment_names(pass)?.join("|"))
            }
            FragmentType::Repeat => {
                let name = match self.sub_fragments(host)?.first() {
                    Some(sub_fragment) => name_of(pass, sub_fragment),
                    None => String::from("<empty>"),
                };
                format!("{name} ({})", self.count(host)?.bounds())
            }
            FragmentType::None => String::from("<Uninitialized>"),
            FragmentType::Unknown(tag) => format!("Unknown Type: {tag}"),
        };
        Ok(text)
    }

    fn sub_fragment_names(&self, pass: &DisplayPass<'_>) -> Result<Vec<String>, Error> {
        Ok(self
            .sub_fragments(pass.host())?
            .iter()
            .map(|sub_fragment| name_of(pass, sub_fragment))
            .collect())
    }
}

/// Display name of a sub-fragment reference.
///
/// Literal fragments are named by their content. Other fragments are named
/// by the key they are stored under in the pass's naming scope, or by their
/// address when there is no such key. Never fails.
#[must_use]
pub fn name_of(pass: &DisplayPass<'_>, reference: &Value) -> String {
    let host = pass.host();
    let target = match host.dereference(reference) {
        Ok(target) => target,
        Err(HostError::InvalidAddress(address)) => return address.to_string(),
        Err(err) => return format!("<error: {err}>"),
    };

    if let Some(literal) = literal_name(host, &target) {
        return literal;
    }

    if let Some(name) = pass.names().and_then(|names| names.get(target.address())) {
        return name.to_owned();
    }

    tracing::trace!("no name for fragment at {}", target.address());
    target.address().to_string()
}

fn literal_name(host: &dyn Host, target: &Value) -> Option<String> {
    let fragment = Fragment::read(host, target).ok()?;
    if *fragment.fragment_type() != FragmentType::Literal {
        return None;
    }
    fragment.literal(host).ok().map(|bytes| render_bytes(&bytes))
}

/// Printer for `Fragment` values.
pub struct FragmentPrinter {
    value: Value,
}

impl FragmentPrinter {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Printer for FragmentPrinter {
    fn to_string(&self, pass: &DisplayPass<'_>) -> Result<String, Error> {
        Fragment::read(pass.host(), &self.value)?.render(pass)
    }

    fn display_hint(&self) -> Option<DisplayHint> {
        Some(DisplayHint::String)
    }
}
