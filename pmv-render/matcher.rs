use pmv_host::{Host, Value};

use crate::{Child, DisplayPass, Error, Printer};

const FRAGMENTS_FIELD: &str = "myFragments";
const LITERALS_FIELD: &str = "myLiterals";
const KEY_TYPE_MEMBER: &str = "KeyType";

/// Printer for `PatternMatcher<KeyType>` values.
///
/// The summary names the key type and the number of stored fragments. The
/// `fragments` and `literals` containers are exposed as children, rendered
/// in a naming scope over `fragments` so that sub-fragment references show
/// the keys they are stored under.
pub struct PatternMatcherPrinter {
    value: Value,
}

impl PatternMatcherPrinter {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    fn fragments(&self, host: &dyn Host) -> Result<Value, Error> {
        Ok(host.field(&self.value, FRAGMENTS_FIELD)?)
    }

    /// Display name of the matcher's `KeyType`, which may be declared by a
    /// base class.
    pub fn key_type_name(&self, host: &dyn Host) -> Result<String, Error> {
        let key_type = host.find_member_type(self.value.ty(), KEY_TYPE_MEMBER)?;
        Ok(host.strip_typedefs(&key_type)?.name.clone())
    }
}

impl Printer for PatternMatcherPrinter {
    fn to_string(&self, pass: &DisplayPass<'_>) -> Result<String, Error> {
        let host = pass.host();
        let key_type = self.key_type_name(host)?;
        // The container's own size field, not an iteration count.
        let count = host.element_count(&self.fragments(host)?)?;
        Ok(format!("KeyType={key_type} with {count} fragments"))
    }

    fn children(&self, pass: &DisplayPass<'_>) -> Result<Vec<Child>, Error> {
        let host = pass.host();
        Ok(vec![
            Child::new("fragments", self.fragments(host)?),
            Child::new("literals", host.field(&self.value, LITERALS_FIELD)?),
        ])
    }

    fn child_pass<'h>(&self, pass: &DisplayPass<'h>) -> Result<DisplayPass<'h>, Error> {
        Ok(pass.scoped(self.fragments(pass.host())?))
    }
}
