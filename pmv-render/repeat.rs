use pmv_host::{Host, Value};

use crate::{DisplayPass, Error, Printer};

/// Inclusive repetition bounds of a Repeat fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RepeatCount {
    pub min: u64,
    pub max: u64,
}

impl RepeatCount {
    /// Sentinel for "no upper bound".
    pub const UNBOUNDED: u64 = u64::MAX;

    #[inline]
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub const fn exactly(count: u64) -> Self {
        Self::new(count, count)
    }

    #[inline]
    #[must_use]
    pub const fn at_least(min: u64) -> Self {
        Self::new(min, Self::UNBOUNDED)
    }

    /// Read a `RepeatCount` struct out of the process image.
    pub fn read(host: &dyn Host, value: &Value) -> Result<Self, Error> {
        let min = host.read_unsigned(&host.field(value, "myMin")?)?;
        let max = host.read_unsigned(&host.field(value, "myMax")?)?;
        Ok(Self { min, max })
    }

    /// The bounds without enclosing parentheses.
    #[inline]
    #[must_use]
    pub fn bounds(self) -> Bounds {
        Bounds(self)
    }
}

/// Display adapter for the bare bound text: `3`, `2+`, `<=5` or `2-5`.
#[derive(Clone, Copy, Debug)]
pub struct Bounds(RepeatCount);

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let RepeatCount { min, max } = self.0;
        if min == max {
            write!(f, "{min}")
        } else if max == RepeatCount::UNBOUNDED {
            write!(f, "{min}+")
        } else if min == 0 {
            write!(f, "<={max}")
        } else {
            // Also reached by malformed bounds where `min > max`.
            write!(f, "{min}-{max}")
        }
    }
}

impl std::fmt::Display for RepeatCount {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.bounds())
    }
}

#[must_use]
pub fn render_range(min: u64, max: u64) -> String {
    RepeatCount::new(min, max).to_string()
}

/// Printer for standalone `RepeatCount` values.
pub struct RepeatCountPrinter {
    value: Value,
}

impl RepeatCountPrinter {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Printer for RepeatCountPrinter {
    fn to_string(&self, pass: &DisplayPass<'_>) -> Result<String, Error> {
        Ok(RepeatCount::read(pass.host(), &self.value)?.to_string())
    }
}
