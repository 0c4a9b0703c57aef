//! Unit-scaled rendering of counters and microsecond durations
//!
//! A value is rendered against the largest unit it reaches. Values below the
//! smallest multiple render as a plain integer; anything larger renders with
//! three fractional digits, e.g. `1.500K` or `12.345ms`.

use std::fmt::{self, Write};

/// A unit and the number of base units it represents
#[derive(Debug, Clone, Copy)]
struct Unit {
    suffix: &'static str,
    factor: u64,
}

const SI_UNITS: &[Unit] = &[
    Unit { suffix: "E", factor: 1_000_000_000_000_000_000 },
    Unit { suffix: "P", factor: 1_000_000_000_000_000 },
    Unit { suffix: "T", factor: 1_000_000_000_000 },
    Unit { suffix: "G", factor: 1_000_000_000 },
    Unit { suffix: "M", factor: 1_000_000 },
    Unit { suffix: "K", factor: 1_000 },
    Unit { suffix: "", factor: 1 },
];

const MICROS_UNITS: &[Unit] = &[
    Unit { suffix: "d", factor: 86_400_000_000 },
    Unit { suffix: "h", factor: 3_600_000_000 },
    Unit { suffix: "m", factor: 60_000_000 },
    Unit { suffix: "s", factor: 1_000_000 },
    Unit { suffix: "ms", factor: 1_000 },
    Unit { suffix: "us", factor: 1 },
];

/// Which family of multiples a value is scaled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitSchema {
    /// Decimal SI multiples (K, M, G, T, P, E)
    #[default]
    Si,
    /// Time units over a microsecond base (us, ms, s, m, h, d)
    Micros,
}

impl UnitSchema {
    fn units(self) -> &'static [Unit] {
        match self {
            Self::Si => SI_UNITS,
            Self::Micros => MICROS_UNITS,
        }
    }
}

/// Write `value` scaled to `schema` into any [`fmt::Write`] sink
///
/// # Errors
/// Propagates errors from the underlying writer.
pub fn write_humanized<W: Write + ?Sized>(
    out: &mut W,
    value: u64,
    schema: UnitSchema,
) -> fmt::Result {
    let units = schema.units();
    let unit = units
        .iter()
        .find(|unit| value >= unit.factor || unit.factor == 1)
        .copied()
        .unwrap_or(Unit { suffix: "", factor: 1 });

    if unit.factor == 1 {
        return write!(out, "{value}{}", unit.suffix);
    }

    let whole = value / unit.factor;
    let thousandths = (value % unit.factor) / (unit.factor / 1_000);
    write!(out, "{whole}.{thousandths:03}{}", unit.suffix)
}

/// Render `value` scaled to `schema` as an owned string
///
/// # Examples
///
/// ```
/// use metricore_common::time::{humanize, UnitSchema};
///
/// assert_eq!(humanize(999, UnitSchema::Si), "999");
/// assert_eq!(humanize(1_234_567, UnitSchema::Si), "1.234M");
/// assert_eq!(humanize(12_345, UnitSchema::Micros), "12.345ms");
/// ```
pub fn humanize(value: u64, schema: UnitSchema) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_humanized(&mut out, value, schema);
    out
}
