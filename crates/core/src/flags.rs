//! Metric type flags and event outcome classes

use bitflags::bitflags;
use metricore_common::time::UnitSchema;

bitflags! {
    /// Immutable per-metric flags, fixed at creation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MetricFlags: u8 {
        /// Histogram mode: named occurrence buckets instead of go / no-go
        /// statistics
        const HISTOGRAM = 1 << 0;
        /// Only the go branch is meaningful
        const ONLY_GO = 1 << 1;
        /// The mean (and min / max) are meaningful
        const MEAN = 1 << 2;
        /// Values are wall-clock microsecond durations, reported as a duty
        /// cycle when the mean is not meaningful
        const DUTY_WALLCLOCK = 1 << 3;
    }
}

/// The store variant a metric carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Go / no-go running statistics
    Statistical,
    /// Named occurrence buckets
    Histogram,
}

impl MetricFlags {
    /// Store variant selected by these flags
    pub fn kind(self) -> MetricKind {
        if self.contains(Self::HISTOGRAM) {
            MetricKind::Histogram
        } else {
            MetricKind::Statistical
        }
    }

    /// Unit family used when rendering values of this metric
    pub fn unit_schema(self) -> UnitSchema {
        if self.contains(Self::DUTY_WALLCLOCK) {
            UnitSchema::Micros
        } else {
            UnitSchema::Si
        }
    }
}

/// Outcome class of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Outcome {
    /// Success
    Go = 0,
    /// Failure
    NoGo = 1,
}

impl Outcome {
    /// Both outcomes, in index order
    pub const ALL: [Self; 2] = [Self::Go, Self::NoGo];

    /// Convert a raw outcome code
    ///
    /// # Panics
    /// Panics when `raw` is neither 0 nor 1; the caller has passed something
    /// that is not an outcome.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Go,
            1 => Self::NoGo,
            other => panic!("outcome must be 0 (go) or 1 (no-go), got {other}"),
        }
    }

    /// Index into per-outcome arrays
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_histogram_flag() {
        assert_eq!(MetricFlags::empty().kind(), MetricKind::Statistical);
        assert_eq!(MetricFlags::MEAN.kind(), MetricKind::Statistical);
        assert_eq!((MetricFlags::HISTOGRAM | MetricFlags::MEAN).kind(), MetricKind::Histogram);
    }

    #[test]
    fn test_unit_schema_follows_wallclock_flag() {
        assert_eq!(MetricFlags::MEAN.unit_schema(), UnitSchema::Si);
        assert_eq!(MetricFlags::DUTY_WALLCLOCK.unit_schema(), UnitSchema::Micros);
    }

    #[test]
    fn test_outcome_from_raw() {
        assert_eq!(Outcome::from_raw(0), Outcome::Go);
        assert_eq!(Outcome::from_raw(1), Outcome::NoGo);
        assert_eq!(Outcome::NoGo.index(), 1);
    }

    #[test]
    #[should_panic(expected = "outcome must be 0 (go) or 1 (no-go)")]
    fn test_outcome_from_raw_rejects_other_values() {
        let _ = Outcome::from_raw(2);
    }
}
