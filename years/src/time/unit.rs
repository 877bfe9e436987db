//! Calendar and epoch units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unit of time that a layout can encode.
///
/// Calendar units are ordered from most to least specific, so the minimal
/// unit of a layout is simply the smallest unit it contains. Epoch markers
/// sort after the calendar units and only ever appear on their own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Day of the month (or of the year).
    Day,
    Month,
    Year,
    EpochSecond,
    EpochMillisecond,
    EpochMicrosecond,
    EpochNanosecond,
}

impl TimeUnit {
    /// Returns the stable lowercase name of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Day => "day",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
            TimeUnit::EpochSecond => "epoch_second",
            TimeUnit::EpochMillisecond => "epoch_millisecond",
            TimeUnit::EpochMicrosecond => "epoch_microsecond",
            TimeUnit::EpochNanosecond => "epoch_nanosecond",
        }
    }

    /// Returns true for the Unix epoch markers.
    pub fn is_epoch(&self) -> bool {
        self.epoch_precision().is_some()
    }

    /// Returns the epoch precision this marker stands for.
    pub fn epoch_precision(&self) -> Option<EpochPrecision> {
        match self {
            TimeUnit::EpochSecond => Some(EpochPrecision::Second),
            TimeUnit::EpochMillisecond => Some(EpochPrecision::Millisecond),
            TimeUnit::EpochMicrosecond => Some(EpochPrecision::Microsecond),
            TimeUnit::EpochNanosecond => Some(EpochPrecision::Nanosecond),
            _ => None,
        }
    }

    /// Returns true if a timestamp resolved at this unit pins down the month.
    ///
    /// Epoch timestamps are complete instants, so they resolve every
    /// calendar unit.
    pub fn resolves_month(&self) -> bool {
        !matches!(self, TimeUnit::Year)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precision of a numeric Unix timestamp.
///
/// The declaration order is the priority used when several precisions are
/// enabled at once and more than one yields a plausible instant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EpochPrecision {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl EpochPrecision {
    /// All precisions in priority order.
    pub const ALL: [EpochPrecision; 4] = [
        EpochPrecision::Second,
        EpochPrecision::Millisecond,
        EpochPrecision::Microsecond,
        EpochPrecision::Nanosecond,
    ];

    /// The epoch marker unit for this precision.
    pub fn unit(&self) -> TimeUnit {
        match self {
            EpochPrecision::Second => TimeUnit::EpochSecond,
            EpochPrecision::Millisecond => TimeUnit::EpochMillisecond,
            EpochPrecision::Microsecond => TimeUnit::EpochMicrosecond,
            EpochPrecision::Nanosecond => TimeUnit::EpochNanosecond,
        }
    }

    /// Number of fractional-second digits carried by this precision.
    pub fn fraction_digits(&self) -> usize {
        match self {
            EpochPrecision::Second => 0,
            EpochPrecision::Millisecond => 3,
            EpochPrecision::Microsecond => 6,
            EpochPrecision::Nanosecond => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_units_are_ordered_by_specificity() {
        assert!(TimeUnit::Day < TimeUnit::Month);
        assert!(TimeUnit::Month < TimeUnit::Year);
    }

    #[test]
    fn epoch_markers_map_to_precisions() {
        for precision in EpochPrecision::ALL {
            assert_eq!(precision.unit().epoch_precision(), Some(precision));
            assert!(precision.unit().is_epoch());
        }
        assert!(!TimeUnit::Day.is_epoch());
        assert_eq!(TimeUnit::Year.epoch_precision(), None);
    }

    #[test]
    fn month_resolution() {
        assert!(TimeUnit::Day.resolves_month());
        assert!(TimeUnit::Month.resolves_month());
        assert!(!TimeUnit::Year.resolves_month());
        assert!(TimeUnit::EpochMillisecond.resolves_month());
    }

    #[test]
    fn display_names() {
        assert_eq!(TimeUnit::Day.to_string(), "day");
        assert_eq!(TimeUnit::EpochNanosecond.to_string(), "epoch_nanosecond");
    }
}
