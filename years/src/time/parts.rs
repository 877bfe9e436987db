//! Partially known dates and ancestor backfill.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use super::error::ParseError;
use super::unit::TimeUnit;

/// Fields matched from a value by a layout.
///
/// Fields the layout does not mention stay `None`. When the parts are
/// resolved, missing date fields fall back to the reference defaults:
/// year 0, January, day 1, midnight UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub year_day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub nanosecond: Option<u32>,
    /// `Some(true)` for PM, `Some(false)` for AM.
    pub pm: Option<bool>,
    pub offset_seconds: Option<i32>,
}

impl DateParts {
    /// Fill in the year and month a layout did not supply, using the values
    /// already resolved by the ancestors.
    ///
    /// `unit` is the minimal unit of the layout that produced these parts.
    /// Only coarser units are taken over: a day-level node inherits year and
    /// month, a month-level node only the year.
    pub fn backfill(&mut self, unit: TimeUnit, ancestors: AncestorDate) {
        if unit < TimeUnit::Year && self.year.is_none() {
            self.year = ancestors.year;
        }
        if unit < TimeUnit::Month && self.month.is_none() && self.year_day.is_none() {
            self.month = ancestors.month;
        }
    }

    /// Build the UTC instant these parts describe.
    pub fn resolve(&self) -> Result<DateTime<Utc>, ParseError> {
        let year = self.year.unwrap_or(0);

        let date = match self.year_day {
            Some(year_day) => {
                let date = NaiveDate::from_yo_opt(year, year_day).ok_or(ParseError::InvalidDate {
                    reason: "day of year out of range",
                })?;
                let month_differs = self.month.is_some_and(|m| m != date.month());
                let day_differs = self.day.is_some_and(|d| d != date.day());
                if month_differs || day_differs {
                    return Err(ParseError::InvalidDate {
                        reason: "day of year does not match month and day",
                    });
                }
                date
            }
            None => NaiveDate::from_ymd_opt(year, self.month.unwrap_or(1), self.day.unwrap_or(1))
                .ok_or(ParseError::InvalidDate {
                    reason: "day out of range",
                })?,
        };

        let mut hour = self.hour.unwrap_or(0);
        match self.pm {
            Some(true) if hour < 12 => hour += 12,
            Some(false) if hour == 12 => hour = 0,
            _ => {}
        }

        let time = NaiveTime::from_hms_nano_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.nanosecond.unwrap_or(0),
        )
        .ok_or(ParseError::InvalidDate {
            reason: "time out of range",
        })?;

        let offset = Duration::seconds(i64::from(self.offset_seconds.unwrap_or(0)));
        let utc = date
            .and_time(time)
            .checked_sub_signed(offset)
            .ok_or(ParseError::InvalidDate {
                reason: "date overflow",
            })?;

        Ok(Utc.from_utc_datetime(&utc))
    }
}

/// Calendar units resolved so far on the way down a hierarchy.
///
/// Each level hands this record to its children so a node whose own name
/// only says `06` can still end up on the right month and year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AncestorDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl AncestorDate {
    /// The record passed to the children of a node.
    ///
    /// A calendar node contributes its year, and its month when it is
    /// resolved at month precision or finer. A node without a time forwards
    /// what it received unchanged.
    pub fn descend(self, time: Option<DateTime<Utc>>, unit: Option<TimeUnit>) -> Self {
        match (time, unit) {
            (Some(time), Some(unit)) => Self {
                year: Some(time.year()),
                month: unit.resolves_month().then(|| time.month()),
            },
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn resolve_uses_reference_defaults() {
        let parts = DateParts {
            day: Some(6),
            ..Default::default()
        };
        assert_eq!(parts.resolve().unwrap(), utc(0, 1, 6));
    }

    #[test]
    fn resolve_rejects_impossible_dates() {
        let parts = DateParts {
            year: Some(2023),
            month: Some(2),
            day: Some(29),
            ..Default::default()
        };
        assert_eq!(
            parts.resolve(),
            Err(ParseError::InvalidDate {
                reason: "day out of range"
            })
        );

        let parts = DateParts {
            year: Some(2023),
            year_day: Some(366),
            ..Default::default()
        };
        assert!(parts.resolve().is_err());
    }

    #[test]
    fn backfill_day_takes_year_and_month() {
        let mut parts = DateParts {
            day: Some(6),
            ..Default::default()
        };
        let ancestors = AncestorDate {
            year: Some(2024),
            month: Some(3),
        };
        parts.backfill(TimeUnit::Day, ancestors);
        assert_eq!(parts.resolve().unwrap(), utc(2024, 3, 6));
    }

    #[test]
    fn backfill_month_takes_only_year() {
        let mut parts = DateParts {
            month: Some(5),
            ..Default::default()
        };
        let ancestors = AncestorDate {
            year: Some(2024),
            month: Some(3),
        };
        parts.backfill(TimeUnit::Month, ancestors);
        assert_eq!(parts.resolve().unwrap(), utc(2024, 5, 1));
    }

    #[test]
    fn backfill_keeps_own_units() {
        let mut parts = DateParts {
            year: Some(2020),
            month: Some(1),
            day: Some(2),
            ..Default::default()
        };
        let ancestors = AncestorDate {
            year: Some(2024),
            month: Some(3),
        };
        parts.backfill(TimeUnit::Day, ancestors);
        assert_eq!(parts.resolve().unwrap(), utc(2020, 1, 2));
    }

    #[test]
    fn descend_from_calendar_nodes() {
        let root = AncestorDate::default();

        let year = root.descend(Some(utc(2024, 1, 1)), Some(TimeUnit::Year));
        assert_eq!(
            year,
            AncestorDate {
                year: Some(2024),
                month: None
            }
        );

        let month = year.descend(Some(utc(2024, 3, 1)), Some(TimeUnit::Month));
        assert_eq!(
            month,
            AncestorDate {
                year: Some(2024),
                month: Some(3)
            }
        );
    }

    #[test]
    fn descend_through_non_calendar_node() {
        let ancestors = AncestorDate {
            year: Some(2024),
            month: None,
        };
        assert_eq!(ancestors.descend(None, None), ancestors);
    }
}
