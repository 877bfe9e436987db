//! In-place editing of a timestamp.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};

/// Fluent editor over a borrowed UTC timestamp.
///
/// Calendar setters normalize overflowing dates the way a wall calendar
/// counts forward: setting day 31 on 28 February 2023 yields 3 March.
/// Values outside the field's range (day 0, month 13, hour 24, ...) are a
/// programming error and panic.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use years::time::MutatingTime;
///
/// let mut t = Utc.with_ymd_and_hms(2025, 5, 7, 13, 45, 0).unwrap();
/// MutatingTime::new(&mut t).truncate_to_day().set_day(1);
/// assert_eq!(t, Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
/// ```
#[derive(Debug)]
pub struct MutatingTime<'a> {
    time: &'a mut DateTime<Utc>,
}

impl<'a> MutatingTime<'a> {
    pub fn new(time: &'a mut DateTime<Utc>) -> Self {
        Self { time }
    }

    /// The current value.
    pub fn time(&self) -> DateTime<Utc> {
        *self.time
    }

    /// Midnight of the same day.
    pub fn truncate_to_day(&mut self) -> &mut Self {
        self.replace_time(NaiveTime::MIN);
        self
    }

    pub fn set_year(&mut self, year: i32) -> &mut Self {
        let (month, day) = (self.time.month(), self.time.day());
        self.replace_date(year, month, day);
        self
    }

    /// # Panics
    ///
    /// If `month` is not in `1..=12`.
    pub fn set_month(&mut self, month: u32) -> &mut Self {
        assert!((1..=12).contains(&month), "month {month} out of range");
        let (year, day) = (self.time.year(), self.time.day());
        self.replace_date(year, month, day);
        self
    }

    /// # Panics
    ///
    /// If `day` is not in `1..=31`.
    pub fn set_day(&mut self, day: u32) -> &mut Self {
        assert!((1..=31).contains(&day), "day {day} out of range");
        let (year, month) = (self.time.year(), self.time.month());
        self.replace_date(year, month, day);
        self
    }

    /// # Panics
    ///
    /// If `hour` is not in `0..=23`.
    pub fn set_hour(&mut self, hour: u32) -> &mut Self {
        assert!(hour < 24, "hour {hour} out of range");
        *self.time = self.time.with_hour(hour).unwrap_or(*self.time);
        self
    }

    /// # Panics
    ///
    /// If `minute` is not in `0..=59`.
    pub fn set_minute(&mut self, minute: u32) -> &mut Self {
        assert!(minute < 60, "minute {minute} out of range");
        *self.time = self.time.with_minute(minute).unwrap_or(*self.time);
        self
    }

    /// # Panics
    ///
    /// If `second` is not in `0..=59`.
    pub fn set_second(&mut self, second: u32) -> &mut Self {
        assert!(second < 60, "second {second} out of range");
        *self.time = self.time.with_second(second).unwrap_or(*self.time);
        self
    }

    /// Replaces the whole sub-second part.
    ///
    /// # Panics
    ///
    /// If `millisecond` is not in `0..=999`.
    pub fn set_millisecond(&mut self, millisecond: u32) -> &mut Self {
        assert!(millisecond < 1_000, "millisecond {millisecond} out of range");
        self.set_nanosecond(millisecond * 1_000_000)
    }

    /// # Panics
    ///
    /// If `nanosecond` is not in `0..=999_999_999`.
    pub fn set_nanosecond(&mut self, nanosecond: u32) -> &mut Self {
        assert!(
            nanosecond < 1_000_000_000,
            "nanosecond {nanosecond} out of range"
        );
        *self.time = self.time.with_nanosecond(nanosecond).unwrap_or(*self.time);
        self
    }

    /// Shift by whole days, negative values going backwards.
    pub fn add_days(&mut self, days: i64) -> &mut Self {
        *self.time += Duration::days(days);
        self
    }

    /// Shift by whole months, keeping the day and letting it overflow.
    pub fn add_months(&mut self, months: i32) -> &mut Self {
        let total = self.time.year() * 12 + self.time.month0() as i32 + months;
        let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
        let day = self.time.day();
        self.replace_date(year, month0 as u32 + 1, day);
        self
    }

    /// Day `day` of `year`/`month`, counting past the end of a short month.
    fn replace_date(&mut self, year: i32, month: u32, day: u32) {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            panic!("year {year} out of range");
        };
        let date = first + Duration::days(i64::from(day) - 1);
        *self.time = date.and_time(self.time.time()).and_utc();
    }

    fn replace_time(&mut self, time: NaiveTime) {
        *self.time = self.time.date_naive().and_time(time).and_utc();
    }
}
