//! Symbolic names for instants relative to "now".

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Datelike, Utc};
use parking_lot::RwLock;

use super::mutate::MutatingTime;

/// Maps the current time to the instant an alias stands for.
pub type AliasFn = Arc<dyn Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync>;

/// Named instants such as `today` or `last-month`.
#[derive(Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, AliasFn>,
}

impl fmt::Debug for AliasTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("AliasTable").field("names", &names).finish()
    }
}

impl AliasTable {
    /// A table with no aliases.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The builtin aliases. All resolve to midnight UTC; weeks start on
    /// Sunday.
    pub fn builtin() -> Self {
        let mut table = Self::empty();

        table.insert("today", |now| day_start(now, 0));
        table.insert("yesterday", |now| day_start(now, -1));
        table.insert("tomorrow", |now| day_start(now, 1));

        table.insert("this-week", |now| week_start(now, 0));
        table.insert("last-week", |now| week_start(now, -7));
        table.insert("next-week", |now| week_start(now, 7));
        table.insert("this-weekend", |now| week_start(now, 6));
        table.insert("last-weekend", |now| week_start(now, -1));
        table.insert("next-weekend", |now| week_start(now, 13));

        table.insert("this-month", |now| month_start(now, 0));
        table.insert("last-month", |now| month_start(now, -1));
        table.insert("next-month", |now| month_start(now, 1));

        table.insert("this-year", |now| year_start(now, 0));
        table.insert("last-year", |now| year_start(now, -1));
        table.insert("next-year", |now| year_start(now, 1));

        table
    }

    /// Register `name`, replacing any alias already using it.
    pub fn insert<F>(&mut self, name: impl Into<String>, resolve: F)
    where
        F: Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(resolve));
    }

    /// Like [`insert`](Self::insert) for an already shared function.
    pub fn insert_arc(&mut self, name: impl Into<String>, resolve: AliasFn) {
        self.entries.insert(name.into(), resolve);
    }

    pub fn get(&self, name: &str) -> Option<&AliasFn> {
        self.entries.get(name)
    }

    /// Resolve `name` against `now`. Names are matched verbatim.
    pub fn resolve(&self, name: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.get(name).map(|resolve| resolve(now))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn day_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let mut t = now;
    MutatingTime::new(&mut t).truncate_to_day().add_days(days);
    t
}

fn week_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let since_sunday = i64::from(now.weekday().num_days_from_sunday());
    day_start(now, days - since_sunday)
}

fn month_start(now: DateTime<Utc>, months: i32) -> DateTime<Utc> {
    let mut t = now;
    MutatingTime::new(&mut t)
        .truncate_to_day()
        .set_day(1)
        .add_months(months);
    t
}

fn year_start(now: DateTime<Utc>, years: i32) -> DateTime<Utc> {
    let mut t = now;
    MutatingTime::new(&mut t)
        .truncate_to_day()
        .set_day(1)
        .set_month(1)
        .set_year(now.year() + years);
    t
}

static DEFAULT_ALIASES: LazyLock<RwLock<AliasTable>> =
    LazyLock::new(|| RwLock::new(AliasTable::builtin()));

/// A copy of the process-wide alias table used by default parsers.
pub fn default_aliases() -> AliasTable {
    DEFAULT_ALIASES.read().clone()
}

/// Add or replace an alias in the process-wide table.
pub fn register_default_alias<F>(name: impl Into<String>, resolve: F)
where
    F: Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync + 'static,
{
    DEFAULT_ALIASES.write().insert(name, resolve);
}

/// Restore the process-wide table to the builtin aliases.
pub fn reset_default_aliases() {
    *DEFAULT_ALIASES.write() = AliasTable::builtin();
}
