//! Resolving strings to instants.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::alias::{AliasTable, default_aliases};
use super::analyze::{EpochTemplate, analyze_layout};
use super::clock::{Clock, SystemClock, std_clock};
use super::error::ParseError;
use super::layout::Layout;
use super::unit::EpochPrecision;

/// 3000-01-01T00:00:00Z
const PLAUSIBLE_UNTIL: i64 = 32_503_680_000;

/// What a [`TimeParser`] accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Accept bare integers as Unix seconds.
    pub epoch_seconds: bool,

    pub epoch_milliseconds: bool,

    pub epoch_microseconds: bool,

    pub epoch_nanoseconds: bool,

    /// Accept alias names such as `today`.
    pub accept_aliases: bool,

    /// Layouts tried in order when no explicit layout is given.
    pub layouts: Vec<String>,
}

impl ParserConfig {
    /// Nothing enabled: no epochs, no aliases, no layouts.
    pub fn none() -> Self {
        Self {
            epoch_seconds: false,
            epoch_milliseconds: false,
            epoch_microseconds: false,
            epoch_nanoseconds: false,
            accept_aliases: false,
            layouts: Vec::new(),
        }
    }

    /// Enable or disable one epoch precision.
    pub fn with_epoch(mut self, precision: EpochPrecision, enabled: bool) -> Self {
        match precision {
            EpochPrecision::Second => self.epoch_seconds = enabled,
            EpochPrecision::Millisecond => self.epoch_milliseconds = enabled,
            EpochPrecision::Microsecond => self.epoch_microseconds = enabled,
            EpochPrecision::Nanosecond => self.epoch_nanoseconds = enabled,
        }
        self
    }

    /// Enable every epoch precision.
    pub fn with_all_epochs(self) -> Self {
        EpochPrecision::ALL
            .into_iter()
            .fold(self, |config, precision| config.with_epoch(precision, true))
    }

    /// Accept alias names such as `today`.
    pub fn with_aliases(mut self, enabled: bool) -> Self {
        self.accept_aliases = enabled;
        self
    }

    /// Append a layout to try.
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layouts.push(layout.into());
        self
    }

    /// Replace the layouts to try.
    pub fn with_layouts<I, S>(mut self, layouts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layouts = layouts.into_iter().map(Into::into).collect();
        self
    }

    /// Enabled epoch precisions in priority order.
    pub fn enabled_epochs(&self) -> Vec<EpochPrecision> {
        EpochPrecision::ALL
            .into_iter()
            .filter(|precision| self.accepts_epoch(*precision))
            .collect()
    }

    /// Whether `precision` is enabled.
    pub fn accepts_epoch(&self, precision: EpochPrecision) -> bool {
        match precision {
            EpochPrecision::Second => self.epoch_seconds,
            EpochPrecision::Millisecond => self.epoch_milliseconds,
            EpochPrecision::Microsecond => self.epoch_microseconds,
            EpochPrecision::Nanosecond => self.epoch_nanoseconds,
        }
    }

    /// Whether at least one epoch precision is enabled.
    pub fn any_epoch(&self) -> bool {
        EpochPrecision::ALL
            .into_iter()
            .any(|precision| self.accepts_epoch(precision))
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            epoch_seconds: true,
            accept_aliases: true,
            ..Self::none()
        }
    }
}

/// A resolved instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub time: DateTime<Utc>,
    /// Set when several enabled epoch precisions gave a plausible instant
    /// and the highest-priority one was picked.
    pub ambiguous: bool,
}

impl Resolved {
    fn exact(time: DateTime<Utc>) -> Self {
        Self {
            time,
            ambiguous: false,
        }
    }
}

/// Turns strings into instants using layouts, embedded epochs and aliases.
///
/// A parser is a snapshot: changing the process-wide defaults afterwards
/// does not affect it.
#[derive(Debug, Clone)]
pub struct TimeParser {
    config: ParserConfig,
    layouts: Vec<Layout>,
    aliases: AliasTable,
    clock: Arc<dyn Clock>,
}

impl TimeParser {
    /// A parser for `config` with the builtin aliases and the system clock.
    pub fn new(config: ParserConfig) -> Self {
        let layouts = config.layouts.iter().map(|l| Layout::compile(l)).collect();
        Self {
            config,
            layouts,
            aliases: AliasTable::builtin(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Read "now" from `clock` when resolving aliases.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the whole alias table.
    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Add or replace a single alias on this parser only.
    pub fn with_alias<F>(mut self, name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.aliases.insert(name, resolve);
        self
    }

    /// The configuration this parser was built with.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The aliases this parser resolves.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// The current reading of this parser's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Resolve `value` to an instant.
    ///
    /// With a non-empty `layout` only that layout is tried and its failure
    /// is returned as is. With an empty `layout`, integers go to the epoch
    /// precisions, then the configured layouts are tried in order, then the
    /// aliases.
    pub fn resolve(&self, layout: &str, value: &str) -> Result<Resolved, ParseError> {
        if layout.is_empty() {
            if let Ok(number) = value.parse::<i64>() {
                if self.config.any_epoch() {
                    return self.epoch_to_time(number);
                }
                if self.layouts.is_empty() {
                    return Err(ParseError::Misconfiguration(
                        "numeric input without epoch mode or layouts",
                    ));
                }
            }

            for candidate in &self.layouts {
                match self.try_layout(candidate, value) {
                    Ok(Some(time)) => return Ok(Resolved::exact(time)),
                    Ok(None) => trace!(layout = candidate.source(), "layout not recognized"),
                    Err(e) => trace!(layout = candidate.source(), error = %e, "layout did not match"),
                }
            }
        } else {
            let explicit = Layout::compile(layout);
            return match self.try_layout(&explicit, value)? {
                Some(time) => Ok(Resolved::exact(time)),
                None => Err(ParseError::UnrecognizedLayout(layout.to_string())),
            };
        }

        if self.config.accept_aliases
            && let Some(time) = self.aliases.resolve(value, self.clock.now())
        {
            return Ok(Resolved::exact(time));
        }

        Err(ParseError::Unparseable(value.to_string()))
    }

    /// [`resolve`](Self::resolve) without the ambiguity flag.
    pub fn parse(&self, layout: &str, value: &str) -> Result<DateTime<Utc>, ParseError> {
        self.resolve(layout, value).map(|resolved| resolved.time)
    }

    /// Parse with the configured layouts, epochs and aliases.
    pub fn just_parse(&self, value: &str) -> Result<DateTime<Utc>, ParseError> {
        self.parse("", value)
    }

    /// Interpret `number` with the enabled epoch precisions.
    ///
    /// A single enabled precision is used as is. With several, instants
    /// outside 1970..3000 are discarded and the first remaining precision
    /// in priority order wins.
    pub fn epoch_to_time(&self, number: i64) -> Result<Resolved, ParseError> {
        let enabled = self.config.enabled_epochs();

        match enabled.as_slice() {
            [] => Err(ParseError::Misconfiguration("no epoch precision enabled")),
            [precision] => epoch_at(number, *precision)
                .map(Resolved::exact)
                .ok_or(ParseError::EpochOutOfRange(number)),
            _ => {
                let mut plausible = enabled
                    .iter()
                    .filter_map(|precision| epoch_at(number, *precision))
                    .filter(is_plausible);
                let time = plausible
                    .next()
                    .ok_or(ParseError::EpochOutOfRange(number))?;
                let ambiguous = plausible.next().is_some();
                if ambiguous {
                    trace!(number, %time, "ambiguous epoch value");
                }
                Ok(Resolved { time, ambiguous })
            }
        }
    }

    /// Render `time` through `layout`.
    pub fn format(&self, layout: &str, time: &DateTime<Utc>) -> String {
        match EpochTemplate::locate(layout) {
            Some(template) => format!(
                "{}{}{}",
                template.prefix,
                epoch_number(time, template.precision),
                template.suffix
            ),
            None => Layout::compile(layout).format(time),
        }
    }

    /// `Ok(None)` for layouts with nothing to match against.
    fn try_layout(
        &self,
        layout: &Layout,
        value: &str,
    ) -> Result<Option<DateTime<Utc>>, ParseError> {
        if let Some(template) = EpochTemplate::locate(layout.source()) {
            let number = template
                .digits(value)
                .ok_or_else(|| ParseError::LayoutMismatch {
                    layout: layout.source().to_string(),
                    value: value.to_string(),
                    reason: "value does not match epoch template",
                })?;
            return epoch_at(number, template.precision)
                .map(Some)
                .ok_or(ParseError::EpochOutOfRange(number));
        }

        if analyze_layout(layout).is_none() {
            return Ok(None);
        }

        layout.parse(value)?.resolve().map(Some)
    }
}

impl Default for TimeParser {
    /// A parser built from the process-wide defaults.
    fn default() -> Self {
        Self::new(parser_defaults())
            .with_aliases(default_aliases())
            .with_clock(std_clock())
    }
}

/// Interpret `number` at one precision.
pub(crate) fn epoch_at(number: i64, precision: EpochPrecision) -> Option<DateTime<Utc>> {
    match precision {
        EpochPrecision::Second => DateTime::from_timestamp(number, 0),
        EpochPrecision::Millisecond => DateTime::from_timestamp_millis(number),
        EpochPrecision::Microsecond => DateTime::from_timestamp_micros(number),
        EpochPrecision::Nanosecond => Some(DateTime::from_timestamp_nanos(number)),
    }
}

fn epoch_number(time: &DateTime<Utc>, precision: EpochPrecision) -> i128 {
    let scale = 10_i128.pow(precision.fraction_digits() as u32);
    let fraction = i128::from(time.timestamp_subsec_nanos()) * scale / 1_000_000_000;
    i128::from(time.timestamp()) * scale + fraction
}

fn is_plausible(time: &DateTime<Utc>) -> bool {
    (0..PLAUSIBLE_UNTIL).contains(&time.timestamp())
}

static PARSER_DEFAULTS: LazyLock<RwLock<ParserConfig>> =
    LazyLock::new(|| RwLock::new(ParserConfig::default()));

/// The configuration [`TimeParser::default`] starts from.
pub fn parser_defaults() -> ParserConfig {
    PARSER_DEFAULTS.read().clone()
}

/// Replace the process-wide parser configuration. Parsers that already
/// exist keep the configuration they were built with.
pub fn set_parser_defaults(config: ParserConfig) {
    *PARSER_DEFAULTS.write() = config;
}

/// Edit the process-wide defaults in place.
///
/// ```
/// use years::time::{extend_parser_defaults, parser_defaults, reset_parser_defaults};
///
/// extend_parser_defaults(|config| config.layouts.push("2006-01-02".into()));
/// assert_eq!(parser_defaults().layouts, vec!["2006-01-02".to_string()]);
/// reset_parser_defaults();
/// ```
pub fn extend_parser_defaults(edit: impl FnOnce(&mut ParserConfig)) {
    edit(&mut PARSER_DEFAULTS.write());
}

/// Back to epoch seconds and aliases with no layouts.
pub fn reset_parser_defaults() {
    set_parser_defaults(ParserConfig::default());
}

/// Parse with a parser built from the process-wide defaults.
pub fn parse(layout: &str, value: &str) -> Result<DateTime<Utc>, ParseError> {
    TimeParser::default().parse(layout, value)
}

/// Parse `value` with a parser built from the process-wide defaults.
pub fn just_parse(value: &str) -> Result<DateTime<Utc>, ParseError> {
    TimeParser::default().just_parse(value)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use parking_lot::Mutex;

    use super::*;
    use crate::time::alias::{register_default_alias, reset_default_aliases};
    use crate::time::clock::{FixedClock, reset_std_clock, set_std_clock};

    /// Serializes tests that touch process-wide state.
    static GLOBALS: Mutex<()> = Mutex::new(());

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn fixed_parser(config: ParserConfig) -> TimeParser {
        let now = Utc.with_ymd_and_hms(2025, 5, 7, 15, 30, 0).unwrap();
        TimeParser::new(config).with_clock(Arc::new(FixedClock(now)))
    }

    #[test]
    fn default_config() {
        let config = ParserConfig::default();
        assert!(config.epoch_seconds);
        assert!(!config.epoch_milliseconds);
        assert!(!config.epoch_microseconds);
        assert!(!config.epoch_nanoseconds);
        assert!(config.accept_aliases);
        assert!(config.layouts.is_empty());
        assert_eq!(config.enabled_epochs(), vec![EpochPrecision::Second]);
    }

    #[test]
    fn config_from_json_fills_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"layouts": ["2006-01-02"], "epoch_milliseconds": true}"#)
                .unwrap();
        assert!(config.epoch_seconds);
        assert!(config.epoch_milliseconds);
        assert_eq!(config.layouts, vec!["2006-01-02".to_string()]);
    }

    #[test]
    fn aliases_use_the_clock() {
        let parser = fixed_parser(ParserConfig::default());
        assert_eq!(parser.just_parse("today").unwrap(), date(2025, 5, 7));
        assert_eq!(parser.just_parse("yesterday").unwrap(), date(2025, 5, 6));
        assert_eq!(parser.just_parse("tomorrow").unwrap(), date(2025, 5, 8));
    }

    #[test]
    fn aliases_can_be_disabled() {
        let parser = fixed_parser(ParserConfig::default().with_aliases(false));
        assert_eq!(
            parser.just_parse("today"),
            Err(ParseError::Unparseable("today".into()))
        );
    }

    #[test]
    fn custom_alias_on_one_parser() {
        let parser = fixed_parser(ParserConfig::default())
            .with_alias("launch", |_| date(1969, 7, 16));
        assert_eq!(parser.just_parse("launch").unwrap(), date(1969, 7, 16));
        assert!(TimeParser::new(ParserConfig::default()).just_parse("launch").is_err());
    }

    #[test]
    fn epoch_seconds_fast_path() {
        let parser = fixed_parser(ParserConfig::default());
        let resolved = parser.resolve("", "1709682885").unwrap();
        assert_eq!(resolved.time, Utc.with_ymd_and_hms(2024, 3, 5, 23, 54, 45).unwrap());
        assert!(!resolved.ambiguous);
    }

    #[test]
    fn single_precision_skips_plausibility() {
        let parser = fixed_parser(ParserConfig::none().with_epoch(EpochPrecision::Second, true));
        assert_eq!(parser.just_parse("-86400").unwrap(), date(1969, 12, 31));
    }

    #[test]
    fn several_precisions_pick_the_plausible_one() {
        let config = ParserConfig::none()
            .with_epoch(EpochPrecision::Second, true)
            .with_epoch(EpochPrecision::Millisecond, true);
        let parser = fixed_parser(config);

        let resolved = parser.resolve("", "1709682885000").unwrap();
        assert_eq!(resolved.time, Utc.with_ymd_and_hms(2024, 3, 5, 23, 54, 45).unwrap());
        assert!(!resolved.ambiguous);
    }

    #[test]
    fn ambiguous_epoch_prefers_seconds() {
        let parser = fixed_parser(ParserConfig::none().with_all_epochs());

        let resolved = parser.resolve("", "1709682885").unwrap();
        assert_eq!(resolved.time, Utc.with_ymd_and_hms(2024, 3, 5, 23, 54, 45).unwrap());
        assert!(resolved.ambiguous);
    }

    #[test]
    fn implausible_epoch() {
        let config = ParserConfig::none()
            .with_epoch(EpochPrecision::Second, true)
            .with_epoch(EpochPrecision::Millisecond, true);
        let parser = fixed_parser(config);
        assert_eq!(parser.just_parse("-5"), Err(ParseError::EpochOutOfRange(-5)));
    }

    #[test]
    fn numeric_without_epoch_or_layouts() {
        let parser = fixed_parser(ParserConfig::none().with_aliases(true));
        assert!(matches!(
            parser.just_parse("20240306"),
            Err(ParseError::Misconfiguration(_))
        ));
    }

    #[test]
    fn numeric_value_through_layouts() {
        let parser = fixed_parser(ParserConfig::none().with_layout("20060102"));
        assert_eq!(parser.just_parse("20240306").unwrap(), date(2024, 3, 6));
    }

    #[test]
    fn configured_layouts_in_order() {
        let config = ParserConfig::default().with_layouts(["2006-01-02", "02.01.2006", "Jan 2006"]);
        let parser = fixed_parser(config);

        assert_eq!(parser.just_parse("2024-03-06").unwrap(), date(2024, 3, 6));
        assert_eq!(parser.just_parse("06.03.2024").unwrap(), date(2024, 3, 6));
        assert_eq!(parser.just_parse("Mar 2024").unwrap(), date(2024, 3, 1));
        assert_eq!(
            parser.just_parse("March 6th"),
            Err(ParseError::Unparseable("March 6th".into()))
        );
    }

    #[test]
    fn non_strict_skips_unrecognized_layouts() {
        let parser = fixed_parser(ParserConfig::none().with_layouts(["notes", "2006"]));
        assert_eq!(parser.just_parse("2024").unwrap(), date(2024, 1, 1));
    }

    #[test]
    fn strict_layout_errors() {
        let parser = fixed_parser(ParserConfig::default().with_layout("02.01.2006"));

        assert!(matches!(
            parser.parse("2006-01-02", "06.03.2024"),
            Err(ParseError::LayoutMismatch { .. })
        ));
        assert_eq!(
            parser.parse("foo-bar", "2024-03-06"),
            Err(ParseError::UnrecognizedLayout("foo-bar".into()))
        );
        assert_eq!(parser.parse("2006-01-02", "2024-03-06").unwrap(), date(2024, 3, 6));
    }

    #[test]
    fn strict_layout_does_not_fall_back_to_aliases() {
        let parser = fixed_parser(ParserConfig::default());
        assert!(parser.parse("2006-01-02", "today").is_err());
    }

    #[test]
    fn impossible_date_is_an_error() {
        let parser = fixed_parser(ParserConfig::default());
        assert!(matches!(
            parser.parse("2006-01-02", "2023-02-29"),
            Err(ParseError::InvalidDate { .. })
        ));
    }

    #[test]
    fn epoch_template() {
        let parser = fixed_parser(ParserConfig::default());
        let time = parser
            .parse("photo_U@000.jpg", "photo_1709682885123.jpg")
            .unwrap();
        assert_eq!(
            time,
            Utc.with_ymd_and_hms(2024, 3, 5, 23, 54, 45).unwrap() + Duration::milliseconds(123)
        );

        assert!(matches!(
            parser.parse("photo_U@000.jpg", "image_1709682885123.jpg"),
            Err(ParseError::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn epoch_template_in_configured_layouts() {
        let config = ParserConfig::none().with_layouts(["2006-01-02", "log-U@.txt"]);
        let parser = fixed_parser(config);
        assert_eq!(
            parser.just_parse("log-1709596800.txt").unwrap(),
            date(2024, 3, 5)
        );
    }

    #[test]
    fn format_layouts_and_templates() {
        let parser = fixed_parser(ParserConfig::default());
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 23, 54, 45).unwrap() + Duration::milliseconds(123);

        assert_eq!(parser.format("2006/01/02", &time), "2024/03/05");
        assert_eq!(parser.format("photo_U@000.jpg", &time), "photo_1709682885123.jpg");
        assert_eq!(parser.format("U@", &time), "1709682885");
        assert_eq!(parser.format("U@000000000", &time), "1709682885123000000");
    }

    #[test]
    fn defaults_are_snapshotted() {
        let _guard = GLOBALS.lock();

        extend_parser_defaults(|config| config.layouts.push("2006-01-02".into()));
        let parser = TimeParser::default();
        reset_parser_defaults();

        assert_eq!(parser.just_parse("2024-03-06").unwrap(), date(2024, 3, 6));
        assert!(TimeParser::default().just_parse("2024-03-06").is_err());
    }

    #[test]
    fn default_aliases_and_clock() {
        let _guard = GLOBALS.lock();

        set_std_clock(Arc::new(FixedClock(date(2024, 3, 5))));
        register_default_alias("christmas", |now| {
            Utc.with_ymd_and_hms(chrono::Datelike::year(&now), 12, 25, 0, 0, 0)
                .single()
                .unwrap_or(now)
        });

        let result = (just_parse("today"), just_parse("christmas"));

        reset_std_clock();
        reset_default_aliases();

        assert_eq!(result.0.unwrap(), date(2024, 3, 5));
        assert_eq!(result.1.unwrap(), date(2024, 12, 25));
        assert!(just_parse("christmas").is_err());
    }

    #[test]
    fn set_defaults_replaces_by_value() {
        let _guard = GLOBALS.lock();

        set_parser_defaults(ParserConfig::none().with_layout("2006"));
        let result = parse("", "2024");
        let numeric_config = parser_defaults();
        reset_parser_defaults();

        assert_eq!(result.unwrap(), date(2024, 1, 1));
        assert!(!numeric_config.any_epoch());
        assert_eq!(parser_defaults(), ParserConfig::default());
    }
}
