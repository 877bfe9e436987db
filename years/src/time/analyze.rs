//! Structural analysis of a single layout fragment.

use std::collections::BTreeSet;

use serde::Serialize;

use super::layout::Layout;
use super::unit::{EpochPrecision, TimeUnit};

/// Marker that introduces an embedded Unix timestamp in a layout.
///
/// `U@` alone stands for seconds; three, six or nine zeros after it select
/// milli-, micro- or nanoseconds.
pub const EPOCH_SENTINEL: &str = "U@";
pub const EPOCH_SECONDS: &str = "U@";
pub const EPOCH_MILLISECONDS: &str = "U@000";
pub const EPOCH_MICROSECONDS: &str = "U@000000";
pub const EPOCH_NANOSECONDS: &str = "U@000000000";

/// How a layout fragment encodes time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Calendar tokens such as `2006`, `Jan` or `02`.
    Calendar,
    /// An embedded numeric epoch, e.g. `photo_U@000.jpg`.
    EpochTemplate,
}

/// What a layout fragment encodes.
///
/// A descriptor always names at least one unit; fragments without any are
/// reported as `None` by [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutDescriptor {
    units: BTreeSet<TimeUnit>,
    minimal_unit: TimeUnit,
    kind: PatternKind,
}

impl LayoutDescriptor {
    /// Units present in the fragment, most specific first.
    pub fn units(&self) -> &BTreeSet<TimeUnit> {
        &self.units
    }

    /// The most specific unit present.
    pub fn minimal_unit(&self) -> TimeUnit {
        self.minimal_unit
    }

    /// Whether the fragment is a calendar layout or an epoch template.
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Whether the fragment contains a token for `unit`.
    pub fn has_unit(&self, unit: TimeUnit) -> bool {
        self.units.contains(&unit)
    }

    /// Precision of the embedded epoch for epoch templates.
    pub fn epoch_precision(&self) -> Option<EpochPrecision> {
        match self.kind {
            PatternKind::EpochTemplate => self.minimal_unit.epoch_precision(),
            PatternKind::Calendar => None,
        }
    }
}

/// Analyze one layout fragment (a single hierarchy level, not a full path).
///
/// Returns `None` when the fragment contains no date token at all, which
/// callers treat as "not a calendar value here" rather than as an error.
///
/// # Examples
///
/// ```
/// use years::time::{analyze, PatternKind, TimeUnit};
///
/// let descriptor = analyze("2006-01").unwrap();
/// assert_eq!(descriptor.minimal_unit(), TimeUnit::Month);
/// assert_eq!(descriptor.kind(), PatternKind::Calendar);
///
/// assert!(analyze("foo-bar").is_none());
/// ```
pub fn analyze(fragment: &str) -> Option<LayoutDescriptor> {
    if let Some(template) = EpochTemplate::locate(fragment) {
        let unit = template.precision.unit();
        return Some(LayoutDescriptor {
            units: BTreeSet::from([unit]),
            minimal_unit: unit,
            kind: PatternKind::EpochTemplate,
        });
    }

    analyze_layout(&Layout::compile(fragment))
}

/// Analyze an already compiled calendar layout.
pub(crate) fn analyze_layout(layout: &Layout) -> Option<LayoutDescriptor> {
    let units: BTreeSet<TimeUnit> = layout
        .tokens()
        .iter()
        .filter_map(|token| token.calendar_unit())
        .collect();
    let minimal_unit = *units.first()?;

    Some(LayoutDescriptor {
        units,
        minimal_unit,
        kind: PatternKind::Calendar,
    })
}

/// Position of an embedded epoch inside a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EpochTemplate<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub precision: EpochPrecision,
}

impl<'a> EpochTemplate<'a> {
    /// Find the sentinel in `layout`. The longest precision marker wins.
    pub fn locate(layout: &'a str) -> Option<Self> {
        let start = layout.find(EPOCH_SENTINEL)?;
        let after = &layout[start + EPOCH_SENTINEL.len()..];
        let zeros = after.bytes().take_while(|&b| b == b'0').count();

        let precision = EpochPrecision::ALL
            .into_iter()
            .rev()
            .find(|p| p.fraction_digits() <= zeros)
            .unwrap_or(EpochPrecision::Second);
        let end = start + EPOCH_SENTINEL.len() + precision.fraction_digits();

        Some(Self {
            prefix: &layout[..start],
            suffix: &layout[end..],
            precision,
        })
    }

    /// Strip the literal text around the epoch from `value`, returning the
    /// digits in between.
    pub fn digits(&self, value: &'a str) -> Option<i64> {
        value
            .strip_prefix(self.prefix)?
            .strip_suffix(self.suffix)?
            .parse()
            .ok()
    }
}
