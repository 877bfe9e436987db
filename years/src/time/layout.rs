//! Reference-date layout language.
//!
//! A layout spells out one fixed reference instant, Mon Jan 2 15:04:05 MST
//! 2006, in the shape the text is written in. `2006-01-02` is an ISO date,
//! `Jan` a short month name and `15:04` a 24-hour clock. Anything that is not
//! a recognized token is literal text and has to match exactly.

use chrono::{DateTime, Datelike, Timelike, Utc};

use super::error::ParseError;
use super::parts::DateParts;
use super::unit::TimeUnit;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Indexed by days from Sunday.
const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// How a numeric UTC offset is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OffsetStyle {
    /// `-07`
    Hours,
    /// `-0700`
    Compact,
    /// `-07:00`
    Colon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    /// `January`
    LongMonth,
    /// `Jan`
    ShortMonth,
    /// `1`
    NumMonth,
    /// `01`
    ZeroMonth,
    /// `Monday`
    LongWeekday,
    /// `Mon`
    ShortWeekday,
    /// `2`
    Day,
    /// `_2`
    UnderDay,
    /// `02`
    ZeroDay,
    /// `__2`
    UnderYearDay,
    /// `002`
    ZeroYearDay,
    /// `15`
    Hour,
    /// `3`
    Hour12,
    /// `03`
    ZeroHour12,
    /// `4`
    Minute,
    /// `04`
    ZeroMinute,
    /// `5`
    Second,
    /// `05`
    ZeroSecond,
    /// `2006`
    LongYear,
    /// `06`
    Year,
    /// `PM` or `pm`
    Meridiem { upper: bool },
    /// `MST`
    ZoneName,
    /// `-07:00`, `Z0700`, ...
    Offset { style: OffsetStyle, iso_z: bool },
    /// `.000` (fixed width) or `.999` (trailing zeros dropped)
    Fraction {
        separator: char,
        digits: usize,
        optional: bool,
    },
}

impl Token {
    /// The calendar unit this token pins down, if any.
    pub(crate) fn calendar_unit(&self) -> Option<TimeUnit> {
        match self {
            Token::LongYear | Token::Year => Some(TimeUnit::Year),
            Token::LongMonth | Token::ShortMonth | Token::NumMonth | Token::ZeroMonth => {
                Some(TimeUnit::Month)
            }
            Token::Day
            | Token::UnderDay
            | Token::ZeroDay
            | Token::UnderYearDay
            | Token::ZeroYearDay => Some(TimeUnit::Day),
            _ => None,
        }
    }
}

/// A compiled layout.
///
/// # Examples
///
/// ```
/// use years::time::Layout;
///
/// let layout = Layout::compile("2006/Jan/02.txt");
/// let parts = layout.parse("2024/Mar/06.txt").unwrap();
/// assert_eq!(parts.year, Some(2024));
/// assert_eq!(parts.month, Some(3));
/// assert_eq!(parts.day, Some(6));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source: String,
    tokens: Vec<Token>,
}

impl Layout {
    /// Tokenize a layout string. Compilation never fails: text that is not
    /// a token is kept as a literal.
    pub fn compile(source: &str) -> Self {
        Self {
            source: source.to_string(),
            tokens: tokenize(source),
        }
    }

    /// Returns the layout as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Match `value` against the layout, returning the fields it supplies.
    pub fn parse(&self, value: &str) -> Result<DateParts, ParseError> {
        self.parse_parts(value)
            .map_err(|reason| ParseError::LayoutMismatch {
                layout: self.source.clone(),
                value: value.to_string(),
                reason,
            })
    }

    /// Render `time` (in UTC) through the layout.
    pub fn format(&self, time: &DateTime<Utc>) -> String {
        let mut out = String::with_capacity(self.source.len() + 8);

        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::LongMonth => out.push_str(MONTHS[time.month0() as usize]),
                Token::ShortMonth => out.push_str(&MONTHS[time.month0() as usize][..3]),
                Token::NumMonth => out.push_str(&time.month().to_string()),
                Token::ZeroMonth => out.push_str(&format!("{:02}", time.month())),
                Token::LongWeekday => {
                    out.push_str(WEEKDAYS[time.weekday().num_days_from_sunday() as usize])
                }
                Token::ShortWeekday => out.push_str(
                    &WEEKDAYS[time.weekday().num_days_from_sunday() as usize][..3],
                ),
                Token::Day => out.push_str(&time.day().to_string()),
                Token::UnderDay => out.push_str(&format!("{:>2}", time.day())),
                Token::ZeroDay => out.push_str(&format!("{:02}", time.day())),
                Token::UnderYearDay => out.push_str(&format!("{:>3}", time.ordinal())),
                Token::ZeroYearDay => out.push_str(&format!("{:03}", time.ordinal())),
                Token::Hour => out.push_str(&format!("{:02}", time.hour())),
                Token::Hour12 => out.push_str(&time.hour12().1.to_string()),
                Token::ZeroHour12 => out.push_str(&format!("{:02}", time.hour12().1)),
                Token::Minute => out.push_str(&time.minute().to_string()),
                Token::ZeroMinute => out.push_str(&format!("{:02}", time.minute())),
                Token::Second => out.push_str(&time.second().to_string()),
                Token::ZeroSecond => out.push_str(&format!("{:02}", time.second())),
                Token::LongYear => out.push_str(&format!("{:04}", time.year())),
                Token::Year => out.push_str(&format!("{:02}", time.year().rem_euclid(100))),
                Token::Meridiem { upper } => {
                    let pm = time.hour12().0;
                    out.push_str(match (pm, *upper) {
                        (true, true) => "PM",
                        (false, true) => "AM",
                        (true, false) => "pm",
                        (false, false) => "am",
                    });
                }
                Token::ZoneName => out.push_str("UTC"),
                Token::Offset { style, iso_z } => {
                    if *iso_z {
                        out.push('Z');
                    } else {
                        out.push_str(match style {
                            OffsetStyle::Hours => "+00",
                            OffsetStyle::Compact => "+0000",
                            OffsetStyle::Colon => "+00:00",
                        });
                    }
                }
                Token::Fraction {
                    separator,
                    digits,
                    optional,
                } => {
                    let nanos = format!("{:09}", time.nanosecond() % 1_000_000_000);
                    let mut fraction: String = nanos.chars().take(*digits).collect();
                    if *optional {
                        fraction.truncate(fraction.trim_end_matches('0').len());
                        if fraction.is_empty() {
                            continue;
                        }
                    } else {
                        while fraction.len() < *digits {
                            fraction.push('0');
                        }
                    }
                    out.push(*separator);
                    out.push_str(&fraction);
                }
            }
        }

        out
    }

    fn parse_parts(&self, value: &str) -> Result<DateParts, &'static str> {
        let mut parts = DateParts::default();
        let mut rest = value;

        for (index, token) in self.tokens.iter().enumerate() {
            rest = match token {
                Token::Literal(text) => rest
                    .strip_prefix(text.as_str())
                    .ok_or("literal text mismatch")?,
                Token::LongMonth | Token::ShortMonth => {
                    let width = matches!(token, Token::ShortMonth).then_some(3);
                    let (month_index, rest) =
                        take_name(rest, &MONTHS, width).ok_or("bad month name")?;
                    parts.month = Some(month_index as u32 + 1);
                    rest
                }
                Token::NumMonth | Token::ZeroMonth => {
                    let (month, rest) = if matches!(token, Token::ZeroMonth) {
                        take_fixed(rest, 2)
                    } else {
                        take_digits(rest, 2)
                    }
                    .ok_or("bad month digits")?;
                    if !(1..=12).contains(&month) {
                        return Err("month out of range");
                    }
                    parts.month = Some(month);
                    rest
                }
                Token::LongWeekday | Token::ShortWeekday => {
                    let width = matches!(token, Token::ShortWeekday).then_some(3);
                    take_name(rest, &WEEKDAYS, width)
                        .ok_or("bad weekday name")?
                        .1
                }
                Token::Day | Token::UnderDay | Token::ZeroDay => {
                    let (day, rest) = match token {
                        Token::ZeroDay => take_fixed(rest, 2),
                        Token::UnderDay => take_digits(rest.strip_prefix(' ').unwrap_or(rest), 2),
                        _ => take_digits(rest, 2),
                    }
                    .ok_or("bad day digits")?;
                    if !(1..=31).contains(&day) {
                        return Err("day out of range");
                    }
                    parts.day = Some(day);
                    rest
                }
                Token::UnderYearDay | Token::ZeroYearDay => {
                    let (day, rest) = if matches!(token, Token::ZeroYearDay) {
                        take_fixed(rest, 3)
                    } else {
                        let trimmed = rest.strip_prefix(' ').unwrap_or(rest);
                        take_digits(trimmed.strip_prefix(' ').unwrap_or(trimmed), 3)
                    }
                    .ok_or("bad day-of-year digits")?;
                    if !(1..=366).contains(&day) {
                        return Err("day of year out of range");
                    }
                    parts.year_day = Some(day);
                    rest
                }
                Token::Hour => {
                    let (hour, rest) = take_digits(rest, 2).ok_or("bad hour digits")?;
                    if hour > 23 {
                        return Err("hour out of range");
                    }
                    parts.hour = Some(hour);
                    rest
                }
                Token::Hour12 | Token::ZeroHour12 => {
                    let (hour, rest) = if matches!(token, Token::ZeroHour12) {
                        take_fixed(rest, 2)
                    } else {
                        take_digits(rest, 2)
                    }
                    .ok_or("bad hour digits")?;
                    if hour > 12 {
                        return Err("hour out of range");
                    }
                    parts.hour = Some(hour);
                    rest
                }
                Token::Minute | Token::ZeroMinute => {
                    let (minute, rest) = if matches!(token, Token::ZeroMinute) {
                        take_fixed(rest, 2)
                    } else {
                        take_digits(rest, 2)
                    }
                    .ok_or("bad minute digits")?;
                    if minute > 59 {
                        return Err("minute out of range");
                    }
                    parts.minute = Some(minute);
                    rest
                }
                Token::Second | Token::ZeroSecond => {
                    let (second, mut rest) = if matches!(token, Token::ZeroSecond) {
                        take_fixed(rest, 2)
                    } else {
                        take_digits(rest, 2)
                    }
                    .ok_or("bad second digits")?;
                    if second > 59 {
                        return Err("second out of range");
                    }
                    parts.second = Some(second);

                    // A fraction right after the seconds is accepted even when
                    // the layout does not spell one out.
                    let layout_has_fraction =
                        matches!(self.tokens.get(index + 1), Some(Token::Fraction { .. }));
                    if !layout_has_fraction
                        && let Some((nanos, after)) = take_fraction(rest, None)
                    {
                        parts.nanosecond = Some(nanos);
                        rest = after;
                    }
                    rest
                }
                Token::LongYear => {
                    let (year, rest) = take_fixed(rest, 4).ok_or("bad year digits")?;
                    parts.year = Some(year as i32);
                    rest
                }
                Token::Year => {
                    let (year, rest) = take_fixed(rest, 2).ok_or("bad year digits")?;
                    let year = year as i32;
                    parts.year = Some(if year >= 69 { 1900 + year } else { 2000 + year });
                    rest
                }
                Token::Meridiem { upper } => {
                    let text = rest.get(..2).ok_or("bad meridiem")?;
                    let pm = match (text, *upper) {
                        ("AM", true) | ("am", false) => false,
                        ("PM", true) | ("pm", false) => true,
                        _ => return Err("bad meridiem"),
                    };
                    parts.pm = Some(pm);
                    &rest[2..]
                }
                Token::ZoneName => {
                    let len = rest.bytes().take_while(u8::is_ascii_uppercase).count();
                    if !(3..=5).contains(&len) {
                        return Err("bad time zone name");
                    }
                    if matches!(&rest[..len], "UTC" | "GMT") {
                        parts.offset_seconds = Some(0);
                    }
                    &rest[len..]
                }
                Token::Offset { style, iso_z } => {
                    let (offset, rest) =
                        take_offset(rest, *style, *iso_z).ok_or("bad time zone offset")?;
                    parts.offset_seconds = Some(offset);
                    rest
                }
                Token::Fraction {
                    digits, optional, ..
                } => {
                    if *optional {
                        match take_fraction(rest, None) {
                            Some((nanos, rest)) => {
                                parts.nanosecond = Some(nanos);
                                rest
                            }
                            None => rest,
                        }
                    } else {
                        let (nanos, rest) =
                            take_fraction(rest, Some(*digits)).ok_or("bad fractional second")?;
                        parts.nanosecond = Some(nanos);
                        rest
                    }
                }
            };
        }

        if !rest.is_empty() {
            return Err("extra text after layout");
        }

        Ok(parts)
    }
}

fn tokenize(layout: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = layout;

    while let Some(ch) = rest.chars().next() {
        match token_at(rest) {
            Some((token, len)) => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(token);
                rest = &rest[len..];
            }
            None => {
                literal.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    tokens
}

/// Recognize the token starting at the beginning of `s`, returning it with
/// its byte length.
fn token_at(s: &str) -> Option<(Token, usize)> {
    let bytes = s.as_bytes();

    match bytes[0] {
        b'J' => {
            if s.starts_with("January") {
                Some((Token::LongMonth, 7))
            } else if s.starts_with("Jan") && !starts_with_lower(&s[3..]) {
                Some((Token::ShortMonth, 3))
            } else {
                None
            }
        }
        b'M' => {
            if s.starts_with("Monday") {
                Some((Token::LongWeekday, 6))
            } else if s.starts_with("Mon") && !starts_with_lower(&s[3..]) {
                Some((Token::ShortWeekday, 3))
            } else if s.starts_with("MST") {
                Some((Token::ZoneName, 3))
            } else {
                None
            }
        }
        b'0' => match bytes.get(1) {
            Some(b'0') if bytes.get(2) == Some(&b'2') => Some((Token::ZeroYearDay, 3)),
            Some(b'1') => Some((Token::ZeroMonth, 2)),
            Some(b'2') => Some((Token::ZeroDay, 2)),
            Some(b'3') => Some((Token::ZeroHour12, 2)),
            Some(b'4') => Some((Token::ZeroMinute, 2)),
            Some(b'5') => Some((Token::ZeroSecond, 2)),
            Some(b'6') => Some((Token::Year, 2)),
            _ => None,
        },
        b'1' => {
            if s.starts_with("15") {
                Some((Token::Hour, 2))
            } else {
                Some((Token::NumMonth, 1))
            }
        }
        b'2' => {
            if s.starts_with("2006") {
                Some((Token::LongYear, 4))
            } else {
                Some((Token::Day, 1))
            }
        }
        b'_' => {
            // `_2006` is an underscore followed by the year.
            if s.starts_with("_2006") {
                None
            } else if s.starts_with("__2") {
                Some((Token::UnderYearDay, 3))
            } else if s.starts_with("_2") {
                Some((Token::UnderDay, 2))
            } else {
                None
            }
        }
        b'3' => Some((Token::Hour12, 1)),
        b'4' => Some((Token::Minute, 1)),
        b'5' => Some((Token::Second, 1)),
        b'P' if s.starts_with("PM") => Some((Token::Meridiem { upper: true }, 2)),
        b'p' if s.starts_with("pm") => Some((Token::Meridiem { upper: false }, 2)),
        b'-' => offset_at(&s[1..]).map(|(style, len)| (Token::Offset { style, iso_z: false }, len + 1)),
        b'Z' => offset_at(&s[1..]).map(|(style, len)| (Token::Offset { style, iso_z: true }, len + 1)),
        b'.' | b',' => {
            let digit = *bytes.get(1)?;
            if digit != b'0' && digit != b'9' {
                return None;
            }
            let run = bytes[1..].iter().take_while(|&&b| b == digit).count();
            if bytes.get(1 + run).is_some_and(u8::is_ascii_digit) {
                return None;
            }
            Some((
                Token::Fraction {
                    separator: bytes[0] as char,
                    digits: run,
                    optional: digit == b'9',
                },
                1 + run,
            ))
        }
        _ => None,
    }
}

fn offset_at(s: &str) -> Option<(OffsetStyle, usize)> {
    if s.starts_with("07:00") {
        Some((OffsetStyle::Colon, 5))
    } else if s.starts_with("0700") {
        Some((OffsetStyle::Compact, 4))
    } else if s.starts_with("07") {
        Some((OffsetStyle::Hours, 2))
    } else {
        None
    }
}

fn starts_with_lower(s: &str) -> bool {
    s.as_bytes().first().is_some_and(u8::is_ascii_lowercase)
}

/// Take exactly `width` ASCII digits.
fn take_fixed(s: &str, width: usize) -> Option<(u32, &str)> {
    let digits = s.get(..width)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, &s[width..]))
}

/// Take between one and `max` ASCII digits, greedily.
fn take_digits(s: &str, max: usize) -> Option<(u32, &str)> {
    let len = s.bytes().take(max).take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    Some((s[..len].parse().ok()?, &s[len..]))
}

/// Case-insensitive lookup of a month or weekday name, optionally cut to
/// `width` characters. Returns the index of the matched name.
fn take_name<'a>(s: &'a str, names: &[&str], width: Option<usize>) -> Option<(usize, &'a str)> {
    names.iter().enumerate().find_map(|(index, name)| {
        let name = width.map_or(*name, |w| &name[..w]);
        let candidate = s.get(..name.len())?;
        candidate
            .eq_ignore_ascii_case(name)
            .then(|| (index, &s[name.len()..]))
    })
}

/// Take a `.` or `,` separated fraction. With `exact` the number of digits
/// must match; otherwise every following digit is consumed.
fn take_fraction(s: &str, exact: Option<usize>) -> Option<(u32, &str)> {
    let after_separator = s.strip_prefix(['.', ','])?;
    let len = after_separator
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    let len = match exact {
        Some(width) if len < width => return None,
        Some(width) => width,
        None if len == 0 => return None,
        None => len,
    };

    let digits = &after_separator[..len];
    let mut nanos: String = digits.chars().take(9).collect();
    while nanos.len() < 9 {
        nanos.push('0');
    }

    Some((nanos.parse().ok()?, &after_separator[len..]))
}

fn take_offset(s: &str, style: OffsetStyle, iso_z: bool) -> Option<(i32, &str)> {
    if iso_z && let Some(rest) = s.strip_prefix('Z') {
        return Some((0, rest));
    }

    let sign = match s.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, rest) = take_fixed(&s[1..], 2)?;
    let (minutes, rest) = match style {
        OffsetStyle::Hours => (0, rest),
        OffsetStyle::Compact => take_fixed(rest, 2)?,
        OffsetStyle::Colon => take_fixed(rest.strip_prefix(':')?, 2)?,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    Some((sign * (hours * 3600 + minutes * 60) as i32, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn tokenizes_iso_date() {
        let layout = Layout::compile("2006-01-02");
        assert_eq!(
            layout.tokens(),
            &[
                Token::LongYear,
                Token::Literal("-".into()),
                Token::ZeroMonth,
                Token::Literal("-".into()),
                Token::ZeroDay,
            ]
        );
    }

    #[test]
    fn hour_is_not_a_month() {
        let layout = Layout::compile("15:04");
        assert_eq!(
            layout.tokens(),
            &[Token::Hour, Token::Literal(":".into()), Token::ZeroMinute]
        );
    }

    #[test]
    fn names_followed_by_lowercase_are_literal() {
        let layout = Layout::compile("Janet");
        assert_eq!(layout.tokens(), &[Token::Literal("Janet".into())]);

        let layout = Layout::compile("January");
        assert_eq!(layout.tokens(), &[Token::LongMonth]);
    }

    #[test]
    fn underscore_before_year_is_literal() {
        let layout = Layout::compile("_2006");
        assert_eq!(
            layout.tokens(),
            &[Token::Literal("_".into()), Token::LongYear]
        );
    }

    #[test]
    fn file_extension_is_not_a_fraction() {
        let layout = Layout::compile("02.txt");
        assert_eq!(
            layout.tokens(),
            &[Token::ZeroDay, Token::Literal(".txt".into())]
        );
    }

    #[test]
    fn parse_full_date() {
        let parts = Layout::compile("2006-01-02").parse("2024-03-06").unwrap();
        assert_eq!(parts.year, Some(2024));
        assert_eq!(parts.month, Some(3));
        assert_eq!(parts.day, Some(6));
        assert_eq!(parts.resolve().unwrap(), utc(2024, 3, 6, 0, 0, 0));
    }

    #[test]
    fn parse_month_name_case_insensitive() {
        let parts = Layout::compile("Jan").parse("mar").unwrap();
        assert_eq!(parts.month, Some(3));
        assert_eq!(parts.year, None);

        let parts = Layout::compile("January 2006").parse("September 2023").unwrap();
        assert_eq!(parts.month, Some(9));
        assert_eq!(parts.year, Some(2023));
    }

    #[test]
    fn parse_two_digit_year() {
        let layout = Layout::compile("06");
        assert_eq!(layout.parse("99").unwrap().year, Some(1999));
        assert_eq!(layout.parse("24").unwrap().year, Some(2024));
        assert_eq!(layout.parse("69").unwrap().year, Some(1969));
        assert_eq!(layout.parse("68").unwrap().year, Some(2068));
    }

    #[test]
    fn parse_clock_with_meridiem_and_offset() {
        let layout = Layout::compile("2006-01-02 3:04PM -07:00");
        let time = layout
            .parse("2024-03-06 1:30PM +02:00")
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(time, utc(2024, 3, 6, 11, 30, 0));

        let time = layout
            .parse("2024-03-06 12:05AM -01:00")
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(time, utc(2024, 3, 6, 1, 5, 0));
    }

    #[test]
    fn parse_iso_z_offset() {
        let layout = Layout::compile("2006-01-02T15:04:05Z07:00");
        let time = layout
            .parse("2024-03-06T10:20:30Z")
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(time, utc(2024, 3, 6, 10, 20, 30));
    }

    #[test]
    fn parse_fractions() {
        let layout = Layout::compile("15:04:05.000");
        let parts = layout.parse("10:20:30.123").unwrap();
        assert_eq!(parts.nanosecond, Some(123_000_000));
        assert!(layout.parse("10:20:30.12").is_err());

        let layout = Layout::compile("15:04:05.999");
        assert_eq!(layout.parse("10:20:30").unwrap().nanosecond, None);
        assert_eq!(
            layout.parse("10:20:30.5").unwrap().nanosecond,
            Some(500_000_000)
        );

        // Implicit fraction after seconds.
        let layout = Layout::compile("15:04:05");
        assert_eq!(
            layout.parse("10:20:30.000001").unwrap().nanosecond,
            Some(1_000)
        );
    }

    #[test]
    fn parse_day_of_year() {
        let parts = Layout::compile("2006.002").parse("2024.066").unwrap();
        assert_eq!(parts.resolve().unwrap(), utc(2024, 3, 6, 0, 0, 0));
    }

    #[test]
    fn parse_rejects_out_of_range_values() {
        let layout = Layout::compile("2006-01-02");
        assert!(layout.parse("2024-13-01").is_err());
        assert!(layout.parse("2024-00-01").is_err());
        assert!(layout.parse("2024-01-32").is_err());
        assert!(Layout::compile("15:04").parse("24:00").is_err());
        assert!(Layout::compile("15:04").parse("12:60").is_err());
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        let layout = Layout::compile("2006-01-02");
        assert!(layout.parse("2024/03/06").is_err());
        assert!(layout.parse("2024-3-06").is_err());
        assert!(layout.parse("2024-03-06x").is_err());
        assert!(layout.parse("").is_err());
    }

    #[test]
    fn parse_flexible_digits() {
        let layout = Layout::compile("2006/1/2");
        let parts = layout.parse("2024/3/6").unwrap();
        assert_eq!((parts.month, parts.day), (Some(3), Some(6)));
        let parts = layout.parse("2024/11/16").unwrap();
        assert_eq!((parts.month, parts.day), (Some(11), Some(16)));

        let layout = Layout::compile("Jan _2");
        assert_eq!(layout.parse("Mar  6").unwrap().day, Some(6));
    }

    #[test]
    fn mismatch_error_carries_context() {
        let err = Layout::compile("2006").parse("abcd").unwrap_err();
        assert_eq!(
            err,
            ParseError::LayoutMismatch {
                layout: "2006".into(),
                value: "abcd".into(),
                reason: "bad year digits",
            }
        );
    }

    #[test]
    fn format_renders_tokens() {
        let t = Utc
            .with_ymd_and_hms(2024, 3, 6, 13, 5, 9)
            .unwrap()
            .with_nanosecond(120_000_000)
            .unwrap();

        assert_eq!(Layout::compile("2006-01-02").format(&t), "2024-03-06");
        assert_eq!(Layout::compile("Jan _2 06").format(&t), "Mar  6 24");
        assert_eq!(Layout::compile("Monday, January 2").format(&t), "Wednesday, March 6");
        assert_eq!(Layout::compile("3:04:05pm").format(&t), "1:05:09pm");
        assert_eq!(Layout::compile("15:04:05.000").format(&t), "13:05:09.120");
        assert_eq!(Layout::compile("15:04:05.999").format(&t), "13:05:09.12");
        assert_eq!(Layout::compile("002").format(&t), "066");
        assert_eq!(Layout::compile("Z07:00").format(&t), "Z");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use proptest::prelude::*;

    prop_compose! {
        fn valid_datetime()(
            year in 1000i32..3000,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
        ) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(year, month, day, hour, minute, second).unwrap()
        }
    }

    fn full_date_layout() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "2006-01-02",
            "02.01.2006",
            "2006/Jan/02.txt",
            "January 2, 2006",
            "Mon Jan _2 2006",
            "2006.002",
            "20060102",
        ])
    }

    proptest! {
        /// Formatting then parsing returns the instant truncated to the day.
        #[test]
        fn date_layout_roundtrip(t in valid_datetime(), layout in full_date_layout()) {
            let layout = Layout::compile(layout);
            let text = layout.format(&t);
            let parsed = layout.parse(&text).unwrap().resolve().unwrap();
            let midnight = NaiveDate::from_ymd_opt(t.year(), t.month(), t.day())
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            prop_assert_eq!(parsed, Utc.from_utc_datetime(&midnight));
        }

        /// A layout with a full clock round-trips to the second.
        #[test]
        fn datetime_layout_roundtrip(t in valid_datetime()) {
            let layout = Layout::compile("2006-01-02T15:04:05Z07:00");
            let text = layout.format(&t);
            prop_assert_eq!(layout.parse(&text).unwrap().resolve().unwrap(), t);
        }

        /// Parsing never panics on arbitrary input.
        #[test]
        fn parse_arbitrary_input(value in ".{0,24}") {
            let _ = Layout::compile("2006-01-02 15:04:05.999 MST").parse(&value);
        }
    }
}
