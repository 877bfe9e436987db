//! Calendar layouts, epochs and aliases.
//!
//! The building blocks are a [`Layout`] written in the reference-date
//! language, the [`analyze`] function that tells which calendar units a
//! layout fragment encodes, and the [`TimeParser`] that resolves strings
//! using layouts, embedded Unix timestamps and named aliases.

mod alias;
mod analyze;
mod clock;
mod error;
mod layout;
mod mutate;
mod parser;
mod parts;
mod unit;

pub use alias::{AliasFn, AliasTable, default_aliases, register_default_alias, reset_default_aliases};
pub use analyze::{
    EPOCH_MICROSECONDS, EPOCH_MILLISECONDS, EPOCH_NANOSECONDS, EPOCH_SECONDS, EPOCH_SENTINEL,
    LayoutDescriptor, PatternKind, analyze,
};
pub use clock::{Clock, FixedClock, SystemClock, reset_std_clock, set_std_clock, std_clock};
pub use error::ParseError;
pub use layout::Layout;
pub use mutate::MutatingTime;
pub use parser::{
    ParserConfig, Resolved, TimeParser, extend_parser_defaults, just_parse, parse,
    parser_defaults, reset_parser_defaults, set_parser_defaults,
};
pub use parts::{AncestorDate, DateParts};
pub use unit::{EpochPrecision, TimeUnit};

pub(crate) use analyze::EpochTemplate;
pub(crate) use parser::epoch_at;
