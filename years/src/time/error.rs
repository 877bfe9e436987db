//! Time parsing error types.

/// Errors returned when a value cannot be resolved to a point in time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A layout was demanded explicitly but contains no known token.
    #[error("unrecognized layout: {0:?}")]
    UnrecognizedLayout(String),

    /// The value does not match the given layout.
    #[error("failed to parse {value:?} with layout {layout:?}: {reason}")]
    LayoutMismatch {
        layout: String,
        value: String,
        reason: &'static str,
    },

    /// The matched fields do not form a real date.
    #[error("invalid date: {reason}")]
    InvalidDate { reason: &'static str },

    /// Every candidate layout, epoch mode and alias failed.
    #[error("unable to parse time from {0:?}")]
    Unparseable(String),

    /// No enabled epoch precision gave a plausible instant.
    #[error("epoch value {0} is out of range")]
    EpochOutOfRange(i64),

    /// The parser cannot handle this kind of input at all.
    #[error("misconfiguration: {0}")]
    Misconfiguration(&'static str),
}
