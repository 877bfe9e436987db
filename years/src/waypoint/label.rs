//! Waypoints dated by their own text.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::time::TimeParser;

use super::{NodeBase, Waypoint};

/// A free-standing string such as `2024-03-06` or `yesterday`, dated by
/// parsing the string itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelNode {
    base: NodeBase,
}

impl LabelNode {
    /// Parse `label` with `layout`, or with the parser's own layouts, epochs
    /// and aliases when `layout` is empty. A label that does not parse
    /// becomes a non-calendar node.
    pub fn parse(label: impl Into<String>, layout: &str, parser: &TimeParser) -> Self {
        let label = label.into();
        let time = match parser.parse(layout, &label) {
            Ok(time) => Some(time),
            Err(e) => {
                debug!(label = %label, error = %e, "label is not a calendar value");
                None
            }
        };
        Self::with_time(label, time)
    }

    /// A label with a time that is already known.
    pub fn with_time(label: impl Into<String>, time: Option<DateTime<Utc>>) -> Self {
        Self {
            base: NodeBase::new(label, time),
        }
    }
}

impl Waypoint for LabelNode {
    fn identifier(&self) -> &str {
        &self.base.identifier
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        self.base.time
    }

    fn is_container(&self) -> bool {
        false
    }

    fn children(&self) -> Vec<&dyn Waypoint> {
        Vec::new()
    }
}
