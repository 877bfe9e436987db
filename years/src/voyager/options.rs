//! Traversal options.

use serde::{Deserialize, Serialize};

/// Order of a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Newest first.
    #[default]
    Past,
    /// Oldest first.
    Future,
}

/// Which nodes a traversal visits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodesMode {
    LeavesOnly,
    ContainersOnly,
    #[default]
    All,
}

/// Configuration for [`Voyager::traverse`](super::Voyager::traverse).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraverseOptions {
    pub direction: Direction,

    pub nodes: NodesMode,

    /// Also visit nodes without a calendar time.
    pub include_non_calendar: bool,
}

impl TraverseOptions {
    /// Options with every field given explicitly.
    pub fn new(direction: Direction, nodes: NodesMode, include_non_calendar: bool) -> Self {
        Self {
            direction,
            nodes,
            include_non_calendar,
        }
    }

    pub fn past(mut self) -> Self {
        self.direction = Direction::Past;
        self
    }

    pub fn future(mut self) -> Self {
        self.direction = Direction::Future;
        self
    }

    pub fn leaves_only(mut self) -> Self {
        self.nodes = NodesMode::LeavesOnly;
        self
    }

    pub fn containers_only(mut self) -> Self {
        self.nodes = NodesMode::ContainersOnly;
        self
    }

    pub fn all(mut self) -> Self {
        self.nodes = NodesMode::All;
        self
    }

    /// Also visit nodes without a time.
    pub fn include_non_calendar(mut self) -> Self {
        self.include_non_calendar = true;
        self
    }

    /// Whether a node with these properties passes the filter.
    pub(crate) fn accepts(&self, is_container: bool, has_time: bool) -> bool {
        let kind_ok = match self.nodes {
            NodesMode::LeavesOnly => !is_container,
            NodesMode::ContainersOnly => is_container,
            NodesMode::All => true,
        };
        kind_ok && (has_time || self.include_non_calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = TraverseOptions::default();

        assert_eq!(options.direction, Direction::Past);
        assert_eq!(options.nodes, NodesMode::All);
        assert!(!options.include_non_calendar);
    }

    #[test]
    fn builders() {
        let options = TraverseOptions::default()
            .future()
            .leaves_only()
            .include_non_calendar();

        assert_eq!(
            options,
            TraverseOptions::new(Direction::Future, NodesMode::LeavesOnly, true)
        );
        assert_eq!(options.past().containers_only().nodes, NodesMode::ContainersOnly);
        assert_eq!(options.all().nodes, NodesMode::All);
    }

    #[test]
    fn filter() {
        let leaves = TraverseOptions::default().leaves_only();
        assert!(leaves.accepts(false, true));
        assert!(!leaves.accepts(true, true));
        assert!(!leaves.accepts(false, false));

        let containers = TraverseOptions::default().containers_only().include_non_calendar();
        assert!(containers.accepts(true, false));
        assert!(!containers.accepts(false, true));
    }

    #[test]
    fn from_json() {
        let options: TraverseOptions =
            serde_json::from_str(r#"{"direction": "future", "nodes": "leaves_only"}"#).unwrap();
        assert_eq!(options, TraverseOptions::default().future().leaves_only());
    }
}
