//! Plain containers of other waypoints.

use chrono::{DateTime, Utc};

use crate::time::TimeParser;

use super::{LabelNode, Waypoint};

/// A container without a time of its own, holding any mix of waypoints in
/// the order they were added.
#[derive(Debug, Default)]
pub struct GroupNode {
    identifier: String,
    children: Vec<Box<dyn Waypoint>>,
}

impl GroupNode {
    /// An empty group.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            children: Vec::new(),
        }
    }

    /// A group of [`LabelNode`]s parsed from `labels`.
    pub fn from_labels<I, S>(identifier: impl Into<String>, labels: I, layout: &str, parser: &TimeParser) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut group = Self::new(identifier);
        for label in labels {
            group.push(Box::new(LabelNode::parse(label, layout, parser)));
        }
        group
    }

    /// Append `child` after the existing children.
    pub fn push(&mut self, child: Box<dyn Waypoint>) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Waypoint for GroupNode {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn is_container(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<&dyn Waypoint> {
        self.children.iter().map(|c| &**c as &dyn Waypoint).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ParserConfig;

    #[test]
    fn keeps_insertion_order() {
        let parser = TimeParser::new(ParserConfig::default().with_layout("2006-01-02"));
        let group = GroupNode::from_labels("dates", ["2024-03-06", "2024-01-01", "later"], "", &parser);

        assert_eq!(group.len(), 3);
        assert_eq!(group.time(), None);
        assert!(group.is_container());

        let ids: Vec<&str> = group.children().iter().map(|c| c.identifier()).collect();
        assert_eq!(ids, vec!["2024-03-06", "2024-01-01", "later"]);
        assert!(group.children()[2].time().is_none());
    }

    #[test]
    fn holds_mixed_children() {
        let mut inner = GroupNode::new("inner");
        inner.push(Box::new(LabelNode::with_time("x", None)));

        let mut group = GroupNode::new("outer");
        group
            .push(Box::new(inner))
            .push(Box::new(LabelNode::with_time("y", None)));

        assert_eq!(group.children()[0].children().len(), 1);
        assert!(!group.is_empty());
    }
}
