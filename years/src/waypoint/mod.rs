//! Timestamped nodes.
//!
//! A waypoint is anything with an identifier and (maybe) a point in time:
//! one level of a date-organized directory tree, a file dated by its
//! metadata, a free-standing label, or a plain group of other waypoints.

mod group;
mod hierarchy;
mod label;
mod metadata;
mod provider;

use std::fmt;

use chrono::{DateTime, Utc};

pub use group::GroupNode;
pub use hierarchy::HierarchyNode;
pub use label::LabelNode;
pub use metadata::{MetadataAccessor, MetadataNode};
pub use provider::{EntryStat, FsProvider, HierarchyProvider, MemoryProvider, ProviderError};

/// A node that may carry a calendar time.
///
/// Nodes without a time (`None`) are "non-calendar": they still take part
/// in the tree but are skipped by time-based filtering unless asked for.
pub trait Waypoint: fmt::Debug + Send + Sync {
    fn identifier(&self) -> &str;

    fn time(&self) -> Option<DateTime<Utc>>;

    fn is_container(&self) -> bool;

    /// Direct children. Empty for leaves.
    fn children(&self) -> Vec<&dyn Waypoint>;
}

/// Every descendant of `node` in pre-order, `node` itself excluded.
pub fn all_children(node: &dyn Waypoint) -> Vec<&dyn Waypoint> {
    let mut out = Vec::new();
    collect_descendants(node, &mut out);
    out
}

fn collect_descendants<'a>(node: &'a dyn Waypoint, out: &mut Vec<&'a dyn Waypoint>) {
    for child in node.children() {
        out.push(child);
        collect_descendants(child, out);
    }
}

/// Insert `child` after every existing child whose time is not later.
///
/// Keeps `children` sorted ascending by time, with `None` first and equal
/// times in insertion order.
pub(crate) fn insert_ordered<W: Waypoint>(children: &mut Vec<W>, child: W) {
    let time = child.time();
    let index = children.partition_point(|existing| existing.time() <= time);
    children.insert(index, child);
}

/// Identifier and time shared by the simpler node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBase {
    pub identifier: String,
    pub time: Option<DateTime<Utc>>,
}

impl NodeBase {
    pub fn new(identifier: impl Into<String>, time: Option<DateTime<Utc>>) -> Self {
        Self {
            identifier: identifier.into(),
            time,
        }
    }
}
