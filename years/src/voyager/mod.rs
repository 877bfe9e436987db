//! Ordered traversal and time lookup over a waypoint tree.

mod options;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::time::{ParserConfig, TimeParser, default_aliases, parser_defaults, std_clock};
use crate::waypoint::{Waypoint, all_children};

pub use options::{Direction, NodesMode, TraverseOptions};

/// Layouts a voyager always understands in navigation queries.
pub const NAVIGATION_LAYOUTS: [&str; 2] = ["2006-01-02", "2006-01"];

/// A parser for navigation queries: `config` with [`NAVIGATION_LAYOUTS`]
/// appended, the default alias table and the process clock.
pub fn navigation_parser(mut config: ParserConfig) -> TimeParser {
    for layout in NAVIGATION_LAYOUTS {
        if !config.layouts.iter().any(|l| l == layout) {
            config.layouts.push(layout.to_string());
        }
    }
    TimeParser::new(config)
        .with_aliases(default_aliases())
        .with_clock(std_clock())
}

/// Walks a waypoint tree in time order.
///
/// The tree is shared and never modified, so several voyagers can work on
/// the same root at once.
#[derive(Debug, Clone)]
pub struct Voyager {
    root: Arc<dyn Waypoint>,
    parser: TimeParser,
}

impl Voyager {
    /// A voyager whose queries use the process-wide parser defaults plus
    /// [`NAVIGATION_LAYOUTS`].
    pub fn new(root: Arc<dyn Waypoint>) -> Self {
        Self::with_parser(root, navigation_parser(parser_defaults()))
    }

    /// A voyager that resolves queries with `parser` as given.
    pub fn with_parser(root: Arc<dyn Waypoint>, parser: TimeParser) -> Self {
        Self { root, parser }
    }

    pub fn root(&self) -> &dyn Waypoint {
        self.root.as_ref()
    }

    pub fn parser(&self) -> &TimeParser {
        &self.parser
    }

    /// Call `visit` on every node that passes the filter in `options`.
    ///
    /// Future order is the whole tree sorted ascending by time, with `None`
    /// first. Nodes with equal times keep their pre-order position, so a
    /// container comes before an equally dated descendant. Past order is
    /// exactly the reverse.
    pub fn traverse<'a, F>(&'a self, options: TraverseOptions, mut visit: F)
    where
        F: FnMut(&'a dyn Waypoint),
    {
        let mut order = time_order(self.root());
        if options.direction == Direction::Past {
            order.reverse();
        }
        for node in order {
            if options.accepts(node.is_container(), node.time().is_some()) {
                visit(node);
            }
        }
    }

    /// The nodes [`traverse`](Self::traverse) would visit, in order.
    pub fn collect(&self, options: TraverseOptions) -> Vec<&dyn Waypoint> {
        let mut out = Vec::new();
        self.traverse(options, |node| out.push(node));
        out
    }

    /// The first node, oldest first, dated exactly at `query`.
    pub fn navigate(&self, query: &str) -> Option<&dyn Waypoint> {
        let target = self.resolve_query(query)?;
        self.navigate_to(target)
    }

    /// Every node dated exactly at `query`, oldest first.
    pub fn find(&self, query: &str) -> Vec<&dyn Waypoint> {
        match self.resolve_query(query) {
            Some(target) => self.find_at(target),
            None => Vec::new(),
        }
    }

    /// Like [`navigate`](Self::navigate) for an instant that is already
    /// resolved.
    pub fn navigate_to(&self, time: DateTime<Utc>) -> Option<&dyn Waypoint> {
        let mut found = None;
        self.traverse(lookup_options(), |node| {
            if found.is_none() && node.time() == Some(time) {
                found = Some(node);
            }
        });
        found
    }

    /// Like [`find`](Self::find) for an instant that is already resolved.
    pub fn find_at(&self, time: DateTime<Utc>) -> Vec<&dyn Waypoint> {
        let mut matches = Vec::new();
        self.traverse(lookup_options(), |node| {
            if node.time() == Some(time) {
                matches.push(node);
            }
        });
        matches
    }

    fn resolve_query(&self, query: &str) -> Option<DateTime<Utc>> {
        match self.parser.just_parse(query) {
            Ok(time) => Some(time),
            Err(e) => {
                debug!(query, error = %e, "navigation query not understood");
                None
            }
        }
    }
}

fn lookup_options() -> TraverseOptions {
    TraverseOptions::default().future().all()
}

/// The root and every descendant, stably sorted by time.
fn time_order(root: &dyn Waypoint) -> Vec<&dyn Waypoint> {
    let mut nodes = vec![root];
    nodes.extend(all_children(root));
    nodes.sort_by_key(|node| node.time());
    nodes
}
