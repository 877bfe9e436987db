//! Nodes dated by their position in a nested layout.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::time::{
    AncestorDate, EpochTemplate, Layout, LayoutDescriptor, PatternKind, TimeUnit, analyze, epoch_at,
};

use super::provider::{EntryStat, HierarchyProvider, ProviderError};
use super::{Waypoint, insert_ordered};

/// One level of a layout such as `2006/01/02.txt`.
#[derive(Debug, Clone)]
struct Segment {
    layout: Layout,
    descriptor: Option<LayoutDescriptor>,
}

impl Segment {
    fn compile(source: &str) -> Self {
        Self {
            layout: Layout::compile(source),
            descriptor: analyze(source),
        }
    }

    /// The time `name` stands for under this segment, with missing year and
    /// month taken from the ancestors.
    fn resolve(&self, name: &str, ancestors: AncestorDate) -> Option<(DateTime<Utc>, TimeUnit)> {
        let descriptor = self.descriptor.as_ref()?;
        let unit = descriptor.minimal_unit();

        let time = match descriptor.kind() {
            PatternKind::EpochTemplate => {
                let template = EpochTemplate::locate(self.layout.source())?;
                epoch_at(template.digits(name)?, template.precision)?
            }
            PatternKind::Calendar => {
                let mut parts = self.layout.parse(name).ok()?;
                parts.backfill(unit, ancestors);
                match parts.resolve() {
                    Ok(time) => time,
                    Err(e) => {
                        debug!(name, layout = self.layout.source(), error = %e, "impossible date");
                        return None;
                    }
                }
            }
        };

        Some((time, unit))
    }
}

/// A node of a date-organized hierarchy, e.g. `2024/03/06.txt` under the
/// layout `2006/01/02.txt`.
///
/// Each level parses its own name against one segment of the layout. A
/// level that does not match (a project root, a stray `notes` directory)
/// becomes a non-calendar node and leaves the segment to its children.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    path: PathBuf,
    identifier: String,
    name: String,
    time: Option<DateTime<Utc>>,
    unit: Option<TimeUnit>,
    segment: Option<String>,
    is_container: bool,
    children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Walk `root` through `provider`, dating every entry with `layout`.
    ///
    /// Only a failure to read the root itself is an error. Entries below it
    /// that cannot be read are logged and left out.
    pub fn build<P>(provider: &P, root: impl AsRef<Path>, layout: &str) -> Result<Self, ProviderError>
    where
        P: HierarchyProvider + ?Sized,
    {
        let root = root.as_ref();
        let segments: Vec<Segment> = layout
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::compile)
            .collect();

        let stat = provider.stat(root)?;
        Self::build_node(provider, root, stat, &segments, AncestorDate::default())
    }

    fn build_node<P>(
        provider: &P,
        path: &Path,
        stat: EntryStat,
        segments: &[Segment],
        ancestors: AncestorDate,
    ) -> Result<Self, ProviderError>
    where
        P: HierarchyProvider + ?Sized,
    {
        let resolved = segments
            .first()
            .and_then(|segment| segment.resolve(&stat.name, ancestors));

        // Only a matching level consumes its segment.
        let (segment, remaining) = match resolved {
            Some(_) => (
                segments.first().map(|s| s.layout.source().to_string()),
                &segments[1..],
            ),
            None => (None, segments),
        };
        let (time, unit) = resolved.unzip();

        let mut node = Self {
            path: path.to_path_buf(),
            identifier: path.to_string_lossy().into_owned(),
            name: stat.name,
            time,
            unit,
            segment,
            is_container: stat.is_container,
            children: Vec::new(),
        };

        if node.is_container {
            let descend = ancestors.descend(time, unit);
            for child_path in provider.list_children(path)? {
                let child = provider.stat(&child_path).and_then(|child_stat| {
                    Self::build_node(provider, &child_path, child_stat, remaining, descend)
                });
                match child {
                    Ok(child) => insert_ordered(&mut node.children, child),
                    Err(e) => warn!(path = %child_path.display(), error = %e, "skipping entry"),
                }
            }
        }

        Ok(node)
    }

    /// Where the entry sits, starting at the root locator.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The entry's own name, e.g. `06.txt`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layout segment this node was parsed with, if it matched one.
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    /// The most specific unit this node's name supplied.
    pub fn unit(&self) -> Option<TimeUnit> {
        self.unit
    }

    /// Children as concrete nodes, ascending by time.
    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.children
    }
}

impl Waypoint for HierarchyNode {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    fn is_container(&self) -> bool {
        self.is_container
    }

    fn children(&self) -> Vec<&dyn Waypoint> {
        self.children.iter().map(|c| c as &dyn Waypoint).collect()
    }
}
