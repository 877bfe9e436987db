//! Nodes dated by entry metadata.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::provider::{EntryStat, HierarchyProvider, ProviderError};
use super::{NodeBase, Waypoint, insert_ordered};

/// Which metadata timestamp dates an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataAccessor {
    #[default]
    Modified,
    Created,
    Accessed,
}

impl MetadataAccessor {
    /// The timestamp this accessor selects, if the platform recorded it.
    pub fn read(&self, stat: &EntryStat) -> Option<DateTime<Utc>> {
        match self {
            MetadataAccessor::Modified => stat.modified,
            MetadataAccessor::Created => stat.created,
            MetadataAccessor::Accessed => stat.accessed,
        }
    }
}

/// An entry dated by its metadata rather than its name.
#[derive(Debug, Clone)]
pub struct MetadataNode {
    base: NodeBase,
    is_container: bool,
    children: Vec<MetadataNode>,
}

impl MetadataNode {
    /// Walk `root`, dating every entry with `accessor`.
    pub fn build<P>(
        provider: &P,
        root: impl AsRef<Path>,
        accessor: MetadataAccessor,
    ) -> Result<Self, ProviderError>
    where
        P: HierarchyProvider + ?Sized,
    {
        let root = root.as_ref();
        let stat = provider.stat(root)?;
        Self::build_node(provider, root, stat, accessor)
    }

    fn build_node<P>(
        provider: &P,
        path: &Path,
        stat: EntryStat,
        accessor: MetadataAccessor,
    ) -> Result<Self, ProviderError>
    where
        P: HierarchyProvider + ?Sized,
    {
        let mut node = Self {
            base: NodeBase::new(path.to_string_lossy(), accessor.read(&stat)),
            is_container: stat.is_container,
            children: Vec::new(),
        };

        if node.is_container {
            for child_path in provider.list_children(path)? {
                let child = provider
                    .stat(&child_path)
                    .and_then(|child_stat| Self::build_node(provider, &child_path, child_stat, accessor));
                match child {
                    Ok(child) => insert_ordered(&mut node.children, child),
                    Err(e) => warn!(path = %child_path.display(), error = %e, "skipping entry"),
                }
            }
        }

        Ok(node)
    }

    pub fn nodes(&self) -> &[MetadataNode] {
        &self.children
    }
}

impl Waypoint for MetadataNode {
    fn identifier(&self) -> &str {
        &self.base.identifier
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        self.base.time
    }

    fn is_container(&self) -> bool {
        self.is_container
    }

    fn children(&self) -> Vec<&dyn Waypoint> {
        self.children.iter().map(|c| c as &dyn Waypoint).collect()
    }
}
