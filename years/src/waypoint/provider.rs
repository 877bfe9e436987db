//! Where hierarchy entries come from.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::warn;
use walkdir::WalkDir;

/// Error from a hierarchy provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The entry exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No entry at this path.
    #[error("no such entry: {}", .0.display())]
    NotFound(PathBuf),
}

impl ProviderError {
    fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ProviderError::NotFound(path.to_path_buf())
        } else {
            ProviderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// What a provider knows about one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStat {
    /// The last path component, or the whole path for a root without one.
    pub name: String,
    pub is_container: bool,
    pub modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
}

impl EntryStat {
    fn named(path: &Path, is_container: bool) -> Self {
        Self {
            name: entry_name(path),
            is_container,
            modified: None,
            created: None,
            accessed: None,
        }
    }
}

/// A nested structure that can be walked level by level.
///
/// This abstraction allows node construction to be tested with in-memory
/// trees.
pub trait HierarchyProvider {
    fn stat(&self, path: &Path) -> Result<EntryStat, ProviderError>;

    /// Members of a container, in a stable order.
    fn list_children(&self, path: &Path) -> Result<Vec<PathBuf>, ProviderError>;
}

/// The local file system. Symbolic links are followed when stat'ed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProvider;

impl HierarchyProvider for FsProvider {
    fn stat(&self, path: &Path) -> Result<EntryStat, ProviderError> {
        let metadata = fs::metadata(path).map_err(|e| ProviderError::from_io(path, e))?;

        Ok(EntryStat {
            modified: system_time(metadata.modified()),
            created: system_time(metadata.created()),
            accessed: system_time(metadata.accessed()),
            ..EntryStat::named(path, metadata.is_dir())
        })
    }

    /// An unreadable `path` is an error. An unreadable member is logged
    /// and left out so its siblings are still listed.
    fn list_children(&self, path: &Path) -> Result<Vec<PathBuf>, ProviderError> {
        let mut children = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => children.push(entry.into_path()),
                Err(e) if e.depth() == 0 => return Err(walk_error(path, e)),
                Err(e) => {
                    let e = walk_error(path, e);
                    warn!(dir = %path.display(), error = %e, "skipping unreadable entry");
                }
            }
        }
        Ok(children)
    }
}

fn walk_error(path: &Path, e: walkdir::Error) -> ProviderError {
    let at = e.path().unwrap_or(path).to_path_buf();
    match e.into_io_error() {
        Some(source) => ProviderError::from_io(&at, source),
        None => ProviderError::NotFound(at),
    }
}

fn system_time(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

fn entry_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    stat: Option<EntryStat>,
    children: Vec<PathBuf>,
}

/// An in-memory tree, mainly for tests.
///
/// Paths are `/`-separated; missing ancestors are created as containers.
/// Children are listed in insertion order.
///
/// ```
/// use std::path::Path;
/// use years::waypoint::{HierarchyProvider, MemoryProvider};
///
/// let mut tree = MemoryProvider::new();
/// tree.add_file("notes/2024/03/06.txt");
///
/// let months = tree.list_children(Path::new("notes/2024")).unwrap();
/// assert_eq!(months, vec![Path::new("notes/2024/03").to_path_buf()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    entries: HashMap<PathBuf, MemoryEntry>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from paths. A trailing `/` marks a container.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            let path = path.as_ref();
            match path.strip_suffix('/') {
                Some(dir) => tree.add_dir(dir),
                None => tree.add_file(path),
            };
        }
        tree
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.add(path.as_ref(), true);
        self
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.add(path.as_ref(), false);
        self
    }

    /// A file with a modification time.
    pub fn add_file_modified(
        &mut self,
        path: impl AsRef<Path>,
        modified: DateTime<Utc>,
    ) -> &mut Self {
        let path = path.as_ref();
        self.add(path, false);
        if let Some(stat) = self.stat_mut(path) {
            stat.modified = Some(modified);
        }
        self
    }

    /// Set all three metadata times of an existing entry.
    pub fn set_times(
        &mut self,
        path: impl AsRef<Path>,
        modified: Option<DateTime<Utc>>,
        created: Option<DateTime<Utc>>,
        accessed: Option<DateTime<Utc>>,
    ) -> &mut Self {
        if let Some(stat) = self.stat_mut(path.as_ref()) {
            stat.modified = modified;
            stat.created = created;
            stat.accessed = accessed;
        }
        self
    }

    /// An entry that is listed by its parent but cannot be stat'ed, like a
    /// dangling symbolic link.
    pub fn add_dangling(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = normalize(path.as_ref());
        self.link_to_parent(&path);
        self.entries.entry(path).or_insert(MemoryEntry {
            stat: None,
            children: Vec::new(),
        });
        self
    }

    fn add(&mut self, path: &Path, is_container: bool) {
        let path = normalize(path);
        self.link_to_parent(&path);
        let entry = self.entries.entry(path.clone()).or_insert(MemoryEntry {
            stat: None,
            children: Vec::new(),
        });
        match &mut entry.stat {
            Some(stat) => stat.is_container |= is_container,
            None => entry.stat = Some(EntryStat::named(&path, is_container)),
        }
    }

    /// Register `path` with its parent, creating ancestors as needed.
    fn link_to_parent(&mut self, path: &Path) {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return;
        };
        if !self.entries.contains_key(parent) {
            self.add(parent, true);
        }
        if let Some(entry) = self.entries.get_mut(parent) {
            if let Some(stat) = &mut entry.stat {
                stat.is_container = true;
            }
            if !entry.children.iter().any(|c| c == path) {
                entry.children.push(path.to_path_buf());
            }
        }
    }

    fn stat_mut(&mut self, path: &Path) -> Option<&mut EntryStat> {
        self.entries
            .get_mut(&normalize(path))
            .and_then(|entry| entry.stat.as_mut())
    }
}

impl HierarchyProvider for MemoryProvider {
    fn stat(&self, path: &Path) -> Result<EntryStat, ProviderError> {
        self.entries
            .get(&normalize(path))
            .and_then(|entry| entry.stat.clone())
            .ok_or_else(|| ProviderError::NotFound(path.to_path_buf()))
    }

    fn list_children(&self, path: &Path) -> Result<Vec<PathBuf>, ProviderError> {
        self.entries
            .get(&normalize(path))
            .filter(|entry| entry.stat.is_some())
            .map(|entry| entry.children.clone())
            .ok_or_else(|| ProviderError::NotFound(path.to_path_buf()))
    }
}

/// Drop `.` components and trailing separators.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
