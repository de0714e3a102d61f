//! Resource name to checkout directory lookup.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

/// Maps a declared resource name to the directory it is checked out to.
///
/// The map handed to the checker is never mutated. Each job works on its own
/// clone, so aliases registered by a renaming `get` stay inside that job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ResourceMap {
    paths: IndexMap<String, PathBuf>,
}

impl ResourceMap {
    /// Creates an empty resource map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no resources are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of mapped resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Looks up the directory for `name`. Empty paths count as unmapped.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path).filter(|p| !p.as_os_str().is_empty())
    }

    /// Makes `alias` resolve to the same directory as `target`.
    ///
    /// Returns `false` (and registers nothing) when `target` is unmapped.
    pub fn alias(&mut self, alias: &str, target: &str) -> bool {
        let Some(path) = self.get(target).map(Path::to_path_buf) else {
            return false;
        };
        self.paths.insert(alias.to_string(), path);
        true
    }
}

impl<K, V> FromIterator<(K, V)> for ResourceMap
where
    K: Into<String>,
    V: Into<PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { paths: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
