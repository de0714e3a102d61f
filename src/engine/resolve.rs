//! Task definition resolution.
//!
//! A task step is defined either inline (`config:`) or by an external file
//! (`file: <resource>/<path>`). External paths are resolved through the
//! job-local resource map: the first path segment names the resource, the
//! rest is relative to the directory that resource is checked out to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ResourceMap;
use crate::error::{Error, Incomplete, Result};
use crate::pipeline::{TaskConfig, TaskStep};
use crate::ports::FileSystem;

/// Parsed task files keyed by the path they were read from.
///
/// Entries are never replaced once inserted, so a definition handed out for a
/// path stays valid for the rest of the run.
#[derive(Debug, Default)]
pub struct TaskCache {
    entries: HashMap<PathBuf, Arc<TaskConfig>>,
}

impl TaskCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached definition for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Arc<TaskConfig>> {
        self.entries.get(path).cloned()
    }

    /// Caches `definition` for `path` unless an entry already exists, and
    /// returns whichever entry is now cached.
    pub fn insert(&mut self, path: PathBuf, definition: TaskConfig) -> Arc<TaskConfig> {
        Arc::clone(self.entries.entry(path).or_insert_with(|| Arc::new(definition)))
    }

    /// Number of cached task files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves task steps to their effective definitions.
pub struct Resolver<'a> {
    fs: &'a dyn FileSystem,
    cache: TaskCache,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver reading task files through `fs`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs, cache: TaskCache::new() }
    }

    /// Task files read so far.
    #[must_use]
    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// Produces the definition for `step`.
    ///
    /// An inline definition wins over a `file:` reference. The result always
    /// has a non-empty run path.
    ///
    /// # Errors
    ///
    /// - `Error::NoResourceMap` if a file must be loaded but no resources are mapped.
    /// - `Error::UnresolvedResource` if the file's resource has no mapped directory.
    /// - `Error::TaskLoad` if the file cannot be read or parsed.
    /// - `Error::IncompleteTask` if there is no definition, or it lacks a run path.
    pub fn resolve(
        &mut self,
        job: &str,
        step: &TaskStep,
        resources: &ResourceMap,
    ) -> Result<Arc<TaskConfig>> {
        let definition = if let Some(inline) = &step.config {
            Arc::new(inline.clone())
        } else if let Some(config_path) = &step.config_path {
            self.load(job, step, config_path, resources)?
        } else {
            return Err(incomplete(job, step, Incomplete::Definition));
        };

        if definition.run_path().is_none() {
            return Err(incomplete(job, step, Incomplete::RunPath));
        }

        Ok(definition)
    }

    fn load(
        &mut self,
        job: &str,
        step: &TaskStep,
        config_path: &str,
        resources: &ResourceMap,
    ) -> Result<Arc<TaskConfig>> {
        if resources.is_empty() {
            return Err(Error::NoResourceMap {
                job: job.to_string(),
                task: step.name.clone(),
                config_path: config_path.to_string(),
            });
        }

        let (root, relative) = config_path.split_once('/').unwrap_or((config_path, ""));
        let Some(directory) = resources.get(root) else {
            return Err(Error::UnresolvedResource {
                job: job.to_string(),
                task: step.name.clone(),
                config_path: config_path.to_string(),
            });
        };
        let path = directory.join(relative.trim_start_matches('/'));

        if let Some(cached) = self.cache.get(&path) {
            tracing::debug!(path = %path.display(), "task file cache hit");
            return Ok(cached);
        }

        let load_error = |reason: String| Error::TaskLoad {
            job: job.to_string(),
            task: step.name.clone(),
            path: path.clone(),
            reason,
        };
        let contents = self.fs.read_to_string(&path).map_err(|e| load_error(e.to_string()))?;
        let definition = TaskConfig::from_yaml(&contents)
            .map_err(|e| load_error(format!("invalid task definition: {e}")))?;

        tracing::debug!(path = %path.display(), task = %step.name, "loaded task file");
        Ok(self.cache.insert(path, definition))
    }
}

fn incomplete(job: &str, step: &TaskStep, missing: Incomplete) -> Error {
    Error::IncompleteTask { job: job.to_string(), task: step.name.clone(), missing }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use crate::pipeline::RunConfig;

    fn step(config_path: Option<&str>, config: Option<TaskConfig>) -> TaskStep {
        TaskStep {
            name: "some-task".to_string(),
            config_path: config_path.map(str::to_string),
            config,
            params: IndexMap::new(),
            input_mapping: IndexMap::new(),
            output_mapping: IndexMap::new(),
        }
    }

    fn runnable() -> TaskConfig {
        TaskConfig { run: Some(RunConfig { path: "make".to_string() }), ..TaskConfig::default() }
    }

    fn resources() -> ResourceMap {
        [("some-resource", "/res/some-resource")].into_iter().collect()
    }

    const TASK_FILE: &str = "---
inputs:
- name: some-resource
params:
  some_param:
run:
  path: some-command
";

    #[test]
    fn inline_definition_is_used_directly() {
        let fs = MemoryFileSystem::new();
        let mut resolver = Resolver::new(&fs);
        let map = ResourceMap::new();
        let task = step(None, Some(runnable()));
        let definition = resolver.resolve("j", &task, &map).unwrap();
        assert_eq!(definition.run_path(), Some("make"));
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn inline_definition_wins_over_file() {
        let fs = MemoryFileSystem::new();
        let mut resolver = Resolver::new(&fs);
        let task = step(Some("some-resource/task.yml"), Some(runnable()));
        let definition = resolver.resolve("j", &task, &resources()).unwrap();
        assert_eq!(definition.run_path(), Some("make"));
    }

    #[test]
    fn loads_external_file_through_resource_map() {
        let fs = MemoryFileSystem::new().with_file("/res/some-resource/ci/task.yml", TASK_FILE);
        let mut resolver = Resolver::new(&fs);
        let task = step(Some("some-resource/ci/task.yml"), None);
        let definition = resolver.resolve("j", &task, &resources()).unwrap();
        let inputs: Vec<_> = definition.input_names().collect();
        assert_eq!(definition.run_path(), Some("some-command"));
        assert_eq!(inputs, vec!["some-resource"]);
    }

    #[test]
    fn repeated_loads_hit_the_cache() {
        let fs = MemoryFileSystem::new().with_file("/res/some-resource/task.yml", TASK_FILE);
        let mut resolver = Resolver::new(&fs);
        let task = step(Some("some-resource/task.yml"), None);
        let first = resolver.resolve("a", &task, &resources()).unwrap();
        let second = resolver.resolve("b", &task, &resources()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn empty_resource_map_cannot_load_files() {
        let fs = MemoryFileSystem::new();
        let mut resolver = Resolver::new(&fs);
        let map = ResourceMap::new();
        let task = step(Some("a-resource/task.yml"), None);
        let err = resolver.resolve("j", &task, &map).unwrap_err();
        assert_eq!(err.to_string(), "failed to load a-resource/task.yml; no config provided");
    }

    #[test]
    fn unknown_resource_is_unresolved() {
        let fs = MemoryFileSystem::new();
        let mut resolver = Resolver::new(&fs);
        let task = step(Some("a-resource/task.yml"), None);
        let err = resolver.resolve("j", &task, &resources()).unwrap_err();
        assert_eq!(err.to_string(), "failed to find path for task: a-resource/task.yml");
    }

    #[test]
    fn empty_mapped_path_is_unresolved() {
        let fs = MemoryFileSystem::new();
        let mut resolver = Resolver::new(&fs);
        let map: ResourceMap = [("a-resource", "")].into_iter().collect();
        let task = step(Some("a-resource/task.yml"), None);
        let err = resolver.resolve("j", &task, &map).unwrap_err();
        assert!(matches!(err, Error::UnresolvedResource { .. }));
    }

    #[test]
    fn missing_file_is_load_error() {
        let fs = MemoryFileSystem::new();
        let mut resolver = Resolver::new(&fs);
        let task = step(Some("some-resource/task.yml"), None);
        let err = resolver.resolve("j", &task, &resources()).unwrap_err();
        assert!(matches!(err, Error::TaskLoad { .. }));
        assert_eq!(
            err.to_string(),
            "failed to open task at /res/some-resource/task.yml: \
             File not found: /res/some-resource/task.yml"
        );
    }

    #[test]
    fn unparsable_file_is_load_error() {
        let fs = MemoryFileSystem::new()
            .with_file("/res/some-resource/task.yml", "- not\n- a task\n");
        let mut resolver = Resolver::new(&fs);
        let task = step(Some("some-resource/task.yml"), None);
        let err = resolver.resolve("j", &task, &resources()).unwrap_err();
        assert!(err.to_string().contains("invalid task definition"));
    }

    #[test]
    fn no_definition_at_all() {
        let fs = MemoryFileSystem::new();
        let mut resolver = Resolver::new(&fs);
        let err = resolver.resolve("some-job", &step(None, None), &resources()).unwrap_err();
        assert_eq!(err.to_string(), "task some-job/some-task is missing a definition");
    }

    #[test]
    fn definition_without_run_path() {
        let fs = MemoryFileSystem::new().with_file("/res/some-resource/task.yml", "params: {}\n");
        let mut resolver = Resolver::new(&fs);
        let task = step(Some("some-resource/task.yml"), None);
        let err = resolver.resolve("some-job", &task, &resources()).unwrap_err();
        assert_eq!(err.to_string(), "task some-job/some-task is missing a path");
    }
}
