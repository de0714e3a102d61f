//! Resource availability tracking for a single job.

use indexmap::IndexSet;

use crate::config::ResourceMap;
use crate::pipeline::{TaskConfig, TaskStep};

/// The resources visible at the current point of a job's plan, plus the
/// job-local resource map that renaming `get`s extend.
///
/// A fresh tracker is created per job; nothing carries over between jobs.
/// Names are only ever appended, and a resource becomes visible strictly
/// after the step that produces it has been observed.
#[derive(Debug, Clone)]
pub struct Availability {
    available: IndexSet<String>,
    resources: ResourceMap,
}

impl Availability {
    /// Starts a job with nothing available and its own copy of `resources`.
    #[must_use]
    pub fn new(resources: &ResourceMap) -> Self {
        Self { available: IndexSet::new(), resources: resources.clone() }
    }

    /// The job-local resource map, including aliases from renaming `get`s.
    #[must_use]
    pub fn resources(&self) -> &ResourceMap {
        &self.resources
    }

    /// Returns `true` if `name` has been produced by an earlier step.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.available.contains(name)
    }

    /// Available names in the order they became available.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.available.iter().map(String::as_str)
    }

    /// Records a `get`. When `resource` is set, `name` is a local alias and
    /// task files under `name/...` resolve to the underlying resource's directory.
    pub fn observe_get(&mut self, name: &str, resource: Option<&str>) {
        self.add(name);
        if let Some(underlying) = resource {
            if !self.resources.alias(name, underlying) {
                tracing::warn!(
                    alias = name,
                    resource = underlying,
                    "renamed resource has no resource map entry"
                );
            }
        }
    }

    /// Records a `put`.
    pub fn observe_put(&mut self, name: &str) {
        self.add(name);
    }

    /// Records a task's outputs: every declared output, plus the local name
    /// of every `output_mapping` entry.
    pub fn observe_task(&mut self, step: &TaskStep, definition: &TaskConfig) {
        for output in definition.output_names() {
            self.add(output);
        }
        for local in step.output_mapping.values() {
            self.add(local);
        }
    }

    fn add(&mut self, name: &str) {
        if self.available.insert(name.to_string()) {
            tracing::debug!(resource = name, "resource available");
        }
    }
}
