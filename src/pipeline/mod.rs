//! Pipeline document model and loading.
//!
//! A pipeline is parsed once per run and never mutated. Before parsing,
//! `{{identifier}}` templating placeholders are replaced with a literal
//! `true`: they are never resolved to real values, only neutralized so the
//! document parses.

mod step;
mod task;

use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Deserializer};

pub use step::{build_plan, InParallel, PlanConfig, Step, TaskStep};
pub use task::{RunConfig, TaskConfig, TaskInput, TaskOutput};

use crate::context::ServiceContext;
use crate::error::{Error, Result};

/// A pipeline document: an ordered list of jobs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Pipeline {
    /// Jobs in document order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<Job>,
}

/// A named job and its raw plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Job {
    /// Job name, unique within the pipeline.
    pub name: String,
    /// Root step sequence.
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan: Vec<PlanConfig>,
}

impl Job {
    /// Converts the raw plan into step trees.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPlan` if any plan item has no recognised shape.
    pub fn steps(&self) -> Result<Vec<Step>> {
        build_plan(&self.name, &self.plan)
    }
}

impl Pipeline {
    /// Parses a pipeline from raw YAML text, neutralizing placeholders first.
    ///
    /// `path` is only used for error context.
    ///
    /// # Errors
    ///
    /// Returns `Error::PipelineParse` if the text is not a pipeline document.
    pub fn from_yaml(path: &Path, contents: &str) -> Result<Self> {
        let cleaned = neutralize_placeholders(contents);
        if cleaned.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&cleaned)
            .map_err(|e| Error::PipelineParse { path: path.to_path_buf(), message: e.to_string() })
    }

    /// Reads and parses the pipeline at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(ctx: &ServiceContext, path: &Path) -> Result<Self> {
        let contents = ctx
            .fs
            .read_to_string(path)
            .map_err(|e| Error::PipelineRead { path: path.to_path_buf(), message: e.to_string() })?;
        Self::from_yaml(path, &contents)
    }
}

/// Replaces every `{{identifier}}` placeholder with `true`.
#[must_use]
pub fn neutralize_placeholders(contents: &str) -> Cow<'_, str> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{([a-zA-Z0-9_-]+)\}\}").expect("placeholder pattern"));
    re.replace_all(contents, "true")
}

/// Deserializes an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    #[test]
    fn replaces_placeholders_with_true() {
        assert_eq!(
            neutralize_placeholders("params: {a: {{some-var}}, b: {{OTHER_1}}}"),
            "params: {a: true, b: true}"
        );
    }

    #[test]
    fn leaves_non_identifier_braces_alone() {
        let text = "x: '{{ spaced }}'\ny: ((credhub-var))\n";
        assert!(matches!(neutralize_placeholders(text), Cow::Borrowed(_)));
    }

    #[test]
    fn parses_jobs_in_order() {
        let pipeline = Pipeline::from_yaml(
            Path::new("p.yml"),
            "---
resources:
- name: a-resource
  type: git
jobs:
- name: first
  plan:
  - get: a-resource
    trigger: {{auto-trigger}}
- name: second
  plan: []
",
        )
        .unwrap();
        let names: Vec<&str> = pipeline.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(pipeline.jobs[0].steps().unwrap().len(), 1);
    }

    #[test]
    fn unparsable_pipeline_names_path() {
        let err = Pipeline::from_yaml(Path::new("ci/p.yml"), "jobs: {not: a list}\n").unwrap_err();
        assert!(matches!(err, Error::PipelineParse { .. }));
        assert!(err.to_string().starts_with("failed to unmarshal pipeline at ci/p.yml"));
    }

    #[test]
    fn load_missing_pipeline_is_read_error() {
        let ctx = ServiceContext::with_fs(MemoryFileSystem::new());
        let err = Pipeline::load(&ctx, Path::new("/nope.yml")).unwrap_err();
        assert!(matches!(err, Error::PipelineRead { .. }));
    }
}
