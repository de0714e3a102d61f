//! Plan step types.
//!
//! `PlanConfig` is the raw, permissive shape a plan item is parsed into.
//! `Step` is the closed union the engine works with; converting between the
//! two is where malformed plan items are rejected.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

use super::task::TaskConfig;
use crate::error::{Error, Result};

/// A plan item exactly as written in the pipeline document.
///
/// Keys the checker does not reason about (`trigger`, `passed`, `image`,
/// hooks, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlanConfig {
    /// `get: <name>`
    #[serde(default)]
    pub get: Option<String>,
    /// Underlying resource when a `get` renames it.
    #[serde(default)]
    pub resource: Option<String>,
    /// `put: <name>`
    #[serde(default)]
    pub put: Option<String>,
    /// `task: <name>`
    #[serde(default)]
    pub task: Option<String>,
    /// `file: <resource>/<path>` pointing at an external task definition.
    #[serde(default, rename = "file")]
    pub task_config_path: Option<String>,
    /// Inline task definition.
    #[serde(default, rename = "config")]
    pub task_config: Option<TaskConfig>,
    /// Params passed to the task.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub params: IndexMap<String, Value>,
    /// Declared input name to the local resource name that satisfies it.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub input_mapping: IndexMap<String, String>,
    /// Declared output name to the local name later steps see it under.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub output_mapping: IndexMap<String, String>,
    /// Parallel group.
    #[serde(default)]
    pub aggregate: Option<Vec<PlanConfig>>,
    /// Sequential group.
    #[serde(default, rename = "do")]
    pub do_steps: Option<Vec<PlanConfig>>,
    /// Parallel group, newer spelling of `aggregate`.
    #[serde(default)]
    pub in_parallel: Option<InParallel>,
}

/// The two accepted forms of `in_parallel`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InParallel {
    /// `in_parallel: [<step>, ...]`
    Steps(Vec<PlanConfig>),
    /// `in_parallel: {steps: [<step>, ...], limit: N, fail_fast: bool}`
    Config {
        /// Grouped steps.
        steps: Vec<PlanConfig>,
    },
}

impl InParallel {
    fn steps(&self) -> &[PlanConfig] {
        match self {
            Self::Steps(steps) | Self::Config { steps } => steps,
        }
    }
}

/// A `task:` step and everything its invocation supplies.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStep {
    /// Task name as written in the plan.
    pub name: String,
    /// External definition path (`<resource>/<relative path>`).
    pub config_path: Option<String>,
    /// Inline definition.
    pub config: Option<TaskConfig>,
    /// Params supplied by the invocation.
    pub params: IndexMap<String, Value>,
    /// Declared input name to local resource name.
    pub input_mapping: IndexMap<String, String>,
    /// Declared output name to local resource name.
    pub output_mapping: IndexMap<String, String>,
}

/// One node of a job's plan tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Fetch a resource. `resource` is set when `name` is a local alias.
    Get {
        /// Name the job sees the resource under.
        name: String,
        /// Underlying resource, if renamed.
        resource: Option<String>,
    },
    /// Publish a resource.
    Put {
        /// Resource name.
        name: String,
    },
    /// Run a task.
    Task(TaskStep),
    /// Children run in parallel.
    Aggregate(Vec<Step>),
    /// Children run in sequence.
    Do(Vec<Step>),
}

/// Converts a job's raw plan into step trees.
///
/// # Errors
///
/// Returns `Error::MalformedPlan` for the first item (depth-first) that is
/// not exactly one of `get`, `put`, `task`, `aggregate`, `do`, `in_parallel`.
pub fn build_plan(job: &str, plan: &[PlanConfig]) -> Result<Vec<Step>> {
    build_sequence(job, plan, "")
}

fn build_sequence(job: &str, plan: &[PlanConfig], prefix: &str) -> Result<Vec<Step>> {
    plan.iter()
        .enumerate()
        .map(|(i, config)| {
            let position =
                if prefix.is_empty() { (i + 1).to_string() } else { format!("{prefix}.{}", i + 1) };
            build_step(job, config, &position)
        })
        .collect()
}

fn build_step(job: &str, config: &PlanConfig, position: &str) -> Result<Step> {
    let shapes: Vec<&str> = [
        ("get", config.get.is_some()),
        ("put", config.put.is_some()),
        ("task", config.task.is_some()),
        ("aggregate", config.aggregate.is_some()),
        ("do", config.do_steps.is_some()),
        ("in_parallel", config.in_parallel.is_some()),
    ]
    .into_iter()
    .filter_map(|(key, present)| present.then_some(key))
    .collect();

    let malformed = |reason: String| Error::MalformedPlan {
        job: job.to_string(),
        position: position.to_string(),
        reason,
    };

    match shapes.as_slice() {
        [] => Err(malformed(
            "expected one of get, put, task, aggregate, do, in_parallel".to_string(),
        )),
        [_] => {
            if let Some(children) = &config.aggregate {
                return Ok(Step::Aggregate(build_sequence(job, children, position)?));
            }
            if let Some(parallel) = &config.in_parallel {
                return Ok(Step::Aggregate(build_sequence(job, parallel.steps(), position)?));
            }
            if let Some(children) = &config.do_steps {
                return Ok(Step::Do(build_sequence(job, children, position)?));
            }
            if let Some(name) = &config.get {
                return Ok(Step::Get { name: name.clone(), resource: config.resource.clone() });
            }
            if let Some(name) = &config.put {
                return Ok(Step::Put { name: name.clone() });
            }
            let name = config.task.clone().unwrap_or_default();
            Ok(Step::Task(TaskStep {
                name,
                config_path: config.task_config_path.clone(),
                config: config.task_config.clone(),
                params: config.params.clone(),
                input_mapping: config.input_mapping.clone(),
                output_mapping: config.output_mapping.clone(),
            }))
        }
        many => Err(malformed(format!("ambiguous step declares {}", many.join(" and ")))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(yaml: &str) -> Vec<PlanConfig> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn builds_leaf_steps() {
        let steps = build_plan(
            "j",
            &plan(
                "
- get: a-resource
  resource: some-resource
  trigger: true
- put: out
- task: build
  file: ci/build.yml
  params: {foo: bar}
  input_mapping: {src: a-resource}
  output_mapping: {bin: built}
",
            ),
        )
        .unwrap();

        assert_eq!(
            steps[0],
            Step::Get {
                name: "a-resource".to_string(),
                resource: Some("some-resource".to_string()),
            }
        );
        assert_eq!(steps[1], Step::Put { name: "out".to_string() });
        let Step::Task(task) = &steps[2] else { panic!("expected task step") };
        assert_eq!(task.name, "build");
        assert_eq!(task.config_path.as_deref(), Some("ci/build.yml"));
        assert!(task.config.is_none());
        assert_eq!(task.params.keys().collect::<Vec<_>>(), vec!["foo"]);
        assert_eq!(task.input_mapping["src"], "a-resource");
        assert_eq!(task.output_mapping["bin"], "built");
    }

    #[test]
    fn builds_nested_groups() {
        let steps = build_plan(
            "j",
            &plan(
                "
- aggregate:
  - get: a
  - do:
    - get: b
    - put: c
- in_parallel:
    limit: 2
    steps:
    - get: d
- in_parallel:
  - get: e
",
            ),
        )
        .unwrap();

        let Step::Aggregate(children) = &steps[0] else { panic!("expected aggregate") };
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[1], Step::Do(inner) if inner.len() == 2));
        assert!(matches!(&steps[1], Step::Aggregate(inner) if inner.len() == 1));
        assert!(matches!(&steps[2], Step::Aggregate(inner) if inner.len() == 1));
    }

    #[test]
    fn unknown_shape_is_malformed() {
        let err =
            build_plan("some-job", &plan("- get: a\n- do:\n  - trigger: true\n")).unwrap_err();
        match err {
            Error::MalformedPlan { job, position, .. } => {
                assert_eq!(job, "some-job");
                assert_eq!(position, "2.1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn two_shapes_are_malformed() {
        let err = build_plan("j", &plan("- get: a\n  put: a\n")).unwrap_err();
        assert!(err.to_string().contains("get and put"));
    }

    #[test]
    fn null_maps_are_empty() {
        let steps = build_plan("j", &plan("- task: t\n  params:\n  input_mapping:\n")).unwrap();
        let Step::Task(task) = &steps[0] else { panic!("expected task step") };
        assert!(task.params.is_empty());
        assert!(task.input_mapping.is_empty());
    }
}
