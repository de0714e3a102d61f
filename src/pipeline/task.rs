//! Task definition types.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

/// A task's declared contract, as written inline under `config:` or in an
/// external task file.
///
/// Only the parts the checker compares are modelled; keys such as
/// `platform` or `image_resource` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskConfig {
    /// Resources the task requires, in declaration order.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub inputs: Vec<TaskInput>,
    /// Resources the task produces.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub outputs: Vec<TaskOutput>,
    /// Declared parameters. Only the keys matter; a `null` value still declares.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub params: IndexMap<String, Value>,
    /// The command the task runs.
    #[serde(default)]
    pub run: Option<RunConfig>,
}

impl TaskConfig {
    /// Parses a task definition from YAML text.
    ///
    /// An empty document yields an empty definition.
    ///
    /// # Errors
    ///
    /// Returns the parser error if the text is not a task definition.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// The run path, if one is declared and non-empty.
    #[must_use]
    pub fn run_path(&self) -> Option<&str> {
        self.run.as_ref().map(|r| r.path.as_str()).filter(|p| !p.is_empty())
    }

    /// Names of the declared inputs.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.name.as_str())
    }

    /// Names of the declared outputs.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|o| o.name.as_str())
    }
}

/// A required input resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskInput {
    /// Resource name the task expects.
    pub name: String,
}

/// A produced output resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskOutput {
    /// Resource name the task produces.
    pub name: String,
}

/// The `run:` block of a task. Arguments and working directory are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Executable to run.
    #[serde(default)]
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_task_file() {
        let task = TaskConfig::from_yaml(
            "---
platform: linux
inputs:
- name: some-resource
params:
  some_param:
  other_param: default
outputs:
- name: built
  path: out
run:
  path: some-command
  args: [-c, build]
",
        )
        .unwrap();
        let inputs: Vec<_> = task.input_names().collect();
        let outputs: Vec<_> = task.output_names().collect();
        let params: Vec<_> = task.params.keys().collect();
        assert_eq!(inputs, vec!["some-resource"]);
        assert_eq!(outputs, vec!["built"]);
        assert_eq!(params, vec!["some_param", "other_param"]);
        assert_eq!(task.params["some_param"], Value::Null);
        assert_eq!(task.run_path(), Some("some-command"));
    }

    #[test]
    fn empty_run_path_is_absent() {
        let task = TaskConfig::from_yaml("run:\n  path: ''\n").unwrap();
        assert_eq!(task.run_path(), None);

        let task = TaskConfig::from_yaml("params: {}\n").unwrap();
        assert_eq!(task.run_path(), None);
    }

    #[test]
    fn empty_document_is_empty_task() {
        assert_eq!(TaskConfig::from_yaml("").unwrap(), TaskConfig::default());
    }

    #[test]
    fn rejects_non_mapping() {
        assert!(TaskConfig::from_yaml("- just\n- a list\n").is_err());
    }
}
