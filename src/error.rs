//! Error types for pipecheck.
//!
//! Every variant carries enough context (pipeline, job, task, file path) to
//! locate the authoring defect it describes. None of them are transient, so
//! nothing is retried.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::report::Violation;

/// Result type alias for pipecheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What a resolved task definition lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incomplete {
    /// Neither an inline `config:` nor a loadable `file:` produced a definition.
    Definition,
    /// The definition has no `run.path`.
    RunPath,
}

impl fmt::Display for Incomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition => f.write_str("a definition"),
            Self::RunPath => f.write_str("a path"),
        }
    }
}

/// pipecheck error types.
///
/// Field meanings are shared across variants: `job` and `task` name the plan
/// location, `path` is a filesystem path, `message`/`reason` the cause.
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum Error {
    /// The pipeline file could not be read.
    #[error("failed to read pipeline at {}: {message}", path.display())]
    PipelineRead { path: PathBuf, message: String },

    /// The pipeline file is not a valid pipeline document.
    #[error("failed to unmarshal pipeline at {}: {message}", path.display())]
    PipelineParse { path: PathBuf, message: String },

    /// The config file could not be read.
    #[error("failed reading config file {}: {message}", path.display())]
    ConfigRead { path: PathBuf, message: String },

    /// The config file is not a valid config document.
    #[error("failed unmarshaling config file {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// A plan step matches none (or more than one) of the known step shapes.
    #[error("job {job}: step {position} is malformed: {reason}")]
    MalformedPlan { job: String, position: String, reason: String },

    /// A task file was referenced but no resource map was configured.
    #[error("failed to load {config_path}; no config provided")]
    NoResourceMap { job: String, task: String, config_path: String },

    /// The first segment of a task file path has no (non-empty) resource map entry.
    #[error("failed to find path for task: {config_path}")]
    UnresolvedResource { job: String, task: String, config_path: String },

    /// The task file is unreadable or does not parse.
    #[error("failed to open task at {}: {reason}", path.display())]
    TaskLoad { job: String, task: String, path: PathBuf, reason: String },

    /// The resolved task has no definition or no run path.
    #[error("task {job}/{task} is missing {missing}")]
    IncompleteTask { job: String, task: String, missing: Incomplete },

    /// Invoked params and declared params differ.
    #[error("Params do not have parity: {0}")]
    ParamParity(Box<Violation>),

    /// Declared inputs are not available at the point the task runs.
    #[error("Task invocation is missing resources: {0}")]
    MissingResource(Box<Violation>),
}

impl Error {
    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PipelineRead { .. } | Self::ConfigRead { .. } => "read_failed",
            Self::PipelineParse { .. } | Self::ConfigParse { .. } => "parse_failed",
            Self::MalformedPlan { .. } => "malformed_plan",
            Self::NoResourceMap { .. } | Self::UnresolvedResource { .. } => "unresolved_resource",
            Self::TaskLoad { .. } => "task_load",
            Self::IncompleteTask { .. } => "incomplete_task",
            Self::ParamParity(_) => "param_parity",
            Self::MissingResource(_) => "missing_resource",
        }
    }

    /// The job the error was raised in, if it is job-scoped.
    #[must_use]
    pub fn job(&self) -> Option<&str> {
        match self {
            Self::MalformedPlan { job, .. }
            | Self::NoResourceMap { job, .. }
            | Self::UnresolvedResource { job, .. }
            | Self::TaskLoad { job, .. }
            | Self::IncompleteTask { job, .. } => Some(job),
            Self::ParamParity(v) | Self::MissingResource(v) => Some(&v.job),
            Self::PipelineRead { .. }
            | Self::PipelineParse { .. }
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. } => None,
        }
    }

    /// The task the error was raised for, if it is task-scoped.
    #[must_use]
    pub fn task(&self) -> Option<&str> {
        match self {
            Self::NoResourceMap { task, .. }
            | Self::UnresolvedResource { task, .. }
            | Self::TaskLoad { task, .. }
            | Self::IncompleteTask { task, .. } => Some(task),
            Self::ParamParity(v) | Self::MissingResource(v) => Some(&v.task),
            _ => None,
        }
    }

    /// Returns `true` if the error invalidates the whole run, so no further
    /// pipelines are checked even when the caller asked to keep going.
    #[must_use]
    pub fn aborts_run(&self) -> bool {
        matches!(self, Self::MalformedPlan { .. })
    }

    /// The diff behind a parity or availability failure.
    #[must_use]
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::ParamParity(v) | Self::MissingResource(v) => Some(v),
            _ => None,
        }
    }
}
