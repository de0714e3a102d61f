//! The checking engine.
//!
//! For each job, the plan is flattened into leaf steps and replayed once,
//! left to right. `get`/`put` steps and task outputs feed the job's
//! `Availability`; every task step is resolved and then checked for param
//! parity and input availability before the replay continues. The first
//! failure stops the job.

mod availability;
mod flatten;
mod parity;
mod resolve;

use std::path::{Path, PathBuf};

pub use availability::Availability;
pub use flatten::flatten;
pub use parity::{check_inputs, check_params, Diff};
pub use resolve::{Resolver, TaskCache};

use crate::config::ResourceMap;
use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::pipeline::{Job, Pipeline, Step, TaskStep};
use crate::report::{Violation, ViolationKind};

/// Outcome of a pipeline that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Pipeline file that was checked.
    pub path: PathBuf,
    /// Jobs checked.
    pub jobs: usize,
    /// Task steps checked across all jobs.
    pub tasks: usize,
}

/// Checks pipelines against one resource map.
///
/// Task files read while checking are cached for the lifetime of the
/// checker, so reuse one checker for every pipeline in a run.
pub struct Checker<'a> {
    ctx: &'a ServiceContext,
    resources: &'a ResourceMap,
    resolver: Resolver<'a>,
}

impl<'a> Checker<'a> {
    /// Creates a checker reading through `ctx` and resolving task files via `resources`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, resources: &'a ResourceMap) -> Self {
        Self { ctx, resources, resolver: Resolver::new(ctx.fs.as_ref()) }
    }

    /// Loads and checks the pipeline file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the first error found: read/parse failures, or the first
    /// failing job's error.
    pub fn check_file(&mut self, path: &Path) -> Result<PipelineSummary> {
        let pipeline = Pipeline::load(self.ctx, path)?;
        self.check_pipeline(path, &pipeline)
    }

    /// Checks every job of an already-parsed pipeline, in document order.
    ///
    /// # Errors
    ///
    /// Returns the first failing job's error.
    pub fn check_pipeline(&mut self, path: &Path, pipeline: &Pipeline) -> Result<PipelineSummary> {
        let display_path = path.display().to_string();
        let mut tasks = 0;
        for job in &pipeline.jobs {
            tasks += self.check_job(&display_path, job)?;
        }

        tracing::info!(
            pipeline = %display_path,
            jobs = pipeline.jobs.len(),
            tasks,
            cached_task_files = self.resolver.cache().len(),
            "pipeline passed"
        );
        Ok(PipelineSummary { path: path.to_path_buf(), jobs: pipeline.jobs.len(), tasks })
    }

    /// Checks a single job, returning the number of task steps checked.
    ///
    /// # Errors
    ///
    /// Returns the first error met while replaying the job's plan.
    pub fn check_job(&mut self, pipeline: &str, job: &Job) -> Result<usize> {
        let _span = tracing::debug_span!("job", name = %job.name).entered();

        let steps = job.steps()?;
        let mut availability = Availability::new(self.resources);
        let mut tasks = 0;

        for step in flatten(&steps) {
            match step {
                Step::Get { name, resource } => availability.observe_get(name, resource.as_deref()),
                Step::Put { name } => availability.observe_put(name),
                Step::Task(task) => {
                    self.check_task(pipeline, &job.name, task, &mut availability)?;
                    tasks += 1;
                }
                Step::Aggregate(_) | Step::Do(_) => {}
            }
        }

        Ok(tasks)
    }

    fn check_task(
        &mut self,
        pipeline: &str,
        job: &str,
        task: &TaskStep,
        availability: &mut Availability,
    ) -> Result<()> {
        let definition = self.resolver.resolve(job, task, availability.resources())?;
        tracing::debug!(task = %task.name, "checking task");

        let params = check_params(&definition, task);
        if !params.is_empty() {
            return Err(Error::ParamParity(Box::new(Violation {
                kind: ViolationKind::Params,
                pipeline: pipeline.to_string(),
                job: job.to_string(),
                task: task.name.clone(),
                diff: params,
            })));
        }

        if definition.inputs.is_empty() {
            tracing::debug!(task = %task.name, "no declared inputs");
        } else {
            let inputs = check_inputs(&definition, task, availability);
            if !inputs.is_empty() {
                tracing::debug!(
                    task = %task.name,
                    available = ?availability.names().collect::<Vec<_>>(),
                    "declared inputs unavailable"
                );
                return Err(Error::MissingResource(Box::new(Violation {
                    kind: ViolationKind::Resources,
                    pipeline: pipeline.to_string(),
                    job: job.to_string(),
                    task: task.name.clone(),
                    diff: inputs,
                })));
            }
        }

        availability.observe_task(task, &definition);
        Ok(())
    }
}
