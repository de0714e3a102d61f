//! Human- and machine-readable reports of check outcomes.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::engine::{Diff, PipelineSummary};
use crate::error::Error;

/// Which contract a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Invoked params differ from declared params.
    Params,
    /// Declared inputs are not available.
    Resources,
}

impl ViolationKind {
    fn noun(self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::Resources => "resources",
        }
    }

    fn headline(self) -> &'static str {
        match self {
            Self::Params => "Params do not have parity",
            Self::Resources => "Task invocation is missing resources",
        }
    }
}

/// A parity or availability failure, located in its pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// What was compared.
    pub kind: ViolationKind,
    /// Pipeline file, as given on the command line.
    pub pipeline: String,
    /// Job name.
    pub job: String,
    /// Task step name.
    pub task: String,
    /// The names to add and remove.
    pub diff: Diff,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "  Pipeline:\t{}", self.pipeline)?;
        writeln!(f, "  Job:\t\t{}", self.job)?;
        writeln!(f, "  Task:\t\t{}", self.task)?;
        let noun = self.kind.noun();
        write_section(f, &format!("Extra {noun} that should be removed:"), &self.diff.extra)?;
        write_section(f, &format!("Missing {noun} that should be added:"), &self.diff.missing)
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, names: &[String]) -> fmt::Result {
    if names.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "  {title}")?;
    for name in names {
        writeln!(f, "    {name}")?;
    }
    Ok(())
}

/// One line of the JSON report.
#[derive(Debug, Serialize)]
struct Outcome<'a> {
    pipeline: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    jobs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tasks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport<'a>>,
}

#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<&'a [String]>,
}

impl<'a> From<&'a Error> for ErrorReport<'a> {
    fn from(err: &'a Error) -> Self {
        let violation = err.violation();
        Self {
            code: err.code(),
            message: violation.map_or_else(|| err.to_string(), |v| v.kind.headline().to_string()),
            job: err.job(),
            task: err.task(),
            extra: violation.and_then(|v| non_empty(&v.diff.extra)),
            missing: violation.and_then(|v| non_empty(&v.diff.missing)),
        }
    }
}

fn non_empty(names: &[String]) -> Option<&[String]> {
    (!names.is_empty()).then_some(names)
}

/// An error located in the pipeline it was raised for.
struct Located<'a> {
    pipeline: &'a Path,
    err: &'a Error,
}

impl fmt::Display for Located<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.err)?;
        writeln!(f, "  Pipeline:\t{}", self.pipeline.display())?;
        if let Some(job) = self.err.job() {
            writeln!(f, "  Job:\t\t{job}")?;
        }
        if let Some(task) = self.err.task() {
            writeln!(f, "  Task:\t\t{task}")?;
        }
        Ok(())
    }
}

/// Renders a failed pipeline for a human reader.
///
/// Parity and availability failures already carry their location; any other
/// error is followed by the pipeline and, when known, the job and task.
#[must_use]
pub fn render_text(pipeline: &Path, err: &Error) -> String {
    if err.violation().is_some() {
        return err.to_string();
    }
    Located { pipeline, err }.to_string()
}

/// Renders a pipeline outcome as a single JSON line.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(
    path: &Path,
    outcome: &Result<PipelineSummary, Error>,
) -> Result<String, serde_json::Error> {
    let report = match outcome {
        Ok(summary) => Outcome {
            pipeline: summary.path.display().to_string(),
            ok: true,
            jobs: Some(summary.jobs),
            tasks: Some(summary.tasks),
            error: None,
        },
        Err(err) => Outcome {
            pipeline: path.display().to_string(),
            ok: false,
            jobs: None,
            tasks: None,
            error: Some(ErrorReport::from(err)),
        },
    };
    serde_json::to_string(&report)
}
