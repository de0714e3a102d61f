//! Param parity and input availability diffs.

use serde::Serialize;

use super::availability::Availability;
use crate::pipeline::{TaskConfig, TaskStep};

/// Differences between what a task declares and what its invocation
/// (or the plan so far) supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    /// Supplied but not declared, in invocation order.
    pub extra: Vec<String>,
    /// Declared but not supplied, in declaration order.
    pub missing: Vec<String>,
}

impl Diff {
    /// Returns `true` if there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extra.is_empty() && self.missing.is_empty()
    }
}

/// Compares the declared param names against the invoked param names.
///
/// Only presence is compared; values are never inspected.
#[must_use]
pub fn check_params(definition: &TaskConfig, step: &TaskStep) -> Diff {
    let missing = definition
        .params
        .keys()
        .filter(|name| !step.params.contains_key(name.as_str()))
        .cloned()
        .collect();
    let extra = step
        .params
        .keys()
        .filter(|name| !definition.params.contains_key(name.as_str()))
        .cloned()
        .collect();

    Diff { extra, missing }
}

/// Lists declared inputs that no earlier step made available.
///
/// An input is satisfied if its own name is available, or if the step's
/// `input_mapping` maps it to a local name that is. `extra` is always empty.
#[must_use]
pub fn check_inputs(
    definition: &TaskConfig,
    step: &TaskStep,
    available: &Availability,
) -> Diff {
    let missing = definition
        .input_names()
        .filter(|&input| {
            let mapped =
                step.input_mapping.get(input).is_some_and(|local| available.contains(local));
            !available.contains(input) && !mapped
        })
        .map(str::to_string)
        .collect();

    Diff { extra: Vec::new(), missing }
}
