//! Plan flattening.

use crate::pipeline::Step;

/// Flattens step trees into the leaf steps (`get`, `put`, `task`) in the
/// order a job produces them.
///
/// Groups are expanded in place, depth-first and left to right. `aggregate`
/// and `do` flatten identically: parallel siblings are treated as if they
/// ran in document order.
#[must_use]
pub fn flatten(steps: &[Step]) -> Vec<&Step> {
    let mut leaves = Vec::new();
    collect(steps, &mut leaves);
    leaves
}

fn collect<'a>(steps: &'a [Step], leaves: &mut Vec<&'a Step>) {
    for step in steps {
        match step {
            Step::Aggregate(children) | Step::Do(children) => collect(children, leaves),
            Step::Get { .. } | Step::Put { .. } | Step::Task(_) => leaves.push(step),
        }
    }
}
