//! Step-sequence integrity
//!
//! For every recipe that has steps, the sorted step orders must be exactly
//! `1..=n` where `n` is the number of step rows for that recipe. Gaps,
//! duplicates, zero-based numbering and non-integer orders all surface as a
//! mismatch. Input row order does not matter.

use rcp_common::models::StepRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSequenceIssue {
    pub recipe_id: String,
    pub expected: Vec<i64>,
    pub actual: Vec<i64>,
}

impl StepSequenceIssue {
    /// Error attached to the owning recipe's record report
    pub fn message(&self) -> String {
        format!(
            "Step order incorrect. Expected {:?}, got {:?}",
            self.expected, self.actual
        )
    }
}

/// Check every recipe's step numbering, in recipe id order.
///
/// Steps without a recipe id cannot be grouped and are skipped here; the
/// row-level check already reports them.
pub fn check_step_sequences(steps: &[StepRecord]) -> Vec<StepSequenceIssue> {
    // (row count, integer orders)
    let mut groups: BTreeMap<&str, (usize, Vec<i64>)> = BTreeMap::new();
    for step in steps {
        let Some(recipe_id) = step.recipe_id.value() else {
            continue;
        };
        let group = groups.entry(recipe_id.as_str()).or_default();
        group.0 += 1;
        if let Some(order) = step.order.value() {
            group.1.push(*order);
        }
    }

    groups
        .into_iter()
        .filter_map(|(recipe_id, (count, mut actual))| {
            actual.sort_unstable();
            let expected: Vec<i64> = (1..=count as i64).collect();
            (actual != expected).then(|| StepSequenceIssue {
                recipe_id: recipe_id.to_string(),
                expected,
                actual,
            })
        })
        .collect()
}
