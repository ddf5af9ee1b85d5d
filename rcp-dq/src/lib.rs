//! # rcp-dq: data-quality validation
//!
//! Runs three layers of checks over the five in-memory input tables:
//! - table-level expectations ([`expectations`])
//! - record-level business rules ([`rows`])
//! - step-sequence integrity per recipe ([`sequence`])
//!
//! and assembles them into a [`ValidationReport`]. Validation is pure: it
//! never reads files, retries, or fails. Every problem becomes a finding or
//! a record error.

pub mod expectations;
pub mod report;
pub mod rows;
pub mod sequence;

pub use expectations::{Expectation, ExpectationSuite, Finding};
pub use report::{RecordReports, ValidationReport, ValidationSummary};
pub use rows::{RecordKey, RecordReport};
pub use sequence::StepSequenceIssue;

use rcp_common::models::{
    IngredientRecord, InteractionRecord, RecipeRecord, StepRecord, UserRecord,
};
use rcp_common::Dataset;
use tracing::{debug, info};

/// Runs an expectation suite plus the record and sequence checks
#[derive(Debug, Clone, Default)]
pub struct Validator {
    /// `None` selects [`ExpectationSuite::standard`] for each dataset
    suite: Option<ExpectationSuite>,
}

impl Validator {
    /// Validator using the standard suite
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator using a caller-built suite
    pub fn with_suite(suite: ExpectationSuite) -> Self {
        Self { suite: Some(suite) }
    }

    pub fn validate(&self, data: &Dataset) -> ValidationReport {
        let findings = match &self.suite {
            Some(suite) => suite.run(data),
            None => ExpectationSuite::standard(data).run(data),
        };

        let recipes = RecipeRecord::all(&data.recipes);
        let steps = StepRecord::all(&data.steps);

        let mut records = RecordReports {
            recipes: recipes.iter().map(rows::check_recipe).collect(),
            ingredients: IngredientRecord::all(&data.ingredients)
                .iter()
                .map(rows::check_ingredient)
                .collect(),
            steps: steps.iter().map(rows::check_step).collect(),
            users: UserRecord::all(&data.users)
                .iter()
                .map(rows::check_user)
                .collect(),
            interactions: InteractionRecord::all(&data.interactions)
                .iter()
                .map(rows::check_interaction)
                .collect(),
        };

        let step_sequences = sequence::check_step_sequences(&steps);
        for issue in &step_sequences {
            attach_sequence_issue(&mut records, issue);
        }

        let report = ValidationReport::new(data.fingerprints(), findings, records, step_sequences);
        info!(
            findings = report.findings.len(),
            failed = report.summary.findings_failed,
            invalid_records = report.records.invalid_count(),
            sequence_issues = report.step_sequences.len(),
            all_passed = report.all_passed(),
            "Validation complete"
        );
        report
    }
}

/// Record a sequence issue against every recipe row carrying its id.
///
/// Steps may reference a recipe that does not exist; the foreign-key
/// expectation reports that, so nothing is attached here.
fn attach_sequence_issue(records: &mut RecordReports, issue: &StepSequenceIssue) {
    let message = issue.message();
    let mut attached = false;
    for report in records.recipes.iter_mut() {
        if matches!(&report.key, rows::RecordKey::Recipe { id: Some(id) } if *id == issue.recipe_id)
        {
            report.push_error(message.clone());
            attached = true;
        }
    }
    if !attached {
        debug!(
            recipe_id = %issue.recipe_id,
            "Step sequence issue for a recipe not in the recipes table"
        );
    }
}
