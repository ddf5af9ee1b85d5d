//! Validation report model and rendering
//!
//! The report is plain data. JSON comes from serde; the text form is the
//! report's `Display` impl. Both are deterministic for identical input.

use crate::expectations::Finding;
use crate::rows::RecordReport;
use crate::sequence::StepSequenceIssue;
use rcp_common::table::TableFingerprint;
use rcp_common::{Result, TableKind};
use serde::{Deserialize, Serialize};
use std::fmt;

const RULE: &str = "===========================================";

/// Per-record outcomes, one list per input table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReports {
    pub recipes: Vec<RecordReport>,
    pub ingredients: Vec<RecordReport>,
    pub steps: Vec<RecordReport>,
    pub users: Vec<RecordReport>,
    pub interactions: Vec<RecordReport>,
}

impl RecordReports {
    pub fn get(&self, kind: TableKind) -> &[RecordReport] {
        match kind {
            TableKind::Recipes => &self.recipes,
            TableKind::Ingredients => &self.ingredients,
            TableKind::Steps => &self.steps,
            TableKind::Users => &self.users,
            TableKind::Interactions => &self.interactions,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &[RecordReport])> + '_ {
        TableKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn invalid_count(&self) -> usize {
        self.iter()
            .map(|(_, reports)| reports.iter().filter(|r| !r.valid).count())
            .sum()
    }
}

/// Valid/invalid record counts for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTally {
    pub table: TableKind,
    pub valid: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// AND of every finding's success
    pub all_passed: bool,
    pub findings_passed: usize,
    pub findings_failed: usize,
    pub records: Vec<TableTally>,
    pub step_sequence_issues: usize,
}

/// Findings that share a table, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFindings<'a> {
    pub table: &'a str,
    pub findings: Vec<&'a Finding>,
}

impl TableFindings<'_> {
    pub fn all_passed(&self) -> bool {
        self.findings.iter().all(|f| f.success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Fingerprints of the tables the report was computed from
    pub inputs: Vec<TableFingerprint>,
    pub findings: Vec<Finding>,
    pub records: RecordReports,
    pub step_sequences: Vec<StepSequenceIssue>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn new(
        inputs: Vec<TableFingerprint>,
        findings: Vec<Finding>,
        records: RecordReports,
        step_sequences: Vec<StepSequenceIssue>,
    ) -> Self {
        let findings_passed = findings.iter().filter(|f| f.success).count();
        let tallies = records
            .iter()
            .map(|(table, reports)| {
                let valid = reports.iter().filter(|r| r.valid).count();
                TableTally {
                    table,
                    valid,
                    invalid: reports.len() - valid,
                }
            })
            .collect();

        let summary = ValidationSummary {
            all_passed: findings_passed == findings.len(),
            findings_passed,
            findings_failed: findings.len() - findings_passed,
            records: tallies,
            step_sequence_issues: step_sequences.len(),
        };

        Self {
            inputs,
            findings,
            records,
            step_sequences,
            summary,
        }
    }

    /// True iff every expectation passed
    pub fn all_passed(&self) -> bool {
        self.summary.all_passed
    }

    /// No failed expectation, no invalid record and no sequence issue
    pub fn is_clean(&self) -> bool {
        self.all_passed() && self.records.invalid_count() == 0 && self.step_sequences.is_empty()
    }

    /// Findings grouped by table, tables in order of first appearance
    pub fn grouped(&self) -> Vec<TableFindings<'_>> {
        let mut groups: Vec<TableFindings<'_>> = Vec::new();
        for finding in &self.findings {
            match groups.iter_mut().find(|g| g.table == finding.table) {
                Some(group) => group.findings.push(finding),
                None => groups.push(TableFindings {
                    table: &finding.table,
                    findings: vec![finding],
                }),
            }
        }
        groups
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", RULE)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", RULE)
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== DATA QUALITY REPORT ===")?;
        writeln!(f)?;

        for group in self.grouped() {
            section(f, &group.table.to_uppercase())?;
            for finding in &group.findings {
                let mark = if finding.success { "PASS" } else { "FAIL" };
                writeln!(f, "{} - {}", mark, finding.check)?;
                if let Some(detail) = &finding.detail {
                    writeln!(f, "       Details: {}", detail)?;
                }
            }
            writeln!(f)?;
        }

        section(f, "OVERALL STATUS")?;
        if self.all_passed() {
            writeln!(f, "ALL CHECKS PASSED")?;
        } else {
            writeln!(
                f,
                "SOME CHECKS FAILED - {} of {} expectations failed, see details above.",
                self.summary.findings_failed,
                self.findings.len()
            )?;
        }
        writeln!(f)?;

        section(f, "RECORD CHECKS")?;
        for tally in &self.summary.records {
            writeln!(
                f,
                "{}: {} valid, {} invalid",
                tally.table, tally.valid, tally.invalid
            )?;
            for record in self.records.get(tally.table).iter().filter(|r| !r.valid) {
                writeln!(f, "  {}: {}", record, record.errors.join("; "))?;
            }
        }

        if !self.step_sequences.is_empty() {
            writeln!(f)?;
            writeln!(f, "Step sequence issues: {}", self.step_sequences.len())?;
            for issue in &self.step_sequences {
                writeln!(f, "  {}: {}", issue.recipe_id, issue.message())?;
            }
        }

        Ok(())
    }
}
