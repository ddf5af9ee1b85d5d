//! Table-level expectations
//!
//! Five primitive checks form the whole vocabulary: column existence,
//! non-null, uniqueness, integer conformance and foreign-key integrity.
//! Each takes a table (or a child/parent pair) and returns a [`Finding`];
//! none of them can fail. A missing column is itself a finding.
//!
//! An [`ExpectationSuite`] is a declarative, ordered list of [`Expectation`]s
//! evaluated against a [`Dataset`]. [`ExpectationSuite::standard`] is the
//! battery the pipeline runs by default.

use rcp_common::models::{columns, parse_integer_like};
use rcp_common::{Dataset, Table, TableKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Result of evaluating one expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub table: String,
    pub check: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Finding {
    fn pass(table: &Table, check: String) -> Self {
        Self {
            table: table.name().to_string(),
            check,
            success: true,
            detail: None,
        }
    }

    fn fail(table: &Table, check: String, detail: String) -> Self {
        Self {
            table: table.name().to_string(),
            check,
            success: false,
            detail: Some(detail),
        }
    }
}

fn missing_column(column: &str) -> String {
    format!("Column '{}' does not exist", column)
}

/// Success iff `column` is present
pub fn column_exists(table: &Table, column: &str) -> Finding {
    let check = format!("Column exists: {}", column);
    if table.has_column(column) {
        Finding::pass(table, check)
    } else {
        Finding::fail(table, check, format!("Missing column '{}'", column))
    }
}

/// Success iff no row has a null cell in `column`
pub fn not_null(table: &Table, column: &str) -> Finding {
    let check = format!("No NULL values in '{}'", column);
    let Some(values) = table.column_values(column) else {
        return Finding::fail(table, check, missing_column(column));
    };

    let nulls = values.iter().filter(|v| v.is_none()).count();
    if nulls == 0 {
        Finding::pass(table, check)
    } else {
        Finding::fail(
            table,
            check,
            format!("Found {} NULL value(s) in '{}'", nulls, column),
        )
    }
}

/// Success iff no non-null value occurs twice in `column`
pub fn unique(table: &Table, column: &str) -> Finding {
    let check = format!("Unique values in '{}'", column);
    let Some(values) = table.column_values(column) else {
        return Finding::fail(table, check, missing_column(column));
    };

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        *occurrences.entry(value).or_default() += 1;
    }
    let duplicated = occurrences.values().filter(|&&n| n > 1).count();

    if duplicated == 0 {
        Finding::pass(table, check)
    } else {
        Finding::fail(
            table,
            check,
            format!(
                "Duplicates found in '{}': {} value(s) occur more than once",
                column, duplicated
            ),
        )
    }
}

/// Success iff every non-null value in `column` converts to an integer
pub fn integer_like(table: &Table, column: &str) -> Finding {
    let check = format!("Integer-like values in '{}'", column);
    let Some(values) = table.column_values(column) else {
        return Finding::fail(table, check, missing_column(column));
    };

    let bad: Vec<&str> = values
        .into_iter()
        .flatten()
        .filter(|v| parse_integer_like(v).is_none())
        .collect();

    match bad.first() {
        None => Finding::pass(table, check),
        Some(first) => Finding::fail(
            table,
            check,
            format!(
                "{} value(s) in '{}' are not integer-like (first: '{}')",
                bad.len(),
                column,
                first
            ),
        ),
    }
}

/// Success iff every non-null `child_column` value appears in `parent_column`.
///
/// The detail carries only the unmatched count, never the values.
pub fn foreign_key(
    child: &Table,
    child_column: &str,
    parent: &Table,
    parent_column: &str,
) -> Finding {
    let check = format!(
        "Foreign key '{}' matches '{}.{}'",
        child_column,
        parent.name(),
        parent_column
    );

    let Some(child_values) = child.column_values(child_column) else {
        return Finding::fail(
            child,
            check,
            format!("Child column '{}' does not exist", child_column),
        );
    };
    let Some(parent_values) = parent.column_values(parent_column) else {
        return Finding::fail(
            child,
            check,
            format!(
                "Parent column '{}.{}' does not exist",
                parent.name(),
                parent_column
            ),
        );
    };

    let keys: HashSet<&str> = parent_values.into_iter().flatten().collect();
    let unmatched = child_values
        .into_iter()
        .flatten()
        .filter(|v| !keys.contains(v))
        .count();

    if unmatched == 0 {
        Finding::pass(child, check)
    } else {
        Finding::fail(
            child,
            check,
            format!(
                "{} value(s) in '{}' not found in parent '{}.{}'",
                unmatched,
                child_column,
                parent.name(),
                parent_column
            ),
        )
    }
}

/// One parameterized assertion about a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "expectation", rename_all = "snake_case")]
pub enum Expectation {
    ColumnExists {
        table: TableKind,
        column: String,
    },
    NotNull {
        table: TableKind,
        column: String,
    },
    Unique {
        table: TableKind,
        column: String,
    },
    IntegerLike {
        table: TableKind,
        column: String,
    },
    ForeignKey {
        child: TableKind,
        child_column: String,
        parent: TableKind,
        parent_column: String,
    },
}

impl Expectation {
    /// Table the resulting finding is filed under
    pub fn table(&self) -> TableKind {
        match self {
            Expectation::ColumnExists { table, .. }
            | Expectation::NotNull { table, .. }
            | Expectation::Unique { table, .. }
            | Expectation::IntegerLike { table, .. } => *table,
            Expectation::ForeignKey { child, .. } => *child,
        }
    }

    pub fn evaluate(&self, data: &Dataset) -> Finding {
        match self {
            Expectation::ColumnExists { table, column } => column_exists(data.table(*table), column),
            Expectation::NotNull { table, column } => not_null(data.table(*table), column),
            Expectation::Unique { table, column } => unique(data.table(*table), column),
            Expectation::IntegerLike { table, column } => integer_like(data.table(*table), column),
            Expectation::ForeignKey {
                child,
                child_column,
                parent,
                parent_column,
            } => foreign_key(
                data.table(*child),
                child_column,
                data.table(*parent),
                parent_column,
            ),
        }
    }
}

/// Ordered battery of expectations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationSuite {
    expectations: Vec<Expectation>,
}

impl ExpectationSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    pub fn push(&mut self, expectation: Expectation) -> &mut Self {
        self.expectations.push(expectation);
        self
    }

    pub fn column_exists(&mut self, table: TableKind, column: &str) -> &mut Self {
        self.push(Expectation::ColumnExists {
            table,
            column: column.to_string(),
        })
    }

    pub fn not_null(&mut self, table: TableKind, column: &str) -> &mut Self {
        self.push(Expectation::NotNull {
            table,
            column: column.to_string(),
        })
    }

    pub fn unique(&mut self, table: TableKind, column: &str) -> &mut Self {
        self.push(Expectation::Unique {
            table,
            column: column.to_string(),
        })
    }

    pub fn integer_like(&mut self, table: TableKind, column: &str) -> &mut Self {
        self.push(Expectation::IntegerLike {
            table,
            column: column.to_string(),
        })
    }

    pub fn foreign_key(
        &mut self,
        child: TableKind,
        child_column: &str,
        parent: TableKind,
        parent_column: &str,
    ) -> &mut Self {
        self.push(Expectation::ForeignKey {
            child,
            child_column: child_column.to_string(),
            parent,
            parent_column: parent_column.to_string(),
        })
    }

    /// The default battery.
    ///
    /// The step order column is resolved against the loaded steps table so
    /// files still using `step_order` are checked under that name.
    pub fn standard(data: &Dataset) -> Self {
        use TableKind::*;

        let step_order = data
            .steps
            .resolve_column(columns::STEP_ORDER)
            .unwrap_or(columns::STEP_ORDER[0]);

        let mut suite = Self::new();
        suite
            .column_exists(Recipes, "id")
            .column_exists(Recipes, "title")
            .not_null(Recipes, "id")
            .unique(Recipes, "id")
            .integer_like(Recipes, "prep_time_minutes")
            .integer_like(Recipes, "cook_time_minutes");

        suite
            .column_exists(Ingredients, "recipe_id")
            .column_exists(Ingredients, "ingredient_name")
            .not_null(Ingredients, "recipe_id")
            .foreign_key(Ingredients, "recipe_id", Recipes, "id");

        suite
            .column_exists(Steps, "recipe_id")
            .column_exists(Steps, step_order)
            .not_null(Steps, "recipe_id")
            .not_null(Steps, step_order)
            .integer_like(Steps, step_order)
            .foreign_key(Steps, "recipe_id", Recipes, "id");

        suite
            .column_exists(Users, "id")
            .not_null(Users, "id")
            .unique(Users, "id");

        suite
            .column_exists(Interactions, "id")
            .not_null(Interactions, "id")
            .unique(Interactions, "id")
            .column_exists(Interactions, "recipe_id")
            .column_exists(Interactions, "user_id")
            .foreign_key(Interactions, "recipe_id", Recipes, "id")
            .foreign_key(Interactions, "user_id", Users, "id");

        suite
    }

    /// Evaluate every expectation in order
    pub fn run(&self, data: &Dataset) -> Vec<Finding> {
        self.expectations
            .iter()
            .map(|expectation| {
                let finding = expectation.evaluate(data);
                debug!(
                    table = %finding.table,
                    check = %finding.check,
                    success = finding.success,
                    "Evaluated expectation"
                );
                finding
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipes() -> Table {
        Table::from_text_rows(
            "recipes",
            &["id", "title", "prep_time_minutes"],
            &[&["r1", "Soup", "10"], &["r2", "Bread", "15.0"], &["r3", "", ""]],
        )
    }

    #[test]
    fn test_column_exists() {
        let table = recipes();
        assert!(column_exists(&table, "title").success);

        let finding = column_exists(&table, "servings");
        assert!(!finding.success);
        assert_eq!(finding.check, "Column exists: servings");
        assert_eq!(finding.detail.as_deref(), Some("Missing column 'servings'"));
    }

    #[test]
    fn test_not_null_counts_nulls() {
        let table = recipes();
        assert!(not_null(&table, "id").success);

        let finding = not_null(&table, "title");
        assert!(!finding.success);
        assert!(finding.detail.unwrap().contains("1 NULL"));
    }

    #[test]
    fn test_not_null_on_missing_column_is_a_finding() {
        let finding = not_null(&recipes(), "difficulty");
        assert!(!finding.success);
        assert_eq!(
            finding.detail.as_deref(),
            Some("Column 'difficulty' does not exist")
        );
    }

    #[test]
    fn test_unique_ignores_nulls() {
        let table = Table::from_text_rows("users", &["id"], &[&["u1"], &[""], &[""], &["u2"]]);
        assert!(unique(&table, "id").success);

        let dup = Table::from_text_rows("users", &["id"], &[&["u1"], &["u1"], &["u2"]]);
        let finding = unique(&dup, "id");
        assert!(!finding.success);
        assert!(finding.detail.unwrap().contains("1 value(s)"));
    }

    #[test]
    fn test_integer_like_accepts_integral_floats() {
        let table = recipes();
        assert!(integer_like(&table, "prep_time_minutes").success);

        let bad = Table::from_text_rows(
            "recipes",
            &["prep_time_minutes"],
            &[&["10"], &["ten"], &["2.5"]],
        );
        let finding = integer_like(&bad, "prep_time_minutes");
        assert!(!finding.success);
        let detail = finding.detail.unwrap();
        assert!(detail.starts_with("2 value(s)"));
        assert!(detail.contains("'ten'"));
    }

    #[test]
    fn test_foreign_key_reports_count_only() {
        let parent = recipes();
        let child = Table::from_text_rows(
            "interactions",
            &["id", "recipe_id"],
            &[&["i1", "r1"], &["i2", "r9"], &["i3", "r8"], &["i4", ""]],
        );

        let finding = foreign_key(&child, "recipe_id", &parent, "id");
        assert!(!finding.success);
        assert_eq!(finding.table, "interactions");
        let detail = finding.detail.unwrap();
        assert!(detail.starts_with("2 value(s)"));
        assert!(!detail.contains("r9"));
    }

    #[test]
    fn test_foreign_key_all_present() {
        let parent = recipes();
        let child = Table::from_text_rows("steps", &["recipe_id"], &[&["r1"], &["r2"], &["r1"]]);
        assert!(foreign_key(&child, "recipe_id", &parent, "id").success);
    }

    #[test]
    fn test_foreign_key_missing_columns() {
        let parent = recipes();
        let child = Table::from_text_rows("steps", &["rid"], &[&["r1"]]);
        let finding = foreign_key(&child, "recipe_id", &parent, "id");
        assert!(finding.detail.unwrap().starts_with("Child column"));

        let child = Table::from_text_rows("steps", &["recipe_id"], &[&["r1"]]);
        let finding = foreign_key(&child, "recipe_id", &parent, "uuid");
        assert!(finding.detail.unwrap().starts_with("Parent column"));
    }

    #[test]
    fn test_suite_builder_preserves_order() {
        let mut suite = ExpectationSuite::new();
        suite
            .column_exists(TableKind::Users, "id")
            .unique(TableKind::Users, "id");

        assert_eq!(suite.len(), 2);
        assert!(matches!(suite.expectations()[0], Expectation::ColumnExists { .. }));
        assert_eq!(suite.expectations()[1].table(), TableKind::Users);
    }
}
