//! Validator integration tests
//!
//! Covers:
//! - Clean dataset passes every standard expectation
//! - Step sequences: contiguous, gapped, shuffled
//! - Orphan foreign keys fail without aborting
//! - Missing columns become findings
//! - One record report per input row
//! - Deterministic JSON output
//! - End-to-end from a CSV directory

use rcp_common::provider::CsvDirectoryProvider;
use rcp_common::{load_dataset, Dataset, RetryPolicy, Table};
use rcp_dq::{ExpectationSuite, RecordKey, ValidationReport, Validator};
use std::fs;

fn recipes(rows: &[&[&str]]) -> Table {
    Table::from_text_rows(
        "recipes",
        &[
            "id",
            "title",
            "description",
            "prep_time_minutes",
            "cook_time_minutes",
            "difficulty",
            "tags",
        ],
        rows,
    )
}

fn steps(rows: &[&[&str]]) -> Table {
    Table::from_text_rows("steps", &["recipe_id", "order", "text"], rows)
}

fn dataset_with_steps(step_rows: &[&[&str]]) -> Dataset {
    Dataset {
        recipes: recipes(&[&["r1", "Tomato Soup", "Warm and easy", "10", "20", "easy", "soup|quick"]]),
        ingredients: Table::from_text_rows(
            "ingredients",
            &["recipe_id", "ingredient_name", "quantity"],
            &[&["r1", "tomato", "4"], &["r1", "salt", "1 tsp"]],
        ),
        steps: steps(step_rows),
        users: Table::from_text_rows("users", &["id", "name"], &[&["u1", "Ada"], &["u2", "Lin"]]),
        interactions: Table::from_text_rows(
            "interactions",
            &["id", "recipe_id", "user_id", "type", "rating"],
            &[
                &["i1", "r1", "u1", "view", ""],
                &["i2", "r1", "u2", "like", "5"],
                &["i3", "r1", "u1", "cook_attempt", "4"],
            ],
        ),
    }
}

fn clean_dataset() -> Dataset {
    dataset_with_steps(&[&["r1", "1", "Chop"], &["r1", "2", "Boil"], &["r1", "3", "Blend"]])
}

#[test]
fn test_clean_dataset_passes() {
    let report = Validator::new().validate(&clean_dataset());

    assert!(report.all_passed(), "{}", report.render_text());
    assert!(report.is_clean());
    assert_eq!(report.findings.len(), ExpectationSuite::standard(&clean_dataset()).len());
    assert!(report.step_sequences.is_empty());
}

#[test]
fn test_gapped_step_sequence_fails() {
    let data = dataset_with_steps(&[&["r1", "1", "Chop"], &["r1", "2", "Boil"], &["r1", "4", "Blend"]]);
    let report = Validator::new().validate(&data);

    assert_eq!(report.step_sequences.len(), 1);
    let issue = &report.step_sequences[0];
    assert_eq!(issue.recipe_id, "r1");
    assert_eq!(issue.expected, vec![1, 2, 3]);
    assert_eq!(issue.actual, vec![1, 2, 4]);

    // Attached to the recipe's own record, not added as an extra record
    assert_eq!(report.records.recipes.len(), 1);
    let recipe = &report.records.recipes[0];
    assert!(!recipe.valid);
    assert_eq!(
        recipe.errors,
        vec!["Step order incorrect. Expected [1, 2, 3], got [1, 2, 4]"]
    );

    // Table-level expectations are unaffected
    assert!(report.all_passed());
    assert!(!report.is_clean());
}

#[test]
fn test_shuffled_step_rows_pass() {
    let data = dataset_with_steps(&[&["r1", "2", "Boil"], &["r1", "1", "Chop"], &["r1", "3", "Blend"]]);
    let report = Validator::new().validate(&data);
    assert!(report.step_sequences.is_empty());
    assert!(report.records.recipes[0].valid);
}

#[test]
fn test_orphan_interaction_fails_foreign_key_only() {
    let mut data = clean_dataset();
    data.interactions = Table::from_text_rows(
        "interactions",
        &["id", "recipe_id", "user_id", "type"],
        &[&["i1", "r1", "u1", "view"], &["i2", "r404", "u1", "like"]],
    );

    let report = Validator::new().validate(&data);
    assert!(!report.all_passed());

    let failed: Vec<_> = report.findings.iter().filter(|f| !f.success).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].table, "interactions");
    assert_eq!(failed[0].check, "Foreign key 'recipe_id' matches 'recipes.id'");
    assert!(failed[0].detail.as_deref().unwrap().starts_with("1 value(s)"));

    // The orphan row is still reported, and it is valid on its own terms
    assert_eq!(report.records.interactions.len(), 2);
    assert!(report.records.interactions[1].valid);
}

#[test]
fn test_missing_column_is_a_finding_not_an_error() {
    let mut data = clean_dataset();
    data.users = Table::from_text_rows("users", &["user_name"], &[&["Ada"]]);

    let report = Validator::new().validate(&data);
    let users = report
        .grouped()
        .into_iter()
        .find(|g| g.table == "users")
        .expect("users group");

    assert!(users.findings.iter().all(|f| !f.success));
    assert!(users
        .findings
        .iter()
        .any(|f| f.detail.as_deref() == Some("Column 'id' does not exist")));

    // The FK from interactions to users.id now has no parent column
    assert!(report
        .findings
        .iter()
        .any(|f| f.detail.as_deref() == Some("Parent column 'users.id' does not exist")));

    assert_eq!(report.records.users[0].errors, vec!["Missing id", "Missing name"]);
}

#[test]
fn test_every_row_gets_one_record_report() {
    let mut data = clean_dataset();
    data.recipes = recipes(&[
        &["r1", "Tomato Soup", "Warm", "10", "20", "easy", "soup"],
        &["", "", "", "", "", "", ""],
        &["r3", "Bread", "Crusty", "-1", "40", "hard", ""],
    ]);

    let report = Validator::new().validate(&data);
    let keys: Vec<_> = report.records.recipes.iter().map(|r| r.key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            RecordKey::Recipe { id: Some("r1".into()) },
            RecordKey::Recipe { id: None },
            RecordKey::Recipe { id: Some("r3".into()) },
        ]
    );
    assert_eq!(report.records.recipes[2].errors, vec!["prep_time negative", "missing tags"]);
    assert_eq!(report.summary.records[0].invalid, 2);

    // A null id fails the not-null expectation; duplicates ignore nulls
    let not_null = report
        .findings
        .iter()
        .find(|f| f.table == "recipes" && f.check == "No NULL values in 'id'")
        .unwrap();
    assert!(!not_null.success);
    assert!(report
        .findings
        .iter()
        .any(|f| f.check == "Unique values in 'id'" && f.success));
}

#[test]
fn test_legacy_step_columns_are_checked_under_their_own_name() {
    let mut data = clean_dataset();
    data.steps = Table::from_text_rows(
        "steps",
        &["recipe_id", "step_order", "step_text"],
        &[&["r1", "1", "Chop"], &["r1", "2", "Boil"]],
    );

    let report = Validator::new().validate(&data);
    assert!(report.all_passed(), "{}", report.render_text());
    assert!(report
        .findings
        .iter()
        .any(|f| f.check == "Integer-like values in 'step_order'"));
}

#[test]
fn test_report_is_deterministic() {
    let data = dataset_with_steps(&[&["r1", "3", "Blend"], &["r1", "1", "Chop"], &["r1", "x", "?"]]);

    let first = Validator::new().validate(&data).to_json().unwrap();
    let second = Validator::new().validate(&data).to_json().unwrap();
    assert_eq!(first, second);

    let parsed = ValidationReport::from_json(&first).unwrap();
    assert_eq!(parsed.step_sequences.len(), 1);
    assert_eq!(parsed.inputs.len(), 5);
    assert_eq!(parsed.inputs[0].table, "recipes");
}

#[test]
fn test_custom_suite() {
    let mut suite = ExpectationSuite::new();
    suite.unique(rcp_common::TableKind::Steps, "recipe_id");

    let report = Validator::with_suite(suite).validate(&clean_dataset());
    assert_eq!(report.findings.len(), 1);
    assert!(!report.all_passed());
}

#[tokio::test]
async fn test_validate_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, body: &str| fs::write(dir.path().join(name), body).unwrap();
    write(
        "recipe.csv",
        "id,title,description,prep_time_minutes,cook_time_minutes,difficulty,tags\n\
         r1,Soup,Warm,10,20.0,easy,soup|quick\n\
         r2,Bread,Crusty,15,,hard,bread\n",
    );
    write("ingredients.csv", "recipe_id,ingredient_name,quantity\nr1,tomato,4\nr2,flour,500g\n");
    write("steps.csv", "recipe_id,order,text\nr1,1,Chop\nr1,2,Boil\nr2,1,Knead\nr2,3,Bake\n");
    write("users.csv", "id,name\nu1,Ada\n");
    write("interactions.csv", "id,recipe_id,user_id,type,rating\ni1,r1,u1,like,5\n");

    let mut provider = CsvDirectoryProvider::new(dir.path());
    let data = load_dataset(&mut provider, &RetryPolicy::none()).await.unwrap();
    let report = Validator::new().validate(&data);

    assert!(report.all_passed(), "{}", report.render_text());
    assert_eq!(report.step_sequences.len(), 1);
    assert_eq!(report.step_sequences[0].recipe_id, "r2");

    // r2 misses its cook time and has the broken sequence
    let r2 = &report.records.recipes[1];
    assert_eq!(r2.errors.len(), 2);
    assert_eq!(r2.errors[0], "Missing cook_time_minutes");

    let text = report.render_text();
    assert!(text.contains("ALL CHECKS PASSED"));
    assert!(text.contains("recipes: 1 valid, 1 invalid"));
}
