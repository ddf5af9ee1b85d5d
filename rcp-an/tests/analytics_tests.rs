//! Metrics engine integration tests
//!
//! Covers:
//! - Worked example (total time, complexity, engagement)
//! - Zero-interaction recipes keep zero counts
//! - Weights and top-N from configuration
//! - Idempotence of the full report
//! - Undefined statistics on degenerate input, constant fractional columns included
//! - Export file set and undefined-as-empty CSV fields

use rcp_an::{export, EngagementWeights, MetricsEngine, SentimentLabel};
use rcp_common::config::AnalyticsConfig;
use rcp_common::{Dataset, Table};
use std::fs;

fn dataset() -> Dataset {
    Dataset {
        recipes: Table::from_text_rows(
            "recipes",
            &["id", "title", "description", "prep_time_minutes", "cook_time_minutes", "difficulty"],
            &[
                &["r1", "Tomato Soup", "A delicious classic", "10", "20", "easy"],
                &["r2", "Plain Rice", "Boring but filling", "", "15", "easy"],
                &["r3", "Beef Stew", "Slow and hearty", "30", "120", "hard"],
            ],
        ),
        ingredients: Table::from_text_rows(
            "ingredients",
            &["recipe_id", "ingredient_name"],
            &[&["r1", "tomato"], &["r1", "salt"], &["r2", "rice"], &["r3", "beef"], &["r3", "salt"]],
        ),
        steps: Table::from_text_rows(
            "steps",
            &["recipe_id", "order", "text"],
            &[
                &["r1", "1", "Chop"],
                &["r1", "2", "Boil"],
                &["r1", "3", "Blend"],
                &["r3", "1", "Brown the beef"],
            ],
        ),
        users: Table::from_text_rows("users", &["id", "name"], &[&["u1", "Ada"], &["u2", "Lin"]]),
        interactions: Table::from_text_rows(
            "interactions",
            &["id", "recipe_id", "user_id", "type"],
            &[
                &["i1", "r1", "u1", "view"],
                &["i2", "r1", "u1", "view"],
                &["i3", "r1", "u2", "view"],
                &["i4", "r1", "u2", "view"],
                &["i5", "r1", "u1", "view"],
                &["i6", "r1", "u1", "like"],
                &["i7", "r1", "u2", "like"],
                &["i8", "r1", "u2", "cook_attempt"],
                &["i9", "r3", "u1", "view"],
            ],
        ),
    }
}

#[test]
fn test_worked_example() {
    let report = MetricsEngine::default().run(&dataset());
    let r1 = &report.recipes[0];

    assert_eq!(r1.recipe_id, "r1");
    assert_eq!(r1.total_time, 30.0);
    assert_eq!(r1.step_count, 3);
    assert_eq!(r1.complexity_score, 33.0);
    assert_eq!(r1.engagement_score, 6.5);
    assert_eq!(r1.sentiment.label, SentimentLabel::Positive);
}

#[test]
fn test_recipe_without_interactions_has_zero_counts() {
    let report = MetricsEngine::default().run(&dataset());
    let r2 = report.recipes.iter().find(|m| m.recipe_id == "r2").unwrap();

    assert_eq!((r2.views, r2.likes, r2.attempts), (0, 0, 0));
    assert_eq!(r2.engagement_score, 0.0);
    // Null prep counts as zero in sums
    assert_eq!(r2.total_time, 15.0);
    assert_eq!(r2.complexity_score, 15.0);
    assert_eq!(r2.sentiment.label, SentimentLabel::Negative);
}

#[test]
fn test_engagement_matches_weights_for_every_recipe() {
    let report = MetricsEngine::default().run(&dataset());
    for m in &report.recipes {
        let expected = 0.5 * m.views as f64 + m.likes as f64 + 2.0 * m.attempts as f64;
        assert_eq!(m.engagement_score, expected, "recipe {}", m.recipe_id);
        let prep = m.prep_time_minutes.unwrap_or(0.0);
        let cook = m.cook_time_minutes.unwrap_or(0.0);
        assert_eq!(m.complexity_score, prep + cook + m.step_count as f64);
    }
}

#[test]
fn test_engine_from_config() {
    let config = AnalyticsConfig {
        top_n: 1,
        view_weight: 0.0,
        like_weight: 3.0,
        attempt_weight: 0.0,
    };
    let engine = MetricsEngine::from_config(&config);
    assert_eq!(
        *engine.weights(),
        EngagementWeights {
            view: 0.0,
            like: 3.0,
            attempt: 0.0
        }
    );

    let report = engine.run(&dataset());
    assert_eq!(report.recipes[0].engagement_score, 6.0);
    assert_eq!(report.summary.top_ingredients.len(), 1);
    assert_eq!(report.summary.top_ingredients[0].name, "salt");
    assert_eq!(report.summary.top_viewed.len(), 1);
}

#[test]
fn test_run_is_idempotent() {
    let engine = MetricsEngine::default();
    let data = dataset();
    let first = engine.run(&data);
    let second = engine.run(&data);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_single_recipe_correlation_is_undefined() {
    let mut data = dataset();
    data.recipes = Table::from_text_rows(
        "recipes",
        &["id", "prep_time_minutes", "cook_time_minutes"],
        &[&["r1", "10", "20"]],
    );

    let report = MetricsEngine::default().run(&data);
    assert_eq!(report.summary.prep_likes_correlation, None);
    assert!(report
        .summary
        .correlation_matrix
        .values
        .iter()
        .flatten()
        .all(Option::is_none));
    assert!(export::Insights(&report.summary)
        .to_string()
        .contains("Correlation (Prep Time vs Likes): undefined"));
}

#[test]
fn test_constant_fractional_engagement_correlation_is_undefined() {
    let mut data = dataset();
    data.interactions = Table::from_text_rows(
        "interactions",
        &["id", "recipe_id", "user_id", "type"],
        &[
            &["i1", "r1", "u1", "view"],
            &["i2", "r2", "u1", "view"],
            &["i3", "r3", "u2", "view"],
        ],
    );
    let weights = EngagementWeights {
        view: 0.1,
        like: 1.0,
        attempt: 2.0,
    };

    let report = MetricsEngine::new(weights, 10).run(&data);
    assert!(report.recipes.iter().all(|m| m.engagement_score == 0.1));

    let matrix = &report.summary.correlation_matrix;
    for column in &matrix.columns {
        assert_eq!(matrix.get("engagement_score", column), None, "{}", column);
    }
    // Prep and cook still vary, so their correlation stays defined
    assert!(matrix.get("prep_time", "cook_time").is_some());
}

#[test]
fn test_write_all_exports() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("analysis");
    let report = MetricsEngine::default().run(&dataset());

    let written = export::write_all(&out, &report).unwrap();
    assert_eq!(written.len(), 11);
    for path in &written {
        assert!(path.exists(), "missing {}", path.display());
    }

    let metrics = fs::read_to_string(out.join(export::RECIPE_METRICS)).unwrap();
    let mut lines = metrics.lines();
    assert!(lines.next().unwrap().starts_with("recipe_id,title,difficulty,prep_time_minutes"));
    assert!(lines.next().unwrap().starts_with("r1,Tomato Soup,easy,10"));
    // r2 has no prep time: empty field, not 0 or NaN
    assert!(lines.next().unwrap().starts_with("r2,Plain Rice,easy,,15"));

    let ingredients = fs::read_to_string(out.join(export::TOP_INGREDIENTS)).unwrap();
    assert_eq!(ingredients.lines().next(), Some("ingredient_name,count"));
    assert_eq!(ingredients.lines().nth(1), Some("salt,2"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(export::SUMMARY_JSON)).unwrap()).unwrap();
    assert_eq!(summary["recipe_count"], 3);
    assert_eq!(summary["top_viewed"][0]["recipe_id"], "r1");

    let insights = fs::read_to_string(out.join(export::INSIGHTS_SUMMARY)).unwrap();
    assert!(insights.starts_with("=== ANALYTICS SUMMARY ===\n"));
    assert!(insights.contains("Average Preparation Time: 20.00 minutes"));

    let matrix = fs::read_to_string(out.join(export::CORRELATION_MATRIX)).unwrap();
    assert!(matrix.lines().next().unwrap().starts_with(",prep_time,cook_time"));
}
