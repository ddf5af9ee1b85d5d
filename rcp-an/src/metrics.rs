//! Per-recipe derived metrics
//!
//! Interaction counts and step counts are left-joined onto the recipe table:
//! a recipe with no interactions or no steps still gets a row, with zeros.
//! Null or malformed prep/cook times count as 0 in every derived sum but stay
//! `None` in the raw columns.

use crate::sentiment::{self, Sentiment};
use rcp_common::config::AnalyticsConfig;
use rcp_common::models::{
    Difficulty, Field, InteractionRecord, InteractionType, RecipeRecord, StepRecord,
};
use rcp_common::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weights of the engagement score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementWeights {
    pub view: f64,
    pub like: f64,
    pub attempt: f64,
}

impl EngagementWeights {
    pub const DEFAULT: Self = Self {
        view: 0.5,
        like: 1.0,
        attempt: 2.0,
    };

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            view: config.view_weight,
            like: config.like_weight,
            attempt: config.attempt_weight,
        }
    }

    pub fn score(&self, counts: &InteractionCounts) -> f64 {
        self.view * counts.views as f64
            + self.like * counts.likes as f64
            + self.attempt * counts.attempts as f64
    }
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionCounts {
    pub views: u64,
    pub likes: u64,
    pub attempts: u64,
}

impl InteractionCounts {
    fn record(&mut self, kind: InteractionType) {
        match kind {
            InteractionType::View => self.views += 1,
            InteractionType::Like => self.likes += 1,
            InteractionType::CookAttempt => self.attempts += 1,
        }
    }
}

/// Derived metrics for one recipe row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMetrics {
    pub recipe_id: String,
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub prep_time_minutes: Option<f64>,
    pub cook_time_minutes: Option<f64>,
    pub total_time: f64,
    pub step_count: u64,
    pub views: u64,
    pub likes: u64,
    pub attempts: u64,
    pub complexity_score: f64,
    pub engagement_score: f64,
    pub sentiment: Sentiment,
}

/// Interaction counts per recipe id. Unrecognised or absent types are skipped.
pub fn interaction_counts(interactions: &[InteractionRecord]) -> HashMap<&str, InteractionCounts> {
    let mut counts: HashMap<&str, InteractionCounts> = HashMap::new();
    for interaction in interactions {
        if let (Field::Present(recipe_id), Field::Present(kind)) =
            (&interaction.recipe_id, &interaction.interaction_type)
        {
            counts.entry(recipe_id.as_str()).or_default().record(*kind);
        }
    }
    counts
}

/// Step rows per recipe id
pub fn step_counts(steps: &[StepRecord]) -> HashMap<&str, u64> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for recipe_id in steps.iter().filter_map(|s| s.recipe_id.value()) {
        *counts.entry(recipe_id.as_str()).or_default() += 1;
    }
    counts
}

/// Step texts per recipe id, ordered by step order then input position
fn step_texts(steps: &[StepRecord]) -> HashMap<&str, Vec<&str>> {
    let mut grouped: HashMap<&str, Vec<(Option<i64>, usize, &str)>> = HashMap::new();
    for step in steps {
        if let (Some(recipe_id), Some(text)) = (step.recipe_id.value(), step.text.value()) {
            grouped
                .entry(recipe_id.as_str())
                .or_default()
                .push((step.order.value().copied(), step.row, text.as_str()));
        }
    }
    grouped
        .into_iter()
        .map(|(recipe_id, mut texts)| {
            texts.sort();
            (recipe_id, texts.into_iter().map(|(_, _, text)| text).collect())
        })
        .collect()
}

/// Compute metrics for every recipe that has an id, in recipe table order
pub fn compute(data: &Dataset, weights: &EngagementWeights) -> Vec<RecipeMetrics> {
    let recipes = RecipeRecord::all(&data.recipes);
    let interactions = InteractionRecord::all(&data.interactions);
    let steps = StepRecord::all(&data.steps);

    let counts = interaction_counts(&interactions);
    let step_counts = step_counts(&steps);
    let texts = step_texts(&steps);

    recipes
        .iter()
        .filter_map(|recipe| {
            let recipe_id = recipe.id.value()?;
            let interactions = counts.get(recipe_id.as_str()).copied().unwrap_or_default();
            let step_count = step_counts.get(recipe_id.as_str()).copied().unwrap_or(0);

            let prep = recipe.prep_time_minutes.value_or(0.0);
            let cook = recipe.cook_time_minutes.value_or(0.0);
            let total_time = prep + cook;

            let text = sentiment::recipe_text(
                recipe.title.value().map(String::as_str),
                recipe.description.value().map(String::as_str),
                texts.get(recipe_id.as_str()).into_iter().flatten().copied(),
            );

            Some(RecipeMetrics {
                recipe_id: recipe_id.clone(),
                title: recipe.title.value().cloned(),
                difficulty: recipe.difficulty.value().copied(),
                prep_time_minutes: recipe.prep_time_minutes.value().copied(),
                cook_time_minutes: recipe.cook_time_minutes.value().copied(),
                total_time,
                step_count,
                views: interactions.views,
                likes: interactions.likes,
                attempts: interactions.attempts,
                complexity_score: total_time + step_count as f64,
                engagement_score: weights.score(&interactions),
                sentiment: sentiment::score_text(&text),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcp_common::Table;

    fn dataset() -> Dataset {
        Dataset {
            recipes: Table::from_text_rows(
                "recipes",
                &["id", "title", "description", "prep_time_minutes", "cook_time_minutes"],
                &[
                    &["r1", "Tomato Soup", "Delicious", "10", "20"],
                    &["r2", "Toast", "", "", "x"],
                    &["", "Ghost", "", "5", "5"],
                ],
            ),
            ingredients: Table::from_text_rows("ingredients", &["recipe_id"], &[]),
            steps: Table::from_text_rows(
                "steps",
                &["recipe_id", "order", "text"],
                &[&["r1", "1", "Chop"], &["r1", "2", "Boil"], &["r1", "3", "Blend"]],
            ),
            users: Table::from_text_rows("users", &["id"], &[]),
            interactions: Table::from_text_rows(
                "interactions",
                &["id", "recipe_id", "user_id", "type"],
                &[
                    &["i1", "r1", "u1", "view"],
                    &["i2", "r1", "u1", "view"],
                    &["i3", "r1", "u2", "view"],
                    &["i4", "r1", "u2", "view"],
                    &["i5", "r1", "u3", "view"],
                    &["i6", "r1", "u1", "like"],
                    &["i7", "r1", "u2", "like"],
                    &["i8", "r1", "u1", "cook_attempt"],
                    &["i9", "r1", "u1", "share"],
                ],
            ),
        }
    }

    #[test]
    fn test_worked_example() {
        let metrics = compute(&dataset(), &EngagementWeights::DEFAULT);
        let r1 = &metrics[0];

        assert_eq!(r1.views, 5);
        assert_eq!(r1.likes, 2);
        assert_eq!(r1.attempts, 1);
        assert_eq!(r1.total_time, 30.0);
        assert_eq!(r1.step_count, 3);
        assert_eq!(r1.complexity_score, 33.0);
        assert_eq!(r1.engagement_score, 6.5);
    }

    #[test]
    fn test_left_join_and_null_times() {
        let metrics = compute(&dataset(), &EngagementWeights::DEFAULT);
        // Recipe without an id is excluded
        assert_eq!(metrics.len(), 2);

        let r2 = &metrics[1];
        assert_eq!(r2.recipe_id, "r2");
        assert_eq!((r2.views, r2.likes, r2.attempts), (0, 0, 0));
        assert_eq!(r2.prep_time_minutes, None);
        assert_eq!(r2.cook_time_minutes, None);
        assert_eq!(r2.total_time, 0.0);
        assert_eq!(r2.complexity_score, 0.0);
        assert_eq!(r2.engagement_score, 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let weights = EngagementWeights {
            view: 1.0,
            like: 0.0,
            attempt: 10.0,
        };
        let metrics = compute(&dataset(), &weights);
        assert_eq!(metrics[0].engagement_score, 15.0);
    }

    #[test]
    fn test_sentiment_uses_description() {
        let metrics = compute(&dataset(), &EngagementWeights::DEFAULT);
        assert_eq!(metrics[0].sentiment.score, 1);
    }

    #[test]
    fn test_step_texts_follow_step_order() {
        let table = Table::from_text_rows(
            "steps",
            &["recipe_id", "order", "text"],
            &[&["r1", "2", "second"], &["r1", "1", "first"], &["r2", "1", "other"]],
        );
        let steps = StepRecord::all(&table);
        let texts = step_texts(&steps);
        assert_eq!(texts["r1"], vec!["first", "second"]);
        assert_eq!(texts["r2"], vec!["other"]);
    }
}
