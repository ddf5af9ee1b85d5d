//! Corpus-level statistics
//!
//! Rankings sort by their value descending and break ties by name or id
//! ascending, so identical input always yields identical output.

use crate::metrics::RecipeMetrics;
use crate::sentiment::SentimentLabel;
use crate::stats::{self, CorrelationMatrix};
use rcp_common::models::{Field, IngredientRecord, InteractionRecord, RecipeRecord, StepRecord};
use rcp_common::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A name with an occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub name: String,
    pub count: u64,
}

/// A recipe ranked by one numeric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRank {
    pub recipe_id: String,
    pub title: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub recipe_count: usize,
    pub top_n: usize,
    pub top_ingredients: Vec<CountEntry>,
    pub average_prep_time: Option<f64>,
    pub average_total_time: Option<f64>,
    pub difficulty_distribution: Vec<CountEntry>,
    pub prep_likes_correlation: Option<f64>,
    pub correlation_matrix: CorrelationMatrix,
    pub top_viewed: Vec<RecipeRank>,
    pub top_engagement: Vec<RecipeRank>,
    pub most_complex: Vec<RecipeRank>,
    pub least_complex: Vec<RecipeRank>,
    /// Interactions per user, every user with at least one interaction
    pub user_activity: Vec<CountEntry>,
    pub sentiment_distribution: Vec<CountEntry>,
    /// Median likes over all scored recipes
    pub like_threshold: f64,
    pub high_engagement_ingredients: Vec<CountEntry>,
    /// Step rows per recipe, every recipe id that has steps
    pub step_counts: Vec<CountEntry>,
    pub average_steps_per_recipe: Option<f64>,
}

/// Count occurrences and rank them; `limit` of `None` keeps every entry
pub fn rank_counts<'a>(names: impl IntoIterator<Item = &'a str>, limit: Option<usize>) -> Vec<CountEntry> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }

    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(name, count)| CountEntry {
            name: name.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

fn rank_recipes(
    metrics: &[RecipeMetrics],
    value: impl Fn(&RecipeMetrics) -> f64,
    descending: bool,
    limit: usize,
) -> Vec<RecipeRank> {
    let mut ranked: Vec<RecipeRank> = metrics
        .iter()
        .map(|m| RecipeRank {
            recipe_id: m.recipe_id.clone(),
            title: m.title.clone(),
            value: value(m),
        })
        .collect();

    ranked.sort_by(|a, b| {
        let by_value = if descending {
            b.value.total_cmp(&a.value)
        } else {
            a.value.total_cmp(&b.value)
        };
        by_value.then_with(|| a.recipe_id.cmp(&b.recipe_id))
    });
    ranked.truncate(limit);
    ranked
}

fn ingredient_names<'a>(
    ingredients: &'a [IngredientRecord],
    keep: impl Fn(&IngredientRecord) -> bool + 'a,
) -> impl Iterator<Item = &'a str> + 'a {
    ingredients
        .iter()
        .filter(move |i| keep(i))
        .filter_map(|i| i.ingredient_name.value())
        .map(|name| name.trim())
}

fn difficulty_label(field: &Field<rcp_common::models::Difficulty>) -> Option<&str> {
    match field {
        Field::Present(difficulty) => Some(difficulty.as_str()),
        Field::Malformed(raw) => Some(raw.trim()),
        Field::Absent => None,
    }
}

pub fn correlation_matrix(metrics: &[RecipeMetrics]) -> CorrelationMatrix {
    let series = |f: fn(&RecipeMetrics) -> Option<f64>| metrics.iter().map(f).collect::<Vec<_>>();
    CorrelationMatrix::compute(&[
        ("prep_time", series(|m| m.prep_time_minutes)),
        ("cook_time", series(|m| m.cook_time_minutes)),
        ("total_time", series(|m| Some(m.total_time))),
        ("likes", series(|m| Some(m.likes as f64))),
        ("views", series(|m| Some(m.views as f64))),
        ("attempts", series(|m| Some(m.attempts as f64))),
        ("complexity_score", series(|m| Some(m.complexity_score))),
        ("engagement_score", series(|m| Some(m.engagement_score))),
    ])
}

/// Summarize the corpus. `metrics` must come from the same dataset.
pub fn summarize(data: &Dataset, metrics: &[RecipeMetrics], top_n: usize) -> CorpusSummary {
    let recipes = RecipeRecord::all(&data.recipes);
    let ingredients = IngredientRecord::all(&data.ingredients);
    let interactions = InteractionRecord::all(&data.interactions);
    let steps = StepRecord::all(&data.steps);

    let top_ingredients = rank_counts(ingredient_names(&ingredients, |_| true), Some(top_n));

    // Means cover every recipe row, including rows without an id
    let prep_times: Vec<f64> = recipes
        .iter()
        .filter_map(|r| r.prep_time_minutes.value().copied())
        .collect();
    let total_times: Vec<f64> = recipes
        .iter()
        .map(|r| r.prep_time_minutes.value_or(0.0) + r.cook_time_minutes.value_or(0.0))
        .collect();

    let difficulty_distribution =
        rank_counts(recipes.iter().filter_map(|r| difficulty_label(&r.difficulty)), None);

    let prep_series: Vec<Option<f64>> = metrics.iter().map(|m| m.prep_time_minutes).collect();
    let likes_series: Vec<Option<f64>> = metrics.iter().map(|m| Some(m.likes as f64)).collect();

    let viewed: Vec<RecipeMetrics> = metrics.iter().filter(|m| m.views > 0).cloned().collect();

    let user_activity = rank_counts(
        interactions.iter().filter_map(|i| i.user_id.value().map(String::as_str)),
        None,
    );

    let sentiment_distribution = rank_counts(
        metrics.iter().map(|m| m.sentiment.label.as_str()),
        None,
    );

    let likes: Vec<f64> = metrics.iter().map(|m| m.likes as f64).collect();
    let like_threshold = stats::median(&likes).unwrap_or(0.0);
    let engaged: HashSet<&str> = metrics
        .iter()
        .filter(|m| m.likes as f64 >= like_threshold)
        .map(|m| m.recipe_id.as_str())
        .collect();
    let high_engagement_ingredients = rank_counts(
        ingredient_names(&ingredients, |i| {
            i.recipe_id.value().is_some_and(|id| engaged.contains(id.as_str()))
        }),
        Some(top_n),
    );

    let step_counts = rank_counts(
        steps.iter().filter_map(|s| s.recipe_id.value().map(String::as_str)),
        None,
    );
    let per_recipe: Vec<f64> = step_counts.iter().map(|e| e.count as f64).collect();

    CorpusSummary {
        recipe_count: metrics.len(),
        top_n,
        top_ingredients,
        average_prep_time: stats::mean(&prep_times),
        average_total_time: stats::mean(&total_times),
        difficulty_distribution,
        prep_likes_correlation: stats::pearson(&prep_series, &likes_series),
        correlation_matrix: correlation_matrix(metrics),
        top_viewed: rank_recipes(&viewed, |m| m.views as f64, true, top_n),
        top_engagement: rank_recipes(metrics, |m| m.engagement_score, true, top_n),
        most_complex: rank_recipes(metrics, |m| m.complexity_score, true, top_n),
        least_complex: rank_recipes(metrics, |m| m.complexity_score, false, top_n),
        user_activity,
        sentiment_distribution,
        like_threshold,
        high_engagement_ingredients,
        step_counts,
        average_steps_per_recipe: stats::mean(&per_recipe),
    }
}

impl CorpusSummary {
    /// Sentiment count for one label (0 when no recipe has it)
    pub fn sentiment_count(&self, label: SentimentLabel) -> u64 {
        self.sentiment_distribution
            .iter()
            .find(|e| e.name == label.as_str())
            .map_or(0, |e| e.count)
    }
}
