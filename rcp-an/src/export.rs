//! Export of metrics tables and summaries
//!
//! CSV files go through the `csv` crate; undefined numbers are written as
//! empty fields. `summary.json` is the serialized [`CorpusSummary`] and
//! `insights_summary.txt` is the human-readable digest.

use crate::corpus::{CorpusSummary, CountEntry, RecipeRank};
use crate::AnalyticsReport;
use rcp_common::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RECIPE_METRICS: &str = "recipe_metrics.csv";
pub const RECIPE_SENTIMENT: &str = "recipe_sentiment.csv";
pub const TOP_INGREDIENTS: &str = "top_ingredients.csv";
pub const HIGH_ENGAGEMENT_INGREDIENTS: &str = "high_engagement_ingredients.csv";
pub const TOP_VIEWED_RECIPES: &str = "top_viewed_recipes.csv";
pub const USER_ACTIVITY: &str = "user_activity.csv";
pub const STEP_COUNTS: &str = "step_counts.csv";
pub const DIFFICULTY_DISTRIBUTION: &str = "difficulty_distribution.csv";
pub const CORRELATION_MATRIX: &str = "correlation_matrix.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const INSIGHTS_SUMMARY: &str = "insights_summary.txt";

#[derive(Serialize)]
struct MetricsRow<'a> {
    recipe_id: &'a str,
    title: Option<&'a str>,
    difficulty: Option<&'static str>,
    prep_time_minutes: Option<f64>,
    cook_time_minutes: Option<f64>,
    total_time: f64,
    step_count: u64,
    views: u64,
    likes: u64,
    attempts: u64,
    complexity_score: f64,
    engagement_score: f64,
    sentiment_score: i32,
    sentiment_label: &'static str,
}

#[derive(Serialize)]
struct SentimentRow<'a> {
    recipe_id: &'a str,
    title: Option<&'a str>,
    sentiment_score: i32,
    sentiment_label: &'static str,
}

#[derive(Serialize)]
struct ViewsRow<'a> {
    recipe_id: &'a str,
    title: Option<&'a str>,
    views: f64,
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_counts(path: &Path, header: [&str; 2], entries: &[CountEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for entry in entries {
        let count = entry.count.to_string();
        writer.write_record([entry.name.as_str(), count.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_correlation_matrix(path: &Path, summary: &CorpusSummary) -> Result<()> {
    let matrix = &summary.correlation_matrix;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![String::new()];
    header.extend(matrix.columns.iter().cloned());
    writer.write_record(&header)?;

    for (name, values) in matrix.columns.iter().zip(&matrix.values) {
        let mut record = vec![name.clone()];
        record.extend(values.iter().map(|v| v.map(|r| format!("{:.6}", r)).unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every export file into `dir` (created if needed); returns the paths
pub fn write_all(dir: &Path, report: &AnalyticsReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let summary = &report.summary;
    let path = |name: &str| dir.join(name);

    write_rows(
        &path(RECIPE_METRICS),
        report.recipes.iter().map(|m| MetricsRow {
            recipe_id: &m.recipe_id,
            title: m.title.as_deref(),
            difficulty: m.difficulty.map(|d| d.as_str()),
            prep_time_minutes: m.prep_time_minutes,
            cook_time_minutes: m.cook_time_minutes,
            total_time: m.total_time,
            step_count: m.step_count,
            views: m.views,
            likes: m.likes,
            attempts: m.attempts,
            complexity_score: m.complexity_score,
            engagement_score: m.engagement_score,
            sentiment_score: m.sentiment.score,
            sentiment_label: m.sentiment.label.as_str(),
        }),
    )?;

    write_rows(
        &path(RECIPE_SENTIMENT),
        report.recipes.iter().map(|m| SentimentRow {
            recipe_id: &m.recipe_id,
            title: m.title.as_deref(),
            sentiment_score: m.sentiment.score,
            sentiment_label: m.sentiment.label.as_str(),
        }),
    )?;

    write_rows(
        &path(TOP_VIEWED_RECIPES),
        summary.top_viewed.iter().map(|r| ViewsRow {
            recipe_id: &r.recipe_id,
            title: r.title.as_deref(),
            views: r.value,
        }),
    )?;

    write_counts(&path(TOP_INGREDIENTS), ["ingredient_name", "count"], &summary.top_ingredients)?;
    write_counts(
        &path(HIGH_ENGAGEMENT_INGREDIENTS),
        ["ingredient_name", "count"],
        &summary.high_engagement_ingredients,
    )?;
    write_counts(&path(USER_ACTIVITY), ["user_id", "interactions"], &summary.user_activity)?;
    write_counts(&path(STEP_COUNTS), ["recipe_id", "step_count"], &summary.step_counts)?;
    write_counts(
        &path(DIFFICULTY_DISTRIBUTION),
        ["difficulty", "count"],
        &summary.difficulty_distribution,
    )?;
    write_correlation_matrix(&path(CORRELATION_MATRIX), summary)?;

    std::fs::write(path(SUMMARY_JSON), serde_json::to_string_pretty(summary)?)?;
    std::fs::write(path(INSIGHTS_SUMMARY), Insights(summary).to_string())?;

    let written: Vec<PathBuf> = [
        RECIPE_METRICS,
        RECIPE_SENTIMENT,
        TOP_VIEWED_RECIPES,
        TOP_INGREDIENTS,
        HIGH_ENGAGEMENT_INGREDIENTS,
        USER_ACTIVITY,
        STEP_COUNTS,
        DIFFICULTY_DISTRIBUTION,
        CORRELATION_MATRIX,
        SUMMARY_JSON,
        INSIGHTS_SUMMARY,
    ]
    .into_iter()
    .map(path)
    .collect();

    debug!(files = written.len(), dir = %dir.display(), "Exports written");
    Ok(written)
}

/// `value` to `places` decimals, or "undefined"
fn fixed(value: Option<f64>, places: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", places, v),
        None => "undefined".to_string(),
    }
}

/// Plain-text digest of a [`CorpusSummary`]
pub struct Insights<'a>(pub &'a CorpusSummary);

fn counts_section(f: &mut fmt::Formatter<'_>, title: &str, entries: &[CountEntry]) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    if entries.is_empty() {
        writeln!(f, "  (none)")?;
    }
    for entry in entries {
        writeln!(f, "  {:<24} {}", entry.name, entry.count)?;
    }
    writeln!(f)
}

fn ranks_section(f: &mut fmt::Formatter<'_>, title: &str, ranks: &[RecipeRank]) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    if ranks.is_empty() {
        writeln!(f, "  (none)")?;
    }
    for rank in ranks {
        writeln!(
            f,
            "  {:<12} {:<28} {}",
            rank.recipe_id,
            rank.title.as_deref().unwrap_or(""),
            rank.value
        )?;
    }
    writeln!(f)
}

impl fmt::Display for Insights<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        let limit = s.top_n.min(s.user_activity.len());
        let steps_limit = s.top_n.min(s.step_counts.len());

        writeln!(f, "=== ANALYTICS SUMMARY ===")?;
        writeln!(f)?;
        writeln!(f, "Recipes Scored: {}", s.recipe_count)?;
        writeln!(f, "Average Preparation Time: {} minutes", fixed(s.average_prep_time, 2))?;
        writeln!(f, "Average Total Cooking Time: {} minutes", fixed(s.average_total_time, 2))?;
        writeln!(
            f,
            "Correlation (Prep Time vs Likes): {}",
            fixed(s.prep_likes_correlation, 4)
        )?;
        writeln!(
            f,
            "Average Steps Per Recipe: {}",
            fixed(s.average_steps_per_recipe, 2)
        )?;
        writeln!(f, "High-Engagement Like Threshold (median): {:.2}", s.like_threshold)?;
        writeln!(f)?;

        counts_section(f, "TOP INGREDIENTS", &s.top_ingredients)?;
        counts_section(f, "DIFFICULTY DISTRIBUTION", &s.difficulty_distribution)?;
        ranks_section(f, "TOP VIEWED RECIPES", &s.top_viewed)?;
        ranks_section(f, "TOP ENGAGEMENT RECIPES", &s.top_engagement)?;
        ranks_section(f, "MOST COMPLEX RECIPES", &s.most_complex)?;
        ranks_section(f, "LEAST COMPLEX RECIPES", &s.least_complex)?;
        counts_section(f, "HIGH ENGAGEMENT INGREDIENTS", &s.high_engagement_ingredients)?;
        counts_section(f, "STEP COUNTS PER RECIPE", &s.step_counts[..steps_limit])?;
        counts_section(f, "MOST ACTIVE USERS", &s.user_activity[..limit])?;
        counts_section(f, "SENTIMENT DISTRIBUTION", &s.sentiment_distribution)
    }
}
