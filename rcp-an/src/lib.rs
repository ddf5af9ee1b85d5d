//! # rcp-an: recipe metrics engine
//!
//! Derives per-recipe metrics (interaction counts, total time, step count,
//! complexity, engagement, lexical sentiment) and corpus-level statistics
//! from the five in-memory input tables. Computation is pure and
//! deterministic; [`export`] writes the results out.

pub mod corpus;
pub mod export;
pub mod metrics;
pub mod sentiment;
pub mod stats;

pub use corpus::{CorpusSummary, CountEntry, RecipeRank};
pub use metrics::{EngagementWeights, InteractionCounts, RecipeMetrics};
pub use sentiment::{Sentiment, SentimentLabel};

use rcp_common::config::AnalyticsConfig;
use rcp_common::Dataset;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything the engine derives from one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// One entry per recipe row with an id, in recipe table order
    pub recipes: Vec<RecipeMetrics>,
    pub summary: CorpusSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsEngine {
    weights: EngagementWeights,
    top_n: usize,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(EngagementWeights::DEFAULT, 10)
    }
}

impl MetricsEngine {
    pub fn new(weights: EngagementWeights, top_n: usize) -> Self {
        Self { weights, top_n }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(EngagementWeights::from_config(config), config.top_n)
    }

    pub fn weights(&self) -> &EngagementWeights {
        &self.weights
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn run(&self, data: &Dataset) -> AnalyticsReport {
        let recipes = metrics::compute(data, &self.weights);
        let summary = corpus::summarize(data, &recipes, self.top_n);

        info!(
            recipes = recipes.len(),
            positive = summary.sentiment_count(SentimentLabel::Positive),
            negative = summary.sentiment_count(SentimentLabel::Negative),
            "Metrics computed"
        );

        AnalyticsReport { recipes, summary }
    }
}
