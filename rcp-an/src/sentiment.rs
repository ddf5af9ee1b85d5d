//! Lexical sentiment over recipe text
//!
//! A word counts when it occurs anywhere in the lowercased text, including
//! inside a longer word ("dry" matches "laundry"). Each lexicon word counts
//! at most once per recipe.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const POSITIVE_WORDS: &[&str] = &[
    "delicious",
    "tasty",
    "easy",
    "quick",
    "fresh",
    "perfect",
    "love",
    "best",
    "amazing",
    "flavorful",
    "healthy",
    "crispy",
    "creamy",
    "comforting",
    "simple",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "bland",
    "burnt",
    "soggy",
    "bitter",
    "salty",
    "dry",
    "boring",
    "overcooked",
    "greasy",
    "difficult",
    "complicated",
    "tedious",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    pub score: i32,
    pub label: SentimentLabel,
}

impl Sentiment {
    pub fn from_score(score: i32) -> Self {
        let label = match score {
            s if s > 0 => SentimentLabel::Positive,
            s if s < 0 => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        };
        Self { score, label }
    }
}

fn hits(text: &str, lexicon: &[&str]) -> i32 {
    lexicon.iter().filter(|word| text.contains(*word)).count() as i32
}

/// Score already-assembled text against both lexicons
pub fn score_text(text: &str) -> Sentiment {
    let text = text.to_lowercase();
    Sentiment::from_score(hits(&text, POSITIVE_WORDS) - hits(&text, NEGATIVE_WORDS))
}

/// Title, description and step texts joined with single spaces.
/// Absent parts contribute an empty string.
pub fn recipe_text<'a>(
    title: Option<&str>,
    description: Option<&str>,
    steps: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut text = format!("{} {}", title.unwrap_or(""), description.unwrap_or(""));
    for step in steps {
        text.push(' ');
        text.push_str(step);
    }
    text.to_lowercase()
}
