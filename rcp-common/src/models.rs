//! Typed records over loaded tables
//!
//! Each entity gets an explicit record type whose fields are [`Field`]s:
//! a field is either absent (missing column or null cell), malformed (text
//! present but not convertible), or present. Nothing defaults silently, so a
//! data-quality problem stays visible to whoever reads the record.

use crate::table::{Row, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column aliases accepted for each logical field.
///
/// The first entry is the canonical name; later entries are names emitted by
/// older flattening runs.
pub mod columns {
    pub const ID: &[&str] = &["id"];
    pub const TITLE: &[&str] = &["title"];
    pub const DESCRIPTION: &[&str] = &["description"];
    pub const SERVINGS: &[&str] = &["servings"];
    pub const PREP_TIME: &[&str] = &["prep_time_minutes"];
    pub const COOK_TIME: &[&str] = &["cook_time_minutes"];
    pub const DIFFICULTY: &[&str] = &["difficulty"];
    pub const CUISINE: &[&str] = &["cuisine"];
    pub const REGION: &[&str] = &["region"];
    pub const TAGS: &[&str] = &["tags"];
    pub const CREATED_AT: &[&str] = &["created_at"];

    pub const RECIPE_ID: &[&str] = &["recipe_id"];
    pub const INGREDIENT_NAME: &[&str] = &["ingredient_name"];
    pub const QUANTITY: &[&str] = &["quantity", "ingredient_quantity"];

    pub const STEP_ORDER: &[&str] = &["order", "step_order"];
    pub const STEP_TEXT: &[&str] = &["text", "step_text"];

    pub const NAME: &[&str] = &["name"];

    pub const USER_ID: &[&str] = &["user_id"];
    pub const INTERACTION_TYPE: &[&str] = &["type"];
    pub const TIMESTAMP: &[&str] = &["timestamp"];
    pub const RATING: &[&str] = &["rating"];
}

/// Separator used when tag lists are flattened into one cell
pub const TAG_SEPARATOR: char = '|';

/// A fallibly-read field value
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Column missing or cell null
    Absent,
    /// Text present but not convertible to `T`
    Malformed(String),
    /// Successfully converted value
    Present(T),
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }
}

impl<T: Copy> Field<T> {
    /// Present value, or `fallback` when absent or malformed
    pub fn value_or(&self, fallback: T) -> T {
        self.value().copied().unwrap_or(fallback)
    }
}

fn text_field(raw: Option<&str>) -> Field<String> {
    match raw {
        Some(text) => Field::Present(text.to_string()),
        None => Field::Absent,
    }
}

fn parse_field<T>(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Field<T> {
    match raw {
        None => Field::Absent,
        Some(text) => match parse(text.trim()) {
            Some(v) => Field::Present(v),
            None => Field::Malformed(text.to_string()),
        },
    }
}

/// Parse a finite floating-point number
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer, accepting floats with no fractional part (`"10.0"`)
pub fn parse_integer_like(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let v = parse_number(text)?;
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Recipe difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Interaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    View,
    Like,
    CookAttempt,
}

impl InteractionType {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "view" => Some(InteractionType::View),
            "like" => Some(InteractionType::Like),
            "cook_attempt" => Some(InteractionType::CookAttempt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Like => "like",
            InteractionType::CookAttempt => "cook_attempt",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub row: usize,
    pub id: Field<String>,
    pub title: Field<String>,
    pub description: Field<String>,
    pub servings: Field<f64>,
    pub prep_time_minutes: Field<f64>,
    pub cook_time_minutes: Field<f64>,
    pub difficulty: Field<Difficulty>,
    pub cuisine: Field<String>,
    pub region: Field<String>,
    pub tags: Field<Vec<String>>,
    pub created_at: Field<String>,
}

impl RecipeRecord {
    pub fn from_row(row: Row<'_>) -> Self {
        Self {
            row: row.index(),
            id: text_field(row.get_any(columns::ID)),
            title: text_field(row.get_any(columns::TITLE)),
            description: text_field(row.get_any(columns::DESCRIPTION)),
            servings: parse_field(row.get_any(columns::SERVINGS), parse_number),
            prep_time_minutes: parse_field(row.get_any(columns::PREP_TIME), parse_number),
            cook_time_minutes: parse_field(row.get_any(columns::COOK_TIME), parse_number),
            difficulty: parse_field(row.get_any(columns::DIFFICULTY), Difficulty::parse),
            cuisine: text_field(row.get_any(columns::CUISINE)),
            region: text_field(row.get_any(columns::REGION)),
            tags: parse_field(row.get_any(columns::TAGS), |text| {
                let tags: Vec<String> = text
                    .split(TAG_SEPARATOR)
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                (!tags.is_empty()).then_some(tags)
            }),
            created_at: text_field(row.get_any(columns::CREATED_AT)),
        }
    }

    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().map(Self::from_row).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientRecord {
    pub row: usize,
    pub recipe_id: Field<String>,
    pub ingredient_name: Field<String>,
    pub quantity: Field<String>,
}

impl IngredientRecord {
    pub fn from_row(row: Row<'_>) -> Self {
        Self {
            row: row.index(),
            recipe_id: text_field(row.get_any(columns::RECIPE_ID)),
            ingredient_name: text_field(row.get_any(columns::INGREDIENT_NAME)),
            quantity: text_field(row.get_any(columns::QUANTITY)),
        }
    }

    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().map(Self::from_row).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub row: usize,
    pub recipe_id: Field<String>,
    pub order: Field<i64>,
    /// Raw order text, kept so reports can quote what was actually supplied
    pub order_text: Option<String>,
    pub text: Field<String>,
}

impl StepRecord {
    pub fn from_row(row: Row<'_>) -> Self {
        let order_raw = row.get_any(columns::STEP_ORDER);
        Self {
            row: row.index(),
            recipe_id: text_field(row.get_any(columns::RECIPE_ID)),
            order: parse_field(order_raw, parse_integer_like),
            order_text: order_raw.map(str::to_string),
            text: text_field(row.get_any(columns::STEP_TEXT)),
        }
    }

    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().map(Self::from_row).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub row: usize,
    pub id: Field<String>,
    pub name: Field<String>,
}

impl UserRecord {
    pub fn from_row(row: Row<'_>) -> Self {
        Self {
            row: row.index(),
            id: text_field(row.get_any(columns::ID)),
            name: text_field(row.get_any(columns::NAME)),
        }
    }

    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().map(Self::from_row).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    pub row: usize,
    pub id: Field<String>,
    pub recipe_id: Field<String>,
    pub user_id: Field<String>,
    pub interaction_type: Field<InteractionType>,
    pub timestamp: Field<String>,
    pub rating: Field<f64>,
}

impl InteractionRecord {
    pub fn from_row(row: Row<'_>) -> Self {
        Self {
            row: row.index(),
            id: text_field(row.get_any(columns::ID)),
            recipe_id: text_field(row.get_any(columns::RECIPE_ID)),
            user_id: text_field(row.get_any(columns::USER_ID)),
            interaction_type: parse_field(
                row.get_any(columns::INTERACTION_TYPE),
                InteractionType::parse,
            ),
            timestamp: text_field(row.get_any(columns::TIMESTAMP)),
            rating: parse_field(row.get_any(columns::RATING), parse_number),
        }
    }

    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().map(Self::from_row).collect()
    }
}
