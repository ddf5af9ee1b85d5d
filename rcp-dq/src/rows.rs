//! Record-level checks
//!
//! Every input row produces exactly one [`RecordReport`], valid or not.
//! Errors are human-readable strings; a record collects all of its errors
//! rather than stopping at the first.

use rcp_common::models::{
    Field, IngredientRecord, InteractionRecord, RecipeRecord, StepRecord, UserRecord,
};
use rcp_common::TableKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Natural key of a checked record. `None` parts were absent in the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKey {
    Recipe {
        id: Option<String>,
    },
    Ingredient {
        recipe_id: Option<String>,
        ingredient_name: Option<String>,
    },
    Step {
        recipe_id: Option<String>,
        order: Option<String>,
    },
    User {
        id: Option<String>,
    },
    Interaction {
        id: Option<String>,
    },
}

fn part(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("?")
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Recipe { id } => write!(f, "recipe {}", part(id)),
            RecordKey::Ingredient {
                recipe_id,
                ingredient_name,
            } => write!(f, "ingredient {}/{}", part(recipe_id), part(ingredient_name)),
            RecordKey::Step { recipe_id, order } => {
                write!(f, "step {}#{}", part(recipe_id), part(order))
            }
            RecordKey::User { id } => write!(f, "user {}", part(id)),
            RecordKey::Interaction { id } => write!(f, "interaction {}", part(id)),
        }
    }
}

/// Outcome of checking one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReport {
    pub table: TableKind,
    /// Zero-based row position in the input table
    pub row: usize,
    pub key: RecordKey,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl RecordReport {
    fn new(table: TableKind, row: usize, key: RecordKey, errors: Vec<String>) -> Self {
        Self {
            table,
            row,
            key,
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Attach an error discovered after the row check ran
    pub fn push_error(&mut self, error: String) {
        self.errors.push(error);
        self.valid = false;
    }
}

impl fmt::Display for RecordReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (row {})", self.key, self.row + 1)
    }
}

fn present_text(field: &Field<String>) -> Option<String> {
    field.value().cloned()
}

/// Collects "Missing {field}" errors for absent required fields
struct Required(Vec<String>);

impl Required {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn field<T>(mut self, name: &str, field: &Field<T>) -> Self {
        if field.is_absent() {
            self.0.push(format!("Missing {}", name));
        }
        self
    }

    fn into_errors(self) -> Vec<String> {
        self.0
    }
}

pub fn check_recipe(recipe: &RecipeRecord) -> RecordReport {
    let mut errors = Required::new()
        .field("id", &recipe.id)
        .field("title", &recipe.title)
        .field("prep_time_minutes", &recipe.prep_time_minutes)
        .field("cook_time_minutes", &recipe.cook_time_minutes)
        .field("difficulty", &recipe.difficulty)
        .into_errors();

    let times = [
        ("prep_time", &recipe.prep_time_minutes),
        ("cook_time", &recipe.cook_time_minutes),
    ];
    for (label, time) in times {
        match time {
            Field::Present(v) if *v < 0.0 => errors.push(format!("{} negative", label)),
            Field::Malformed(_) => errors.push(format!("{} not numeric", label)),
            _ => {}
        }
    }

    // Absent difficulty is both missing and outside the allowed set
    if !recipe.difficulty.is_present() {
        errors.push("invalid difficulty".to_string());
    }

    if !recipe.tags.is_present() {
        errors.push("missing tags".to_string());
    }

    RecordReport::new(
        TableKind::Recipes,
        recipe.row,
        RecordKey::Recipe {
            id: present_text(&recipe.id),
        },
        errors,
    )
}

pub fn check_ingredient(ingredient: &IngredientRecord) -> RecordReport {
    let errors = Required::new()
        .field("recipe_id", &ingredient.recipe_id)
        .field("ingredient_name", &ingredient.ingredient_name)
        .into_errors();

    RecordReport::new(
        TableKind::Ingredients,
        ingredient.row,
        RecordKey::Ingredient {
            recipe_id: present_text(&ingredient.recipe_id),
            ingredient_name: present_text(&ingredient.ingredient_name),
        },
        errors,
    )
}

pub fn check_step(step: &StepRecord) -> RecordReport {
    let mut errors = Required::new()
        .field("recipe_id", &step.recipe_id)
        .field("order", &step.order)
        .field("text", &step.text)
        .into_errors();

    match step.order {
        Field::Present(order) if order <= 0 => {
            errors.push("step_order must be positive".to_string())
        }
        Field::Malformed(_) => errors.push("step_order not a number".to_string()),
        _ => {}
    }

    RecordReport::new(
        TableKind::Steps,
        step.row,
        RecordKey::Step {
            recipe_id: present_text(&step.recipe_id),
            order: step.order_text.clone(),
        },
        errors,
    )
}

pub fn check_user(user: &UserRecord) -> RecordReport {
    let errors = Required::new()
        .field("id", &user.id)
        .field("name", &user.name)
        .into_errors();

    RecordReport::new(
        TableKind::Users,
        user.row,
        RecordKey::User {
            id: present_text(&user.id),
        },
        errors,
    )
}

pub fn check_interaction(interaction: &InteractionRecord) -> RecordReport {
    let mut errors = Required::new()
        .field("id", &interaction.id)
        .field("recipe_id", &interaction.recipe_id)
        .field("user_id", &interaction.user_id)
        .field("type", &interaction.interaction_type)
        .into_errors();

    if !interaction.interaction_type.is_present() {
        errors.push("invalid type".to_string());
    }

    match interaction.rating {
        Field::Malformed(_) => errors.push("rating not numeric".to_string()),
        Field::Present(rating) if !(1.0..=5.0).contains(&rating) => {
            errors.push("rating out of range".to_string())
        }
        _ => {}
    }

    RecordReport::new(
        TableKind::Interactions,
        interaction.row,
        RecordKey::Interaction {
            id: present_text(&interaction.id),
        },
        errors,
    )
}
