use serde::Deserialize;
use time::OffsetDateTime;

use super::repo_types::{MealType, NewMeal};
use crate::validation::{parse_calories, sanitize_calories, validate_meal_name, ValidationError};

/// Add-meal form. `calories` is raw text as typed.
#[derive(Debug, Clone, Deserialize)]
pub struct MealForm {
    #[serde(rename = "type", default)]
    pub meal_type: MealType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub calories: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl MealForm {
    pub fn into_new_meal(self) -> Result<NewMeal, ValidationError> {
        validate_meal_name(&self.name)?;
        let calories = parse_calories(&sanitize_calories(&self.calories))?;
        Ok(NewMeal {
            meal_type: self.meal_type,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            calories,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MealFilter {
    #[serde(rename = "type")]
    pub meal_type: Option<MealType>,
}
