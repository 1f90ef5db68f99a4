use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const MEALS: &str = "meals";
pub const USER_ID_FIELD: &str = "user_id";
pub const TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[default]
    #[serde(alias = "BREAKFAST")]
    Breakfast,
    #[serde(alias = "LUNCH")]
    Lunch,
    #[serde(alias = "DINNER")]
    Dinner,
    #[serde(alias = "SNACK")]
    Snack,
}

/// A persisted meal. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub calories: u32,
}

/// What the caller supplies; id and owner are stamped on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeal {
    pub meal_type: MealType,
    pub name: String,
    pub description: String,
    pub calories: u32,
    pub timestamp: Option<OffsetDateTime>,
}

impl NewMeal {
    pub fn new(meal_type: MealType, name: impl Into<String>, calories: u32) -> Self {
        Self {
            meal_type,
            name: name.into(),
            description: String::new(),
            calories,
            timestamp: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn at(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub(crate) fn into_meal(self, id: String, user_id: String) -> Meal {
        Meal {
            id,
            user_id,
            meal_type: self.meal_type,
            name: self.name,
            description: self.description,
            timestamp: self.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            calories: self.calories,
        }
    }
}
