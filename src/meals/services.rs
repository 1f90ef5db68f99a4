//! Read-only projections over a list of meals.

use serde::Serialize;
use time::OffsetDateTime;

use super::repo_types::{Meal, MealType};

pub fn sort_recent_first(meals: &mut [Meal]) {
    meals.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

pub fn filter_by_type(meals: &[Meal], meal_type: MealType) -> Vec<Meal> {
    meals
        .iter()
        .filter(|m| m.meal_type == meal_type)
        .cloned()
        .collect()
}

/// Both ends inclusive.
pub fn filter_by_range(meals: &[Meal], start: OffsetDateTime, end: OffsetDateTime) -> Vec<Meal> {
    meals
        .iter()
        .filter(|m| m.timestamp >= start && m.timestamp <= end)
        .cloned()
        .collect()
}

/// Meal counts per weekday, Sunday first.
pub fn weekday_counts(meals: &[Meal]) -> [usize; 7] {
    let mut counts = [0; 7];
    for meal in meals {
        counts[meal.timestamp.weekday().number_days_from_sunday() as usize] += 1;
    }
    counts
}

pub fn total_calories(meals: &[Meal]) -> u64 {
    meals.iter().map(|m| u64::from(m.calories)).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealSummary {
    pub count: usize,
    pub total_calories: u64,
    pub by_weekday: [usize; 7],
}

pub fn summarize(meals: &[Meal]) -> MealSummary {
    MealSummary {
        count: meals.len(),
        total_calories: total_calories(meals),
        by_weekday: weekday_counts(meals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::NewMeal;
    use time::macros::datetime;

    fn meal(id: &str, meal_type: MealType, calories: u32, at: OffsetDateTime) -> Meal {
        NewMeal::new(meal_type, id, calories)
            .at(at)
            .into_meal(id.into(), "u1".into())
    }

    fn week() -> Vec<Meal> {
        vec![
            // 2024-03-03 is a Sunday
            meal("sun", MealType::Breakfast, 300, datetime!(2024-03-03 08:00 UTC)),
            meal("mon-a", MealType::Lunch, 600, datetime!(2024-03-04 12:00 UTC)),
            meal("mon-b", MealType::Snack, 150, datetime!(2024-03-04 16:00 UTC)),
            meal("sat", MealType::Dinner, 800, datetime!(2024-03-09 19:30 UTC)),
        ]
    }

    #[test]
    fn sorts_most_recent_first() {
        let mut meals = week();
        sort_recent_first(&mut meals);
        let ids: Vec<_> = meals.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["sat", "mon-b", "mon-a", "sun"]);
    }

    #[test]
    fn filters_by_type_and_inclusive_range() {
        let meals = week();
        assert_eq!(filter_by_type(&meals, MealType::Lunch).len(), 1);
        assert!(filter_by_type(&meals, MealType::Snack)[0].id == "mon-b");

        let monday = filter_by_range(
            &meals,
            datetime!(2024-03-04 12:00 UTC),
            datetime!(2024-03-04 16:00 UTC),
        );
        assert_eq!(monday.len(), 2);
    }

    #[test]
    fn summary_counts_weekdays_and_calories() {
        let summary = summarize(&week());
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total_calories, 1850);
        assert_eq!(summary.by_weekday, [1, 2, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn empty_summary() {
        assert_eq!(
            summarize(&[]),
            MealSummary {
                count: 0,
                total_calories: 0,
                by_weekday: [0; 7]
            }
        );
    }
}
