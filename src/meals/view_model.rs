use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{
    repo::MealRepository,
    repo_types::{Meal, MealType, NewMeal},
    services,
};

/// What a screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealState {
    /// Most recent first.
    pub meals: Vec<Meal>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Observable meal list that re-fetches everything after each mutation.
///
/// Calls are not serialized: overlapping operations race on the three
/// slots and the last write wins.
pub struct MealViewModel {
    repository: Arc<dyn MealRepository>,
    state: watch::Sender<MealState>,
}

impl MealViewModel {
    pub fn new(repository: Arc<dyn MealRepository>) -> Self {
        let (state, _) = watch::channel(MealState::default());
        Self { repository, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<MealState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> MealState {
        self.state.borrow().clone()
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_modify(|s| s.is_loading = loading);
    }

    fn set_error(&self, message: String) {
        self.state.send_modify(|s| s.error = Some(message));
    }

    pub async fn load(&self) {
        self.set_loading(true);
        match self.repository.get_meals().await {
            Ok(mut meals) => {
                services::sort_recent_first(&mut meals);
                debug!(count = meals.len(), "meal list refreshed");
                self.state.send_modify(|s| {
                    s.meals = meals;
                    s.error = None;
                });
            }
            Err(e) => {
                warn!(error = %e, "loading meals failed");
                self.set_error(e.to_string());
            }
        }
        self.set_loading(false);
    }

    pub async fn add(&self, meal: NewMeal) {
        self.set_loading(true);
        match self.repository.add_meal(meal).await {
            Ok(_) => self.load().await,
            Err(e) => {
                warn!(error = %e, "adding meal failed");
                self.set_error(e.to_string());
            }
        }
        self.set_loading(false);
    }

    pub async fn remove(&self, id: &str) {
        self.set_loading(true);
        match self.repository.delete_meal(id).await {
            Ok(()) => self.load().await,
            Err(e) => {
                warn!(error = %e, meal_id = %id, "deleting meal failed");
                self.set_error(e.to_string());
            }
        }
        self.set_loading(false);
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    pub fn meals_by_type(&self, meal_type: MealType) -> Vec<Meal> {
        services::filter_by_type(&self.state.borrow().meals, meal_type)
    }

    pub fn meals_between(&self, start: OffsetDateTime, end: OffsetDateTime) -> Vec<Meal> {
        services::filter_by_range(&self.state.borrow().meals, start, end)
    }

    pub fn weekday_counts(&self) -> [usize; 7] {
        services::weekday_counts(&self.state.borrow().meals)
    }

    pub fn total_calories(&self) -> u64 {
        services::total_calories(&self.state.borrow().meals)
    }
}
