pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod view_model;

use crate::state::AppState;
use axum::Router;

pub use repo::{MealRepository, RemoteMealRepository};
pub use repo_types::{Meal, MealType, NewMeal};
pub use view_model::{MealState, MealViewModel};

pub fn router() -> Router<AppState> {
    handlers::meal_routes()
}
