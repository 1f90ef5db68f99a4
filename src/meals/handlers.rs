use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{
    dto::{MealFilter, MealForm},
    repo::{MealRepository, RemoteMealRepository},
    repo_types::{Meal, MEALS, USER_ID_FIELD},
    services::{self, MealSummary},
};
use crate::{auth::VerifiedUser, error::AppError, state::AppState};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/summary", get(meal_summary))
        .route("/meals/:id", delete(delete_meal))
}

fn repository(state: &AppState, user: VerifiedUser) -> RemoteMealRepository {
    RemoteMealRepository::new(Arc::new(user), state.store.clone())
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    user: VerifiedUser,
    Query(filter): Query<MealFilter>,
) -> Result<Json<Vec<Meal>>, AppError> {
    let mut meals = repository(&state, user).get_meals().await?;
    if let Some(meal_type) = filter.meal_type {
        meals = services::filter_by_type(&meals, meal_type);
    }
    services::sort_recent_first(&mut meals);
    Ok(Json(meals))
}

#[instrument(skip(state, form))]
pub async fn create_meal(
    State(state): State<AppState>,
    user: VerifiedUser,
    Json(form): Json<MealForm>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Meal>), AppError> {
    let new_meal = form.into_new_meal()?;
    let meal = repository(&state, user).add_meal(new_meal).await?;
    let location = format!("/api/v1/meals/{}", meal.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(meal)))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    user: VerifiedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = user.0.clone();
    if let Some(body) = state.store.get(MEALS, &id).await? {
        let owner = body.get(USER_ID_FIELD).and_then(Value::as_str);
        if owner != Some(user_id.as_str()) {
            warn!(%user_id, meal_id = %id, "delete of another user's meal refused");
            return Err(AppError::NotFound("Meal not found"));
        }
    }
    repository(&state, user).delete_meal(&id).await?;
    info!(%user_id, meal_id = %id, "meal delete requested");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn meal_summary(
    State(state): State<AppState>,
    user: VerifiedUser,
) -> Result<Json<MealSummary>, AppError> {
    let meals = repository(&state, user).get_meals().await?;
    Ok(Json(services::summarize(&meals)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::MealType;
    use serde_json::json;

    fn form(meal_type: &str, name: &str, calories: &str) -> Json<MealForm> {
        Json(
            serde_json::from_value(json!({ "type": meal_type, "name": name, "calories": calories }))
                .unwrap(),
        )
    }

    fn user(id: &str) -> VerifiedUser {
        VerifiedUser(id.into())
    }

    #[tokio::test]
    async fn create_list_delete_cycle() {
        let state = AppState::fake();

        let (status, [(name, location)], Json(created)) =
            create_meal(State(state.clone()), user("u1"), form("lunch", "Ramen", "640kcal"))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(name, header::LOCATION);
        assert_eq!(location, format!("/api/v1/meals/{}", created.id));
        assert_eq!(created.calories, 640);
        assert_eq!(created.user_id, "u1");

        let Json(listed) = list_meals(
            State(state.clone()),
            user("u1"),
            Query(MealFilter { meal_type: None }),
        )
        .await
        .unwrap();
        assert_eq!(listed, vec![created.clone()]);

        let status = delete_meal(State(state.clone()), user("u1"), Path(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(listed) = list_meals(State(state), user("u1"), Query(MealFilter { meal_type: None }))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn only_the_owner_can_delete_a_meal() {
        let state = AppState::fake();
        let (_, _, Json(meal)) =
            create_meal(State(state.clone()), user("alice"), form("lunch", "Ramen", "640"))
                .await
                .unwrap();

        let err = delete_meal(State(state.clone()), user("mallory"), Path(meal.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let Json(left) = list_meals(
            State(state.clone()),
            user("alice"),
            Query(MealFilter { meal_type: None }),
        )
        .await
        .unwrap();
        assert_eq!(left, vec![meal]);

        let status = delete_meal(State(state), user("mallory"), Path("never-existed".into()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn list_filters_by_type_and_owner() {
        let state = AppState::fake();
        for (who, t, name) in [("u1", "snack", "Apple"), ("u1", "dinner", "Fish"), ("u2", "snack", "Pear")] {
            create_meal(State(state.clone()), user(who), form(t, name, "100"))
                .await
                .unwrap();
        }

        let Json(snacks) = list_meals(
            State(state),
            user("u1"),
            Query(MealFilter {
                meal_type: Some(MealType::Snack),
            }),
        )
        .await
        .unwrap();
        assert_eq!(snacks.len(), 1);
        assert_eq!(snacks[0].name, "Apple");
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_the_store() {
        let state = AppState::fake();
        let err = create_meal(State(state.clone()), user("u1"), form("lunch", "", "100"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let Json(summary) = meal_summary(State(state), user("u1")).await.unwrap();
        assert_eq!(summary.count, 0);
    }

    #[tokio::test]
    async fn summary_totals_calories() {
        let state = AppState::fake();
        create_meal(State(state.clone()), user("u1"), form("breakfast", "Eggs", "250"))
            .await
            .unwrap();
        create_meal(State(state.clone()), user("u1"), form("dinner", "Steak", "900"))
            .await
            .unwrap();

        let Json(summary) = meal_summary(State(state), user("u1")).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_calories, 1150);
        assert_eq!(summary.by_weekday.iter().sum::<usize>(), 2);
    }
}
