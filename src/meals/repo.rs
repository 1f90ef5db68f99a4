use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::repo_types::{Meal, NewMeal, MEALS, TIMESTAMP_FIELD, USER_ID_FIELD};
use crate::{
    auth::CurrentUser,
    error::AppError,
    store::{Direction, DocumentStore, Query, StoreError},
};

/// Meal data access scoped to whoever is signed in.
#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn add_meal(&self, meal: NewMeal) -> Result<Meal, AppError>;
    /// Every meal owned by the current identity, in no particular order.
    async fn get_meals(&self) -> Result<Vec<Meal>, AppError>;
    /// No ownership check here; the backend's access rules own that.
    async fn delete_meal(&self, id: &str) -> Result<(), AppError>;
}

/// Single round trip per call against the document store. Listings are
/// ordered by the stored RFC 3339 timestamp, newest first.
pub struct RemoteMealRepository {
    identity: Arc<dyn CurrentUser>,
    store: Arc<dyn DocumentStore>,
}

impl RemoteMealRepository {
    pub fn new(identity: Arc<dyn CurrentUser>, store: Arc<dyn DocumentStore>) -> Self {
        Self { identity, store }
    }

    fn user_id(&self) -> Result<String, AppError> {
        self.identity
            .current_user_id()
            .filter(|id| !id.is_empty())
            .ok_or(AppError::Unauthenticated)
    }
}

#[async_trait]
impl MealRepository for RemoteMealRepository {
    async fn add_meal(&self, meal: NewMeal) -> Result<Meal, AppError> {
        let user_id = self.user_id()?;
        let meal = meal.into_meal(self.store.new_id(), user_id);
        let body = serde_json::to_value(&meal).map_err(StoreError::from)?;
        self.store.set(MEALS, &meal.id, body).await?;
        info!(meal_id = %meal.id, user_id = %meal.user_id, "meal added");
        Ok(meal)
    }

    async fn get_meals(&self) -> Result<Vec<Meal>, AppError> {
        let user_id = self.user_id()?;
        let query = Query::new()
            .where_eq(USER_ID_FIELD, user_id.as_str())
            .order_by(TIMESTAMP_FIELD, Direction::Descending);
        let meals = self
            .store
            .query(MEALS, &query)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value::<Meal>(doc.body))
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)?;
        debug!(%user_id, count = meals.len(), "meals fetched");
        Ok(meals)
    }

    async fn delete_meal(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(MEALS, id).await?;
        info!(meal_id = %id, "meal deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::AuthUser,
        meals::repo_types::MealType,
        store::InMemoryStore,
        test_support::OfflineStore,
    };
    use time::macros::datetime;

    struct SignedOut;

    impl CurrentUser for SignedOut {
        fn current_user_id(&self) -> Option<String> {
            None
        }
    }

    fn repo_for(user: &str, store: &Arc<InMemoryStore>) -> RemoteMealRepository {
        RemoteMealRepository::new(Arc::new(AuthUser(user.into())), store.clone())
    }

    #[tokio::test]
    async fn added_meal_is_listed_with_id_and_owner() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repo_for("u1", &store);

        let added = repo
            .add_meal(NewMeal::new(MealType::Breakfast, "Oats", 350))
            .await
            .unwrap();
        assert!(!added.id.is_empty());
        assert_eq!(added.user_id, "u1");

        let listed = repo.get_meals().await.unwrap();
        assert_eq!(listed, vec![added]);
    }

    #[tokio::test]
    async fn listing_comes_back_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repo_for("u1", &store);
        for (name, at) in [
            ("Lunch", datetime!(2024-03-04 12:00 UTC)),
            ("Dinner", datetime!(2024-03-04 19:00 UTC)),
            ("Breakfast", datetime!(2024-03-04 08:00 UTC)),
        ] {
            repo.add_meal(NewMeal::new(MealType::Lunch, name, 100).at(at))
                .await
                .unwrap();
        }

        let names: Vec<_> = repo
            .get_meals()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Dinner", "Lunch", "Breakfast"]);
    }

    #[tokio::test]
    async fn listings_never_cross_users() {
        let store = Arc::new(InMemoryStore::new());
        let alice = repo_for("alice", &store);
        let bob = repo_for("bob", &store);

        alice.add_meal(NewMeal::new(MealType::Lunch, "Wrap", 500)).await.unwrap();
        bob.add_meal(NewMeal::new(MealType::Dinner, "Stew", 650)).await.unwrap();
        bob.add_meal(NewMeal::new(MealType::Snack, "Nuts", 180)).await.unwrap();

        let alice_meals = alice.get_meals().await.unwrap();
        assert_eq!(alice_meals.len(), 1);
        assert!(alice_meals.iter().all(|m| m.user_id == "alice"));

        let bob_meals = bob.get_meals().await.unwrap();
        assert_eq!(bob_meals.len(), 2);
        assert!(bob_meals.iter().all(|m| m.user_id == "bob"));
    }

    #[tokio::test]
    async fn deleted_meal_disappears_and_missing_ids_are_fine() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repo_for("u1", &store);
        let keep = repo.add_meal(NewMeal::new(MealType::Lunch, "Rice", 400)).await.unwrap();
        let gone = repo.add_meal(NewMeal::new(MealType::Lunch, "Cake", 600)).await.unwrap();

        repo.delete_meal(&gone.id).await.unwrap();
        repo.delete_meal("does-not-exist").await.unwrap();
        assert_eq!(repo.get_meals().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn signed_out_reads_and_writes_are_unauthenticated() {
        let repo = RemoteMealRepository::new(Arc::new(SignedOut), Arc::new(InMemoryStore::new()));
        assert!(matches!(
            repo.add_meal(NewMeal::new(MealType::Snack, "Chips", 150)).await.unwrap_err(),
            AppError::Unauthenticated
        ));
        assert!(matches!(repo.get_meals().await.unwrap_err(), AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn empty_identity_counts_as_signed_out() {
        let repo = RemoteMealRepository::new(Arc::new(AuthUser(String::new())), Arc::new(InMemoryStore::new()));
        assert!(matches!(repo.get_meals().await.unwrap_err(), AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn backend_failures_carry_the_backend_message() {
        let repo = RemoteMealRepository::new(Arc::new(AuthUser("u1".into())), Arc::new(OfflineStore));
        let err = repo.get_meals().await.unwrap_err();
        assert_eq!(err.to_string(), "backend offline");
        let err = repo.delete_meal("m1").await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }
}
