use std::sync::Arc;

use storage::repository::Storage;
use tutor_core::model::{Catalog, UserId};
use tutor_core::recommend::RecommendationPolicy;

use crate::Clock;
use crate::error::AppServicesError;
use crate::learning_service::LearningService;
use crate::user_service::UserService;

/// Assembles app-facing services and makes sure the active user exists.
#[derive(Clone)]
pub struct AppServices {
    user_id: UserId,
    bootstrapped: bool,
    users: Arc<UserService>,
    learning: Arc<LearningService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or user bootstrap
    /// fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Catalog,
        policy: RecommendationPolicy,
        user_id: UserId,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, clock, catalog, policy, user_id).await
    }

    /// Build services over an existing `Storage`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::User` if the active user cannot be loaded or
    /// bootstrapped.
    pub async fn from_storage(
        storage: &Storage,
        clock: Clock,
        catalog: Catalog,
        policy: RecommendationPolicy,
        user_id: UserId,
    ) -> Result<Self, AppServicesError> {
        let users = Arc::new(UserService::new(clock, Arc::clone(&storage.users)));
        let (_, bootstrapped) = users.ensure(&user_id).await?;

        let learning = Arc::new(LearningService::new(
            Arc::new(catalog),
            policy,
            Arc::clone(&users),
        ));

        Ok(Self {
            user_id,
            bootstrapped,
            users,
            learning,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// True when the active user did not exist and was created on startup.
    #[must_use]
    pub fn bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }

    #[must_use]
    pub fn learning(&self) -> Arc<LearningService> {
        Arc::clone(&self.learning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::catalog::builtin_catalog;
    use tutor_core::time::fixed_clock;

    #[tokio::test]
    async fn first_start_bootstraps_then_reuses_user() {
        let storage = Storage::in_memory();
        let id = UserId::new("1");

        let first = AppServices::from_storage(
            &storage,
            fixed_clock(),
            builtin_catalog().unwrap(),
            RecommendationPolicy::default(),
            id.clone(),
        )
        .await
        .unwrap();
        assert!(first.bootstrapped());

        let second = AppServices::from_storage(
            &storage,
            fixed_clock(),
            builtin_catalog().unwrap(),
            RecommendationPolicy::default(),
            id,
        )
        .await
        .unwrap();
        assert!(!second.bootstrapped());
        assert_eq!(second.user_id().as_str(), "1");
    }
}
