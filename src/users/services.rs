use std::sync::Arc;

use tracing::info;

use crate::auth::password::PasswordHasher;
use crate::error::AppResult;
use crate::users::dto::CreateUserRequest;
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User};

/// Registration and lookup over the user store.
#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UsersService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Hash the password and persist a new user. The plaintext is dropped
    /// here; a duplicate email surfaces as `DuplicateUser`.
    pub async fn create(&self, request: CreateUserRequest) -> AppResult<User> {
        let password_hash = self.hasher.hash(&request.password)?;
        let user = self
            .store
            .create(NewUser {
                name: request.name,
                lastname: request.lastname,
                email: request.email,
                password_hash,
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.store.find_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.store.list().await
    }
}
