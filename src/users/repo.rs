use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::users::repo_types::{NewUser, User};

/// Persistence boundary for user records. The concrete store is picked when
/// the application state is composed; everything else sees this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    /// Insert a new user. A unique-email conflict surfaces as
    /// [`AppError::DuplicateUser`].
    async fn create(&self, new_user: NewUser) -> AppResult<User>;
    /// Persist changes to an existing record.
    async fn save(&self, user: &User) -> AppResult<()>;
    async fn list(&self) -> AppResult<Vec<User>>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Connect and bring the schema up to date. Uniqueness of `email` lives
    /// in the database, not in application checks.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            warn!(error = %e, "migration failed; continuing with the existing schema");
        }

        Ok(Self { pool })
    }
}

/// Postgres signals a unique-constraint conflict with SQLSTATE 23505.
fn map_unique_violation(err: sqlx::Error, action: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::DuplicateUser;
        }
    }
    AppError::Internal(anyhow::Error::new(err).context(action))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, lastname, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, lastname, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, lastname, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, lastname, email, password_hash, created_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.lastname)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "insert user"))?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, lastname = $3, email = $4, password_hash = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.lastname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "save user"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "user {} does not exist",
                user.id
            )));
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, lastname, email, password_hash, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("list users")?;
        Ok(users)
    }
}

/// In-memory store backing [`crate::state::AppState::fake`]. Enforces the
/// same email-uniqueness rule as the Postgres store.
#[derive(Default)]
pub struct MemoryUserStore {
    next_id: AtomicI64,
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().expect("user store lock");
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let users = self.users.lock().expect("user store lock");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().expect("user store lock");
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::DuplicateUser);
        }
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            name: new_user.name,
            lastname: new_user.lastname,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.lock().expect("user store lock");
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(AppError::DuplicateUser);
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AppError::Internal(anyhow::anyhow!(
                "user {} does not exist",
                user.id
            ))),
        }
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = self.users.lock().expect("user store lock");
        // Newest first, matching the Postgres ordering.
        Ok(users.iter().rev().cloned().collect())
    }
}
