use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest},
        extractors::AuthUser,
    },
    error::{AppError, AppResult},
    state::AppState,
    users::dto::UserResponse,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Normalize only; a malformed email simply fails the lookup.
    payload.email = payload.email.trim().to_lowercase();

    let (user, tokens) = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(AuthResponse::new(&user, tokens)))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, tokens) = state.auth.refresh(&payload.refresh_token).await?;
    Ok(Json(AuthResponse::new(&user, tokens)))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::dto::CreateUserRequest;

    fn create_req(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Ada".into(),
            lastname: "Lovelace".into(),
            email: email.into(),
            password: "correct-horse-battery-staple".into(),
        }
    }

    #[tokio::test]
    async fn login_handler_normalizes_the_email() {
        let state = AppState::fake();
        state
            .users
            .create(create_req("ada@example.com"))
            .await
            .expect("seed user");

        let payload = LoginRequest {
            email: "  ADA@Example.COM ".into(),
            password: "correct-horse-battery-staple".into(),
        };
        let Json(body) = login(State(state), Json(payload)).await.expect("login");
        assert_eq!(body.user.email, "ada@example.com");
        assert!(!body.access_token.is_empty());
        assert!(!body.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn refresh_handler_returns_a_fresh_pair() {
        let state = AppState::fake();
        state
            .users
            .create(create_req("ada@example.com"))
            .await
            .expect("seed user");
        let (_, tokens) = state
            .auth
            .login("ada@example.com", "correct-horse-battery-staple")
            .await
            .expect("login");

        let payload = RefreshRequest {
            refresh_token: tokens.refresh,
        };
        let Json(body) = refresh(State(state), Json(payload)).await.expect("refresh");
        assert_eq!(body.user.email, "ada@example.com");
        assert!(!body.access_token.is_empty());
    }

    #[tokio::test]
    async fn get_me_returns_the_profile_for_the_token_subject() {
        let state = AppState::fake();
        let created = state
            .users
            .create(create_req("ada@example.com"))
            .await
            .expect("seed user");

        let Json(profile) = get_me(State(state), AuthUser(created.id))
            .await
            .expect("get_me");
        assert_eq!(profile.id, created.id);
        assert_eq!(profile.email, "ada@example.com");
    }

    #[tokio::test]
    async fn get_me_rejects_a_subject_that_no_longer_exists() {
        let state = AppState::fake();
        let err = get_me(State(state), AuthUser(9999)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
