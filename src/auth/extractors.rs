use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::claims::TokenKind;
use super::jwt::JwtKeys;
use crate::error::AppError;

/// Extracts and validates the bearer access token, yielding the user id.
///
/// Any failure, from a missing header to a refresh token where an access
/// token belongs, rejects with the same `InvalidCredentials` response.
#[derive(Debug)]
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("auth rejected: missing Authorization header");
                AppError::InvalidCredentials
            })?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| {
                warn!("auth rejected: unsupported auth scheme");
                AppError::InvalidCredentials
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "auth rejected: token verification failed");
            AppError::InvalidCredentials
        })?;

        // Refresh tokens never grant access to guarded routes.
        if claims.kind != TokenKind::Access {
            warn!(user_id = %claims.sub, "auth rejected: refresh token on guarded route");
            return Err(AppError::InvalidCredentials);
        }

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::Request;

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            access_ttl_seconds: 300,
            refresh_ttl_seconds: 3600,
        })
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/me");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("build request").into_parts();
        parts
    }

    #[tokio::test]
    async fn extracts_the_subject_from_a_bearer_access_token() {
        let keys = keys();
        let token = keys.sign_access(42, "ada@example.com").expect("sign");
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let AuthUser(user_id) = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .expect("extract");
        assert_eq!(user_id, 42);
    }

    #[tokio::test]
    async fn accepts_a_lowercase_bearer_scheme() {
        let keys = keys();
        let token = keys.sign_access(42, "ada@example.com").expect("sign");
        let mut parts = parts_with_header(Some(&format!("bearer {token}")));

        assert!(AuthUser::from_request_parts(&mut parts, &keys).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_a_missing_header() {
        let keys = keys();
        let mut parts = parts_with_header(None);
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn rejects_a_non_bearer_scheme() {
        let keys = keys();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn rejects_a_refresh_token() {
        let keys = keys();
        let token = keys.sign_refresh(42).expect("sign");
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn rejects_garbage_tokens() {
        let keys = keys();
        let mut parts = parts_with_header(Some("Bearer not.a.jwt"));
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
