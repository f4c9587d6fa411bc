use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::jwt::JwtKeys;
use crate::auth::password::PasswordHasher;
use crate::error::{AppError, AppResult};
use crate::users::repo::UserStore;
use crate::users::repo_types::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// A freshly signed access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Orchestrates the login and refresh flows over the user store, the
/// password hasher, and the token signer. Stateless per request; the only
/// shared data is the read-only signing config inside [`JwtKeys`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            store,
            hasher,
            keys,
        }
    }

    /// Verify email + password and issue a token pair.
    ///
    /// Unknown email and wrong password are deliberately indistinguishable
    /// to the caller; only the logs say which it was.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!(email = %email, "login rejected: unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.hasher.compare(password, &user.password_hash)? {
            warn!(email = %email, user_id = %user.id, "login rejected: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.issue_pair(&user)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok((user, tokens))
    }

    /// Verify a refresh token and rotate in a fresh pair.
    ///
    /// Verification and lookup failures of any kind collapse into
    /// `InvalidCredentials`; an expired token, a tampered one, and a vanished
    /// user all look the same from outside. The old refresh token is not
    /// tracked and stays valid until its own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(User, TokenPair)> {
        let claims = self.keys.verify_refresh(refresh_token).map_err(|e| {
            warn!(error = %e, "refresh rejected: token verification failed");
            AppError::InvalidCredentials
        })?;

        let user = match self.store.find_by_id(claims.sub).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(user_id = %claims.sub, "refresh rejected: unknown user");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                warn!(error = %e, user_id = %claims.sub, "refresh rejected: store lookup failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        let tokens = self.issue_pair(&user)?;
        info!(user_id = %user.id, "tokens refreshed");
        Ok((user, tokens))
    }

    /// Sign the access and refresh tokens. The two signatures are
    /// independent of each other; both must succeed before anything is
    /// returned.
    fn issue_pair(&self, user: &User) -> AppResult<TokenPair> {
        let access = self.keys.sign_access(user.id, &user.email)?;
        let refresh = self.keys.sign_refresh(user.id)?;
        Ok(TokenPair { access, refresh })
    }
}
