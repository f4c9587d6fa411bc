use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Capability set for credential hashing. The concrete scheme is picked
/// when the application state is composed, never by call-site branching.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext with a fresh random salt; two calls on the same
    /// input yield different outputs.
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
    /// Check a plaintext against a stored hash. `Ok(false)` is a mismatch;
    /// `Err` means the comparison itself could not run.
    fn compare(&self, plain: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Argon2id over PHC strings; algorithm parameters and salt travel inside
/// the hash itself, and comparison goes through argon2's constant-time
/// verifier.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn compare(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "argon2 verify_password error");
                Err(anyhow::anyhow!(e.to_string()))
            }
        }
    }
}
