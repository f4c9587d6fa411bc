use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                      // unique, immutable
    pub name: String,                 // display name
    pub lastname: String,
    pub email: String,                // unique, used as login key
    pub password_hash: String,        // PHC string, never the plaintext
    pub created_at: OffsetDateTime,   // creation timestamp
}

/// Insert payload for a new user. The password is already hashed by the
/// time this exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
}
