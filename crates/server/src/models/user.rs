//! User domain types.

use phonebook_core::{Email, UserId};

/// A registered account.
///
/// Never updated or deleted once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned user ID.
    pub id: UserId,
    /// Login email, unique and case-sensitive.
    pub email: Email,
    /// Argon2 PHC string; the plaintext never reaches the store.
    pub password_hash: String,
}
