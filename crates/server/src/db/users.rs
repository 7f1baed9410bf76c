//! User queries against `phonebook.users`.

use sqlx::FromRow;

use phonebook_core::{Email, UserId};

use super::{PgStore, RepositoryError, UserStore, map_insert_error};
use crate::models::User;

/// Row shape of `phonebook.users`.
#[derive(Debug, FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            password_hash: row.password_hash,
        })
    }
}

impl UserStore for PgStore {
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        let (id,): (UserId,) = sqlx::query_as(
            r"
            INSERT INTO phonebook.users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_insert_error(e, "email already exists"))?;

        Ok(id)
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, password_hash
            FROM phonebook.users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.map(User::try_from).transpose()
    }
}
