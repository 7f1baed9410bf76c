//! Address queries against `phonebook.addresses`.

use sqlx::FromRow;

use phonebook_core::{AddressId, UserId};

use super::{AddressStore, PgStore, RepositoryError, map_insert_error};
use crate::models::Address;

/// Row shape of `phonebook.addresses`.
#[derive(Debug, FromRow)]
struct AddressRow {
    id: AddressId,
    user_id: UserId,
    name: String,
    phone_number: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            phone_number: row.phone_number,
        }
    }
}

impl AddressStore for PgStore {
    async fn create_address(
        &self,
        owner: UserId,
        name: &str,
        phone_number: &str,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            INSERT INTO phonebook.addresses (user_id, name, phone_number)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, phone_number
            ",
        )
        .bind(owner)
        .bind(name)
        .bind(phone_number)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_insert_error(e, "address owner does not exist"))?;

        Ok(row.into())
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, name, phone_number
            FROM phonebook.addresses
            ORDER BY id
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn list_addresses_by_owner(&self, owner: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, name, phone_number
            FROM phonebook.addresses
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn find_address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, name, phone_number
            FROM phonebook.addresses
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Address::from))
    }

    async fn update_address(
        &self,
        id: AddressId,
        name: &str,
        phone_number: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE phonebook.addresses
            SET name = $1, phone_number = $2
            WHERE id = $3
            ",
        )
        .bind(name)
        .bind(phone_number)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM phonebook.addresses
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
