//! Owner-checked contact records.
//!
//! Reads are open to any authenticated caller. Updates and deletes are only
//! allowed for the user recorded as the address owner at creation.

use phonebook_core::{AddressId, ClientError, UserId};

use super::ServiceError;
use crate::db::{AddressStore, RepositoryError};
use crate::models::Address;

const NOT_FOUND: &str = "address not found";

/// Contact record operations over an [`AddressStore`].
#[derive(Debug)]
pub struct AddressService<S> {
    store: S,
}

impl<S: AddressStore> AddressService<S> {
    /// Create a new address service.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an address owned by `owner`.
    ///
    /// # Errors
    ///
    /// Store failures are returned unclassified.
    pub async fn create(
        &self,
        owner: UserId,
        name: &str,
        phone_number: &str,
    ) -> Result<Address, ServiceError> {
        let address = self.store.create_address(owner, name, phone_number).await?;
        tracing::info!(address_id = %address.id, user_id = %owner, "Address created");
        Ok(address)
    }

    /// Every address, regardless of owner.
    ///
    /// # Errors
    ///
    /// Store failures are returned unclassified.
    pub async fn list_all(&self) -> Result<Vec<Address>, ServiceError> {
        Ok(self.store.list_addresses().await?)
    }

    /// Addresses owned by `owner`.
    ///
    /// # Errors
    ///
    /// Store failures are returned unclassified.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Address>, ServiceError> {
        Ok(self.store.list_addresses_by_owner(owner).await?)
    }

    /// One address by id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no such address exists.
    pub async fn get(&self, id: AddressId) -> Result<Address, ServiceError> {
        self.store
            .find_address(id)
            .await?
            .ok_or_else(|| ClientError::not_found(NOT_FOUND).into())
    }

    /// Replace the name and phone number of an address the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the address does not exist and
    /// `ClientError::Authorization` if the caller is not its owner.
    pub async fn update(
        &self,
        caller: UserId,
        id: AddressId,
        name: &str,
        phone_number: &str,
    ) -> Result<(), ServiceError> {
        let address = self.owned_by(caller, id, "unauthorized update").await?;

        self.store
            .update_address(address.id, name, phone_number)
            .await
            .map_err(missing_as_not_found)?;

        tracing::info!(address_id = %address.id, user_id = %caller, "Address updated");
        Ok(())
    }

    /// Delete an address the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the address does not exist and
    /// `ClientError::Authorization` if the caller is not its owner.
    pub async fn delete(&self, caller: UserId, id: AddressId) -> Result<(), ServiceError> {
        let address = self.owned_by(caller, id, "unauthorized delete").await?;

        self.store
            .delete_address(address.id)
            .await
            .map_err(missing_as_not_found)?;

        tracing::info!(address_id = %address.id, user_id = %caller, "Address deleted");
        Ok(())
    }

    async fn owned_by(
        &self,
        caller: UserId,
        id: AddressId,
        denial: &str,
    ) -> Result<Address, ServiceError> {
        let address = self.get(id).await?;

        if address.user_id != caller {
            tracing::warn!(
                address_id = %id,
                owner_id = %address.user_id,
                caller_id = %caller,
                "{denial}"
            );
            return Err(ClientError::authorization(denial).into());
        }

        Ok(address)
    }
}

/// The row vanished between the ownership check and the write.
fn missing_as_not_found(e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::NotFound => ClientError::not_found(NOT_FOUND).into(),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use phonebook_core::Email;

    use super::*;
    use crate::db::{MemoryStore, UserStore};

    async fn store_with_users(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for n in 0..count {
            let email = Email::parse(&format!("user{n}@x.com")).unwrap();
            store.create_user(&email, "hash").await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = AddressService::new(store_with_users(1).await);

        let created = service.create(UserId::new(1), "Bob", "555-1").await.unwrap();
        let fetched = service.get(AddressId::new(1)).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.user_id, UserId::new(1));
        assert_eq!(fetched.name, "Bob");
        assert_eq!(fetched.phone_number, "555-1");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let service = AddressService::new(MemoryStore::new());
        let err = service.get(AddressId::new(7)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Client(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_all_and_by_owner() {
        let service = AddressService::new(store_with_users(2).await);
        service.create(UserId::new(1), "Bob", "555-1").await.unwrap();
        service.create(UserId::new(2), "Eve", "555-2").await.unwrap();
        service.create(UserId::new(1), "Joe", "555-3").await.unwrap();

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 3);

        let mine = service.list_by_owner(UserId::new(1)).await.unwrap();
        let names: Vec<_> = mine.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Bob", "Joe"]);

        assert!(service.list_by_owner(UserId::new(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_can_update_and_delete() {
        let service = AddressService::new(store_with_users(1).await);
        let owner = UserId::new(1);
        let created = service.create(owner, "Bob", "555-1").await.unwrap();

        service.update(owner, created.id, "Robert", "555-9").await.unwrap();
        let updated = service.get(created.id).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, owner);
        assert_eq!(updated.name, "Robert");
        assert_eq!(updated.phone_number, "555-9");

        service.delete(owner, created.id).await.unwrap();
        assert!(service.get(created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_other_user_cannot_mutate() {
        let store = store_with_users(2).await;
        let service = AddressService::new(store.clone());
        let created = service.create(UserId::new(1), "Bob", "555-1").await.unwrap();
        let writes = store.write_count();

        let update = service
            .update(UserId::new(2), created.id, "Mallory", "000")
            .await
            .unwrap_err();
        let delete = service.delete(UserId::new(2), created.id).await.unwrap_err();

        assert!(matches!(
            update,
            ServiceError::Client(ClientError::Authorization(ref m)) if m == "unauthorized update"
        ));
        assert!(matches!(
            delete,
            ServiceError::Client(ClientError::Authorization(ref m)) if m == "unauthorized delete"
        ));
        assert_eq!(store.write_count(), writes);
        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_mutating_missing_address() {
        let service = AddressService::new(store_with_users(1).await);

        let update = service
            .update(UserId::new(1), AddressId::new(5), "n", "p")
            .await
            .unwrap_err();
        let delete = service.delete(UserId::new(1), AddressId::new(5)).await.unwrap_err();

        assert!(matches!(update, ServiceError::Client(ClientError::NotFound(_))));
        assert!(matches!(delete, ServiceError::Client(ClientError::NotFound(_))));
    }
}
