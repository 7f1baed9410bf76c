//! In-process store used by tests.
//!
//! Mirrors the `PostgreSQL` schema closely enough for the services to behave
//! identically: sequential ids starting at 1, a unique email constraint and
//! the address-owner reference.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;

use phonebook_core::{AddressId, Email, UserId};

use super::{AddressStore, RepositoryError, Store, UserStore};
use crate::models::{Address, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    addresses: BTreeMap<AddressId, Address>,
    next_user_id: i32,
    next_address_id: i32,
}

/// Shared in-memory tables.
///
/// Clones share the same tables, like clones of a connection pool.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful write statements executed so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of user rows.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.email == *email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        tables.next_user_id += 1;
        let id = UserId::new(tables.next_user_id);
        tables.users.insert(
            id,
            User {
                id,
                email: email.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        drop(tables);

        self.record_write();
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }
}

impl AddressStore for MemoryStore {
    async fn create_address(
        &self,
        owner: UserId,
        name: &str,
        phone_number: &str,
    ) -> Result<Address, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner) {
            return Err(RepositoryError::Conflict(
                "address owner does not exist".to_owned(),
            ));
        }

        tables.next_address_id += 1;
        let address = Address {
            id: AddressId::new(tables.next_address_id),
            user_id: owner,
            name: name.to_owned(),
            phone_number: phone_number.to_owned(),
        };
        tables.addresses.insert(address.id, address.clone());
        drop(tables);

        self.record_write();
        Ok(address)
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, RepositoryError> {
        Ok(self.tables.read().await.addresses.values().cloned().collect())
    }

    async fn list_addresses_by_owner(&self, owner: UserId) -> Result<Vec<Address>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .addresses
            .values()
            .filter(|address| address.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        Ok(self.tables.read().await.addresses.get(&id).cloned())
    }

    async fn update_address(
        &self,
        id: AddressId,
        name: &str,
        phone_number: &str,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let address = tables
            .addresses
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        name.clone_into(&mut address.name);
        phone_number.clone_into(&mut address.phone_number);
        drop(tables);

        self.record_write();
        Ok(())
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), RepositoryError> {
        let removed = self.tables.write().await.addresses.remove(&id);
        if removed.is_none() {
            return Err(RepositoryError::NotFound);
        }

        self.record_write();
        Ok(())
    }
}

impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
