//! Address (contact) domain types.

use phonebook_core::{AddressId, UserId};

/// A contact record owned by one user.
///
/// `user_id` is fixed at creation from the authenticated caller and is the
/// only identity allowed to change or remove the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Store-assigned address ID.
    pub id: AddressId,
    /// Owner of the record.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Phone number, stored as entered.
    pub phone_number: String,
}
