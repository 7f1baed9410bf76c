//! Domain models for the phonebook.
//!
//! These types represent validated domain objects separate from database row
//! types and from the JSON shapes the routes expose.

pub mod address;
pub mod user;

pub use address::Address;
pub use user::User;
