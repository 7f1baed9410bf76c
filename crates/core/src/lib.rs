//! Phonebook Core - Shared types library.
//!
//! This crate provides the types shared by every phonebook component:
//! - `server` - HTTP service, domain services and stores
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP framework. The error taxonomy lives here so any transport can map
//! it without depending on the server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`error`] - Classified, caller-facing failures

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod types;

pub use error::ClientError;
pub use types::*;
