//! Storage module
//!
//! File-backed JSON documents: the contact list and its store.

pub mod contact_store;
pub mod json_store;

pub use contact_store::ContactStore;
pub use json_store::JsonStore;
