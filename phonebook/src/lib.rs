//! Phonebook library
//!
//! This library exposes the core functionality of the phonebook for testing
//! and for any front-end that wants to drive it.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
