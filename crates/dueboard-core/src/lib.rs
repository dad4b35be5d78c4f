//! Core types and trait definitions for the Dueboard due-date monitor.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod card;
pub mod clock;
pub mod comment;
pub mod error;
pub mod event;
pub mod source;
pub mod store;
pub mod suppression;

pub use error::{Error, Result};
