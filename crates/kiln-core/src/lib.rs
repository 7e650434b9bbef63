//! Kiln Core - Foundational types for the Kiln asset pipeline
//!
//! This crate provides the types every other Kiln crate depends on:
//! - `ContentHash` - SHA-256 based content hashing
//! - Error types and Result alias

mod error;
mod hash;

pub use error::{KilnError, Result};
pub use hash::ContentHash;
