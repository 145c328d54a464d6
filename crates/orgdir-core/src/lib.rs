//! Core types and trait definitions for the orgdir organisation directory.
//!
//! This crate is deliberately free of HTTP and I/O dependencies. It owns the
//! data model, the [`Directory`](directory::Directory) backend contract, and
//! the resolution/search logic built on top of it; concrete transports
//! (`orgdir-client`) and surfaces (`orgdir-api`, `orgdir-cli`) depend on it.

pub mod current_user;
pub mod directory;
pub mod error;
pub mod path;
pub mod person;
pub mod resolve;
pub mod search;
pub mod settings;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
