//! Foundational data structures, error types, and file format definitions.

pub mod error;
pub mod filetypes;
pub mod models;
