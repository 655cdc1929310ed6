//! coattain-core: Mark extraction, aggregation, and CO attainment scoring.
//!
//! This crate defines the data model, the text-source trait, and the
//! attainment computation that the rest of coattain builds on.

pub mod aggregate;
pub mod attainment;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod report;
pub mod traits;

pub use error::RunError;
