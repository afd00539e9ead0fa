//! Tailor directory ranking and review intake for the tailoring marketplace.
//!
//! The [`marketplace::tailors`] module holds the pure rating pipeline (accumulation, filtering,
//! ranking) together with the review workflow and HTTP router that feed it.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
