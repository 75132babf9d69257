//! Eligibility matching for International Baccalaureate candidates.
//!
//! The [`matching`] module owns the engine: course catalog, profile builder,
//! requirement ingestion, evaluator, scorer and catalog search. The remaining
//! modules carry the configuration, error and telemetry plumbing shared with the
//! API service.

pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
