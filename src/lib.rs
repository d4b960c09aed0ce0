//! Offline analytics engine for exported League match histories: normalized
//! performance metrics, an estimated rating trajectory, detected play
//! patterns, and ranked recommendations. Everything downstream of the export
//! file is deterministic; the same history always yields the same report.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod reference;
pub mod source;

pub use analysis::{AnalysisEngine, FullReport};
pub use config::EngineConfig;
pub use error::{AppError, Result};
pub use model::NormalizedMatch;
pub use source::{normalize_history, MatchExport, NormalizedHistory};
