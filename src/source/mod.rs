pub mod export;
pub mod models;
pub mod normalize;

pub use export::MatchExport;
pub use normalize::{normalize_history, normalize_match, NormalizedHistory};
