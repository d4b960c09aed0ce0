pub mod champions;
pub mod meta;
pub mod ranks;

pub use champions::ChampionCatalog;
pub use meta::MetaIndex;
pub use ranks::{Division, Rank, RankTable, Tier};
