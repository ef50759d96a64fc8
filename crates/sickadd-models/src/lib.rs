pub mod ids;
pub mod record;

pub use ids::{ImdbId, TvdbId};
pub use record::{CatalogRecord, KindPartition, ShowKind, UNKNOWN_TITLE};
