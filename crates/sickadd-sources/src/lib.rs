pub mod error;
pub mod http;
pub mod imdb;
pub mod sickchill;
pub mod thetvdb;
pub mod traits;

pub use error::SourceError;
pub use imdb::{ImdbClient, MarkupExtractor, PageExtractor};
pub use sickchill::SickChillClient;
pub use thetvdb::TheTvdbClient;
pub use traits::{CrossRefResolver, TrackingServer, WatchlistProvider};
