pub mod client;

pub use client::{parse_series_id, TheTvdbClient};
