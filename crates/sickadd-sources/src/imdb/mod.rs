pub mod client;
pub mod extractor;

pub use client::ImdbClient;
pub use extractor::{MarkupExtractor, PageExtractor};
