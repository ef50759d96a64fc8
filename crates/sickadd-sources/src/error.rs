use sickadd_models::TvdbId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("watchlist {url} is unreachable: {reason}")]
    ListUnreachable { url: String, reason: String },

    #[error("detail page for {id} could not be fetched: {reason}")]
    DetailFetchFailed { id: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    #[error("failed to decode {service} response: {reason}")]
    Decode { service: &'static str, reason: String },

    #[error("SickChill rejected the request: {0}")]
    TrackerRejected(String),

    #[error("SickChill did not add show {tvdb_id}: {message}")]
    RegistrationFailed { tvdb_id: TvdbId, message: String },
}

impl SourceError {
    pub fn decode(service: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            service,
            reason: reason.to_string(),
        }
    }
}
