use crate::error::SourceError;
use crate::http::{create_browser_client, trim_base_url};
use crate::imdb::extractor::{MarkupExtractor, PageExtractor};
use crate::traits::WatchlistProvider;
use async_trait::async_trait;
use reqwest::Client;
use sickadd_models::ImdbId;
use std::collections::BTreeSet;
use tracing::debug;

pub struct ImdbClient {
    client: Client,
    base_url: String,
    extractor: Box<dyn PageExtractor>,
}

impl ImdbClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_extractor(base_url, Box::new(MarkupExtractor::new()))
    }

    pub fn with_extractor(base_url: &str, extractor: Box<dyn PageExtractor>) -> Self {
        Self {
            client: create_browser_client(),
            base_url: trim_base_url(base_url),
            extractor,
        }
    }

    pub fn title_url(&self, id: &ImdbId) -> String {
        format!("{}/title/{}/", self.base_url, id)
    }

    async fn get_page(&self, url: &str) -> Result<String, SourceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                service: "IMDb",
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl WatchlistProvider for ImdbClient {
    fn provider_name(&self) -> &str {
        "imdb"
    }

    async fn fetch_list(&self, url: &str) -> Result<BTreeSet<ImdbId>, SourceError> {
        debug!(url = %url, "Fetching watchlist content");
        let body = self
            .get_page(url)
            .await
            .map_err(|e| SourceError::ListUnreachable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let ids = self.extractor.identifiers(&body);
        debug!(url = %url, total = ids.len(), "Extracted IMDb ids from watchlist");
        Ok(ids)
    }

    async fn fetch_title(&self, id: &ImdbId) -> Result<Option<String>, SourceError> {
        let url = self.title_url(id);
        debug!(imdb_id = %id, url = %url, "Fetching title page");
        let body = self
            .get_page(&url)
            .await
            .map_err(|e| SourceError::DetailFetchFailed {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        Ok(self.extractor.title(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_url() {
        let client = ImdbClient::new("https://www.imdb.com/");
        let id = ImdbId::parse("tt0903747").unwrap();
        assert_eq!(client.title_url(&id), "https://www.imdb.com/title/tt0903747/");
    }
}
