use crate::error::SourceError;
use crate::http::trim_base_url;
use crate::sickchill::api;
use crate::traits::TrackingServer;
use async_trait::async_trait;
use reqwest::Client;
use sickadd_models::TvdbId;
use std::collections::HashSet;
use tracing::debug;

pub struct SickChillClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SickChillClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/api/{}/", self.base_url, self.api_key)
    }

    async fn command(&self, params: &[(&str, String)]) -> Result<String, SourceError> {
        // The API key is part of the path, keep it out of the logs
        debug!(base_url = %self.base_url, params = ?params, "Calling SickChill API");
        let response = self.client.get(self.api_url()).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                service: "SickChill",
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl TrackingServer for SickChillClient {
    async fn shows(&self) -> Result<HashSet<TvdbId>, SourceError> {
        let body = self.command(&[("cmd", "shows".to_string())]).await?;
        api::parse_shows(&body)
    }

    async fn add_show(&self, tvdb_id: TvdbId) -> Result<(), SourceError> {
        let body = self
            .command(&[
                ("cmd", "show.addnew".to_string()),
                ("indexerid", tvdb_id.to_string()),
            ])
            .await?;
        api::parse_add_show(&body, tvdb_id)
    }
}
