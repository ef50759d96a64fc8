use crate::error::SourceError;
use crate::http::{create_browser_client, trim_base_url};
use crate::traits::CrossRefResolver;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sickadd_models::{ImdbId, TvdbId};
use tracing::debug;

/// Title known to exist on TheTVDB, used by the availability probe.
const PROBE_IMDB_ID: &str = "tt0257315";

#[derive(Debug, Deserialize)]
struct SeriesByRemoteId {
    #[serde(rename = "Series", default)]
    series: Vec<SeriesEntry>,
}

#[derive(Debug, Deserialize)]
struct SeriesEntry {
    #[serde(default)]
    id: Option<String>,
}

/// First `<Series><id>` of a `GetSeriesByRemoteID` payload.
///
/// An empty body or a document without a series means the title is unknown.
pub fn parse_series_id(xml: &str) -> Result<Option<TvdbId>, SourceError> {
    if xml.trim().is_empty() {
        return Ok(None);
    }
    let data: SeriesByRemoteId =
        quick_xml::de::from_str(xml).map_err(|e| SourceError::decode("TheTVDB", e))?;

    Ok(data
        .series
        .into_iter()
        .filter_map(|entry| entry.id)
        .find_map(|id| id.parse::<TvdbId>().ok()))
}

pub struct TheTvdbClient {
    client: Client,
    base_url: String,
}

impl TheTvdbClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: create_browser_client(),
            base_url: trim_base_url(base_url),
        }
    }

    fn lookup_url(&self) -> String {
        format!("{}/api/GetSeriesByRemoteID.php", self.base_url)
    }

    async fn lookup(&self, imdb_id: &str) -> Result<String, SourceError> {
        let url = self.lookup_url();
        debug!(imdb_id = %imdb_id, url = %url, "Querying TheTVDB");
        let response = self
            .client
            .get(&url)
            .query(&[("imdbid", imdb_id)])
            .send()
            .await?;
        let status = response.status();
        debug!(imdb_id = %imdb_id, status = status.as_u16(), "TheTVDB response");
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                service: "TheTVDB",
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CrossRefResolver for TheTvdbClient {
    async fn check_available(&self) -> Result<(), SourceError> {
        self.lookup(PROBE_IMDB_ID).await.map(|_| ())
    }

    async fn resolve(&self, id: &ImdbId) -> Result<Option<TvdbId>, SourceError> {
        let body = self.lookup(id.as_str()).await?;
        parse_series_id(&body)
    }
}
