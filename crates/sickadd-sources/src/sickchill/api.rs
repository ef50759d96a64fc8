use crate::error::SourceError;
use serde::{Deserialize, Deserializer};
use sickadd_models::TvdbId;
use std::collections::{HashMap, HashSet};

pub const RESULT_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
pub struct CommandResponse<T> {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> CommandResponse<T> {
    pub fn is_success(&self) -> bool {
        self.result.as_deref() == Some(RESULT_SUCCESS)
    }

    pub fn describe(&self) -> String {
        match (&self.result, &self.message) {
            (Some(result), Some(message)) if !message.is_empty() => format!("{}: {}", result, message),
            (Some(result), _) => result.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "no result in response".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShowEntry {
    #[serde(default, deserialize_with = "deserialize_tvdb_id")]
    pub tvdbid: Option<TvdbId>,
}

/// SickChill versions disagree on whether `tvdbid` is a number or a string.
fn deserialize_tvdb_id<'de, D>(deserializer: D) -> Result<Option<TvdbId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().map(TvdbId),
        serde_json::Value::String(s) => s.parse::<TvdbId>().ok(),
        _ => None,
    })
}

/// Cross-reference ids out of a `cmd=shows` payload.
///
/// A response that isn't `success` or lacks `data` means the API key was refused.
pub fn parse_shows(body: &str) -> Result<HashSet<TvdbId>, SourceError> {
    let response: CommandResponse<HashMap<String, ShowEntry>> =
        serde_json::from_str(body).map_err(|e| SourceError::decode("SickChill", e))?;

    if !response.is_success() {
        return Err(SourceError::TrackerRejected(response.describe()));
    }
    let shows = response
        .data
        .ok_or_else(|| SourceError::TrackerRejected("shows response carries no data".to_string()))?;

    Ok(shows.into_values().filter_map(|show| show.tvdbid).collect())
}

/// Outcome of a `cmd=show.addnew` call.
pub fn parse_add_show(body: &str, tvdb_id: TvdbId) -> Result<(), SourceError> {
    let response: CommandResponse<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| SourceError::decode("SickChill", e))?;

    if response.is_success() {
        Ok(())
    } else {
        Err(SourceError::RegistrationFailed {
            tvdb_id,
            message: response.describe(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shows_numeric_and_string_ids() {
        let body = r#"{
            "result": "success",
            "message": "",
            "data": {
                "81189": {"show_name": "Breaking Bad", "tvdbid": 81189},
                "121361": {"show_name": "Game of Thrones", "tvdbid": "121361"},
                "1": {"show_name": "Broken", "tvdbid": null}
            }
        }"#;
        let shows = parse_shows(body).unwrap();
        assert_eq!(shows.len(), 2);
        assert!(shows.contains(&TvdbId(81189)));
        assert!(shows.contains(&TvdbId(121361)));
    }

    #[test]
    fn test_parse_shows_empty_inventory() {
        let shows = parse_shows(r#"{"result": "success", "data": {}}"#).unwrap();
        assert!(shows.is_empty());
    }

    #[test]
    fn test_parse_shows_denied() {
        let body = r#"{"result": "denied", "message": "API key is invalid", "data": {}}"#;
        let err = parse_shows(body).unwrap_err();
        assert!(matches!(err, SourceError::TrackerRejected(_)));
        assert!(err.to_string().contains("API key is invalid"));
    }

    #[test]
    fn test_parse_shows_not_json() {
        let err = parse_shows("<html>login</html>").unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }

    #[test]
    fn test_parse_add_show() {
        assert!(parse_add_show(r#"{"result": "success", "message": "Rick and Morty has been queued"}"#, TvdbId(275274)).is_ok());

        let err = parse_add_show(r#"{"result": "failure", "message": "An existing indexerid already exists"}"#, TvdbId(275274)).unwrap_err();
        match err {
            SourceError::RegistrationFailed { tvdb_id, message } => {
                assert_eq!(tvdb_id, TvdbId(275274));
                assert!(message.contains("already exists"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
