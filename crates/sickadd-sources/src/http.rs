use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;

/// Some providers answer default clients with an error page.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client with browser-like headers for scraped pages and public metadata APIs.
pub fn create_browser_client() -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://sickchill:8081/"), "http://sickchill:8081");
        assert_eq!(trim_base_url("https://www.imdb.com"), "https://www.imdb.com");
    }
}
