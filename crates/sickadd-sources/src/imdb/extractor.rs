use regex::Regex;
use scraper::{Html, Selector};
use sickadd_models::ImdbId;
use std::collections::BTreeSet;

/// Pulls identifiers and titles out of fetched pages.
pub trait PageExtractor: Send + Sync {
    /// Every identifier referenced anywhere in `body`, de-duplicated.
    fn identifiers(&self, body: &str) -> BTreeSet<ImdbId>;

    /// Entity-decoded, trimmed text of the page title, if any.
    fn title(&self, body: &str) -> Option<String>;
}

/// Regex scan for identifiers, HTML parse for the `<title>` element.
pub struct MarkupExtractor {
    id_pattern: Regex,
    title_selector: Selector,
}

impl MarkupExtractor {
    pub fn new() -> Self {
        Self {
            id_pattern: Regex::new(r"tt\d{5,8}").expect("valid regex"),
            title_selector: Selector::parse("title").expect("valid <title> selector"),
        }
    }
}

impl Default for MarkupExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExtractor for MarkupExtractor {
    fn identifiers(&self, body: &str) -> BTreeSet<ImdbId> {
        self.id_pattern
            .find_iter(body)
            .filter_map(|m| ImdbId::parse(m.as_str()))
            .collect()
    }

    fn title(&self, body: &str) -> Option<String> {
        let document = Html::parse_document(body);
        let title = document
            .select(&self.title_selector)
            .next()?
            .text()
            .collect::<String>();
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }
}
