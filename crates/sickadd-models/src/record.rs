use crate::ids::{ImdbId, TvdbId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Title stored when a detail page was fetched but carried no usable title.
pub const UNKNOWN_TITLE: &str = "Unknown IMDB Title";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShowKind {
    /// Classification never completed; only legacy or damaged rows carry it.
    Unclassified,
    NotSeries,
    Series,
}

impl ShowKind {
    /// Integer stored in the `show_type` column.
    pub fn to_db(self) -> Option<i64> {
        match self {
            ShowKind::Unclassified => None,
            ShowKind::NotSeries => Some(0),
            ShowKind::Series => Some(1),
        }
    }

    pub fn from_db(value: Option<i64>) -> Self {
        match value {
            Some(0) => ShowKind::NotSeries,
            Some(1) => ShowKind::Series,
            _ => ShowKind::Unclassified,
        }
    }

    pub fn is_classified(self) -> bool {
        !matches!(self, ShowKind::Unclassified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: ImdbId,
    pub title: String,
    /// Watchlist URL that first produced this identifier.
    pub source_list: String,
    pub discovered_at: NaiveDate,
    pub kind: ShowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<TvdbId>,
    pub registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<NaiveDate>,
}

impl CatalogRecord {
    /// A freshly classified record, not yet resolved nor registered.
    pub fn discovered(
        id: ImdbId,
        title: impl Into<String>,
        source_list: impl Into<String>,
        discovered_at: NaiveDate,
        kind: ShowKind,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNKNOWN_TITLE.to_string()
        } else {
            title
        };
        Self {
            id,
            title,
            source_list: source_list.into(),
            discovered_at,
            kind,
            tvdb_id: None,
            registered: false,
            registered_at: None,
        }
    }

    /// `registered` may only hold for a resolved series.
    pub fn registration_is_consistent(&self) -> bool {
        !self.registered || (self.kind == ShowKind::Series && self.tvdb_id.is_some())
    }
}

/// Records split by kind, the way `--showdb` lists them.
#[derive(Debug, Default, Serialize)]
pub struct KindPartition {
    pub not_series: Vec<CatalogRecord>,
    pub series: Vec<CatalogRecord>,
    pub incomplete: Vec<CatalogRecord>,
}

impl KindPartition {
    pub fn from_records(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        let mut partition = Self::default();
        for record in records {
            match record.kind {
                ShowKind::NotSeries => partition.not_series.push(record),
                ShowKind::Series => partition.series.push(record),
                ShowKind::Unclassified => partition.incomplete.push(record),
            }
        }
        partition
    }

    pub fn len(&self) -> usize {
        self.not_series.len() + self.series.len() + self.incomplete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn record(id: &str, kind: ShowKind) -> CatalogRecord {
        CatalogRecord::discovered(ImdbId::parse(id).unwrap(), "Title", "https://www.imdb.com/list/ls1", date(), kind)
    }

    #[test]
    fn test_show_kind_db_mapping() {
        assert_eq!(ShowKind::from_db(Some(0)), ShowKind::NotSeries);
        assert_eq!(ShowKind::from_db(Some(1)), ShowKind::Series);
        assert_eq!(ShowKind::from_db(None), ShowKind::Unclassified);
        assert_eq!(ShowKind::from_db(Some(7)), ShowKind::Unclassified);
        assert_eq!(ShowKind::Series.to_db(), Some(1));
        assert_eq!(ShowKind::Unclassified.to_db(), None);
    }

    #[test]
    fn test_discovered_uses_placeholder_for_blank_title() {
        let rec = CatalogRecord::discovered(ImdbId::parse("tt0111161").unwrap(), "  ", "list", date(), ShowKind::NotSeries);
        assert_eq!(rec.title, UNKNOWN_TITLE);
        assert!(!rec.registered);
        assert!(rec.tvdb_id.is_none());
    }

    #[test]
    fn test_registration_consistency() {
        let mut rec = record("tt0903747", ShowKind::Series);
        assert!(rec.registration_is_consistent());
        rec.registered = true;
        assert!(!rec.registration_is_consistent());
        rec.tvdb_id = Some(TvdbId(81189));
        assert!(rec.registration_is_consistent());
        rec.kind = ShowKind::NotSeries;
        assert!(!rec.registration_is_consistent());
    }

    #[test]
    fn test_partition_by_kind() {
        let partition = KindPartition::from_records(vec![
            record("tt0000001", ShowKind::Series),
            record("tt0000002", ShowKind::NotSeries),
            record("tt0000003", ShowKind::Unclassified),
            record("tt0000004", ShowKind::Series),
        ]);
        assert_eq!(partition.series.len(), 2);
        assert_eq!(partition.not_series.len(), 1);
        assert_eq!(partition.incomplete.len(), 1);
        assert_eq!(partition.len(), 4);
    }
}
