use super::*;
use rusqlite::Connection;
use tempfile::TempDir;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn id(s: &str) -> ImdbId {
    ImdbId::parse(s).unwrap()
}

fn record(imdb: &str, title: &str, kind: ShowKind) -> CatalogRecord {
    CatalogRecord::discovered(id(imdb), title, "https://www.imdb.com/list/ls1", date(1), kind)
}

#[test]
fn test_fresh_catalog_is_at_current_version() {
    let catalog = Catalog::open_in_memory().unwrap();
    assert_eq!(catalog.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
    assert!(catalog.all_records().unwrap().is_empty());
}

#[test]
fn test_insert_and_duplicate() {
    let catalog = Catalog::open_in_memory().unwrap();
    catalog.insert(&record("tt0903747", "Breaking Bad", ShowKind::Series)).unwrap();

    let err = catalog
        .insert(&record("tt0903747", "Breaking Bad again", ShowKind::NotSeries))
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateId(ref dup) if dup == "tt0903747"));

    let stored = catalog.get("tt0903747").unwrap().unwrap();
    assert_eq!(stored.title, "Breaking Bad");
    assert_eq!(stored.kind, ShowKind::Series);
    assert_eq!(stored.discovered_at, date(1));
    assert!(stored.tvdb_id.is_none());
    assert!(!stored.registered);
}

#[test]
fn test_known_titles_skip_unclassified() {
    let catalog = Catalog::open_in_memory().unwrap();
    catalog.insert(&record("tt0903747", "Breaking Bad", ShowKind::Series)).unwrap();
    catalog.insert(&record("tt0075314", "Taxi Driver", ShowKind::NotSeries)).unwrap();
    catalog.insert(&record("tt0000001", "Broken", ShowKind::Unclassified)).unwrap();

    let known = catalog.lookup_known_titles().unwrap();
    assert_eq!(known.len(), 2);
    assert_eq!(known.get(&id("tt0075314")).map(String::as_str), Some("Taxi Driver"));
    assert!(!known.contains_key(&id("tt0000001")));
}

#[test]
fn test_cross_ref_is_set_once() {
    let catalog = Catalog::open_in_memory().unwrap();
    catalog.insert(&record("tt0903747", "Breaking Bad", ShowKind::Series)).unwrap();
    catalog.insert(&record("tt0075314", "Taxi Driver", ShowKind::NotSeries)).unwrap();

    let missing = catalog.find_series_missing_cross_ref().unwrap();
    assert_eq!(missing, vec![(id("tt0903747"), "Breaking Bad".to_string())]);

    assert!(catalog.set_cross_ref(&id("tt0903747"), TvdbId(81189)).unwrap());
    assert!(!catalog.set_cross_ref(&id("tt0903747"), TvdbId(99999)).unwrap());
    assert!(!catalog.set_cross_ref(&id("tt0075314"), TvdbId(12345)).unwrap());

    let stored = catalog.get("tt0903747").unwrap().unwrap();
    assert_eq!(stored.tvdb_id, Some(TvdbId(81189)));
    assert!(catalog.get("tt0075314").unwrap().unwrap().tvdb_id.is_none());
    assert!(catalog.find_series_missing_cross_ref().unwrap().is_empty());
}

#[test]
fn test_mark_registered_is_monotonic() {
    let catalog = Catalog::open_in_memory().unwrap();
    catalog.insert(&record("tt0903747", "Breaking Bad", ShowKind::Series)).unwrap();
    catalog.set_cross_ref(&id("tt0903747"), TvdbId(81189)).unwrap();

    assert_eq!(
        catalog.find_unregistered_resolved_series().unwrap(),
        vec![(TvdbId(81189), "Breaking Bad".to_string())]
    );

    assert_eq!(catalog.mark_registered(TvdbId(81189), date(2)).unwrap(), 1);
    assert_eq!(catalog.mark_registered(TvdbId(81189), date(9)).unwrap(), 0);

    let stored = catalog.get("tt0903747").unwrap().unwrap();
    assert!(stored.registered);
    assert_eq!(stored.registered_at, Some(date(2)));
    assert!(stored.registration_is_consistent());
    assert!(catalog.find_unregistered_resolved_series().unwrap().is_empty());
}

#[test]
fn test_mark_registered_ignores_unresolved_and_unknown_ids() {
    let catalog = Catalog::open_in_memory().unwrap();
    catalog.insert(&record("tt0903747", "Breaking Bad", ShowKind::Series)).unwrap();

    assert_eq!(catalog.mark_registered(TvdbId(81189), date(2)).unwrap(), 0);
    assert!(!catalog.get("tt0903747").unwrap().unwrap().registered);
}

#[test]
fn test_delete_by_id() {
    let catalog = Catalog::open_in_memory().unwrap();
    catalog.insert(&record("tt0903747", "Breaking Bad", ShowKind::Series)).unwrap();

    assert!(!catalog.delete_by_id("tt9999999").unwrap());
    assert_eq!(catalog.all_records().unwrap().len(), 1);

    assert!(catalog.delete_by_id("tt0903747").unwrap());
    assert!(catalog.all_records().unwrap().is_empty());
    assert!(catalog.get("tt0903747").unwrap().is_none());
}

#[test]
fn test_legacy_table_is_migrated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE shows (
                imdb_id TEXT PRIMARY KEY,
                title TEXT,
                watchlist_url TEXT,
                imdb_import_date TEXT,
                added_to_sickchill INTEGER,
                thetvdb_id INTEGER,
                sc_added_date TEXT
            );
            INSERT INTO shows VALUES ('tt0903747', 'Breaking Bad', 'https://www.imdb.com/list/ls1', '2021-01-04', 1, 81189, '2021-01-04');
            INSERT INTO shows VALUES ('tt0108778', 'Friends', 'https://www.imdb.com/list/ls1', '2021-01-04', 0, '', NULL);
            INSERT INTO shows VALUES ('tt0386676', 'The Office', 'https://www.imdb.com/list/ls1', '2021-01-04', NULL, NULL, NULL);
            "#,
        )
        .unwrap();
    }

    let catalog = Catalog::open(&path).unwrap();
    assert_eq!(catalog.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);

    let records = catalog.all_records().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.kind == ShowKind::Series));

    let registered = catalog.get("tt0903747").unwrap().unwrap();
    assert!(registered.registered);
    assert_eq!(registered.tvdb_id, Some(TvdbId(81189)));
    assert_eq!(registered.registered_at, NaiveDate::from_ymd_opt(2021, 1, 4));

    let missing: Vec<String> = catalog
        .find_series_missing_cross_ref()
        .unwrap()
        .into_iter()
        .map(|(id, _)| id.to_string())
        .collect();
    assert_eq!(missing, vec!["tt0108778", "tt0386676"]);
    assert!(!catalog.get("tt0386676").unwrap().unwrap().registered);

    assert!(catalog.set_cross_ref(&id("tt0108778"), TvdbId(79168)).unwrap());
}

#[test]
fn test_legacy_table_with_show_type_keeps_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typed.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE shows (
                imdb_id TEXT PRIMARY KEY,
                title TEXT,
                watchlist_url TEXT,
                imdb_import_date TEXT,
                added_to_sickchill INTEGER,
                thetvdb_id INTEGER,
                sc_added_date TEXT,
                show_type INTEGER
            );
            INSERT INTO shows VALUES ('tt0075314', 'Taxi Driver', 'https://www.imdb.com/list/ls1', '2023-02-01', 0, NULL, NULL, 0);
            INSERT INTO shows VALUES ('tt0000001', 'Unknown IMDB Title', 'https://www.imdb.com/list/ls1', '2023-02-01', 0, NULL, NULL, NULL);
            "#,
        )
        .unwrap();
    }

    let catalog = Catalog::open(&path).unwrap();
    assert_eq!(catalog.get("tt0075314").unwrap().unwrap().kind, ShowKind::NotSeries);
    assert_eq!(catalog.get("tt0000001").unwrap().unwrap().kind, ShowKind::Unclassified);
    assert_eq!(catalog.lookup_known_titles().unwrap().len(), 1);
}

#[test]
fn test_reopen_on_disk_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("sickadd.db");
    {
        let catalog = Catalog::open(&path).unwrap();
        catalog.insert(&record("tt0903747", "Breaking Bad", ShowKind::Series)).unwrap();
        assert_eq!(catalog.location(), path.as_path());
    }

    let catalog = Catalog::open(&path).unwrap();
    assert_eq!(catalog.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
    assert_eq!(catalog.all_records().unwrap().len(), 1);
}

#[test]
fn test_unwritable_location_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let err = Catalog::open(&blocker.join("sickadd.db")).err().unwrap();
    assert!(matches!(err, CatalogError::StorageUnavailable { .. }));
}
