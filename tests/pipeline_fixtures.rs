mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{csv_entry, data_line, entry_name, latin1, offline_service, seed_archive, seed_registry};
use cvmkit::{
    CvmConfig, CvmError, CvmUrls, DocKind, FinancialsService, StatementFilter, StatementType,
};

const ACME_CNPJ: &str = "33.000.167/0001-01";
const BETA_CNPJ: &str = "17.167.396/0001-69";

fn acme(date: &str, account: &str, value: &str) -> String {
    data_line(ACME_CNPJ, date, "ACME ENERGIA S.A.", "9512", "\u{da}LTIMO", account, value)
}

fn beta(date: &str, account: &str, value: &str) -> String {
    data_line(BETA_CNPJ, date, "BANCO BETA S.A.", "14", "\u{da}LTIMO", account, value)
}

/// Quarterly archive: ACME with two reference dates; tracked accounts
/// 3.01/3.03/3.11 populated for the first date, only 3.01 for the second.
fn itr_entries(year: i32) -> Vec<(String, Vec<u8>)> {
    vec![
        (
            entry_name(DocKind::Itr, "DRE", "con", year),
            csv_entry(&[
                acme("2024-03-31", "3.01", "100"),
                acme("2024-03-31", "3.03", "40"),
                acme("2024-03-31", "3.11", "10"),
                acme("2024-06-30", "3.01", "120"),
            ]),
        ),
        (
            entry_name(DocKind::Itr, "BPA", "con", year),
            csv_entry(&[acme("2024-03-31", "1", "1000")]),
        ),
        (
            entry_name(DocKind::Itr, "BPP", "con", year),
            csv_entry(&[acme("2024-03-31", "2", "1000")]),
        ),
        (
            entry_name(DocKind::Itr, "DFC_MI", "con", year),
            csv_entry(&[acme("2024-03-31", "6.01", "50")]),
        ),
    ]
}

/// Registry rows for both fixture companies. The tax IDs carry tickers in
/// the static table (PETR3/PETR4 and RPAD5 respectively), so ticker
/// resolution is exercisable offline.
fn seed_companies(cache: &std::path::Path) {
    seed_registry(
        cache,
        &[
            (ACME_CNPJ, "ACME ENERGIA S.A.", "009512", "Energia El\u{e9}trica"),
            (BETA_CNPJ, "BANCO BETA S.A.", "000014", "Bancos"),
        ],
    );
}

/// Annual archive: a second company, so the quarterly assertions stay
/// unpolluted while the company directory sees both.
fn dfp_entries(year: i32) -> Vec<(String, Vec<u8>)> {
    vec![
        (
            entry_name(DocKind::Dfp, "DRE", "con", year),
            csv_entry(&[beta("2024-12-31", "3.01", "500")]),
        ),
        (
            entry_name(DocKind::Dfp, "BPA", "con", year),
            csv_entry(&[beta("2024-12-31", "1", "9000")]),
        ),
        (
            entry_name(DocKind::Dfp, "BPP", "con", year),
            csv_entry(&[beta("2024-12-31", "2", "9000")]),
        ),
        (
            entry_name(DocKind::Dfp, "DFC_MI", "con", year),
            csv_entry(&[beta("2024-12-31", "6.01", "70")]),
        ),
    ]
}

#[tokio::test]
async fn load_from_cached_archives_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    seed_archive(&cache, DocKind::Itr, 2024, &itr_entries(2024));
    seed_archive(&cache, DocKind::Dfp, 2024, &dfp_entries(2024));
    seed_companies(&cache);

    // The portal is unreachable; cache hits carry the whole load.
    let service = offline_service(&cache, 2024..=2024);
    let status = service.load(false).await.unwrap();

    assert!(status.failures.is_empty(), "failures: {:?}", status.failures);
    assert!(status.last_updated.is_some());
    assert!(!status.reloading);
    assert_eq!(status.counts[&StatementType::Dre], 3);
    assert_eq!(status.counts[&StatementType::Bpa], 2);

    let page = service
        .query_statement(
            StatementType::Dre,
            &StatementFilter::new().with_code("9512"),
            100,
            0,
        )
        .unwrap();

    assert_eq!(page.total, 2);
    let march = page
        .data
        .iter()
        .find(|r| r.ref_date().to_string() == "2024-03-31")
        .unwrap();
    assert_eq!(march.account("3.01"), Some(100.0));
    assert_eq!(march.account("3.03"), Some(40.0));
    assert_eq!(march.account("3.11"), Some(10.0));

    let june = page
        .data
        .iter()
        .find(|r| r.ref_date().to_string() == "2024-06-30")
        .unwrap();
    assert_eq!(june.account("3.01"), Some(120.0));
    assert_eq!(june.account("3.03"), None);
    assert_eq!(june.account("3.11"), None);

    // Directory spans both archives.
    let companies = service.list_companies(None);
    assert_eq!(companies.len(), 2);
    assert!(service.list_companies(Some("beta")).iter().any(|c| c.code == "14"));

    let bundle = service.company_bundle("9512").unwrap();
    assert_eq!(bundle[&StatementType::Dre].len(), 2);
    assert_eq!(bundle[&StatementType::Dfc].len(), 1);

    // Ticker resolution goes through the loaded registry.
    let by_ticker = service
        .query_statement(
            StatementType::Dre,
            &service.filter_for_ticker("PETR4").unwrap(),
            100,
            0,
        )
        .unwrap();
    assert_eq!(by_ticker.total, 2);

    let hits = service.search_tickers("RPAD").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].code.as_deref(), Some("14"));
    assert_eq!(hits[0].name, "BANCO BETA S.A.");

    let bundle = service.company_bundle_by_ticker("PETR3").unwrap();
    assert_eq!(bundle[&StatementType::Dre].len(), 2);
}

#[tokio::test]
async fn malformed_statement_entry_spares_the_other_tables() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");

    let mut entries = itr_entries(2024);
    entries[0] = (
        entry_name(DocKind::Itr, "DRE", "con", 2024),
        latin1("GARBAGE WITHOUT ANY DELIMITER\nMORE GARBAGE\n"),
    );
    seed_archive(&cache, DocKind::Itr, 2024, &entries);
    seed_archive(&cache, DocKind::Dfp, 2024, &dfp_entries(2024));
    seed_companies(&cache);

    let service = offline_service(&cache, 2024..=2024);
    let status = service.load(false).await.unwrap();

    // The income statement keeps its (never loaded, empty) table; the
    // other three update from both archives.
    assert_eq!(status.counts[&StatementType::Dre], 0);
    assert_eq!(status.counts[&StatementType::Bpa], 2);
    assert_eq!(status.counts[&StatementType::Bpp], 2);
    assert_eq!(status.counts[&StatementType::Dfc], 2);
    assert!(status.failures.iter().any(|f| f.starts_with("DRE")));

    let page = service
        .query_statement(StatementType::Dre, &StatementFilter::new(), 100, 0)
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn missing_archive_is_reported_but_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    // Only the quarterly archive is cached; the annual fetch fails offline.
    seed_archive(&cache, DocKind::Itr, 2024, &itr_entries(2024));

    let service = offline_service(&cache, 2024..=2024);
    let status = service.load(false).await.unwrap();

    assert!(status.failures.iter().any(|f| f.starts_with("dfp 2024")));
    assert_eq!(status.counts[&StatementType::Dre], 3);
    assert!(service.company_bundle("14").is_err());

    // The registry was not cached either; its failure is recorded the same
    // way and ticker lookups fall back to the static table.
    assert!(status.failures.iter().any(|f| f.starts_with("registry")));
    assert!(matches!(
        service.company_bundle_by_ticker("PETR4"),
        Err(CvmError::NotFound)
    ));
}

#[tokio::test]
async fn concurrent_reload_is_rejected() {
    // A listener that accepts and then ignores connections keeps the first
    // load pass in flight for its full timeout.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        let mut held = Vec::new();
        for _ in 0..3 {
            if let Ok((socket, _)) = listener.accept() {
                held.push(socket);
            }
        }
        std::thread::sleep(Duration::from_secs(3));
    });

    let dir = tempfile::tempdir().unwrap();
    let config = CvmConfig {
        user_agent: "test_agent example@example.com".to_string(),
        timeout: Duration::from_secs(1),
        max_retries: 0,
        base_urls: CvmUrls {
            itr: format!("http://127.0.0.1:{port}/itr"),
            dfp: format!("http://127.0.0.1:{port}/dfp"),
            registry: format!("http://127.0.0.1:{port}/cad"),
        },
        cache_dir: dir.path().join("cache"),
        years: 2024..=2024,
        ..CvmConfig::default()
    };
    let service = Arc::new(FinancialsService::new(config).unwrap());

    let first = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.load(false).await }
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(service.status().reloading);
    assert!(matches!(
        service.load(false).await,
        Err(CvmError::ReloadInProgress)
    ));

    // The first pass still completes, downgrading the dead transfers to
    // recorded failures.
    let status = first.await.unwrap().unwrap();
    assert!(!status.failures.is_empty());
    assert!(!service.status().reloading);
    drop(server);
}

#[tokio::test]
async fn returned_status_describes_a_finished_pass() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    seed_archive(&cache, DocKind::Itr, 2024, &itr_entries(2024));
    seed_archive(&cache, DocKind::Dfp, 2024, &dfp_entries(2024));
    seed_companies(&cache);

    let service = offline_service(&cache, 2024..=2024);

    // The status a load hands back is about a pass that has already ended,
    // and the next load must be able to start right away.
    let status = service.load(false).await.unwrap();
    assert!(!status.reloading);
    assert!(service.load(false).await.is_ok());
}

#[tokio::test]
async fn snapshot_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    let snapshot = dir.path().join("tables.json");
    seed_archive(&cache, DocKind::Itr, 2024, &itr_entries(2024));
    seed_archive(&cache, DocKind::Dfp, 2024, &dfp_entries(2024));
    seed_companies(&cache);

    let config = CvmConfig {
        user_agent: "test_agent example@example.com".to_string(),
        timeout: Duration::from_millis(200),
        max_retries: 0,
        base_urls: CvmUrls {
            itr: "http://127.0.0.1:1/itr".to_string(),
            dfp: "http://127.0.0.1:1/dfp".to_string(),
            registry: "http://127.0.0.1:1/cad".to_string(),
        },
        cache_dir: cache.clone(),
        years: 2024..=2024,
        snapshot_path: Some(snapshot.clone()),
        ..CvmConfig::default()
    };

    let first = FinancialsService::new(config.clone()).unwrap();
    let loaded = first.load(false).await.unwrap();
    assert!(snapshot.exists());

    // A fresh process restores the tables without touching archives.
    let second = FinancialsService::new(config).unwrap();
    let restored = second.restore_from_snapshot().unwrap();
    assert_eq!(restored.counts, loaded.counts);

    let page = second
        .query_statement_raw(
            StatementType::Dre,
            &StatementFilter::new().with_cnpj("33000167000101"),
            100,
            0,
        )
        .unwrap();
    assert_eq!(page.total, 4);
}
