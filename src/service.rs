//! Orchestrates fetch, parse, pivot and store into one load pipeline, and
//! serves the query boundary.
//!
//! Query methods never touch the network; they read the store's current
//! snapshot and return immediately. The load pipeline runs at most once at
//! a time process-wide, and per-table failures downgrade to logged partial
//! failures that keep the previous good table.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::CvmConfig;
use crate::core::Cvm;
use crate::error::{CvmError, Result};
use crate::fetch::ArchiveFetcher;
use crate::options::StatementFilter;
use crate::parsing::{ParserConfig, StatementParser};
use crate::pivot;
use crate::registry::{self, CompanyMatch, RegistryParser, TickerDirectory};
use crate::statements::{CompanyEntry, DocKind, FinancialRecord, RawRow, StatementType};
use crate::store::{DatasetStore, Page};

/// Hard cap on the page size any query may request.
pub const MAX_PAGE_SIZE: usize = 1000;
/// Page size serving layers should default to when the caller gives none.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Process-wide load state, read by the status query.
#[derive(Debug, Clone, Serialize)]
pub struct LoadStatus {
    /// Completion time of the last load that replaced at least one table
    pub last_updated: Option<DateTime<Utc>>,
    /// Record count per statement table; zero until first loaded
    pub counts: BTreeMap<StatementType, usize>,
    /// Whether a load pass is currently running
    pub reloading: bool,
    /// Per-archive and per-table failure messages from the last pass
    pub failures: Vec<String>,
}

#[derive(Debug, Default)]
struct StatusInner {
    last_updated: Option<DateTime<Utc>>,
    counts: BTreeMap<StatementType, usize>,
    failures: Vec<String>,
}

/// The main entry point: owns the pipeline and the dataset store handle.
///
/// # Examples
///
/// ```no_run
/// use cvmkit::{CvmConfig, FinancialsService, StatementFilter, StatementType};
///
/// # #[tokio::main]
/// # async fn main() -> cvmkit::Result<()> {
/// let service = FinancialsService::new(CvmConfig {
///     years: 2023..=2024,
///     ..CvmConfig::default()
/// })?;
///
/// let status = service.load(false).await?;
/// println!("loaded {:?} records", status.counts);
///
/// let page = service.query_statement(
///     StatementType::Dre,
///     &StatementFilter::new().with_code("9512"),
///     100,
///     0,
/// )?;
/// println!("{} of {} records", page.data.len(), page.total);
/// # Ok(())
/// # }
/// ```
pub struct FinancialsService {
    fetcher: ArchiveFetcher,
    parser: StatementParser,
    store: Arc<DatasetStore>,
    config: CvmConfig,
    status: RwLock<StatusInner>,
    directory: RwLock<Arc<TickerDirectory>>,
    reloading: AtomicBool,
}

/// Clears the reload flag when a pass ends, even on early return.
struct ReloadGuard<'a>(&'a AtomicBool);

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FinancialsService {
    /// Creates a service with its own empty store.
    pub fn new(config: CvmConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(DatasetStore::new()))
    }

    /// Creates a service around an existing store handle, so tests and
    /// embedders can pre-seed or share tables.
    pub fn with_store(config: CvmConfig, store: Arc<DatasetStore>) -> Result<Self> {
        let client = Cvm::with_config(&config)?;
        let fetcher = ArchiveFetcher::new(client, config.cache_dir.clone())?;
        Ok(Self {
            fetcher,
            parser: StatementParser::new(ParserConfig::default()),
            store,
            config,
            status: RwLock::new(StatusInner::default()),
            directory: RwLock::new(Arc::new(TickerDirectory::default())),
            reloading: AtomicBool::new(false),
        })
    }

    /// Handle to the underlying store.
    pub fn store(&self) -> Arc<DatasetStore> {
        Arc::clone(&self.store)
    }

    /// Fetches, parses, pivots and swaps in all four statement tables.
    ///
    /// At most one load runs at a time; a second concurrent call fails fast
    /// with [`CvmError::ReloadInProgress`] instead of starting a duplicate
    /// pass. With `force = true` cached archives are re-downloaded.
    ///
    /// Per-archive fetch failures and per-table parse failures are
    /// downgraded to entries in [`LoadStatus::failures`]; the affected
    /// table keeps its previous snapshot and the pass continues. The call
    /// itself fails only when another reload is running or the pipeline
    /// could not start.
    pub async fn load(&self, force: bool) -> Result<LoadStatus> {
        if self
            .reloading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CvmError::ReloadInProgress);
        }
        let guard = ReloadGuard(&self.reloading);
        info!(force, years = ?self.config.years, "load started");

        let mut failures = Vec::new();
        let archives = self.fetch_archives(force, &mut failures).await;

        let mut counts = BTreeMap::new();
        if archives.is_empty() {
            warn!("no archives available; all tables keep their previous snapshot");
        } else {
            for statement in StatementType::ALL {
                match self.gather_rows(&archives, statement) {
                    Ok(rows) => {
                        let records = pivot::normalize(&rows, statement, self.config.policy);
                        let count = self.store.replace_table(statement, records, rows);
                        info!(%statement, count, "table loaded");
                        counts.insert(statement, count);
                    }
                    Err(err) => {
                        if err.is_fetch_error() {
                            warn!(%statement, %err, "archive unreadable; table keeps previous snapshot");
                        } else {
                            warn!(%statement, %err, "parse failed; table keeps previous snapshot");
                        }
                        failures.push(format!("{}: {}", statement, err));
                    }
                }
            }
        }

        match self.load_directory(force).await {
            Ok(companies) => info!(companies, "ticker directory loaded"),
            Err(err) => {
                warn!(%err, "registry load failed; ticker directory keeps previous entries");
                failures.push(format!("registry: {}", err));
            }
        }

        self.finish_load(counts, failures);

        if let Some(path) = &self.config.snapshot_path {
            if let Err(err) = self.store.save_snapshot(path) {
                warn!(path = %path.display(), %err, "snapshot write failed");
            }
        }

        // The returned status must describe the finished pass, so the
        // reload flag has to clear before it is read.
        drop(guard);
        Ok(self.status())
    }

    /// Replaces all tables from the configured snapshot file, so a restart
    /// can serve without re-parsing archives.
    ///
    /// # Errors
    ///
    /// `CvmError::ConfigError` when no snapshot path is configured, plus
    /// any I/O or decode error from the snapshot itself.
    pub fn restore_from_snapshot(&self) -> Result<LoadStatus> {
        let path = self.config.snapshot_path.as_ref().ok_or_else(|| {
            CvmError::ConfigError("no snapshot path configured".to_string())
        })?;
        let counts = self.store.restore_snapshot(path)?;
        self.finish_load(counts, Vec::new());
        Ok(self.status())
    }

    /// Current load status. Never blocks on a reload in progress.
    pub fn status(&self) -> LoadStatus {
        let inner = self.status.read().unwrap_or_else(PoisonError::into_inner);
        let counts: BTreeMap<StatementType, usize> = StatementType::ALL
            .iter()
            .map(|s| (*s, inner.counts.get(s).copied().unwrap_or(0)))
            .collect();
        LoadStatus {
            last_updated: inner.last_updated,
            counts,
            reloading: self.reloading.load(Ordering::Acquire),
            failures: inner.failures.clone(),
        }
    }

    /// Company directory, optionally narrowed by a case-insensitive name
    /// substring.
    pub fn list_companies(&self, search: Option<&str>) -> Vec<CompanyEntry> {
        self.store.search_companies(search)
    }

    /// Searches companies by B3 ticker or name against the loaded registry.
    ///
    /// An exact ticker match wins, then ticker prefixes (`PETR` finds the
    /// company behind `PETR3`/`PETR4` once), then a case-insensitive name
    /// substring over the registry. Empty until the first load fetches the
    /// registry.
    ///
    /// # Errors
    ///
    /// `CvmError::InvalidFilter` when the query is shorter than two
    /// characters.
    pub fn search_tickers(&self, query: &str) -> Result<Vec<CompanyMatch>> {
        if query.trim().chars().count() < 2 {
            return Err(CvmError::InvalidFilter {
                param: "q",
                reason: "must be at least 2 characters".to_string(),
            });
        }
        Ok(self.directory().search(query))
    }

    /// Resolves a B3 ticker into a company filter for the query methods.
    ///
    /// Resolution goes through the loaded registry, so the filter carries
    /// the company's CVM code; when the registry has no entry for the
    /// ticker's company the filter falls back to its tax ID.
    ///
    /// # Errors
    ///
    /// `CvmError::NotFound` when the ticker is unknown.
    pub fn filter_for_ticker(&self, ticker: &str) -> Result<StatementFilter> {
        if let Some(entry) = self.directory().resolve(ticker) {
            return Ok(StatementFilter::new().with_code(&entry.code));
        }
        match registry::cnpj_for_ticker(ticker) {
            Some(cnpj) => Ok(StatementFilter::new().with_cnpj(cnpj)),
            None => Err(CvmError::NotFound),
        }
    }

    /// Every known record for one company across all four tables, looked
    /// up by B3 ticker.
    ///
    /// # Errors
    ///
    /// `CvmError::NotFound` when the ticker is unknown or its company
    /// appears in no table.
    pub fn company_bundle_by_ticker(
        &self,
        ticker: &str,
    ) -> Result<BTreeMap<StatementType, Vec<FinancialRecord>>> {
        let directory = self.directory();
        let entry = directory.resolve(ticker).ok_or(CvmError::NotFound)?;
        self.company_bundle(&entry.code)
    }

    /// The tracked (account code, label) pairs one statement table carries.
    pub fn tracked_accounts(
        &self,
        statement: StatementType,
    ) -> &'static [(&'static str, &'static str)] {
        statement.tracked_accounts()
    }

    /// Every known record for one company across all four tables.
    ///
    /// # Errors
    ///
    /// `CvmError::NotFound` when the company appears in no table. Inside
    /// the store absence is an empty result; the boundary turns a fully
    /// empty bundle into not-found.
    pub fn company_bundle(
        &self,
        code: &str,
    ) -> Result<BTreeMap<StatementType, Vec<FinancialRecord>>> {
        let bundle = self.store.company_bundle(code);
        if bundle.values().all(Vec::is_empty) {
            return Err(CvmError::NotFound);
        }
        Ok(bundle)
    }

    /// Filtered, paginated page of pivoted records for one statement table.
    ///
    /// # Errors
    ///
    /// `CvmError::InvalidFilter` when `limit` is zero or above
    /// [`MAX_PAGE_SIZE`].
    pub fn query_statement(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<FinancialRecord>> {
        validate_limit(limit)?;
        Ok(self.store.query(statement, filter, limit, offset))
    }

    /// Long-format variant of [`query_statement`], for callers that need
    /// the un-pivoted account rows.
    ///
    /// [`query_statement`]: FinancialsService::query_statement
    pub fn query_statement_raw(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<RawRow>> {
        validate_limit(limit)?;
        Ok(self.store.query_raw(statement, filter, limit, offset))
    }

    /// Fetches every (kind, year) archive, collecting failures instead of
    /// aborting: a missing year must not block the rest of the pass.
    async fn fetch_archives(&self, force: bool, failures: &mut Vec<String>) -> Vec<PathBuf> {
        let mut archives = Vec::new();
        for kind in DocKind::ALL {
            for year in self.config.years.clone() {
                match self.fetcher.fetch(kind, year, force).await {
                    Ok(path) => archives.push(path),
                    Err(err) => {
                        warn!(%kind, year, %err, "archive fetch failed");
                        failures.push(format!("{} {}: {}", kind, year, err));
                    }
                }
            }
        }
        archives
    }

    /// Fetches and parses the open-company registry, swapping in a fresh
    /// ticker directory. A failure here leaves the previous directory in
    /// place, mirroring how statement tables keep their last good snapshot.
    async fn load_directory(&self, force: bool) -> Result<usize> {
        let path = self.fetcher.fetch_registry(force).await?;
        let entries = RegistryParser::new().parse(&path)?;
        let directory = Arc::new(TickerDirectory::from_entries(entries));
        let count = directory.len();
        *self
            .directory
            .write()
            .unwrap_or_else(PoisonError::into_inner) = directory;
        Ok(count)
    }

    /// Current ticker directory handle, cheap to clone out of the lock.
    fn directory(&self) -> Arc<TickerDirectory> {
        Arc::clone(
            &self
                .directory
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Collects one statement's cleaned rows across all fetched archives.
    /// Any structural parse error fails the whole statement, so a good
    /// table is never replaced by a partial one.
    fn gather_rows(&self, archives: &[PathBuf], statement: StatementType) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        for path in archives {
            for row in self.parser.parse(path, statement)? {
                rows.push(row?);
            }
        }
        Ok(rows)
    }

    /// Records the outcome of a pass: counts only for tables actually
    /// replaced, timestamp only when at least one was.
    fn finish_load(&self, counts: BTreeMap<StatementType, usize>, failures: Vec<String>) {
        let mut inner = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if !counts.is_empty() {
            inner.last_updated = Some(Utc::now());
        }
        inner.counts.extend(counts.iter().map(|(k, v)| (*k, *v)));
        inner.failures = failures;
    }
}

fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(CvmError::InvalidFilter {
            param: "limit",
            reason: format!("must be between 1 and {}", MAX_PAGE_SIZE),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_service(dir: &std::path::Path) -> FinancialsService {
        let config = CvmConfig {
            cache_dir: dir.join("cache"),
            years: 2024..=2024,
            ..CvmConfig::default()
        };
        FinancialsService::new(config).unwrap()
    }

    #[test]
    fn status_reports_all_tables_before_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let service = idle_service(dir.path());
        let status = service.status();
        assert_eq!(status.counts.len(), 4);
        assert!(status.counts.values().all(|&c| c == 0));
        assert!(status.last_updated.is_none());
        assert!(!status.reloading);
    }

    #[test]
    fn limit_bounds_are_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let service = idle_service(dir.path());
        let filter = StatementFilter::new();

        let err = service
            .query_statement(StatementType::Dre, &filter, 0, 0)
            .unwrap_err();
        assert!(matches!(err, CvmError::InvalidFilter { param: "limit", .. }));

        let err = service
            .query_statement(StatementType::Dre, &filter, MAX_PAGE_SIZE + 1, 0)
            .unwrap_err();
        assert!(matches!(err, CvmError::InvalidFilter { param: "limit", .. }));

        let page = service
            .query_statement(StatementType::Dre, &filter, MAX_PAGE_SIZE, 0)
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn unknown_company_bundle_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = idle_service(dir.path());
        assert!(matches!(
            service.company_bundle("404404"),
            Err(CvmError::NotFound)
        ));
    }

    #[test]
    fn short_ticker_query_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = idle_service(dir.path());
        assert!(matches!(
            service.search_tickers("P"),
            Err(CvmError::InvalidFilter { param: "q", .. })
        ));
    }

    #[test]
    fn ticker_filter_falls_back_to_tax_id_before_registry_load() {
        let dir = tempfile::tempdir().unwrap();
        let service = idle_service(dir.path());

        // No registry loaded yet, so the static ticker table resolves to a
        // tax-ID filter instead of a CVM-code filter.
        let filter = service.filter_for_ticker("PETR4").unwrap();
        assert_eq!(
            filter,
            StatementFilter::new().with_cnpj("33000167000101")
        );

        assert!(matches!(
            service.filter_for_ticker("ZZZZ99"),
            Err(CvmError::NotFound)
        ));
        assert!(matches!(
            service.company_bundle_by_ticker("PETR4"),
            Err(CvmError::NotFound)
        ));
    }

    #[test]
    fn restore_without_snapshot_path_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = idle_service(dir.path());
        assert!(matches!(
            service.restore_from_snapshot(),
            Err(CvmError::ConfigError(_))
        ));
    }
}
