//! In-memory dataset store for the four normalized statement tables.
//!
//! Single writer (the load pipeline), many readers (query paths). Tables
//! are swapped whole: a reader either sees the previous snapshot of a table
//! or the new one, never a half-built mix. Query methods copy out the
//! `Arc`-held table under a short read lock and filter outside it, so
//! readers never block on a reload in progress.
//!
//! Absence is not an error here: unknown codes and empty tables yield empty
//! results, and only the serving boundary turns that into a not-found
//! response.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::options::{StatementFilter, normalize_code};
use crate::statements::{CompanyEntry, FinancialRecord, RawRow, StatementType};

/// One page of query results, with the pagination echo the serving layer
/// returns verbatim. `total` counts the full filtered set, independent of
/// `limit` and `offset`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Both views of one statement table. `records` is the wide pivoted form,
/// `raw` the cleaned long form served when callers ask for `raw = true`.
#[derive(Debug, Clone, Default)]
struct TableData {
    records: Arc<Vec<FinancialRecord>>,
    raw: Arc<Vec<RawRow>>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: BTreeMap<StatementType, TableData>,
    companies: Arc<Vec<CompanyEntry>>,
}

/// Owns the normalized tables and the company directory.
///
/// Shared by handle: the orchestrator and every query path hold the same
/// `Arc<DatasetStore>`.
#[derive(Debug, Default)]
pub struct DatasetStore {
    inner: RwLock<Inner>,
}

/// On-disk snapshot of the whole store, written after a successful load so
/// a restart can serve without re-parsing the archives. Always replaced
/// whole, never patched.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    saved_at: DateTime<Utc>,
    tables: BTreeMap<StatementType, TableSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableSnapshot {
    records: Vec<FinancialRecord>,
    raw: Vec<RawRow>,
}

impl DatasetStore {
    /// Creates an empty store; every table starts absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces one statement table with a freshly normalized
    /// one and rebuilds the company directory. Returns the new record
    /// count.
    pub fn replace_table(
        &self,
        statement: StatementType,
        records: Vec<FinancialRecord>,
        raw: Vec<RawRow>,
    ) -> usize {
        let count = records.len();
        let table = TableData {
            records: Arc::new(records),
            raw: Arc::new(raw),
        };

        let mut inner = self.write();
        inner.tables.insert(statement, table);
        inner.companies = Arc::new(build_company_index(&inner.tables));
        debug!(%statement, count, "table replaced");
        count
    }

    /// Record count of one table; zero when never loaded.
    pub fn record_count(&self, statement: StatementType) -> usize {
        self.read()
            .tables
            .get(&statement)
            .map_or(0, |t| t.records.len())
    }

    /// Filtered, paginated read of one table's pivoted records.
    pub fn query(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Page<FinancialRecord> {
        let records = self
            .read()
            .tables
            .get(&statement)
            .map(|t| Arc::clone(&t.records))
            .unwrap_or_default();

        paginate(
            records
                .iter()
                .filter(|r| filter.matches(r.company_code(), r.cnpj(), r.ref_date())),
            limit,
            offset,
        )
    }

    /// Filtered, paginated read of one table's long-format rows.
    pub fn query_raw(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Page<RawRow> {
        let raw = self
            .read()
            .tables
            .get(&statement)
            .map(|t| Arc::clone(&t.raw))
            .unwrap_or_default();

        paginate(
            raw.iter()
                .filter(|r| filter.matches(&r.company_code, &r.cnpj, r.ref_date)),
            limit,
            offset,
        )
    }

    /// Company directory, optionally narrowed by a case-insensitive name
    /// substring. Deduplicated by company code.
    pub fn search_companies(&self, name: Option<&str>) -> Vec<CompanyEntry> {
        let companies = Arc::clone(&self.read().companies);
        match name {
            None => companies.as_ref().clone(),
            Some(needle) => {
                let needle = needle.to_lowercase();
                companies
                    .iter()
                    .filter(|c| c.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Every known record for one company, across all four tables. Tables
    /// the company never appears in map to empty lists.
    pub fn company_bundle(&self, code: &str) -> BTreeMap<StatementType, Vec<FinancialRecord>> {
        let code = normalize_code(code).to_string();
        let tables: Vec<(StatementType, Arc<Vec<FinancialRecord>>)> = {
            let inner = self.read();
            StatementType::ALL
                .iter()
                .map(|s| {
                    let records = inner
                        .tables
                        .get(s)
                        .map(|t| Arc::clone(&t.records))
                        .unwrap_or_default();
                    (*s, records)
                })
                .collect()
        };

        tables
            .into_iter()
            .map(|(statement, records)| {
                let matched: Vec<FinancialRecord> = records
                    .iter()
                    .filter(|r| normalize_code(r.company_code()) == code)
                    .cloned()
                    .collect();
                (statement, matched)
            })
            .collect()
    }

    /// Writes the whole store to `path` as a derived cache, atomically.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot = {
            let inner = self.read();
            Snapshot {
                saved_at: Utc::now(),
                tables: inner
                    .tables
                    .iter()
                    .map(|(statement, table)| {
                        (
                            *statement,
                            TableSnapshot {
                                records: table.records.as_ref().clone(),
                                raw: table.raw.as_ref().clone(),
                            },
                        )
                    })
                    .collect(),
            }
        };

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)?;
        }
        let mut tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new()?,
        };
        serde_json::to_writer(&mut tmp, &snapshot)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        info!(path = %path.display(), tables = snapshot.tables.len(), "snapshot written");
        Ok(())
    }

    /// Replaces every table from a snapshot written by [`save_snapshot`].
    /// Returns per-table record counts.
    ///
    /// [`save_snapshot`]: DatasetStore::save_snapshot
    pub fn restore_snapshot(&self, path: &Path) -> Result<BTreeMap<StatementType, usize>> {
        let file = std::fs::File::open(path)?;
        let snapshot: Snapshot = serde_json::from_reader(std::io::BufReader::new(file))?;

        let mut counts = BTreeMap::new();
        for (statement, table) in snapshot.tables {
            let count = self.replace_table(statement, table.records, table.raw);
            counts.insert(statement, count);
        }
        info!(path = %path.display(), saved_at = %snapshot.saved_at, "snapshot restored");
        Ok(counts)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn paginate<'a, T: Clone + 'a>(
    matched: impl Iterator<Item = &'a T>,
    limit: usize,
    offset: usize,
) -> Page<T> {
    let matched: Vec<&T> = matched.collect();
    let total = matched.len();
    let data = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    Page {
        data,
        total,
        limit,
        offset,
    }
}

/// Union of all tables, one entry per company code. Records are stored in
/// ascending date order, so the last write per code carries the most
/// recently published name.
fn build_company_index(tables: &BTreeMap<StatementType, TableData>) -> Vec<CompanyEntry> {
    let mut by_code: BTreeMap<String, CompanyEntry> = BTreeMap::new();
    for table in tables.values() {
        for record in table.records.iter() {
            by_code.insert(
                normalize_code(record.company_code()).to_string(),
                CompanyEntry {
                    code: record.company_code().to_string(),
                    name: record.company_name().to_string(),
                    cnpj: record.cnpj().to_string(),
                },
            );
        }
    }
    by_code.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::{self, ConsolidationPolicy};
    use crate::statements::Consolidation;

    fn raw_row(company: &str, name: &str, cnpj: &str, date: &str, account: &str, value: f64) -> RawRow {
        RawRow {
            company_code: company.to_string(),
            company_name: name.to_string(),
            cnpj: cnpj.to_string(),
            ref_date: date.parse().unwrap(),
            account_code: account.to_string(),
            account_description: String::new(),
            value,
            consolidation: Consolidation::Consolidated,
            marker: "DRE".to_string(),
        }
    }

    fn seeded_store() -> DatasetStore {
        let rows = vec![
            raw_row("9512", "PETROBRAS", "33.000.167/0001-01", "2024-03-31", "3.01", 100.0),
            raw_row("9512", "PETROBRAS", "33.000.167/0001-01", "2024-06-30", "3.01", 110.0),
            raw_row("14", "BANCO ALFA", "17.167.396/0001-69", "2024-03-31", "3.01", 50.0),
        ];
        let records = pivot::normalize(&rows, StatementType::Dre, ConsolidationPolicy::default());
        let store = DatasetStore::new();
        store.replace_table(StatementType::Dre, records, rows);
        store
    }

    #[test]
    fn unknown_code_yields_empty_not_error() {
        let store = seeded_store();
        let page = store.query(
            StatementType::Dre,
            &StatementFilter::new().with_code("404404"),
            100,
            0,
        );
        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn never_loaded_table_is_empty() {
        let store = seeded_store();
        let page = store.query(StatementType::Bpa, &StatementFilter::new(), 100, 0);
        assert_eq!(page.total, 0);
        assert_eq!(store.record_count(StatementType::Bpa), 0);
    }

    #[test]
    fn total_ignores_pagination() {
        let store = seeded_store();
        let page = store.query(StatementType::Dre, &StatementFilter::new(), 1, 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 2);
    }

    #[test]
    fn raw_view_returns_long_format_rows() {
        let store = seeded_store();
        let page = store.query_raw(
            StatementType::Dre,
            &StatementFilter::new().with_code("9512"),
            100,
            0,
        );
        assert_eq!(page.total, 2);
        assert!(page.data.iter().all(|r| r.account_code == "3.01"));
    }

    #[test]
    fn company_search_is_case_insensitive_substring() {
        let store = seeded_store();
        let hits = store.search_companies(Some("petro"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "9512");

        let all = store.search_companies(None);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn bundle_covers_all_statement_types() {
        let store = seeded_store();
        let bundle = store.company_bundle("9512");
        assert_eq!(bundle.len(), 4);
        assert_eq!(bundle[&StatementType::Dre].len(), 2);
        assert!(bundle[&StatementType::Bpa].is_empty());
    }

    #[test]
    fn replace_table_swaps_whole_table() {
        let store = seeded_store();
        let rows = vec![raw_row(
            "77",
            "NOVA CIA",
            "11.111.111/0001-11",
            "2024-03-31",
            "3.01",
            9.0,
        )];
        let records = pivot::normalize(&rows, StatementType::Dre, ConsolidationPolicy::default());
        store.replace_table(StatementType::Dre, records, rows);

        let page = store.query(StatementType::Dre, &StatementFilter::new(), 100, 0);
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].company_code(), "77");
        // The directory follows the tables.
        assert!(store.search_companies(Some("petrobras")).is_empty());
    }

    #[test]
    fn snapshot_round_trip() {
        let store = seeded_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        store.save_snapshot(&path).unwrap();

        let restored = DatasetStore::new();
        let counts = restored.restore_snapshot(&path).unwrap();
        assert_eq!(counts[&StatementType::Dre], 3);
        assert_eq!(restored.record_count(StatementType::Dre), 3);
        let page = restored.query_raw(StatementType::Dre, &StatementFilter::new(), 100, 0);
        assert_eq!(page.total, 3);
        assert_eq!(restored.search_companies(None).len(), 2);
    }
}
