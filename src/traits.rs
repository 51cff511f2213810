//! Traits describing the query and load boundaries.
//!
//! Serving layers (HTTP handlers, CLIs) depend on these instead of the
//! concrete [`FinancialsService`], so they can be tested against fixture
//! implementations. Query operations are synchronous: they only read
//! in-memory tables and never suspend on I/O.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::options::StatementFilter;
use crate::registry::CompanyMatch;
use crate::service::{FinancialsService, LoadStatus};
use crate::statements::{CompanyEntry, FinancialRecord, RawRow, StatementType};
use crate::store::Page;

/// Read-only operations over the loaded dataset.
pub trait QueryOperations {
    /// Current load status: counts, last update time, reload flag.
    fn status(&self) -> LoadStatus;

    /// Company directory, optionally narrowed by a case-insensitive name
    /// substring.
    fn list_companies(&self, search: Option<&str>) -> Vec<CompanyEntry>;

    /// The tracked (account code, label) pairs one statement table carries.
    fn tracked_accounts(
        &self,
        statement: StatementType,
    ) -> &'static [(&'static str, &'static str)];

    /// Searches companies by B3 ticker or name.
    fn search_tickers(&self, query: &str) -> Result<Vec<CompanyMatch>>;

    /// Resolves a B3 ticker into a company filter for the query methods.
    fn filter_for_ticker(&self, ticker: &str) -> Result<StatementFilter>;

    /// Every known record for one company, keyed by statement type.
    fn company_bundle(&self, code: &str)
    -> Result<BTreeMap<StatementType, Vec<FinancialRecord>>>;

    /// Every known record for one company, looked up by B3 ticker.
    fn company_bundle_by_ticker(
        &self,
        ticker: &str,
    ) -> Result<BTreeMap<StatementType, Vec<FinancialRecord>>>;

    /// Filtered, paginated page of pivoted records.
    fn query_statement(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<FinancialRecord>>;

    /// Filtered, paginated page of long-format rows.
    fn query_statement_raw(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<RawRow>>;
}

/// Operations that (re)build the dataset.
#[async_trait]
pub trait LoadOperations {
    /// Runs the full fetch → parse → pivot → store pipeline. Safe to call
    /// repeatedly: concurrent calls collapse to a single in-flight pass.
    async fn reload(&self, force: bool) -> Result<LoadStatus>;
}

impl QueryOperations for FinancialsService {
    fn status(&self) -> LoadStatus {
        FinancialsService::status(self)
    }

    fn list_companies(&self, search: Option<&str>) -> Vec<CompanyEntry> {
        FinancialsService::list_companies(self, search)
    }

    fn tracked_accounts(
        &self,
        statement: StatementType,
    ) -> &'static [(&'static str, &'static str)] {
        FinancialsService::tracked_accounts(self, statement)
    }

    fn search_tickers(&self, query: &str) -> Result<Vec<CompanyMatch>> {
        FinancialsService::search_tickers(self, query)
    }

    fn filter_for_ticker(&self, ticker: &str) -> Result<StatementFilter> {
        FinancialsService::filter_for_ticker(self, ticker)
    }

    fn company_bundle(
        &self,
        code: &str,
    ) -> Result<BTreeMap<StatementType, Vec<FinancialRecord>>> {
        FinancialsService::company_bundle(self, code)
    }

    fn company_bundle_by_ticker(
        &self,
        ticker: &str,
    ) -> Result<BTreeMap<StatementType, Vec<FinancialRecord>>> {
        FinancialsService::company_bundle_by_ticker(self, ticker)
    }

    fn query_statement(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<FinancialRecord>> {
        FinancialsService::query_statement(self, statement, filter, limit, offset)
    }

    fn query_statement_raw(
        &self,
        statement: StatementType,
        filter: &StatementFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<RawRow>> {
        FinancialsService::query_statement_raw(self, statement, filter, limit, offset)
    }
}

#[async_trait]
impl LoadOperations for FinancialsService {
    async fn reload(&self, force: bool) -> Result<LoadStatus> {
        self.load(force).await
    }
}
