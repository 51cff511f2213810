//! # cvmkit - Brazilian corporate financials from CVM open data
//!
//! cvmkit downloads the bulk financial-statement archives published by the
//! CVM (Comissão de Valores Mobiliários, the Brazilian securities
//! regulator), normalizes them into per-company-per-period records, and
//! serves filtered, paginated queries from an in-memory store.
//!
//! ## Features
//!
//! - **Rate-limited HTTP client** - Polite, retrying downloads from the
//!   CVM open-data portal
//! - **Archive cache** - One immutable ZIP per document kind and fiscal
//!   year, fetched once and reused across runs
//! - **Encoding-tolerant parsing** - Latin-1 and UTF-8 CSV entries, decimal
//!   commas, currency scale, restated-period rows
//! - **Pivoted tables** - Income statement, both balance-sheet sides and
//!   cash flow as wide records, one per company and reference date
//! - **Query operations** - Company search, per-company bundles, and
//!   filtered pagination with a long-format `raw` view
//! - **Ticker directory** - B3 trading symbols resolved against the
//!   regulator's open-company registry, for ticker search and filters
//! - **Single-flight reloads** - At most one load pipeline at a time;
//!   partial failures keep the previous good tables
//!
//! ## Requirements
//!
//! cvmkit is an async-first library and requires an async runtime. We
//! recommend [tokio](https://tokio.rs), which is the most widely used async
//! runtime in the Rust ecosystem.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use cvmkit::{CvmConfig, FinancialsService, StatementFilter, StatementType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = FinancialsService::new(CvmConfig {
//!         years: 2022..=2024,
//!         ..CvmConfig::default()
//!     })?;
//!
//!     // Download, parse and pivot all four statement tables.
//!     let status = service.load(false).await?;
//!     println!("loaded: {:?}", status.counts);
//!
//!     // Quarterly income statements for Petrobras.
//!     let page = service.query_statement(
//!         StatementType::Dre,
//!         &StatementFilter::new().with_code("9512"),
//!         100,
//!         0,
//!     )?;
//!
//!     for record in page.data {
//!         println!("{}: {:?}", record.ref_date(), record.account("3.11"));
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod fetch;
mod options;
pub mod parsing;
mod pivot;
mod registry;
mod service;
mod statements;
mod store;
mod traits;

// Core client and configuration
pub use config::{CvmConfig, CvmUrls};
pub use core::Cvm;
pub use error::{CvmError, Result};

// Pipeline components
pub use fetch::{ArchiveFetcher, FIRST_YEAR, REGISTRY_FILE};
pub use parsing::{ParserConfig, RawRows, StatementParser};
pub use pivot::{ConsolidationPolicy, normalize};
pub use registry::{CompanyMatch, RegistryEntry, RegistryParser, TickerDirectory};
pub use store::{DatasetStore, Page};

// Data model
pub use statements::{
    BPA_ACCOUNTS, BPP_ACCOUNTS, BalanceSheetAssets, BalanceSheetLiabilities, CashFlow,
    CompanyEntry, Consolidation, DFC_ACCOUNTS, DRE_ACCOUNTS, DocKind, FinancialRecord,
    IncomeStatement, RawRow, StatementType,
};

// Service boundary
pub use options::StatementFilter;
pub use service::{DEFAULT_PAGE_SIZE, FinancialsService, LoadStatus, MAX_PAGE_SIZE};
pub use traits::{LoadOperations, QueryOperations};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
