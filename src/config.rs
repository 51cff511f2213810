use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Datelike;

use crate::pivot::ConsolidationPolicy;

/// Configuration for the Cvm client and the load pipeline
#[derive(Debug, Clone)]
pub struct CvmConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Rate limit in requests per second
    pub rate_limit: u32,
    /// HTTP request timeout (bounds each archive download)
    pub timeout: Duration,
    /// Retries per request for transient failures (network errors, HTTP 429)
    pub max_retries: u32,
    /// Base URLs for the CVM open-data portal
    pub base_urls: CvmUrls,
    /// Directory holding cached bulk archives
    pub cache_dir: PathBuf,
    /// Fiscal years to ingest on `load`
    pub years: RangeInclusive<i32>,
    /// Tie-break between consolidated and individual statements
    pub policy: ConsolidationPolicy,
    /// Optional path for the normalized-table snapshot written after a
    /// successful load and restored on demand
    pub snapshot_path: Option<PathBuf>,
}

/// Base URLs for the ITR (quarterly) and DFP (annual) bulk datasets and the
/// open-company registry
#[derive(Debug, Clone)]
pub struct CvmUrls {
    /// Base URL for quarterly (ITR) archives
    pub itr: String,
    /// Base URL for annual (DFP) archives
    pub dfp: String,
    /// Base URL for the open-company registry (`cad_cia_aberta.csv`)
    pub registry: String,
}

impl Default for CvmConfig {
    fn default() -> Self {
        Self {
            user_agent: "cvmkit/0.1.0".to_string(),
            rate_limit: 5,
            timeout: Duration::from_secs(120),
            max_retries: 5,
            base_urls: CvmUrls::default(),
            cache_dir: PathBuf::from("data/cache"),
            years: 2010..=chrono::Utc::now().year(),
            policy: ConsolidationPolicy::default(),
            snapshot_path: None,
        }
    }
}

impl CvmConfig {
    /// Creates a new CvmConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use cvmkit::CvmConfig;
    ///
    /// let config = CvmConfig {
    ///     years: 2020..=2024,
    ///     ..CvmConfig::default()
    /// };
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
        base_urls: Option<CvmUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            rate_limit,
            timeout,
            base_urls: base_urls.unwrap_or_default(),
            ..Self::default()
        }
    }
}

impl Default for CvmUrls {
    fn default() -> Self {
        Self {
            itr: "https://dados.cvm.gov.br/dados/CIA_ABERTA/DOC/ITR/DADOS".to_string(),
            dfp: "https://dados.cvm.gov.br/dados/CIA_ABERTA/DOC/DFP/DADOS".to_string(),
            registry: "https://dados.cvm.gov.br/dados/CIA_ABERTA/CAD/DADOS".to_string(),
        }
    }
}
