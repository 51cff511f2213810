//! Bulk archive retrieval with an on-disk content cache.
//!
//! The portal publishes one ZIP archive per (document kind, fiscal year),
//! e.g. `itr_cia_aberta_2024.zip`, containing the CSV entries for every
//! statement type. Archives are immutable once published for past years, so
//! the fetcher caches them under a deterministic filename and skips the
//! network entirely on a cache hit. A forced fetch re-downloads and replaces
//! the cached copy.
//!
//! Downloads land in a temporary file in the cache directory and are renamed
//! into place, so a partially written archive is never visible under the
//! final name.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::Cvm;
use crate::error::{CvmError, Result};
use crate::statements::DocKind;

/// First fiscal year with bulk archives on the portal.
pub const FIRST_YEAR: i32 = 2010;

/// Filename of the open-company registry, on the portal and in the cache.
pub const REGISTRY_FILE: &str = "cad_cia_aberta.csv";

/// Downloads and caches bulk statement archives.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: Cvm,
    cache_dir: PathBuf,
}

impl ArchiveFetcher {
    /// Creates a fetcher writing into `cache_dir` (created if missing).
    pub fn new(client: Cvm, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { client, cache_dir })
    }

    /// Deterministic local path for a (kind, year) archive. Repeated runs
    /// find existing entries by name alone; there is no manifest file.
    pub fn cache_path(&self, kind: DocKind, year: i32) -> PathBuf {
        self.cache_dir.join(kind.archive_name(year))
    }

    /// Returns the local path of the archive for (kind, year), downloading
    /// it if no cached copy exists or `force` is set.
    ///
    /// # Errors
    ///
    /// * `CvmError::InvalidYear` - year precedes the bulk dataset
    /// * `CvmError::NotFound` - the portal has no archive for that year yet
    /// * `CvmError::RequestError` / `RateLimitExceeded` / `InvalidResponse` -
    ///   transfer failures, after the client's retries
    pub async fn fetch(&self, kind: DocKind, year: i32, force: bool) -> Result<PathBuf> {
        if year < FIRST_YEAR {
            return Err(CvmError::InvalidYear);
        }

        let dest = self.cache_path(kind, year);
        if !force && dest.exists() {
            debug!(path = %dest.display(), "archive cache hit");
            return Ok(dest);
        }

        let url = format!("{}/{}", self.client.base_url(kind), kind.archive_name(year));
        info!(%url, "downloading archive");
        let bytes = self.client.get_bytes(&url).await?;
        info!(%url, size = bytes.len(), "downloaded archive");

        Self::write_atomic(&dest, &self.cache_dir, &bytes)?;
        Ok(dest)
    }

    /// Local path of the cached open-company registry file.
    pub fn registry_cache_path(&self) -> PathBuf {
        self.cache_dir.join(REGISTRY_FILE)
    }

    /// Returns the local path of the open-company registry, downloading it
    /// if no cached copy exists or `force` is set. Unlike the yearly
    /// archives the registry is a plain CSV and changes over time, so a
    /// forced fetch is the way to pick up newly registered companies.
    pub async fn fetch_registry(&self, force: bool) -> Result<PathBuf> {
        let dest = self.registry_cache_path();
        if !force && dest.exists() {
            debug!(path = %dest.display(), "registry cache hit");
            return Ok(dest);
        }

        let url = format!("{}/{}", self.client.registry_url(), REGISTRY_FILE);
        info!(%url, "downloading registry");
        let bytes = self.client.get_bytes(&url).await?;
        info!(%url, size = bytes.len(), "downloaded registry");

        Self::write_atomic(&dest, &self.cache_dir, &bytes)?;
        Ok(dest)
    }

    /// Writes `bytes` to a temp file in `dir` and renames it onto `dest`.
    fn write_atomic(dest: &Path, dir: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(dest).map_err(|e| CvmError::FileError(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CvmConfig, CvmUrls};

    /// Client pointed at an unroutable address: any network access fails fast.
    fn offline_client() -> Cvm {
        let config = CvmConfig {
            user_agent: "test_agent example@example.com".to_string(),
            timeout: std::time::Duration::from_millis(200),
            max_retries: 0,
            base_urls: CvmUrls {
                itr: "http://127.0.0.1:1/itr".to_string(),
                dfp: "http://127.0.0.1:1/dfp".to_string(),
                registry: "http://127.0.0.1:1/cad".to_string(),
            },
            ..CvmConfig::default()
        };
        Cvm::with_config(&config).unwrap()
    }

    #[test]
    fn cache_path_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ArchiveFetcher::new(offline_client(), dir.path()).unwrap();
        assert_eq!(
            fetcher.cache_path(DocKind::Itr, 2024),
            dir.path().join("itr_cia_aberta_2024.zip")
        );
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ArchiveFetcher::new(offline_client(), dir.path()).unwrap();

        std::fs::write(fetcher.cache_path(DocKind::Dfp, 2020), b"cached").unwrap();

        // The client cannot reach anything; success proves no network access.
        let path = fetcher.fetch(DocKind::Dfp, 2020, false).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn force_bypasses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ArchiveFetcher::new(offline_client(), dir.path()).unwrap();

        std::fs::write(fetcher.cache_path(DocKind::Dfp, 2020), b"cached").unwrap();

        let result = fetcher.fetch(DocKind::Dfp, 2020, true).await;
        assert!(matches!(result, Err(CvmError::RequestError(_))));
        // The failed download must not clobber the existing cached copy.
        assert_eq!(
            std::fs::read(fetcher.cache_path(DocKind::Dfp, 2020)).unwrap(),
            b"cached"
        );
    }

    #[tokio::test]
    async fn registry_cache_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ArchiveFetcher::new(offline_client(), dir.path()).unwrap();

        std::fs::write(fetcher.registry_cache_path(), b"CNPJ_CIA;DENOM_CIA;CD_CVM\n").unwrap();

        let path = fetcher.fetch_registry(false).await.unwrap();
        assert_eq!(path, dir.path().join(REGISTRY_FILE));

        // A forced fetch must reach for the network and fail here.
        assert!(matches!(
            fetcher.fetch_registry(true).await,
            Err(CvmError::RequestError(_))
        ));
    }

    #[tokio::test]
    async fn rejects_years_before_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ArchiveFetcher::new(offline_client(), dir.path()).unwrap();
        assert!(matches!(
            fetcher.fetch(DocKind::Itr, 2009, false).await,
            Err(CvmError::InvalidYear)
        ));
    }
}
