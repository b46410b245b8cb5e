//! Pre-generated report cache served for "report" requests.

use ltipp_core::{AppError, AppResult};
use rand::Rng;
use std::path::{Path, PathBuf};

/// Directory of `report0.txt` .. `report{count-1}.txt`.
#[derive(Debug, Clone)]
pub struct ReportCache {
    dir: PathBuf,
    count: u32,
}

impl ReportCache {
    pub fn new(dir: impl Into<PathBuf>, count: u32) -> Self {
        Self {
            dir: dir.into(),
            count,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of report `n`.
    pub fn report_path(&self, n: u32) -> PathBuf {
        self.dir.join(format!("report{}.txt", n))
    }

    /// Read report `n`.
    ///
    /// # Errors
    /// Returns `AppError::Config` when `n` is out of range and `AppError::Io`
    /// when the file cannot be read.
    pub async fn report(&self, n: u32) -> AppResult<String> {
        if n >= self.count {
            return Err(AppError::Config(format!(
                "Report {} out of range, cache holds {}",
                n, self.count
            )));
        }

        let path = self.report_path(n);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to read cached report");
            AppError::Io(e)
        })
    }

    /// Read a uniformly random cached report.
    pub async fn random_report(&self) -> AppResult<String> {
        if self.count == 0 {
            return Err(AppError::Config("Report cache is empty".to_string()));
        }

        let n = rand::thread_rng().gen_range(0..self.count);
        tracing::debug!(report = n, "Serving cached report");
        self.report(n).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_with(count: u32) -> (TempDir, ReportCache) {
        let temp = TempDir::new().unwrap();
        for n in 0..count {
            std::fs::write(temp.path().join(format!("report{}.txt", n)), format!("Report {}", n))
                .unwrap();
        }
        let cache = ReportCache::new(temp.path(), count);
        (temp, cache)
    }

    #[tokio::test]
    async fn test_report_by_index() {
        let (_temp, cache) = cache_with(3);
        assert_eq!(cache.report(2).await.unwrap(), "Report 2");
        assert!(matches!(cache.report(3).await, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_random_report_comes_from_cache() {
        let (_temp, cache) = cache_with(5);
        for _ in 0..20 {
            let report = cache.random_report().await.unwrap();
            assert!(report.starts_with("Report "));
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let cache = ReportCache::new(temp.path(), 1);
        assert!(matches!(cache.random_report().await, Err(AppError::Io(_))));
    }

    #[tokio::test]
    async fn test_empty_cache() {
        let cache = ReportCache::new("/nonexistent", 0);
        assert!(matches!(cache.random_report().await, Err(AppError::Config(_))));
    }
}
