//! Persist rendered exports under the exportable-benchmarks directory.
//!
//! Layout:
//!
//! ```text
//! <base>/.exportableBenchmarks
//! ├── target1
//! │   ├── exportable
//! │   │   ├── results.json
//! │   │   ├── host1.results.csv
//! │   │   └── host2.results.csv
//! │   └── named1
//! │       └── results.csv
//! └── target2
//!     └── ...
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use super::ExportFormat;
use crate::{BenchError, BenchResult};

/// Directory under the base path holding all exports.
pub const EXPORTS_DIR: &str = ".exportableBenchmarks";

/// Subdirectory used when no named baseline is given.
pub const DEFAULT_BASELINE_DIR: &str = "exportable";

/// File stem used when no host identifier is given.
pub const DEFAULT_FILE_STEM: &str = "results";

/// Writes export files, replacing anything already at the destination.
///
/// Writes to the same path through one `ExportWriter` are serialized. A path's lock
/// lives only while some writer is using it.
#[derive(Debug, Default)]
pub struct ExportWriter {
    base_path: PathBuf,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl ExportWriter {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        ExportWriter {
            base_path: base_path.as_ref().to_path_buf(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Destination for one export.
    ///
    /// `<base>/.exportableBenchmarks/<target>/<baseline|exportable>/[<host>.]results.<ext>`
    ///
    /// # Errors
    /// Returns `BenchError::InvalidTarget` if the target, baseline or host would escape
    /// its path component.
    pub fn resolve_path(
        &self,
        target: &str,
        baseline: Option<&str>,
        host_identifier: Option<&str>,
        format: ExportFormat,
    ) -> BenchResult<PathBuf> {
        validate_component(target)?;
        if let Some(baseline) = baseline {
            validate_component(baseline)?;
        }
        if let Some(host) = host_identifier {
            validate_component(host)?;
        }

        let file_name = match host_identifier {
            Some(host) => format!("{host}.{DEFAULT_FILE_STEM}.{}", format.extension()),
            None => format!("{DEFAULT_FILE_STEM}.{}", format.extension()),
        };

        Ok(self
            .base_path
            .join(EXPORTS_DIR)
            .join(target)
            .join(baseline.unwrap_or(DEFAULT_BASELINE_DIR))
            .join(file_name))
    }

    /// Write `content` to `path`, creating parent directories and replacing any
    /// existing file.
    ///
    /// # Errors
    /// Returns `BenchError::PermissionDenied` when the filesystem refuses access and
    /// `BenchError::Io` for every other failure.
    pub fn write(&self, path: &Path, content: &[u8]) -> BenchResult<()> {
        let lock = self.lock_for(path);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            write_replacing(path, content)
        };
        self.release(path, lock);
        result
    }

    /// Resolve the destination and write `content` there.
    pub fn export(
        &self,
        target: &str,
        baseline: Option<&str>,
        host_identifier: Option<&str>,
        format: ExportFormat,
        content: &[u8],
    ) -> BenchResult<PathBuf> {
        let path = self.resolve_path(target, baseline, host_identifier, format)?;
        self.write(&path, content)?;
        Ok(path)
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    /// Drop the path's lock entry once no other writer holds it.
    fn release(&self, path: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(path);
        }
        // Must go before the map guard so the next releaser sees the true count.
        drop(lock);
    }
}

fn write_replacing(path: &Path, content: &[u8]) -> BenchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(dir = %parent.display(), "creating export directory");
            std::fs::create_dir_all(parent).map_err(|e| BenchError::from_io(parent, e))?;
        }
    }

    if path.exists() {
        debug!(path = %path.display(), "removing previous export");
        std::fs::remove_file(path).map_err(|e| BenchError::from_io(path, e))?;
    }

    std::fs::write(path, content).map_err(|e| BenchError::from_io(path, e))?;
    info!(path = %path.display(), bytes = content.len(), "wrote export");
    Ok(())
}

fn validate_component(name: &str) -> BenchResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(BenchError::InvalidTarget(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let writer = ExportWriter::new("/pkg");
        let path = writer
            .resolve_path("MyTarget", None, None, ExportFormat::Influx)
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/pkg/.exportableBenchmarks/MyTarget/exportable/results.csv")
        );
    }

    #[test]
    fn test_named_baseline_and_host() {
        let writer = ExportWriter::new("/pkg");
        let path = writer
            .resolve_path("MyTarget", Some("named1"), Some("ci-linux"), ExportFormat::Json)
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/pkg/.exportableBenchmarks/MyTarget/named1/ci-linux.results.json")
        );
    }

    #[test]
    fn test_rejects_escaping_components() {
        let writer = ExportWriter::new("/pkg");
        for bad in ["", "..", "a/b"] {
            let err = writer
                .resolve_path(bad, None, None, ExportFormat::Json)
                .unwrap_err();
            assert!(matches!(err, BenchError::InvalidTarget(_)));
        }
        assert!(
            writer
                .resolve_path("ok", Some("../up"), None, ExportFormat::Json)
                .is_err()
        );
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path());
        let path = writer
            .export("T", None, None, ExportFormat::Json, b"{}\n")
            .unwrap();

        assert!(path.starts_with(dir.path().join(EXPORTS_DIR)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path());
        let path = writer
            .resolve_path("T", None, None, ExportFormat::Influx)
            .unwrap();

        writer.write(&path, b"a much longer first export\n").unwrap();
        writer.write(&path, b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
    }

    #[test]
    fn test_locks_released_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path());
        for target in ["A", "B", "C"] {
            writer
                .export(target, None, None, ExportFormat::Json, b"{}")
                .unwrap();
        }
        writer.export("A", None, None, ExportFormat::Json, b"{}").unwrap();
        assert!(writer.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_lock_kept_while_another_writer_holds_it() {
        let writer = ExportWriter::new("/pkg");
        let path = PathBuf::from("/pkg/results.json");
        let first = writer.lock_for(&path);
        let second = writer.lock_for(&path);
        assert!(Arc::ptr_eq(&first, &second));

        writer.release(&path, first);
        assert!(writer.locks.lock().unwrap().contains_key(&path));
        writer.release(&path, second);
        assert!(writer.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let writer = ExportWriter::new(&blocker);
        assert!(writer.export("T", None, None, ExportFormat::Json, b"{}").is_err());
        assert!(writer.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_write_into_file_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let writer = ExportWriter::new(&blocker);
        let err = writer
            .export("T", None, None, ExportFormat::Json, b"{}")
            .unwrap_err();
        match err {
            BenchError::Io { path, .. } => assert!(path.starts_with(&blocker)),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
