//! # File I/O Module
//!
//! Project files are JSON documents with the `.rcp` extension. Writes go
//! through a temporary file that is synced and renamed into place, and a
//! `.rcp.lock` sidecar (plus an OS lock) marks a file as being edited.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calc_core::file_io::{load_project, save_project, FileLock};
//! use calc_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::sample()?;
//! let path = Path::new("rail_beam.rcp");
//!
//! let lock = FileLock::acquire(path, "engineer@company.com")?;
//! save_project(&project, path)?;
//! drop(lock);
//!
//! let loaded = load_project(path)?;
//! assert_eq!(loaded.item_count(), 1);
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Extension of project files
pub const PROJECT_EXTENSION: &str = "rcp";

/// Locks older than this are taken over
const LOCK_MAX_AGE_HOURS: i64 = 24;

fn io_error(operation: &str, path: &Path, e: std::io::Error) -> CalcError {
    CalcError::file_error(operation, path.display().to_string(), e.to_string())
}

/// Lock metadata stored in the `.lock` sidecar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Stale when older than a day, or when it was taken on this machine by
    /// a process that no longer exists.
    pub fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > Duration::hours(LOCK_MAX_AGE_HOURS) {
            return true;
        }
        hostname().is_some_and(|machine| machine == self.machine) && !process_alive(self.pid)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains(&pid.to_string()))
        .unwrap_or(true)
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive edit lock on a project file, released on drop.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    // Holds the OS lock for as long as the guard lives
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock, failing with [`CalcError::FileLocked`] when
    /// another live process holds it.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        if let Some(existing) = FileLock::check(path) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let lock_path = lock_path_for(path);
        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| io_error("create lock", &lock_path, e))?;

        handle
            .try_lock_exclusive()
            .map_err(|_| CalcError::file_locked(path.display().to_string(), "another process", "unknown"))?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info)?;
        handle
            .write_all(json.as_bytes())
            .and_then(|_| handle.sync_all())
            .map_err(|e| io_error("write lock", &lock_path, e))?;

        log::debug!("locked {} for {}", path.display(), info.user_id);
        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current holder of a live lock, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let text = fs::read_to_string(lock_path_for(path)).ok()?;
        let info: LockInfo = serde_json::from_str(&text).ok()?;
        (!info.is_stale()).then_some(info)
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `project.rcp` → `project.rcp.lock`
fn lock_path_for(project_path: &Path) -> PathBuf {
    with_suffix(project_path, "lock")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = match path.extension() {
        Some(ext) => format!("{}.{}", ext.to_string_lossy(), suffix),
        None => suffix.to_string(),
    };
    out.set_extension(extension);
    out
}

/// Write `bytes` to `path` through a synced temporary file and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let tmp_path = with_suffix(path, "tmp");
    let mut tmp = File::create(&tmp_path).map_err(|e| io_error("create temp file", &tmp_path, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.sync_all())
        .map_err(|e| io_error("write temp file", &tmp_path, e))?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_error("rename to final", path, e)
    })
}

/// Save a project atomically.
///
/// ```rust,no_run
/// use calc_core::file_io::save_project;
/// use calc_core::project::Project;
/// use std::path::Path;
///
/// save_project(&Project::new("Engineer", "26-001", "Client"), Path::new("job.rcp"))?;
/// # Ok::<(), calc_core::errors::CalcError>(())
/// ```
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    write_atomic(path, json.as_bytes())?;
    log::debug!("saved {} ({} items)", path.display(), project.item_count());
    Ok(())
}

/// Parse a project document and check its schema version.
pub fn parse_project(json: &str) -> CalcResult<Project> {
    let project: Project = serde_json::from_str(json)?;
    validate_version(&project.meta.version)?;
    Ok(project)
}

/// Load a project file.
///
/// Fails with `VersionMismatch` for an incompatible schema,
/// `SerializationError` for malformed JSON and `FileError` for I/O errors.
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let text = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
    parse_project(&text).map_err(|e| match e {
        CalcError::SerializationError { reason } => CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), reason),
        },
        other => other,
    })
}

/// Load a project together with the current lock holder, if any.
pub fn load_project_with_lock_check(path: &Path) -> CalcResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

fn version_parts(version: &str) -> Vec<u32> {
    version.split('.').filter_map(|p| p.parse().ok()).collect()
}

/// Major versions must match; within 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let file = version_parts(file_version);
    let current = version_parts(SCHEMA_VERSION);
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file.first(), current.first()) {
        (Some(f), Some(c)) if f == c => {}
        _ => return Err(mismatch()),
    }
    if current[0] == 0 {
        if let (Some(f), Some(c)) = (file.get(1), current.get(1)) {
            if f > c {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_project_path(name: &str) -> PathBuf {
        temp_dir().join(format!("concreta_test_{}_{}.rcp", name, std::process::id()))
    }

    #[test]
    fn test_sidecar_paths() {
        let project_path = Path::new("/path/to/beam.rcp");
        assert_eq!(lock_path_for(project_path), Path::new("/path/to/beam.rcp.lock"));
        assert_eq!(with_suffix(project_path, "tmp"), Path::new("/path/to/beam.rcp.tmp"));
        assert_eq!(lock_path_for(Path::new("beam")), Path::new("beam.lock"));
    }

    #[test]
    fn test_lock_info_staleness() {
        let fresh = LockInfo::new("test@example.com");
        assert!(fresh.pid > 0);
        assert!(!fresh.is_stale());

        let old = LockInfo {
            locked_at: Utc::now() - Duration::hours(30),
            ..LockInfo::new("old@example.com")
        };
        assert!(old.is_stale());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_project_path("roundtrip");
        let project = Project::sample().unwrap();
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.job_id, "SAMPLE");
        assert_eq!(loaded.item_count(), 1);
        assert!(!with_suffix(&path, "tmp").exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_project_path("lock");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");
        assert_eq!(lock.project_path(), path.as_path());
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());
        assert!(FileLock::check(&path).is_some());

        let err = FileLock::acquire(&path, "other@example.com").err().unwrap();
        assert!(err.is_recoverable());

        drop(lock);
        assert!(!lock_path.exists());
        assert!(FileLock::check(&path).is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_invalid_json_names_file() {
        let path = temp_project_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        match load_project(&path) {
            Err(CalcError::SerializationError { reason }) => assert!(reason.contains("concreta_test_invalid")),
            other => panic!("unexpected {:?}", other.map(|p| p.meta.job_id)),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = load_project(Path::new("/nonexistent/dir/beam.rcp")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_project_path("lock_check");
        save_project(&Project::new("Test", "TEST", "Client"), &path).unwrap();

        let (loaded, lock_info) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.job_id, "TEST");
        assert!(lock_info.is_none());

        let _ = fs::remove_file(&path);
    }
}
