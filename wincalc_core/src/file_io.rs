//! # File I/O Module
//!
//! Persists all projects in one JSON store file:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the store
//! - **Forgiving loads**: a missing, unreadable or corrupt store reads as an
//!   empty project list (with a warning in the log) instead of an error
//! - **File locking**: a `.lock` file guards read-modify-write cycles when
//!   several sessions share one store
//!
//! ## File Format
//!
//! ```json
//! { "version": "0.1.0", "projects": [ { "id": "...", "name": "...", ... } ] }
//! ```
//!
//! A bare JSON array of projects (the older storage layout) is read as well.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wincalc_core::file_io::{FileLock, ProjectStore};
//! use wincalc_core::ids::UuidGenerator;
//!
//! let store = ProjectStore::new("projects.json");
//! let lock = FileLock::acquire(store.path(), "estimator@example.com")?;
//!
//! let mut project = store.create_project("Miller house", &mut UuidGenerator);
//! store.persist_project_update(&mut project)?;
//!
//! drop(lock);
//! # Ok::<(), wincalc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::ids::IdGenerator;
use crate::project::Project;

/// Current schema version of the store file
pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: String,
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoreContents {
    Versioned(StoreFile),
    Bare(Vec<Project>),
}

/// All projects, persisted in a single JSON file.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    path: PathBuf,
}

impl ProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProjectStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every project. Never fails: problems are logged and read as an
    /// empty list.
    pub fn load_projects(&self) -> Vec<Project> {
        match self.try_load_projects() {
            Ok(projects) => projects,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "project store unreadable, starting with an empty list"
                );
                Vec::new()
            }
        }
    }

    /// Load every project, reporting problems. A missing file is an empty list.
    pub fn try_load_projects(&self) -> CalcResult<Vec<Project>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CalcError::file_error("open", self.path.display().to_string(), e.to_string()))
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            CalcError::file_error("read", self.path.display().to_string(), e.to_string())
        })?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let parsed: StoreContents = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", self.path.display(), e),
        })?;

        match parsed {
            StoreContents::Versioned(store) => {
                validate_version(&store.version)?;
                Ok(store.projects)
            }
            StoreContents::Bare(projects) => Ok(projects),
        }
    }

    /// Replace the stored list with `projects` (atomic write).
    pub fn save_projects(&self, projects: &[Project]) -> CalcResult<()> {
        let store = StoreFile {
            version: SCHEMA_VERSION.to_string(),
            projects: projects.to_vec(),
        };
        let json = serde_json::to_string_pretty(&store).map_err(CalcError::serialization)?;
        write_atomic(&self.path, json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), count = projects.len(), "saved projects");
        Ok(())
    }

    /// A fresh project with a new id, current timestamps and no rooms.
    ///
    /// Nothing is written until the project is persisted.
    pub fn create_project(&self, name: impl Into<String>, ids: &mut impl IdGenerator) -> Project {
        Project::new(name, ids)
    }

    /// Stamp `updated_at` and upsert the project by id. Projects not yet in
    /// the store are inserted at the front of the list.
    pub fn persist_project_update(&self, project: &mut Project) -> CalcResult<()> {
        project.touch();
        let mut projects = self.try_load_projects()?;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => projects.insert(0, project.clone()),
        }
        self.save_projects(&projects)
    }

    /// Look up one project by id.
    pub fn get_project(&self, project_id: &str) -> CalcResult<Project> {
        self.try_load_projects()?
            .into_iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| CalcError::project_not_found(project_id))
    }

    /// Delete a project. Returns whether anything was removed.
    pub fn delete_project(&self, project_id: &str) -> CalcResult<bool> {
        let mut projects = self.try_load_projects()?;
        let before = projects.len();
        projects.retain(|p| p.id != project_id);
        if projects.len() == before {
            return Ok(false);
        }
        self.save_projects(&projects)?;
        Ok(true)
    }
}

/// Write to a temporary sibling, sync, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "tmp")
}

fn lock_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "lock")
}

/// `projects.json` -> `projects.json.<suffix>`
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Reject store files written by an incompatible schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    let (Some(&file_major), Some(&current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    // 0.x: a newer minor may carry breaking changes
    if current_major == 0 {
        if let (Some(&file_minor), Some(&current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

// ============================================================================
// Locking
// ============================================================================

/// Lock file metadata stored next to the project store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
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

    /// Held by a process that is gone, or older than a day
    fn is_stale(&self) -> bool {
        if (Utc::now() - self.locked_at).num_hours() > 24 {
            return true;
        }
        #[cfg(unix)]
        {
            if hostname().as_deref() == Some(self.machine.as_str()) {
                return fs::metadata(format!("/proc/{}", self.pid)).is_err();
            }
        }
        false
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a store file, released on drop.
///
/// Holds an OS-level lock (fs2) on `<store>.lock` and writes [`LockInfo`]
/// into it so other users can see who is editing.
pub struct FileLock {
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`, taking over stale locks.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = Self::check(path) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        tracing::debug!(path = %lock_path.display(), user = %info.user_id, "lock acquired");
        Ok(FileLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone (stale locks are ignored).
    pub fn check(path: &Path) -> Option<LockInfo> {
        let contents = fs::read_to_string(lock_path_for(path)).ok()?;
        let info: LockInfo = serde_json::from_str(&contents).ok()?;
        (!info.is_stale()).then_some(info)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::ids::SequentialIds;
    use crate::project::WindowRequest;
    use crate::settings::PricingSettings;
    use std::env::temp_dir;

    fn temp_store(name: &str) -> ProjectStore {
        let path = temp_dir().join(format!("wincalc_test_{}_{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        ProjectStore::new(path)
    }

    fn cleanup(store: &ProjectStore) {
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("/data/projects.json");
        assert_eq!(lock_path_for(path), Path::new("/data/projects.json.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/data/projects.json.tmp"));
    }

    #[test]
    fn test_missing_store_is_empty() {
        let store = temp_store("missing");
        assert!(store.load_projects().is_empty());
        assert!(store.try_load_projects().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_store_degrades_to_empty() {
        let store = temp_store("corrupt");
        fs::write(store.path(), "{ this is not json").unwrap();

        assert!(store.load_projects().is_empty());
        assert!(matches!(
            store.try_load_projects(),
            Err(CalcError::SerializationError { .. })
        ));
        cleanup(&store);
    }

    #[test]
    fn test_newer_schema_degrades_to_empty() {
        let store = temp_store("newer");
        fs::write(store.path(), r#"{"version": "0.9.0", "projects": []}"#).unwrap();

        assert!(store.load_projects().is_empty());
        assert!(matches!(
            store.try_load_projects(),
            Err(CalcError::VersionMismatch { .. })
        ));
        cleanup(&store);
    }

    #[test]
    fn test_reads_bare_array() {
        let store = temp_store("bare");
        fs::write(
            store.path(),
            r#"[{"id":"p1","name":"Old","createdAt":"2025-03-01T10:00:00Z","updatedAt":"2025-03-01T10:00:00Z","rooms":[]}]"#,
        )
        .unwrap();

        let projects = store.load_projects();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Old");
        cleanup(&store);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let store = temp_store("roundtrip");
        let mut ids = SequentialIds::new("id");
        let mut project = store.create_project("Miller house", &mut ids);
        let room = project.add_room("Living room", 24.0, 2.7, &mut ids).unwrap();
        let catalog = Catalog::builtin();
        let request = WindowRequest {
            width_mm: 1200.0,
            height_mm: 1400.0,
            profile: catalog.profile("veka-softline-82").unwrap(),
            glazing: catalog.glazing("triple-chamber").unwrap(),
        };
        project.add_window(&room, &request, &PricingSettings::default(), &mut ids).unwrap();

        store.save_projects(std::slice::from_ref(&project)).unwrap();
        let loaded = store.try_load_projects().unwrap();
        assert_eq!(loaded, vec![project]);
        assert!(!tmp_path_for(store.path()).exists());
        cleanup(&store);
    }

    #[test]
    fn test_persist_update_upserts_and_stamps() {
        let store = temp_store("upsert");
        let mut ids = SequentialIds::new("id");

        let mut first = store.create_project("First", &mut ids);
        let mut second = store.create_project("Second", &mut ids);
        store.persist_project_update(&mut first).unwrap();
        store.persist_project_update(&mut second).unwrap();

        let names: Vec<String> = store.load_projects().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Second", "First"]);

        let before = first.updated_at;
        first.name = "First (renamed)".to_string();
        store.persist_project_update(&mut first).unwrap();
        assert!(first.updated_at >= before);

        let projects = store.load_projects();
        assert_eq!(projects.len(), 2);
        assert_eq!(store.get_project(&first.id).unwrap().name, "First (renamed)");
        cleanup(&store);
    }

    #[test]
    fn test_delete_project() {
        let store = temp_store("delete");
        let mut ids = SequentialIds::new("id");
        let mut project = store.create_project("Doomed", &mut ids);
        store.persist_project_update(&mut project).unwrap();

        assert!(!store.delete_project("unknown").unwrap());
        assert!(store.delete_project(&project.id).unwrap());
        assert!(matches!(
            store.get_project(&project.id),
            Err(CalcError::ProjectNotFound { .. })
        ));
        cleanup(&store);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let store = temp_store("lock");
        let lock = FileLock::acquire(store.path(), "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");

        let lock_path = lock_path_for(store.path());
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_stale_lock_is_ignored() {
        let store = temp_store("stale");
        let mut info = LockInfo::new("someone@example.com");
        info.locked_at = Utc::now() - chrono::Duration::hours(48);
        fs::write(lock_path_for(store.path()), serde_json::to_string(&info).unwrap()).unwrap();

        assert!(FileLock::check(store.path()).is_none());
        let lock = FileLock::acquire(store.path(), "me@example.com").unwrap();
        drop(lock);
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
}
