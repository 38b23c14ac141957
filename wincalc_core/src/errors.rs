//! # Error Types
//!
//! Structured error types for wincalc_core. Two layers exist:
//!
//! - [`WindowError`] - a rejected window geometry. This is a normal outcome of
//!   the calculation engine, not a failure of the program.
//! - [`CalcError`] - everything else the crate can report (catalog misses,
//!   unknown rooms, file and serialization problems).
//!
//! ## Example
//!
//! ```rust
//! use wincalc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_area(area_m2: f64) -> CalcResult<()> {
//!     if area_m2 <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "area_m2",
//!             area_m2.to_string(),
//!             "Room area must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_area(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for wincalc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Why the engine refused a window geometry.
///
/// Checks run in order and the first failure wins: a window that is both too
/// small and narrower than its frame reports [`WindowError::TooSmall`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum WindowError {
    /// Width or height below the manufacturable minimum
    #[error("Window size too small: {width_mm} x {height_mm} mm (minimum {min_mm} mm per side)")]
    TooSmall {
        width_mm: f64,
        height_mm: f64,
        min_mm: f64,
    },

    /// The frame faces leave no visible glass
    #[error("Frame profile wider than window: {face_width_mm} mm face on each side of {width_mm} x {height_mm} mm")]
    ProfileWiderThanWindow {
        width_mm: f64,
        height_mm: f64,
        face_width_mm: f64,
    },
}

impl WindowError {
    /// Short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            WindowError::TooSmall { .. } => "SIZE_TOO_SMALL",
            WindowError::ProfileWiderThanWindow { .. } => "PROFILE_WIDER_THAN_WINDOW",
        }
    }
}

/// Structured error type for everything outside the pure engine.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, blank, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The engine rejected the window geometry
    #[error("Window rejected: {0}")]
    InvalidWindow(WindowError),

    /// Profile or glazing id not present in the catalog
    #[error("Catalog entry not found: {kind} '{id}'")]
    CatalogNotFound { kind: String, id: String },

    /// Room id not present in the project
    #[error("Room not found: {room_id}")]
    RoomNotFound { room_id: String },

    /// Window id not present in the room
    #[error("Window not found: {window_id} in room {room_id}")]
    WindowNotFound { room_id: String, window_id: String },

    /// Project id not present in the store
    #[error("Project not found: {project_id}")]
    ProjectNotFound { project_id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a CatalogNotFound error
    pub fn catalog_not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CalcError::CatalogNotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a RoomNotFound error
    pub fn room_not_found(room_id: impl Into<String>) -> Self {
        CalcError::RoomNotFound {
            room_id: room_id.into(),
        }
    }

    /// Create a WindowNotFound error
    pub fn window_not_found(room_id: impl Into<String>, window_id: impl Into<String>) -> Self {
        CalcError::WindowNotFound {
            room_id: room_id.into(),
            window_id: window_id.into(),
        }
    }

    /// Create a ProjectNotFound error
    pub fn project_not_found(project_id: impl Into<String>) -> Self {
        CalcError::ProjectNotFound {
            project_id: project_id.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        CalcError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::InvalidWindow(_) => "INVALID_WINDOW",
            CalcError::CatalogNotFound { .. } => "CATALOG_NOT_FOUND",
            CalcError::RoomNotFound { .. } => "ROOM_NOT_FOUND",
            CalcError::WindowNotFound { .. } => "WINDOW_NOT_FOUND",
            CalcError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<WindowError> for CalcError {
    fn from(err: WindowError) -> Self {
        CalcError::InvalidWindow(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("area_m2", "-5.0", "Room area must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::room_not_found("r-1").error_code(), "ROOM_NOT_FOUND");
        assert_eq!(
            CalcError::catalog_not_found("profile", "veka-x").error_code(),
            "CATALOG_NOT_FOUND"
        );
        let too_small = WindowError::TooSmall {
            width_mm: 300.0,
            height_mm: 1000.0,
            min_mm: 400.0,
        };
        assert_eq!(too_small.error_code(), "SIZE_TOO_SMALL");
        assert_eq!(CalcError::from(too_small).error_code(), "INVALID_WINDOW");
    }

    #[test]
    fn test_window_error_messages() {
        let too_small = WindowError::TooSmall {
            width_mm: 300.0,
            height_mm: 1000.0,
            min_mm: 400.0,
        };
        assert!(too_small.to_string().to_lowercase().contains("size too small"));

        let wider = WindowError::ProfileWiderThanWindow {
            width_mm: 400.0,
            height_mm: 400.0,
            face_width_mm: 250.0,
        };
        assert!(wider.to_string().to_lowercase().contains("profile wider than window"));
    }
}
