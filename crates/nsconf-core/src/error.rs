//! Error types for nsconf
//!
//! Errors are structured: a kind, the config key or reference they concern,
//! the file involved (if any) and an actionable help message.

use std::fmt;
use std::path::Path;

/// Result type alias for nsconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nsconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Config key or `basename.property` the error concerns
    pub path: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// No root directory has been set and none could be detected
    #[error("Configuration is not ready: no base directory")]
    ConfigNotReady,
    /// The base directory given to `set_base_dir` is unusable
    #[error("Bad base directory: {0}")]
    BadBaseDir(BadBaseDirKind),
    /// A namespace file or reference document exists but is malformed
    #[error("Bad config file '{file}': {reason}")]
    BadConfigFile { file: String, reason: String },
    /// A key or `basename.property` is not defined
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },
    /// A typed accessor found a value of another type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
}

/// Reasons a base directory is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BadBaseDirKind {
    #[error("path is empty")]
    IsEmpty,
    #[error("path is not readable")]
    NotReadable,
    #[error("path is not a directory")]
    NotDir,
}

impl Error {
    fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            help: None,
            cause: None,
        }
    }

    /// Create a not-ready error (no base directory established)
    pub fn not_ready() -> Self {
        Self::from_kind(ErrorKind::ConfigNotReady).with_help(
            "Call set_base_dir() or set NSCONF_BASE_DIR to a readable directory",
        )
    }

    /// Create a bad base directory error
    pub fn bad_base_dir(kind: BadBaseDirKind, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().display().to_string();
        let mut err = Self::from_kind(ErrorKind::BadBaseDir(kind));
        if !dir.is_empty() {
            err.path = Some(dir);
        }
        err
    }

    /// Create a bad config file error
    pub fn bad_config_file(file: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::BadConfigFile {
            file: file.as_ref().display().to_string(),
            reason: reason.into(),
        })
        .with_help("Fix or remove the file; missing files are skipped but malformed ones are not")
    }

    /// Create a key not found error
    pub fn key_not_found(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::from_kind(ErrorKind::KeyNotFound { key: key.clone() }).with_help(format!(
            "Check that '{}' is defined by a namespace or reference file",
            key
        ))
    }

    /// Create a type mismatch error for a config key
    pub fn type_mismatch(
        key: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self::from_kind(ErrorKind::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        })
        .with_path(key)
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add an underlying cause to the error
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Whether this is a `KeyNotFound` error
    pub fn is_key_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::KeyNotFound { .. })
    }

    /// Whether this is a `ConfigNotReady` error
    pub fn is_not_ready(&self) -> bool {
        matches!(self.kind, ErrorKind::ConfigNotReady)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_display() {
        let err = Error::key_not_found("app/db/host");
        let display = format!("{}", err);

        assert!(display.contains("Key not found: app/db/host"));
        assert!(display.contains("Help:"));
        assert!(err.is_key_not_found());
        assert!(!err.is_not_ready());
    }

    #[test]
    fn test_bad_config_file_display() {
        let err = Error::bad_config_file("/etc/app/hosts.json", "must contain a JSON object");
        let display = format!("{}", err);

        assert!(display.contains("Bad config file '/etc/app/hosts.json'"));
        assert!(display.contains("must contain a JSON object"));
        assert_eq!(
            err.kind,
            ErrorKind::BadConfigFile {
                file: "/etc/app/hosts.json".into(),
                reason: "must contain a JSON object".into(),
            }
        );
    }

    #[test]
    fn test_bad_base_dir_kinds() {
        let err = Error::bad_base_dir(BadBaseDirKind::IsEmpty, "");
        assert_eq!(err.kind, ErrorKind::BadBaseDir(BadBaseDirKind::IsEmpty));
        assert!(err.path.is_none());
        assert!(err.to_string().contains("path is empty"));

        let err = Error::bad_base_dir(BadBaseDirKind::NotDir, "/tmp/file.txt");
        assert_eq!(err.path.as_deref(), Some("/tmp/file.txt"));
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_not_ready_has_help() {
        let err = Error::not_ready();
        assert!(err.is_not_ready());
        assert!(err.to_string().contains("NSCONF_BASE_DIR"));
    }

    #[test]
    fn test_type_mismatch() {
        let err = Error::type_mismatch("app/port", "integer", "string");
        let display = format!("{}", err);

        assert!(display.contains("expected integer, got string"));
        assert!(display.contains("Path: app/port"));
    }

    #[test]
    fn test_with_cause() {
        let err = Error::key_not_found("a/b").with_cause("while resolving app/url");
        assert!(err.to_string().contains("while resolving app/url"));
    }
}
