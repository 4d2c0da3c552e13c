//! Mapping of namespaces and reference basenames to files
//!
//! Both kinds of identifier are canonicalized the same way: backslashes
//! become `/`, surrounding whitespace and separators are trimmed.

use std::path::{Path, PathBuf};

use crate::error::{BadBaseDirKind, Error, Result};

/// Extension of reference documents
pub const REFERENCE_EXTENSION: &str = "json";

/// Environment variable read by the default [`EnvLocator`]
pub const BASE_DIR_ENV: &str = "NSCONF_BASE_DIR";

/// Canonicalize a key, namespace or basename
pub fn canonicalize(id: &str) -> String {
    id.replace('\\', "/").trim().trim_matches('/').to_string()
}

/// File format of namespace files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceFormat {
    /// `<namespace>.yaml`, parsed as YAML
    #[default]
    Yaml,
    /// `<namespace>.json`, parsed as JSON
    Json,
}

impl NamespaceFormat {
    /// File extension used for namespace files
    pub fn extension(&self) -> &'static str {
        match self {
            NamespaceFormat::Yaml => "yaml",
            NamespaceFormat::Json => "json",
        }
    }
}

/// Check that a directory can serve as the config root
pub fn validate_base_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(Error::bad_base_dir(BadBaseDirKind::IsEmpty, dir));
    }

    let metadata = std::fs::metadata(dir).map_err(|e| {
        Error::bad_base_dir(BadBaseDirKind::NotReadable, dir).with_cause(e.to_string())
    })?;

    if !metadata.is_dir() {
        return Err(Error::bad_base_dir(BadBaseDirKind::NotDir, dir));
    }

    std::fs::read_dir(dir).map_err(|e| {
        Error::bad_base_dir(BadBaseDirKind::NotReadable, dir).with_cause(e.to_string())
    })?;

    Ok(())
}

/// Strategy for finding the config root when none was set explicitly
pub trait BaseDirLocator: Send + Sync {
    /// Candidate root directory, if one can be found
    fn locate(&self) -> Option<PathBuf>;
}

impl<F> BaseDirLocator for F
where
    F: Fn() -> Option<PathBuf> + Send + Sync,
{
    fn locate(&self) -> Option<PathBuf> {
        self()
    }
}

/// Locates the config root through an environment variable
#[derive(Debug, Clone)]
pub struct EnvLocator {
    var: String,
}

impl EnvLocator {
    /// Read the root directory from `var`
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvLocator {
    fn default() -> Self {
        Self::new(BASE_DIR_ENV)
    }
}

impl BaseDirLocator for EnvLocator {
    fn locate(&self) -> Option<PathBuf> {
        std::env::var_os(&self.var)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}

/// Converts namespaces and basenames into file locations under the root
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    root: Option<PathBuf>,
    format: NamespaceFormat,
}

impl PathResolver {
    pub fn new(format: NamespaceFormat) -> Self {
        Self { root: None, format }
    }

    /// The established root directory
    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or_else(Error::not_ready)
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    /// Replace the root directory. Callers validate it first.
    pub fn set_root(&mut self, root: PathBuf) {
        self.root = Some(root);
    }

    pub fn format(&self) -> NamespaceFormat {
        self.format
    }

    /// File backing a config namespace
    pub fn namespace_file(&self, namespace: &str) -> Result<PathBuf> {
        self.file_for(namespace, self.format.extension())
    }

    /// File backing a reference document
    pub fn reference_file(&self, basename: &str) -> Result<PathBuf> {
        self.file_for(basename, REFERENCE_EXTENSION)
    }

    fn file_for(&self, id: &str, extension: &str) -> Result<PathBuf> {
        let mut path = self.root()?.to_path_buf();
        for segment in canonicalize(id).split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        let mut file = path.into_os_string();
        file.push(".");
        file.push(extension);
        Ok(PathBuf::from(file))
    }
}
