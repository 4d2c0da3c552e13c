//! Namespace files and the raw values they declare
//!
//! A namespace `app/db` is backed by `<root>/app/db.<ext>`. Loading it
//! registers each top-level entry as a raw value under `app/db/<key>`.
//! Missing files are not errors; malformed ones are.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::path::{NamespaceFormat, PathResolver};
use crate::value::Value;

/// Outcome of reading a config or reference file
pub(crate) enum FileRead {
    Absent,
    Contents(String),
}

/// Read a file, treating a missing or unreadable file as absent.
///
/// Content that is not valid UTF-8 is a malformed file, not an absent one.
pub(crate) fn read_file(path: &Path) -> Result<FileRead> {
    if !path.is_file() {
        return Ok(FileRead::Absent);
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(FileRead::Contents(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            Err(Error::bad_config_file(path, format!("read error: {}", e)))
        }
        Err(e) => {
            log::debug!("Treating unreadable file {} as absent: {}", path.display(), e);
            Ok(FileRead::Absent)
        }
    }
}

/// Loads namespace files and owns the raw values they declare
#[derive(Debug, Default)]
pub struct NamespaceStore {
    /// Load outcome per namespace, stable once recorded
    loaded: HashMap<String, bool>,
    /// Raw values by full key; first registration wins
    raw: HashMap<String, Value>,
    /// Raw mappings kept for enumeration, `None` if the file is absent
    enumerated: HashMap<String, Option<IndexMap<String, Value>>>,
}

impl NamespaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a namespace, registering its values.
    ///
    /// Returns `Ok(false)` if the namespace file is absent. The outcome is
    /// cached, so a namespace file is read at most once.
    pub fn load(&mut self, paths: &PathResolver, namespace: &str) -> Result<bool> {
        if let Some(&loaded) = self.loaded.get(namespace) {
            log::trace!("Namespace '{}' already attempted (loaded={})", namespace, loaded);
            return Ok(loaded);
        }

        let Some(mapping) = read_namespace(paths, namespace)? else {
            self.loaded.insert(namespace.to_string(), false);
            return Ok(false);
        };

        for (local_key, value) in mapping {
            self.raw
                .entry(format!("{}/{}", namespace, local_key))
                .or_insert(value);
        }

        self.loaded.insert(namespace.to_string(), true);
        Ok(true)
    }

    /// Raw mapping declared by a namespace, `None` if its file is absent
    pub fn enumerate(
        &mut self,
        paths: &PathResolver,
        namespace: &str,
    ) -> Result<Option<&IndexMap<String, Value>>> {
        if !self.enumerated.contains_key(namespace) {
            let mapping = read_namespace(paths, namespace)?;
            self.enumerated.insert(namespace.to_string(), mapping);
        }

        Ok(self.enumerated.get(namespace).and_then(Option::as_ref))
    }

    /// Raw value registered under a full key
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Whether the namespace has been attempted, and with what outcome
    pub fn load_outcome(&self, namespace: &str) -> Option<bool> {
        self.loaded.get(namespace).copied()
    }
}

fn read_namespace(
    paths: &PathResolver,
    namespace: &str,
) -> Result<Option<IndexMap<String, Value>>> {
    let file = paths.namespace_file(namespace)?;

    let contents = match read_file(&file)? {
        FileRead::Absent => {
            log::debug!("Namespace '{}' has no file at {}", namespace, file.display());
            return Ok(None);
        }
        FileRead::Contents(c) => c,
    };

    let parsed = match paths.format() {
        NamespaceFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&contents)
                .map_err(|e| Error::bad_config_file(&file, format!("YAML error: {}", e)))?;
            Value::try_from(yaml).map_err(|reason| Error::bad_config_file(&file, reason))?
        }
        NamespaceFormat::Json => {
            let json: serde_json::Value = serde_json::from_str(&contents)
                .map_err(|e| Error::bad_config_file(&file, format!("JSON error: {}", e)))?;
            Value::from(json)
        }
    };

    match parsed {
        Value::Mapping(mapping) => {
            log::debug!(
                "Loaded namespace '{}' from {} ({} keys)",
                namespace,
                file.display(),
                mapping.len()
            );
            Ok(Some(mapping))
        }
        other => Err(Error::bad_config_file(
            &file,
            format!("config file must contain a mapping, got {}", other.type_name()),
        )),
    }
}
