//! Reference documents
//!
//! A reference document `<root>/<basename>.json` is a flat JSON object of
//! property values. Documents are read once; a missing document behaves
//! like an empty one.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::namespace::{read_file, FileRead};
use crate::path::PathResolver;
use crate::value::Value;

/// Properties of one reference document
pub type RefDocument = Arc<IndexMap<String, Value>>;

/// Loads and caches reference documents by basename
#[derive(Debug, Default)]
pub struct ReferenceStore {
    documents: HashMap<String, RefDocument>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Properties of a reference document.
    ///
    /// The same shared mapping is returned on every call for a basename.
    /// Absent documents are cached as empty.
    pub fn enumerate(&mut self, paths: &PathResolver, basename: &str) -> Result<RefDocument> {
        if let Some(doc) = self.documents.get(basename) {
            log::trace!("Reference document '{}' served from cache", basename);
            return Ok(Arc::clone(doc));
        }

        let doc = Arc::new(read_document(paths, basename)?);
        self.documents.insert(basename.to_string(), Arc::clone(&doc));
        Ok(doc)
    }
}

fn read_document(paths: &PathResolver, basename: &str) -> Result<IndexMap<String, Value>> {
    let file = paths.reference_file(basename)?;

    let contents = match read_file(&file)? {
        FileRead::Absent => {
            log::debug!(
                "Reference document '{}' has no file at {}",
                basename,
                file.display()
            );
            return Ok(IndexMap::new());
        }
        FileRead::Contents(c) => c,
    };

    let parsed: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| Error::bad_config_file(&file, format!("JSON error: {}", e)))?;

    let serde_json::Value::Object(object) = parsed else {
        return Err(Error::bad_config_file(&file, "must contain a JSON object"));
    };

    let document: IndexMap<String, Value> = object
        .into_iter()
        .map(|(k, v)| (k, Value::from(v)))
        .collect();

    log::debug!(
        "Loaded reference document '{}' from {} ({} properties)",
        basename,
        file.display(),
        document.len()
    );
    Ok(document)
}
