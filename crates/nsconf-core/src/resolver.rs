//! Value resolution
//!
//! Finds the namespace that owns a key, then transforms its raw value by
//! substituting references to reference documents. Transformed values are
//! memoized per key for the lifetime of the resolver.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::namespace::NamespaceStore;
use crate::path::PathResolver;
use crate::placeholder::{self, RefTarget};
use crate::reference::{RefDocument, ReferenceStore};
use crate::value::Value;

/// Resolves config keys to transformed values.
///
/// Owns every cache: namespace load outcomes, raw values, reference
/// documents and transformed values. Lookups take `&mut self`; share an
/// instance between threads only behind a lock.
#[derive(Debug)]
pub struct ValueResolver {
    paths: PathResolver,
    namespaces: NamespaceStore,
    references: ReferenceStore,
    transformed: HashMap<String, Value>,
}

impl ValueResolver {
    pub fn new(paths: PathResolver) -> Self {
        Self {
            paths,
            namespaces: NamespaceStore::new(),
            references: ReferenceStore::new(),
            transformed: HashMap::new(),
        }
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn paths_mut(&mut self) -> &mut PathResolver {
        &mut self.paths
    }

    /// Fully transformed value of a canonical key
    pub fn resolve(&mut self, key: &str) -> Result<Value> {
        if let Some(value) = self.transformed.get(key) {
            log::trace!("Key '{}' served from cache", key);
            return Ok(value.clone());
        }

        if self.namespaces.raw(key).is_none() {
            self.locate(key)?;
        }

        let raw = self
            .namespaces
            .raw(key)
            .cloned()
            .ok_or_else(|| Error::key_not_found(key))?;

        let value = self.transform(&raw, key)?;
        self.transformed.insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Load the most specific ancestor namespace of `key` that has a file
    fn locate(&mut self, key: &str) -> Result<()> {
        let mut segments: Vec<&str> = key.split('/').collect();
        segments.pop();

        while !segments.is_empty() {
            let namespace = segments.join("/");
            if self.namespaces.load(&self.paths, &namespace)? {
                return Ok(());
            }
            segments.pop();
        }

        log::debug!("No namespace file found for key '{}'", key);
        Ok(())
    }

    /// Substitute references in a raw value owned by `key`
    pub fn transform(&mut self, value: &Value, key: &str) -> Result<Value> {
        match value {
            Value::String(s) => self.transform_string(s, key),
            Value::Sequence(seq) => {
                let mut transformed = Vec::with_capacity(seq.len());
                for item in seq {
                    transformed.push(self.transform(item, key)?);
                }
                Ok(Value::Sequence(transformed))
            }
            Value::Mapping(map) => {
                let mut transformed = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    transformed.insert(k.clone(), self.transform(v, key)?);
                }
                Ok(Value::Mapping(transformed))
            }
            _ => Ok(value.clone()),
        }
    }

    fn transform_string(&mut self, s: &str, key: &str) -> Result<Value> {
        if let Some(target) = placeholder::parse_whole(s) {
            return self.ref_value(&target).map_err(|e| {
                if e.is_key_not_found() {
                    Error::key_not_found(format!(
                        "{}={}",
                        key,
                        placeholder::whole_reference(&target)
                    ))
                } else {
                    e
                }
            });
        }

        if !placeholder::contains_inline(s) {
            return Ok(Value::String(s.to_string()));
        }

        let refs = placeholder::scan_inline(s);
        let mut replacements: HashMap<String, String> = HashMap::new();

        for r in &refs {
            let matched = r.matched(s);
            if replacements.contains_key(matched) {
                continue;
            }
            let value = self.ref_value(&r.target).map_err(|e| {
                if e.is_key_not_found() {
                    e.with_path(key)
                } else {
                    e
                }
            })?;
            replacements.insert(matched.to_string(), value.to_inline_string());
        }

        Ok(Value::String(placeholder::substitute(s, &refs, &replacements)))
    }

    fn ref_value(&mut self, target: &RefTarget) -> Result<Value> {
        self.get_ref_value(&target.basename, &target.property)
    }

    /// Value of `property` in the reference document `basename`
    pub fn get_ref_value(&mut self, basename: &str, property: &str) -> Result<Value> {
        self.enum_ref(basename)?
            .get(property)
            .cloned()
            .ok_or_else(|| Error::key_not_found(format!("{}.{}", basename, property)))
    }

    /// All properties of a reference document
    pub fn enum_ref(&mut self, basename: &str) -> Result<RefDocument> {
        self.references.enumerate(&self.paths, basename)
    }

    /// Keys declared by a namespace file, `None` if it is absent
    pub fn namespace_keys(&mut self, namespace: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .namespaces
            .enumerate(&self.paths, namespace)?
            .map(|mapping| mapping.keys().cloned().collect()))
    }
}
