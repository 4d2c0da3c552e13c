//! Main Config type for nsconf
//!
//! `Config` is the public lookup interface. It establishes the root
//! directory, canonicalizes keys and applies the default and not-found
//! options on top of the value resolver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::path::{self, BaseDirLocator, EnvLocator, NamespaceFormat, PathResolver};
use crate::reference::RefDocument;
use crate::resolver::ValueResolver;
use crate::value::Value;

/// Configuration options for constructing a Config
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Root directory of namespace files and reference documents
    pub base_dir: Option<PathBuf>,
    /// Format (and extension) of namespace files
    pub namespace_format: NamespaceFormat,
}

/// Per-lookup options
#[derive(Debug, Clone, PartialEq)]
pub struct GetOptions {
    /// Returned instead of failing when the key is missing or no root
    /// directory can be established
    pub default: Option<Value>,
    /// When false, a missing key yields `Ok(None)` instead of an error
    pub not_found_exception: bool,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            default: None,
            not_found_exception: true,
        }
    }
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `value` when the lookup fails
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set whether a missing key is an error
    pub fn not_found_exception(mut self, enabled: bool) -> Self {
        self.not_found_exception = enabled;
        self
    }

    /// Turn a failed lookup into a default or nothing, where allowed.
    ///
    /// Malformed-file errors always propagate.
    fn recover(&self, err: Error) -> Result<Option<Value>> {
        if let Some(default) = &self.default {
            if err.is_key_not_found() || err.is_not_ready() {
                return Ok(Some(default.clone()));
            }
        }
        if err.is_key_not_found() && !self.not_found_exception {
            return Ok(None);
        }
        Err(err)
    }
}

/// The main configuration resolver
///
/// Namespace files and reference documents are read lazily on first use and
/// cached, together with resolved values, for the lifetime of the Config.
pub struct Config {
    engine: ValueResolver,
    locator: Option<Arc<dyn BaseDirLocator>>,
}

impl Config {
    /// Create a Config with no base directory yet.
    ///
    /// The base directory is detected from `NSCONF_BASE_DIR` on first
    /// lookup unless [`Config::set_base_dir`] is called before.
    pub fn new() -> Self {
        Self {
            engine: ValueResolver::new(PathResolver::default()),
            locator: Some(Arc::new(EnvLocator::default())),
        }
    }

    /// Create a Config with custom options
    pub fn with_options(options: ConfigOptions) -> Result<Self> {
        let mut config = Self::new();
        *config.engine.paths_mut() = PathResolver::new(options.namespace_format);
        if let Some(dir) = options.base_dir {
            config.set_base_dir(dir)?;
        }
        Ok(config)
    }

    /// Create a Config rooted at `dir`
    pub fn with_base_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::new();
        config.set_base_dir(dir)?;
        Ok(config)
    }

    /// Replace the base directory detection strategy
    pub fn with_locator(mut self, locator: impl BaseDirLocator + 'static) -> Self {
        self.locator = Some(Arc::new(locator));
        self
    }

    /// Disable base directory detection
    pub fn without_locator(mut self) -> Self {
        self.locator = None;
        self
    }

    /// Set the root directory for config files.
    ///
    /// The directory must be non-empty, readable and a directory. A later
    /// call replaces the root; already cached values are kept.
    pub fn set_base_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        path::validate_base_dir(dir)?;
        log::debug!("Config base directory set to {}", dir.display());
        self.engine.paths_mut().set_root(dir.to_path_buf());
        Ok(())
    }

    /// The established root directory, if any
    pub fn base_dir(&self) -> Option<&Path> {
        self.engine.paths().root().ok()
    }

    fn ensure_base_dir(&mut self) -> Result<()> {
        if self.engine.paths().has_root() {
            return Ok(());
        }

        let Some(dir) = self.locator.as_ref().and_then(|l| l.locate()) else {
            return Err(Error::not_ready());
        };

        if let Err(e) = path::validate_base_dir(&dir) {
            log::warn!(
                "Ignoring detected base directory {}: {}",
                dir.display(),
                e.kind
            );
            return Err(Error::not_ready().with_cause(e.to_string()));
        }

        log::debug!("Detected config base directory {}", dir.display());
        self.engine.paths_mut().set_root(dir);
        Ok(())
    }

    /// Get the resolved value of a config key.
    ///
    /// Keys are slash-delimited; `app/db/host` is looked up in `app/db`,
    /// then `app`, stopping at the first namespace file that exists.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        self.ensure_base_dir()?;
        let key = path::canonicalize(key);
        self.engine.resolve(&key)
    }

    /// Get a config value, applying default and not-found options
    pub fn get_with(&mut self, key: &str, options: &GetOptions) -> Result<Option<Value>> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) => options.recover(e),
        }
    }

    /// Get a resolved value as a string, coercing scalars
    pub fn get_string(&mut self, key: &str) -> Result<String> {
        let value = self.get(key)?;
        match value {
            Value::String(s) => Ok(s),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(Error::type_mismatch(key, "string", value.type_name())),
        }
    }

    /// Get a resolved value as an integer, parsing strings
    pub fn get_i64(&mut self, key: &str) -> Result<i64> {
        let value = self.get(key)?;
        match value {
            Value::Integer(i) => Ok(i),
            Value::String(s) => s.trim().parse().map_err(|_| {
                Error::type_mismatch(key, "integer", format!("string (\"{}\")", s))
            }),
            _ => Err(Error::type_mismatch(key, "integer", value.type_name())),
        }
    }

    /// Get a resolved value as a boolean; only "true" and "false" strings coerce
    pub fn get_bool(&mut self, key: &str) -> Result<bool> {
        let value = self.get(key)?;
        match value {
            Value::Bool(b) => Ok(b),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::type_mismatch(
                    key,
                    "boolean",
                    format!("string (\"{}\")", s),
                )),
            },
            _ => Err(Error::type_mismatch(key, "boolean", value.type_name())),
        }
    }

    /// Resolve every value of a namespace.
    ///
    /// Returns `None` if the namespace has no file.
    pub fn enumerate(&mut self, namespace: &str) -> Result<Option<IndexMap<String, Value>>> {
        self.ensure_base_dir()?;
        let namespace = path::canonicalize(namespace);
        if namespace.is_empty() {
            return Ok(None);
        }

        let Some(keys) = self.engine.namespace_keys(&namespace)? else {
            return Ok(None);
        };

        let mut resolved = IndexMap::with_capacity(keys.len());
        for local_key in keys {
            let value = self.engine.resolve(&format!("{}/{}", namespace, local_key))?;
            resolved.insert(local_key, value);
        }
        Ok(Some(resolved))
    }

    /// Get a property of a reference document
    pub fn get_ref_value(&mut self, basename: &str, property: &str) -> Result<Value> {
        self.ensure_base_dir()?;
        let basename = path::canonicalize(basename);
        self.engine.get_ref_value(&basename, property)
    }

    /// Get a property of a reference document, applying options
    pub fn get_ref_value_with(
        &mut self,
        basename: &str,
        property: &str,
        options: &GetOptions,
    ) -> Result<Option<Value>> {
        match self.get_ref_value(basename, property) {
            Ok(value) => Ok(Some(value)),
            Err(e) => options.recover(e),
        }
    }

    /// All properties of a reference document; empty if it has no file
    pub fn enum_ref(&mut self, basename: &str) -> Result<RefDocument> {
        self.ensure_base_dir()?;
        let basename = path::canonicalize(basename);
        self.engine.enum_ref(&basename)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("engine", &self.engine)
            .field("locator", &self.locator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BadBaseDirKind, ErrorKind};
    use pretty_assertions::assert_eq;

    fn write_files(dir: &Path, files: &[(&str, &str)]) {
        for (name, contents) in files {
            let path = dir.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
    }

    fn setup(files: &[(&str, &str)]) -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), files);
        let config = Config::with_base_dir(dir.path()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_get_round_trip() {
        let (_dir, mut config) = setup(&[
            ("hosts.json", r#"{"db": "db1"}"#),
            ("ns.yaml", "a: x\nb:\n  c: CONFIG-REF::hosts.db\n"),
        ]);

        assert_eq!(config.get("ns/a").unwrap(), Value::from("x"));

        let mut expected = IndexMap::new();
        expected.insert("c".to_string(), Value::from("db1"));
        assert_eq!(config.get("ns/b").unwrap(), Value::Mapping(expected));
    }

    #[test]
    fn test_get_with_integer_keyed_mapping() {
        let (_dir, mut config) = setup(&[(
            "app.yaml",
            "name: demo\nports:\n  80: http\n  443: https\n",
        )]);

        assert_eq!(config.get("app/name").unwrap(), Value::from("demo"));

        let mut ports = IndexMap::new();
        ports.insert("80".to_string(), Value::from("http"));
        ports.insert("443".to_string(), Value::from("https"));
        assert_eq!(config.get("app/ports").unwrap(), Value::Mapping(ports));
    }

    #[test]
    fn test_get_canonicalizes_key() {
        let (_dir, mut config) = setup(&[("app/db.yaml", "host: db1\n")]);
        assert_eq!(config.get(" /app\\db/host/ ").unwrap(), Value::from("db1"));
    }

    #[test]
    fn test_whole_and_inline_references() {
        let (_dir, mut config) = setup(&[
            ("basename.json", r#"{"host": "db1"}"#),
            (
                "app.yaml",
                "host: CONFIG-REF::basename.host\nurl: \"url=<%CONFIG-REF-STRING::basename.host%>:5432\"\n",
            ),
        ]);

        assert_eq!(config.get("app/host").unwrap(), Value::from("db1"));
        assert_eq!(config.get("app/url").unwrap(), Value::from("url=db1:5432"));
    }

    #[test]
    fn test_missing_key_errors() {
        let (_dir, mut config) = setup(&[("app.yaml", "name: demo\n")]);
        assert!(config.get("app/nope").unwrap_err().is_key_not_found());
        assert!(config.get("nope/nope").unwrap_err().is_key_not_found());
    }

    #[test]
    fn test_get_with_default() {
        let (_dir, mut config) = setup(&[("app.yaml", "name: demo\n")]);
        let options = GetOptions::new().with_default("fallback");

        assert_eq!(
            config.get_with("app/nope", &options).unwrap(),
            Some(Value::from("fallback"))
        );
        assert_eq!(
            config.get_with("app/name", &options).unwrap(),
            Some(Value::from("demo"))
        );
    }

    #[test]
    fn test_get_with_default_covers_missing_reference() {
        let (_dir, mut config) = setup(&[("app.yaml", "host: CONFIG-REF::hosts.db\n")]);
        let options = GetOptions::new().with_default("localhost");

        assert_eq!(
            config.get_with("app/host", &options).unwrap(),
            Some(Value::from("localhost"))
        );
    }

    #[test]
    fn test_get_with_not_found_exception_false() {
        let (_dir, mut config) = setup(&[("app.yaml", "name: demo\n")]);
        let options = GetOptions::new().not_found_exception(false);

        assert_eq!(config.get_with("app/nope", &options).unwrap(), None);
    }

    #[test]
    fn test_default_does_not_hide_bad_files() {
        let (_dir, mut config) = setup(&[("app.yaml", "[1, 2]\n")]);
        let options = GetOptions::new()
            .with_default("fallback")
            .not_found_exception(false);

        let err = config.get_with("app/name", &options).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadConfigFile { .. }));
    }

    #[test]
    fn test_memoized_across_file_changes() {
        let (dir, mut config) = setup(&[("app.yaml", "name: first\n")]);
        assert_eq!(config.get("app/name").unwrap(), Value::from("first"));

        write_files(dir.path(), &[("app.yaml", "name: second\n")]);
        assert_eq!(config.get("app/name").unwrap(), Value::from("first"));
    }

    #[test]
    fn test_not_ready_without_base_dir() {
        let mut config = Config::new().without_locator();

        assert!(config.get("app/name").unwrap_err().is_not_ready());
        assert!(config.enum_ref("hosts").unwrap_err().is_not_ready());
        assert!(config.base_dir().is_none());
    }

    #[test]
    fn test_not_ready_with_default_returns_default() {
        let mut config = Config::new().without_locator();
        let options = GetOptions::new().with_default(8080);

        assert_eq!(
            config.get_with("app/port", &options).unwrap(),
            Some(Value::Integer(8080))
        );
    }

    #[test]
    fn test_not_found_exception_does_not_hide_not_ready() {
        let mut config = Config::new().without_locator();
        let options = GetOptions::new().not_found_exception(false);

        assert!(config.get_with("app/port", &options).unwrap_err().is_not_ready());
    }

    #[test]
    fn test_locator_detects_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[("app.yaml", "name: demo\n")]);
        let root = dir.path().to_path_buf();

        let mut config = Config::new().with_locator(move || Some(root.clone()));
        assert_eq!(config.get("app/name").unwrap(), Value::from("demo"));
        assert_eq!(config.base_dir(), Some(dir.path()));
    }

    #[test]
    fn test_locator_invalid_dir_is_not_ready() {
        let mut config =
            Config::new().with_locator(|| Some(PathBuf::from("/nonexistent/nsconf/dir")));

        let err = config.get("app/name").unwrap_err();
        assert!(err.is_not_ready());
        assert!(err.cause.is_some());
    }

    #[test]
    fn test_set_base_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();

        let err = config.set_base_dir("").unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadBaseDir(BadBaseDirKind::IsEmpty));

        let err = config.set_base_dir(dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadBaseDir(BadBaseDirKind::NotReadable));

        let file = dir.path().join("file.yaml");
        std::fs::write(&file, "a: 1\n").unwrap();
        let err = config.set_base_dir(&file).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadBaseDir(BadBaseDirKind::NotDir));

        assert!(config.base_dir().is_none());
        config.set_base_dir(dir.path()).unwrap();
        assert_eq!(config.base_dir(), Some(dir.path()));
    }

    #[test]
    fn test_enumerate() {
        let (_dir, mut config) = setup(&[
            ("hosts.json", r#"{"db": "db1"}"#),
            ("app.yaml", "name: demo\nhost: CONFIG-REF::hosts.db\n"),
        ]);

        let values = config.enumerate("/app/").unwrap().unwrap();
        assert_eq!(values.keys().collect::<Vec<_>>(), vec!["name", "host"]);
        assert_eq!(values["name"], Value::from("demo"));
        assert_eq!(values["host"], Value::from("db1"));

        // Enumeration shares the get() cache
        assert_eq!(config.get("app/host").unwrap(), Value::from("db1"));
    }

    #[test]
    fn test_enumerate_missing_namespace() {
        let (_dir, mut config) = setup(&[]);
        assert_eq!(config.enumerate("app").unwrap(), None);
        assert_eq!(config.enumerate("").unwrap(), None);
    }

    #[test]
    fn test_get_ref_value() {
        let (_dir, mut config) = setup(&[("hosts.json", r#"{"db": "db1"}"#)]);

        assert_eq!(config.get_ref_value("hosts", "db").unwrap(), Value::from("db1"));

        let err = config.get_ref_value("hosts", "cache").unwrap_err();
        match err.kind {
            ErrorKind::KeyNotFound { key } => assert_eq!(key, "hosts.cache"),
            other => panic!("Expected KeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_get_ref_value_with_options() {
        let (_dir, mut config) = setup(&[("hosts.json", r#"{"db": "db1"}"#)]);

        let with_default = GetOptions::new().with_default("cache1");
        assert_eq!(
            config
                .get_ref_value_with("hosts", "cache", &with_default)
                .unwrap(),
            Some(Value::from("cache1"))
        );

        let quiet = GetOptions::new().not_found_exception(false);
        assert_eq!(
            config.get_ref_value_with("hosts", "cache", &quiet).unwrap(),
            None
        );
    }

    #[test]
    fn test_enum_ref() {
        let (_dir, mut config) = setup(&[
            ("hosts.json", r#"{"db": "db1"}"#),
            ("broken.json", "[1, 2, 3]"),
        ]);

        let first = config.enum_ref("hosts").unwrap();
        let second = config.enum_ref("/hosts/").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.get("db"), Some(&Value::from("db1")));

        assert!(config.enum_ref("missing").unwrap().is_empty());

        let err = config.enum_ref("broken").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadConfigFile { .. }));
    }

    #[test]
    fn test_typed_accessors() {
        let (_dir, mut config) = setup(&[(
            "app.yaml",
            "port: 8080\nport_str: \"9090\"\ndebug: \"TRUE\"\nflag: false\nlist: [1]\n",
        )]);

        assert_eq!(config.get_i64("app/port").unwrap(), 8080);
        assert_eq!(config.get_i64("app/port_str").unwrap(), 9090);
        assert_eq!(config.get_string("app/port").unwrap(), "8080");
        assert!(config.get_bool("app/debug").unwrap());
        assert!(!config.get_bool("app/flag").unwrap());

        let err = config.get_i64("app/list").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_json_namespace_format() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[("app.json", r#"{"name": "demo"}"#)]);

        let mut config = Config::with_options(ConfigOptions {
            base_dir: Some(dir.path().to_path_buf()),
            namespace_format: NamespaceFormat::Json,
        })
        .unwrap();

        assert_eq!(config.get("app/name").unwrap(), Value::from("demo"));
    }
}
