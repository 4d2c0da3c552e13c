//! nsconf-core: Namespaced configuration with cross-document references
//!
//! Config values live in namespace files under a root directory. A key such
//! as `app/db/host` is owned by the most specific namespace file found when
//! walking up its path (`app/db.yaml`, then `app.yaml`). String values may
//! point into JSON reference documents, either as a whole value
//! (`CONFIG-REF::hosts.db`) or inline (`<%CONFIG-REF-STRING::hosts.db%>`).
//!
//! # Example
//!
//! ```rust,no_run
//! use nsconf_core::{Config, GetOptions};
//!
//! let mut config = Config::with_base_dir("/etc/myapp").unwrap();
//! let host = config.get("app/db/host").unwrap();
//! let port = config
//!     .get_with("app/db/port", &GetOptions::new().with_default(5432))
//!     .unwrap();
//! println!("{} {:?}", host, port);
//! ```

pub mod error;
pub mod namespace;
pub mod path;
pub mod placeholder;
pub mod reference;
pub mod resolver;
pub mod value;

mod config;

pub use config::{Config, ConfigOptions, GetOptions};
pub use error::{BadBaseDirKind, Error, ErrorKind, Result};
pub use path::{BaseDirLocator, EnvLocator, NamespaceFormat};
pub use reference::RefDocument;
pub use resolver::ValueResolver;
pub use value::Value;
