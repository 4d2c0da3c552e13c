//! nsconf CLI - Command-line interface for nsconf lookups
//!
//! Usage:
//!   nsconf --base-dir /etc/myapp get app/db/host
//!   nsconf enum app/db --format json
//!   nsconf ref hosts db
//!   nsconf enum-ref hosts

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use nsconf_core::{Config, Error, ErrorKind, GetOptions, Value};
use std::path::PathBuf;
use std::process::ExitCode;

/// nsconf - Namespaced configuration lookups
#[derive(Parser)]
#[command(name = "nsconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root directory of config files (defaults to $NSCONF_BASE_DIR)
    #[arg(short, long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get the resolved value of a config key
    Get {
        /// Slash-delimited key (e.g., app/db/host)
        key: String,

        /// Value to print if the key is not defined
        #[arg(short, long)]
        default: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Resolve every value of a namespace
    Enum {
        /// Namespace (e.g., app/db)
        namespace: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },

    /// Get a property of a reference document
    Ref {
        /// Reference document basename
        basename: String,

        /// Property name
        property: String,

        /// Value to print if the property is not defined
        #[arg(short, long)]
        default: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// List all properties of a reference document
    EnumRef {
        /// Reference document basename
        basename: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match open_config(cli.base_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Get {
            key,
            default,
            format,
        } => cmd_get(&mut config, &key, default, format),

        Commands::Enum { namespace, format } => cmd_enum(&mut config, &namespace, format),

        Commands::Ref {
            basename,
            property,
            default,
            format,
        } => cmd_ref(&mut config, &basename, &property, default, format),

        Commands::EnumRef { basename, format } => cmd_enum_ref(&mut config, &basename, format),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn open_config(base_dir: Option<PathBuf>) -> Result<Config, Error> {
    match base_dir {
        Some(dir) => Config::with_base_dir(dir),
        None => Ok(Config::new()),
    }
}

/// Lookup failures exit with 1, setup and file problems with 2
fn exit_code(err: &Error) -> u8 {
    match err.kind {
        ErrorKind::KeyNotFound { .. } | ErrorKind::TypeMismatch { .. } => 1,
        ErrorKind::ConfigNotReady | ErrorKind::BadBaseDir(_) | ErrorKind::BadConfigFile { .. } => {
            2
        }
    }
}

fn lookup_options(default: Option<String>) -> GetOptions {
    match default {
        Some(d) => GetOptions::new().with_default(d),
        None => GetOptions::new(),
    }
}

fn cmd_get(
    config: &mut Config,
    key: &str,
    default: Option<String>,
    format: Format,
) -> Result<String, Error> {
    let value = config
        .get_with(key, &lookup_options(default))?
        .unwrap_or_default();
    Ok(render(&value, format))
}

fn cmd_enum(config: &mut Config, namespace: &str, format: Format) -> Result<String, Error> {
    let values = config
        .enumerate(namespace)?
        .ok_or_else(|| Error::key_not_found(namespace).with_help("No file backs this namespace"))?;
    Ok(render(&Value::Mapping(values), format))
}

fn cmd_ref(
    config: &mut Config,
    basename: &str,
    property: &str,
    default: Option<String>,
    format: Format,
) -> Result<String, Error> {
    let value = config
        .get_ref_value_with(basename, property, &lookup_options(default))?
        .unwrap_or_default();
    Ok(render(&value, format))
}

fn cmd_enum_ref(config: &mut Config, basename: &str, format: Format) -> Result<String, Error> {
    let document = config.enum_ref(basename)?;
    Ok(render(&Value::Mapping((*document).clone()), format))
}

/// Render a value for output, newline-terminated
fn render(value: &Value, format: Format) -> String {
    match format {
        Format::Json => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()) + "\n"
        }
        Format::Yaml => serde_yaml::to_string(value).unwrap_or_default(),
        Format::Text if value.is_container() => serde_yaml::to_string(value).unwrap_or_default(),
        Format::Text => format!("{}\n", value),
    }
}
