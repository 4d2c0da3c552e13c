//! nsconf CLI library
//!
//! Exposes the CLI entry point so the `nsconf` binary stays a thin wrapper.

mod cli;

pub use cli::run;
