//! Command-line interface and orchestration for contribkit
//!
//! This module implements the CLI commands and wires configuration, providers, and reports
//! together.
//!
//! ## Commands
//!
//! - **fetch**: Load the configuration, run the selected providers, filter the records, and
//!   write them to `<output_dir>/<name>.json`, optionally printing a summary
//! - **init**: Generate a default configuration file
//! - **validate**: Check that a configuration file loads and passes validation
//!
//! All commands talk to the outside world through a [`Host`], so tests can capture their
//! output and exit requests.

mod fetch;
mod host;
mod init;
mod run;
mod validate;

pub use fetch::{FetchArgs, LogLevel, fetch, fetch_with};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
