//! Output for fetched records
//!
//! Two generators are provided, each accessed through a `generate` function writing into a
//! `core::fmt::Write`:
//! - **JSON**: the full record list, pretty-printed, for downstream rendering
//! - **Console**: a one-line-per-record summary for humans
//!
//! [`WeightFilter`] narrows the record list before either generator runs.

mod console;
mod filter;
mod json;

pub use console::generate as generate_console;
pub use filter::WeightFilter;
pub use json::generate as generate_json;
pub use json::write_file as write_json_file;
