#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for contribkit
//!
//! This library consolidates all functionality for the contribkit tool, which collects
//! sponsorship and contribution signals from external services and turns them into a
//! normalized list of weighted records.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`config`]: Configuration file and environment overlay
//! - [`providers`]: Data sources and the weighted record model they produce
//! - [`reports`]: Output writing and filtering

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod commands;
pub mod config;
pub mod providers;
pub mod reports;

pub use crate::commands::{Host, run};
