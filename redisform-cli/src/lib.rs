//! # redisform CLI
//!
//! Command-line host for the redisform provider. It reads declared
//! attributes or recorded state as JSON, runs one resource operation, and
//! prints the resulting state as JSON.
//!
//! ## Modules
//!
//! - `cli`: argument parsing
//! - `config`: layered configuration (file, environment, flags)
//! - `app`: command execution
//! - `diagnostics`: error rendering

pub mod app;
pub mod cli;
pub mod config;
pub mod diagnostics;
