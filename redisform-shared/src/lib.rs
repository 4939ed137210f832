//! # redisform Shared Library
//!
//! This crate contains the Redis plumbing shared by the provider and the
//! command-line host.
//!
//! ## Module Organization
//!
//! - `redis`: Redis client, client configuration, and the command backend seam

pub mod redis;

/// Current version of the redisform shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
