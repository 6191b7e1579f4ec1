//! Shared range-sync domain primitives.
//!
//! This crate owns the invocation contract, range feed extraction, and
//! ingress rule construction. It intentionally excludes AWS SDK, HTTP
//! client, and Lambda runtime concerns.

pub mod contract;
pub mod feed;
pub mod rules;
