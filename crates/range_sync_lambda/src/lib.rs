//! AWS-oriented adapters and handler for security group range sync.
//!
//! This crate owns runtime integration details (the Lambda entry point, the
//! HTTP range feed, and the EC2 firewall adapter) and exposes a single
//! runtime module boundary for contract, feed, and rule primitives.

pub mod adapters;
pub mod handlers;
pub mod runtime;
