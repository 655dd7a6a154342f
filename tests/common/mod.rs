//! Shared test utilities for taskdesk
//!
//! - File-backed databases in temporary directories
//! - Request builders and response helpers for driving the router

pub mod fixtures;
pub mod http;
