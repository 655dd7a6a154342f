//! Integration tests for taskdesk
//!
//! These tests drive the library through its public API and the HTTP router.

#[path = "../common/mod.rs"]
pub mod common;

pub mod http_flow;
pub mod persistence;
