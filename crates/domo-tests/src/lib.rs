//! Integration tests for the device inventory server
//!
//! This crate contains end-to-end tests that exercise the full stack:
//! - HTTP API layer
//! - Inventory store and naming engine
//! - Import / export and maintenance flows
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p domo-tests
//! ```
//!
//! Each test starts the router on an ephemeral port, so tests are fully
//! independent and can run in parallel.
//!
//! # Test Structure
//!
//! - `api_test.rs` - REST API tests against an in-process server

// This crate only contains tests, no library code
