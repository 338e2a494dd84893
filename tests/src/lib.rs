//! # Harvest-Chain Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── lifecycle_benchmarks.rs  # Engine throughput
//! └── src/
//!     └── integration/
//!         ├── lifecycle_flows.rs   # Registry + engine + bus, end to end
//!         └── properties.rs        # Property tests over random inputs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p hc-tests
//!
//! # By category
//! cargo test -p hc-tests integration::lifecycle_flows
//! cargo test -p hc-tests integration::properties
//!
//! # Benchmarks
//! cargo bench -p hc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
