//! # Ringlog Simulation
//!
//! Workload driver for the `ringlog-core` object log.
//!
//! ## Overview
//!
//! - **Config** (`config.rs`): Workload settings, loadable from JSON
//! - **Hexdump** (`hexdump.rs`): Raw storage dumps, 32 bytes per line
//! - **Integrity** (`integrity.rs`): Walks the fragment chain and checks it
//!   against the log's bookkeeping
//! - **Workload** (`workload.rs`): Randomized string and ring workloads
//! - **Scenarios** (`scenarios.rs`): Fixed demonstrations
//!
//! ## Example
//!
//! ```rust
//! use ringlog_simulation::{WorkloadConfig, run_string_workload};
//!
//! let config = WorkloadConfig {
//!     writes: 20,
//!     ..WorkloadConfig::fragmented()
//! };
//! let report = run_string_workload(&config).unwrap();
//! assert_eq!(report.written, 23);
//! ```

pub mod config;
pub mod hexdump;
pub mod integrity;
pub mod scenarios;
pub mod workload;

pub use config::WorkloadConfig;
pub use hexdump::hexdump;
pub use integrity::{IntegrityError, IntegrityReport, check_integrity};
pub use workload::{RingReport, StringReport, run_ring_workload, run_string_workload};
