//! Benchmark utilities for the subscription registry.
//!
//! This crate provides benchmarking infrastructure for `rusty_bus`, including:
//!
//! - **Microbenchmarks**: Individual registry operations (subscribe, publish, unsubscribe)
//! - **Scenario benchmarks**: Seeded workloads mixing all operations (fanout, churn)
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_bus_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_bus_bench -- publish
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod fixture;
pub mod scenarios;
