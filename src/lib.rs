//! `pulsim` library crate.
//!
//! Two pipelines for pulsar-timing workflows:
//!
//! - `config`: TempoNest-style JSON analysis configuration builder
//! - `sim`: synthetic residual simulator (per-frequency synthesis, merge, noise
//!   injection) driven through a pluggable `backend::TimingBackend`
//!
//! The binary (`pulsim`) is a thin wrapper around this library so the
//! pipelines are testable without spawning processes.

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod sim;
