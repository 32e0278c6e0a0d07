//! Domain types used throughout both pipelines.
//!
//! This module defines:
//!
//! - the analysis configuration document (`AnalysisConfig`, `Element`, `Parameter`)
//! - time-of-arrival rows and series (`ToaRecord`, `ToaSeries`)
//! - the simulation request (`SimulationRequest`, `PowerLaw`)

pub mod types;

pub use types::*;
