//! Input/output helpers.
//!
//! - export bundle: par/tim/plot/summary zipped together (`archive`)
//! - run-summary text file (`summary`)
//! - combined series as CSV (`export`)

pub mod archive;
pub mod export;
pub mod summary;

pub use archive::*;
pub use export::*;
pub use summary::*;
