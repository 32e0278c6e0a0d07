//! Caller-owned record of the most recent successful run.

use crate::domain::{SimulationRequest, ToaSeries};

/// Everything a completed run produced.
#[derive(Debug)]
pub struct SessionRun<P> {
    pub pulsar: P,
    pub series: ToaSeries,
    pub request: SimulationRequest,
}

/// Holds the latest combined pulsar so a later export can write it.
///
/// Starts empty and is only ever replaced wholesale.
#[derive(Debug)]
pub struct SimulatorSession<P> {
    run: Option<SessionRun<P>>,
}

impl<P> Default for SimulatorSession<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SimulatorSession<P> {
    pub fn new() -> Self {
        Self { run: None }
    }

    pub fn has_run(&self) -> bool {
        self.run.is_some()
    }

    pub fn run(&self) -> Option<&SessionRun<P>> {
        self.run.as_ref()
    }

    pub fn pulsar(&self) -> Option<&P> {
        self.run.as_ref().map(|r| &r.pulsar)
    }

    pub fn series(&self) -> Option<&ToaSeries> {
        self.run.as_ref().map(|r| &r.series)
    }

    /// Swap in a new run, returning the previous one.
    pub fn replace(&mut self, run: SessionRun<P>) -> Option<SessionRun<P>> {
        self.run.replace(run)
    }
}
