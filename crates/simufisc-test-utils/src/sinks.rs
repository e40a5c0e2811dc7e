//! Recording sinks for observing progress streams and results in tests.

use std::sync::{Arc, Mutex};

use simufisc_core::error::EngineResult;
use simufisc_core::models::{ProgressEvent, SimulationResults};
use simufisc_core::traits::{ProgressSink, ResultSink};

/// Progress sink recording every delivered event.
///
/// Clone-friendly handle: keep one copy, hand the other to the
/// broadcaster, inspect afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl RecordingProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("recording sink lock poisoned").clone()
    }

    /// Progress values of recorded snapshots, in delivery order.
    pub fn progress_values(&self) -> Vec<u8> {
        self.events()
            .iter()
            .filter_map(|e| e.snapshot().map(|s| s.progress))
            .collect()
    }
}

impl ProgressSink for RecordingProgressSink {
    fn publish(&mut self, event: &ProgressEvent) -> EngineResult<()> {
        self.events
            .lock()
            .expect("recording sink lock poisoned")
            .push(event.clone());
        Ok(())
    }
}

/// Result sink keeping every persisted results value.
#[derive(Debug, Clone, Default)]
pub struct CollectingResultSink {
    results: Arc<Mutex<Vec<SimulationResults>>>,
}

impl CollectingResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persisted(&self) -> Vec<SimulationResults> {
        self.results
            .lock()
            .expect("collecting sink lock poisoned")
            .clone()
    }
}

impl ResultSink for CollectingResultSink {
    fn persist(&mut self, results: &SimulationResults) -> EngineResult<()> {
        self.results
            .lock()
            .expect("collecting sink lock poisoned")
            .push(results.clone());
        Ok(())
    }
}
