//! Note sinks that do not need a synthesizer.

use boing_core::{NoteBatch, NoteSink};
use tracing::info;

/// Logs every batch instead of sending it anywhere.
#[derive(Debug, Default)]
pub struct LogSink {
    emitted: u64,
}

impl LogSink {
    /// Number of batches seen so far.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl NoteSink for LogSink {
    fn emit(&mut self, batch: &NoteBatch) {
        self.emitted += 1;
        info!(population = %batch.population, pitches = ?batch.pitches, "play");
    }
}
