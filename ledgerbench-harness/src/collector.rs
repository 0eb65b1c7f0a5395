use std::time::Duration;

/// Raw latency observations for one query category during a single pass.
///
/// Append-only; the statistics engine consumes a snapshot once the pass ends.
#[derive(Debug, Clone, Default)]
pub struct SampleCollector {
    samples: Vec<Duration>,
}

impl SampleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: Vec::with_capacity(capacity) }
    }

    /// Append one observation. Zero durations are valid.
    pub fn record(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    /// Samples recorded so far, in insertion order.
    pub fn snapshot(&self) -> &[Duration] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
