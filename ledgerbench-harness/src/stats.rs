use std::time::Duration;

/// Summary statistics over one sample set.
///
/// The all-zero value (`LatencyReport::default()`) is the report for an empty
/// sample set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyReport {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub total: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub p999: Duration,
    /// Sorted copy of the samples; empty unless percentiles were enabled.
    pub retained_samples: Vec<Duration>,
}

impl LatencyReport {
    /// Build a report from `samples` (any order).
    ///
    /// With `enable_percentiles` off only the median is filled in and the
    /// sorted samples are not retained, which keeps large runs cheap.
    pub fn from_samples(samples: &[Duration], enable_percentiles: bool) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let count = sorted.len();
        let total: Duration = sorted.iter().sum();
        let mean_nanos = total.as_nanos() / count as u128;

        let mut report = Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: Duration::from_nanos(u64::try_from(mean_nanos).unwrap_or(u64::MAX)),
            total,
            p50: percentile(&sorted, 0.50),
            ..Self::default()
        };

        if enable_percentiles {
            report.p95 = percentile(&sorted, 0.95);
            report.p99 = percentile(&sorted, 0.99);
            report.p999 = percentile(&sorted, 0.999);
            report.retained_samples = sorted;
        }

        report
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }

    /// Operations per second of accumulated latency; 0 when nothing was timed.
    pub fn throughput_ops(&self) -> f64 {
        let secs = self.total.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.count as f64 / secs
    }
}

/// Nearest-rank percentile with truncation: the element at index
/// `floor(p * n)`, clamped to the last element. `sorted` must be ascending.
/// Returns zero for an empty slice.
pub fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = (p * sorted.len() as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
