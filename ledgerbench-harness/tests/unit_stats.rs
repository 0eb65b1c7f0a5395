use ledgerbench_harness::stats::{percentile, LatencyReport};
use std::time::Duration;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn test_ten_step_samples() {
    // [10ms..100ms] in steps of 10ms, n=10
    // p50: index floor(0.50 * 10) = 5 → 60ms
    // p95: index floor(0.95 * 10) = 9 → 100ms
    let samples: Vec<Duration> = (1..=10).map(|i| ms(i * 10)).collect();
    let r = LatencyReport::from_samples(&samples, true);

    assert_eq!(r.count, 10);
    assert_eq!(r.min, ms(10));
    assert_eq!(r.max, ms(100));
    assert_eq!(r.mean, ms(55));
    assert_eq!(r.total, ms(550));
    assert_eq!(r.p50, ms(60));
    assert_eq!(r.p95, ms(100));
    assert_eq!(r.p99, ms(100));
    assert_eq!(r.p999, ms(100));
}

#[test]
fn test_ordering_invariants() {
    let samples = vec![ms(7), ms(3), ms(250), ms(3), ms(41), ms(12), ms(99), ms(1), ms(18)];
    let r = LatencyReport::from_samples(&samples, true);

    assert!(r.min <= r.mean && r.mean <= r.max);
    assert!(r.min <= r.p50);
    assert!(r.p50 <= r.p95);
    assert!(r.p95 <= r.p99);
    assert!(r.p99 <= r.p999);
    assert!(r.p999 <= r.max);
}

#[test]
fn test_single_sample() {
    let x = Duration::from_micros(1234);
    let r = LatencyReport::from_samples(&[x], true);

    assert_eq!(r.count, 1);
    for value in [r.min, r.max, r.mean, r.total, r.p50, r.p95, r.p99, r.p999] {
        assert_eq!(value, x);
    }
    assert_eq!(r.retained_samples, vec![x]);
}

#[test]
fn test_empty_is_zero_report() {
    let r = LatencyReport::from_samples(&[], true);
    assert_eq!(r, LatencyReport::default());
    assert_eq!(r.count, 0);
    assert_eq!(r.mean, Duration::ZERO);
    assert_eq!(r.p999, Duration::ZERO);
    assert!(!r.has_data());
    assert_eq!(r.throughput_ops(), 0.0);
}

#[test]
fn test_permutation_gives_identical_report() {
    let forward: Vec<Duration> = (1..=37).map(|i| Duration::from_micros(i * i * 13)).collect();
    let mut reversed = forward.clone();
    reversed.reverse();
    let mut interleaved: Vec<Duration> = forward.iter().step_by(2).copied().collect();
    interleaved.extend(forward.iter().skip(1).step_by(2).copied());

    let a = LatencyReport::from_samples(&forward, true);
    assert_eq!(a, LatencyReport::from_samples(&reversed, true));
    assert_eq!(a, LatencyReport::from_samples(&interleaved, true));
}

#[test]
fn test_mean_truncates_nanoseconds() {
    // 1ns + 2ns = 3ns over 2 samples → 1ns, not 1.5ns
    let r = LatencyReport::from_samples(&[Duration::from_nanos(1), Duration::from_nanos(2)], false);
    assert_eq!(r.mean, Duration::from_nanos(1));
}

#[test]
fn test_percentiles_disabled_keeps_median_only() {
    let samples: Vec<Duration> = (1..=10).map(|i| ms(i * 10)).collect();
    let r = LatencyReport::from_samples(&samples, false);

    assert_eq!(r.p50, ms(60));
    assert_eq!(r.p95, Duration::ZERO);
    assert_eq!(r.p99, Duration::ZERO);
    assert_eq!(r.p999, Duration::ZERO);
    assert!(r.retained_samples.is_empty());
    assert_eq!(r.mean, ms(55));
}

#[test]
fn test_retained_samples_are_sorted_copy() {
    let samples = vec![ms(5), ms(1), ms(3)];
    let r = LatencyReport::from_samples(&samples, true);
    assert_eq!(r.retained_samples, vec![ms(1), ms(3), ms(5)]);
    // Input is left untouched.
    assert_eq!(samples, vec![ms(5), ms(1), ms(3)]);
}

#[test]
fn test_duplicates_and_zero_samples() {
    let r = LatencyReport::from_samples(&[Duration::ZERO, Duration::ZERO, ms(4), ms(4)], true);
    assert_eq!(r.min, Duration::ZERO);
    assert_eq!(r.p50, ms(4));
    assert_eq!(r.mean, ms(2));
}

#[test]
fn test_percentile_clamps_to_last() {
    let sorted = vec![ms(1), ms(2), ms(3)];
    assert_eq!(percentile(&sorted, 0.0), ms(1));
    assert_eq!(percentile(&sorted, 0.5), ms(2));
    assert_eq!(percentile(&sorted, 1.0), ms(3));
    assert_eq!(percentile(&[], 0.5), Duration::ZERO);
}

#[test]
fn test_throughput() {
    // 4 samples totalling 2s → 2 ops/s
    let r = LatencyReport::from_samples(&[ms(500); 4], false);
    assert_eq!(r.throughput_ops(), 2.0);
}
