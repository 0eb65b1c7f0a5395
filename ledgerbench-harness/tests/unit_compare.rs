use async_trait::async_trait;
use ledgerbench_client::IndexSetup;
use ledgerbench_common::{Lookup, Result, Transfer};
use ledgerbench_harness::compare::{
    aggregate_speedup, run_index_comparison, speedup, Comparison, TimingComparison, Verdict,
};
use ledgerbench_harness::config::BenchConfig;
use ledgerbench_harness::corpus::{random_transfers, Corpus};
use ledgerbench_harness::driver::CategoryResult;
use ledgerbench_harness::stats::LatencyReport;
use ledgerbench_harness::store::DataStore;
use ledgerbench_harness::workload::Category;
use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn result_with_mean(category: Category, mean: Duration) -> CategoryResult {
    let samples = if mean.is_zero() { vec![] } else { vec![mean; 4] };
    CategoryResult {
        category,
        report: LatencyReport::from_samples(&samples, true),
        records_returned: 0,
    }
}

#[test]
fn test_twice_as_fast_is_significant() {
    let c = Comparison::new(
        result_with_mean(Category::Hash, ms(100)),
        result_with_mean(Category::Hash, ms(50)),
    )
    .unwrap();
    assert_eq!(c.speedup, Some(2.0));
    assert_eq!(c.verdict, Verdict::Significant);
    assert!(!c.is_slower());
}

#[test]
fn test_zero_variant_is_insufficient_data() {
    let c = Comparison::new(
        result_with_mean(Category::From, ms(100)),
        result_with_mean(Category::From, Duration::ZERO),
    )
    .unwrap();
    assert_eq!(c.speedup, None);
    assert_eq!(c.verdict, Verdict::InsufficientData);
    assert!(!c.is_slower());

    assert_eq!(speedup(Duration::ZERO, ms(5)), None);
}

#[test]
fn test_slower_variant_is_not_clamped() {
    let c = Comparison::new(
        result_with_mean(Category::To, ms(100)),
        result_with_mean(Category::To, ms(120)),
    )
    .unwrap();
    let s = c.speedup.unwrap();
    assert!((s - 0.8333).abs() < 1e-3, "speedup {s}");
    assert_eq!(c.verdict, Verdict::NoImprovement);
    assert!(c.is_slower());
}

#[test]
fn test_mismatched_categories_do_not_pair() {
    let c = Comparison::new(
        result_with_mean(Category::Hash, ms(100)),
        result_with_mean(Category::Block, ms(50)),
    );
    assert!(c.is_none());
}

#[test]
fn test_classification_boundaries() {
    assert_eq!(Verdict::classify(Some(1.51)), Verdict::Significant);
    assert_eq!(Verdict::classify(Some(1.5)), Verdict::Modest);
    assert_eq!(Verdict::classify(Some(1.11)), Verdict::Modest);
    assert_eq!(Verdict::classify(Some(1.1)), Verdict::NoImprovement);
    assert_eq!(Verdict::classify(Some(1.0)), Verdict::NoImprovement);
    assert_eq!(Verdict::classify(None), Verdict::InsufficientData);
    assert_eq!(Verdict::InsufficientData.describe(), "insufficient data");
}

#[test]
fn test_aggregate_skips_insufficient_data() {
    let pair = |category, baseline, variant| {
        Comparison::new(result_with_mean(category, baseline), result_with_mean(category, variant))
            .unwrap()
    };
    let comparisons = vec![
        pair(Category::Hash, ms(100), ms(50)),
        pair(Category::From, ms(40), ms(40)),
        pair(Category::To, ms(10), Duration::ZERO),
    ];
    // (2.0 + 1.0) / 2
    assert_eq!(aggregate_speedup(&comparisons), Some(1.5));
    assert_eq!(aggregate_speedup(&comparisons[2..]), None);
    assert_eq!(aggregate_speedup(&[]), None);
}

#[test]
fn test_timing_comparison() {
    let t = TimingComparison::new(ms(30), ms(10));
    assert_eq!(t.speedup, Some(3.0));
    assert_eq!(t.verdict, Verdict::Significant);
    assert!(TimingComparison::new(ms(10), ms(30)).is_slower());
}

/// Queries sleep for `indexed_delay` or `unindexed` depending on how the
/// table was last created.
struct DelayStore {
    indexed: Mutex<bool>,
    tables_created: Mutex<Vec<bool>>,
    unindexed: Duration,
    indexed_delay: Duration,
}

#[async_trait]
impl DataStore for DelayStore {
    async fn create_table(&self, with_indexes: bool) -> Result<IndexSetup> {
        *self.indexed.lock() = with_indexes;
        self.tables_created.lock().push(with_indexes);
        Ok(if with_indexes {
            IndexSetup::Created { ready: 4, failed: vec![] }
        } else {
            IndexSetup::NotRequested
        })
    }

    async fn remove_table(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_batch(&self, _records: &[Transfer]) -> Result<()> {
        Ok(())
    }

    async fn query_by_exact_match(&self, _lookup: &Lookup) -> Result<Vec<Transfer>> {
        let delay = if *self.indexed.lock() { self.indexed_delay } else { self.unindexed };
        tokio::time::sleep(delay).await;
        Ok(vec![])
    }

    async fn count_matching(&self, _lookup: &Lookup) -> Result<u64> {
        Ok(0)
    }

    async fn count_all(&self) -> Result<u64> {
        Ok(0)
    }

    async fn last_record(&self) -> Result<Option<(u64, Transfer)>> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_index_comparison_runs_variant_first() {
    let store = DelayStore {
        indexed: Mutex::new(false),
        tables_created: Mutex::new(vec![]),
        unindexed: ms(20),
        indexed_delay: ms(1),
    };
    let config = BenchConfig {
        transaction_count: 10,
        hash_queries: 3,
        from_queries: 3,
        to_queries: 3,
        block_queries: 3,
        warmup_queries: 0,
        ..BenchConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let corpus = Corpus::new(random_transfers(&mut rng, 10, 1, 100, 0));

    let summary = run_index_comparison(&store, &config, &corpus, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(*store.tables_created.lock(), vec![true, false]);
    assert_eq!(summary.categories.len(), 4);
    for c in &summary.categories {
        assert!(c.speedup.unwrap() > 1.0, "{:?} speedup {:?}", c.category, c.speedup);
        assert!(c.baseline.report.mean >= ms(20));
    }
    assert!(summary.aggregate.unwrap() > 1.0);
}
