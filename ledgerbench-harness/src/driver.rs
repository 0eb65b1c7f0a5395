use ledgerbench_client::IndexSetup;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::collector::SampleCollector;
use crate::config::{BenchConfig, IndexPerfConfig, SLOW_ADDRESS_QUERY, SLOW_HASH_QUERY};
use crate::corpus::{Corpus, TEST_ADDRESSES};
use crate::error::{HarnessError, Result};
use crate::stats::LatencyReport;
use crate::store::DataStore;
use crate::workload::Category;
use ledgerbench_common::{Lookup, Transfer};

/// A well-formed transaction hash that no generated transfer carries.
pub const MISSING_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Timed queries of one category plus the rows they returned.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryResult {
    pub category: Category,
    pub report: LatencyReport,
    pub records_returned: u64,
}

impl CategoryResult {
    pub fn avg_records_per_query(&self) -> f64 {
        if self.report.count == 0 {
            return 0.0;
        }
        self.records_returned as f64 / self.report.count as f64
    }

    /// Mean above the point where the lookup is probably a full scan.
    pub fn is_slow(&self) -> bool {
        let threshold = match self.category {
            Category::Hash => SLOW_HASH_QUERY,
            Category::From | Category::To => SLOW_ADDRESS_QUERY,
            Category::Block => return false,
        };
        self.report.mean > threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Untimed queries issued before the first timed one.
    pub warmup: usize,
    pub enable_percentiles: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { warmup: 0, enable_percentiles: true }
    }
}

/// Await `fut` and return its output with the wall time it took.
pub async fn timed<F: Future>(fut: F) -> (F::Output, Duration) {
    let start = Instant::now();
    let output = fut.await;
    (output, start.elapsed())
}

/// True at every tenth of `total` and on the last iteration.
pub fn should_report(done: usize, total: usize) -> bool {
    let step = (total / 10).max(1);
    done == total || done % step == 0
}

fn lookup_for(corpus: &Corpus, category: Category, i: usize) -> Result<Lookup> {
    corpus.lookup(category, i).ok_or_else(|| {
        HarnessError::Config(format!(
            "{} queries need transfers but the corpus is empty",
            category.as_name()
        ))
    })
}

/// Issue `count` queries of `category` one at a time and time each call.
///
/// Warmup queries run first and are neither timed nor counted. Queries that
/// match nothing are ordinary samples; the first store error aborts the run.
pub async fn run_category<S: DataStore + ?Sized>(
    store: &S,
    corpus: &Corpus,
    category: Category,
    count: usize,
    opts: RunOptions,
) -> Result<CategoryResult> {
    for i in 0..opts.warmup {
        let lookup = lookup_for(corpus, category, i)?;
        store.query_by_exact_match(&lookup).await?;
    }
    if opts.warmup > 0 {
        debug!(category = category.as_name(), queries = opts.warmup, "warmup done");
    }

    let mut collector = SampleCollector::with_capacity(count);
    let mut records_returned = 0u64;

    for i in 0..count {
        let lookup = lookup_for(corpus, category, i)?;
        let (outcome, elapsed) = timed(store.query_by_exact_match(&lookup)).await;
        let rows = outcome?;

        collector.record(elapsed);
        records_returned += rows.len() as u64;

        let done = i + 1;
        if done == 1 {
            debug!(category = category.as_name(), ?elapsed, rows = rows.len(), "first query");
        }
        if should_report(done, count) {
            info!(category = category.as_name(), done, total = count, "progress");
        }
    }

    let result = CategoryResult {
        category,
        report: LatencyReport::from_samples(collector.snapshot(), opts.enable_percentiles),
        records_returned,
    };
    if result.is_slow() {
        warn!(
            category = category.as_name(),
            mean = ?result.report.mean,
            "queries are slow; secondary indexes may not be in use"
        );
    }
    Ok(result)
}

/// Run each `(category, count)` of `plan` in order.
pub async fn run_queries<S: DataStore + ?Sized>(
    store: &S,
    corpus: &Corpus,
    plan: &[(Category, usize)],
    opts: RunOptions,
) -> Result<Vec<CategoryResult>> {
    let mut results = Vec::with_capacity(plan.len());
    for &(category, count) in plan {
        info!(category = category.as_name(), queries = count, "running queries");
        results.push(run_category(store, corpus, category, count, opts).await?);
    }
    Ok(results)
}

/// Outcome of loading a corpus into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InsertStats {
    pub records: usize,
    pub elapsed: Duration,
}

impl InsertStats {
    /// Records per second; 0 when nothing was timed.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.records as f64 / secs
    }

    pub fn per_record(&self) -> Duration {
        match u32::try_from(self.records) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.elapsed / n,
        }
    }
}

/// Insert the whole corpus in one timed call.
pub async fn load_corpus<S: DataStore + ?Sized>(store: &S, corpus: &Corpus) -> Result<InsertStats> {
    info!(records = corpus.len(), "inserting corpus");
    let (outcome, elapsed) = timed(store.insert_batch(corpus.transfers())).await;
    outcome?;
    let stats = InsertStats { records: corpus.len(), elapsed };
    info!(records = stats.records, ?elapsed, rate = stats.rate(), "insert complete");
    Ok(stats)
}

/// Insert the corpus one block at a time, timing each block as one sample.
pub async fn load_by_block<S: DataStore + ?Sized>(
    store: &S,
    corpus: &Corpus,
    enable_percentiles: bool,
) -> Result<(InsertStats, LatencyReport)> {
    let total_blocks = corpus.blocks().count();
    let mut collector = SampleCollector::with_capacity(total_blocks);
    let mut stats = InsertStats::default();

    for (i, block) in corpus.blocks().enumerate() {
        let (outcome, elapsed) = timed(store.insert_batch(block)).await;
        outcome?;
        collector.record(elapsed);
        stats.records += block.len();
        stats.elapsed += elapsed;

        if should_report(i + 1, total_blocks) {
            info!(blocks = i + 1, total = total_blocks, records = stats.records, "inserting blocks");
        }
    }

    Ok((stats, LatencyReport::from_samples(collector.snapshot(), enable_percentiles)))
}

/// A count query's answer and how long it took.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimedCount {
    pub value: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountTimings {
    pub by_from: TimedCount,
    pub by_to: TimedCount,
    pub all: TimedCount,
}

/// Time count-by-from and count-by-to on the first two test addresses, then count-all.
pub async fn time_counts<S: DataStore + ?Sized>(store: &S) -> Result<CountTimings> {
    let by_from = Lookup::From(TEST_ADDRESSES[0].to_string());
    let by_to = Lookup::To(TEST_ADDRESSES[1].to_string());

    let (value, elapsed) = timed(store.count_matching(&by_from)).await;
    let by_from = TimedCount { value: value?, elapsed };
    let (value, elapsed) = timed(store.count_matching(&by_to)).await;
    let by_to = TimedCount { value: value?, elapsed };
    let (value, elapsed) = timed(store.count_all()).await;
    let all = TimedCount { value: value?, elapsed };

    Ok(CountTimings { by_from, by_to, all })
}

/// Count timings taken when the table already held rows, so indexes could not
/// be created by this run and may or may not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExistingDataCheck {
    /// Count by `MISSING_HASH`; fast only if `transactionHash` is indexed.
    pub missing_hash: TimedCount,
    /// Count by the first test address; fast only if `fromAddr` is indexed.
    pub by_from: TimedCount,
}

impl ExistingDataCheck {
    pub fn hash_is_slow(&self) -> bool {
        self.missing_hash.elapsed > SLOW_HASH_QUERY
    }

    pub fn from_is_slow(&self) -> bool {
        self.by_from.elapsed > SLOW_ADDRESS_QUERY
    }
}

/// Time a hash count and an address count against the existing rows.
pub async fn check_existing_data<S: DataStore + ?Sized>(store: &S) -> Result<ExistingDataCheck> {
    let (value, elapsed) =
        timed(store.count_matching(&Lookup::Hash(MISSING_HASH.to_string()))).await;
    let missing_hash = TimedCount { value: value?, elapsed };
    let (value, elapsed) =
        timed(store.count_matching(&Lookup::From(TEST_ADDRESSES[0].to_string()))).await;
    let by_from = TimedCount { value: value?, elapsed };

    let check = ExistingDataCheck { missing_hash, by_from };
    if check.hash_is_slow() {
        warn!(
            elapsed = ?missing_hash.elapsed,
            "hash count is slow; transactionHash may not be indexed"
        );
    }
    if check.from_is_slow() {
        warn!(elapsed = ?by_from.elapsed, "address count is slow; fromAddr may not be indexed");
    }
    Ok(check)
}

/// The newest row and how long fetching it took.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimedRecord {
    pub record: Option<(u64, Transfer)>,
    pub elapsed: Duration,
}

/// Everything one fixed-count pass measured.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub index_setup: IndexSetup,
    /// Present only when indexes were skipped because the table held rows.
    pub existing_data: Option<ExistingDataCheck>,
    pub insert: InsertStats,
    pub last_record: TimedRecord,
    pub categories: Vec<CategoryResult>,
    pub counts: CountTimings,
}

impl BenchmarkReport {
    pub fn category(&self, category: Category) -> Option<&CategoryResult> {
        self.categories.iter().find(|r| r.category == category)
    }
}

/// Fixed-count pass: prepare the table, load `corpus`, fetch the newest row,
/// time every query category and finally the count queries.
pub async fn run_benchmark<S: DataStore + ?Sized>(
    store: &S,
    config: &BenchConfig,
    corpus: &Corpus,
    with_indexes: bool,
) -> Result<BenchmarkReport> {
    config.validate()?;

    let index_setup = store.create_table(with_indexes).await?;
    log_index_setup(&index_setup);
    let existing_data = match index_setup {
        IndexSetup::SkippedNonEmpty { .. } => Some(check_existing_data(store).await?),
        _ => None,
    };

    let insert = load_corpus(store, corpus).await?;
    let (record, elapsed) = timed(store.last_record()).await;
    let last_record = TimedRecord { record: record?, elapsed };
    debug!(?elapsed, "fetched newest row");

    let opts = RunOptions {
        warmup: config.warmup_queries,
        enable_percentiles: config.enable_percentiles,
    };
    let categories = run_queries(store, corpus, &config.plan(), opts).await?;
    let counts = time_counts(store).await?;

    Ok(BenchmarkReport { index_setup, existing_data, insert, last_record, categories, counts })
}

/// Everything the mixed read workload measured.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPerfReport {
    pub index_setup: IndexSetup,
    pub insert: InsertStats,
    /// One sample per inserted block.
    pub block_inserts: LatencyReport,
    pub categories: Vec<CategoryResult>,
}

/// Mixed read workload: load `corpus` block by block into an indexed table,
/// then split `read_count` reads across categories by the configured mix.
pub async fn run_index_perf<S: DataStore + ?Sized>(
    store: &S,
    config: &IndexPerfConfig,
    corpus: &Corpus,
) -> Result<IndexPerfReport> {
    config.validate()?;

    let index_setup = store.create_table(true).await?;
    log_index_setup(&index_setup);

    let (insert, block_inserts) = load_by_block(store, corpus, config.enable_percentiles).await?;
    let opts = RunOptions { warmup: 0, enable_percentiles: config.enable_percentiles };
    let categories = run_queries(store, corpus, &config.mix.split(config.read_count), opts).await?;

    Ok(IndexPerfReport { index_setup, insert, block_inserts, categories })
}

fn log_index_setup(setup: &IndexSetup) {
    match setup {
        IndexSetup::NotRequested => info!("table ready without secondary indexes"),
        IndexSetup::Created { ready, failed } if failed.is_empty() => {
            info!(indexes = ready, "table ready with secondary indexes")
        }
        IndexSetup::Created { ready, failed } => {
            warn!(indexes = ready, ?failed, "some secondary indexes could not be created")
        }
        IndexSetup::SkippedNonEmpty { rows } => {
            warn!(rows, "table already holds rows; secondary indexes were not created")
        }
    }
}
