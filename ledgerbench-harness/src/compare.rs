//! With-index versus without-index comparison.

use std::time::Duration;
use tracing::info;

use crate::config::BenchConfig;
use crate::corpus::Corpus;
use crate::driver::{run_benchmark, BenchmarkReport, CategoryResult, InsertStats};
use crate::error::Result;
use crate::store::DataStore;
use crate::workload::Category;

/// Speedups above this are a significant improvement.
pub const SIGNIFICANT_SPEEDUP: f64 = 1.5;

/// Speedups above this (up to `SIGNIFICANT_SPEEDUP`) are a modest improvement.
pub const MODEST_SPEEDUP: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Significant,
    Modest,
    NoImprovement,
    /// One of the two means was zero, so no ratio exists.
    InsufficientData,
}

impl Verdict {
    pub fn classify(speedup: Option<f64>) -> Self {
        match speedup {
            None => Verdict::InsufficientData,
            Some(s) if s > SIGNIFICANT_SPEEDUP => Verdict::Significant,
            Some(s) if s > MODEST_SPEEDUP => Verdict::Modest,
            Some(_) => Verdict::NoImprovement,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Verdict::Significant => "significant improvement",
            Verdict::Modest => "modest improvement",
            Verdict::NoImprovement => "no meaningful improvement",
            Verdict::InsufficientData => "insufficient data",
        }
    }
}

/// `baseline / variant`, or `None` when either is zero.
pub fn speedup(baseline: Duration, variant: Duration) -> Option<f64> {
    if baseline.is_zero() || variant.is_zero() {
        return None;
    }
    Some(baseline.as_nanos() as f64 / variant.as_nanos() as f64)
}

/// One category measured under both configurations.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub category: Category,
    pub baseline: CategoryResult,
    pub variant: CategoryResult,
    pub speedup: Option<f64>,
    pub verdict: Verdict,
}

impl Comparison {
    /// Pair two results of the same category; `None` if the categories differ.
    pub fn new(baseline: CategoryResult, variant: CategoryResult) -> Option<Self> {
        if baseline.category != variant.category {
            return None;
        }
        let speedup = speedup(baseline.report.mean, variant.report.mean);
        Some(Self {
            category: baseline.category,
            baseline,
            variant,
            speedup,
            verdict: Verdict::classify(speedup),
        })
    }

    /// The variant took longer than the baseline.
    pub fn is_slower(&self) -> bool {
        self.speedup.is_some_and(|s| s < 1.0)
    }
}

/// A single timed operation under both configurations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingComparison {
    pub baseline: Duration,
    pub variant: Duration,
    pub speedup: Option<f64>,
    pub verdict: Verdict,
}

impl TimingComparison {
    pub fn new(baseline: Duration, variant: Duration) -> Self {
        let speedup = speedup(baseline, variant);
        Self { baseline, variant, speedup, verdict: Verdict::classify(speedup) }
    }

    pub fn is_slower(&self) -> bool {
        self.speedup.is_some_and(|s| s < 1.0)
    }
}

/// Mean of the defined ratios; `None` when no category had data.
pub fn aggregate_speedup(comparisons: &[Comparison]) -> Option<f64> {
    let ratios: Vec<f64> = comparisons.iter().filter_map(|c| c.speedup).collect();
    if ratios.is_empty() {
        return None;
    }
    Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub categories: Vec<Comparison>,
    pub aggregate: Option<f64>,
    pub count_by_from: TimingComparison,
    pub baseline_insert: InsertStats,
    pub variant_insert: InsertStats,
}

impl ComparisonSummary {
    pub fn aggregate_verdict(&self) -> Verdict {
        Verdict::classify(self.aggregate)
    }
}

/// Pair up the categories both passes measured.
pub fn compare_reports(baseline: &BenchmarkReport, variant: &BenchmarkReport) -> ComparisonSummary {
    let categories: Vec<Comparison> = Category::ALL
        .iter()
        .filter_map(|&category| {
            let b = baseline.category(category)?;
            let v = variant.category(category)?;
            Comparison::new(b.clone(), v.clone())
        })
        .collect();

    ComparisonSummary {
        aggregate: aggregate_speedup(&categories),
        categories,
        count_by_from: TimingComparison::new(
            baseline.counts.by_from.elapsed,
            variant.counts.by_from.elapsed,
        ),
        baseline_insert: baseline.insert,
        variant_insert: variant.insert,
    }
}

/// Run the fixed-count workload with indexes, then without, on a fresh table
/// each time, and compare the two.
///
/// `settle` is slept between the passes so the ledger can finish background
/// work from the first one.
pub async fn run_index_comparison<S: DataStore + ?Sized>(
    store: &S,
    config: &BenchConfig,
    corpus: &Corpus,
    settle: Duration,
) -> Result<ComparisonSummary> {
    info!("pass 1 of 2: with secondary indexes");
    store.remove_table().await?;
    let variant = run_benchmark(store, config, corpus, true).await?;

    if !settle.is_zero() {
        info!(?settle, "waiting before second pass");
        tokio::time::sleep(settle).await;
    }

    info!("pass 2 of 2: without secondary indexes");
    store.remove_table().await?;
    let baseline = run_benchmark(store, config, corpus, false).await?;

    Ok(compare_reports(&baseline, &variant))
}
