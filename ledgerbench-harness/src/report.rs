//! Plain-text rendering of benchmark results.

use ledgerbench_client::IndexSetup;
use ledgerbench_common::Transfer;
use std::fmt::{self, Write};
use std::time::Duration;

use crate::compare::{Comparison, ComparisonSummary, TimingComparison, Verdict};
use crate::config::{SLOW_ADDRESS_QUERY, SLOW_HASH_QUERY};
use crate::driver::{
    BenchmarkReport, CategoryResult, CountTimings, ExistingDataCheck, IndexPerfReport, InsertStats,
    TimedRecord,
};
use crate::state::{TableState, TableStatistics};
use crate::stats::LatencyReport;

/// Run a writer against a fresh `String`. Writing to a `String` never fails.
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    write(&mut out).map(|()| out).unwrap_or_default()
}

/// Latency lines for one sample set. Percentiles that were not computed are left out.
pub fn format_latency(report: &LatencyReport) -> String {
    render(|out| write_latency(out, report))
}

fn write_latency(out: &mut String, report: &LatencyReport) -> fmt::Result {
    if !report.has_data() {
        return writeln!(out, "  (no samples)");
    }
    writeln!(out, "  Count:        {}", report.count)?;
    writeln!(out, "  Min:          {:.2?}", report.min)?;
    writeln!(out, "  Max:          {:.2?}", report.max)?;
    writeln!(out, "  Mean:         {:.2?}", report.mean)?;
    writeln!(out, "  P50:          {:.2?}", report.p50)?;
    for (name, value) in [("P95", report.p95), ("P99", report.p99), ("P99.9", report.p999)] {
        if !value.is_zero() {
            writeln!(out, "  {:<14}{:.2?}", format!("{name}:"), value)?;
        }
    }
    writeln!(out, "  Throughput:   {:.1} ops/s", report.throughput_ops())
}

pub fn format_category(result: &CategoryResult, detailed: bool) -> String {
    render(|out| write_category(out, result, detailed))
}

fn write_category(out: &mut String, result: &CategoryResult, detailed: bool) -> fmt::Result {
    writeln!(out, "{}", result.category.label())?;
    if detailed {
        write_latency(out, &result.report)?;
    } else {
        writeln!(
            out,
            "  {} queries, mean {:.2?}, p50 {:.2?}",
            result.report.count, result.report.mean, result.report.p50
        )?;
    }
    writeln!(out, "  Avg records:  {:.1}", result.avg_records_per_query())?;
    if result.is_slow() {
        writeln!(out, "  WARNING: slow queries, secondary indexes may not be in use")?;
    }
    Ok(())
}

pub fn format_index_setup(setup: &IndexSetup) -> String {
    match setup {
        IndexSetup::NotRequested => "no secondary indexes".to_string(),
        IndexSetup::Created { ready, failed } if failed.is_empty() => {
            format!("{ready} secondary indexes")
        }
        IndexSetup::Created { ready, failed } => {
            format!("{ready} secondary indexes, {} failed: {}", failed.len(), failed.join("; "))
        }
        IndexSetup::SkippedNonEmpty { rows } => {
            format!("indexes skipped, table already held {rows} rows")
        }
    }
}

fn write_insert(out: &mut String, insert: &InsertStats) -> fmt::Result {
    writeln!(out, "Insert")?;
    writeln!(out, "  Records:      {}", insert.records)?;
    writeln!(out, "  Elapsed:      {:.2?}", insert.elapsed)?;
    writeln!(out, "  Rate:         {:.1} records/s", insert.rate())?;
    writeln!(out, "  Per record:   {:.2?}", insert.per_record())
}

fn write_counts(out: &mut String, counts: &CountTimings) -> fmt::Result {
    writeln!(out, "Counts")?;
    writeln!(out, "  By FROM:      {} in {:.2?}", counts.by_from.value, counts.by_from.elapsed)?;
    writeln!(out, "  By TO:        {} in {:.2?}", counts.by_to.value, counts.by_to.elapsed)?;
    writeln!(out, "  All:          {} in {:.2?}", counts.all.value, counts.all.elapsed)
}

fn write_check_line(
    out: &mut String,
    label: &str,
    elapsed: Duration,
    slow: bool,
    limit: Duration,
) -> fmt::Result {
    if slow {
        writeln!(out, "  {label:<14}{elapsed:.2?} (WARNING: over {limit:?}, index may be missing)")
    } else {
        writeln!(out, "  {label:<14}{elapsed:.2?}")
    }
}

fn write_existing_data(out: &mut String, check: &ExistingDataCheck) -> fmt::Result {
    writeln!(out, "Existing data index check")?;
    write_check_line(
        out,
        "Hash count:",
        check.missing_hash.elapsed,
        check.hash_is_slow(),
        SLOW_HASH_QUERY,
    )?;
    write_check_line(
        out,
        "FROM count:",
        check.by_from.elapsed,
        check.from_is_slow(),
        SLOW_ADDRESS_QUERY,
    )
}

fn write_last_record(out: &mut String, last: &TimedRecord) -> fmt::Result {
    match &last.record {
        Some((id, t)) => writeln!(
            out,
            "Last record:    id {id}, block {}, tx {} ({:.2?})",
            t.block_number, t.transaction_hash, last.elapsed
        ),
        None => writeln!(out, "Last record:    none ({:.2?})", last.elapsed),
    }
}

pub fn format_benchmark(report: &BenchmarkReport, detailed: bool) -> String {
    render(|out| {
        writeln!(out, "Performance Test Results")?;
        writeln!(out, "========================")?;
        writeln!(out, "Table:          {}", format_index_setup(&report.index_setup))?;
        if let Some(check) = &report.existing_data {
            writeln!(out)?;
            write_existing_data(out, check)?;
        }
        writeln!(out)?;
        write_insert(out, &report.insert)?;
        write_last_record(out, &report.last_record)?;
        for result in &report.categories {
            writeln!(out)?;
            write_category(out, result, detailed)?;
        }
        writeln!(out)?;
        write_counts(out, &report.counts)
    })
}

pub fn format_index_perf(report: &IndexPerfReport, detailed: bool) -> String {
    render(|out| {
        writeln!(out, "Index Performance Results")?;
        writeln!(out, "=========================")?;
        writeln!(out, "Table:          {}", format_index_setup(&report.index_setup))?;
        writeln!(out)?;
        write_insert(out, &report.insert)?;
        writeln!(out)?;
        writeln!(out, "Block Insert")?;
        write_latency(out, &report.block_inserts)?;
        for result in &report.categories {
            writeln!(out)?;
            write_category(out, result, detailed)?;
        }
        Ok(())
    })
}

/// `2.00x (significant improvement)`, with slower ratios called out.
pub fn format_speedup(speedup: Option<f64>, verdict: Verdict) -> String {
    match speedup {
        None => verdict.describe().to_string(),
        Some(s) if s < 1.0 => format!("{s:.2}x ({}, {:.2}x slower)", verdict.describe(), 1.0 / s),
        Some(s) => format!("{s:.2}x ({})", verdict.describe()),
    }
}

fn write_side(out: &mut String, label: &str, report: &LatencyReport) -> fmt::Result {
    write!(out, "  {label:<15}mean {:.2?}  p50 {:.2?}", report.mean, report.p50)?;
    // P95 is zero when percentiles were disabled.
    if !report.p95.is_zero() {
        write!(out, "  p95 {:.2?}", report.p95)?;
    }
    writeln!(out)
}

fn write_comparison_row(out: &mut String, c: &Comparison) -> fmt::Result {
    writeln!(out, "{}", c.category.label())?;
    write_side(out, "Without index:", &c.baseline.report)?;
    write_side(out, "With index:", &c.variant.report)?;
    writeln!(out, "  Speedup:       {}", format_speedup(c.speedup, c.verdict))
}

fn write_timing_row(out: &mut String, label: &str, t: &TimingComparison) -> fmt::Result {
    writeln!(out, "{label}")?;
    writeln!(out, "  Without index: {:.2?}", t.baseline)?;
    writeln!(out, "  With index:    {:.2?}", t.variant)?;
    writeln!(out, "  Speedup:       {}", format_speedup(t.speedup, t.verdict))
}

pub fn format_comparison(summary: &ComparisonSummary) -> String {
    render(|out| {
        writeln!(out, "Index Comparison")?;
        writeln!(out, "================")?;
        for c in &summary.categories {
            writeln!(out)?;
            write_comparison_row(out, c)?;
        }
        writeln!(out)?;
        write_timing_row(out, "Count by FROM", &summary.count_by_from)?;
        writeln!(out)?;
        writeln!(out, "Insert rate")?;
        writeln!(out, "  Without index: {:.1} records/s", summary.baseline_insert.rate())?;
        writeln!(out, "  With index:    {:.1} records/s", summary.variant_insert.rate())?;
        writeln!(out)?;
        writeln!(
            out,
            "Overall:         {}",
            format_speedup(summary.aggregate, summary.aggregate_verdict())
        )
    })
}

fn format_transfer(t: &Transfer) -> String {
    format!(
        "block {} #{}  {} -> {}  tx {}",
        t.block_number, t.tx_block_index, t.from, t.to, t.transaction_hash
    )
}

fn format_distinct(count: Option<u64>) -> String {
    match count {
        Some(n) => n.to_string(),
        None => "N/A (query not supported)".to_string(),
    }
}

fn write_statistics(out: &mut String, stats: &TableStatistics) -> fmt::Result {
    writeln!(out, "Statistics")?;
    if let Some((min, max)) = stats.block_range {
        writeln!(out, "  Block range:       {min} - {max}")?;
    }
    if let Some((min, max)) = stats.known_timestamps() {
        writeln!(out, "  Timestamp range:   {min} - {max} (unix seconds)")?;
    }
    writeln!(out, "  Unique FROM addrs: {}", format_distinct(stats.unique_from))?;
    writeln!(out, "  Unique TO addrs:   {}", format_distinct(stats.unique_to))
}

pub fn format_state(table: &str, state: &TableState) -> String {
    render(|out| {
        writeln!(out, "Table State: {table}")?;
        writeln!(out, "Total records:  {}", state.total)?;
        if state.is_empty() {
            return Ok(());
        }
        if let Some((id, t)) = &state.head {
            writeln!(out, "Head (id {id}):   {}", format_transfer(t))?;
        }
        if let Some((id, t)) = &state.tail {
            writeln!(out, "Tail (id {id}):   {}", format_transfer(t))?;
        }
        writeln!(out)?;
        write_statistics(out, &state.statistics)?;
        writeln!(out)?;
        writeln!(out, "Sample records")?;
        for t in &state.sample {
            writeln!(out, "  {}", format_transfer(t))?;
        }
        writeln!(out)?;
        writeln!(out, "Test addresses")?;
        for a in &state.addresses {
            writeln!(out, "  {}  sent {:>8}  received {:>8}", a.address, a.sent, a.received)?;
        }
        Ok(())
    })
}
