use clap::{Args, Parser, Subcommand};
use ledgerbench_client::Client;
use ledgerbench_harness::compare::run_index_comparison;
use ledgerbench_harness::config::{load_connection, BenchConfig, IndexPerfConfig};
use ledgerbench_harness::corpus::{block_transfers, random_transfers, Corpus};
use ledgerbench_harness::driver::{run_benchmark, run_index_perf};
use ledgerbench_harness::memory::MemoryStore;
use ledgerbench_harness::report;
use ledgerbench_harness::state::collect_state;
use ledgerbench_harness::store::DataStore;
use ledgerbench_harness::workload::QueryMix;
use ledgerbench_harness::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ledgerbench", about = "Latency benchmarks for a ledger SQL gateway")]
struct Cli {
    /// JSON file with gateway address, credentials, database and table
    #[arg(long, global = true)]
    connection: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show row counts and sample records of the history table
    State,
    /// Load random transfers into an indexed table and time each query category
    Perf(PerfArgs),
    /// Load block-structured transfers block by block, then run a mixed read workload
    IndexPerf(IndexPerfArgs),
    /// Run the performance test with and without secondary indexes and compare
    Compare(CompareArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Seed for data generation (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Only compute the median, not P95/P99/P99.9
    #[arg(long)]
    no_percentiles: bool,

    /// One summary line per query category
    #[arg(long)]
    brief: bool,

    /// Run against an in-process table instead of the gateway
    #[arg(long)]
    in_memory: bool,
}

/// Overrides for the fixed-count workload; unset flags keep the command's defaults.
#[derive(Args)]
struct QueryArgs {
    /// Transfers to generate and insert [perf: 100000, compare: 500000]
    #[arg(long)]
    transactions: Option<usize>,

    /// Hash lookups to time [perf: 500, compare: 1000]
    #[arg(long)]
    hash_queries: Option<usize>,

    /// FROM-address lookups to time [perf: 500, compare: 1000]
    #[arg(long)]
    from_queries: Option<usize>,

    /// TO-address lookups to time [perf: 500, compare: 1000]
    #[arg(long)]
    to_queries: Option<usize>,

    /// Block lookups to time [default: 100]
    #[arg(long)]
    block_queries: Option<usize>,

    /// Lowest generated block number [default: 1000000]
    #[arg(long)]
    block_min: Option<u64>,

    /// Highest generated block number [default: 2000000]
    #[arg(long)]
    block_max: Option<u64>,

    /// Untimed queries per category before timing [perf: 5, compare: 0]
    #[arg(long)]
    warmup: Option<usize>,
}

impl QueryArgs {
    fn apply(&self, mut config: BenchConfig) -> BenchConfig {
        let fields: [(&Option<usize>, &mut usize); 6] = [
            (&self.transactions, &mut config.transaction_count),
            (&self.hash_queries, &mut config.hash_queries),
            (&self.from_queries, &mut config.from_queries),
            (&self.to_queries, &mut config.to_queries),
            (&self.block_queries, &mut config.block_queries),
            (&self.warmup, &mut config.warmup_queries),
        ];
        for (value, field) in fields {
            if let Some(v) = value {
                *field = *v;
            }
        }
        if let Some(v) = self.block_min {
            config.block_min = v;
        }
        if let Some(v) = self.block_max {
            config.block_max = v;
        }
        config
    }
}

#[derive(Args)]
struct PerfArgs {
    #[command(flatten)]
    queries: QueryArgs,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args)]
struct CompareArgs {
    #[command(flatten)]
    queries: QueryArgs,

    #[command(flatten)]
    run: RunArgs,

    /// Seconds to wait between the two passes
    #[arg(long, default_value_t = 2)]
    settle_secs: u64,
}

#[derive(Args)]
struct IndexPerfArgs {
    /// Transfers to generate and insert
    #[arg(long, default_value_t = 200_000)]
    transactions: usize,

    /// Transfers per block
    #[arg(long, default_value_t = 200)]
    txns_per_block: usize,

    /// First block number
    #[arg(long, default_value_t = 1_000_000)]
    start_block: u64,

    /// Total reads, split across categories by ratio
    #[arg(long, default_value_t = 1_000)]
    reads: usize,

    /// Share of reads that are hash lookups
    #[arg(long, default_value_t = 0.40)]
    hash_ratio: f64,

    /// Share of reads that are FROM-address lookups
    #[arg(long, default_value_t = 0.25)]
    from_ratio: f64,

    /// Share of reads that are TO-address lookups; block lookups take the rest
    #[arg(long, default_value_t = 0.25)]
    to_ratio: f64,

    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ledgerbench=info,ledgerbench_harness=info,ledgerbench_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let connection = load_connection(cli.connection.as_deref())?;
    let client = Client::new(connection)?;
    let memory = MemoryStore::new();
    info!(
        addr = %client.config.addr,
        database = %client.config.database,
        table = %client.config.table,
        "using gateway"
    );

    match cli.command {
        Command::State => {
            let state = collect_state(&client).await?;
            print!("{}", report::format_state(&client.config.table, &state));
        }
        Command::Perf(args) => {
            let config = args.queries.apply(BenchConfig::default());
            let config = BenchConfig {
                enable_percentiles: !args.run.no_percentiles,
                detailed_stats: !args.run.brief,
                ..config
            };
            config.validate()?;

            let corpus = random_corpus(&config, args.run.seed);
            let store = select_store(&client, &memory, args.run.in_memory);
            let result = run_benchmark(store, &config, &corpus, true).await?;
            print!("{}", report::format_benchmark(&result, config.detailed_stats));
        }
        Command::IndexPerf(args) => {
            let config = IndexPerfConfig {
                total_transactions: args.transactions,
                txns_per_block: args.txns_per_block,
                start_block: args.start_block,
                read_count: args.reads,
                mix: QueryMix { hash: args.hash_ratio, from: args.from_ratio, to: args.to_ratio },
                enable_percentiles: !args.run.no_percentiles,
                detailed_stats: !args.run.brief,
            };
            config.validate()?;

            let mut rng = seeded_rng(args.run.seed);
            let corpus = Corpus::new(block_transfers(
                &mut rng,
                config.total_transactions,
                config.txns_per_block,
                config.start_block,
                unix_now(),
            ));
            info!(transfers = corpus.len(), blocks = corpus.block_span(), "generated corpus");

            let store = select_store(&client, &memory, args.run.in_memory);
            let result = run_index_perf(store, &config, &corpus).await?;
            print!("{}", report::format_index_perf(&result, config.detailed_stats));
        }
        Command::Compare(args) => {
            let config = args.queries.apply(BenchConfig::comparison());
            let config = BenchConfig {
                enable_percentiles: !args.run.no_percentiles,
                detailed_stats: !args.run.brief,
                ..config
            };
            config.validate()?;

            let corpus = random_corpus(&config, args.run.seed);
            let store = select_store(&client, &memory, args.run.in_memory);
            let settle = Duration::from_secs(args.settle_secs);
            let summary = run_index_comparison(store, &config, &corpus, settle).await?;
            print!("{}", report::format_comparison(&summary));
        }
    }
    Ok(())
}

fn select_store<'a>(
    client: &'a Client,
    memory: &'a MemoryStore,
    in_memory: bool,
) -> &'a dyn DataStore {
    if in_memory {
        info!("running against an in-memory table");
        memory
    } else {
        client
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn random_corpus(config: &BenchConfig, seed: Option<u64>) -> Corpus {
    let mut rng = seeded_rng(seed);
    let corpus = Corpus::new(random_transfers(
        &mut rng,
        config.transaction_count,
        config.block_min,
        config.block_max,
        unix_now(),
    ));
    info!(transfers = corpus.len(), "generated corpus");
    corpus
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
