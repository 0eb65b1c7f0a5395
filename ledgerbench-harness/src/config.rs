use ledgerbench_client::ClientConfig;
use std::path::Path;
use std::time::Duration;

use crate::error::{HarnessError, Result};
use crate::workload::{Category, QueryMix};

/// Hash lookups slower than this on average suggest the index is not used.
pub const SLOW_HASH_QUERY: Duration = Duration::from_millis(100);

/// Address lookups slower than this on average suggest the index is not used.
pub const SLOW_ADDRESS_QUERY: Duration = Duration::from_millis(200);

/// Fixed-count workload: how much data to load and how many queries of each
/// category to time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub transaction_count: usize,
    pub hash_queries: usize,
    pub from_queries: usize,
    pub to_queries: usize,
    pub block_queries: usize,
    pub block_min: u64,
    pub block_max: u64,
    /// Untimed queries issued per category before timing starts.
    pub warmup_queries: usize,
    pub enable_percentiles: bool,
    pub detailed_stats: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            transaction_count: 100_000,
            hash_queries: 500,
            from_queries: 500,
            to_queries: 500,
            block_queries: 100,
            block_min: 1_000_000,
            block_max: 2_000_000,
            warmup_queries: 5,
            enable_percentiles: true,
            detailed_stats: true,
        }
    }
}

impl BenchConfig {
    /// Defaults for the with/without-index comparison: a larger table, more
    /// queries, and no warmup so both passes start cold.
    pub fn comparison() -> Self {
        Self {
            transaction_count: 500_000,
            hash_queries: 1_000,
            from_queries: 1_000,
            to_queries: 1_000,
            block_queries: 100,
            warmup_queries: 0,
            ..Self::default()
        }
    }

    pub fn queries_for(&self, category: Category) -> usize {
        match category {
            Category::Hash => self.hash_queries,
            Category::From => self.from_queries,
            Category::To => self.to_queries,
            Category::Block => self.block_queries,
        }
    }

    pub fn plan(&self) -> Vec<(Category, usize)> {
        Category::ALL.iter().map(|&c| (c, self.queries_for(c))).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.transaction_count == 0 {
            return Err(HarnessError::Config("transaction count must be positive".to_string()));
        }
        if self.block_min > self.block_max {
            return Err(HarnessError::Config(format!(
                "block range {}..={} is empty",
                self.block_min, self.block_max
            )));
        }
        Ok(())
    }
}

/// Explorer-style workload: block-structured data loaded block by block, then
/// a fixed number of reads split by `mix`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPerfConfig {
    pub total_transactions: usize,
    /// Upper bound on transfers per block.
    pub txns_per_block: usize,
    pub start_block: u64,
    pub read_count: usize,
    pub mix: QueryMix,
    pub enable_percentiles: bool,
    pub detailed_stats: bool,
}

impl Default for IndexPerfConfig {
    fn default() -> Self {
        Self {
            total_transactions: 200_000,
            txns_per_block: 200,
            start_block: 1_000_000,
            read_count: 1_000,
            mix: QueryMix::default(),
            enable_percentiles: true,
            detailed_stats: true,
        }
    }
}

impl IndexPerfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.total_transactions == 0 {
            return Err(HarnessError::Config("transaction count must be positive".to_string()));
        }
        if self.txns_per_block == 0 {
            return Err(HarnessError::Config("transactions per block must be positive".to_string()));
        }
        self.mix.validate()
    }
}

/// Gateway connection settings: the JSON file at `path` if given, defaults otherwise.
pub fn load_connection(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| HarnessError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
