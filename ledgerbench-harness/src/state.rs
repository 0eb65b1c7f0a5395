use ledgerbench_client::Client;
use ledgerbench_common::{Lookup, Transfer};
use tracing::debug;

use crate::corpus::TEST_ADDRESSES;
use crate::error::Result;

/// Rows shown as a sample of the table contents.
pub const SAMPLE_RECORDS: u64 = 5;

/// Sent and received counts for one test address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCounts {
    pub address: String,
    pub sent: u64,
    pub received: u64,
}

/// Column ranges and distinct address counts over the whole table.
///
/// A `None` distinct count means the gateway rejected the GROUP BY.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStatistics {
    pub block_range: Option<(i64, i64)>,
    pub timestamp_range: Option<(i64, i64)>,
    pub unique_from: Option<u64>,
    pub unique_to: Option<u64>,
}

impl TableStatistics {
    /// The timestamp range, unless either end is unset (zero or negative).
    pub fn known_timestamps(&self) -> Option<(i64, i64)> {
        self.timestamp_range.filter(|&(min, max)| min > 0 && max > 0)
    }
}

/// Snapshot of what the history table holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub total: u64,
    pub head: Option<(u64, Transfer)>,
    pub tail: Option<(u64, Transfer)>,
    pub sample: Vec<Transfer>,
    pub addresses: Vec<AddressCounts>,
    pub statistics: TableStatistics,
}

impl TableState {
    pub fn empty() -> Self {
        Self {
            total: 0,
            head: None,
            tail: None,
            sample: Vec::new(),
            addresses: Vec::new(),
            statistics: TableStatistics::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub async fn collect_statistics(client: &Client) -> Result<TableStatistics> {
    let statistics = TableStatistics {
        block_range: client.column_range("blockNumber").await?,
        timestamp_range: client.column_range("ts").await?,
        unique_from: client.distinct_count("fromAddr").await?,
        unique_to: client.distinct_count("toAddr").await?,
    };
    debug!(?statistics, "table statistics");
    Ok(statistics)
}

pub async fn collect_state(client: &Client) -> Result<TableState> {
    let total = client.count_all().await?;
    debug!(total, table = %client.config.table, "counted rows");

    if total == 0 {
        return Ok(TableState::empty());
    }

    let head = client.head().await?;
    let tail = client.tail().await?;
    let sample = client.first_records(SAMPLE_RECORDS).await?;

    let mut addresses = Vec::with_capacity(TEST_ADDRESSES.len());
    for address in TEST_ADDRESSES {
        let sent = client.count(&Lookup::From(address.to_string())).await?;
        let received = client.count(&Lookup::To(address.to_string())).await?;
        addresses.push(AddressCounts { address: address.to_string(), sent, received });
    }

    let statistics = collect_statistics(client).await?;

    Ok(TableState { total, head, tail, sample, addresses, statistics })
}
