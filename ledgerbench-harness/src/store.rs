use async_trait::async_trait;
use ledgerbench_client::{Client, IndexSetup};
use ledgerbench_common::{Lookup, Result, Transfer};

/// The data store under test, as seen by the benchmark driver.
///
/// An empty result is a successful outcome; errors are reserved for transport
/// and execution failures and abort the run.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Create the history table if needed, with secondary indexes when asked.
    async fn create_table(&self, with_indexes: bool) -> Result<IndexSetup>;

    /// Drop the history table; a missing table is not an error.
    async fn remove_table(&self) -> Result<()>;

    async fn insert_batch(&self, records: &[Transfer]) -> Result<()>;

    /// Zero or one row for a hash lookup, zero or more otherwise.
    async fn query_by_exact_match(&self, lookup: &Lookup) -> Result<Vec<Transfer>>;

    async fn count_matching(&self, lookup: &Lookup) -> Result<u64>;

    async fn count_all(&self) -> Result<u64>;

    /// The most recently inserted row with its insertion id, `None` when empty.
    async fn last_record(&self) -> Result<Option<(u64, Transfer)>>;
}

#[async_trait]
impl DataStore for Client {
    async fn create_table(&self, with_indexes: bool) -> Result<IndexSetup> {
        self.prepare_table(with_indexes).await
    }

    async fn remove_table(&self) -> Result<()> {
        self.drop_table().await
    }

    async fn insert_batch(&self, records: &[Transfer]) -> Result<()> {
        self.insert_records(records).await
    }

    async fn query_by_exact_match(&self, lookup: &Lookup) -> Result<Vec<Transfer>> {
        self.find(lookup).await
    }

    async fn count_matching(&self, lookup: &Lookup) -> Result<u64> {
        self.count(lookup).await
    }

    async fn count_all(&self) -> Result<u64> {
        Client::count_all(self).await
    }

    async fn last_record(&self) -> Result<Option<(u64, Transfer)>> {
        self.tail().await
    }
}
