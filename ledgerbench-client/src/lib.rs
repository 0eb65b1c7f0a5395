use ledgerbench_common::{
    is_valid_identifier, ErrorResponse, LedgerError, Lookup, Result, Transfer, MAX_BATCH_SIZE,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub mod sql;

/// Connection settings for the ledger's SQL gateway.
///
/// Deserialises from a JSON file; any field left out falls back to the
/// stock single-node defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Gateway address as `host:port`.
    pub addr: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub table: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: "localhost:8080".to_string(),
            username: "immudb".to_string(),
            password: "immudb".to_string(),
            database: "historydb".to_string(),
            table: "historytable".to_string(),
        }
    }
}

/// Rows returned by the query endpoint, values in SELECT order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Column 0 of row 0 as an unsigned integer, as produced by `SELECT COUNT(*)`.
    pub fn scalar_u64(&self) -> Result<u64> {
        let value = self
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| LedgerError::InvalidResponse("expected a scalar row".to_string()))?;
        value_u64(value)
    }
}

/// What happened to secondary indexes when a table was prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSetup {
    NotRequested,
    /// `ready` counts indexes created or already present; `failed` holds one
    /// `column: error` line per index the gateway refused.
    Created { ready: usize, failed: Vec<String> },
    /// The ledger only accepts indexes on an empty table.
    SkippedNonEmpty { rows: u64 },
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    sql: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct ExecResponse {
    #[serde(default, rename = "rowsAffected")]
    rows_affected: u64,
}

/// Ledger SQL gateway client
pub struct Client {
    pub config: ClientConfig,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new client; fails if the database or table name is not a plain identifier.
    pub fn new(config: ClientConfig) -> Result<Self> {
        for name in [&config.database, &config.table] {
            if !is_valid_identifier(name) {
                return Err(LedgerError::InvalidIdentifier(name.clone()));
            }
        }
        Ok(Self {
            config,
            http_client: reqwest::Client::new(),
        })
    }

    /// Build the URL for a gateway endpoint (`sqlexec` or `sqlquery`).
    pub fn build_url(&self, endpoint: &str) -> String {
        format!(
            "http://{}/db/{}/{}",
            self.config.addr, self.config.database, endpoint
        )
    }

    /// Run a statement that returns no rows; yields the affected row count.
    pub async fn exec(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let response: ExecResponse = self.post("sqlexec", sql, params).await?;
        Ok(response.rows_affected)
    }

    /// Run a row-returning statement.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.post("sqlquery", sql, params).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        sql: &str,
        params: &[Value],
    ) -> Result<T> {
        let url = self.build_url(endpoint);
        let request_id = Uuid::new_v4().to_string();
        debug!(%request_id, endpoint, params = params.len(), "sending statement");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("X-Request-Id", &request_id)
            .json(&StatementRequest { sql, params })
            .send()
            .await
            .map_err(|e| LedgerError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(status, &url, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))
    }

    /// Create the history table (an existing table is kept) and, when asked,
    /// its secondary indexes.
    pub async fn prepare_table(&self, with_indexes: bool) -> Result<IndexSetup> {
        let table = &self.config.table;
        match self.exec(&sql::create_table(table), &[]).await {
            Ok(_) => info!(table = %table, "table created"),
            Err(e) if e.is_already_exists() => info!(table = %table, "table already exists"),
            Err(e) => return Err(e),
        }

        if !with_indexes {
            return Ok(IndexSetup::NotRequested);
        }

        let rows = self.count_all().await?;
        if rows > 0 {
            warn!(
                table = %table,
                rows,
                "table is not empty; indexes can only be created on an empty table, skipping"
            );
            return Ok(IndexSetup::SkippedNonEmpty { rows });
        }

        let mut ready = 0;
        let mut failed = Vec::new();
        for column in sql::INDEXED_COLUMNS {
            match self.exec(&sql::create_index(table, column), &[]).await {
                Ok(_) => ready += 1,
                Err(e) if e.is_already_exists() => ready += 1,
                Err(e) => {
                    warn!(column, error = %e, "failed to create index");
                    failed.push(format!("{column}: {e}"));
                }
            }
        }
        Ok(IndexSetup::Created { ready, failed })
    }

    /// Drop the history table; a missing table is not an error.
    pub async fn drop_table(&self) -> Result<()> {
        match self.exec(&sql::drop_table(&self.config.table), &[]).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_missing() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Insert any number of records, chunked to the gateway's per-transaction limit.
    pub async fn insert_records(&self, records: &[Transfer]) -> Result<()> {
        for (i, chunk) in records.chunks(MAX_BATCH_SIZE).enumerate() {
            let first = i * MAX_BATCH_SIZE;
            if let Err(e) = self.insert_batch(chunk).await {
                error!(
                    first,
                    last = first + chunk.len() - 1,
                    error = %e,
                    "batch insert failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Insert at most `MAX_BATCH_SIZE` records in one statement.
    pub async fn insert_batch(&self, records: &[Transfer]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        if records.len() > MAX_BATCH_SIZE {
            return Err(LedgerError::BatchTooLarge(MAX_BATCH_SIZE));
        }
        let params: Vec<Value> = records.iter().flat_map(transfer_params).collect();
        self.exec(&sql::insert_rows(&self.config.table, records.len()), &params)
            .await?;
        Ok(())
    }

    /// All rows matching `lookup`; an empty vector when nothing matches.
    pub async fn find(&self, lookup: &Lookup) -> Result<Vec<Transfer>> {
        let result = self
            .query(&sql::select_where(&self.config.table, lookup), &[lookup_param(lookup)])
            .await?;
        result.rows.iter().map(|row| decode_transfer(row)).collect()
    }

    pub async fn count(&self, lookup: &Lookup) -> Result<u64> {
        self.query(&sql::count_where(&self.config.table, lookup), &[lookup_param(lookup)])
            .await?
            .scalar_u64()
    }

    pub async fn count_all(&self) -> Result<u64> {
        self.query(&sql::count_all(&self.config.table), &[])
            .await?
            .scalar_u64()
    }

    /// Lowest-id row with its id.
    pub async fn head(&self) -> Result<Option<(u64, Transfer)>> {
        self.edge_row(true).await
    }

    /// Highest-id row with its id.
    pub async fn tail(&self) -> Result<Option<(u64, Transfer)>> {
        self.edge_row(false).await
    }

    async fn edge_row(&self, ascending: bool) -> Result<Option<(u64, Transfer)>> {
        let result = self
            .query(&sql::edge_row(&self.config.table, ascending), &[])
            .await?;
        match result.rows.first() {
            None => Ok(None),
            Some(row) if row.len() > 1 => {
                let id = value_u64(&row[0])?;
                Ok(Some((id, decode_transfer(&row[1..])?)))
            }
            Some(_) => Err(LedgerError::InvalidResponse("row is missing columns".to_string())),
        }
    }

    /// Smallest and largest value of an integer column; `None` on an empty table.
    pub async fn column_range(&self, column: &str) -> Result<Option<(i64, i64)>> {
        let result = self
            .query(&sql::column_range(&self.config.table, column), &[])
            .await?;
        match result.rows.first().map(Vec::as_slice) {
            None => Ok(None),
            Some([min, max, ..]) if min.is_null() || max.is_null() => Ok(None),
            Some([min, max, ..]) => Ok(Some((value_i64(min)?, value_i64(max)?))),
            Some(_) => Err(LedgerError::InvalidResponse("range row is missing columns".to_string())),
        }
    }

    /// Number of distinct values in `column`, counted from a GROUP BY.
    ///
    /// Gateways that reject the statement yield `None`; transport failures are errors.
    pub async fn distinct_count(&self, column: &str) -> Result<Option<u64>> {
        match self.query(&sql::group_by(&self.config.table, column), &[]).await {
            Ok(result) => Ok(Some(result.rows.len() as u64)),
            Err(LedgerError::HttpError(status, message)) => {
                warn!(column, status, %message, "distinct count not supported");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The first `limit` rows in insertion order.
    pub async fn first_records(&self, limit: u64) -> Result<Vec<Transfer>> {
        let result = self
            .query(&sql::first_rows(&self.config.table), &[Value::from(limit)])
            .await?;
        result.rows.iter().map(|row| decode_transfer(row)).collect()
    }
}

fn lookup_param(lookup: &Lookup) -> Value {
    match lookup {
        Lookup::Hash(s) | Lookup::From(s) | Lookup::To(s) => Value::from(s.as_str()),
        Lookup::Block(n) => Value::from(*n),
    }
}

fn transfer_params(t: &Transfer) -> [Value; 7] {
    [
        Value::from(t.transaction_hash.as_str()),
        Value::from(t.from.as_str()),
        Value::from(t.to.as_str()),
        Value::from(t.block_number),
        Value::from(t.block_hash.as_str()),
        Value::from(t.tx_block_index),
        Value::from(t.timestamp),
    ]
}

/// Decode one row projected with `sql::TRANSFER_COLUMNS`.
pub fn decode_transfer(row: &[Value]) -> Result<Transfer> {
    if row.len() < 7 {
        return Err(LedgerError::InvalidResponse(format!(
            "expected 7 columns, got {}",
            row.len()
        )));
    }
    Ok(Transfer {
        transaction_hash: value_str(&row[0])?,
        from: value_str(&row[1])?,
        // toAddr is nullable in the schema.
        to: if row[2].is_null() { String::new() } else { value_str(&row[2])? },
        block_number: value_u64(&row[3])?,
        block_hash: value_str(&row[4])?,
        tx_block_index: u32::try_from(value_u64(&row[5])?)
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?,
        timestamp: value_i64(&row[6])?,
    })
}

fn value_str(v: &Value) -> Result<String> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| LedgerError::InvalidResponse(format!("expected string, got {v}")))
}

// The gateway encodes 64-bit integers as JSON strings; accept both forms.
fn value_u64(v: &Value) -> Result<u64> {
    v.as_u64()
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| LedgerError::InvalidResponse(format!("expected unsigned integer, got {v}")))
}

fn value_i64(v: &Value) -> Result<i64> {
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| LedgerError::InvalidResponse(format!("expected integer, got {v}")))
}

async fn parse_error_response(
    status: reqwest::StatusCode,
    url: &str,
    response: reqwest::Response,
) -> LedgerError {
    if status == reqwest::StatusCode::NOT_FOUND {
        return LedgerError::NotFound(url.to_string());
    }

    let error_msg = response
        .json::<ErrorResponse>()
        .await
        .map(|r| r.error)
        .unwrap_or_else(|_| format!("Server returned status: {}", status));

    LedgerError::HttpError(status.as_u16(), error_msg)
}
