//! Statement text for the history table.
//!
//! Every statement takes positional `?` parameters; callers pass the values
//! separately so nothing user-supplied is ever spliced into the SQL. Table names
//! are validated by the client before they reach these builders.

use ledgerbench_common::Lookup;

/// Columns indexed when a table is prepared with secondary indexes.
pub const INDEXED_COLUMNS: [&str; 4] = ["transactionHash", "fromAddr", "toAddr", "blockNumber"];

/// Projection shared by every row-returning query, in decode order.
pub const TRANSFER_COLUMNS: &str =
    "transactionHash, fromAddr, toAddr, blockNumber, blockHash, txBlockIndex, ts";

pub fn create_table(table: &str) -> String {
    format!(
        "CREATE TABLE {table} (\
         id INTEGER AUTO_INCREMENT, \
         transactionHash VARCHAR[66] NOT NULL, \
         fromAddr VARCHAR[42] NOT NULL, \
         toAddr VARCHAR[42], \
         blockNumber INTEGER NOT NULL, \
         blockHash VARCHAR[66] NOT NULL, \
         txBlockIndex INTEGER NOT NULL, \
         ts INTEGER NOT NULL, \
         PRIMARY KEY (id))"
    )
}

/// The ledger names indexes by their column list, so there is no index name.
pub fn create_index(table: &str, column: &str) -> String {
    format!("CREATE INDEX ON {table}({column})")
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {table}")
}

/// Multi-row INSERT with one `(?, ?, ?, ?, ?, ?, ?)` group per row.
pub fn insert_rows(table: &str, rows: usize) -> String {
    let groups = vec!["(?, ?, ?, ?, ?, ?, ?)"; rows].join(", ");
    format!(
        "INSERT INTO {table} (transactionHash, fromAddr, toAddr, blockNumber, blockHash, txBlockIndex, ts) \
         VALUES {groups}"
    )
}

pub fn select_where(table: &str, lookup: &Lookup) -> String {
    format!(
        "SELECT {TRANSFER_COLUMNS} FROM {table} WHERE {} = ?",
        lookup.column()
    )
}

pub fn count_where(table: &str, lookup: &Lookup) -> String {
    format!("SELECT COUNT(*) FROM {table} WHERE {} = ?", lookup.column())
}

pub fn count_all(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

/// First (`ascending`) or last row by insertion id, with the id as column 0.
pub fn edge_row(table: &str, ascending: bool) -> String {
    let dir = if ascending { "ASC" } else { "DESC" };
    format!("SELECT id, {TRANSFER_COLUMNS} FROM {table} ORDER BY id {dir} LIMIT 1")
}

pub fn first_rows(table: &str) -> String {
    format!("SELECT {TRANSFER_COLUMNS} FROM {table} ORDER BY id ASC LIMIT ?")
}

/// `MIN` and `MAX` of one column in a single row.
pub fn column_range(table: &str, column: &str) -> String {
    format!("SELECT MIN({column}), MAX({column}) FROM {table}")
}

/// One row per distinct value of `column`. The ledger has no `COUNT(DISTINCT ...)`.
pub fn group_by(table: &str, column: &str) -> String {
    format!("SELECT {column} FROM {table} GROUP BY {column}")
}
