//! SQLite storage layer
//!
//! Uses parameterized queries exclusively (no SQL string concatenation of
//! user input). Rows are read by column name. One [`Database`] handle owns the
//! connection and is passed to every component that needs it.

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Params, Row, Transaction};
use std::path::Path;

/// Result type for raw database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Timestamp layout used by SQLite's `CURRENT_TIMESTAMP` (UTC)
pub use medicine_common::validation::TIMESTAMP_FORMAT;

/// Owned handle to the medicine price database
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and initialise the schema.
    ///
    /// Creates the parent directory when it is missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                log::info!("Created directory: {}", parent.display());
            }
        }
        let conn = Connection::open(path)?;
        log::info!("Opened database: {}", path.display());
        Self::from_connection(conn)
    }

    /// Fresh in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Start a scoped transaction.
    ///
    /// The transaction rolls back when dropped without `commit()`, so every
    /// early return through `?` leaves the database untouched.
    pub fn transaction(&self) -> DbResult<Transaction<'_>> {
        self.conn.unchecked_transaction()
    }

    pub fn fetch_one<T, P, F>(&self, sql: &str, params: P, map: F) -> DbResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> DbResult<T>,
    {
        fetch_one(&self.conn, sql, params, map)
    }

    pub fn fetch_all<T, P, F>(&self, sql: &str, params: P, map: F) -> DbResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> DbResult<T>,
    {
        fetch_all(&self.conn, sql, params, map)
    }

    pub fn insert<P: Params>(&self, sql: &str, params: P) -> DbResult<i64> {
        insert(&self.conn, sql, params)
    }
}

/// Run a query expected to return at most one row
pub fn fetch_one<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> DbResult<Option<T>>
where
    P: Params,
    F: FnOnce(&Row<'_>) -> DbResult<T>,
{
    conn.query_row(sql, params, map).optional()
}

/// Run a query and collect every row, preserving the query's order
pub fn fetch_all<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> DbResult<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> DbResult<T>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let results: DbResult<Vec<T>> = stmt.query_map(params, map)?.collect();
    results
}

/// Execute an INSERT and return the new row id
pub fn insert<P: Params>(conn: &Connection, sql: &str, params: P) -> DbResult<i64> {
    let mut stmt = conn.prepare_cached(sql)?;
    stmt.insert(params)
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `stockists`: suppliers offering medicines
/// - `medicines`: the catalog (names are not unique)
/// - `medicine_prices`: append-only price offers, one row per listing
/// - `purchases`: recorded purchase decisions with their savings
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS stockists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            contact TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            gst_no TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS medicines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            medicine_name TEXT NOT NULL,
            company_name TEXT NOT NULL,
            generic_name TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_medicines_name ON medicines(medicine_name);

        CREATE TABLE IF NOT EXISTS medicine_prices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            medicine_id INTEGER NOT NULL,
            stockist_id INTEGER NOT NULL,
            net_rate REAL NOT NULL,
            mrp REAL NOT NULL,
            discount_percent REAL NOT NULL DEFAULT 0,
            final_price REAL NOT NULL,
            paid_status TEXT NOT NULL DEFAULT 'Unpaid',
            paid_amount REAL NOT NULL DEFAULT 0,
            purchase_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (medicine_id) REFERENCES medicines (id) ON DELETE CASCADE,
            FOREIGN KEY (stockist_id) REFERENCES stockists (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_medicine_prices_medicine ON medicine_prices(medicine_id);
        CREATE INDEX IF NOT EXISTS idx_medicine_prices_stockist ON medicine_prices(stockist_id);
        CREATE INDEX IF NOT EXISTS idx_medicine_prices_date ON medicine_prices(purchase_date);

        -- Names are stored as text snapshots so history survives catalog changes
        CREATE TABLE IF NOT EXISTS purchases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            medicine_name TEXT NOT NULL,
            selected_stockist TEXT NOT NULL,
            selected_price REAL NOT NULL,
            lowest_price REAL NOT NULL,
            savings REAL NOT NULL,
            purchase_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// Current UTC date as `YYYY-MM-DD`, the same day SQLite's `date('now')` reports
pub fn today_date() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// UTC time `days` days back, in `CURRENT_TIMESTAMP` layout
pub fn timestamp_days_ago(days: i64) -> String {
    (chrono::Utc::now() - chrono::Duration::days(days))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Build a `LIKE` pattern matching `text` as a literal substring.
///
/// `%`, `_` and the escape character itself are escaped with `\`; queries
/// using the pattern must declare `ESCAPE '\'`.
pub fn like_substring_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Get total count of medicines in database
pub fn get_medicine_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get(0))
}

/// Get total count of stockists in database
pub fn get_stockist_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM stockists", [], |row| row.get(0))
}

/// Get total count of price offers
pub fn get_price_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM medicine_prices", [], |row| row.get(0))
}

/// Get total count of recorded purchases
pub fn get_purchase_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM purchases", [], |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                params![name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn init_schema_creates_tables() {
        let db = Database::open_in_memory().unwrap();
        for table in ["stockists", "medicines", "medicine_prices", "purchases"] {
            assert!(table_exists(db.conn(), table), "missing table {table}");
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        init_schema(db.conn()).unwrap();
        assert_eq!(get_medicine_count(db.conn()).unwrap(), 0);
    }

    #[test]
    fn insert_returns_new_ids() {
        let db = Database::open_in_memory().unwrap();
        let first = db
            .insert("INSERT INTO stockists (name) VALUES (?1)", params!["A"])
            .unwrap();
        let second = db
            .insert("INSERT INTO stockists (name) VALUES (?1)", params!["B"])
            .unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(get_stockist_count(db.conn()).unwrap(), 2);
    }

    #[test]
    fn fetch_one_returns_none_when_absent() {
        let db = Database::open_in_memory().unwrap();
        let name: Option<String> = db
            .fetch_one(
                "SELECT name FROM stockists WHERE id = ?1",
                params![42],
                |row| row.get("name"),
            )
            .unwrap();
        assert!(name.is_none());
    }

    #[test]
    fn fetch_all_preserves_order() {
        let db = Database::open_in_memory().unwrap();
        for name in ["Charlie", "Alpha", "Bravo"] {
            db.insert("INSERT INTO stockists (name) VALUES (?1)", params![name])
                .unwrap();
        }
        let names: Vec<String> = db
            .fetch_all("SELECT name FROM stockists ORDER BY name ASC", [], |row| {
                row.get("name")
            })
            .unwrap();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        {
            let tx = db.transaction().unwrap();
            insert(&tx, "INSERT INTO stockists (name) VALUES (?1)", params!["A"]).unwrap();
        }
        assert_eq!(get_stockist_count(db.conn()).unwrap(), 0);
    }

    #[test]
    fn committed_transaction_persists() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.transaction().unwrap();
        insert(&tx, "INSERT INTO stockists (name) VALUES (?1)", params!["A"]).unwrap();
        tx.commit().unwrap();
        assert_eq!(get_stockist_count(db.conn()).unwrap(), 1);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert(
            "INSERT INTO medicine_prices (medicine_id, stockist_id, net_rate, mrp, final_price)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![99, 99, 1.0, 1.0, 1.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_substring_pattern("para"), "%para%");
        assert_eq!(like_substring_pattern("50%"), "%50\\%%");
        assert_eq!(like_substring_pattern("b_c"), "%b\\_c%");
        assert_eq!(like_substring_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn today_date_has_iso_layout() {
        let today = today_date();
        assert_eq!(today.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn timestamp_days_ago_matches_sqlite_layout() {
        let week_ago = timestamp_days_ago(7);
        let now = timestamp_days_ago(0);
        assert!(chrono::NaiveDateTime::parse_from_str(&week_ago, TIMESTAMP_FORMAT).is_ok());
        assert!(week_ago < now);
        assert!(medicine_common::validation::require_timestamp(&week_ago).is_ok());
    }
}
