use crate::error::{DatasetError, Result};
use crate::ident::{index_name, normalize_column_name, normalize_table_name, safe_url};
use crate::result::{ResultIter, QUERY_STEP};
use crate::row::{pad_chunk_columns, Row};
use crate::types::ColumnType;
use crate::value::Value;
use rusqlite::{params, params_from_iter, Connection, Params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const MEMORY_PATH: &str = ":memory:";

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the SQLite database file, or a `sqlite://` URL
    pub url: String,
    /// Rows fetched per chunk when iterating results; `None` fetches everything at once
    pub query_step: Option<usize>,
    /// Create missing tables and columns on insert
    pub ensure_schema: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: MEMORY_PATH.to_string(),
            query_step: Some(QUERY_STEP),
            ensure_schema: true,
        }
    }
}

impl DatasetConfig {
    /// Create a new config for the given path or URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_query_step(mut self, step: Option<usize>) -> Self {
        self.query_step = step;
        self
    }

    pub fn with_ensure_schema(mut self, ensure_schema: bool) -> Self {
        self.ensure_schema = ensure_schema;
        self
    }

    /// The filesystem path SQLite should open.
    ///
    /// `sqlite://` is an in-memory database, `sqlite:///rel.db` a relative
    /// path and `sqlite:////abs/path.db` an absolute one.
    pub fn db_path(&self) -> &str {
        match self.url.strip_prefix("sqlite://") {
            Some("") => MEMORY_PATH,
            Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
            None => &self.url,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(DatasetError::Config("database url is empty".to_string()));
        }
        if self.query_step == Some(0) {
            return Err(DatasetError::Config(
                "query_step must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// A SQLite connection with row/type conversion on top.
///
/// Statement execution, transactions and binding all go straight to
/// rusqlite; this type only normalizes names, infers column types and
/// converts rows.
pub struct Database {
    conn: Connection,
    config: DatasetConfig,
}

impl Database {
    /// Open the database described by `config`
    pub fn open(config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let conn = match config.db_path() {
            MEMORY_PATH => Connection::open_in_memory()?,
            path => Connection::open(path)?,
        };
        info!(url = %safe_url(&config.url), "opened dataset database");
        Ok(Self { conn, config })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(DatasetConfig::default())
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// The underlying rusqlite connection, for anything not covered here.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `sql` and hands the converted result rows to `f`.
    pub fn query<P, F, T>(&self, sql: &str, params: P, f: F) -> Result<T>
    where
        P: Params,
        F: FnOnce(ResultIter<'_>) -> Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let iter = ResultIter::query(&mut stmt, params, self.config.query_step)?;
        f(iter)
    }

    pub fn has_table(&self, table: &str) -> Result<bool> {
        let table = normalize_table_name(table)?;
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names of `table`, in table order.
    pub fn columns(&self, table: &str) -> Result<Vec<String>> {
        let table = normalize_table_name(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(&table)))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Creates `table` with an integer `id` primary key and one column per
    /// key of `sample`, typed from the sample values.
    ///
    /// Column names are matched case-insensitively, as SQLite does.
    pub fn create_table(&self, table: &str, sample: &Row) -> Result<()> {
        let table = normalize_table_name(table)?;
        let mut seen = vec!["id".to_string()];
        let mut columns = vec!["\"id\" INTEGER PRIMARY KEY".to_string()];
        for (key, value) in sample.iter() {
            let name = normalize_column_name(key)?;
            if contains_ident(&seen, &name) {
                continue;
            }
            columns.push(format!(
                "{} {}",
                quote_ident(&name),
                ColumnType::guess(value).sql_type()
            ));
            seen.push(name);
        }
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&table),
            columns.join(", ")
        );
        self.conn.execute(&sql, [])?;
        debug!(table = %table, columns = columns.len(), "created table");
        Ok(())
    }

    /// Adds any key of `sample` that `table` does not have yet.
    pub fn ensure_columns(&self, table: &str, sample: &Row) -> Result<Vec<String>> {
        let table = normalize_table_name(table)?;
        let existing = self.columns(&table)?;
        let mut added = Vec::new();
        for (key, value) in sample.iter() {
            let name = normalize_column_name(key)?;
            if contains_ident(&existing, &name) || contains_ident(&added, &name) {
                continue;
            }
            let column_type = ColumnType::guess(value);
            self.conn.execute(
                &format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    quote_ident(&table),
                    quote_ident(&name),
                    column_type.sql_type()
                ),
                [],
            )?;
            debug!(table = %table, column = %name, column_type = %column_type, "added column");
            added.push(name);
        }
        Ok(added)
    }

    /// Inserts `rows` into `table` inside a single transaction and returns
    /// the number of rows written.
    ///
    /// Column names are normalized and the chunk is padded so every row
    /// binds the same columns; keys missing from a row are written as NULL.
    pub fn insert_many(&mut self, table: &str, rows: Vec<Row>) -> Result<usize> {
        let table = normalize_table_name(table)?;
        if rows.is_empty() {
            return Ok(0);
        }
        let mut rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(key, value)| normalize_column_name(&key).map(|name| (name, value)))
                    .collect::<Result<Row>>()
            })
            .collect::<Result<Vec<_>>>()?;
        fold_key_case(&mut rows);
        let columns = pad_chunk_columns(&mut rows);

        if self.config.ensure_schema {
            let sample = sample_row(&columns, &rows);
            if self.has_table(&table)? {
                self.ensure_columns(&table, &sample)?;
            } else {
                self.create_table(&table, &sample)?;
            }
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&table),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            (1..=columns.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in &rows {
                let values = columns
                    .iter()
                    .map(|c| row.get(c).unwrap_or(&Value::Null));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        debug!(table = %table, rows = rows.len(), "inserted rows");
        Ok(rows.len())
    }

    /// Creates an index over `columns` and returns its generated name.
    pub fn create_index<S: AsRef<str>>(&self, table: &str, columns: &[S]) -> Result<String> {
        let table = normalize_table_name(table)?;
        let columns = columns
            .iter()
            .map(|c| normalize_column_name(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Err(DatasetError::invalid("an index needs at least one column"));
        }
        let name = index_name(&table, &columns);
        let sql = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(&name),
            quote_ident(&table),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.conn.execute(&sql, [])?;
        debug!(table = %table, index = %name, "created index");
        Ok(name)
    }

    /// Every row of `table`.
    pub fn find_all(&self, table: &str) -> Result<Vec<Row>> {
        let table = normalize_table_name(table)?;
        let sql = format!("SELECT * FROM {}", quote_ident(&table));
        self.query(&sql, [], |rows| rows.collect())
    }
}

/// The first non-null value of each column, used to type new columns.
fn sample_row(columns: &[String], rows: &[Row]) -> Row {
    columns
        .iter()
        .map(|column| {
            let value = rows
                .iter()
                .filter_map(|row| row.get(column))
                .find(|value| !value.is_null())
                .cloned()
                .unwrap_or(Value::Null);
            (column.clone(), value)
        })
        .collect()
}

/// Renames keys that differ only by ASCII case onto the first spelling
/// seen in the chunk. A row holding several spellings keeps the last value.
fn fold_key_case(rows: &mut [Row]) {
    let mut spellings: Vec<String> = Vec::new();
    for row in rows.iter_mut() {
        let folded: Row = std::mem::take(row)
            .into_iter()
            .map(|(key, value)| {
                match spellings.iter().find(|s| s.eq_ignore_ascii_case(&key)) {
                    Some(first) => (first.clone(), value),
                    None => {
                        spellings.push(key.clone());
                        (key, value)
                    }
                }
            })
            .collect();
        *row = folded;
    }
}

fn contains_ident(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path() {
        assert_eq!(DatasetConfig::new("sqlite://").db_path(), ":memory:");
        assert_eq!(DatasetConfig::new("sqlite:///data.db").db_path(), "data.db");
        assert_eq!(
            DatasetConfig::new("sqlite:////tmp/data.db").db_path(),
            "/tmp/data.db"
        );
        assert_eq!(DatasetConfig::new("plain.db").db_path(), "plain.db");
    }

    #[test]
    fn test_validate() {
        assert!(DatasetConfig::default().validate().is_ok());
        assert!(matches!(
            DatasetConfig::default().with_query_step(Some(0)).validate(),
            Err(DatasetError::Config(_))
        ));
        assert!(matches!(
            DatasetConfig::new("  ").validate(),
            Err(DatasetError::Config(_))
        ));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_fold_key_case() {
        let mut rows = vec![
            Row::new().with_value("Name", "a"),
            Row::new().with_value("NAME", "b").with_value("age", 1),
            Row::new().with_value("name", "c").with_value("Age", 2),
        ];
        fold_key_case(&mut rows);
        let columns = pad_chunk_columns(&mut rows);
        assert_eq!(columns, vec!["Name", "age"]);
        assert_eq!(rows[1].get("Name"), Some(&Value::from("b")));
        assert_eq!(rows[2].get("age"), Some(&Value::Integer(2)));
        assert!(!rows[2].contains_key("name"));
    }

    #[test]
    fn test_sample_row_skips_nulls() {
        let mut rows = vec![
            Row::new().with_value("a", Value::Null),
            Row::new().with_value("a", 2.5),
        ];
        let columns = pad_chunk_columns(&mut rows);
        let sample = sample_row(&columns, &rows);
        assert_eq!(sample.get("a"), Some(&Value::Float(2.5)));
    }
}
