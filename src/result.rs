//! Step-wise iteration over query results.

use crate::error::{DatasetError, Result};
use crate::row::{convert_row, Row};
use crate::types::ColumnType;
use crate::value::{Value, DATE_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::ValueRef;
use rusqlite::{Params, Rows, Statement};
use std::collections::VecDeque;
use tracing::trace;

/// Default number of rows fetched per chunk.
pub const QUERY_STEP: usize = 1000;

const DATETIME_PARSE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Iterates over a result set as [`Row`]s.
///
/// Rows are pulled from SQLite in chunks of `step` (all at once when `step`
/// is `None`). Values are mapped through the declared column types, so a
/// `BOOLEAN` column yields [`Value::Boolean`] and `DATE`/`DATETIME` columns
/// yield chrono values; NPY blobs come back as [`Value::Array`].
pub struct ResultIter<'stmt> {
    rows: Rows<'stmt>,
    keys: Vec<String>,
    decl_types: Vec<Option<ColumnType>>,
    step: Option<usize>,
    buffer: VecDeque<Row>,
    pending_error: Option<DatasetError>,
    exhausted: bool,
}

impl<'stmt> ResultIter<'stmt> {
    /// Executes `stmt` with `params` and wraps the result set.
    ///
    /// A `step` of zero is rejected.
    pub fn query<P: Params>(
        stmt: &'stmt mut Statement<'_>,
        params: P,
        step: Option<usize>,
    ) -> Result<Self> {
        if step == Some(0) {
            return Err(DatasetError::Config(
                "query step must be greater than zero".to_string(),
            ));
        }
        let keys = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let decl_types = stmt
            .columns()
            .iter()
            .map(|c| c.decl_type().and_then(ColumnType::from_decl_type))
            .collect();
        let rows = stmt.query(params)?;
        Ok(Self {
            rows,
            keys,
            decl_types,
            step,
            buffer: VecDeque::new(),
            pending_error: None,
            exhausted: false,
        })
    }

    /// Column names, in select order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Releases the underlying cursor.
    pub fn close(self) {}

    fn fetch_chunk(&mut self) {
        let limit = self.step.unwrap_or(usize::MAX);
        let mut fetched = 0usize;
        while fetched < limit {
            match self.rows.next() {
                Ok(Some(raw)) => {
                    let mut row = Row::with_capacity(self.keys.len());
                    for (idx, key) in self.keys.iter().enumerate() {
                        match raw.get_ref(idx) {
                            Ok(value) => {
                                let decl = self.decl_types.get(idx).copied().flatten();
                                row.insert(key.as_str(), typed_value(value, decl));
                            }
                            Err(e) => {
                                self.pending_error = Some(e.into());
                                self.exhausted = true;
                                return;
                            }
                        }
                    }
                    self.buffer.push_back(row);
                    fetched += 1;
                }
                Ok(None) => {
                    self.exhausted = true;
                    break;
                }
                Err(e) => {
                    self.pending_error = Some(e.into());
                    self.exhausted = true;
                    break;
                }
            }
        }
        trace!(rows = fetched, step = ?self.step, "fetched result chunk");
    }
}

impl Iterator for ResultIter<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_chunk();
        }
        match self.buffer.pop_front() {
            Some(row) => match convert_row(Some(row)) {
                Ok(row) => row.map(Ok),
                Err(e) => {
                    self.buffer.clear();
                    self.pending_error = None;
                    self.exhausted = true;
                    Some(Err(e))
                }
            },
            None => self.pending_error.take().map(Err),
        }
    }
}

fn typed_value(raw: ValueRef<'_>, decl: Option<ColumnType>) -> Value {
    match (decl, raw) {
        (Some(ColumnType::Boolean), ValueRef::Integer(i)) => Value::Boolean(i != 0),
        (Some(ColumnType::Date), ValueRef::Text(text)) => std::str::from_utf8(text)
            .ok()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .map_or_else(|| Value::from(raw), Value::Date),
        (Some(ColumnType::DateTime), ValueRef::Text(text)) => std::str::from_utf8(text)
            .ok()
            .and_then(parse_datetime)
            .map_or_else(|| Value::from(raw), Value::DateTime),
        (_, raw) => Value::from(raw),
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_PARSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}
