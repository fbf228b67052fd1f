//! Column types and type inference from sample values.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The column types a table can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    String,
    Text,
    Float,
    BigInt,
    Boolean,
    Date,
    DateTime,
    Blob,
}

impl ColumnType {
    pub const ALL: [ColumnType; 9] = [
        Self::Integer,
        Self::String,
        Self::Text,
        Self::Float,
        Self::BigInt,
        Self::Boolean,
        Self::Date,
        Self::DateTime,
        Self::Blob,
    ];

    /// Picks a column type for a field given one sample value.
    pub fn guess(sample: &Value) -> Self {
        match sample {
            Value::Boolean(_) => Self::Boolean,
            Value::Integer(_) => Self::Integer,
            Value::Float(_) => Self::Float,
            Value::DateTime(_) => Self::DateTime,
            Value::Date(_) => Self::Date,
            Value::Array(_) => Self::Blob,
            Value::Null | Value::Text(_) | Value::Blob(_) => Self::Text,
        }
    }

    /// Like [`ColumnType::guess`], but an explicitly requested type wins.
    pub fn guess_or(explicit: Option<Self>, sample: &Value) -> Self {
        explicit.unwrap_or_else(|| Self::guess(sample))
    }

    /// Type name used in `CREATE TABLE` / `ADD COLUMN` statements.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::String => "VARCHAR",
            Self::Text => "TEXT",
            Self::Float => "FLOAT",
            Self::BigInt => "BIGINT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Blob => "BLOB",
        }
    }

    /// Maps a declared column type (as reported by SQLite) back onto a
    /// column type. Length suffixes such as `VARCHAR(255)` are ignored.
    pub fn from_decl_type(decl: &str) -> Option<Self> {
        let base = decl
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();
        match base.as_str() {
            "INTEGER" | "INT" => Some(Self::Integer),
            "VARCHAR" | "CHAR" | "NVARCHAR" => Some(Self::String),
            "TEXT" | "CLOB" => Some(Self::Text),
            "FLOAT" | "REAL" | "DOUBLE" => Some(Self::Float),
            "BIGINT" => Some(Self::BigInt),
            "BOOLEAN" | "BOOL" => Some(Self::Boolean),
            "DATE" => Some(Self::Date),
            "DATETIME" | "TIMESTAMP" => Some(Self::DateTime),
            "BLOB" => Some(Self::Blob),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npy::NdArray;
    use chrono::NaiveDate;

    #[test]
    fn test_guess() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let datetime = date.and_hms_opt(8, 30, 0).unwrap();

        assert_eq!(ColumnType::guess(&Value::Boolean(false)), ColumnType::Boolean);
        assert_eq!(ColumnType::guess(&Value::Integer(1)), ColumnType::Integer);
        assert_eq!(ColumnType::guess(&Value::Float(1.5)), ColumnType::Float);
        assert_eq!(ColumnType::guess(&Value::DateTime(datetime)), ColumnType::DateTime);
        assert_eq!(ColumnType::guess(&Value::Date(date)), ColumnType::Date);
        assert_eq!(
            ColumnType::guess(&Value::Array(NdArray::from_vec(vec![1i64]))),
            ColumnType::Blob
        );
        assert_eq!(ColumnType::guess(&Value::from("hi")), ColumnType::Text);
        assert_eq!(ColumnType::guess(&Value::Null), ColumnType::Text);
        assert_eq!(ColumnType::guess(&Value::Blob(vec![1])), ColumnType::Text);
    }

    #[test]
    fn test_explicit_type_wins() {
        assert_eq!(
            ColumnType::guess_or(Some(ColumnType::BigInt), &Value::from("x")),
            ColumnType::BigInt
        );
        assert_eq!(
            ColumnType::guess_or(None, &Value::Float(0.0)),
            ColumnType::Float
        );
    }

    #[test]
    fn test_decl_type_round_trip() {
        for ty in ColumnType::ALL {
            assert_eq!(ColumnType::from_decl_type(ty.sql_type()), Some(ty));
        }
        assert_eq!(
            ColumnType::from_decl_type("varchar(255)"),
            Some(ColumnType::String)
        );
        assert_eq!(ColumnType::from_decl_type("NUMERIC"), None);
    }
}
