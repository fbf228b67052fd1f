//! Row and type conversion utilities on top of SQLite.
//!
//! # Intention
//!
//! - Infer column types from sample values.
//! - Normalize column, table and index names.
//! - Turn result sets into ordered rows.
//! - Store numeric arrays in blob columns using the NPY format.
//!
//! # Architectural Boundaries
//!
//! - Connections, SQL execution and transactions belong to rusqlite.
//! - No query building, migrations or dialect handling.

pub mod error;
pub mod ident;
pub mod npy;
pub mod result;
pub mod row;
pub mod sqlite;
pub mod types;
pub mod value;

pub use error::{DatasetError, Result};
pub use ident::{index_name, normalize_column_name, normalize_table_name, safe_url};
pub use npy::{binary_to_ndarray, is_npy, ndarray_to_binary, ArrayData, DType, NdArray, NPY_MAGIC};
pub use result::{ResultIter, QUERY_STEP};
pub use row::{convert_blobs, convert_row, pad_chunk_columns, Row};
pub use sqlite::{Database, DatasetConfig};
pub use types::ColumnType;
pub use value::Value;
