//! Numeric arrays and the NPY array-interchange format.
//!
//! Arrays are stored in blob columns using the `.npy` layout:
//!
//! ```text
//! \x93NUMPY | major | minor | header length (u16 LE for 1.0, u32 LE for 2.0/3.0)
//! {'descr': '<f8', 'fortran_order': False, 'shape': (2, 3), }   (space padded, '\n' terminated)
//! raw element bytes
//! ```
//!
//! The preamble plus header is always padded to a multiple of 64 bytes so
//! payloads written here load unchanged in any NPY reader.

use crate::error::{DatasetError, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every NPY payload.
pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

const ARRAY_ALIGN: usize = 64;

/// Returns true when `bytes` starts with the NPY magic.
pub fn is_npy(bytes: &[u8]) -> bool {
    bytes.len() >= NPY_MAGIC.len() && &bytes[..NPY_MAGIC.len()] == NPY_MAGIC
}

/// Serializes an array value for storage in a blob column.
///
/// Only [`Value::Array`] is accepted; everything else is an invalid value.
pub fn ndarray_to_binary(value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Array(array) => Ok(array.to_npy()),
        _ => Err(DatasetError::invalid(
            "The argument has to be a numpy ndarray",
        )),
    }
}

/// Decodes an NPY payload read back from a blob column.
pub fn binary_to_ndarray(bytes: &[u8]) -> Result<NdArray> {
    NdArray::from_npy(bytes)
}

/// Element type of an [`NdArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// The little-endian NPY descriptor written for this type.
    pub fn descr(self) -> &'static str {
        match self {
            Self::Bool => "|b1",
            Self::Int8 => "|i1",
            Self::Int16 => "<i2",
            Self::Int32 => "<i4",
            Self::Int64 => "<i8",
            Self::UInt8 => "|u1",
            Self::UInt16 => "<u2",
            Self::UInt32 => "<u4",
            Self::UInt64 => "<u8",
            Self::Float32 => "<f4",
            Self::Float64 => "<f8",
        }
    }

    fn parse_descr(descr: &str) -> Result<(Self, ByteOrder)> {
        let mut chars = descr.chars();
        let order = match chars.next() {
            Some('<') | Some('|') => ByteOrder::Little,
            Some('>') => ByteOrder::Big,
            Some('=') if cfg!(target_endian = "big") => ByteOrder::Big,
            Some('=') => ByteOrder::Little,
            _ => {
                return Err(DatasetError::decode(format!(
                    "unsupported descriptor '{descr}'"
                )))
            }
        };
        let dtype = match chars.as_str() {
            "b1" => Self::Bool,
            "i1" => Self::Int8,
            "i2" => Self::Int16,
            "i4" => Self::Int32,
            "i8" => Self::Int64,
            "u1" => Self::UInt8,
            "u2" => Self::UInt16,
            "u4" => Self::UInt32,
            "u8" => Self::UInt64,
            "f4" => Self::Float32,
            "f8" => Self::Float64,
            _ => {
                return Err(DatasetError::decode(format!(
                    "unsupported descriptor '{descr}'"
                )))
            }
        };
        Ok((dtype, order))
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descr())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

/// Typed element storage, in the order the elements appear on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! array_data_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for ArrayData {
                fn from(values: Vec<$ty>) -> Self {
                    Self::$variant(values)
                }
            }
        )*
    };
}

array_data_from! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

macro_rules! read_elements {
    ($bytes:expr, $order:expr, $ty:ty) => {{
        const N: usize = std::mem::size_of::<$ty>();
        $bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut buf = [0u8; N];
                buf.copy_from_slice(chunk);
                match $order {
                    ByteOrder::Little => <$ty>::from_le_bytes(buf),
                    ByteOrder::Big => <$ty>::from_be_bytes(buf),
                }
            })
            .collect::<Vec<$ty>>()
    }};
}

macro_rules! write_elements {
    ($out:expr, $values:expr) => {
        for v in $values {
            $out.extend_from_slice(&v.to_le_bytes());
        }
    };
}

impl ArrayData {
    pub fn dtype(&self) -> DType {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::Int8(_) => DType::Int8,
            Self::Int16(_) => DType::Int16,
            Self::Int32(_) => DType::Int32,
            Self::Int64(_) => DType::Int64,
            Self::UInt8(_) => DType::UInt8,
            Self::UInt16(_) => DType::UInt16,
            Self::UInt32(_) => DType::UInt32,
            Self::UInt64(_) => DType::UInt64,
            Self::Float32(_) => DType::Float32,
            Self::Float64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_le(&self, out: &mut Vec<u8>) {
        match self {
            Self::Bool(v) => out.extend(v.iter().map(|&b| u8::from(b))),
            Self::Int8(v) => write_elements!(out, v),
            Self::Int16(v) => write_elements!(out, v),
            Self::Int32(v) => write_elements!(out, v),
            Self::Int64(v) => write_elements!(out, v),
            Self::UInt8(v) => out.extend_from_slice(v),
            Self::UInt16(v) => write_elements!(out, v),
            Self::UInt32(v) => write_elements!(out, v),
            Self::UInt64(v) => write_elements!(out, v),
            Self::Float32(v) => write_elements!(out, v),
            Self::Float64(v) => write_elements!(out, v),
        }
    }

    fn read(dtype: DType, order: ByteOrder, bytes: &[u8]) -> Self {
        match dtype {
            DType::Bool => Self::Bool(bytes.iter().map(|&b| b != 0).collect()),
            DType::Int8 => Self::Int8(bytes.iter().map(|&b| b as i8).collect()),
            DType::Int16 => Self::Int16(read_elements!(bytes, order, i16)),
            DType::Int32 => Self::Int32(read_elements!(bytes, order, i32)),
            DType::Int64 => Self::Int64(read_elements!(bytes, order, i64)),
            DType::UInt8 => Self::UInt8(bytes.to_vec()),
            DType::UInt16 => Self::UInt16(read_elements!(bytes, order, u16)),
            DType::UInt32 => Self::UInt32(read_elements!(bytes, order, u32)),
            DType::UInt64 => Self::UInt64(read_elements!(bytes, order, u64)),
            DType::Float32 => Self::Float32(read_elements!(bytes, order, f32)),
            DType::Float64 => Self::Float64(read_elements!(bytes, order, f64)),
        }
    }
}

/// An n-dimensional numeric array, as stored in blob columns.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    fortran_order: bool,
    data: ArrayData,
}

impl NdArray {
    /// Builds an array, checking that `shape` covers exactly the elements
    /// in `data`. An empty shape describes a single scalar element.
    pub fn new(shape: Vec<usize>, data: impl Into<ArrayData>) -> Result<Self> {
        let data = data.into();
        let expected = element_count(&shape).ok_or_else(|| {
            DatasetError::invalid(format!("array shape {shape:?} is too large"))
        })?;
        if expected != data.len() {
            return Err(DatasetError::invalid(format!(
                "array shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            shape,
            fortran_order: false,
            data,
        })
    }

    /// One-dimensional array over `data`.
    pub fn from_vec(data: impl Into<ArrayData>) -> Self {
        let data = data.into();
        Self {
            shape: vec![data.len()],
            fortran_order: false,
            data,
        }
    }

    pub fn with_fortran_order(mut self, fortran_order: bool) -> Self {
        self.fortran_order = fortran_order;
        self
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn fortran_order(&self) -> bool {
        self.fortran_order
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Encodes the array as an NPY payload.
    pub fn to_npy(&self) -> Vec<u8> {
        let mut header = format!(
            "{{'descr': '{}', 'fortran_order': {}, 'shape': {}, }}",
            self.dtype().descr(),
            if self.fortran_order { "True" } else { "False" },
            shape_literal(&self.shape),
        )
        .into_bytes();

        // 1.0 stores the header length in a u16; fall back to 2.0 otherwise.
        let (version, prefix_len) = match padded_header_len(header.len(), 10) {
            len if len <= usize::from(u16::MAX) => (1u8, 10),
            _ => (2u8, 12),
        };
        let total_header = padded_header_len(header.len(), prefix_len);
        header.resize(total_header - 1, b' ');
        header.push(b'\n');

        let mut out =
            Vec::with_capacity(prefix_len + header.len() + self.len() * self.dtype().size());
        out.extend_from_slice(NPY_MAGIC);
        out.push(version);
        out.push(0);
        if version == 1 {
            out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        } else {
            out.extend_from_slice(&(header.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(&header);
        self.data.write_le(&mut out);
        out
    }

    /// Decodes an NPY payload (format versions 1.0, 2.0 and 3.0).
    pub fn from_npy(bytes: &[u8]) -> Result<Self> {
        if !is_npy(bytes) {
            return Err(DatasetError::decode("missing NPY magic"));
        }
        let major = *bytes
            .get(6)
            .ok_or_else(|| DatasetError::decode("truncated NPY preamble"))?;
        let (header_len, header_start) = match major {
            1 => {
                let raw = bytes
                    .get(8..10)
                    .ok_or_else(|| DatasetError::decode("truncated NPY preamble"))?;
                (usize::from(u16::from_le_bytes([raw[0], raw[1]])), 10)
            }
            2 | 3 => {
                let raw = bytes
                    .get(8..12)
                    .ok_or_else(|| DatasetError::decode("truncated NPY preamble"))?;
                let len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                (len as usize, 12)
            }
            other => {
                return Err(DatasetError::decode(format!(
                    "unsupported NPY format version {other}"
                )))
            }
        };
        let header_end = header_start + header_len;
        let raw_header = bytes
            .get(header_start..header_end)
            .ok_or_else(|| DatasetError::decode("truncated NPY header"))?;
        let header_text: String = if major == 3 {
            std::str::from_utf8(raw_header)
                .map_err(|e| DatasetError::decode(format!("header is not UTF-8: {e}")))?
                .to_string()
        } else {
            raw_header.iter().map(|&b| char::from(b)).collect()
        };
        let header = Header::parse(&header_text)?;
        let (dtype, order) = DType::parse_descr(&header.descr)?;

        let count = element_count(&header.shape)
            .ok_or_else(|| DatasetError::decode("array shape is too large"))?;
        let payload = &bytes[header_end..];
        let expected = count
            .checked_mul(dtype.size())
            .ok_or_else(|| DatasetError::decode("array shape is too large"))?;
        if payload.len() != expected {
            return Err(DatasetError::decode(format!(
                "expected {} bytes of {} data, found {}",
                expected,
                dtype,
                payload.len()
            )));
        }

        Ok(Self {
            shape: header.shape,
            fortran_order: header.fortran_order,
            data: ArrayData::read(dtype, order, payload),
        })
    }
}

fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Header length (text plus padding plus newline) that aligns the data
/// section for a preamble of `prefix_len` bytes.
fn padded_header_len(text_len: usize, prefix_len: usize) -> usize {
    let unpadded = text_len + 1;
    let pad = ARRAY_ALIGN - ((prefix_len + unpadded) % ARRAY_ALIGN);
    unpadded + pad
}

fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [only] => format!("({only},)"),
        dims => {
            let parts: Vec<String> = dims.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}

#[derive(Debug)]
struct Header {
    descr: String,
    fortran_order: bool,
    shape: Vec<usize>,
}

impl Header {
    fn parse(text: &str) -> Result<Self> {
        let mut cursor = Cursor {
            rest: text.trim(),
        };
        let mut descr = None;
        let mut fortran_order = None;
        let mut shape = None;

        cursor.expect('{')?;
        loop {
            cursor.skip_ws();
            if cursor.eat('}') {
                break;
            }
            let key = cursor.string()?;
            cursor.skip_ws();
            cursor.expect(':')?;
            cursor.skip_ws();
            match key.as_str() {
                "descr" => descr = Some(cursor.string()?),
                "fortran_order" => fortran_order = Some(cursor.boolean()?),
                "shape" => shape = Some(cursor.tuple()?),
                other => {
                    return Err(DatasetError::decode(format!(
                        "unexpected header key '{other}'"
                    )))
                }
            }
            cursor.skip_ws();
            if !cursor.eat(',') {
                cursor.skip_ws();
                cursor.expect('}')?;
                break;
            }
        }
        cursor.skip_ws();
        if !cursor.rest.is_empty() {
            return Err(DatasetError::decode("trailing data after header"));
        }

        Ok(Self {
            descr: descr.ok_or_else(|| DatasetError::decode("header is missing 'descr'"))?,
            fortran_order: fortran_order
                .ok_or_else(|| DatasetError::decode("header is missing 'fortran_order'"))?,
            shape: shape.ok_or_else(|| DatasetError::decode("header is missing 'shape'"))?,
        })
    }
}

/// Minimal reader for the Python dict literal in an NPY header.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, c: char) -> bool {
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(DatasetError::decode(format!(
                "expected '{c}' in header near '{}'",
                self.rest
            )))
        }
    }

    fn string(&mut self) -> Result<String> {
        let quote = match self.rest.chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(DatasetError::decode("expected a quoted string in header")),
        };
        let body = &self.rest[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| DatasetError::decode("unterminated string in header"))?;
        let value = body[..end].to_string();
        self.rest = &body[end + 1..];
        Ok(value)
    }

    fn boolean(&mut self) -> Result<bool> {
        if let Some(rest) = self.rest.strip_prefix("True") {
            self.rest = rest;
            Ok(true)
        } else if let Some(rest) = self.rest.strip_prefix("False") {
            self.rest = rest;
            Ok(false)
        } else {
            Err(DatasetError::decode("expected True or False in header"))
        }
    }

    fn tuple(&mut self) -> Result<Vec<usize>> {
        self.expect('(')?;
        let mut dims = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(')') {
                return Ok(dims);
            }
            let digits = self
                .rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(self.rest.len());
            if digits == 0 {
                return Err(DatasetError::decode("expected a dimension in shape"));
            }
            let dim = self.rest[..digits]
                .parse::<usize>()
                .map_err(|e| DatasetError::decode(format!("bad dimension: {e}")))?;
            dims.push(dim);
            self.rest = &self.rest[digits..];
            // Python 2 long suffix.
            self.eat('L');
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                self.expect(')')?;
                return Ok(dims);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_aligned_to_64_bytes() {
        let array = NdArray::new(vec![2, 3], vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let bytes = array.to_npy();

        assert!(is_npy(&bytes));
        assert_eq!(&bytes[6..8], &[1, 0]);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 6 * 8);

        let header = std::str::from_utf8(&bytes[10..10 + header_len]).unwrap();
        assert!(header.starts_with(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 3), }"
        ));
    }

    #[test]
    fn test_shape_literals() {
        assert_eq!(shape_literal(&[]), "()");
        assert_eq!(shape_literal(&[4]), "(4,)");
        assert_eq!(shape_literal(&[2, 3, 4]), "(2, 3, 4)");
    }

    #[test]
    fn test_round_trip_preserves_dtype_shape_and_order() {
        let array = NdArray::new(vec![2, 2], vec![1i32, -2, 3, -4])
            .unwrap()
            .with_fortran_order(true);
        let decoded = binary_to_ndarray(&array.to_npy()).unwrap();
        assert_eq!(decoded, array);
        assert_eq!(decoded.dtype(), DType::Int32);
        assert!(decoded.fortran_order());
    }

    #[test]
    fn test_scalar_and_empty_arrays() {
        let scalar = NdArray::new(vec![], vec![7u8]).unwrap();
        assert_eq!(NdArray::from_npy(&scalar.to_npy()).unwrap(), scalar);

        let empty = NdArray::new(vec![0, 3], Vec::<f32>::new()).unwrap();
        let decoded = NdArray::from_npy(&empty.to_npy()).unwrap();
        assert_eq!(decoded.shape(), &[0, 3]);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decodes_big_endian_payload() {
        let header = "{'descr': '>i2', 'fortran_order': False, 'shape': (2,), }";
        let mut bytes = NPY_MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0x01, 0x02, 0xff, 0xfe]);

        let array = NdArray::from_npy(&bytes).unwrap();
        assert_eq!(array.data(), &ArrayData::Int16(vec![0x0102, -2]));
    }

    #[test]
    fn test_decodes_version_two_header() {
        let header = "{\"descr\": \"|b1\", \"fortran_order\": False, \"shape\": (3L,)}\n";
        let mut bytes = NPY_MAGIC.to_vec();
        bytes.extend_from_slice(&[2, 0]);
        bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[1, 0, 1]);

        let array = NdArray::from_npy(&bytes).unwrap();
        assert_eq!(array.data(), &ArrayData::Bool(vec![true, false, true]));
    }

    #[test]
    fn test_decodes_version_three_utf8_header() {
        let header = "{'descr': '<u2', 'fortran_order': False, 'shape': (2,), }        \n";
        let mut bytes = NPY_MAGIC.to_vec();
        bytes.extend_from_slice(&[3, 0]);
        bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0x01, 0x00, 0x00, 0x01]);

        let array = NdArray::from_npy(&bytes).unwrap();
        assert_eq!(array.data(), &ArrayData::UInt16(vec![1, 256]));

        // Version 3 headers must be valid UTF-8.
        let mut broken = bytes.clone();
        broken[12] = 0xff;
        assert!(matches!(
            NdArray::from_npy(&broken),
            Err(DatasetError::Decode(_))
        ));
    }

    #[test]
    fn test_large_header_is_written_as_version_two() {
        // Each unit dimension adds "1, " to the header, pushing it past u16::MAX.
        let array = NdArray::new(vec![1; 22_000], vec![42i64]).unwrap();
        let bytes = array.to_npy();

        assert_eq!(&bytes[6..8], &[2, 0]);
        let header_len =
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        assert!(header_len > usize::from(u16::MAX));
        assert_eq!((12 + header_len) % 64, 0);
        assert_eq!(bytes[12 + header_len - 1], b'\n');

        let decoded = NdArray::from_npy(&bytes).unwrap();
        assert_eq!(decoded.ndim(), 22_000);
        assert_eq!(decoded, array);
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        let good = NdArray::from_vec(vec![1.5f64, 2.5]).to_npy();

        let truncated = &good[..good.len() - 1];
        assert!(matches!(
            NdArray::from_npy(truncated),
            Err(DatasetError::Decode(_))
        ));
        assert!(matches!(
            NdArray::from_npy(b"\x93NUMPY"),
            Err(DatasetError::Decode(_))
        ));
        assert!(matches!(
            NdArray::from_npy(b"not an array"),
            Err(DatasetError::Decode(_))
        ));

        let mut bad_version = good.clone();
        bad_version[6] = 9;
        assert!(matches!(
            NdArray::from_npy(&bad_version),
            Err(DatasetError::Decode(_))
        ));
    }

    #[test]
    fn test_shape_must_match_elements() {
        let err = NdArray::new(vec![2, 2], vec![1i64, 2, 3]).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidValue(_)));
    }

    #[test]
    fn test_non_array_values_are_rejected() {
        let err = ndarray_to_binary(&Value::Integer(3)).unwrap_err();
        assert_eq!(err.to_string(), "The argument has to be a numpy ndarray");

        let array = NdArray::from_vec(vec![1u16, 2, 3]);
        let bytes = ndarray_to_binary(&Value::Array(array.clone())).unwrap();
        assert_eq!(bytes, array.to_npy());
    }
}
