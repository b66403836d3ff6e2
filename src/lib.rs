//! A Serde-based reader and writer for binary PLY vertex data.
//!
//! A [`Schema`] describes the properties of one vertex record: their names,
//! scalar types and order. Records are plain Rust structs bound to the schema
//! by field name through their `Serialize` / `Deserialize` implementations.
//! Files are written in the host's byte order; files in the other byte order
//! are swapped while reading.
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_ply_binary::{PlyReader, PlyWriter, Schema};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Vertex {
//!     x: f32,
//!     y: f32,
//!     z: f32,
//! }
//!
//! let schema = Schema::define([("x", "float"), ("y", "float"), ("z", "float")]).unwrap();
//!
//! let mut writer = PlyWriter::new(Vec::new());
//! writer.write_header(schema, 1).unwrap();
//! writer.write_record(&Vertex { x: 1.0, y: 2.0, z: 3.0 }).unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let mut reader = PlyReader::new(bytes.as_slice());
//! let header = reader.read_header().unwrap();
//! println!("Found {} vertices", header.vertex_count());
//!
//! let vertex: Vertex = reader.read_record().unwrap();
//! assert_eq!(vertex, Vertex { x: 1.0, y: 2.0, z: 3.0 });
//! ```

pub mod de;
pub mod endian;
mod error;
mod header;
mod schema;
pub mod ser;

pub use de::{decode_record, from_bytes, from_reader, read_file, PlyReader};
pub use endian::Endianness;
pub use error::PlyError;
pub use header::PlyHeader;
pub use schema::{FieldDescriptor, Schema};
pub use ser::{encode_record, to_bytes, to_writer, write_file, PlyWriter};

use std::fmt;
use std::str::FromStr;

/// PLY scalar data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    pub const ALL: [ScalarType; 8] = [
        ScalarType::I8,
        ScalarType::U8,
        ScalarType::I16,
        ScalarType::U16,
        ScalarType::I32,
        ScalarType::U32,
        ScalarType::F32,
        ScalarType::F64,
    ];

    /// Resolve a canonical PLY type name. Names are matched exactly.
    pub fn parse(s: &str) -> Result<Self, PlyError> {
        match s {
            "char" => Ok(ScalarType::I8),
            "uchar" => Ok(ScalarType::U8),
            "short" => Ok(ScalarType::I16),
            "ushort" => Ok(ScalarType::U16),
            "int" => Ok(ScalarType::I32),
            "uint" => Ok(ScalarType::U32),
            "float" => Ok(ScalarType::F32),
            "double" => Ok(ScalarType::F64),
            _ => Err(PlyError::UnknownType(s.to_string())),
        }
    }

    /// Name used for this type on `property` lines.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::I8 => "char",
            ScalarType::U8 => "uchar",
            ScalarType::I16 => "short",
            ScalarType::U16 => "ushort",
            ScalarType::I32 => "int",
            ScalarType::U32 => "uint",
            ScalarType::F32 => "float",
            ScalarType::F64 => "double",
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }
}

impl FromStr for ScalarType {
    type Err = PlyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_parsing() {
        assert_eq!(ScalarType::parse("float").unwrap(), ScalarType::F32);
        assert_eq!(ScalarType::parse("double").unwrap(), ScalarType::F64);
        assert_eq!(ScalarType::parse("int").unwrap(), ScalarType::I32);
        assert_eq!("uchar".parse::<ScalarType>().unwrap(), ScalarType::U8);

        assert!(ScalarType::parse("invalid_type").is_err());
        assert!(ScalarType::parse("float32").is_err());
        assert!(ScalarType::parse("Float").is_err());
    }

    #[test]
    fn test_scalar_type_names_round_trip() {
        for ty in ScalarType::ALL {
            assert_eq!(ScalarType::parse(ty.name()).unwrap(), ty);
        }

        let widths: Vec<usize> = ScalarType::ALL.iter().map(|t| t.size_bytes()).collect();
        assert_eq!(widths, vec![1, 1, 2, 2, 4, 4, 4, 8]);
    }
}
