use core::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ScalarType;

#[derive(Error, Debug)]
pub enum PlyError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PLY header ended before end_header")]
    TruncatedHeader,

    #[error("PLY header has no 'element vertex' line")]
    MissingVertexCount,

    #[error("Invalid PLY header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported PLY format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown property type: {0}")]
    UnknownType(String),

    #[error("Duplicate property name: {0}")]
    DuplicateProperty(String),

    #[error("Invalid property name: {0:?}")]
    InvalidPropertyName(String),

    #[error("Record does not supply property '{0}'")]
    MissingField(String),

    #[error("Value {value} out of range for {ty} property '{property}'")]
    ValueOutOfRange {
        property: String,
        value: String,
        ty: ScalarType,
    },

    #[error("Property '{property}' is {expected}, got {found}")]
    TypeMismatch {
        property: String,
        expected: ScalarType,
        found: &'static str,
    },

    #[error("Truncated record: expected {expected} bytes, found {found}")]
    TruncatedRecord { expected: usize, found: usize },

    #[error("Vertex count mismatch: declared {declared}, written {written}")]
    CountMismatch { declared: usize, written: usize },

    #[error("All {count} vertices have already been read")]
    EndOfStream { count: usize },

    #[error("Stream is closed")]
    ClosedStream,

    #[error("Header must be written before records")]
    HeaderNotWritten,

    #[error("Header has already been written")]
    HeaderAlreadyWritten,

    #[error("Header must be read before records")]
    HeaderNotRead,

    #[error("Ply row must be a struct or map")]
    RowMustBeStructOrMap,

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Serde error: {0}")]
    Serde(String),
}

impl serde::de::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}

impl serde::ser::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}
