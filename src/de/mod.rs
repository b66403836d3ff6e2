mod ply_file;
mod row;

pub(crate) mod val_reader;

use std::io::BufRead;
use std::path::Path;

pub use ply_file::{PlyReader, Records};

use crate::{de::row::RowDeserializer, Endianness, PlyError, PlyHeader, Schema};

/// Decode one packed row laid out by `schema` and stored in `endianness`
/// byte order.
///
/// Properties are handed to `T` by name. Fields of `T` that the schema does
/// not define must carry a serde default.
pub fn decode_record<T>(row: &[u8], schema: &Schema, endianness: Endianness) -> Result<T, PlyError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let size = schema.record_size();
    if row.len() < size {
        return Err(PlyError::TruncatedRecord {
            expected: size,
            found: row.len(),
        });
    }

    T::deserialize(RowDeserializer::new(
        schema,
        &row[..size],
        endianness.needs_swap(),
    ))
}

/// Read a complete PLY file: the header and every vertex record.
pub fn from_reader<R, T>(reader: R) -> Result<(PlyHeader, Vec<T>), PlyError>
where
    R: BufRead,
    T: for<'de> serde::Deserialize<'de>,
{
    let mut ply = PlyReader::new(reader);
    let header = ply.read_header()?.clone();
    let records = ply.records().collect::<Result<Vec<T>, _>>()?;
    Ok((header, records))
}

pub fn from_bytes<T>(bytes: &[u8]) -> Result<(PlyHeader, Vec<T>), PlyError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    from_reader(bytes)
}

/// Open the file at `path` and read every vertex record from it.
pub fn read_file<T>(path: impl AsRef<Path>) -> Result<(PlyHeader, Vec<T>), PlyError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let mut ply = PlyReader::open(path)?;
    let header = ply.header().cloned().ok_or(PlyError::HeaderNotRead)?;
    let records = ply.records().collect::<Result<Vec<T>, _>>()?;
    ply.close()?;
    Ok((header, records))
}
