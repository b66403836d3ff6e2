use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::{ser::row::RowSerializer, PlyError, Schema};

mod ply_file;
mod row;

pub(crate) mod val_writer;

pub use ply_file::PlyWriter;

/// Encode one record into a packed row of `schema.record_size()` bytes, in
/// host byte order.
pub fn encode_record<T>(record: &T, schema: &Schema) -> Result<Vec<u8>, PlyError>
where
    T: Serialize + ?Sized,
{
    let mut row = vec![0; schema.record_size()];
    encode_record_into(record, schema, &mut row)?;
    Ok(row)
}

/// Encode one record into the start of `row`, which must hold at least
/// `schema.record_size()` bytes.
pub fn encode_record_into<T>(record: &T, schema: &Schema, row: &mut [u8]) -> Result<(), PlyError>
where
    T: Serialize + ?Sized,
{
    let size = schema.record_size();
    if row.len() < size {
        return Err(PlyError::TruncatedRecord {
            expected: size,
            found: row.len(),
        });
    }
    let row = &mut row[..size];
    row.fill(0);
    record.serialize(&mut RowSerializer::new(schema, row))
}

/// Write a complete PLY file holding `records`.
pub fn to_writer<W, T>(writer: W, schema: &Schema, records: &[T]) -> Result<(), PlyError>
where
    W: Write,
    T: Serialize,
{
    let mut ply = PlyWriter::new(writer);
    ply.write_header(schema.clone(), records.len())?;
    for record in records {
        ply.write_record(record)?;
    }
    ply.finish()?;
    Ok(())
}

/// Serialize a complete PLY file holding `records` into memory.
pub fn to_bytes<T>(schema: &Schema, records: &[T]) -> Result<Vec<u8>, PlyError>
where
    T: Serialize,
{
    let mut buf = vec![];
    to_writer(&mut buf, schema, records)?;
    Ok(buf)
}

/// Create the file at `path` and write `records` into it.
pub fn write_file<T>(path: impl AsRef<Path>, schema: &Schema, records: &[T]) -> Result<(), PlyError>
where
    T: Serialize,
{
    let mut ply = PlyWriter::create(path, schema.clone(), records.len())?;
    for record in records {
        ply.write_record(record)?;
    }
    ply.finish()?;
    Ok(())
}
