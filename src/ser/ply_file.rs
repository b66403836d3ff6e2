use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::warn;
use serde::Serialize;

use crate::{ser::encode_record_into, PlyError, PlyHeader, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Idle,
    HeaderWritten,
    Streaming,
    Closed,
}

/// Streams a binary PLY file: the header first, then one record at a time.
///
/// The header always declares the host's byte order and records are written
/// in that order. Exactly as many records as declared must be written before
/// [`PlyWriter::finish`].
pub struct PlyWriter<W: Write> {
    writer: Option<W>,
    state: WriterState,
    header: Option<PlyHeader>,
    written: usize,
    row: Vec<u8>,
}

impl PlyWriter<BufWriter<File>> {
    /// Create the file at `path` and write its header.
    pub fn create(
        path: impl AsRef<Path>,
        schema: Schema,
        vertex_count: usize,
    ) -> Result<Self, PlyError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| PlyError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut writer = PlyWriter::new(BufWriter::new(file));
        writer.write_header(schema, vertex_count)?;
        Ok(writer)
    }
}

impl<W: Write> PlyWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            state: WriterState::Idle,
            header: None,
            written: 0,
            row: Vec::new(),
        }
    }

    pub fn header(&self) -> Option<&PlyHeader> {
        self.header.as_ref()
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn is_closed(&self) -> bool {
        self.state == WriterState::Closed
    }

    pub fn write_header(&mut self, schema: Schema, vertex_count: usize) -> Result<(), PlyError> {
        match self.state {
            WriterState::Idle => {}
            WriterState::Closed => return Err(PlyError::ClosedStream),
            WriterState::HeaderWritten | WriterState::Streaming => {
                return Err(PlyError::HeaderAlreadyWritten)
            }
        }

        let header = PlyHeader::new(schema, vertex_count);
        let writer = self.writer.as_mut().ok_or(PlyError::ClosedStream)?;
        if let Err(e) = header.write_to(writer) {
            self.release();
            return Err(e);
        }

        self.row = vec![0; header.schema().record_size()];
        self.header = Some(header);
        self.state = WriterState::HeaderWritten;
        Ok(())
    }

    /// Encode and write one record.
    ///
    /// A record the schema cannot encode is rejected before anything is
    /// written and the stream stays usable. I/O failures close the stream.
    pub fn write_record<T>(&mut self, record: &T) -> Result<(), PlyError>
    where
        T: Serialize + ?Sized,
    {
        match self.state {
            WriterState::Idle => return Err(PlyError::HeaderNotWritten),
            WriterState::Closed => return Err(PlyError::ClosedStream),
            WriterState::HeaderWritten | WriterState::Streaming => {}
        }

        let (Some(header), Some(writer)) = (&self.header, self.writer.as_mut()) else {
            return Err(PlyError::ClosedStream);
        };
        encode_record_into(record, header.schema(), &mut self.row)?;

        if let Err(e) = writer.write_all(&self.row) {
            self.release();
            return Err(e.into());
        }

        self.written += 1;
        self.state = WriterState::Streaming;
        Ok(())
    }

    /// Flush and close the stream, handing back the underlying sink.
    ///
    /// Fails with [`PlyError::CountMismatch`] when the number of records
    /// written differs from the declared vertex count. The stream is closed
    /// either way.
    pub fn finish(&mut self) -> Result<W, PlyError> {
        let declared = match (&self.state, &self.header) {
            (WriterState::Closed, _) => return Err(PlyError::ClosedStream),
            (WriterState::Idle, _) | (_, None) => return Err(PlyError::HeaderNotWritten),
            (_, Some(header)) => header.vertex_count(),
        };

        let mut writer = self.writer.take().ok_or(PlyError::ClosedStream)?;
        self.state = WriterState::Closed;
        writer.flush()?;

        if self.written != declared {
            return Err(PlyError::CountMismatch {
                declared,
                written: self.written,
            });
        }
        Ok(writer)
    }

    fn release(&mut self) {
        self.writer = None;
        self.state = WriterState::Closed;
    }
}

impl<W: Write> Drop for PlyWriter<W> {
    fn drop(&mut self) {
        if self.writer.is_some() && self.state != WriterState::Idle {
            warn!(
                "PlyWriter dropped without finish() after {} of {} vertices",
                self.written,
                self.header.as_ref().map_or(0, |h| h.vertex_count())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Point {
        x: f32,
        i: u8,
    }

    fn schema() -> Schema {
        Schema::define([("x", "float"), ("i", "uchar")]).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let mut writer = PlyWriter::new(Vec::new());
        assert!(matches!(
            writer.write_record(&Point { x: 0.0, i: 0 }),
            Err(PlyError::HeaderNotWritten)
        ));

        writer.write_header(schema(), 1).unwrap();
        assert!(matches!(
            writer.write_header(schema(), 1),
            Err(PlyError::HeaderAlreadyWritten)
        ));

        writer.write_record(&Point { x: 2.0, i: 9 }).unwrap();
        assert_eq!(writer.written(), 1);

        let bytes = writer.finish().unwrap();
        assert!(writer.is_closed());
        let mut body = 2.0f32.to_ne_bytes().to_vec();
        body.push(9);
        assert!(bytes.ends_with(&body));

        assert!(matches!(writer.finish(), Err(PlyError::ClosedStream)));
        assert!(matches!(
            writer.write_record(&Point { x: 0.0, i: 0 }),
            Err(PlyError::ClosedStream)
        ));
        assert!(matches!(
            writer.write_header(schema(), 1),
            Err(PlyError::ClosedStream)
        ));
    }

    #[test]
    fn test_finish_without_header() {
        let mut writer = PlyWriter::new(Vec::new());
        assert!(matches!(writer.finish(), Err(PlyError::HeaderNotWritten)));
        assert!(!writer.is_closed());
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_io_error_closes_stream() {
        let mut writer = PlyWriter::new(FailingSink);
        assert!(matches!(
            writer.write_header(schema(), 1),
            Err(PlyError::Io(_))
        ));
        assert!(writer.is_closed());
        assert!(matches!(
            writer.write_record(&Point { x: 0.0, i: 0 }),
            Err(PlyError::ClosedStream)
        ));
    }
}
