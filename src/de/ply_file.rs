use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::marker::PhantomData;
use std::path::Path;

use crate::{de::decode_record, Endianness, PlyError, PlyHeader, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Idle,
    HeaderParsed,
    Streaming,
    Closed,
}

/// Reads a binary PLY file: the header first, then one record at a time.
///
/// Records stored in the other byte order than the host's are swapped while
/// decoding.
pub struct PlyReader<R: BufRead> {
    reader: Option<R>,
    state: ReaderState,
    header: Option<PlyHeader>,
    forced_endianness: Option<Endianness>,
    position: usize,
    row: Vec<u8>,
}

impl PlyReader<BufReader<File>> {
    /// Open the file at `path` and parse its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlyError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PlyError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = PlyReader::new(BufReader::new(file));
        reader.read_header()?;
        Ok(reader)
    }
}

impl<R: BufRead> PlyReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            state: ReaderState::Idle,
            header: None,
            forced_endianness: None,
            position: 0,
            row: Vec::new(),
        }
    }

    /// Parse the header. Calling this again once parsed returns the same header.
    pub fn read_header(&mut self) -> Result<&PlyHeader, PlyError> {
        match self.state {
            ReaderState::Idle => {}
            ReaderState::Closed => return Err(PlyError::ClosedStream),
            ReaderState::HeaderParsed | ReaderState::Streaming => {
                return self.header.as_ref().ok_or(PlyError::HeaderNotRead)
            }
        }

        let reader = self.reader.as_mut().ok_or(PlyError::ClosedStream)?;
        let header = match PlyHeader::parse(reader) {
            Ok(header) => header,
            Err(e) => {
                self.release();
                return Err(e);
            }
        };

        self.row = vec![0; header.schema().record_size()];
        self.state = ReaderState::HeaderParsed;
        let header: &PlyHeader = self.header.insert(header);
        Ok(header)
    }

    pub fn header(&self) -> Option<&PlyHeader> {
        self.header.as_ref()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.header.as_ref().map(|h| h.schema())
    }

    pub fn vertex_count(&self) -> Option<usize> {
        self.header.as_ref().map(|h| h.vertex_count())
    }

    /// Byte order used to decode records: the forced one if set, otherwise
    /// the one declared by the header.
    pub fn endianness(&self) -> Option<Endianness> {
        self.forced_endianness
            .or_else(|| self.header.as_ref().map(|h| h.endianness()))
    }

    /// Decode records as `endianness` regardless of the `format` line.
    pub fn force_endianness(&mut self, endianness: Endianness) {
        self.forced_endianness = Some(endianness);
    }

    /// Number of records read so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.vertex_count().unwrap_or(0).saturating_sub(self.position)
    }

    pub fn is_closed(&self) -> bool {
        self.state == ReaderState::Closed
    }

    /// Read and decode the next record.
    ///
    /// After `vertex_count` records this fails with [`PlyError::EndOfStream`].
    /// A record that cannot be decoded into `T` is skipped and reported; I/O
    /// failures and truncated data close the stream.
    pub fn read_record<T>(&mut self) -> Result<T, PlyError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let (count, endianness) = match (self.state, &self.header) {
            (ReaderState::Closed, _) => return Err(PlyError::ClosedStream),
            (ReaderState::Idle, _) | (_, None) => return Err(PlyError::HeaderNotRead),
            (_, Some(header)) => (
                header.vertex_count(),
                self.forced_endianness.unwrap_or(header.endianness()),
            ),
        };

        if self.position >= count {
            return Err(PlyError::EndOfStream { count });
        }

        let reader = self.reader.as_mut().ok_or(PlyError::ClosedStream)?;
        let filled = match read_full(reader, &mut self.row) {
            Ok(filled) => filled,
            Err(e) => {
                self.release();
                return Err(e.into());
            }
        };
        if filled < self.row.len() {
            let expected = self.row.len();
            self.release();
            return Err(PlyError::TruncatedRecord {
                expected,
                found: filled,
            });
        }

        self.position += 1;
        self.state = ReaderState::Streaming;

        let schema = self.header.as_ref().ok_or(PlyError::HeaderNotRead)?.schema();
        decode_record(&self.row, schema, endianness)
    }

    /// Iterate over the records that have not been read yet.
    pub fn records<T>(&mut self) -> Records<'_, R, T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        Records {
            reader: self,
            _marker: PhantomData,
        }
    }

    /// Release the underlying reader.
    pub fn close(&mut self) -> Result<(), PlyError> {
        if self.state == ReaderState::Closed {
            return Err(PlyError::ClosedStream);
        }
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.reader = None;
        self.state = ReaderState::Closed;
    }
}

/// Iterator returned by [`PlyReader::records`].
pub struct Records<'a, R: BufRead, T> {
    reader: &'a mut PlyReader<R>,
    _marker: PhantomData<T>,
}

impl<R, T> Iterator for Records<'_, R, T>
where
    R: BufRead,
    T: for<'de> serde::Deserialize<'de>,
{
    type Item = Result<T, PlyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_closed() || self.reader.remaining() == 0 {
            return None;
        }
        Some(self.reader.read_record())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.reader.is_closed() {
            return (0, Some(0));
        }
        (0, Some(self.reader.remaining()))
    }
}

/// Fill `buf` as far as the reader allows, returning the number of bytes read.
fn read_full(mut reader: impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
