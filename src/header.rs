use std::fmt;
use std::io::{BufRead, Write};

use log::{debug, trace};

use crate::{Endianness, PlyError, ScalarType, Schema};

/// Header of a binary PLY file holding a single vertex element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyHeader {
    vertex_count: usize,
    endianness: Endianness,
    schema: Schema,
}

impl PlyHeader {
    /// Header for `vertex_count` records written in the host's byte order.
    pub fn new(schema: Schema, vertex_count: usize) -> Self {
        Self::with_endianness(schema, vertex_count, Endianness::host())
    }

    pub fn with_endianness(schema: Schema, vertex_count: usize, endianness: Endianness) -> Self {
        Self {
            vertex_count,
            endianness,
            schema,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }

    /// Parse a PLY header from a reader.
    ///
    /// Reads up to and including the `end_header` line, leaving the reader at
    /// the first byte of vertex data.
    pub fn parse<R: BufRead>(mut reader: R) -> Result<Self, PlyError> {
        let mut buf = Vec::new();
        let mut vertex_count = None;
        let mut endianness = None;
        let mut schema = Schema::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Err(PlyError::TruncatedHeader);
            }

            let raw = strip_line_ending(&buf);
            if raw == b"end_header" {
                break;
            }

            // Only lines we interpret need to be text; comments may hold any bytes.
            let keyword = raw
                .split(|b| b.is_ascii_whitespace())
                .find(|token| !token.is_empty())
                .unwrap_or_default();
            if !matches!(keyword, b"format" | b"element" | b"property") {
                trace!(
                    "Ignoring PLY header line: {:?}",
                    String::from_utf8_lossy(raw)
                );
                continue;
            }

            let line = std::str::from_utf8(raw).map_err(|_| {
                PlyError::InvalidHeader(format!(
                    "Non UTF-8 line: {:?}",
                    String::from_utf8_lossy(raw)
                ))
            })?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["format", kind, ..] => {
                    if endianness.is_some() {
                        return Err(PlyError::InvalidHeader(
                            "Multiple format lines".to_string(),
                        ));
                    }
                    endianness = Some(match *kind {
                        "binary_little_endian" => Endianness::Little,
                        "binary_big_endian" => Endianness::Big,
                        _ => return Err(PlyError::UnsupportedFormat(kind.to_string())),
                    });
                }
                ["element", "vertex", rest @ ..] => {
                    if vertex_count.is_some() {
                        return Err(PlyError::InvalidHeader(
                            "Multiple vertex elements".to_string(),
                        ));
                    }
                    let count = rest.first().ok_or_else(|| {
                        PlyError::InvalidHeader("Invalid element line".to_string())
                    })?;
                    vertex_count = Some(count.parse::<usize>().map_err(|_| {
                        PlyError::InvalidHeader(format!("Invalid element count: {count}"))
                    })?);
                }
                ["property", type_name, name, ..] => {
                    schema.push(*name, ScalarType::parse(type_name)?)?;
                }
                ["property", ..] | ["format"] => {
                    return Err(PlyError::InvalidHeader(format!("Invalid line: {line}")));
                }
                _ => trace!("Ignoring PLY header line: {line:?}"),
            }
        }

        let vertex_count = vertex_count.ok_or(PlyError::MissingVertexCount)?;
        let endianness = endianness.unwrap_or(Endianness::Little);

        debug!(
            "Parsed PLY header: {vertex_count} vertices, {endianness}, {} properties",
            schema.len()
        );

        Ok(PlyHeader {
            vertex_count,
            endianness,
            schema,
        })
    }

    /// Write the textual header, including the trailing `end_header` line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), PlyError> {
        write!(writer, "{self}")?;
        debug!(
            "Wrote PLY header: {} vertices, {}, {} properties",
            self.vertex_count,
            self.endianness,
            self.schema.len()
        );
        Ok(())
    }
}

/// Drop the `\n` (or `\r\n`) terminating a header line.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl fmt::Display for PlyHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ply")?;
        writeln!(f, "format {} 1.0", self.endianness)?;
        writeln!(f, "element vertex {}", self.vertex_count)?;
        for field in &self.schema {
            writeln!(f, "property {} {}", field.ty(), field.name())?;
        }
        writeln!(f, "end_header")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn xyz_rgb() -> Schema {
        Schema::define([
            ("x", "float"),
            ("y", "float"),
            ("z", "float"),
            ("red", "uchar"),
            ("green", "uchar"),
            ("blue", "uchar"),
        ])
        .unwrap()
    }

    #[test]
    fn test_header_text() {
        let header = PlyHeader::with_endianness(xyz_rgb(), 3, Endianness::Little);
        assert_eq!(
            header.to_string(),
            "ply\n\
             format binary_little_endian 1.0\n\
             element vertex 3\n\
             property float x\n\
             property float y\n\
             property float z\n\
             property uchar red\n\
             property uchar green\n\
             property uchar blue\n\
             end_header\n"
        );
    }

    #[test]
    fn test_header_round_trip() {
        for endianness in [Endianness::Little, Endianness::Big] {
            let header = PlyHeader::with_endianness(xyz_rgb(), 42, endianness);
            let mut buf = Vec::new();
            header.write_to(&mut buf).unwrap();
            let parsed = PlyHeader::parse(Cursor::new(buf)).unwrap();
            assert_eq!(parsed, header);
        }
    }

    #[test]
    fn test_header_round_trip_all_types() {
        let schema = Schema::from_fields(
            ScalarType::ALL
                .iter()
                .map(|ty| (format!("{ty}_val"), *ty)),
        )
        .unwrap();
        assert_eq!(schema.record_size(), 26);

        for endianness in [Endianness::Little, Endianness::Big] {
            let header = PlyHeader::with_endianness(schema.clone(), 5, endianness);
            let parsed = PlyHeader::parse(Cursor::new(header.to_string())).unwrap();
            assert_eq!(parsed, header);
        }
    }

    #[test]
    fn test_non_utf8_comment_is_ignored() {
        let text = b"ply\nformat binary_little_endian 1.0\ncomment cr\xe9\xe9 par scanner\nobj_info \xff\xfe\nelement vertex 0\nproperty float x\nend_header\n";
        let header = PlyHeader::parse(Cursor::new(&text[..])).unwrap();
        assert_eq!(header.vertex_count(), 0);
        assert_eq!(header.schema().len(), 1);
    }

    #[test]
    fn test_non_utf8_property_is_rejected() {
        let text = b"ply\nelement vertex 1\nproperty float x\xe9\nend_header\n";
        let err = PlyHeader::parse(Cursor::new(&text[..])).unwrap_err();
        assert!(matches!(err, PlyError::InvalidHeader(_)));
    }

    #[test]
    fn test_binary_body_without_end_header() {
        let mut data = b"ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\n".to_vec();
        data.extend_from_slice(&[0xff, 0x00, 0x80, 0xc0, 0xfe, 0x0a, 0x9a]);
        let err = PlyHeader::parse(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, PlyError::TruncatedHeader));
    }

    #[test]
    fn test_end_header_must_match_exactly() {
        let text = "ply\nelement vertex 0\n  end_header \t\n";
        let err = PlyHeader::parse(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, PlyError::TruncatedHeader));
    }

    #[test]
    fn test_reader_left_at_body() {
        let mut data = b"ply\nformat binary_big_endian 1.0\nelement vertex 1\nproperty uchar v\nend_header\n".to_vec();
        data.push(0x7f);

        let mut cursor = Cursor::new(data);
        let header = PlyHeader::parse(&mut cursor).unwrap();
        assert_eq!(header.endianness(), Endianness::Big);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![0x7f]);
    }

    #[test]
    fn test_line_order_and_ignored_lines() {
        let text = "ply\r\n\
                    comment made by hand\r\n\
                    property int a\r\n\
                    obj_info scanner 3\r\n\
                    element vertex 7\r\n\
                    element face 0\r\n\
                    property double b\r\n\
                    \r\n\
                    end_header\r\n";
        let header = PlyHeader::parse(Cursor::new(text)).unwrap();
        assert_eq!(header.vertex_count(), 7);
        assert_eq!(header.endianness(), Endianness::Little);

        let names: Vec<&str> = header.schema().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(header.schema().get("b").unwrap().offset(), 4);
    }

    #[test]
    fn test_unknown_type() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty weird fieldA\nend_header\n";
        let err = PlyHeader::parse(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, PlyError::UnknownType(name) if name == "weird"));
    }

    #[test]
    fn test_list_property_is_rejected() {
        let text = "ply\nelement vertex 1\nproperty list uchar int idx\nend_header\n";
        let err = PlyHeader::parse(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, PlyError::UnknownType(name) if name == "list"));
    }

    #[test]
    fn test_ascii_unsupported() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n";
        let err = PlyHeader::parse(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, PlyError::UnsupportedFormat(kind) if kind == "ascii"));
    }

    #[test]
    fn test_missing_vertex_count() {
        let text = "ply\nformat binary_little_endian 1.0\nproperty float x\nend_header\n";
        let err = PlyHeader::parse(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, PlyError::MissingVertexCount));
    }

    #[test]
    fn test_truncated_header() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\n";
        let err = PlyHeader::parse(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, PlyError::TruncatedHeader));
    }

    #[test]
    fn test_malformed_lines() {
        let bad_count = "ply\nelement vertex many\nend_header\n";
        assert!(matches!(
            PlyHeader::parse(Cursor::new(bad_count)).unwrap_err(),
            PlyError::InvalidHeader(_)
        ));

        let twice = "ply\nelement vertex 1\nelement vertex 2\nend_header\n";
        assert!(matches!(
            PlyHeader::parse(Cursor::new(twice)).unwrap_err(),
            PlyError::InvalidHeader(_)
        ));

        let short_property = "ply\nelement vertex 1\nproperty float\nend_header\n";
        assert!(matches!(
            PlyHeader::parse(Cursor::new(short_property)).unwrap_err(),
            PlyError::InvalidHeader(_)
        ));

        let dup = "ply\nelement vertex 1\nproperty float x\nproperty int x\nend_header\n";
        assert!(matches!(
            PlyHeader::parse(Cursor::new(dup)).unwrap_err(),
            PlyError::DuplicateProperty(_)
        ));
    }
}
