use byteorder::{ByteOrder, NativeEndian};

use crate::{endian, ScalarType};

/// One property value lifted out of a packed row, already in host byte order.
pub(crate) struct FieldReader {
    bytes: [u8; 8],
    ty: ScalarType,
}

impl FieldReader {
    /// `slot` holds exactly the bytes of the property; `swap` is set when the
    /// file's byte order differs from the host's.
    pub(crate) fn new(slot: &[u8], ty: ScalarType, swap: bool) -> Self {
        let width = ty.size_bytes();
        let mut bytes = [0u8; 8];
        bytes[..width].copy_from_slice(&slot[..width]);
        if swap {
            endian::swap(&mut bytes[..width]);
        }
        Self { bytes, ty }
    }

    pub(crate) fn ty(&self) -> ScalarType {
        self.ty
    }

    pub(crate) fn read_i8(&self) -> i8 {
        self.bytes[0] as i8
    }

    pub(crate) fn read_u8(&self) -> u8 {
        self.bytes[0]
    }

    pub(crate) fn read_i16(&self) -> i16 {
        NativeEndian::read_i16(&self.bytes)
    }

    pub(crate) fn read_u16(&self) -> u16 {
        NativeEndian::read_u16(&self.bytes)
    }

    pub(crate) fn read_i32(&self) -> i32 {
        NativeEndian::read_i32(&self.bytes)
    }

    pub(crate) fn read_u32(&self) -> u32 {
        NativeEndian::read_u32(&self.bytes)
    }

    pub(crate) fn read_f32(&self) -> f32 {
        NativeEndian::read_f32(&self.bytes)
    }

    pub(crate) fn read_f64(&self) -> f64 {
        NativeEndian::read_f64(&self.bytes)
    }
}
