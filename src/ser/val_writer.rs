use std::num::TryFromIntError;

use byteorder::{ByteOrder, NativeEndian};

use crate::{PlyError, ScalarType};

/// Writes one property value into its slot of a packed record.
///
/// The value is stored in host byte order as the property's declared type.
/// Integers must fit the declared integer type, and floating point values
/// are only accepted by `float` and `double` properties.
pub(crate) struct FieldWriter<'a> {
    name: &'a str,
    slot: &'a mut [u8],
    ty: ScalarType,
}

impl<'a> FieldWriter<'a> {
    pub(crate) fn new(name: &'a str, slot: &'a mut [u8], ty: ScalarType) -> Self {
        Self { name, slot, ty }
    }

    // Every supported integer source fits in an i128.
    fn write_int(self, val: i128) -> Result<(), PlyError> {
        let FieldWriter { name, slot, ty } = self;
        let err = |_: TryFromIntError| out_of_range(name, ty, val);
        match ty {
            ScalarType::I8 => slot[0] = i8::try_from(val).map_err(err)? as u8,
            ScalarType::U8 => slot[0] = u8::try_from(val).map_err(err)?,
            ScalarType::I16 => NativeEndian::write_i16(slot, i16::try_from(val).map_err(err)?),
            ScalarType::U16 => NativeEndian::write_u16(slot, u16::try_from(val).map_err(err)?),
            ScalarType::I32 => NativeEndian::write_i32(slot, i32::try_from(val).map_err(err)?),
            ScalarType::U32 => NativeEndian::write_u32(slot, u32::try_from(val).map_err(err)?),
            ScalarType::F32 => NativeEndian::write_f32(slot, val as f32),
            ScalarType::F64 => NativeEndian::write_f64(slot, val as f64),
        }
        Ok(())
    }

    fn write_float(self, val: f64, found: &'static str) -> Result<(), PlyError> {
        match self.ty {
            ScalarType::F32 => {
                let narrowed = val as f32;
                if val.is_finite() && narrowed.is_infinite() {
                    return Err(out_of_range(self.name, self.ty, val));
                }
                NativeEndian::write_f32(self.slot, narrowed);
            }
            ScalarType::F64 => NativeEndian::write_f64(self.slot, val),
            expected => {
                return Err(PlyError::TypeMismatch {
                    property: self.name.to_string(),
                    expected,
                    found,
                })
            }
        }
        Ok(())
    }

    pub(crate) fn write_f32(self, val: f32) -> Result<(), PlyError> {
        self.write_float(f64::from(val), "f32")
    }

    pub(crate) fn write_f64(self, val: f64) -> Result<(), PlyError> {
        self.write_float(val, "f64")
    }
}

fn out_of_range(name: &str, ty: ScalarType, value: impl ToString) -> PlyError {
    PlyError::ValueOutOfRange {
        property: name.to_string(),
        value: value.to_string(),
        ty,
    }
}

macro_rules! impl_write_int {
    ($($name:ident: $t:ty),* $(,)?) => {
        impl FieldWriter<'_> {
            $(
                pub(crate) fn $name(self, val: $t) -> Result<(), PlyError> {
                    self.write_int(i128::from(val))
                }
            )*
        }
    };
}

impl_write_int! {
    write_i8: i8,
    write_u8: u8,
    write_i16: i16,
    write_u16: u16,
    write_i32: i32,
    write_u32: u32,
    write_i64: i64,
    write_u64: u64,
}
