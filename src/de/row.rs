use serde::{
    de::{value::StrDeserializer, DeserializeSeed, MapAccess, Visitor},
    Deserializer,
};

use crate::{de::val_reader::FieldReader, FieldDescriptor, PlyError, ScalarType, Schema};

/// Presents one packed row as a map from property name to value.
#[derive(Clone, Copy)]
pub(crate) struct RowDeserializer<'a> {
    schema: &'a Schema,
    row: &'a [u8],
    swap: bool,
}

impl<'a> RowDeserializer<'a> {
    /// `row` must hold at least `schema.record_size()` bytes.
    pub fn new(schema: &'a Schema, row: &'a [u8], swap: bool) -> Self {
        Self { schema, row, swap }
    }
}

impl<'de> Deserializer<'de> for RowDeserializer<'_> {
    type Error = PlyError;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(PlyError::RowMustBeStructOrMap)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(RowMapAccess {
            parent: self,
            fields: self.schema.iter(),
            pending: None,
        })
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 i64 u64 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple
        tuple_struct enum identifier ignored_any
    }
}

struct RowMapAccess<'a> {
    parent: RowDeserializer<'a>,
    fields: std::slice::Iter<'a, FieldDescriptor>,
    pending: Option<&'a FieldDescriptor>,
}

impl<'de> MapAccess<'de> for RowMapAccess<'_> {
    type Error = PlyError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let Some(field) = self.fields.next() else {
            return Ok(None);
        };
        self.pending = Some(field);
        seed.deserialize(StrDeserializer::<PlyError>::new(field.name()))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let field = self
            .pending
            .take()
            .ok_or_else(|| PlyError::Serde("value requested before key".to_string()))?;

        seed.deserialize(ValueDeserializer {
            reader: FieldReader::new(&self.parent.row[field.range()], field.ty(), self.parent.swap),
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

struct ValueDeserializer {
    reader: FieldReader,
}

impl<'de> Deserializer<'de> for ValueDeserializer {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let reader = &self.reader;
        match reader.ty() {
            ScalarType::I8 => visitor.visit_i8(reader.read_i8()),
            ScalarType::U8 => visitor.visit_u8(reader.read_u8()),
            ScalarType::I16 => visitor.visit_i16(reader.read_i16()),
            ScalarType::U16 => visitor.visit_u16(reader.read_u16()),
            ScalarType::I32 => visitor.visit_i32(reader.read_i32()),
            ScalarType::U32 => visitor.visit_u32(reader.read_u32()),
            ScalarType::F32 => visitor.visit_f32(reader.read_f32()),
            ScalarType::F64 => visitor.visit_f64(reader.read_f64()),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // PLY properties are always present if defined in header
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 f32 f64 i128 i64 u128 u64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}
