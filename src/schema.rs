use std::fmt;
use std::ops::Range;

use crate::{PlyError, ScalarType};

/// One property of a vertex record.
///
/// The offset is the byte position of the field within one packed record and
/// is always derived from the fields declared before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    ty: ScalarType,
    offset: usize,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> ScalarType {
        self.ty
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size_bytes(&self) -> usize {
        self.ty.size_bytes()
    }

    /// Byte range of this field inside a packed record.
    pub(crate) fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size_bytes()
    }
}

/// Ordered list of vertex properties, defining the wire layout of a record.
///
/// Fields are packed in declaration order with no padding, so the size of a
/// record is the sum of the field widths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    record_size: usize,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from `(name, type name)` pairs, e.g. `("x", "float")`.
    pub fn define<I, N, S>(fields: I) -> Result<Self, PlyError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<str>,
    {
        let mut schema = Self::new();
        for (name, type_name) in fields {
            schema.push(name, ScalarType::parse(type_name.as_ref())?)?;
        }
        Ok(schema)
    }

    /// Build a schema from `(name, type)` pairs.
    pub fn from_fields<I, N>(fields: I) -> Result<Self, PlyError>
    where
        I: IntoIterator<Item = (N, ScalarType)>,
        N: Into<String>,
    {
        let mut schema = Self::new();
        for (name, ty) in fields {
            schema.push(name, ty)?;
        }
        Ok(schema)
    }

    /// Append a field after the current last one.
    ///
    /// Names must be a single non-empty header token: no whitespace and no
    /// control characters.
    pub fn push(&mut self, name: impl Into<String>, ty: ScalarType) -> Result<(), PlyError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(PlyError::InvalidPropertyName(name));
        }
        if self.get(&name).is_some() {
            return Err(PlyError::DuplicateProperty(name));
        }

        self.fields.push(FieldDescriptor {
            name,
            ty,
            offset: self.record_size,
        });
        self.record_size += ty.size_bytes();
        Ok(())
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// Position of the field called `name` in wire order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Size in bytes of one packed record.
    pub fn record_size(&self) -> usize {
        self.record_size
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            writeln!(
                f,
                "{}: {} ({} bytes @ {})",
                field.name,
                field.ty,
                field.size_bytes(),
                field.offset
            )?;
        }
        Ok(())
    }
}
