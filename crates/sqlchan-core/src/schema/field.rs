use super::{FieldType, Options};

/// A field of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, also the default column name.
    pub name: String,

    /// Declared type
    pub ty: FieldType,

    /// Byte offset within the fixed part of the message
    pub offset: usize,

    /// Set when the field's presence is tracked by the message's presence
    /// bitmap.
    pub optional: bool,

    /// Set when this field is the presence bitmap itself.
    pub pmap: bool,

    /// Presence bit index in the bitmap, only set for optional fields.
    pub bit: Option<u32>,

    /// Free-form field options
    pub options: Options,
}

impl Field {
    /// Column name: the `sql.column-name` option, falling back to the field
    /// name.
    pub fn column_name(&self) -> &str {
        self.options.get("sql.column-name").unwrap_or(&self.name)
    }

    /// Explicit column type from the `sql.column-type` option.
    pub fn column_type(&self) -> Option<&str> {
        self.options.get("sql.column-type")
    }

    /// Size of the field in the fixed part of the message.
    pub fn size(&self) -> usize {
        self.ty.size()
    }
}
