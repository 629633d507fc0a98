use super::{Field, MessageBuilder, Options};

/// A message type: a named, numbered record with a fixed binary layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,

    /// Message id carried by every message of this type. Zero means the
    /// message has no id and can only be referenced by name.
    pub msgid: i32,

    /// Fields in declaration order
    pub fields: Vec<Field>,

    /// Size of the fixed part in bytes
    pub size: usize,

    /// Index of the presence bitmap field
    pub pmap: Option<usize>,

    pub options: Options,
}

impl Message {
    pub fn builder(name: impl Into<String>, msgid: i32) -> MessageBuilder {
        MessageBuilder::new(name, msgid)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn pmap_field(&self) -> Option<&Field> {
        self.pmap.map(|index| &self.fields[index])
    }

    /// Fields that carry data, skipping the presence bitmap.
    pub fn data_fields(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.pmap)
    }
}
