use super::{Field, FieldType, Message, Options, Schema};
use crate::{Error, Result};

/// Builds a [`Schema`], computing field offsets and validating the presence
/// bitmap on `build`.
#[derive(Debug, Default)]
pub struct Builder {
    messages: Vec<MessageBuilder>,
}

#[derive(Debug)]
pub struct MessageBuilder {
    name: String,
    msgid: i32,
    options: Options,
    fields: Vec<FieldBuilder>,
}

#[derive(Debug)]
pub struct FieldBuilder {
    name: String,
    ty: FieldType,
    optional: bool,
    pmap: bool,
    options: Options,
}

impl Builder {
    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut schema = Schema::default();

        for builder in self.messages {
            let message = builder.build()?;

            if schema.messages.contains_key(&message.name) {
                return Err(Error::invalid_schema(format!(
                    "duplicate message `{}`",
                    message.name
                )));
            }

            if message.msgid != 0 {
                let index = schema.messages.len();
                if schema.by_id.insert(message.msgid, index).is_some() {
                    return Err(Error::invalid_schema(format!(
                        "duplicate message id {} on `{}`",
                        message.msgid, message.name
                    )));
                }
            }

            schema.messages.insert(message.name.clone(), message);
        }

        Ok(schema)
    }
}

impl MessageBuilder {
    pub fn new(name: impl Into<String>, msgid: i32) -> MessageBuilder {
        MessageBuilder {
            name: name.into(),
            msgid,
            options: Options::default(),
            fields: vec![],
        }
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key, value);
        self
    }

    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field_with(FieldBuilder::new(name, ty))
    }

    pub fn field_with(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<Message> {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut offset = 0;
        let mut pmap = None;
        let mut bit = 0;

        for (index, builder) in self.fields.into_iter().enumerate() {
            let name = builder.name;

            if fields.iter().any(|field: &Field| field.name == name) {
                return Err(Error::invalid_schema(format!(
                    "duplicate field `{name}` in message `{}`",
                    self.name
                )));
            }

            if builder.pmap {
                if pmap.is_some() {
                    return Err(Error::invalid_schema(format!(
                        "message `{}` has more than one presence bitmap",
                        self.name
                    )));
                }
                if index != 0 {
                    return Err(Error::invalid_schema(format!(
                        "presence bitmap `{name}` must be the first field of `{}`",
                        self.name
                    )));
                }
                if !builder.ty.is_unsigned() || builder.optional {
                    return Err(Error::invalid_schema(format!(
                        "presence bitmap `{name}` must be a required unsigned integer"
                    )));
                }
                pmap = Some(index);
            }

            let field_bit = if builder.pmap {
                None
            } else {
                let current = bit;
                bit += 1;
                builder.optional.then_some(current)
            };

            let size = builder.ty.size();
            fields.push(Field {
                name,
                ty: builder.ty,
                offset,
                optional: builder.optional,
                pmap: builder.pmap,
                bit: field_bit,
                options: builder.options,
            });
            offset += size;
        }

        let width = pmap.map(|index| fields[index].size() as u32 * 8);
        for field in fields.iter().filter(|field| field.optional) {
            match (width, field.bit) {
                (None, _) => {
                    return Err(Error::invalid_schema(format!(
                        "optional field `{}` in message `{}` without a presence bitmap",
                        field.name, self.name
                    )))
                }
                (Some(width), Some(bit)) if bit >= width => {
                    return Err(Error::invalid_schema(format!(
                        "presence bit {bit} of field `{}` does not fit a {width}-bit bitmap",
                        field.name
                    )))
                }
                _ => {}
            }
        }

        Ok(Message {
            name: self.name,
            msgid: self.msgid,
            fields,
            size: offset,
            pmap,
            options: self.options,
        })
    }
}

impl FieldBuilder {
    pub fn new(name: impl Into<String>, ty: FieldType) -> FieldBuilder {
        FieldBuilder {
            name: name.into(),
            ty,
            optional: false,
            pmap: false,
            options: Options::default(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn pmap(mut self) -> Self {
        self.pmap = true;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key, value);
        self
    }
}

impl From<MessageBuilder> for Builder {
    fn from(message: MessageBuilder) -> Builder {
        Builder::default().message(message)
    }
}
