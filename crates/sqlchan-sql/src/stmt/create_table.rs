use super::{ColumnDef, Statement};
use crate::MessageOptions;

use sqlchan_core::{driver::Capability, schema::Message, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// Name of the table
    pub name: String,

    /// Column definitions
    pub columns: Vec<ColumnDef>,

    /// Primary key columns, empty for none
    pub primary_key: Vec<String>,

    /// Emit `IF NOT EXISTS`
    pub if_not_exists: bool,
}

impl Statement {
    /// Table holding messages of the given type: the sequence column (when
    /// enabled) followed by one column per field.
    pub fn create_table(
        message: &Message,
        options: &MessageOptions,
        capability: &Capability,
    ) -> Result<Statement> {
        let mut columns = vec![];
        let mut primary_key = vec![];

        if options.with_seq {
            columns.push(ColumnDef::seq());
        }

        for field in &message.fields {
            let column = ColumnDef::from_field(field, capability)
                .map_err(|e| e.context(format!("message `{}` field `{}`", message.name, field.name)))?;

            if field.options.get_bool("sql.primary-key")?.unwrap_or(false) {
                if field.optional {
                    return Err(Error::invalid_schema(format!(
                        "optional field `{}` cannot be part of the primary key",
                        field.name
                    )));
                }
                primary_key.push(column.name.clone());
            }

            columns.push(column);
        }

        Ok(CreateTable {
            name: options.table.clone(),
            columns,
            primary_key,
            if_not_exists: true,
        }
        .into())
    }
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Self::CreateTable(value)
    }
}
