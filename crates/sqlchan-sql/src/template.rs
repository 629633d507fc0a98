//! Compiles a message type into the statement executed when a message of
//! that type is posted.

use crate::{
    query,
    stmt::{Call, Condition, Filter, Insert, Param, Select, Statement},
    MessageOptions, Operator, Predicate, Serializer, Template,
};

use sqlchan_core::{
    driver::Capability,
    schema::{Message, Schema},
    stmt, Error, Result, SEQ_COLUMN,
};

/// A statement ready for execution: SQL text plus where each placeholder's
/// value comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// Id of the message type this statement was compiled for
    pub msgid: i32,

    pub template: Template,

    pub sql: Sql,

    /// One entry per placeholder, in placeholder order
    pub params: Vec<Param>,

    /// How returned rows are decoded, `None` for statements returning no
    /// rows.
    pub output: Option<Output>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sql {
    /// Generated from the message type
    Generated(String),

    /// Raw `sql.query`, used verbatim
    Literal(String),

    /// `none` template, nothing to execute
    NoOp,
}

/// Decoding of returned rows: columns map positionally onto the fields of
/// the output message, after the sequence column when `with_seq` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub msgid: i32,
    pub with_seq: bool,
    pub columns: Vec<stmt::Type>,
}

/// Compiles message types of one schema for one backend.
#[derive(Debug)]
pub struct Compiler<'a> {
    schema: &'a Schema,
    capability: &'a Capability,
    serializer: Serializer,
    default_template: Template,
}

impl Sql {
    /// SQL text, `None` for a no-op.
    pub fn text(&self) -> Option<&str> {
        match self {
            Sql::Generated(sql) | Sql::Literal(sql) => Some(sql),
            Sql::NoOp => None,
        }
    }
}

impl CompiledStatement {
    pub fn returns_rows(&self) -> bool {
        self.output.is_some()
    }
}

impl<'a> Compiler<'a> {
    pub fn new(schema: &'a Schema, capability: &'a Capability, default_template: Template) -> Compiler<'a> {
        Compiler {
            schema,
            capability,
            serializer: Serializer::for_capability(capability),
            default_template,
        }
    }

    pub fn options(&self, message: &Message) -> Result<MessageOptions> {
        MessageOptions::from_message(message, self.default_template)
    }

    /// Compiles the statement for posting messages of this type.
    pub fn compile(&self, message: &Message) -> Result<CompiledStatement> {
        let options = self.options(message)?;

        let compiled = match options.template {
            Template::None => CompiledStatement {
                msgid: message.msgid,
                template: Template::None,
                sql: Sql::NoOp,
                params: vec![],
                output: None,
            },
            _ if options.query.is_some() => self.literal(message, &options)?,
            Template::Insert => self.insert(message, &options)?,
            Template::Select => self.select(message, &options)?,
            Template::Function => self.function(message, &options)?,
            Template::Procedure => self.procedure(message, &options)?,
        };

        if let Some(sql) = compiled.sql.text() {
            log::debug!(
                "compiled {} statement for `{}`: {sql}",
                compiled.template,
                message.name
            );
        }

        Ok(compiled)
    }

    /// Compiles the `SELECT` serving a query control message: every column
    /// of the message's table filtered by the predicates.
    pub fn compile_query(&self, message: &Message, expression: &[Predicate]) -> Result<CompiledStatement> {
        let options = self.options(message)?;
        let filter = query::filter(expression, message, self.capability)?;

        let stmt = Select {
            columns: columns(message, options.with_seq),
            table: options.table.clone(),
            filter: Some(filter),
        };

        let mut params = vec![];
        let sql = self.serializer.serialize(&stmt.into(), &mut params);

        log::debug!("compiled query for `{}`: {sql}", message.name);

        Ok(CompiledStatement {
            msgid: message.msgid,
            template: Template::Select,
            sql: Sql::Generated(sql),
            params,
            output: Some(self.output_of(message, &options)?),
        })
    }

    fn insert(&self, message: &Message, options: &MessageOptions) -> Result<CompiledStatement> {
        let stmt = Insert {
            table: options.table.clone(),
            columns: columns(message, options.with_seq),
            values: args(message, options.with_seq),
        };

        self.generated(message, Template::Insert, stmt.into(), None)
    }

    fn select(&self, message: &Message, options: &MessageOptions) -> Result<CompiledStatement> {
        let output_message = self.output_message(message, options)?;
        let output_options = self.options(output_message)?;
        let output = self.output_of(output_message, &output_options)?;

        // Every field of the posted message must equal the column of the
        // same name. Absent optional fields match any row.
        let conditions = message
            .data_fields()
            .map(|(index, field)| Condition {
                numeric: query::is_text_decimal(field, self.capability),
                unless_absent: field.optional.then_some(Param::Present(index)),
                ..Condition::new(field.column_name(), Operator::Eq, Param::Field(index))
            })
            .collect();

        let stmt = Select {
            columns: columns(output_message, output_options.with_seq),
            table: options.table.clone(),
            filter: Some(Filter { conditions }),
        };

        self.generated(message, Template::Select, stmt.into(), Some(output))
    }

    fn function(&self, message: &Message, options: &MessageOptions) -> Result<CompiledStatement> {
        if !self.capability.functions {
            return Err(Error::unsupported_feature(format!(
                "message `{}`: the backend has no table-valued functions",
                message.name
            )));
        }

        let output = self.output(message, options)?;
        let stmt = Statement::CallFunction(Call {
            name: options.table.clone(),
            args: args(message, options.with_seq),
        });

        self.generated(message, Template::Function, stmt, Some(output))
    }

    fn procedure(&self, message: &Message, options: &MessageOptions) -> Result<CompiledStatement> {
        if !self.capability.procedures {
            return Err(Error::unsupported_feature(format!(
                "message `{}`: the backend has no stored procedures",
                message.name
            )));
        }

        // Procedures only return rows when an output is declared; otherwise
        // their effect is read back with a query on the tables they write.
        let output = match options.output {
            Some(_) => Some(self.output(message, options)?),
            None => None,
        };

        let stmt = Statement::CallProcedure(Call {
            name: options.table.clone(),
            args: args(message, options.with_seq),
        });

        self.generated(message, Template::Procedure, stmt, output)
    }

    fn literal(&self, message: &Message, options: &MessageOptions) -> Result<CompiledStatement> {
        let output = match options.template {
            Template::Insert => None,
            Template::Procedure if options.output.is_none() => None,
            _ => Some(self.output(message, options)?),
        };

        Ok(CompiledStatement {
            msgid: message.msgid,
            template: options.template,
            sql: Sql::Literal(options.query.clone().unwrap_or_default()),
            params: args(message, options.with_seq),
            output,
        })
    }

    fn generated(
        &self,
        message: &Message,
        template: Template,
        stmt: Statement,
        output: Option<Output>,
    ) -> Result<CompiledStatement> {
        let mut params = vec![];
        let sql = self.serializer.serialize(&stmt, &mut params);

        Ok(CompiledStatement {
            msgid: message.msgid,
            template,
            sql: Sql::Generated(sql),
            params,
            output,
        })
    }

    /// The message type decoding returned rows: `sql.output`, or the
    /// message itself.
    fn output_message<'m>(&self, message: &'m Message, options: &MessageOptions) -> Result<&'m Message>
    where
        'a: 'm,
    {
        match &options.output {
            None => Ok(message),
            Some(name) => self.schema.message_by_name(name).ok_or_else(|| {
                Error::invalid_schema(format!(
                    "output message `{name}` of `{}` not found",
                    message.name
                ))
            }),
        }
    }

    fn output(&self, message: &Message, options: &MessageOptions) -> Result<Output> {
        let output = self.output_message(message, options)?;
        let output_options = self.options(output)?;
        self.output_of(output, &output_options)
    }

    fn output_of(&self, output: &Message, options: &MessageOptions) -> Result<Output> {
        let mut columns = vec![];
        if options.with_seq {
            columns.push(stmt::Type::I64);
        }

        for field in &output.fields {
            columns.push(
                stmt::Type::from_field(&field.ty, self.capability)
                    .map_err(|e| e.context(format!("output `{}` field `{}`", output.name, field.name)))?,
            );
        }

        Ok(Output {
            msgid: output.msgid,
            with_seq: options.with_seq,
            columns,
        })
    }
}

/// Column names of a message's table, in declaration order.
fn columns(message: &Message, with_seq: bool) -> Vec<String> {
    let seq = with_seq.then(|| SEQ_COLUMN.to_string());
    seq.into_iter()
        .chain(message.fields.iter().map(|field| field.column_name().to_string()))
        .collect()
}

/// Parameters binding every field of the posted message, after the sequence
/// number when enabled.
fn args(message: &Message, with_seq: bool) -> Vec<Param> {
    let seq = with_seq.then_some(Param::Seq);
    seq.into_iter()
        .chain((0..message.fields.len()).map(Param::Field))
        .collect()
}
