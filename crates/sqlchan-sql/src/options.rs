use sqlchan_core::{schema::Message, Error, Result};

use serde::Deserialize;
use std::{fmt, str::FromStr};

/// Statement shape a message type compiles to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Insert,
    Select,
    Function,
    Procedure,
    None,
}

/// Index requested for a column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    No,
    Yes,
    #[default]
    Unique,
}

/// The `sql.*` options of a message type, parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageOptions {
    /// `sql.table`, defaults to the message name
    pub table: String,

    /// `sql.template`, defaults to `select` when a raw query is declared and
    /// to the channel default otherwise
    pub template: Template,

    /// `sql.output`: name of the message type describing returned rows
    pub output: Option<String>,

    /// `sql.with-seq`, default `yes`
    pub with_seq: bool,

    /// `sql.query`: raw SQL used instead of the generated statement
    pub query: Option<String>,

    /// `sql.create`
    pub create: Option<bool>,

    /// `sql.index`: index on the sequence column
    pub index: Option<IndexKind>,
}

impl MessageOptions {
    pub fn from_message(message: &Message, default_template: Template) -> Result<MessageOptions> {
        let options = &message.options;
        let query = options.get("sql.query").map(str::to_string);

        let template = match options.parse("sql.template")? {
            Some(template) => template,
            None if query.is_some() => Template::Select,
            None => default_template,
        };

        Ok(MessageOptions {
            table: options
                .get("sql.table")
                .unwrap_or(&message.name)
                .to_string(),
            template,
            output: options.get("sql.output").map(str::to_string),
            with_seq: options.get_bool("sql.with-seq")?.unwrap_or(true),
            query,
            create: options.get_bool("sql.create")?,
            index: options.parse("sql.index")?,
        })
    }

    /// Whether the backing table is subject to the create mode. Only
    /// `insert` messages own a table unless `sql.create` says otherwise.
    pub fn creates_table(&self) -> bool {
        self.create.unwrap_or(self.template == Template::Insert)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Template::Insert => "insert",
            Template::Select => "select",
            Template::Function => "function",
            Template::Procedure => "procedure",
            Template::None => "none",
        })
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "insert" => Ok(Template::Insert),
            "select" => Ok(Template::Select),
            "function" => Ok(Template::Function),
            "procedure" => Ok(Template::Procedure),
            "none" => Ok(Template::None),
            _ => Err(Error::invalid_config(format!("unknown template `{s}`"))),
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexKind::No => "no",
            IndexKind::Yes => "yes",
            IndexKind::Unique => "unique",
        })
    }
}

impl FromStr for IndexKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "no" => Ok(IndexKind::No),
            "yes" => Ok(IndexKind::Yes),
            "unique" => Ok(IndexKind::Unique),
            _ => Err(Error::invalid_config(format!("unknown index kind `{s}`"))),
        }
    }
}
