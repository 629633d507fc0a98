use crate::{config::CreateMode, Config, Error, Result};

use sqlchan_core::{driver::Connection, schema::Message, Schema, SEQ_COLUMN};
use sqlchan_sql::{IndexKind, MessageOptions, Serializer, Statement};

/// Brings the tables of every message owning one in line with the create
/// mode. Runs once per open.
pub(crate) fn resolve(connection: &mut dyn Connection, schema: &Schema, config: &Config) -> Result<()> {
    if config.create_mode == CreateMode::No {
        return Ok(());
    }

    for message in schema.messages() {
        if message.msgid == 0 {
            log::debug!("message `{}` has no msgid, skipping table check", message.name);
            continue;
        }

        let options = MessageOptions::from_message(message, config.default_template)?;

        if !options.creates_table() {
            continue;
        }

        let exists = connection.table_exists(&options.table)?;

        match config.create_mode {
            CreateMode::Checked if exists => {
                log::debug!("table `{}` exists", options.table);
                continue;
            }
            CreateMode::Always if exists => {
                return Err(Error::schema_conflict(
                    options.table.clone(),
                    "table already exists",
                ));
            }
            _ => {}
        }

        create_table(connection, message, &options, config)?;
    }

    Ok(())
}

fn create_table(
    connection: &mut dyn Connection,
    message: &Message,
    options: &MessageOptions,
    config: &Config,
) -> Result<()> {
    let capability = connection.capability();
    let serializer = Serializer::for_capability(capability);

    let mut stmt = Statement::create_table(message, options, capability)?;
    if let Statement::CreateTable(create) = &mut stmt {
        create.if_not_exists = config.create_mode != CreateMode::Always;
    }

    let mut statements = vec![stmt];

    if options.with_seq {
        match options.index.unwrap_or(config.seq_index) {
            IndexKind::No => {}
            kind => statements.push(Statement::create_index(
                &options.table,
                SEQ_COLUMN,
                kind == IndexKind::Unique,
            )),
        }
    }

    for field in &message.fields {
        match field.options.parse::<IndexKind>("sql.index")? {
            None | Some(IndexKind::No) => {}
            Some(kind) => statements.push(Statement::create_index(
                &options.table,
                field.column_name(),
                kind == IndexKind::Unique,
            )),
        }
    }

    log::info!("creating table `{}`", options.table);

    for stmt in &statements {
        let sql = serializer.serialize(stmt, &mut ());
        log::debug!("{sql}");

        connection
            .execute(&sql, &[])
            .map_err(|e| e.context(format!("create table `{}`", options.table)))?;
    }

    Ok(())
}
