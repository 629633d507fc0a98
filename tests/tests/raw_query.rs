use pretty_assertions::assert_eq;
use sqlchan::{
    schema::{FieldType, Message as MessageType},
    Channel, Config, Schema,
};
use sqlchan_core::stmt::Value;
use tests::*;

fn schema() -> Schema {
    Schema::builder()
        .message(
            MessageType::builder("Insert", 10)
                .field("f0", FieldType::Int32)
                .field("f1", FieldType::String),
        )
        .message(
            MessageType::builder("Select", 20)
                .option(
                    "sql.query",
                    "SELECT \"_tll_seq\", \"f0\", \"f1\" FROM \"Insert\" WHERE \"f0\" > ?1 ORDER BY \"f0\" DESC",
                )
                .option("sql.output", "Insert")
                .option("sql.with-seq", "no")
                .field("f0", FieldType::Int32),
        )
        .message(
            MessageType::builder("Lookup", 30)
                .option("sql.template", "select")
                .option("sql.table", "Insert")
                .option("sql.output", "Insert")
                .option("sql.with-seq", "no")
                .field("f0", FieldType::Int32),
        )
        .build()
        .unwrap()
}

fn fixture() -> Channel {
    init_logging();

    let schema = schema();
    let insert = schema.message(10).unwrap().clone();

    let mut channel = Channel::new(schema);
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    for i in 0..5 {
        assert_ok!(channel.post(&data_message(
            &insert,
            100 + i as i64,
            [("f0", Value::I32(i)), ("f1", Value::String(format!("row {i}")))]
        )));
    }

    channel
}

#[test]
fn raw_query_binds_fields_in_order() {
    let mut channel = fixture();
    let schema = channel.schema().clone();

    assert_ok!(channel.post(&data_message(
        schema.message(20).unwrap(),
        0,
        [("f0", Value::I32(2))]
    )));

    let messages = drain(&mut channel);
    let seqs = messages
        .iter()
        .map(|m| m.as_data().unwrap().seq)
        .collect::<Vec<_>>();

    // Rows come back as `Insert` messages in the order the query asks for.
    assert_eq!(seqs, [104, 103]);
    assert!(messages.iter().all(|m| m.as_data().unwrap().msgid == 10));

    let decoded = assert_ok!(sqlchan::data::decode(
        schema.message(10).unwrap(),
        &messages[0].as_data().unwrap().data
    ));
    assert_eq!(decoded["f1"], Value::from("row 4"));
}

#[test]
fn select_template_matches_posted_fields() {
    let mut channel = fixture();
    let schema = channel.schema().clone();

    assert_ok!(channel.post(&data_message(
        schema.message(30).unwrap(),
        0,
        [("f0", Value::I32(3))]
    )));

    let rows = drain_rows(&mut channel, schema.message(10).unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["f0"], Value::I32(3));
    assert_eq!(rows[0]["f1"], Value::from("row 3"));
}

#[test]
fn empty_result_emits_only_end_of_data() {
    let mut channel = fixture();
    let schema = channel.schema().clone();

    assert_ok!(channel.post(&data_message(
        schema.message(20).unwrap(),
        0,
        [("f0", Value::I32(100))]
    )));

    assert!(drain(&mut channel).is_empty());
}

#[test]
fn second_read_while_streaming() {
    let mut channel = fixture();
    let schema = channel.schema().clone();
    let lookup = data_message(schema.message(20).unwrap(), 0, [("f0", Value::I32(0))]);

    assert_ok!(channel.post(&lookup));
    assert!(channel.is_streaming());

    let err = assert_err_is!(channel.post(&lookup), is_query_in_progress);
    assert_eq!(err.to_string(), "previous query is not finished, can not start new");

    // Writes do not touch the pending read.
    assert_ok!(channel.post(&data_message(
        schema.message(10).unwrap(),
        200,
        [("f0", Value::I32(9)), ("f1", Value::from("late"))]
    )));

    assert_eq!(drain(&mut channel).len(), 4);
    assert_ok!(channel.post(&lookup));
    assert_eq!(drain(&mut channel).len(), 5);
}
