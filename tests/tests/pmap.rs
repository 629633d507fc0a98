use pretty_assertions::assert_eq;
use sqlchan::{
    data::MessageView,
    schema::{FieldBuilder, FieldType, Message as MessageType},
    Channel, Config, Message, Schema,
};
use sqlchan_core::stmt::Value;
use tests::*;

fn schema() -> Schema {
    Schema::builder()
        .message(
            MessageType::builder("Data", 10)
                .field_with(FieldBuilder::new("pmap", FieldType::UInt16).pmap())
                .field("f0", FieldType::Int32)
                .field_with(FieldBuilder::new("o0", FieldType::Int64).optional())
                .field_with(FieldBuilder::new("o1", FieldType::Double).optional())
                .field_with(FieldBuilder::new("o2", FieldType::String).optional())
                .field_with(FieldBuilder::new("o3", FieldType::byte_string(8)).optional()),
        )
        .build()
        .unwrap()
}

fn optional() -> [(&'static str, Value); 4] {
    [
        ("o0", Value::I64(-5)),
        ("o1", Value::F64(2.5)),
        ("o2", Value::from("text")),
        ("o3", Value::from("bytes")),
    ]
}

#[test]
fn every_subset_of_optional_fields_round_trips() {
    init_logging();

    let schema = schema();
    let data = schema.message(10).unwrap().clone();

    let mut channel = Channel::new(schema);
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    for subset in 0u32..16 {
        let mut fields = vec![("f0", Value::I32(subset as i32))];
        fields.extend(
            optional()
                .into_iter()
                .enumerate()
                .filter(|(i, _)| subset & (1 << i) != 0)
                .map(|(_, field)| field),
        );

        assert_ok!(channel.post(&data_message(&data, subset as i64, fields)));
    }

    assert_ok!(channel.post(&Message::query(10, vec![])));
    let messages = drain(&mut channel);
    assert_eq!(messages.len(), 16);

    for (subset, message) in messages.iter().enumerate() {
        let body = &message.as_data().unwrap().data;
        let decoded = assert_ok!(sqlchan::data::decode(&data, body));

        let mut expected = vec![("f0".to_string(), Value::I32(subset as i32))];
        expected.extend(
            optional()
                .into_iter()
                .enumerate()
                .filter(|(i, _)| subset & (1 << i) != 0)
                .map(|(_, (name, value))| (name.to_string(), value)),
        );
        assert_eq!(decoded.into_iter().collect::<Vec<_>>(), expected);

        // `o0` is the second data field, so optional field `i` has bit `i + 1`.
        let view = assert_ok!(MessageView::new(&data, body));
        assert_eq!(
            assert_ok!(view.pmap()),
            Some((subset as u64) << 1),
            "subset {subset:#06b}"
        );
    }
}

#[test]
fn absent_fields_are_stored_as_null() {
    init_logging();

    let schema = schema();
    let data = schema.message(10).unwrap().clone();

    let driver = MockDriver::with_capability(&sqlchan::driver::Capability::SQLITE);
    let log = driver.log();

    let mut channel = Channel::with_driver(schema, driver);
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));
    log.clear();

    assert_ok!(channel.post(&data_message(
        &data,
        7,
        [("f0", Value::I32(1)), ("o1", Value::F64(0.5))]
    )));

    assert_eq!(
        log.last().params,
        [
            Value::I64(7),
            Value::I32(4),
            Value::I32(1),
            Value::Null,
            Value::F64(0.5),
            Value::Null,
            Value::Null,
        ]
    );
}

#[test]
fn lookup_ignores_absent_optional_fields() {
    init_logging();

    let schema = Schema::builder()
        .message(
            MessageType::builder("Data", 10)
                .field_with(FieldBuilder::new("pmap", FieldType::UInt8).pmap())
                .field("f0", FieldType::Int32)
                .field_with(FieldBuilder::new("opt", FieldType::Int32).optional()),
        )
        .message(
            MessageType::builder("Lookup", 20)
                .option("sql.table", "Data")
                .option("sql.template", "select")
                .option("sql.output", "Data")
                .option("sql.with-seq", "no")
                .field_with(FieldBuilder::new("pmap", FieldType::UInt8).pmap())
                .field("f0", FieldType::Int32)
                .field_with(FieldBuilder::new("opt", FieldType::Int32).optional()),
        )
        .build()
        .unwrap();
    let data = schema.message(10).unwrap().clone();
    let lookup = schema.message(20).unwrap().clone();

    let mut channel = Channel::new(schema);
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    assert_ok!(channel.post(&data_message(&data, 1, [("f0", Value::I32(5))])));
    assert_ok!(channel.post(&data_message(&data, 2, [("f0", Value::I32(5)), ("opt", Value::I32(7))])));
    assert_ok!(channel.post(&data_message(&data, 3, [("f0", Value::I32(6))])));

    let seqs = |channel: &mut Channel| {
        drain(channel)
            .iter()
            .map(|message| message.as_data().unwrap().seq)
            .collect::<Vec<_>>()
    };

    assert_ok!(channel.post(&data_message(&lookup, 0, [("f0", Value::I32(5))])));
    assert_eq!(seqs(&mut channel), [1, 2]);

    assert_ok!(channel.post(&data_message(&lookup, 0, [("f0", Value::I32(5)), ("opt", Value::I32(7))])));
    assert_eq!(seqs(&mut channel), [2]);

    assert_ok!(channel.post(&data_message(&lookup, 0, [("f0", Value::I32(5)), ("opt", Value::I32(8))])));
    assert!(seqs(&mut channel).is_empty());
}
