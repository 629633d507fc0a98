use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use sqlchan::{
    schema::{FieldBuilder, FieldType, Message as MessageType, TimeResolution},
    Channel, Config, Message, Schema,
};
use sqlchan_core::stmt::Value;
use tests::*;

fn schema() -> Schema {
    Schema::builder()
        .message(
            MessageType::builder("Data", 10)
                .field("i8", FieldType::Int8)
                .field("i16", FieldType::Int16)
                .field("i32", FieldType::Int32)
                .field("i64", FieldType::Int64)
                .field("u8", FieldType::UInt8)
                .field("u16", FieldType::UInt16)
                .field("u32", FieldType::UInt32)
                .field("u64", FieldType::UInt64)
                .field("f64", FieldType::Double)
                .field("dec", FieldType::Decimal128)
                .field_with(
                    FieldBuilder::new("string", FieldType::String)
                        .option("sql.column-type", "VARCHAR(8)"),
                )
                .field("byte32", FieldType::byte_string(32))
                .field("raw", FieldType::bytes(4))
                .field("ns", FieldType::TimePoint(TimeResolution::Nanosecond))
                .field("us", FieldType::TimePoint(TimeResolution::Microsecond))
                .field("ms", FieldType::TimePoint(TimeResolution::Millisecond))
                .field("s", FieldType::TimePoint(TimeResolution::Second))
                .field("day", FieldType::TimePoint(TimeResolution::Day)),
        )
        .build()
        .unwrap()
}

fn fields() -> Vec<(&'static str, Value)> {
    vec![
        ("i8", Value::I8(-123)),
        ("i16", Value::I16(-12323)),
        ("i32", Value::I32(-123123)),
        ("i64", Value::I64(-123123123123)),
        ("u8", Value::U8(231)),
        ("u16", Value::U16(53123)),
        ("u32", Value::U32(3_123_123_123)),
        ("u64", Value::U64(1 << 40)),
        ("f64", Value::F64(123.123)),
        ("dec", Value::Decimal("1234.5678".parse::<Decimal>().unwrap())),
        ("string", Value::from("string")),
        ("byte32", Value::from("bytes")),
        ("raw", Value::Bytes(vec![1, 2, 0, 4])),
        ("ns", Value::I64(1_700_000_000_123_456_789)),
        ("us", Value::I64(1_700_000_000_123_456)),
        ("ms", Value::I64(1_700_000_000_123)),
        ("s", Value::I64(1_700_000_000)),
        ("day", Value::I64(19_000)),
    ]
}

#[test]
fn every_field_type_round_trips() {
    init_logging();

    let schema = schema();
    let data = schema.message(10).unwrap();

    let mut channel = Channel::new(schema.clone());
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    assert_ok!(channel.post(&data_message(data, 100, fields())));
    assert_ok!(channel.post(&Message::query(10, vec![])));

    let messages = drain(&mut channel);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].as_data().unwrap().seq, 100);

    let decoded = assert_ok!(sqlchan::data::decode(data, &messages[0].as_data().unwrap().data));
    let expected = fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect::<Vec<_>>();

    assert_eq!(decoded.into_iter().collect::<Vec<_>>(), expected);

    assert_ok!(channel.close());
}

#[test]
fn u64_above_i64_max_fails_only_the_post() {
    init_logging();

    let schema = schema();
    let data = schema.message(10).unwrap();

    let mut channel = Channel::new(schema.clone());
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    let mut values = fields();
    values[7].1 = Value::U64(u64::MAX);

    let err = assert_err_is!(channel.post(&data_message(data, 1, values)), is_marshal);
    assert!(err.to_string().contains("u64"), "{err}");
    assert_eq!(channel.state(), sqlchan::State::Active);

    // Nothing was written, the channel keeps serving.
    assert_ok!(channel.post(&data_message(data, 2, fields())));
    assert_ok!(channel.post(&Message::query(10, vec![])));
    assert_eq!(drain(&mut channel).len(), 1);
}

#[test]
fn truncated_message_is_rejected() {
    init_logging();

    let schema = schema();
    let mut channel = Channel::new(schema.clone());
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    assert_err_is!(channel.post(&Message::data(10, 1, vec![0; 8])), is_marshal);
}

#[test]
fn unknown_message_id() {
    init_logging();

    let mut channel = Channel::new(schema());
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    assert_err_is!(channel.post(&Message::data(99, 1, vec![])), is_unknown_message);
    assert_err_is!(channel.post(&Message::query(99, vec![])), is_unknown_message);
}
