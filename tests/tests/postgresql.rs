#![cfg(feature = "postgresql")]

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use sqlchan::{
    schema::{FieldType, Message as MessageType, TimeResolution},
    Channel, Config, Message, Operator, Predicate, PredicateValue, Schema,
};
use sqlchan_core::stmt::Value;
use tests::{postgresql::*, *};

fn open(schema: Schema) -> Channel {
    init_logging();

    let mut channel = Channel::new(schema);
    assert_ok!(channel.open(&Config::new(url())));
    channel
}

#[test]
fn insert_and_query() {
    reset(&[r#"DROP TABLE IF EXISTS "SqlchanPgData""#]);

    let schema = Schema::builder()
        .message(
            MessageType::builder("SqlchanPgData", 10)
                .field("i32", FieldType::Int32)
                .field("u32", FieldType::UInt32)
                .field("f64", FieldType::Double)
                .field("dec", FieldType::Decimal128)
                .field("string", FieldType::String)
                .field("us", FieldType::TimePoint(TimeResolution::Microsecond))
                .field("day", FieldType::TimePoint(TimeResolution::Day)),
        )
        .build()
        .unwrap();
    let data = schema.message(10).unwrap().clone();

    let mut channel = open(schema);

    for seq in 0..5i64 {
        assert_ok!(channel.post(&data_message(
            &data,
            seq,
            [
                ("i32", Value::I32(-(seq as i32))),
                ("u32", Value::U32(3_000_000_000 + seq as u32)),
                ("f64", Value::F64(seq as f64 / 2.0)),
                ("dec", Value::Decimal(Decimal::new(12345 + seq, 2))),
                ("string", Value::from(format!("s{seq}"))),
                ("us", Value::I64(1_700_000_000_123_456 + seq)),
                ("day", Value::I64(19_000 + seq)),
            ]
        )));
    }

    assert_ok!(channel.post(&Message::query(
        10,
        vec![Predicate::new(
            "u32",
            Operator::Ge,
            PredicateValue::I(3_000_000_003)
        )]
    )));

    let rows = drain_rows(&mut channel, &data);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["i32"], Value::I32(-3));
    assert_eq!(rows[0]["dec"], Value::Decimal(Decimal::new(12348, 2)));
    assert_eq!(rows[0]["string"], Value::from("s3"));
    assert_eq!(rows[0]["us"], Value::I64(1_700_000_000_123_459));
    assert_eq!(rows[1]["day"], Value::I64(19_004));

    // Duplicate seq fails the post, not the channel.
    let dup = data_message(
        &data,
        0,
        [
            ("i32", Value::I32(0)),
            ("u32", Value::U32(0)),
            ("f64", Value::F64(0.0)),
            ("dec", Value::Decimal(Decimal::ZERO)),
            ("string", Value::from("")),
            ("us", Value::I64(0)),
            ("day", Value::I64(0)),
        ],
    );
    assert_err_is!(channel.post(&dup), is_execution);
    assert_eq!(channel.state(), sqlchan::State::Active);

    assert_ok!(channel.close());
}

#[test]
fn function_and_procedure() {
    reset(&[
        r#"DROP TABLE IF EXISTS "SqlchanPgOutput""#,
        r#"DROP PROCEDURE IF EXISTS "SqlchanPgProcedure""#,
        r#"CREATE OR REPLACE FUNCTION "SqlchanPgFunction"(x INTEGER, y DOUBLE PRECISION)
           RETURNS TABLE (a DOUBLE PRECISION, b BIGINT)
           LANGUAGE SQL AS $$ SELECT y * 2, x::BIGINT + 1 $$"#,
        r#"CREATE PROCEDURE "SqlchanPgProcedure"(s BIGINT, x INTEGER, y DOUBLE PRECISION)
           LANGUAGE plpgsql AS $$
           BEGIN
               INSERT INTO "SqlchanPgOutput" ("_tll_seq", "a", "b") VALUES (s, y, x);
           END
           $$"#,
    ]);

    let schema = Schema::builder()
        .message(
            MessageType::builder("Function", 10)
                .option("sql.template", "function")
                .option("sql.table", "SqlchanPgFunction")
                .option("sql.output", "FunctionOutput")
                .option("sql.with-seq", "no")
                .field("x", FieldType::Int32)
                .field("y", FieldType::Double),
        )
        .message(
            MessageType::builder("FunctionOutput", 11)
                .option("sql.template", "none")
                .option("sql.with-seq", "no")
                .field("a", FieldType::Double)
                .field("b", FieldType::Int64),
        )
        .message(
            MessageType::builder("Procedure", 20)
                .option("sql.template", "procedure")
                .option("sql.table", "SqlchanPgProcedure")
                .field("x", FieldType::Int32)
                .field("y", FieldType::Double),
        )
        .message(
            MessageType::builder("SqlchanPgOutput", 21)
                .option("sql.template", "none")
                .option("sql.create", "yes")
                .field("a", FieldType::Double)
                .field("b", FieldType::Int64),
        )
        .build()
        .unwrap();

    let mut channel = open(schema.clone());

    // --- function

    assert_ok!(channel.post(&data_message(
        schema.message(10).unwrap(),
        1,
        [("x", Value::I32(4)), ("y", Value::F64(1.25))]
    )));

    let rows = drain_rows(&mut channel, schema.message(11).unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["a"], Value::F64(2.5));
    assert_eq!(rows[0]["b"], Value::I64(5));

    // --- procedure

    for seq in [7, 8] {
        assert_ok!(channel.post(&data_message(
            schema.message(20).unwrap(),
            seq,
            [("x", Value::I32(seq as i32)), ("y", Value::F64(0.5))]
        )));
    }
    assert!(assert_ok!(channel.process()).is_none());

    assert_ok!(channel.post(&Message::query(21, vec![])));

    let messages = drain(&mut channel);
    let seqs: Vec<_> = messages.iter().map(|m| m.as_data().unwrap().seq).collect();
    assert_eq!(seqs, [7, 8]);

    assert_ok!(channel.close());
}

#[test]
fn writes_during_a_read() {
    reset(&[r#"DROP TABLE IF EXISTS "SqlchanPgStream""#]);

    let schema = Schema::builder()
        .message(MessageType::builder("SqlchanPgStream", 10).field("f0", FieldType::Int64))
        .build()
        .unwrap();
    let data = schema.message(10).unwrap().clone();
    let row = |seq: i64| data_message(&data, seq, [("f0", Value::I64(seq * 10))]);

    let mut channel = open(schema.clone());

    for seq in 1..=3 {
        assert_ok!(channel.post(&row(seq)));
    }

    assert_ok!(channel.post(&Message::query(10, vec![])));
    assert_eq!(assert_ok!(channel.process()).unwrap().as_data().unwrap().seq, 1);

    // A failing insert leaves the cursor usable.
    assert_err_is!(channel.post(&row(1)), is_execution);
    assert_ok!(channel.post(&row(4)));

    let rest: Vec<_> = drain(&mut channel)
        .iter()
        .map(|m| m.as_data().unwrap().seq)
        .collect();
    assert_eq!(rest, [2, 3]);

    // Rows written during the read are kept.
    assert_ok!(channel.post(&Message::query(10, vec![])));
    assert_eq!(drain(&mut channel).len(), 4);

    assert_ok!(channel.close());
}
