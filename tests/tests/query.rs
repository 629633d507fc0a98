use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use sqlchan::{
    schema::{FieldType, Message as MessageType, TimeResolution},
    Channel, Config, Message, Operator, Predicate, Schema,
};
use sqlchan_core::stmt::Value;
use tests::*;

fn schema() -> Schema {
    Schema::builder()
        .message(
            MessageType::builder("Data", 10)
                .field("f0", FieldType::Int64)
                .field("f1", FieldType::Double)
                .field("f2", FieldType::String),
        )
        .build()
        .unwrap()
}

/// Ten rows: `f0 = 1000 * i`, `f1 = 100.5 * i`, `f2 = i`
fn fixture() -> Channel {
    init_logging();

    let schema = schema();
    let data = schema.message(10).unwrap().clone();

    let mut channel = Channel::new(schema);
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    for i in 0..10 {
        let message = data_message(
            &data,
            i,
            [
                ("f0", Value::I64(1000 * i)),
                ("f1", Value::F64(100.5 * i as f64)),
                ("f2", Value::String(i.to_string())),
            ],
        );
        assert_ok!(channel.post(&message));
    }

    channel
}

/// Rows of decimals and time points, keyed by seq:
///
/// | seq | dec  | us        | day   |
/// |-----|------|-----------|-------|
/// | 1   | 9    | 1_000_500 | 9     |
/// | 2   | 10   | 2_000_000 | 10    |
/// | 3   | 1.50 | 999       | 19000 |
fn ordered_fixture() -> Channel {
    init_logging();

    let schema = Schema::builder()
        .message(
            MessageType::builder("Data", 10)
                .field("dec", FieldType::Decimal128)
                .field("us", FieldType::TimePoint(TimeResolution::Microsecond))
                .field("day", FieldType::TimePoint(TimeResolution::Day)),
        )
        .build()
        .unwrap();
    let data = schema.message(10).unwrap().clone();

    let mut channel = Channel::new(schema);
    assert_ok!(channel.open(&Config::new("sqlite::memory:")));

    let rows = [
        (1, "9", 1_000_500, 9),
        (2, "10", 2_000_000, 10),
        (3, "1.50", 999, 19_000),
    ];

    for (seq, dec, us, day) in rows {
        let message = data_message(
            &data,
            seq,
            [
                ("dec", Value::Decimal(dec.parse::<Decimal>().unwrap())),
                ("us", Value::I64(us)),
                ("day", Value::I64(day)),
            ],
        );
        assert_ok!(channel.post(&message));
    }

    channel
}

/// Sequence numbers of the rows matching `expression`.
fn query(channel: &mut Channel, expression: Vec<Predicate>) -> Vec<i64> {
    assert_ok!(channel.post(&Message::query(10, expression)));

    drain(channel)
        .iter()
        .map(|message| message.as_data().unwrap().seq)
        .collect()
}

#[test]
fn empty_expression_returns_all_rows_in_insertion_order() {
    let mut channel = fixture();
    assert_eq!(query(&mut channel, vec![]), (0..10).collect::<Vec<_>>());
}

#[test]
fn single_predicate_per_operator() {
    let mut channel = fixture();

    let cases = [
        (Operator::Eq, vec![3]),
        (Operator::Ne, vec![0, 1, 2, 4, 5, 6, 7, 8, 9]),
        (Operator::Lt, vec![0, 1, 2]),
        (Operator::Le, vec![0, 1, 2, 3]),
        (Operator::Gt, vec![4, 5, 6, 7, 8, 9]),
        (Operator::Ge, vec![3, 4, 5, 6, 7, 8, 9]),
    ];

    for (op, expected) in cases {
        assert_eq!(
            query(&mut channel, vec![Predicate::new("f0", op, 3000)]),
            expected,
            "f0 {op} 3000"
        );
    }
}

#[test]
fn predicates_combine_with_and() {
    let mut channel = fixture();

    assert_eq!(
        query(
            &mut channel,
            vec![
                Predicate::new("f0", Operator::Gt, 1000),
                Predicate::new("f1", Operator::Le, 500),
            ]
        ),
        [2, 3, 4]
    );

    assert_eq!(
        query(
            &mut channel,
            vec![
                Predicate::new("f0", Operator::Gt, 5000),
                Predicate::new("f1", Operator::Le, 500),
            ]
        ),
        Vec::<i64>::new()
    );
}

#[test]
fn string_and_float_operands() {
    let mut channel = fixture();

    assert_eq!(
        query(&mut channel, vec![Predicate::new("f2", Operator::Eq, "2")]),
        [2]
    );
    assert_eq!(
        query(&mut channel, vec![Predicate::new("f1", Operator::Gt, 804.0)]),
        [9]
    );
}

#[test]
fn rows_decode_into_the_message() {
    let mut channel = fixture();
    let data = channel.schema().message(10).unwrap().clone();

    assert_ok!(channel.post(&Message::query(
        10,
        vec![Predicate::new("f0", Operator::Eq, 7000)]
    )));

    let rows = drain_rows(&mut channel, &data);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["f0"], Value::I64(7000));
    assert_eq!(rows[0]["f1"], Value::F64(703.5));
    assert_eq!(rows[0]["f2"], Value::from("7"));
}

#[test]
fn invalid_predicates_fail_the_query_only() {
    let mut channel = fixture();

    let err = assert_err_is!(
        channel.post(&Message::query(
            10,
            vec![Predicate::new("missing", Operator::Eq, 1)]
        )),
        is_query_compile
    );
    assert!(err.to_string().contains("missing"), "{err}");

    assert_err_is!(
        channel.post(&Message::query(10, vec![Predicate::new("f0", Operator::Eq, "x")])),
        is_query_compile
    );

    assert!(!channel.is_streaming());
    assert_eq!(query(&mut channel, vec![]).len(), 10);
}

#[test]
fn decimals_compare_as_numbers() {
    let mut channel = ordered_fixture();

    let cases = [
        (Predicate::new("dec", Operator::Gt, 9), vec![2]),
        (Predicate::new("dec", Operator::Eq, 1.5), vec![3]),
        (Predicate::new("dec", Operator::Lt, "9.5"), vec![1, 3]),
        (Predicate::new("dec", Operator::Ge, 10), vec![2]),
        (Predicate::new("dec", Operator::Ne, 9), vec![2, 3]),
    ];

    for (predicate, expected) in cases {
        assert_eq!(
            query(&mut channel, vec![predicate.clone()]),
            expected,
            "{predicate:?}"
        );
    }
}

#[test]
fn time_points_compare_in_time_order() {
    let mut channel = ordered_fixture();

    let cases = [
        (Predicate::new("us", Operator::Gt, 1_000_000), vec![1, 2]),
        (Predicate::new("us", Operator::Lt, 1_000_000), vec![3]),
        (Predicate::new("us", Operator::Eq, 1_000_500), vec![1]),
        (Predicate::new("us", Operator::Le, 999), vec![3]),
        (Predicate::new("day", Operator::Gt, 9), vec![2, 3]),
        (Predicate::new("day", Operator::Lt, 10), vec![1]),
        (Predicate::new("day", Operator::Ge, 19_000), vec![3]),
    ];

    for (predicate, expected) in cases {
        assert_eq!(
            query(&mut channel, vec![predicate.clone()]),
            expected,
            "{predicate:?}"
        );
    }
}
