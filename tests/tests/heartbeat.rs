use sqlchan::{
    schema::{FieldType, Message as MessageType},
    Channel, Config, Heartbeat, HeartbeatConfig, Message, Schema, State,
};
use sqlchan_core::stmt::Value;
use std::time::{Duration, Instant};
use tests::*;

const TIMEOUT: Duration = Duration::from_secs(1);

fn schema() -> Schema {
    Schema::builder()
        .message(MessageType::builder("Data", 10).field("f0", FieldType::Int8))
        .build()
        .unwrap()
}

fn open(driver: &MockDriver) -> Heartbeat {
    init_logging();
    driver.table("Data");

    let mut channel = Heartbeat::new(
        Channel::with_driver(schema(), driver.clone()),
        HeartbeatConfig::new("Data").timeout(TIMEOUT),
    );
    assert_ok!(channel.open(&Config::new("postgresql://localhost/test")));
    channel
}

fn data(seq: i64, f0: i8) -> Message {
    let schema = schema();
    data_message(schema.message(10).unwrap(), seq, [("f0", Value::I8(f0))])
}

#[test]
fn idle_channel_posts_zero_filled_message() {
    let opened = Instant::now();
    let driver = MockDriver::new();
    let log = driver.log();
    let mut channel = open(&driver);

    assert!(assert_ok!(channel.process_at(opened)).is_none());
    assert!(log.is_empty());

    let idle = Instant::now() + TIMEOUT;
    assert!(assert_ok!(channel.process_at(idle)).is_none());

    assert_eq!(log.len(), 1);
    assert!(log.last().sql.starts_with("INSERT INTO \"Data\""), "{}", log.last().sql);
    assert_eq!(log.last().params, [Value::I64(0), Value::I8(0)]);

    // The heartbeat itself counts as activity.
    assert_ok!(channel.process_at(idle + TIMEOUT / 2));
    assert_eq!(log.len(), 1);

    assert_ok!(channel.process_at(idle + TIMEOUT));
    assert_eq!(log.len(), 2);
}

#[test]
fn posts_postpone_the_heartbeat() {
    let driver = MockDriver::new();
    let log = driver.log();
    let mut channel = open(&driver);

    for seq in 1..=4 {
        assert_ok!(channel.post(&data(seq, 10)));
        assert_ok!(channel.process_at(Instant::now() + TIMEOUT / 2));
    }

    let seqs = log.statements().iter().map(|stmt| stmt.params[0].clone()).collect::<Vec<_>>();
    assert_eq!(seqs, [Value::I64(1), Value::I64(2), Value::I64(3), Value::I64(4)]);
}

#[test]
fn emitted_rows_postpone_the_heartbeat() {
    let driver = MockDriver::new();
    let log = driver.log();
    let mut channel = open(&driver);

    driver.reply(vec![
        vec![Value::I64(1), Value::I64(1)],
        vec![Value::I64(2), Value::I64(2)],
    ]);
    assert_ok!(channel.post(&Message::query(10, vec![])));

    // Each step stays within the timeout of the previous row, not of the post.
    let mut now = Instant::now() + TIMEOUT / 2;
    assert_eq!(assert_ok!(channel.process_at(now)).unwrap().as_data().unwrap().seq, 1);

    now += TIMEOUT * 3 / 4;
    assert_eq!(assert_ok!(channel.process_at(now)).unwrap().as_data().unwrap().seq, 2);

    now += TIMEOUT * 3 / 4;
    assert!(assert_ok!(channel.process_at(now)).unwrap().is_end_of_data());

    assert_eq!(log.len(), 1);
    assert!(log.last().sql.starts_with("SELECT"), "{}", log.last().sql);
}

#[test]
fn closed_channel_posts_nothing() {
    let driver = MockDriver::new();
    let log = driver.log();
    let mut channel = open(&driver);

    assert_ok!(channel.close());
    assert_eq!(channel.state(), State::Closed);

    assert_err_is!(channel.process_at(Instant::now() + TIMEOUT), is_channel_state);
    assert!(log.is_empty());
}

#[test]
fn failed_heartbeat_is_reported() {
    let driver = MockDriver::new();
    let mut channel = open(&driver);

    driver.fail(sqlchan::Error::connection("server closed the connection unexpectedly"));

    let err = assert_err_is!(channel.process_at(Instant::now() + TIMEOUT), is_connection);
    assert!(err.to_string().contains("heartbeat `Data`"), "{err}");
    assert_eq!(channel.state(), State::Error);
}

#[test]
fn unknown_message_fails_open() {
    init_logging();

    let mut channel = Heartbeat::new(
        Channel::with_driver(schema(), MockDriver::new()),
        HeartbeatConfig::new("Missing"),
    );

    let err = assert_err_is!(channel.open(&Config::new("postgresql://localhost/test")), is_invalid_config);
    assert!(err.to_string().contains("Missing"), "{err}");
    assert_eq!(channel.state(), State::Closed);
}
