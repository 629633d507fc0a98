use crate::{config::HeartbeatConfig, Channel, Config, Error, Message, Result, State};

use std::time::Instant;

/// Wraps a channel and posts a zero-filled message into it whenever it has
/// been idle for the configured timeout.
///
/// Posting a message or emitting one from `process` counts as activity. The
/// wrapper has no timer of its own: the idle check runs on every
/// [`process`](Heartbeat::process) call, against the monotonic clock.
#[derive(Debug)]
pub struct Heartbeat {
    channel: Channel,
    config: HeartbeatConfig,

    /// Message posted on idle, resolved from the schema at open
    message: Option<Message>,

    /// Last activity
    last: Instant,
}

impl Heartbeat {
    pub fn new(channel: Channel, config: HeartbeatConfig) -> Heartbeat {
        Heartbeat {
            channel,
            config,
            message: None,
            last: Instant::now(),
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn state(&self) -> State {
        self.channel.state()
    }

    /// Resolves the heartbeat message and opens the wrapped channel.
    pub fn open(&mut self, config: &Config) -> Result<()> {
        let message = self
            .channel
            .schema()
            .message_by_name(&self.config.message)
            .ok_or_else(|| {
                Error::invalid_config(format!(
                    "heartbeat message `{}` not found in schema",
                    self.config.message
                ))
            })?;

        let heartbeat = Message::data(message.msgid, 0, vec![0; message.size]);

        self.channel.open(config)?;

        log::info!(
            "heartbeat `{}` every {:?} of inactivity",
            self.config.message,
            self.config.timeout
        );

        self.message = Some(heartbeat);
        self.last = Instant::now();
        Ok(())
    }

    pub fn post(&mut self, message: &Message) -> Result<()> {
        self.last = Instant::now();
        self.channel.post(message)
    }

    pub fn process(&mut self) -> Result<Option<Message>> {
        self.process_at(Instant::now())
    }

    /// Same as [`process`](Heartbeat::process) with `now` as the current
    /// time.
    pub fn process_at(&mut self, now: Instant) -> Result<Option<Message>> {
        if let Some(heartbeat) = &self.message {
            let idle = now.saturating_duration_since(self.last);

            if self.channel.state() == State::Active && idle >= self.config.timeout {
                self.last = now;

                log::debug!("idle for {idle:?}, posting heartbeat `{}`", self.config.message);
                self.channel
                    .post(heartbeat)
                    .map_err(|e| e.context(format!("heartbeat `{}`", self.config.message)))?;
            }
        }

        let message = self.channel.process()?;
        if message.is_some() {
            self.last = now;
        }

        Ok(message)
    }

    pub fn close(&mut self) -> Result<()> {
        self.message = None;
        self.channel.close()
    }
}
