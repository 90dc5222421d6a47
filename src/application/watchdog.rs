// Connection watchdog - Channel lifecycle and silence detection
use crate::domain::connection::ConnectionState;
use crate::domain::snapshot::Snapshot;
use crate::infrastructure::snapshot_decoder::{self, DecodeError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogSignal {
    ConnectionLost,
    ConnectionRestored,
}

/// A valid frame, plus the restore signal if the channel had gone stale.
#[derive(Debug)]
pub struct Delivery {
    pub snapshot: Snapshot,
    pub signal: Option<WatchdogSignal>,
}

/// Sole owner of [`ConnectionState`]. Time is passed in so the session can
/// drive it from the runtime clock and tests from fixed instants.
#[derive(Debug)]
pub struct ConnectionWatchdog {
    state: ConnectionState,
    silence_timeout: Duration,
    deadline: Option<Instant>,
    attempts: u64,
}

impl ConnectionWatchdog {
    pub fn new(silence_timeout: Duration) -> Self {
        Self {
            state: ConnectionState::Connecting,
            silence_timeout,
            deadline: None,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// When the silence timer fires, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Start a fresh cycle. Any timer from the previous channel is dropped.
    pub fn begin_attempt(&mut self) -> u64 {
        self.attempts += 1;
        self.state = ConnectionState::Connecting;
        self.deadline = None;
        self.attempts
    }

    pub fn on_open(&mut self, now: Instant) {
        self.state = ConnectionState::Live;
        self.arm(now);
    }

    /// Decode an inbound frame. Only a valid snapshot counts as traffic:
    /// a malformed frame leaves both the timer and the state untouched.
    pub fn on_message(&mut self, raw: &str, now: Instant) -> Result<Delivery, DecodeError> {
        let snapshot = snapshot_decoder::decode(raw)?;

        let signal = (self.state == ConnectionState::Stale)
            .then_some(WatchdogSignal::ConnectionRestored);
        self.state = ConnectionState::Live;
        self.arm(now);

        Ok(Delivery { snapshot, signal })
    }

    /// Timer tick. Marks the channel stale once per silent period; the
    /// channel itself is left open.
    pub fn on_silence(&mut self, now: Instant) -> Option<WatchdogSignal> {
        match self.deadline {
            Some(deadline) if now >= deadline && self.state == ConnectionState::Live => {
                self.state = ConnectionState::Stale;
                self.deadline = None;
                Some(WatchdogSignal::ConnectionLost)
            }
            _ => None,
        }
    }

    pub fn on_close(&mut self) {
        self.state = ConnectionState::Closed;
        self.deadline = None;
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.silence_timeout);
    }
}
