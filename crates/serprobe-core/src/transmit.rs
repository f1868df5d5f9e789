//! Transmitter loop: write a numbered message, wait for it to drain, pause,
//! repeat.

use crate::error::ServiceError;
use crate::serial_service::Link;
use std::time::{Duration, Instant};

pub const MESSAGE_TEXT: &str = "the quick brown fox jumps over the lazy dog\r\n";
pub const SEND_INTERVAL: Duration = Duration::from_millis(300);

pub fn message(sequence: u64) -> String {
    format!("{sequence} {MESSAGE_TEXT}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    Idle,
    AwaitingWrite,
    AwaitingDrain,
    Sleeping(Instant),
}

#[derive(Debug)]
pub struct Transmitter {
    sequence: u64,
    phase: TxPhase,
    interval: Duration,
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new(SEND_INTERVAL)
    }
}

impl Transmitter {
    pub fn new(interval: Duration) -> Self {
        Self {
            sequence: 0,
            phase: TxPhase::Idle,
            interval,
        }
    }

    /// Last sequence number handed to the link; 0 before the first message.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != TxPhase::Idle
    }

    /// Sends the first message. Only the first call has any effect.
    pub fn start(&mut self, link: &impl Link) -> Result<(), ServiceError> {
        if self.is_running() {
            log::warn!("transmitter already running, ignoring start");
            return Ok(());
        }
        self.send_next(link)
    }

    pub fn on_written(&mut self, link: &impl Link) -> Result<(), ServiceError> {
        if self.phase != TxPhase::AwaitingWrite {
            return Ok(());
        }
        link.drain()?;
        self.phase = TxPhase::AwaitingDrain;
        Ok(())
    }

    pub fn on_drained(&mut self, now: Instant) {
        if self.phase == TxPhase::AwaitingDrain {
            self.phase = TxPhase::Sleeping(now + self.interval);
        }
    }

    /// When the pause after the last drain ends, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            TxPhase::Sleeping(at) => Some(at),
            _ => None,
        }
    }

    pub fn on_timer(&mut self, now: Instant, link: &impl Link) -> Result<(), ServiceError> {
        match self.phase {
            TxPhase::Sleeping(at) if now >= at => self.send_next(link),
            _ => Ok(()),
        }
    }

    fn send_next(&mut self, link: &impl Link) -> Result<(), ServiceError> {
        self.sequence += 1;
        let msg = message(self.sequence);
        log::debug!("sending #{}", self.sequence);
        link.send(msg.into_bytes())?;
        self.phase = TxPhase::AwaitingWrite;
        Ok(())
    }
}
