//! The single event loop driving one test run.
//!
//! Everything happens on the calling thread: adapter events, the
//! transmitter's pause timer and the shutdown channel are multiplexed with
//! `select!`, so no locking is needed.

use crate::config::{ChannelConfig, Mode};
use crate::error::FatalError;
use crate::render::Renderer;
use crate::serial_service::{Link, SerialEvent};
use crate::supervisor::Supervisor;
use crate::transmit::{Transmitter, SEND_INTERVAL};
use crossbeam_channel::{at, never, select, Receiver};
use std::io::Write;
use std::time::{Duration, Instant};

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Shutdown,
    Fatal(FatalError),
}

pub struct Session<'a, L: Link, W: Write> {
    mode: Mode,
    config: &'a ChannelConfig,
    link: &'a L,
    transmitter: Transmitter,
    renderer: Renderer<W>,
    supervisor: Supervisor,
}

impl<'a, L: Link, W: Write> Session<'a, L, W> {
    pub fn new(mode: Mode, config: &'a ChannelConfig, link: &'a L, out: W) -> Self {
        Self {
            mode,
            config,
            link,
            transmitter: Transmitter::new(SEND_INTERVAL),
            renderer: Renderer::new(out),
            supervisor: Supervisor::new(),
        }
    }

    pub fn with_send_interval(mut self, interval: Duration) -> Self {
        self.transmitter = Transmitter::new(interval);
        self
    }

    pub fn transmitter(&self) -> &Transmitter {
        &self.transmitter
    }

    /// Runs until a fatal event arrives or `shutdown` fires (or its sender is
    /// dropped).
    pub fn run(&mut self, events: &Receiver<SerialEvent>, shutdown: &Receiver<()>) -> Outcome {
        loop {
            let timer = match self.transmitter.deadline() {
                Some(deadline) => at(deadline),
                None => never(),
            };
            let step = select! {
                recv(events) -> evt => match evt {
                    Ok(evt) => self.handle(evt),
                    Err(_) => Err(FatalError::WorkerLost),
                },
                recv(shutdown) -> _ => {
                    log::info!("shutdown requested");
                    return Outcome::Shutdown;
                }
                recv(timer) -> _ => self
                    .transmitter
                    .on_timer(Instant::now(), self.link)
                    .map_err(|e| FatalError::Runtime(e.to_string())),
            };
            if let Err(cause) = step {
                // Supervisor has already seen event-borne failures; this only
                // logs the ones raised locally.
                let cause = self.supervisor.fail(cause.clone()).unwrap_or(cause);
                return Outcome::Fatal(cause);
            }
        }
    }

    fn handle(&mut self, event: SerialEvent) -> Result<(), FatalError> {
        if let Some(fatal) = self.supervisor.observe(&event) {
            return Err(fatal);
        }
        match event {
            SerialEvent::Opened(name) => {
                log::info!("Serial Port {name} open {}", self.config.summary());
                if self.mode == Mode::Transmitter {
                    log::info!("Transmitting");
                    self.transmitter
                        .start(self.link)
                        .map_err(|e| FatalError::Runtime(e.to_string()))?;
                }
            }
            SerialEvent::Rx(data) => match self.mode {
                Mode::Receiver => self
                    .renderer
                    .write(&data)
                    .map_err(|e| FatalError::Output(e.to_string()))?,
                Mode::Transmitter => log::trace!("ignoring {} received bytes", data.len()),
            },
            SerialEvent::Tx(n) => {
                log::trace!("write of {n} bytes accepted");
                self.transmitter
                    .on_written(self.link)
                    .map_err(|e| FatalError::Runtime(e.to_string()))?;
            }
            SerialEvent::Drained => self.transmitter.on_drained(Instant::now()),
            _ => {}
        }
        Ok(())
    }
}
