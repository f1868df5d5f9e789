//! Core of the serial link tester: channel adapter, transmitter loop,
//! receiver rendering and failure supervision.

pub mod config;
pub mod error;
pub mod render;
pub mod serial_service;
pub mod session;
pub mod supervisor;
pub mod transmit;

pub use config::{ChannelConfig, Mode, Parity};
pub use error::{FatalError, ServiceError};
pub use render::{render, ByteClass, Renderer};
pub use serial_service::{Link, PortInfo, SerialEvent, SerialService};
pub use session::{Outcome, Session};
pub use supervisor::{Supervisor, SupervisorState};
pub use transmit::{message, Transmitter, TxPhase, SEND_INTERVAL};
