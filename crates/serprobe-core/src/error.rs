use thiserror::Error;

/// Synchronous failures raised by the serial service itself.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to start serial worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("serial worker is no longer running")]
    WorkerGone,
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[from] serialport::Error),
}

/// Causes that end a session. All of them terminate the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("Serial Port Error : {0}")]
    Open(String),
    #[error("Serial Port Error : {0}")]
    Runtime(String),
    #[error("Disconnected {0}")]
    Disconnected(String),
    #[error("serial worker stopped without reporting a cause")]
    WorkerLost,
    #[error("failed to write output: {0}")]
    Output(String),
}

impl FatalError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}
