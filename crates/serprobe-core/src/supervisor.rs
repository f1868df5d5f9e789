//! Watches adapter events for failures. Any failure ends the session; there is
//! no retry or reconnect.

use crate::error::FatalError;
use crate::serial_service::SerialEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Running,
    Terminating(i32),
}

#[derive(Debug)]
pub struct Supervisor {
    state: SupervisorState,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            state: SupervisorState::Running,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Returns the fatal cause if `event` ends the session. Only the first
    /// failure is logged and reported.
    pub fn observe(&mut self, event: &SerialEvent) -> Option<FatalError> {
        let cause = match event {
            SerialEvent::OpenFailed(e) => FatalError::Open(e.clone()),
            SerialEvent::Error(e) => FatalError::Runtime(e.clone()),
            SerialEvent::Disconnected(e) => FatalError::Disconnected(e.clone()),
            SerialEvent::Closed => FatalError::WorkerLost,
            _ => return None,
        };
        self.fail(cause)
    }

    /// Records a failure found outside the event stream.
    pub fn fail(&mut self, cause: FatalError) -> Option<FatalError> {
        if self.state != SupervisorState::Running {
            return None;
        }
        log::error!("{cause}");
        self.state = SupervisorState::Terminating(cause.exit_code());
        Some(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_events_keep_running() {
        let mut sup = Supervisor::new();
        for evt in [
            SerialEvent::Opened("COM1".into()),
            SerialEvent::Rx(vec![1, 2]),
            SerialEvent::Tx(10),
            SerialEvent::Drained,
        ] {
            assert_eq!(sup.observe(&evt), None);
        }
        assert_eq!(sup.state(), SupervisorState::Running);
    }

    #[test]
    fn test_error_terminates_with_code_one() {
        let mut sup = Supervisor::new();
        let fatal = sup.observe(&SerialEvent::Error("I/O fault".into()));
        assert_eq!(fatal, Some(FatalError::Runtime("I/O fault".into())));
        assert_eq!(sup.state(), SupervisorState::Terminating(1));
    }

    #[test]
    fn test_disconnect_terminates_with_code_one() {
        let mut sup = Supervisor::new();
        let fatal = sup.observe(&SerialEvent::Disconnected("unplugged".into()));
        assert_eq!(fatal, Some(FatalError::Disconnected("unplugged".into())));
        assert_eq!(sup.state(), SupervisorState::Terminating(1));
    }

    #[test]
    fn test_open_failure_is_fatal() {
        let mut sup = Supervisor::new();
        let fatal = sup.observe(&SerialEvent::OpenFailed("No such file or directory".into()));
        assert_eq!(fatal, Some(FatalError::Open("No such file or directory".into())));
        assert_eq!(fatal.unwrap().exit_code(), 1);
    }

    #[test]
    fn test_only_first_failure_reported() {
        let mut sup = Supervisor::new();
        assert!(sup.observe(&SerialEvent::Disconnected("gone".into())).is_some());
        assert_eq!(sup.observe(&SerialEvent::Error("late".into())), None);
        assert_eq!(sup.observe(&SerialEvent::Closed), None);
        assert_eq!(sup.state(), SupervisorState::Terminating(1));
    }
}
