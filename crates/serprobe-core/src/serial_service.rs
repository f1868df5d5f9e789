use crate::config::ChannelConfig;
use crate::error::ServiceError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serialport::{SerialPort, SerialPortInfo};
use std::io::{self, Read};
use std::time::Duration;

const READ_TIMEOUT: Duration = Duration::from_millis(50);
const IDLE_SLEEP: Duration = Duration::from_millis(5);

/// What the port list shows for one port. Only USB ports report ids.
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub port_name: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        match info.port_type {
            serialport::SerialPortType::UsbPort(usb) => Self {
                port_name: info.port_name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                serial_number: usb.serial_number,
                manufacturer: usb.manufacturer,
            },
            _ => Self {
                port_name: info.port_name,
                vid: None,
                pid: None,
                serial_number: None,
                manufacturer: None,
            },
        }
    }
}

impl PortInfo {
    /// `VID:PID` plus the serial number when the device reports one.
    pub fn hardware_id(&self) -> Option<String> {
        let (vid, pid) = (self.vid?, self.pid?);
        Some(match &self.serial_number {
            Some(serial) => format!("{vid:04X}:{pid:04X} {serial}"),
            None => format!("{vid:04X}:{pid:04X}"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialEvent {
    Opened(String),
    OpenFailed(String),
    Rx(Vec<u8>),
    Tx(usize),
    Drained,
    Error(String),
    Disconnected(String),
    Closed,
}

enum Command {
    Send(Vec<u8>),
    Drain,
    Close,
}

/// Outbound half of a channel, as seen by the transmitter.
///
/// Both calls only enqueue work; completion is reported later as
/// `SerialEvent::Tx` and `SerialEvent::Drained`.
pub trait Link {
    fn send(&self, data: Vec<u8>) -> Result<(), ServiceError>;
    fn drain(&self) -> Result<(), ServiceError>;
}

pub struct SerialService {
    cfg: ChannelConfig,
    tx_cmd: Sender<Command>,
    rx_evt: Receiver<SerialEvent>,
}

impl SerialService {
    pub fn list_ports() -> Result<Vec<PortInfo>, ServiceError> {
        Ok(serialport::available_ports()?
            .into_iter()
            .map(PortInfo::from)
            .collect())
    }

    /// Starts the I/O worker. Open failures arrive as `SerialEvent::OpenFailed`.
    pub fn open(cfg: ChannelConfig) -> Result<Self, ServiceError> {
        let (tx_cmd, rx_cmd) = unbounded::<Command>();
        let (tx_evt, rx_evt) = unbounded::<SerialEvent>();
        let cfg_clone = cfg.clone();

        std::thread::Builder::new()
            .name(format!("serial-{}", cfg.port_name))
            .spawn(move || run_worker(cfg_clone, rx_cmd, tx_evt))
            .map_err(ServiceError::Spawn)?;

        Ok(Self { cfg, tx_cmd, rx_evt })
    }

    pub fn close(&self) {
        let _ = self.tx_cmd.send(Command::Close);
    }

    pub fn events(&self) -> &Receiver<SerialEvent> {
        &self.rx_evt
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.cfg
    }
}

impl Link for SerialService {
    fn send(&self, data: Vec<u8>) -> Result<(), ServiceError> {
        self.tx_cmd.send(Command::Send(data)).map_err(|_| ServiceError::WorkerGone)
    }

    fn drain(&self) -> Result<(), ServiceError> {
        self.tx_cmd.send(Command::Drain).map_err(|_| ServiceError::WorkerGone)
    }
}

fn run_worker(cfg: ChannelConfig, rx_cmd: Receiver<Command>, tx_evt: Sender<SerialEvent>) {
    let opened = serialport::new(&cfg.port_name, cfg.baud_rate)
        .data_bits(cfg.data_bits)
        .parity(cfg.parity.into())
        .stop_bits(cfg.stop_bits)
        .flow_control(cfg.flow_control)
        .timeout(READ_TIMEOUT)
        .open();

    let mut port = match opened {
        Ok(port) => port,
        Err(e) => {
            log::debug!("open of {} failed: {e}", cfg.port_name);
            let _ = tx_evt.send(SerialEvent::OpenFailed(e.to_string()));
            let _ = tx_evt.send(SerialEvent::Closed);
            return;
        }
    };

    let _ = tx_evt.send(SerialEvent::Opened(cfg.port_name.clone()));
    let mut buf = [0u8; 4096];
    loop {
        match port.read(&mut buf) {
            Ok(n) if n > 0 => {
                let _ = tx_evt.send(SerialEvent::Rx(buf[..n].to_vec()));
            }
            Ok(_) => {}
            Err(e) => {
                if let Some(fatal) = classify_io_error(&e) {
                    let _ = tx_evt.send(fatal);
                    return;
                }
            }
        }
        while let Ok(cmd) = rx_cmd.try_recv() {
            match handle_command(port.as_mut(), cmd) {
                Ok(Some(evt)) => {
                    let _ = tx_evt.send(evt);
                }
                Ok(None) => {
                    let _ = tx_evt.send(SerialEvent::Closed);
                    return;
                }
                Err(e) => {
                    // A write timeout is still a wedged link, not a quiet poll.
                    let evt = classify_io_error(&e).unwrap_or_else(|| SerialEvent::Error(e.to_string()));
                    let _ = tx_evt.send(evt);
                    return;
                }
            }
        }
        std::thread::sleep(IDLE_SLEEP);
    }
}

/// Runs one command against the port. `Ok(None)` means the worker should stop.
fn handle_command(port: &mut dyn SerialPort, cmd: Command) -> io::Result<Option<SerialEvent>> {
    match cmd {
        Command::Send(data) => {
            port.write_all(&data)?;
            Ok(Some(SerialEvent::Tx(data.len())))
        }
        Command::Drain => {
            port.flush()?;
            Ok(Some(SerialEvent::Drained))
        }
        Command::Close => Ok(None),
    }
}

/// Maps an I/O error to the event it should raise, or `None` for a read
/// timeout that simply means no data arrived.
pub fn classify_io_error(err: &io::Error) -> Option<SerialEvent> {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => None,
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => Some(SerialEvent::Disconnected(err.to_string())),
        _ => Some(SerialEvent::Error(err.to_string())),
    }
}
