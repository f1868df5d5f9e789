//! Command-line surface.

use clap::Parser;
use serprobe_core::{ChannelConfig, Mode, Parity};
use thiserror::Error;

/// Serialport Test Transmitter/Receiver.
#[derive(Debug, Parser)]
#[command(name = "serprobe", version, about)]
pub struct Cli {
    /// List serial ports.
    #[arg(short, long)]
    pub list: bool,

    /// Serial port, e.g. COM1 or /dev/ttyUSB0.
    #[arg(short, long, value_name = "NAME")]
    pub port: Option<String>,

    /// Baud rate.
    #[arg(
        short,
        long,
        value_name = "VALUE",
        default_value_t = 9600,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub baud: u32,

    /// Parity: none, even or odd. Anything else means none.
    #[arg(long, value_name = "VALUE", default_value = "none")]
    pub parity: String,

    /// Transmit numbered test messages.
    #[arg(short, long, conflicts_with = "receiver")]
    pub transmitter: bool,

    /// Print everything received.
    #[arg(short, long)]
    pub receiver: bool,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No serial port name specified")]
    MissingPort,
    #[error("Must use --transmitter OR --receiver (-t OR -r)")]
    MissingMode,
}

impl ConfigError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}

#[derive(Debug)]
pub struct RunConfig {
    pub channel: ChannelConfig,
    pub mode: Mode,
}

impl Cli {
    pub fn resolve(&self) -> Result<RunConfig, ConfigError> {
        let port_name = self.port.as_deref().ok_or(ConfigError::MissingPort)?;
        let mode = match (self.transmitter, self.receiver) {
            (true, _) => Mode::Transmitter,
            (false, true) => Mode::Receiver,
            (false, false) => return Err(ConfigError::MissingMode),
        };
        let channel = ChannelConfig {
            baud_rate: self.baud,
            parity: self.parity.parse().unwrap_or_default(),
            ..ChannelConfig::new(port_name)
        };
        Ok(RunConfig { channel, mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("serprobe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_transmitter_defaults() {
        let cfg = parse(&["-p", "/dev/ttyUSB0", "-t"]).resolve().unwrap();
        assert_eq!(cfg.mode, Mode::Transmitter);
        assert_eq!(cfg.channel.port_name, "/dev/ttyUSB0");
        assert_eq!(cfg.channel.baud_rate, 9600);
        assert_eq!(cfg.channel.parity, Parity::None);
    }

    #[test]
    fn test_receiver_with_line_settings() {
        let cfg = parse(&["--port", "COM4", "--baud", "115200", "--parity", "odd", "--receiver"])
            .resolve()
            .unwrap();
        assert_eq!(cfg.mode, Mode::Receiver);
        assert_eq!(cfg.channel.baud_rate, 115_200);
        assert_eq!(cfg.channel.parity, Parity::Odd);
    }

    #[test]
    fn test_unknown_parity_ignored() {
        let cfg = parse(&["-p", "COM1", "-r", "--parity", "space"]).resolve().unwrap();
        assert_eq!(cfg.channel.parity, Parity::None);
    }

    #[test]
    fn test_missing_port() {
        let err = parse(&["-t"]).resolve().unwrap_err();
        assert_eq!(err, ConfigError::MissingPort);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_mode() {
        assert_eq!(parse(&["-p", "COM1"]).resolve().unwrap_err(), ConfigError::MissingMode);
    }

    #[test]
    fn test_modes_conflict() {
        assert!(Cli::try_parse_from(["serprobe", "-p", "COM1", "-t", "-r"]).is_err());
    }

    #[test]
    fn test_list_needs_nothing_else() {
        let cli = parse(&["-l"]);
        assert!(cli.list);
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_bad_baud_rejected() {
        assert!(Cli::try_parse_from(["serprobe", "-p", "COM1", "-t", "-b", "fast"]).is_err());
    }

    #[test]
    fn test_zero_baud_rejected() {
        let err = Cli::try_parse_from(["serprobe", "-p", "COM1", "-t", "-b", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert_eq!(parse(&["-p", "COM1", "-t", "-b", "1"]).resolve().unwrap().channel.baud_rate, 1);
    }
}
