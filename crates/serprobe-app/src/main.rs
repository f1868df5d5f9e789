mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, ConfigError};
use serprobe_core::{Outcome, SerialService, Session};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!();
    println!("Serialport Test Transmitter/Receiver");
    println!("Use -h for help");
    println!();

    if cli.list {
        return print_ports();
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => std::process::exit(report_config_error(&e, print_ports)),
    };

    let service = SerialService::open(config.channel.clone())
        .with_context(|| format!("opening {}", config.channel.port_name))?;

    // The binary never sends on this: it runs until a fatal event or until the
    // process is killed. Only the session tests exercise cancellation.
    let (_shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

    let stdout = io::stdout();
    let outcome = Session::new(config.mode, service.config(), &service, stdout.lock())
        .run(service.events(), &shutdown_rx);

    match outcome {
        Outcome::Shutdown => {
            service.close();
            Ok(())
        }
        Outcome::Fatal(cause) => std::process::exit(cause.exit_code()),
    }
}

/// Prints a configuration error and returns its exit code. A missing port
/// also lists the available ports; a failed listing is logged and does not
/// change the exit code.
fn report_config_error(e: &ConfigError, list_ports: impl FnOnce() -> Result<()>) -> i32 {
    println!("ERROR: {e}");
    if *e == ConfigError::MissingPort {
        if let Err(list_err) = list_ports() {
            log::error!("{list_err:#}");
        }
    }
    println!();
    e.exit_code()
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_ports() -> Result<()> {
    println!("Available serial ports are:-");
    for port in SerialService::list_ports()? {
        println!(
            "{}\t{}\t{}",
            port.port_name,
            port.hardware_id().unwrap_or_default(),
            port.manufacturer.as_deref().unwrap_or("")
        );
    }
    println!();
    Ok(())
}
