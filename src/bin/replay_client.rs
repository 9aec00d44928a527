//! One-shot replay client
//!
//! Reads a recorded trip to exhaustion through the device registry,
//! printing each reading normalized by a GPS sensor's two-phase
//! connect/read protocol. Exhaustion ends the run cleanly; any other
//! registry error is fatal.
//!
//! Usage:
//!   replay_client <replay_csv> <port_number>

use std::env;
use std::process;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use ebike_gateway::hal::sensor::{RAW_FIELD_SEPARATOR, READING_SEPARATOR};
use ebike_gateway::{DeviceRegistry, GpsSensor, PositioningSensor};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <replay_csv> <port_number>", args[0]);
        process::exit(1);
    }

    let replay_path = &args[1];
    let port: usize = args[2]
        .parse()
        .with_context(|| format!("invalid port number: {}", args[2]))?;

    let mut registry = DeviceRegistry::new(port + 1);
    registry
        .attach_device(port, Box::new(GpsSensor::new()))
        .context("failed to attach GPS sensor")?;
    registry
        .initialise(replay_path)
        .with_context(|| format!("failed to bind replay source {}", replay_path))?;

    // The port's sensor stays attached for the whole replay; this one
    // runs the connect/read protocol on each raw record.
    let mut sensor = GpsSensor::new();

    let mut read_count = 0usize;
    loop {
        let raw = match registry.read(port) {
            Ok(raw) => raw,
            Err(err) if err.is_exhausted() => {
                println!("Reached end of data after {} readings.", read_count);
                break;
            }
            Err(err) => bail!("device read failed: {}", err),
        };

        // Raw rows carry the ';' field separator; connect expects ','
        let reading =
            String::from_utf8_lossy(&raw).replace(RAW_FIELD_SEPARATOR, &READING_SEPARATOR.to_string());
        if sensor.connect(&reading) {
            println!("{}", sensor.read());
        } else {
            eprintln!("Failed to connect reading {}", read_count);
        }

        read_count += 1;
    }

    registry.release_device(port)?;
    Ok(())
}
