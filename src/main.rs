// Probe CLI for the serial motion controller: connect, query, report

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gcode_serial_driver::config::DEFAULT_ADDRESS;
use gcode_serial_driver::motion::transport::available_port_names;
use gcode_serial_driver::{MotionController, SerialMotionDriver};

#[derive(Parser)]
#[command(about = "Probe tool for a G-code style serial motion controller")]
struct Cli {
    /// Serial port the controller is attached to
    #[arg(short, long, default_value = DEFAULT_ADDRESS)]
    port: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List serial ports visible on this machine
    Ports,
    /// Report whether the device is currently moving
    Status,
    /// Print the current position of every axis
    Positions,
    /// Print the endstop range of every axis
    Endstops,
    /// Home the given axes (all axes when none are given)
    Home { axes: Vec<usize> },
    /// Dump the driver settings as JSON
    Settings,
}

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Ports = cli.command {
        for name in available_port_names()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut driver = SerialMotionDriver::new();
    driver.set_address(&cli.port)?;

    if let Command::Settings = cli.command {
        // Settings dump works without a device attached
        for setting in driver.settings() {
            println!("{}", serde_json::to_string_pretty(setting)?);
        }
        return Ok(());
    }

    driver.connect()?;
    let result = run_command(&mut driver, &cli.command);
    driver.disconnect()?;
    result
}

fn run_command(
    driver: &mut SerialMotionDriver,
    command: &Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let names = driver.axis_display_names();
    let units = driver.axis_units();

    match command {
        Command::Status => {
            if driver.is_moving()? {
                println!("Moving");
            } else {
                println!("Idle");
            }
        }
        Command::Positions => {
            let positions = driver.current_positions()?;
            for (axis, position) in positions.iter().enumerate() {
                println!("{} {}{}", names[axis], position, units[axis]);
            }
        }
        Command::Endstops => {
            let mins = driver.endstop_minimums()?;
            let maxs = driver.endstop_maximums()?;
            for axis in 0..mins.len().min(maxs.len()) {
                println!(
                    "{} {}{} .. {}{}",
                    names[axis], mins[axis], units[axis], maxs[axis], units[axis]
                );
            }
        }
        Command::Home { axes } => {
            let axes = if axes.is_empty() {
                (0..names.len()).collect()
            } else {
                axes.clone()
            };
            let homed = driver.home(&axes)?;
            for (axis, position) in homed {
                println!("{} homed to {}{}", names[axis], position, units[axis]);
            }
        }
        Command::Ports | Command::Settings => unreachable!("handled before connect"),
    }
    Ok(())
}
