// heatlink command-line tool -- decode captured thermostat frames and build
// poll and command packets without a bus connection.
//
// Usage:
//   heatlink-cli --protocol 3 --model PRT decode 814b0001...
//   heatlink-cli --protocol 2 --model PRTHW --address 4 poll
//   heatlink-cli --protocol 3 --model PRTHW encode water-state on
//   heatlink-cli --protocol 2 --model PRT encode lock on --dcb 0126145100...
//   heatlink-cli list
//
// Log output is controlled with RUST_LOG (e.g. RUST_LOG=heatlink=debug).

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing::debug;

use heatlink::{Field, Function, Model, Thermostat, ThermostatBuilder, Value, all_variants};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// heatlink command-line tool -- decode and encode thermostat frames.
#[derive(Parser)]
#[command(name = "heatlink-cli", version, about)]
struct Cli {
    /// Protocol version number (2 or 3).
    #[arg(long, default_value_t = 3)]
    protocol: u8,

    /// Thermostat model: DT, DTE, PRT, PRTE, PRTHW, FCV.
    #[arg(long, default_value = "PRT")]
    model: Model,

    /// Bus address.
    #[arg(long, default_value_t = 1)]
    address: u8,

    /// Local time used for holiday and timestamp calculations
    /// (e.g. 2024-01-10T12:00:00). Defaults to the system clock.
    #[arg(long, value_parser = parse_timestamp)]
    now: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a captured response frame and print its readings.
    Decode {
        /// Frame bytes in hex. Spaces, colons and a 0x prefix are ignored.
        frame: String,
    },

    /// Print the poll frame for the configured thermostat.
    Poll,

    /// Print the write frame for a command.
    Encode {
        /// Function name (e.g. SET_TEMP, set-temp, holidayset).
        function: Function,

        /// Value: a number, on/off, a timestamp, or "now".
        value: String,

        /// Previously captured response frame, needed by V2 clock and lock
        /// writes.
        #[arg(long)]
        dcb: Option<String>,
    },

    /// Print the rebuilt settings block of a captured response (V2).
    StatusBlock {
        /// Frame bytes in hex.
        frame: String,
    },

    /// List every registered protocol/model implementation.
    List,
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

/// Parse hex bytes, tolerating separators and a 0x prefix.
fn parse_frame(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();
    hex::decode(&cleaned).with_context(|| format!("invalid hex frame '{s}'"))
}

/// Parse a local timestamp like `2024-01-10T12:00:00` or `2024-01-10 12:00`.
fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("invalid timestamp '{s}'"))
}

/// Turn a command-line value into a typed command value.
fn parse_value(s: &str, now: NaiveDateTime) -> Value {
    match s.to_lowercase().as_str() {
        "on" | "true" | "yes" => return Value::OnOff(true),
        "off" | "false" | "no" => return Value::OnOff(false),
        "now" => return Value::Timestamp(now),
        _ => {}
    }
    if let Ok(n) = s.parse::<f64>() {
        return Value::Numeric(n);
    }
    match parse_timestamp(s) {
        Ok(ts) => Value::Timestamp(ts),
        Err(_) => Value::Text(s.to_string()),
    }
}

fn hex_line(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_decode(thermostat: &mut Thermostat, raw: &[u8], now: NaiveDateTime) -> Result<()> {
    thermostat
        .decode(raw)
        .context("frame rejected")?;

    println!("Thermostat");
    println!("  Address:   {}", thermostat.address());
    match thermostat.model() {
        Some(model) => println!("  Model:     {model}"),
        None => println!("  Model:     unknown"),
    }
    if let Some(dcb) = thermostat.dcb() {
        println!("  DCB bytes: {}", dcb.len());
    }
    println!();
    println!("Readings");
    for function in Function::ALL {
        match thermostat.read_at(function, now) {
            Field::Supported(value) => println!("  {:<13} {value}", function.to_string()),
            Field::Unsupported => debug!(%function, "not carried by this layout"),
        }
    }
    Ok(())
}

fn cmd_encode(
    thermostat: &mut Thermostat,
    function: Function,
    value: &str,
    dcb: Option<&str>,
    now: NaiveDateTime,
) -> Result<()> {
    if let Some(dcb) = dcb {
        let raw = parse_frame(dcb)?;
        thermostat
            .decode(&raw)
            .context("--dcb frame rejected")?;
    }
    let value = parse_value(value, now);
    debug!(%function, %value, "encoding");
    let frame = thermostat
        .encode_at(function, &value, now)
        .with_context(|| format!("cannot encode {function} = {value}"))?;
    println!("{}", hex_line(&frame));
    Ok(())
}

fn cmd_list() {
    println!("{:<8}  {:<6}  Writable", "Protocol", "Model");
    println!("{:<8}  {:<6}  --------", "--------", "------");
    for variant in all_variants() {
        let (Some(version), Some(model)) = (variant.version(), variant.model()) else {
            continue;
        };
        let writable: Vec<String> = variant.writable().iter().map(|f| f.to_string()).collect();
        println!("{:<8}  {:<6}  {}", version.to_string(), model.to_string(), writable.join(", "));
    }
    println!();
    println!(
        "Other models use the PRT layout of their protocol version: {}.",
        Model::ALL
            .iter()
            .filter(|m| !matches!(m, Model::PRT | Model::PRTHW))
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let now = cli.now.unwrap_or_else(|| Local::now().naive_local());

    if matches!(cli.command, Command::List) {
        cmd_list();
        return Ok(());
    }

    if !matches!(cli.protocol, 2 | 3) {
        bail!("unsupported protocol version {}; expected 2 or 3", cli.protocol);
    }

    let mut thermostat = ThermostatBuilder::new(cli.model)
        .version_number(cli.protocol)
        .address(cli.address)
        .build();

    match &cli.command {
        Command::Decode { frame } => {
            let raw = parse_frame(frame)?;
            cmd_decode(&mut thermostat, &raw, now)
        }
        Command::Poll => {
            let frame = thermostat.poll()?;
            println!("{}", hex_line(&frame));
            Ok(())
        }
        Command::Encode {
            function,
            value,
            dcb,
        } => cmd_encode(&mut thermostat, *function, value, dcb.as_deref(), now),
        Command::StatusBlock { frame } => {
            let raw = parse_frame(frame)?;
            thermostat.decode(&raw).context("frame rejected")?;
            let block = thermostat.current_write_status_packet()?;
            println!("{}", hex_line(&block));
            Ok(())
        }
        Command::List => Ok(()),
    }
}
