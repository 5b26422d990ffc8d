use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use morningstar_prostar::{
    config::{Parity, SerialConfig},
    prostar_pwm::{self, UnsupportedSlot},
};
use serde::Serialize;

/// ProStar PWM CLI
#[derive(Debug, Parser)]
#[command(author, version)]
struct Options {
    #[command(flatten)]
    serial: SerialArgs,

    /// Print single line JSON
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct SerialArgs {
    /// serial port
    #[arg(long, env = "SERIAL_PORT")]
    serial_port: String,

    /// baud rate
    #[arg(long, env = "BAUD_RATE", default_value_t = 9600)]
    baud_rate: u32,

    /// data bits
    #[arg(long, env = "DATA_BITS", default_value_t = 8)]
    data_bits: u8,

    /// parity, N/E/O
    #[arg(long, env = "PARITY", default_value = "N")]
    parity: Parity,

    /// stop bits
    #[arg(long, env = "STOP_BITS", default_value_t = 2)]
    stop_bits: u8,

    /// modbus unit id, 1-247
    #[arg(long, env = "MODBUS_UNIT_ID", default_value_t = 1)]
    modbus_unit_id: u8,

    /// per request timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,
}

impl From<SerialArgs> for SerialConfig {
    fn from(a: SerialArgs) -> Self {
        SerialConfig {
            port: a.serial_port,
            baud_rate: a.baud_rate,
            data_bits: a.data_bits,
            parity: a.parity,
            stop_bits: a.stop_bits,
            unit_id: a.modbus_unit_id,
            timeout_ms: a.timeout_ms,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// raw ADC data
    RawAdcData,
    /// filtered ADC data
    FilteredAdcData,
    /// temperature data
    TemperatureData,
    /// charger status
    ChargerStatus,
    /// load status
    LoadStatus,
    /// misc data
    MiscData,
    /// charge settings
    ChargeSettings,
    /// load settings
    LoadSettings,
    /// misc settings
    MiscSettings,
    /// pwm settings
    PwmSettings,
    /// statistics
    Statistics,
    /// logged data
    LoggedData {
        /// keep scanning past log slots the device does not implement
        #[arg(long)]
        skip_unsupported_slots: bool,
    },
}

fn print<T: Serialize>(v: &T, compact: bool) -> Result<()> {
    let s = if compact {
        serde_json::to_string(v)?
    } else {
        serde_json::to_string_pretty(v)?
    };
    println!("{}", s);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let options = Options::parse();
    let config = SerialConfig::from(options.serial);
    let con = prostar_pwm::connect(&config)
        .with_context(|| format!("connecting to {}", config.port))?;
    let compact = options.compact;
    match options.command {
        Command::RawAdcData => print(&con.read_raw_adc_data()?, compact),
        Command::FilteredAdcData => print(&con.read_filtered_adc_data()?, compact),
        Command::TemperatureData => print(&con.read_temperature_data()?, compact),
        Command::ChargerStatus => print(&con.read_charger_status()?, compact),
        Command::LoadStatus => print(&con.read_load_status()?, compact),
        Command::MiscData => print(&con.read_misc_data()?, compact),
        Command::ChargeSettings => print(&con.read_charge_settings()?, compact),
        Command::LoadSettings => print(&con.read_load_settings()?, compact),
        Command::MiscSettings => print(&con.read_misc_settings()?, compact),
        Command::PwmSettings => print(&con.read_pwm_settings()?, compact),
        Command::Statistics => print(&con.read_statistics()?, compact),
        Command::LoggedData {
            skip_unsupported_slots,
        } => {
            let on_unsupported = if skip_unsupported_slots {
                UnsupportedSlot::Skip
            } else {
                UnsupportedSlot::Stop
            };
            print(&con.read_logged_data_with(on_unsupported)?, compact)
        }
    }
}
