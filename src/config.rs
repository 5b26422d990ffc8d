use crate::error::{Error, Result};
use serde::Deserialize;
use std::{fmt, str::FromStr, time::Duration};
use tokio_serial::{DataBits, SerialPortBuilder, StopBits};

#[derive(Debug, thiserror::Error)]
#[error("invalid parity: {0}")]
pub struct InvalidParity(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl FromStr for Parity {
    type Err = InvalidParity;

    fn from_str(s: &str) -> std::result::Result<Parity, InvalidParity> {
        match s.to_ascii_uppercase().as_str() {
            "N" | "NONE" => Ok(Parity::None),
            "E" | "EVEN" => Ok(Parity::Even),
            "O" | "ODD" => Ok(Parity::Odd),
            _ => Err(InvalidParity(s.to_string())),
        }
    }
}

impl TryFrom<String> for Parity {
    type Error = InvalidParity;

    fn try_from(s: String) -> std::result::Result<Parity, InvalidParity> {
        s.parse()
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Parity::None => write!(f, "N"),
            Parity::Even => write!(f, "E"),
            Parity::Odd => write!(f, "O"),
        }
    }
}

impl From<Parity> for tokio_serial::Parity {
    fn from(p: Parity) -> Self {
        match p {
            Parity::None => tokio_serial::Parity::None,
            Parity::Even => tokio_serial::Parity::Even,
            Parity::Odd => tokio_serial::Parity::Odd,
        }
    }
}

/// Serial line and modbus addressing for one controller. The defaults match
/// the ProStar factory settings, 9600 8N2 at unit 1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
    pub unit_id: u8,
    /// Per request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: String::new(),
            baud_rate: 9600,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 2,
            unit_id: 1,
            timeout_ms: 1000,
        }
    }
}

impl SerialConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port.is_empty() {
            return Err(Error::Config("no serial port given".into()));
        }
        if !(1..=247).contains(&self.unit_id) {
            return Err(Error::Config(format!("invalid modbus unit id: {}", self.unit_id)));
        }
        self.data_bits()?;
        self.stop_bits()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn data_bits(&self) -> Result<DataBits> {
        match self.data_bits {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            n => Err(Error::Config(format!("invalid data bits: {}", n))),
        }
    }

    fn stop_bits(&self) -> Result<StopBits> {
        match self.stop_bits {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            n => Err(Error::Config(format!("invalid stop bits: {}", n))),
        }
    }

    pub fn serial_port_builder(&self) -> Result<SerialPortBuilder> {
        Ok(tokio_serial::new(&self.port, self.baud_rate)
            .data_bits(self.data_bits()?)
            .parity(self.parity.into())
            .stop_bits(self.stop_bits()?)
            .timeout(self.timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SerialConfig {
        SerialConfig {
            port: "/dev/ttyUSB0".into(),
            ..SerialConfig::default()
        }
    }

    #[test]
    fn parity_parsing() {
        assert_eq!("n".parse::<Parity>().unwrap(), Parity::None);
        assert_eq!("Even".parse::<Parity>().unwrap(), Parity::Even);
        assert_eq!("O".parse::<Parity>().unwrap(), Parity::Odd);
        assert!("mark".parse::<Parity>().is_err());
    }

    #[test]
    fn defaults_are_valid() {
        let c = config();
        c.validate().unwrap();
        assert_eq!(c.baud_rate, 9600);
        assert_eq!(c.stop_bits, 2);
        assert_eq!(c.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn unit_id_range() {
        for bad in [0u8, 248, 255] {
            let c = SerialConfig { unit_id: bad, ..config() };
            assert!(matches!(c.validate(), Err(Error::Config(_))));
        }
        let c = SerialConfig { unit_id: 247, ..config() };
        c.validate().unwrap();
    }

    #[test]
    fn rejects_bad_framing() {
        assert!(SerialConfig { data_bits: 9, ..config() }.validate().is_err());
        assert!(SerialConfig { stop_bits: 3, ..config() }.validate().is_err());
        assert!(SerialConfig::default().validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let c: SerialConfig =
            serde_json::from_str(r#"{"port": "/dev/ttyS1", "parity": "even", "unit_id": 3}"#)
                .unwrap();
        assert_eq!(c.port, "/dev/ttyS1");
        assert_eq!(c.parity, Parity::Even);
        assert_eq!(c.unit_id, 3);
        assert_eq!(c.data_bits, 8);
        assert!(serde_json::from_str::<SerialConfig>(r#"{"parity": "x"}"#).is_err());
    }
}
