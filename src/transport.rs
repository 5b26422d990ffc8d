use crate::error::{Error, Result, TransportError};
use log::trace;
use serde::Serialize;
use std::fmt;
use tokio_modbus::{
    client::sync::{Context, Reader},
    slave::{Slave, SlaveContext},
    ExceptionCode,
};

/// The two independent modbus address spaces exposed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegisterRegion {
    /// Read only telemetry.
    Input,
    /// Settings and accumulators stored in EEPROM.
    Holding,
}

impl fmt::Display for RegisterRegion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegisterRegion::Input => write!(f, "input"),
            RegisterRegion::Holding => write!(f, "holding"),
        }
    }
}

/// The synchronous register primitive everything else is built on.
///
/// Implementations must report an illegal data address exception as
/// `Error::UnsupportedRegister` and every other failure as
/// `Error::Transport`. Reply length is checked by `Registers`.
pub trait Transport {
    /// Address subsequent reads to `unit`. Called once at the start of
    /// every operation.
    fn begin_session(&mut self, unit: u8) -> Result<()>;

    fn read_registers(
        &mut self,
        region: RegisterRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>>;
}

// Modbus words are always big endian on the wire and tokio-modbus hands them
// back as native u16s, so the session only has to pick the unit. Word order
// of 32 bit values is a per field property handled in `decode`.
impl Transport for Context {
    fn begin_session(&mut self, unit: u8) -> Result<()> {
        self.set_slave(Slave(unit));
        Ok(())
    }

    fn read_registers(
        &mut self,
        region: RegisterRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        trace!("read {} 0x{:04x} x{}", region, address, count);
        let reply = match region {
            RegisterRegion::Input => self.read_input_registers(address, count)?,
            RegisterRegion::Holding => self.read_holding_registers(address, count)?,
        };
        map_reply(region, address, reply)
    }
}

/// Sort a modbus reply into words, an unimplemented register, or a device
/// exception.
fn map_reply(
    region: RegisterRegion,
    address: u16,
    reply: std::result::Result<Vec<u16>, ExceptionCode>,
) -> Result<Vec<u16>> {
    match reply {
        Ok(words) => Ok(words),
        Err(ExceptionCode::IllegalDataAddress) => {
            Err(Error::UnsupportedRegister { region, address })
        }
        Err(code) => Err(TransportError::Exception {
            region,
            address,
            code,
        }
        .into()),
    }
}
