use crate::transport::RegisterRegion;
use thiserror::Error;
use tokio_modbus::ExceptionCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The connected firmware does not implement the addressed register.
    #[error("{region} register 0x{address:04x} is not implemented by the device")]
    UnsupportedRegister { region: RegisterRegion, address: u16 },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid serial configuration: {0}")]
    Config(String),
}

/// Any communication failure other than an unimplemented address. These are
/// never retried; they abort the operation in progress.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device answered {region} read at 0x{address:04x} with exception {code:?}")]
    Exception {
        region: RegisterRegion,
        address: u16,
        code: ExceptionCode,
    },

    #[error("modbus: {0}")]
    Modbus(#[from] tokio_modbus::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("{region} read at 0x{address:04x} returned {actual} registers, expected {expected}")]
    ShortRead {
        region: RegisterRegion,
        address: u16,
        expected: u16,
        actual: usize,
    },
}

impl From<tokio_modbus::Error> for Error {
    fn from(e: tokio_modbus::Error) -> Self {
        Error::Transport(TransportError::Modbus(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Transport(TransportError::Io(e))
    }
}
