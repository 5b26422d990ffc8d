//! Read only access to the register map of Morningstar ProStar PWM solar
//! charge controllers over modbus RTU.
//!
//! Values the connected firmware does not implement come back as `None`
//! rather than as errors or zeros.

pub mod bitfield;
pub mod config;
pub mod decode;
pub mod error;
pub mod prostar_pwm;
pub mod registers;
pub mod state;
pub mod transport;

pub use error::{Error, Result, TransportError};
