//! Morningstar ProStar PWM (Gen3) charge controllers.
//!
//! ```no_run
//! use morningstar_prostar::{config::SerialConfig, prostar_pwm};
//!
//! let config = SerialConfig {
//!     port: "/dev/ttyUSB0".into(),
//!     ..SerialConfig::default()
//! };
//! let con = prostar_pwm::connect(&config)?;
//! let status = con.read_charger_status()?;
//! println!("{:?}", status.charge_state);
//! # Ok::<(), morningstar_prostar::Error>(())
//! ```

mod logged;
mod settings;
mod status;

pub use logged::{LogRecord, UnsupportedSlot, LOG_BASE, LOG_SLOTS, LOG_SLOT_WORDS};
pub use settings::{ChargeSettings, LoadSettings, MiscSettings, PwmSettings, Statistics};
pub use status::{
    ChargerStatus, FilteredAdcData, LoadStatus, MiscData, RawAdcData, TemperatureData,
};

use crate::{config::SerialConfig, error::Result, transport::Transport};
use log::debug;
use std::sync::{Mutex, PoisonError};
use tokio_modbus::{client::sync, slave::Slave};

/// Open the serial line described by `config` and wrap it in a `Con`.
pub fn connect(config: &SerialConfig) -> Result<Con<sync::Context>> {
    config.validate()?;
    debug!(
        "opening {} at {} baud, unit {}",
        config.port, config.baud_rate, config.unit_id
    );
    let builder = config.serial_port_builder()?;
    let mut ctx = sync::rtu::connect_slave(&builder, Slave(config.unit_id))?;
    ctx.set_timeout(config.timeout());
    Ok(Con::new(ctx, config.unit_id))
}

/// A connection to one controller.
///
/// Every operation holds the connection lock from session setup through its
/// last register read, so operations on one `Con` never interleave on the
/// wire. There is no retry; the first transport error is returned as is.
pub struct Con<T> {
    unit: u8,
    transport: Mutex<T>,
}

impl<T: Transport> Con<T> {
    pub fn new(transport: T, unit: u8) -> Con<T> {
        Con {
            unit,
            transport: Mutex::new(transport),
        }
    }

    pub fn unit(&self) -> u8 {
        self.unit
    }

    pub fn into_inner(self) -> T {
        self.transport
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn with_session<R>(&self, what: &str, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        // reads have no side effects, so a poisoned lock is still usable
        let mut transport = self.transport.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("{} from unit {}", what, self.unit);
        transport.begin_session(self.unit)?;
        let res = f(&mut *transport);
        if let Err(e) = &res {
            debug!("{} failed: {}", what, e);
        }
        res
    }

    pub fn read_raw_adc_data(&self) -> Result<RawAdcData> {
        self.with_session("raw adc data", status::read_raw_adc)
    }

    pub fn read_filtered_adc_data(&self) -> Result<FilteredAdcData> {
        self.with_session("filtered adc data", status::read_filtered_adc)
    }

    pub fn read_temperature_data(&self) -> Result<TemperatureData> {
        self.with_session("temperature data", status::read_temperatures)
    }

    pub fn read_charger_status(&self) -> Result<ChargerStatus> {
        self.with_session("charger status", status::read_charger_status)
    }

    pub fn read_load_status(&self) -> Result<LoadStatus> {
        self.with_session("load status", status::read_load_status)
    }

    pub fn read_misc_data(&self) -> Result<MiscData> {
        self.with_session("misc data", status::read_misc)
    }

    pub fn read_charge_settings(&self) -> Result<ChargeSettings> {
        self.with_session("charge settings", settings::read_charge_settings)
    }

    pub fn read_load_settings(&self) -> Result<LoadSettings> {
        self.with_session("load settings", settings::read_load_settings)
    }

    pub fn read_misc_settings(&self) -> Result<MiscSettings> {
        self.with_session("misc settings", settings::read_misc_settings)
    }

    pub fn read_pwm_settings(&self) -> Result<PwmSettings> {
        self.with_session("pwm settings", settings::read_pwm_settings)
    }

    pub fn read_statistics(&self) -> Result<Statistics> {
        self.with_session("statistics", settings::read_statistics)
    }

    /// Scan the daily log, stopping at the first slot the device does not
    /// implement.
    pub fn read_logged_data(&self) -> Result<Vec<LogRecord>> {
        self.read_logged_data_with(UnsupportedSlot::Stop)
    }

    pub fn read_logged_data_with(
        &self,
        on_unsupported: UnsupportedSlot,
    ) -> Result<Vec<LogRecord>> {
        self.with_session("logged data", |t| logged::scan(t, on_unsupported))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Error, TransportError},
        registers::mock::{Cell, MockTransport},
        transport::RegisterRegion,
    };
    use std::sync::Arc;
    use std::thread;

    struct FailingSession;

    impl Transport for FailingSession {
        fn begin_session(&mut self, _unit: u8) -> Result<()> {
            Err(TransportError::Io(std::io::ErrorKind::BrokenPipe.into()).into())
        }

        fn read_registers(&mut self, _: RegisterRegion, _: u16, _: u16) -> Result<Vec<u16>> {
            panic!("read attempted after failed session setup")
        }
    }

    /// Answers every read with one word too few.
    struct Truncating;

    impl Transport for Truncating {
        fn begin_session(&mut self, _unit: u8) -> Result<()> {
            Ok(())
        }

        fn read_registers(&mut self, _: RegisterRegion, _: u16, count: u16) -> Result<Vec<u16>> {
            Ok(vec![0; count as usize - 1])
        }
    }

    #[test]
    fn truncated_replies_are_errors() {
        let con = Con::new(Truncating, 1);
        assert!(matches!(
            con.read_pwm_settings(),
            Err(Error::Transport(TransportError::ShortRead { expected: 1, actual: 0, .. }))
        ));
        assert!(matches!(
            con.read_charger_status(),
            Err(Error::Transport(TransportError::ShortRead { .. }))
        ));
        assert!(matches!(
            con.read_logged_data(),
            Err(Error::Transport(TransportError::ShortRead { expected: 16, actual: 15, .. }))
        ));
        // the lock survives
        assert!(con.read_statistics().is_err());
    }

    #[test]
    fn session_setup_failure_aborts_before_reads() {
        let con = Con::new(FailingSession, 1);
        assert!(matches!(
            con.read_pwm_settings(),
            Err(Error::Transport(TransportError::Io(_)))
        ));
        assert!(con.read_logged_data().is_err());
    }

    #[test]
    fn every_operation_starts_a_session() {
        let con = Con::new(MockTransport::default(), 7);
        assert_eq!(con.unit(), 7);
        con.read_raw_adc_data().unwrap();
        con.read_statistics().unwrap();
        con.read_logged_data().unwrap();
        let t = con.into_inner();
        assert_eq!(t.sessions, vec![7, 7, 7]);
    }

    #[test]
    fn lock_is_released_after_errors() {
        let mut t = MockTransport::default();
        t.cell(RegisterRegion::Holding, 0xe038, Cell::Broken);
        let con = Con::new(t, 1);
        assert!(con.read_pwm_settings().is_err());
        assert!(con.read_load_settings().is_ok());
    }

    #[test]
    fn operations_are_serialized_across_threads() {
        let mut t = MockTransport::default();
        t.set(RegisterRegion::Input, 0x001a, &[0x4d00; 4]);
        let con = Arc::new(Con::new(t, 1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let con = con.clone();
                thread::spawn(move || con.read_temperature_data().unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().heatsink, Some(20.0));
        }
        let t = Arc::try_unwrap(con).ok().unwrap().into_inner();
        assert_eq!(t.sessions.len(), 4);
        // each session's four reads are contiguous
        for chunk in t.reads.chunks(4) {
            let addrs: Vec<_> = chunk.iter().map(|(_, a, _)| *a).collect();
            assert_eq!(addrs, vec![0x001a, 0x001b, 0x001c, 0x001d]);
        }
    }
}
