//! Fault and alarm bitfields.
//!
//! Each bitfield is a `bitflags` table; the flag constants are the only named
//! positions and `BitfieldDetails` keeps the raw word next to them, so bits
//! without a name (alarm bits 17 and 18, anything above the table) survive
//! only in `raw`.

use bitflags::{bitflags, Flags};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ArrayFaults: u16 {
        const OVERCURRENT_PHASE_1          = 1 << 0;
        const FETS_SHORTED                 = 1 << 1;
        const SOFTWARE_BUG                 = 1 << 2;
        const BATTERY_HVD                  = 1 << 3;
        const ARRAY_HVD                    = 1 << 4;
        const EEPROM_SETTING_EDIT          = 1 << 5;
        const RTS_SHORTED                  = 1 << 6;
        const RTS_DISCONNECTED             = 1 << 7;
        const LOCAL_TEMP_SENSOR_FAILED     = 1 << 8;
        const BATTERY_LVD                  = 1 << 9;
        const DIP_SWITCH_CHANGED           = 1 << 10;
        const PROCESSOR_SUPPLY_FAULT       = 1 << 11;
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LoadFaults: u16 {
        const EXTERNAL_SHORT_CIRCUIT       = 1 << 0;
        const OVERCURRENT                  = 1 << 1;
        const FETS_SHORTED                 = 1 << 2;
        const SOFTWARE_BUG                 = 1 << 3;
        const HVD                          = 1 << 4;
        const HEATSINK_OVER_TEMPERATURE    = 1 << 5;
        const DIP_SWITCH_CHANGED           = 1 << 6;
        const EEPROM_SETTING_EDIT          = 1 << 7;
        const FP10_FAULT                   = 1 << 8;
        const PROCESSOR_SUPPLY_FAULT       = 1 << 9;
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Alarms: u32 {
        const RTS_OPEN                     = 1 << 0;
        const RTS_SHORTED                  = 1 << 1;
        const RTS_DISCONNECTED             = 1 << 2;
        const HEATSINK_TEMP_SENSOR_OPEN    = 1 << 3;
        const HEATSINK_TEMP_SENSOR_SHORTED = 1 << 4;
        const HEATSINK_HOT                 = 1 << 5;
        const CURRENT_LIMIT                = 1 << 6;
        const CURRENT_OFFSET               = 1 << 7;
        const BATTERY_SENSE_OUT_OF_RANGE   = 1 << 8;
        const BATTERY_SENSE_DISCONNECTED   = 1 << 9;
        const UNCALIBRATED                 = 1 << 10;
        const BATTERY_TEMP_OUT_OF_RANGE    = 1 << 11;
        const FP10_SUPPLY_OUT_OF_RANGE     = 1 << 12;
        const FET_OPEN                     = 1 << 13;
        const ARRAY_CURRENT_OFFSET         = 1 << 14;
        const LOAD_CURRENT_OFFSET          = 1 << 15;
        const SUPPLY_OUT_OF_RANGE          = 1 << 16;
        // 17 and 18 are reserved
        const RESET                        = 1 << 19;
        const LVD                          = 1 << 20;
        const LOG_TIMEOUT                  = 1 << 21;
        const EEPROM_ACCESS_FAILURE        = 1 << 22;
    }
}

/// A raw bitfield word together with its named flags.
pub struct BitfieldDetails<F: Flags> {
    raw: F::Bits,
    flags: F,
}

pub type ArrayFaultDetails = BitfieldDetails<ArrayFaults>;
pub type LoadFaultDetails = BitfieldDetails<LoadFaults>;
pub type AlarmDetails = BitfieldDetails<Alarms>;

impl<F: Flags + Copy> BitfieldDetails<F> {
    /// Decoding never fails, undefined bits are dropped from the flags.
    pub fn decode(raw: F::Bits) -> Self {
        BitfieldDetails {
            raw,
            flags: F::from_bits_truncate(raw),
        }
    }

    pub fn raw(&self) -> F::Bits {
        self.raw
    }

    pub fn flags(&self) -> F {
        self.flags
    }

    pub fn is_set(&self, flag: F) -> bool {
        self.flags.contains(flag)
    }

    /// Every defined flag in bit order, set or not.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        F::FLAGS
            .iter()
            .map(move |flag| (flag.name(), self.flags.contains(*flag.value())))
    }

    pub fn active(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.named().filter_map(|(name, set)| if set { Some(name) } else { None })
    }
}

impl<F: Flags + Copy> Clone for BitfieldDetails<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: Flags + Copy> Copy for BitfieldDetails<F> {}

impl<F: Flags + Copy> PartialEq for BitfieldDetails<F> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<F: Flags + Copy> fmt::Debug for BitfieldDetails<F>
where
    F::Bits: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BitfieldDetails")
            .field("raw", &self.raw)
            .field("active", &self.active().collect::<Vec<_>>())
            .finish()
    }
}

impl<F: Flags + Copy> Serialize for BitfieldDetails<F>
where
    F::Bits: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(F::FLAGS.len() + 1))?;
        map.serialize_entry("raw", &self.raw)?;
        for (name, set) in self.named() {
            map.serialize_entry(&name.to_ascii_lowercase(), &set)?;
        }
        map.end()
    }
}
