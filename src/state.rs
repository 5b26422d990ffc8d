//! Enumerated status codes. Every u16 is a valid value; codes missing from
//! the name table display as `0xNNNN`.

use serde::{Serialize, Serializer};
use std::fmt;

macro_rules! code_table {
    ($(#[$meta:meta])* $name:ident { $($code:literal => $konst:ident = $label:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u16);

        impl $name {
            $(pub const $konst: $name = $name($code);)*

            pub const NAMES: &'static [(u16, &'static str)] = &[$(($code, $label),)*];

            pub fn name(self) -> Option<&'static str> {
                lookup(Self::NAMES, self.0)
            }

            pub fn is_known(self) -> bool {
                self.name().is_some()
            }
        }

        impl From<u16> for $name {
            fn from(i: u16) -> Self {
                $name(i)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "0x{:04x}", self.0),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

fn lookup(table: &[(u16, &'static str)], code: u16) -> Option<&'static str> {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

code_table! {
    /// Charger state machine, input register 0x0021.
    ChargeState {
        0 => START = "Start",
        1 => NIGHT_CHECK = "Night Check",
        2 => DISCONNECT = "Disconnect",
        3 => NIGHT = "Night",
        4 => FAULT = "Fault",
        5 => BULK = "Bulk",
        6 => ABSORPTION = "Absorption",
        7 => FLOAT = "Float",
        8 => EQUALIZE = "Equalize",
    }
}

code_table! {
    /// Load output state machine, input register 0x002e.
    LoadState {
        0 => START = "Start",
        1 => LOAD_ON = "Load On",
        2 => LVD_WARNING = "LVD Warning",
        3 => LVD = "LVD",
        4 => FAULT = "Fault",
        5 => DISCONNECT = "Disconnect",
        6 => LOAD_OFF = "Load Off",
        7 => OVERRIDE = "Override",
    }
}

code_table! {
    /// Battery status LED sequence, input register 0x003b.
    LedState {
        0 => START = "Start",
        1 => START_2 = "Start 2",
        2 => BRANCH = "Branch",
        3 => FAST_GREEN_BLINK = "Fast Green Blink",
        4 => SLOW_GREEN_BLINK = "Slow Green Blink",
        5 => GREEN_BLINK_1HZ = "Green Blink 1Hz",
        6 => GREEN = "Green",
        7 => GREEN_YELLOW = "Green/Yellow",
        8 => YELLOW = "Yellow",
        9 => YELLOW_RED = "Yellow/Red",
        10 => BLINK_RED = "Blink Red",
        11 => RED = "Red",
        12 => R_Y_G_ERROR = "R-Y-G Error",
        13 => RY_G_ERROR = "R/Y-G Error",
        14 => RG_Y_ERROR = "R/G-Y Error",
        15 => R_Y_ERROR = "R-Y Error (HTD)",
        16 => R_G_ERROR = "R-G Error (HVD)",
        17 => RY_GY_ERROR = "R/Y-G/Y Error",
        18 => GYR_ERROR = "G/Y/R Error",
        19 => GYR_X2 = "G/Y/R x 2",
        20 => RG_YG_ERROR = "R/G-Y/G Error",
        21 => OFF = "Off",
    }
}

code_table! {
    /// Charge status LED, input register 0x004d.
    ChargeStatusLedState {
        0 => OFF = "Off",
        1 => GREEN = "Green",
        2 => GREEN_SLOW_BLINK = "Green Slow Blink",
        3 => GREEN_FAST_BLINK = "Green Fast Blink",
        4 => YELLOW = "Yellow",
        5 => RED = "Red",
        6 => RED_BLINK = "Red Blink",
        7 => R_Y_G_SEQUENCE = "R-Y-G Sequence",
        8 => R_G_Y_SEQUENCE = "R-G-Y Sequence",
    }
}
