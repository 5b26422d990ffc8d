//! Pure conversions from raw register words to typed values.

use half::f16;
use serde::Serialize;

/// Which of two consecutive registers carries the high 16 bits of a 32 bit
/// value. This is fixed per field; the ProStar uses high word first in the
/// input (RAM) map and low word first in EEPROM and the daily log, and
/// picking the wrong one yields a plausible but wrong magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WordOrder {
    HighFirst,
    LowFirst,
}

impl WordOrder {
    pub fn compose(self, words: [u16; 2]) -> u32 {
        let (hi, lo) = match self {
            WordOrder::HighFirst => (words[0], words[1]),
            WordOrder::LowFirst => (words[1], words[0]),
        };
        (u32::from(hi) << 16) | u32::from(lo)
    }
}

/// IEEE-754 binary16 to binary32, exact for every input including
/// subnormals, infinities, NaN and signed zero.
pub fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

pub fn scaled_u16(bits: u16, divisor: f32) -> f32 {
    f32::from(bits) / divisor
}

/// Accumulators are stored as unsigned register pairs but are signed
/// quantities; the bit pattern is reinterpreted before scaling.
pub fn scaled_i32(bits: u32, divisor: f32) -> f32 {
    (bits as i32) as f32 / divisor
}

pub fn u16_as_i16(bits: u16) -> i16 {
    bits as i16
}
