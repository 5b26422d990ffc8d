//! The daily log, a 256 slot circular buffer in the input map.

use crate::{
    bitfield::{AlarmDetails, ArrayFaultDetails, LoadFaultDetails},
    decode::{f16_to_f32, WordOrder::LowFirst},
    error::Result,
    registers::Registers,
    transport::{RegisterRegion, Transport},
};
use log::debug;
use serde::Serialize;

pub const LOG_BASE: u16 = 0x8000;
pub const LOG_SLOTS: u16 = 256;
pub const LOG_SLOT_WORDS: u16 = 16;

/// What the scanner does when a slot's block is not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedSlot {
    /// Stop and return what was collected so far.
    #[default]
    Stop,
    /// Skip the slot and keep scanning.
    Skip,
}

/// One day of history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub slot: u16,
    /// hours
    pub hourmeter: u32,
    pub alarm_daily: AlarmDetails,
    pub load_fault_daily: LoadFaultDetails,
    pub array_fault_daily: ArrayFaultDetails,
    /// V
    pub battery_voltage_min: f32,
    /// V
    pub battery_voltage_max: f32,
    pub ah_charge: f32,
    pub ah_load: f32,
    /// V
    pub array_voltage_max: f32,
    /// minutes
    pub time_in_absorption: u16,
    /// minutes
    pub time_in_equalize: u16,
    /// minutes
    pub time_in_float: u16,
}

impl LogRecord {
    /// Decode one slot of `LOG_SLOT_WORDS` words. An hourmeter of all zeros or
    /// all ones marks a slot that was never written, which yields `None`.
    pub fn decode(slot: u16, b: &[u16]) -> Option<LogRecord> {
        let &[
            h0, h1, a0, a1, load, array, vb_min, vb_max, ah_c, ah_l, va_max, abs, eq, float, _, _,
        ] = b else {
            return None;
        };
        let hourmeter = LowFirst.compose([h0, h1]);
        if hourmeter == 0 || hourmeter == u32::MAX {
            return None;
        }
        Some(LogRecord {
            slot,
            hourmeter,
            alarm_daily: AlarmDetails::decode(LowFirst.compose([a0, a1])),
            load_fault_daily: LoadFaultDetails::decode(load),
            array_fault_daily: ArrayFaultDetails::decode(array),
            battery_voltage_min: f16_to_f32(vb_min),
            battery_voltage_max: f16_to_f32(vb_max),
            ah_charge: f16_to_f32(ah_c),
            ah_load: f16_to_f32(ah_l),
            array_voltage_max: f16_to_f32(va_max),
            time_in_absorption: abs,
            time_in_equalize: eq,
            time_in_float: float,
        })
    }
}

pub(crate) fn scan<T: Transport + ?Sized>(
    t: &mut T,
    on_unsupported: UnsupportedSlot,
) -> Result<Vec<LogRecord>> {
    let mut r = Registers::new(t, RegisterRegion::Input);
    let mut records = Vec::new();
    for slot in 0..LOG_SLOTS {
        let address = LOG_BASE + slot * LOG_SLOT_WORDS;
        let block = match r.read_block(address, LOG_SLOT_WORDS)? {
            Some(block) => block,
            None => match on_unsupported {
                UnsupportedSlot::Stop => {
                    debug!("log slot {} not implemented, stopping scan", slot);
                    break;
                }
                UnsupportedSlot::Skip => {
                    debug!("log slot {} not implemented, skipping", slot);
                    continue;
                }
            },
        };
        if let Some(record) = LogRecord::decode(slot, &block) {
            records.push(record)
        }
    }
    debug!("log scan found {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitfield::{Alarms, LoadFaults};
    use crate::error::Error;
    use crate::registers::mock::{Cell, MockTransport};
    use proptest::prelude::*;
    use RegisterRegion::Input;

    fn slot_addr(slot: u16) -> u16 {
        LOG_BASE + slot * LOG_SLOT_WORDS
    }

    fn write_slot(t: &mut MockTransport, slot: u16, words: [u16; 16]) {
        t.set(Input, slot_addr(slot), &words);
    }

    fn hourmeter(h: u32) -> [u16; 16] {
        let mut w = [0u16; 16];
        w[0] = h as u16;
        w[1] = (h >> 16) as u16;
        w
    }

    fn full_log(t: &mut MockTransport) {
        for slot in 0..LOG_SLOTS {
            write_slot(t, slot, [0xffff; 16]);
        }
    }

    #[test]
    fn wrong_length_slot_does_not_decode() {
        assert_eq!(LogRecord::decode(0, &hourmeter(1)[..15]), None);
        assert_eq!(LogRecord::decode(0, &[]), None);
    }

    #[test]
    fn unused_slots_are_skipped() {
        assert_eq!(LogRecord::decode(0, &[0xffff; 16]), None);
        assert_eq!(LogRecord::decode(0, &[0; 16]), None);
        let r = LogRecord::decode(3, &hourmeter(1)).unwrap();
        assert_eq!(r.slot, 3);
        assert_eq!(r.hourmeter, 1);
        assert_eq!(r.alarm_daily.raw(), 0);
        assert_eq!(r.battery_voltage_min, 0.0);
        assert_eq!(r.time_in_float, 0);
    }

    #[test]
    fn hourmeter_is_low_word_first() {
        let mut w = [0u16; 16];
        w[0] = 0x0002;
        w[1] = 0x0001;
        assert_eq!(LogRecord::decode(0, &w).unwrap().hourmeter, 0x0001_0002);
        // only the low half all ones is still a real record
        w[0] = 0xffff;
        w[1] = 0x0000;
        assert_eq!(LogRecord::decode(0, &w).unwrap().hourmeter, 0x0000_ffff);
    }

    #[test]
    fn decodes_every_subfield() {
        let w = [
            24, 0, 0x0001, 0x0010, 0x0002, 0x0800, 0x4a00, 0x4b80, 0x4d00, 0x4500, 0x5200, 60,
            0, 480, 0xdead, 0xbeef,
        ];
        let r = LogRecord::decode(9, &w).unwrap();
        assert_eq!(r.hourmeter, 24);
        assert_eq!(r.alarm_daily.raw(), 0x0010_0001);
        assert!(r.alarm_daily.is_set(Alarms::RTS_OPEN));
        assert!(r.alarm_daily.is_set(Alarms::LVD));
        assert!(r.load_fault_daily.is_set(LoadFaults::OVERCURRENT));
        assert_eq!(r.array_fault_daily.raw(), 0x0800);
        assert_eq!(r.battery_voltage_min, 12.0);
        assert_eq!(r.battery_voltage_max, 15.0);
        assert_eq!(r.ah_charge, 20.0);
        assert_eq!(r.ah_load, 5.0);
        assert_eq!(r.array_voltage_max, 48.0);
        assert_eq!(r.time_in_absorption, 60);
        assert_eq!(r.time_in_equalize, 0);
        assert_eq!(r.time_in_float, 480);
    }

    #[test]
    fn scan_keeps_slot_order() {
        let mut t = MockTransport::default();
        full_log(&mut t);
        write_slot(&mut t, 200, hourmeter(5));
        write_slot(&mut t, 2, hourmeter(7));
        write_slot(&mut t, 3, hourmeter(0));
        let records = scan(&mut t, UnsupportedSlot::Stop).unwrap();
        let got: Vec<_> = records.iter().map(|r| (r.slot, r.hourmeter)).collect();
        assert_eq!(got, vec![(2, 7), (200, 5)]);
        assert_eq!(t.reads.len(), 256);
        assert_eq!(t.reads[255], (Input, 0x8ff0, 16));
    }

    #[test]
    fn unsupported_slot_stops_scan_by_default() {
        let mut t = MockTransport::default();
        full_log(&mut t);
        write_slot(&mut t, 0, hourmeter(1));
        write_slot(&mut t, 5, hourmeter(2));
        t.cell(Input, slot_addr(3) + 7, Cell::Unsupported);
        let records = scan(&mut t, UnsupportedSlot::Stop).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hourmeter, 1);
        assert_eq!(t.reads.len(), 4);
    }

    #[test]
    fn unsupported_slot_can_be_skipped() {
        let mut t = MockTransport::default();
        full_log(&mut t);
        write_slot(&mut t, 0, hourmeter(1));
        write_slot(&mut t, 5, hourmeter(2));
        t.cell(Input, slot_addr(3), Cell::Unsupported);
        let records = scan(&mut t, UnsupportedSlot::Skip).unwrap();
        let got: Vec<_> = records.iter().map(|r| r.hourmeter).collect();
        assert_eq!(got, vec![1, 2]);
        assert_eq!(t.reads.len(), 256);
    }

    #[test]
    fn transport_failure_aborts_scan() {
        let mut t = MockTransport::default();
        full_log(&mut t);
        write_slot(&mut t, 0, hourmeter(1));
        t.cell(Input, slot_addr(1), Cell::Broken);
        match scan(&mut t, UnsupportedSlot::Skip) {
            Err(Error::Transport(_)) => (),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn slot_decoding_is_idempotent(words in any::<[u16; 16]>()) {
            let a = LogRecord::decode(1, &words);
            let b = LogRecord::decode(1, &words);
            match (a, b) {
                (Some(a), Some(b)) => {
                    prop_assert_eq!(a.hourmeter, b.hourmeter);
                    prop_assert_eq!(a.alarm_daily, b.alarm_daily);
                    prop_assert_eq!(
                        a.battery_voltage_min.to_bits(),
                        b.battery_voltage_min.to_bits()
                    );
                    prop_assert_eq!(a.ah_load.to_bits(), b.ah_load.to_bits());
                }
                (None, None) => {
                    let h = LowFirst.compose([words[0], words[1]]);
                    prop_assert!(h == 0 || h == u32::MAX);
                }
                _ => prop_assert!(false, "decoding differed between calls"),
            }
        }
    }
}
