#![allow(dead_code)]

use morningstar_prostar::{
    transport::{RegisterRegion, Transport},
    Error, Result, TransportError,
};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug)]
pub enum Reply {
    Word(u16),
    IllegalAddress,
    Timeout,
}

/// An in-memory controller. Addresses that were never set answer with an
/// illegal data address exception, like a firmware that lacks them.
#[derive(Default)]
pub struct FakeController {
    registers: HashMap<(RegisterRegion, u16), Reply>,
    pub reads: Vec<(RegisterRegion, u16, u16)>,
    pub sessions: Vec<u8>,
}

impl FakeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, address: u16, words: &[u16]) -> Self {
        self.put(RegisterRegion::Input, address, words);
        self
    }

    pub fn holding(mut self, address: u16, words: &[u16]) -> Self {
        self.put(RegisterRegion::Holding, address, words);
        self
    }

    pub fn reply(mut self, region: RegisterRegion, address: u16, reply: Reply) -> Self {
        self.registers.insert((region, address), reply);
        self
    }

    pub fn put(&mut self, region: RegisterRegion, address: u16, words: &[u16]) {
        for (i, w) in words.iter().enumerate() {
            self.registers
                .insert((region, address + i as u16), Reply::Word(*w));
        }
    }
}

impl Transport for FakeController {
    fn begin_session(&mut self, unit: u8) -> Result<()> {
        self.sessions.push(unit);
        Ok(())
    }

    fn read_registers(
        &mut self,
        region: RegisterRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        self.reads.push((region, address, count));
        let mut words = Vec::with_capacity(count as usize);
        for a in address..address + count {
            match self.registers.get(&(region, a)) {
                Some(Reply::Word(w)) => words.push(*w),
                Some(Reply::Timeout) => {
                    return Err(TransportError::Io(std::io::ErrorKind::TimedOut.into()).into())
                }
                Some(Reply::IllegalAddress) | None => {
                    return Err(Error::UnsupportedRegister { region, address })
                }
            }
        }
        Ok(words)
    }
}

/// Encode a daily log slot with the given hourmeter and everything else zero.
pub fn log_slot(hourmeter: u32) -> [u16; 16] {
    let mut w = [0u16; 16];
    w[0] = hourmeter as u16;
    w[1] = (hourmeter >> 16) as u16;
    w
}
