use crate::{
    bitfield::BitfieldDetails,
    decode::{self, WordOrder},
    error::{Error, Result, TransportError},
    transport::{RegisterRegion, Transport},
};
use bitflags::Flags;
use log::debug;

/// Turn an unimplemented address into an absent value, pass everything else
/// through.
pub fn absent_if_unsupported<T>(r: Result<T>) -> Result<Option<T>> {
    match r {
        Ok(v) => Ok(Some(v)),
        Err(Error::UnsupportedRegister { region, address }) => {
            debug!("{} register 0x{:04x} not implemented", region, address);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Typed reads against one register region. Every call is a fresh round
/// trip; nothing is cached or retried.
pub struct Registers<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    region: RegisterRegion,
}

impl<'a, T: Transport + ?Sized> Registers<'a, T> {
    pub fn new(transport: &'a mut T, region: RegisterRegion) -> Self {
        Registers { transport, region }
    }

    /// Read `count` consecutive words. A reply of any other length is a
    /// `TransportError::ShortRead`.
    pub fn read_block(&mut self, address: u16, count: u16) -> Result<Option<Vec<u16>>> {
        let reply = self.transport.read_registers(self.region, address, count);
        let words = absent_if_unsupported(reply)?;
        match words {
            Some(words) if words.len() != count as usize => Err(TransportError::ShortRead {
                region: self.region,
                address,
                expected: count,
                actual: words.len(),
            }
            .into()),
            words => Ok(words),
        }
    }

    pub fn read_raw16(&mut self, address: u16) -> Result<Option<u16>> {
        Ok(self.read_block(address, 1)?.map(|w| w[0]))
    }

    pub fn read_raw32(&mut self, address: u16, order: WordOrder) -> Result<Option<u32>> {
        Ok(self
            .read_block(address, 2)?
            .map(|w| order.compose([w[0], w[1]])))
    }

    pub fn read_f16(&mut self, address: u16) -> Result<Option<f32>> {
        Ok(self.read_raw16(address)?.map(decode::f16_to_f32))
    }

    pub fn read_i16(&mut self, address: u16) -> Result<Option<i16>> {
        Ok(self.read_raw16(address)?.map(decode::u16_as_i16))
    }

    pub fn read_scaled16(&mut self, address: u16, divisor: f32) -> Result<Option<f32>> {
        Ok(self
            .read_raw16(address)?
            .map(|v| decode::scaled_u16(v, divisor)))
    }

    pub fn read_scaled32(
        &mut self,
        address: u16,
        order: WordOrder,
        divisor: f32,
    ) -> Result<Option<f32>> {
        Ok(self
            .read_raw32(address, order)?
            .map(|v| decode::scaled_i32(v, divisor)))
    }

    pub fn read_code<C: From<u16>>(&mut self, address: u16) -> Result<Option<C>> {
        Ok(self.read_raw16(address)?.map(C::from))
    }

    pub fn read_bits16<F>(&mut self, address: u16) -> Result<Option<BitfieldDetails<F>>>
    where
        F: Flags<Bits = u16> + Copy,
    {
        Ok(self.read_raw16(address)?.map(BitfieldDetails::decode))
    }

    pub fn read_bits32<F>(
        &mut self,
        address: u16,
        order: WordOrder,
    ) -> Result<Option<BitfieldDetails<F>>>
    where
        F: Flags<Bits = u32> + Copy,
    {
        Ok(self
            .read_raw32(address, order)?
            .map(BitfieldDetails::decode))
    }
}
