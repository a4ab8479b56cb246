//! Register transport.

use embedded_hal::i2c::I2c;

/// Single-register access to the controller.
///
/// Implementations perform exactly one bus transaction per call and never
/// retry; the driver propagates every failure to its caller.
pub trait RegisterClient {
    type Error: core::fmt::Debug;

    fn read(&mut self, addr: u8) -> Result<u16, Self::Error>;
    fn write(&mut self, addr: u8, value: u16) -> Result<(), Self::Error>;
}

impl<T: RegisterClient + ?Sized> RegisterClient for &mut T {
    type Error = T::Error;

    fn read(&mut self, addr: u8) -> Result<u16, Self::Error> {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u8, value: u16) -> Result<(), Self::Error> {
        (**self).write(addr, value)
    }
}

/// [`RegisterClient`] over an I2C bus: 8-bit register address followed by a
/// big-endian 16-bit value.
pub struct I2cRegisterClient<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> I2cRegisterClient<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterClient for I2cRegisterClient<I> {
    type Error = I::Error;

    fn read(&mut self, addr: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[addr], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write(&mut self, addr: u8, value: u16) -> Result<(), Self::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c.write(self.address, &[addr, hi, lo])
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use std::vec::Vec;

    /// Bus that answers every read with 0xd109 and records written frames.
    #[derive(Default)]
    struct RecordingBus {
        frames: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for RecordingBus {
        type Error = ErrorKind;
    }

    impl I2c for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.frames.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.copy_from_slice(&[0xd1, 0x09]),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn read_is_big_endian() {
        let mut client = I2cRegisterClient::new(RecordingBus::default(), 0x42);
        assert_eq!(client.read(0x00), Ok(0xd109));
        let bus = client.release();
        assert_eq!(bus.frames, [(0x42, std::vec![0x00])]);
    }

    #[test]
    fn write_sends_register_then_value() {
        let mut client = I2cRegisterClient::new(RecordingBus::default(), 0x42);
        client.write(0x09, 0x091e).unwrap();
        assert_eq!(client.release().frames, [(0x42, std::vec![0x09, 0x09, 0x1e])]);
    }
}
