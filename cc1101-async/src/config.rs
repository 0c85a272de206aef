//! Register images that are available to initialize the cc1101

use crate::registers::{Config, COMPLETE_REGISTER_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The blob does not hold exactly one byte per configuration register
    WrongLength(usize),
}

/// Values of all configuration registers, `Config::Iocfg2` through `Config::Test0`
///
/// The image is written verbatim during setup. It is not interpreted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterImage {
    values: [u8; COMPLETE_REGISTER_COUNT],
}

impl RegisterImage {
    pub const fn from_array(values: [u8; COMPLETE_REGISTER_COUNT]) -> Self {
        Self { values }
    }

    /// Builds an image from a byte slice in register address order
    pub fn new(values: &[u8]) -> Result<Self, ConfigError> {
        let values = values
            .try_into()
            .map_err(|_| ConfigError::WrongLength(values.len()))?;
        Ok(Self { values })
    }

    /// Copy of the register values
    pub fn bytes(&self) -> [u8; COMPLETE_REGISTER_COUNT] {
        self.values
    }

    pub fn get(&self, reg: Config) -> u8 {
        self.values[reg.addr() as usize]
    }

    /// Iterates over `(register, value)` in address order
    pub fn iter(&self) -> impl Iterator<Item = (Config, u8)> + '_ {
        Config::ALL.iter().copied().zip(self.values.iter().copied())
    }
}

/// GFSK, 1.2 kBaud, variable packet length up to 62 bytes with crc
///
/// GDO0 asserts when a sync word is received and deasserts at the end of the packet
/// (IOCFG0 = 0x06), which is what the receive path waits on.
pub const GFSK_1_2_KB: RegisterImage = RegisterImage::from_array([
    0x29, // IOCFG2
    0x2E, // IOCFG1
    0x06, // IOCFG0
    0x07, // FIFOTHR
    0x57, // SYNC1
    0x43, // SYNC0
    0x3E, // PKTLEN
    0x0E, // PKTCTRL1
    0x45, // PKTCTRL0
    0xFF, // ADDR
    0x00, // CHANNR
    0x08, // FSCTRL1
    0x00, // FSCTRL0
    0x21, // FREQ2
    0x65, // FREQ1
    0x6A, // FREQ0
    0xF5, // MDMCFG4
    0x83, // MDMCFG3
    0x13, // MDMCFG2
    0xA0, // MDMCFG1
    0xF8, // MDMCFG0
    0x15, // DEVIATN
    0x07, // MCSM2
    0x0C, // MCSM1
    0x19, // MCSM0
    0x16, // FOCCFG
    0x6C, // BSCFG
    0x03, // AGCCTRL2
    0x40, // AGCCTRL1
    0x91, // AGCCTRL0
    0x02, // WOREVT1
    0x26, // WOREVT0
    0x09, // WORCTRL
    0x56, // FREND1
    0x17, // FREND0
    0xA9, // FSCAL3
    0x0A, // FSCAL2
    0x00, // FSCAL1
    0x11, // FSCAL0
    0x41, // RCCTRL1
    0x00, // RCCTRL0
    0x59, // FSTEST
    0x7F, // PTEST
    0x3F, // AGCTEST
    0x81, // TEST2
    0x3F, // TEST1
    0x0B, // TEST0
]);
