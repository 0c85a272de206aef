//! Access to the host's spi buses and gpios
//!
//! The driver never opens hardware itself. A `Platform` hands out the handles by
//! name and takes them back on close, so tests can substitute a simulated chip.

use core::fmt::Debug;

use embedded_hal_1::digital::{InputPin, OutputPin, PinState};
use embedded_hal_1::spi::{Mode, MODE_0};
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiBus;

/// Bit order on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Settings applied when the spi bus is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    pub frequency_hz: u32,
    pub mode: Mode,
    pub bits_per_word: u8,
    pub bit_order: BitOrder,
    /// Release the bus chip select between transfers
    pub cs_change: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 16_000_000,
            mode: MODE_0,
            bits_per_word: 8,
            bit_order: BitOrder::MsbFirst,
            cs_change: true,
        }
    }
}

/// Host peripheral access
///
/// The slave select line is a plain output: the bus's own chip select cannot
/// produce the cc1101 reset pulse.
pub trait Platform {
    type Error: Debug;
    type PinError: Debug;
    type Bus: SpiBus<u8>;
    type Select: OutputPin<Error = Self::PinError>;
    type Notify: InputPin<Error = Self::PinError> + Wait;

    fn has_spi_bus(&self, name: &str) -> bool;
    fn has_gpio(&self, name: &str) -> bool;

    fn open_spi_bus(&mut self, name: &str, config: &BusConfig) -> Result<Self::Bus, Self::Error>;
    fn open_output(&mut self, name: &str, initial: PinState) -> Result<Self::Select, Self::Error>;
    fn open_input(&mut self, name: &str) -> Result<Self::Notify, Self::Error>;

    fn close_spi_bus(&mut self, bus: Self::Bus) -> Result<(), Self::Error>;
    fn close_output(&mut self, pin: Self::Select) -> Result<(), Self::Error>;
    fn close_input(&mut self, pin: Self::Notify) -> Result<(), Self::Error>;
}
