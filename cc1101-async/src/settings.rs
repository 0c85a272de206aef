//! Timing and policy knobs of the driver

use crate::platform::BusConfig;

/// How the register image is programmed during init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigWrite {
    /// One single register write per address, 0x00 through 0x2E
    PerRegister,
    /// One burst write starting at 0x00
    Burst,
}

/// Slave select pulse that precedes the SRES strobe, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetTiming {
    pub deselected_us: u32,
    pub selected_us: u32,
    pub released_us: u32,
}

impl Default for ResetTiming {
    fn default() -> Self {
        Self {
            deselected_us: 5,
            selected_us: 10,
            released_us: 41,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Delay after selecting and before deselecting the chip around every transfer
    pub settle_us: u32,
    pub reset: ResetTiming,
    /// Power level written to the first PATABLE entry
    pub pa_level: u8,
    pub config_write: ConfigWrite,
    /// Period of the receive state check
    pub watchdog_period_ms: u32,
    /// Polling interval while waiting for the chip to reach TX
    pub tx_poll_ms: u32,
    /// Upper bound of the wait for TX
    pub tx_enter_timeout_ms: u32,
    /// Pause between reaching TX and filling the FIFO
    pub tx_settle_ms: u32,
    /// How long to wait for the TX FIFO to drain before falling back to RX
    pub tx_drain_timeout_ms: u32,
    pub bus: BusConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            settle_us: 2,
            reset: ResetTiming::default(),
            pa_level: 0xC0,
            config_write: ConfigWrite::PerRegister,
            watchdog_period_ms: 5000,
            tx_poll_ms: 1,
            tx_enter_timeout_ms: 1000,
            tx_settle_ms: 500,
            tx_drain_timeout_ms: 5000,
            bus: BusConfig::default(),
        }
    }
}
