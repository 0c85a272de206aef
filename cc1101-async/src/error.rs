use crate::packet::PacketError;
use crate::registers::MarcState;

/// Construction parameter that was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    Gdo0,
    SlaveSelect,
}

/// Error for cc1101 transceiver
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SPI, PIN, PLATFORM> {
    InvalidParameter(Parameter),
    SPI(SPI),
    Pin(PIN),
    Platform(PLATFORM),
    /// Bus and pins are not open
    NotConnected,
    /// No edge is being watched, `set_listening` was not called
    NotListening,
    /// The chip did not reach TX in time
    TxTimeout,
    /// The chip left TX after the packet was queued and the retry was issued
    TxAborted(MarcState),
    Packet(PacketError),
}

impl<SPI, PIN, PLATFORM> From<PacketError> for Error<SPI, PIN, PLATFORM> {
    fn from(e: PacketError) -> Self {
        Error::Packet(e)
    }
}
