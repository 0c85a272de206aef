use core::fmt;

use heapless::Vec;

use crate::bits::Hex;
use crate::registers::DATA_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    DataTooLong,
}

/// Outcome of reading the length byte from the RX FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxLength {
    /// Nothing was waiting in the FIFO
    Empty,
    /// The FIFO overflowed and was flushed
    Overflow,
    /// The length byte exceeded `DATA_LEN`; the FIFO content was left unread
    Oversize,
    /// Number of payload bytes
    Bytes(u8),
}

impl RxLength {
    pub const OVERFLOW_CODE: i8 = -1;
    pub const OVERSIZE_CODE: i8 = -2;

    /// Decodes a signed length code, where -1 and -2 are sentinels
    ///
    /// Any other value is the unsigned count stored in a signed byte.
    pub fn from_code(code: i8) -> Self {
        match code {
            0 => Self::Empty,
            Self::OVERFLOW_CODE => Self::Overflow,
            Self::OVERSIZE_CODE => Self::Oversize,
            n => Self::Bytes(n as u8),
        }
    }

    /// Signed length code with the -1 / -2 sentinels
    pub fn code(self) -> i8 {
        match self {
            Self::Empty => 0,
            Self::Overflow => Self::OVERFLOW_CODE,
            Self::Oversize => Self::OVERSIZE_CODE,
            Self::Bytes(n) => n as i8,
        }
    }

    /// Number of valid payload bytes; 0 for the sentinels
    pub fn effective(self) -> usize {
        match self {
            Self::Bytes(n) => n as usize,
            _ => 0,
        }
    }
}

/// Packet that can be sent and received
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    pub length: RxLength,
    pub data: Vec<u8, DATA_LEN>,
    pub crc_ok: bool,
    /// Raw RSSI register value
    pub rssi: i8,
    /// Link quality, crc bit stripped
    pub lqi: u8,
}

impl Packet {
    pub fn new(data: &[u8]) -> Result<Packet, PacketError> {
        let data = Vec::from_slice(data).map_err(|_| PacketError::DataTooLong)?;
        Ok(Self {
            length: RxLength::Bytes(data.len() as u8),
            data,
            crc_ok: false,
            rssi: 0,
            lqi: 0,
        })
    }

    pub(crate) fn with_length(length: RxLength) -> Packet {
        Self {
            length,
            data: Vec::new(),
            crc_ok: false,
            rssi: 0,
            lqi: 0,
        }
    }

    /// Payload length as an unsigned count
    pub fn len(&self) -> usize {
        self.length.effective()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Valid payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len().min(self.data.len())]
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packet of length {}, crc is {}, rssi is {:02X}, lqi is {:02X}, data is {}",
            self.len(),
            if self.crc_ok { "ok" } else { "invalid" },
            self.rssi as u8,
            self.lqi,
            Hex(self.payload())
        )
    }
}
