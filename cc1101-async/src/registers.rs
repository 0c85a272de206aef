//! Register addresses, command strobes and state codes for the cc1101

/// Header flag selecting a burst write
pub const WRITE_BURST: u8 = 0x40;
/// Header flag selecting a single byte read
pub const READ_SINGLE: u8 = 0x80;
/// Header flag selecting a burst read
pub const READ_BURST: u8 = 0xC0;

/// Address of the power amplifier table
pub const PATABLE: u8 = 0x3E;
/// Address of the TX FIFO (write access)
pub const TXFIFO: u8 = 0x3F;
/// Address of the RX FIFO (read access)
pub const RXFIFO: u8 = 0x3F;

/// Number of configuration registers, `Config::Iocfg2` through `Config::Test0`
pub const COMPLETE_REGISTER_COUNT: usize = 47;

/// Size of the chip FIFO
pub const BUFFER_LEN: usize = 64;
/// Largest payload a received packet can carry
pub const DATA_LEN: usize = BUFFER_LEN - 3;

/// Mask of the MARC state bits inside the MARCSTATE register
pub const MARC_STATE_MASK: u8 = 0x1F;
/// Mask of the byte count inside TXBYTES and RXBYTES
pub const FIFO_BYTES_MASK: u8 = 0x7F;

/// cc1101 configuration register addresses
///
/// See datasheet `<https://www.ti.com/lit/ds/symlink/cc1101.pdf>`
/// chapter 29 "Configuration Registers"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Config {
    Iocfg2 = 0x00,
    Iocfg1 = 0x01,
    Iocfg0 = 0x02,
    Fifothr = 0x03,
    Sync1 = 0x04,
    Sync0 = 0x05,
    Pktlen = 0x06,
    Pktctrl1 = 0x07,
    Pktctrl0 = 0x08,
    Addr = 0x09,
    Channr = 0x0A,
    Fsctrl1 = 0x0B,
    Fsctrl0 = 0x0C,
    Freq2 = 0x0D,
    Freq1 = 0x0E,
    Freq0 = 0x0F,
    Mdmcfg4 = 0x10,
    Mdmcfg3 = 0x11,
    Mdmcfg2 = 0x12,
    Mdmcfg1 = 0x13,
    Mdmcfg0 = 0x14,
    Deviatn = 0x15,
    Mcsm2 = 0x16,
    Mcsm1 = 0x17,
    Mcsm0 = 0x18,
    Foccfg = 0x19,
    Bscfg = 0x1A,
    Agcctrl2 = 0x1B,
    Agcctrl1 = 0x1C,
    Agcctrl0 = 0x1D,
    Worevt1 = 0x1E,
    Worevt0 = 0x1F,
    Worctrl = 0x20,
    Frend1 = 0x21,
    Frend0 = 0x22,
    Fscal3 = 0x23,
    Fscal2 = 0x24,
    Fscal1 = 0x25,
    Fscal0 = 0x26,
    Rcctrl1 = 0x27,
    Rcctrl0 = 0x28,
    Fstest = 0x29,
    Ptest = 0x2A,
    Agctest = 0x2B,
    Test2 = 0x2C,
    Test1 = 0x2D,
    Test0 = 0x2E,
}

impl Config {
    /// All configuration registers in address order
    pub const ALL: [Config; COMPLETE_REGISTER_COUNT] = [
        Config::Iocfg2,
        Config::Iocfg1,
        Config::Iocfg0,
        Config::Fifothr,
        Config::Sync1,
        Config::Sync0,
        Config::Pktlen,
        Config::Pktctrl1,
        Config::Pktctrl0,
        Config::Addr,
        Config::Channr,
        Config::Fsctrl1,
        Config::Fsctrl0,
        Config::Freq2,
        Config::Freq1,
        Config::Freq0,
        Config::Mdmcfg4,
        Config::Mdmcfg3,
        Config::Mdmcfg2,
        Config::Mdmcfg1,
        Config::Mdmcfg0,
        Config::Deviatn,
        Config::Mcsm2,
        Config::Mcsm1,
        Config::Mcsm0,
        Config::Foccfg,
        Config::Bscfg,
        Config::Agcctrl2,
        Config::Agcctrl1,
        Config::Agcctrl0,
        Config::Worevt1,
        Config::Worevt0,
        Config::Worctrl,
        Config::Frend1,
        Config::Frend0,
        Config::Fscal3,
        Config::Fscal2,
        Config::Fscal1,
        Config::Fscal0,
        Config::Rcctrl1,
        Config::Rcctrl0,
        Config::Fstest,
        Config::Ptest,
        Config::Agctest,
        Config::Test2,
        Config::Test1,
        Config::Test0,
    ];

    pub fn addr(self) -> u8 {
        self as u8
    }
}

/// Status registers
///
/// These share their addresses with the command strobes and are only reachable
/// with the burst bit set, even for a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Partnum = 0x30,
    Version = 0x31,
    Freqest = 0x32,
    Lqi = 0x33,
    Rssi = 0x34,
    Marcstate = 0x35,
    Wortime1 = 0x36,
    Wortime0 = 0x37,
    Pktstatus = 0x38,
    VcoVcDac = 0x39,
    Txbytes = 0x3A,
    Rxbytes = 0x3B,
    Rcctrl1Status = 0x3C,
    Rcctrl0Status = 0x3D,
}

impl Status {
    pub fn addr(self) -> u8 {
        self as u8
    }
}

/// Command strobes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Reset chip
    Sres = 0x30,
    /// Enable and calibrate frequency synthesizer
    Sfstxon = 0x31,
    /// Turn off crystal oscillator
    Sxoff = 0x32,
    /// Calibrate frequency synthesizer and turn it off
    Scal = 0x33,
    /// Enable RX, calibrating first if coming from IDLE and MCSM0.FS_AUTOCAL=1
    Srx = 0x34,
    /// Enable TX, calibrating first if coming from IDLE and MCSM0.FS_AUTOCAL=1
    Stx = 0x35,
    /// Exit RX / TX, turn off frequency synthesizer
    Sidle = 0x36,
    /// Start wake-on-radio polling
    Swor = 0x38,
    /// Enter power down mode when CSn goes high
    Spwd = 0x39,
    /// Flush the RX FIFO, only valid in IDLE or RXFIFO_OVERFLOW
    Sfrx = 0x3A,
    /// Flush the TX FIFO, only valid in IDLE or TXFIFO_UNDERFLOW
    Sftx = 0x3B,
    /// Reset real time clock to Event1 value
    Sworrst = 0x3C,
    /// No operation
    Snop = 0x3D,
}

impl Command {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// States of the main radio control state machine, as reported by MARCSTATE
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MarcState {
    Sleep,
    Idle,
    Xoff,
    VcoonMc,
    RegonMc,
    Mancal,
    Vcoon,
    Regon,
    Startcal,
    Bwboost,
    FsLock,
    Ifadcon,
    Endcal,
    Rx,
    RxEnd,
    RxRst,
    TxrxSwitch,
    RxfifoOverflow,
    Fstxon,
    Tx,
    TxEnd,
    RxtxSwitch,
    TxfifoUnderflow,
    /// Codes 0x17..=0x1F are not assigned by the datasheet
    Reserved(u8),
}

impl MarcState {
    /// Decodes the content of the MARCSTATE register, ignoring the upper three bits
    pub fn from_status(status: u8) -> MarcState {
        match status & MARC_STATE_MASK {
            0x00 => Self::Sleep,
            0x01 => Self::Idle,
            0x02 => Self::Xoff,
            0x03 => Self::VcoonMc,
            0x04 => Self::RegonMc,
            0x05 => Self::Mancal,
            0x06 => Self::Vcoon,
            0x07 => Self::Regon,
            0x08 => Self::Startcal,
            0x09 => Self::Bwboost,
            0x0A => Self::FsLock,
            0x0B => Self::Ifadcon,
            0x0C => Self::Endcal,
            0x0D => Self::Rx,
            0x0E => Self::RxEnd,
            0x0F => Self::RxRst,
            0x10 => Self::TxrxSwitch,
            0x11 => Self::RxfifoOverflow,
            0x12 => Self::Fstxon,
            0x13 => Self::Tx,
            0x14 => Self::TxEnd,
            0x15 => Self::RxtxSwitch,
            0x16 => Self::TxfifoUnderflow,
            code => Self::Reserved(code),
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Self::Sleep => 0x00,
            Self::Idle => 0x01,
            Self::Xoff => 0x02,
            Self::VcoonMc => 0x03,
            Self::RegonMc => 0x04,
            Self::Mancal => 0x05,
            Self::Vcoon => 0x06,
            Self::Regon => 0x07,
            Self::Startcal => 0x08,
            Self::Bwboost => 0x09,
            Self::FsLock => 0x0A,
            Self::Ifadcon => 0x0B,
            Self::Endcal => 0x0C,
            Self::Rx => 0x0D,
            Self::RxEnd => 0x0E,
            Self::RxRst => 0x0F,
            Self::TxrxSwitch => 0x10,
            Self::RxfifoOverflow => 0x11,
            Self::Fstxon => 0x12,
            Self::Tx => 0x13,
            Self::TxEnd => 0x14,
            Self::RxtxSwitch => 0x15,
            Self::TxfifoUnderflow => 0x16,
            Self::Reserved(code) => code,
        }
    }

    /// States in which a freshly queued packet is on its way out
    pub fn is_transmitting(self) -> bool {
        matches!(self, Self::Tx | Self::TxEnd | Self::RxtxSwitch)
    }
}

/// LQI register content: bits 0..=6 link quality, bit 7 crc ok
#[derive(Clone, Copy)]
pub(crate) struct LqiStatus(pub u8);

impl LqiStatus {
    pub(crate) fn link_quality(self) -> u8 {
        crate::bits::bits_read(self.0, 0, 6)
    }

    pub(crate) fn crc_ok(self) -> bool {
        crate::bits::bit_read(self.0, 7) == 1
    }
}
