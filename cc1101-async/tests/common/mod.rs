//! Simulated cc1101 behind a recording platform

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cc1101_async::registers::{COMPLETE_REGISTER_COUNT, READ_SINGLE, WRITE_BURST};
use cc1101_async::{BusConfig, Platform};
use embedded_hal_1::digital::{self, PinState};
use embedded_hal_1::spi;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiBus;

pub const BUS: &str = "SPI0.0";
pub const GDO0: &str = "BCM25";
pub const SS: &str = "BCM8";

pub const MARC_IDLE: u8 = 0x01;
pub const MARC_RX: u8 = 0x0D;
pub const MARC_RXFIFO_OVERFLOW: u8 = 0x11;
pub const MARC_TX: u8 = 0x13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl spi::Error for MockError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl digital::Error for MockError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    /// Slave select level, `false` is selected
    Select(bool),
    DelayNs(u32),
    DelayUs(u32),
    DelayMs(u32),
    Mosi(Vec<u8>),
    Miso(Vec<u8>),
}

/// Bytes exchanged while the chip was selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub mosi: Vec<u8>,
    pub miso: Vec<u8>,
}

pub struct Sim {
    pub config: [u8; COMPLETE_REGISTER_COUNT],
    pub patable: Vec<u8>,
    /// Scripted MARCSTATE reads, `marc` is returned once the script runs out
    pub marc_script: VecDeque<u8>,
    pub marc: u8,
    pub rx_fifo: VecDeque<u8>,
    pub tx_fifo: Vec<u8>,
    pub txbytes_script: VecDeque<u8>,
    pub rssi: u8,
    pub lqi: u8,
    pub partnum: u8,
    pub version: u8,
    pub strobes: Vec<u8>,
    pub trace: Vec<Trace>,
    pub edges: usize,
    pub gdo0_high: bool,
    pub fail_transfers: usize,
    pub fail_close: Vec<&'static str>,
    pub opened: Vec<&'static str>,
    pub closed: Vec<&'static str>,
    pub bus_config: Option<BusConfig>,
    pub initial_select: Option<PinState>,
    header: Option<u8>,
    offset: usize,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            config: [0; COMPLETE_REGISTER_COUNT],
            patable: Vec::new(),
            marc_script: VecDeque::new(),
            marc: MARC_RX,
            rx_fifo: VecDeque::new(),
            tx_fifo: Vec::new(),
            txbytes_script: VecDeque::new(),
            rssi: 0,
            lqi: 0,
            partnum: 0x00,
            version: 0x14,
            strobes: Vec::new(),
            trace: Vec::new(),
            edges: 0,
            gdo0_high: false,
            fail_transfers: 0,
            fail_close: Vec::new(),
            opened: Vec::new(),
            closed: Vec::new(),
            bus_config: None,
            initial_select: None,
            header: None,
            offset: 0,
        }
    }
}

impl Sim {
    /// Queues a received frame: length byte, payload, then RSSI and LQI status
    pub fn queue_packet(&mut self, payload: &[u8], rssi: u8, lqi: u8) {
        self.rx_fifo.push_back(payload.len() as u8);
        self.rx_fifo.extend(payload.iter().copied());
        self.rssi = rssi;
        self.lqi = lqi;
        self.edges += 1;
    }

    /// Transactions grouped by slave select, ignoring frames without data
    pub fn frames(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut current: Option<Frame> = None;
        for entry in &self.trace {
            match entry {
                Trace::Select(false) => current = Some(Frame::default()),
                Trace::Select(true) => {
                    if let Some(frame) = current.take() {
                        if !frame.mosi.is_empty() {
                            frames.push(frame);
                        }
                    }
                }
                Trace::Mosi(bytes) => {
                    if let Some(frame) = current.as_mut() {
                        frame.mosi.extend_from_slice(bytes);
                    }
                }
                Trace::Miso(bytes) => {
                    if let Some(frame) = current.as_mut() {
                        frame.miso.extend_from_slice(bytes);
                    }
                }
                _ => (),
            }
        }
        frames
    }

    /// First byte of every frame
    pub fn headers(&self) -> Vec<u8> {
        self.frames().iter().map(|f| f.mosi[0]).collect()
    }

    pub fn count_strobe(&self, cmd: u8) -> usize {
        self.strobes.iter().filter(|&&s| s == cmd).count()
    }

    pub fn clear(&mut self) {
        self.trace.clear();
        self.strobes.clear();
    }

    fn fail(&mut self) -> bool {
        if self.fail_transfers > 0 {
            self.fail_transfers -= 1;
            true
        } else {
            false
        }
    }

    fn write(&mut self, words: &[u8]) {
        let mut data = words;
        if self.header.is_none() {
            let Some((&header, rest)) = data.split_first() else {
                return;
            };
            self.header = Some(header);
            self.offset = 0;
            data = rest;
            let addr = header & 0x3f;
            let strobe = header & (READ_SINGLE | WRITE_BURST) == 0 && (0x30..=0x3d).contains(&addr);
            if strobe {
                self.strobe(header);
            }
        }
        let Some(header) = self.header else { return };
        if header & READ_SINGLE != 0 {
            return;
        }
        let addr = header & 0x3f;
        for &byte in data {
            match addr {
                0x3e => self.patable.push(byte),
                0x3f => self.tx_fifo.push(byte),
                a if (a as usize) + self.offset < COMPLETE_REGISTER_COUNT => {
                    self.config[a as usize + self.offset] = byte
                }
                _ => (),
            }
            if header & WRITE_BURST != 0 {
                self.offset += 1;
            }
        }
    }

    fn strobe(&mut self, cmd: u8) {
        self.strobes.push(cmd);
        match cmd {
            0x30 => {
                self.config = [0; COMPLETE_REGISTER_COUNT];
                self.marc = MARC_IDLE;
            }
            0x34 => self.marc = MARC_RX,
            0x35 => self.marc = MARC_TX,
            0x36 => self.marc = MARC_IDLE,
            0x3a => self.rx_fifo.clear(),
            0x3b => self.tx_fifo.clear(),
            _ => (),
        }
    }

    fn read(&mut self, words: &mut [u8]) {
        let Some(header) = self.header else { return };
        let addr = header & 0x3f;
        let burst = header & WRITE_BURST != 0;
        for word in words.iter_mut() {
            *word = match addr {
                0x3f => self.rx_fifo.pop_front().unwrap_or(0),
                0x30..=0x3d if burst => self.status(addr),
                a if (a as usize) + self.offset < COMPLETE_REGISTER_COUNT => {
                    self.config[a as usize + self.offset]
                }
                _ => 0,
            };
            if burst && addr < 0x30 {
                self.offset += 1;
            }
        }
    }

    fn status(&mut self, addr: u8) -> u8 {
        match addr {
            0x30 => self.partnum,
            0x31 => self.version,
            0x33 => self.lqi,
            0x34 => self.rssi,
            0x35 => self.marc_script.pop_front().unwrap_or(self.marc),
            0x3a => self.txbytes_script.pop_front().unwrap_or(0),
            0x3b => self.rx_fifo.len() as u8,
            _ => 0,
        }
    }
}

pub type Shared = Rc<RefCell<Sim>>;

pub struct MockBus(Shared);

impl spi::ErrorType for MockBus {
    type Error = MockError;
}

impl SpiBus<u8> for MockBus {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), MockError> {
        let mut sim = self.0.borrow_mut();
        if sim.fail() {
            return Err(MockError);
        }
        sim.read(words);
        sim.trace.push(Trace::Miso(words.to_vec()));
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), MockError> {
        let mut sim = self.0.borrow_mut();
        if sim.fail() {
            return Err(MockError);
        }
        sim.trace.push(Trace::Mosi(words.to_vec()));
        sim.write(words);
        Ok(())
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), MockError> {
        self.write(write).await?;
        self.read(read).await
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), MockError> {
        let out = words.to_vec();
        self.write(&out).await?;
        self.read(words).await
    }

    async fn flush(&mut self) -> Result<(), MockError> {
        Ok(())
    }
}

pub struct MockSelect(Shared);

impl digital::ErrorType for MockSelect {
    type Error = MockError;
}

impl digital::OutputPin for MockSelect {
    fn set_low(&mut self) -> Result<(), MockError> {
        let mut sim = self.0.borrow_mut();
        sim.header = None;
        sim.trace.push(Trace::Select(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), MockError> {
        let mut sim = self.0.borrow_mut();
        sim.header = None;
        sim.trace.push(Trace::Select(true));
        Ok(())
    }
}

pub struct MockNotify(Shared);

impl digital::ErrorType for MockNotify {
    type Error = MockError;
}

impl digital::InputPin for MockNotify {
    fn is_high(&mut self) -> Result<bool, MockError> {
        Ok(self.0.borrow().gdo0_high)
    }

    fn is_low(&mut self) -> Result<bool, MockError> {
        Ok(!self.0.borrow().gdo0_high)
    }
}

impl MockNotify {
    /// Resolves if an edge is queued, otherwise never
    async fn edge(&mut self) -> Result<(), MockError> {
        let queued = {
            let mut sim = self.0.borrow_mut();
            if sim.edges > 0 {
                sim.edges -= 1;
                true
            } else {
                false
            }
        };
        if queued {
            Ok(())
        } else {
            core::future::pending().await
        }
    }
}

impl Wait for MockNotify {
    async fn wait_for_high(&mut self) -> Result<(), MockError> {
        self.edge().await
    }

    async fn wait_for_low(&mut self) -> Result<(), MockError> {
        self.edge().await
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), MockError> {
        self.edge().await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), MockError> {
        self.edge().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), MockError> {
        self.edge().await
    }
}

#[derive(Clone)]
pub struct MockDelay(pub Shared);

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().trace.push(Trace::DelayNs(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().trace.push(Trace::DelayUs(us));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().trace.push(Trace::DelayMs(ms));
    }
}

pub struct MockPlatform {
    pub sim: Shared,
    pub buses: Vec<&'static str>,
    pub gpios: Vec<&'static str>,
}

impl MockPlatform {
    pub fn new(sim: Shared) -> Self {
        Self {
            sim,
            buses: vec![BUS],
            gpios: vec![GDO0, SS, "BCM24"],
        }
    }

    fn close(&mut self, name: &'static str) -> Result<(), MockError> {
        let mut sim = self.sim.borrow_mut();
        sim.closed.push(name);
        if sim.fail_close.contains(&name) {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

impl Platform for MockPlatform {
    type Error = MockError;
    type PinError = MockError;
    type Bus = MockBus;
    type Select = MockSelect;
    type Notify = MockNotify;

    fn has_spi_bus(&self, name: &str) -> bool {
        self.buses.contains(&name)
    }

    fn has_gpio(&self, name: &str) -> bool {
        self.gpios.contains(&name)
    }

    fn open_spi_bus(&mut self, _name: &str, config: &BusConfig) -> Result<MockBus, MockError> {
        let mut sim = self.sim.borrow_mut();
        sim.opened.push(BUS);
        sim.bus_config = Some(*config);
        Ok(MockBus(self.sim.clone()))
    }

    fn open_output(&mut self, _name: &str, initial: PinState) -> Result<MockSelect, MockError> {
        let mut sim = self.sim.borrow_mut();
        sim.opened.push(SS);
        sim.initial_select = Some(initial);
        Ok(MockSelect(self.sim.clone()))
    }

    fn open_input(&mut self, _name: &str) -> Result<MockNotify, MockError> {
        self.sim.borrow_mut().opened.push(GDO0);
        Ok(MockNotify(self.sim.clone()))
    }

    fn close_spi_bus(&mut self, _bus: MockBus) -> Result<(), MockError> {
        self.close(BUS)
    }

    fn close_output(&mut self, _pin: MockSelect) -> Result<(), MockError> {
        self.close(SS)
    }

    fn close_input(&mut self, _pin: MockNotify) -> Result<(), MockError> {
        self.close(GDO0)
    }
}

pub fn sim() -> Shared {
    Rc::new(RefCell::new(Sim::default()))
}
