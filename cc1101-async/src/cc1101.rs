use embassy_futures::select::{select, Either};
use embedded_hal_1::digital::{InputPin, OutputPin, PinState};
use embedded_hal_1::spi::ErrorType;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiBus;

use crate::config::RegisterImage;
use crate::error::{Error, Parameter};
use crate::packet::{Packet, PacketError, RxLength};
use crate::platform::Platform;
use crate::registers::*;
use crate::settings::{ConfigWrite, Settings};
use crate::traits::PacketListener;

/// Error type of a driver running on platform `P`
pub type DriverError<P> =
    Error<<<P as Platform>::Bus as ErrorType>::Error, <P as Platform>::PinError, <P as Platform>::Error>;

/// Content of the chip id registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipInfo {
    pub partnum: u8,
    pub version: u8,
}

/// What the GDO0 edge currently means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Watch {
    /// Nothing is watched
    Idle,
    /// Rising edge: a packet is waiting in the RX FIFO
    Rx,
    /// Falling edge: the TX FIFO may have drained
    TxDrain,
}

/// Result of one receive state check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogReport {
    pub state: MarcState,
    /// SRX was strobed because the chip was not in RX
    pub rearmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A read triggered by GDO0, including empty and discarded reads
    Packet(Packet),
    Watchdog(WatchdogReport),
    /// The TX FIFO drained and the chip was put back into RX
    Sent,
    /// GDO0 fell while bytes were still queued for transmission
    TxProgress { remaining: u8 },
}

enum Body<'b> {
    None,
    Write(&'b [u8]),
    Read(&'b mut [u8]),
}

struct Io<P: Platform> {
    bus: P::Bus,
    gdo0: P::Notify,
    select: P::Select,
}

/// The cc1101 transceiver
pub struct Cc1101<'a, P: Platform, DELAY> {
    platform: P,
    delay: DELAY,
    bus_name: &'a str,
    gdo0_name: &'a str,
    select_name: &'a str,
    image: RegisterImage,
    settings: Settings,
    io: Option<Io<P>>,
    watch: Watch,
    listener: Option<&'a mut dyn PacketListener>,
}

impl<'a, P, DELAY> Cc1101<'a, P, DELAY>
where
    P: Platform,
    DELAY: DelayNs,
{
    /// Returns a Cc1101 instance
    ///
    /// Nothing is opened yet, see `setup`.
    ///
    /// # Arguments
    ///
    /// * `platform` - Hands out the bus and pin handles
    /// * `delay` - The delay implementation, also drives the watchdog
    /// * `bus_name` - The spi bus the chip is connected to
    /// * `gdo0_name` - The gpio connected to GDO0, used for packet notifications
    /// * `select_name` - The gpio connected to CSn. It must not be the bus's own chip select,
    ///   because the driver needs to pulse it during reset.
    /// * `image` - Register values programmed during init
    pub fn new(
        platform: P,
        delay: DELAY,
        bus_name: &'a str,
        gdo0_name: &'a str,
        select_name: &'a str,
        image: RegisterImage,
    ) -> Result<Self, DriverError<P>> {
        if !platform.has_spi_bus(bus_name) {
            log::error!("SPI device {} does not exist", bus_name);
        }
        if !platform.has_gpio(gdo0_name) {
            return Err(Error::InvalidParameter(Parameter::Gdo0));
        }
        if !platform.has_gpio(select_name) {
            return Err(Error::InvalidParameter(Parameter::SlaveSelect));
        }
        Ok(Self {
            platform,
            delay,
            bus_name,
            gdo0_name,
            select_name,
            image,
            settings: Settings::default(),
            io: None,
            watch: Watch::Idle,
            listener: None,
        })
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn watch(&self) -> Watch {
        self.watch
    }

    pub fn is_connected(&self) -> bool {
        self.io.is_some()
    }

    /// Opens the handles, programs the chip and starts listening
    ///
    /// The returned chip id is only logged, it is not checked against a known part.
    pub async fn setup(&mut self) -> Result<ChipInfo, DriverError<P>> {
        self.connect()?;
        self.init().await?;
        let info = self.read_chip_info().await?;
        log::debug!(
            "init done, partnum is {:02X}, version is {:02X}",
            info.partnum,
            info.version
        );
        self.print_marc_state().await?;
        self.set_listening().await?;
        Ok(info)
    }

    /// Puts the chip in RX and watches GDO0 for incoming packets
    ///
    /// From here on `next_event` reads a packet for every rising edge and checks the
    /// chip state whenever the watchdog period passes without one.
    pub async fn set_listening(&mut self) -> Result<(), DriverError<P>> {
        self.watch = Watch::Rx;
        self.set_rx_state().await
    }

    /// Sets the listener called for every packet read after an edge
    ///
    /// `None` disables notification.
    pub fn set_packet_listener(&mut self, listener: Option<&'a mut dyn PacketListener>) {
        self.listener = listener;
    }

    fn connect(&mut self) -> Result<(), DriverError<P>> {
        if self.io.is_some() {
            return Ok(());
        }
        let bus = self
            .platform
            .open_spi_bus(self.bus_name, &self.settings.bus)
            .map_err(Error::Platform)?;
        let gdo0 = match self.platform.open_input(self.gdo0_name) {
            Ok(pin) => pin,
            Err(e) => {
                log::error!("Exception while opening {}", self.gdo0_name);
                let _ = self.platform.close_spi_bus(bus);
                return Err(Error::Platform(e));
            }
        };
        let select = match self.platform.open_output(self.select_name, PinState::High) {
            Ok(pin) => pin,
            Err(e) => {
                log::error!("Exception while opening {}", self.select_name);
                let _ = self.platform.close_input(gdo0);
                let _ = self.platform.close_spi_bus(bus);
                return Err(Error::Platform(e));
            }
        };
        self.io = Some(Io { bus, gdo0, select });
        Ok(())
    }

    fn io(&mut self) -> Result<&mut Io<P>, DriverError<P>> {
        self.io.as_mut().ok_or(Error::NotConnected)
    }

    fn select_chip(&mut self) -> Result<(), DriverError<P>> {
        self.io()?.select.set_low().map_err(Error::Pin)
    }

    fn deselect_chip(&mut self) -> Result<(), DriverError<P>> {
        self.io()?.select.set_high().map_err(Error::Pin)
    }

    /// Current level of GDO0
    pub fn gdo0_is_high(&mut self) -> Result<bool, DriverError<P>> {
        self.io()?.gdo0.is_high().map_err(Error::Pin)
    }

    /// One transaction framed by CSn, with the settle delay on both sides
    ///
    /// The chip is deselected even if the transfer fails.
    async fn framed(&mut self, header: u8, body: Body<'_>) -> Result<(), DriverError<P>> {
        self.select_chip()?;
        self.delay.delay_us(self.settings.settle_us).await;
        let result = self.transfer(header, body).await;
        self.delay.delay_us(self.settings.settle_us).await;
        let deselected = self.deselect_chip();
        result?;
        deselected
    }

    async fn transfer(&mut self, header: u8, body: Body<'_>) -> Result<(), DriverError<P>> {
        let bus = &mut self.io()?.bus;
        bus.write(&[header]).await.map_err(Error::SPI)?;
        match body {
            Body::None => (),
            Body::Write(data) => bus.write(data).await.map_err(Error::SPI)?,
            Body::Read(data) => bus.read(data).await.map_err(Error::SPI)?,
        }
        bus.flush().await.map_err(Error::SPI)
    }

    async fn write_register(&mut self, addr: u8, value: u8) -> Result<(), DriverError<P>> {
        self.framed(addr, Body::Write(&[value])).await
    }

    async fn write_burst(&mut self, addr: u8, data: &[u8]) -> Result<(), DriverError<P>> {
        self.framed(addr | WRITE_BURST, Body::Write(data)).await
    }

    async fn strobe(&mut self, cmd: Command) -> Result<(), DriverError<P>> {
        self.framed(cmd.value(), Body::None).await
    }

    async fn read_register(&mut self, addr: u8, access: u8) -> Result<u8, DriverError<P>> {
        let mut buffer = [0];
        self.framed(addr | access, Body::Read(&mut buffer)).await?;
        Ok(buffer[0])
    }

    async fn read_burst(&mut self, addr: u8, data: &mut [u8]) -> Result<(), DriverError<P>> {
        self.framed(addr | READ_BURST, Body::Read(data)).await
    }

    async fn read_config(&mut self, reg: Config) -> Result<u8, DriverError<P>> {
        self.read_register(reg.addr(), READ_SINGLE).await
    }

    async fn read_status(&mut self, reg: Status) -> Result<u8, DriverError<P>> {
        self.read_register(reg.addr(), READ_BURST).await
    }

    /// Pulses CSn and sends SRES
    ///
    /// The pulse timing is required by the chip, no settle delay is inserted before the strobe.
    async fn reset(&mut self) -> Result<(), DriverError<P>> {
        let timing = self.settings.reset;
        self.deselect_chip()?;
        self.delay.delay_us(timing.deselected_us).await;
        self.select_chip()?;
        self.delay.delay_us(timing.selected_us).await;
        self.deselect_chip()?;
        self.delay.delay_us(timing.released_us).await;
        self.select_chip()?;

        let result = self.transfer(Command::Sres.value(), Body::None).await;
        let deselected = self.deselect_chip();
        result?;
        deselected
    }

    async fn init(&mut self) -> Result<(), DriverError<P>> {
        self.reset().await?;
        self.write_burst(PATABLE, &[self.settings.pa_level]).await?;
        self.write_config().await
    }

    async fn write_config(&mut self) -> Result<(), DriverError<P>> {
        let image = self.image;
        match self.settings.config_write {
            ConfigWrite::PerRegister => {
                for (reg, value) in image.iter() {
                    self.write_register(reg.addr(), value).await?;
                }
                Ok(())
            }
            ConfigWrite::Burst => self.write_burst(Config::Iocfg2.addr(), &image.bytes()).await,
        }
    }

    /// Reads PARTNUM and VERSION
    pub async fn read_chip_info(&mut self) -> Result<ChipInfo, DriverError<P>> {
        let partnum = self.read_status(Status::Partnum).await?;
        let version = self.read_status(Status::Version).await?;
        Ok(ChipInfo { partnum, version })
    }

    /// Logs all configuration registers and returns them
    ///
    /// Can be called during debug to check that the image was written as expected.
    pub async fn print_registers(&mut self) -> Result<[u8; COMPLETE_REGISTER_COUNT], DriverError<P>> {
        let mut values = [0u8; COMPLETE_REGISTER_COUNT];
        for (reg, value) in Config::ALL.iter().zip(values.iter_mut()) {
            *value = self.read_config(*reg).await?;
            log::info!("Register {:#04x} = {:02X}", reg.addr(), *value);
        }
        Ok(values)
    }

    /// Logs the MARC state and returns it
    pub async fn print_marc_state(&mut self) -> Result<MarcState, DriverError<P>> {
        let state = self.marc_state().await?;
        log::info!("Marcstate is {:02X} ({:?})", state.value(), state);
        Ok(state)
    }

    /// Reads the main radio control state
    ///
    /// Never cached, every call goes to the chip.
    pub async fn marc_state(&mut self) -> Result<MarcState, DriverError<P>> {
        let status = self.read_status(Status::Marcstate).await?;
        Ok(MarcState::from_status(status))
    }

    pub async fn set_rx_state(&mut self) -> Result<(), DriverError<P>> {
        self.strobe(Command::Srx).await
    }

    pub async fn set_tx_state(&mut self) -> Result<(), DriverError<P>> {
        self.strobe(Command::Stx).await
    }

    pub async fn set_idle_state(&mut self) -> Result<(), DriverError<P>> {
        self.strobe(Command::Sidle).await
    }

    /// Forces IDLE, then powers the chip down once CSn goes high
    ///
    /// GDO0 is no longer watched afterwards.
    pub async fn power_down(&mut self) -> Result<(), DriverError<P>> {
        self.watch = Watch::Idle;
        self.set_idle_state().await?;
        self.strobe(Command::Spwd).await
    }

    async fn flush_rx_fifo(&mut self) -> Result<(), DriverError<P>> {
        self.strobe(Command::Sfrx).await
    }

    async fn flush_tx_fifo(&mut self) -> Result<(), DriverError<P>> {
        self.strobe(Command::Sftx).await
    }

    /// Reads the RX FIFO
    ///
    /// This is what happens on every rising GDO0 edge while listening, so there is
    /// usually no need to call it directly. The chip is put back into RX afterwards,
    /// whatever the outcome.
    pub async fn receive_data(&mut self) -> Result<Packet, DriverError<P>> {
        let result = self.read_packet().await;
        let rearmed = self.set_rx_state().await;
        let packet = result?;
        rearmed?;
        Ok(packet)
    }

    async fn read_packet(&mut self) -> Result<Packet, DriverError<P>> {
        if self.marc_state().await? == MarcState::RxfifoOverflow {
            self.set_idle_state().await?;
            self.flush_rx_fifo().await?;
            log::warn!("RX FIFO overflow, flushed");
            return Ok(Packet::with_length(RxLength::Overflow));
        }

        if self.read_status(Status::Rxbytes).await? == 0 {
            return Ok(Packet::with_length(RxLength::Empty));
        }

        // First byte in fifo is the length, because of variable packet length.
        // It has to be read with a single access.
        let len = self.read_register(RXFIFO, READ_SINGLE).await?;
        if len as usize > DATA_LEN {
            log::warn!("Packet length {} exceeds {}, discarded", len, DATA_LEN);
            return Ok(Packet::with_length(RxLength::Oversize));
        }
        if len == 0 {
            log::error!("Packet length is {:02X}, nothing to read", len);
            return Ok(Packet::with_length(RxLength::Empty));
        }

        let mut packet = Packet::with_length(RxLength::Bytes(len));
        packet
            .data
            .resize_default(len as usize)
            .map_err(|_| PacketError::DataTooLong)?;
        self.read_burst(RXFIFO, &mut packet.data[..]).await?;
        packet.rssi = self.read_status(Status::Rssi).await? as i8;
        let lqi = LqiStatus(self.read_status(Status::Lqi).await?);
        packet.lqi = lqi.link_quality();
        packet.crc_ok = lqi.crc_ok();
        Ok(packet)
    }

    /// Checks that the chip is still receiving and strobes SRX if it is not
    pub async fn watchdog_tick(&mut self) -> Result<WatchdogReport, DriverError<P>> {
        log::debug!("Checking the status");
        let state = self.marc_state().await?;
        if state == MarcState::Rx {
            log::debug!("Nothing to do");
            return Ok(WatchdogReport { state, rearmed: false });
        }
        log::warn!("Marcstate is {:02X} ({:?}), going back to RX", state.value(), state);
        self.set_rx_state().await?;
        Ok(WatchdogReport { state, rearmed: true })
    }

    /// Send data over the radio
    ///
    /// Returns once the packet is queued and the chip is transmitting. Completion is
    /// reported by `next_event` as `Event::Sent`, after which the chip is back in RX.
    ///
    /// If the chip is found outside of TX after queueing, it is idled, the TX FIFO is
    /// flushed and TX is strobed once more before giving up with `TxAborted`.
    pub async fn send_data(&mut self, data: &[u8]) -> Result<(), DriverError<P>> {
        let packet = Packet::new(data)?;

        self.set_tx_state().await?;
        self.wait_for_tx().await?;
        self.delay.delay_ms(self.settings.tx_settle_ms).await;

        self.write_register(TXFIFO, packet.data.len() as u8).await?;
        if !packet.data.is_empty() {
            self.write_burst(TXFIFO, &packet.data).await?;
        }
        self.set_tx_state().await?;

        let state = self.marc_state().await?;
        if !state.is_transmitting() {
            log::warn!("TX aborted, marcstate is {:02X}", state.value());
            self.set_idle_state().await?;
            self.flush_tx_fifo().await?;
            self.set_tx_state().await?;
            return Err(Error::TxAborted(state));
        }

        self.watch = Watch::TxDrain;
        Ok(())
    }

    async fn wait_for_tx(&mut self) -> Result<(), DriverError<P>> {
        let poll = self.settings.tx_poll_ms.max(1);
        let mut waited = 0;
        while self.marc_state().await? != MarcState::Tx {
            if waited >= self.settings.tx_enter_timeout_ms {
                log::warn!("Chip did not enter TX within {} ms", waited);
                return Err(Error::TxTimeout);
            }
            self.delay.delay_ms(poll).await;
            waited += poll;
        }
        Ok(())
    }

    /// Waits for the next GDO0 edge or watchdog period and handles it
    ///
    /// While listening, a rising edge reads the packet and passes it to the listener.
    /// After `send_data`, a falling edge checks whether the TX FIFO drained. If the
    /// period elapses first, the receive state is checked instead.
    pub async fn next_event(&mut self) -> Result<Event, DriverError<P>> {
        let watch = self.watch;
        let edge = {
            let Self {
                io, delay, settings, ..
            } = self;
            let io = io.as_mut().ok_or(Error::NotConnected)?;
            match watch {
                Watch::Idle => return Err(Error::NotListening),
                Watch::Rx => {
                    select(
                        io.gdo0.wait_for_rising_edge(),
                        delay.delay_ms(settings.watchdog_period_ms),
                    )
                    .await
                }
                Watch::TxDrain => {
                    select(
                        io.gdo0.wait_for_falling_edge(),
                        delay.delay_ms(settings.tx_drain_timeout_ms),
                    )
                    .await
                }
            }
        };

        match edge {
            Either::First(result) => {
                result.map_err(Error::Pin)?;
                match watch {
                    Watch::TxDrain => self.tx_drained().await,
                    _ => self.packet_ready().await,
                }
            }
            Either::Second(()) => {
                if watch == Watch::TxDrain {
                    log::warn!("TX FIFO did not drain, going back to RX");
                    self.watch = Watch::Rx;
                }
                Ok(Event::Watchdog(self.watchdog_tick().await?))
            }
        }
    }

    async fn packet_ready(&mut self) -> Result<Event, DriverError<P>> {
        let packet = self.receive_data().await?;
        log::trace!("Packet received : {}", packet);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_new_packet(&packet);
        }
        Ok(Event::Packet(packet))
    }

    async fn tx_drained(&mut self) -> Result<Event, DriverError<P>> {
        let remaining = self.read_status(Status::Txbytes).await? & FIFO_BYTES_MASK;
        if remaining != 0 {
            return Ok(Event::TxProgress { remaining });
        }
        log::debug!("Data sent successfully");
        self.watch = Watch::Rx;
        self.set_rx_state().await?;
        Ok(Event::Sent)
    }

    /// Serves edges and watchdog periods until the driver cannot listen anymore
    ///
    /// I/O errors are logged and the loop carries on; the watchdog brings the chip
    /// back into RX. Returns only with `NotConnected` or `NotListening`.
    pub async fn run(&mut self) -> DriverError<P> {
        loop {
            match self.next_event().await {
                Ok(event) => log::trace!("{:?}", event),
                Err(e @ (Error::NotConnected | Error::NotListening)) => return e,
                Err(e) => log::error!("Radio loop error: {:?}", e),
            }
        }
    }

    /// Closes the spi bus and both gpios
    ///
    /// Every handle is closed even if closing another one failed; the first failure
    /// is returned.
    pub fn close(mut self) -> Result<(), DriverError<P>> {
        self.watch = Watch::Idle;
        let Some(io) = self.io.take() else {
            return Ok(());
        };

        let mut result = Ok(());
        if let Err(e) = self.platform.close_spi_bus(io.bus) {
            log::error!("Exception while closing {}", self.bus_name);
            result = Err(Error::Platform(e));
        }
        if let Err(e) = self.platform.close_input(io.gdo0) {
            log::error!("Exception while closing {}", self.gdo0_name);
            if result.is_ok() {
                result = Err(Error::Platform(e));
            }
        }
        if let Err(e) = self.platform.close_output(io.select) {
            log::error!("Exception while closing {}", self.select_name);
            if result.is_ok() {
                result = Err(Error::Platform(e));
            }
        }
        result
    }
}
