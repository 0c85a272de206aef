#![no_std]

pub mod bits;
mod cc1101;
pub mod config;
mod error;
mod packet;
pub mod platform;
pub mod registers;
pub mod settings;
mod traits;

pub use cc1101::{Cc1101, ChipInfo, DriverError, Event, Watch, WatchdogReport};
pub use config::{ConfigError, RegisterImage};
pub use error::{Error, Parameter};
pub use packet::{Packet, PacketError, RxLength};
pub use platform::{BusConfig, Platform};
pub use registers::MarcState;
pub use settings::Settings;
pub use traits::PacketListener;
