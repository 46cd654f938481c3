//! Byte-streaming driver core for embedded GNSS receivers.
//!
//! The driver decodes two wire protocols arriving interleaved on one UART
//! — NMEA 0183 sentences and the u-blox UBX binary framing — fuses the
//! fragments into coherent location and satellite-constellation snapshots,
//! and drives the receiver's configuration (init tables, ACK gating, baud
//! handshake, timeout resend).
//!
//! The environment supplies two capabilities through the [`Transport`]
//! trait (a non-blocking byte transmitter and a one-shot timer) and
//! receives snapshots through the [`Handler`] trait. Everything else —
//! UART, RTC, power pins — stays outside.
//!
//! ```no_run
//! use gnss::{Config, Handler, Location, Mode, Receiver, SatelliteSet, Transport};
//!
//! struct Uart;
//! impl Transport for Uart {
//!     fn send(&mut self, data: &[u8]) { /* start a DMA transfer */ }
//!     fn start_timer(&mut self, ms: u32) { /* arm an RTC alarm */ }
//!     fn stop_timer(&mut self) {}
//! }
//!
//! struct App;
//! impl Handler for App {
//!     fn location(&mut self, location: &Location) {
//!         // one complete fix per epoch
//!     }
//!     fn satellites(&mut self, satellites: &SatelliteSet) {}
//! }
//!
//! let mut receiver = Receiver::new(
//!     Config { mode: Mode::Ublox, rate: 1, baudrate: 115_200 },
//!     Uart,
//!     App,
//! );
//! // from the UART receive path:
//! receiver.receive(b"$GPGGA,...");
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

pub use crate::{
    error::FrameError,
    receiver::{Config, Handler, Mode, Receiver, Stats, Transport},
    types::{
        Constellation, FixType, Location, LocationMask, Quality, Satellite, SatelliteSet,
        SatelliteState, UtcTime, SATELLITES_COUNT_MAX,
    },
};

mod config;
mod error;
mod fusion;
mod mtk;
mod nmea;
mod receiver;
mod time;
mod types;
mod ubx;
