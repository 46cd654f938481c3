//! The receiver session: outer framer, entry points and runtime setters.

use log::{debug, trace};

use crate::config::{InitPhase, Orchestrator, Response};
use crate::error::FrameError;
use crate::fusion::{finalize_location, Fusion, NMEA_DEFAULT_EXPECTED};
use crate::mtk;
use crate::nmea::NmeaContext;
use crate::types::{Constellation, Location, SatelliteSet};
use crate::ubx::{frames, UbxContext, SYNC_CHAR_1, SYNC_CHAR_2};

/// Scratch buffer for one NMEA field or one UBX payload window.
pub(crate) const RX_DATA_SIZE: usize = 96;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Downward capabilities the driver consumes from its environment: a
/// non-blocking byte transmitter and a one-shot millisecond timer.
///
/// `send` must not block; the environment reports completion by calling
/// [`Receiver::send_complete`] once the buffer may be reused. The timer
/// fires through [`Receiver::timer_expired`]; starting it while it runs
/// restarts it. All driver entry points must be serialised by the caller.
pub trait Transport {
    fn send(&mut self, data: &[u8]);
    fn start_timer(&mut self, ms: u32);
    fn stop_timer(&mut self);
}

/// Upward callbacks. The snapshots are borrowed for the duration of the
/// call; implementations copy what they keep.
pub trait Handler {
    fn location(&mut self, location: &Location);
    fn satellites(&mut self, satellites: &SatelliteSet);
}

/// Which protocol family the receiver speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Listen-only NMEA; no configuration traffic at all.
    #[default]
    Nmea,
    /// Mediatek: NMEA sentences plus `$PMTK` configuration.
    Mediatek,
    /// u-blox: UBX protocol with NMEA during the baud handshake.
    Ublox,
}

/// Bring-up parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    /// Navigation rate in Hz; 1, 5 and 10 have dedicated init tables.
    pub rate: u32,
    /// UART baud rate negotiated during init.
    pub baudrate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::Nmea,
            rate: 1,
            baudrate: 9_600,
        }
    }
}

/// Frames discarded since initialisation, by protocol side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub nmea_discarded: u32,
    pub ubx_discarded: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FramerState {
    #[default]
    Start,
    NmeaPayload,
    NmeaChecksum1,
    NmeaChecksum2,
    NmeaEndCr,
    NmeaEndLf,
    UbxSync2,
    UbxMessage1,
    UbxMessage2,
    UbxLength1,
    UbxLength2,
    UbxPayload,
    UbxCkA,
    UbxCkB,
}

impl FramerState {
    /// States in which a `$` (re)starts a sentence. Mid-UBX-frame it is
    /// payload, not framing.
    fn nmea_side(&self) -> bool {
        matches!(
            self,
            FramerState::Start
                | FramerState::NmeaPayload
                | FramerState::NmeaChecksum1
                | FramerState::NmeaChecksum2
                | FramerState::NmeaEndCr
                | FramerState::NmeaEndLf
        )
    }
}

/// One GNSS receiver session. Owns every piece of protocol state, the
/// transport and the handler; the caller owns the `Receiver` value and
/// serialises calls into it.
pub struct Receiver<T: Transport, H: Handler> {
    mode: Mode,
    state: FramerState,
    checksum: u8,
    pub(crate) rx_count: u16,
    pub(crate) rx_offset: u16,
    pub(crate) rx_chunk: u16,
    pub(crate) rx: [u8; RX_DATA_SIZE],
    pub(crate) nmea: NmeaContext,
    pub(crate) ubx: UbxContext,
    pub(crate) fusion: Fusion,
    pub(crate) orch: Orchestrator,
    stats: Stats,
    pub(crate) transport: T,
    pub(crate) handler: H,
}

impl<T: Transport, H: Handler> Receiver<T, H> {
    /// Create a session and start the bring-up: the baud-change sentence
    /// goes out immediately (fire-and-forget, at the receiver's power-on
    /// rate), then the init table replays once framing is seen at the
    /// configured rate.
    pub fn new(config: Config, transport: T, handler: H) -> Self {
        let mut receiver = Receiver {
            mode: config.mode,
            state: FramerState::Start,
            checksum: 0,
            rx_count: 0,
            rx_offset: 0,
            rx_chunk: 0,
            rx: [0; RX_DATA_SIZE],
            nmea: NmeaContext::default(),
            ubx: UbxContext::default(),
            fusion: Fusion::default(),
            orch: Orchestrator::default(),
            stats: Stats::default(),
            transport,
            handler,
        };

        match config.mode {
            Mode::Ublox => {
                receiver.orch.init = InitPhase::UbxBaudRate;
                receiver.orch.table = Some(crate::config::Table::of(if config.rate >= 10 {
                    frames::INIT_TABLE_10HZ
                } else if config.rate >= 5 {
                    frames::INIT_TABLE_5HZ
                } else {
                    frames::INIT_TABLE_1HZ
                }));
                receiver
                    .transport
                    .send(frames::baud_sentence(config.baudrate));
            },
            Mode::Mediatek => {
                receiver.orch.init = InitPhase::MtkBaudRate;
                receiver.orch.table = Some(crate::config::Table::of(if config.rate >= 5 {
                    mtk::INIT_TABLE_5HZ
                } else {
                    mtk::INIT_TABLE_1HZ
                }));
                receiver.transport.send(mtk::baud_sentence(config.baudrate));
            },
            Mode::Nmea => {
                receiver.orch.init = InitPhase::Done;
                receiver.fusion.expected = NMEA_DEFAULT_EXPECTED;
            },
        }

        receiver
    }

    /// Feed received bytes. Never blocks; completed snapshots surface
    /// through the handler before this returns.
    pub fn receive(&mut self, data: &[u8]) {
        for &byte in data {
            self.receive_byte(byte);
        }
    }

    fn receive_byte(&mut self, byte: u8) {
        // a '$' unconditionally starts a sentence, abandoning whatever
        // was in flight on the NMEA side
        if byte == b'$' && self.state.nmea_side() {
            self.state = FramerState::NmeaPayload;
            self.checksum = 0;
            self.rx_count = 0;
            self.nmea_start_sentence();
            return;
        }

        match self.state {
            FramerState::Start => {
                if self.mode == Mode::Ublox && byte == SYNC_CHAR_1 {
                    self.state = FramerState::UbxSync2;
                }
            },

            FramerState::NmeaPayload => {
                if byte == b'*' {
                    self.nmea_field_complete();
                    self.state = FramerState::NmeaChecksum1;
                } else if (0x20..=0x7f).contains(&byte) {
                    if usize::from(self.rx_count) >= RX_DATA_SIZE {
                        self.resync_nmea(FrameError::NmeaOverflow);
                    } else {
                        self.checksum ^= byte;
                        if byte == b',' {
                            self.nmea_field_complete();
                            self.rx_count = 0;
                        } else {
                            self.rx[usize::from(self.rx_count)] = byte;
                            self.rx_count += 1;
                        }
                    }
                } else {
                    self.resync_nmea(FrameError::NmeaChar { byte });
                }
            },

            FramerState::NmeaChecksum1 => {
                let expect = HEX_DIGITS[usize::from(self.checksum >> 4)];
                if byte == expect {
                    self.state = FramerState::NmeaChecksum2;
                } else {
                    self.resync_nmea(FrameError::NmeaChecksum { expect, got: byte });
                }
            },

            FramerState::NmeaChecksum2 => {
                let expect = HEX_DIGITS[usize::from(self.checksum & 0x0f)];
                if byte == expect {
                    self.state = FramerState::NmeaEndCr;
                } else {
                    self.resync_nmea(FrameError::NmeaChecksum { expect, got: byte });
                }
            },

            FramerState::NmeaEndCr => {
                if byte == b'\r' {
                    self.state = FramerState::NmeaEndLf;
                } else {
                    self.resync_nmea(FrameError::NmeaTermination { got: byte });
                }
            },

            FramerState::NmeaEndLf => {
                if byte == b'\n' {
                    // any validly framed sentence settles the baud
                    // handshake
                    match self.orch.init {
                        InitPhase::MtkBaudRate => self.mtk_configure(Response::Sentence),
                        InitPhase::UbxBaudRate => self.ubx_configure(Response::Sentence),
                        _ => {},
                    }
                    self.nmea_end_sentence();
                    self.state = FramerState::Start;
                } else {
                    self.resync_nmea(FrameError::NmeaTermination { got: byte });
                }
            },

            FramerState::UbxSync2 => {
                if byte == SYNC_CHAR_2 {
                    self.state = FramerState::UbxMessage1;
                } else {
                    self.resync_ubx(FrameError::UbxSync { got: byte });
                }
            },

            FramerState::UbxMessage1 => {
                self.ubx.ck_a = byte;
                self.ubx.ck_b = byte;
                self.ubx.message = u16::from(byte) << 8;
                self.state = FramerState::UbxMessage2;
            },

            FramerState::UbxMessage2 => {
                self.ubx.checksum_update(byte);
                self.ubx.message |= u16::from(byte);
                self.state = FramerState::UbxLength1;
            },

            FramerState::UbxLength1 => {
                self.ubx.checksum_update(byte);
                self.ubx.length = u16::from(byte);
                self.state = FramerState::UbxLength2;
            },

            FramerState::UbxLength2 => {
                self.ubx.checksum_update(byte);
                self.ubx.length |= u16::from(byte) << 8;
                self.rx_count = 0;
                self.rx_offset = 0;
                self.rx_chunk = u16::MAX;
                self.ubx_start_message();
                self.state = if self.ubx.length == 0 {
                    FramerState::UbxCkA
                } else {
                    FramerState::UbxPayload
                };
            },

            FramerState::UbxPayload => {
                self.ubx.checksum_update(byte);
                let index = usize::from(self.rx_count - self.rx_offset);
                if index < RX_DATA_SIZE {
                    self.rx[index] = byte;
                }
                self.rx_count = self.rx_count.wrapping_add(1);
                if self.rx_count == self.rx_chunk {
                    self.ubx_parse_chunk();
                }
                if self.rx_count == self.ubx.length {
                    self.state = FramerState::UbxCkA;
                }
            },

            FramerState::UbxCkA => {
                self.ubx.recv_ck_a = byte;
                self.state = FramerState::UbxCkB;
            },

            FramerState::UbxCkB => {
                if (self.ubx.recv_ck_a, byte) == (self.ubx.ck_a, self.ubx.ck_b) {
                    // any validly framed message settles the baud
                    // handshake
                    if self.orch.init == InitPhase::UbxBaudRate {
                        self.ubx_configure(Response::Message);
                    }
                    if self.rx_count - self.rx_offset <= RX_DATA_SIZE as u16 {
                        self.ubx_end_message();
                    }
                    self.state = FramerState::Start;
                } else {
                    self.resync_ubx(FrameError::UbxChecksum {
                        expect: u16::from_le_bytes([self.ubx.ck_a, self.ubx.ck_b]),
                        got: u16::from_le_bytes([self.ubx.recv_ck_a, byte]),
                    });
                }
            },
        }
    }

    fn nmea_field_complete(&mut self) {
        let buf = self.rx;
        let len = usize::from(self.rx_count);
        self.nmea_parse_field(&buf[..len]);
    }

    fn resync_nmea(&mut self, error: FrameError) {
        trace!("discarding sentence: {error}");
        self.stats.nmea_discarded = self.stats.nmea_discarded.wrapping_add(1);
        self.state = FramerState::Start;
    }

    fn resync_ubx(&mut self, error: FrameError) {
        trace!("discarding frame: {error}");
        self.stats.ubx_discarded = self.stats.ubx_discarded.wrapping_add(1);
        self.state = FramerState::Start;
    }

    /// The transport finished transmitting; its buffer may be reused.
    pub fn send_complete(&mut self) {
        self.orch.busy = false;
    }

    /// The one-shot timer fired: a u-blox command went unacknowledged.
    pub fn timer_expired(&mut self) {
        if self.mode == Mode::Ublox {
            self.ubx_timeout();
        }
    }

    /// True once no table is in progress and no send is outstanding.
    /// Setters are rejected until then.
    pub fn is_done(&self) -> bool {
        self.orch.table.is_none() && !self.orch.busy
    }

    /// Select the constellations to navigate with. Returns `false` while
    /// the receiver is busy.
    pub fn set_constellation(&mut self, constellation: Constellation) -> bool {
        if !self.is_done() {
            return false;
        }
        let glonass = constellation.contains(Constellation::GLONASS);
        match self.mode {
            Mode::Nmea => {},
            Mode::Mediatek => self.mtk_table(if glonass {
                mtk::CONSTELLATION_GPS_GLONASS_TABLE
            } else {
                mtk::CONSTELLATION_GPS_TABLE
            }),
            Mode::Ublox => self.ubx_table(if glonass {
                frames::CONSTELLATION_GPS_GLONASS_TABLE
            } else {
                frames::CONSTELLATION_GPS_TABLE
            }),
        }
        true
    }

    /// Enable or disable SBAS search and differential corrections.
    pub fn set_sbas(&mut self, on: bool) -> bool {
        if !self.is_done() {
            return false;
        }
        match self.mode {
            Mode::Nmea => {},
            Mode::Mediatek => self.mtk_table(if on {
                mtk::SBAS_ENABLE_TABLE
            } else {
                mtk::SBAS_DISABLE_TABLE
            }),
            Mode::Ublox => self.ubx_table(if on {
                frames::SBAS_ENABLE_TABLE
            } else {
                frames::SBAS_DISABLE_TABLE
            }),
        }
        true
    }

    /// Enable or disable QZSS search.
    pub fn set_qzss(&mut self, on: bool) -> bool {
        if !self.is_done() {
            return false;
        }
        match self.mode {
            Mode::Nmea => {},
            Mode::Mediatek => self.mtk_table(if on {
                mtk::QZSS_ENABLE_TABLE
            } else {
                mtk::QZSS_DISABLE_TABLE
            }),
            Mode::Ublox => self.ubx_table(if on {
                frames::QZSS_ENABLE_TABLE
            } else {
                frames::QZSS_DISABLE_TABLE
            }),
        }
        true
    }

    /// Route the antenna supervisor to the external antenna (u-blox only).
    pub fn set_external(&mut self, on: bool) -> bool {
        if !self.is_done() {
            return false;
        }
        if self.mode == Mode::Ublox {
            self.ubx_table(if on {
                frames::EXTERNAL_ENABLE_TABLE
            } else {
                frames::EXTERNAL_DISABLE_TABLE
            });
        }
        true
    }

    /// Configure periodic (duty-cycled) operation: `on_time` seconds of
    /// tracking every `period` seconds. `on_time` zero returns to cyclic
    /// 1 s tracking; `force` holds the receiver in ON/OFF operation even
    /// for short periods (u-blox only).
    pub fn set_periodic(&mut self, on_time: u32, period: u32, force: bool) -> bool {
        if !self.is_done() {
            return false;
        }
        if self.mode == Mode::Ublox {
            debug!("periodic mode: on_time {on_time}s period {period}s force {force}");
            self.ubx_periodic(on_time, period, force);
        }
        true
    }

    /// Put the receiver into backup until [`wakeup`](Self::wakeup).
    pub fn sleep(&mut self) -> bool {
        if !self.is_done() {
            return false;
        }
        if self.mode == Mode::Ublox {
            self.ubx_send(crate::config::Entry::Frame(frames::RXM_PMREQ));
        }
        true
    }

    /// Wake the receiver from backup.
    pub fn wakeup(&mut self) -> bool {
        if !self.is_done() {
            return false;
        }
        if self.mode == Mode::Ublox {
            self.ubx_send(crate::config::Entry::Frame(frames::CFG_RXM_CONTINUOUS));
        }
        true
    }

    /// Frames discarded so far, by protocol side.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Finalise the accumulated fix and hand it out, then clear the
    /// accumulator for the next epoch.
    pub(crate) fn emit_location(&mut self) {
        finalize_location(&mut self.fusion.location);
        self.handler.location(&self.fusion.location);
        self.fusion.reset_location();
    }

    /// Hand out the constellation snapshot of the epoch just located.
    pub(crate) fn emit_satellites(&mut self) {
        self.handler.satellites(&self.fusion.satellites);
    }
}
