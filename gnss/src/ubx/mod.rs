//! UBX message dispatch: NAV epoch accumulation, chunked NAV-SVINFO
//! streaming and acknowledgement routing.

pub(crate) mod frames;

use crate::config::{InitPhase, Response};
use crate::fusion::{
    SEEN_NAV_DOP, SEEN_NAV_PVT, SEEN_NAV_SVINFO, SEEN_NAV_TIMEGPS, SEEN_SOLUTION,
    UBX_POSITION_SET,
};
use crate::receiver::{Handler, Receiver, Transport, RX_DATA_SIZE};
use crate::time::utc_offset_time;
use crate::types::{FixType, LocationMask, Quality, Satellite, SatelliteState, UtcTime};

pub(crate) const SYNC_CHAR_1: u8 = 0xb5;
pub(crate) const SYNC_CHAR_2: u8 = 0x62;

// Recognised (class << 8) | id pairs.
pub(crate) const NAV_DOP: u16 = 0x0104;
pub(crate) const NAV_PVT: u16 = 0x0107;
pub(crate) const NAV_TIMEGPS: u16 = 0x0120;
pub(crate) const NAV_SVINFO: u16 = 0x0130;
pub(crate) const ACK_NACK: u16 = 0x0500;
pub(crate) const ACK_ACK: u16 = 0x0501;

const MS_PER_WEEK: i64 = 604_800_000;

/// Decoder-side UBX state: the running Fletcher-8, the frame being read
/// and the GPS timebase of the epoch in progress.
#[derive(Default)]
pub(crate) struct UbxContext {
    pub ck_a: u8,
    pub ck_b: u8,
    pub recv_ck_a: u8,
    pub message: u16,
    pub length: u16,
    pub week: u16,
    pub tow: u32,
    pub itow: u32,
}

impl UbxContext {
    pub(crate) fn checksum_update(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }
}

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn i16_at(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn i32_at(data: &[u8], offset: usize) -> i32 {
    u32_at(data, offset) as i32
}

/// Canonical PRN for a NAV-SVINFO satellite id; zero when the id maps to
/// no constellation. The BeiDou offset for ids 33..=64 is kept exactly as
/// the receiver families shipped it.
pub(crate) fn canonical_prn(svid: u8) -> u8 {
    match svid {
        1..=32 => svid,                  // GPS
        33..=64 => svid + (201 + 5 - 33), // BEIDOU
        65..=96 => svid,                 // GLONASS
        120..=151 => svid - 87,          // SBAS
        152..=158 => svid,               // SBAS
        159..=163 => svid + (201 - 159), // BEIDOU
        193..=200 => svid,               // QZSS
        255 => svid,                     // GLONASS, slot unknown
        _ => 0,
    }
}

fn quality_from_flags(flags: u8) -> Quality {
    if flags & 0xc0 != 0 {
        if flags & 0x80 != 0 {
            Quality::RtkFixed
        } else {
            Quality::RtkFloat
        }
    } else if flags & 0x01 != 0 {
        if flags & 0x02 != 0 {
            Quality::Differential
        } else {
            Quality::Autonomous
        }
    } else {
        Quality::None
    }
}

impl<T: Transport, H: Handler> Receiver<T, H> {
    /// Called once the frame header is complete, before any payload byte.
    /// NAV-SVINFO streams: the first chunk boundary covers the 8-byte
    /// header plus one 12-byte record.
    pub(crate) fn ubx_start_message(&mut self) {
        if self.ubx.message == NAV_SVINFO {
            self.rx_chunk = 20;
            self.fusion.satellites.count = 0;
            self.fusion.seen &= !SEEN_NAV_SVINFO;
        }
    }

    /// Called when the payload write index reaches the chunk boundary:
    /// consume the just-filled record and advance the boundary so the
    /// scratch buffer never grows past the header plus one record.
    pub(crate) fn ubx_parse_chunk(&mut self) {
        if self.ubx.message != NAV_SVINFO {
            return;
        }
        let record = &self.rx[8..20];
        let svid = record[1];
        let flags = record[2];
        let quality = record[3] & 0x0f;
        let snr = record[4];
        let elevation = record[5] as i8;
        let azimuth = i16_at(record, 6);

        let prn = canonical_prn(svid);
        if prn != 0 {
            let mut state = match quality {
                0x02..=0x07 => SatelliteState::TRACKING,
                _ => SatelliteState::empty(),
            };
            if state.is_tracking() {
                if flags & 0x01 != 0 {
                    state |= SatelliteState::NAVIGATING;
                }
                if flags & 0x02 != 0 {
                    state |= SatelliteState::CORRECTION;
                }
            }
            let (elevation, azimuth) = if elevation > 0 {
                (elevation as u8, azimuth as u16)
            } else {
                (0, 0)
            };
            self.fusion.satellites.push(Satellite {
                prn,
                state,
                snr,
                elevation,
                azimuth,
            });
        }

        self.rx_offset += 12;
        self.rx_chunk += 12;
    }

    /// Called after the checksum verified. Applies the message to the
    /// epoch accumulator and runs the fusion check.
    pub(crate) fn ubx_end_message(&mut self) {
        let buf = self.rx;
        let available = usize::from(self.rx_count - self.rx_offset).min(RX_DATA_SIZE);
        let data = &buf[..available];
        let message = self.ubx.message;

        if message >> 8 == 0x01 && data.len() >= 4 {
            // The itow is the epoch key: a class-01 message from another
            // epoch flushes everything accumulated so far.
            let itow = u32_at(data, 0);
            let position_bits = SEEN_NAV_DOP
                | SEEN_NAV_PVT
                | SEEN_NAV_SVINFO
                | SEEN_NAV_TIMEGPS
                | SEEN_SOLUTION;
            if self.fusion.seen & position_bits != 0 && self.ubx.itow != itow {
                self.fusion.restart_epoch();
            }
            self.ubx.itow = itow;

            match message {
                NAV_DOP if data.len() >= 18 => self.nav_dop(data),
                NAV_PVT if data.len() >= 84 => self.nav_pvt(data),
                NAV_TIMEGPS if data.len() >= 16 => self.nav_timegps(data),
                NAV_SVINFO => {
                    self.fusion.seen |= SEEN_NAV_SVINFO;
                },
                _ => {},
            }
        } else if (message == ACK_ACK || message == ACK_NACK) && data.len() >= 2 {
            let command = u16::from(data[0]) << 8 | u16::from(data[1]);
            if self.orch.pending == Some(command) {
                self.orch.pending = None;
                self.ubx_configure(if message == ACK_ACK {
                    Response::Ack
                } else {
                    Response::Nack
                });
            }
        }

        if self.orch.init == InitPhase::Done {
            let expected = self.fusion.expected & UBX_POSITION_SET;
            if self.fusion.seen & expected == expected {
                if self.ubx.week != 0 && self.fusion.location.time.year != 0 {
                    if self.fusion.seen & SEEN_NAV_TIMEGPS == 0 {
                        self.fusion.location.correction =
                            utc_offset_time(&self.fusion.location.time, self.ubx.week, self.ubx.tow);
                    }
                    self.fusion.location.mask |= LocationMask::TIME | LocationMask::CORRECTION;
                }
                self.emit_location();
                self.fusion.seen &= !(SEEN_NAV_DOP | SEEN_NAV_PVT | SEEN_NAV_TIMEGPS);
                self.fusion.seen |= SEEN_SOLUTION;
            }

            let expected = self.fusion.expected & SEEN_NAV_SVINFO;
            if self.fusion.seen & SEEN_SOLUTION != 0 && self.fusion.seen & expected == expected {
                self.emit_satellites();
                self.fusion.seen &= !SEEN_NAV_SVINFO;
            }
        }
    }

    fn nav_dop(&mut self, data: &[u8]) {
        let location = &mut self.fusion.location;
        location.pdop = u16_at(data, 6);
        location.vdop = u16_at(data, 10);
        location.hdop = u16_at(data, 12);
        location.mask |= LocationMask::PDOP | LocationMask::HDOP | LocationMask::VDOP;
        self.fusion.seen |= SEEN_NAV_DOP;
    }

    fn nav_pvt(&mut self, data: &[u8]) {
        let location = &mut self.fusion.location;

        if data[11] & 0x03 == 0x03 {
            // date and time-of-day valid
            location.time.year = u16_at(data, 4).wrapping_sub(1980) as u8;
            location.time.month = data[6];
            location.time.day = data[7];
            location.time.hour = data[8];
            location.time.minute = data[9];
            location.time.second = data[10];
            let nano = i32_at(data, 16);
            location.time.millis = if nano > 0 {
                ((nano + 500_000) / 1_000_000) as u16
            } else {
                0
            };
        } else {
            location.time = UtcTime::GPS_EPOCH;
        }

        location.longitude = i32_at(data, 24);
        location.latitude = i32_at(data, 28);
        location.altitude = i32_at(data, 36);
        location.separation = i32_at(data, 32) - i32_at(data, 36);
        location.ehpe = u32_at(data, 40);
        location.evpe = u32_at(data, 44);
        location.climb = -i32_at(data, 56);
        location.speed = i32_at(data, 60);
        location.course = i32_at(data, 64);

        let flags = data[21];
        match data[20] {
            0x00 => {
                location.fix = FixType::None;
                location.quality = Quality::None;
            },
            0x01 => {
                location.fix = FixType::None;
                location.quality = Quality::Estimated;
            },
            0x02 => {
                location.fix = FixType::Fix2D;
                location.quality = quality_from_flags(flags);
            },
            0x03 => {
                location.fix = FixType::Fix3D;
                location.quality = quality_from_flags(flags);
            },
            0x04 => {
                location.fix = FixType::Fix2D;
                location.quality = Quality::Estimated;
            },
            0x05 => {
                location.fix = FixType::TimeOnly;
                location.quality = Quality::None;
            },
            _ => {},
        }

        location.numsv = data[23];
        location.mask |= LocationMask::POSITION
            | LocationMask::ALTITUDE
            | LocationMask::SPEED
            | LocationMask::COURSE
            | LocationMask::CLIMB
            | LocationMask::EHPE
            | LocationMask::EVPE;

        self.fusion.seen |= SEEN_NAV_PVT;
        self.fusion.seen &= !SEEN_SOLUTION;
    }

    fn nav_timegps(&mut self, data: &[u8]) {
        if data[11] & 0x03 == 0x03 {
            // tow and week valid: normalise the fractional tow, carrying
            // week wraps in both directions
            let mut tow = i64::from(u32_at(data, 0)) + i64::from((i32_at(data, 4) + 500_000) / 1_000_000);
            let mut week = u16_at(data, 8);
            if tow < 0 {
                tow += MS_PER_WEEK;
                week = week.wrapping_sub(1);
            }
            if tow >= MS_PER_WEEK {
                tow -= MS_PER_WEEK;
                week = week.wrapping_add(1);
            }
            self.ubx.week = week;
            self.ubx.tow = tow as u32;
            self.fusion.location.correction = i16::from(data[10] as i8);
        } else {
            self.ubx.week = 0;
            self.ubx.tow = 0;
            self.fusion.location.correction = 0;
        }

        self.fusion.seen |= SEEN_NAV_TIMEGPS;
        self.fusion.seen &= !SEEN_SOLUTION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prn_mapping_gps_glonass_identity() {
        assert_eq!(canonical_prn(1), 1);
        assert_eq!(canonical_prn(32), 32);
        assert_eq!(canonical_prn(65), 65);
        assert_eq!(canonical_prn(96), 96);
        assert_eq!(canonical_prn(255), 255);
    }

    #[test]
    fn prn_mapping_beidou_offsets() {
        assert_eq!(canonical_prn(33), 206);
        assert_eq!(canonical_prn(64), 237);
        assert_eq!(canonical_prn(159), 201);
        assert_eq!(canonical_prn(163), 205);
    }

    #[test]
    fn prn_mapping_sbas_and_qzss() {
        assert_eq!(canonical_prn(120), 33);
        assert_eq!(canonical_prn(151), 64);
        assert_eq!(canonical_prn(152), 152);
        assert_eq!(canonical_prn(158), 158);
        assert_eq!(canonical_prn(193), 193);
        assert_eq!(canonical_prn(200), 200);
    }

    #[test]
    fn prn_mapping_rejects_unassigned_ids() {
        assert_eq!(canonical_prn(0), 0);
        assert_eq!(canonical_prn(97), 0);
        assert_eq!(canonical_prn(119), 0);
        assert_eq!(canonical_prn(164), 0);
        assert_eq!(canonical_prn(192), 0);
        assert_eq!(canonical_prn(201), 0);
        assert_eq!(canonical_prn(254), 0);
    }

    #[test]
    fn fix_quality_from_pvt_flags() {
        assert_eq!(quality_from_flags(0x00), Quality::None);
        assert_eq!(quality_from_flags(0x01), Quality::Autonomous);
        assert_eq!(quality_from_flags(0x03), Quality::Differential);
        assert_eq!(quality_from_flags(0x40), Quality::RtkFloat);
        assert_eq!(quality_from_flags(0x80), Quality::RtkFixed);
        assert_eq!(quality_from_flags(0xc0), Quality::RtkFixed);
    }

    #[test]
    fn little_endian_assembly() {
        let data = [0x40, 0xd5, 0x5b, 0x07, 0xff, 0xff];
        assert_eq!(u16_at(&data, 0), 0xd540);
        assert_eq!(u32_at(&data, 0), 0x075b_d540);
        assert_eq!(i16_at(&data, 4), -1);
        assert_eq!(i32_at(&data, 2), -63_653);
    }
}
