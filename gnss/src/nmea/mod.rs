//! NMEA sentence machine: per-sentence field dispatch, talker
//! discrimination and the used-satellite bookkeeping feeding fusion.

pub(crate) mod fields;

use crate::config::{InitPhase, Response};
use crate::fusion::{
    NMEA_CONSTELLATION_SET, NMEA_POSITION_SET, SEEN_GGA, SEEN_GSA_GLONASS, SEEN_GSA_GPS,
    SEEN_GST, SEEN_GSV_GLONASS, SEEN_GSV_GPS, SEEN_RMC, SEEN_SOLUTION,
};
use crate::receiver::{Handler, Receiver, Transport};
use crate::time::same_time_of_day;
use crate::types::{FixType, LocationMask, Quality, Satellite, SatelliteState};

use self::fields::{isqrt, parse_fixed, parse_latitude, parse_longitude, parse_time, parse_unsigned};

// Which fields the sentence in progress has actually delivered. Bits are
// dropped again when a field turns out empty; whatever survives to the end
// of the sentence is folded into the location mask.
pub(crate) const FIELD_TIME: u16 = 0x0001;
pub(crate) const FIELD_POSITION: u16 = 0x0002;
pub(crate) const FIELD_ALTITUDE: u16 = 0x0004;
pub(crate) const FIELD_SPEED: u16 = 0x0008;
pub(crate) const FIELD_COURSE: u16 = 0x0010;
pub(crate) const FIELD_EHPE: u16 = 0x0020;
pub(crate) const FIELD_EVPE: u16 = 0x0040;
pub(crate) const FIELD_PDOP: u16 = 0x0080;
pub(crate) const FIELD_HDOP: u16 = 0x0100;
pub(crate) const FIELD_VDOP: u16 = 0x0200;

/// Sentence kinds that contribute to fusion once complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completed {
    Gga,
    Gsa,
    Gst,
    Gsv,
    Rmc,
    Pmtk,
}

/// Where the sentence machine stands. `Skip` is the sink state after a
/// field failed to parse; `Done` means all recognised fields were
/// consumed and only the terminator is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Sentence {
    #[default]
    Address,
    Skip,
    Gga,
    Gsa,
    Gst,
    Gsv,
    Rmc,
    Pmtk,
    Done(Completed),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum NavMode {
    #[default]
    None,
    TwoD,
    ThreeD,
}

/// Sentence-machine state carried across fields and sentences.
#[derive(Default)]
pub(crate) struct NmeaContext {
    /// Second talker char of the last address: b'P', b'L' or b'N'.
    pub prefix: u8,
    pub sentence: Sentence,
    /// Index of the next field within the sentence body.
    pub field: u8,
    pub mask: u16,
    pub navigation: NavMode,
    pub status_valid: bool,
    pub sv_in_view_sentences: u8,
    pub sv_in_view_count: u8,
    pub sv_in_view_index: u8,
    pub sv_used_count: u8,
    pub sv_used_mask: [u32; 3],
    /// Satellite staged across one GSV quad, appended at its SNR field.
    pub staged: Satellite,
    pub mtk_command: u16,
    pub mtk_status: u16,
}

impl NmeaContext {
    fn clear_sv_used(&mut self) {
        self.sv_used_count = 0;
        self.sv_used_mask = [0; 3];
    }

    fn sv_used(&self, prn: u8) -> bool {
        (1..=96).contains(&prn)
            && self.sv_used_mask[usize::from(prn - 1) >> 5] & (1 << (usize::from(prn - 1) & 31))
                != 0
    }
}

impl<T: Transport, H: Handler> Receiver<T, H> {
    /// A `$` arrived: whatever was in flight is abandoned. A sentence
    /// that parsed fully but failed its checksum may have left partial
    /// per-sentence accumulation behind; drop it.
    pub(crate) fn nmea_start_sentence(&mut self) {
        match self.nmea.sentence {
            Sentence::Done(Completed::Gsa) => self.nmea.clear_sv_used(),
            Sentence::Done(Completed::Gsv) => self.nmea.sv_in_view_sentences = 0,
            _ => {},
        }
        self.nmea.sentence = Sentence::Address;
        self.nmea.field = 0;
    }

    /// One comma- or `*`-terminated field.
    pub(crate) fn nmea_parse_field(&mut self, data: &[u8]) {
        match self.nmea.sentence {
            Sentence::Address => self.nmea_address(data),
            Sentence::Skip | Sentence::Done(_) => {},
            Sentence::Gga => self.gga_field(data),
            Sentence::Gsa => self.gsa_field(data),
            Sentence::Gst => self.gst_field(data),
            Sentence::Gsv => self.gsv_field(data),
            Sentence::Rmc => self.rmc_field(data),
            Sentence::Pmtk => self.pmtk_field(data),
        }
    }

    fn nmea_address(&mut self, data: &[u8]) {
        self.nmea.sentence = Sentence::Skip;
        self.nmea.field = 0;

        if data.first() == Some(&b'P') {
            if data == b"PMTK001" {
                self.nmea.sentence = Sentence::Pmtk;
            }
            return;
        }

        if data.len() != 5 || data[0] != b'G' || !matches!(data[1], b'P' | b'L' | b'N') {
            return;
        }
        self.nmea.prefix = data[1];

        match &data[2..5] {
            // A GSA makes sense only within an epoch a GGA opened. The
            // talker is the constellation-setup detector: a single GPGSA
            // or GLGSA means single-constellation operation, GNGSA means
            // a composite fix with a second GNGSA following.
            b"GSA" if self.fusion.seen & SEEN_GGA != 0 => {
                self.nmea.sentence = Sentence::Gsa;
                self.nmea.mask = FIELD_PDOP | FIELD_VDOP;
            },
            // GSV streams are valid from the epoch's GGA until the
            // satellite snapshot ships; GNGSV is not a thing.
            b"GSV" if self.fusion.seen & (SEEN_GGA | SEEN_SOLUTION) != 0 => {
                self.nmea.sentence = Sentence::Gsv;
            },
            b"GGA" => {
                self.nmea.sentence = Sentence::Gga;
                // GSA/GSV are subsequent to a GGA
                self.fusion.seen &= !(SEEN_GGA
                    | SEEN_GSA_GPS
                    | SEEN_GSV_GPS
                    | SEEN_GSA_GLONASS
                    | SEEN_GSV_GLONASS
                    | SEEN_SOLUTION);
                self.nmea.mask = FIELD_POSITION | FIELD_ALTITUDE | FIELD_HDOP;
                self.nmea.sv_in_view_sentences = 0;
                self.nmea.clear_sv_used();
                self.fusion.satellites.count = 0;
            },
            b"GST" => {
                self.nmea.sentence = Sentence::Gst;
                self.fusion.seen &= !(SEEN_GST | SEEN_SOLUTION);
                self.nmea.mask = FIELD_EHPE | FIELD_EVPE;
            },
            b"RMC" => {
                self.nmea.sentence = Sentence::Rmc;
                self.fusion.seen &= !(SEEN_RMC | SEEN_SOLUTION);
                self.nmea.mask = FIELD_TIME | FIELD_SPEED | FIELD_COURSE;
            },
            _ => {},
        }
    }

    /// Timestamp field shared by GGA, GST and RMC. Matching timestamps
    /// across the sentences are the epoch key; a mismatch flushes
    /// everything accumulated so far.
    fn time_field(&mut self, data: &[u8]) {
        if data.is_empty() {
            self.nmea.mask &= !FIELD_TIME;
            return;
        }
        match parse_time(data) {
            Some(t) => {
                if self.fusion.seen & (SEEN_GGA | SEEN_GST | SEEN_RMC) != 0 {
                    let mut incoming = self.fusion.location.time;
                    incoming.hour = t.hour;
                    incoming.minute = t.minute;
                    incoming.second = t.second;
                    incoming.millis = t.millis;
                    if !same_time_of_day(&self.fusion.location.time, &incoming) {
                        self.fusion.restart_epoch();
                    }
                }
                let time = &mut self.fusion.location.time;
                time.hour = t.hour;
                time.minute = t.minute;
                time.second = t.second;
                time.millis = t.millis;
            },
            None => self.nmea.sentence = Sentence::Skip,
        }
    }

    fn gga_field(&mut self, data: &[u8]) {
        let index = self.nmea.field;
        self.nmea.field += 1;

        match index {
            0 => self.time_field(data),
            1 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_POSITION;
                } else if let Some(latitude) = parse_latitude(data) {
                    self.fusion.location.latitude = latitude as i32;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            2 => {
                if self.nmea.mask & FIELD_POSITION != 0 {
                    match data.first() {
                        Some(b'S') => {
                            self.fusion.location.latitude = -self.fusion.location.latitude
                        },
                        Some(b'N') => {},
                        _ => self.nmea.sentence = Sentence::Skip,
                    }
                }
            },
            3 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_POSITION;
                } else if let Some(longitude) = parse_longitude(data) {
                    self.fusion.location.longitude = longitude as i32;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            4 => {
                if self.nmea.mask & FIELD_POSITION != 0 {
                    match data.first() {
                        Some(b'W') => {
                            self.fusion.location.longitude = -self.fusion.location.longitude
                        },
                        Some(b'E') => {},
                        _ => self.nmea.sentence = Sentence::Skip,
                    }
                }
            },
            5 => match parse_unsigned(data) {
                Some(quality) if !data.is_empty() => {
                    self.fusion.location.quality = Quality::from_nmea(quality)
                },
                _ => self.nmea.sentence = Sentence::Skip,
            },
            6 => {}, // satellites used; the GSA list is authoritative
            7 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_HDOP;
                } else if let Some(hdop) = parse_fixed(data, 2) {
                    self.fusion.location.hdop = hdop as u16;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            8 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_ALTITUDE;
                } else if let Some(altitude) = parse_signed_fixed(data, 3) {
                    self.fusion.location.altitude = altitude;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            9 => {
                if self.nmea.mask & FIELD_ALTITUDE != 0 && data.first() != Some(&b'M') {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            10 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_ALTITUDE;
                } else if let Some(separation) = parse_signed_fixed(data, 3) {
                    if self.nmea.mask & FIELD_ALTITUDE != 0 {
                        self.fusion.location.separation = separation;
                    }
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            11 => {
                if self.nmea.mask & FIELD_ALTITUDE != 0 && data.first() != Some(&b'M') {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            12 => {}, // differential age
            13 => self.nmea.sentence = Sentence::Done(Completed::Gga), // differential station
            _ => {},
        }
    }

    fn gsa_field(&mut self, data: &[u8]) {
        let index = self.nmea.field;
        self.nmea.field += 1;

        match index {
            0 => {}, // selection mode
            1 => match data.first() {
                Some(b'1') => self.nmea.navigation = NavMode::None,
                Some(b'2') => self.nmea.navigation = NavMode::TwoD,
                Some(b'3') => self.nmea.navigation = NavMode::ThreeD,
                _ => self.nmea.sentence = Sentence::Skip,
            },
            2..=13 => {
                if !data.is_empty() {
                    match parse_unsigned(data) {
                        Some(svid) => {
                            if (1..=96).contains(&svid) {
                                self.nmea.sv_used_mask[(svid as usize - 1) >> 5] |=
                                    1 << ((svid as usize - 1) & 31);
                                self.nmea.sv_used_count += 1;
                            }
                        },
                        None => {
                            self.nmea.clear_sv_used();
                            self.nmea.sentence = Sentence::Skip;
                        },
                    }
                }
            },
            14 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_PDOP;
                } else if let Some(pdop) = parse_fixed(data, 2) {
                    self.fusion.location.pdop = pdop as u16;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            15 => {}, // hdop; the GGA value is authoritative
            16 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_VDOP;
                    self.nmea.sentence = Sentence::Done(Completed::Gsa);
                } else if let Some(vdop) = parse_fixed(data, 2) {
                    self.fusion.location.vdop = vdop as u16;
                    self.nmea.sentence = Sentence::Done(Completed::Gsa);
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            _ => {},
        }
    }

    fn gst_field(&mut self, data: &[u8]) {
        let index = self.nmea.field;
        self.nmea.field += 1;

        match index {
            0 => self.time_field(data),
            1..=4 => {}, // rms range, stddev major/minor, orientation
            5 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_EHPE;
                } else if let Some(stddev) = parse_fixed(data, 3) {
                    self.fusion.location.ehpe = stddev;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            6 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_EHPE;
                } else if let Some(stddev) = parse_fixed(data, 3) {
                    let ehpe = self.fusion.location.ehpe;
                    self.fusion.location.ehpe = isqrt(
                        ehpe.wrapping_mul(ehpe)
                            .wrapping_add(stddev.wrapping_mul(stddev)),
                    );
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            7 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_EVPE;
                    self.nmea.sentence = Sentence::Done(Completed::Gst);
                } else if let Some(stddev) = parse_fixed(data, 3) {
                    self.fusion.location.evpe = stddev;
                    self.nmea.sentence = Sentence::Done(Completed::Gst);
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            _ => {},
        }
    }

    fn gsv_field(&mut self, data: &[u8]) {
        let index = self.nmea.field;
        self.nmea.field += 1;

        match index {
            0 => match parse_unsigned(data) {
                Some(sentences) if !data.is_empty() => {
                    if self.nmea.sv_in_view_sentences == 0 {
                        self.nmea.sv_in_view_sentences = sentences as u8;
                        self.nmea.sv_in_view_count = 0;
                        self.nmea.sv_in_view_index = 0;
                    } else if u32::from(self.nmea.sv_in_view_sentences) != sentences {
                        self.nmea.sv_in_view_sentences = 0;
                        self.nmea.sentence = Sentence::Skip;
                    }
                },
                _ => self.nmea.sentence = Sentence::Skip,
            },
            1 => match parse_unsigned(data) {
                Some(current) if !data.is_empty() => {
                    // every sentence must continue exactly where the
                    // previous one stopped
                    if u32::from(self.nmea.sv_in_view_index) != (current.wrapping_sub(1)) << 2 {
                        self.nmea.sv_in_view_sentences = 0;
                        self.nmea.sentence = Sentence::Skip;
                    }
                },
                _ => {
                    self.nmea.sv_in_view_sentences = 0;
                    self.nmea.sentence = Sentence::Skip;
                },
            },
            2 => match parse_unsigned(data) {
                Some(count) if !data.is_empty() => {
                    self.nmea.sv_in_view_count = count as u8;
                    if count == 0 {
                        self.nmea.sentence = Sentence::Done(Completed::Gsv);
                    }
                },
                _ => {
                    self.nmea.sv_in_view_sentences = 0;
                    self.nmea.sentence = Sentence::Skip;
                },
            },
            _ => match (index - 3) & 3 {
                0 => {
                    let mut svid: u32 = 255;
                    let parsed = data.is_empty() || {
                        match parse_unsigned(data) {
                            Some(value) => {
                                svid = value;
                                true
                            },
                            None => false,
                        }
                    };
                    if parsed {
                        self.nmea.staged = Satellite {
                            prn: svid as u8,
                            state: SatelliteState::empty(),
                            snr: 0,
                            elevation: 0,
                            azimuth: 0,
                        };
                    } else {
                        self.nmea.sv_in_view_sentences = 0;
                        self.nmea.sentence = Sentence::Skip;
                    }
                },
                1 => match parse_unsigned(data) {
                    Some(elevation) => self.nmea.staged.elevation = elevation as u8,
                    None => {
                        self.nmea.sv_in_view_sentences = 0;
                        self.nmea.sentence = Sentence::Skip;
                    },
                },
                2 => match parse_unsigned(data) {
                    Some(azimuth) => self.nmea.staged.azimuth = azimuth as u16,
                    None => {
                        self.nmea.sv_in_view_sentences = 0;
                        self.nmea.sentence = Sentence::Skip;
                    },
                },
                _ => match parse_unsigned(data) {
                    Some(snr) => {
                        if !data.is_empty() {
                            self.nmea.staged.state = SatelliteState::TRACKING;
                            self.nmea.staged.snr = snr as u8;
                        }
                        let staged = self.nmea.staged;
                        self.fusion.satellites.push(staged);
                        self.nmea.sv_in_view_index += 1;

                        if self.nmea.sv_in_view_index == self.nmea.sv_in_view_count
                            || self.nmea.sv_in_view_index & 3 == 0
                        {
                            self.nmea.sentence = Sentence::Done(Completed::Gsv);
                        }
                    },
                    None => {
                        self.nmea.sv_in_view_sentences = 0;
                        self.nmea.sentence = Sentence::Skip;
                    },
                },
            },
        }
    }

    fn rmc_field(&mut self, data: &[u8]) {
        let index = self.nmea.field;
        self.nmea.field += 1;

        match index {
            0 => self.time_field(data),
            1 => match data.first() {
                Some(b'A') => self.nmea.status_valid = true,
                Some(b'V') => self.nmea.status_valid = false,
                _ => self.nmea.sentence = Sentence::Skip,
            },
            2..=5 => {}, // position; the GGA fields are authoritative
            6 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_SPEED;
                } else if let Some(knots) = parse_fixed(data, 3) {
                    // knots to mm/s is 1852 / 3600, round to nearest
                    self.fusion.location.speed =
                        ((u64::from(knots) * 1852 + 1800) / 3600) as i32;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            7 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_COURSE;
                } else if let Some(course) = parse_fixed(data, 5) {
                    self.fusion.location.course = course as i32;
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            8 => {
                if data.is_empty() {
                    self.nmea.mask &= !FIELD_TIME;
                } else if let Some(date) = parse_unsigned(data) {
                    let day = date / 10_000;
                    let month = (date - day * 10_000) / 100;
                    let year = date - day * 10_000 - month * 100;
                    let time = &mut self.fusion.location.time;
                    time.day = day as u8;
                    time.month = month as u8;
                    // two-digit year, pivoting at 1980
                    time.year = if year < 80 {
                        (2000 + year - 1980) as u8
                    } else {
                        (1900 + year - 1980) as u8
                    };
                } else {
                    self.nmea.sentence = Sentence::Skip;
                }
            },
            9 => {}, // magnetic variation
            10 => self.nmea.sentence = Sentence::Done(Completed::Rmc), // variation hemisphere
            _ => {},
        }
    }

    fn pmtk_field(&mut self, data: &[u8]) {
        let index = self.nmea.field;
        self.nmea.field += 1;

        match index {
            0 => match parse_unsigned(data) {
                Some(command) if !data.is_empty() => self.nmea.mtk_command = command as u16,
                _ => self.nmea.sentence = Sentence::Skip,
            },
            1 => match parse_unsigned(data) {
                Some(status) if !data.is_empty() => {
                    self.nmea.mtk_status = status as u16;
                    self.nmea.sentence = Sentence::Done(Completed::Pmtk);
                },
                _ => self.nmea.sentence = Sentence::Skip,
            },
            _ => {},
        }
    }

    /// The sentence terminator arrived with a valid checksum: fold the
    /// surviving field bits into the location mask, account the sentence
    /// as seen and run the fusion check.
    pub(crate) fn nmea_end_sentence(&mut self) {
        match self.nmea.sentence {
            Sentence::Done(Completed::Gga) => {
                if self.nmea.mask & FIELD_POSITION != 0 {
                    self.fusion.location.mask |= LocationMask::POSITION;
                }
                if self.nmea.mask & FIELD_ALTITUDE != 0 {
                    self.fusion.location.mask |= LocationMask::ALTITUDE;
                }
                if self.nmea.mask & FIELD_HDOP != 0 {
                    self.fusion.location.mask |= LocationMask::HDOP;
                }
                self.fusion.seen |= SEEN_GGA;
                self.fusion.seen &= !SEEN_SOLUTION;
            },
            Sentence::Done(Completed::Gsa) => {
                if self.nmea.mask & FIELD_PDOP != 0 {
                    self.fusion.location.mask |= LocationMask::PDOP;
                }
                if self.nmea.mask & FIELD_VDOP != 0 {
                    self.fusion.location.mask |= LocationMask::VDOP;
                }

                match self.nmea.prefix {
                    // a GN talker announces a composite fix: a second
                    // GNGSA follows, and the constellation comes as
                    // GPGSV plus GLGSV
                    b'N' => {
                        self.fusion.expected |= SEEN_GSA_GPS
                            | SEEN_GSV_GPS
                            | SEEN_GSA_GLONASS
                            | SEEN_GSV_GLONASS;
                        if self.fusion.seen & SEEN_GSA_GPS == 0 {
                            self.fusion.seen |= SEEN_GSA_GPS;
                        } else {
                            self.fusion.seen |= SEEN_GSA_GLONASS;
                            self.fusion.seen &= !SEEN_SOLUTION;
                        }
                    },
                    b'L' => {
                        self.fusion.expected = (self.fusion.expected
                            & !(SEEN_GSA_GPS | SEEN_GSV_GPS))
                            | SEEN_GSA_GLONASS
                            | SEEN_GSV_GLONASS;
                        self.fusion.seen |= SEEN_GSA_GLONASS;
                        self.fusion.seen &= !SEEN_SOLUTION;
                    },
                    _ => {
                        self.fusion.expected = (self.fusion.expected
                            & !(SEEN_GSA_GLONASS | SEEN_GSV_GLONASS))
                            | SEEN_GSA_GPS
                            | SEEN_GSV_GPS;
                        self.fusion.seen |= SEEN_GSA_GPS;
                        self.fusion.seen &= !SEEN_SOLUTION;
                    },
                }
            },
            Sentence::Done(Completed::Gst) => {
                self.fusion.expected |= SEEN_GST;
                if self.nmea.mask & FIELD_EHPE != 0 {
                    self.fusion.location.mask |= LocationMask::EHPE;
                }
                if self.nmea.mask & FIELD_EVPE != 0 {
                    self.fusion.location.mask |= LocationMask::EVPE;
                }
                self.fusion.seen |= SEEN_GST;
                self.fusion.seen &= !SEEN_SOLUTION;
            },
            Sentence::Done(Completed::Gsv) => {
                if self.nmea.sv_in_view_count == self.nmea.sv_in_view_index {
                    self.nmea.sv_in_view_sentences = 0;
                    if self.nmea.prefix == b'P' {
                        self.fusion.seen |= SEEN_GSV_GPS;
                    }
                    if self.nmea.prefix == b'L' {
                        self.fusion.seen |= SEEN_GSV_GLONASS;
                    }
                }
            },
            Sentence::Done(Completed::Rmc) => {
                if self.nmea.mask & FIELD_TIME != 0 {
                    self.fusion.location.mask |= LocationMask::TIME;
                }
                if self.nmea.mask & FIELD_SPEED != 0 {
                    self.fusion.location.mask |= LocationMask::SPEED;
                }
                if self.nmea.mask & FIELD_COURSE != 0 {
                    self.fusion.location.mask |= LocationMask::COURSE;
                }
                self.fusion.seen |= SEEN_RMC;
                self.fusion.seen &= !SEEN_SOLUTION;
            },
            Sentence::Done(Completed::Pmtk) => {
                if self.orch.pending == Some(self.nmea.mtk_command) {
                    self.orch.pending = None;
                    let response = if self.nmea.mtk_status == 3 {
                        Response::Ack
                    } else {
                        Response::Nack
                    };
                    self.mtk_configure(response);
                }
            },
            _ => {},
        }

        self.nmea.sentence = Sentence::Address;
        self.nmea.field = 0;

        if self.orch.init != InitPhase::Done {
            return;
        }

        let expected = self.fusion.expected & NMEA_POSITION_SET;
        if self.fusion.seen & expected == expected {
            if self.nmea.status_valid && self.nmea.navigation != NavMode::None {
                self.fusion.location.fix = match self.nmea.navigation {
                    NavMode::TwoD => FixType::Fix2D,
                    _ => FixType::Fix3D,
                };
                self.fusion.location.numsv = self.nmea.sv_used_count;
            } else {
                self.fusion.location.fix = FixType::None;
                self.fusion.location.numsv = 0;
                self.nmea.clear_sv_used();
            }

            self.emit_location();

            self.fusion.seen &= !NMEA_POSITION_SET;
            self.fusion.seen |= SEEN_SOLUTION;
        }

        let expected = self.fusion.expected & NMEA_CONSTELLATION_SET;
        if self.fusion.seen & SEEN_SOLUTION != 0 && self.fusion.seen & expected == expected {
            let count = self.fusion.satellites.len();
            for satellite in self.fusion.satellites.info[..count].iter_mut() {
                if self.nmea.sv_used(satellite.prn) {
                    satellite.state |= SatelliteState::NAVIGATING;
                }
            }

            self.emit_satellites();

            self.fusion.seen &= !NMEA_CONSTELLATION_SET;
        }
    }
}

/// Fixed-point field with an optional leading minus.
fn parse_signed_fixed(data: &[u8], scale: usize) -> Option<i32> {
    match data.first() {
        Some(b'-') => parse_fixed(&data[1..], scale).map(|value| -(value as i32)),
        _ => parse_fixed(data, scale).map(|value| value as i32),
    }
}
