use bitflags::bitflags;

/// Calendar time of a fix, UTC.
///
/// `year` counts from 1980 (the GPS epoch), so the representable range is
/// 1980..=2107. `second` may be 60 during a leap second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcTime {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millis: u16,
}

impl UtcTime {
    /// 1980-01-06T00:00:00, the time a receiver reports before it has one.
    pub const GPS_EPOCH: UtcTime = UtcTime {
        year: 0,
        month: 1,
        day: 6,
        hour: 0,
        minute: 0,
        second: 0,
        millis: 0,
    };

    /// Full calendar year.
    pub fn calendar_year(&self) -> u16 {
        1980 + u16::from(self.year)
    }
}

/// Fix dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FixType {
    #[default]
    None,
    TimeOnly,
    Fix2D,
    Fix3D,
}

/// Fix quality, as reported by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quality {
    #[default]
    None,
    Estimated,
    Autonomous,
    Differential,
    RtkFloat,
    RtkFixed,
}

impl Quality {
    /// Map a GGA quality indicator. Codes without a counterpart in the
    /// typed enum (manual input, simulator) map to `None`.
    pub(crate) fn from_nmea(code: u32) -> Quality {
        match code {
            1 => Quality::Autonomous,
            2 => Quality::Differential,
            4 => Quality::RtkFixed,
            5 => Quality::RtkFloat,
            6 => Quality::Estimated,
            _ => Quality::None,
        }
    }
}

bitflags! {
    /// Which fields of a [`Location`] were actually reported this epoch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LocationMask: u16 {
        const TIME       = 0x0001;
        const CORRECTION = 0x0002;
        const POSITION   = 0x0004;
        const ALTITUDE   = 0x0008;
        const SPEED      = 0x0010;
        const COURSE     = 0x0020;
        const CLIMB      = 0x0040;
        const EHPE       = 0x0080;
        const EVPE       = 0x0100;
        const PDOP       = 0x0200;
        const HDOP       = 0x0400;
        const VDOP       = 0x0800;
    }
}

/// One complete position/time snapshot, rebuilt for every emission.
///
/// Scaled integer units throughout: latitude/longitude in 1e-7 degrees,
/// altitude/separation/climb in millimeters, speed in mm/s, course in 1e-5
/// degrees, ehpe/evpe in millimeters, DOPs in hundredths. `correction` is
/// the GPS-UTC leap second count. Fields whose bit is missing from `mask`
/// hold their wire default (DOPs 9999, everything else zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub fix: FixType,
    pub quality: Quality,
    pub mask: LocationMask,
    pub numsv: u8,
    pub latitude: i32,
    pub longitude: i32,
    pub altitude: i32,
    pub separation: i32,
    pub speed: i32,
    pub course: i32,
    pub climb: i32,
    pub ehpe: u32,
    pub evpe: u32,
    pub pdop: u16,
    pub hdop: u16,
    pub vdop: u16,
    pub correction: i16,
    pub time: UtcTime,
}

impl Default for Location {
    fn default() -> Self {
        Location {
            fix: FixType::None,
            quality: Quality::None,
            mask: LocationMask::empty(),
            numsv: 0,
            latitude: 0,
            longitude: 0,
            altitude: 0,
            separation: 0,
            speed: 0,
            course: 0,
            climb: 0,
            ehpe: 0,
            evpe: 0,
            pdop: 9999,
            hdop: 9999,
            vdop: 9999,
            correction: 0,
            time: UtcTime::GPS_EPOCH,
        }
    }
}

bitflags! {
    /// Per-satellite tracking state. An empty set means the receiver is
    /// still searching for the signal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SatelliteState: u8 {
        const TRACKING   = 0x01;
        const NAVIGATING = 0x02;
        const CORRECTION = 0x04;
    }
}

impl SatelliteState {
    pub fn is_tracking(&self) -> bool {
        self.contains(SatelliteState::TRACKING)
    }

    pub fn is_navigating(&self) -> bool {
        self.contains(SatelliteState::NAVIGATING)
    }
}

/// One satellite of the current constellation view.
///
/// `prn` is the canonical satellite number (1..=255) after constellation
/// mapping; elevation and azimuth are whole degrees, `snr` is dB-Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Satellite {
    pub prn: u8,
    pub state: SatelliteState,
    pub snr: u8,
    pub elevation: u8,
    pub azimuth: u16,
}

/// Upper bound on satellites reported per constellation snapshot.
pub const SATELLITES_COUNT_MAX: usize = 32;

/// Bounded satellite list, rebuilt for every emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatelliteSet {
    pub(crate) info: [Satellite; SATELLITES_COUNT_MAX],
    pub(crate) count: u8,
}

impl Default for SatelliteSet {
    fn default() -> Self {
        SatelliteSet {
            info: [Satellite::default(); SATELLITES_COUNT_MAX],
            count: 0,
        }
    }
}

impl SatelliteSet {
    pub fn len(&self) -> usize {
        usize::from(self.count)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[Satellite] {
        &self.info[..self.len()]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Satellite> {
        self.as_slice().iter()
    }

    /// Append a satellite, silently dropping it once the set is full.
    pub(crate) fn push(&mut self, satellite: Satellite) {
        if self.len() < SATELLITES_COUNT_MAX {
            self.info[self.len()] = satellite;
            self.count += 1;
        }
    }
}

impl<'a> IntoIterator for &'a SatelliteSet {
    type Item = &'a Satellite;
    type IntoIter = core::slice::Iter<'a, Satellite>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

bitflags! {
    /// Constellations selectable through [`set_constellation`].
    ///
    /// [`set_constellation`]: crate::Receiver::set_constellation
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Constellation: u32 {
        const GPS     = 0x01;
        const GLONASS = 0x02;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_mapping_covers_gga_codes() {
        assert_eq!(Quality::from_nmea(0), Quality::None);
        assert_eq!(Quality::from_nmea(1), Quality::Autonomous);
        assert_eq!(Quality::from_nmea(2), Quality::Differential);
        assert_eq!(Quality::from_nmea(4), Quality::RtkFixed);
        assert_eq!(Quality::from_nmea(5), Quality::RtkFloat);
        assert_eq!(Quality::from_nmea(6), Quality::Estimated);
        // manual and simulator inputs have no typed counterpart
        assert_eq!(Quality::from_nmea(7), Quality::None);
        assert_eq!(Quality::from_nmea(8), Quality::None);
    }

    #[test]
    fn satellite_set_is_bounded() {
        let mut set = SatelliteSet::default();
        for prn in 1..=(SATELLITES_COUNT_MAX as u8 + 8) {
            set.push(Satellite {
                prn,
                ..Satellite::default()
            });
        }
        assert_eq!(set.len(), SATELLITES_COUNT_MAX);
        assert_eq!(set.as_slice().last().map(|s| s.prn), Some(32));
    }

    #[test]
    fn default_location_reports_wire_defaults() {
        let location = Location::default();
        assert_eq!(location.pdop, 9999);
        assert_eq!(location.hdop, 9999);
        assert_eq!(location.vdop, 9999);
        assert_eq!(location.time, UtcTime::GPS_EPOCH);
        assert_eq!(location.time.calendar_year(), 1980);
    }
}
