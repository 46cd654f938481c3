//! Epoch fusion: accounting of which sentences/messages of the current
//! epoch have been seen, and assembly of the outgoing snapshots.

use crate::types::{FixType, Location, LocationMask, Quality, SatelliteSet, UtcTime};

// One bit per sentence / message kind contributing to an epoch. The low
// half is NMEA, the high half UBX; SOLUTION gates the satellite snapshot
// behind the location emission of the same epoch.
pub(crate) const SEEN_GGA: u32 = 0x0000_0001;
pub(crate) const SEEN_GSA_GPS: u32 = 0x0000_0002;
pub(crate) const SEEN_GST: u32 = 0x0000_0004;
pub(crate) const SEEN_GSV_GPS: u32 = 0x0000_0008;
pub(crate) const SEEN_RMC: u32 = 0x0000_0010;
pub(crate) const SEEN_GSA_GLONASS: u32 = 0x0000_0020;
pub(crate) const SEEN_GSV_GLONASS: u32 = 0x0000_0040;
pub(crate) const SEEN_SOLUTION: u32 = 0x0000_8000;
pub(crate) const SEEN_NAV_DOP: u32 = 0x0001_0000;
pub(crate) const SEEN_NAV_PVT: u32 = 0x0004_0000;
pub(crate) const SEEN_NAV_SVINFO: u32 = 0x0010_0000;
pub(crate) const SEEN_NAV_TIMEGPS: u32 = 0x0020_0000;

/// The NMEA sentences whose union forms a position fix.
pub(crate) const NMEA_POSITION_SET: u32 =
    SEEN_GGA | SEEN_GSA_GPS | SEEN_GST | SEEN_RMC | SEEN_GSA_GLONASS;
/// The NMEA sentences carrying the satellite constellation.
pub(crate) const NMEA_CONSTELLATION_SET: u32 = SEEN_GSV_GPS | SEEN_GSV_GLONASS;
/// Default expectation before any GSA narrowed or widened it.
pub(crate) const NMEA_DEFAULT_EXPECTED: u32 =
    SEEN_GGA | SEEN_GSA_GPS | SEEN_GSV_GPS | SEEN_RMC;

/// The UBX messages whose union forms a position fix.
pub(crate) const UBX_POSITION_SET: u32 = SEEN_NAV_DOP | SEEN_NAV_PVT | SEEN_NAV_TIMEGPS;
/// Expectation once the init table completed.
pub(crate) const UBX_EXPECTED: u32 =
    SEEN_NAV_DOP | SEEN_NAV_PVT | SEEN_NAV_SVINFO | SEEN_NAV_TIMEGPS;

/// Working epoch accumulator. `location` and `satellites` are filled field
/// by field as frames terminate; `seen`/`expected` decide when they ship.
#[derive(Default)]
pub(crate) struct Fusion {
    pub seen: u32,
    pub expected: u32,
    pub location: Location,
    pub satellites: SatelliteSet,
}

impl Fusion {
    /// Drop every accumulated field and restart the epoch.
    pub fn restart_epoch(&mut self) {
        self.seen = 0;
        self.location.fix = FixType::None;
        self.location.mask = LocationMask::empty();
    }

    /// Clear the fix accumulator without touching `seen`.
    pub fn reset_location(&mut self) {
        self.location.fix = FixType::None;
        self.location.mask = LocationMask::empty();
    }
}

/// Narrow the mask to what the fix type can carry and substitute wire
/// defaults for everything absent, then leave the snapshot ready for the
/// callback.
pub(crate) fn finalize_location(location: &mut Location) {
    match location.fix {
        FixType::None => {
            location.mask = LocationMask::empty();
            location.numsv = 0;
            location.quality = Quality::None;
        },
        FixType::TimeOnly => {
            location.mask &= LocationMask::TIME | LocationMask::CORRECTION;
            location.quality = Quality::None;
        },
        FixType::Fix2D => {
            location.mask &= LocationMask::TIME
                | LocationMask::CORRECTION
                | LocationMask::POSITION
                | LocationMask::SPEED
                | LocationMask::COURSE
                | LocationMask::EHPE
                | LocationMask::HDOP;
        },
        FixType::Fix3D => {},
    }

    if location.mask.contains(LocationMask::TIME) {
        if !location.mask.contains(LocationMask::CORRECTION) {
            location.correction = 0;
        }
    } else {
        location.time = UtcTime::GPS_EPOCH;
        location.correction = 0;
        location.mask = LocationMask::empty();
        location.numsv = 0;
    }

    if !location.mask.contains(LocationMask::POSITION) {
        location.latitude = 0;
        location.longitude = 0;
    }
    if !location.mask.contains(LocationMask::ALTITUDE) {
        location.altitude = 0;
        location.separation = 0;
    }
    if !location.mask.contains(LocationMask::SPEED) {
        location.speed = 0;
    }
    if !location.mask.contains(LocationMask::COURSE) {
        location.course = 0;
    }
    if !location.mask.contains(LocationMask::CLIMB) {
        location.climb = 0;
    }
    if !location.mask.contains(LocationMask::EHPE) {
        location.ehpe = 0;
    }
    if !location.mask.contains(LocationMask::EVPE) {
        location.evpe = 0;
    }
    if !location.mask.contains(LocationMask::PDOP) {
        location.pdop = 9999;
    }
    if !location.mask.contains(LocationMask::HDOP) {
        location.hdop = 9999;
    }
    if !location.mask.contains(LocationMask::VDOP) {
        location.vdop = 9999;
    }
}
