//! End-to-end UBX scenarios: NAV message fusion per itow epoch.

mod common;

use common::{drive_ubx_init, receiver, ubx_frame, TestReceiver};
use gnss::{FixType, LocationMask, Mode, Quality};

const ITOW: u32 = 123_456_000;

fn nav_pvt(itow: u32) -> Vec<u8> {
    let mut payload = [0u8; 84];
    payload[0..4].copy_from_slice(&itow.to_le_bytes());
    payload[4..6].copy_from_slice(&2018u16.to_le_bytes()); // year
    payload[6] = 1; // month
    payload[7] = 1; // day
    payload[8] = 7; // hour
    payload[9] = 41; // min
    payload[10] = 55; // sec
    payload[11] = 0x07; // valid date, time, fully resolved
    payload[16..20].copy_from_slice(&799_000_000i32.to_le_bytes()); // nano
    payload[20] = 0x03; // 3D fix
    payload[21] = 0x01; // gnssFixOK
    payload[23] = 8; // numSV
    payload[24..28].copy_from_slice(&(-1_219_723_600i32).to_le_bytes()); // lon
    payload[28..32].copy_from_slice(&373_874_583i32.to_le_bytes()); // lat
    payload[32..36].copy_from_slice(&20_000i32.to_le_bytes()); // height
    payload[36..40].copy_from_slice(&50_000i32.to_le_bytes()); // hMSL
    payload[40..44].copy_from_slice(&5_000u32.to_le_bytes()); // hAcc
    payload[44..48].copy_from_slice(&8_000u32.to_le_bytes()); // vAcc
    payload[56..60].copy_from_slice(&(-120i32).to_le_bytes()); // velD
    payload[60..64].copy_from_slice(&257i32.to_le_bytes()); // gSpeed
    payload[64..68].copy_from_slice(&18_000_000i32.to_le_bytes()); // headMot
    ubx_frame(0x01, 0x07, &payload)
}

fn nav_dop(itow: u32) -> Vec<u8> {
    let mut payload = [0u8; 18];
    payload[0..4].copy_from_slice(&itow.to_le_bytes());
    payload[6..8].copy_from_slice(&180u16.to_le_bytes()); // pDOP
    payload[10..12].copy_from_slice(&150u16.to_le_bytes()); // vDOP
    payload[12..14].copy_from_slice(&90u16.to_le_bytes()); // hDOP
    ubx_frame(0x01, 0x04, &payload)
}

fn nav_timegps(itow: u32) -> Vec<u8> {
    let mut payload = [0u8; 16];
    payload[0..4].copy_from_slice(&itow.to_le_bytes());
    payload[8..10].copy_from_slice(&1982u16.to_le_bytes()); // week
    payload[10] = 18; // leap seconds
    payload[11] = 0x07; // tow, week, leap valid
    ubx_frame(0x01, 0x20, &payload)
}

fn nav_svinfo(itow: u32, records: &[(u8, u8, u8, u8, i8, i16)]) -> Vec<u8> {
    let mut payload = vec![0u8; 8 + records.len() * 12];
    payload[0..4].copy_from_slice(&itow.to_le_bytes());
    payload[4] = records.len() as u8;
    for (index, &(svid, flags, quality, cno, elev, azim)) in records.iter().enumerate() {
        let record = &mut payload[8 + index * 12..8 + (index + 1) * 12];
        record[0] = index as u8; // channel
        record[1] = svid;
        record[2] = flags;
        record[3] = quality;
        record[4] = cno;
        record[5] = elev as u8;
        record[6..8].copy_from_slice(&azim.to_le_bytes());
    }
    ubx_frame(0x01, 0x30, &payload)
}

fn configured() -> TestReceiver {
    let mut rx = receiver(Mode::Ublox);
    drive_ubx_init(&mut rx);
    rx
}

#[test]
fn pvt_dop_timegps_svinfo_fuse_into_one_epoch() {
    let mut rx = configured();

    rx.receive(&nav_pvt(ITOW));
    rx.receive(&nav_dop(ITOW));
    assert_eq!(rx.handler().locations.len(), 0);

    rx.receive(&nav_timegps(ITOW));
    assert_eq!(rx.handler().locations.len(), 1);
    assert_eq!(rx.handler().satellites.len(), 0);

    rx.receive(&nav_svinfo(
        ITOW,
        &[
            (5, 0x01, 0x07, 45, 60, 120),
            (130, 0x02, 0x04, 38, 25, 300),
        ],
    ));
    assert_eq!(rx.handler().satellites.len(), 1);

    let location = &rx.handler().locations[0];
    assert_eq!(location.fix, FixType::Fix3D);
    assert_eq!(location.quality, Quality::Autonomous);
    assert_eq!(location.latitude, 373_874_583);
    assert_eq!(location.longitude, -1_219_723_600);
    assert_eq!(location.altitude, 50_000);
    assert_eq!(location.separation, -30_000); // height above ellipsoid minus MSL
    assert_eq!(location.speed, 257);
    assert_eq!(location.course, 18_000_000);
    assert_eq!(location.climb, 120);
    assert_eq!(location.ehpe, 5_000);
    assert_eq!(location.evpe, 8_000);
    assert_eq!((location.pdop, location.hdop, location.vdop), (180, 90, 150));
    assert_eq!(location.numsv, 8);
    assert_eq!(location.correction, 18);
    assert!(location
        .mask
        .contains(LocationMask::TIME | LocationMask::CORRECTION | LocationMask::CLIMB));
    assert_eq!(
        (location.time.calendar_year(), location.time.month, location.time.day),
        (2018, 1, 1)
    );
    assert_eq!(
        (location.time.hour, location.time.minute, location.time.second, location.time.millis),
        (7, 41, 55, 799)
    );

    let satellites = &rx.handler().satellites[0];
    assert_eq!(satellites.len(), 2);
    let sats = satellites.as_slice();
    assert_eq!((sats[0].prn, sats[0].snr, sats[0].elevation, sats[0].azimuth), (5, 45, 60, 120));
    assert!(sats[0].state.is_tracking());
    assert!(sats[0].state.is_navigating());
    // SBAS id 130 maps to canonical PRN 43
    assert_eq!(sats[1].prn, 43);
    assert!(sats[1].state.is_tracking());
    assert!(!sats[1].state.is_navigating());
}

#[test]
fn itow_mismatch_restarts_the_epoch() {
    let mut rx = configured();

    rx.receive(&nav_pvt(ITOW));
    rx.receive(&nav_dop(ITOW + 1_000));
    rx.receive(&nav_timegps(ITOW + 1_000));
    // the PVT belonged to the stale epoch and was flushed
    assert_eq!(rx.handler().locations.len(), 0);

    rx.receive(&nav_pvt(ITOW + 1_000));
    assert_eq!(rx.handler().locations.len(), 1);
}

#[test]
fn corrupted_frame_contributes_nothing() {
    let mut rx = configured();

    let mut pvt = nav_pvt(ITOW);
    let last = pvt.len() - 1;
    pvt[last] = pvt[last].wrapping_add(1);
    rx.receive(&pvt);
    assert_eq!(rx.stats().ubx_discarded, 1);

    rx.receive(&nav_dop(ITOW));
    rx.receive(&nav_timegps(ITOW));
    rx.receive(&nav_svinfo(ITOW, &[(5, 0x01, 0x07, 45, 60, 120)]));

    assert_eq!(rx.handler().locations.len(), 0);
    assert_eq!(rx.handler().satellites.len(), 0);
}

#[test]
fn svinfo_streams_records_beyond_the_scratch_window() {
    // 16 records make a 200-byte payload, twice the scratch buffer; the
    // chunked reader must still capture every satellite
    let mut rx = configured();

    let records: Vec<(u8, u8, u8, u8, i8, i16)> =
        (1..=16).map(|prn| (prn, 0x01, 0x04, 40, 45, 90)).collect();
    rx.receive(&nav_pvt(ITOW));
    rx.receive(&nav_dop(ITOW));
    rx.receive(&nav_timegps(ITOW));
    rx.receive(&nav_svinfo(ITOW, &records));

    assert_eq!(rx.handler().satellites.len(), 1);
    let satellites = &rx.handler().satellites[0];
    assert_eq!(satellites.len(), 16);
    assert!(satellites.iter().all(|s| s.state.is_tracking()));
    assert_eq!(satellites.as_slice()[15].prn, 16);
}

#[test]
fn unassigned_svinfo_ids_are_dropped() {
    let mut rx = configured();

    rx.receive(&nav_pvt(ITOW));
    rx.receive(&nav_dop(ITOW));
    rx.receive(&nav_timegps(ITOW));
    rx.receive(&nav_svinfo(
        ITOW,
        &[(99, 0x00, 0x00, 0, 0, 0), (7, 0x01, 0x05, 33, 10, 45)],
    ));

    let satellites = &rx.handler().satellites[0];
    assert_eq!(satellites.len(), 1);
    assert_eq!(satellites.as_slice()[0].prn, 7);
}

#[test]
fn negative_elevation_is_zeroed() {
    let mut rx = configured();

    rx.receive(&nav_pvt(ITOW));
    rx.receive(&nav_dop(ITOW));
    rx.receive(&nav_timegps(ITOW));
    rx.receive(&nav_svinfo(ITOW, &[(9, 0x00, 0x06, 41, -5, 270)]));

    let sats = &rx.handler().satellites[0];
    assert_eq!(sats.as_slice()[0].elevation, 0);
    assert_eq!(sats.as_slice()[0].azimuth, 0);
}

#[test]
fn time_only_fix_carries_no_position() {
    let mut rx = configured();

    let mut pvt = nav_pvt(ITOW);
    // fix type: time only (offset 20 of the payload, 6 of the frame)
    pvt[6 + 20] = 0x05;
    let patched = {
        let payload = &pvt[6..6 + 84];
        ubx_frame(0x01, 0x07, payload)
    };
    rx.receive(&patched);
    rx.receive(&nav_dop(ITOW));
    rx.receive(&nav_timegps(ITOW));

    let location = &rx.handler().locations[0];
    assert_eq!(location.fix, FixType::TimeOnly);
    assert_eq!(location.latitude, 0);
    assert_eq!(location.pdop, 9999);
    assert_eq!(location.correction, 18);
    assert_eq!(location.time.calendar_year(), 2018);
}

#[test]
fn second_epoch_fuses_independently() {
    let mut rx = configured();

    for offset in [0, 1_000] {
        rx.receive(&nav_pvt(ITOW + offset));
        rx.receive(&nav_dop(ITOW + offset));
        rx.receive(&nav_timegps(ITOW + offset));
        rx.receive(&nav_svinfo(ITOW + offset, &[(5, 0x01, 0x07, 45, 60, 120)]));
    }

    assert_eq!(rx.handler().locations.len(), 2);
    assert_eq!(rx.handler().satellites.len(), 2);
}
