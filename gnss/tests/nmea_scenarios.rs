//! End-to-end NMEA scenarios: sentence streams in, snapshots out.

mod common;

use common::{receiver, sentence};
use gnss::{FixType, LocationMask, Mode, Quality};

const RMC: &str = "GPRMC,074155.799,A,3723.2475,N,12158.3416,W,0.5,180.0,010118,,";
const GGA: &str = "GPGGA,074155.799,3723.2475,N,12158.3416,W,1,08,0.9,50.0,M,-30.0,M,,";
const GSA: &str = "GPGSA,A,3,01,02,03,,,,,,,,,,1.8,0.9,1.5";
const GSV: &str = "GPGSV,1,1,03,01,40,050,30,02,30,100,25,03,20,150,";

fn feed(receiver: &mut common::TestReceiver, payloads: &[&str]) {
    for payload in payloads {
        receiver.receive(&sentence(payload));
    }
}

#[test]
fn minimal_fix_emits_one_location_then_one_satellite_set() {
    let mut rx = receiver(Mode::Nmea);
    feed(&mut rx, &[RMC, GGA, GSA, GSV]);

    let recorder = rx.handler();
    assert_eq!(recorder.locations.len(), 1);
    assert_eq!(recorder.satellites.len(), 1);

    let location = &recorder.locations[0];
    assert_eq!(location.fix, FixType::Fix3D);
    assert_eq!(location.quality, Quality::Autonomous);
    assert_eq!(location.latitude, 373_874_583);
    assert_eq!(location.longitude, -1_219_723_600);
    assert_eq!(location.altitude, 50_000);
    assert_eq!(location.separation, -30_000);
    assert_eq!(location.speed, 257);
    assert_eq!(location.course, 18_000_000);
    assert_eq!(location.hdop, 90);
    assert_eq!(location.pdop, 180);
    assert_eq!(location.vdop, 150);
    assert_eq!(location.numsv, 3);
    assert_eq!(
        (location.time.calendar_year(), location.time.month, location.time.day),
        (2018, 1, 1)
    );
    assert_eq!(
        (
            location.time.hour,
            location.time.minute,
            location.time.second,
            location.time.millis
        ),
        (7, 41, 55, 799)
    );
    assert_eq!(
        location.mask,
        LocationMask::TIME
            | LocationMask::POSITION
            | LocationMask::ALTITUDE
            | LocationMask::SPEED
            | LocationMask::COURSE
            | LocationMask::HDOP
            | LocationMask::PDOP
            | LocationMask::VDOP
    );
    // absent fields hold their wire defaults
    assert_eq!(location.ehpe, 0);
    assert_eq!(location.correction, 0);

    let satellites = &recorder.satellites[0];
    assert_eq!(satellites.len(), 3);
    let sats = satellites.as_slice();
    assert_eq!((sats[0].prn, sats[0].snr, sats[0].elevation, sats[0].azimuth), (1, 30, 40, 50));
    assert_eq!((sats[1].prn, sats[1].snr), (2, 25));
    assert_eq!((sats[2].prn, sats[2].snr), (3, 0));
    // every PRN listed in the GSA used set navigates, but the third had
    // no SNR and is still searching
    assert!(sats.iter().all(|s| s.state.is_navigating()));
    assert!(sats[0].state.is_tracking());
    assert!(sats[1].state.is_tracking());
    assert!(!sats[2].state.is_tracking());
}

#[test]
fn location_arrives_before_satellites() {
    // the location ships at the GSA (position set complete); the
    // constellation only after the GSV
    let mut rx = receiver(Mode::Nmea);
    feed(&mut rx, &[RMC, GGA, GSA]);
    assert_eq!(rx.handler().locations.len(), 1);
    assert_eq!(rx.handler().satellites.len(), 0);

    feed(&mut rx, &[GSV]);
    assert_eq!(rx.handler().satellites.len(), 1);
}

#[test]
fn second_epoch_emits_again() {
    let mut rx = receiver(Mode::Nmea);
    feed(&mut rx, &[RMC, GGA, GSA, GSV]);
    feed(&mut rx, &[RMC, GGA, GSA, GSV]);
    assert_eq!(rx.handler().locations.len(), 2);
    assert_eq!(rx.handler().satellites.len(), 2);
}

#[test]
fn cross_epoch_timestamp_discards_accumulated_fields() {
    let mut rx = receiver(Mode::Nmea);
    let gga_next_epoch = "GPGGA,074155.800,3723.2475,N,12158.3416,W,1,08,0.9,50.0,M,-30.0,M,,";
    feed(&mut rx, &[RMC, gga_next_epoch, GSA, GSV]);

    assert_eq!(rx.handler().locations.len(), 0);
    assert_eq!(rx.handler().satellites.len(), 0);
}

#[test]
fn corrupted_sentence_contributes_nothing() {
    let mut rx = receiver(Mode::Nmea);
    rx.receive(&sentence(RMC));

    let mut corrupted = sentence(GGA);
    let star = corrupted.iter().position(|&b| b == b'*').unwrap();
    corrupted[star + 1] = if corrupted[star + 1] == b'0' { b'1' } else { b'0' };
    rx.receive(&corrupted);

    feed(&mut rx, &[GSA, GSV]);

    assert_eq!(rx.handler().locations.len(), 0);
    assert_eq!(rx.handler().satellites.len(), 0);
    assert_eq!(rx.stats().nmea_discarded, 1);
}

#[test]
fn byte_by_byte_feeding_matches_bulk() {
    let mut rx = receiver(Mode::Nmea);
    for payload in [RMC, GGA, GSA, GSV] {
        for byte in sentence(payload) {
            rx.receive(&[byte]);
        }
    }
    assert_eq!(rx.handler().locations.len(), 1);
    assert_eq!(rx.handler().satellites.len(), 1);
    assert_eq!(rx.handler().locations[0].latitude, 373_874_583);
}

#[test]
fn oversized_field_resyncs_without_breaking_the_stream() {
    let mut rx = receiver(Mode::Nmea);
    let mut runaway = b"$GPGGA,".to_vec();
    runaway.extend(std::iter::repeat(b'7').take(200));
    rx.receive(&runaway);
    assert_eq!(rx.stats().nmea_discarded, 1);

    feed(&mut rx, &[RMC, GGA, GSA, GSV]);
    assert_eq!(rx.handler().locations.len(), 1);
    assert_eq!(rx.handler().satellites.len(), 1);
}

#[test]
fn dollar_resyncs_out_of_a_truncated_sentence() {
    let mut rx = receiver(Mode::Nmea);
    rx.receive(&sentence(RMC));
    rx.receive(b"$GPGGA,0741"); // truncated, immediately restarted
    feed(&mut rx, &[GGA, GSA, GSV]);
    assert_eq!(rx.handler().locations.len(), 1);
}

#[test]
fn composite_talker_widens_the_expected_set() {
    let mut rx = receiver(Mode::Nmea);
    let gga = "GNGGA,074155.799,3723.2475,N,12158.3416,W,1,08,0.9,50.0,M,-30.0,M,,";
    let rmc = "GNRMC,074155.799,A,3723.2475,N,12158.3416,W,0.5,180.0,010118,,";
    let gsa_gps = "GNGSA,A,3,01,02,03,,,,,,,,,,1.8,0.9,1.5";
    let gsa_glonass = "GNGSA,A,3,65,66,,,,,,,,,,,1.8,0.9,1.5";
    let gsv_gps = "GPGSV,1,1,03,01,40,050,30,02,30,100,25,03,20,150,";
    let gsv_glonass = "GLGSV,1,1,02,65,30,200,28,66,20,250,22";

    feed(&mut rx, &[rmc, gga, gsa_gps, gsa_glonass]);
    assert_eq!(rx.handler().locations.len(), 1);
    // five satellites used across both GSA frames
    assert_eq!(rx.handler().locations[0].numsv, 5);

    // one GSV alone is not the full constellation anymore
    feed(&mut rx, &[gsv_gps]);
    assert_eq!(rx.handler().satellites.len(), 0);

    feed(&mut rx, &[gsv_glonass]);
    assert_eq!(rx.handler().satellites.len(), 1);

    let satellites = &rx.handler().satellites[0];
    assert_eq!(satellites.len(), 5);
    let glonass = &satellites.as_slice()[3];
    assert_eq!(glonass.prn, 65);
    assert!(glonass.state.is_navigating());
}

#[test]
fn out_of_order_gsv_stream_is_discarded() {
    let mut rx = receiver(Mode::Nmea);
    feed(&mut rx, &[RMC, GGA, GSA]);
    assert_eq!(rx.handler().locations.len(), 1);

    // total 3 sentences, sentence 2 skipped
    feed(
        &mut rx,
        &[
            "GPGSV,3,1,09,01,40,050,30,02,30,100,25,03,20,150,18,04,10,200,12",
            "GPGSV,3,3,09,09,05,300,08",
        ],
    );
    assert_eq!(rx.handler().satellites.len(), 0);
}

#[test]
fn multi_sentence_gsv_accumulates_in_order() {
    let mut rx = receiver(Mode::Nmea);
    let gsa = "GPGSA,A,3,01,02,03,04,05,06,,,,,,,1.8,0.9,1.5";
    feed(
        &mut rx,
        &[
            RMC,
            GGA,
            gsa,
            "GPGSV,2,1,06,01,40,050,30,02,30,100,25,03,20,150,20,04,10,200,12",
            "GPGSV,2,2,06,05,05,250,08,06,02,300,",
        ],
    );
    assert_eq!(rx.handler().satellites.len(), 1);
    let satellites = &rx.handler().satellites[0];
    assert_eq!(satellites.len(), 6);
    assert!(satellites.iter().all(|s| s.state.is_navigating()));
}

#[test]
fn invalid_rmc_status_yields_no_fix() {
    let mut rx = receiver(Mode::Nmea);
    let rmc_void = "GPRMC,074155.799,V,3723.2475,N,12158.3416,W,0.5,180.0,010118,,";
    feed(&mut rx, &[rmc_void, GGA, GSA]);

    let recorder = rx.handler();
    assert_eq!(recorder.locations.len(), 1);
    assert_eq!(recorder.locations[0].fix, FixType::None);
    assert_eq!(recorder.locations[0].numsv, 0);
    assert_eq!(recorder.locations[0].mask, LocationMask::empty());
    assert_eq!(recorder.locations[0].latitude, 0);
}

#[test]
fn gst_joins_the_epoch_once_seen() {
    let mut rx = receiver(Mode::Nmea);
    let gst = "GPGST,074155.799,12.0,3.1,2.9,45.0,3.0,4.0,5.0";
    feed(&mut rx, &[RMC, GGA, gst, GSA, GSV]);

    let recorder = rx.handler();
    assert_eq!(recorder.locations.len(), 1);
    let location = &recorder.locations[0];
    // ehpe is the combined lat/lon stddev: sqrt(3000^2 + 4000^2)
    assert_eq!(location.ehpe, 5_000);
    assert_eq!(location.evpe, 5_000);
    assert!(location.mask.contains(LocationMask::EHPE | LocationMask::EVPE));

    // the next epoch now requires a GST as well
    feed(&mut rx, &[RMC, GGA, GSA, GSV]);
    assert_eq!(rx.handler().locations.len(), 1);
}

#[test]
fn ubx_sync_bytes_are_ignored_in_passive_mode() {
    let mut rx = receiver(Mode::Nmea);
    rx.receive(&[0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38]);
    feed(&mut rx, &[RMC, GGA, GSA, GSV]);
    assert_eq!(rx.handler().locations.len(), 1);
}

#[test]
fn satellite_states_reflect_gsa_membership() {
    let mut rx = receiver(Mode::Nmea);
    // PRN 7 is tracked but not used in the solution
    let gsa = "GPGSA,A,3,01,02,,,,,,,,,,,1.8,0.9,1.5";
    let gsv = "GPGSV,1,1,03,01,40,050,30,02,30,100,25,07,20,150,15";
    feed(&mut rx, &[RMC, GGA, gsa, gsv]);

    let satellites = &rx.handler().satellites[0];
    let sats = satellites.as_slice();
    assert!(sats[0].state.is_navigating());
    assert!(sats[1].state.is_navigating());
    assert!(sats[2].state.is_tracking());
    assert!(!sats[2].state.is_navigating());
}
