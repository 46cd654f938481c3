//! Prebuilt UBX command frames and the tables the configuration engine
//! replays. Checksums are embedded; the frames go out verbatim.

/// Fill in the trailing Fletcher-8 of a UBX frame. The frame must start
/// with the sync pair and carry its final length; the checksum covers
/// class, id, length and payload.
pub(crate) fn apply_checksum(frame: &mut [u8]) {
    let count = usize::from(u16::from_le_bytes([frame[4], frame[5]])) + 8;
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for &byte in &frame[2..count - 2] {
        ck_a = ck_a.wrapping_add(byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    frame[count - 2] = ck_a;
    frame[count - 1] = ck_b;
}

// CFG-MSG: one frame per message whose output rate changes. Rates are per
// port (DDC, UART1, UART2, USB, SPI, reserved).

pub(crate) const CFG_MSG_NAV_PVT: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0x01, 0x07, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x19, 0xe7,
];

pub(crate) const CFG_MSG_NAV_TIMEGPS: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0x01, 0x20, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x32, 0x96,
];

pub(crate) const CFG_MSG_NAV_DOP: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0x01, 0x04, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x16, 0xd2,
];

pub(crate) const CFG_MSG_NAV_SVINFO_1HZ: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0x01, 0x30, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x42, 0x06,
];

pub(crate) const CFG_MSG_NAV_SVINFO_5HZ: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0x01, 0x30, 0x05, 0x05, 0x00, 0x00, 0x00, 0x00, 0x4a, 0x32,
];

pub(crate) const CFG_MSG_NAV_SVINFO_10HZ: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0x01, 0x30, 0x0a, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x54, 0x69,
];

pub(crate) const CFG_MSG_NMEA_GGA: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x23,
];

pub(crate) const CFG_MSG_NMEA_GLL: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0xf0, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2a,
];

pub(crate) const CFG_MSG_NMEA_GSA: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0xf0, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x31,
];

pub(crate) const CFG_MSG_NMEA_GSV: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0xf0, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x38,
];

pub(crate) const CFG_MSG_NMEA_RMC: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0xf0, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x3f,
];

pub(crate) const CFG_MSG_NMEA_VTG: &[u8] = &[
    0xb5, 0x62, 0x06, 0x01, 0x08, 0x00, 0xf0, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x46,
];

// CFG-RATE: measurement period (ms), navigation rate, GPS time reference.

pub(crate) const CFG_RATE_1HZ: &[u8] = &[
    0xb5, 0x62, 0x06, 0x08, 0x06, 0x00, 0xe8, 0x03, 0x01, 0x00, 0x01, 0x00, 0x01, 0x39,
];

pub(crate) const CFG_RATE_5HZ: &[u8] = &[
    0xb5, 0x62, 0x06, 0x08, 0x06, 0x00, 0xc8, 0x00, 0x01, 0x00, 0x01, 0x00, 0xde, 0x6a,
];

pub(crate) const CFG_RATE_10HZ: &[u8] = &[
    0xb5, 0x62, 0x06, 0x08, 0x06, 0x00, 0x64, 0x00, 0x01, 0x00, 0x01, 0x00, 0x7a, 0x12,
];

// CFG-TP5: timepulse 0, 1 Hz, 100 ms pulse (916.7 ms locked), rising edge.

pub(crate) const CFG_TP5: &[u8] = &[
    0xb5, 0x62, 0x06, 0x31, 0x20, 0x00, //
    0x00, // timepulse
    0x00, 0x00, 0x00, //
    0x32, 0x00, // antenna cable delay
    0x00, 0x00, // RF group delay
    0x40, 0x42, 0x0f, 0x00, // period
    0x40, 0x42, 0x0f, 0x00, // period locked
    0x40, 0x42, 0x0f, 0x00, // pulse length
    0xa0, 0xbb, 0x0d, 0x00, // pulse length locked
    0x00, 0x00, 0x00, 0x00, // user delay
    0x37, 0x00, 0x00, 0x00, // flags
    0xdb, 0x06,
];

// CFG-PM2: cyclic tracking defaults (1 s update, 10 s search).

pub(crate) const CFG_PM2: &[u8] = &[
    0xb5, 0x62, 0x06, 0x3b, 0x2c, 0x00, //
    0x01, // version
    0x00, 0x00, 0x00, //
    0x00, 0x11, 0x02, 0x00, // flags
    0xe8, 0x03, 0x00, 0x00, // update period
    0x10, 0x27, 0x00, 0x00, // search period
    0x00, 0x00, 0x00, 0x00, // grid offset
    0x00, 0x00, // on time
    0x00, 0x00, // min acq time
    0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0xa3, 0xae,
];

// CFG-GNSS: one config block per constellation toggle.

pub(crate) const CFG_GNSS_SBAS_ENABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x3e, 0x0c, 0x00, 0x00, 0x00, 0xff, 0x01, //
    0x01, 0x01, 0x03, 0x00, 0x01, 0x00, 0x01, 0x00, //
    0x57, 0xd0,
];

pub(crate) const CFG_GNSS_SBAS_DISABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x3e, 0x0c, 0x00, 0x00, 0x00, 0xff, 0x01, //
    0x01, 0x01, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x55, 0xca,
];

pub(crate) const CFG_GNSS_QZSS_ENABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x3e, 0x0c, 0x00, 0x00, 0x00, 0xff, 0x01, //
    0x05, 0x00, 0x03, 0x00, 0x01, 0x00, 0x01, 0x00, //
    0x5a, 0xe9,
];

pub(crate) const CFG_GNSS_QZSS_DISABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x3e, 0x0c, 0x00, 0x00, 0x00, 0xff, 0x01, //
    0x05, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x58, 0xe3,
];

pub(crate) const CFG_GNSS_GLONASS_ENABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x3e, 0x0c, 0x00, 0x00, 0x00, 0xff, 0x01, //
    0x06, 0x08, 0x0e, 0x00, 0x01, 0x00, 0x01, 0x00, //
    0x6e, 0x6b,
];

pub(crate) const CFG_GNSS_GLONASS_DISABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x3e, 0x0c, 0x00, 0x00, 0x00, 0xff, 0x01, //
    0x06, 0x08, 0x0e, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x6c, 0x65,
];

// CFG-SBAS: search/usage configuration beyond the CFG-GNSS toggle.

pub(crate) const CFG_SBAS_DISABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x16, 0x08, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x24, 0x8a,
];

pub(crate) const CFG_SBAS_AUTO: &[u8] = &[
    0xb5, 0x62, 0x06, 0x16, 0x08, 0x00, //
    0x01, 0x03, 0x03, 0x00, 0x89, 0xa3, 0x07, 0x00, //
    0x5e, 0xd4,
];

/// CFG-RXM continuous mode, prefixed with wakeup padding so a receiver in
/// software backup sees edges on the line before the frame starts.
pub(crate) const CFG_RXM_CONTINUOUS: &[u8] = &[
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
    0xb5, 0x62, 0x06, 0x11, 0x02, 0x00, 0x00, 0x00, 0x19, 0x81,
];

pub(crate) const CFG_RXM_POWERSAVE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x11, 0x02, 0x00, 0x00, 0x01, 0x1a, 0x82,
];

/// CFG-CFG: persist the current configuration to battery-backed RAM/flash.
pub(crate) const CFG_SAVE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x09, 0x0d, 0x00, //
    0x00, 0x00, 0x00, 0x00, // clear mask
    0xff, 0xff, 0xff, 0xff, // save mask
    0x00, 0x00, 0x00, 0x00, // load mask
    0x01, // device mask
    0x19, 0x9c,
];

/// RXM-PMREQ: backup indefinitely until an edge on the RX line.
pub(crate) const RXM_PMREQ: &[u8] = &[
    0xb5, 0x62, 0x02, 0x41, 0x08, 0x00, //
    0x00, 0x00, 0x00, 0x00, // duration
    0x02, 0x00, 0x00, 0x00, // flags
    0x4d, 0x3b,
];

// CFG-ANT: external antenna supervisor pin routing.

pub(crate) const CFG_ANT_EXTERNAL_ENABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x13, 0x04, 0x00, 0x00, 0x00, 0xf0, 0xb9, 0xc6, 0x66,
];

pub(crate) const CFG_ANT_EXTERNAL_DISABLE: &[u8] = &[
    0xb5, 0x62, 0x06, 0x13, 0x04, 0x00, 0x01, 0x00, 0xf0, 0xb9, 0xc7, 0x6a,
];

// Receiver bring-up, replayed entry by entry behind ACK gating. The
// SVINFO rate and CFG-RATE entries are the only difference between the
// navigation-rate variants.

pub(crate) const INIT_TABLE_1HZ: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_MSG_NAV_PVT,
    CFG_MSG_NAV_TIMEGPS,
    CFG_MSG_NAV_DOP,
    CFG_MSG_NAV_SVINFO_1HZ,
    CFG_MSG_NMEA_GGA,
    CFG_MSG_NMEA_GLL,
    CFG_MSG_NMEA_GSA,
    CFG_MSG_NMEA_GSV,
    CFG_MSG_NMEA_RMC,
    CFG_MSG_NMEA_VTG,
    CFG_RATE_1HZ,
    CFG_TP5,
    CFG_GNSS_GLONASS_ENABLE,
    CFG_GNSS_SBAS_ENABLE,
    CFG_GNSS_QZSS_DISABLE,
    CFG_SBAS_AUTO,
    CFG_SAVE,
];

pub(crate) const INIT_TABLE_5HZ: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_MSG_NAV_PVT,
    CFG_MSG_NAV_TIMEGPS,
    CFG_MSG_NAV_DOP,
    CFG_MSG_NAV_SVINFO_5HZ,
    CFG_MSG_NMEA_GGA,
    CFG_MSG_NMEA_GLL,
    CFG_MSG_NMEA_GSA,
    CFG_MSG_NMEA_GSV,
    CFG_MSG_NMEA_RMC,
    CFG_MSG_NMEA_VTG,
    CFG_RATE_5HZ,
    CFG_TP5,
    CFG_GNSS_GLONASS_ENABLE,
    CFG_GNSS_SBAS_ENABLE,
    CFG_GNSS_QZSS_DISABLE,
    CFG_SBAS_AUTO,
    CFG_SAVE,
];

pub(crate) const INIT_TABLE_10HZ: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_MSG_NAV_PVT,
    CFG_MSG_NAV_TIMEGPS,
    CFG_MSG_NAV_DOP,
    CFG_MSG_NAV_SVINFO_10HZ,
    CFG_MSG_NMEA_GGA,
    CFG_MSG_NMEA_GLL,
    CFG_MSG_NMEA_GSA,
    CFG_MSG_NMEA_GSV,
    CFG_MSG_NMEA_RMC,
    CFG_MSG_NMEA_VTG,
    CFG_RATE_10HZ,
    CFG_TP5,
    CFG_GNSS_GLONASS_ENABLE,
    CFG_GNSS_SBAS_ENABLE,
    CFG_GNSS_QZSS_DISABLE,
    CFG_SBAS_AUTO,
    CFG_SAVE,
];

pub(crate) const EXTERNAL_ENABLE_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_ANT_EXTERNAL_ENABLE,
    CFG_SAVE,
];

pub(crate) const EXTERNAL_DISABLE_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_ANT_EXTERNAL_DISABLE,
    CFG_SAVE,
];

pub(crate) const CONSTELLATION_GPS_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_GNSS_GLONASS_DISABLE,
    CFG_SAVE,
];

pub(crate) const CONSTELLATION_GPS_GLONASS_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_GNSS_GLONASS_ENABLE,
    CFG_SAVE,
];

pub(crate) const SBAS_ENABLE_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_GNSS_SBAS_ENABLE,
    CFG_SBAS_AUTO,
    CFG_SAVE,
];

pub(crate) const SBAS_DISABLE_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_GNSS_SBAS_DISABLE,
    CFG_SBAS_DISABLE,
    CFG_SAVE,
];

pub(crate) const QZSS_ENABLE_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_GNSS_QZSS_ENABLE,
    CFG_SAVE,
];

pub(crate) const QZSS_DISABLE_TABLE: &[&[u8]] = &[
    CFG_RXM_CONTINUOUS,
    CFG_PM2,
    CFG_GNSS_QZSS_DISABLE,
    CFG_SAVE,
];

/// The `$PUBX,41` sentence switching UART1 to the requested baud rate,
/// NMEA+UBX in, NMEA+UBX out. Sent while the receiver still listens at its
/// power-on rate.
pub(crate) fn baud_sentence(baudrate: u32) -> &'static [u8] {
    if baudrate >= 115_200 {
        b"$PUBX,41,1,0007,0003,115200,0*18\r\n"
    } else if baudrate >= 57_600 {
        b"$PUBX,41,1,0007,0003,57600,0*2B\r\n"
    } else if baudrate >= 38_400 {
        b"$PUBX,41,1,0007,0003,38400,0*20\r\n"
    } else if baudrate >= 19_200 {
        b"$PUBX,41,1,0007,0003,19200,0*25\r\n"
    } else {
        b"$PUBX,41,1,0007,0003,9600,0*10\r\n"
    }
}
