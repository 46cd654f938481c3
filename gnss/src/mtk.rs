//! Prebuilt `$PMTK` command sentences for Mediatek receivers. Checksums
//! are embedded; the sentences go out verbatim and are acknowledged by
//! `$PMTK001` replies echoing the command number.

pub(crate) const INIT_TABLE_1HZ: &[&[u8]] = &[
    b"$PMTK314,0,1,0,1,1,1,1,1,0,0,0,0,0,0,0,0,0,0,0*28\r\n", // sentence rates
    b"$PMTK220,1000*1F\r\n",                                  // position fix period
    b"$PMTK300,1000,0,0,0,0*1C\r\n",                          // fix control
    b"$PMTK286,1*23\r\n",                                     // active interference cancellation
    b"$PMTK397,0*23\r\n",                                     // nav speed threshold off
];

pub(crate) const INIT_TABLE_5HZ: &[&[u8]] = &[
    b"$PMTK314,0,1,0,1,1,5,1,1,0,0,0,0,0,0,0,0,0,0,0*2C\r\n",
    b"$PMTK220,200*2C\r\n",
    b"$PMTK300,200,0,0,0,0*2F\r\n",
    b"$PMTK286,1*23\r\n",
    b"$PMTK397,0*23\r\n",
];

pub(crate) const CONSTELLATION_GPS_GLONASS_TABLE: &[&[u8]] = &[b"$PMTK353,1,1*37\r\n"];

pub(crate) const CONSTELLATION_GPS_TABLE: &[&[u8]] = &[b"$PMTK353,1,0*36\r\n"];

pub(crate) const SBAS_ENABLE_TABLE: &[&[u8]] = &[
    b"$PMTK301,2*2E\r\n", // DGPS mode SBAS
    b"$PMTK313,1*2E\r\n", // SBAS search on
];

pub(crate) const SBAS_DISABLE_TABLE: &[&[u8]] = &[
    b"$PMTK301,0*2C\r\n", //
    b"$PMTK313,0*2F\r\n",
];

pub(crate) const QZSS_ENABLE_TABLE: &[&[u8]] = &[
    b"$PMTK351,0*29\r\n", // QZSS NMEA output off
    b"$PMTK352,0*2A\r\n", // QZSS search on
];

pub(crate) const QZSS_DISABLE_TABLE: &[&[u8]] = &[
    b"$PMTK351,0*29\r\n", //
    b"$PMTK352,1*2B\r\n",
];

/// The `$PMTK251` sentence switching the UART to the requested baud rate,
/// sent while the receiver still listens at its power-on rate.
pub(crate) fn baud_sentence(baudrate: u32) -> &'static [u8] {
    if baudrate >= 115_200 {
        b"$PMTK251,115200*1F\r\n"
    } else if baudrate >= 57_600 {
        b"$PMTK251,57600*2C\r\n"
    } else if baudrate >= 38_400 {
        b"$PMTK251,38400*27\r\n"
    } else if baudrate >= 19_200 {
        b"$PMTK251,19200*22\r\n"
    } else {
        b"$PMTK251,9600*17\r\n"
    }
}

/// The three-digit command number after `$PMTK`, matched against the
/// number echoed in a `$PMTK001` acknowledgement.
pub(crate) fn command_number(sentence: &[u8]) -> u16 {
    (u16::from(sentence[5] - b'0') * 10 + u16::from(sentence[6] - b'0')) * 10
        + u16::from(sentence[7] - b'0')
}
