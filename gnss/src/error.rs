use core::fmt;

/// Why a frame was discarded by the decoder.
///
/// Framing errors never surface through a callback; the decoder silently
/// resynchronises on the next `$` or sync pair. They are still routed
/// through one place so they can be logged and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A byte outside printable ASCII inside an NMEA sentence payload.
    NmeaChar { byte: u8 },
    /// A field exceeded the sentence scratch buffer.
    NmeaOverflow,
    /// An NMEA checksum digit did not match the running XOR.
    NmeaChecksum { expect: u8, got: u8 },
    /// A sentence passed its checksum but was not CRLF-terminated.
    NmeaTermination { got: u8 },
    /// A `0xB5` was not followed by the second UBX sync char.
    UbxSync { got: u8 },
    /// A UBX frame failed Fletcher-8 validation.
    UbxChecksum { expect: u16, got: u16 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::NmeaChar { byte } => {
                write!(f, "illegal byte 0x{byte:02x} in sentence payload")
            },
            FrameError::NmeaOverflow => f.write_str("sentence field overflows scratch buffer"),
            FrameError::NmeaChecksum { expect, got } => write!(
                f,
                "sentence checksum digit mismatch, expect '{}', got '{}'",
                *expect as char, *got as char
            ),
            FrameError::NmeaTermination { got } => {
                write!(f, "sentence not CRLF-terminated, got 0x{got:02x}")
            },
            FrameError::UbxSync { got } => {
                write!(f, "bad UBX sync, expect 0x62, got 0x{got:02x}")
            },
            FrameError::UbxChecksum { expect, got } => {
                write!(f, "bad UBX checksum, expect 0x{expect:04x}, got 0x{got:04x}")
            },
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}
