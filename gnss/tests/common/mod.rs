//! In-memory fakes driving the receiver in tests.
#![allow(dead_code)] // each test binary uses its own subset

use gnss::{Config, Handler, Location, Mode, Receiver, SatelliteSet, Transport};

/// Records every transmitted buffer and the timer traffic.
#[derive(Default)]
pub struct FakeTransport {
    pub sent: Vec<Vec<u8>>,
    pub timer_starts: u32,
    pub timer_stops: u32,
    pub timer_armed: bool,
    pub last_timer_ms: u32,
}

impl Transport for FakeTransport {
    fn send(&mut self, data: &[u8]) {
        self.sent.push(data.to_vec());
    }

    fn start_timer(&mut self, ms: u32) {
        self.timer_starts += 1;
        self.timer_armed = true;
        self.last_timer_ms = ms;
    }

    fn stop_timer(&mut self) {
        self.timer_stops += 1;
        self.timer_armed = false;
    }
}

/// Snapshots every callback.
#[derive(Default)]
pub struct Recorder {
    pub locations: Vec<Location>,
    pub satellites: Vec<SatelliteSet>,
}

impl Handler for Recorder {
    fn location(&mut self, location: &Location) {
        self.locations.push(*location);
    }

    fn satellites(&mut self, satellites: &SatelliteSet) {
        self.satellites.push(*satellites);
    }
}

pub type TestReceiver = Receiver<FakeTransport, Recorder>;

pub fn receiver(mode: Mode) -> TestReceiver {
    Receiver::new(
        Config {
            mode,
            rate: 1,
            baudrate: 9_600,
        },
        FakeTransport::default(),
        Recorder::default(),
    )
}

/// Wrap a payload into `$<payload>*XX\r\n` with the checksum computed.
pub fn sentence(payload: &str) -> Vec<u8> {
    let checksum = payload.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("${payload}*{checksum:02X}\r\n").into_bytes()
}

/// Assemble a complete UBX frame around the payload.
pub fn ubx_frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xb5, 0x62, class, id];
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.extend_from_slice(payload);
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for &byte in &frame[2..] {
        ck_a = ck_a.wrapping_add(byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    frame.push(ck_a);
    frame.push(ck_b);
    frame
}

/// The ACK-ACK matching a command frame we captured on the transport
/// (skipping the wakeup padding of the continuous-mode frame).
pub fn ack_for(command: &[u8]) -> Vec<u8> {
    let start = command
        .iter()
        .position(|&byte| byte == 0xb5)
        .expect("not a UBX frame");
    ubx_frame(0x05, 0x01, &[command[start + 2], command[start + 3]])
}

/// Run the u-blox bring-up to completion: settle the baud handshake with
/// one framed sentence, then acknowledge every table entry.
pub fn drive_ubx_init(receiver: &mut TestReceiver) {
    receiver.receive(&sentence("GPTXT,01,01,02,startup"));
    loop {
        let last = receiver
            .transport()
            .sent
            .last()
            .expect("no frame in flight")
            .clone();
        receiver.send_complete();
        let ack = ack_for(&last);
        receiver.receive(&ack);
        if receiver.is_done() {
            break;
        }
    }
}
