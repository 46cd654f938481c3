//! Configuration orchestrator: replays command tables against the
//! receiver, gated on acknowledgements, with timeout-driven resend for the
//! u-blox side.

use log::{debug, warn};

use crate::fusion::{NMEA_DEFAULT_EXPECTED, UBX_EXPECTED};
use crate::mtk;
use crate::receiver::{Handler, Receiver, Transport};
use crate::ubx::{frames, SYNC_CHAR_1};

/// Resend window for an unacknowledged u-blox command.
pub(crate) const ACK_TIMEOUT_MS: u32 = 250;

/// Scratch space for dynamically built frames (CFG-PM2 is the largest).
pub(crate) const TX_DATA_SIZE: usize = 64;

/// Pending-command id for the wakeup-padded CFG-RXM frame, whose class/id
/// cannot be read from the frame head.
const CFG_RXM_COMMAND: u16 = 0x0611;

/// Progress of the bring-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum InitPhase {
    #[default]
    Done,
    MtkBaudRate,
    MtkInitTable,
    UbxBaudRate,
    UbxInitTable,
}

/// What moved the table forward; log flavour only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Response {
    Ack,
    Nack,
    Sentence,
    Message,
}

/// One table entry: a prebuilt frame, or the frame assembled in the
/// scratch buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Entry {
    Frame(&'static [u8]),
    Scratch,
}

enum Entries {
    Static(&'static [&'static [u8]]),
    Built { entries: [Entry; 4], len: u8 },
}

/// Cursor over the table in progress. `index` addresses the next entry to
/// transmit; the entry before it is the one awaiting acknowledgement.
pub(crate) struct Table {
    entries: Entries,
    index: u8,
}

impl Table {
    pub(crate) fn of(entries: &'static [&'static [u8]]) -> Table {
        Table {
            entries: Entries::Static(entries),
            index: 0,
        }
    }

    pub(crate) fn built(entries: [Entry; 4], len: u8) -> Table {
        Table {
            entries: Entries::Built { entries, len },
            index: 0,
        }
    }

    fn get(&self, index: u8) -> Option<Entry> {
        match &self.entries {
            Entries::Static(entries) => {
                entries.get(usize::from(index)).copied().map(Entry::Frame)
            },
            Entries::Built { entries, len } => {
                (index < *len).then(|| entries[usize::from(index)])
            },
        }
    }

    pub(crate) fn take_next(&mut self) -> Option<Entry> {
        let entry = self.get(self.index)?;
        self.index += 1;
        Some(entry)
    }

    /// The entry transmitted last, for resend.
    pub(crate) fn current(&self) -> Option<Entry> {
        self.index.checked_sub(1).and_then(|index| self.get(index))
    }
}

/// Transmit-side state: table in progress, the command awaiting its
/// acknowledgement, and whether the transport still owns a buffer.
pub(crate) struct Orchestrator {
    pub init: InitPhase,
    pub table: Option<Table>,
    pub pending: Option<u16>,
    pub busy: bool,
    pub tx_data: [u8; TX_DATA_SIZE],
}

impl Default for Orchestrator {
    fn default() -> Self {
        Orchestrator {
            init: InitPhase::Done,
            table: None,
            pending: None,
            busy: false,
            tx_data: [0; TX_DATA_SIZE],
        }
    }
}

impl<T: Transport, H: Handler> Receiver<T, H> {
    pub(crate) fn mtk_send(&mut self, data: &'static [u8]) {
        self.orch.pending = Some(mtk::command_number(data));
        self.orch.busy = true;
        self.transport.send(data);
    }

    pub(crate) fn mtk_table(&mut self, table: &'static [&'static [u8]]) {
        let mut table = Table::of(table);
        if let Some(Entry::Frame(data)) = table.take_next() {
            self.orch.table = Some(table);
            self.mtk_send(data);
        }
    }

    /// Advance the Mediatek table: on the baud handshake, any valid
    /// sentence moves to the replay phase; afterwards each PMTK001 moves
    /// to the next entry, ACK and NACK alike.
    pub(crate) fn mtk_configure(&mut self, response: Response) {
        if response == Response::Nack {
            warn!("command rejected, skipping");
        }

        let mut next = None;
        if let Some(table) = self.orch.table.as_mut() {
            if self.orch.init == InitPhase::MtkBaudRate {
                self.orch.init = InitPhase::MtkInitTable;
                debug!("baud rate settled, replaying init table");
                next = table.take_next();
            } else if let Some(entry) = table.take_next() {
                next = Some(entry);
            } else {
                self.orch.table = None;
                if self.orch.init == InitPhase::MtkInitTable {
                    self.orch.init = InitPhase::Done;
                    self.fusion.seen = 0;
                    self.fusion.expected = NMEA_DEFAULT_EXPECTED;
                    self.fusion.reset_location();
                    debug!("init table complete");
                }
            }
        }

        if let Some(Entry::Frame(data)) = next {
            self.mtk_send(data);
        }
    }

    pub(crate) fn ubx_send(&mut self, entry: Entry) {
        match entry {
            Entry::Frame(data) => {
                let command = if data[0] == SYNC_CHAR_1 {
                    u16::from(data[2]) << 8 | u16::from(data[3])
                } else {
                    CFG_RXM_COMMAND
                };
                self.orch.pending = Some(command);
                self.orch.busy = true;
                self.transport.send(data);
            },
            Entry::Scratch => {
                let count =
                    usize::from(u16::from_le_bytes([self.orch.tx_data[4], self.orch.tx_data[5]]))
                        + 8;
                let command =
                    u16::from(self.orch.tx_data[2]) << 8 | u16::from(self.orch.tx_data[3]);
                self.orch.pending = Some(command);
                self.orch.busy = true;
                self.transport.send(&self.orch.tx_data[..count]);
            },
        }
    }

    /// Transmit a table entry and arm the resend window.
    pub(crate) fn ubx_dispatch(&mut self, entry: Entry) {
        self.ubx_send(entry);
        self.transport.start_timer(ACK_TIMEOUT_MS);
    }

    pub(crate) fn ubx_table(&mut self, table: &'static [&'static [u8]]) {
        let mut table = Table::of(table);
        if let Some(entry) = table.take_next() {
            self.orch.table = Some(table);
            self.ubx_dispatch(entry);
        }
    }

    /// Advance the u-blox table: on the baud handshake, any valid frame
    /// moves to the replay phase; afterwards each matching ACK-ACK or
    /// ACK-NACK moves to the next entry.
    pub(crate) fn ubx_configure(&mut self, response: Response) {
        self.transport.stop_timer();

        if response == Response::Nack {
            warn!("command rejected, skipping");
        }

        let mut next = None;
        if let Some(table) = self.orch.table.as_mut() {
            if self.orch.init == InitPhase::UbxBaudRate {
                self.orch.init = InitPhase::UbxInitTable;
                debug!("baud rate settled, replaying init table");
                next = table.take_next();
            } else if let Some(entry) = table.take_next() {
                next = Some(entry);
            } else {
                self.orch.table = None;
                if self.orch.init == InitPhase::UbxInitTable {
                    self.orch.init = InitPhase::Done;
                    self.fusion.seen = 0;
                    self.fusion.expected = UBX_EXPECTED;
                    self.fusion.reset_location();
                    debug!("init table complete");
                }
            }
        }

        if let Some(entry) = next {
            self.ubx_dispatch(entry);
        }
    }

    /// The resend window expired with no acknowledgement: retransmit the
    /// entry verbatim and rearm. Retries are unbounded; a receiver that
    /// never answers keeps the table in progress until re-init.
    pub(crate) fn ubx_timeout(&mut self) {
        let current = self.orch.table.as_ref().and_then(Table::current);
        if let Some(entry) = current {
            warn!("no acknowledgement within {ACK_TIMEOUT_MS}ms, resending");
            self.ubx_dispatch(entry);
        }
    }

    /// Build the CFG-PM2 frame for the requested duty cycle in the
    /// scratch buffer and enqueue the power-mode table around it.
    pub(crate) fn ubx_periodic(&mut self, on_time: u32, period: u32, force: bool) {
        let (update_period, search_period) = if on_time == 0 {
            (1_000, 10_000)
        } else {
            let ms = period.saturating_mul(1_000);
            (ms, ms)
        };

        let data = &mut self.orch.tx_data;
        *data = [0; TX_DATA_SIZE];
        data[0] = 0xb5;
        data[1] = 0x62;
        data[2] = 0x06;
        data[3] = 0x3b;
        data[4] = 0x2c;
        data[5] = 0x00;
        data[6] = 0x01; // version
        data[11] = 0x01; // flags
        // power-mode selector: duty cycling needs a period of at least
        // ten seconds unless forced
        data[12] = if on_time != 0 && update_period >= 10_000 {
            if force {
                0x01
            } else {
                0x00
            }
        } else {
            0x02
        };
        data[14..18].copy_from_slice(&update_period.to_le_bytes());
        data[18..22].copy_from_slice(&search_period.to_le_bytes());
        data[26..28].copy_from_slice(&(on_time as u16).to_le_bytes());
        frames::apply_checksum(&mut data[..52]);

        let mut entries = [Entry::Frame(frames::CFG_SAVE); 4];
        entries[0] = Entry::Frame(frames::CFG_RXM_CONTINUOUS);
        entries[1] = Entry::Scratch;
        let len = if on_time != 0 {
            entries[2] = Entry::Frame(frames::CFG_RXM_POWERSAVE);
            4
        } else {
            entries[2] = Entry::Frame(frames::CFG_SAVE);
            3
        };

        let mut table = Table::built(entries, len);
        if let Some(entry) = table.take_next() {
            self.orch.table = Some(table);
            self.ubx_dispatch(entry);
        }
    }
}
