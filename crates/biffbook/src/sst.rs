//! Shared String Table (SST) assembly across CONTINUE records.
//!
//! The SST record declares how many unique strings follow, then packs them
//! back to back. Excel caps a record body at 8224 bytes, so large tables
//! spill into CONTINUE records, and a single string may be cut anywhere in
//! its character data or its trailing rich-text/phonetic blocks. The table
//! takes its declared length up front but stores entries only as they are
//! decoded, in order; at any time at most one entry is open (partially
//! decoded).

use crate::biff::layouts;
use crate::biff::payload::Payload;
use crate::biff::strings::{DecodeCarry, Decoded, StringDecoder};

/// Ordered string table with a fixed logical length.
///
/// Entries are materialized as they are decoded; entries past the last
/// decoded one read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStringTable {
    strings: Vec<String>,
    /// Declared number of entries.
    len: usize,
    /// First entry that is not complete yet.
    open: usize,
}

impl SharedStringTable {
    /// A table of `count` empty entries.
    pub fn with_count(count: usize) -> Self {
        Self {
            strings: Vec::new(),
            len: count,
            open: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        if index >= self.len {
            return None;
        }
        Some(self.strings.get(index).map_or("", String::as_str))
    }

    /// Entries that have received text so far.
    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let unset = self.len - self.strings.len();
        self.strings
            .iter()
            .map(String::as_str)
            .chain(std::iter::repeat("").take(unset))
    }

    /// Number of entries fully decoded.
    pub fn completed(&self) -> usize {
        self.open.min(self.len)
    }

    /// The entry currently receiving text, if the table is not full.
    pub fn open_index(&self) -> Option<usize> {
        (self.open < self.len).then_some(self.open)
    }

    fn reserve(&mut self, additional: usize) {
        let unset = self.len - self.strings.len();
        self.strings.reserve(additional.min(unset));
    }

    /// Append decoded text to the open entry. Returns `true` when the
    /// entry was completed and the next one opened.
    fn append(&mut self, decoded: Decoded) -> bool {
        if self.open >= self.len {
            return false;
        }
        if self.open == self.strings.len() {
            self.strings.push(String::new());
        }
        let complete = decoded.is_complete();
        self.strings[self.open].push_str(decoded.text());
        if complete {
            self.open += 1;
        }
        complete
    }
}

/// Builds the shared string table from an SST record and its CONTINUEs.
#[derive(Debug, Default)]
pub struct SstBuilder {
    table: SharedStringTable,
    carry: DecodeCarry,
    declared_total: u32,
}

impl SstBuilder {
    /// Handle the SST record itself: read the header, allocate the table
    /// and decode as many strings as the payload holds.
    pub fn start(&mut self, p: &mut Payload<'_>, strings: &StringDecoder<'_>) {
        let header = layouts::sst(p);
        self.table = SharedStringTable::with_count(header.unique as usize);
        self.carry.clear();
        self.declared_total = header.total;
        self.fill(p, strings);
    }

    /// Handle a CONTINUE record that extends the SST.
    pub fn resume(&mut self, p: &mut Payload<'_>, strings: &StringDecoder<'_>) {
        if self.carry.is_pending() {
            let decoded = strings.resume(p, &mut self.carry);
            if !self.table.append(decoded) {
                return;
            }
        }
        self.fill(p, strings);
    }

    /// Read length-prefixed strings until the table is full or the payload
    /// runs out.
    fn fill(&mut self, p: &mut Payload<'_>, strings: &StringDecoder<'_>) {
        // Each string takes at least a 2-byte length and a flags byte.
        self.table.reserve(p.remaining() / 3);
        while self.table.open_index().is_some() && !p.is_exhausted() {
            let size = match p.read_u16() {
                Ok(size) => size,
                Err(e) => {
                    log::debug!("SST string length cut by record end: {e}");
                    break;
                }
            };
            let decoded = strings.decode(p, size, &mut self.carry);
            if !self.table.append(decoded) {
                break;
            }
        }
    }

    /// Continuation state waiting for the next CONTINUE.
    pub fn carry(&self) -> &DecodeCarry {
        &self.carry
    }

    /// Total string references declared by the SST header.
    pub fn declared_total(&self) -> u32 {
        self.declared_total
    }

    pub fn table(&self) -> &SharedStringTable {
        &self.table
    }

    pub(crate) fn warn_if_incomplete(&self) {
        if self.table.completed() < self.table.len() {
            log::warn!(
                "SST declared {} strings but only {} were complete",
                self.table.len(),
                self.table.completed()
            );
        }
    }

    pub fn finish(self) -> SharedStringTable {
        self.warn_if_incomplete();
        self.table
    }
}
