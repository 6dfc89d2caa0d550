//! BIFF record stream handling.
//!
//! A BIFF stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//! Unlike a merged reader, [`RecordReader`] hands out records one at a
//! time exactly as they appear on disk; CONTINUE records are *not* folded
//! into their owner. Callers that care about continuations (the SST
//! builder) resume their own decode state on each CONTINUE.

pub mod layouts;
pub mod payload;
pub mod records;
pub mod strings;

use std::io::{Read, Seek, SeekFrom};

pub use payload::Payload;

use crate::error::{BiffError, BiffResult};

/// On-disk format generation, taken from the globals BOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Revision {
    /// BIFF5: 8-bit strings in the workbook codepage, 16-byte XF records.
    Biff5,
    /// BIFF8: flagged Unicode strings, shared string table, 20-byte XF.
    #[default]
    Biff8,
}

impl Revision {
    pub fn from_bof_version(version: u16) -> Self {
        if version == records::BIFF8_VERSION {
            Revision::Biff8
        } else {
            Revision::Biff5
        }
    }

    pub fn is_legacy(self) -> bool {
        self == Revision::Biff5
    }
}

/// The (id, size) pair at the start of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record type ID (e.g. `records::SST`).
    pub id: u16,
    /// Declared body length.
    pub size: u16,
}

/// One record as read from the stream.
#[derive(Debug, Clone)]
pub struct Record {
    pub header: RecordHeader,
    /// Byte offset of this record's header in the stream.
    pub stream_offset: u64,
    data: Vec<u8>,
}

impl Record {
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Bounded cursor over the body. Never longer than the declared size.
    pub fn payload(&self) -> Payload<'_> {
        Payload::new(self.header.id, &self.data)
    }

    /// The stream ended before the declared size was reached.
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.header.size as usize
    }
}

/// Sequential reader producing [`Record`]s from a byte source.
///
/// A failed header read ends the stream (`next_record` returns `None`).
/// A short body is not an error at this level: the record is returned
/// with the bytes that were available and [`Record::is_truncated`] set.
pub struct RecordReader<R> {
    source: R,
    position: u64,
}

impl<R: Read> RecordReader<R> {
    /// Wrap a source positioned at offset 0 of the record stream.
    pub fn new(source: R) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Stream offset of the next header.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read only the next header. Fails with [`BiffError::StreamTruncated`]
    /// when fewer than 4 bytes remain.
    pub fn read_header(&mut self) -> BiffResult<RecordHeader> {
        let mut header_buf = [0u8; 4];
        self.source
            .read_exact(&mut header_buf)
            .map_err(|_| BiffError::StreamTruncated(self.position))?;
        self.position += 4;
        Ok(RecordHeader {
            id: u16::from_le_bytes([header_buf[0], header_buf[1]]),
            size: u16::from_le_bytes([header_buf[2], header_buf[3]]),
        })
    }

    /// Read the next record, or `None` at end of stream.
    pub fn next_record(&mut self) -> Option<Record> {
        let stream_offset = self.position;
        let header = match self.read_header() {
            Ok(h) => h,
            Err(e) => {
                log::trace!("record stream ends: {e}");
                return None;
            }
        };

        let mut data = Vec::with_capacity(header.size as usize);
        if let Err(e) = (&mut self.source)
            .take(header.size as u64)
            .read_to_end(&mut data)
        {
            log::debug!(
                "read error inside record 0x{:04X} at {stream_offset}: {e}",
                header.id
            );
        }
        self.position += data.len() as u64;

        if data.len() < header.size as usize {
            log::debug!(
                "record 0x{:04X} at {stream_offset} truncated: {} of {} bytes",
                header.id,
                data.len(),
                header.size
            );
        }

        Some(Record {
            header,
            stream_offset,
            data,
        })
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: Read + Seek> RecordReader<R> {
    /// Reposition to an absolute stream offset (e.g. a sheet's BOF).
    pub fn seek_to(&mut self, offset: u64) -> BiffResult<()> {
        self.position = self.source.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.next_record()
    }
}
