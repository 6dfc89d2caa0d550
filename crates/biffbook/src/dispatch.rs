//! Workbook globals pass.
//!
//! Walks the record stream from the globals BOF, routing each record by id
//! through a handler table. All results accumulate in [`WorkbookState`].
//! The only other state is the CONTINUE machine: a CONTINUE record is
//! meaningful only while the record it extends is known.

use std::collections::HashMap;
use std::io::Read;

use crate::biff::payload::Payload;
use crate::biff::strings::StringDecoder;
use crate::biff::{layouts, records, Record, RecordHeader, RecordReader, Revision};
use crate::charset::CharsetResolver;
use crate::options::ReadOptions;
use crate::sheet::Visibility;
use crate::sst::{SharedStringTable, SstBuilder};
use crate::styles::{self, Font, NumberFormat, Xf};

/// Base date for serial date numbers (DATEMODE record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateMode {
    /// Serial 1 = 1900-01-01.
    #[default]
    Epoch1900,
    /// Serial 0 = 1904-01-01.
    Epoch1904,
}

/// A sheet as listed by a BOUNDSHEET record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDescriptor {
    pub name: String,
    /// Absolute stream offset of the sheet's BOF.
    pub offset: u32,
    pub visibility: Visibility,
    /// 0 = worksheet, 2 = chart, 6 = VBA module.
    pub sheet_type: u8,
}

/// Everything collected from the workbook globals substream.
#[derive(Debug, Default)]
pub struct WorkbookState {
    pub revision: Revision,
    /// Substream type from the globals BOF.
    pub workbook_type: u16,
    /// Raw CODEPAGE value, 0 when absent.
    pub codepage: u16,
    pub date_mode: DateMode,
    pub xfs: Vec<Xf>,
    pub fonts: Vec<Font>,
    /// FORMAT records by declared index; later records replace earlier ones.
    pub formats: HashMap<u16, NumberFormat>,
    pub sheets: Vec<SheetDescriptor>,
    pub charset: CharsetResolver,
    sst: SstBuilder,
    in_globals: bool,
}

impl WorkbookState {
    pub fn new(options: &ReadOptions) -> Self {
        Self {
            charset: CharsetResolver::new(options.charset.as_deref()),
            ..Self::default()
        }
    }

    pub fn shared_strings(&self) -> &SharedStringTable {
        self.sst.table()
    }

    /// Continuation state of the SST, for inspection.
    pub fn sst(&self) -> &SstBuilder {
        &self.sst
    }

    fn strings(&self) -> StringDecoder<'_> {
        StringDecoder::new(self.revision, &self.charset)
    }

    fn on_bof(&mut self, p: &mut Payload<'_>) -> Flow {
        let bof = layouts::bof(p);
        if !self.in_globals {
            self.in_globals = true;
            self.revision = Revision::from_bof_version(bof.version);
            self.workbook_type = bof.substream;
            log::debug!(
                "globals BOF: version 0x{:04X} ({:?}), type 0x{:04X}",
                bof.version,
                self.revision,
                bof.substream
            );
        }
        Flow::Next
    }

    fn on_eof(&mut self, _p: &mut Payload<'_>) -> Flow {
        if self.in_globals {
            Flow::Stop
        } else {
            Flow::Next
        }
    }

    fn on_codepage(&mut self, p: &mut Payload<'_>) -> Flow {
        self.codepage = layouts::single_u16(p);
        self.charset.set_codepage(self.codepage);
        Flow::Next
    }

    fn on_datemode(&mut self, p: &mut Payload<'_>) -> Flow {
        self.date_mode = match layouts::single_u16(p) {
            0 => DateMode::Epoch1900,
            _ => DateMode::Epoch1904,
        };
        Flow::Next
    }

    fn on_sst(&mut self, p: &mut Payload<'_>) -> Flow {
        let strings = StringDecoder::new(self.revision, &self.charset);
        self.sst.start(p, &strings);
        Flow::Next
    }

    fn on_xf(&mut self, p: &mut Payload<'_>) -> Flow {
        self.xfs.push(styles::parse_xf(p, self.revision));
        Flow::Next
    }

    fn on_font(&mut self, p: &mut Payload<'_>) -> Flow {
        let font = styles::parse_font(p, &self.strings());
        self.fonts.push(font);
        Flow::Next
    }

    fn on_format(&mut self, p: &mut Payload<'_>) -> Flow {
        let format = styles::parse_format(p, &self.strings(), self.revision);
        if let Some(old) = self.formats.insert(format.index, format) {
            log::debug!("FORMAT {} redefined (was {:?})", old.index, old.code);
        }
        Flow::Next
    }

    fn on_boundsheet(&mut self, p: &mut Payload<'_>) -> Flow {
        let header = layouts::sheet(p);
        let name = self.strings().read_field(p, header.name_len as u16);
        self.sheets.push(SheetDescriptor {
            name,
            offset: header.offset,
            visibility: Visibility::from(header.visibility),
            sheet_type: header.sheet_type,
        });
        Flow::Next
    }

    fn on_sst_continue(&mut self, p: &mut Payload<'_>) {
        let strings = StringDecoder::new(self.revision, &self.charset);
        self.sst.resume(p, &strings);
    }
}

/// What the loop does after a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Stop,
}

type Handler = fn(&mut WorkbookState, &mut Payload<'_>) -> Flow;

/// Record id → handler. Ids not listed are skipped.
const HANDLERS: &[(u16, Handler)] = &[
    (records::BOF, WorkbookState::on_bof),
    (records::EOF, WorkbookState::on_eof),
    (records::CODEPAGE, WorkbookState::on_codepage),
    (records::DATEMODE, WorkbookState::on_datemode),
    (records::SST, WorkbookState::on_sst),
    (records::XF, WorkbookState::on_xf),
    (records::FONT, WorkbookState::on_font),
    (records::FORMAT, WorkbookState::on_format),
    (records::BOUNDSHEET, WorkbookState::on_boundsheet),
];

fn handler_for(id: u16) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(record_id, _)| *record_id == id)
        .map(|(_, handler)| *handler)
}

/// Whether a CONTINUE may extend the previous record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueState {
    /// The previous record does not accept continuations.
    AwaitingOwner,
    /// CONTINUE records extend `owner` until another record intervenes.
    Extending { owner: RecordHeader },
}

/// Drives [`WorkbookState`] from a record stream.
pub struct Dispatcher {
    state: WorkbookState,
    continuation: ContinueState,
}

impl Dispatcher {
    pub fn new(options: &ReadOptions) -> Self {
        Self {
            state: WorkbookState::new(options),
            continuation: ContinueState::AwaitingOwner,
        }
    }

    pub fn state(&self) -> &WorkbookState {
        &self.state
    }

    pub fn continuation(&self) -> ContinueState {
        self.continuation
    }

    /// Route one record.
    pub fn dispatch(&mut self, record: &Record) -> Flow {
        let id = record.id();
        let mut p = record.payload();
        log::trace!(
            "record {} (0x{id:04X}) size {} at {}",
            records::name(id),
            record.header.size,
            record.stream_offset
        );

        if id == records::CONTINUE {
            match self.continuation {
                ContinueState::Extending { .. } => self.state.on_sst_continue(&mut p),
                _ => log::debug!(
                    "ignoring CONTINUE at {} with no owner record",
                    record.stream_offset
                ),
            }
            return Flow::Next;
        }

        self.continuation = if id == records::SST {
            ContinueState::Extending {
                owner: record.header,
            }
        } else {
            ContinueState::AwaitingOwner
        };

        match handler_for(id) {
            Some(handler) => handler(&mut self.state, &mut p),
            None => Flow::Next,
        }
    }

    /// Consume records until the globals EOF or the end of the stream.
    pub fn run<R: Read>(mut self, records: &mut RecordReader<R>) -> WorkbookState {
        while let Some(record) = records.next_record() {
            if self.dispatch(&record) == Flow::Stop {
                break;
            }
        }
        self.state.sst.warn_if_incomplete();
        self.state
    }
}
