//! Workbook directory with lazily parsed sheets.
//!
//! Opening a workbook runs the globals pass once. Sheet bodies are parsed
//! on first access: the reader seeks to the offset from the sheet's
//! BOUNDSHEET record, hands the records to the [`SheetDecoder`], and caches
//! the result.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::biff::{RecordReader, Revision};
use crate::dispatch::{DateMode, Dispatcher, SheetDescriptor, WorkbookState};
use crate::error::BiffResult;
use crate::options::ReadOptions;
use crate::reader;
use crate::sheet::{CellDecoder, SheetContext, SheetDecoder, Worksheet};
use crate::sst::SharedStringTable;
use crate::styles::{Font, NumberFormat, Xf};

#[derive(Debug)]
enum SheetState {
    Unparsed,
    Parsed(Worksheet),
}

#[derive(Debug)]
struct SheetEntry {
    descriptor: SheetDescriptor,
    state: SheetState,
}

/// A workbook read from a BIFF record stream.
pub struct Workbook<R, D = CellDecoder> {
    records: RecordReader<R>,
    state: WorkbookState,
    sheets: Vec<SheetEntry>,
    decoder: D,
}

impl Workbook<Cursor<Vec<u8>>> {
    /// Open a `.xls` file.
    pub fn open<P: AsRef<Path>>(path: P, options: &ReadOptions) -> BiffResult<Self> {
        let stream = reader::read_workbook_stream(path)?;
        Ok(Self::from_stream(stream, options))
    }

    /// Read from an in-memory or on-disk OLE2 container.
    pub fn from_container<C: Read + Seek>(container: C, options: &ReadOptions) -> BiffResult<Self> {
        let stream = reader::workbook_stream(container)?;
        Ok(Self::from_stream(stream, options))
    }
}

impl<R: Read + Seek> Workbook<R> {
    /// Read the globals from a record stream. `source` must be positioned
    /// at the start of the stream; sheet offsets are relative to it.
    pub fn from_stream(source: R, options: &ReadOptions) -> Self {
        Self::from_stream_with_decoder(source, options, CellDecoder)
    }
}

impl<R: Read + Seek, D: SheetDecoder> Workbook<R, D> {
    /// Like [`Workbook::from_stream`], with a custom sheet decoder.
    pub fn from_stream_with_decoder(source: R, options: &ReadOptions, decoder: D) -> Self {
        let mut records = RecordReader::new(source);
        let state = Dispatcher::new(options).run(&mut records);
        log::debug!(
            "globals read: {:?}, {} sheets, {} shared strings",
            state.revision,
            state.sheets.len(),
            state.shared_strings().len()
        );

        let sheets = state
            .sheets
            .iter()
            .cloned()
            .map(|descriptor| SheetEntry {
                descriptor,
                state: SheetState::Unparsed,
            })
            .collect();

        Self {
            records,
            state,
            sheets,
            decoder,
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .map(|entry| entry.descriptor.name.as_str())
            .collect()
    }

    /// The BOUNDSHEET entry for a sheet, without parsing it.
    pub fn sheet_info(&self, index: usize) -> Option<&SheetDescriptor> {
        self.sheets.get(index).map(|entry| &entry.descriptor)
    }

    /// Whether the sheet body has been parsed already.
    pub fn is_loaded(&self, index: usize) -> bool {
        matches!(
            self.sheets.get(index).map(|entry| &entry.state),
            Some(SheetState::Parsed(_))
        )
    }

    /// Get a sheet, parsing it on first access.
    ///
    /// Returns `None` only for an out-of-range index. A sheet whose body
    /// cannot be reached is returned empty.
    pub fn get_sheet(&mut self, index: usize) -> Option<&Worksheet> {
        let entry = self.sheets.get_mut(index)?;
        if let SheetState::Unparsed = entry.state {
            let sheet = load_sheet(
                &mut self.records,
                &self.state,
                &mut self.decoder,
                &entry.descriptor,
            );
            entry.state = SheetState::Parsed(sheet);
        }

        match &entry.state {
            SheetState::Parsed(sheet) => Some(sheet),
            SheetState::Unparsed => None,
        }
    }

    /// Flatten every sheet into rows of display strings.
    ///
    /// Sheets are stacked in order; each contributes rows from A1 to its
    /// last used row, padded to its last used column. At most `max_rows`
    /// rows are returned in total.
    pub fn read_all_cells(&mut self, max_rows: usize) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        for index in 0..self.sheets.len() {
            let budget = max_rows.saturating_sub(rows.len());
            if budget == 0 {
                break;
            }
            if let Some(sheet) = self.get_sheet(index) {
                rows.extend(sheet.to_table(budget));
            }
        }
        rows
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn into_inner(self) -> R {
        self.records.into_inner()
    }
}

impl<R, D> Workbook<R, D> {
    pub fn state(&self) -> &WorkbookState {
        &self.state
    }

    pub fn shared_strings(&self) -> &SharedStringTable {
        self.state.shared_strings()
    }

    pub fn shared_string(&self, index: usize) -> Option<&str> {
        self.state.shared_strings().get(index)
    }

    /// FORMAT record by its declared index.
    pub fn format(&self, index: u16) -> Option<&NumberFormat> {
        self.state.formats.get(&index)
    }

    pub fn formats(&self) -> &HashMap<u16, NumberFormat> {
        &self.state.formats
    }

    pub fn fonts(&self) -> &[Font] {
        &self.state.fonts
    }

    /// XF records in file order.
    pub fn styles(&self) -> &[Xf] {
        &self.state.xfs
    }

    /// Raw CODEPAGE value, 0 when the file has none.
    pub fn codepage(&self) -> u16 {
        self.state.codepage
    }

    pub fn revision(&self) -> Revision {
        self.state.revision
    }

    /// True for BIFF5 files.
    pub fn is_legacy(&self) -> bool {
        self.state.revision.is_legacy()
    }

    pub fn date_mode(&self) -> DateMode {
        self.state.date_mode
    }
}

fn load_sheet<R: Read + Seek, D: SheetDecoder>(
    records: &mut RecordReader<R>,
    state: &WorkbookState,
    decoder: &mut D,
    descriptor: &SheetDescriptor,
) -> Worksheet {
    let mut sheet = Worksheet::new(descriptor.name.clone(), descriptor.visibility);
    if let Err(e) = records.seek_to(descriptor.offset as u64) {
        log::warn!(
            "cannot seek to sheet {:?} at offset {}: {e}",
            descriptor.name,
            descriptor.offset
        );
        return sheet;
    }

    let ctx = SheetContext::new(state);
    decoder.decode(records, &ctx, &mut sheet);
    log::debug!(
        "parsed sheet {:?}: {} cells",
        descriptor.name,
        sheet.cell_count()
    );
    sheet
}
