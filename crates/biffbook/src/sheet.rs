//! Worksheet model and sheet-body decoding.
//!
//! A sheet body is the BOF..EOF substream that a BOUNDSHEET record points
//! at. Decoding it is delegated to a [`SheetDecoder`], which receives the
//! workbook tables read-only through a [`SheetContext`]. [`CellDecoder`]
//! is the default implementation and understands the common cell records.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;

use crate::biff::payload::Payload;
use crate::biff::records;
use crate::biff::strings::StringDecoder;
use crate::biff::{RecordReader, Revision};
use crate::dispatch::{DateMode, WorkbookState};
use crate::error::BiffResult;
use crate::sst::SharedStringTable;
use crate::styles::{NumberFormat, Xf};

/// Sheet visibility from the BOUNDSHEET record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl From<u8> for Visibility {
    fn from(raw: u8) -> Self {
        match raw & 0x03 {
            1 => Visibility::Hidden,
            2 => Visibility::VeryHidden,
            _ => Visibility::Visible,
        }
    }
}

/// Cell error codes (BOOLERR / FORMULA results).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
}

impl CellError {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => CellError::Null,
            0x07 => CellError::Div0,
            0x17 => CellError::Ref,
            0x1D => CellError::Name,
            0x24 => CellError::Num,
            0x2A => CellError::Na,
            _ => CellError::Value,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
        }
    }
}

/// A decoded cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    Error(CellError),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Error(e) => f.write_str(e.as_str()),
        }
    }
}

/// Used range from the DIMENSIONS record (last row/col exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub first_row: u32,
    pub last_row_plus1: u32,
    pub first_col: u16,
    pub last_col_plus1: u16,
}

/// Sparse cell storage for one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    name: String,
    visibility: Visibility,
    dimensions: Option<Dimensions>,
    rows: BTreeMap<u32, BTreeMap<u16, CellValue>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Dimensions as declared by the file, if it had a DIMENSIONS record.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = Some(dimensions);
    }

    pub fn set_cell(&mut self, row: u32, col: u16, value: CellValue) {
        self.rows.entry(row).or_default().insert(col, value);
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row)?.get(&col)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest row holding a cell.
    pub fn max_row(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Highest column holding a cell, across all rows.
    pub fn max_col(&self) -> Option<u16> {
        self.rows
            .values()
            .filter_map(|cols| cols.keys().next_back().copied())
            .max()
    }

    /// Render the sheet as a rectangle of display strings, starting at
    /// A1, with at most `max_rows` rows. Empty cells become `""`.
    pub fn to_table(&self, max_rows: usize) -> Vec<Vec<String>> {
        let (Some(max_row), Some(max_col)) = (self.max_row(), self.max_col()) else {
            return Vec::new();
        };
        let height = (max_row as usize + 1).min(max_rows);
        let width = max_col as usize + 1;

        let mut table = vec![vec![String::new(); width]; height];
        for (row, cols) in self.rows.range(..height as u32) {
            let out = &mut table[*row as usize];
            for (col, value) in cols {
                out[*col as usize] = value.to_string();
            }
        }
        table
    }
}

/// Read-only view of the workbook tables a sheet decoder may consult.
pub struct SheetContext<'a> {
    pub shared_strings: &'a SharedStringTable,
    pub formats: &'a HashMap<u16, NumberFormat>,
    pub xfs: &'a [Xf],
    pub date_mode: DateMode,
    pub revision: Revision,
    /// Decoder for inline strings, using the workbook's codepage.
    pub strings: StringDecoder<'a>,
}

impl<'a> SheetContext<'a> {
    pub fn new(state: &'a WorkbookState) -> Self {
        Self {
            shared_strings: state.shared_strings(),
            formats: &state.formats,
            xfs: &state.xfs,
            date_mode: state.date_mode,
            revision: state.revision,
            strings: StringDecoder::new(state.revision, &state.charset),
        }
    }

    pub fn shared_string(&self, index: usize) -> Option<&'a str> {
        self.shared_strings.get(index)
    }

    /// Number format applied by an XF, when it refers to a FORMAT record.
    pub fn format_for_xf(&self, xf_index: u16) -> Option<&'a NumberFormat> {
        let xf = self.xfs.get(xf_index as usize)?;
        self.formats.get(&xf.format_index)
    }
}

/// Decodes one sheet body.
pub trait SheetDecoder {
    /// `records` is positioned at the sheet's BOF. Implementations should
    /// stop at the matching EOF.
    fn decode<R: Read>(
        &mut self,
        records: &mut RecordReader<R>,
        ctx: &SheetContext<'_>,
        sheet: &mut Worksheet,
    );
}

/// Default sheet decoder: text, number, boolean and error cells.
#[derive(Debug, Default, Clone, Copy)]
pub struct CellDecoder;

impl SheetDecoder for CellDecoder {
    fn decode<R: Read>(
        &mut self,
        records: &mut RecordReader<R>,
        ctx: &SheetContext<'_>,
        sheet: &mut Worksheet,
    ) {
        // FORMULA with a string result is followed by a STRING record.
        let mut pending_formula: Option<(u32, u16)> = None;
        // Embedded chart substreams nest their own BOF..EOF.
        let mut depth = 0usize;

        for record in &mut *records {
            let id = record.id();
            match id {
                records::BOF => {
                    depth += 1;
                    continue;
                }
                records::EOF => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                    continue;
                }
                _ if depth != 1 => continue,
                _ => {}
            }

            let mut p = record.payload();
            let result = match id {
                records::DIMENSIONS => parse_dimensions(&mut p, ctx, sheet),
                records::LABELSST => parse_labelsst(&mut p, ctx, sheet),
                records::LABEL | records::RSTRING => parse_label(&mut p, ctx, sheet),
                records::NUMBER => parse_number(&mut p, sheet),
                records::RK => parse_rk(&mut p, sheet),
                records::MULRK => parse_mulrk(&mut p, sheet),
                records::BOOLERR => parse_boolerr(&mut p, sheet),
                records::FORMULA => parse_formula(&mut p, sheet).map(|pending| {
                    pending_formula = pending;
                }),
                records::STRING => match pending_formula.take() {
                    Some((row, col)) => parse_formula_string(&mut p, ctx, sheet, row, col),
                    None => Ok(()),
                },
                _ => Ok(()),
            };

            if id != records::FORMULA && id != records::STRING && is_cell_record(id) {
                pending_formula = None;
            }
            if let Err(e) = result {
                log::debug!(
                    "skipping malformed {} record in sheet {:?}: {e}",
                    records::name(id),
                    sheet.name()
                );
            }
        }
    }
}

fn is_cell_record(id: u16) -> bool {
    matches!(
        id,
        records::LABELSST
            | records::LABEL
            | records::RSTRING
            | records::NUMBER
            | records::RK
            | records::MULRK
            | records::BLANK
            | records::MULBLANK
            | records::BOOLERR
    )
}

/// Row, column and XF index that open every cell record.
fn cell_header(p: &mut Payload<'_>) -> BiffResult<(u32, u16, u16)> {
    let row = p.read_u16()? as u32;
    let col = p.read_u16()?;
    let xf = p.read_u16()?;
    Ok((row, col, xf))
}

/// DIMENSIONS: BIFF8 uses 32-bit rows, BIFF5 16-bit.
fn parse_dimensions(
    p: &mut Payload<'_>,
    ctx: &SheetContext<'_>,
    sheet: &mut Worksheet,
) -> BiffResult<()> {
    let (first_row, last_row_plus1) = match ctx.revision {
        Revision::Biff8 => (p.read_u32()?, p.read_u32()?),
        Revision::Biff5 => (p.read_u16()? as u32, p.read_u16()? as u32),
    };
    let first_col = p.read_u16()?;
    let last_col_plus1 = p.read_u16()?;
    sheet.set_dimensions(Dimensions {
        first_row,
        last_row_plus1,
        first_col,
        last_col_plus1,
    });
    Ok(())
}

/// LABELSST: row(2) + col(2) + xf(2) + sst_index(4)
fn parse_labelsst(
    p: &mut Payload<'_>,
    ctx: &SheetContext<'_>,
    sheet: &mut Worksheet,
) -> BiffResult<()> {
    let (row, col, _xf) = cell_header(p)?;
    let index = p.read_u32()? as usize;
    match ctx.shared_string(index) {
        Some(s) => sheet.set_cell(row, col, CellValue::Text(s.to_owned())),
        None => log::debug!("LABELSST at ({row}, {col}) refers to missing string {index}"),
    }
    Ok(())
}

/// LABEL / RSTRING: row(2) + col(2) + xf(2) + string with 16-bit length
fn parse_label(
    p: &mut Payload<'_>,
    ctx: &SheetContext<'_>,
    sheet: &mut Worksheet,
) -> BiffResult<()> {
    let (row, col, _xf) = cell_header(p)?;
    let size = p.read_u16()?;
    let text = ctx.strings.read_field(p, size);
    sheet.set_cell(row, col, CellValue::Text(text));
    Ok(())
}

/// NUMBER: row(2) + col(2) + xf(2) + f64(8)
fn parse_number(p: &mut Payload<'_>, sheet: &mut Worksheet) -> BiffResult<()> {
    let (row, col, _xf) = cell_header(p)?;
    let value = p.read_f64()?;
    sheet.set_cell(row, col, CellValue::Number(value));
    Ok(())
}

/// RK: row(2) + col(2) + xf(2) + rk(4)
fn parse_rk(p: &mut Payload<'_>, sheet: &mut Worksheet) -> BiffResult<()> {
    let (row, col, _xf) = cell_header(p)?;
    let value = decode_rk(p.read_u32()?);
    sheet.set_cell(row, col, CellValue::Number(value));
    Ok(())
}

/// MULRK: row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
fn parse_mulrk(p: &mut Payload<'_>, sheet: &mut Worksheet) -> BiffResult<()> {
    let row = p.read_u16()? as u32;
    let mut col = p.read_u16()?;
    // 6 bytes per cell, then the trailing last_col field
    while p.remaining() >= 6 + 2 {
        let _xf = p.read_u16()?;
        let value = decode_rk(p.read_u32()?);
        sheet.set_cell(row, col, CellValue::Number(value));
        col = col.saturating_add(1);
    }
    Ok(())
}

/// BOOLERR: row(2) + col(2) + xf(2) + value(1) + is_error(1)
fn parse_boolerr(p: &mut Payload<'_>, sheet: &mut Worksheet) -> BiffResult<()> {
    let (row, col, _xf) = cell_header(p)?;
    let value = p.read_u8()?;
    let is_error = p.read_u8()?;
    let cell = if is_error != 0 {
        CellValue::Error(CellError::from_code(value))
    } else {
        CellValue::Boolean(value != 0)
    };
    sheet.set_cell(row, col, cell);
    Ok(())
}

/// FORMULA: row(2) + col(2) + xf(2) + result(8) + options(2) + ...
///
/// Only the cached result is kept. Returns the cell position when the
/// result is a string, which arrives in the next STRING record.
fn parse_formula(p: &mut Payload<'_>, sheet: &mut Worksheet) -> BiffResult<Option<(u32, u16)>> {
    let (row, col, _xf) = cell_header(p)?;
    let result = p.read_bytes(8)?;

    // Bytes 6-7 == 0xFFFF mark a non-numeric result.
    if result[6] != 0xFF || result[7] != 0xFF {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(result);
        sheet.set_cell(row, col, CellValue::Number(f64::from_le_bytes(raw)));
        return Ok(None);
    }

    match result[0] {
        0x00 => return Ok(Some((row, col))),
        0x01 => sheet.set_cell(row, col, CellValue::Boolean(result[2] != 0)),
        0x02 => sheet.set_cell(row, col, CellValue::Error(CellError::from_code(result[2]))),
        // 0x03 = empty string result
        _ => sheet.set_cell(row, col, CellValue::Text(String::new())),
    }
    Ok(None)
}

/// STRING: cached string value for the preceding FORMULA.
fn parse_formula_string(
    p: &mut Payload<'_>,
    ctx: &SheetContext<'_>,
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
) -> BiffResult<()> {
    let size = p.read_u16()?;
    let text = ctx.strings.read_field(p, size);
    sheet.set_cell(row, col, CellValue::Text(text));
    Ok(())
}

/// Decode an RK-encoded number.
///
/// RK encoding (4 bytes):
/// - Bit 0: if 1, the decoded number should be divided by 100
/// - Bit 1: if 1, bits 2..31 are a signed 30-bit integer; if 0, they are
///   the upper 30 bits of an IEEE 754 double whose low 34 bits are zero
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}
