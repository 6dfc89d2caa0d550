//! Record stream builder shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use biffbook::biff::records;
use biffbook::{ReadOptions, Workbook};

pub const BIFF5: u16 = 0x0500;
pub const BIFF8: u16 = records::BIFF8_VERSION;

/// One record: id, size, body.
pub fn record(id: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 4);
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
    out
}

pub fn bof(version: u16, substream: u16) -> Vec<u8> {
    let mut body = version.to_le_bytes().to_vec();
    body.extend_from_slice(&substream.to_le_bytes());
    record(records::BOF, &body)
}

pub fn eof() -> Vec<u8> {
    record(records::EOF, &[])
}

pub fn codepage(cp: u16) -> Vec<u8> {
    record(records::CODEPAGE, &cp.to_le_bytes())
}

pub fn continue_record(body: &[u8]) -> Vec<u8> {
    record(records::CONTINUE, body)
}

/// SST body prefix: total and unique counts.
pub fn sst_header(total: u32, unique: u32) -> Vec<u8> {
    let mut body = total.to_le_bytes().to_vec();
    body.extend_from_slice(&unique.to_le_bytes());
    body
}

/// BIFF8 string with 16-bit length, compressed (one byte per char).
pub fn compressed(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u16).to_le_bytes().to_vec();
    out.push(0x00);
    out.extend_from_slice(s.as_bytes());
    out
}

/// UTF-16LE code units of `s` as bytes.
pub fn utf16_bytes(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// BIFF8 string with 16-bit length, uncompressed UTF-16.
pub fn wide(s: &str) -> Vec<u8> {
    let units = s.encode_utf16().count() as u16;
    let mut out = units.to_le_bytes().to_vec();
    out.push(0x01);
    out.extend(utf16_bytes(s));
    out
}

fn cell_prefix(row: u16, col: u16) -> Vec<u8> {
    let mut body = row.to_le_bytes().to_vec();
    body.extend_from_slice(&col.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body
}

pub fn labelsst(row: u16, col: u16, index: u32) -> Vec<u8> {
    let mut body = cell_prefix(row, col);
    body.extend_from_slice(&index.to_le_bytes());
    record(records::LABELSST, &body)
}

/// LABEL with the text already encoded (BIFF8 flagged or BIFF5 raw).
pub fn label(row: u16, col: u16, len: u16, encoded: &[u8]) -> Vec<u8> {
    let mut body = cell_prefix(row, col);
    body.extend_from_slice(&len.to_le_bytes());
    body.extend_from_slice(encoded);
    record(records::LABEL, &body)
}

pub fn number(row: u16, col: u16, value: f64) -> Vec<u8> {
    let mut body = cell_prefix(row, col);
    body.extend_from_slice(&value.to_le_bytes());
    record(records::NUMBER, &body)
}

pub fn boolean(row: u16, col: u16, value: bool) -> Vec<u8> {
    let mut body = cell_prefix(row, col);
    body.extend_from_slice(&[value as u8, 0]);
    record(records::BOOLERR, &body)
}

/// Assembles globals and sheet substreams, filling in BOUNDSHEET offsets.
pub struct StreamBuilder {
    version: u16,
    globals: Vec<Vec<u8>>,
    sheets: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
}

impl StreamBuilder {
    pub fn biff8() -> Self {
        Self::new(BIFF8)
    }

    pub fn biff5() -> Self {
        Self::new(BIFF5)
    }

    fn new(version: u16) -> Self {
        Self {
            version,
            globals: Vec::new(),
            sheets: Vec::new(),
        }
    }

    /// Add a globals record (placed before the BOUNDSHEET records).
    pub fn global(mut self, rec: Vec<u8>) -> Self {
        self.globals.push(rec);
        self
    }

    /// Add a sheet with an ASCII name.
    pub fn sheet(self, name: &str, cells: Vec<Vec<u8>>) -> Self {
        self.sheet_raw(name.as_bytes(), cells)
    }

    /// Add a sheet whose name is given in the file's single-byte encoding.
    pub fn sheet_raw(mut self, name: &[u8], cells: Vec<Vec<u8>>) -> Self {
        self.sheets.push((name.to_vec(), cells));
        self
    }

    fn boundsheet(&self, offset: u32, name: &[u8]) -> Vec<u8> {
        let mut body = offset.to_le_bytes().to_vec();
        body.extend_from_slice(&[0, 0, name.len() as u8]);
        if self.version == BIFF8 {
            body.push(0x00);
        }
        body.extend_from_slice(name);
        record(records::BOUNDSHEET, &body)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut globals = bof(self.version, records::BOF_WORKBOOK_GLOBALS);
        for rec in &self.globals {
            globals.extend_from_slice(rec);
        }

        let directory_len: usize = self
            .sheets
            .iter()
            .map(|(name, _)| self.boundsheet(0, name).len())
            .sum();
        let bodies: Vec<Vec<u8>> = self
            .sheets
            .iter()
            .map(|(_, cells)| {
                let mut body = bof(self.version, records::BOF_WORKSHEET);
                for cell in cells {
                    body.extend_from_slice(cell);
                }
                body.extend(eof());
                body
            })
            .collect();

        let mut offset = globals.len() + directory_len + eof().len();
        for ((name, _), body) in self.sheets.iter().zip(&bodies) {
            globals.extend(self.boundsheet(offset as u32, name));
            offset += body.len();
        }
        globals.extend(eof());

        for body in bodies {
            globals.extend(body);
        }
        globals
    }

    pub fn open(&self) -> Workbook<Cursor<Vec<u8>>> {
        self.open_with(&ReadOptions::default())
    }

    pub fn open_with(&self, options: &ReadOptions) -> Workbook<Cursor<Vec<u8>>> {
        Workbook::from_stream(Cursor::new(self.build()), options)
    }
}

/// Rows of string literals, for table comparisons.
pub fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}
