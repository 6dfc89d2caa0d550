//! Fixed-width record headers.
//!
//! Each decoder copies its layout into a zeroed buffer of the layout's
//! width, so a short payload leaves the trailing fields at zero instead of
//! failing the record.

use super::payload::{le_u16, le_u32, Payload};

fn note_truncated(p: &Payload<'_>, truncated: bool, what: &str) {
    if truncated {
        log::debug!(
            "{what} header in record 0x{:04X} is short; missing fields read as zero",
            p.id()
        );
    }
}

/// BOF record.
///
/// Layout:
///   0  u16  vers   0x0600 for BIFF8, 0x0500 for BIFF5
///   2  u16  dt     substream type (0x0005 globals, 0x0010 worksheet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BofHeader {
    pub version: u16,
    pub substream: u16,
}

pub fn bof(p: &mut Payload<'_>) -> BofHeader {
    let (buf, truncated) = p.fixed::<4>();
    note_truncated(p, truncated, "BOF");
    BofHeader {
        version: le_u16(&buf, 0),
        substream: le_u16(&buf, 2),
    }
}

/// SST record header.
///
/// Layout:
///   0  u32  cstTotal    string references in the workbook
///   4  u32  cstUnique   entries in this table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SstHeader {
    pub total: u32,
    pub unique: u32,
}

pub fn sst(p: &mut Payload<'_>) -> SstHeader {
    let (buf, truncated) = p.fixed::<8>();
    note_truncated(p, truncated, "SST");
    SstHeader {
        total: le_u32(&buf, 0),
        unique: le_u32(&buf, 4),
    }
}

/// BOUNDSHEET record header; the sheet name follows.
///
/// Layout:
///   0  u32  lbPlyPos   absolute stream offset of the sheet's BOF
///   4  u8   hsState    0 visible, 1 hidden, 2 very hidden
///   5  u8   dt         0 worksheet, 2 chart, 6 VBA module
///   6  u8   cch        name length in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetHeader {
    pub offset: u32,
    pub visibility: u8,
    pub sheet_type: u8,
    pub name_len: u8,
}

pub fn sheet(p: &mut Payload<'_>) -> SheetHeader {
    let (buf, truncated) = p.fixed::<7>();
    note_truncated(p, truncated, "BOUNDSHEET");
    SheetHeader {
        offset: le_u32(&buf, 0),
        visibility: buf[4],
        sheet_type: buf[5],
        name_len: buf[6],
    }
}

/// A record whose whole body is one `u16` (CODEPAGE, DATEMODE).
pub fn single_u16(p: &mut Payload<'_>) -> u16 {
    let (buf, truncated) = p.fixed::<2>();
    note_truncated(p, truncated, "u16");
    le_u16(&buf, 0)
}
