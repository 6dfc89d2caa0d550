//! BIFF5/BIFF8 record identifiers used by the workbook and sheet passes.
//!
//! Reference: [MS-XLS] §2.3  Record Enumeration

// ── Stream structure ────────────────────────────────────────────────────
pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// ── Workbook globals ────────────────────────────────────────────────────
pub const CODEPAGE: u16 = 0x0042;
pub const DATEMODE: u16 = 0x0022; // 1900 vs 1904 date system
pub const SST: u16 = 0x00FC;
pub const BOUNDSHEET: u16 = 0x0085; // Sheet name, type, visibility, stream offset
pub const FONT: u16 = 0x0031;
pub const FORMAT: u16 = 0x041E;
pub const XF: u16 = 0x00E0;

// ── Cell records ────────────────────────────────────────────────────────
pub const DIMENSIONS: u16 = 0x0200;
pub const LABELSST: u16 = 0x00FD;
pub const LABEL: u16 = 0x0204;
pub const RSTRING: u16 = 0x00D6;
pub const NUMBER: u16 = 0x0203;
pub const RK: u16 = 0x027E;
pub const MULRK: u16 = 0x00BD;
pub const BLANK: u16 = 0x0201;
pub const MULBLANK: u16 = 0x00BE;
pub const BOOLERR: u16 = 0x0205;
pub const FORMULA: u16 = 0x0006;
pub const STRING: u16 = 0x0207; // Cached string result for preceding FORMULA

// ── BOF substream types ─────────────────────────────────────────────────
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;

/// BOF version field of a BIFF8 stream. Anything else is read as BIFF5.
pub const BIFF8_VERSION: u16 = 0x0600;

/// Human-readable name for trace logging.
pub fn name(id: u16) -> &'static str {
    match id {
        BOF => "BOF",
        EOF => "EOF",
        CONTINUE => "CONTINUE",
        CODEPAGE => "CODEPAGE",
        DATEMODE => "DATEMODE",
        SST => "SST",
        BOUNDSHEET => "BOUNDSHEET",
        FONT => "FONT",
        FORMAT => "FORMAT",
        XF => "XF",
        DIMENSIONS => "DIMENSIONS",
        LABELSST => "LABELSST",
        LABEL => "LABEL",
        RSTRING => "RSTRING",
        NUMBER => "NUMBER",
        RK => "RK",
        MULRK => "MULRK",
        BLANK => "BLANK",
        MULBLANK => "MULBLANK",
        BOOLERR => "BOOLERR",
        FORMULA => "FORMULA",
        STRING => "STRING",
        _ => "?",
    }
}
