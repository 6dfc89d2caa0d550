//! FONT, FORMAT and XF record decoding.
//!
//! These are decoded into plain field structs; turning them into rendered
//! styles is left to whoever consumes the workbook.

use crate::biff::payload::{le_u16, le_u32, Payload};
use crate::biff::strings::StringDecoder;
use crate::biff::Revision;

/// Parsed FONT record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Font {
    /// Font height in twips (1/20 of a point).
    pub height_twips: u16,
    pub italic: bool,
    pub strikethrough: bool,
    /// Weight, 400 = normal, 700 = bold.
    pub weight: u16,
    /// Palette color index.
    pub color_index: u16,
    /// 0 = baseline, 1 = superscript, 2 = subscript.
    pub escapement: u16,
    pub underline: u8,
    pub family: u8,
    pub charset: u8,
    pub name: String,
}

impl Font {
    pub fn is_bold(&self) -> bool {
        self.weight >= 700
    }

    pub fn size_points(&self) -> f64 {
        self.height_twips as f64 / 20.0
    }
}

/// Parsed FORMAT record: a number format code and the index XFs use to
/// refer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub index: u16,
    pub code: String,
}

/// Parsed XF record, common subset of the BIFF5 and BIFF8 layouts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Xf {
    pub font_index: u16,
    pub format_index: u16,
    pub locked: bool,
    pub hidden: bool,
    pub is_style_xf: bool,
    /// Parent style XF (0xFFF for style XFs).
    pub parent_index: u16,
    pub hor_align: u8,
    pub vert_align: u8,
    pub wrap_text: bool,
    /// BIFF8 rotation code: 0 to 180 degrees, 255 = stacked.
    pub rotation: u8,
    pub fill_pattern: u8,
    pub icv_fore: u16,
    pub icv_back: u16,
}

/// Parse a FONT record (0x0031).
///
/// Layout:
///   0  u16  dyHeight    font height in twips (1/20 pt)
///   2  u16  grbit       flags (bit 1 = italic, bit 3 = strikethrough)
///   4  u16  icv         color index
///   6  u16  bls         weight (400 = normal, 700 = bold)
///   8  u16  sss         super/subscript (0/1/2)
///  10  u8   uls         underline type
///  11  u8   bFamily     font family
///  12  u8   bCharSet    character set
///  13  u8   reserved
///  14  u8   cch         name length
///  15  ...  font name   string body of `cch` characters
pub fn parse_font(p: &mut Payload<'_>, strings: &StringDecoder<'_>) -> Font {
    let (buf, truncated) = p.fixed::<15>();
    if truncated {
        log::debug!("FONT record too short; missing fields read as zero");
    }

    let grbit = le_u16(&buf, 2);
    let name_len = buf[14] as u16;
    let name = if name_len > 0 {
        strings.read_field(p, name_len)
    } else {
        String::new()
    };

    Font {
        height_twips: le_u16(&buf, 0),
        italic: (grbit & 0x0002) != 0,
        strikethrough: (grbit & 0x0008) != 0,
        color_index: le_u16(&buf, 4),
        weight: le_u16(&buf, 6),
        escapement: le_u16(&buf, 8),
        underline: buf[10],
        family: buf[11],
        charset: buf[12],
        name,
    }
}

/// Parse a FORMAT record (0x041E).
///
/// Layout (BIFF8):
///   0  u16  ifmt    format index
///   2  u16  cch     code length
///   4  ...  code    flagged string body
///
/// BIFF5 stores `cch` in a single byte and the code as raw bytes.
pub fn parse_format(
    p: &mut Payload<'_>,
    strings: &StringDecoder<'_>,
    revision: Revision,
) -> NumberFormat {
    let (index, size) = match revision {
        Revision::Biff8 => {
            let (buf, truncated) = p.fixed::<4>();
            if truncated {
                log::debug!("FORMAT record too short; missing fields read as zero");
            }
            (le_u16(&buf, 0), le_u16(&buf, 2))
        }
        Revision::Biff5 => {
            let (buf, truncated) = p.fixed::<3>();
            if truncated {
                log::debug!("FORMAT record too short; missing fields read as zero");
            }
            (le_u16(&buf, 0), buf[2] as u16)
        }
    };

    NumberFormat {
        index,
        code: strings.read_field(p, size),
    }
}

/// Parse an XF record (0x00E0), choosing the layout by revision.
pub fn parse_xf(p: &mut Payload<'_>, revision: Revision) -> Xf {
    match revision {
        Revision::Biff8 => parse_xf8(p),
        Revision::Biff5 => parse_xf5(p),
    }
}

fn type_prot_fields(xf: &mut Xf, type_prot: u16) {
    xf.locked = (type_prot & 0x0001) != 0;
    xf.hidden = (type_prot & 0x0002) != 0;
    xf.is_style_xf = (type_prot & 0x0004) != 0;
    xf.parent_index = type_prot >> 4;
}

/// BIFF8 XF, 20 bytes (see [MS-XLS] §2.4.353):
///   0   u16  ifnt           font index
///   2   u16  ifmt           format index
///   4   u16  type/protect   bits 0-1 lock/hidden, bit 2 style-xf, 4-15 parent
///   6   u8   alignment1     bits 0-2 halign, bit 3 wrap, bits 4-6 valign
///   7   u8   trot           text rotation
///   8   u8   alignment2     indent, shrink, reading order
///   9   u8   used_attribs
///  10   u32  border lines/colors 1
///  14   u32  border lines/colors 2 + fill pattern (bits 26-31)
///  18   u16  fill colors
fn parse_xf8(p: &mut Payload<'_>) -> Xf {
    let (buf, truncated) = p.fixed::<20>();
    if truncated {
        log::debug!("XF record too short for BIFF8; missing fields read as zero");
    }

    let mut xf = Xf {
        font_index: le_u16(&buf, 0),
        format_index: le_u16(&buf, 2),
        ..Xf::default()
    };
    type_prot_fields(&mut xf, le_u16(&buf, 4));

    let align1 = buf[6];
    xf.hor_align = align1 & 0x07;
    xf.wrap_text = (align1 & 0x08) != 0;
    xf.vert_align = (align1 >> 4) & 0x07;
    xf.rotation = buf[7];

    let border2 = le_u32(&buf, 14);
    xf.fill_pattern = ((border2 >> 26) & 0x3F) as u8;
    let fill_colors = le_u16(&buf, 18);
    xf.icv_fore = fill_colors & 0x7F;
    xf.icv_back = (fill_colors >> 7) & 0x7F;
    xf
}

/// BIFF5 XF, 16 bytes:
///   0   u16  ifnt
///   2   u16  ifmt
///   4   u16  type/protect   same bits as BIFF8
///   6   u8   alignment      bits 0-2 halign, bit 3 wrap, bits 4-6 valign
///   7   u8   orientation    bits 0-1 (0 none, 1 stacked, 2 ccw, 3 cw)
///   8   u32  fill           bits 0-6 fore, 7-13 back, 16-21 pattern
///  12   u32  borders
fn parse_xf5(p: &mut Payload<'_>) -> Xf {
    let (buf, truncated) = p.fixed::<16>();
    if truncated {
        log::debug!("XF record too short for BIFF5; missing fields read as zero");
    }

    let mut xf = Xf {
        font_index: le_u16(&buf, 0),
        format_index: le_u16(&buf, 2),
        ..Xf::default()
    };
    type_prot_fields(&mut xf, le_u16(&buf, 4));

    let align = buf[6];
    xf.hor_align = align & 0x07;
    xf.wrap_text = (align & 0x08) != 0;
    xf.vert_align = (align >> 4) & 0x07;
    xf.rotation = match buf[7] & 0x03 {
        1 => 255,
        2 => 90,
        3 => 180,
        _ => 0,
    };

    let fill = le_u32(&buf, 8);
    xf.icv_fore = (fill & 0x7F) as u16;
    xf.icv_back = ((fill >> 7) & 0x7F) as u16;
    xf.fill_pattern = ((fill >> 16) & 0x3F) as u8;
    xf
}
