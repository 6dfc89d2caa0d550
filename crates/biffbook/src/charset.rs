//! Single-byte text decoding with codepage/charset fallback.
//!
//! Byte strings in a workbook (BIFF5 text, compressed BIFF8 text) carry no
//! encoding of their own. The table is chosen per decode call:
//!
//! 1. the CODEPAGE record of the file, when it maps to a known table;
//! 2. the caller's charset hint (`ReadOptions::charset`);
//! 3. Windows-1252.
//!
//! A table that rejects the bytes falls through to the next step, and the
//! last step decodes under Windows-1252 with replacement, so decoding never
//! fails outright.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{BiffError, BiffResult};

/// UTF-16LE, declared by every BIFF8 file. Compressed strings in such
/// files are plain Latin-1 and fall through to the hint/default.
pub const CODEPAGE_UTF16: u16 = 1200;

/// A single-byte decode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// A table provided by `encoding_rs`.
    Table(&'static Encoding),
    /// Every byte is its own code point (ISO-8859-1).
    ///
    /// `encoding_rs` follows WHATWG and aliases ISO-8859-1 to
    /// Windows-1252, which differs in 0x80..=0x9F.
    Latin1,
}

impl Charset {
    /// The fallback table.
    pub fn western() -> Self {
        Charset::Table(encoding_rs::WINDOWS_1252)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Charset::Table(enc) => enc.name(),
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode without replacement characters.
    pub fn decode_strict(&self, bytes: &[u8]) -> BiffResult<String> {
        match self {
            Charset::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
            Charset::Table(enc) => enc
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned)
                .ok_or(BiffError::DecodeFailure {
                    encoding: enc.name(),
                }),
        }
    }

    /// Decode, substituting U+FFFD for anything unmappable.
    pub fn decode_lossy(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Latin1 => bytes.iter().copied().map(char::from).collect(),
            Charset::Table(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
        }
    }
}

/// Map a Windows codepage identifier (CODEPAGE record) to a table.
pub fn for_codepage(codepage: u16) -> Option<Charset> {
    use encoding_rs::*;

    Some(match codepage {
        874 => Charset::Table(WINDOWS_874),
        1250 => Charset::Table(WINDOWS_1250),
        1251 => Charset::Table(WINDOWS_1251),
        1252 | 32769 => Charset::Table(WINDOWS_1252),
        1253 => Charset::Table(WINDOWS_1253),
        1254 => Charset::Table(WINDOWS_1254),
        1255 => Charset::Table(WINDOWS_1255),
        1256 => Charset::Table(WINDOWS_1256),
        1257 => Charset::Table(WINDOWS_1257),
        1258 => Charset::Table(WINDOWS_1258),
        10000 | 32768 => Charset::Table(MACINTOSH),
        20866 => Charset::Table(KOI8_R),
        21866 => Charset::Table(KOI8_U),
        28591 => Charset::Latin1,
        28592 => Charset::Table(ISO_8859_2),
        28595 => Charset::Table(ISO_8859_5),
        // No separate ISO-8859-9 table; 1254 agrees on every printable byte.
        28599 => Charset::Table(WINDOWS_1254),
        28605 => Charset::Table(ISO_8859_15),
        _ => return None,
    })
}

/// Map a charset name hint to a table. Matching is case-insensitive.
pub fn for_label(label: &str) -> Option<Charset> {
    use encoding_rs::*;

    let label = label.trim().to_ascii_lowercase();
    Some(match label.as_str() {
        "windows-1250" | "cp1250" => Charset::Table(WINDOWS_1250),
        "windows-1251" | "cp1251" => Charset::Table(WINDOWS_1251),
        "windows-1252" | "cp1252" => Charset::Table(WINDOWS_1252),
        "windows-1253" | "cp1253" => Charset::Table(WINDOWS_1253),
        "windows-1254" | "cp1254" => Charset::Table(WINDOWS_1254),
        "windows-1255" | "cp1255" => Charset::Table(WINDOWS_1255),
        "windows-1256" | "cp1256" => Charset::Table(WINDOWS_1256),
        "windows-1257" | "cp1257" => Charset::Table(WINDOWS_1257),
        "windows-1258" | "cp1258" => Charset::Table(WINDOWS_1258),
        "windows-874" | "cp874" => Charset::Table(WINDOWS_874),
        // Compressed strings hold one byte per character; "utf-8" means
        // "take the bytes as code points".
        "utf-8" | "utf8" => Charset::Latin1,
        "iso-8859-1" | "latin1" => Charset::Latin1,
        "iso-8859-2" | "latin2" => Charset::Table(ISO_8859_2),
        "iso-8859-5" => Charset::Table(ISO_8859_5),
        "iso-8859-9" | "latin5" => Charset::Table(WINDOWS_1254),
        "iso-8859-15" | "latin9" => Charset::Table(ISO_8859_15),
        "koi8-r" => Charset::Table(KOI8_R),
        "koi8-u" => Charset::Table(KOI8_U),
        "macintosh" | "mac-roman" => Charset::Table(MACINTOSH),
        _ => return None,
    })
}

/// Picks the decode table for the workbook being read.
#[derive(Debug, Clone)]
pub struct CharsetResolver {
    codepage: Option<Charset>,
    hint: Option<Charset>,
}

impl CharsetResolver {
    /// Build a resolver from the caller's charset hint. Unknown hint names
    /// are ignored.
    pub fn new(hint: Option<&str>) -> Self {
        let hint = hint.and_then(|name| {
            let found = for_label(name);
            if found.is_none() {
                log::warn!("unknown charset hint {name:?}; ignoring it");
            }
            found
        });
        Self {
            codepage: None,
            hint,
        }
    }

    /// Record the CODEPAGE value read from the stream.
    pub fn set_codepage(&mut self, codepage: u16) {
        self.codepage = for_codepage(codepage);
        if self.codepage.is_none() {
            let err = BiffError::UnsupportedCodepage(codepage);
            if codepage == CODEPAGE_UTF16 {
                log::debug!("{err}; compressed strings use the hint/default table");
            } else {
                log::warn!("{err}; falling back to charset hint or Windows-1252");
            }
        }
    }

    /// The table the cascade would try first.
    pub fn preferred(&self) -> Charset {
        self.codepage
            .or(self.hint)
            .unwrap_or_else(Charset::western)
    }

    /// Decode single-byte text through the cascade.
    pub fn decode(&self, bytes: &[u8]) -> String {
        if bytes.is_ascii() {
            // Every supported table is ASCII-compatible.
            return bytes.iter().copied().map(char::from).collect();
        }

        if let Some(cs) = self.codepage {
            match cs.decode_strict(bytes) {
                Ok(s) => return s,
                Err(e) => log::debug!("{e}; trying next table"),
            }
        }

        let chosen = self.hint.unwrap_or_else(Charset::western);
        match chosen.decode_strict(bytes) {
            Ok(s) => s,
            Err(e) => {
                log::debug!("{e}; decoding as Windows-1252");
                Charset::western().decode_lossy(bytes)
            }
        }
    }
}

impl Default for CharsetResolver {
    fn default() -> Self {
        Self::new(None)
    }
}
