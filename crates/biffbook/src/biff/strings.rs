//! Resumable BIFF string decoding.
//!
//! BIFF8 strings have a complex encoding:
//! - Header: char_count (1 or 2 bytes, read by the caller) + flags (1 byte)
//! - Flags bit 0 (`fHighByte`): 0 = compressed 8-bit, 1 = UTF-16LE
//! - Flags bit 2 (`fExtSt`): 4-byte phonetic block size follows
//! - Flags bit 3 (`fRichSt`): 2-byte rich text run count follows
//! - Then the character data
//! - Then the rich text runs (4 bytes each)
//! - Then the phonetic block
//!
//! BIFF5 strings are just `char_count` bytes in the workbook codepage.
//!
//! When a record ends inside a string, the decoder returns the prefix it
//! has and leaves the rest in a [`DecodeCarry`]. The next CONTINUE record
//! starts with a fresh flags byte (the encoding may switch between
//! compressed and UTF-16 there) followed by the remaining characters, and
//! [`StringDecoder::resume`] picks up from the carry.

use super::payload::Payload;
use super::Revision;
use crate::charset::CharsetResolver;

const FLAG_HIGH_BYTE: u8 = 0x01;
const FLAG_PHONETIC: u8 = 0x04;
const FLAG_RICH_TEXT: u8 = 0x08;

/// Rich-text run size. Only flagged (BIFF8) strings carry runs; BIFF5
/// strings have no flags byte and are decoded as raw bytes.
const RICH_RUN_BYTES: u32 = 4;

/// Residual state of a string cut short by the end of a record.
///
/// Resolution order on the next record is fixed: text, then the rich-text
/// block, then the phonetic block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeCarry {
    /// Character units still to read.
    pub text_units: u16,
    /// Rich-text run bytes still to skip.
    pub rich_bytes: u32,
    /// Phonetic block bytes still to skip.
    pub phonetic_bytes: u32,
    /// Low byte of a UTF-16 unit whose high byte is in the next record.
    dangling_byte: Option<u8>,
    /// High surrogate whose low half is in the next record.
    high_surrogate: Option<u16>,
}

impl DecodeCarry {
    /// Anything at all left to consume.
    pub fn is_pending(&self) -> bool {
        self.has_text() || self.rich_bytes > 0 || self.phonetic_bytes > 0
    }

    /// Characters of the open string are still outstanding.
    pub fn has_text(&self) -> bool {
        self.text_units > 0 || self.dangling_byte.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of one decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The string and its trailing blocks were fully consumed.
    Complete(String),
    /// The payload ended first. The text decoded so far is returned; the
    /// remainder lives in the carry.
    Partial(String),
}

impl Decoded {
    pub fn text(&self) -> &str {
        match self {
            Decoded::Complete(s) | Decoded::Partial(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Decoded::Complete(s) | Decoded::Partial(s) => s,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Decoded::Complete(_))
    }
}

/// Decodes strings for one workbook revision and codepage.
#[derive(Debug, Clone, Copy)]
pub struct StringDecoder<'a> {
    revision: Revision,
    charset: &'a CharsetResolver,
}

impl<'a> StringDecoder<'a> {
    pub fn new(revision: Revision, charset: &'a CharsetResolver) -> Self {
        Self { revision, charset }
    }

    /// Decode a string of `size` characters whose length prefix has
    /// already been read.
    pub fn decode(&self, p: &mut Payload<'_>, size: u16, carry: &mut DecodeCarry) -> Decoded {
        match self.revision {
            Revision::Biff5 => self.decode_raw(p, size, carry),
            Revision::Biff8 => self.decode_flagged(p, size, carry),
        }
    }

    /// Continue a string held in `carry` at the start of a CONTINUE payload.
    pub fn resume(&self, p: &mut Payload<'_>, carry: &mut DecodeCarry) -> Decoded {
        if carry.has_text() {
            let units = std::mem::take(&mut carry.text_units);
            return self.decode(p, units, carry);
        }
        if self.finish_skips(p, carry) {
            Decoded::Complete(String::new())
        } else {
            Decoded::Partial(String::new())
        }
    }

    /// Decode a self-contained field (font name, sheet name, ...). Whatever
    /// does not fit in the payload is dropped.
    pub fn read_field(&self, p: &mut Payload<'_>, size: u16) -> String {
        let mut carry = DecodeCarry::default();
        let decoded = self.decode(p, size, &mut carry);
        if !decoded.is_complete() {
            log::debug!(
                "string field in record 0x{:04X} cut short ({} chars missing)",
                p.id(),
                carry.text_units
            );
        }
        decoded.into_text()
    }

    /// Read a string with a 16-bit length prefix (LABEL, STRING, FORMAT).
    pub fn read_u16_prefixed(&self, p: &mut Payload<'_>) -> Option<String> {
        let size = p.read_u16().ok()?;
        Some(self.read_field(p, size))
    }

    fn decode_raw(&self, p: &mut Payload<'_>, size: u16, carry: &mut DecodeCarry) -> Decoded {
        let bytes = p.take_up_to(size as usize);
        let text = self.charset.decode(bytes);
        carry.text_units = size - bytes.len() as u16;
        if carry.text_units > 0 {
            Decoded::Partial(text)
        } else {
            Decoded::Complete(text)
        }
    }

    fn decode_flagged(&self, p: &mut Payload<'_>, size: u16, carry: &mut DecodeCarry) -> Decoded {
        let flags = match p.read_u8() {
            Ok(f) => f,
            Err(_) => {
                carry.text_units = size;
                return Decoded::Partial(String::new());
            }
        };

        // Counts read here replace carried ones; otherwise a carried count
        // from the interrupted string stays in force.
        if flags & FLAG_RICH_TEXT != 0 {
            match p.read_u16() {
                Ok(runs) => carry.rich_bytes = runs as u32 * RICH_RUN_BYTES,
                Err(e) => log::debug!("rich-text run count unreadable: {e}"),
            }
        }
        if flags & FLAG_PHONETIC != 0 {
            match p.read_u32() {
                Ok(n) => carry.phonetic_bytes = n,
                Err(e) => log::debug!("phonetic block size unreadable: {e}"),
            }
        }

        let text = if flags & FLAG_HIGH_BYTE != 0 {
            self.read_utf16(p, size, carry)
        } else {
            self.read_compressed(p, size, carry)
        };

        if carry.has_text() {
            return Decoded::Partial(text);
        }
        if self.finish_skips(p, carry) {
            Decoded::Complete(text)
        } else {
            Decoded::Partial(text)
        }
    }

    /// Units left over from the previous record: a carried high surrogate
    /// and a unit whose high byte opens this payload.
    fn carried_units(
        &self,
        p: &mut Payload<'_>,
        remaining: &mut u16,
        carry: &mut DecodeCarry,
    ) -> Vec<u16> {
        let mut units: Vec<u16> = carry.high_surrogate.take().into_iter().collect();
        if let Some(lo) = carry.dangling_byte.take() {
            match p.read_u8() {
                Ok(hi) => {
                    units.push(u16::from_le_bytes([lo, hi]));
                    *remaining = remaining.saturating_sub(1);
                }
                Err(_) => carry.dangling_byte = Some(lo),
            }
        }
        units
    }

    fn read_utf16(&self, p: &mut Payload<'_>, size: u16, carry: &mut DecodeCarry) -> String {
        let mut remaining = size;
        let mut units = self.carried_units(p, &mut remaining, carry);
        if carry.dangling_byte.is_some() {
            carry.text_units = remaining;
            return String::new();
        }

        let bytes = p.take_up_to(remaining as usize * 2);
        let mut chunks = bytes.chunks_exact(2);
        for pair in &mut chunks {
            units.push(u16::from_le_bytes([pair[0], pair[1]]));
        }
        remaining -= (bytes.len() / 2) as u16;
        if let [lo] = chunks.remainder() {
            carry.dangling_byte = Some(*lo);
        }
        carry.text_units = remaining;

        if carry.has_text() {
            if let Some(&last) = units.last() {
                if (0xD800..=0xDBFF).contains(&last) {
                    carry.high_surrogate = units.pop();
                }
            }
        }
        String::from_utf16_lossy(&units)
    }

    fn read_compressed(&self, p: &mut Payload<'_>, size: u16, carry: &mut DecodeCarry) -> String {
        let mut remaining = size;
        let units = self.carried_units(p, &mut remaining, carry);
        let mut text = String::from_utf16_lossy(&units);
        if carry.dangling_byte.is_some() {
            carry.text_units = remaining;
            return text;
        }

        let bytes = p.take_up_to(remaining as usize);
        text.push_str(&self.charset.decode(bytes));
        carry.text_units = remaining - bytes.len() as u16;
        text
    }

    /// Skip pending rich-text then phonetic bytes. Returns `true` when
    /// nothing is left to skip.
    fn finish_skips(&self, p: &mut Payload<'_>, carry: &mut DecodeCarry) -> bool {
        if carry.rich_bytes > 0 {
            carry.rich_bytes -= p.skip_up_to(carry.rich_bytes as usize) as u32;
            if carry.rich_bytes > 0 {
                return false;
            }
        }
        if carry.phonetic_bytes > 0 {
            carry.phonetic_bytes -= p.skip_up_to(carry.phonetic_bytes as usize) as u32;
            if carry.phonetic_bytes > 0 {
                return false;
            }
        }
        true
    }
}
