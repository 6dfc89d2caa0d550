//! Bounded cursor over a single record payload.
//!
//! All multi-byte integers in BIFF are little-endian. A `Payload` never
//! reads past its own record: every read either succeeds in full or fails
//! with [`BiffError::RecordTruncated`] and leaves the position untouched,
//! except the explicit partial helpers (`take_up_to`, `skip_up_to`).

use crate::error::{BiffError, BiffResult};

/// Read cursor over the payload of one record.
#[derive(Debug, Clone)]
pub struct Payload<'a> {
    id: u16,
    data: &'a [u8],
    pos: usize,
}

impl<'a> Payload<'a> {
    /// Create a cursor over `data`, tagged with the owning record id for
    /// error reporting.
    pub fn new(id: u16, data: &'a [u8]) -> Self {
        Self { id, data, pos: 0 }
    }

    /// Record id this payload belongs to.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the payload.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn truncated(&self, needed: usize) -> BiffError {
        BiffError::RecordTruncated {
            id: self.id,
            needed,
            available: self.remaining(),
        }
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> BiffResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.truncated(n));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> BiffResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> BiffResult<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    #[inline]
    pub fn read_u32(&mut self) -> BiffResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    #[inline]
    pub fn read_f64(&mut self) -> BiffResult<f64> {
        let b = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(f64::from_le_bytes(raw))
    }

    /// Take up to `n` bytes; fewer are returned when the payload ends.
    pub fn take_up_to(&mut self, n: usize) -> &'a [u8] {
        let n = n.min(self.remaining());
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        out
    }

    /// Skip up to `n` bytes, returning how many were actually skipped.
    pub fn skip_up_to(&mut self, n: usize) -> usize {
        let n = n.min(self.remaining());
        self.pos += n;
        n
    }

    /// Copy a fixed-width header of `N` bytes.
    ///
    /// Missing trailing bytes are left as zero; the flag reports whether
    /// the payload was shorter than the layout.
    pub fn fixed<const N: usize>(&mut self) -> ([u8; N], bool) {
        let mut out = [0u8; N];
        let got = self.take_up_to(N);
        out[..got.len()].copy_from_slice(got);
        (out, got.len() < N)
    }
}

/// Little-endian `u16` at `off` inside a fixed layout buffer.
#[inline]
pub(crate) fn le_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

/// Little-endian `u32` at `off` inside a fixed layout buffer.
#[inline]
pub(crate) fn le_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}
