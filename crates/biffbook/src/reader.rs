//! OLE2 container access.
//!
//! A `.xls` file is a Compound File Binary (CFB) container. The record
//! stream lives in a stream named `Workbook` (BIFF8) or `Book` (BIFF5).
//! The helpers here copy that stream into memory so the record reader can
//! seek freely to sheet offsets.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::{BiffError, BiffResult};

/// Stream names holding the record stream, in lookup order.
pub const STREAM_NAMES: [&str; 2] = ["/Workbook", "/Book"];

/// Extract the record stream from a CFB container.
pub fn workbook_stream<R: Read + Seek>(reader: R) -> BiffResult<Cursor<Vec<u8>>> {
    let mut cfb = cfb::CompoundFile::open(reader)?;

    let Some(stream_path) = STREAM_NAMES.into_iter().find(|name| cfb.exists(name)) else {
        return Err(BiffError::InvalidFormat(
            "no Workbook or Book stream found in CFB".into(),
        ));
    };
    log::debug!("reading record stream {stream_path}");

    let mut stream_data = Vec::new();
    {
        let mut stream = cfb.open_stream(stream_path)?;
        stream.read_to_end(&mut stream_data)?;
    }
    Ok(Cursor::new(stream_data))
}

/// Extract the record stream from a `.xls` file on disk.
pub fn read_workbook_stream<P: AsRef<Path>>(path: P) -> BiffResult<Cursor<Vec<u8>>> {
    let file = File::open(path.as_ref())?;
    workbook_stream(file)
}
