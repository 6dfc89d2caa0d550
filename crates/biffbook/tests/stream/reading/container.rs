//! Reading record streams out of OLE2 containers on disk.

use std::io::Write;

use biffbook::{BiffError, ReadOptions, Workbook};
use pretty_assertions::assert_eq;

use crate::{codepage, label, StreamBuilder};

fn write_container(path: &std::path::Path, stream_name: &str, data: &[u8]) {
    let mut cfb = cfb::create(path).unwrap();
    {
        let mut stream = cfb.create_stream(stream_name).unwrap();
        stream.write_all(data).unwrap();
    }
    cfb.flush().unwrap();
}

#[test]
fn test_open_workbook_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xls");

    let mut encoded = vec![0x00];
    encoded.extend_from_slice(b"hello");
    let stream = StreamBuilder::biff8()
        .sheet("Sheet1", vec![label(0, 0, 5, &encoded)])
        .build();
    write_container(&path, "/Workbook", &stream);

    let mut wb = Workbook::open(&path, &ReadOptions::default()).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Sheet1"]);
    assert_eq!(wb.read_all_cells(10), crate::table(&[&["hello"]]));
}

#[test]
fn test_open_biff5_book_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.xls");

    let stream = StreamBuilder::biff5()
        .global(codepage(1252))
        .sheet("Old", vec![label(0, 0, 3, b"abc")])
        .build();
    write_container(&path, "/Book", &stream);

    let mut wb = Workbook::open(&path, &ReadOptions::default()).unwrap();
    assert!(wb.is_legacy());
    assert_eq!(wb.read_all_cells(10), crate::table(&[&["abc"]]));
}

#[test]
fn test_container_without_workbook_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.xls");
    write_container(&path, "/Contents", &[0; 8]);

    let err = Workbook::open(&path, &ReadOptions::default()).err().unwrap();
    assert!(matches!(err, BiffError::InvalidFormat(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Workbook::open(dir.path().join("absent.xls"), &ReadOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, BiffError::Io(_)));
}
