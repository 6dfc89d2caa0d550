//! Shared string table assembly across SST and CONTINUE records.

use biffbook::biff::records;
use pretty_assertions::assert_eq;

use crate::{
    codepage, compressed, continue_record, record, sst_header, utf16_bytes, wide, StreamBuilder,
};

fn sst(body: &[u8]) -> Vec<u8> {
    record(records::SST, body)
}

#[test]
fn test_split_string_end_to_end() {
    let mut first = sst_header(1, 1);
    first.extend_from_slice(&[0x02, 0x00, 0x00, b'H']);

    let wb = StreamBuilder::biff8()
        .global(codepage(1252))
        .global(sst(&first))
        .global(continue_record(&[0x00, b'i']))
        .sheet("Sheet1", vec![])
        .open();

    assert_eq!(wb.sheet_count(), 1);
    assert_eq!(wb.sheet_names(), vec!["Sheet1"]);
    assert_eq!(wb.shared_string(0), Some("Hi"));
    assert_eq!(wb.codepage(), 1252);
    assert!(!wb.is_legacy());
}

#[test]
fn test_table_length_matches_declared_count() {
    let strings = ["alpha", "beta", "gamma", "delta", "epsilon"];
    let mut encoded = Vec::new();
    for s in strings {
        encoded.extend(compressed(s));
    }

    // Cut the packed strings into three records at arbitrary points.
    let mut first = sst_header(9, 5);
    first.extend_from_slice(&encoded[..11]);
    let second = &encoded[11..19];
    let third = &encoded[19..];

    // Cuts inside character data need the continuation flag byte.
    let mut second_body = vec![0x00];
    second_body.extend_from_slice(second);
    let mut third_body = vec![0x00];
    third_body.extend_from_slice(third);

    let wb = StreamBuilder::biff8()
        .global(sst(&first))
        .global(continue_record(&second_body))
        .global(continue_record(&third_body))
        .open();

    assert_eq!(wb.shared_strings().len(), 5);
    assert_eq!(wb.shared_strings().iter().collect::<Vec<_>>(), strings);
    assert_eq!(wb.state().sst().declared_total(), 9);
}

#[test]
fn test_missing_strings_leave_empty_entries() {
    let mut body = sst_header(3, 3);
    body.extend(compressed("only"));

    let wb = StreamBuilder::biff8().global(sst(&body)).open();
    assert_eq!(wb.shared_strings().len(), 3);
    assert_eq!(wb.shared_string(0), Some("only"));
    assert_eq!(wb.shared_string(1), Some(""));
    assert_eq!(wb.shared_string(2), Some(""));
    assert_eq!(wb.shared_string(3), None);
}

#[test]
fn test_utf16_split_mid_unit_matches_unsplit() {
    let text = "Привет";
    let data = utf16_bytes(text);

    let mut whole = sst_header(1, 1);
    whole.extend(wide(text));
    let unsplit = StreamBuilder::biff8().global(sst(&whole)).open();

    // 5 of 12 data bytes in the SST record: the third unit is cut in half.
    let mut first = sst_header(1, 1);
    first.extend_from_slice(&6u16.to_le_bytes());
    first.push(0x01);
    first.extend_from_slice(&data[..5]);
    let mut rest = vec![0x01];
    rest.extend_from_slice(&data[5..]);
    let split = StreamBuilder::biff8()
        .global(sst(&first))
        .global(continue_record(&rest))
        .open();

    assert_eq!(unsplit.shared_string(0), Some(text));
    assert_eq!(split.shared_strings(), unsplit.shared_strings());
}

#[test]
fn test_rich_runs_across_boundary_are_skipped() {
    // "A" with two rich-text runs (8 bytes); 3 bytes fit in the SST record.
    let mut first = sst_header(2, 2);
    first.extend_from_slice(&[0x01, 0x00, 0x08, 0x02, 0x00, b'A']);
    first.extend_from_slice(&[0xAA; 3]);

    let mut rest = vec![0xAA; 5];
    rest.extend(compressed("B"));

    let wb = StreamBuilder::biff8()
        .global(sst(&first))
        .global(continue_record(&rest))
        .open();

    assert_eq!(wb.shared_strings().iter().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn test_phonetic_block_across_boundary_is_skipped() {
    // "ab" with a 6-byte phonetic block; 2 bytes of it fit.
    let mut first = sst_header(2, 2);
    first.extend_from_slice(&[0x02, 0x00, 0x04]);
    first.extend_from_slice(&6u32.to_le_bytes());
    first.extend_from_slice(b"ab");
    first.extend_from_slice(&[0xBB; 2]);

    let mut rest = vec![0xBB; 4];
    rest.extend(wide("ü"));

    let wb = StreamBuilder::biff8()
        .global(sst(&first))
        .global(continue_record(&rest))
        .open();

    assert_eq!(wb.shared_strings().iter().collect::<Vec<_>>(), vec!["ab", "ü"]);
}

#[test]
fn test_orphan_continue_is_ignored() {
    let mut body = sst_header(1, 1);
    body.extend(compressed("kept"));

    let wb = StreamBuilder::biff8()
        .global(continue_record(&compressed("stray")))
        .global(sst(&body))
        .global(codepage(1252))
        .global(continue_record(&compressed("also stray")))
        .open();

    assert_eq!(wb.shared_strings().iter().collect::<Vec<_>>(), vec!["kept"]);
}

#[test]
fn test_labelsst_cells_resolve_through_table() {
    let mut body = sst_header(2, 2);
    body.extend(compressed("left"));
    body.extend(wide("правый"));

    let mut wb = StreamBuilder::biff8()
        .global(sst(&body))
        .sheet(
            "Data",
            vec![
                crate::labelsst(0, 0, 0),
                crate::labelsst(0, 1, 1),
                crate::labelsst(1, 0, 7),
            ],
        )
        .open();

    let sheet = wb.get_sheet(0).unwrap();
    assert_eq!(sheet.cell(0, 0).map(ToString::to_string).as_deref(), Some("left"));
    assert_eq!(sheet.cell(0, 1).map(ToString::to_string).as_deref(), Some("правый"));
    assert_eq!(sheet.cell(1, 0), None);
}

#[test]
fn test_rich_runs_after_split_text_are_skipped() {
    // "abcd" with one rich run, cut after "ab".
    let mut first = sst_header(2, 2);
    first.extend_from_slice(&[0x04, 0x00, 0x08, 0x01, 0x00, b'a', b'b']);
    let mut second = vec![0x00, b'c', b'd', 0x01, 0x00, 0x02, 0x00];
    second.extend(compressed("Z"));

    let wb = StreamBuilder::biff8()
        .global(sst(&first))
        .global(continue_record(&second))
        .open();

    assert_eq!(
        wb.shared_strings().iter().collect::<Vec<_>>(),
        vec!["abcd", "Z"]
    );
}

#[test]
fn test_phonetic_block_after_split_text_is_skipped() {
    let mut first = sst_header(2, 2);
    first.extend_from_slice(&[0x03, 0x00, 0x04]);
    first.extend_from_slice(&5u32.to_le_bytes());
    first.push(b'x');
    let mut second = vec![0x00, b'y', b'z', 1, 2, 3, 4, 5];
    second.extend(compressed("Z"));

    let wb = StreamBuilder::biff8()
        .global(sst(&first))
        .global(continue_record(&second))
        .open();

    assert_eq!(
        wb.shared_strings().iter().collect::<Vec<_>>(),
        vec!["xyz", "Z"]
    );
}

#[test]
fn test_rich_runs_after_split_utf16_text_are_skipped() {
    let mut first = sst_header(2, 2);
    first.extend_from_slice(&[0x02, 0x00, 0x09, 0x01, 0x00]);
    first.extend(utf16_bytes("Ж"));
    let mut second = vec![0x01];
    second.extend(utf16_bytes("Я"));
    second.extend_from_slice(&[0x00, 0x00, 0x01, 0x00]);
    second.extend(compressed("Z"));

    let wb = StreamBuilder::biff8()
        .global(sst(&first))
        .global(continue_record(&second))
        .open();

    assert_eq!(
        wb.shared_strings().iter().collect::<Vec<_>>(),
        vec!["ЖЯ", "Z"]
    );
}
