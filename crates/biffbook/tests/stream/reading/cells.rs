//! Sheet bodies, bulk table reads and the globals tables.

use biffbook::biff::records;
use biffbook::{CellValue, DateMode, Dimensions, Visibility};
use pretty_assertions::assert_eq;

use crate::{boolean, compressed, labelsst, number, record, sst_header, table, StreamBuilder};

fn two_sheet_book() -> StreamBuilder {
    let mut sst = sst_header(2, 2);
    sst.extend(compressed("x"));
    sst.extend(compressed("y"));

    StreamBuilder::biff8()
        .global(record(records::SST, &sst))
        .sheet("First", vec![labelsst(0, 0, 0), number(1, 2, 1.5)])
        .sheet("Empty", vec![])
        .sheet("Second", vec![boolean(0, 1, true), labelsst(0, 0, 1)])
}

#[test]
fn test_read_all_cells_pads_each_sheet() {
    let mut wb = two_sheet_book().open();
    assert_eq!(
        wb.read_all_cells(100),
        table(&[
            &["x", "", ""],
            &["", "", "1.5"],
            &["y", "TRUE"],
        ])
    );
}

#[test]
fn test_read_all_cells_row_budget() {
    let mut wb = two_sheet_book().open();
    assert_eq!(wb.read_all_cells(1), table(&[&["x", "", ""]]));
    assert!(!wb.is_loaded(2));

    assert_eq!(
        wb.read_all_cells(2),
        table(&[&["x", "", ""], &["", "", "1.5"]])
    );
    assert_eq!(wb.read_all_cells(3).len(), 3);
}

#[test]
fn test_same_sheet_twice_is_identical() {
    let mut wb = two_sheet_book().open();
    let first = wb.get_sheet(2).cloned().unwrap();
    assert!(wb.is_loaded(2));
    assert!(!wb.is_loaded(0));
    let second = wb.get_sheet(2).cloned().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.name(), "Second");
    assert_eq!(first.cell(0, 1), Some(&CellValue::Boolean(true)));
}

#[test]
fn test_out_of_range_sheet_is_none() {
    let mut wb = two_sheet_book().open();
    assert!(wb.get_sheet(3).is_none());
    assert!(wb.get_sheet(usize::MAX).is_none());
    assert_eq!(wb.sheet_count(), 3);
}

#[test]
fn test_sheet_info_without_parsing() {
    let wb = two_sheet_book().open();
    let info = wb.sheet_info(1).unwrap();
    assert_eq!(info.name, "Empty");
    assert_eq!(info.visibility, Visibility::Visible);
    assert_eq!(info.sheet_type, 0);
    assert!(!wb.is_loaded(1));
}

#[test]
fn test_embedded_substream_is_skipped() {
    let chart = [
        crate::bof(crate::BIFF8, 0x0020),
        number(9, 9, 99.0),
        crate::eof(),
    ]
    .concat();

    let mut wb = StreamBuilder::biff8()
        .sheet("S", vec![chart, number(0, 0, 1.0)])
        .open();
    let sheet = wb.get_sheet(0).unwrap();
    assert_eq!(sheet.cell_count(), 1);
    assert_eq!(sheet.cell(0, 0), Some(&CellValue::Number(1.0)));
}

#[test]
fn test_formula_string_result() {
    let mut formula = vec![0x00, 0x00, 0x03, 0x00, 0x00, 0x00];
    formula.extend_from_slice(&[0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
    formula.extend_from_slice(&[0; 6]);
    let mut cached = 3u16.to_le_bytes().to_vec();
    cached.push(0x00);
    cached.extend_from_slice(b"sum");

    let mut wb = StreamBuilder::biff8()
        .sheet(
            "S",
            vec![
                record(records::FORMULA, &formula),
                record(records::STRING, &cached),
            ],
        )
        .open();
    let sheet = wb.get_sheet(0).unwrap();
    assert_eq!(sheet.cell(0, 3), Some(&CellValue::Text("sum".into())));
}

#[test]
fn test_globals_tables() {
    let mut font = 200u16.to_le_bytes().to_vec();
    font.extend_from_slice(&0x0002u16.to_le_bytes());
    font.extend_from_slice(&8u16.to_le_bytes());
    font.extend_from_slice(&700u16.to_le_bytes());
    font.extend_from_slice(&[0, 0, 0, 0, 0, 0, 5, 0x00]);
    font.extend_from_slice(b"Arial");

    let format = |code: &str| {
        let mut body = 164u16.to_le_bytes().to_vec();
        body.extend(compressed(code));
        record(records::FORMAT, &body)
    };

    let mut xf = 1u16.to_le_bytes().to_vec();
    xf.extend_from_slice(&164u16.to_le_bytes());
    xf.extend_from_slice(&[0; 16]);

    let wb = StreamBuilder::biff8()
        .global(record(records::DATEMODE, &1u16.to_le_bytes()))
        .global(record(records::FONT, &font))
        .global(format("0.0"))
        .global(format("0.000"))
        .global(record(records::XF, &xf))
        .open();

    assert_eq!(wb.date_mode(), DateMode::Epoch1904);
    assert_eq!(wb.fonts().len(), 1);
    assert_eq!(wb.fonts()[0].name, "Arial");
    assert!(wb.fonts()[0].italic);
    assert!(wb.fonts()[0].is_bold());
    assert_eq!(wb.fonts()[0].size_points(), 10.0);

    assert_eq!(wb.formats().len(), 1);
    assert_eq!(wb.format(164).map(|f| f.code.as_str()), Some("0.000"));
    assert_eq!(wb.styles().len(), 1);
    assert_eq!(wb.styles()[0].font_index, 1);
    assert_eq!(wb.styles()[0].format_index, 164);
}

#[test]
fn test_records_after_globals_eof_are_not_globals() {
    // A second SST inside a sheet must not replace the workbook table.
    let mut sst = sst_header(1, 1);
    sst.extend(compressed("global"));
    let mut late = sst_header(1, 1);
    late.extend(compressed("late"));

    let wb = StreamBuilder::biff8()
        .global(record(records::SST, &sst))
        .sheet("S", vec![record(records::SST, &late)])
        .open();
    assert_eq!(wb.shared_string(0), Some("global"));
}

#[test]
fn test_declared_dimensions() {
    let mut dims = 0u32.to_le_bytes().to_vec();
    dims.extend_from_slice(&3u32.to_le_bytes());
    dims.extend_from_slice(&0u16.to_le_bytes());
    dims.extend_from_slice(&2u16.to_le_bytes());
    dims.extend_from_slice(&[0, 0]);

    let mut wb = StreamBuilder::biff8()
        .sheet("Sized", vec![record(records::DIMENSIONS, &dims), number(2, 1, 7.0)])
        .sheet("Bare", vec![number(0, 0, 1.0)])
        .open();

    let sized = wb.get_sheet(0).cloned().unwrap();
    assert_eq!(
        sized.dimensions(),
        Some(Dimensions {
            first_row: 0,
            last_row_plus1: 3,
            first_col: 0,
            last_col_plus1: 2,
        })
    );
    assert_eq!(sized.max_row(), Some(2));
    assert_eq!(wb.get_sheet(1).unwrap().dimensions(), None);
}
