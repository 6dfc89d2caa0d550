//! # biffbook
//!
//! Reader for the BIFF5/BIFF8 record streams inside legacy `.xls` files.
//!
//! The workbook globals (shared strings, fonts, number formats, XF styles,
//! codepage and sheet directory) are read once when a [`Workbook`] is
//! created. Sheet bodies are parsed on first access.
//!
//! ```no_run
//! use biffbook::{ReadOptions, Workbook};
//!
//! let mut wb = Workbook::open("report.xls", &ReadOptions::default())?;
//! for name in wb.sheet_names() {
//!     println!("{name}");
//! }
//! let rows = wb.read_all_cells(1000);
//! # Ok::<(), biffbook::BiffError>(())
//! ```
//!
//! Text in files without a usable CODEPAGE record can be decoded with a
//! charset hint:
//!
//! ```no_run
//! # use biffbook::{ReadOptions, Workbook};
//! let options = ReadOptions::default().with_charset("koi8-r");
//! let wb = Workbook::open("legacy.xls", &options)?;
//! # Ok::<(), biffbook::BiffError>(())
//! ```

pub mod biff;
pub mod charset;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod reader;
pub mod sheet;
pub mod sst;
pub mod styles;
pub mod workbook;

pub use biff::{Record, RecordReader, Revision};
pub use charset::{Charset, CharsetResolver};
pub use dispatch::{DateMode, SheetDescriptor, WorkbookState};
pub use error::{BiffError, BiffResult};
pub use options::ReadOptions;
pub use sheet::{
    CellDecoder, CellError, CellValue, Dimensions, SheetContext, SheetDecoder, Visibility,
    Worksheet,
};
pub use sst::SharedStringTable;
pub use styles::{Font, NumberFormat, Xf};
pub use workbook::Workbook;
