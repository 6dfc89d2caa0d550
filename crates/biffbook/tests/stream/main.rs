//! Integration tests: build record streams by hand, read them back through
//! the public `Workbook` API and check what comes out.

mod common;

pub use common::*;
