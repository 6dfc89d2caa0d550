//! Options for reading workbooks

/// Options for reading a BIFF workbook
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Charset used for single-byte text when the file's CODEPAGE record
    /// is missing or names a table we don't have (e.g. `"koi8-r"`).
    pub charset: Option<String>,
}

impl ReadOptions {
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }
}
