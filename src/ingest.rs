//! File ingestion: bytes to physical lines.
//!
//! The ingestor is the only component that touches bytes. It decodes the
//! input (UTF-8 preferred, latin-1 fallback), splits on `\n` stripping any
//! trailing `\r`, and expands tabs to fixed column stops so that all
//! downstream column arithmetic is well-defined. Positions are character
//! offsets, not byte offsets.

use std::fs;
use std::path::Path;

use crate::encoding::decode_text;
use crate::error::{ParseError, Result};

/// Column width used for tab expansion unless overridden.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// A physical line of the input file.
///
/// `raw` preserves the original text (tabs intact, line terminator removed);
/// `expanded` is the tab-expanded form every interval-based component works
/// on. The expansion is applied once here and never revisited.
#[derive(Debug, Clone)]
pub struct Line {
    /// Zero-based line number in the source file.
    pub index: usize,
    /// Original text with the trailing `\n`/`\r\n` removed.
    pub raw: String,
    /// Tab-expanded text; all token intervals refer to this.
    pub expanded: String,
    /// Number of leading whitespace characters in the expanded text.
    pub leading_ws: usize,
}

impl Line {
    /// The expanded text with surrounding whitespace removed.
    pub fn stripped(&self) -> &str {
        self.expanded.trim()
    }

    /// True if the line contains only whitespace.
    pub fn is_blank(&self) -> bool {
        self.stripped().is_empty()
    }
}

/// Loads file bytes and produces the line sequence.
#[derive(Debug, Clone)]
pub struct Ingestor {
    tab_width: usize,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    pub const fn new() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    pub const fn with_tab_width(tab_width: usize) -> Self {
        Self { tab_width }
    }

    /// Read a file and split it into lines.
    ///
    /// Fails only if the file is unreadable; encoding never fails.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Line>> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ParseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(self.lines_from_bytes(&data))
    }

    /// Split in-memory bytes into lines.
    pub fn lines_from_bytes(&self, data: &[u8]) -> Vec<Line> {
        let text = decode_text(data);
        let mut lines = Vec::with_capacity(bytecount::count(data, b'\n') + 1);

        for (index, raw) in text.split('\n').enumerate() {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let expanded = expand_tabs(raw, self.tab_width);
            let leading_ws = expanded
                .chars()
                .take_while(|c| c.is_whitespace())
                .count();
            lines.push(Line {
                index,
                raw: raw.to_string(),
                expanded,
                leading_ws,
            });
        }

        // A trailing newline produces one empty final line; drop it so line
        // counts match what editors display.
        if lines.last().is_some_and(|l| l.raw.is_empty()) {
            lines.pop();
        }

        lines
    }
}

/// Expand tabs to `tab_width`-column stops.
///
/// Columns are counted in characters of the expanded output, so a tab after
/// a multibyte character still lands on the correct stop.
fn expand_tabs(raw: &str, tab_width: usize) -> String {
    if !raw.contains('\t') {
        return raw.to_string();
    }
    let width = tab_width.max(1);
    let mut out = String::with_capacity(raw.len() + width);
    let mut col = 0usize;
    for ch in raw.chars() {
        if ch == '\t' {
            let pad = width - (col % width);
            for _ in 0..pad {
                out.push(' ');
            }
            col += pad;
        } else {
            out.push(ch);
            col += 1;
        }
    }
    out
}
