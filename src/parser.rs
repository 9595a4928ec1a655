//! Top-level parser: configuration, file-type gate, and template dispatch.

use std::path::Path;

use crate::error::{ParseError, Result};
use crate::ingest::{Ingestor, Line, DEFAULT_TAB_WIDTH};
use crate::layout;
use crate::standard;
use crate::table::Table;
use crate::template::{self, TemplateKind, DEFAULT_SCAN_LIMIT};

/// Table extractor for paleoclimatology text files.
///
/// # Example
///
/// ```no_run
/// use paleotab::Parser;
///
/// let parser = Parser::new();
/// let tables = parser.parse_path("study.txt").unwrap();
/// for table in &tables {
///     println!("{} columns, {} rows", table.width(), table.num_rows());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    tab_width: usize,
    template_scan_limit: usize,
    extra_sentinels: Vec<String>,
    skip_to_data_marker: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser with default settings.
    pub const fn new() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            template_scan_limit: DEFAULT_SCAN_LIMIT,
            extra_sentinels: Vec::new(),
            skip_to_data_marker: false,
        }
    }

    /// Column width for tab expansion (default 8). Affects all downstream
    /// interval arithmetic.
    pub fn tab_width(&mut self, tab_width: usize) -> &mut Self {
        self.tab_width = tab_width;
        self
    }

    /// How many leading lines are scanned for template sentinels
    /// (default 200).
    pub fn template_scan_limit(&mut self, limit: usize) -> &mut Self {
        self.template_scan_limit = limit;
        self
    }

    /// Add a section name to the template sentinel vocabulary.
    pub fn sentinel(&mut self, word: impl Into<String>) -> &mut Self {
        self.extra_sentinels.push(word.into());
        self
    }

    /// Start non-template parsing after the first `DATA:` descriptor line
    /// (default off). Files without the marker are parsed from the top.
    pub fn skip_to_data_marker(&mut self, skip: bool) -> &mut Self {
        self.skip_to_data_marker = skip;
        self
    }

    /// Parse a file on disk.
    pub fn parse_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Table>> {
        let path = path.as_ref();
        let display = path.display().to_string();
        check_extension(&display)?;
        let lines = Ingestor::with_tab_width(self.tab_width).read_path(path)?;
        self.parse_lines(&lines, &display)
    }

    /// Parse in-memory bytes. `name_hint` supplies the filename used for the
    /// plain-text gate and for error reporting.
    pub fn parse_bytes(&self, data: &[u8], name_hint: &str) -> Result<Vec<Table>> {
        check_extension(name_hint)?;
        let lines = Ingestor::with_tab_width(self.tab_width).lines_from_bytes(data);
        self.parse_lines(&lines, name_hint)
    }

    fn parse_lines(&self, lines: &[Line], path: &str) -> Result<Vec<Table>> {
        match template::classify(lines, self.template_scan_limit, &self.extra_sentinels) {
            TemplateKind::Standard => {
                log::debug!("{path}: template file");
                let (table, _metadata) = standard::parse_standard(lines, path)?;
                Ok(vec![table])
            }
            TemplateKind::NonStandard => {
                log::debug!("{path}: no template, inferring layout");
                layout::extract_tables(lines, path, self.skip_to_data_marker)
            }
        }
    }
}

/// Reject anything that is not hinted as plain text.
fn check_extension(name: &str) -> Result<()> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if extension != "txt" {
        return Err(ParseError::UnsupportedFileType {
            path: name.to_string(),
            extension,
        });
    }
    Ok(())
}
