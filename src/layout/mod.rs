//! Layout-based table extraction for files without a template.
//!
//! The pipeline runs in four typed phases, each consuming the previous one:
//!
//! 1. [`segment::RawBlock`] — maximal runs of non-blank lines,
//! 2. [`stats::StatBlock`] — token statistics under three delimiter
//!    hypotheses,
//! 3. [`classify::ClassifiedBlock`] — block kind, title line, header extent,
//!    extracted columns,
//! 4. [`crate::table::Table`] — constructed rows, attached to tabular blocks.
//!
//! Blocks that stay non-tabular are skipped silently; extraction fails only
//! when no block at all yields a table.

pub mod classify;
pub mod construct;
pub mod numeric;
pub mod segment;
pub mod stats;

pub use classify::BlockKind;

use crate::error::{ParseError, Result};
use crate::ingest::Line;
use crate::table::Table;

/// Extract all tables from a non-template file.
///
/// When `skip_to_data_marker` is set, segmentation starts after the first
/// line whose stripped text begins with `data:` (case-insensitive); files
/// without the marker are parsed from the top.
pub fn extract_tables(lines: &[Line], path: &str, skip_to_data_marker: bool) -> Result<Vec<Table>> {
    let start = if skip_to_data_marker {
        match find_data_marker(lines) {
            Some(i) => i + 1,
            None => {
                log::debug!("{path}: no data descriptor line, parsing whole file");
                0
            }
        }
    } else {
        0
    };

    let blocks = segment::segment(lines, start);
    let span = (
        blocks.first().map_or(0, segment::RawBlock::start_line),
        blocks.last().map_or(0, segment::RawBlock::end_line),
    );
    let block_count = blocks.len();

    let classified: Vec<classify::ClassifiedBlock<'_>> = blocks
        .into_iter()
        .map(stats::StatBlock::compute)
        .map(classify::classify)
        .collect();

    let mut tables = Vec::new();
    for (i, block) in classified.iter().enumerate() {
        if let Some(table) = construct::construct(block, &classified[..i]) {
            tables.push(table);
        }
    }

    if tables.is_empty() {
        return Err(ParseError::Parsing {
            path: path.to_string(),
            blocks: block_count,
            start: span.0,
            end: span.1,
        });
    }
    Ok(tables)
}

/// Index of the first `data:` descriptor line, if any.
fn find_data_marker(lines: &[Line]) -> Option<usize> {
    lines
        .iter()
        .position(|l| l.stripped().to_lowercase().starts_with("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Ingestor;

    #[test]
    fn test_extract_single_table() {
        let lines = Ingestor::new().lines_from_bytes(
            b"Core description and sampling notes.\n\
              \n\
              Depth  Age  d18O\n\
              1.0  100  -5.1\n\
              2.0  200  -5.3\n",
        );
        let tables = extract_tables(&lines, "core.txt", false).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column_names(), vec!["Depth", "Age", "d18O"]);
        assert_eq!(tables[0].num_rows(), 2);
        assert_eq!(tables[0].attr("source_block_range"), Some("2..4"));
    }

    #[test]
    fn test_narrative_only_fails() {
        let lines = Ingestor::new().lines_from_bytes(
            b"Just some prose here.\n\nAnd a second paragraph of text.\n",
        );
        let err = extract_tables(&lines, "prose.txt", false).unwrap_err();
        assert!(matches!(err, ParseError::Parsing { blocks: 2, .. }));
    }

    #[test]
    fn test_data_marker_skip() {
        let lines = Ingestor::new().lines_from_bytes(
            b"Ignored  Preamble  Columns\n\
              9  9  9\n\
              \n\
              DATA:\n\
              Depth  Age\n\
              1.0  100\n\
              2.0  200\n",
        );
        let tables = extract_tables(&lines, "f.txt", true).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column_names(), vec!["Depth", "Age"]);
    }

    #[test]
    fn test_marker_missing_parses_whole_file() {
        let lines = Ingestor::new().lines_from_bytes(b"Depth  Age\n1.0  100\n2.0  200\n");
        let tables = extract_tables(&lines, "f.txt", true).unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn test_orphan_data_adopts_headers() {
        let lines = Ingestor::new().lines_from_bytes(
            b"Depth  Age\n\
              \n\
              1.0  100\n\
              2.0  200\n\
              3.0  300\n",
        );
        let tables = extract_tables(&lines, "f.txt", false).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column_names(), vec!["Depth", "Age"]);
        assert_eq!(tables[0].num_rows(), 3);
        assert_eq!(tables[0].attr("adopted_header_block"), Some("0..0"));
    }
}
