//! Table construction: header merging, row building, and the
//! interval-overlap assignment used for misaligned data.

use foldhash::{HashMap, HashMapExt};

use super::classify::{BlockKind, ClassifiedBlock};
use super::stats::{coefficient_of_variation, tokenize, Delimiter, Token};
use crate::ingest::Line;
use crate::table::{ColumnSpec, Row, Table};

/// Build a table for a classified block, if it is tabular.
///
/// `earlier` holds the already-classified preceding blocks, searched backward
/// when a data-only block needs to adopt headers. Narrative and header-only
/// blocks produce no table.
pub fn construct<'a>(
    block: &ClassifiedBlock<'a>,
    earlier: &[ClassifiedBlock<'a>],
) -> Option<Table> {
    match block.kind {
        BlockKind::Narrative | BlockKind::HeaderOnly => None,
        BlockKind::CompleteTabular => construct_complete(block),
        BlockKind::DataOnly => construct_adopted(block, earlier),
    }
}

fn construct_complete(block: &ClassifiedBlock<'_>) -> Option<Table> {
    if block.columns.is_empty() {
        return None;
    }
    let data = block.data_lines();
    if data.is_empty() {
        return None;
    }

    let mut table = Table::new(block.columns.clone());
    let rows = match consistent_delimiter(data) {
        Some(delimiter) => rows_direct(data, delimiter, table.width()),
        None => rows_by_overlap(data, &table.columns),
    };
    for row in rows {
        table.push_row(row);
    }
    attach_block_attrs(&mut table, block);
    Some(table)
}

fn construct_adopted<'a>(
    block: &ClassifiedBlock<'a>,
    earlier: &[ClassifiedBlock<'a>],
) -> Option<Table> {
    let header_block = earlier
        .iter()
        .rev()
        .find(|b| b.kind == BlockKind::HeaderOnly && !b.columns.is_empty())?;

    let data = block.lines();
    let width = header_block.columns.len();
    let mut table = Table::new(header_block.columns.clone());

    // Prefer direct construction under a delimiter whose modal token count
    // matches the adopted column count.
    let direct = Delimiter::ALL
        .into_iter()
        .find(|d| block.stat.stats.for_delimiter(*d).mode == width);
    let rows = match direct {
        Some(delimiter) => rows_direct(data, delimiter, width),
        None => rows_by_overlap(data, &table.columns),
    };
    for row in rows {
        table.push_row(row);
    }
    attach_block_attrs(&mut table, block);
    table.attrs.insert(
        "adopted_header_block".to_string(),
        format!("{}..{}", header_block.start_line(), header_block.end_line()),
    );
    Some(table)
}

fn attach_block_attrs(table: &mut Table, block: &ClassifiedBlock<'_>) {
    table.attrs.insert(
        "source_block_range".to_string(),
        format!("{}..{}", block.start_line(), block.end_line()),
    );
    if let Some(title) = block.title_text() {
        table.attrs.insert("title".to_string(), title.to_string());
    }
}

/// First delimiter hypothesis under which every data line has the same
/// multi-token count, in `Delimiter::ALL` preference order.
fn consistent_delimiter(data: &[Line]) -> Option<Delimiter> {
    Delimiter::ALL.into_iter().find(|d| {
        let counts: Vec<usize> = data.iter().map(|l| tokenize(l, *d).len()).collect();
        counts.first().is_some_and(|&c| c > 1) && coefficient_of_variation(&counts) == 0.0
    })
}

/// Build column specs from the header lines of a block.
///
/// A single header line maps tokens to columns directly. Multiple header
/// lines are merged by interval overlap: each token of the bottom (most
/// granular) line becomes a column whose interval is widened over the upper
/// tokens it overlaps, and whose name concatenates those tokens top-to-bottom
/// before the bottom token itself.
pub fn columns_from_header_lines(header_lines: &[Line]) -> Vec<ColumnSpec> {
    if header_lines.is_empty() {
        return Vec::new();
    }

    let rows: Vec<Vec<Token<'_>>> = header_lines
        .iter()
        .map(|l| tokenize(l, Delimiter::MultiSpace))
        .collect();

    let mut columns = if rows.len() == 1 {
        rows[0]
            .iter()
            .map(|t| ColumnSpec::with_interval(t.text, (t.start, t.end)))
            .collect()
    } else {
        merge_header_rows(&rows)
    };

    disambiguate_names(&mut columns);
    columns
}

fn merge_header_rows(rows: &[Vec<Token<'_>>]) -> Vec<ColumnSpec> {
    let Some(bottom) = rows.last() else {
        return Vec::new();
    };
    let upper = &rows[..rows.len() - 1];

    bottom
        .iter()
        .map(|t| {
            let anchor = (t.start, t.end);
            let mut interval = anchor;
            let mut parts: Vec<&str> = Vec::new();
            for row in upper {
                for u in row {
                    if intervals_overlap((u.start, u.end), anchor) {
                        interval = (interval.0.min(u.start), interval.1.max(u.end));
                        parts.push(u.text);
                    }
                }
            }
            parts.push(t.text);
            ColumnSpec::with_interval(parts.join(" "), interval)
        })
        .collect()
}

/// Append `_2, _3, …` to repeated names, left to right; the first occurrence
/// keeps its bare name.
fn disambiguate_names(columns: &mut [ColumnSpec]) {
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(columns.len());
    for column in columns.iter_mut() {
        let count = seen.entry(column.name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            column.name = format!("{}_{}", column.name, count);
        }
    }
}

/// Build rows by direct tokenization under a consistent delimiter.
///
/// Short rows are right-padded with null; overflow tokens are folded into the
/// last column.
pub fn rows_direct(data: &[Line], delimiter: Delimiter, width: usize) -> Vec<Row> {
    data.iter()
        .map(|line| {
            let tokens = tokenize(line, delimiter);
            let mut row: Row = Vec::with_capacity(width);
            if width > 0 && tokens.len() > width {
                for t in &tokens[..width - 1] {
                    row.push(Some(t.text.to_string()));
                }
                let tail: Vec<&str> = tokens[width - 1..].iter().map(|t| t.text).collect();
                row.push(Some(tail.join(" ")));
            } else {
                for t in &tokens {
                    row.push(Some(t.text.to_string()));
                }
                row.resize(width, None);
            }
            row
        })
        .collect()
}

/// Build rows by assigning each token to the column with the greatest
/// interval overlap.
///
/// Ties go to the column whose midpoint is nearest the token's, then to the
/// leftmost. Tokens overlapping no column go to the nearest column lying
/// entirely to their right, or to the rightmost column when none exists.
/// Tokens landing on an occupied cell are concatenated left-to-right with a
/// single space.
pub fn rows_by_overlap(data: &[Line], columns: &[ColumnSpec]) -> Vec<Row> {
    data.iter()
        .map(|line| {
            let mut row: Row = vec![None; columns.len()];
            for token in tokenize(line, Delimiter::MultiSpace) {
                let Some(j) = best_column(&token, columns) else {
                    continue;
                };
                match &mut row[j] {
                    Some(cell) => {
                        cell.push(' ');
                        cell.push_str(token.text);
                    }
                    empty => *empty = Some(token.text.to_string()),
                }
            }
            row
        })
        .collect()
}

fn best_column(token: &Token<'_>, columns: &[ColumnSpec]) -> Option<usize> {
    if columns.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize, usize)> = None; // (index, overlap, midpoint distance)
    for (j, column) in columns.iter().enumerate() {
        let Some(interval) = column.interval else {
            continue;
        };
        let overlap = interval_overlap((token.start, token.end), interval);
        if overlap == 0 {
            continue;
        }
        let distance = (interval.0 + interval.1).abs_diff(token.midpoint2());
        let better = match best {
            None => true,
            Some((_, best_overlap, best_distance)) => {
                overlap > best_overlap || (overlap == best_overlap && distance < best_distance)
            }
        };
        if better {
            best = Some((j, overlap, distance));
        }
    }
    if let Some((j, _, _)) = best {
        return Some(j);
    }

    // Free token: nearest column starting at or beyond the token's end.
    let right = columns
        .iter()
        .enumerate()
        .filter_map(|(j, c)| c.interval.filter(|(lo, _)| *lo >= token.end).map(|(lo, _)| (j, lo)))
        .min_by_key(|&(_, lo)| lo)
        .map(|(j, _)| j);
    Some(right.unwrap_or(columns.len() - 1))
}

/// Overlap length of two half-open intervals.
fn interval_overlap(a: (usize, usize), b: (usize, usize)) -> usize {
    a.1.min(b.1).saturating_sub(a.0.max(b.0))
}

fn intervals_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    interval_overlap(a, b) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Ingestor;

    fn lines(text: &str) -> Vec<Line> {
        Ingestor::new().lines_from_bytes(text.as_bytes())
    }

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_single_header_line() {
        let lines = lines("Depth  Age  d18O\n");
        let columns = columns_from_header_lines(&lines);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Depth", "Age", "d18O"]);
        assert_eq!(columns[0].interval, Some((0, 5)));
    }

    #[test]
    fn test_merge_two_header_lines() {
        let lines = lines(
            "Sample  Uranium series      Date\n\
             ID      238U  235U  error   yr\n",
        );
        let columns = columns_from_header_lines(&lines);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Sample ID",
                "Uranium series 238U",
                "Uranium series 235U",
                "Uranium series error",
                "Date yr"
            ]
        );
        // Widened over the group label.
        assert_eq!(columns[1].interval, Some((8, 22)));
    }

    #[test]
    fn test_duplicate_names_disambiguated() {
        let lines = lines("Age  Error  Age  Error\n");
        let columns = columns_from_header_lines(&lines);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Age", "Error", "Age_2", "Error_2"]);
    }

    #[test]
    fn test_rows_direct_exact() {
        let data = lines("1.0  100\n2.0  200\n");
        let rows = rows_direct(&data, Delimiter::MultiSpace, 2);
        assert_eq!(rows[0], vec![cell("1.0"), cell("100")]);
        assert_eq!(rows[1], vec![cell("2.0"), cell("200")]);
    }

    #[test]
    fn test_rows_direct_pads_short() {
        let data = lines("1.0  100\n2.0\n");
        let rows = rows_direct(&data, Delimiter::MultiSpace, 2);
        assert_eq!(rows[1], vec![cell("2.0"), None]);
    }

    #[test]
    fn test_rows_direct_folds_overflow_into_last() {
        let data = lines("1.0  100  extra  note\n");
        let rows = rows_direct(&data, Delimiter::MultiSpace, 2);
        assert_eq!(rows[0], vec![cell("1.0"), cell("100 extra note")]);
    }

    #[test]
    fn test_overlap_assignment_basic() {
        let header = lines("Depth   Age     d18O\n");
        let columns = columns_from_header_lines(&header);
        let data = lines("1.0     100     -5.1\n");
        let rows = rows_by_overlap(&data, &columns);
        assert_eq!(rows[0], vec![cell("1.0"), cell("100"), cell("-5.1")]);
    }

    #[test]
    fn test_overlap_missing_column_is_null() {
        let header = lines("Depth   Age     d18O\n");
        let columns = columns_from_header_lines(&header);
        let data = lines("1.0             -5.1\n");
        let rows = rows_by_overlap(&data, &columns);
        assert_eq!(rows[0], vec![cell("1.0"), None, cell("-5.1")]);
    }

    #[test]
    fn test_overlap_two_tokens_same_column_concatenate() {
        let header = lines("Comment                 Age\n");
        let columns = columns_from_header_lines(&header);
        // Both leading tokens overlap only the wide first column.
        let data = lines("see  note               100\n");
        let rows = rows_by_overlap(&data, &columns);
        assert_eq!(rows[0], vec![cell("see note"), cell("100")]);
    }

    #[test]
    fn test_free_token_goes_to_right_hand_column() {
        let columns = vec![
            ColumnSpec::with_interval("a", (10, 14)),
            ColumnSpec::with_interval("b", (20, 24)),
        ];
        // Token occupies columns 0..3: overlaps nothing, column "a" starts
        // to its right.
        let data = lines("xyz\n");
        let rows = rows_by_overlap(&data, &columns);
        assert_eq!(rows[0], vec![cell("xyz"), None]);
    }

    #[test]
    fn test_free_token_falls_back_to_rightmost() {
        let columns = vec![
            ColumnSpec::with_interval("a", (0, 3)),
            ColumnSpec::with_interval("b", (5, 8)),
        ];
        // Token at columns 12..15 lies beyond every column.
        let data = lines("            xyz\n");
        let rows = rows_by_overlap(&data, &columns);
        assert_eq!(rows[0], vec![None, cell("xyz")]);
    }

    #[test]
    fn test_overlap_tie_broken_by_midpoint() {
        // Token at 2..8 overlaps both columns by 2; "a"'s midpoint is nearer.
        let columns = vec![
            ColumnSpec::with_interval("a", (0, 4)),
            ColumnSpec::with_interval("b", (6, 12)),
        ];
        let data = lines("  xxxxxx\n");
        let rows = rows_by_overlap(&data, &columns);
        assert_eq!(rows[0], vec![cell("xxxxxx"), None]);
    }

    #[test]
    fn test_overlap_assignment_stable() {
        let header = lines("Sample  238U   error\n");
        let columns = columns_from_header_lines(&header);
        let data = lines("KL-1   2.31  0.05\nKL-2       2.28\n");
        let first = rows_by_overlap(&data, &columns);
        let second = rows_by_overlap(&data, &columns);
        assert_eq!(first, second);
    }
}
