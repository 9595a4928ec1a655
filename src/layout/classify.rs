//! Block classification: label each block and locate its header region.

use super::construct::columns_from_header_lines;
use super::numeric::is_numeric_token;
use super::stats::{coefficient_of_variation, mode_lowest, tokenize, Delimiter, StatBlock};
use crate::ingest::Line;
use crate::table::ColumnSpec;

/// Blocks with a numeric-token ratio below this are prose or headers.
const NARRATIVE_NUMERIC_RATIO: f64 = 0.3;

/// A low-numeric block taller than this cannot be header-only.
const HEADER_ONLY_MAX_LINES: usize = 5;

/// Terminal label for a block. Assigned exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Prose; produces no table.
    Narrative,
    /// Column headers with no data; kept so later data-only blocks can adopt
    /// them.
    HeaderOnly,
    /// Headers and data in one block; produces a table.
    CompleteTabular,
    /// Data with no headers of its own; adopts the nearest preceding
    /// header-only block.
    DataOnly,
}

/// Header geometry of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Offset within the block of a single-token title line, if any.
    pub title_line: Option<usize>,
    /// Number of leading lines (after the title) that are header rows.
    pub extent: usize,
}

/// A block with kind, header geometry, and extracted columns; third
/// pipeline phase.
#[derive(Debug, Clone)]
pub struct ClassifiedBlock<'a> {
    pub stat: StatBlock<'a>,
    pub kind: BlockKind,
    pub layout: HeaderLayout,
    /// Columns extracted from the header region; empty for narrative and
    /// data-only blocks.
    pub columns: Vec<ColumnSpec>,
}

impl<'a> ClassifiedBlock<'a> {
    #[inline]
    pub fn lines(&self) -> &'a [Line] {
        self.stat.lines()
    }

    /// Lines after the title and header rows.
    pub fn data_lines(&self) -> &'a [Line] {
        let skip = self.header_skip().min(self.lines().len());
        &self.lines()[skip..]
    }

    /// Number of leading lines that are not data.
    pub fn header_skip(&self) -> usize {
        usize::from(self.layout.title_line.is_some()) + self.layout.extent
    }

    pub fn title_text(&self) -> Option<&'a str> {
        self.layout.title_line.map(|i| self.lines()[i].stripped())
    }

    pub fn start_line(&self) -> usize {
        self.stat.raw.start_line()
    }

    pub fn end_line(&self) -> usize {
        self.stat.raw.end_line()
    }
}

/// Classify a block. First matching rule wins; the multi-space hypothesis is
/// canonical.
pub fn classify(stat: StatBlock<'_>) -> ClassifiedBlock<'_> {
    let lines = stat.lines();
    let stats = &stat.stats;
    let multi = &stats.multi;

    let layout = detect_header_layout(lines);
    let skip = (usize::from(layout.title_line.is_some()) + layout.extent).min(multi.counts.len());
    let sub_cv = coefficient_of_variation(&multi.counts[skip..]);

    let low_numeric = stats.mean_numeric_ratio < NARRATIVE_NUMERIC_RATIO;
    let kind = if low_numeric && multi.mode == 1 {
        BlockKind::Narrative
    } else if low_numeric && multi.mode > 1 && lines.len() < HEADER_ONLY_MAX_LINES {
        BlockKind::HeaderOnly
    } else if multi.cv == 0.0 && multi.mode > 1 && layout.extent > 0 {
        BlockKind::CompleteTabular
    } else if multi.cv > 0.0 && layout.extent > 0 {
        // Whether the data sub-block is regular (sub_cv == 0) or ragged only
        // changes the construction strategy, not the kind.
        BlockKind::CompleteTabular
    } else if layout.extent == 0 {
        BlockKind::DataOnly
    } else {
        BlockKind::Narrative
    };

    let columns = match kind {
        BlockKind::HeaderOnly | BlockKind::CompleteTabular => {
            let start = usize::from(layout.title_line.is_some());
            columns_from_header_lines(&lines[start..start + layout.extent])
        }
        BlockKind::Narrative | BlockKind::DataOnly => Vec::new(),
    };

    log::debug!(
        "block lines {}..{}: {:?} (extent {}, sub_cv {:.3})",
        stat.raw.start_line(),
        stat.raw.end_line(),
        kind,
        layout.extent,
        sub_cv,
    );

    ClassifiedBlock {
        stat,
        kind,
        layout,
        columns,
    }
}

/// Locate the title line and header extent of a block.
///
/// A line qualifies as a header line when it has no numeric tokens and its
/// multi-space token count is at least the token-count mode of the trailing
/// data portion. A leading single-token line followed by a header line is a
/// title and does not count toward the extent.
pub fn detect_header_layout(lines: &[Line]) -> HeaderLayout {
    let tokens: Vec<Vec<_>> = lines
        .iter()
        .map(|l| tokenize(l, Delimiter::MultiSpace))
        .collect();
    let numeric_free: Vec<bool> = tokens
        .iter()
        .map(|ts| !ts.is_empty() && ts.iter().all(|t| !is_numeric_token(t.text)))
        .collect();

    let title_line = (lines.len() >= 2
        && tokens[0].len() == 1
        && numeric_free[0]
        && numeric_free[1]
        && tokens[1].len() > 1)
        .then_some(0);
    let start = usize::from(title_line.is_some());

    // Leading run of numeric-free lines.
    let mut run = 0;
    for free in &numeric_free[start..] {
        if *free {
            run += 1;
        } else {
            break;
        }
    }

    let data_counts: Vec<usize> = tokens[start + run..].iter().map(Vec::len).collect();
    let extent = if data_counts.is_empty() {
        // No data portion: the whole block is headers.
        run
    } else {
        // The header line adjacent to the data must have at least the data
        // portion's modal token count; upper group-label lines are allowed
        // to be narrower (`Uranium` spanning `238U  235U`).
        let data_mode = mode_lowest(&data_counts);
        let mut extent = run;
        while extent > 0 && tokens[start + extent - 1].len() < data_mode {
            extent -= 1;
        }
        extent
    };

    HeaderLayout { title_line, extent }
}
