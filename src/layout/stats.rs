//! Per-block token statistics under the three delimiter hypotheses.
//!
//! Tokenization is a single pass that yields each token together with its
//! half-open `[start_col, end_col)` character interval, so no component ever
//! re-scans a line to recover positions. Space-based hypotheses run on the
//! tab-expanded text; the tab hypothesis runs on the raw text.

use foldhash::{HashMap, HashMapExt};

use super::numeric::numeric_ratio;
use super::segment::RawBlock;
use crate::ingest::Line;

/// A delimiter hypothesis for tokenizing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Any whitespace run separates tokens.
    SingleSpace,
    /// Only runs of two or more whitespace characters separate tokens; a
    /// token may contain single interior spaces (`Sample ID`).
    MultiSpace,
    /// Tab characters separate tokens (raw text, before expansion).
    Tab,
}

impl Delimiter {
    /// All hypotheses, in the order they are preferred for direct
    /// construction (most explicit first).
    pub const ALL: [Delimiter; 3] = [Delimiter::Tab, Delimiter::MultiSpace, Delimiter::SingleSpace];
}

/// A token and its character interval within its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Inclusive start column.
    pub start: usize,
    /// Exclusive end column.
    pub end: usize,
}

impl Token<'_> {
    /// Twice the interval midpoint; integer so tie-breaking stays exact.
    #[inline]
    pub fn midpoint2(&self) -> usize {
        self.start + self.end
    }
}

/// Tokenize a line under the given hypothesis.
pub fn tokenize(line: &Line, delimiter: Delimiter) -> Vec<Token<'_>> {
    match delimiter {
        Delimiter::SingleSpace => split_on_whitespace(&line.expanded, 1),
        Delimiter::MultiSpace => split_on_whitespace(&line.expanded, 2),
        Delimiter::Tab => split_on_tabs(&line.raw),
    }
}

/// Split on whitespace runs of at least `min_run` characters.
///
/// Positions are character columns; byte offsets are tracked alongside so
/// token texts can be borrowed without allocation.
fn split_on_whitespace(text: &str, min_run: usize) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let n = chars.len();
    let mut i = 0;

    while i < n {
        // Skip separator whitespace.
        while i < n && chars[i].1.is_whitespace() {
            i += 1;
        }
        if i >= n {
            break;
        }

        let start = i;
        let mut last_nonws = i;
        while i < n {
            if !chars[i].1.is_whitespace() {
                last_nonws = i;
                i += 1;
                continue;
            }
            // Whitespace: measure the run.
            let mut j = i;
            while j < n && chars[j].1.is_whitespace() {
                j += 1;
            }
            if j - i >= min_run || j == n {
                break;
            }
            // Short interior run; the token continues past it.
            i = j;
        }

        let byte_start = chars[start].0;
        let byte_end = chars[last_nonws].0 + chars[last_nonws].1.len_utf8();
        tokens.push(Token {
            text: &text[byte_start..byte_end],
            start,
            end: last_nonws + 1,
        });
    }

    tokens
}

/// Split on `\t`; empty fields are dropped and each token is trimmed, with
/// its interval tightened to the trimmed text.
fn split_on_tabs(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut col = 0usize;
    for part in text.split('\t') {
        let part_cols = part.chars().count();
        let trimmed = part.trim();
        if !trimmed.is_empty() {
            let lead = part.chars().take_while(|c| c.is_whitespace()).count();
            let start = col + lead;
            tokens.push(Token {
                text: trimmed,
                start,
                end: start + trimmed.chars().count(),
            });
        }
        col += part_cols + 1;
    }
    tokens
}

/// Token-count statistics for one delimiter hypothesis.
#[derive(Debug, Clone)]
pub struct DelimiterStats {
    /// Per-line token counts, in line order.
    pub counts: Vec<usize>,
    /// Most common count; lowest value wins ties.
    pub mode: usize,
    /// Coefficient of variation of the counts; 0 for constant series.
    pub cv: f64,
}

impl DelimiterStats {
    fn from_counts(counts: Vec<usize>) -> Self {
        let mode = mode_lowest(&counts);
        let cv = coefficient_of_variation(&counts);
        Self { counts, mode, cv }
    }
}

/// Aggregate statistics for a block.
#[derive(Debug, Clone)]
pub struct BlockStats {
    pub single: DelimiterStats,
    pub multi: DelimiterStats,
    pub tab: DelimiterStats,
    /// Mean over lines of (numeric tokens / total tokens), computed under
    /// the single-space hypothesis.
    pub mean_numeric_ratio: f64,
}

impl BlockStats {
    pub fn for_delimiter(&self, delimiter: Delimiter) -> &DelimiterStats {
        match delimiter {
            Delimiter::SingleSpace => &self.single,
            Delimiter::MultiSpace => &self.multi,
            Delimiter::Tab => &self.tab,
        }
    }
}

/// A block annotated with its statistics; second pipeline phase.
#[derive(Debug, Clone)]
pub struct StatBlock<'a> {
    pub raw: RawBlock<'a>,
    pub stats: BlockStats,
}

impl<'a> StatBlock<'a> {
    /// Consume a raw block and annotate it.
    pub fn compute(raw: RawBlock<'a>) -> Self {
        let stats = compute_stats(raw.lines);
        Self { raw, stats }
    }

    #[inline]
    pub fn lines(&self) -> &'a [Line] {
        self.raw.lines
    }
}

fn compute_stats(lines: &[Line]) -> BlockStats {
    let mut single_counts = Vec::with_capacity(lines.len());
    let mut multi_counts = Vec::with_capacity(lines.len());
    let mut tab_counts = Vec::with_capacity(lines.len());
    let mut ratio_sum = 0.0;

    for line in lines {
        let single = tokenize(line, Delimiter::SingleSpace);
        ratio_sum += numeric_ratio(
            &single.iter().map(|t| t.text).collect::<Vec<_>>(),
        );
        single_counts.push(single.len());
        multi_counts.push(tokenize(line, Delimiter::MultiSpace).len());
        tab_counts.push(tokenize(line, Delimiter::Tab).len());
    }

    let mean_numeric_ratio = if lines.is_empty() {
        0.0
    } else {
        ratio_sum / lines.len() as f64
    };

    BlockStats {
        single: DelimiterStats::from_counts(single_counts),
        multi: DelimiterStats::from_counts(multi_counts),
        tab: DelimiterStats::from_counts(tab_counts),
        mean_numeric_ratio,
    }
}

/// Most common value; the lowest value wins ties. 0 for an empty series.
pub fn mode_lowest(values: &[usize]) -> usize {
    if values.is_empty() {
        return 0;
    }
    let mut freq: HashMap<usize, usize> = HashMap::with_capacity(values.len());
    for &v in values {
        *freq.entry(v).or_insert(0) += 1;
    }
    freq.into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then(vb.cmp(va)))
        .map_or(0, |(v, _)| v)
}

/// stddev/mean over the series; 0 for empty, constant, or zero-mean series.
pub fn coefficient_of_variation(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    variance.sqrt() / mean
}
