//! Block segmentation: split the line stream into maximal runs of non-blank
//! lines.

use crate::ingest::Line;

/// A maximal run of consecutive non-blank lines; first pipeline phase.
///
/// Blocks borrow the caller's line buffer; consecutive blank lines coalesce
/// and zero-line blocks are never emitted.
#[derive(Debug, Clone, Copy)]
pub struct RawBlock<'a> {
    /// Sequential block index in file order.
    pub index: usize,
    pub lines: &'a [Line],
}

impl RawBlock<'_> {
    /// Line number of the first line of the block.
    pub fn start_line(&self) -> usize {
        self.lines.first().map_or(0, |l| l.index)
    }

    /// Line number of the last line of the block.
    pub fn end_line(&self) -> usize {
        self.lines.last().map_or(0, |l| l.index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Split `lines` into blocks, starting at line offset `start`.
pub fn segment(lines: &[Line], start: usize) -> Vec<RawBlock<'_>> {
    let mut blocks = Vec::new();
    let mut run_start: Option<usize> = None;

    for i in start..lines.len() {
        if lines[i].is_blank() {
            if let Some(s) = run_start.take() {
                blocks.push(RawBlock {
                    index: blocks.len(),
                    lines: &lines[s..i],
                });
            }
        } else if run_start.is_none() {
            run_start = Some(i);
        }
    }
    if let Some(s) = run_start {
        blocks.push(RawBlock {
            index: blocks.len(),
            lines: &lines[s..],
        });
    }

    blocks
}
