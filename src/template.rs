//! Template detection: decide whether a file follows the NOAA commented
//! template before any parsing happens.
//!
//! The decision peeks at the first lines only. A file is Standard when it
//! carries at least one `#`-prefixed sentinel line; everything else goes to
//! the layout-based parser.

use crate::ingest::Line;

/// How many leading lines are examined for sentinels.
pub const DEFAULT_SCAN_LIMIT: usize = 200;

/// Section names that mark a line as a template sentinel when they follow
/// `# ` at the start of a line.
pub const SECTION_VOCABULARY: &[&str] = &[
    "Site_Name",
    "Variables",
    "Data",
    "Title",
    "Investigators",
    "Contribution_Date",
    "Study_Name",
    "NOTE:",
    "Publication",
    "Chronology_Information",
];

/// Outcome of template detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// NOAA commented template: `#` metadata sections, tab-delimited data.
    Standard,
    /// Free-form text; structure must be inferred from layout.
    NonStandard,
}

/// Classify the file from its leading lines.
///
/// `extra_sentinels` extends the built-in section vocabulary; matching is
/// exact on the first token after `# `.
pub fn classify(lines: &[Line], scan_limit: usize, extra_sentinels: &[String]) -> TemplateKind {
    for line in lines.iter().take(scan_limit) {
        if is_sentinel(line.stripped(), extra_sentinels) {
            return TemplateKind::Standard;
        }
    }
    TemplateKind::NonStandard
}

fn is_sentinel(stripped: &str, extra_sentinels: &[String]) -> bool {
    if stripped.starts_with("##") {
        return true;
    }
    let Some(rest) = stripped.strip_prefix("# ") else {
        return false;
    };
    let Some(first_token) = rest.split_whitespace().next() else {
        return false;
    };
    // Section headers sometimes carry a trailing colon (`# Title:`).
    let bare = first_token.strip_suffix(':').unwrap_or(first_token);
    SECTION_VOCABULARY
        .iter()
        .any(|s| *s == first_token || s.strip_suffix(':') == Some(first_token) || *s == bare)
        || extra_sentinels
            .iter()
            .any(|s| s == first_token || s == bare)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Ingestor;

    fn classify_text(text: &str) -> TemplateKind {
        let lines = Ingestor::new().lines_from_bytes(text.as_bytes());
        classify(&lines, DEFAULT_SCAN_LIMIT, &[])
    }

    #[test]
    fn test_standard_double_hash() {
        let kind = classify_text("# Some preamble\n## age\tage\n1000\t-5.1\n");
        assert_eq!(kind, TemplateKind::Standard);
    }

    #[test]
    fn test_standard_section_header() {
        let kind = classify_text("# Contribution_Date\n#   Date: 2015-01-01\n");
        assert_eq!(kind, TemplateKind::Standard);
    }

    #[test]
    fn test_standard_note_line() {
        let kind = classify_text("# NOTE: please cite the original reference\n");
        assert_eq!(kind, TemplateKind::Standard);
    }

    #[test]
    fn test_nonstandard_free_text() {
        let kind = classify_text("Oxygen isotope record from core MD98-2181\n\nDepth  Age\n");
        assert_eq!(kind, TemplateKind::NonStandard);
    }

    #[test]
    fn test_hash_without_vocabulary_is_nonstandard() {
        // A bare comment is not enough; the word after `# ` must be known.
        let kind = classify_text("# just a remark\n1 2 3\n");
        assert_eq!(kind, TemplateKind::NonStandard);
    }

    #[test]
    fn test_extra_sentinel() {
        let lines = Ingestor::new().lines_from_bytes(b"# Core_Depth\n1\t2\n");
        let extras = vec!["Core_Depth".to_string()];
        assert_eq!(
            classify(&lines, DEFAULT_SCAN_LIMIT, &extras),
            TemplateKind::Standard
        );
        assert_eq!(
            classify(&lines, DEFAULT_SCAN_LIMIT, &[]),
            TemplateKind::NonStandard
        );
    }

    #[test]
    fn test_scan_limit_respected() {
        let mut text = String::new();
        for _ in 0..10 {
            text.push_str("narrative line\n");
        }
        text.push_str("# Variables\n");
        let lines = Ingestor::new().lines_from_bytes(text.as_bytes());
        assert_eq!(classify(&lines, 5, &[]), TemplateKind::NonStandard);
        assert_eq!(classify(&lines, 20, &[]), TemplateKind::Standard);
    }
}
