//! Numeric-token recognition for block statistics.
//!
//! Paleoclimate tables are full of values that are numeric to a reader but
//! not to `str::parse`: `6.80 (8.98)`, `1.5 ± 0.1`, `10-20`, `2,340`,
//! `-5.1*`. The classifier only needs a numeric/non-numeric verdict per
//! token, so recognition is deliberately permissive. Missing-value markers
//! (`NaN`, `na`, `-`, `–`) count as numeric-like.

use std::sync::LazyLock;

use regex::Regex;

/// Plain number: optional sign, integer or decimal mantissa, optional
/// exponent.
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?$").expect("Invalid number pattern")
});

/// Missing-value markers treated as numeric-like.
static MISSING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(nan|na|-|–)$").expect("Invalid missing pattern"));

/// Annotation marks that trail values in published tables (`-5.1*`, `12°`).
static TRAILING_MARKS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[†‡*°%‰§^~+]+$").expect("Invalid trailing-marks pattern"));

/// Dash variants normalized to ASCII `-` before range handling.
const DASHES: &[char] = &['\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2212}'];

/// True if the token reads as a numeric value.
pub fn is_numeric_token(token: &str) -> bool {
    is_numeric_inner(token, 0)
}

// Parenthetical and range cases recurse on their pieces; depth-capped so a
// pathological token cannot blow the stack.
fn is_numeric_inner(token: &str, depth: usize) -> bool {
    if depth > 4 {
        return false;
    }
    let t = strip_wrapping_brackets(token.trim());
    if t.is_empty() {
        return false;
    }
    if MISSING_PATTERN.is_match(t) {
        return true;
    }

    let norm = normalize(t);
    if NUMBER_PATTERN.is_match(&norm) {
        return true;
    }

    // Value followed by a parenthetical, e.g. "6.80 (8.98)".
    if let Some(open) = t.find('(') {
        if t.ends_with(')') && open > 0 {
            let left = &t[..open];
            let inside = &t[open + 1..t.len() - 1];
            if !left.trim().is_empty()
                && !inside.trim().is_empty()
                && is_numeric_inner(left, depth + 1)
                && is_numeric_inner(inside, depth + 1)
            {
                return true;
            }
        }
    }

    // Uncertainty, e.g. "1.5 ± 0.1".
    if t.contains('±') {
        let parts: Vec<&str> = t.split('±').map(str::trim).filter(|p| !p.is_empty()).collect();
        if parts.len() == 2 && parts.iter().all(|p| is_numeric_inner(p, depth + 1)) {
            return true;
        }
    }

    // Ranges, e.g. "10-20" or "1850–1900". Only interior dashes separate a
    // range, so a leading sign is never mistaken for a separator.
    let mut char_starts = norm.char_indices().map(|(i, _)| i);
    if let (Some(_), Some(second)) = (char_starts.next(), char_starts.next()) {
        if let Some(dash) = norm[second..].find('-').map(|i| i + second) {
            let left = &norm[..dash];
            let right = &norm[dash + 1..];
            if !left.trim().is_empty()
                && !right.trim().is_empty()
                && !right.contains('-')
                && is_numeric_inner(left, depth + 1)
                && is_numeric_inner(right, depth + 1)
            {
                return true;
            }
        }
    }

    // Whitespace-separated cluster that is numeric throughout, e.g. "1 234".
    let ws_parts: Vec<&str> = t.split_whitespace().collect();
    if ws_parts.len() > 1 && ws_parts.iter().all(|p| is_numeric_inner(p, depth + 1)) {
        return true;
    }

    false
}

/// Fraction of tokens that are numeric; 0.0 for an empty token list.
pub fn numeric_ratio<S: AsRef<str>>(tokens: &[S]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let numeric = tokens
        .iter()
        .filter(|t| is_numeric_token(t.as_ref()))
        .count();
    numeric as f64 / tokens.len() as f64
}

/// Strip thousands separators, trailing annotation marks, and unify dashes.
fn normalize(s: &str) -> String {
    let s = s.replace(',', "");
    let s = TRAILING_MARKS_PATTERN.replace(&s, "");
    let mut out = String::with_capacity(s.len());
    for ch in s.trim().chars() {
        if DASHES.contains(&ch) {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    out
}

fn strip_wrapping_brackets(mut s: &str) -> &str {
    loop {
        s = s.trim();
        let mut chars = s.chars();
        match (chars.next(), s.chars().next_back()) {
            (Some(open), Some(close))
                if matches!(open, '(' | '[' | '{') && matches!(close, ')' | ']' | '}') =>
            {
                s = &s[open.len_utf8()..s.len() - close.len_utf8()];
            }
            _ => return s,
        }
    }
}
