//! Parser for NOAA commented-template files.
//!
//! Commented (`#`) lines form the metadata region; the trailing uncommented
//! block is the tab-delimited data region. The template is parsed strictly:
//! a file with a template header but no data region fails the whole file.

use std::io::Cursor;

use crate::error::{ParseError, Result};
use crate::ingest::Line;
use crate::table::{ColumnSpec, Row, Table};

/// One variable declaration from the `Variables` section.
///
/// Template variable lines are `##`-prefixed and tab-delimited:
/// `## name<TAB>long_name<TAB>what<TAB>material<TAB>error<TAB>units
/// <TAB>seasonality<TAB>archive<TAB>detail<TAB>method<TAB>data_type`.
/// Missing trailing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableRecord {
    pub name: String,
    pub long_name: String,
    pub what: String,
    pub material: String,
    pub error: String,
    pub units: String,
    pub seasonality: String,
    pub archive: String,
    pub detail: String,
    pub method: String,
    pub data_type: String,
}

impl VariableRecord {
    fn from_tab_line(rest: &str) -> Self {
        let fields: Vec<&str> = rest.split('\t').map(str::trim).collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("").to_string();
        Self {
            name: field(0),
            long_name: field(1),
            what: field(2),
            material: field(3),
            error: field(4),
            units: field(5),
            seasonality: field(6),
            archive: field(7),
            detail: field(8),
            method: field(9),
            data_type: field(10),
        }
    }
}

/// A named metadata section and its key/value entries, in file order.
///
/// Keys keep their original case; lookups compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Metadata extracted from the commented region of a template file.
#[derive(Debug, Clone, Default)]
pub struct MetadataDict {
    /// Sections in file order. Entries before any section header land in an
    /// unnamed root section.
    pub sections: Vec<Section>,
    /// Variable declarations, in file order; these seed the column list.
    pub variables: Vec<VariableRecord>,
}

impl MetadataDict {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Look up a key within a section, case-insensitively.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Any key within any section, case-insensitively.
    fn find_key(&self, key: &str) -> Option<&str> {
        self.sections.iter().find_map(|s| s.get(key))
    }

    /// Study title, wherever the template put it.
    pub fn title(&self) -> Option<&str> {
        self.find_key("study_name").or_else(|| self.find_key("title"))
    }

    pub fn investigators(&self) -> Option<&str> {
        self.find_key("investigators")
    }

    pub fn publication(&self) -> Option<&Section> {
        self.section("Publication")
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let i = match self.sections.iter().position(|s| s.name == name) {
            Some(i) => i,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[i]
    }
}

/// Parse a template file into one table plus its metadata.
pub fn parse_standard(lines: &[Line], path: &str) -> Result<(Table, MetadataDict)> {
    let data_start = lines
        .iter()
        .rposition(|l| l.stripped().starts_with('#'))
        .map_or(0, |i| i + 1);

    let metadata = parse_metadata(&lines[..data_start]);

    let data_lines: Vec<&Line> = lines[data_start..]
        .iter()
        .filter(|l| !l.is_blank())
        .collect();
    if data_lines.is_empty() {
        return Err(ParseError::EmptyData {
            path: path.to_string(),
        });
    }

    let mut rows = parse_data_rows(&data_lines);
    let max_row_len = rows.iter().map(Vec::len).max().unwrap_or(0);

    let columns = determine_columns(&metadata, &mut rows, max_row_len);
    let mut table = Table::new(columns);

    let width = table.width();
    let mut trimmed = false;
    for row in rows {
        if row.len() > width {
            trimmed = true;
        }
        let mut cells: Row = row.into_iter().map(Some).collect();
        cells.truncate(width);
        cells.resize(width, None);
        table.push_row(cells);
    }

    flatten_metadata(&metadata, &mut table);
    if trimmed {
        log::warn!("{path}: data rows wider than {width} columns were trimmed");
        table.attrs.insert(
            "trim_warning".to_string(),
            format!("rows wider than {width} columns were trimmed"),
        );
    }

    Ok((table, metadata))
}

/// Walk the commented lines, tracking the current section.
fn parse_metadata(lines: &[Line]) -> MetadataDict {
    let mut metadata = MetadataDict::default();
    let mut current_section = String::new();

    for line in lines {
        let raw_trimmed = line.raw.trim_start();
        if !raw_trimmed.starts_with('#') {
            continue;
        }

        // `##` marks a variable declaration; split its raw text so the tab
        // delimiters survive.
        if let Some(rest) = raw_trimmed.strip_prefix("##") {
            metadata
                .variables
                .push(VariableRecord::from_tab_line(rest.trim_start_matches(' ')));
            continue;
        }

        let content = raw_trimmed.trim_start_matches('#').trim();
        if content.is_empty() || content.chars().all(|c| c == '-' || c == '=') {
            continue;
        }

        match content.split_once(':') {
            Some((key, value)) if !value.trim().is_empty() => {
                metadata
                    .section_mut(&current_section)
                    .entries
                    .push((key.trim().to_string(), value.trim().to_string()));
            }
            _ => {
                // A section header; a trailing bare colon is part of the
                // template decoration, not the name.
                current_section = content.trim_end_matches(':').trim().to_string();
                metadata.section_mut(&current_section);
            }
        }
    }

    metadata
}

/// Split the data region on tabs.
fn parse_data_rows(data_lines: &[&Line]) -> Vec<Vec<String>> {
    let joined: String = data_lines
        .iter()
        .map(|l| l.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(Cursor::new(joined.into_bytes()));

    let mut rows = Vec::with_capacity(data_lines.len());
    let mut record = csv::StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => rows.push(record.iter().map(|f| f.trim().to_string()).collect()),
            Ok(false) => break,
            Err(_) => break,
        }
    }
    rows
}

/// Decide the column list: variable names, a leading all-text data line, or
/// generated placeholders, in that order of preference.
fn determine_columns(
    metadata: &MetadataDict,
    rows: &mut Vec<Vec<String>>,
    max_row_len: usize,
) -> Vec<ColumnSpec> {
    if !metadata.variables.is_empty() {
        return metadata
            .variables
            .iter()
            .map(|v| ColumnSpec::named(&v.name))
            .collect();
    }

    if let Some(first) = rows.first() {
        let all_text = !first.is_empty()
            && first
                .iter()
                .all(|t| !crate::layout::numeric::is_numeric_token(t));
        if all_text {
            let header = rows.remove(0);
            return header.into_iter().map(ColumnSpec::named).collect();
        }
    }

    (0..max_row_len)
        .map(|i| ColumnSpec::named(format!("unnamed_{i}")))
        .collect()
}

/// Attach metadata as flattened `Section.Key` attributes.
fn flatten_metadata(metadata: &MetadataDict, table: &mut Table) {
    for section in &metadata.sections {
        for (key, value) in &section.entries {
            let attr_key = if section.name.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", section.name, key)
            };
            table.attrs.insert(attr_key, value.clone());
        }
    }
}
