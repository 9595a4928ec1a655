//! paleotab: table extraction from NOAA paleoclimatology text files
//!
//! Published paleoclimate data files come in two flavors: files that follow
//! the NOAA commented template (metadata in `#` sections, tab-delimited
//! data), and free-form text files where tables must be recognized from
//! layout alone. This crate parses both into typed tables of string-or-null
//! cells, without inventing cells that are not present in the input.
//!
//! # Quick Start
//!
//! ```
//! use paleotab::Parser;
//!
//! let data = b"Depth  Age  d18O\n1.0  100  -5.1\n2.0  200  -5.3\n";
//! let tables = Parser::new().parse_bytes(data, "core.txt").unwrap();
//!
//! assert_eq!(tables[0].column_names(), vec!["Depth", "Age", "d18O"]);
//! assert_eq!(tables[0].num_rows(), 2);
//! ```
//!
//! Files on disk go through [`Parser::parse_path`]; only `.txt` files are
//! accepted. The parser never fails on text encoding (UTF-8 preferred,
//! latin-1 fallback) and reports everything else as a typed [`ParseError`].
//!
//! # How non-template files are parsed
//!
//! The line stream is split into blocks at blank lines. Each block is
//! annotated with token-count and numeric-ratio statistics under three
//! delimiter hypotheses (single-space, multi-space, tab), then classified as
//! narrative, header-only, complete-tabular, or data-only. Tabular blocks
//! yield tables: regular blocks by direct tokenization, misaligned blocks by
//! assigning each token to the column with the greatest character-interval
//! overlap. Data-only blocks adopt the headers of the nearest preceding
//! header-only block. Blocks that stay non-tabular are skipped; parsing
//! fails only if no table is found at all.

mod encoding;
mod error;
mod ingest;
pub mod layout;
mod parser;
mod standard;
mod table;
mod template;

// Re-export the public API.
pub use error::{ParseError, Result};
pub use ingest::{Ingestor, Line, DEFAULT_TAB_WIDTH};
pub use parser::Parser;
pub use standard::{parse_standard, MetadataDict, Section, VariableRecord};
pub use table::{ColumnSpec, Row, Table};
pub use template::{classify as classify_template, TemplateKind};

// Re-export for advanced usage.
pub use encoding::{decode_text, is_utf8};

/// Parser version exposed through the public surface.
pub const PARSER_VERSION: &str = env!("CARGO_PKG_VERSION");
