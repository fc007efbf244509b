//! Meta-information and column-header parsing.
//!
//! The parser is fed one line at a time so the validator can stream a file:
//! it reports whether a line was consumed as header, terminated the header
//! (`#CHROM…`), or is already a data line. Checks that need the whole header
//! (required tags, a missing column header) run in [`HeaderParser::finish`].

use super::diagnostic::{Code, Findings};
use crate::{
    constants::{FORMAT_COLUMN, MANDATORY_COLUMNS, REQUIRED_HEADER_TAGS},
    utils::util::trim_field,
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static FILEFORMAT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##fileformat=VCFv\d+(\.\d+)?$").unwrap());
static DEFINITION_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<,]ID=([^,>]+)").unwrap());
static CONTIG_LENGTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<,]length=(\d+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Info,
    Format,
    Contig,
}

impl DefinitionKind {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "INFO" => Some(DefinitionKind::Info),
            "FORMAT" => Some(DefinitionKind::Format),
            "contig" => Some(DefinitionKind::Contig),
            _ => None,
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionKind::Info => write!(f, "INFO"),
            DefinitionKind::Format => write!(f, "FORMAT"),
            DefinitionKind::Contig => write!(f, "contig"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDefinition {
    pub id: String,
    pub raw: String,
}

#[derive(Debug, Clone, Default)]
pub struct VcfHeader {
    /// Trimmed `##` lines in input order.
    pub meta_lines: Vec<String>,
    pub fileformat: Option<String>,
    pub reference: Option<String>,
    /// Every definition is kept, repeated IDs included.
    pub definitions: HashMap<DefinitionKind, IndexMap<String, Vec<HeaderDefinition>>>,
    pub contig_lengths: HashMap<String, u64>,
    pub columns: Option<Vec<String>>,
}

impl VcfHeader {
    /// Parses a complete header held in memory, stopping at the first data line.
    pub fn parse(text: &str) -> (Self, Findings) {
        let mut parser = HeaderParser::new();
        for line in text.lines() {
            if parser.feed(line) != HeaderStep::Consumed {
                break;
            }
        }
        parser.finish()
    }

    pub fn defines(&self, kind: DefinitionKind, id: &str) -> bool {
        self.definitions
            .get(&kind)
            .is_some_and(|definitions| definitions.contains_key(id))
    }

    pub fn has_definitions(&self, kind: DefinitionKind) -> bool {
        self.definitions
            .get(&kind)
            .is_some_and(|definitions| !definitions.is_empty())
    }

    pub fn has_format_column(&self) -> bool {
        self.columns
            .as_ref()
            .and_then(|columns| columns.get(MANDATORY_COLUMNS.len()))
            .is_some_and(|column| column == FORMAT_COLUMN)
    }

    pub fn sample_names(&self) -> &[String] {
        match &self.columns {
            Some(columns) if self.has_format_column() => &columns[MANDATORY_COLUMNS.len() + 1..],
            Some(columns) if columns.len() > MANDATORY_COLUMNS.len() => {
                &columns[MANDATORY_COLUMNS.len()..]
            }
            _ => &[],
        }
    }

    pub fn column_count(&self) -> Option<usize> {
        self.columns.as_ref().map(Vec::len)
    }

    /// Header lines for output, with `##reference=` replaced by `reference` when given.
    pub fn render_lines(&self, reference: Option<&str>) -> Vec<String> {
        let mut lines: Vec<String> = self
            .meta_lines
            .iter()
            .map(|line| match reference {
                Some(accession) if line.starts_with("##reference=") => {
                    format!("##reference={accession}")
                }
                _ => line.clone(),
            })
            .collect();
        if let Some(columns) = &self.columns {
            lines.push(columns.join("\t"));
        }
        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStep {
    Consumed,
    ColumnHeader,
    /// The line is not header; the caller processes it as a record.
    DataLine,
}

#[derive(Debug, Default)]
pub struct HeaderParser {
    header: VcfHeader,
    findings: Findings,
    seen_first_line: bool,
    required_tag_counts: IndexMap<&'static str, usize>,
}

impl HeaderParser {
    pub fn new() -> Self {
        Self {
            required_tag_counts: REQUIRED_HEADER_TAGS.iter().map(|tag| (*tag, 0)).collect(),
            ..Default::default()
        }
    }

    pub fn feed(&mut self, line: &str) -> HeaderStep {
        if line.trim().is_empty() {
            return HeaderStep::Consumed;
        }
        let (trimmed, changed) = trim_field(line);

        if !self.seen_first_line {
            self.seen_first_line = true;
            if !FILEFORMAT_LINE.is_match(trimmed) {
                self.findings.push_detail(Code::MissingFileformat, trimmed);
            }
        }

        if !trimmed.starts_with('#') {
            return HeaderStep::DataLine;
        }
        if changed {
            self.findings
                .push_detail(Code::HeaderWhitespaceTrimmed, trimmed);
        }

        if let Some(meta) = trimmed.strip_prefix("##") {
            self.parse_meta_line(trimmed, meta);
            HeaderStep::Consumed
        } else if trimmed.to_ascii_uppercase().starts_with("#CHROM") {
            self.parse_column_header(trimmed);
            HeaderStep::ColumnHeader
        } else {
            self.findings.push_detail(Code::MalformedMetaLine, trimmed);
            HeaderStep::Consumed
        }
    }

    fn parse_meta_line(&mut self, line: &str, meta: &str) {
        self.header.meta_lines.push(line.to_string());
        let Some((key, value)) = meta.split_once('=') else {
            self.findings.push_detail(Code::MalformedMetaLine, line);
            return;
        };

        if let Some(count) = self.required_tag_counts.get_mut(key) {
            *count += 1;
            match key {
                "fileformat" if self.header.fileformat.is_none() => {
                    self.header.fileformat = Some(value.to_string());
                }
                "reference" if self.header.reference.is_none() => {
                    self.header.reference = Some(value.to_string());
                }
                _ => {}
            }
            return;
        }

        let Some(kind) = DefinitionKind::from_key(key) else {
            return;
        };
        let Some(id) = DEFINITION_ID
            .captures(value)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
        else {
            self.findings.push_detail(Code::MalformedMetaLine, line);
            return;
        };

        if kind == DefinitionKind::Contig {
            if let Some(length) = CONTIG_LENGTH
                .captures(value)
                .and_then(|captures| captures[1].parse::<u64>().ok())
            {
                self.header.contig_lengths.entry(id.clone()).or_insert(length);
            }
        }

        let definitions = self
            .header
            .definitions
            .entry(kind)
            .or_default()
            .entry(id.clone())
            .or_default();
        if !definitions.is_empty() {
            self.findings
                .push_detail(Code::DuplicatedDefinition, format!("{kind} ID={id}"));
        }
        definitions.push(HeaderDefinition {
            id,
            raw: line.to_string(),
        });
    }

    fn parse_column_header(&mut self, line: &str) {
        let mut any_trimmed = false;
        let columns: Vec<String> = line
            .split('\t')
            .map(|column| {
                let (trimmed, changed) = trim_field(column);
                any_trimmed |= changed;
                trimmed.to_string()
            })
            .collect();
        if any_trimmed {
            self.findings
                .push_detail(Code::HeaderWhitespaceTrimmed, "column header");
        }

        let matches_mandatory = columns.len() >= MANDATORY_COLUMNS.len()
            && columns
                .iter()
                .zip(MANDATORY_COLUMNS.iter())
                .all(|(column, expected)| column == expected);
        if !matches_mandatory {
            self.findings
                .push_detail(Code::InvalidColumnHeader, columns.join(" "));
        }
        self.header.columns = Some(columns);
    }

    pub fn finish(mut self) -> (VcfHeader, Findings) {
        let missing: Vec<&str> = self
            .required_tag_counts
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(tag, _)| *tag)
            .collect();
        if !missing.is_empty() {
            self.findings
                .push_detail(Code::MissingRequiredTags, missing.join(", "));
        }
        let duplicated: Vec<&str> = self
            .required_tag_counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(tag, _)| *tag)
            .collect();
        if !duplicated.is_empty() {
            self.findings
                .push_detail(Code::DuplicatedRequiredTags, duplicated.join(", "));
        }
        if self.header.columns.is_none() {
            self.findings.push(Code::MissingColumnHeader);
        }
        (self.header, self.findings)
    }
}
