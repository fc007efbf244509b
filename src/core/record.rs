//! Splits a data line into typed fields and runs the per-field rules.
//!
//! Parsing never fails outright: every problem becomes a finding and the
//! record carries whatever could be read. Only a line with fewer than the
//! eight mandatory columns yields no record at all.

use super::{
    config::{CompiledTagRule, Mode, ValidatorConfig, ValueKind},
    diagnostic::{Code, Findings},
    header::{DefinitionKind, VcfHeader},
};
use crate::{
    constants::{MANDATORY_COLUMNS, MISSING_VALUE},
    utils::util::{is_nucleotides, trim_field},
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static SYMBOLIC_ALLELE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<[^<>]+>$").unwrap());
static QUAL_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(\d+(\.\d*)?|\.\d+)([eE][-+]?\d+)?$").unwrap());

const PLACEHOLDER_CHARS: [char; 4] = ['<', '>', '*', '.'];

#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Flag,
    Integer(i64),
    /// The raw text is kept so values are re-emitted verbatim.
    Float { value: f64, raw: String },
    Text(String),
    Pair(Option<i64>, Option<i64>),
}

impl InfoValue {
    fn parse(kind: ValueKind, raw: Option<&str>) -> Option<Self> {
        match (kind, raw) {
            (ValueKind::Flag, None) => Some(InfoValue::Flag),
            (ValueKind::Flag, Some(_)) | (_, None) => None,
            (ValueKind::Integer, Some(raw)) => raw.parse().ok().map(InfoValue::Integer),
            (ValueKind::Float, Some(raw)) => raw.parse().ok().map(|value| InfoValue::Float {
                value,
                raw: raw.to_string(),
            }),
            (ValueKind::Text, Some(raw)) => Some(InfoValue::Text(raw.to_string())),
            (ValueKind::Pair, Some(raw)) => {
                let (left, right) = raw.split_once(',')?;
                let half = |value: &str| -> Option<Option<i64>> {
                    if value == MISSING_VALUE {
                        Some(None)
                    } else {
                        value.parse().ok().map(Some)
                    }
                };
                Some(InfoValue::Pair(half(left)?, half(right)?))
            }
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            InfoValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InfoValue::Text(value) => Some(value),
            InfoValue::Float { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(Option<i64>, Option<i64>)> {
        match self {
            InfoValue::Pair(left, right) => Some((*left, *right)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    /// Trimmed columns as received.
    pub fields: Vec<String>,
    pub chromosome: String,
    pub pos: Option<u64>,
    pub id: Option<String>,
    pub reference: String,
    pub alt: String,
    pub qual: Option<f64>,
    pub info: IndexMap<String, InfoValue>,
    /// Sample name to allow-listed FORMAT values.
    pub samples: IndexMap<String, IndexMap<String, String>>,
}

impl ParsedRecord {
    pub fn info_field(&self) -> &str {
        &self.fields[7]
    }

    pub fn info_integer(&self, tag: &str) -> Option<i64> {
        self.info.get(tag).and_then(InfoValue::as_integer)
    }

    pub fn info_text(&self, tag: &str) -> Option<&str> {
        self.info.get(tag).and_then(InfoValue::as_text)
    }

    pub fn info_pair(&self, tag: &str) -> Option<(Option<i64>, Option<i64>)> {
        self.info.get(tag).and_then(InfoValue::as_pair)
    }

    pub fn is_multiallelic(&self) -> bool {
        self.alt.contains(',')
    }

    pub fn alt_is_literal(&self) -> bool {
        is_nucleotides(&self.alt)
    }
}

pub struct RecordParser<'a> {
    config: &'a ValidatorConfig,
    header: &'a VcfHeader,
    sample_names: Vec<String>,
}

impl<'a> RecordParser<'a> {
    pub fn new(config: &'a ValidatorConfig, header: &'a VcfHeader) -> Self {
        Self {
            config,
            header,
            sample_names: header.sample_names().to_vec(),
        }
    }

    pub fn parse(&self, line: &str, findings: &mut Findings) -> Option<ParsedRecord> {
        let (line, mut trimmed) = trim_field(line);
        let fields: Vec<String> = line
            .split('\t')
            .map(|field| {
                let (field, changed) = trim_field(field);
                trimmed |= changed;
                field.to_string()
            })
            .collect();
        if trimmed {
            findings.push(Code::RecordWhitespaceTrimmed);
        }

        if fields.len() < MANDATORY_COLUMNS.len() {
            findings.push_detail(
                Code::TooFewColumns,
                format!("{} < {}", fields.len(), MANDATORY_COLUMNS.len()),
            );
            return None;
        }
        if let Some(expected) = self.header.column_count() {
            if fields.len() != expected {
                findings.push_detail(
                    Code::ColumnCountMismatch,
                    format!("{} != {expected}", fields.len()),
                );
            }
        }

        let chromosome = fields[0].clone();
        if chromosome.is_empty() {
            findings.push(Code::InvalidChromosome);
        } else if self.header.has_definitions(DefinitionKind::Contig)
            && !self.header.defines(DefinitionKind::Contig, &chromosome)
        {
            findings.push_detail(Code::UndefinedContig, &chromosome);
        }

        let pos = self.parse_position(&fields[1], findings);
        let id = parse_id(&fields[2], findings);
        let reference = fields[3].clone();
        check_reference_allele(&reference, findings);
        check_alt_allele(&reference, &fields[4], self.config.mode, findings);
        let qual = parse_qual(&fields[5], findings);
        let info = self.parse_info(&fields[7], findings);
        let samples = self.parse_samples(&fields, findings);

        Some(ParsedRecord {
            chromosome,
            pos,
            id,
            reference,
            alt: fields[4].clone(),
            qual,
            info,
            samples,
            fields,
        })
    }

    fn parse_position(&self, raw: &str, findings: &mut Findings) -> Option<u64> {
        match raw.parse::<u64>() {
            Ok(0) if self.config.mode == Mode::Snp => {
                findings.push_detail(Code::InvalidPosition, raw);
                None
            }
            Ok(pos) => Some(pos),
            Err(_) => {
                findings.push_detail(Code::InvalidPosition, raw);
                None
            }
        }
    }

    fn parse_info(&self, raw: &str, findings: &mut Findings) -> IndexMap<String, InfoValue> {
        let mut info = IndexMap::new();
        if raw == MISSING_VALUE || raw.is_empty() {
            return info;
        }
        let check_header = self.header.has_definitions(DefinitionKind::Info);
        for entry in raw.split(';').filter(|entry| !entry.is_empty()) {
            let (key, value) = match entry.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (entry, None),
            };
            if check_header && !self.header.defines(DefinitionKind::Info, key) {
                findings.push_detail(Code::UndefinedInfoTag, key);
            }
            let Some(rule) = self.config.info_rules.get(key) else {
                log::trace!("INFO tag {key} is not validated in {} mode", self.config.mode);
                continue;
            };
            match typed_value(rule, value) {
                Some(typed) => {
                    info.insert(key.to_string(), typed);
                }
                None => findings.push_detail(rule.rule.invalid, entry),
            }
        }
        info
    }

    fn parse_samples(
        &self,
        fields: &[String],
        findings: &mut Findings,
    ) -> IndexMap<String, IndexMap<String, String>> {
        let mut samples = IndexMap::new();
        let format_index = MANDATORY_COLUMNS.len();
        let Some(format) = fields.get(format_index) else {
            return samples;
        };
        let keys: Vec<&str> = format.split(':').collect();
        if self.header.has_definitions(DefinitionKind::Format) {
            for key in keys.iter().filter(|key| **key != MISSING_VALUE) {
                if !self.header.defines(DefinitionKind::Format, key) {
                    findings.push_detail(Code::UndefinedFormatTag, *key);
                }
            }
        }

        for (index, sample) in fields[format_index + 1..].iter().enumerate() {
            let name = self
                .sample_names
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("sample{}", index + 1));
            let mut values = IndexMap::new();
            for (key, value) in keys.iter().zip(sample.split(':')) {
                let Some(rule) = self.config.format_rules.get(*key) else {
                    continue;
                };
                if rule.matches(value) {
                    values.insert(key.to_string(), value.to_string());
                } else {
                    findings.push_detail(rule.rule.invalid, format!("{name} {key}={value}"));
                }
            }
            samples.insert(name, values);
        }
        samples
    }
}

fn typed_value(rule: &CompiledTagRule, value: Option<&str>) -> Option<InfoValue> {
    if let Some(value) = value {
        if !rule.matches(value) {
            return None;
        }
    }
    InfoValue::parse(rule.rule.kind, value)
}

fn parse_id(raw: &str, findings: &mut Findings) -> Option<String> {
    if raw == MISSING_VALUE || raw.is_empty() {
        findings.push(Code::MissingId);
        None
    } else {
        Some(raw.to_string())
    }
}

fn check_reference_allele(reference: &str, findings: &mut Findings) {
    if reference.is_empty() || reference == MISSING_VALUE {
        findings.push(Code::MissingRef);
    } else if !is_nucleotides(reference) {
        findings.push_detail(Code::InvalidRef, reference);
    }
}

fn check_alt_allele(reference: &str, alt: &str, mode: Mode, findings: &mut Findings) {
    if alt.is_empty() || alt == MISSING_VALUE {
        findings.push(Code::MissingAlt);
        return;
    }
    if alt.contains(',') {
        findings.push_detail(Code::MultiAllelic, alt);
    }
    let invalid = alt.split(',').find(|allele| {
        if allele.contains('[') || allele.contains(']') {
            return false;
        }
        if mode == Mode::Sv && SYMBOLIC_ALLELE.is_match(allele) {
            return false;
        }
        allele.contains(PLACEHOLDER_CHARS) || !is_nucleotides(allele)
    });
    if let Some(allele) = invalid {
        findings.push_detail(Code::InvalidAlt, allele);
    }
    if alt.eq_ignore_ascii_case(reference) {
        findings.push_detail(Code::RefEqualsAlt, alt);
    }
}

fn parse_qual(raw: &str, findings: &mut Findings) -> Option<f64> {
    if raw == MISSING_VALUE {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(qual) if QUAL_VALUE.is_match(raw) => Some(qual),
        _ => {
            findings.push_detail(Code::InvalidQual, raw);
            None
        }
    }
}

/// `pos` may sit one past the chromosome end only for SV telomere records.
pub fn check_position_bounds(pos: u64, length: u64, mode: Mode, findings: &mut Findings) {
    let limit = match mode {
        Mode::Snp => length,
        Mode::Sv => length.saturating_add(1),
    };
    if pos > limit {
        findings.push_detail(Code::PositionBeyondChromosome, format!("{pos} > {length}"));
    }
}
