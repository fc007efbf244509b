//! The sequential validation pass.
//!
//! Header lines are fed to the [`HeaderParser`] until the column header (or
//! the first data line) is reached, the reference is resolved once, and every
//! data line then runs through parsing, cross-record checks, classification,
//! coordinate normalization and allele statistics before being emitted.

use super::{
    allele::allele_stats,
    classify::VariantClassifier,
    config::ValidatorConfig,
    diagnostic::{Code, DiagnosticsAggregator, Findings},
    header::{HeaderParser, HeaderStep, VcfHeader},
    interval::normalize,
    output::{emit_snp_line, EmittedRecords, FileReport, SvCall},
    record::{check_position_bounds, ParsedRecord, RecordParser},
    reference::{
        check_reference_bases, AssemblyRecord, ReferenceResolver, ResolvedChromosome,
        SequenceProvider, SequenceRecord,
    },
    scan_state::{ScanState, SiteKey},
};
use crate::utils::util::{is_nucleotides, Result};
use std::{collections::HashMap, io::BufRead};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// One input line; `lossy` marks invalid UTF-8 that was replaced.
struct RawLine {
    text: String,
    lossy: bool,
}

impl RawLine {
    fn decode(mut bytes: Vec<u8>) -> Self {
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        match String::from_utf8(bytes) {
            Ok(text) => Self { text, lossy: false },
            Err(error) => Self {
                text: String::from_utf8_lossy(error.as_bytes()).into_owned(),
                lossy: true,
            },
        }
    }
}

pub struct Validator<'a> {
    config: &'a ValidatorConfig,
    assemblies: &'a [AssemblyRecord],
    sequences: &'a [SequenceRecord],
    fallback: HashMap<String, u64>,
    provider: Option<&'a dyn SequenceProvider>,
}

impl<'a> Validator<'a> {
    pub fn new(
        config: &'a ValidatorConfig,
        assemblies: &'a [AssemblyRecord],
        sequences: &'a [SequenceRecord],
    ) -> Self {
        Self {
            config,
            assemblies,
            sequences,
            fallback: HashMap::new(),
            provider: None,
        }
    }

    pub fn with_fallback(mut self, fallback: HashMap<String, u64>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_provider(mut self, provider: &'a dyn SequenceProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Reads raw lines so undecodable bytes degrade to a finding on that line.
    pub fn validate_reader<R: BufRead>(&self, mut reader: R) -> Result<FileReport> {
        let lines = std::iter::from_fn(move || {
            let mut buffer = Vec::new();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => None,
                Ok(_) => Some(Ok(RawLine::decode(buffer))),
                Err(e) => Some(Err(e.into())),
            }
        });
        self.run(lines)
    }

    pub fn validate_str(&self, text: &str) -> Result<FileReport> {
        self.run(text.lines().map(|line| {
            Ok(RawLine {
                text: line.to_string(),
                lossy: false,
            })
        }))
    }

    fn run<I>(&self, lines: I) -> Result<FileReport>
    where
        I: Iterator<Item = Result<RawLine>>,
    {
        let mut lines = lines.enumerate().map(|(index, line)| {
            line.map(|mut line| {
                if index == 0 {
                    line.text = line.text.trim_start_matches(BYTE_ORDER_MARK).to_string();
                }
                (index + 1, line)
            })
        });

        let mut header_parser = HeaderParser::new();
        let mut first_data_line = None;
        let mut undecodable_header_lines = Vec::new();
        for line in lines.by_ref() {
            let (line_number, line) = line?;
            if line.lossy && line.text.starts_with('#') {
                undecodable_header_lines.push(line_number);
            }
            match header_parser.feed(&line.text) {
                HeaderStep::Consumed => continue,
                HeaderStep::ColumnHeader => break,
                HeaderStep::DataLine => {
                    first_data_line = Some((line_number, line));
                    break;
                }
            }
        }
        let (header, mut header_findings) = header_parser.finish();
        for line_number in undecodable_header_lines {
            header_findings.push_detail(Code::InvalidEncoding, format!("line {line_number}"));
        }
        let resolver = ReferenceResolver::new(
            header.reference.as_deref(),
            self.assemblies,
            self.sequences,
            self.fallback.clone(),
            &mut header_findings,
        );

        let mut aggregator = DiagnosticsAggregator::new();
        aggregator.add_header(&header_findings);

        let mut pass = Pass {
            config: self.config,
            header: &header,
            resolver: &resolver,
            provider: self.provider,
            parser: RecordParser::new(self.config, &header),
            classifier: VariantClassifier::new(self.config),
            state: ScanState::new(),
            output: EmittedRecords::for_mode(self.config.mode),
            records: 0,
        };
        if let Some((line_number, line)) = first_data_line {
            pass.process(line_number, &line, &mut aggregator);
        }
        for line in lines {
            let (line_number, line) = line?;
            pass.process(line_number, &line, &mut aggregator);
        }

        let records = pass.records;
        let output = pass.output;
        let (header_diagnostics, content, annotated_log) = aggregator.finish();
        log::debug!(
            "Validated {records} records: {} header and {} content diagnostics",
            header_diagnostics.len(),
            content.len()
        );
        Ok(FileReport {
            mode: self.config.mode,
            reference_accession: resolver.canonical_accession().map(str::to_string),
            records,
            header_lines: header.render_lines(resolver.canonical_accession()),
            header: header_diagnostics,
            content,
            output,
            annotated_log,
        })
    }
}

struct Pass<'a> {
    config: &'a ValidatorConfig,
    header: &'a VcfHeader,
    resolver: &'a ReferenceResolver,
    provider: Option<&'a dyn SequenceProvider>,
    parser: RecordParser<'a>,
    classifier: VariantClassifier<'a>,
    state: ScanState,
    output: EmittedRecords,
    records: usize,
}

impl Pass<'_> {
    fn process(&mut self, line_number: usize, raw: &RawLine, aggregator: &mut DiagnosticsAggregator) {
        let line = raw.text.as_str();
        let mut findings = Findings::new();
        if raw.lossy {
            findings.push(Code::InvalidEncoding);
        }
        if line.trim().is_empty() {
            findings.push(Code::EmptyDataLine);
        } else if let Some(record) = self.parser.parse(line, &mut findings) {
            self.records += 1;
            self.process_record(&record, &mut findings);
        }
        if !findings.is_empty() {
            log::trace!("Line {line_number}: {:?}", findings.codes());
        }
        aggregator.add_record(line_number, line, &findings);
    }

    fn chromosome_length(&self, record: &ParsedRecord, resolved: Option<&ResolvedChromosome>) -> Option<u64> {
        let from_header = || self.header.contig_lengths.get(&record.chromosome).copied();
        match resolved {
            Some(chromosome) => chromosome.length.or_else(from_header),
            None if !self.resolver.has_assembly() => from_header(),
            None => None,
        }
    }

    fn check_reference(
        &self,
        record: &ParsedRecord,
        resolved: Option<&ResolvedChromosome>,
        findings: &mut Findings,
    ) {
        let Some(pos) = record.pos else {
            return;
        };
        let length = self.chromosome_length(record, resolved);
        let within_bounds = match length {
            Some(length) => {
                let before = findings.count(Code::PositionBeyondChromosome);
                check_position_bounds(pos, length, self.config.mode, findings);
                findings.count(Code::PositionBeyondChromosome) == before
            }
            None => true,
        };
        if let (Some(provider), Some(chromosome)) = (self.provider, resolved) {
            if within_bounds && is_nucleotides(&record.reference) {
                check_reference_bases(
                    provider,
                    chromosome.lookup_key(),
                    pos,
                    &record.reference,
                    findings,
                );
            }
        }
    }

    fn process_record(&mut self, record: &ParsedRecord, findings: &mut Findings) {
        let resolved = self.resolver.resolve(&record.chromosome, findings);
        self.check_reference(record, resolved.as_ref(), findings);

        self.state.check_order(&record.chromosome, record.pos, findings);
        if let Some(id) = &record.id {
            self.state.check_id(id, findings);
        }

        let classified = self.classifier.classify(record, self.resolver, findings);
        let stats = allele_stats(record, self.config.af_decimals, findings);

        match &mut self.output {
            EmittedRecords::Snp(lines) => {
                if let Some(pos) = record.pos {
                    self.state.check_site(
                        SiteKey {
                            chromosome: record.chromosome.clone(),
                            pos,
                            reference: record.reference.to_ascii_uppercase(),
                            alt: record.alt.to_ascii_uppercase(),
                            variant_type: classified.label().to_string(),
                        },
                        findings,
                    );
                    self.state.check_density(
                        &record.chromosome,
                        pos,
                        self.config.dense_window_bp,
                        self.config.dense_max_records,
                        findings,
                    );
                }
                lines.push(emit_snp_line(record, &classified, &stats));
            }
            EmittedRecords::Sv(calls) => {
                let interval = normalize(record, &classified, findings);
                calls.push(SvCall::new(
                    record,
                    resolved.as_ref(),
                    &classified,
                    interval,
                    stats,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests;
