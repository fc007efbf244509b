//! Normalized output: annotated VCF lines (SNP mode) or structured calls (SV mode).

use super::{
    allele::AlleleStats,
    breakend::Breakend,
    classify::ClassifiedVariant,
    config::Mode,
    diagnostic::{AnnotatedLine, DiagnosticGroups},
    interval::Interval,
    record::ParsedRecord,
    reference::ResolvedChromosome,
};
use crate::constants::{AF_TAG, MISSING_VALUE, SVLEN_TAG, VRT_TAG};
use indexmap::IndexMap;
use serde::Serialize;

fn has_info_key(entries: &[String], key: &str) -> bool {
    entries
        .iter()
        .any(|entry| entry.split('=').next() == Some(key))
}

/// Rebuilds the record line with `VRT` and a calculated `AF` appended to INFO
/// when they are missing. Emitting an emitted line again changes nothing.
pub fn emit_snp_line(
    record: &ParsedRecord,
    classified: &ClassifiedVariant,
    stats: &AlleleStats,
) -> String {
    let info = record.info_field();
    let mut entries: Vec<String> = if info == MISSING_VALUE || info.is_empty() {
        Vec::new()
    } else {
        info.split(';').map(str::to_string).collect()
    };
    if let Some(small_type) = classified.small_type() {
        if !has_info_key(&entries, VRT_TAG) {
            entries.push(format!("{VRT_TAG}={}", small_type.vrt_code()));
        }
    }
    if stats.calculated && !has_info_key(&entries, AF_TAG) {
        entries.push(format!("{AF_TAG}={}", stats.allele_frequency));
    }

    let mut fields = record.fields.clone();
    fields[7] = if entries.is_empty() {
        MISSING_VALUE.to_string()
    } else {
        entries.join(";")
    };
    fields.join("\t")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SvCall {
    pub id: String,
    pub chromosome: String,
    pub refseq_accession: String,
    pub genbank_accession: String,
    pub ucsc_name: String,
    pub variant_type: String,
    #[serde(flatten)]
    pub interval: Interval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakend: Option<Breakend>,
    #[serde(flatten)]
    pub allele_stats: AlleleStats,
    pub svlen: Option<i64>,
    pub reference: String,
    pub alt: String,
    pub samples: IndexMap<String, IndexMap<String, String>>,
}

impl SvCall {
    /// Unresolved chromosomes leave the accession fields empty.
    pub fn new(
        record: &ParsedRecord,
        resolved: Option<&ResolvedChromosome>,
        classified: &ClassifiedVariant,
        interval: Interval,
        allele_stats: AlleleStats,
    ) -> Self {
        let (refseq_accession, genbank_accession, ucsc_name) = resolved
            .map(|chromosome| {
                (
                    chromosome.refseq.clone(),
                    chromosome.genbank.clone(),
                    chromosome.ucsc_name.clone(),
                )
            })
            .unwrap_or_default();
        Self {
            id: record.id.clone().unwrap_or_default(),
            chromosome: record.chromosome.clone(),
            refseq_accession,
            genbank_accession,
            ucsc_name,
            variant_type: classified.label().to_string(),
            interval,
            breakend: classified.breakend().cloned(),
            allele_stats,
            svlen: record.info_integer(SVLEN_TAG),
            reference: record.reference.clone(),
            alt: record.alt.clone(),
            samples: record.samples.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EmittedRecords {
    Snp(Vec<String>),
    Sv(Vec<SvCall>),
}

impl EmittedRecords {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Snp => EmittedRecords::Snp(Vec::new()),
            Mode::Sv => EmittedRecords::Sv(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EmittedRecords::Snp(lines) => lines.len(),
            EmittedRecords::Sv(calls) => calls.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a validation pass produces for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub mode: Mode,
    pub reference_accession: Option<String>,
    pub records: usize,
    pub header: DiagnosticGroups,
    pub content: DiagnosticGroups,
    #[serde(skip)]
    pub header_lines: Vec<String>,
    #[serde(skip)]
    pub output: EmittedRecords,
    #[serde(skip)]
    pub annotated_log: Vec<AnnotatedLine>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        !self
            .header
            .iter()
            .chain(self.content.iter())
            .any(|diagnostic| diagnostic.severity.is_error())
    }

    pub fn snp_lines(&self) -> &[String] {
        match &self.output {
            EmittedRecords::Snp(lines) => lines,
            EmittedRecords::Sv(_) => &[],
        }
    }

    pub fn sv_calls(&self) -> &[SvCall] {
        match &self.output {
            EmittedRecords::Sv(calls) => calls,
            EmittedRecords::Snp(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        allele::allele_stats,
        classify::VariantClassifier,
        config::ValidatorConfig,
        diagnostic::Findings,
        interval::normalize,
        record::RecordParser,
        test_utils::{grch38_resolver, snp_header, sv_header},
    };

    fn emit_snp(line: &str) -> String {
        let config = ValidatorConfig::snp().unwrap();
        let header = snp_header();
        let mut findings = Findings::new();
        let record = RecordParser::new(&config, &header)
            .parse(line, &mut findings)
            .unwrap();
        let classified =
            VariantClassifier::new(&config).classify(&record, &grch38_resolver(), &mut findings);
        let stats = allele_stats(&record, config.af_decimals, &mut findings);
        emit_snp_line(&record, &classified, &stats)
    }

    #[test]
    fn snp_line_gets_vrt_and_af() {
        let emitted = emit_snp("chr1\t100\trs1\tA\tT\t.\tPASS\tAC=5;AN=10\tGT\t0/1");
        assert_eq!(
            emitted,
            "chr1\t100\trs1\tA\tT\t.\tPASS\tAC=5;AN=10;VRT=1;AF=0.5\tGT\t0/1"
        );
        assert_eq!(emit_snp(&emitted), emitted);

        let emitted = emit_snp("chr1\t100\trs1\tA\tT\t.\tPASS\t.\tGT\t0/1");
        assert_eq!(emitted, "chr1\t100\trs1\tA\tT\t.\tPASS\tVRT=1\tGT\t0/1");
    }

    #[test]
    fn unclassified_lines_are_left_alone() {
        let line = "chr1\t100\trs1\tAC\tAT\t.\tPASS\t.\tGT\t0/1";
        assert_eq!(emit_snp(line), line);
    }

    #[test]
    fn sv_call_serializes_flat() {
        let config = ValidatorConfig::sv().unwrap();
        let header = sv_header();
        let resolver = grch38_resolver();
        let mut findings = Findings::new();
        let record = RecordParser::new(&config, &header)
            .parse(
                "chr1\t1000\tsv1\tA\t<DEL>\t.\tPASS\tSVLEN=-300;CIPOS=-5,5;AC=1;AN=2",
                &mut findings,
            )
            .unwrap();
        let resolved = resolver.resolve(&record.chromosome, &mut findings);
        let classified = VariantClassifier::new(&config).classify(&record, &resolver, &mut findings);
        let interval = normalize(&record, &classified, &mut findings);
        let stats = allele_stats(&record, config.af_decimals, &mut findings);
        let call = SvCall::new(&record, resolved.as_ref(), &classified, interval, stats);

        let json: serde_json::Value = serde_json::to_value(&call).unwrap();
        assert_eq!(json["variant_type"], "deletion");
        assert_eq!(json["refseq_accession"], "NC_000001.11");
        assert_eq!(json["stop"], 1300);
        assert_eq!(json["ci_pos"], serde_json::json!([5, 5]));
        assert_eq!(json["allele_frequency"], "0.5");
        assert_eq!(json["svlen"], -300);
        assert!(json.get("breakend").is_none());
        assert!(json.get("calculated").is_none());
    }

    #[test]
    fn unresolved_chromosome_has_empty_accessions() {
        let config = ValidatorConfig::sv().unwrap();
        let header = sv_header();
        let mut findings = Findings::new();
        let record = RecordParser::new(&config, &header)
            .parse("chrZ\t10\tsv2\tN\tN[chr2:500[\t.\tPASS\t.", &mut findings)
            .unwrap();
        let resolver = grch38_resolver();
        let classified = VariantClassifier::new(&config).classify(&record, &resolver, &mut findings);
        let call = SvCall::new(&record, None, &classified, Interval::default(), AlleleStats::default());
        assert_eq!(call.refseq_accession, "");
        assert_eq!(call.variant_type, "interchromosomal translocation");
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["breakend"]["from_strand"], "+");
        assert_eq!(json["allele_number"], "");
    }
}
