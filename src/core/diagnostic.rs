//! Coded diagnostics and their aggregation across a validation pass.
//!
//! Every rule reports a [`Code`]; the code fixes the stable identifier, the
//! severity and the base message. Stages collect [`Findings`] for the record
//! they are looking at and the [`DiagnosticsAggregator`] turns them into the
//! annotated log, the per-code tallies and, at the end of the pass, one
//! file-summary diagnostic per non-zero tally.

use serde::{Serialize, Serializer};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Error,
    /// Reported as an error, but a curator may accept the record as is.
    ErrorIgnorable,
    /// Reported as an error that a curator resolves by exchanging metadata.
    ErrorExchangeable,
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        !matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::ErrorIgnorable => write!(f, "error-ignorable"),
            Severity::ErrorExchangeable => write!(f, "error-exchangeable"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    Header,
    Record,
    FileSummary,
}

macro_rules! diagnostic_codes {
    ($($variant:ident => ($code:literal, $severity:ident, $message:literal)),+ $(,)?) => {
        /// Stable diagnostic identifiers. Declaration order is the report order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Code {
            $($variant),+
        }

        impl Code {
            pub const ALL: &'static [Code] = &[$(Code::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Code::$variant => $code),+
                }
            }

            pub fn severity(&self) -> Severity {
                match self {
                    $(Code::$variant => Severity::$severity),+
                }
            }

            pub fn message(&self) -> &'static str {
                match self {
                    $(Code::$variant => $message),+
                }
            }
        }
    };
}

diagnostic_codes! {
    MissingFileformat => ("JV_VCF0001", Error, "Missing fileformat"),
    MissingRequiredTags => ("JV_VCF0002", Error, "Missing required header tag"),
    DuplicatedRequiredTags => ("JV_VCF0003", Error, "Duplicated required header tag"),
    DuplicatedDefinition => ("JV_VCF0004", Error, "Duplicated header definition ID"),
    MalformedMetaLine => ("JV_VCF0005", Warning, "Malformed meta-information line"),
    HeaderWhitespaceTrimmed => ("JV_VCF0006", Warning, "Whitespace trimmed in header line"),
    InvalidColumnHeader => ("JV_VCF0007", Error, "Invalid column header line"),
    MissingColumnHeader => ("JV_VCF0008", Error, "Missing column header line"),
    InvalidReferenceGenome => ("JV_VCF0009", Error, "Invalid reference genome"),
    InvalidChromosome => ("JV_VCF0010", Error, "Invalid chromosome"),
    InvalidPosition => ("JV_VCF0011", Error, "Invalid position"),
    PositionBeyondChromosome => ("JV_VCF0012", Error, "Position beyond chromosome length"),
    ReferenceMismatch => ("JV_VCF0013", ErrorIgnorable, "REF allele does not match the reference sequence"),
    ReferenceLookupFailed => ("JV_VCF0014", Warning, "Reference sequence lookup failed"),
    MissingRef => ("JV_VCF0015", Error, "Missing REF allele"),
    InvalidAlt => ("JV_VCF0016", Error, "Invalid ALT allele"),
    MissingAlt => ("JV_VCF0017", Error, "Missing ALT allele"),
    RefEqualsAlt => ("JV_VCF0018", Error, "REF and ALT alleles are identical"),
    TooFewColumns => ("JV_VCF0019", Error, "Too few columns"),
    ColumnCountMismatch => ("JV_VCF0020", Error, "Column count differs from column header"),
    DuplicatedId => ("JV_VCF0021", Error, "Duplicated local ID"),
    MissingId => ("JV_VCF0022", Warning, "Missing local ID"),
    InvalidQual => ("JV_VCF0023", Error, "Invalid QUAL"),
    InvalidInfoValue => ("JV_VCF0024", Error, "Invalid INFO value"),
    InvalidFormatValue => ("JV_VCF0025", Error, "Invalid FORMAT value"),
    InvalidRef => ("JV_VCF0026", Error, "Invalid REF allele"),
    NotSorted => ("JV_VCF0027", Error, "Records are not sorted by position"),
    ChromosomesNotGrouped => ("JV_VCF0028", Error, "Records of a chromosome are not grouped"),
    RecordWhitespaceTrimmed => ("JV_VCF0029", Warning, "Whitespace trimmed in record"),
    UndefinedInfoTag => ("JV_VCF0030", Warning, "INFO tag not defined in header"),
    UndefinedFormatTag => ("JV_VCF0031", Warning, "FORMAT tag not defined in header"),
    UndefinedContig => ("JV_VCF0032", Warning, "Chromosome not defined in contig header"),
    DownloadedReferenceChromosome => ("JV_VCF0033", ErrorExchangeable, "Chromosome resolved from downloaded reference only"),
    EmptyDataLine => ("JV_VCF0034", Warning, "Empty data line skipped"),
    InvalidEncoding => ("JV_VCF0035", Warning, "Invalid UTF-8 replaced in line"),
    MultiAllelic => ("JV_VCF0036", Error, "Multi-allelic ALT"),
    SnpMissingVariationType => ("JV_VCFP0001", Error, "Missing variation type"),
    VariationTypeNotDefined => ("JV_VCFP0002", Error, "Variation type not in defined set"),
    DuplicatedSite => ("JV_VCFP0003", Error, "Duplicated variant site"),
    DenseSnps => ("JV_VCFP0004", Warning, "Dense variants within window"),
    SvMissingVariationType => ("JV_VCFS0001", Error, "Missing variation type"),
    InvalidRearrangement => ("JV_VCFS0002", Error, "Invalid chromosome rearrangement"),
    PosRangeMismatch => ("JV_VCFS0003", Error, "POSrange does not contain POS"),
    EndRangeMismatch => ("JV_VCFS0004", Error, "ENDrange does not contain stop"),
    InvalidConfidenceInterval => ("JV_VCFS0005", Error, "Invalid confidence interval"),
    StopUndetermined => ("JV_VCFS0006", Error, "Stop coordinate cannot be determined"),
    EndBeforePos => ("JV_VCFS0007", Error, "END is before POS"),
    UnresolvedMateChromosome => ("JV_VCFS0008", ErrorExchangeable, "Breakend mate chromosome not in assembly"),
    InvalidAlleleCount => ("JV_C0061", Error, "Invalid allele count or allele number"),
    AlleleFrequencyCalculated => ("JV_C0062", Warning, "Allele frequency calculated"),
    AlleleCountExceedsNumber => ("JV_C0063", Error, "Allele count exceeds allele number"),
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordContext {
    pub line_number: usize,
    pub line: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: Code,
    pub severity: Severity,
    pub scope: Scope,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<RecordContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Diagnostic {
    pub fn new(code: Code, scope: Scope, detail: Option<&str>) -> Self {
        Self {
            code,
            severity: code.severity(),
            scope,
            message: compose_message(code, detail),
            context: None,
            count: None,
        }
    }

    pub fn summary(code: Code, count: usize) -> Self {
        Self {
            code,
            severity: code.severity(),
            scope: Scope::FileSummary,
            message: format!("{} ({count} records)", code.message()),
            context: None,
            count: Some(count),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.code, self.severity, self.message)
    }
}

fn compose_message(code: Code, detail: Option<&str>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!("{}: {detail}", code.message()),
        _ => code.message().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub code: Code,
    pub detail: Option<String>,
}

/// Findings for a single record or for the header, in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct Findings(Vec<Finding>);

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, code: Code) {
        self.0.push(Finding { code, detail: None });
    }

    pub fn push_detail(&mut self, code: Code, detail: impl Into<String>) {
        self.0.push(Finding {
            code,
            detail: Some(detail.into()),
        });
    }

    pub fn contains(&self, code: Code) -> bool {
        self.0.iter().any(|finding| finding.code == code)
    }

    pub fn count(&self, code: Code) -> usize {
        self.0.iter().filter(|finding| finding.code == code).count()
    }

    pub fn codes(&self) -> Vec<Code> {
        self.0.iter().map(|finding| finding.code).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticGroups {
    pub errors: Vec<Diagnostic>,
    pub error_ignorable: Vec<Diagnostic>,
    pub error_exchangeable: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl DiagnosticGroups {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::ErrorIgnorable => self.error_ignorable.push(diagnostic),
            Severity::ErrorExchangeable => self.error_exchangeable.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors
            .iter()
            .chain(&self.error_ignorable)
            .chain(&self.error_exchangeable)
            .chain(&self.warnings)
    }

    pub fn find(&self, code: Code) -> Option<&Diagnostic> {
        self.iter().find(|diagnostic| diagnostic.code == code)
    }

    pub fn contains(&self, code: Code) -> bool {
        self.find(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
            + self.error_ignorable.len()
            + self.error_exchangeable.len()
            + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedLine {
    pub line_number: usize,
    pub line: String,
    pub code: Code,
    pub message: String,
}

impl fmt::Display for AnnotatedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.line_number, self.line, self.code, self.message
        )
    }
}

#[derive(Debug, Default)]
pub struct DiagnosticsAggregator {
    header: DiagnosticGroups,
    tallies: BTreeMap<Code, usize>,
    log: Vec<AnnotatedLine>,
}

impl DiagnosticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_header(&mut self, findings: &Findings) {
        for finding in findings.iter() {
            let diagnostic = Diagnostic::new(finding.code, Scope::Header, finding.detail.as_deref());
            log::debug!("{diagnostic}");
            self.header.push(diagnostic);
        }
    }

    /// Logs every finding of the record; each code is tallied once per record.
    pub fn add_record(&mut self, line_number: usize, line: &str, findings: &Findings) {
        let codes: BTreeSet<Code> = findings.iter().map(|finding| finding.code).collect();
        for code in codes {
            *self.tallies.entry(code).or_insert(0) += 1;
        }
        for finding in findings.iter() {
            self.log.push(AnnotatedLine {
                line_number,
                line: line.to_string(),
                code: finding.code,
                message: compose_message(finding.code, finding.detail.as_deref()),
            });
        }
    }

    /// Closes the pass: header diagnostics, one summary per tallied code, and the log.
    pub fn finish(self) -> (DiagnosticGroups, DiagnosticGroups, Vec<AnnotatedLine>) {
        let mut content = DiagnosticGroups::default();
        for (code, count) in self.tallies {
            if count > 0 {
                content.push(Diagnostic::summary(code, count));
            }
        }
        (self.header, content, self.log)
    }
}
