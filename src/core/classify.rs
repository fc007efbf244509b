use super::{
    breakend::{is_breakend_alt, parse_breakend, Breakend},
    config::{Mode, ValidatorConfig},
    diagnostic::{Code, Findings},
    record::ParsedRecord,
    reference::ReferenceResolver,
    svtype::{SmallVariantType, SvType},
};
use crate::{
    constants::{EVENT_TAG, SVTYPE_TAG, VRT_TAG},
    utils::util::is_nucleotides,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslocationScope {
    Intrachromosomal,
    Interchromosomal,
}

/// Outcome of classification. Every record gets exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedVariant {
    Small(SmallVariantType),
    Structural(SvType),
    Translocation(TranslocationScope, Breakend),
    /// Holds the code explaining why no type applies.
    Unclassified(Code),
}

impl ClassifiedVariant {
    pub fn small_type(&self) -> Option<SmallVariantType> {
        match self {
            ClassifiedVariant::Small(small_type) => Some(*small_type),
            _ => None,
        }
    }

    pub fn sv_type(&self) -> Option<SvType> {
        match self {
            ClassifiedVariant::Structural(svtype) => Some(*svtype),
            ClassifiedVariant::Translocation(TranslocationScope::Intrachromosomal, _) => {
                Some(SvType::INTRACHROMOSOMAL_TRANSLOCATION)
            }
            ClassifiedVariant::Translocation(TranslocationScope::Interchromosomal, _) => {
                Some(SvType::INTERCHROMOSOMAL_TRANSLOCATION)
            }
            _ => None,
        }
    }

    pub fn breakend(&self) -> Option<&Breakend> {
        match self {
            ClassifiedVariant::Translocation(_, breakend) => Some(breakend),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClassifiedVariant::Small(small_type) => small_type.label(),
            ClassifiedVariant::Unclassified(_) => "",
            other => other.sv_type().map_or("", |svtype| svtype.label()),
        }
    }
}

impl std::fmt::Display for ClassifiedVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifiedVariant::Unclassified(code) => write!(f, "unclassified ({code})"),
            other => f.write_str(other.label()),
        }
    }
}

pub struct VariantClassifier<'a> {
    config: &'a ValidatorConfig,
}

impl<'a> VariantClassifier<'a> {
    pub fn new(config: &'a ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn classify(
        &self,
        record: &ParsedRecord,
        resolver: &ReferenceResolver,
        findings: &mut Findings,
    ) -> ClassifiedVariant {
        let classified = match self.config.mode {
            Mode::Snp => self.classify_small(record),
            Mode::Sv => self.classify_structural(record, resolver, findings),
        };
        if let ClassifiedVariant::Unclassified(code) = &classified {
            if !findings.contains(*code) {
                findings.push(*code);
            }
        }
        classified
    }

    fn classify_small(&self, record: &ParsedRecord) -> ClassifiedVariant {
        if let Some(vrt) = record.info_text(VRT_TAG) {
            return match self.config.vrt_type(vrt) {
                Some(small_type) => ClassifiedVariant::Small(small_type),
                None => ClassifiedVariant::Unclassified(Code::VariationTypeNotDefined),
            };
        }

        let (reference, alt) = (record.reference.as_str(), record.alt.as_str());
        if !is_nucleotides(reference) || !is_nucleotides(alt) {
            return ClassifiedVariant::Unclassified(Code::SnpMissingVariationType);
        }
        let differs_everywhere = || {
            reference
                .bytes()
                .zip(alt.bytes())
                .all(|(r, a)| !r.eq_ignore_ascii_case(&a))
        };
        match (reference.len(), alt.len()) {
            (1, 1) if differs_everywhere() => ClassifiedVariant::Small(SmallVariantType::Snv),
            (r, a) if r == a && r > 1 && differs_everywhere() => {
                ClassifiedVariant::Small(SmallVariantType::Mnv)
            }
            (r, a) if r != a && !record.is_multiallelic() => {
                ClassifiedVariant::Small(SmallVariantType::Div)
            }
            _ => ClassifiedVariant::Unclassified(Code::SnpMissingVariationType),
        }
    }

    fn classify_structural(
        &self,
        record: &ParsedRecord,
        resolver: &ReferenceResolver,
        findings: &mut Findings,
    ) -> ClassifiedVariant {
        if is_breakend_alt(&record.alt) {
            // an unparsable POS is already reported; the anchor cannot be checked
            let Some(pos) = record.pos else {
                return ClassifiedVariant::Unclassified(Code::InvalidPosition);
            };
            let breakend = parse_breakend(
                &record.chromosome,
                pos,
                &record.reference,
                &record.alt,
                record.info_text(EVENT_TAG),
            );
            let Some(breakend) = breakend else {
                return ClassifiedVariant::Unclassified(Code::InvalidRearrangement);
            };
            if resolver.has_assembly() && !resolver.is_known(&breakend.to_chromosome) {
                findings.push_detail(Code::UnresolvedMateChromosome, &breakend.to_chromosome);
            }
            let scope = if breakend.to_chromosome == record.chromosome {
                TranslocationScope::Intrachromosomal
            } else {
                TranslocationScope::Interchromosomal
            };
            return ClassifiedVariant::Translocation(scope, breakend);
        }

        if let Some(symbolic) = record
            .alt
            .strip_prefix('<')
            .and_then(|alt| alt.strip_suffix('>'))
        {
            let mut matched = None;
            for (prefix, svtype) in &self.config.symbolic_alt_table {
                if symbolic.starts_with(prefix.as_str()) {
                    matched = Some(*svtype);
                }
            }
            if let Some(svtype) = matched {
                return ClassifiedVariant::Structural(svtype);
            }
        }

        if let Some(svtype) = record
            .info_text(SVTYPE_TAG)
            .and_then(|code| self.config.svtype(code))
        {
            return ClassifiedVariant::Structural(svtype);
        }

        if record.info.contains_key(&self.config.composite_event_tag) {
            return ClassifiedVariant::Structural(SvType::SEQUENCE_ALTERATION);
        }

        ClassifiedVariant::Unclassified(Code::SvMissingVariationType)
    }
}
