//! Assembly and chromosome resolution plus reference-base comparison.

use super::diagnostic::{Code, Findings};
use crate::{constants::ASSEMBLED_MOLECULE, error::JvcfError, utils::util::Result};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRecord {
    pub accession: String,
    pub db_name: String,
    pub ucsc_name: String,
    pub refseq: String,
    pub genbank: String,
}

impl AssemblyRecord {
    fn is_alias(&self, name: &str) -> bool {
        !name.is_empty()
            && [&self.db_name, &self.ucsc_name, &self.refseq, &self.genbank]
                .iter()
                .any(|alias| alias.as_str() == name)
    }

    /// RefSeq accession when the assembly has one, GenBank otherwise.
    pub fn canonical_accession(&self) -> &str {
        if self.refseq.is_empty() {
            &self.genbank
        } else {
            &self.refseq
        }
    }
}

/// One row of a sequence report, before filtering by assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub assembly: String,
    pub name: String,
    pub ucsc_name: String,
    pub refseq: String,
    pub genbank: String,
    pub role: String,
    pub length: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeDescriptor {
    pub name: String,
    pub ucsc_name: String,
    pub refseq: String,
    pub genbank: String,
    pub role: String,
    pub length: Option<u64>,
}

impl From<&SequenceRecord> for ChromosomeDescriptor {
    fn from(record: &SequenceRecord) -> Self {
        Self {
            name: record.name.clone(),
            ucsc_name: record.ucsc_name.clone(),
            refseq: record.refseq.clone(),
            genbank: record.genbank.clone(),
            role: record.role.clone(),
            length: record.length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    AssembledMolecule,
    Accession,
    UcscName,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChromosome {
    /// The token as written in the record.
    pub token: String,
    pub refseq: String,
    pub genbank: String,
    pub ucsc_name: String,
    pub length: Option<u64>,
    pub source: ResolutionSource,
}

impl ResolvedChromosome {
    fn from_descriptor(
        token: &str,
        descriptor: &ChromosomeDescriptor,
        source: ResolutionSource,
    ) -> Self {
        Self {
            token: token.to_string(),
            refseq: descriptor.refseq.clone(),
            genbank: descriptor.genbank.clone(),
            ucsc_name: descriptor.ucsc_name.clone(),
            length: descriptor.length,
            source,
        }
    }

    /// Name under which reference bases are fetched.
    pub fn lookup_key(&self) -> &str {
        if !self.refseq.is_empty() {
            &self.refseq
        } else if !self.genbank.is_empty() {
            &self.genbank
        } else {
            &self.token
        }
    }
}

fn strip_chr(name: &str) -> &str {
    name.strip_prefix("chr").unwrap_or(name)
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    assembly: Option<AssemblyRecord>,
    chromosomes: Vec<ChromosomeDescriptor>,
    fallback: HashMap<String, u64>,
}

impl ReferenceResolver {
    /// Resolves the declared reference against `assemblies` and builds the
    /// chromosome table for it. An unknown reference raises a header finding.
    pub fn new(
        declared: Option<&str>,
        assemblies: &[AssemblyRecord],
        sequences: &[SequenceRecord],
        fallback: HashMap<String, u64>,
        findings: &mut Findings,
    ) -> Self {
        let assembly = declared.and_then(|reference| {
            let found = assemblies
                .iter()
                .find(|assembly| assembly.is_alias(reference))
                .cloned();
            if found.is_none() {
                findings.push_detail(Code::InvalidReferenceGenome, reference);
            }
            found
        });

        let chromosomes = match &assembly {
            Some(assembly) => sequences
                .iter()
                .filter(|sequence| {
                    !sequence.assembly.is_empty()
                        && (sequence.assembly == assembly.refseq
                            || sequence.assembly == assembly.genbank)
                })
                .map(ChromosomeDescriptor::from)
                .collect(),
            None => Vec::new(),
        };
        if let Some(assembly) = &assembly {
            log::debug!(
                "Reference resolved to {} ({} chromosomes)",
                assembly.canonical_accession(),
                chromosomes.len()
            );
        }

        Self {
            assembly,
            chromosomes,
            fallback,
        }
    }

    pub fn canonical_accession(&self) -> Option<&str> {
        self.assembly
            .as_ref()
            .map(AssemblyRecord::canonical_accession)
    }

    pub fn chromosomes(&self) -> &[ChromosomeDescriptor] {
        &self.chromosomes
    }

    fn lookup(&self, token: &str) -> Option<ResolvedChromosome> {
        if let Some(descriptor) = self
            .chromosomes
            .iter()
            .find(|c| c.name == token && c.role == ASSEMBLED_MOLECULE)
        {
            return Some(ResolvedChromosome::from_descriptor(
                token,
                descriptor,
                ResolutionSource::AssembledMolecule,
            ));
        }
        if let Some(descriptor) = self
            .chromosomes
            .iter()
            .find(|c| c.refseq == token || c.genbank == token)
        {
            return Some(ResolvedChromosome::from_descriptor(
                token,
                descriptor,
                ResolutionSource::Accession,
            ));
        }
        let bare = strip_chr(token);
        self.chromosomes
            .iter()
            .find(|c| !c.ucsc_name.is_empty() && strip_chr(&c.ucsc_name) == bare)
            .map(|descriptor| {
                ResolvedChromosome::from_descriptor(token, descriptor, ResolutionSource::UcscName)
            })
    }

    /// Resolves a record chromosome. Findings are only raised when an
    /// assembly was resolved or the fallback map supplied the chromosome.
    pub fn resolve(&self, token: &str, findings: &mut Findings) -> Option<ResolvedChromosome> {
        if token.is_empty() {
            return None;
        }
        if self.assembly.is_some() {
            if let Some(resolved) = self.lookup(token) {
                return Some(resolved);
            }
        }
        if let Some(length) = self.fallback.get(token) {
            findings.push_detail(Code::DownloadedReferenceChromosome, token);
            return Some(ResolvedChromosome {
                token: token.to_string(),
                refseq: String::new(),
                genbank: String::new(),
                ucsc_name: String::new(),
                length: Some(*length),
                source: ResolutionSource::Fallback,
            });
        }
        if self.assembly.is_some() {
            findings.push_detail(Code::InvalidChromosome, token);
        }
        None
    }

    /// Mate chromosomes of breakends are resolved without raising findings.
    pub fn is_known(&self, token: &str) -> bool {
        self.lookup(token).is_some() || self.fallback.contains_key(token)
    }

    pub fn has_assembly(&self) -> bool {
        self.assembly.is_some()
    }
}

/// Reference sequence lookups, 1-based inclusive coordinates.
pub trait SequenceProvider {
    fn fetch(&self, accession: &str, start: u64, end: u64) -> Result<String>;
}

/// In-memory sequences keyed by accession.
#[derive(Debug, Clone, Default)]
pub struct CannedSequences {
    sequences: HashMap<String, String>,
}

impl CannedSequences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequence(mut self, accession: &str, bases: &str) -> Self {
        self.sequences
            .insert(accession.to_string(), bases.to_ascii_uppercase());
        self
    }
}

impl SequenceProvider for CannedSequences {
    fn fetch(&self, accession: &str, start: u64, end: u64) -> Result<String> {
        let unavailable = || JvcfError::SequenceUnavailable {
            accession: accession.to_string(),
            start,
            end,
        };
        let bases = self.sequences.get(accession).ok_or_else(unavailable)?;
        if start == 0 || end < start || end as usize > bases.len() {
            return Err(unavailable());
        }
        Ok(bases[start as usize - 1..end as usize].to_string())
    }
}

/// Compares REF against the reference. `N` in REF matches any base.
pub fn check_reference_bases(
    provider: &dyn SequenceProvider,
    accession: &str,
    pos: u64,
    reference_allele: &str,
    findings: &mut Findings,
) {
    if pos == 0 || reference_allele.is_empty() {
        return;
    }
    let Some(end) = pos.checked_add(reference_allele.len() as u64 - 1) else {
        findings.push_detail(
            Code::InvalidPosition,
            format!("{reference_allele} at {pos} runs past the coordinate range"),
        );
        return;
    };
    match provider.fetch(accession, pos, end) {
        Ok(bases) => {
            let bases = bases.to_ascii_uppercase();
            let matches = bases.len() == reference_allele.len()
                && reference_allele
                    .bytes()
                    .zip(bases.bytes())
                    .all(|(r, b)| r.to_ascii_uppercase() == b'N' || r.to_ascii_uppercase() == b);
            if !matches {
                findings.push_detail(
                    Code::ReferenceMismatch,
                    format!("{reference_allele} != {bases} at {accession}:{pos}"),
                );
            }
        }
        Err(e) => {
            log::trace!("Reference lookup failed: {e}");
            findings.push_detail(Code::ReferenceLookupFailed, e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::{grch38_assemblies, grch38_sequences};

    fn resolver(declared: &str) -> (ReferenceResolver, Findings) {
        let mut findings = Findings::new();
        let resolver = ReferenceResolver::new(
            Some(declared),
            &grch38_assemblies(),
            &grch38_sequences(),
            HashMap::new(),
            &mut findings,
        );
        (resolver, findings)
    }

    #[test]
    fn reference_aliases_resolve_to_canonical_accession() {
        for alias in ["GRCh38", "hg38", "GCF_000001405.40", "GCA_000001405.29"] {
            let (resolver, findings) = resolver(alias);
            assert!(findings.is_empty(), "{alias}");
            assert_eq!(resolver.canonical_accession(), Some("GCF_000001405.40"));
            assert_eq!(resolver.chromosomes().len(), 4);
        }
        let (resolver, findings) = resolver("GRCh99");
        assert_eq!(findings.codes(), vec![Code::InvalidReferenceGenome]);
        assert!(!resolver.has_assembly());
    }

    #[test]
    fn chromosome_resolution_order() {
        let (resolver, _) = resolver("GRCh38");
        let mut findings = Findings::new();

        let by_name = resolver.resolve("1", &mut findings).unwrap();
        assert_eq!(by_name.source, ResolutionSource::AssembledMolecule);
        assert_eq!(by_name.refseq, "NC_000001.11");

        let by_accession = resolver.resolve("CM000664.2", &mut findings).unwrap();
        assert_eq!(by_accession.source, ResolutionSource::Accession);
        assert_eq!(by_accession.refseq, "NC_000002.12");

        let by_ucsc = resolver.resolve("chr2", &mut findings).unwrap();
        assert_eq!(by_ucsc.source, ResolutionSource::UcscName);
        let unprefixed_ucsc = resolver.resolve("X", &mut findings).unwrap();
        assert_eq!(unprefixed_ucsc.refseq, "NC_000023.11");
        assert!(findings.is_empty());

        assert!(resolver.resolve("chrUn_random", &mut findings).is_none());
        assert_eq!(findings.codes(), vec![Code::InvalidChromosome]);
    }

    #[test]
    fn unlocalized_scaffold_name_needs_accession() {
        let (resolver, _) = resolver("GRCh38");
        let mut findings = Findings::new();
        // name match requires the assembled-molecule role, ucsc name still applies
        let resolved = resolver.resolve("HSCHR1_CTG1_UNLOCALIZED", &mut findings);
        assert!(resolved.is_none());
        let resolved = resolver
            .resolve("chr1_KI270706v1_random", &mut findings)
            .unwrap();
        assert_eq!(resolved.source, ResolutionSource::UcscName);
    }

    #[test]
    fn fallback_map_is_last_resort() {
        let mut findings = Findings::new();
        let fallback = HashMap::from([("contig_7".to_string(), 5_000u64)]);
        let resolver = ReferenceResolver::new(
            Some("unknown"),
            &grch38_assemblies(),
            &grch38_sequences(),
            fallback,
            &mut findings,
        );
        let mut record_findings = Findings::new();
        let resolved = resolver.resolve("contig_7", &mut record_findings).unwrap();
        assert_eq!(resolved.length, Some(5_000));
        assert_eq!(resolved.lookup_key(), "contig_7");
        assert_eq!(
            record_findings.codes(),
            vec![Code::DownloadedReferenceChromosome]
        );

        // no assembly and no fallback hit: skipped silently
        let mut record_findings = Findings::new();
        assert!(resolver.resolve("chr1", &mut record_findings).is_none());
        assert!(record_findings.is_empty());
    }

    #[test]
    fn reference_bases_compare_with_n_wildcard() {
        let provider = CannedSequences::new().with_sequence("NC_1", "acgtacgtNN");
        let mut findings = Findings::new();
        check_reference_bases(&provider, "NC_1", 1, "ACG", &mut findings);
        check_reference_bases(&provider, "NC_1", 2, "NGT", &mut findings);
        check_reference_bases(&provider, "NC_1", 0, "A", &mut findings);
        assert!(findings.is_empty());

        check_reference_bases(&provider, "NC_1", 1, "T", &mut findings);
        assert_eq!(findings.codes(), vec![Code::ReferenceMismatch]);

        check_reference_bases(&provider, "NC_1", 9, "NNN", &mut findings);
        check_reference_bases(&provider, "NC_2", 1, "A", &mut findings);
        assert_eq!(findings.count(Code::ReferenceLookupFailed), 2);
    }

    #[test]
    fn reference_span_past_coordinate_range() {
        let provider = CannedSequences::new().with_sequence("NC_1", "ACGT");
        let mut findings = Findings::new();
        check_reference_bases(&provider, "NC_1", u64::MAX, "AC", &mut findings);
        assert_eq!(findings.codes(), vec![Code::InvalidPosition]);

        let mut findings = Findings::new();
        check_reference_bases(&provider, "NC_1", u64::MAX, "A", &mut findings);
        assert_eq!(findings.codes(), vec![Code::ReferenceLookupFailed]);
    }
}
