use super::{
    diagnostic::Findings,
    header::VcfHeader,
    reference::{AssemblyRecord, CannedSequences, ReferenceResolver, SequenceRecord},
};
use std::{collections::HashMap, io::Write};
use tempfile::NamedTempFile;

pub const SNP_HEADER: &str = "\
##fileformat=VCFv4.2
##reference=GRCh38
##contig=<ID=chr1,length=248956422>
##contig=<ID=chr2,length=242193529>
##contig=<ID=chrX,length=156040895>
##INFO=<ID=VRT,Number=1,Type=String,Description=\"Variation type\">
##INFO=<ID=AC,Number=A,Type=Integer,Description=\"Allele count\">
##INFO=<ID=AN,Number=1,Type=Integer,Description=\"Allele number\">
##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele frequency\">
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FORMAT=<ID=GQ,Number=1,Type=Integer,Description=\"Genotype quality\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample1
";

pub const SV_HEADER: &str = "\
##fileformat=VCFv4.3
##reference=GRCh38
##contig=<ID=chr1,length=248956422>
##contig=<ID=chr2,length=242193529>
##INFO=<ID=SVTYPE,Number=1,Type=String,Description=\"Type of structural variant\">
##INFO=<ID=SVLEN,Number=1,Type=Integer,Description=\"Length of structural variant\">
##INFO=<ID=END,Number=1,Type=Integer,Description=\"End position\">
##INFO=<ID=CIPOS,Number=2,Type=Integer,Description=\"Confidence interval around POS\">
##INFO=<ID=CIEND,Number=2,Type=Integer,Description=\"Confidence interval around END\">
##INFO=<ID=POSrange,Number=2,Type=Integer,Description=\"Outer and inner start\">
##INFO=<ID=ENDrange,Number=2,Type=Integer,Description=\"Inner and outer stop\">
##INFO=<ID=IMPRECISE,Number=0,Type=Flag,Description=\"Imprecise call\">
##INFO=<ID=EVENT,Number=1,Type=String,Description=\"Event identifier\">
##INFO=<ID=MATEID,Number=1,Type=String,Description=\"Mate breakend\">
##INFO=<ID=CPX_TYPE,Number=1,Type=String,Description=\"Complex event type\">
##INFO=<ID=AC,Number=A,Type=Integer,Description=\"Allele count\">
##INFO=<ID=AN,Number=1,Type=Integer,Description=\"Allele number\">
##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele frequency\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
";

pub fn snp_header() -> VcfHeader {
    VcfHeader::parse(SNP_HEADER).0
}

pub fn sv_header() -> VcfHeader {
    VcfHeader::parse(SV_HEADER).0
}

pub fn grch38_assemblies() -> Vec<AssemblyRecord> {
    let assembly = |accession: &str, db_name: &str, ucsc_name: &str, genbank: &str| AssemblyRecord {
        accession: accession.to_string(),
        db_name: db_name.to_string(),
        ucsc_name: ucsc_name.to_string(),
        refseq: accession.to_string(),
        genbank: genbank.to_string(),
    };
    vec![
        assembly("GCF_000001405.25", "GRCh37", "hg19", "GCA_000001405.1"),
        assembly("GCF_000001405.40", "GRCh38", "hg38", "GCA_000001405.29"),
    ]
}

pub fn grch38_sequences() -> Vec<SequenceRecord> {
    let sequence = |assembly: &str,
                    name: &str,
                    ucsc_name: &str,
                    refseq: &str,
                    genbank: &str,
                    role: &str,
                    length: u64| SequenceRecord {
        assembly: assembly.to_string(),
        name: name.to_string(),
        ucsc_name: ucsc_name.to_string(),
        refseq: refseq.to_string(),
        genbank: genbank.to_string(),
        role: role.to_string(),
        length: Some(length),
    };
    let grch38 = "GCF_000001405.40";
    vec![
        sequence("GCF_000001405.25", "1", "chr1", "NC_000001.10", "CM000663.1", "assembled-molecule", 249250621),
        sequence(grch38, "1", "chr1", "NC_000001.11", "CM000663.2", "assembled-molecule", 248956422),
        sequence(grch38, "2", "chr2", "NC_000002.12", "CM000664.2", "assembled-molecule", 242193529),
        sequence(grch38, "X", "chrX", "NC_000023.11", "CM000685.2", "assembled-molecule", 156040895),
        sequence(
            grch38,
            "HSCHR1_CTG1_UNLOCALIZED",
            "chr1_KI270706v1_random",
            "NT_187361.1",
            "KI270706.1",
            "unlocalized-scaffold",
            175055,
        ),
    ]
}

pub fn grch38_resolver() -> ReferenceResolver {
    ReferenceResolver::new(
        Some("GRCh38"),
        &grch38_assemblies(),
        &grch38_sequences(),
        HashMap::new(),
        &mut Findings::new(),
    )
}

/// Base at a 1-based position of [`canned_chr1`].
pub fn chr1_base(pos: u64) -> char {
    ['A', 'C', 'G', 'T'][((pos - 1) % 4) as usize]
}

/// The first 4 kb of chr1 as a repeating `ACGT`.
pub fn canned_chr1() -> CannedSequences {
    CannedSequences::new().with_sequence("NC_000001.11", &"ACGT".repeat(1000))
}

pub fn make_temp_vcf(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
