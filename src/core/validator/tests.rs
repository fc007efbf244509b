use super::*;
use crate::{
    core::{
        breakend::Strand,
        config::ValidatorConfig,
        diagnostic::Severity,
        svtype::SvType,
        test_utils::{
            canned_chr1, chr1_base, grch38_assemblies, grch38_sequences, SNP_HEADER, SV_HEADER,
        },
    },
    utils::util::init_logger,
};

fn snp_line(chromosome: &str, pos: u64, id: &str, reference: &str, alt: &str, info: &str) -> String {
    format!("{chromosome}\t{pos}\t{id}\t{reference}\t{alt}\t.\tPASS\t{info}\tGT\t0/1")
}

fn sv_line(chromosome: &str, pos: u64, id: &str, reference: &str, alt: &str, info: &str) -> String {
    format!("{chromosome}\t{pos}\t{id}\t{reference}\t{alt}\t.\tPASS\t{info}")
}

fn file(header: &str, records: &[String]) -> String {
    format!("{header}{}\n", records.join("\n"))
}

fn run(config: &ValidatorConfig, text: &str) -> FileReport {
    init_logger();
    let assemblies = grch38_assemblies();
    let sequences = grch38_sequences();
    Validator::new(config, &assemblies, &sequences)
        .validate_str(text)
        .unwrap()
}

fn snp_report(records: &[String]) -> FileReport {
    run(&ValidatorConfig::snp().unwrap(), &file(SNP_HEADER, records))
}

fn sv_report(records: &[String]) -> FileReport {
    run(&ValidatorConfig::sv().unwrap(), &file(SV_HEADER, records))
}

fn tally(report: &FileReport, code: Code) -> Option<usize> {
    report.content.find(code).and_then(|diagnostic| diagnostic.count)
}

#[test]
fn clean_snp_file_is_valid() {
    let report = snp_report(&[
        snp_line("chr1", 100, "rs1", "A", "T", "AC=1;AN=2;AF=0.5"),
        snp_line("chr1", 500, "rs2", "AC", "A", "."),
        snp_line("chr2", 10, "rs3", "GT", "CA", "VRT=8"),
    ]);
    assert!(report.header.is_empty(), "{:?}", report.header);
    assert!(report.content.is_empty(), "{:?}", report.content);
    assert!(report.is_valid());
    assert_eq!(report.records, 3);
    assert_eq!(report.reference_accession.as_deref(), Some("GCF_000001405.40"));
    assert_eq!(report.header_lines[1], "##reference=GCF_000001405.40");
    assert!(report.snp_lines()[1].contains("\tPASS\tVRT=2\t"));
}

#[test]
fn snv_gets_vrt_1() {
    let report = snp_report(&[snp_line("chr1", 100, "rs1", "A", "T", ".")]);
    assert_eq!(
        report.snp_lines(),
        [snp_line("chr1", 100, "rs1", "A", "T", "VRT=1")]
    );
}

#[test]
fn allele_count_above_number() {
    let report = snp_report(&[snp_line("chr1", 100, "rs1", "A", "T", "AN=10;AC=12")]);
    assert_eq!(tally(&report, Code::AlleleCountExceedsNumber), Some(1));
    assert!(!report.content.contains(Code::AlleleFrequencyCalculated));
    assert!(!report.snp_lines()[0].contains("AF="));
    assert!(!report.is_valid());
}

#[test]
fn allele_frequency_is_derived() {
    let report = snp_report(&[snp_line("chr1", 100, "rs1", "A", "T", "AN=10;AC=5")]);
    let calculated = report.content.find(Code::AlleleFrequencyCalculated).unwrap();
    assert_eq!(calculated.severity, Severity::Warning);
    assert!(report.snp_lines()[0].contains("AN=10;AC=5;VRT=1;AF=0.5"));
    assert!(report.is_valid());
}

#[test]
fn emission_is_idempotent() {
    let report = snp_report(&[
        snp_line("chr1", 100, "rs1", "A", "T", "AN=10;AC=5"),
        snp_line(" chr1", 200, "rs2", "AC", "GT", "."),
        snp_line("chr2", 300, "rs3", "G", "GTT", "DP=7"),
    ]);
    let mut rerun_text = report.header_lines.join("\n");
    rerun_text.push('\n');
    rerun_text.push_str(&report.snp_lines().join("\n"));
    let rerun = run(&ValidatorConfig::snp().unwrap(), &rerun_text);

    assert_eq!(rerun.header_lines, report.header_lines);
    assert_eq!(rerun.snp_lines(), report.snp_lines());
    assert!(!rerun.content.contains(Code::AlleleFrequencyCalculated));
    assert!(!rerun.content.contains(Code::RecordWhitespaceTrimmed));
}

#[test]
fn multiallelic_alt_keeps_checking() {
    let report = snp_report(&[snp_line("chr1", 100, "rs1", "A", "T,G", "AN=10;AC=5")]);
    assert_eq!(tally(&report, Code::MultiAllelic), Some(1));
    assert!(report.content.contains(Code::AlleleFrequencyCalculated));
    assert!(report.content.contains(Code::SnpMissingVariationType));
    assert_eq!(report.snp_lines().len(), 1);
}

#[test]
fn one_not_sorted_per_offending_record() {
    let report = snp_report(&[
        snp_line("chr1", 100, "rs1", "A", "T", "."),
        snp_line("chr1", 50, "rs2", "A", "T", "."),
        snp_line("chr1", 40, "rs3", "A", "T", "."),
        snp_line("chr1", 200, "rs4", "A", "T", "."),
    ]);
    assert_eq!(tally(&report, Code::NotSorted), Some(2));
    let lines: Vec<usize> = report
        .annotated_log
        .iter()
        .filter(|entry| entry.code == Code::NotSorted)
        .map(|entry| entry.line_number)
        .collect();
    // 13 header lines precede the first record
    assert_eq!(lines, vec![15, 16]);
}

#[test]
fn chromosome_grouping() {
    let report = snp_report(&[
        snp_line("chr1", 100, "rs1", "A", "T", "."),
        snp_line("chr2", 100, "rs2", "A", "T", "."),
        snp_line("chr1", 300, "rs3", "A", "T", "."),
        snp_line("chr1", 400, "rs4", "A", "T", "."),
    ]);
    assert_eq!(tally(&report, Code::ChromosomesNotGrouped), Some(1));
    assert!(!report.content.contains(Code::NotSorted));
}

#[test]
fn duplicates_and_density() {
    let report = snp_report(&[
        snp_line("chr1", 100, "rs1", "A", "T", "."),
        snp_line("chr1", 100, "rs2", "A", "T", "."),
        snp_line("chr1", 120, "rs2", "A", "G", "."),
        snp_line("chr1", 900, "rs4", "A", "G", "."),
    ]);
    assert_eq!(tally(&report, Code::DuplicatedSite), Some(1));
    assert_eq!(tally(&report, Code::DuplicatedId), Some(1));
    assert_eq!(tally(&report, Code::DenseSnps), Some(1));
}

#[test]
fn classification_is_total() {
    let records = [
        snp_line("chr1", 100, "rs1", "A", "T", "."),
        snp_line("chr1", 200, "rs2", "AC", "AT", "."),
        snp_line("chr1", 300, "rs3", "A", "<DEL>", "."),
        snp_line("chr1", 400, "rs4", "A", "T", "VRT=42"),
        snp_line("chr1", 500, "rs5", "A", ".", "."),
    ];
    let report = snp_report(&records);
    assert_eq!(report.records, records.len());
    assert_eq!(report.snp_lines().len(), records.len());
    assert_eq!(tally(&report, Code::SnpMissingVariationType), Some(3));
    assert_eq!(tally(&report, Code::VariationTypeNotDefined), Some(1));
}

#[test]
fn structural_calls() {
    let report = sv_report(&[
        sv_line("chr1", 100, "bnd1", "N", "N[chr2:500[", "EVENT=e1"),
        sv_line("chr1", 1000, "dup1", "A", "<DUP:TANDEM>", "SVLEN=500;AC=1;AN=4"),
        sv_line("chr1", 2000, "ins1", "G", "GACGTACGT", "SVTYPE=INS"),
    ]);
    let calls = report.sv_calls();
    assert_eq!(calls.len(), 3);

    let breakend = calls[0].breakend.as_ref().unwrap();
    assert_eq!(calls[0].variant_type, SvType::INTERCHROMOSOMAL_TRANSLOCATION.label());
    assert_eq!((breakend.from_strand, breakend.to_strand), (Strand::Forward, Strand::Forward));
    assert_eq!(breakend.to_chromosome, "chr2");
    assert_eq!(breakend.to_coordinate, 500);
    assert_eq!(calls[0].refseq_accession, "NC_000001.11");

    assert_eq!(calls[1].variant_type, "tandem duplication");
    assert_eq!(calls[1].interval.stop, Some(1500));
    assert_eq!(calls[1].allele_stats.allele_frequency, "0.25");

    assert_eq!(calls[2].variant_type, "insertion");
    assert_eq!(calls[2].interval.stop, Some(2002));
    assert!(report.is_valid(), "{:?}", report.content);
}

#[test]
fn unknown_reference_leaves_chromosomes_unresolved() {
    let header = SV_HEADER.replace("##reference=GRCh38", "##reference=GRCh99");
    let report = run(
        &ValidatorConfig::sv().unwrap(),
        &file(&header, &[sv_line("chr1", 1000, "del1", "A", "<DEL>", "SVLEN=-10")]),
    );
    assert!(report.header.contains(Code::InvalidReferenceGenome));
    assert!(!report.content.contains(Code::InvalidChromosome));
    assert_eq!(report.sv_calls()[0].refseq_accession, "");
    assert_eq!(report.header_lines[1], "##reference=GRCh99");
}

#[test]
fn unknown_chromosome_with_assembly() {
    let report = sv_report(&[sv_line("chrUn", 10, "del1", "A", "<DEL>", "SVLEN=-10")]);
    assert_eq!(tally(&report, Code::InvalidChromosome), Some(1));
    assert!(report.content.contains(Code::UndefinedContig));
}

#[test]
fn downloaded_reference_fallback() {
    let header = SV_HEADER.replace("##reference=GRCh38", "##reference=my_assembly");
    let text = file(
        &header,
        &[
            sv_line("contig_7", 500, "del1", "A", "<DEL>", "SVLEN=-10"),
            sv_line("contig_7", 1001, "tel1", "N", "N[contig_7:1[", "."),
            sv_line("contig_7", 1002, "del2", "A", "<DEL>", "SVLEN=-10"),
        ],
    );
    let config = ValidatorConfig::sv().unwrap();
    let (assemblies, sequences) = (grch38_assemblies(), grch38_sequences());
    let report = Validator::new(&config, &assemblies, &sequences)
        .with_fallback(HashMap::from([("contig_7".to_string(), 1000)]))
        .validate_str(&text)
        .unwrap();

    let downloaded = report.content.find(Code::DownloadedReferenceChromosome).unwrap();
    assert_eq!(downloaded.severity, Severity::ErrorExchangeable);
    assert_eq!(downloaded.count, Some(3));
    assert_eq!(tally(&report, Code::PositionBeyondChromosome), Some(1));
}

#[test]
fn reference_bases_are_compared() {
    let provider = canned_chr1();
    let config = ValidatorConfig::snp().unwrap();
    let (assemblies, sequences) = (grch38_assemblies(), grch38_sequences());
    let validator = Validator::new(&config, &assemblies, &sequences).with_provider(&provider);
    let matching = chr1_base(1).to_string();
    let text = file(
        SNP_HEADER,
        &[
            snp_line("chr1", 1, "rs1", &matching, "T", "."),
            snp_line("chr1", 2, "rs2", "A", "T", "."),
            snp_line("chr1", 5000, "rs3", "A", "T", "."),
        ],
    );
    let report = validator.validate_str(&text).unwrap();

    let mismatch = report.content.find(Code::ReferenceMismatch).unwrap();
    assert_eq!(mismatch.count, Some(1));
    assert_eq!(report.content.error_ignorable.len(), 1);
    assert_eq!(tally(&report, Code::ReferenceLookupFailed), Some(1));
}

#[test]
fn header_problems_do_not_stop_records() {
    let text = "##fileformat=VCFv4.2\n##reference=GRCh38\nchr1\t100\trs1\tA\tT\t.\tPASS\t.\n";
    let report = run(&ValidatorConfig::snp().unwrap(), text);
    assert!(report.header.contains(Code::MissingColumnHeader));
    assert_eq!(report.records, 1);
    assert_eq!(report.snp_lines(), ["chr1\t100\trs1\tA\tT\t.\tPASS\tVRT=1"]);
}

#[test]
fn byte_order_mark_and_empty_lines() {
    let text = format!(
        "\u{feff}{}",
        file(
            SNP_HEADER,
            &[
                snp_line("chr1", 100, "rs1", "A", "T", "."),
                String::new(),
                snp_line("chr1", 200, "rs2", "A", "T", "."),
            ],
        )
    );
    let report = run(&ValidatorConfig::snp().unwrap(), &text);
    assert!(!report.header.contains(Code::MissingFileformat));
    assert_eq!(tally(&report, Code::EmptyDataLine), Some(1));
    assert_eq!(report.records, 2);
}

#[test]
fn too_few_columns_is_logged_but_not_emitted() {
    let report = snp_report(&["chr1\t100\trs1\tA\tT".to_string()]);
    assert_eq!(tally(&report, Code::TooFewColumns), Some(1));
    assert_eq!(report.records, 0);
    assert!(report.output.is_empty());
    assert_eq!(report.annotated_log[0].line, "chr1\t100\trs1\tA\tT");
}

#[test]
fn structural_allele_frequency() {
    let report = sv_report(&[sv_line("chr1", 1000, "del1", "A", "<DEL>", "SVLEN=-100;AN=10;AC=12")]);
    assert_eq!(tally(&report, Code::AlleleCountExceedsNumber), Some(1));
    assert_eq!(report.sv_calls()[0].allele_stats.allele_frequency, "");

    let report = sv_report(&[sv_line("chr1", 1000, "del1", "A", "<DEL>", "SVLEN=-100;AN=10;AC=5")]);
    assert!(report.content.contains(Code::AlleleFrequencyCalculated));
    assert!(!report.content.contains(Code::AlleleCountExceedsNumber));
    assert_eq!(report.sv_calls()[0].allele_stats.allele_frequency, "0.5");
}

#[test]
fn positions_at_the_coordinate_limit() {
    let header = SV_HEADER
        .replace("##reference=GRCh38", "##reference=GRCh99")
        .replace(
            "##contig=<ID=chr1,length=248956422>",
            "##contig=<ID=chr1,length=18446744073709551615>",
        );
    let report = run(
        &ValidatorConfig::sv().unwrap(),
        &file(
            &header,
            &[
                sv_line("chr1", 100, "del1", "A", "<DEL>", "SVLEN=-10"),
                sv_line("chr1", u64::MAX, "ins1", "A", "<INS>", "SVLEN=10"),
            ],
        ),
    );
    let calls = report.sv_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].interval.stop, Some(110));
    assert_eq!(calls[1].interval.stop, None);
    assert_eq!(tally(&report, Code::StopUndetermined), Some(1));
    assert!(!report.content.contains(Code::PositionBeyondChromosome));
}

#[test]
fn invalid_utf8_is_replaced_and_checked() {
    let text = file(
        SNP_HEADER,
        &[
            snp_line("chr1", 100, "rs1", "A", "T", "."),
            snp_line("chr1", 200, "rsX", "A", "T", "."),
        ],
    );
    let mut bytes = text.into_bytes();
    let marker = bytes
        .windows(3)
        .position(|window| window == b"rsX")
        .unwrap();
    bytes[marker + 2] = 0xff;

    init_logger();
    let config = ValidatorConfig::snp().unwrap();
    let (assemblies, sequences) = (grch38_assemblies(), grch38_sequences());
    let report = Validator::new(&config, &assemblies, &sequences)
        .validate_reader(&bytes[..])
        .unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(tally(&report, Code::InvalidEncoding), Some(1));
    let logged = report
        .annotated_log
        .iter()
        .find(|annotated| annotated.code == Code::InvalidEncoding)
        .unwrap();
    assert_eq!(logged.line_number, 15);
    assert!(logged.line.contains("rs\u{fffd}"));
}
