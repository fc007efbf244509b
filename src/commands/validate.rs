use crate::{
    cli::ValidateArgs,
    core::{
        config::ValidatorConfig,
        output::FileReport,
        reference::{AssemblyRecord, SequenceRecord},
        validator::Validator,
    },
    io::{
        metadata_reader::{read_assembly_report, read_fai_lengths, read_sequence_report},
        readers::{open_text_reader, FastaSequenceProvider},
        report_writer::{ReportWriter, WrittenOutputs},
    },
    utils::util::Result,
};
use rayon::{prelude::*, ThreadPoolBuilder};
use std::{collections::HashMap, path::Path, time::Instant};

/// Inputs shared by every file of one invocation.
struct SharedInputs<'a> {
    config: ValidatorConfig,
    assemblies: Vec<AssemblyRecord>,
    sequences: Vec<SequenceRecord>,
    fallback: HashMap<String, u64>,
    reference: Option<&'a Path>,
    output_dir: &'a Path,
}

fn validate_file(vcf_path: &Path, inputs: &SharedInputs) -> Result<(FileReport, WrittenOutputs)> {
    let start_timer = Instant::now();
    let provider = inputs
        .reference
        .map(FastaSequenceProvider::from_path)
        .transpose()?;

    let mut validator = Validator::new(&inputs.config, &inputs.assemblies, &inputs.sequences)
        .with_fallback(inputs.fallback.clone());
    if let Some(provider) = &provider {
        validator = validator.with_provider(provider);
    }
    let report = validator
        .validate_reader(open_text_reader(vcf_path)?)
        .map_err(|e| crate::jvcf_error!("Failed to read {}: {}", vcf_path.display(), e))?;
    let written = ReportWriter::new(inputs.output_dir, vcf_path).write(&report)?;

    log::info!(
        "{}: {} records, {} header and {} content diagnostics, {} ({:.2?})",
        vcf_path.display(),
        report.records,
        report.header.len(),
        report.content.len(),
        if report.is_valid() { "valid" } else { "invalid" },
        start_timer.elapsed()
    );
    log::debug!(
        "{}: wrote {}, {} and {}",
        vcf_path.display(),
        written.records.display(),
        written.log.display(),
        written.report.display()
    );
    Ok((report, written))
}

pub fn validate(args: ValidateArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir).map_err(|e| {
        crate::jvcf_error!(
            "Failed to create output directory {}: {}",
            args.output_dir.display(),
            e
        )
    })?;

    let fallback = match &args.fallback_fai {
        Some(path) => read_fai_lengths(path)?,
        None => HashMap::new(),
    };
    let inputs = SharedInputs {
        config: ValidatorConfig::for_mode(args.mode)?,
        assemblies: read_assembly_report(&args.assembly_report)?,
        sequences: read_sequence_report(&args.sequence_report)?,
        fallback,
        reference: args.reference.as_deref(),
        output_dir: &args.output_dir,
    };
    log::info!(
        "Validating {} file(s) in {} mode with {} thread(s)",
        args.vcfs.len(),
        args.mode,
        args.num_threads
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .thread_name(|i| format!("jvcf-validate-{i}"))
        .build()
        .map_err(|e| crate::jvcf_error!("Failed to initialize validation thread pool: {e}"))?;
    let reports: Vec<(FileReport, WrittenOutputs)> = pool.install(|| {
        args.vcfs
            .par_iter()
            .map(|vcf_path| validate_file(vcf_path, &inputs))
            .collect::<Result<_>>()
    })?;

    let invalid = reports.iter().filter(|(report, _)| !report.is_valid()).count();
    if invalid > 0 {
        log::warn!("{invalid} of {} file(s) failed validation", reports.len());
    } else {
        log::info!("All {} file(s) passed validation", reports.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        config::Mode,
        test_utils::{make_temp_vcf, SNP_HEADER},
    };
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn metadata() -> (NamedTempFile, NamedTempFile) {
        let mut assembly_report = NamedTempFile::new().unwrap();
        writeln!(
            assembly_report,
            "GCF_000001405.40\tGRCh38\thg38\tGCF_000001405.40\tGCA_000001405.29"
        )
        .unwrap();
        let mut sequence_report = NamedTempFile::new().unwrap();
        writeln!(
            sequence_report,
            "GCF_000001405.40\t1\tchr1\tNC_000001.11\tCM000663.2\tassembled-molecule\t248956422"
        )
        .unwrap();
        writeln!(
            sequence_report,
            "GCF_000001405.40\t2\tchr2\tNC_000002.12\tCM000664.2\tassembled-molecule\t242193529"
        )
        .unwrap();
        assembly_report.flush().unwrap();
        sequence_report.flush().unwrap();
        (assembly_report, sequence_report)
    }

    #[test]
    fn validates_every_file_into_the_output_directory() -> Result<()> {
        let (assembly_report, sequence_report) = metadata();
        let first = make_temp_vcf(&format!(
            "{SNP_HEADER}chr1\t100\trs1\tA\tT\t.\tPASS\tAC=1;AN=2\tGT\t0/1\n"
        ));
        let second = make_temp_vcf(&format!(
            "{SNP_HEADER}chr2\t200\trs2\tG\tC\t.\tPASS\t.\tGT\t0/1\n"
        ));
        let output_dir = tempdir()?;

        validate(ValidateArgs {
            vcfs: vec![first.path().to_path_buf(), second.path().to_path_buf()],
            mode: Mode::Snp,
            assembly_report: assembly_report.path().to_path_buf(),
            sequence_report: sequence_report.path().to_path_buf(),
            reference: None,
            fallback_fai: None,
            output_dir: output_dir.path().to_path_buf(),
            num_threads: 2,
        })?;

        for input in [&first, &second] {
            let stem = crate::io::report_writer::output_stem(input.path());
            assert!(output_dir.path().join(format!("{stem}.normalized.vcf")).exists());
            assert!(output_dir.path().join(format!("{stem}.log")).exists());
            assert!(output_dir.path().join(format!("{stem}.report.json")).exists());
        }
        Ok(())
    }

    #[test]
    fn missing_reference_index_is_an_error() {
        let (assembly_report, sequence_report) = metadata();
        let vcf = make_temp_vcf(SNP_HEADER);
        let output_dir = tempdir().unwrap();
        let reference = output_dir.path().join("genome.fa");
        std::fs::write(&reference, ">NC_000001.11\nACGT\n").unwrap();

        let result = validate(ValidateArgs {
            vcfs: vec![vcf.path().to_path_buf()],
            mode: Mode::Snp,
            assembly_report: assembly_report.path().to_path_buf(),
            sequence_report: sequence_report.path().to_path_buf(),
            reference: Some(reference),
            fallback_fai: None,
            output_dir: output_dir.path().to_path_buf(),
            num_threads: 1,
        });
        assert!(result.is_err());
    }
}
