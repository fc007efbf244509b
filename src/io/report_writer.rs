use crate::{
    core::output::{EmittedRecords, FileReport},
    utils::util::Result,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

const INPUT_SUFFIXES: [&str; 4] = [".vcf.gz", ".vcf.bgz", ".vcf", ".gz"];

/// File name of `input` without its VCF/compression suffix.
pub fn output_stem(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let lowercase = name.to_ascii_lowercase();
    INPUT_SUFFIXES
        .iter()
        .find(|suffix| lowercase.ends_with(*suffix) && lowercase.len() > suffix.len())
        .map_or(name.clone(), |suffix| {
            name[..name.len() - suffix.len()].to_string()
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub records: PathBuf,
    pub log: PathBuf,
    pub report: PathBuf,
}

pub struct ReportWriter {
    output_dir: PathBuf,
    stem: String,
}

impl ReportWriter {
    pub fn new(output_dir: &Path, input: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            stem: output_stem(input),
        }
    }

    fn path(&self, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{extension}", self.stem))
    }

    fn create(path: &Path) -> Result<BufWriter<File>> {
        let file = File::create(path).map_err(|e| {
            crate::jvcf_error!("Failed to create output file {}: {}", path.display(), e)
        })?;
        Ok(BufWriter::new(file))
    }

    pub fn write(&self, report: &FileReport) -> Result<WrittenOutputs> {
        let records = match &report.output {
            EmittedRecords::Snp(lines) => {
                let path = self.path("normalized.vcf");
                let mut writer = Self::create(&path)?;
                for line in report.header_lines.iter().chain(lines) {
                    writeln!(writer, "{line}")?;
                }
                writer.flush()?;
                path
            }
            EmittedRecords::Sv(calls) => {
                let path = self.path("sv.jsonl");
                let mut writer = Self::create(&path)?;
                for call in calls {
                    serde_json::to_writer(&mut writer, call)?;
                    writeln!(writer)?;
                }
                writer.flush()?;
                path
            }
        };

        let log = self.path("log");
        let mut writer = Self::create(&log)?;
        for annotated in &report.annotated_log {
            writeln!(writer, "{annotated}")?;
        }
        writer.flush()?;

        let summary = self.path("report.json");
        let mut writer = Self::create(&summary)?;
        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()?;

        Ok(WrittenOutputs {
            records,
            log,
            report: summary,
        })
    }
}
