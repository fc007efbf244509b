use crate::{core::reference::SequenceProvider, error::JvcfError, utils::util::Result};
use flate2::read::MultiGzDecoder;
use rust_htslib::faidx;
use std::{
    fs::File,
    io::{BufReader, Read as ioRead},
    path::{Path, PathBuf},
};

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz") || path_str.ends_with(".gzip")
}

/// Opens plain or gzip/bgzip compressed text, chosen by extension.
pub fn open_text_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    let file = File::open(path)
        .map_err(|error| crate::jvcf_error!("Failed to open file {}: {error}", path.display()))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(JvcfError::InvalidGzipHeader {
                path: path.to_path_buf(),
            })
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

pub fn open_genome_reader(path: &Path) -> Result<faidx::Reader> {
    let fai_path = {
        let mut fai_path = path.as_os_str().to_os_string();
        fai_path.push(".fai");
        PathBuf::from(fai_path)
    };
    if !fai_path.exists() {
        return Err(JvcfError::MissingReferenceIndex {
            fai_path,
            reference_path: path.to_path_buf(),
        });
    }
    faidx::Reader::from_path(path).map_err(|e| e.into())
}

/// Reference bases from an indexed FASTA whose sequence names are accessions.
pub struct FastaSequenceProvider {
    reader: faidx::Reader,
}

impl FastaSequenceProvider {
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self {
            reader: open_genome_reader(path)?,
        })
    }
}

impl SequenceProvider for FastaSequenceProvider {
    fn fetch(&self, accession: &str, start: u64, end: u64) -> Result<String> {
        let unavailable = || JvcfError::SequenceUnavailable {
            accession: accession.to_string(),
            start,
            end,
        };
        if start == 0 || end < start {
            return Err(unavailable());
        }
        let bases = self
            .reader
            .fetch_seq_string(accession, start as usize - 1, end as usize - 1)
            .map_err(|_| unavailable())?;
        if bases.len() as u64 != end - start + 1 {
            return Err(unavailable());
        }
        Ok(bases.to_ascii_uppercase())
    }
}
