use std::path::PathBuf;
use thiserror::Error;

pub type JvcfResult<T> = std::result::Result<T, JvcfError>;

#[derive(Debug, Error)]
pub enum JvcfError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Htslib(#[from] rust_htslib::errors::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Reference sequence {accession} has no bases for {start}-{end}")]
    SequenceUnavailable {
        accession: String,
        start: u64,
        end: u64,
    },
    #[error(
        "Reference index file not found: {}. Create it using 'samtools faidx {}'",
        fai_path.display(),
        reference_path.display()
    )]
    MissingReferenceIndex {
        fai_path: PathBuf,
        reference_path: PathBuf,
    },
    #[error("Invalid gzip header: {}", path.display())]
    InvalidGzipHeader { path: PathBuf },
}

impl JvcfError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[macro_export]
macro_rules! jvcf_error {
    ($($arg:tt)*) => {
        $crate::error::JvcfError::message(format!($($arg)*))
    };
}
