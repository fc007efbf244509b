use super::{
    diagnostic::{Code, Findings},
    record::ParsedRecord,
};
use crate::{
    constants::{AC_TAG, AF_TAG, AN_TAG},
    utils::util::floor_ratio,
};
use serde::Serialize;

/// AN/AC/AF as emitted. Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlleleStats {
    pub allele_number: String,
    pub allele_count: String,
    pub allele_frequency: String,
    /// AF was derived from AC/AN rather than read from INFO.
    #[serde(skip)]
    pub calculated: bool,
}

pub fn allele_stats(record: &ParsedRecord, decimals: u32, findings: &mut Findings) -> AlleleStats {
    let allele_number = record.info_integer(AN_TAG);
    let allele_count = record.info_integer(AC_TAG);
    let verbatim = record.info_text(AF_TAG).map(str::to_string);

    let mut stats = AlleleStats {
        allele_number: allele_number.map(|an| an.to_string()).unwrap_or_default(),
        allele_count: allele_count.map(|ac| ac.to_string()).unwrap_or_default(),
        ..Default::default()
    };

    let (Some(an), Some(ac)) = (allele_number, allele_count) else {
        stats.allele_frequency = verbatim.unwrap_or_default();
        return stats;
    };
    if ac > an {
        findings.push_detail(Code::AlleleCountExceedsNumber, format!("AC={ac} AN={an}"));
        stats.allele_frequency = verbatim.unwrap_or_default();
        return stats;
    }
    if let Some(af) = verbatim {
        stats.allele_frequency = af;
        return stats;
    }
    if let Some(af) = floor_ratio(ac.unsigned_abs(), an.unsigned_abs(), decimals) {
        findings.push_detail(Code::AlleleFrequencyCalculated, format!("AF={af}"));
        stats.allele_frequency = af;
        stats.calculated = true;
    }
    stats
}
