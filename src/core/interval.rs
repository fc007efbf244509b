use super::{
    classify::ClassifiedVariant,
    diagnostic::{Code, Findings},
    record::ParsedRecord,
};
use crate::constants::{CIEND_TAG, CIPOS_TAG, END_RANGE_TAG, END_TAG, POS_RANGE_TAG, SVLEN_TAG};
use serde::Serialize;

/// Normalized coordinates of a structural variant, all 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub outer_start: Option<u64>,
    pub start: Option<u64>,
    pub inner_start: Option<u64>,
    pub inner_stop: Option<u64>,
    pub stop: Option<u64>,
    pub outer_stop: Option<u64>,
    pub ci_pos: Option<(i64, i64)>,
    pub ci_end: Option<(i64, i64)>,
}

fn to_coordinate(value: Option<i64>) -> Option<u64> {
    value.and_then(|value| u64::try_from(value).ok())
}

fn confidence_interval(pair: Option<(Option<i64>, Option<i64>)>) -> Option<(i64, i64)> {
    match pair {
        Some((Some(left), Some(right))) => Some((left.abs(), right)),
        _ => None,
    }
}

fn stop_coordinate(
    record: &ParsedRecord,
    classified: &ClassifiedVariant,
    start: u64,
    findings: &mut Findings,
) -> Option<u64> {
    if let Some(end) = to_coordinate(record.info_integer(END_TAG)) {
        if end < start {
            findings.push_detail(Code::EndBeforePos, format!("{end} < {start}"));
        }
        return Some(end);
    }

    let svtype = classified.sv_type();
    let svlen = record.info_integer(SVLEN_TAG).map(i64::unsigned_abs);
    let after_reference = (record.reference.len() as u64)
        .checked_add(1)
        .and_then(|offset| start.checked_add(offset));
    let stop = match svtype {
        Some(svtype) if svtype.is_insertion_like() => after_reference,
        _ if record.alt_is_literal() => after_reference,
        Some(svtype) if svtype.is_length_based() => match svlen {
            Some(svlen) => start.checked_add(svlen),
            None => {
                findings.push_detail(Code::StopUndetermined, svtype.label());
                return None;
            }
        },
        Some(_) => start.checked_add(svlen?),
        None => return None,
    };
    if stop.is_none() {
        findings.push_detail(Code::StopUndetermined, format!("stop past {start} overflows"));
    }
    stop
}

fn contains(range: (Option<u64>, Option<u64>), coordinate: u64) -> bool {
    range.0 == Some(coordinate) || range.1 == Some(coordinate)
}

/// Derives start, stop and the outer/inner ranges of an SV record.
pub fn normalize(
    record: &ParsedRecord,
    classified: &ClassifiedVariant,
    findings: &mut Findings,
) -> Interval {
    let mut interval = Interval {
        start: record.pos,
        ci_pos: confidence_interval(record.info_pair(CIPOS_TAG)),
        ci_end: confidence_interval(record.info_pair(CIEND_TAG)),
        ..Default::default()
    };
    let Some(start) = record.pos else {
        return interval;
    };
    interval.stop = stop_coordinate(record, classified, start, findings);

    if let Some((left, right)) = record.info_pair(POS_RANGE_TAG) {
        let range = (to_coordinate(left), to_coordinate(right));
        (interval.outer_start, interval.inner_start) = range;
        if !contains(range, start) {
            findings.push_detail(Code::PosRangeMismatch, format!("POS {start}"));
        }
    }
    if let Some((left, right)) = record.info_pair(END_RANGE_TAG) {
        let range = (to_coordinate(left), to_coordinate(right));
        (interval.inner_stop, interval.outer_stop) = range;
        if let Some(stop) = interval.stop {
            if !contains(range, stop) {
                findings.push_detail(Code::EndRangeMismatch, format!("stop {stop}"));
            }
        }
    }
    interval
}
