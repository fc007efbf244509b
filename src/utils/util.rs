use crate::error::JvcfResult;
use log;
use std::{fmt::Display, sync::Once};

pub type Result<T> = JvcfResult<T>;

#[allow(unused)]
static INIT_LOG: Once = Once::new();

#[allow(unused)]
pub fn init_logger() {
    INIT_LOG.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Trace)
            .is_test(true)
            .init();
    });
}

pub fn handle_error_and_exit(err: impl Display) -> ! {
    log::error!("{err}");
    std::process::exit(1);
}

/// Returns `(trimmed, changed)` so callers can log the correction.
pub fn trim_field(field: &str) -> (&str, bool) {
    let trimmed = field.trim();
    (trimmed, trimmed.len() != field.len())
}

/// Formats `numerator / denominator` floored to `decimals` places without trailing zeros.
///
/// Integer arithmetic keeps the floor exact, so 1/3 at 6 places is `0.333333`
/// and never rounds up.
pub fn floor_ratio(numerator: u64, denominator: u64, decimals: u32) -> Option<String> {
    if denominator == 0 {
        return None;
    }
    let scale = 10u128.pow(decimals);
    let scaled = u128::from(numerator) * scale / u128::from(denominator);
    let whole = scaled / scale;
    let fraction = scaled % scale;
    if fraction == 0 {
        return Some(whole.to_string());
    }
    let digits = format!("{:0width$}", fraction, width = decimals as usize);
    Some(format!("{whole}.{}", digits.trim_end_matches('0')))
}

pub fn is_nucleotides(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
}
