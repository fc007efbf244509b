//! State carried from one record to the next during a validation pass.

use super::diagnostic::{Code, Findings};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey {
    pub chromosome: String,
    pub pos: u64,
    pub reference: String,
    pub alt: String,
    pub variant_type: String,
}

#[derive(Debug, Clone)]
struct DenseWindow {
    chromosome: String,
    start: u64,
    count: usize,
}

#[derive(Debug, Default)]
pub struct ScanState {
    previous_chromosome: Option<String>,
    previous_pos: Option<u64>,
    finished_chromosomes: HashSet<String>,
    seen_ids: HashSet<String>,
    seen_sites: HashSet<SiteKey>,
    window: Option<DenseWindow>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorting within a chromosome and grouping of chromosomes.
    ///
    /// Grouping is only tested when the chromosome changes: the chromosome
    /// being left is marked finished and the new one must not be finished.
    pub fn check_order(&mut self, chromosome: &str, pos: Option<u64>, findings: &mut Findings) {
        if self.previous_chromosome.as_deref() != Some(chromosome) {
            if let Some(previous) = self.previous_chromosome.take() {
                self.finished_chromosomes.insert(previous);
            }
            if self.finished_chromosomes.contains(chromosome) {
                findings.push_detail(Code::ChromosomesNotGrouped, chromosome);
            }
            self.previous_chromosome = Some(chromosome.to_string());
            self.previous_pos = None;
        }

        if let Some(pos) = pos {
            if let Some(previous) = self.previous_pos {
                if pos < previous {
                    findings.push_detail(Code::NotSorted, format!("{pos} < {previous}"));
                }
            }
            self.previous_pos = Some(pos);
        }
    }

    pub fn check_id(&mut self, id: &str, findings: &mut Findings) {
        if !self.seen_ids.insert(id.to_string()) {
            findings.push_detail(Code::DuplicatedId, id);
        }
    }

    pub fn check_site(&mut self, site: SiteKey, findings: &mut Findings) {
        if self.seen_sites.contains(&site) {
            findings.push_detail(
                Code::DuplicatedSite,
                format!("{}:{} {}>{}", site.chromosome, site.pos, site.reference, site.alt),
            );
        } else {
            self.seen_sites.insert(site);
        }
    }

    /// Counts records starting within `window_bp` of the first record of the
    /// current window and warns once the count exceeds `max_records`.
    pub fn check_density(
        &mut self,
        chromosome: &str,
        pos: u64,
        window_bp: u64,
        max_records: usize,
        findings: &mut Findings,
    ) {
        let count = match &mut self.window {
            Some(window)
                if window.chromosome == chromosome
                    && pos >= window.start
                    && pos - window.start <= window_bp =>
            {
                window.count += 1;
                window.count
            }
            _ => {
                self.window = Some(DenseWindow {
                    chromosome: chromosome.to_string(),
                    start: pos,
                    count: 1,
                });
                1
            }
        };
        if count > max_records {
            findings.push_detail(Code::DenseSnps, format!("{count} within {window_bp} bp"));
        }
    }
}
