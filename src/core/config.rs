//! Immutable validation configuration.
//!
//! The lookup tables and INFO/FORMAT allow-lists are copied out of
//! [`crate::constants`] and their value patterns compiled once, so a
//! validation pass only ever reads from a `&ValidatorConfig`.

use crate::{
    constants::*,
    core::{
        diagnostic::Code,
        svtype::{SmallVariantType, SvType},
    },
    utils::util::Result,
};
use clap::ValueEnum;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Small variants, emitted as annotated VCF lines
    Snp,
    /// Structural variants, emitted as structured calls
    Sv,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Snp => write!(f, "snp"),
            Mode::Sv => write!(f, "sv"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Flag,
    Integer,
    Float,
    Text,
    /// Two comma-separated values, either of which may be `.`
    Pair,
}

#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub id: &'static str,
    pub kind: ValueKind,
    pub pattern: &'static str,
    /// Raised when a value does not match `pattern`.
    pub invalid: Code,
}

impl TagRule {
    pub const fn new(id: &'static str, kind: ValueKind, pattern: &'static str, invalid: Code) -> Self {
        Self {
            id,
            kind,
            pattern,
            invalid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledTagRule {
    pub rule: TagRule,
    regex: Option<Regex>,
}

impl CompiledTagRule {
    fn compile(rule: TagRule) -> Result<Self> {
        let regex = if rule.pattern.is_empty() {
            None
        } else {
            Some(Regex::new(rule.pattern).map_err(|e| {
                crate::jvcf_error!("Invalid value pattern for tag {}: {e}", rule.id)
            })?)
        };
        Ok(Self { rule, regex })
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.as_ref().map_or(true, |regex| regex.is_match(value))
    }
}

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub mode: Mode,
    pub vrt_codes: Vec<(String, SmallVariantType)>,
    pub symbolic_alt_table: Vec<(String, SvType)>,
    pub svtype_table: Vec<(String, SvType)>,
    pub composite_event_tag: String,
    pub info_rules: IndexMap<String, CompiledTagRule>,
    pub format_rules: IndexMap<String, CompiledTagRule>,
    pub dense_window_bp: u64,
    pub dense_max_records: usize,
    pub af_decimals: u32,
}

fn compile_rules(rules: &[TagRule]) -> Result<IndexMap<String, CompiledTagRule>> {
    rules
        .iter()
        .map(|rule| Ok((rule.id.to_string(), CompiledTagRule::compile(*rule)?)))
        .collect()
}

fn owned_table<T: Copy>(table: &[(&str, T)]) -> Vec<(String, T)> {
    table
        .iter()
        .map(|(code, value)| (code.to_string(), *value))
        .collect()
}

impl ValidatorConfig {
    pub fn for_mode(mode: Mode) -> Result<Self> {
        let info_rules = match mode {
            Mode::Snp => compile_rules(&SNP_INFO_TAGS)?,
            Mode::Sv => compile_rules(&SV_INFO_TAGS)?,
        };
        Ok(Self {
            mode,
            vrt_codes: owned_table(&VRT_CODES),
            symbolic_alt_table: owned_table(&SYMBOLIC_ALT_TABLE),
            svtype_table: owned_table(&SVTYPE_TABLE),
            composite_event_tag: COMPOSITE_EVENT_TAG.to_string(),
            info_rules,
            format_rules: compile_rules(&FORMAT_TAGS)?,
            dense_window_bp: DEFAULT_DENSE_WINDOW_BP,
            dense_max_records: DEFAULT_DENSE_MAX_RECORDS,
            af_decimals: DEFAULT_AF_DECIMALS,
        })
    }

    pub fn snp() -> Result<Self> {
        Self::for_mode(Mode::Snp)
    }

    pub fn sv() -> Result<Self> {
        Self::for_mode(Mode::Sv)
    }

    pub fn with(mut self, updates: impl FnOnce(&mut Self)) -> Self {
        updates(&mut self);
        self
    }

    pub fn vrt_type(&self, code: &str) -> Option<SmallVariantType> {
        self.vrt_codes
            .iter()
            .find(|(vrt, _)| vrt == code)
            .map(|(_, small_type)| *small_type)
    }

    pub fn svtype(&self, code: &str) -> Option<SvType> {
        self.svtype_table
            .iter()
            .find(|(svtype, _)| svtype == code)
            .map(|(_, svtype)| *svtype)
    }
}
