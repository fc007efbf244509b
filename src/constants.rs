use crate::core::{
    config::{TagRule, ValueKind},
    diagnostic::Code,
    svtype::{SmallVariantType, SvType},
};

pub const DEFAULT_DENSE_WINDOW_BP: u64 = 50;
pub const DEFAULT_DENSE_MAX_RECORDS: usize = 2; // records allowed per window before warning
pub const DEFAULT_AF_DECIMALS: u32 = 6;
pub const DEFAULT_THREADS: usize = 1;

pub const MANDATORY_COLUMNS: [&str; 8] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO",
];
pub const FORMAT_COLUMN: &str = "FORMAT";
pub const REQUIRED_HEADER_TAGS: [&str; 2] = ["fileformat", "reference"];
pub const ASSEMBLED_MOLECULE: &str = "assembled-molecule";
pub const MISSING_VALUE: &str = ".";

pub const VRT_TAG: &str = "VRT";
pub const AF_TAG: &str = "AF";
pub const AC_TAG: &str = "AC";
pub const AN_TAG: &str = "AN";
pub const SVTYPE_TAG: &str = "SVTYPE";
pub const SVLEN_TAG: &str = "SVLEN";
pub const END_TAG: &str = "END";
pub const CIPOS_TAG: &str = "CIPOS";
pub const CIEND_TAG: &str = "CIEND";
pub const POS_RANGE_TAG: &str = "POSrange";
pub const END_RANGE_TAG: &str = "ENDrange";
pub const EVENT_TAG: &str = "EVENT";
pub const COMPOSITE_EVENT_TAG: &str = "CPX_TYPE";

pub const VRT_CODES: [(&str, SmallVariantType); 8] = [
    ("1", SmallVariantType::Snv),
    ("2", SmallVariantType::Div),
    ("3", SmallVariantType::Heterozygous),
    ("4", SmallVariantType::Microsatellite),
    ("5", SmallVariantType::NamedVariant),
    ("6", SmallVariantType::NoVariation),
    ("7", SmallVariantType::Mixed),
    ("8", SmallVariantType::Mnv),
];

// Ordered generic to specific: a later prefix match overwrites an earlier one.
pub const SYMBOLIC_ALT_TABLE: [(&str, SvType); 10] = [
    ("DEL", SvType::DELETION),
    ("DEL:ME", SvType::MOBILE_ELEMENT_DELETION),
    ("DEL:ME:ALU", SvType::ALU_DELETION),
    ("INS", SvType::INSERTION),
    ("INS:ME", SvType::MOBILE_ELEMENT_INSERTION),
    ("INS:ME:ALU", SvType::ALU_INSERTION),
    ("DUP", SvType::DUPLICATION),
    ("DUP:TANDEM", SvType::TANDEM_DUPLICATION),
    ("INV", SvType::INVERSION),
    ("CNV", SvType::COPY_NUMBER_VARIATION),
];

pub const SVTYPE_TABLE: [(&str, SvType); 8] = [
    ("DEL", SvType::DELETION),
    ("INS", SvType::INSERTION),
    ("DUP", SvType::DUPLICATION),
    ("INV", SvType::INVERSION),
    ("CNV", SvType::COPY_NUMBER_VARIATION),
    ("DUP:TANDEM", SvType::TANDEM_DUPLICATION),
    ("INS:ME", SvType::MOBILE_ELEMENT_INSERTION),
    ("DEL:ME", SvType::MOBILE_ELEMENT_DELETION),
];

const INTEGER: &str = r"^\d+$";
const SIGNED_INTEGER: &str = r"^-?\d+$";
const FLOAT: &str = r"^(\d+(\.\d*)?|\.\d+)([eE][-+]?\d+)?$";
const TOKEN: &str = r"^[^\s;=]+$";
const OFFSET_PAIR: &str = r"^(-?\d+|\.),([-+]?\d+|\.)$";
const COORDINATE_PAIR: &str = r"^(\d+|\.),(\d+|\.)$";
const SAMPLE_INTEGER: &str = r"^(\.|\d+)$";

pub const SNP_INFO_TAGS: [TagRule; 5] = [
    TagRule::new(VRT_TAG, ValueKind::Text, TOKEN, Code::InvalidInfoValue),
    TagRule::new(AC_TAG, ValueKind::Integer, INTEGER, Code::InvalidAlleleCount),
    TagRule::new(AN_TAG, ValueKind::Integer, INTEGER, Code::InvalidAlleleCount),
    TagRule::new(AF_TAG, ValueKind::Float, FLOAT, Code::InvalidInfoValue),
    TagRule::new("DP", ValueKind::Integer, INTEGER, Code::InvalidInfoValue),
];

pub const SV_INFO_TAGS: [TagRule; 16] = [
    TagRule::new(SVTYPE_TAG, ValueKind::Text, r"^[A-Za-z0-9:_]+$", Code::InvalidInfoValue),
    TagRule::new(SVLEN_TAG, ValueKind::Integer, SIGNED_INTEGER, Code::InvalidInfoValue),
    TagRule::new(END_TAG, ValueKind::Integer, INTEGER, Code::InvalidInfoValue),
    TagRule::new(CIPOS_TAG, ValueKind::Pair, OFFSET_PAIR, Code::InvalidConfidenceInterval),
    TagRule::new(CIEND_TAG, ValueKind::Pair, OFFSET_PAIR, Code::InvalidConfidenceInterval),
    TagRule::new(POS_RANGE_TAG, ValueKind::Pair, COORDINATE_PAIR, Code::InvalidInfoValue),
    TagRule::new(END_RANGE_TAG, ValueKind::Pair, COORDINATE_PAIR, Code::InvalidInfoValue),
    TagRule::new(COMPOSITE_EVENT_TAG, ValueKind::Text, TOKEN, Code::InvalidInfoValue),
    TagRule::new(EVENT_TAG, ValueKind::Text, TOKEN, Code::InvalidInfoValue),
    TagRule::new("MATEID", ValueKind::Text, TOKEN, Code::InvalidInfoValue),
    TagRule::new("MEINFO", ValueKind::Text, TOKEN, Code::InvalidInfoValue),
    TagRule::new("IMPRECISE", ValueKind::Flag, "", Code::InvalidInfoValue),
    TagRule::new("CN", ValueKind::Integer, INTEGER, Code::InvalidInfoValue),
    TagRule::new(AC_TAG, ValueKind::Integer, INTEGER, Code::InvalidAlleleCount),
    TagRule::new(AN_TAG, ValueKind::Integer, INTEGER, Code::InvalidAlleleCount),
    TagRule::new(AF_TAG, ValueKind::Float, FLOAT, Code::InvalidInfoValue),
];

pub const FORMAT_TAGS: [TagRule; 6] = [
    TagRule::new("GT", ValueKind::Text, r"^(\.|\d+)([/|](\.|\d+))*$", Code::InvalidFormatValue),
    TagRule::new("GQ", ValueKind::Text, SAMPLE_INTEGER, Code::InvalidFormatValue),
    TagRule::new("DP", ValueKind::Text, SAMPLE_INTEGER, Code::InvalidFormatValue),
    TagRule::new("AD", ValueKind::Text, r"^(\.|\d+)(,(\.|\d+))*$", Code::InvalidFormatValue),
    TagRule::new("CN", ValueKind::Text, SAMPLE_INTEGER, Code::InvalidFormatValue),
    TagRule::new("FT", ValueKind::Text, TOKEN, Code::InvalidFormatValue),
];
