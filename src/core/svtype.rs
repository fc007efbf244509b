use serde::{Serialize, Serializer};

/// Structural variant categories reported in SV mode.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum SvType {
    DELETION,
    INSERTION,
    DUPLICATION,
    TANDEM_DUPLICATION,
    INVERSION,
    COPY_NUMBER_VARIATION,
    MOBILE_ELEMENT_INSERTION,
    ALU_INSERTION,
    MOBILE_ELEMENT_DELETION,
    ALU_DELETION,
    SEQUENCE_ALTERATION,
    INTRACHROMOSOMAL_TRANSLOCATION,
    INTERCHROMOSOMAL_TRANSLOCATION,
}

impl SvType {
    pub fn label(&self) -> &'static str {
        match self {
            SvType::DELETION => "deletion",
            SvType::INSERTION => "insertion",
            SvType::DUPLICATION => "duplication",
            SvType::TANDEM_DUPLICATION => "tandem duplication",
            SvType::INVERSION => "inversion",
            SvType::COPY_NUMBER_VARIATION => "copy number variation",
            SvType::MOBILE_ELEMENT_INSERTION => "mobile element insertion",
            SvType::ALU_INSERTION => "alu insertion",
            SvType::MOBILE_ELEMENT_DELETION => "mobile element deletion",
            SvType::ALU_DELETION => "alu deletion",
            SvType::SEQUENCE_ALTERATION => "sequence alteration",
            SvType::INTRACHROMOSOMAL_TRANSLOCATION => "intrachromosomal translocation",
            SvType::INTERCHROMOSOMAL_TRANSLOCATION => "interchromosomal translocation",
        }
    }

    /// Stop is derived from the REF length when END is absent.
    pub fn is_insertion_like(&self) -> bool {
        matches!(
            self,
            SvType::INSERTION | SvType::MOBILE_ELEMENT_INSERTION | SvType::ALU_INSERTION
        )
    }

    /// Stop is derived from |SVLEN| when END is absent.
    pub fn is_length_based(&self) -> bool {
        matches!(
            self,
            SvType::DELETION
                | SvType::DUPLICATION
                | SvType::TANDEM_DUPLICATION
                | SvType::INVERSION
                | SvType::COPY_NUMBER_VARIATION
                | SvType::MOBILE_ELEMENT_DELETION
                | SvType::ALU_DELETION
        )
    }
}

impl std::fmt::Display for SvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SvType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Small-variant subtypes keyed by their VRT code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum SmallVariantType {
    Snv,
    Div,
    Heterozygous,
    Microsatellite,
    NamedVariant,
    NoVariation,
    Mixed,
    Mnv,
}

impl SmallVariantType {
    pub fn vrt_code(&self) -> u8 {
        match self {
            SmallVariantType::Snv => 1,
            SmallVariantType::Div => 2,
            SmallVariantType::Heterozygous => 3,
            SmallVariantType::Microsatellite => 4,
            SmallVariantType::NamedVariant => 5,
            SmallVariantType::NoVariation => 6,
            SmallVariantType::Mixed => 7,
            SmallVariantType::Mnv => 8,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SmallVariantType::Snv => "SNV",
            SmallVariantType::Div => "DIV",
            SmallVariantType::Heterozygous => "heterozygous",
            SmallVariantType::Microsatellite => "microsatellite",
            SmallVariantType::NamedVariant => "named variant",
            SmallVariantType::NoVariation => "no variation",
            SmallVariantType::Mixed => "mixed",
            SmallVariantType::Mnv => "MNV",
        }
    }
}

impl std::fmt::Display for SmallVariantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
