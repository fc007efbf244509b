//! Breakend ALT notation (`t[p[`, `t]p]`, `]p]t`, `[p[t`).

use crate::utils::util::is_nucleotides;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl Serialize for Strand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnchorSide {
    /// `t[p[` and `t]p]`
    Leading,
    /// `]p]t` and `[p[t`
    Trailing,
}

#[derive(Debug, Clone, Copy)]
struct BreakendForm {
    anchor: AnchorSide,
    strands: [Strand; 2],
}

static FORMS: Lazy<[(BreakendForm, Regex); 4]> = Lazy::new(|| {
    use AnchorSide::{Leading, Trailing};
    use Strand::{Forward, Reverse};
    let form = |anchor, from, to, pattern: &str| {
        (
            BreakendForm {
                anchor,
                strands: [from, to],
            },
            Regex::new(pattern).unwrap(),
        )
    };
    [
        form(Leading, Forward, Forward, r"^(?P<t>[ACGTNacgtn]+|\.)\[(?P<chrom>[^\[\]]+):(?P<pos>\d+)\[$"),
        form(Leading, Reverse, Forward, r"^(?P<t>[ACGTNacgtn]+|\.)\](?P<chrom>[^\[\]]+):(?P<pos>\d+)\]$"),
        form(Trailing, Reverse, Reverse, r"^\](?P<chrom>[^\[\]]+):(?P<pos>\d+)\](?P<t>[ACGTNacgtn]+|\.)$"),
        form(Trailing, Forward, Reverse, r"^\[(?P<chrom>[^\[\]]+):(?P<pos>\d+)\[(?P<t>[ACGTNacgtn]+|\.)$"),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakend {
    pub from_chromosome: String,
    pub from_coordinate: u64,
    pub from_strand: Strand,
    pub to_chromosome: String,
    pub to_coordinate: u64,
    pub to_strand: Strand,
    pub inserted_sequence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

pub fn is_breakend_alt(alt: &str) -> bool {
    alt.contains('[') || alt.contains(']')
}

/// Splits the anchor `t` into the inserted sequence, or `None` when `t` does
/// not carry REF on the side the form requires.
fn inserted_sequence(anchor: &str, side: AnchorSide, pos: u64, reference: &str) -> Option<String> {
    if pos == 0 {
        return (anchor == ".").then(String::new);
    }
    if !is_nucleotides(anchor) || anchor.len() < reference.len() {
        return None;
    }
    let anchor_upper = anchor.to_ascii_uppercase();
    let reference_upper = reference.to_ascii_uppercase();
    match side {
        AnchorSide::Leading => anchor_upper
            .strip_prefix(&reference_upper)
            .map(str::to_string),
        AnchorSide::Trailing => anchor_upper
            .strip_suffix(&reference_upper)
            .map(str::to_string),
    }
}

/// Parses a bracketed ALT at `chromosome:pos`. `None` means the ALT matches
/// none of the four forms or its anchor disagrees with REF.
pub fn parse_breakend(
    chromosome: &str,
    pos: u64,
    reference: &str,
    alt: &str,
    event_id: Option<&str>,
) -> Option<Breakend> {
    FORMS.iter().find_map(|(form, regex)| {
        let captures = regex.captures(alt)?;
        let to_coordinate = captures["pos"].parse::<u64>().ok()?;
        let inserted_sequence = inserted_sequence(&captures["t"], form.anchor, pos, reference)?;
        Some(Breakend {
            from_chromosome: chromosome.to_string(),
            from_coordinate: pos,
            from_strand: form.strands[0],
            to_chromosome: captures["chrom"].to_string(),
            to_coordinate,
            to_strand: form.strands[1],
            inserted_sequence,
            event_id: event_id.map(str::to_string),
        })
    })
}
