use super::readers::open_text_reader;
use crate::{
    core::reference::{AssemblyRecord, SequenceRecord},
    utils::util::Result,
};
use std::{collections::HashMap, io::BufRead, path::Path};

const NOT_AVAILABLE: &str = "na";

fn split_columns<'a>(line: &'a str, expected: usize, layout: &str) -> Result<Vec<&'a str>> {
    let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
    if columns.len() < expected {
        return Err(crate::jvcf_error!(
            "Expected {} fields in the format '{}', found {}: {}",
            expected,
            layout,
            columns.len(),
            line
        ));
    }
    Ok(columns)
}

fn available(value: &str) -> String {
    if value.eq_ignore_ascii_case(NOT_AVAILABLE) {
        String::new()
    } else {
        value.to_string()
    }
}

fn data_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let reader = open_text_reader(path)?;
    let mut lines = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            crate::jvcf_error!(
                "Error at {} line {}: {}",
                path.display(),
                line_number + 1,
                e
            )
        })?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        lines.push((line_number + 1, line));
    }
    Ok(lines)
}

pub fn line_to_assembly(line: &str) -> Result<AssemblyRecord> {
    const LAYOUT: &str = "accession db_name ucsc_name refseq genbank";
    let columns = split_columns(line, 5, LAYOUT)?;
    Ok(AssemblyRecord {
        accession: available(columns[0]),
        db_name: available(columns[1]),
        ucsc_name: available(columns[2]),
        refseq: available(columns[3]),
        genbank: available(columns[4]),
    })
}

pub fn line_to_sequence(line: &str) -> Result<SequenceRecord> {
    const LAYOUT: &str = "assembly name ucsc_name refseq genbank role length";
    let columns = split_columns(line, 7, LAYOUT)?;
    let length = match available(columns[6]).as_str() {
        "" => None,
        length => Some(
            length
                .parse::<u64>()
                .map_err(|e| crate::jvcf_error!("Invalid sequence length '{}': {}", length, e))?,
        ),
    };
    Ok(SequenceRecord {
        assembly: available(columns[0]),
        name: available(columns[1]),
        ucsc_name: available(columns[2]),
        refseq: available(columns[3]),
        genbank: available(columns[4]),
        role: available(columns[5]),
        length,
    })
}

pub fn read_assembly_report(path: &Path) -> Result<Vec<AssemblyRecord>> {
    let mut assemblies = Vec::new();
    for (line_number, line) in data_lines(path)? {
        let assembly = line_to_assembly(&line).map_err(|e| {
            crate::jvcf_error!("Error at assembly report line {}: {}", line_number, e)
        })?;
        assemblies.push(assembly);
    }
    log::debug!(
        "Loaded {} assemblies from {}",
        assemblies.len(),
        path.display()
    );
    Ok(assemblies)
}

pub fn read_sequence_report(path: &Path) -> Result<Vec<SequenceRecord>> {
    let mut sequences = Vec::new();
    for (line_number, line) in data_lines(path)? {
        let sequence = line_to_sequence(&line).map_err(|e| {
            crate::jvcf_error!("Error at sequence report line {}: {}", line_number, e)
        })?;
        sequences.push(sequence);
    }
    log::debug!(
        "Loaded {} sequences from {}",
        sequences.len(),
        path.display()
    );
    Ok(sequences)
}

/// Sequence lengths from a FASTA index (`name length offset ...`).
pub fn read_fai_lengths(path: &Path) -> Result<HashMap<String, u64>> {
    let mut lengths = HashMap::new();
    for (line_number, line) in data_lines(path)? {
        let columns = split_columns(&line, 2, "name length").map_err(|e| {
            crate::jvcf_error!("Error at index line {}: {}", line_number, e)
        })?;
        let length: u64 = columns[1].parse().map_err(|e| {
            crate::jvcf_error!("Error at index line {}: invalid length: {}", line_number, e)
        })?;
        lengths.insert(columns[0].to_string(), length);
    }
    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_assembly_report() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "# accession\tdb_name\tucsc_name\trefseq\tgenbank")?;
        writeln!(
            temp_file,
            "GCF_000001405.40\tGRCh38\thg38\tGCF_000001405.40\tGCA_000001405.29"
        )?;
        writeln!(temp_file)?;
        writeln!(temp_file, "GCA_000002315.5\tGRCg6a\tna\tna\tGCA_000002315.5")?;
        temp_file.flush()?;

        let assemblies = read_assembly_report(temp_file.path())?;
        assert_eq!(assemblies.len(), 2);
        assert_eq!(assemblies[0].db_name, "GRCh38");
        assert_eq!(assemblies[0].canonical_accession(), "GCF_000001405.40");
        assert_eq!(assemblies[1].ucsc_name, "");
        assert_eq!(assemblies[1].canonical_accession(), "GCA_000002315.5");
        Ok(())
    }

    #[test]
    fn test_read_sequence_report() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            "GCF_000001405.40\t1\tchr1\tNC_000001.11\tCM000663.2\tassembled-molecule\t248956422"
        )?;
        writeln!(
            temp_file,
            "GCF_000001405.40\tMT\tchrM\tNC_012920.1\tJ01415.2\tassembled-molecule\tna"
        )?;
        temp_file.flush()?;

        let sequences = read_sequence_report(temp_file.path())?;
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].refseq, "NC_000001.11");
        assert_eq!(sequences[0].length, Some(248956422));
        assert_eq!(sequences[1].length, None);
        Ok(())
    }

    #[test]
    fn test_short_sequence_line_reports_line_number() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "# header")?;
        writeln!(temp_file, "GCF_000001405.40\t1\tchr1")?;
        temp_file.flush()?;

        let err = read_sequence_report(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
        Ok(())
    }

    #[test]
    fn test_read_fai_lengths() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "contig_7\t5000\t9\t60\t61")?;
        writeln!(temp_file, "contig_8\t120\t5100\t60\t61")?;
        temp_file.flush()?;

        let lengths = read_fai_lengths(temp_file.path())?;
        assert_eq!(lengths.get("contig_7"), Some(&5000));
        assert_eq!(lengths.get("contig_8"), Some(&120));

        let mut bad = NamedTempFile::new()?;
        writeln!(bad, "contig_9\tlong")?;
        bad.flush()?;
        assert!(read_fai_lengths(bad.path()).is_err());
        Ok(())
    }
}
