//! GenBank flat-file reader and writer
//!
//! # Format
//!
//! ```text
//! LOCUS       AB000095                1859 bp    mRNA    linear   PRI
//! DEFINITION  Homo sapiens mRNA for hepatocyte growth factor.
//! ACCESSION   AB000095 X12345
//! FEATURES             Location/Qualifiers
//!      source          1..1859
//! ORIGIN
//!         1 gatcctccat atacaacggt atctccacct caggtttaga tctcaacaac ggaaccattg
//! //
//! ```
//!
//! Framing check: `LOCUS` on the first non-blank line. Continuation lines of
//! `DEFINITION` (leading whitespace) are folded into the description; the
//! `FEATURES` block passes through as raw lines.

use crate::error::{Result, UniseqError};
use crate::formats::{FormatReader, FormatWriter, ReadOutcome, WriteConfig};
use crate::io::LineSource;
use crate::types::{MoleculeType, SeqRecord};
use std::io::Write;

/// Streaming GenBank reader
pub struct GenbankReader;

impl GenbankReader {
    /// Create a reader
    pub fn new() -> Self {
        GenbankReader
    }
}

impl Default for GenbankReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Which multi-line section the reader is inside
enum Section {
    None,
    Definition,
    Features,
    Origin,
}

impl FormatReader for GenbankReader {
    fn read_record(&mut self, src: &mut LineSource) -> Result<ReadOutcome> {
        let locus = match src.read_nonblank_line()? {
            Some(line) => line,
            None => return Ok(ReadOutcome::Eof),
        };

        if !locus.starts_with("LOCUS") {
            return Ok(ReadOutcome::Mismatch);
        }

        let mut tokens = locus.split_whitespace().skip(1);
        let name = match tokens.next() {
            Some(t) => t.to_string(),
            None => {
                return Err(UniseqError::InvalidRecord {
                    format: "genbank",
                    line: src.line_number(),
                    msg: "LOCUS line carries no entry name".to_string(),
                })
            }
        };
        let rest: Vec<&str> = tokens.collect();
        let molecule = if rest.iter().any(|t| t.eq_ignore_ascii_case("aa")) {
            MoleculeType::Protein
        } else {
            MoleculeType::Nucleotide
        };

        let mut record = SeqRecord::new(name, Vec::new());
        record.molecule = molecule;

        let mut section = Section::None;
        let mut terminated = false;
        while let Some(line) = src.read_line()? {
            if line.starts_with("//") {
                terminated = true;
                break;
            }

            // Continuation lines start with whitespace and belong to the
            // section opened by the last keyword line
            if line.starts_with(char::is_whitespace) {
                match section {
                    Section::Definition => {
                        record.description.push(' ');
                        record.description.push_str(line.trim());
                    }
                    Section::Features => record.features.push(line),
                    Section::Origin => {
                        for &b in line.as_bytes() {
                            if b.is_ascii_alphabetic() || b == b'-' {
                                record.sequence.push(b);
                            }
                        }
                    }
                    Section::None => {}
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("DEFINITION") {
                record.description = rest.trim().to_string();
                section = Section::Definition;
            } else if let Some(rest) = line.strip_prefix("ACCESSION") {
                for acc in rest.split_whitespace() {
                    record.accessions.push(acc.to_string());
                }
                section = Section::None;
            } else if line.starts_with("FEATURES") {
                section = Section::Features;
            } else if line.starts_with("ORIGIN") {
                section = Section::Origin;
            } else {
                // VERSION, SOURCE, REFERENCE and friends
                section = Section::None;
            }
        }

        if !terminated {
            return Err(UniseqError::InvalidRecord {
                format: "genbank",
                line: src.line_number(),
                msg: "record not terminated by //".to_string(),
            });
        }

        Ok(ReadOutcome::Record(record))
    }
}

/// GenBank writer
pub struct GenbankWriter;

impl FormatWriter for GenbankWriter {
    fn write_record(
        &mut self,
        record: &SeqRecord,
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()> {
        let seq = record.ranged_sequence();
        let unit = match record.molecule {
            MoleculeType::Protein => "aa",
            _ => "bp",
        };
        writeln!(
            out,
            "LOCUS       {:<16} {} {}    linear   UNC",
            record.name,
            seq.len(),
            unit
        )?;
        if !record.description.is_empty() {
            writeln!(out, "DEFINITION  {}", record.description)?;
        }
        if !record.accessions.is_empty() {
            writeln!(out, "ACCESSION   {}", record.accessions.join(" "))?;
        }
        if cfg.include_features && !record.features.is_empty() {
            writeln!(out, "FEATURES             Location/Qualifiers")?;
            for line in &record.features {
                writeln!(out, "{}", line)?;
            }
        }
        writeln!(out, "ORIGIN")?;
        for (i, line) in seq.chunks(60).enumerate() {
            write!(out, "{:>9}", i * 60 + 1)?;
            for block in line.chunks(10) {
                write!(out, " ")?;
                for &b in block {
                    write!(out, "{}", b.to_ascii_lowercase() as char)?;
                }
            }
            writeln!(out)?;
        }
        writeln!(out, "//")?;
        Ok(())
    }
}
