//! EMBL flat-file reader and writer
//!
//! # Format
//!
//! ```text
//! ID   AB000095; SV 1; linear; mRNA; STD; HUM; 1859 BP.
//! XX
//! AC   AB000095; X12345;
//! XX
//! DE   Homo sapiens mRNA for hepatocyte growth factor.
//! XX
//! FT   source          1..1859
//! XX
//! SQ   Sequence 1859 BP; 609 A; 314 C; 355 G; 581 T; 0 other;
//!      gatcctccat atacaacggt atctccacct caggtttaga tctcaacaac ggaaccattg        60
//! //
//! ```
//!
//! The framing check is the `ID   ` prefix on the first non-blank line; once
//! that matches the reader is committed and a missing `//` terminator becomes
//! a hard error. Feature-table lines (`FH`/`FT`) pass through untouched as
//! raw lines on the record.

use crate::error::{Result, UniseqError};
use crate::formats::{FormatReader, FormatWriter, ReadOutcome, WriteConfig};
use crate::io::LineSource;
use crate::types::{MoleculeType, SeqRecord};
use std::io::Write;

/// Streaming EMBL reader
pub struct EmblReader;

impl EmblReader {
    /// Create a reader
    pub fn new() -> Self {
        EmblReader
    }
}

impl Default for EmblReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatReader for EmblReader {
    fn read_record(&mut self, src: &mut LineSource) -> Result<ReadOutcome> {
        let id_line = match src.read_nonblank_line()? {
            Some(line) => line,
            None => return Ok(ReadOutcome::Eof),
        };

        if !id_line.starts_with("ID   ") {
            return Ok(ReadOutcome::Mismatch);
        }

        let body = id_line[5..].trim();
        let name = body
            .split(|c: char| c == ';' || c.is_whitespace())
            .next()
            .unwrap_or("")
            .to_string();
        if name.is_empty() {
            return Err(UniseqError::InvalidRecord {
                format: "embl",
                line: src.line_number(),
                msg: "ID line carries no entry name".to_string(),
            });
        }
        let molecule = if body.contains("PRT") {
            MoleculeType::Protein
        } else {
            MoleculeType::Nucleotide
        };

        let mut record = SeqRecord::new(name, Vec::new());
        record.molecule = molecule;

        let mut in_sequence = false;
        let mut terminated = false;
        while let Some(line) = src.read_line()? {
            if line.starts_with("//") {
                terminated = true;
                break;
            }
            if in_sequence {
                append_sequence(&mut record.sequence, &line);
                continue;
            }
            if line.starts_with("AC   ") {
                for acc in line[5..].split(';') {
                    let acc = acc.trim();
                    if !acc.is_empty() {
                        record.accessions.push(acc.to_string());
                    }
                }
            } else if line.starts_with("DE   ") {
                let part = line[5..].trim();
                if record.description.is_empty() {
                    record.description = part.to_string();
                } else {
                    record.description.push(' ');
                    record.description.push_str(part);
                }
            } else if line.starts_with("FT   ") || line.starts_with("FH   ") {
                record.features.push(line);
            } else if line.starts_with("SQ   ") || line.starts_with("SQ") && line.trim() == "SQ" {
                in_sequence = true;
            }
            // XX and any other line codes are ignored
        }

        if !terminated {
            return Err(UniseqError::InvalidRecord {
                format: "embl",
                line: src.line_number(),
                msg: "record not terminated by //".to_string(),
            });
        }

        Ok(ReadOutcome::Record(record))
    }
}

/// Strip position numbers and whitespace from one sequence line
fn append_sequence(sequence: &mut Vec<u8>, line: &str) {
    for &b in line.as_bytes() {
        if b.is_ascii_alphabetic() || b == b'-' || b == b'.' || b == b'*' {
            sequence.push(b);
        }
    }
}

/// EMBL writer
pub struct EmblWriter;

impl FormatWriter for EmblWriter {
    fn write_record(
        &mut self,
        record: &SeqRecord,
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()> {
        let seq = record.ranged_sequence();
        let (mol_word, unit) = match record.molecule {
            MoleculeType::Protein => ("PRT", "AA"),
            _ => ("unassigned DNA", "BP"),
        };
        writeln!(
            out,
            "ID   {}; SV 1; linear; {}; STD; UNC; {} {}.",
            record.name,
            mol_word,
            seq.len(),
            unit
        )?;
        writeln!(out, "XX")?;
        if !record.accessions.is_empty() {
            writeln!(out, "AC   {};", record.accessions.join("; "))?;
            writeln!(out, "XX")?;
        }
        if !record.description.is_empty() {
            writeln!(out, "DE   {}", record.description)?;
            writeln!(out, "XX")?;
        }
        if cfg.include_features && !record.features.is_empty() {
            for line in &record.features {
                writeln!(out, "{}", line)?;
            }
            writeln!(out, "XX")?;
        }
        writeln!(out, "SQ   Sequence {} {};", seq.len(), unit)?;
        write_sequence_block(out, seq)?;
        writeln!(out, "//")?;
        Ok(())
    }
}

/// 60 residues per line in blocks of 10, position counter right-aligned
fn write_sequence_block(out: &mut dyn Write, seq: &[u8]) -> Result<()> {
    for (i, line) in seq.chunks(60).enumerate() {
        let mut text = String::with_capacity(80);
        text.push_str("     ");
        for (j, block) in line.chunks(10).enumerate() {
            if j > 0 {
                text.push(' ');
            }
            for &b in block {
                text.push(b.to_ascii_lowercase() as char);
            }
        }
        let position = i * 60 + line.len();
        writeln!(out, "{:<71}{:>9}", text, position)?;
    }
    Ok(())
}
