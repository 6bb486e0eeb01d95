//! FASTA reader and writer
//!
//! # Format
//!
//! ```text
//! >sequence1 optional description
//! GATTACAGATTACA
//! TGCATGCA
//! >sp|P12345|HBA_HUMAN Hemoglobin subunit alpha
//! MVLSPADKTNVKAAW
//! ```
//!
//! NCBI-style pipe headers (`db|accession|name`) are recognised and the
//! accession is extracted; any other header keeps the first whitespace token
//! as the name and the remainder as the description.

use crate::error::{Result, UniseqError};
use crate::formats::{FormatReader, FormatWriter, ReadOutcome, WriteConfig};
use crate::io::LineSource;
use crate::types::{MoleculeType, SeqRecord};
use std::io::Write;

/// Streaming FASTA reader
///
/// The framing check is the leading `>`; anything else is a mismatch and the
/// stream is left for the next format to try. Sequence lines accumulate until
/// the next `>` header, which is pushed back for the following call.
pub struct FastaReader;

impl FastaReader {
    /// Create a reader
    pub fn new() -> Self {
        FastaReader
    }
}

impl Default for FastaReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatReader for FastaReader {
    fn read_record(&mut self, src: &mut LineSource) -> Result<ReadOutcome> {
        let header = match src.read_nonblank_line()? {
            Some(line) => line,
            None => return Ok(ReadOutcome::Eof),
        };

        let header = header.trim_end();
        if !header.starts_with('>') {
            return Ok(ReadOutcome::Mismatch);
        }

        let (name, accession, description) = parse_header(&header[1..]);

        let mut sequence = Vec::new();
        while let Some(raw) = src.read_line()? {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('>') {
                // Next record: hand the header back for the following call
                src.unread_line(raw);
                break;
            }
            for &b in line.as_bytes() {
                match b {
                    b if b.is_ascii_alphabetic() => sequence.push(b),
                    b'-' | b'.' | b'*' => sequence.push(b),
                    b if b.is_ascii_digit() || b == b' ' || b == b'\t' => {}
                    _ => {
                        return Err(UniseqError::InvalidRecord {
                            format: "fasta",
                            line: src.line_number(),
                            msg: format!("unexpected byte 0x{:02x} in sequence", b),
                        })
                    }
                }
            }
        }

        let mut record = SeqRecord::new(name, sequence);
        record.molecule = MoleculeType::guess(&record.sequence);
        if let Some(acc) = accession {
            record.accessions.push(acc);
        }
        record.description = description;
        Ok(ReadOutcome::Record(record))
    }
}

/// Split a FASTA header (without the `>`) into name, accession, description
fn parse_header(header: &str) -> (String, Option<String>, String) {
    let mut parts = header.trim().splitn(2, char::is_whitespace);
    let id_token = parts.next().unwrap_or("");
    let description = parts.next().unwrap_or("").trim().to_string();

    // NCBI-style db|acc|name identifiers
    if id_token.contains('|') {
        let fields: Vec<&str> = id_token.split('|').collect();
        if fields.len() >= 3 && !fields[2].is_empty() {
            let acc = (!fields[1].is_empty()).then(|| fields[1].to_string());
            return (fields[2].to_string(), acc, description);
        }
        if fields.len() == 2 && !fields[1].is_empty() {
            return (fields[1].to_string(), None, description);
        }
    }
    (id_token.to_string(), None, description)
}

/// FASTA writer
pub struct FastaWriter;

impl FormatWriter for FastaWriter {
    fn write_record(
        &mut self,
        record: &SeqRecord,
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()> {
        if record.description.is_empty() {
            writeln!(out, ">{}", record.name)?;
        } else {
            writeln!(out, ">{} {}", record.name, record.description)?;
        }
        let width = cfg.line_width.max(1);
        let seq = record.ranged_sequence();
        for chunk in seq.chunks(width) {
            out.write_all(chunk)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
