//! PHYLIP alignment reader and writer
//!
//! # Format
//!
//! ```text
//!  3 20
//! human     ACGTACGTAC GTACGTACGT
//! chimp     ACGTACGTAC GTACGTACGA
//! mouse     ACGAACGTAC GTACGTACGT
//! ```
//!
//! The header is the sequence count and alignment length; names occupy the
//! first ten columns (shorter whitespace-delimited names are also accepted).
//! Interleaved continuation blocks append residues to the sequences in
//! order until every sequence reaches the declared length.
//!
//! PHYLIP is the engine's exercise for two special paths:
//! - **input**: the whole alignment is one table, so the reader parses it on
//!   the first call, keeps the table as resume state, and hands out one
//!   record per subsequent call;
//! - **output**: the writer is a batch format, the column layout needs every
//!   record before the first byte is emitted.

use crate::error::{Result, UniseqError};
use crate::formats::{FormatReader, FormatWriter, ReadOutcome, WriteConfig};
use crate::io::LineSource;
use crate::types::{MoleculeType, SeqRecord};
use std::collections::VecDeque;
use std::io::Write;

/// PHYLIP alignment reader with a parsed-table resume state
pub struct PhylipReader {
    /// `Some` after the alignment table has been parsed; records are handed
    /// out from the front until the table is empty
    pending: Option<VecDeque<SeqRecord>>,
}

impl PhylipReader {
    /// Create a reader
    pub fn new() -> Self {
        Self { pending: None }
    }
}

impl Default for PhylipReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatReader for PhylipReader {
    fn read_record(&mut self, src: &mut LineSource) -> Result<ReadOutcome> {
        if let Some(pending) = &mut self.pending {
            return Ok(match pending.pop_front() {
                Some(record) => ReadOutcome::Record(record),
                None => ReadOutcome::Eof,
            });
        }

        let header = match src.read_nonblank_line()? {
            Some(line) => line,
            None => return Ok(ReadOutcome::Eof),
        };

        let mut fields = header.split_whitespace();
        let count: usize = match fields.next().and_then(|t| t.parse().ok()) {
            Some(n) if n > 0 => n,
            _ => return Ok(ReadOutcome::Mismatch),
        };
        let length: usize = match fields.next().and_then(|t| t.parse().ok()) {
            Some(n) if n > 0 => n,
            _ => return Ok(ReadOutcome::Mismatch),
        };
        if fields.next().is_some() {
            return Ok(ReadOutcome::Mismatch);
        }

        let table = self.parse_table(src, count, length)?;
        let mut pending: VecDeque<SeqRecord> = table.into();
        let first = pending.pop_front();
        self.pending = Some(pending);
        Ok(match first {
            Some(record) => ReadOutcome::Record(record),
            None => ReadOutcome::Eof,
        })
    }
}

impl PhylipReader {
    /// Parse the full alignment table after a valid header line
    fn parse_table(
        &self,
        src: &mut LineSource,
        count: usize,
        length: usize,
    ) -> Result<Vec<SeqRecord>> {
        let mut records: Vec<SeqRecord> = Vec::with_capacity(count);

        // First block carries the names
        for _ in 0..count {
            let line = match src.read_nonblank_line()? {
                Some(line) => line,
                None => {
                    return Err(UniseqError::InvalidRecord {
                        format: "phylip",
                        line: src.line_number(),
                        msg: format!("expected {} name lines, stream ended early", count),
                    })
                }
            };
            let (name, residues) = split_name_line(&line);
            if name.is_empty() {
                return Err(UniseqError::InvalidRecord {
                    format: "phylip",
                    line: src.line_number(),
                    msg: "alignment row carries no name".to_string(),
                });
            }
            let mut record = SeqRecord::new(name, residues);
            record.sequence.truncate(length);
            records.push(record);
        }

        // Interleaved continuation blocks until every row is full
        let mut row = 0usize;
        while records.iter().any(|r| r.sequence.len() < length) {
            let line = match src.read_nonblank_line()? {
                Some(line) => line,
                None => {
                    return Err(UniseqError::InvalidRecord {
                        format: "phylip",
                        line: src.line_number(),
                        msg: format!(
                            "alignment ended before {} residues per sequence",
                            length
                        ),
                    })
                }
            };
            let record = &mut records[row];
            for &b in line.as_bytes() {
                if b.is_ascii_alphabetic() || b == b'-' || b == b'.' {
                    record.sequence.push(b);
                }
            }
            record.sequence.truncate(length);
            row = (row + 1) % count;
        }

        for record in &mut records {
            record.molecule = MoleculeType::guess(&record.sequence);
        }
        Ok(records)
    }
}

/// Split an alignment row into its name and the residues on the same line.
///
/// Classic PHYLIP reserves columns 1-10 for the name; whitespace-delimited
/// shorter names are accepted too.
fn split_name_line(line: &str) -> (String, Vec<u8>) {
    let (name_part, seq_part) = if line.len() > 10
        && line.is_char_boundary(10)
        && !line.as_bytes()[..10].contains(&b' ')
    {
        line.split_at(10)
    } else {
        match line.find(char::is_whitespace) {
            Some(pos) => line.split_at(pos),
            None => (line, ""),
        }
    };
    let mut residues = Vec::new();
    for &b in seq_part.as_bytes() {
        if b.is_ascii_alphabetic() || b == b'-' || b == b'.' {
            residues.push(b);
        }
    }
    (name_part.trim().to_string(), residues)
}

/// PHYLIP batch writer: buffers nothing itself, but must be given the full
/// record set at once because the header needs the count and the common
/// length before any row is emitted
pub struct PhylipWriter;

impl FormatWriter for PhylipWriter {
    fn write_record(
        &mut self,
        record: &SeqRecord,
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()> {
        self.write_batch(std::slice::from_ref(record), out, cfg)
    }

    fn write_batch(
        &mut self,
        records: &[SeqRecord],
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()> {
        let length = records
            .iter()
            .map(|r| r.ranged_sequence().len())
            .max()
            .unwrap_or(0);
        writeln!(out, " {} {}", records.len(), length)?;

        let width = cfg.line_width.max(10);
        for record in records {
            let seq = record.ranged_sequence();
            let mut padded = seq.to_vec();
            // Short rows pad with gaps so every row spans the full alignment
            padded.resize(length, b'-');

            let mut name = record.name.clone();
            name.truncate(10);
            let first: Vec<u8> = padded.iter().take(width).copied().collect();
            writeln!(
                out,
                "{:<10}{}",
                name,
                String::from_utf8_lossy(&first)
            )?;
            let mut pos = width;
            while pos < padded.len() {
                let end = (pos + width).min(padded.len());
                writeln!(
                    out,
                    "          {}",
                    String::from_utf8_lossy(&padded[pos..end])
                )?;
                pos = end;
            }
        }
        Ok(())
    }
}
