//! Plain-text reader and writer
//!
//! The text format is the whole remaining input treated as one sequence:
//! whitespace and digits are dropped, everything alphabetic (plus gap
//! characters) is kept. Because it accepts any input it is excluded from
//! auto-detection and only used when an address or caller forces it, which
//! is also how `asis:` literals are read.

use crate::error::Result;
use crate::formats::{FormatReader, FormatWriter, ReadOutcome, WriteConfig};
use crate::io::LineSource;
use crate::types::{MoleculeType, SeqRecord};
use std::io::Write;

/// Reader yielding the remaining input as a single record
pub struct TextReader;

impl TextReader {
    /// Create a reader
    pub fn new() -> Self {
        TextReader
    }
}

impl Default for TextReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatReader for TextReader {
    fn read_record(&mut self, src: &mut LineSource) -> Result<ReadOutcome> {
        let mut sequence = Vec::new();
        let mut saw_line = false;
        while let Some(line) = src.read_line()? {
            saw_line = true;
            for &b in line.as_bytes() {
                if b.is_ascii_alphabetic() || b == b'-' || b == b'.' || b == b'*' {
                    sequence.push(b);
                }
            }
        }
        if !saw_line {
            return Ok(ReadOutcome::Eof);
        }

        // The source label (file stem or "asis") stands in for a name the
        // format itself cannot carry
        let mut record = SeqRecord::new(src.label().to_string(), sequence);
        record.molecule = MoleculeType::guess(&record.sequence);
        Ok(ReadOutcome::Record(record))
    }
}

/// Writer emitting bare residues wrapped at the configured width
pub struct TextWriter;

impl FormatWriter for TextWriter {
    fn write_record(
        &mut self,
        record: &SeqRecord,
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()> {
        let width = cfg.line_width.max(1);
        for chunk in record.ranged_sequence().chunks(width) {
            out.write_all(chunk)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_everything_as_one_record() {
        let mut src = LineSource::from_bytes(b"ACGT\nacgt\nNNNN\n", "myseq");
        let mut reader = TextReader::new();
        let record = match reader.read_record(&mut src).unwrap() {
            ReadOutcome::Record(r) => r,
            other => panic!("{:?}", other),
        };
        assert_eq!(record.name, "myseq");
        assert_eq!(record.sequence, b"ACGTacgtNNNN");
        assert!(matches!(
            reader.read_record(&mut src).unwrap(),
            ReadOutcome::Eof
        ));
    }

    #[test]
    fn test_digits_and_whitespace_dropped() {
        let mut src = LineSource::from_bytes(b"  1 acgt 10\n 11 acgt 20\n", "t");
        let record = match TextReader::new().read_record(&mut src).unwrap() {
            ReadOutcome::Record(r) => r,
            other => panic!("{:?}", other),
        };
        assert_eq!(record.sequence, b"acgtacgt");
    }

    #[test]
    fn test_empty_input_is_eof() {
        let mut src = LineSource::from_bytes(b"", "t");
        assert!(matches!(
            TextReader::new().read_record(&mut src).unwrap(),
            ReadOutcome::Eof
        ));
    }

    #[test]
    fn test_writer_roundtrip_sequence() {
        let record = SeqRecord::new("x", b"ACGTACGTACGTACGT".to_vec());
        let mut out = Vec::new();
        let cfg = WriteConfig {
            line_width: 5,
            ..WriteConfig::default()
        };
        TextWriter.write_record(&record, &mut out, &cfg).unwrap();
        assert_eq!(out, b"ACGTA\nCGTAC\nGTACG\nT\n");

        let mut src = LineSource::from_bytes(&out, "x");
        let back = match TextReader::new().read_record(&mut src).unwrap() {
            ReadOutcome::Record(r) => r,
            other => panic!("{:?}", other),
        };
        assert_eq!(back.sequence, record.sequence);
        assert_eq!(back.name, record.name);
    }
}
