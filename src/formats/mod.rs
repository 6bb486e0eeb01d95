//! Sequence format registry and per-format readers/writers
//!
//! The registry is a fixed, ordered table of [`FormatDescriptor`]s. Order
//! matters: when no format is forced, the prober tries readers in registry
//! order restricted to those with `default_try` set, and the first reader
//! whose framing check accepts the stream wins.
//!
//! Formats supplied:
//! - **embl**: EMBL flat records (`ID`/`AC`/`DE`/`SQ` ... `//`)
//! - **genbank**: GenBank flat records (`LOCUS`/`ACCESSION`/`ORIGIN` ... `//`)
//! - **phylip**: PHYLIP alignments (batch output, table-resume input)
//! - **fasta**: `>` header plus wrapped residues
//! - **text**: bare residues, never auto-detected (`default_try = false`)

use crate::error::Result;
use crate::io::LineSource;
use crate::types::SeqRecord;
use std::io::Write;

pub mod embl;
pub mod fasta;
pub mod genbank;
pub mod phylip;
pub mod raw;

/// Identifier of a registered sequence format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    /// EMBL flat file
    Embl,
    /// GenBank flat file
    Genbank,
    /// PHYLIP alignment
    Phylip,
    /// FASTA
    Fasta,
    /// Plain text / raw residues
    Text,
}

impl FormatId {
    /// Canonical lower-case name of the format
    pub fn name(self) -> &'static str {
        descriptor(self).name
    }

    /// Resolve a format name or alias given through the API
    pub fn from_name(name: &str) -> Result<Self> {
        match lookup(name) {
            Some(desc) => Ok(desc.id),
            None => Err(crate::error::UniseqError::UnknownFormat {
                name: name.to_string(),
            }),
        }
    }
}

/// Outcome of one reader invocation
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete record was assembled
    Record(SeqRecord),
    /// The stream does not look like this format; nothing is committed.
    /// The caller must `reset()` the source before trying another reader.
    Mismatch,
    /// The stream is exhausted
    Eof,
}

/// One-record-at-a-time reader for a single format.
///
/// Implementations may keep state between calls (the PHYLIP reader keeps the
/// whole parsed alignment table); the stream session owns the boxed reader
/// for exactly as long as the address it was committed to.
pub trait FormatReader {
    /// Read the next record from the source.
    ///
    /// Returns `Mismatch` only when the reader has not committed to the
    /// stream; once any part of a record has been consumed, malformed input
    /// is a hard `InvalidRecord` error instead.
    fn read_record(&mut self, src: &mut LineSource) -> Result<ReadOutcome>;
}

/// Serializer for a single format
pub trait FormatWriter {
    /// Write one record
    fn write_record(
        &mut self,
        record: &SeqRecord,
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()>;

    /// Write a full set of records at once.
    ///
    /// Batch formats (alignments) override this; the default just loops
    /// over `write_record`.
    fn write_batch(
        &mut self,
        records: &[SeqRecord],
        out: &mut dyn Write,
        cfg: &WriteConfig,
    ) -> Result<()> {
        for record in records {
            self.write_record(record, out, cfg)?;
        }
        Ok(())
    }
}

/// Per-write layout configuration
#[derive(Debug, Clone)]
pub struct WriteConfig {
    /// Residues per output line for wrapped formats
    pub line_width: usize,
    /// Write each record to its own file named after the record
    pub single_file_per_record: bool,
    /// Re-emit feature-table lines carried through from flat formats
    pub include_features: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            line_width: 60,
            single_file_per_record: false,
            include_features: false,
        }
    }
}

/// Registry entry: name, probe policy, and reader/writer factories
pub struct FormatDescriptor {
    /// Format identifier
    pub id: FormatId,
    /// Canonical name, lower case
    pub name: &'static str,
    /// Accepted alternative names, lower case
    pub aliases: &'static [&'static str],
    /// Whether the prober tries this format when none is forced
    pub default_try: bool,
    /// Whether output must buffer all records before emitting any byte
    pub batch_output: bool,
    /// Conventional file extension for `single_file_per_record` output
    pub extension: &'static str,
    new_reader: fn() -> Box<dyn FormatReader>,
    new_writer: fn() -> Box<dyn FormatWriter>,
}

impl FormatDescriptor {
    /// Create a fresh reader instance for one stream session
    pub fn new_reader(&self) -> Box<dyn FormatReader> {
        (self.new_reader)()
    }

    /// Create a fresh writer instance
    pub fn new_writer(&self) -> Box<dyn FormatWriter> {
        (self.new_writer)()
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// The fixed, ordered format table. Order defines fallback priority.
pub static REGISTRY: &[FormatDescriptor] = &[
    FormatDescriptor {
        id: FormatId::Embl,
        name: "embl",
        aliases: &["em", "swissprot", "sw"],
        default_try: true,
        batch_output: false,
        extension: "embl",
        new_reader: || Box::new(embl::EmblReader::new()),
        new_writer: || Box::new(embl::EmblWriter),
    },
    FormatDescriptor {
        id: FormatId::Genbank,
        name: "genbank",
        aliases: &["gb", "ddbj"],
        default_try: true,
        batch_output: false,
        extension: "gb",
        new_reader: || Box::new(genbank::GenbankReader::new()),
        new_writer: || Box::new(genbank::GenbankWriter),
    },
    FormatDescriptor {
        id: FormatId::Phylip,
        name: "phylip",
        aliases: &["ph"],
        default_try: true,
        batch_output: true,
        extension: "phy",
        new_reader: || Box::new(phylip::PhylipReader::new()),
        new_writer: || Box::new(phylip::PhylipWriter),
    },
    FormatDescriptor {
        id: FormatId::Fasta,
        name: "fasta",
        aliases: &["fa", "pearson"],
        default_try: true,
        batch_output: false,
        extension: "fasta",
        new_reader: || Box::new(fasta::FastaReader::new()),
        new_writer: || Box::new(fasta::FastaWriter),
    },
    FormatDescriptor {
        id: FormatId::Text,
        name: "text",
        aliases: &["raw", "plain"],
        // Accepts any bytes, so it can never take part in auto-detection
        default_try: false,
        batch_output: false,
        extension: "txt",
        new_reader: || Box::new(raw::TextReader::new()),
        new_writer: || Box::new(raw::TextWriter),
    },
];

/// Case-insensitive, alias-aware name lookup
pub fn lookup(name: &str) -> Option<&'static FormatDescriptor> {
    REGISTRY.iter().find(|d| d.answers_to(name))
}

/// Descriptor for a known format id
pub fn descriptor(id: FormatId) -> &'static FormatDescriptor {
    REGISTRY
        .iter()
        .find(|d| d.id == id)
        .unwrap_or(&REGISTRY[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(lookup("FASTA").map(|d| d.id), Some(FormatId::Fasta));
        assert_eq!(lookup("Fasta").map(|d| d.id), Some(FormatId::Fasta));
    }

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(lookup("fa").map(|d| d.id), Some(FormatId::Fasta));
        assert_eq!(lookup("gb").map(|d| d.id), Some(FormatId::Genbank));
        assert_eq!(lookup("raw").map(|d| d.id), Some(FormatId::Text));
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup("nosuchformat").is_none());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(FormatId::from_name("em").unwrap(), FormatId::Embl);
        assert!(matches!(
            FormatId::from_name("nosuchformat"),
            Err(crate::error::UniseqError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn test_names_unique() {
        let mut seen: Vec<String> = Vec::new();
        for d in REGISTRY {
            for name in std::iter::once(&d.name).chain(d.aliases.iter()) {
                let lower = name.to_ascii_lowercase();
                assert!(!seen.contains(&lower), "duplicate format name {}", name);
                seen.push(lower);
            }
        }
    }

    #[test]
    fn test_text_not_triable() {
        assert!(!descriptor(FormatId::Text).default_try);
    }

    #[test]
    fn test_phylip_is_batch() {
        assert!(descriptor(FormatId::Phylip).batch_output);
        assert!(!descriptor(FormatId::Fasta).batch_output);
    }
}
