//! The sequence output façade
//!
//! [`SequenceWriter`] serializes records into any registered format.
//! Stateless formats emit each record immediately; batch formats (PHYLIP
//! alignments need the full record set for their header and column layout)
//! collect records into a save-list and serialize exactly once at
//! [`finish`](SequenceWriter::finish). Paths ending in `.gz` are
//! gzip-compressed transparently, mirroring the input side.
//!
//! # Example
//!
//! ```no_run
//! use uniseq::{FormatId, SeqRecord, SequenceWriter};
//!
//! # fn main() -> uniseq::Result<()> {
//! let mut writer = SequenceWriter::to_path("out.fasta", FormatId::Fasta)?;
//! writer.write(&SeqRecord::new("seq1", b"GATTACA".to_vec()))?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::formats::{self, FormatDescriptor, FormatWriter, WriteConfig};
use crate::types::SeqRecord;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

enum Destination {
    Stream(Box<dyn Write>),
    /// Kept as a path so `single_file_per_record` can derive per-record
    /// file names; opened lazily otherwise
    Path {
        path: PathBuf,
        open: Option<Box<dyn Write>>,
    },
}

/// Multi-format record serializer
pub struct SequenceWriter {
    descriptor: &'static FormatDescriptor,
    writer_impl: Box<dyn FormatWriter>,
    cfg: WriteConfig,
    dest: Destination,
    /// Save-list for batch formats, flushed once at finish
    pending: Vec<SeqRecord>,
    records_written: usize,
}

impl SequenceWriter {
    /// Write to a file path with the default layout configuration
    pub fn to_path<P: AsRef<Path>>(path: P, format: crate::formats::FormatId) -> Result<Self> {
        Self::to_path_with(path, format, WriteConfig::default())
    }

    /// Write to a file path with an explicit layout configuration
    pub fn to_path_with<P: AsRef<Path>>(
        path: P,
        format: crate::formats::FormatId,
        cfg: WriteConfig,
    ) -> Result<Self> {
        let descriptor = formats::descriptor(format);
        Ok(Self {
            descriptor,
            writer_impl: descriptor.new_writer(),
            cfg,
            dest: Destination::Path {
                path: path.as_ref().to_path_buf(),
                open: None,
            },
            pending: Vec::new(),
            records_written: 0,
        })
    }

    /// Write to any byte sink (stdout, pipes)
    pub fn to_writer<W: Write + 'static>(
        out: W,
        format: crate::formats::FormatId,
        cfg: WriteConfig,
    ) -> Self {
        let descriptor = formats::descriptor(format);
        Self {
            descriptor,
            writer_impl: descriptor.new_writer(),
            cfg,
            dest: Destination::Stream(Box::new(out)),
            pending: Vec::new(),
            records_written: 0,
        }
    }

    /// Write one record (or queue it, for batch formats)
    pub fn write(&mut self, record: &SeqRecord) -> Result<()> {
        if self.descriptor.batch_output {
            self.pending.push(record.clone());
            return Ok(());
        }

        if self.cfg.single_file_per_record {
            let path = self.record_path(record)?;
            debug!("writing '{}' to {}", record.name, path.display());
            let mut out = open_sink(&path)?;
            self.writer_impl.write_record(record, &mut out, &self.cfg)?;
            out.flush()?;
        } else {
            let out = open_dest(&mut self.dest)?;
            self.writer_impl.write_record(record, out, &self.cfg)?;
        }
        self.records_written += 1;
        Ok(())
    }

    /// Number of records fully serialized so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush everything and, for batch formats, run the one-shot
    /// serialization of the save-list
    pub fn finish(mut self) -> Result<()> {
        if self.descriptor.batch_output && !self.pending.is_empty() {
            let records = std::mem::take(&mut self.pending);
            let out = open_dest(&mut self.dest)?;
            self.writer_impl.write_batch(&records, out, &self.cfg)?;
            self.records_written += records.len();
        }
        match &mut self.dest {
            Destination::Stream(out) => out.flush()?,
            Destination::Path { open: Some(out), .. } => out.flush()?,
            Destination::Path { open: None, .. } => {}
        }
        Ok(())
    }

    /// Per-record output path for `single_file_per_record`
    fn record_path(&self, record: &SeqRecord) -> Result<PathBuf> {
        let base = match &self.dest {
            Destination::Path { path, .. } => path.clone(),
            Destination::Stream(_) => PathBuf::from("."),
        };
        let dir = base.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = if record.name.is_empty() {
            format!("record{}", self.records_written + 1)
        } else {
            record.name.clone()
        };
        Ok(dir.join(format!("{}.{}", name, self.descriptor.extension)))
    }
}

/// Lazily open a path destination, or hand back the live stream
fn open_dest(dest: &mut Destination) -> Result<&mut dyn Write> {
    match dest {
        Destination::Stream(out) => Ok(out.as_mut()),
        Destination::Path { path, open } => {
            if open.is_none() {
                *open = Some(open_sink(path)?);
            }
            match open.as_mut() {
                Some(out) => Ok(out.as_mut()),
                None => Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "output sink failed to open",
                )
                .into()),
            }
        }
    }
}

/// Open a buffered, possibly gzip-compressed, file sink
fn open_sink(path: &Path) -> Result<Box<dyn Write>> {
    let file = File::create(path)?;
    let is_gz = matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("gz") | Some("gzip")
    );
    if is_gz {
        Ok(Box::new(GzEncoder::new(
            BufWriter::new(file),
            Compression::default(),
        )))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatId;

    #[test]
    fn test_fasta_immediate_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fasta");
        let mut writer = SequenceWriter::to_path(&path, FormatId::Fasta).unwrap();
        writer
            .write(&SeqRecord::new("s1", b"GATTACA".to_vec()))
            .unwrap();
        assert_eq!(writer.records_written(), 1);
        writer.finish().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, ">s1\nGATTACA\n");
    }

    #[test]
    fn test_batch_format_defers_to_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.phy");
        let mut writer = SequenceWriter::to_path(&path, FormatId::Phylip).unwrap();
        writer.write(&SeqRecord::new("a", b"ACGT".to_vec())).unwrap();
        writer.write(&SeqRecord::new("b", b"ACGA".to_vec())).unwrap();

        // Nothing on disk before finish
        assert!(!path.exists());
        assert_eq!(writer.records_written(), 0);
        writer.finish().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(" 2 4\n"));
        assert!(written.contains("a         ACGT"));
    }

    #[test]
    fn test_single_file_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out.fasta");
        let cfg = WriteConfig {
            single_file_per_record: true,
            ..WriteConfig::default()
        };
        let mut writer = SequenceWriter::to_path_with(&base, FormatId::Fasta, cfg).unwrap();
        writer.write(&SeqRecord::new("alpha", b"AC".to_vec())).unwrap();
        writer.write(&SeqRecord::new("beta", b"GT".to_vec())).unwrap();
        writer.finish().unwrap();

        assert!(dir.path().join("alpha.fasta").is_file());
        assert!(dir.path().join("beta.fasta").is_file());
        assert!(!base.exists());
    }

    #[test]
    fn test_gzip_output_roundtrip() {
        use crate::io::DataSource;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fasta.gz");
        let mut writer = SequenceWriter::to_path(&path, FormatId::Fasta).unwrap();
        writer
            .write(&SeqRecord::new("z", b"ACGTACGT".to_vec()))
            .unwrap();
        writer.finish().unwrap();

        let mut src = DataSource::from_path(&path).open().unwrap();
        assert_eq!(src.read_line().unwrap().as_deref(), Some(">z"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("ACGTACGT"));
    }

    #[test]
    fn test_text_writer_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        let mut writer = SequenceWriter::to_path(&path, FormatId::Text).unwrap();
        writer.write(&SeqRecord::new("x", b"ACGT".to_vec())).unwrap();
        writer.finish().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ACGT\n");
    }

    #[test]
    fn test_to_writer_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sink.fasta");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = SequenceWriter::to_writer(file, FormatId::Fasta, WriteConfig::default());
        writer.write(&SeqRecord::new("x", b"ACGT".to_vec())).unwrap();
        writer.finish().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b">x\nACGT\n");
    }
}
