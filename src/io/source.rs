//! Data sources and the replayable line reader
//!
//! # Architecture
//!
//! [`DataSource`] abstracts over where bytes come from (local file, possibly
//! gzip-compressed, or an in-memory literal from an `asis:` address).
//! [`LineSource`] wraps the opened source and adds the capability every
//! format reader relies on during probing: `mark()` a position, read ahead,
//! and `reset()` back when the framing check fails. Once a format commits,
//! `commit()` drops the replay history so memory stays bounded by one
//! record's worth of lines.

use crate::error::{Result, UniseqError};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Where the bytes of one address come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Local file path with an optional byte offset to seek to before reading
    Local {
        /// File to open
        path: PathBuf,
        /// Byte offset for `%offset` direct-seek addresses
        offset: Option<u64>,
    },
    /// In-memory bytes from an `asis:` literal address
    Literal(Vec<u8>),
}

impl DataSource {
    /// Create a local file data source
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        DataSource::Local {
            path: path.as_ref().to_path_buf(),
            offset: None,
        }
    }

    /// Create a local file data source seeking to `offset` before reading
    pub fn from_path_at<P: AsRef<Path>>(path: P, offset: u64) -> Self {
        DataSource::Local {
            path: path.as_ref().to_path_buf(),
            offset: Some(offset),
        }
    }

    /// Create an in-memory data source
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        DataSource::Literal(bytes)
    }

    /// A short human-readable label for error messages and raw-format names
    pub fn label(&self) -> String {
        match self {
            DataSource::Local { path, .. } => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("input")
                .to_string(),
            DataSource::Literal(_) => "asis".to_string(),
        }
    }

    /// Open the source as a replayable line reader.
    ///
    /// Paths ending in `.gz` are decompressed transparently. A `%offset`
    /// beyond the end of the file is an error; offsets into compressed files
    /// apply to the compressed byte stream.
    pub fn open(&self) -> Result<LineSource> {
        let label = self.label();
        let reader: Box<dyn BufRead> = match self {
            DataSource::Local { path, offset } => {
                let mut file = File::open(path)?;
                if let Some(offset) = offset {
                    let len = file.metadata()?.len();
                    if *offset > len {
                        return Err(UniseqError::InvalidAddress {
                            usa: path.display().to_string(),
                            msg: format!("offset {} beyond file length {}", offset, len),
                        });
                    }
                    file.seek(SeekFrom::Start(*offset))?;
                }
                if is_gzip_path(path) {
                    Box::new(BufReader::new(MultiGzDecoder::new(file)))
                } else {
                    Box::new(BufReader::new(file))
                }
            }
            DataSource::Literal(bytes) => Box::new(std::io::Cursor::new(bytes.clone())),
        };
        Ok(LineSource::new(reader, label))
    }
}

fn is_gzip_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("gz") | Some("gzip")
    )
}

/// Line-oriented buffered reader with mark/reset replay
///
/// # Probe contract
///
/// The format prober calls `mark()` before handing the source to a reader.
/// A reader that returns a framing mismatch may have consumed any number of
/// lines; the prober then calls `reset()` and the next reader sees the
/// stream from the marked position again. A reader that succeeds commits,
/// and `commit()` releases the replay history.
pub struct LineSource {
    reader: Box<dyn BufRead>,
    label: String,
    /// Lines retained for replay, oldest first, newline-stripped
    history: Vec<String>,
    /// Next history index to replay; equals `history.len()` when live
    cursor: usize,
    /// Replay position saved by `mark()`
    mark: Option<usize>,
    line_number: usize,
    eof: bool,
}

impl LineSource {
    /// Wrap a buffered reader
    pub fn new(reader: Box<dyn BufRead>, label: impl Into<String>) -> Self {
        Self {
            reader,
            label: label.into(),
            history: Vec::new(),
            cursor: 0,
            mark: None,
            line_number: 0,
            eof: false,
        }
    }

    /// Convenience constructor for tests and literals
    pub fn from_bytes(bytes: &[u8], label: impl Into<String>) -> Self {
        Self::new(Box::new(std::io::Cursor::new(bytes.to_vec())), label)
    }

    /// Label of the underlying source
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 1-based number of the line most recently returned
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next line, newline-stripped. `None` at end of input.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        if self.cursor < self.history.len() {
            let line = self.history[self.cursor].clone();
            self.cursor += 1;
            self.line_number += 1;
            return Ok(Some(line));
        }
        if self.eof {
            return Ok(None);
        }
        let mut buf = String::new();
        let n = self.reader.read_line(&mut buf)?;
        if n == 0 {
            self.eof = true;
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        self.line_number += 1;
        if self.mark.is_some() {
            self.history.push(buf.clone());
            self.cursor = self.history.len();
        }
        Ok(Some(buf))
    }

    /// Read the next line that is not empty after trimming
    pub fn read_nonblank_line(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.read_line()? {
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Save the current position so `reset()` can return to it
    pub fn mark(&mut self) {
        // Drop replay lines already consumed before this mark
        if self.mark.is_none() && self.cursor == self.history.len() {
            self.history.clear();
            self.cursor = 0;
        }
        self.mark = Some(self.cursor);
    }

    /// Rewind to the most recent `mark()`
    pub fn reset(&mut self) {
        if let Some(mark) = self.mark {
            let replayed = self.cursor - mark;
            self.cursor = mark;
            self.line_number = self.line_number.saturating_sub(replayed);
        }
    }

    /// Forget the mark and release replay lines that precede the cursor
    pub fn commit(&mut self) {
        self.mark = None;
        self.history.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Push one line back so the next `read_line()` returns it again.
    ///
    /// Readers use this for single-line look-ahead (e.g. detecting the `>`
    /// that starts the next FASTA record).
    pub fn unread_line(&mut self, line: String) {
        if self.cursor > 0 && self.history.get(self.cursor - 1) == Some(&line) {
            self.cursor -= 1;
        } else {
            self.history.insert(self.cursor, line);
        }
        self.line_number = self.line_number.saturating_sub(1);
    }

    /// Whether the underlying reader has reached end of input and no replay
    /// lines remain
    pub fn is_exhausted(&self) -> bool {
        self.eof && self.cursor >= self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_strips_newlines() {
        let mut src = LineSource::from_bytes(b"one\r\ntwo\nthree", "t");
        assert_eq!(src.read_line().unwrap().as_deref(), Some("one"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("two"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("three"));
        assert_eq!(src.read_line().unwrap(), None);
    }

    #[test]
    fn test_mark_reset_replays() {
        let mut src = LineSource::from_bytes(b"a\nb\nc\n", "t");
        src.mark();
        assert_eq!(src.read_line().unwrap().as_deref(), Some("a"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("b"));
        src.reset();
        assert_eq!(src.read_line().unwrap().as_deref(), Some("a"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("b"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("c"));
        assert_eq!(src.read_line().unwrap(), None);
    }

    #[test]
    fn test_reset_restores_line_number() {
        let mut src = LineSource::from_bytes(b"a\nb\nc\n", "t");
        src.mark();
        src.read_line().unwrap();
        src.read_line().unwrap();
        assert_eq!(src.line_number(), 2);
        src.reset();
        assert_eq!(src.line_number(), 0);
    }

    #[test]
    fn test_commit_releases_history() {
        let mut src = LineSource::from_bytes(b"a\nb\nc\n", "t");
        src.mark();
        src.read_line().unwrap();
        src.commit();
        assert!(src.history.is_empty());
        assert_eq!(src.read_line().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_remark_after_reset() {
        let mut src = LineSource::from_bytes(b"a\nb\nc\n", "t");
        src.mark();
        src.read_line().unwrap();
        src.reset();
        src.mark();
        assert_eq!(src.read_line().unwrap().as_deref(), Some("a"));
        src.reset();
        assert_eq!(src.read_line().unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_unread_line() {
        let mut src = LineSource::from_bytes(b"x\ny\n", "t");
        src.mark();
        let line = src.read_line().unwrap().unwrap();
        src.unread_line(line);
        assert_eq!(src.read_line().unwrap().as_deref(), Some("x"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn test_unread_line_without_mark() {
        let mut src = LineSource::from_bytes(b"x\ny\n", "t");
        let line = src.read_line().unwrap().unwrap();
        src.unread_line(line);
        assert_eq!(src.read_line().unwrap().as_deref(), Some("x"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("y"));
        assert_eq!(src.read_line().unwrap(), None);
    }

    #[test]
    fn test_nonblank_skips_blank_lines() {
        let mut src = LineSource::from_bytes(b"\n  \nseq\n", "t");
        assert_eq!(src.read_nonblank_line().unwrap().as_deref(), Some("seq"));
    }

    #[test]
    fn test_literal_source_roundtrip() {
        let source = DataSource::from_bytes(b"ACGT\n".to_vec());
        let mut src = source.open().unwrap();
        assert_eq!(src.read_line().unwrap().as_deref(), Some("ACGT"));
        assert_eq!(src.label(), "asis");
    }

    #[test]
    fn test_offset_beyond_eof_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.fa");
        std::fs::write(&path, b">s\nACGT\n").unwrap();
        let source = DataSource::from_path_at(&path, 10_000);
        assert!(matches!(
            source.open(),
            Err(UniseqError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_offset_seeks_into_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.fa");
        let data = b">first\nAAAA\n>second\nCCCC\n";
        std::fs::write(&path, data).unwrap();
        let offset = data.iter().position(|&b| b == b'>').unwrap();
        let second = data
            .windows(7)
            .position(|w| w == b">second")
            .unwrap() as u64;
        assert_eq!(offset, 0);
        let source = DataSource::from_path_at(&path, second);
        let mut src = source.open().unwrap();
        assert_eq!(src.read_line().unwrap().as_deref(), Some(">second"));
    }

    #[test]
    fn test_gzip_source() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seq.fa.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(b">gz\nACGT\n").unwrap();
        enc.finish().unwrap();

        let mut src = DataSource::from_path(&path).open().unwrap();
        assert_eq!(src.read_line().unwrap().as_deref(), Some(">gz"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("ACGT"));
    }
}
