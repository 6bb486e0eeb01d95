//! Format probing with ordered fallback
//!
//! The prober turns an open [`LineSource`](crate::io::LineSource) into
//! records. With a forced format only that reader runs and a framing
//! mismatch is terminal. Without one, readers are tried in registry order
//! (restricted to `default_try` formats) behind the source's `mark()`/
//! `reset()` contract, so a reader that consumed lines before rejecting the
//! stream leaves no trace for the next candidate. The first reader that
//! produces a record commits: it stays the active reader for the rest of
//! the address, which is what lets stateful readers (PHYLIP's alignment
//! table) resume across calls.
//!
//! Query and molecule-type filtering happen after a successful parse.
//! A query rejection silently discards the record and re-invokes the
//! committed reader for the next one; a type conflict is terminal for the
//! address.

use crate::error::{Result, UniseqError};
use crate::formats::{self, ReadOutcome};
use crate::stream::StreamState;
use crate::types::{MoleculeType, SeqRecord};
use log::debug;

impl StreamState {
    /// Pull the next record that survives format, query, and type checks.
    ///
    /// `Ok(None)` means this address is exhausted.
    pub(crate) fn probe_next(
        &mut self,
        required: Option<MoleculeType>,
    ) -> Result<Option<SeqRecord>> {
        loop {
            let outcome = match &mut self.reader {
                Some(reader) => reader.read_record(&mut self.source)?,
                None => self.detect()?,
            };

            let record = match outcome {
                ReadOutcome::Record(record) => record,
                ReadOutcome::Eof => return Ok(None),
                ReadOutcome::Mismatch => {
                    // Only a committed reader reports a mismatch here
                    // (detection either commits or fails); bytes that stop
                    // framing as the resolved format would silently swallow
                    // every later record if ignored
                    let format = match self.resolved {
                        Some(format) => format.name(),
                        None => "unknown",
                    };
                    return Err(UniseqError::InvalidRecord {
                        format,
                        line: self.source.line_number(),
                        msg: format!(
                            "content in {} does not continue the record stream",
                            self.source.label()
                        ),
                    });
                }
            };

            // Both the address-derived and the caller-supplied filter must
            // accept the record
            if !self.query.matches(&record) || !self.extra.matches(&record) {
                debug!("record '{}' rejected by query filter", record.name);
                continue;
            }

            if let Some(required) = required {
                if !required.accepts(record.molecule) {
                    return Err(UniseqError::TypeMismatch {
                        expected: required,
                        found: record.molecule,
                    });
                }
            }

            let mut record = record;
            record.format = self.resolved;
            return Ok(Some(record));
        }
    }

    /// Resolve the format of a fresh source and read its first record.
    ///
    /// On success the winning reader is committed into the state.
    fn detect(&mut self) -> Result<ReadOutcome> {
        if let Some(forced) = self.forced {
            let desc = formats::descriptor(forced);
            let mut reader = desc.new_reader();
            self.source.mark();
            return match reader.read_record(&mut self.source)? {
                ReadOutcome::Record(record) => {
                    self.source.commit();
                    self.resolved = Some(forced);
                    self.reader = Some(reader);
                    Ok(ReadOutcome::Record(record))
                }
                ReadOutcome::Eof => Ok(ReadOutcome::Eof),
                ReadOutcome::Mismatch => Err(UniseqError::FormatMismatch { format: desc.name }),
            };
        }

        self.source.mark();
        for desc in formats::REGISTRY.iter().filter(|d| d.default_try) {
            let mut reader = desc.new_reader();
            match reader.read_record(&mut self.source)? {
                ReadOutcome::Record(record) => {
                    debug!("{} matched {}", self.source.label(), desc.name);
                    self.source.commit();
                    self.resolved = Some(desc.id);
                    self.reader = Some(reader);
                    return Ok(ReadOutcome::Record(record));
                }
                ReadOutcome::Eof => return Ok(ReadOutcome::Eof),
                ReadOutcome::Mismatch => {
                    debug!("{} is not {}", self.source.label(), desc.name);
                    self.source.reset();
                }
            }
        }
        Err(UniseqError::NoFormatMatched)
    }
}
