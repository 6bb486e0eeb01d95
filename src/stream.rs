//! The sequence input façade
//!
//! [`SequenceStream`] ties the pieces together: parse the address, expand
//! list files, open the concrete source, probe the format, and hand out one
//! record per `next_record()` call. A list address looks to the caller like
//! one continuous stream; when one entry's source is exhausted the next
//! pending entry opens transparently.
//!
//! # Example
//!
//! ```no_run
//! use uniseq::SequenceStream;
//!
//! # fn main() -> uniseq::Result<()> {
//! let mut stream = SequenceStream::open("seqs.fasta[10:20:r]")?;
//! while let Some(record) = stream.next_record()? {
//!     println!("{}: {} residues", record.name, record.len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::address::list::{self, Inherited};
use crate::address::{Address, AddressMode, AddressParser, AddressRange};
use crate::db::DbRegistry;
use crate::error::Result;
use crate::formats::{FormatId, FormatReader};
use crate::io::{DataSource, LineSource};
use crate::types::{MoleculeType, Query, QueryLevel, SeqRecord};
use log::debug;
use std::collections::VecDeque;

/// Caller-side knobs for opening a stream
#[derive(Debug, Default)]
pub struct OpenOptions {
    /// Force a format for every address, overriding `format::` prefixes
    pub format: Option<FormatId>,
    /// Reject records whose molecule type conflicts with this
    pub molecule: Option<MoleculeType>,
    /// Extra filter applied on top of any address-derived query
    pub query: Option<Query>,
}

/// Per-open-address session state
///
/// Owns the buffered source and, once a format has been resolved, the
/// committed reader with whatever resume state it carries.
pub(crate) struct StreamState {
    pub(crate) source: LineSource,
    pub(crate) forced: Option<FormatId>,
    pub(crate) resolved: Option<FormatId>,
    pub(crate) reader: Option<Box<dyn FormatReader>>,
    /// Filter derived from the address itself (`:id`, `{id}`, db query)
    pub(crate) query: Query,
    /// Caller-supplied filter, applied in addition to the address one
    pub(crate) extra: Query,
    range: Option<AddressRange>,
}

/// Pull-based record stream over one USA
pub struct SequenceStream {
    db: DbRegistry,
    options: OpenOptions,
    /// Addresses not yet opened, front first, with their list depth
    pending: VecDeque<(Address, usize)>,
    state: Option<StreamState>,
}

impl SequenceStream {
    /// Open an address with default options and no databases
    pub fn open(usa: &str) -> Result<Self> {
        Self::open_with(usa, &DbRegistry::new(), OpenOptions::default())
    }

    /// Open an address against a database registry with explicit options
    pub fn open_with(usa: &str, db: &DbRegistry, options: OpenOptions) -> Result<Self> {
        let parser = AddressParser::new(db);
        let mut address = parser.parse(usa)?;
        if let Some(format) = options.format {
            address.format = Some(format);
        }
        let mut stream = Self {
            db: db.clone(),
            options,
            pending: VecDeque::from([(address, 0)]),
            state: None,
        };
        // Eager advance so unresolvable addresses and list cycles fail here
        stream.advance()?;
        Ok(stream)
    }

    /// Read the next record, or `None` when every pending address is done
    pub fn next_record(&mut self) -> Result<Option<SeqRecord>> {
        loop {
            if self.state.is_none() && !self.advance()? {
                return Ok(None);
            }
            let Some(state) = self.state.as_mut() else {
                continue;
            };

            match state.probe_next(self.options.molecule) {
                Ok(Some(mut record)) => {
                    if let Some(range) = state.range {
                        record.begin = range.begin;
                        record.end = range.end;
                        record.reverse = range.reverse;
                    }
                    return Ok(Some(record));
                }
                Ok(None) => {
                    // Address exhausted: fall through to the next entry
                    self.state = None;
                }
                Err(e) => {
                    // Terminal for this address only; the next list entry
                    // still proceeds on the following call
                    self.state = None;
                    return Err(e);
                }
            }
        }
    }

    /// Drain the stream into a vector ("read all" mode)
    pub fn read_all(&mut self) -> Result<Vec<SeqRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Release the open source and any pending addresses
    pub fn close(&mut self) {
        self.state = None;
        self.pending.clear();
    }

    /// Open pending addresses until one yields a live source.
    ///
    /// List entries expand in place, depth incremented, before any sibling
    /// is considered. Returns `false` when nothing is left.
    fn advance(&mut self) -> Result<bool> {
        while let Some((address, depth)) = self.pending.pop_front() {
            if let AddressMode::List(path) = &address.mode {
                let parser = AddressParser::new(&self.db);
                let inherited = Inherited::from_address(&address);
                let children = list::expand(&parser, path, inherited, depth + 1)?;
                for child in children.into_iter().rev() {
                    self.pending.push_front((child, depth + 1));
                }
                continue;
            }
            self.state = Some(self.open_address(address)?);
            return Ok(true);
        }
        Ok(false)
    }

    /// Build the session state for one concrete (non-list) address
    fn open_address(&self, address: Address) -> Result<StreamState> {
        let mut forced = address.format;
        let mut query = Query::any();

        let source = match address.mode {
            AddressMode::Literal(bytes) => DataSource::from_bytes(bytes),
            AddressMode::File {
                path,
                entry,
                offset,
            } => {
                if let Some(entry) = entry {
                    query = Query::from_pattern(&entry, QueryLevel::Id);
                }
                match offset {
                    Some(offset) => DataSource::from_path_at(&path, offset),
                    None => DataSource::from_path(&path),
                }
            }
            AddressMode::Database { name, query: pattern, level } => {
                let spec = match self.db.resolve(&name) {
                    Some(spec) => spec.clone(),
                    None => {
                        return Err(crate::error::UniseqError::Unresolved { usa: name })
                    }
                };
                if forced.is_none() {
                    forced = spec.format;
                }
                if let Some(pattern) = pattern {
                    query = Query::from_pattern(&pattern, level);
                }
                DataSource::from_path(&spec.path)
            }
            AddressMode::List(_) => unreachable!("lists expand in advance()"),
        };

        debug!(
            "opening {} (forced format: {:?})",
            source.label(),
            forced.map(|f| f.name())
        );
        Ok(StreamState {
            source: source.open()?,
            forced,
            resolved: None,
            reader: None,
            query,
            extra: self.options.query.clone().unwrap_or_default(),
            range: address.range,
        })
    }
}

impl Iterator for SequenceStream {
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
