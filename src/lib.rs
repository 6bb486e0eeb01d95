//! uniseq: Uniform Sequence Address resolution and multi-format sequence I/O
//!
//! # Overview
//!
//! uniseq turns a short address string — a Uniform Sequence Address, USA —
//! into a stream of typed, positioned biological sequence records, probing
//! across incompatible textual formats and falling back in a fixed order
//! until one reader accepts the input. The symmetric writer serializes
//! records back into any registered format.
//!
//! ## Address forms
//!
//! | Form | Example |
//! |------|---------|
//! | file | `seqs.fasta`, `big.dat%4096`, `db.dat:HBA_HUMAN` |
//! | database | `mydb:FOO*`, `mydb-acc:P12345` |
//! | list | `@files.lst`, `list:files.lst` |
//! | literal | `asis:GATTACA` |
//! | format prefix | `embl::entries.dat` |
//! | range suffix | `seqs.fasta[10:20:r]` |
//!
//! ## Quick Start
//!
//! ```no_run
//! use uniseq::SequenceStream;
//!
//! # fn main() -> uniseq::Result<()> {
//! // One continuous record stream, format auto-detected per file
//! let stream = SequenceStream::open("@genomes.lst")?;
//!
//! for record in stream {
//!     let record = record?;
//!     println!("{}: {} residues", record.name, record.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`address`]: USA grammar parsing and list-file expansion
//! - [`db`]: database-name resolution (flat-file registry)
//! - [`formats`]: format registry, per-format readers and writers
//! - [`io`]: replayable line sources with gzip support
//! - [`stream`]: the read façade with ordered format fallback
//! - [`writer`]: the write façade, including batch formats

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod address;
pub mod db;
pub mod error;
pub mod formats;
pub mod io;
mod probe;
pub mod stream;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use address::{Address, AddressMode, AddressParser, AddressRange};
pub use db::{DbRegistry, DbSpec};
pub use error::{Result, UniseqError};
pub use formats::{FormatId, WriteConfig};
pub use stream::{OpenOptions, SequenceStream};
pub use types::{MoleculeType, Query, QueryLevel, SeqRecord};
pub use writer::SequenceWriter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
