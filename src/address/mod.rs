//! Uniform Sequence Address (USA) parsing
//!
//! A USA is a short address string that identifies where sequence records
//! come from and how to slice them. Six forms are accepted, evaluated in a
//! fixed precedence order; each stage strips what it matched before the next
//! stage runs:
//!
//! 1. trailing range `[begin:end:r]`
//! 2. literal `asis:ACGT`
//! 3. list indirection `@file.lst` / `list:file.lst`
//! 4. format prefix `fasta::...`
//! 5. database query `mydb:HBA*`, `mydb-acc:P12345`
//! 6. file `seqs.fasta`, `seqs.dat:HBA_HUMAN`, `big.dat%4096`, `seqs.dat{HBA*}`
//!
//! Range and format stages never fail the parse (apart from a malformed
//! bracket, which is a hard error); stages 5 and 6 are terminal: an address
//! that is neither a known database nor an openable file is `Unresolved`.

pub mod list;

use crate::db::DbRegistry;
use crate::error::{Result, UniseqError};
use crate::formats::{self, FormatId};
use crate::types::QueryLevel;
use log::warn;
use std::path::{Path, PathBuf};

/// Record slice requested by a bracket suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressRange {
    /// 1-based inclusive start; negative counts from the end
    pub begin: Option<i64>,
    /// 1-based inclusive end; negative counts from the end
    pub end: Option<i64>,
    /// Reverse-complement / reverse-strand request
    pub reverse: bool,
}

impl AddressRange {
    fn is_set(&self) -> bool {
        self.begin.is_some() || self.end.is_some() || self.reverse
    }
}

/// What kind of source the address names
#[derive(Debug, Clone, PartialEq)]
pub enum AddressMode {
    /// `asis:` literal: the bytes are the sequence itself
    Literal(Vec<u8>),
    /// `@file` / `list:file`: a file of child addresses
    List(PathBuf),
    /// `db[:query]`: a registered database, optionally filtered
    Database {
        /// Registered database name
        name: String,
        /// Wildcard pattern after the colon, if any
        query: Option<String>,
        /// Which fields the pattern filters
        level: QueryLevel,
    },
    /// A concrete file, optionally with an entry filter or byte offset
    File {
        /// Path to open
        path: PathBuf,
        /// Entry-name filter from `:id` or `{id}`
        entry: Option<String>,
        /// Direct byte offset from `%offset`
        offset: Option<u64>,
    },
}

/// A fully parsed USA
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    /// Requested record slice, applied to every record from this address
    pub range: Option<AddressRange>,
    /// Format forced by a `format::` prefix (or `asis:`)
    pub format: Option<FormatId>,
    /// Source named by the address
    pub mode: AddressMode,
}

/// USA parser bound to a database registry
///
/// The registry decides whether a bare name such as `mydb:HBA*` is a
/// database query or a (failing) file reference; an empty registry makes
/// every address resolve through the filesystem.
pub struct AddressParser<'a> {
    db: &'a DbRegistry,
}

impl<'a> AddressParser<'a> {
    /// Create a parser using the given database registry
    pub fn new(db: &'a DbRegistry) -> Self {
        Self { db }
    }

    /// Parse one address string
    pub fn parse(&self, usa: &str) -> Result<Address> {
        let input = usa.trim();
        if input.is_empty() {
            return Err(UniseqError::InvalidAddress {
                usa: usa.to_string(),
                msg: "empty address".to_string(),
            });
        }

        // Stage 1: trailing [begin:end:reverse]
        let (rest, range) = strip_range(input)?;
        let range = range.filter(AddressRange::is_set);

        // Stage 2: asis literal short-circuits everything else
        if let Some(text) = strip_prefix_ci(rest, "asis:") {
            return Ok(Address {
                range,
                format: Some(FormatId::Text),
                mode: AddressMode::Literal(text.as_bytes().to_vec()),
            });
        }

        // Stage 3: list indirection
        if let Some(path) = list_path(rest) {
            return Ok(Address {
                range,
                format: None,
                mode: AddressMode::List(path),
            });
        }

        // Stage 4: format prefix; unknown names are soft errors
        let (rest, format) = strip_format(rest);

        // A list can follow a format prefix (`fasta::@files.lst`)
        if let Some(path) = list_path(rest) {
            return Ok(Address {
                range,
                format,
                mode: AddressMode::List(path),
            });
        }

        // Stage 5: database query
        if let Some(mode) = self.match_database(rest) {
            return Ok(Address {
                range,
                format,
                mode,
            });
        }

        // Stage 6: file, with %offset / :id / {id} decoration
        match file_mode(rest) {
            Some(mode) => Ok(Address {
                range,
                format,
                mode,
            }),
            None => Err(UniseqError::Unresolved {
                usa: usa.to_string(),
            }),
        }
    }

    /// Try the `dbname[-id|-acc][:query]` form against the registry
    fn match_database(&self, rest: &str) -> Option<AddressMode> {
        if self.db.is_empty() {
            return None;
        }
        let (name_part, query) = match rest.split_once(':') {
            Some((n, q)) => (n, Some(q.to_string())),
            None => (rest, None),
        };
        let (name, level) = if let Some(base) = strip_suffix_ci(name_part, "-id") {
            (base, QueryLevel::Id)
        } else if let Some(base) = strip_suffix_ci(name_part, "-acc") {
            (base, QueryLevel::Acc)
        } else {
            (name_part, QueryLevel::Both)
        };
        self.db.resolve(name)?;
        Some(AddressMode::Database {
            name: name.to_string(),
            query: query.filter(|q| !q.is_empty()),
            level,
        })
    }
}

/// Strip a trailing `[...]` range. Malformed bracket content is a hard error.
fn strip_range(input: &str) -> Result<(&str, Option<AddressRange>)> {
    if !input.ends_with(']') {
        return Ok((input, None));
    }
    let open = match input.rfind('[') {
        Some(pos) => pos,
        None => {
            return Err(UniseqError::InvalidRange {
                msg: format!("unmatched ']' in '{}'", input),
            })
        }
    };
    let body = &input[open + 1..input.len() - 1];
    let mut range = AddressRange::default();
    let fields: Vec<&str> = body.split(':').collect();
    if fields.len() > 3 {
        return Err(UniseqError::InvalidRange {
            msg: format!("too many fields in '[{}]'", body),
        });
    }
    if let Some(field) = fields.first() {
        range.begin = parse_bound(field)?;
    }
    if let Some(field) = fields.get(1) {
        range.end = parse_bound(field)?;
    }
    if let Some(field) = fields.get(2) {
        match field.trim() {
            "" => {}
            "r" | "R" => range.reverse = true,
            other => {
                return Err(UniseqError::InvalidRange {
                    msg: format!("bad reverse flag '{}'", other),
                })
            }
        }
    }
    Ok((&input[..open], Some(range)))
}

fn parse_bound(field: &str) -> Result<Option<i64>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    match field.parse::<i64>() {
        Ok(0) => Err(UniseqError::InvalidRange {
            msg: "positions are 1-based, 0 is not a valid bound".to_string(),
        }),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(UniseqError::InvalidRange {
            msg: format!("'{}' is not a number", field),
        }),
    }
}

/// Match the `@path` and `list:path` forms
fn list_path(rest: &str) -> Option<PathBuf> {
    if let Some(path) = rest.strip_prefix('@') {
        return Some(PathBuf::from(path.trim()));
    }
    strip_prefix_ci(rest, "list:").map(|p| PathBuf::from(p.trim()))
}

/// Strip a leading `name::`; an unknown name is logged and left unset
fn strip_format(rest: &str) -> (&str, Option<FormatId>) {
    let Some((name, tail)) = rest.split_once("::") else {
        return (rest, None);
    };
    if name.is_empty() || name.contains(|c| c == '/' || c == '\\' || c == ':') {
        return (rest, None);
    }
    match formats::lookup(name) {
        Some(desc) => (tail, Some(desc.id)),
        None => {
            warn!("unknown format prefix '{}' ignored", name);
            (tail, None)
        }
    }
}

/// Match the file form: `path`, `path%offset`, `path:id`, `path{id}`
fn file_mode(rest: &str) -> Option<AddressMode> {
    if rest.is_empty() {
        return None;
    }

    // %offset direct seek; a file whose name literally contains '%'
    // falls through to the plain-path check below
    if let Some((path_part, offset_part)) = rest.rsplit_once('%') {
        if let Ok(offset) = offset_part.parse::<u64>() {
            let path = PathBuf::from(path_part);
            if path.is_file() {
                return Some(AddressMode::File {
                    path,
                    entry: None,
                    offset: Some(offset),
                });
            }
        }
    }

    // {id} entry filter
    if rest.ends_with('}') {
        if let Some((path_part, entry)) = rest[..rest.len() - 1].split_once('{') {
            let path = PathBuf::from(path_part);
            if path.is_file() {
                return Some(AddressMode::File {
                    path,
                    entry: (!entry.is_empty()).then(|| entry.to_string()),
                    offset: None,
                });
            }
            return None;
        }
    }

    // Plain path wins over the :id split when the whole string opens
    let path = Path::new(rest);
    if path.is_file() {
        return Some(AddressMode::File {
            path: path.to_path_buf(),
            entry: None,
            offset: None,
        });
    }

    // path:id entry filter
    if let Some((path_part, entry)) = rest.rsplit_once(':') {
        let path = PathBuf::from(path_part);
        if !entry.is_empty() && path.is_file() {
            return Some(AddressMode::File {
                path,
                entry: Some(entry.to_string()),
                offset: None,
            });
        }
    }
    None
}

// `str::get` rejects splits that fall inside a multibyte character, so
// addresses with non-ASCII names fall through instead of panicking
fn strip_prefix_ci<'s>(input: &'s str, prefix: &str) -> Option<&'s str> {
    let head = input.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

fn strip_suffix_ci<'s>(input: &'s str, suffix: &str) -> Option<&'s str> {
    let split = input.len().checked_sub(suffix.len())?;
    let tail = input.get(split..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        Some(&input[..split])
    } else {
        None
    }
}
