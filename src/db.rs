//! Database-name resolver
//!
//! Addresses of the form `dbname:query` need a resolver that maps the
//! database name to something openable. The full relational adaptor layer is
//! out of scope here; this registry covers the flat-file case: a database is
//! a named file (any registered format) that queries filter.

use crate::formats::FormatId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a named database lives and how to read it
#[derive(Debug, Clone)]
pub struct DbSpec {
    /// Flat file holding the database records
    pub path: PathBuf,
    /// Format to force when reading; `None` lets the prober decide
    pub format: Option<FormatId>,
}

impl DbSpec {
    /// Database backed by a flat file, format auto-detected
    pub fn flat_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: None,
        }
    }

    /// Force a format instead of probing
    pub fn with_format(mut self, format: FormatId) -> Self {
        self.format = Some(format);
        self
    }
}

/// Case-insensitive name → database mapping
#[derive(Debug, Clone, Default)]
pub struct DbRegistry {
    entries: HashMap<String, DbSpec>,
}

impl DbRegistry {
    /// Empty registry: every database lookup fails, addresses fall through
    /// to the file form
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a database under a name
    pub fn register(&mut self, name: &str, spec: DbSpec) {
        self.entries.insert(name.to_ascii_lowercase(), spec);
    }

    /// Look a database up by name, case-insensitively
    pub fn resolve(&self, name: &str) -> Option<&DbSpec> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    /// Whether any database is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
