//! List-file expansion
//!
//! A list file holds one child USA per line; `#` starts a comment, blank
//! lines are skipped, and only the first whitespace-delimited token of a
//! surviving line counts. Children inherit the parent address's range and
//! format unless they carry their own. Nesting is bounded so a list that
//! names itself fails fast instead of looping.

use crate::address::{Address, AddressMode, AddressParser, AddressRange};
use crate::error::{Result, UniseqError};
use crate::formats::FormatId;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Maximum list-file nesting depth before expansion aborts
pub const MAX_LIST_DEPTH: usize = 16;

/// Range and format a parent address hands down to its list entries
#[derive(Debug, Clone, Copy, Default)]
pub struct Inherited {
    /// Parent bracket range, used when the child has none
    pub range: Option<AddressRange>,
    /// Parent format, used when the child has none
    pub format: Option<FormatId>,
}

impl Inherited {
    /// Capture the inheritable parts of a parent address
    pub fn from_address(addr: &Address) -> Self {
        Self {
            range: addr.range,
            format: addr.format,
        }
    }
}

/// Expand one list file into its child addresses, in file order.
///
/// `depth` is the nesting level of the entries produced (the top-level
/// address is depth 0, entries of its list are depth 1). Exceeding
/// [`MAX_LIST_DEPTH`] is fatal for the whole open operation.
pub fn expand(
    parser: &AddressParser<'_>,
    path: &Path,
    inherited: Inherited,
    depth: usize,
) -> Result<Vec<Address>> {
    if depth > MAX_LIST_DEPTH {
        return Err(UniseqError::ListDepthExceeded {
            depth: MAX_LIST_DEPTH,
        });
    }

    let file = File::open(path).map_err(|e| {
        debug!("cannot open list file {}: {}", path.display(), e);
        UniseqError::Io(e)
    })?;
    let reader = BufReader::new(file);

    let mut children = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let token = match entry_token(&line) {
            Some(token) => token,
            None => continue,
        };

        // One bad entry must not poison its siblings
        let mut child = match parser.parse(token) {
            Ok(child) => child,
            Err(e) => {
                warn!("skipping list entry '{}': {}", token, e);
                continue;
            }
        };
        if child.range.is_none() {
            child.range = inherited.range;
        }
        if child.format.is_none() && !matches!(child.mode, AddressMode::Literal(_)) {
            child.format = inherited.format;
        }
        children.push(child);
    }

    debug!(
        "list {} expanded to {} entries at depth {}",
        path.display(),
        children.len(),
        depth
    );
    Ok(children)
}

/// Strip comment and surrounding whitespace, keep the first token
fn entry_token(line: &str) -> Option<&str> {
    let body = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    body.split_whitespace().next()
}
