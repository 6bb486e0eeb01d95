//! I/O module: buffered line sources with probe support
//!
//! The engine reads every format through [`LineSource`], a line-oriented
//! buffered reader with a `mark()`/`reset()` contract that lets the format
//! prober rewind the stream after a failed framing check.

mod source;

pub use source::{DataSource, LineSource};
