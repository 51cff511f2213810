//! Decoding and parsing of raw archive contents.
//!
//! CVM bulk archives predate the portal's UTF-8 era: the CSV entries are
//! Latin-1 encoded, semicolon delimited, and occasionally carry a UTF-8
//! byte-order mark left behind by republishing tools. This module turns one
//! cached archive into a lazy stream of cleaned [`RawRow`](crate::RawRow)s
//! for a single statement type.

mod decode;
pub mod statement;

pub(crate) use decode::decode_text;
pub use statement::{ParserConfig, RawRows, StatementParser};
