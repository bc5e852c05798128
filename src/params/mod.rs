//! Request parameter parsing.
//!
//! Turns untyped form fields or a query string such as
//! `bg_color=blue&face_scale=2.4&make_a4=true` into [`ProcessOptions`] and
//! an optional [`SheetRequest`]. Nothing here fails: bad input becomes a
//! [`ParseWarning`] and the affected field keeps its default.
//!
//! # Example
//!
//! ```
//! use passport_photo::params;
//!
//! let result = params::parse("bg_color=light_blue&crop_x=10&crop_y=20&crop_width=300&crop_height=300");
//! assert!(result.warnings.is_empty());
//!
//! let options = result.request.to_options();
//! assert!(options.crop_request().is_manual());
//! assert!(result.request.sheet().is_none());
//! ```
//!
//! [`ProcessOptions`]: crate::ProcessOptions

mod parse;
pub mod request;

pub use request::{Request, SheetRequest};

/// Result of parsing request parameters.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Parsed request.
    pub request: Request,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from parameter parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A key appeared more than once (last value wins).
    DuplicateKey { key: String, value: String },
    /// A key is not a known parameter.
    KeyNotRecognized { key: String, value: String },
    /// A key was recognized but its value could not be parsed.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Parse a query string (with or without leading `?`).
pub fn parse(query: &str) -> ParseResult {
    let (request, warnings) = parse::parse_query(query);
    ParseResult { request, warnings }
}

/// Parse already-split form fields. Keys are matched case-insensitively;
/// values are taken as-is, without percent-decoding.
pub fn parse_fields<K, V, I>(fields: I) -> ParseResult
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: IntoIterator<Item = (K, V)>,
{
    let (request, warnings) = parse::parse_pairs(fields);
    ParseResult { request, warnings }
}
