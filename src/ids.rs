//! Composite resource ids of the form `book:page:line:token[:len]`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parses up to `ids.len()` leading colon separated integers of `id` into
/// `ids` and returns how many were parsed. Parsing stops at the first
/// segment that is not a number; anything after it is ignored.
pub fn parse_ids(id: &str, ids: &mut [i64]) -> usize {
    let mut n = 0;
    for (slot, segment) in ids.iter_mut().zip(id.split(':')) {
        match segment.parse::<i64>() {
            Ok(value) => {
                *slot = value;
                n += 1;
            }
            Err(_) => break,
        }
    }
    n
}

/// Parses a single numeric id (book, user or project).
pub fn parse_single_id(id: &str) -> Result<i64> {
    let mut bid = [0];
    if parse_ids(id, &mut bid) != 1 {
        return Err(Error::InvalidId(id.to_string()));
    }
    Ok(bid[0])
}

/// Splits a trailing `/N` page modifier off an id. `1:2/3` addresses the
/// page three pages after page 2 and `1:2/-1` the page before it.
pub fn split_modifier(id: &str) -> (&str, i64) {
    if let Some((head, tail)) = id.split_once('/') {
        if let Ok(m) = tail.parse::<i64>() {
            return (head, m);
        }
    }
    (id, 0)
}

/// Interprets command line corrections with JSON style escapes (`\n`,
/// `\t`, `\u00e4`). Strings with invalid escapes are returned unchanged.
pub fn unescape(arg: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", arg)).unwrap_or_else(|_| arg.to_string())
}

/// A resource addressed by a composite id. The number of parsed segments
/// decides which kind of resource is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceId {
    Book(i64),
    Page { book: i64, page: i64 },
    Line { book: i64, page: i64, line: i64 },
    Token { book: i64, page: i64, line: i64, token: i64 },
    TokenLen { book: i64, page: i64, line: i64, token: i64, len: i64 },
}

impl ResourceId {
    /// Parses at most `max` segments, so `delete` can refuse token ids
    /// while `print` accepts all five forms.
    pub fn parse_max(id: &str, max: usize) -> Result<Self> {
        let mut ids = [0i64; 5];
        let n = parse_ids(id, &mut ids[..max.min(5)]);
        let [b, p, l, t, len] = ids;
        match n {
            1 => Ok(ResourceId::Book(b)),
            2 => Ok(ResourceId::Page { book: b, page: p }),
            3 => Ok(ResourceId::Line { book: b, page: p, line: l }),
            4 => Ok(ResourceId::Token { book: b, page: p, line: l, token: t }),
            5 => Ok(ResourceId::TokenLen { book: b, page: p, line: l, token: t, len }),
            _ => Err(Error::InvalidId(id.to_string())),
        }
    }

    pub fn book(&self) -> i64 {
        match *self {
            ResourceId::Book(book)
            | ResourceId::Page { book, .. }
            | ResourceId::Line { book, .. }
            | ResourceId::Token { book, .. }
            | ResourceId::TokenLen { book, .. } => book,
        }
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceId::parse_max(s, 5)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ResourceId::Book(b) => write!(f, "{}", b),
            ResourceId::Page { book, page } => write!(f, "{}:{}", book, page),
            ResourceId::Line { book, page, line } => write!(f, "{}:{}:{}", book, page, line),
            ResourceId::Token { book, page, line, token } => {
                write!(f, "{}:{}:{}:{}", book, page, line, token)
            }
            ResourceId::TokenLen { book, page, line, token, len } => {
                write!(f, "{}:{}:{}:{}:{}", book, page, line, token, len)
            }
        }
    }
}
