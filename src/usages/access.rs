//! Read/write access classification for references to variables
//!
//! The lexical analysis here stands in for a language's own "is this reference
//! assigned to" query; the final decision is [`resolve_access`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Access kind of one reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Access {
    pub read: bool,
    pub write: bool,
}

impl Access {
    pub const READ: Access = Access {
        read: true,
        write: false,
    };
    pub const WRITE: Access = Access {
        read: false,
        write: true,
    };
    pub const READ_WRITE: Access = Access {
        read: true,
        write: true,
    };

    /// Union of both accesses
    pub fn union(self, other: Access) -> Access {
        Access {
            read: self.read || other.read,
            write: self.write || other.write,
        }
    }
}

/// What the lexical layer found out about one reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSite {
    pub accessed_for_reading: bool,
    pub accessed_for_writing: bool,
    pub resolves_to_setter: bool,
}

/// Final access of a reference.
///
/// A reference is a write when it is assigned to. When the language layer saw
/// no write but the reference resolves to a property setter, it is forced to
/// write-only.
pub fn resolve_access(site: ReferenceSite) -> Access {
    if !site.accessed_for_writing && site.resolves_to_setter {
        return Access::WRITE;
    }
    Access {
        read: site.accessed_for_reading,
        write: site.accessed_for_writing,
    }
}

static PLAIN_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*=(?:[^=>~]|$)").expect("valid regex"));
static COMPOUND_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:<<=|>>=|\*\*=|[-+*/%|&^]=|\?\?=)").expect("valid regex"));
static INC_DEC_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:\+\+|--)").expect("valid regex"));
static INC_DEC_BEFORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\+\+|--)\s*$").expect("valid regex"));
static CALL_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\(").expect("valid regex"));

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Widen `start..end` to the identifier that contains it.
fn identifier_bounds(line: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = line.as_bytes();
    let mut s = start.min(bytes.len());
    let mut e = end.min(bytes.len());
    while s > 0 && is_ident_byte(bytes[s - 1]) {
        s -= 1;
    }
    while e < bytes.len() && is_ident_byte(bytes[e]) {
        e += 1;
    }
    (s, e)
}

/// Setter names recognized for `name`: `set_name` and `setName`.
pub(crate) fn is_setter_of(ident: &str, name: &str) -> bool {
    if ident.strip_prefix("set_") == Some(name) {
        return true;
    }
    let mut chars = name.chars();
    match (ident.strip_prefix("set"), chars.next()) {
        (Some(rest), Some(first)) => {
            let capitalized: String = first.to_uppercase().chain(chars).collect();
            rest == capitalized
        }
        _ => false,
    }
}

/// Analyze the reference to `name` matched at `start..end` of `line`.
///
/// Returns `None` when the identifier there is neither `name` nor one of its
/// setters, i.e. the match is not a reference to the variable.
pub fn analyze_reference(line: &str, start: usize, end: usize, name: &str) -> Option<ReferenceSite> {
    let (s, e) = identifier_bounds(line, start, end);
    let ident = line.get(s..e)?;
    let before = line.get(..s)?;
    let after = line.get(e..)?;

    if ident != name {
        if is_setter_of(ident, name) && CALL_AFTER.is_match(after) {
            return Some(ReferenceSite {
                accessed_for_reading: false,
                accessed_for_writing: false,
                resolves_to_setter: true,
            });
        }
        return None;
    }

    let plain = PLAIN_ASSIGN.is_match(after);
    let compound = COMPOUND_ASSIGN.is_match(after)
        || INC_DEC_AFTER.is_match(after)
        || INC_DEC_BEFORE.is_match(before);

    Some(ReferenceSite {
        accessed_for_reading: !plain || compound,
        accessed_for_writing: plain || compound,
        resolves_to_setter: false,
    })
}
