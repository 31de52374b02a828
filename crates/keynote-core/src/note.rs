use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A construction-note identifier.
///
/// Note identifiers are positive integers on the drawing ("see note 12").
/// Sorting is numeric via the derived `Ord`, so `2 < 10` (not lexical).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NoteId(u32);

impl NoteId {
    /// Creates a note id from a known-positive number.
    ///
    /// Returns `None` for zero; note slots on a sheet are 1-based.
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error produced when raw marker text does not name a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteIdParseError {
    raw: String,
}

impl NoteIdParseError {
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for NoteIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a positive integer note id: {:?}", self.raw)
    }
}

impl std::error::Error for NoteIdParseError {}

impl FromStr for NoteId {
    type Err = NoteIdParseError;

    /// Parses raw attribute text into a note id.
    ///
    /// Attribute text frequently carries stray whitespace, so ASCII
    /// whitespace is trimmed first. Anything that is not a plain positive
    /// decimal integer (signs, `0`, embedded text, overflow) is rejected;
    /// callers treat rejected markers as carrying no note (they are kept in
    /// scan output but never reach a sheet's result).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches(|c: char| c.is_ascii_whitespace());
        let err = || NoteIdParseError { raw: s.to_owned() };

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let value: u32 = trimmed.parse().map_err(|_| err())?;
        NoteId::new(value).ok_or_else(err)
    }
}
