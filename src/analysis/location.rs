//! Source locations for update sites
//!
//! Locations follow the ESTree `loc` convention: 1-based lines and 0-based
//! columns counted in UTF-16 code units. They render as `"<line>.<column>"`
//! and order numerically, line first.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A line/column position in the original source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The `"<line>.<column>"` key used in the update-site list
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self> {
        let invalid = || Error::InvalidLocation {
            key: key.to_string(),
        };
        let (line, column) = key.split_once('.').ok_or_else(invalid)?;
        let line = line.parse::<u32>().map_err(|_| invalid())?;
        let column = column.parse::<u32>().map_err(|_| invalid())?;
        Ok(Location { line, column })
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Maps byte offsets (as stored in oxc spans) to line/column locations
#[derive(Debug, Clone)]
pub struct LineIndex<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Number of lines as seen by splitting the source on `\n`
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolve a byte offset; offsets past the end clamp to the end of the source
    pub fn location(&self, offset: u32) -> Location {
        let offset = (offset as usize).min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = self
            .source
            .get(start..offset)
            .map(|text| text.encode_utf16().count())
            .unwrap_or(offset - start);
        Location::new(line as u32 + 1, column as u32)
    }
}
