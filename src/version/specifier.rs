//! `id@range` specifier parsing.

use std::fmt;
use std::str::FromStr;

use log::warn;

use super::range::VersionRange;
use crate::error::PackError;

/// A target identifier plus the range of versions acceptable for it.
/// Format: "id" or "id@range"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpecifier {
    pub id: String,
    pub range: VersionRange,
}

impl VersionSpecifier {
    pub fn new(id: impl Into<String>, range: VersionRange) -> Self {
        Self {
            id: id.into(),
            range,
        }
    }

    /// Parse `input`, logging a warning that names the bad input on failure.
    pub fn parse(input: &str) -> Result<Self, PackError> {
        let result = parse_specifier(input);
        if let Err(e) = &result {
            warn!("{}", e);
        }
        result
    }

    /// Parse `input`, returning `None` (after the warning) when it is rejected.
    pub fn parse_or_warn(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }
}

fn parse_specifier(input: &str) -> Result<VersionSpecifier, PackError> {
    let input = input.trim();
    let normalized = if input.contains('@') {
        input.to_string()
    } else {
        format!("{}@*", input)
    };

    let tokens: Vec<&str> = normalized.split('@').collect();
    let [id, range] = tokens.as_slice() else {
        return Err(PackError::MalformedSpecifier(input.to_string()));
    };

    if id.trim().is_empty() {
        return Err(PackError::MalformedSpecifier(input.to_string()));
    }

    let range = VersionRange::parse(range)?;
    Ok(VersionSpecifier::new(id.trim(), range))
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.range)
    }
}

impl FromStr for VersionSpecifier {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
