//! Version range expressions.
//!
//! Ranges are written the way modpack authors know them from npm-style tools
//! and translated onto [`semver::VersionReq`]:
//!
//! - `*`, `x`, `X`, all-wildcard versions like `x.x` or `*.*.*`, or an empty
//!   string match any valid version; `<*` and `>*` match none and are rejected
//! - `1.2.3` / `=1.2.3` / `v1.2.3` match exactly
//! - `>`, `>=`, `<`, `<=` comparators, caret `^1.2.3` and tilde `~1.2.3`
//! - x-ranges and partials: `1.x`, `1.2.*`, `1`, `1.2`
//! - hyphen ranges: `1.0.0 - 2.0.0` (inclusive)
//! - comparator sets separated by whitespace or commas (AND)
//! - alternatives separated by `||` (OR)

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::PackError;

/// A parsed, validated version range that remembers how the user wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    raw: String,
    matcher: RangeMatcher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RangeMatcher {
    Any,
    AnyOf(Vec<VersionReq>),
}

impl VersionRange {
    /// The `*` range.
    pub fn any() -> Self {
        Self {
            raw: "*".to_string(),
            matcher: RangeMatcher::Any,
        }
    }

    pub fn parse(input: &str) -> Result<Self, PackError> {
        let raw = input.trim();
        let mut reqs = Vec::new();

        for alternative in raw.split("||") {
            match translate_alternative(alternative)? {
                Some(req) => reqs.push(req),
                None => {
                    return Ok(Self {
                        raw: raw_or_star(raw),
                        matcher: RangeMatcher::Any,
                    });
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            matcher: RangeMatcher::AnyOf(reqs),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_any(&self) -> bool {
        matches!(self.matcher, RangeMatcher::Any)
    }

    pub fn matches(&self, version: &Version) -> bool {
        match &self.matcher {
            RangeMatcher::Any => true,
            RangeMatcher::AnyOf(reqs) => reqs.iter().any(|req| req.matches(version)),
        }
    }

    /// Match a version string; strings that are not semantic versions never match.
    pub fn matches_str(&self, version: &str) -> bool {
        parse_version(version).is_some_and(|v| self.matches(&v))
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionRange {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = PackError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.raw
    }
}

/// Parse a strict semantic version, accepting a leading `v`.
pub fn parse_version(input: &str) -> Option<Version> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// True when `input` is a strict semantic version (`1.20.1`, not `1.20` or `23w13a`).
pub fn is_valid_version(input: &str) -> bool {
    parse_version(input).is_some()
}

/// Lenient parse for game versions: `1.21` reads as `1.21.0`, `1` as `1.0.0`.
///
/// Only used for compatibility bounds, never for validating user input.
pub fn coerce_version(input: &str) -> Option<Version> {
    if let Some(version) = parse_version(input) {
        return Some(version);
    }
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let (core, rest) = match trimmed.find(['-', '+']) {
        Some(i) => trimmed.split_at(i),
        None => (trimmed, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    Version::parse(&format!("{}{}", padded, rest)).ok()
}

fn raw_or_star(raw: &str) -> String {
    if raw.is_empty() {
        "*".to_string()
    } else {
        raw.to_string()
    }
}

/// Translate one `||` alternative. `None` means it matches everything.
fn translate_alternative(alternative: &str) -> Result<Option<VersionReq>, PackError> {
    let alternative = alternative.trim();
    let invalid = |detail: String| PackError::InvalidRange(detail);

    if is_wildcard(alternative) {
        return Ok(None);
    }

    let tokens = match split_hyphen(alternative) {
        Some((start, end)) => vec![format!(">={}", start), format!("<={}", end)],
        None => comparator_tokens(alternative),
    };
    let mut comparators = Vec::new();
    for token in &tokens {
        if let Some(comparator) = normalize_comparator(token)? {
            comparators.push(comparator);
        }
    }

    if comparators.is_empty() {
        return Ok(None);
    }

    let joined = comparators.join(", ");
    VersionReq::parse(&joined)
        .map(Some)
        .map_err(|e| invalid(format!("{} ({})", alternative, e)))
}

/// `*`, `x`, `x.x`, `*.*.*` and the empty string.
fn is_wildcard(s: &str) -> bool {
    s.is_empty() || s.split('.').all(is_wildcard_part)
}

fn split_hyphen(s: &str) -> Option<(&str, &str)> {
    let (start, end) = s.split_once(" - ")?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() || end.contains(" - ") {
        return None;
    }
    Some((start, end))
}

/// Split on whitespace and commas, re-attaching bare operators to the
/// version that follows them (`>= 1.2` becomes `>=1.2`).
fn comparator_tokens(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending_op = String::new();

    for piece in s.split(|c: char| c.is_whitespace() || c == ',') {
        if piece.is_empty() {
            continue;
        }
        if piece.chars().all(is_operator_char) {
            pending_op.push_str(piece);
            continue;
        }
        tokens.push(format!("{}{}", pending_op, piece));
        pending_op.clear();
    }

    if !pending_op.is_empty() {
        // A dangling operator is kept so semver reports it.
        tokens.push(pending_op);
    }

    tokens
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '^' | '~')
}

/// Rewrite a single comparator into `semver` syntax.
///
/// Bare versions are exact matches (semver alone would treat them as caret).
/// Returns `None` for comparators that match everything, such as `>=*`.
/// `<*` and `>*` match nothing and are rejected.
fn normalize_comparator(token: &str) -> Result<Option<String>, PackError> {
    let op_len = token.chars().take_while(|c| is_operator_char(*c)).count();
    let (op, version) = token.split_at(op_len);
    let version = strip_v(version);

    if version.is_empty() && !op.is_empty() {
        // Let semver report the missing version.
        return Ok(Some(token.to_string()));
    }

    let parts: Vec<&str> = version.split('.').collect();
    let fixed: Vec<&str> = parts
        .iter()
        .copied()
        .take_while(|part| !is_wildcard_part(part))
        .collect();

    if fixed.is_empty() {
        return match op {
            "<" | ">" => Err(PackError::InvalidRange(format!(
                "{} matches no version",
                token
            ))),
            _ => Ok(None),
        };
    }

    let has_wildcard = fixed.len() < parts.len();
    Ok(Some(match op {
        "" if has_wildcard => version.to_string(),
        "" => format!("={}", version),
        _ if has_wildcard => format!("{}{}", op, fixed.join(".")),
        _ => format!("{}{}", op, version),
    }))
}

fn is_wildcard_part(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}

fn strip_v(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('v').unwrap_or(s)
}
