//! Matching candidate versions against a range.

use super::range::{VersionRange, parse_version};

/// Anything that carries a version string that can be matched.
pub trait Versioned {
    fn version(&self) -> &str;
}

impl Versioned for String {
    fn version(&self) -> &str {
        self
    }
}

impl Versioned for &str {
    fn version(&self) -> &str {
        self
    }
}

/// Return the candidates whose version satisfies `range`, in input order.
pub fn find_matching<'a, T: Versioned>(range: &VersionRange, candidates: &'a [T]) -> Vec<&'a T> {
    candidates
        .iter()
        .filter(|c| range.matches_str(c.version()))
        .collect()
}

/// The candidate with the highest version satisfying `range`.
///
/// Ties keep the earliest candidate so upstream ordering still decides
/// between equal versions.
pub fn find_highest<'a, T: Versioned>(range: &VersionRange, candidates: &'a [T]) -> Option<&'a T> {
    let mut best: Option<(&'a T, semver::Version)> = None;

    for candidate in candidates {
        let Some(version) = parse_version(candidate.version()) else {
            continue;
        };
        if !range.matches(&version) {
            continue;
        }
        match &best {
            Some((_, current)) if *current >= version => {}
            _ => best = Some((candidate, version)),
        }
    }

    best.map(|(candidate, _)| candidate)
}
