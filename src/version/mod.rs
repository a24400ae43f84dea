//! Version specifiers, ranges and matching.

mod matcher;
mod range;
mod specifier;

pub use matcher::{Versioned, find_highest, find_matching};
pub use range::{VersionRange, coerce_version, is_valid_version, parse_version};
pub use specifier::VersionSpecifier;
