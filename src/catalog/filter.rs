use crate::version::is_valid_version;

use super::{GameVersion, GameVersionKind};

/// Ids of catalog entries that are valid semantic versions, in catalog order.
///
/// With a `kind`, entries of other kinds are dropped first.
pub fn filter_valid(catalog: &[GameVersion], kind: Option<GameVersionKind>) -> Vec<String> {
    catalog
        .iter()
        .filter(|v| kind.is_none_or(|k| v.kind == k))
        .filter(|v| is_valid_version(&v.id))
        .map(|v| v.id.clone())
        .collect()
}
