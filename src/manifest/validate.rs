//! Manifest invariants.

use std::collections::HashSet;

use anyhow::Result;
use log::debug;

use super::PackManifest;
use crate::error::{PackError, ValidationError};
use crate::provider::ProviderRegistry;
use crate::version::{VersionRange, find_matching, is_valid_version};

/// Check every structural invariant, collecting all violations.
pub fn validate(manifest: &PackManifest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if manifest.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if manifest.sources.is_empty() {
        errors.push(ValidationError::NoSources);
    }
    if manifest.loaders.is_empty() {
        errors.push(ValidationError::NoLoaders);
    }
    if manifest.versions.is_empty() {
        errors.push(ValidationError::NoGameVersions);
    }

    for version in &manifest.versions {
        if !is_valid_version(version) {
            errors.push(ValidationError::InvalidGameVersion(version.clone()));
        }
    }

    for (loader, bindings) in &manifest.loader_versions {
        if !manifest.loaders.contains(loader) {
            errors.push(ValidationError::LoaderNotEnabled(loader.to_string()));
        }
        for game_version in bindings.keys() {
            if !manifest.versions.contains(game_version) {
                errors.push(ValidationError::UnknownGameVersionBinding {
                    loader: loader.to_string(),
                    game_version: game_version.clone(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    for entry in &manifest.mods {
        if !seen.insert(entry.id.as_str()) {
            errors.push(ValidationError::DuplicateMod(entry.id.clone()));
        }
        if let Err(e) = VersionRange::parse(&entry.version) {
            errors.push(ValidationError::InvalidModSpecifier {
                id: entry.id.clone(),
                reason: e.to_string(),
            });
        }
        if !manifest.sources.contains(&entry.source) {
            errors.push(ValidationError::SourceNotEnabled {
                mod_id: entry.id.clone(),
                source: entry.source.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// [`validate`], then ask each mod's source whether any published release
/// satisfies the mod's range. Fetch failures are returned as-is.
#[tracing::instrument(skip(manifest, registry))]
pub async fn validate_against_sources(
    manifest: &PackManifest,
    registry: &ProviderRegistry,
) -> Result<()> {
    manifest.check()?;

    let mut errors = Vec::new();
    for entry in &manifest.mods {
        let specifier = entry.specifier()?;
        let source = registry.source(entry.source)?;
        let versions = source.versions(&entry.id).await?;
        let matching = find_matching(&specifier.range, &versions);
        debug!(
            "{}: {} of {} versions match '{}'",
            entry.id,
            matching.len(),
            versions.len(),
            specifier.range
        );
        if matching.is_empty() {
            errors.push(ValidationError::NoMatchingModVersion {
                mod_id: entry.id.clone(),
                range: entry.version.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PackError::ValidationFailure(errors).into())
    }
}
