use anyhow::{Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::PackError;
use crate::manifest::{ManifestStore, ModRef, PackManifest};
use crate::provider::{ModVersion, ProviderRegistry, SourceKind};
use crate::resolution::{ask, select_one};
use crate::runtime::Runtime;
use crate::version::{VersionRange, VersionSpecifier, find_highest};

use super::config::Config;
use super::services::Services;

/// Print the mods in the pack, or with `available` the mods a source offers.
#[tracing::instrument(skip(runtime))]
pub async fn list<R: Runtime>(
    runtime: R,
    pack_dir: Option<PathBuf>,
    available: bool,
    source: Option<String>,
) -> Result<()> {
    let source = source.map(|s| s.parse::<SourceKind>()).transpose()?;
    let config = Config::load(&runtime, pack_dir)?;
    if !available {
        return run_list(&runtime, &config.pack_dir);
    }
    let services = Services::from_config(&config)?;
    run_list_available(&runtime, &config.pack_dir, &services, source).await
}

pub(crate) fn run_list<R: Runtime + ?Sized>(runtime: &R, pack_dir: &Path) -> Result<()> {
    let manifest = ManifestStore::new(runtime, pack_dir).load_required()?;
    if manifest.mods.is_empty() {
        println!("No mods in {}.", manifest.name);
        return Ok(());
    }
    for entry in &manifest.mods {
        println!("{}@{} ({})", entry.id, entry.version, entry.source);
    }
    Ok(())
}

/// Sources to browse: the one asked for, else the pack's, else all of them.
fn browse_sources<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    source: Option<SourceKind>,
) -> Result<Vec<SourceKind>> {
    if let Some(source) = source {
        return Ok(vec![source]);
    }
    Ok(match ManifestStore::new(runtime, pack_dir).load()? {
        Some(manifest) => manifest.sources.into_iter().collect(),
        None => SourceKind::all().to_vec(),
    })
}

pub(crate) async fn run_list_available<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
    source: Option<SourceKind>,
) -> Result<()> {
    for kind in browse_sources(runtime, pack_dir, source)? {
        let mods = services.registry.source(kind)?.mods().await?;
        println!("{} ({} mods):", kind, mods.len());
        for m in mods {
            println!("  {:<24} {} by {}", m.id, m.name, m.author);
        }
    }
    Ok(())
}

/// Releases of the mod that run on at least one of the pack's loader and
/// game version pairs.
fn compatible_releases(manifest: &PackManifest, versions: Vec<ModVersion>) -> Vec<ModVersion> {
    versions
        .into_iter()
        .filter(|v| {
            manifest
                .loaders
                .iter()
                .any(|&l| manifest.versions.iter().any(|g| v.supports(l, g)))
        })
        .collect()
}

/// Highest compatible release of `specifier.id` within its range.
async fn best_release(
    manifest: &PackManifest,
    registry: &ProviderRegistry,
    source: SourceKind,
    specifier: &VersionSpecifier,
) -> Result<ModVersion> {
    let provider = registry.source(source)?;
    // Surfaces NotFound before the version listing
    provider.get_mod(&specifier.id).await?;

    let releases = compatible_releases(manifest, provider.versions(&specifier.id).await?);
    debug!(
        "{} compatible release(s) of {} on {}",
        releases.len(),
        specifier.id,
        source
    );
    find_highest(&specifier.range, &releases)
        .cloned()
        .ok_or_else(|| PackError::no_compatible(&specifier.id, specifier.range.as_str()).into())
}

/// Pick the source for a new mod: explicit, the only enabled one, or ask.
fn choose_source<R: Runtime + ?Sized>(
    runtime: &R,
    manifest: &PackManifest,
    source: Option<SourceKind>,
) -> Result<SourceKind> {
    let source = match source {
        Some(source) => source,
        None => {
            let enabled: Vec<SourceKind> = manifest.sources.iter().copied().collect();
            match enabled.as_slice() {
                [only] => *only,
                _ => select_one(runtime, "Which source provides this mod?", &enabled)?,
            }
        }
    };
    if !manifest.sources.contains(&source) {
        bail!(
            "Source {} is not enabled in this pack. Run `packlab sources add {}` first.",
            source,
            source
        );
    }
    Ok(source)
}

/// Ask for a specifier until one parses.
fn ask_specifier<R: Runtime + ?Sized>(runtime: &R) -> Result<VersionSpecifier> {
    loop {
        let answer = ask(runtime, "Which mod should be added? (id or id@range)", None)?;
        match VersionSpecifier::parse(&answer) {
            Ok(specifier) => return Ok(specifier),
            Err(e) if e.is_recoverable_input() => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Add a mod by `id` or `id@range`, asking for one when none is given.
#[tracing::instrument(skip(runtime))]
pub async fn add<R: Runtime>(
    runtime: R,
    pack_dir: Option<PathBuf>,
    specifier: Option<&str>,
    source: Option<String>,
) -> Result<()> {
    let specifier = match specifier {
        Some(specifier) => VersionSpecifier::parse(specifier)?,
        None => ask_specifier(&runtime)?,
    };
    let source = source.map(|s| s.parse::<SourceKind>()).transpose()?;
    let config = Config::load(&runtime, pack_dir)?;
    let services = Services::from_config(&config)?;
    run_add(&runtime, &config.pack_dir, &services, &specifier, source).await
}

pub(crate) async fn run_add<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
    specifier: &VersionSpecifier,
    source: Option<SourceKind>,
) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;

    if let Some(existing) = manifest.find_mod(&specifier.id) {
        bail!(
            "Mod {} is already in the pack ({}@{}). Use `packlab mods update` instead.",
            specifier.id,
            existing.id,
            existing.version
        );
    }

    let source = choose_source(runtime, &manifest, source)?;
    let release = best_release(&manifest, &services.registry, source, specifier).await?;
    info!("Resolved {} to {}", specifier, release.version);

    manifest.upsert_mod(ModRef::new(specifier, source));
    store.save(&manifest)?;
    println!("Added {} (currently {}) from {}", specifier, release.version, source);
    Ok(())
}

#[tracing::instrument(skip(runtime))]
pub fn remove<R: Runtime>(runtime: R, pack_dir: Option<PathBuf>, id: &str) -> Result<()> {
    let config = Config::load(&runtime, pack_dir)?;
    run_remove(&runtime, &config.pack_dir, id)
}

pub(crate) fn run_remove<R: Runtime + ?Sized>(runtime: &R, pack_dir: &Path, id: &str) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;
    let Some(removed) = manifest.remove_mod(id) else {
        return Err(PackError::not_found("Mod", id).into());
    };
    store.save(&manifest)?;
    println!("Removed {}@{}", removed.id, removed.version);
    Ok(())
}

/// Change the range of a mod already in the pack.
///
/// `id@range` replaces the range; a bare `id` pins the mod to a caret range
/// on its highest compatible release.
#[tracing::instrument(skip(runtime))]
pub async fn update<R: Runtime>(runtime: R, pack_dir: Option<PathBuf>, specifier: &str) -> Result<()> {
    let specifier = VersionSpecifier::parse(specifier)?;
    let config = Config::load(&runtime, pack_dir)?;
    let services = Services::from_config(&config)?;
    run_update(&runtime, &config.pack_dir, &services, &specifier).await
}

pub(crate) async fn run_update<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
    specifier: &VersionSpecifier,
) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;
    let Some(existing) = manifest.find_mod(&specifier.id).cloned() else {
        return Err(PackError::not_found("Mod", &specifier.id).into());
    };

    let release = best_release(&manifest, &services.registry, existing.source, specifier).await?;
    let updated = if specifier.range.is_any() {
        let pinned = VersionRange::parse(&format!("^{}", release.version))?;
        VersionSpecifier::new(specifier.id.clone(), pinned)
    } else {
        specifier.clone()
    };

    let entry = ModRef::new(&updated, existing.source);
    if entry == existing {
        println!("{}@{} is up to date.", existing.id, existing.version);
        return Ok(());
    }
    manifest.upsert_mod(entry);
    store.save(&manifest)?;
    println!(
        "{}: {} -> {} (currently {})",
        existing.id, existing.version, updated.range, release.version
    );
    Ok(())
}
