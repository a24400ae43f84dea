use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::manifest::ManifestStore;
use crate::provider::LoaderKind;
use crate::resolution::{LoaderResolver, Strategy};
use crate::runtime::Runtime;

use super::config::Config;
use super::services::Services;

/// List every mod loader, marking the ones enabled in the current pack
/// together with their bound versions.
#[tracing::instrument(skip(runtime))]
pub fn list<R: Runtime>(runtime: R, pack_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load(&runtime, pack_dir)?;
    let services = Services::from_config(&config)?;
    for line in list_lines(&runtime, &config.pack_dir, &services)? {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn list_lines<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
) -> Result<Vec<String>> {
    let manifest = ManifestStore::new(runtime, pack_dir).load()?;
    let mut lines = Vec::new();
    for kind in LoaderKind::all() {
        let info = services.registry.loader(kind)?.loader();
        let enabled = manifest.as_ref().is_some_and(|m| m.loaders.contains(&kind));
        lines.push(format!(
            "{} {:<12} {} <{}>",
            if enabled { "*" } else { " " },
            kind,
            info.description,
            info.url
        ));
        if let Some(bindings) = manifest.as_ref().and_then(|m| m.loader_versions.get(&kind)) {
            for (game_version, version) in bindings {
                lines.push(format!("    {} -> {}", game_version, version));
            }
        }
    }
    Ok(lines)
}

/// Enable a loader and bind a version of it for every game version.
#[tracing::instrument(skip(runtime))]
pub async fn add<R: Runtime>(
    runtime: R,
    pack_dir: Option<PathBuf>,
    loader: &str,
    strategy: Option<Strategy>,
) -> Result<()> {
    let kind = loader.parse::<LoaderKind>()?;
    let config = Config::load(&runtime, pack_dir)?;
    let services = Services::from_config(&config)?;
    run_add(&runtime, &config.pack_dir, &services, kind, strategy).await
}

pub(crate) async fn run_add<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
    kind: LoaderKind,
    strategy: Option<Strategy>,
) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;
    if !manifest.add_loader(kind) {
        println!("Loader {} is already enabled.", kind);
        return Ok(());
    }

    let resolver = LoaderResolver::new(runtime, &services.registry).with_strategy(strategy);
    resolver.resolve_missing(&mut manifest).await?;

    store.save(&manifest)?;
    println!("Enabled loader {}.", kind);
    Ok(())
}

#[tracing::instrument(skip(runtime))]
pub fn remove<R: Runtime>(runtime: R, pack_dir: Option<PathBuf>, loader: &str) -> Result<()> {
    let kind = loader.parse::<LoaderKind>()?;
    let config = Config::load(&runtime, pack_dir)?;
    run_remove(&runtime, &config.pack_dir, kind)
}

pub(crate) fn run_remove<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    kind: LoaderKind,
) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;
    if !manifest.remove_loader(kind) {
        println!("Loader {} is not enabled.", kind);
        return Ok(());
    }
    store.save(&manifest)?;
    println!("Disabled loader {}.", kind);
    Ok(())
}
