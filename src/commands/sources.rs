use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::manifest::ManifestStore;
use crate::provider::SourceKind;
use crate::runtime::Runtime;

use super::config::Config;
use super::services::Services;

/// List every mod source, marking the ones enabled in the current pack.
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
    for kind in SourceKind::all() {
        let info = services.registry.source(kind)?.source();
        let enabled = manifest.as_ref().is_some_and(|m| m.sources.contains(&kind));
        lines.push(format!(
            "{} {:<12} {} <{}>",
            if enabled { "*" } else { " " },
            kind,
            info.description,
            info.url
        ));
    }
    Ok(lines)
}

#[tracing::instrument(skip(runtime))]
pub fn add<R: Runtime>(runtime: R, pack_dir: Option<PathBuf>, source: &str) -> Result<()> {
    let kind = source.parse::<SourceKind>()?;
    let config = Config::load(&runtime, pack_dir)?;
    run_add(&runtime, &config.pack_dir, kind)
}

pub(crate) fn run_add<R: Runtime + ?Sized>(runtime: &R, pack_dir: &Path, kind: SourceKind) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;
    if !manifest.add_source(kind) {
        println!("Source {} is already enabled.", kind);
        return Ok(());
    }
    store.save(&manifest)?;
    println!("Enabled source {}.", kind);
    Ok(())
}

#[tracing::instrument(skip(runtime))]
pub fn remove<R: Runtime>(runtime: R, pack_dir: Option<PathBuf>, source: &str) -> Result<()> {
    let kind = source.parse::<SourceKind>()?;
    let config = Config::load(&runtime, pack_dir)?;
    run_remove(&runtime, &config.pack_dir, kind)
}

/// Fails validation when the last source goes or a mod still uses it.
pub(crate) fn run_remove<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    kind: SourceKind,
) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;
    if !manifest.remove_source(kind) {
        println!("Source {} is not enabled.", kind);
        return Ok(());
    }
    store.save(&manifest)?;
    println!("Disabled source {}.", kind);
    Ok(())
}
