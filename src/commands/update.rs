use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use crate::manifest::{ManifestStore, validate_against_sources};
use crate::resolution::{LoaderResolver, Strategy};
use crate::runtime::Runtime;

use super::config::Config;
use super::services::Services;

/// Re-resolve every loader binding and re-check every mod against its source.
///
/// Runs unattended with the `latest` strategy unless another one is given.
#[tracing::instrument(skip(runtime))]
pub async fn update<R: Runtime>(
    runtime: R,
    pack_dir: Option<PathBuf>,
    strategy: Option<Strategy>,
) -> Result<()> {
    let config = Config::load(&runtime, pack_dir)?;
    let services = Services::from_config(&config)?;
    run(&runtime, &config.pack_dir, &services, strategy).await
}

#[tracing::instrument(skip(runtime, services))]
pub(crate) async fn run<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
    strategy: Option<Strategy>,
) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;

    let loaders: Vec<_> = manifest.loaders.iter().copied().collect();
    let versions: Vec<_> = manifest.versions.iter().cloned().collect();
    let resolver = LoaderResolver::new(runtime, &services.registry)
        .with_strategy(Some(strategy.unwrap_or(Strategy::Latest)));
    let bindings = resolver.resolve(&loaders, &versions).await?;

    let mut changed = 0;
    for (loader, per_game) in &bindings {
        for (game_version, version) in per_game {
            let previous = manifest.loader_version(*loader, game_version);
            if previous == Some(version.as_str()) {
                continue;
            }
            println!(
                "{} for {}: {} -> {}",
                loader,
                game_version,
                previous.unwrap_or("(none)"),
                version
            );
            changed += 1;
        }
    }
    manifest.loader_versions = bindings;

    validate_against_sources(&manifest, &services.registry).await?;
    store.save(&manifest)?;

    info!("{} loader binding(s) changed", changed);
    if changed == 0 {
        println!("Everything is up to date.");
    }
    Ok(())
}
