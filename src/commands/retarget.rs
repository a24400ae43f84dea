use anyhow::{Result, bail};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::catalog::GameVersionKind;
use crate::error::PackError;
use crate::manifest::{ManifestStore, PackManifest};
use crate::provider::ProviderRegistry;
use crate::resolution::{LoaderResolver, Strategy};
use crate::runtime::Runtime;
use crate::version::is_valid_version;

use super::config::Config;
use super::services::Services;

/// Point the pack at a single game version and bind loader versions for it.
#[tracing::instrument(skip(runtime))]
pub async fn retarget<R: Runtime>(
    runtime: R,
    pack_dir: Option<PathBuf>,
    game_version: &str,
    strategy: Option<Strategy>,
) -> Result<()> {
    let config = Config::load(&runtime, pack_dir)?;
    let services = Services::from_config(&config)?;
    run(&runtime, &config.pack_dir, &services, game_version, strategy).await
}

/// Mods with no release for any of the pack's loaders on its game versions.
async fn incompatible_mods(
    manifest: &PackManifest,
    registry: &ProviderRegistry,
) -> Result<Vec<String>> {
    let mut incompatible = Vec::new();
    for entry in &manifest.mods {
        let source = registry.source(entry.source)?;
        let versions = source.versions(&entry.id).await?;
        let compatible = versions.iter().any(|v| {
            manifest
                .loaders
                .iter()
                .any(|&l| manifest.versions.iter().any(|g| v.supports(l, g)))
        });
        if !compatible {
            incompatible.push(entry.id.clone());
        }
    }
    Ok(incompatible)
}

#[tracing::instrument(skip(runtime, services))]
pub(crate) async fn run<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
    game_version: &str,
    strategy: Option<Strategy>,
) -> Result<()> {
    if !is_valid_version(game_version) {
        return Err(PackError::not_found("Game version", game_version).into());
    }

    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;

    let catalog = services.catalog.fetch().await?;
    match catalog.find(game_version) {
        Some(entry) if entry.kind == GameVersionKind::Release => {}
        Some(entry) => bail!("Minecraft {} is a {} build, not a release", game_version, entry.kind),
        None => return Err(PackError::not_found("Game version", game_version).into()),
    }

    manifest.retarget(game_version);
    let resolver = LoaderResolver::new(runtime, &services.registry).with_strategy(strategy);
    let added = resolver.resolve_missing(&mut manifest).await?;
    info!("Bound {} loader version(s) for {}", added, game_version);

    for id in incompatible_mods(&manifest, &services.registry).await? {
        warn!("Mod '{}' has no release for Minecraft {}", id, game_version);
    }

    store.save(&manifest)?;
    println!("{} now targets Minecraft {}", manifest.name, game_version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{
        MemoryFiles, SAMPLE_MANIFEST, modrinth_with, services_with,
    };
    use crate::error::pack_error;
    use crate::manifest::MANIFEST_FILE;
    use crate::provider::LoaderKind;
    use crate::runtime::MockRuntime;
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_retarget_binds_new_game_version() {
        let path = Path::new("/packs/demo").join(MANIFEST_FILE);
        let files = MemoryFiles::default();
        files.put(&path, SAMPLE_MANIFEST);
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);

        let mut services = services_with(&["1.20.4", "1.20.1"], &["0.15.11"]);
        services
            .registry
            .register_source(modrinth_with("sodium", &["0.5.3"]));

        run(
            &runtime,
            Path::new("/packs/demo"),
            &services,
            "1.20.4",
            Some(Strategy::Latest),
        )
        .await
        .unwrap();

        let manifest = files.manifest(&path);
        assert_eq!(manifest.versions, BTreeSet::from(["1.20.4".to_string()]));
        assert_eq!(manifest.loader_version(LoaderKind::Fabric, "1.20.4"), Some("0.15.11"));
        assert_eq!(manifest.loader_version(LoaderKind::Fabric, "1.20.1"), None);
    }

    #[tokio::test]
    async fn test_retarget_unknown_game_version() {
        let path = Path::new("/packs/demo").join(MANIFEST_FILE);
        let files = MemoryFiles::default();
        files.put(&path, SAMPLE_MANIFEST);
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);

        let services = services_with(&["1.20.1"], &["0.15.11"]);
        for target in ["1.99.0", "23w13a"] {
            let err = run(&runtime, Path::new("/packs/demo"), &services, target, None)
                .await
                .unwrap_err();
            assert!(matches!(
                pack_error(&err),
                Some(PackError::NotFound { kind: "Game version", .. })
            ));
        }
        assert_eq!(files.get(&path).as_deref(), Some(SAMPLE_MANIFEST));
    }
}
