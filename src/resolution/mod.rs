//! Binding loader versions to game versions.
//!
//! For every loader in a pack the user picks a strategy, then each supported
//! game version gets one loader version:
//!
//! - `manual`: type a version per game version
//! - `latest`: highest compatible release from the loader's catalog
//! - `interactive`: pick from the compatible releases
//!
//! A fixed strategy (`--strategy`, or `latest` for `update`) skips the
//! strategy prompt entirely.

mod prompt;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use log::{debug, info, warn};

use crate::error::PackError;
use crate::manifest::PackManifest;
use crate::provider::{LoaderKind, LoaderVersion, ModLoader, ProviderRegistry};
use crate::runtime::Runtime;
use crate::version::{VersionRange, find_highest, is_valid_version};

pub use prompt::{ask, select_non_empty, select_one};

/// loader -> game version -> loader version
pub type LoaderBindings = BTreeMap<LoaderKind, BTreeMap<String, String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Manual,
    Latest,
    Interactive,
}

impl Strategy {
    pub fn all() -> [Strategy; 3] {
        [Strategy::Manual, Strategy::Latest, Strategy::Interactive]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Manual => write!(f, "manual"),
            Strategy::Latest => write!(f, "latest"),
            Strategy::Interactive => write!(f, "interactive"),
        }
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Strategy::Manual),
            "latest" => Ok(Strategy::Latest),
            "interactive" => Ok(Strategy::Interactive),
            _ => anyhow::bail!(
                "Unknown resolution strategy: {}. Expected manual, latest, or interactive.",
                s
            ),
        }
    }
}

fn no_compatible(loader: LoaderKind, game_version: &str) -> PackError {
    PackError::no_compatible(loader.to_string(), format!("Minecraft {}", game_version))
}

/// Highest release of `loader` that runs on `game_version` and is a valid
/// semantic version. Stable builds without a prerelease tag win; the others
/// are only considered when no such build exists.
#[tracing::instrument(skip(loader))]
pub async fn latest_compatible(loader: &dyn ModLoader, game_version: &str) -> Result<String> {
    let candidates = loader.versions_for(game_version).await?;
    let releases: Vec<LoaderVersion> = candidates
        .iter()
        .filter(|v| v.is_release())
        .cloned()
        .collect();
    debug!(
        "{} has {} releases for {} ({} stable)",
        loader.kind(),
        candidates.len(),
        game_version,
        releases.len()
    );

    let any = VersionRange::any();
    find_highest(&any, &releases)
        .or_else(|| {
            debug!("No stable {} build for {}, trying prereleases", loader.kind(), game_version);
            find_highest(&any, &candidates)
        })
        .map(|v| v.version.clone())
        .ok_or_else(|| no_compatible(loader.kind(), game_version).into())
}

pub struct LoaderResolver<'a, R: Runtime + ?Sized> {
    runtime: &'a R,
    registry: &'a ProviderRegistry,
    strategy: Option<Strategy>,
}

impl<'a, R: Runtime + ?Sized> LoaderResolver<'a, R> {
    pub fn new(runtime: &'a R, registry: &'a ProviderRegistry) -> Self {
        Self {
            runtime,
            registry,
            strategy: None,
        }
    }

    /// Use `strategy` for every loader instead of asking.
    pub fn with_strategy(mut self, strategy: Option<Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn select_strategy(&self, loader: LoaderKind) -> Result<Strategy> {
        if let Some(strategy) = self.strategy {
            return Ok(strategy);
        }
        select_one(
            self.runtime,
            &format!("How should the {} version be chosen?", loader),
            &Strategy::all(),
        )
    }

    /// Bind a version of every loader to every game version.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(
        &self,
        loaders: &[LoaderKind],
        game_versions: &[String],
    ) -> Result<LoaderBindings> {
        let mut bindings = LoaderBindings::new();
        for &loader in loaders {
            if game_versions.is_empty() {
                continue;
            }
            let strategy = self.select_strategy(loader)?;
            for game_version in game_versions {
                let version = self.bind(loader, game_version, strategy).await?;
                info!("{} {} -> {}", loader, game_version, version);
                bindings
                    .entry(loader)
                    .or_default()
                    .insert(game_version.clone(), version);
            }
        }
        Ok(bindings)
    }

    /// Bind every (loader, game version) pair of `manifest` that has no
    /// loader version yet. Returns how many bindings were added.
    pub async fn resolve_missing(&self, manifest: &mut PackManifest) -> Result<usize> {
        let mut missing: BTreeMap<LoaderKind, Vec<String>> = BTreeMap::new();
        for (loader, game_version) in manifest.unbound() {
            missing.entry(loader).or_default().push(game_version);
        }

        let mut added = 0;
        for (loader, game_versions) in missing {
            let bindings = self.resolve(&[loader], &game_versions).await?;
            for (game_version, version) in bindings.into_values().flatten() {
                manifest.bind_loader_version(loader, game_version, version);
                added += 1;
            }
        }
        Ok(added)
    }

    async fn bind(&self, loader: LoaderKind, game_version: &str, strategy: Strategy) -> Result<String> {
        match strategy {
            Strategy::Manual => self.manual_entry(loader, game_version),
            Strategy::Latest => self.latest(loader, game_version).await,
            Strategy::Interactive => self.interactive(loader, game_version).await,
        }
    }

    /// Ask until the answer is a valid semantic version.
    pub fn manual_entry(&self, loader: LoaderKind, game_version: &str) -> Result<String> {
        let prompt = format!("{} version for Minecraft {}:", loader, game_version);
        loop {
            let answer = ask(self.runtime, &prompt, None)?;
            if is_valid_version(&answer) {
                return Ok(answer);
            }
            warn!("'{}' is not a valid semantic version", answer);
        }
    }

    pub async fn latest(&self, loader: LoaderKind, game_version: &str) -> Result<String> {
        let provider = self.registry.loader(loader)?;
        latest_compatible(provider.as_ref(), game_version).await
    }

    /// Pick from the loader releases that run on `game_version`, in catalog order.
    pub async fn interactive(&self, loader: LoaderKind, game_version: &str) -> Result<String> {
        let provider = self.registry.loader(loader)?;
        let candidates: Vec<String> = provider
            .versions_for(game_version)
            .await?
            .into_iter()
            .map(|v| v.version)
            .collect();
        if candidates.is_empty() {
            return Err(no_compatible(loader, game_version).into());
        }
        select_one(
            self.runtime,
            &format!("Which {} version for Minecraft {}?", loader, game_version),
            &candidates,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::pack_error;
    use crate::provider::{GameVersionBounds, MockModLoader};
    use crate::runtime::MockRuntime;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn fabric(version: &str) -> LoaderVersion {
        LoaderVersion {
            loader: LoaderKind::Fabric,
            version: version.to_string(),
            game_versions: GameVersionBounds::any(),
            stable: true,
        }
    }

    fn unstable(version: &str) -> LoaderVersion {
        LoaderVersion {
            stable: false,
            ..fabric(version)
        }
    }

    fn registry_with_fabric(versions: Vec<LoaderVersion>) -> ProviderRegistry {
        let mut loader = MockModLoader::new();
        loader.expect_kind().return_const(LoaderKind::Fabric);
        loader
            .expect_versions_for()
            .returning(move |_| Ok(versions.clone()));
        let mut registry = ProviderRegistry::new();
        registry.register_loader(Arc::new(loader));
        registry
    }

    /// An empty scripted answer takes the prompt's default, as a real terminal does.
    fn scripted_inputs(runtime: &mut MockRuntime, answers: Vec<Option<&'static str>>) {
        let answers = Mutex::new(VecDeque::from(answers));
        runtime.expect_input().returning(move |_, default| {
            let answer = answers.lock().unwrap().pop_front().unwrap();
            Ok(answer.map(|a| match (a, default) {
                ("", Some(default)) => default.to_string(),
                (a, _) => a.to_string(),
            }))
        });
    }

    fn game_versions() -> Vec<String> {
        vec!["1.20.1".to_string(), "1.20.4".to_string()]
    }

    #[test]
    fn test_strategy_parse() {
        for strategy in Strategy::all() {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert!("random".parse::<Strategy>().is_err());
    }

    #[tokio::test]
    async fn test_manual_binds_every_game_version() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_select()
            .withf(|_, choices| choices == ["manual", "latest", "interactive"])
            .times(1)
            .returning(|_, _| Ok(Some(0)));
        scripted_inputs(&mut runtime, vec![Some("0.15.11"), Some("0.15.11")]);

        let registry = ProviderRegistry::new();
        let resolver = LoaderResolver::new(&runtime, &registry);
        let bindings = resolver
            .resolve(&[LoaderKind::Fabric], &game_versions())
            .await
            .unwrap();

        let fabric = &bindings[&LoaderKind::Fabric];
        assert_eq!(fabric["1.20.1"], "0.15.11");
        assert_eq!(fabric["1.20.4"], "0.15.11");
    }

    #[test_log::test(tokio::test)]
    async fn test_manual_reprompts_on_invalid_version() {
        let mut runtime = MockRuntime::new();
        scripted_inputs(&mut runtime, vec![Some("latest"), Some("0.15"), Some("0.15.11")]);

        let registry = ProviderRegistry::new();
        let resolver = LoaderResolver::new(&runtime, &registry);
        let version = resolver.manual_entry(LoaderKind::Fabric, "1.20.1").unwrap();
        assert_eq!(version, "0.15.11");
    }

    #[tokio::test]
    async fn test_manual_cancel() {
        let mut runtime = MockRuntime::new();
        scripted_inputs(&mut runtime, vec![Some("nope"), None]);

        let registry = ProviderRegistry::new();
        let resolver =
            LoaderResolver::new(&runtime, &registry).with_strategy(Some(Strategy::Manual));
        let err = resolver
            .resolve(&[LoaderKind::Fabric], &game_versions())
            .await
            .unwrap_err();
        assert!(matches!(pack_error(&err), Some(PackError::Cancelled)));
    }

    #[tokio::test]
    async fn test_latest_picks_highest_stable_release() {
        let runtime = MockRuntime::new();
        let registry = registry_with_fabric(vec![
            fabric("0.15.10"),
            fabric("0.16.0-beta.1"),
            unstable("0.16.1"),
            fabric("0.15.11"),
            fabric("not-semver"),
        ]);

        let resolver =
            LoaderResolver::new(&runtime, &registry).with_strategy(Some(Strategy::Latest));
        let bindings = resolver
            .resolve(&[LoaderKind::Fabric], &game_versions())
            .await
            .unwrap();
        assert_eq!(bindings[&LoaderKind::Fabric]["1.20.1"], "0.15.11");
        assert_eq!(bindings[&LoaderKind::Fabric]["1.20.4"], "0.15.11");
    }

    #[test_log::test(tokio::test)]
    async fn test_latest_falls_back_to_prereleases() {
        let runtime = MockRuntime::new();
        let registry = registry_with_fabric(vec![
            unstable("0.16.0"),
            fabric("0.16.1-beta.2"),
            fabric("0.16.1-beta.1"),
        ]);

        let resolver = LoaderResolver::new(&runtime, &registry);
        let version = resolver.latest(LoaderKind::Fabric, "1.20.1").await.unwrap();
        assert_eq!(version, "0.16.1-beta.2");
    }

    #[tokio::test]
    async fn test_latest_without_candidates() {
        let runtime = MockRuntime::new();
        let registry = registry_with_fabric(vec![fabric("snapshot")]);

        let resolver = LoaderResolver::new(&runtime, &registry);
        let err = resolver
            .latest(LoaderKind::Fabric, "1.20.1")
            .await
            .unwrap_err();
        match pack_error(&err) {
            Some(PackError::NoCompatibleVersion { target, constraint }) => {
                assert_eq!(target, "fabric");
                assert_eq!(constraint, "Minecraft 1.20.1");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_latest_for_unregistered_loader() {
        let runtime = MockRuntime::new();
        let registry = ProviderRegistry::new();
        let resolver = LoaderResolver::new(&runtime, &registry);
        assert!(resolver.latest(LoaderKind::Forge, "1.20.1").await.is_err());
    }

    #[tokio::test]
    async fn test_interactive_lists_in_catalog_order() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_select()
            .withf(|_, choices| choices == ["0.15.10", "0.15.11"])
            .returning(|_, _| Ok(Some(1)));

        let registry = registry_with_fabric(vec![fabric("0.15.10"), fabric("0.15.11")]);
        let resolver = LoaderResolver::new(&runtime, &registry);
        let version = resolver
            .interactive(LoaderKind::Fabric, "1.20.1")
            .await
            .unwrap();
        assert_eq!(version, "0.15.11");
    }

    #[tokio::test]
    async fn test_interactive_empty_and_cancel() {
        let mut runtime = MockRuntime::new();
        runtime.expect_select().returning(|_, _| Ok(None));

        let registry = registry_with_fabric(vec![]);
        let resolver = LoaderResolver::new(&runtime, &registry);
        let err = resolver
            .interactive(LoaderKind::Fabric, "1.20.1")
            .await
            .unwrap_err();
        assert!(matches!(
            pack_error(&err),
            Some(PackError::NoCompatibleVersion { .. })
        ));

        let registry = registry_with_fabric(vec![fabric("0.15.11")]);
        let resolver = LoaderResolver::new(&runtime, &registry);
        let err = resolver
            .interactive(LoaderKind::Fabric, "1.20.1")
            .await
            .unwrap_err();
        assert!(matches!(pack_error(&err), Some(PackError::Cancelled)));
    }

    #[tokio::test]
    async fn test_resolve_missing_only_fills_gaps() {
        let runtime = MockRuntime::new();
        let registry = registry_with_fabric(vec![fabric("0.15.11")]);

        let mut manifest = PackManifest::new(
            "demo",
            [crate::provider::SourceKind::Modrinth],
            [LoaderKind::Fabric],
            game_versions(),
        )
        .unwrap();
        manifest.bind_loader_version(LoaderKind::Fabric, "1.20.1", "0.14.0");

        let resolver =
            LoaderResolver::new(&runtime, &registry).with_strategy(Some(Strategy::Latest));
        let added = resolver.resolve_missing(&mut manifest).await.unwrap();

        assert_eq!(added, 1);
        assert_eq!(manifest.loader_version(LoaderKind::Fabric, "1.20.1"), Some("0.14.0"));
        assert_eq!(manifest.loader_version(LoaderKind::Fabric, "1.20.4"), Some("0.15.11"));
    }
}
