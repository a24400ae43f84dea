//! Provider abstraction for mod sources and mod loaders.
//!
//! A mod source (Modrinth, CurseForge) publishes mods and their releases;
//! a mod loader (Forge, Fabric, NeoForged) publishes loader releases together
//! with the game versions they run on. Both are reached through async traits
//! so resolution and validation can run against mocks.

mod curseforge;
mod fabric;
mod forge;
mod modrinth;
mod neoforge;
mod registry;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PackError;
use crate::version::{Versioned, coerce_version, parse_version};

pub use curseforge::{CurseForgeSource, DEFAULT_CURSEFORGE_URL};
pub use fabric::{DEFAULT_FABRIC_URL, FabricLoader};
pub use forge::{DEFAULT_FORGE_URL, ForgeLoader};
pub use modrinth::{DEFAULT_MODRINTH_URL, ModrinthSource};
pub use neoforge::{DEFAULT_NEOFORGE_URL, NeoForgeLoader};
pub use registry::ProviderRegistry;

/// Mod source identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Modrinth,
    CurseForge,
}

impl SourceKind {
    pub fn all() -> [SourceKind; 2] {
        [SourceKind::Modrinth, SourceKind::CurseForge]
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Modrinth => write!(f, "modrinth"),
            SourceKind::CurseForge => write!(f, "curseforge"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "modrinth" => Ok(SourceKind::Modrinth),
            "curseforge" => Ok(SourceKind::CurseForge),
            _ => anyhow::bail!(
                "Unknown mod source: {}. Expected modrinth or curseforge.",
                s
            ),
        }
    }
}

/// Mod loader identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Forge,
    Fabric,
    NeoForged,
}

impl LoaderKind {
    pub fn all() -> [LoaderKind; 3] {
        [LoaderKind::Forge, LoaderKind::Fabric, LoaderKind::NeoForged]
    }

    /// Map the loader names used by upstream APIs. Unknown names (quilt,
    /// liteloader, "Client", ...) are ignored.
    pub fn from_upstream(name: &str) -> Option<LoaderKind> {
        match name.to_lowercase().as_str() {
            "forge" => Some(LoaderKind::Forge),
            "fabric" => Some(LoaderKind::Fabric),
            "neoforge" | "neoforged" => Some(LoaderKind::NeoForged),
            _ => None,
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderKind::Forge => write!(f, "forge"),
            LoaderKind::Fabric => write!(f, "fabric"),
            LoaderKind::NeoForged => write!(f, "neoforged"),
        }
    }
}

impl FromStr for LoaderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forge" => Ok(LoaderKind::Forge),
            "fabric" => Ok(LoaderKind::Fabric),
            "neoforged" => Ok(LoaderKind::NeoForged),
            _ => anyhow::bail!(
                "Unknown mod loader: {}. Expected forge, fabric, or neoforged.",
                s
            ),
        }
    }
}

/// Human-facing description of a source or loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub description: String,
    pub url: String,
}

/// A mod as listed by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
    pub id: String,
    pub name: String,
    pub author: String,
    pub supported_loaders: Vec<LoaderKind>,
}

/// One published release of a mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModVersion {
    pub mod_id: String,
    pub version: String,
    pub game_versions: Vec<String>,
    pub loaders: Vec<LoaderKind>,
}

impl ModVersion {
    pub fn supports(&self, loader: LoaderKind, game_version: &str) -> bool {
        self.loaders.contains(&loader) && self.game_versions.iter().any(|v| v == game_version)
    }
}

impl Versioned for ModVersion {
    fn version(&self) -> &str {
        &self.version
    }
}

/// Inclusive game version bounds of a loader release. Missing bounds are open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVersionBounds {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl GameVersionBounds {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn exactly(game_version: impl Into<String>) -> Self {
        let game_version = game_version.into();
        Self {
            min: Some(game_version.clone()),
            max: Some(game_version),
        }
    }

    pub fn supports(&self, game_version: &str) -> bool {
        if self.min.is_none() && self.max.is_none() {
            return true;
        }
        let Some(target) = coerce_version(game_version) else {
            return false;
        };
        let above_min = match self.min.as_deref().map(coerce_version) {
            None => true,
            Some(Some(min)) => target >= min,
            Some(None) => false,
        };
        let below_max = match self.max.as_deref().map(coerce_version) {
            None => true,
            Some(Some(max)) => target <= max,
            Some(None) => false,
        };
        above_min && below_max
    }
}

/// One published release of a mod loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderVersion {
    pub loader: LoaderKind,
    pub version: String,
    pub game_versions: GameVersionBounds,
    /// Whether upstream marks the build as stable.
    pub stable: bool,
}

impl LoaderVersion {
    /// A stable build whose version carries no prerelease tag.
    pub fn is_release(&self) -> bool {
        self.stable && parse_version(&self.version).is_some_and(|v| v.pre.is_empty())
    }
}

impl Versioned for LoaderVersion {
    fn version(&self) -> &str {
        &self.version
    }
}

/// A catalog of mods (Modrinth, CurseForge).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn source(&self) -> ProviderInfo;

    /// Browse the mods offered by this source.
    async fn mods(&self) -> Result<Vec<Mod>>;

    /// Look up one mod. Fails with [`PackError::NotFound`] for unknown ids.
    async fn get_mod(&self, id: &str) -> Result<Mod>;

    /// All releases of a mod, newest first as published upstream.
    async fn versions(&self, id: &str) -> Result<Vec<ModVersion>>;
}

/// A catalog of loader releases (Forge, Fabric, NeoForged).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModLoader: Send + Sync {
    fn kind(&self) -> LoaderKind;

    fn loader(&self) -> ProviderInfo;

    /// Every published release, in upstream order.
    async fn versions(&self) -> Result<Vec<LoaderVersion>>;

    /// Look up one release. Fails with [`PackError::NotFound`] for unknown versions.
    async fn version(&self, version: &str) -> Result<LoaderVersion> {
        self.versions()
            .await?
            .into_iter()
            .find(|v| v.version == version)
            .ok_or_else(|| PackError::not_found("Loader version", version).into())
    }

    /// Releases that run on `game_version`, in upstream order.
    async fn versions_for(&self, game_version: &str) -> Result<Vec<LoaderVersion>> {
        Ok(self
            .versions()
            .await?
            .into_iter()
            .filter(|v| v.game_versions.supports(game_version))
            .collect())
    }
}
