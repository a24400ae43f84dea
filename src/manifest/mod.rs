//! The `packlab.yml` pack manifest.
//!
//! A manifest pins the game versions a pack targets, the mod sources and
//! loaders it uses, one loader release per (loader, game version) pair and the
//! mods it includes. It is created once by `init` and then changed one facet
//! at a time; every change is validated before it is written back.

mod store;
mod validate;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::PackError;
use crate::provider::{LoaderKind, SourceKind};
use crate::version::{VersionRange, VersionSpecifier};

pub use store::{MANIFEST_FILE, ManifestStore};
pub use validate::{validate, validate_against_sources};

/// A mod included in the pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModRef {
    pub id: String,
    /// Range of acceptable mod versions, as the user wrote it.
    pub version: String,
    pub source: SourceKind,
}

impl ModRef {
    pub fn new(specifier: &VersionSpecifier, source: SourceKind) -> Self {
        Self {
            id: specifier.id.clone(),
            version: specifier.range.to_string(),
            source,
        }
    }

    /// The `id@version` specifier this entry stands for.
    pub fn specifier(&self) -> Result<VersionSpecifier, PackError> {
        let range = VersionRange::parse(&self.version)?;
        Ok(VersionSpecifier::new(self.id.clone(), range))
    }
}

/// Which part of the pack version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpType::Major => write!(f, "major"),
            BumpType::Minor => write!(f, "minor"),
            BumpType::Patch => write!(f, "patch"),
        }
    }
}

impl FromStr for BumpType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(BumpType::Major),
            "minor" => Ok(BumpType::Minor),
            "patch" => Ok(BumpType::Patch),
            _ => anyhow::bail!(
                "Unknown bump type: {}. Expected major, minor, or patch.",
                s
            ),
        }
    }
}

fn default_pack_version() -> Version {
    Version::new(0, 1, 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_pack_version")]
    pub pack_version: Version,
    #[serde(default)]
    pub sources: BTreeSet<SourceKind>,
    #[serde(default)]
    pub loaders: BTreeSet<LoaderKind>,
    /// Supported game versions.
    #[serde(default)]
    pub versions: BTreeSet<String>,
    /// loader -> game version -> loader version
    #[serde(default)]
    pub loader_versions: BTreeMap<LoaderKind, BTreeMap<String, String>>,
    #[serde(default)]
    pub mods: Vec<ModRef>,
}

/// Empty answers to optional prompts mean "not set".
pub fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl PackManifest {
    /// Build a manifest with no mods and no loader bindings. Fails with
    /// [`PackError::ValidationFailure`] listing every violated invariant.
    pub fn new(
        name: impl Into<String>,
        sources: impl IntoIterator<Item = SourceKind>,
        loaders: impl IntoIterator<Item = LoaderKind>,
        versions: impl IntoIterator<Item = String>,
    ) -> Result<Self, PackError> {
        let manifest = Self {
            name: name.into(),
            author: None,
            description: None,
            url: None,
            pack_version: default_pack_version(),
            sources: sources.into_iter().collect(),
            loaders: loaders.into_iter().collect(),
            versions: versions.into_iter().collect(),
            loader_versions: BTreeMap::new(),
            mods: Vec::new(),
        };
        manifest.check()?;
        Ok(manifest)
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    /// Run [`validate`] and wrap the violations in a [`PackError`].
    pub fn check(&self) -> Result<(), PackError> {
        validate(self).map_err(PackError::ValidationFailure)
    }

    pub fn bind_loader_version(
        &mut self,
        loader: LoaderKind,
        game_version: impl Into<String>,
        loader_version: impl Into<String>,
    ) {
        self.loader_versions
            .entry(loader)
            .or_default()
            .insert(game_version.into(), loader_version.into());
    }

    pub fn loader_version(&self, loader: LoaderKind, game_version: &str) -> Option<&str> {
        self.loader_versions
            .get(&loader)
            .and_then(|bindings| bindings.get(game_version))
            .map(String::as_str)
    }

    /// (loader, game version) pairs that have no loader version yet.
    pub fn unbound(&self) -> Vec<(LoaderKind, String)> {
        self.loaders
            .iter()
            .flat_map(|&loader| {
                self.versions
                    .iter()
                    .filter(move |v| self.loader_version(loader, v).is_none())
                    .map(move |v| (loader, v.clone()))
            })
            .collect()
    }

    /// Returns false if the source was already enabled.
    pub fn add_source(&mut self, source: SourceKind) -> bool {
        self.sources.insert(source)
    }

    /// Returns false if the source was not enabled.
    pub fn remove_source(&mut self, source: SourceKind) -> bool {
        self.sources.remove(&source)
    }

    /// Returns false if the loader was already enabled.
    pub fn add_loader(&mut self, loader: LoaderKind) -> bool {
        self.loaders.insert(loader)
    }

    /// Disables the loader and forgets its bindings.
    pub fn remove_loader(&mut self, loader: LoaderKind) -> bool {
        self.loader_versions.remove(&loader);
        self.loaders.remove(&loader)
    }

    /// Target a single game version. Bindings for other game versions are dropped.
    pub fn retarget(&mut self, game_version: impl Into<String>) {
        let game_version = game_version.into();
        for bindings in self.loader_versions.values_mut() {
            bindings.retain(|v, _| *v == game_version);
        }
        self.loader_versions.retain(|_, bindings| !bindings.is_empty());
        self.versions = BTreeSet::from([game_version]);
    }

    pub fn find_mod(&self, id: &str) -> Option<&ModRef> {
        self.mods.iter().find(|m| m.id == id)
    }

    /// Insert a mod, or replace the entry with the same id in place.
    pub fn upsert_mod(&mut self, entry: ModRef) {
        match self.mods.iter_mut().find(|m| m.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.mods.push(entry),
        }
    }

    pub fn remove_mod(&mut self, id: &str) -> Option<ModRef> {
        let index = self.mods.iter().position(|m| m.id == id)?;
        Some(self.mods.remove(index))
    }

    /// Increment the pack version. Lower components reset and any
    /// prerelease or build metadata is dropped.
    pub fn bump(&mut self, bump: BumpType) -> &Version {
        let v = &self.pack_version;
        self.pack_version = match bump {
            BumpType::Major => Version::new(v.major + 1, 0, 0),
            BumpType::Minor => Version::new(v.major, v.minor + 1, 0),
            BumpType::Patch => Version::new(v.major, v.minor, v.patch + 1),
        };
        &self.pack_version
    }
}
