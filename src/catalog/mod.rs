//! Game version catalog.
//!
//! The catalog is the authoritative list of game releases. It is fetched
//! through the [`GameCatalog`] trait so commands can be tested without the
//! network; [`MojangCatalog`] is the production implementation.

mod filter;
mod mojang;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use filter::filter_valid;
pub use mojang::{DEFAULT_MANIFEST_URL, MojangCatalog};

/// Release channel of a game version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVersionKind {
    Release,
    Snapshot,
    /// `old_beta`, `old_alpha` and anything newer we don't know about.
    #[serde(other)]
    Other,
}

impl fmt::Display for GameVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameVersionKind::Release => write!(f, "release"),
            GameVersionKind::Snapshot => write!(f, "snapshot"),
            GameVersionKind::Other => write!(f, "other"),
        }
    }
}

impl FromStr for GameVersionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(GameVersionKind::Release),
            "snapshot" => Ok(GameVersionKind::Snapshot),
            _ => anyhow::bail!(
                "Unknown game version kind: {}. Expected release or snapshot.",
                s
            ),
        }
    }
}

/// One game version entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameVersion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GameVersionKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub release_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestVersions {
    #[serde(default)]
    pub release: String,
    #[serde(default)]
    pub snapshot: String,
}

/// The full catalog as published upstream, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVersionManifest {
    #[serde(default)]
    pub latest: LatestVersions,
    #[serde(default)]
    pub versions: Vec<GameVersion>,
}

impl GameVersionManifest {
    /// Release ids that are valid semantic versions, newest first.
    pub fn releases(&self) -> Vec<String> {
        filter_valid(&self.versions, Some(GameVersionKind::Release))
    }

    pub fn find(&self, id: &str) -> Option<&GameVersion> {
        self.versions.iter().find(|v| v.id == id)
    }
}

/// Source of the game version catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameCatalog: Send + Sync {
    async fn fetch(&self) -> Result<GameVersionManifest>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_manifest() {
        let json = r#"{
            "latest": {"release": "1.20.4", "snapshot": "24w03a"},
            "versions": [
                {"id": "24w03a", "type": "snapshot", "url": "https://example.com/24w03a.json",
                 "time": "2024-01-17T12:00:00+00:00", "releaseTime": "2024-01-17T11:00:00+00:00"},
                {"id": "1.20.4", "type": "release", "url": "https://example.com/1.20.4.json",
                 "time": "2023-12-07T12:00:00+00:00", "releaseTime": "2023-12-07T08:00:00+00:00"},
                {"id": "b1.7.3", "type": "old_beta", "url": "", "time": "", "releaseTime": ""}
            ]
        }"#;
        let manifest: GameVersionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.latest.release, "1.20.4");
        assert_eq!(manifest.versions.len(), 3);
        assert_eq!(manifest.versions[0].kind, GameVersionKind::Snapshot);
        assert_eq!(manifest.versions[1].release_time, "2023-12-07T08:00:00+00:00");
        assert_eq!(manifest.versions[2].kind, GameVersionKind::Other);
    }

    #[test]
    fn test_releases_and_find() {
        let manifest = GameVersionManifest {
            latest: LatestVersions::default(),
            versions: vec![
                GameVersion {
                    id: "1.20.4".into(),
                    kind: GameVersionKind::Release,
                    url: String::new(),
                    time: String::new(),
                    release_time: String::new(),
                },
                GameVersion {
                    id: "1.20".into(),
                    kind: GameVersionKind::Release,
                    url: String::new(),
                    time: String::new(),
                    release_time: String::new(),
                },
            ],
        };
        // "1.20" is not a full semantic version
        assert_eq!(manifest.releases(), vec!["1.20.4"]);
        assert!(manifest.find("1.20").is_some());
        assert!(manifest.find("1.19").is_none());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(
            "Release".parse::<GameVersionKind>().unwrap(),
            GameVersionKind::Release
        );
        assert!("old_beta".parse::<GameVersionKind>().is_err());
    }
}
