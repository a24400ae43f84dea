//! NeoForged loader catalog from the NeoForged maven.

use anyhow::Result;
use async_trait::async_trait;

use crate::http::HttpClient;

use super::{GameVersionBounds, LoaderKind, LoaderVersion, ModLoader, ProviderInfo};

pub const DEFAULT_NEOFORGE_URL: &str = "https://maven.neoforged.net";

const VERSIONS_PATH: &str = "api/maven/versions/releases/net/neoforged/neoforge";

mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Versions {
        #[serde(default)]
        pub versions: Vec<String>,
    }
}

/// NeoForged numbers builds after the game version they target: `20.4.237`
/// is for `1.20.4`, `21.0.167` for `1.21`.
fn game_version_of(build: &str) -> Option<String> {
    let mut parts = build.split(['.', '-']);
    let major: u64 = parts.next()?.parse().ok()?;
    let minor: u64 = parts.next()?.parse().ok()?;
    if minor == 0 {
        Some(format!("1.{}", major))
    } else {
        Some(format!("1.{}.{}", major, minor))
    }
}

pub struct NeoForgeLoader {
    http_client: HttpClient,
    maven_url: String,
}

impl NeoForgeLoader {
    pub fn new(http_client: HttpClient, maven_url: impl Into<String>) -> Self {
        Self {
            http_client,
            maven_url: maven_url.into(),
        }
    }
}

#[async_trait]
impl ModLoader for NeoForgeLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::NeoForged
    }

    fn loader(&self) -> ProviderInfo {
        ProviderInfo {
            name: "NeoForged".to_string(),
            description: "Community-driven fork of Forge".to_string(),
            url: "https://neoforged.net".to_string(),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn versions(&self) -> Result<Vec<LoaderVersion>> {
        let url = format!("{}/{}", self.maven_url, VERSIONS_PATH);
        let response: api::Versions = self.http_client.get_json(&url).await?;

        Ok(response
            .versions
            .into_iter()
            .filter_map(|version| {
                let game_version = game_version_of(&version)?;
                Some(LoaderVersion {
                    loader: LoaderKind::NeoForged,
                    stable: !version.contains("-beta"),
                    version,
                    game_versions: GameVersionBounds::exactly(game_version),
                })
            })
            .collect())
    }
}
