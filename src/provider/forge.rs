//! Forge loader catalog from the Forge maven metadata.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::http::HttpClient;

use super::{GameVersionBounds, LoaderKind, LoaderVersion, ModLoader, ProviderInfo};

pub const DEFAULT_FORGE_URL: &str = "https://files.minecraftforge.net/net/minecraftforge/forge";

/// Forge publishes `{ "<game>": ["<game>-<forge>", ...] }`. Each build runs on
/// exactly the game version it is filed under.
pub struct ForgeLoader {
    http_client: HttpClient,
    files_url: String,
}

impl ForgeLoader {
    pub fn new(http_client: HttpClient, files_url: impl Into<String>) -> Self {
        Self {
            http_client,
            files_url: files_url.into(),
        }
    }
}

fn strip_game_prefix<'a>(game_version: &str, build: &'a str) -> &'a str {
    build
        .strip_prefix(game_version)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(build)
}

#[async_trait]
impl ModLoader for ForgeLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Forge
    }

    fn loader(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Forge".to_string(),
            description: "The original Minecraft modding API".to_string(),
            url: "https://minecraftforge.net".to_string(),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn versions(&self) -> Result<Vec<LoaderVersion>> {
        let url = format!("{}/maven-metadata.json", self.files_url);
        let metadata: BTreeMap<String, Vec<String>> = self.http_client.get_json(&url).await?;

        Ok(metadata
            .iter()
            .flat_map(|(game_version, builds)| {
                builds.iter().map(move |build| LoaderVersion {
                    loader: LoaderKind::Forge,
                    version: strip_game_prefix(game_version, build).to_string(),
                    game_versions: GameVersionBounds::exactly(game_version.clone()),
                    stable: true,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_game_prefix() {
        assert_eq!(strip_game_prefix("1.20.1", "1.20.1-47.2.0"), "47.2.0");
        assert_eq!(
            strip_game_prefix("1.7.10", "1.7.10-10.13.4.1614-1.7.10"),
            "10.13.4.1614-1.7.10"
        );
        assert_eq!(strip_game_prefix("1.20.1", "47.2.0"), "47.2.0");
    }

    #[tokio::test]
    async fn test_versions_are_bound_to_their_game_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/maven-metadata.json")
            .with_status(200)
            .with_body(
                r#"{"1.20.1": ["1.20.1-47.1.0", "1.20.1-47.2.0"],
                    "1.20.4": ["1.20.4-49.0.30"]}"#,
            )
            .create_async()
            .await;

        let loader = ForgeLoader::new(HttpClient::new(reqwest::Client::new()), server.url());
        let versions = loader.versions().await.unwrap();

        mock.assert_async().await;
        assert_eq!(versions.len(), 3);
        assert_eq!(versions[1].version, "47.2.0");
        assert_eq!(versions[1].game_versions, GameVersionBounds::exactly("1.20.1"));

        let for_1_20_4: Vec<String> = loader
            .versions_for("1.20.4")
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(for_1_20_4, vec!["49.0.30"]);
    }
}
