use anyhow::Result;
use async_trait::async_trait;
use log::info;

use super::{GameCatalog, GameVersionManifest};
use crate::http::HttpClient;

pub const DEFAULT_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// Game catalog backed by Mojang's launcher metadata.
pub struct MojangCatalog {
    http_client: HttpClient,
    manifest_url: String,
}

impl MojangCatalog {
    pub fn new(http_client: HttpClient, manifest_url: impl Into<String>) -> Self {
        Self {
            http_client,
            manifest_url: manifest_url.into(),
        }
    }
}

#[async_trait]
impl GameCatalog for MojangCatalog {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self) -> Result<GameVersionManifest> {
        info!("Fetching game version manifest...");
        let manifest: GameVersionManifest = self.http_client.get_json(&self.manifest_url).await?;
        info!("Loaded {} game versions", manifest.versions.len());
        Ok(manifest)
    }
}
