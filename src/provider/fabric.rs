//! Fabric loader catalog from the Fabric meta service.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::http::HttpClient;

use super::{GameVersionBounds, LoaderKind, LoaderVersion, ModLoader, ProviderInfo};

pub const DEFAULT_FABRIC_URL: &str = "https://meta.fabricmc.net/v2";

mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Loader {
        pub version: String,
        #[serde(default)]
        pub stable: bool,
    }
}

/// Fabric loader builds are not tied to a game version, so every release
/// has open bounds.
pub struct FabricLoader {
    http_client: HttpClient,
    meta_url: String,
}

impl FabricLoader {
    pub fn new(http_client: HttpClient, meta_url: impl Into<String>) -> Self {
        Self {
            http_client,
            meta_url: meta_url.into(),
        }
    }
}

#[async_trait]
impl ModLoader for FabricLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Fabric
    }

    fn loader(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Fabric".to_string(),
            description: "Lightweight, experimental modding toolchain".to_string(),
            url: "https://fabricmc.net".to_string(),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn versions(&self) -> Result<Vec<LoaderVersion>> {
        let url = format!("{}/versions/loader", self.meta_url);
        let loaders: Vec<api::Loader> = self.http_client.get_json(&url).await?;
        debug!(
            "Fabric meta lists {} loader versions ({} stable)",
            loaders.len(),
            loaders.iter().filter(|l| l.stable).count()
        );

        Ok(loaders
            .into_iter()
            .map(|l| LoaderVersion {
                loader: LoaderKind::Fabric,
                version: l.version,
                game_versions: GameVersionBounds::any(),
                stable: l.stable,
            })
            .collect())
    }
}
