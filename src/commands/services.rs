//! Service factory for building command dependencies.
//!
//! Services (HTTP client, providers, game catalog) are built from the
//! configuration but are not part of it, so tests can hand commands mocks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue},
};

use crate::{
    catalog::{GameCatalog, MojangCatalog},
    http::HttpClient,
    provider::{
        CurseForgeSource, FabricLoader, ForgeLoader, ModrinthSource, NeoForgeLoader,
        ProviderRegistry,
    },
};

use super::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client.
pub fn build_http_client() -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(concat!("packlab/", env!("PACKLAB_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(HttpClient::new(client))
}

/// Headers for CurseForge requests. Without a key the API answers 403.
pub fn curseforge_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    match api_key {
        Some(key) => {
            let mut value = HeaderValue::from_str(key)?;
            value.set_sensitive(true);
            headers.insert("x-api-key", value);
            debug!("CurseForge requests will carry an API key");
        }
        None => info!("CURSEFORGE_API_KEY is not set; CurseForge requests will likely be refused"),
    }
    Ok(headers)
}

/// Register every mod source and mod loader.
pub fn build_registry(config: &Config, http_client: &HttpClient) -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();

    registry.register_source(Arc::new(ModrinthSource::new(
        http_client.clone(),
        &config.modrinth_url,
    )));
    let curseforge_client =
        http_client.with_headers(curseforge_headers(config.curseforge_api_key.as_deref())?);
    registry.register_source(Arc::new(CurseForgeSource::new(
        curseforge_client,
        &config.curseforge_url,
    )));

    registry.register_loader(Arc::new(ForgeLoader::new(
        http_client.clone(),
        &config.forge_url,
    )));
    registry.register_loader(Arc::new(FabricLoader::new(
        http_client.clone(),
        &config.fabric_url,
    )));
    registry.register_loader(Arc::new(NeoForgeLoader::new(
        http_client.clone(),
        &config.neoforge_url,
    )));

    Ok(registry)
}

pub fn build_catalog(config: &Config, http_client: &HttpClient) -> MojangCatalog {
    MojangCatalog::new(http_client.clone(), &config.mojang_url)
}

/// Everything a command talks to besides the [`Runtime`](crate::runtime::Runtime).
pub struct Services {
    pub registry: ProviderRegistry,
    pub catalog: Box<dyn GameCatalog>,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = build_http_client()?;
        Ok(Self {
            registry: build_registry(config, &http_client)?,
            catalog: Box::new(build_catalog(config, &http_client)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{LoaderKind, SourceKind};
    use mockito::{Matcher, Server};
    use std::path::PathBuf;

    fn config(server_url: &str, api_key: Option<&str>) -> Config {
        Config {
            pack_dir: PathBuf::from("/packs/demo"),
            curseforge_api_key: api_key.map(String::from),
            mojang_url: format!("{}/manifest.json", server_url),
            modrinth_url: server_url.to_string(),
            curseforge_url: server_url.to_string(),
            fabric_url: server_url.to_string(),
            forge_url: server_url.to_string(),
            neoforge_url: server_url.to_string(),
        }
    }

    #[test]
    fn test_build_registry_registers_everything() {
        let http_client = build_http_client().unwrap();
        let registry = build_registry(&config("http://localhost", None), &http_client).unwrap();

        assert_eq!(registry.source_kinds(), SourceKind::all().to_vec());
        assert_eq!(registry.loader_kinds(), LoaderKind::all().to_vec());
    }

    #[tokio::test]
    async fn test_curseforge_requests_carry_api_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/mods/search")
            .match_query(Matcher::Any)
            .match_header("x-api-key", "test_key")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let services = Services::from_config(&config(&server.url(), Some("test_key"))).unwrap();
        let source = services.registry.source(SourceKind::CurseForge).unwrap();
        source.mods().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_modrinth_requests_do_not_carry_api_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .match_header("x-api-key", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"hits": []}"#)
            .create_async()
            .await;

        let services = Services::from_config(&config(&server.url(), Some("test_key"))).unwrap();
        let source = services.registry.source(SourceKind::Modrinth).unwrap();
        source.mods().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_catalog_uses_configured_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/manifest.json")
            .with_status(200)
            .with_body(r#"{"latest": {"release": "", "snapshot": ""}, "versions": []}"#)
            .create_async()
            .await;

        let services = Services::from_config(&config(&server.url(), None)).unwrap();
        let manifest = services.catalog.fetch().await.unwrap();

        mock.assert_async().await;
        assert!(manifest.versions.is_empty());
    }
}
