//! Modrinth mod source.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::error::PackError;
use crate::http::HttpClient;

use super::{LoaderKind, Mod, ModSource, ModVersion, ProviderInfo, SourceKind};

pub const DEFAULT_MODRINTH_URL: &str = "https://api.modrinth.com/v2";

/// How many mods `mods()` lists.
const SEARCH_LIMIT: &str = "50";

/// Modrinth API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct SearchResponse {
        pub hits: Vec<SearchHit>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchHit {
        pub slug: String,
        pub title: String,
        #[serde(default)]
        pub author: String,
        #[serde(default)]
        pub categories: Vec<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Project {
        pub slug: String,
        pub title: String,
        #[serde(default)]
        pub loaders: Vec<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Version {
        pub version_number: String,
        #[serde(default)]
        pub game_versions: Vec<String>,
        #[serde(default)]
        pub loaders: Vec<String>,
    }
}

fn known_loaders(names: &[String]) -> Vec<LoaderKind> {
    let mut loaders: Vec<LoaderKind> = names
        .iter()
        .filter_map(|n| LoaderKind::from_upstream(n))
        .collect();
    loaders.dedup();
    loaders
}

/// Mods hosted on modrinth.com, identified by project slug.
pub struct ModrinthSource {
    http_client: HttpClient,
    api_url: String,
}

impl ModrinthSource {
    pub fn new(http_client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl ModSource for ModrinthSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Modrinth
    }

    fn source(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Modrinth".to_string(),
            description: "Open source modding platform".to_string(),
            url: "https://modrinth.com".to_string(),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn mods(&self) -> Result<Vec<Mod>> {
        let url = format!("{}/search", self.api_url);
        debug!("Searching mods on {}...", url);

        let response: api::SearchResponse = self
            .http_client
            .get_json_with_query(
                &url,
                &[
                    ("limit", SEARCH_LIMIT),
                    ("index", "downloads"),
                    ("facets", r#"[["project_type:mod"]]"#),
                ],
            )
            .await?;

        Ok(response
            .hits
            .into_iter()
            .map(|hit| Mod {
                supported_loaders: known_loaders(&hit.categories),
                id: hit.slug,
                name: hit.title,
                author: hit.author,
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_mod(&self, id: &str) -> Result<Mod> {
        let url = format!("{}/project/{}", self.api_url, id);
        let project: api::Project = self
            .http_client
            .get_optional_json(&url)
            .await?
            .ok_or_else(|| PackError::not_found("Mod", id))?;

        Ok(Mod {
            supported_loaders: known_loaders(&project.loaders),
            id: project.slug,
            name: project.title,
            author: String::new(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn versions(&self, id: &str) -> Result<Vec<ModVersion>> {
        let url = format!("{}/project/{}/version", self.api_url, id);
        let versions: Vec<api::Version> = self
            .http_client
            .get_optional_json(&url)
            .await?
            .ok_or_else(|| PackError::not_found("Mod", id))?;

        Ok(versions
            .into_iter()
            .map(|v| ModVersion {
                mod_id: id.to_string(),
                loaders: known_loaders(&v.loaders),
                version: v.version_number,
                game_versions: v.game_versions,
            })
            .collect())
    }
}
