//! CurseForge mod source.
//!
//! Every request needs an API key, sent as `x-api-key`; the key is attached
//! to the [`HttpClient`] by the caller.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::error::PackError;
use crate::http::HttpClient;
use crate::version::is_valid_version;

use super::{LoaderKind, Mod, ModSource, ModVersion, ProviderInfo, SourceKind};

pub const DEFAULT_CURSEFORGE_URL: &str = "https://api.curseforge.com/v1";

const MINECRAFT_GAME_ID: &str = "432";
const MODS_CLASS_ID: &str = "6";
const PAGE_SIZE: &str = "50";

/// CurseForge API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Envelope<T> {
        pub data: T,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Mod {
        pub id: u64,
        pub name: String,
        #[serde(default)]
        pub authors: Vec<Author>,
        #[serde(default)]
        pub latest_files_indexes: Vec<FileIndex>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Author {
        pub name: String,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct FileIndex {
        #[serde(default)]
        pub mod_loader: Option<u32>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct File {
        pub display_name: String,
        #[serde(default)]
        pub file_name: String,
        #[serde(default)]
        pub game_versions: Vec<String>,
    }
}

/// CurseForge's numeric `ModLoaderType`.
fn loader_from_type(id: u32) -> Option<LoaderKind> {
    match id {
        1 => Some(LoaderKind::Forge),
        4 => Some(LoaderKind::Fabric),
        6 => Some(LoaderKind::NeoForged),
        _ => None,
    }
}

fn to_mod(m: api::Mod) -> Mod {
    let mut supported_loaders: Vec<LoaderKind> = m
        .latest_files_indexes
        .iter()
        .filter_map(|f| f.mod_loader.and_then(loader_from_type))
        .collect();
    supported_loaders.sort();
    supported_loaders.dedup();

    Mod {
        id: m.id.to_string(),
        name: m.name,
        author: m
            .authors
            .into_iter()
            .map(|a| a.name)
            .collect::<Vec<_>>()
            .join(", "),
        supported_loaders,
    }
}

/// Files carry no version field; pull the first semantic version that is
/// not one of the file's game versions out of the display name, then the
/// file name.
fn file_version(file: &api::File) -> String {
    [file.display_name.as_str(), file.file_name.as_str()]
        .iter()
        .flat_map(|name| {
            name.trim_end_matches(".jar")
                .split(|c: char| c == '-' || c == '_' || c == ' ' || c == '+')
        })
        .filter(|token| !file.game_versions.iter().any(|g| g == token))
        .find(|token| is_valid_version(token))
        .map(|token| token.trim_start_matches('v').to_string())
        .unwrap_or_else(|| file.display_name.clone())
}

/// `gameVersions` mixes game versions with loader and environment tags.
fn to_mod_version(mod_id: &str, file: api::File) -> ModVersion {
    let version = file_version(&file);
    let mut loaders = Vec::new();
    let mut game_versions = Vec::new();
    for tag in file.game_versions {
        if let Some(loader) = LoaderKind::from_upstream(&tag) {
            loaders.push(loader);
        } else if tag.starts_with(|c: char| c.is_ascii_digit()) {
            game_versions.push(tag);
        }
    }
    ModVersion {
        mod_id: mod_id.to_string(),
        version,
        game_versions,
        loaders,
    }
}

/// Mods hosted on curseforge.com, identified by numeric project id.
pub struct CurseForgeSource {
    http_client: HttpClient,
    api_url: String,
}

impl CurseForgeSource {
    pub fn new(http_client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl ModSource for CurseForgeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CurseForge
    }

    fn source(&self) -> ProviderInfo {
        ProviderInfo {
            name: "CurseForge".to_string(),
            description: "Mods, modpacks and addons by Overwolf".to_string(),
            url: "https://www.curseforge.com/minecraft".to_string(),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn mods(&self) -> Result<Vec<Mod>> {
        let url = format!("{}/mods/search", self.api_url);
        debug!("Searching mods on {}...", url);

        let response: api::Envelope<Vec<api::Mod>> = self
            .http_client
            .get_json_with_query(
                &url,
                &[
                    ("gameId", MINECRAFT_GAME_ID),
                    ("classId", MODS_CLASS_ID),
                    ("sortField", "2"),
                    ("sortOrder", "desc"),
                    ("pageSize", PAGE_SIZE),
                ],
            )
            .await?;

        Ok(response.data.into_iter().map(to_mod).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_mod(&self, id: &str) -> Result<Mod> {
        let url = format!("{}/mods/{}", self.api_url, id);
        let response: api::Envelope<api::Mod> = self
            .http_client
            .get_optional_json(&url)
            .await?
            .ok_or_else(|| PackError::not_found("Mod", id))?;
        Ok(to_mod(response.data))
    }

    #[tracing::instrument(skip(self))]
    async fn versions(&self, id: &str) -> Result<Vec<ModVersion>> {
        let url = format!("{}/mods/{}/files", self.api_url, id);
        let response: api::Envelope<Vec<api::File>> = self
            .http_client
            .get_optional_json(&url)
            .await?
            .ok_or_else(|| PackError::not_found("Mod", id))?;

        Ok(response
            .data
            .into_iter()
            .map(|file| to_mod_version(id, file))
            .collect())
    }
}
