use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::catalog::DEFAULT_MANIFEST_URL;
use crate::provider::{
    DEFAULT_CURSEFORGE_URL, DEFAULT_FABRIC_URL, DEFAULT_FORGE_URL, DEFAULT_MODRINTH_URL,
    DEFAULT_NEOFORGE_URL,
};
use crate::runtime::Runtime;

pub const CURSEFORGE_API_KEY_ENV: &str = "CURSEFORGE_API_KEY";

/// Settings shared by every command: where the pack lives and where the
/// upstream catalogs are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pack_dir: PathBuf,
    pub curseforge_api_key: Option<String>,
    pub mojang_url: String,
    pub modrinth_url: String,
    pub curseforge_url: String,
    pub fabric_url: String,
    pub forge_url: String,
    pub neoforge_url: String,
}

fn env_or<R: Runtime + ?Sized>(runtime: &R, key: &str, default: &str) -> String {
    match runtime.env_var(key) {
        Ok(value) if !value.trim().is_empty() => {
            debug!("{} overridden: {}", key, value);
            value.trim_end_matches('/').to_string()
        }
        _ => default.to_string(),
    }
}

impl Config {
    /// `pack_dir` comes from `--dir`/`PACKLAB_DIR`; relative paths and the
    /// default are taken from the current directory.
    pub fn load<R: Runtime + ?Sized>(runtime: &R, pack_dir: Option<PathBuf>) -> Result<Self> {
        let pack_dir = match pack_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => runtime.current_dir()?.join(dir),
            None => runtime.current_dir()?,
        };

        let curseforge_api_key = runtime
            .env_var(CURSEFORGE_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            pack_dir,
            curseforge_api_key,
            mojang_url: env_or(runtime, "PACKLAB_MOJANG_URL", DEFAULT_MANIFEST_URL),
            modrinth_url: env_or(runtime, "PACKLAB_MODRINTH_URL", DEFAULT_MODRINTH_URL),
            curseforge_url: env_or(runtime, "PACKLAB_CURSEFORGE_URL", DEFAULT_CURSEFORGE_URL),
            fabric_url: env_or(runtime, "PACKLAB_FABRIC_URL", DEFAULT_FABRIC_URL),
            forge_url: env_or(runtime, "PACKLAB_FORGE_URL", DEFAULT_FORGE_URL),
            neoforge_url: env_or(runtime, "PACKLAB_NEOFORGE_URL", DEFAULT_NEOFORGE_URL),
        })
    }
}
