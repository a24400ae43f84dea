//! Reading and writing `packlab.yml` through the [`Runtime`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use super::PackManifest;
use crate::error::PackError;
use crate::runtime::Runtime;

pub const MANIFEST_FILE: &str = "packlab.yml";

pub struct ManifestStore<'a, R: Runtime + ?Sized> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime + ?Sized> ManifestStore<'a, R> {
    pub fn new(runtime: &'a R, dir: &Path) -> Self {
        Self {
            runtime,
            path: dir.join(MANIFEST_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.runtime.exists(&self.path)
    }

    /// Read the manifest. A missing or blank file yields `None`.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<PackManifest>> {
        if !self.exists() {
            return Ok(None);
        }
        let content = self.runtime.read_to_string(&self.path)?;
        if content.trim().is_empty() {
            debug!("{} is empty, treating it as absent", self.path.display());
            return Ok(None);
        }
        let manifest = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(manifest))
    }

    /// Read the manifest, failing with [`PackError::ManifestMissing`] when there is none.
    pub fn load_required(&self) -> Result<PackManifest> {
        self.load()?
            .ok_or_else(|| PackError::ManifestMissing(self.path.display().to_string()).into())
    }

    /// Make sure a new manifest may be written here. An existing file may only
    /// be replaced after the user confirms; declining fails with
    /// [`PackError::ManifestAlreadyExists`].
    pub fn ensure_writable(&self) -> Result<()> {
        if !self.exists() {
            return Ok(());
        }
        let prompt = format!("{} already exists. Overwrite?", self.path.display());
        if !self.runtime.confirm(&prompt)? {
            return Err(PackError::ManifestAlreadyExists(self.path.display().to_string()).into());
        }
        info!("Overwriting {}", self.path.display());
        Ok(())
    }

    /// Write a brand new manifest, see [`ManifestStore::ensure_writable`].
    #[tracing::instrument(skip(self, manifest), fields(path = %self.path.display()))]
    pub fn create(&self, manifest: &PackManifest) -> Result<()> {
        self.ensure_writable()?;
        self.write(manifest)
    }

    /// Validate and write back a manifest that was loaded from this store.
    #[tracing::instrument(skip(self, manifest), fields(path = %self.path.display()))]
    pub fn save(&self, manifest: &PackManifest) -> Result<()> {
        self.write(manifest)
    }

    fn write(&self, manifest: &PackManifest) -> Result<()> {
        manifest.check()?;
        if let Some(parent) = self.path.parent() {
            if !self.runtime.exists(parent) {
                self.runtime.create_dir_all(parent)?;
            }
        }
        let yaml = serde_yaml::to_string(manifest).context("Failed to serialize manifest")?;
        self.runtime.write(&self.path, yaml.as_bytes())?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}
