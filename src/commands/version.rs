use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use crate::manifest::{BumpType, ManifestStore};
use crate::runtime::Runtime;

use super::config::Config;

/// Increment the pack version (`major`, `minor` or `patch`).
#[tracing::instrument(skip(runtime))]
pub fn version<R: Runtime>(runtime: R, pack_dir: Option<PathBuf>, bump: &str) -> Result<()> {
    let bump = bump.parse::<BumpType>()?;
    let config = Config::load(&runtime, pack_dir)?;
    run(&runtime, &config.pack_dir, bump)
}

pub(crate) fn run<R: Runtime + ?Sized>(runtime: &R, pack_dir: &Path, bump: BumpType) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    let mut manifest = store.load_required()?;

    let previous = manifest.pack_version.clone();
    let current = manifest.bump(bump).clone();
    store.save(&manifest)?;

    info!("Bumped {} version of {}", bump, manifest.name);
    println!("{} {} -> {}", manifest.name, previous, current);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{MemoryFiles, SAMPLE_MANIFEST};
    use crate::error::{PackError, pack_error};
    use crate::manifest::MANIFEST_FILE;
    use crate::runtime::MockRuntime;
    use semver::Version;

    #[test]
    fn test_bump_minor() {
        let path = Path::new("/packs/demo").join(MANIFEST_FILE);
        let files = MemoryFiles::default();
        files.put(&path, SAMPLE_MANIFEST);
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);

        run(&runtime, Path::new("/packs/demo"), BumpType::Minor).unwrap();

        assert_eq!(files.manifest(&path).pack_version, Version::new(1, 3, 0));
    }

    #[test]
    fn test_missing_manifest() {
        let files = MemoryFiles::default();
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);

        let err = run(&runtime, Path::new("/packs/demo"), BumpType::Patch).unwrap_err();
        assert!(matches!(pack_error(&err), Some(PackError::ManifestMissing(_))));
    }

    #[test]
    fn test_unknown_bump_type() {
        let runtime = MockRuntime::new();
        assert!(version(runtime, None, "sideways").is_err());
    }
}
