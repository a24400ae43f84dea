use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::error::PackError;
use crate::manifest::{ManifestStore, PackManifest, non_empty};
use crate::provider::{LoaderKind, SourceKind};
use crate::resolution::{LoaderResolver, Strategy, ask, select_non_empty};
use crate::runtime::Runtime;

use super::config::Config;
use super::services::Services;

/// Create a new `packlab.yml` in the pack directory.
#[tracing::instrument(skip(runtime))]
pub async fn init<R: Runtime>(
    runtime: R,
    pack_dir: Option<PathBuf>,
    strategy: Option<Strategy>,
) -> Result<()> {
    let config = Config::load(&runtime, pack_dir)?;
    let services = Services::from_config(&config)?;
    run(&runtime, &config.pack_dir, &services, strategy).await
}

fn ask_name<R: Runtime + ?Sized>(runtime: &R, default: &str) -> Result<String> {
    loop {
        let name = ask(runtime, "What is the modpack name?", Some(default))?;
        if let Some(name) = non_empty(name) {
            return Ok(name);
        }
        warn!("The modpack name is required!");
    }
}

#[tracing::instrument(skip(runtime, services))]
pub(crate) async fn run<R: Runtime + ?Sized>(
    runtime: &R,
    pack_dir: &Path,
    services: &Services,
    strategy: Option<Strategy>,
) -> Result<()> {
    let store = ManifestStore::new(runtime, pack_dir);
    store.ensure_writable()?;

    let dir_name = pack_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = ask_name(runtime, &dir_name)?;
    let author = non_empty(ask(runtime, "Who is the modpack author?", None)?);
    let description = non_empty(ask(
        runtime,
        "Enter a short description, if desired.",
        None,
    )?);
    let url = non_empty(ask(runtime, "Enter a URL, if available.", None)?);

    let releases = services.catalog.fetch().await?.releases();
    if releases.is_empty() {
        return Err(PackError::no_compatible("Minecraft", "release").into());
    }

    let versions = select_non_empty(
        runtime,
        "Which game versions should be supported?",
        "game version",
        &releases,
        &[],
    )?;
    let sources = select_non_empty(
        runtime,
        "Which mod sources should be used?",
        "mod source",
        &SourceKind::all(),
        &[0],
    )?;
    let loaders = select_non_empty(
        runtime,
        "Which mod loaders should be supported?",
        "mod loader",
        &LoaderKind::all(),
        &[],
    )?;

    let mut manifest = PackManifest::new(name, sources, loaders.clone(), versions.clone())?
        .with_author(author)
        .with_description(description)
        .with_url(url);

    let resolver = LoaderResolver::new(runtime, &services.registry).with_strategy(strategy);
    manifest.loader_versions = resolver.resolve(&loaders, &versions).await?;

    store.save(&manifest)?;
    info!("Created {}", store.path().display());
    println!("Created {}", store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{MemoryFiles, services_with};
    use crate::error::pack_error;
    use crate::manifest::MANIFEST_FILE;
    use crate::runtime::MockRuntime;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const PACK_DIR: &str = "/packs/my-pack";

    /// An empty scripted answer takes the prompt's default, as a real terminal does.
    fn scripted_inputs(runtime: &mut MockRuntime, answers: Vec<Option<&'static str>>) {
        let answers = Mutex::new(VecDeque::from(answers));
        runtime.expect_input().returning(move |_, default| {
            let answer = answers.lock().unwrap().pop_front().expect("unexpected prompt");
            Ok(answer.map(|a| match (a, default) {
                ("", Some(default)) => default.to_string(),
                (a, _) => a.to_string(),
            }))
        });
    }

    fn scripted_multi_selects(runtime: &mut MockRuntime, answers: Vec<Vec<usize>>) {
        let answers = Mutex::new(VecDeque::from(answers));
        runtime
            .expect_multi_select()
            .returning(move |_, _, _| Ok(answers.lock().unwrap().pop_front()));
    }

    #[tokio::test]
    async fn test_init_happy_path() {
        let files = MemoryFiles::default();
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);
        scripted_inputs(
            &mut runtime,
            vec![
                Some(""), // name: accept directory name
                Some("Steve"),
                Some(""),
                Some(""),
                Some("0.15.11"),
                Some("0.15.11"),
            ],
        );
        // catalog is [1.20.4, 1.20.1]; pick both, modrinth, fabric
        scripted_multi_selects(&mut runtime, vec![vec![0, 1], vec![0], vec![1]]);
        runtime
            .expect_select()
            .times(1)
            .returning(|_, _| Ok(Some(0))); // manual

        let services = services_with(&["1.20.4", "1.20.1"], &[]);
        run(&runtime, Path::new(PACK_DIR), &services, None)
            .await
            .unwrap();

        let manifest = files.manifest(&Path::new(PACK_DIR).join(MANIFEST_FILE));
        assert_eq!(manifest.name, "my-pack");
        assert_eq!(manifest.author.as_deref(), Some("Steve"));
        assert_eq!(manifest.description, None);
        assert_eq!(
            manifest.versions.iter().collect::<Vec<_>>(),
            vec!["1.20.1", "1.20.4"]
        );
        assert!(manifest.sources.contains(&SourceKind::Modrinth));
        assert_eq!(manifest.loaders.len(), 1);
        assert_eq!(manifest.loader_version(LoaderKind::Fabric, "1.20.1"), Some("0.15.11"));
        assert_eq!(manifest.loader_version(LoaderKind::Fabric, "1.20.4"), Some("0.15.11"));
        assert!(manifest.mods.is_empty());
    }

    #[tokio::test]
    async fn test_init_reprompts_empty_loader_selection() {
        let files = MemoryFiles::default();
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);
        scripted_inputs(&mut runtime, vec![Some("pack"), Some(""), Some(""), Some("")]);
        scripted_multi_selects(
            &mut runtime,
            vec![vec![0], vec![0], vec![], vec![], vec![1]],
        );

        let services = services_with(&["1.20.1"], &["0.15.11"]);
        run(&runtime, Path::new(PACK_DIR), &services, Some(Strategy::Latest))
            .await
            .unwrap();

        let manifest = files.manifest(&Path::new(PACK_DIR).join(MANIFEST_FILE));
        assert_eq!(
            manifest.loaders.iter().copied().collect::<Vec<_>>(),
            vec![LoaderKind::Fabric]
        );
        assert_eq!(manifest.loader_version(LoaderKind::Fabric, "1.20.1"), Some("0.15.11"));
    }

    #[tokio::test]
    async fn test_init_existing_manifest_declined() {
        let files = MemoryFiles::default();
        files.put(&Path::new(PACK_DIR).join(MANIFEST_FILE), "name: old\n");
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);
        runtime.expect_confirm().returning(|_| Ok(false));
        runtime.expect_input().never();

        let services = services_with(&["1.20.1"], &[]);
        let err = run(&runtime, Path::new(PACK_DIR), &services, None)
            .await
            .unwrap_err();

        assert!(matches!(
            pack_error(&err),
            Some(PackError::ManifestAlreadyExists(_))
        ));
        assert_eq!(
            files.get(&Path::new(PACK_DIR).join(MANIFEST_FILE)).as_deref(),
            Some("name: old\n")
        );
    }

    #[tokio::test]
    async fn test_init_cancelled_at_prompt() {
        let files = MemoryFiles::default();
        let mut runtime = MockRuntime::new();
        files.install(&mut runtime);
        scripted_inputs(&mut runtime, vec![None]);

        let services = services_with(&["1.20.1"], &[]);
        let err = run(&runtime, Path::new(PACK_DIR), &services, None)
            .await
            .unwrap_err();

        assert!(matches!(pack_error(&err), Some(PackError::Cancelled)));
        assert!(files.get(&Path::new(PACK_DIR).join(MANIFEST_FILE)).is_none());
    }
}
