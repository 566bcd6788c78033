//! Repository install integration tests
//! Run with: cargo test --test repo_fetcher_test

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use carik_loader::application::errors::ExtensionError;
use carik_loader::application::HostContext;
use carik_loader::extensions::{spawn_install, ExtensionLoader};
use carik_loader::i18n::TextResourceStore;
use carik_loader::infrastructure::git::{RepoCloner, RepoFetcher};
use carik_loader::infrastructure::settings::EnvFileSettings;

/// Records clone calls and lays out a minimal extension
#[derive(Clone, Default)]
struct FakeCloner {
    calls: Arc<Mutex<Vec<(String, PathBuf)>>>,
}

impl FakeCloner {
    fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoCloner for FakeCloner {
    async fn clone_repo(&self, url: &str, destination: &Path) -> Result<(), ExtensionError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));

        let en = destination.join("locale").join("en");
        tokio::fs::create_dir_all(&en).await?;
        tokio::fs::write(en.join("title.txt"), "Installed").await?;
        Ok(())
    }
}

/// Fails after leaving a partial checkout behind
struct FailingCloner;

#[async_trait]
impl RepoCloner for FailingCloner {
    async fn clone_repo(&self, url: &str, destination: &Path) -> Result<(), ExtensionError> {
        tokio::fs::create_dir_all(destination).await?;
        Err(ExtensionError::Install {
            url: url.to_string(),
            reason: "repository not found".to_string(),
        })
    }
}

fn loader(root: &Path) -> ExtensionLoader {
    let context = HostContext::new(
        Arc::new(EnvFileSettings::in_memory()),
        TextResourceStore::new("en"),
        root,
    );
    ExtensionLoader::new(context)
}

#[tokio::test]
async fn test_install_clones_once() {
    let temp = tempfile::tempdir().unwrap();
    let cloner = FakeCloner::default();
    let fetcher = RepoFetcher::with_cloner(cloner.clone());

    let path = fetcher
        .install("https://github.com/user/weather.git", temp.path())
        .await
        .unwrap();
    assert_eq!(path, temp.path().join("weather"));

    let again = fetcher
        .install("https://github.com/user/weather.git", temp.path())
        .await
        .unwrap();
    assert_eq!(again, path);

    let calls = cloner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "https://github.com/user/weather.git");
}

#[tokio::test]
async fn test_failed_clone_leaves_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let fetcher = RepoFetcher::with_cloner(FailingCloner);

    let err = fetcher
        .install("https://github.com/user/missing.git", temp.path())
        .await
        .unwrap_err();

    assert!(matches!(err, ExtensionError::Install { .. }));
    assert!(!temp.path().join("missing").exists());
}

#[tokio::test]
async fn test_install_and_load() {
    let temp = tempfile::tempdir().unwrap();
    let fetcher = RepoFetcher::with_cloner(FakeCloner::default());
    let mut loader = loader(temp.path());

    let outcome = loader
        .install_and_load("https://github.com/user/weather.git", &fetcher)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.name, "weather");
    assert_eq!(loader.context().texts().lookup("weather:TITLE"), Some("Installed"));
}

#[tokio::test]
async fn test_malformed_url_is_not_added() {
    let temp = tempfile::tempdir().unwrap();
    let fetcher = RepoFetcher::with_cloner(FakeCloner::default());
    let mut loader = loader(temp.path());

    let err = loader
        .install_and_load("https://github.com/user/", &fetcher)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtensionError::MalformedRepoUrl(_)));
    assert!(loader.descriptors().is_empty());
}

#[tokio::test]
async fn test_spawn_install_in_background() {
    let temp = tempfile::tempdir().unwrap();
    let shared = Arc::new(tokio::sync::Mutex::new(loader(temp.path())));
    let fetcher = Arc::new(RepoFetcher::with_cloner(FakeCloner::default()));

    let first = spawn_install(shared.clone(), fetcher.clone(), "https://example.com/a/notes.git".to_string());
    let second = spawn_install(shared.clone(), fetcher, "https://example.com/b/todo".to_string());

    assert!(first.await.unwrap().unwrap().is_success());
    assert!(second.await.unwrap().unwrap().is_success());

    let loader = shared.lock().await;
    assert_eq!(loader.descriptors().len(), 2);
    assert!(loader.descriptor("notes").is_some());
    assert!(loader.descriptor("todo").is_some());
}
