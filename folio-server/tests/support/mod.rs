use std::{path::PathBuf, sync::Arc};

use axum_test::TestServer;
use folio_config::{ConfigLoader, EnvConfig};
use folio_core::{LocalContentStore, MemoryMailer, Repositories};
use folio_server::{AppState, create_app};
use tempfile::TempDir;

pub const PUBLIC_BASE_URL: &str = "http://localhost:5000";

pub const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const JPEG: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

// Not every test binary touches every field.
#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub mailer: Arc<MemoryMailer>,
    pub uploads: PathBuf,
    _tempdir: TempDir,
}

#[allow(unused)]
impl TestApp {
    /// Path component of a URL handed out by the local store.
    pub fn local_path(url: &str) -> &str {
        url.strip_prefix(PUBLIC_BASE_URL)
            .unwrap_or_else(|| panic!("{url} is not a local upload"))
    }

    pub fn stored_files(&self) -> usize {
        let dir = self.uploads.join("projects");
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).count(),
            Err(_) => 0,
        }
    }
}

pub async fn build_test_app() -> TestApp {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let uploads = tempdir.path().join("uploads");

    let env = EnvConfig {
        dev_mode: Some(true),
        public_base_url: Some(PUBLIC_BASE_URL.to_string()),
        storage_root: Some(uploads.clone()),
        admin_email: Some("owner@example.com".to_string()),
        ..EnvConfig::default()
    };
    let load = ConfigLoader::new()
        .load_with_env(env, false)
        .expect("test configuration loads");

    let store = LocalContentStore::new(uploads.clone(), PUBLIC_BASE_URL)
        .expect("local store");
    store.ensure_root().await.expect("upload root");

    let mailer = Arc::new(MemoryMailer::default());
    let state = AppState::new(
        Arc::new(load.config),
        Repositories::in_memory(),
        store,
        mailer.clone(),
    );

    let server = TestServer::builder()
        .http_transport()
        .build(create_app(state.clone()))
        .expect("test server");

    TestApp {
        server,
        state,
        mailer,
        uploads,
        _tempdir: tempdir,
    }
}
