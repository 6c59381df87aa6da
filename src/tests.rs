//! Integration tests for the audit backend.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, StoreBackend};
use crate::db::{init_store, PROJECTS_KEY, TAGS_KEY};
use crate::storage::{BlobStore, MemoryBlobStore, StorageError, StorageResult};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    blobs: Arc<dyn BlobStore>,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_store(Arc::new(MemoryBlobStore::new())).await
    }

    async fn with_store(blobs: Arc<dyn BlobStore>) -> Self {
        let state = AppState::new(blobs.clone());
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            blobs,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn stored(&self, key: &str) -> Option<Value> {
        let body = self.blobs.get(key).await.unwrap()?;
        Some(serde_json::from_slice(&body).unwrap())
    }

    async fn create(&self, owner: &str, project: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/projects"))
            .query(&[("owner_email", owner)])
            .json(project)
            .send()
            .await
            .unwrap()
    }
}

fn project(owner: &str, name: &str) -> Value {
    json!({
        "user": [{ "email": owner, "name": "Owner" }],
        "details": { "name": name, "short_name": "p" },
        "architecture": {
            "languages": { "main": "Python", "others": ["TypeScript"] },
            "frameworks": ["Flask"]
        }
    })
}

/// Blob store whose every call fails.
struct BrokenStore;

#[async_trait]
impl BlobStore for BrokenStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Err(StorageError::Read {
            key: key.to_string(),
            source: std::io::Error::other("bucket unreachable"),
        })
    }

    async fn put(&self, key: &str, _body: Vec<u8>) -> StorageResult<()> {
        Err(StorageError::Write {
            key: key.to_string(),
            source: std::io::Error::other("bucket unreachable"),
        })
    }
}

/// Memory store that refuses writes to the tag registry.
struct ReadOnlyTagsStore {
    inner: MemoryBlobStore,
}

#[async_trait]
impl BlobStore for ReadOnlyTagsStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> StorageResult<()> {
        if key == TAGS_KEY {
            return Err(StorageError::Write {
                key: key.to_string(),
                source: std::io::Error::other("permission denied"),
            });
        }
        self.inner.put(key, body).await
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_home_banner() {
    let fixture = TestFixture::new().await;

    let resp = fixture.client.get(fixture.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        "Welcome to the KEH Tech Audit Tool API!"
    );
}

#[tokio::test]
async fn test_list_projects_empty_store() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects?owner_email=a@x.com"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_projects_requires_owner_email() {
    let fixture = TestFixture::new().await;

    for path in ["/api/projects", "/api/projects?owner_email="] {
        let resp = fixture.client.get(fixture.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 400, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "owner_email is required");
    }
}

#[tokio::test]
async fn test_project_crud_flow() {
    let fixture = TestFixture::new().await;
    let audit = project("a@x.com", "audit");

    // Create
    let resp = fixture.create("a@x.com", &audit).await;
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created, audit);

    // Get by name
    let resp = fixture
        .client
        .get(fixture.url("/api/projects/audit?owner_email=a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, audit);

    // List
    fixture.create("b@x.com", &project("b@x.com", "other")).await;
    fixture.create("a@x.com", &project("a@x.com", "second")).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects?owner_email=a@x.com"))
        .send()
        .await
        .unwrap();
    let listed: Value = resp.json().await.unwrap();
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["details"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["audit", "second"]);

    let stored = fixture.stored(PROJECTS_KEY).await.unwrap();
    assert_eq!(stored["projects"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_project_not_found() {
    let fixture = TestFixture::new().await;
    fixture.create("a@x.com", &project("a@x.com", "audit")).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects/audit?owner_email=b@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Project not found");

    let resp = fixture
        .client
        .get(fixture.url("/api/projects/audit"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_get_project_with_encoded_name() {
    let fixture = TestFixture::new().await;
    fixture
        .create("a@x.com", &project("a@x.com", "audit tool"))
        .await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects/audit%20tool?owner_email=a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_create_duplicate_conflict() {
    let fixture = TestFixture::new().await;
    let audit = project("a@x.com", "audit");

    assert_eq!(fixture.create("a@x.com", &audit).await.status(), 201);

    let resp = fixture.create("a@x.com", &audit).await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Project with the same name and owner already exists"
    );

    let stored = fixture.stored(PROJECTS_KEY).await.unwrap();
    assert_eq!(stored["projects"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_validation() {
    let fixture = TestFixture::new().await;

    // Missing owner_email query parameter
    let resp = fixture
        .client
        .post(fixture.url("/api/projects"))
        .json(&project("a@x.com", "audit"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Payload without details.name
    let resp = fixture
        .create("a@x.com", &json!({ "user": [{ "email": "a@x.com" }], "details": {} }))
        .await;
    assert_eq!(resp.status(), 406);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Missing JSON data");

    // Payload of the wrong shape
    let resp = fixture.create("a@x.com", &json!(["not", "an", "object"])).await;
    assert_eq!(resp.status(), 406);

    assert!(fixture.stored(PROJECTS_KEY).await.is_none());
}

#[tokio::test]
async fn test_create_registers_languages_for_autocomplete() {
    let fixture = TestFixture::new().await;
    fixture.create("a@x.com", &project("a@x.com", "audit")).await;

    let tags = fixture.stored(TAGS_KEY).await.unwrap();
    assert_eq!(tags, json!({ "languages": ["python", "typescript"] }));

    let resp = fixture
        .client
        .get(fixture.url("/api/autocomplete"))
        .query(&[("type", "languages"), ("search", "Py")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!(["python"]));
}

#[tokio::test]
async fn test_autocomplete_errors() {
    let fixture = TestFixture::new().await;
    fixture.create("a@x.com", &project("a@x.com", "audit")).await;

    let cases = [
        ("/api/autocomplete?type=languages", 400),
        ("/api/autocomplete?search=py", 400),
        ("/api/autocomplete?type=frameworks&search=py", 406),
        ("/api/autocomplete?type=languages&search=zzzzzzzzzzzzzzzzzz", 411),
        ("/api/autocomplete?type=languages&search=cobol", 404),
        ("/api/autocomplete?type=misc&search=x", 404),
    ];

    for (path, status) in cases {
        let resp = fixture.client.get(fixture.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), status, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert!(body["message"].is_string(), "{}", path);
    }
}

#[tokio::test]
async fn test_autocomplete_seeded_categories() {
    let fixture = TestFixture::new().await;
    fixture
        .blobs
        .put(
            TAGS_KEY,
            serde_json::to_vec(&json!({ "IDEs": ["VS Code", "Visual Studio", "Vim"] })).unwrap(),
        )
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/autocomplete?type=IDEs&search=visual"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!(["Visual Studio"]));
}

#[tokio::test]
async fn test_storage_failure_is_server_error() {
    let fixture = TestFixture::with_store(Arc::new(BrokenStore)).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects?owner_email=a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let resp = fixture.create("a@x.com", &project("a@x.com", "audit")).await;
    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn test_tag_write_failure_keeps_saved_project() {
    let fixture = TestFixture::with_store(Arc::new(ReadOnlyTagsStore {
        inner: MemoryBlobStore::new(),
    }))
    .await;
    let audit = project("a@x.com", "audit");

    let resp = fixture.create("a@x.com", &audit).await;
    assert_eq!(resp.status(), 500);

    assert_eq!(
        fixture.stored(PROJECTS_KEY).await,
        Some(json!({ "projects": [audit] }))
    );
    assert!(fixture.stored(TAGS_KEY).await.is_none());

    let resp = fixture
        .client
        .get(fixture.url("/api/projects/audit?owner_email=a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), audit);
}

#[tokio::test]
async fn test_filesystem_store_persists_across_restarts() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        region: Some("eu-west-2".to_string()),
        store_backend: StoreBackend::Fs,
        data_dir: temp_dir.path().to_path_buf(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
    };

    let first = TestFixture::with_store(init_store(&config).await.unwrap()).await;
    assert_eq!(
        first.create("a@x.com", &project("a@x.com", "audit")).await.status(),
        201
    );

    let second = TestFixture::with_store(init_store(&config).await.unwrap()).await;
    let resp = second
        .client
        .get(second.url("/api/projects/audit?owner_email=a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let raw = std::fs::read_to_string(
        temp_dir
            .path()
            .join(crate::storage::BUCKET)
            .join(PROJECTS_KEY),
    )
    .unwrap();
    assert!(raw.starts_with("{\n    \"projects\": ["));
}
