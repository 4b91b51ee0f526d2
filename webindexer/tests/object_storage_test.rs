//! Indexing runs against object storage held in memory

#![cfg(feature = "s3")]

use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, ObjectStore, PutPayload};
use std::sync::Arc;
use webindexer::storage::{Backend, ObjectStorageBackend, ObjectStoreClient, HTML_CONTENT_TYPE};
use webindexer::{Config, HtmlRenderer, Indexer};

const BUCKET: &str = "test-bucket";

async fn put(store: &InMemory, key: &str, body: &str) {
    store
        .put(&Path::parse(key).unwrap(), PutPayload::from(body.to_string()))
        .await
        .unwrap();
}

async fn page(store: &InMemory, key: &str) -> Option<String> {
    let result = store.get(&Path::parse(key).unwrap()).await.ok()?;
    let content_type = result
        .attributes
        .get(&Attribute::ContentType)
        .map(|v| (**v).to_owned());
    assert_eq!(content_type.as_deref(), Some(HTML_CONTENT_TYPE), "{}", key);
    let bytes = result.bytes().await.unwrap();
    Some(String::from_utf8(bytes.to_vec()).unwrap())
}

/// site/
///   readme.txt
///   docs/guide.md
///   docs/v~1/notes.txt
///   private/.noindex
///   private/secret.txt
///   tmp/.skipindex
///   tmp/x.bin
async fn seeded_store() -> Arc<InMemory> {
    let store = Arc::new(InMemory::new());
    put(&store, "site/readme.txt", "hello").await;
    put(&store, "site/docs/guide.md", "# guide").await;
    put(&store, "site/docs/v~1/notes.txt", "notes").await;
    put(&store, "site/private/.noindex", "").await;
    put(&store, "site/private/secret.txt", "s3cr3t").await;
    put(&store, "site/tmp/.skipindex", "").await;
    put(&store, "site/tmp/x.bin", "xx").await;
    put(&store, "elsewhere/other.txt", "x").await;
    store
}

fn indexer(store: Arc<InMemory>, source_prefix: &str, target_prefix: &str) -> Indexer {
    let config = Config {
        source: format!("s3://{}/{}", BUCKET, source_prefix),
        target: format!("s3://{}/{}", BUCKET, target_prefix),
        recursive: true,
        ..Default::default()
    };
    config.validate().unwrap();

    let options = config.backend_options().unwrap();
    let client = Arc::new(ObjectStoreClient::from_store(BUCKET, store));
    let source: Arc<dyn Backend> = Arc::new(ObjectStorageBackend::new(
        client.clone(),
        BUCKET,
        source_prefix,
        options.clone(),
    ));
    let target: Arc<dyn Backend> = Arc::new(ObjectStorageBackend::new(
        client,
        BUCKET,
        target_prefix,
        options,
    ));
    let renderer = Arc::new(HtmlRenderer::from_config(&config).unwrap());

    Indexer::new(Arc::new(config), source, target, renderer)
}

#[tokio::test]
async fn test_recursive_run_in_place() {
    let store = seeded_store().await;

    let summary = indexer(store.clone(), "site", "site").run().await.unwrap();
    assert_eq!(summary.pages_written, 4);
    assert_eq!(summary.suppressed, 1);

    let root = page(&store, "site/index.html").await.unwrap();
    assert!(root.contains(r#"<a href="docs/">docs/</a>"#));
    assert!(root.contains(r#"<a href="private/">private/</a>"#));
    assert!(root.contains("readme.txt"));
    assert!(!root.contains("elsewhere"));

    let docs = page(&store, "site/docs/index.html").await.unwrap();
    assert!(docs.contains(r#"<a href="v~1/">v~1/</a>"#));

    let versioned = page(&store, "site/docs/v~1/index.html").await.unwrap();
    assert!(versioned.contains("<title>Index of /docs/v~1/</title>"));
    assert!(versioned.contains("notes.txt"));

    let tmp = page(&store, "site/tmp/index.html").await.unwrap();
    assert!(tmp.contains("x.bin"));
    assert!(!tmp.contains(".skipindex"));

    assert!(page(&store, "site/private/index.html").await.is_none());
}

#[tokio::test]
async fn test_rerun_does_not_list_pages() {
    let store = seeded_store().await;

    indexer(store.clone(), "site", "site").run().await.unwrap();
    let summary = indexer(store.clone(), "site", "site").run().await.unwrap();
    assert_eq!(summary.pages_written, 4);

    let docs = page(&store, "site/docs/index.html").await.unwrap();
    assert!(!docs.contains("index.html"));
}

#[tokio::test]
async fn test_separate_target_prefix() {
    let store = seeded_store().await;

    indexer(store.clone(), "site", "pages/site")
        .run()
        .await
        .unwrap();

    assert!(page(&store, "site/index.html").await.is_none());
    assert!(page(&store, "pages/site/index.html").await.is_some());
    assert!(page(&store, "pages/site/docs/v~1/index.html").await.is_some());
    assert!(page(&store, "pages/site/private/index.html").await.is_none());
}
