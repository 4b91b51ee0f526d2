//! End-to-end indexing runs on local directory trees

use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use webindexer::{Config, Error, Indexer, Order, SortBy};

fn touch(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// root/
///   a.txt
///   debug.log
///   docs/guide.md
///   docs/api/v1.json
///   private/.noindex
///   private/secret.txt
///   tmp/.skipindex
///   tmp/x.bin
///   build/out.o
fn sample_tree() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    touch(root, "a.txt", "hello");
    touch(root, "debug.log", "log");
    touch(root, "docs/guide.md", "# guide");
    touch(root, "docs/api/v1.json", "{}");
    touch(root, "private/.noindex", "");
    touch(root, "private/secret.txt", "s3cr3t");
    touch(root, "tmp/.skipindex", "");
    touch(root, "tmp/x.bin", "xx");
    touch(root, "build/out.o", "obj");
    temp
}

fn config(source: &Path, target: &Path, recursive: bool) -> Config {
    Config {
        source: source.to_string_lossy().to_string(),
        target: target.to_string_lossy().to_string(),
        recursive,
        ..Default::default()
    }
}

fn page(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel).join("index.html")).unwrap()
}

#[tokio::test]
async fn test_recursive_in_place() {
    let temp = sample_tree();
    let root = temp.path();

    let summary = Indexer::from_config(config(root, root, true))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_written, 5);
    assert_eq!(summary.suppressed, 1);

    for dir in ["", "docs", "docs/api", "tmp", "build"] {
        assert!(root.join(dir).join("index.html").is_file(), "{}", dir);
    }
    assert!(!root.join("private/index.html").exists());

    let root_page = page(root, "");
    assert!(root_page.contains("<title>Index of /</title>"));
    assert!(root_page.contains(r#"<a href="docs/">docs/</a>"#));
    // Suppressed directories still appear in their parent's listing.
    assert!(root_page.contains(r#"<a href="private/">private/</a>"#));
    assert!(!root_page.contains(r#"class="up""#));

    let docs_page = page(root, "docs");
    assert!(docs_page.contains("<title>Index of /docs/</title>"));
    assert!(docs_page.contains(r#"<a href="api/">api/</a>"#));
    assert!(docs_page.contains(r#"<a href="../">..</a>"#));

    let tmp_page = page(root, "tmp");
    assert!(tmp_page.contains("x.bin"));
    assert!(!tmp_page.contains(".skipindex"));
}

#[tokio::test]
async fn test_regeneration_does_not_list_index_file() {
    let temp = sample_tree();
    let root = temp.path();

    Indexer::from_config(config(root, root, true))
        .unwrap()
        .run()
        .await
        .unwrap();
    let first = page(root, "docs");

    Indexer::from_config(config(root, root, true))
        .unwrap()
        .run()
        .await
        .unwrap();
    let second = page(root, "docs");

    assert!(!second.contains(r#"href="index.html""#));
    assert_eq!(
        first.matches("<tr class=").count(),
        second.matches("<tr class=").count()
    );
}

#[tokio::test]
async fn test_separate_target() {
    let source = sample_tree();
    let target = tempdir().unwrap();

    Indexer::from_config(config(source.path(), target.path(), true))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(!source.path().join("index.html").exists());
    assert!(target.path().join("index.html").is_file());
    assert!(target.path().join("docs/api/index.html").is_file());
    assert!(!target.path().join("private").exists());
}

#[tokio::test]
async fn test_non_recursive_writes_one_page() {
    let source = sample_tree();
    let target = tempdir().unwrap();

    let summary = Indexer::from_config(config(source.path(), target.path(), false))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_written, 1);
    let written: Vec<_> = fs::read_dir(target.path()).unwrap().collect();
    assert_eq!(written.len(), 1);
}

#[tokio::test]
async fn test_skips_remove_files_and_directories() {
    let source = sample_tree();
    let target = tempdir().unwrap();

    let mut cfg = config(source.path(), target.path(), true);
    cfg.skips = vec!["*.log".to_string(), "build".to_string()];

    Indexer::from_config(cfg).unwrap().run().await.unwrap();

    let root_page = page(target.path(), "");
    assert!(!root_page.contains("debug.log"));
    assert!(!root_page.contains("build/"));
    assert!(root_page.contains("a.txt"));
    assert!(!target.path().join("build").exists());
}

#[tokio::test]
async fn test_sort_order_in_page() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    for name in ["file1.txt", "file2.txt", "file10.txt"] {
        touch(root, name, "x");
    }
    fs::create_dir(root.join("zdir")).unwrap();

    let mut cfg = config(root, root, false);
    cfg.sort_by = SortBy::NaturalName;
    cfg.order = Order::Desc;
    Indexer::from_config(cfg).unwrap().run().await.unwrap();

    let html = page(root, "");
    let positions: Vec<usize> = ["zdir/", "file10.txt", "file2.txt", "file1.txt"]
        .iter()
        .map(|name| html.find(&format!(">{}</a>", name)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", positions);
}

#[tokio::test]
async fn test_custom_template_and_title() {
    let source = sample_tree();
    let target = tempdir().unwrap();
    let template = target.path().join("page.hbs");
    fs::write(
        &template,
        "{{title}}|{{#each items}}{{name}};{{/each}}",
    )
    .unwrap();

    let mut cfg = config(source.path(), target.path(), false);
    cfg.template = Some(template);
    cfg.title = "Files in {{path}}".to_string();
    cfg.skips = vec!["*.log".to_string()];

    Indexer::from_config(cfg).unwrap().run().await.unwrap();

    assert_eq!(
        page(target.path(), ""),
        "Files in /|build/;docs/;private/;tmp/;a.txt;"
    );
}

#[tokio::test]
async fn test_missing_source_fails() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("nope");

    let err = Indexer::from_config(config(&missing, temp.path(), true))
        .unwrap()
        .run()
        .await
        .unwrap_err();

    match err {
        Error::Storage(e) => assert!(e.is_not_found(), "{}", e),
        other => panic!("unexpected error: {}", other),
    }
    assert!(!temp.path().join("index.html").exists());
}

#[test]
fn test_invalid_config_rejected_before_run() {
    let temp = tempdir().unwrap();
    let mut cfg = config(temp.path(), temp.path(), true);
    cfg.concurrency = 0;
    assert!(matches!(Indexer::from_config(cfg), Err(Error::Config(_))));
}
