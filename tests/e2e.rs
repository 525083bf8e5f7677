//! End-to-end integration tests for sitepdf.
//!
//! These tests build real HTML trees in temp directories and run the full
//! pipeline against a stubbed [`PdfConverter`], so no network is touched and
//! no API key is needed.

use async_trait::async_trait;
use sitepdf::{
    generate, ConversionConfig, PageDiscovery, PageError, PdfConverter, RunOutput, SitePdfError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Always-succeeding converter that records every document it receives.
struct StubConverter {
    calls: AtomicUsize,
    documents: Mutex<Vec<(String, String)>>,
    fail_slug: Option<String>,
}

impl StubConverter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            documents: Mutex::new(Vec::new()),
            fail_slug: None,
        })
    }

    fn failing_for(slug: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            documents: Mutex::new(Vec::new()),
            fail_slug: Some(slug.to_string()),
        })
    }
}

#[async_trait]
impl PdfConverter for StubConverter {
    async fn convert(&self, html: &str, slug: &str) -> Result<Vec<u8>, PageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .lock()
            .unwrap()
            .push((slug.to_string(), html.to_string()));
        if self.fail_slug.as_deref() == Some(slug) {
            return Err(PageError::Conversion {
                slug: slug.to_string(),
                status: 500,
                status_text: "Internal Server Error".to_string(),
                body: "stub failure".to_string(),
            });
        }
        Ok(format!("%PDF-1.7 stub for {slug}").into_bytes())
    }
}

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html>
<head><title>{title}</title><link rel="stylesheet" href="/style.css"></head>
<body><h1>{title}</h1><img src="/images/cover.png" alt="cover"></body>
</html>
"#;

/// Write a two-page build tree: `index.html` and `guide/index.html`, both
/// referencing the shared stylesheet and one image.
fn write_site(root: &Path) {
    fs::create_dir_all(root.join("guide")).unwrap();
    fs::create_dir_all(root.join("images")).unwrap();
    fs::write(root.join("style.css"), "body{font-family:serif}").unwrap();
    fs::write(root.join("images/cover.png"), [0x89, 0x50, 0x4e, 0x47]).unwrap();
    fs::write(
        root.join("index.html"),
        PAGE_TEMPLATE.replace("{title}", "Home"),
    )
    .unwrap();
    fs::write(
        root.join("guide/index.html"),
        PAGE_TEMPLATE.replace("{title}", "Guide"),
    )
    .unwrap();
}

fn site() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("dist");
    fs::create_dir_all(&root).unwrap();
    write_site(&root);
    (tmp, root)
}

fn config_with(root: &Path, converter: Arc<StubConverter>) -> ConversionConfig {
    ConversionConfig::builder()
        .output_root(root)
        .converter(converter)
        .build()
        .expect("valid config")
}

fn assert_pdf(path: &Path, slug: &str) {
    let bytes = fs::read(path)
        .unwrap_or_else(|e| panic!("expected artifact at {}: {e}", path.display()));
    assert_eq!(
        String::from_utf8_lossy(&bytes),
        format!("%PDF-1.7 stub for {slug}")
    );
}

// ── Discovery + naming scenarios ─────────────────────────────────────────────

#[tokio::test]
async fn two_page_tree_yields_home_and_guide_artifacts() {
    let (_tmp, root) = site();
    let stub = StubConverter::new();

    let output = generate(&config_with(&root, Arc::clone(&stub)))
        .await
        .expect("run should succeed");

    assert_eq!(output.stats.discovered, 2);
    assert_eq!(output.stats.written, 2);
    assert_eq!(output.stats.failed, 0);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 2);

    assert_pdf(&root.join("pdf/home.pdf"), "home");
    assert_pdf(&root.join("pdf/guide.pdf"), "guide");
    // The root page maps to the sentinel, never to `index.pdf`.
    assert!(!root.join("pdf/index.pdf").exists());
}

#[tokio::test]
async fn fixed_mode_converts_exactly_one_page() {
    let (_tmp, root) = site();
    let stub = StubConverter::new();
    let config = ConversionConfig::builder()
        .output_root(&root)
        .pages(PageDiscovery::Fixed(root.join("guide/index.html")))
        .converter(stub.clone())
        .build()
        .unwrap();

    let output = generate(&config).await.expect("run should succeed");

    assert_eq!(output.stats.written, 1);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    assert_pdf(&root.join("pdf/guide.pdf"), "guide");
    assert!(!root.join("pdf/home.pdf").exists());
}

#[tokio::test]
async fn rebuild_overwrites_existing_artifacts() {
    let (_tmp, root) = site();
    // Pre-existing output directory and stale artifact must not break a run.
    fs::create_dir_all(root.join("pdf")).unwrap();
    fs::write(root.join("pdf/home.pdf"), "stale").unwrap();

    let output = generate(&config_with(&root, StubConverter::new()))
        .await
        .expect("run should succeed");

    assert_eq!(output.stats.written, 2);
    assert_pdf(&root.join("pdf/home.pdf"), "home");
}

// ── Inlining through the full pipeline ───────────────────────────────────────

#[tokio::test]
async fn converter_receives_self_contained_documents() {
    let (_tmp, root) = site();
    let stub = StubConverter::new();

    generate(&config_with(&root, Arc::clone(&stub)))
        .await
        .expect("run should succeed");

    let documents = stub.documents.lock().unwrap();
    assert_eq!(documents.len(), 2);
    for (slug, html) in documents.iter() {
        assert!(
            html.contains("body{font-family:serif}"),
            "{slug}: stylesheet text must be inlined"
        );
        assert!(
            !html.contains(r#"href="/style.css""#),
            "{slug}: external stylesheet reference must be gone"
        );
        assert!(
            html.contains("data:image/png;base64,"),
            "{slug}: image must be data-embedded"
        );
    }
}

// ── Failure isolation ────────────────────────────────────────────────────────

#[tokio::test]
async fn sibling_pages_survive_a_broken_asset() {
    let (_tmp, root) = site();
    // Third page whose image reference resolves to nothing.
    fs::create_dir_all(root.join("notes")).unwrap();
    fs::write(
        root.join("notes/index.html"),
        r#"<html><body><img src="/images/missing.png"></body></html>"#,
    )
    .unwrap();
    let stub = StubConverter::new();

    let output = generate(&config_with(&root, Arc::clone(&stub)))
        .await
        .expect("run should succeed despite one bad page");

    assert_eq!(output.stats.discovered, 3);
    assert_eq!(output.stats.written, 2);
    assert_eq!(output.stats.failed, 1);

    // The siblings produced real artifacts.
    assert_pdf(&root.join("pdf/home.pdf"), "home");
    assert_pdf(&root.join("pdf/guide.pdf"), "guide");
    assert!(!root.join("pdf/notes.pdf").exists());

    // Only the broken page is reported, and its error names the asset.
    let failures: Vec<_> = output.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].slug, "notes");
    match failures[0].error.as_ref().unwrap() {
        PageError::Asset { asset, .. } => assert!(asset.ends_with("images/missing.png")),
        other => panic!("expected Asset error, got {other:?}"),
    }
    // The broken page never reached the converter.
    assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_conversion_is_reported_with_slug_status_and_body() {
    let (_tmp, root) = site();
    let stub = StubConverter::failing_for("guide");

    let output = generate(&config_with(&root, stub))
        .await
        .expect("run should succeed despite one rejection");

    assert_eq!(output.stats.written, 1);
    assert_eq!(output.stats.failed, 1);
    let failure = output.failures().next().unwrap();
    let msg = failure.error.as_ref().unwrap().to_string();
    assert!(msg.contains("guide"), "got: {msg}");
    assert!(msg.contains("500"), "got: {msg}");
    assert!(msg.contains("stub failure"), "got: {msg}");
    // No partial artifact for the rejected page.
    assert!(!root.join("pdf/guide.pdf").exists());
}

#[tokio::test]
async fn a_run_where_every_page_fails_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("dist");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("index.html"),
        r#"<html><body><img src="/images/gone.png"></body></html>"#,
    )
    .unwrap();

    let err = generate(&config_with(&root, StubConverter::new()))
        .await
        .unwrap_err();
    match err {
        SitePdfError::AllPagesFailed { total, first_error } => {
            assert_eq!(total, 1);
            assert!(first_error.contains("home"), "got: {first_error}");
        }
        other => panic!("expected AllPagesFailed, got {other:?}"),
    }
}

// ── Configuration ordering ───────────────────────────────────────────────────

#[tokio::test]
async fn missing_api_key_aborts_before_any_work() {
    // The output root does not even exist: a missing credential must win,
    // proving the check runs before discovery touches the filesystem.
    let config = ConversionConfig::builder()
        .output_root("/definitely/not/a/build/tree")
        .build()
        .unwrap();

    let err = generate(&config).await.unwrap_err();
    assert!(matches!(err, SitePdfError::MissingApiKey));
}

#[tokio::test]
async fn run_output_serialises_for_scripting() {
    let (_tmp, root) = site();
    let output = generate(&config_with(&root, StubConverter::new()))
        .await
        .unwrap();

    let json = serde_json::to_string_pretty(&output).expect("RunOutput must serialise");
    let back: RunOutput = serde_json::from_str(&json).expect("and round-trip");
    assert_eq!(back.stats.written, output.stats.written);
    assert_eq!(back.pages.len(), 2);
}
