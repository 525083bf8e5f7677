//! Run orchestration: discovery, concurrent per-page pipelines, stats.
//!
//! ## Per-page state machine
//!
//! ```text
//! Discovered ─▶ Read ─▶ Inlined ─▶ Converting ─▶ Written
//!      └──────────┴────────┴───────────┴────────▶ Failed
//! ```
//!
//! Pages are fully independent: they share only the pre-created PDF output
//! directory. A page that fails settles into its own [`PageResult`] and
//! never cancels, blocks, or corrupts a sibling. The run itself fails only
//! for global reasons — missing credential, missing output root — or when
//! every single page failed.

use crate::config::ConversionConfig;
use crate::error::{PageError, SitePdfError};
use crate::output::{PageResult, RunOutput, RunStats};
use crate::pipeline::client::{DocRaptorClient, PdfConverter};
use crate::pipeline::discover;
use crate::pipeline::inline::{self, InlineContext};
use crate::pipeline::meta::PageMeta;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Generate one PDF per discovered page.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(RunOutput)` even if some pages failed (check `stats.failed` or
/// [`RunOutput::failures`]).
///
/// # Errors
/// Returns `Err(SitePdfError)` only for fatal errors:
/// - Missing API key (raised before discovery or any network call)
/// - Missing output root / page reference outside it
/// - Unwritable shared output directory
/// - Every page failed and no artifact was produced
pub async fn generate(config: &ConversionConfig) -> Result<RunOutput, SitePdfError> {
    let total_start = Instant::now();

    // ── Step 1: Resolve the converter ────────────────────────────────────
    // Done first so a missing credential aborts before any file-system or
    // network activity.
    let converter = resolve_converter(config)?;

    // ── Step 2: Discover pages ───────────────────────────────────────────
    let pages = discover::discover_pages(config)?;
    info!(
        "Discovered {} page(s) under '{}'",
        pages.len(),
        config.output_root.display()
    );

    // ── Step 3: Anchor asset resolution ──────────────────────────────────
    // The inliner resolves rewritten references as filesystem paths; an
    // absolute root keeps that independent of the process working directory.
    let root_abs = tokio::fs::canonicalize(&config.output_root)
        .await
        .map_err(|e| {
            SitePdfError::Internal(format!(
                "failed to canonicalize '{}': {e}",
                config.output_root.display()
            ))
        })?;

    // ── Step 4: Create the shared output directory, exactly once ─────────
    let pdf_dir = config.pdf_dir();
    tokio::fs::create_dir_all(&pdf_dir)
        .await
        .map_err(|e| SitePdfError::OutputDirFailed {
            path: pdf_dir.clone(),
            source: e,
        })?;

    // ── Step 5: Run every page pipeline concurrently ─────────────────────
    let discovered = pages.len();
    let mut results: Vec<PageResult> = stream::iter(pages.into_iter().map(|page| {
        let converter = Arc::clone(&converter);
        let config = config.clone();
        let root_abs = root_abs.clone();
        async move { process_page(page, &config, &root_abs, converter).await }
    }))
    .buffer_unordered(config.concurrency)
    .collect()
    .await;

    // Sort by slug for stable reporting (completion order is arbitrary).
    results.sort_by(|a, b| a.slug.cmp(&b.slug));

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let written = results.iter().filter(|r| r.is_written()).count();
    let failed = results.len() - written;

    if written == 0 && failed > 0 {
        let first_error = results
            .iter()
            .find_map(|r| r.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(SitePdfError::AllPagesFailed {
            total: discovered,
            first_error,
        });
    }

    let stats = RunStats {
        discovered,
        written,
        failed,
        total_bytes: results.iter().map(|r| r.bytes_written).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Run complete: {}/{} pages written, {}ms total",
        written, discovered, stats.total_duration_ms
    );

    Ok(RunOutput {
        pages: results,
        stats,
    })
}

/// Resolve the converter, most-specific first: a pre-built override from the
/// config (tests, custom middleware), else a [`DocRaptorClient`] from the
/// configured key.
fn resolve_converter(config: &ConversionConfig) -> Result<Arc<dyn PdfConverter>, SitePdfError> {
    if let Some(ref converter) = config.converter {
        return Ok(Arc::clone(converter));
    }
    Ok(Arc::new(DocRaptorClient::from_config(config)?))
}

/// Run one page's pipeline to a settled [`PageResult`].
async fn process_page(
    page: PageMeta,
    config: &ConversionConfig,
    root_abs: &Path,
    converter: Arc<dyn PdfConverter>,
) -> PageResult {
    let start = Instant::now();
    match run_page(&page, config, root_abs, converter.as_ref()).await {
        Ok(bytes_written) => PageResult {
            slug: page.slug,
            pdf_path: page.pdf_path,
            bytes_written,
            duration_ms: start.elapsed().as_millis() as u64,
            error: None,
        },
        Err(e) => {
            warn!("{e}");
            PageResult {
                slug: page.slug,
                pdf_path: page.pdf_path,
                bytes_written: 0,
                duration_ms: start.elapsed().as_millis() as u64,
                error: Some(e),
            }
        }
    }
}

/// Read → inline → convert → write for one page.
async fn run_page(
    page: &PageMeta,
    config: &ConversionConfig,
    root_abs: &Path,
    converter: &dyn PdfConverter,
) -> Result<u64, PageError> {
    // Read
    let html = tokio::fs::read_to_string(&page.html_path)
        .await
        .map_err(|e| PageError::Read {
            slug: page.slug.clone(),
            path: page.html_path.clone(),
            detail: e.to_string(),
        })?;

    // Inline. The rewrite is synchronous and reads asset files with std::fs,
    // so it runs off the async executor's hot path.
    let ctx = InlineContext {
        slug: page.slug.clone(),
        root: root_abs.to_path_buf(),
        page_dir: page_dir(page, config, root_abs),
        stylesheet_href: config.stylesheet_href.clone(),
        images_prefix: config.images_prefix.clone(),
        options: config.inline,
    };
    let inlined = match tokio::task::spawn_blocking(move || inline::inline_document(&html, &ctx))
        .await
    {
        Ok(result) => result?,
        Err(e) => {
            return Err(PageError::Inline {
                slug: page.slug.clone(),
                detail: format!("inline task failed: {e}"),
            })
        }
    };

    // Convert
    let pdf = converter.convert(&inlined, &page.slug).await?;

    // Write atomically (temp + rename) so no partial artifact is ever
    // observable, even if the process dies mid-write.
    let tmp_path = page.pdf_path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &pdf)
        .await
        .map_err(|e| PageError::Write {
            slug: page.slug.clone(),
            path: page.pdf_path.clone(),
            detail: e.to_string(),
        })?;
    tokio::fs::rename(&tmp_path, &page.pdf_path)
        .await
        .map_err(|e| PageError::Write {
            slug: page.slug.clone(),
            path: page.pdf_path.clone(),
            detail: e.to_string(),
        })?;

    info!("[pdf] Wrote {}", page.pdf_path.display());
    Ok(pdf.len() as u64)
}

/// Absolute directory of the page, for resolving its relative references.
fn page_dir(page: &PageMeta, config: &ConversionConfig, root_abs: &Path) -> PathBuf {
    let rel = page
        .html_path
        .strip_prefix(&config.output_root)
        .unwrap_or(page.html_path.as_path());
    root_abs
        .join(rel)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root_abs.to_path_buf())
}
