//! Asset inlining: turn a rendered page into a single self-contained HTML
//! document.
//!
//! The conversion service receives one HTML string and nothing else, so
//! every stylesheet, script, and image the page references has to travel
//! inside that string. The pass has two steps:
//!
//! 1. **Path rewriting** — site-root-relative references to the well-known
//!    stylesheet and image directory are rewritten to filesystem paths under
//!    the local build root. The stylesheet href is rewritten at its first
//!    occurrence only (each page links it once); the image prefix at every
//!    occurrence, since a page may embed any number of images.
//! 2. **Rewrite** — a [`lol_html`] pass over the full document replaces
//!    `<link rel="stylesheet">` with `<style>` text (following `@import`
//!    chains), external `<script src>` with inline script text, and
//!    `<img src>` with base64 data URIs (or literal SVG markup when the
//!    `svg` option is on).
//!
//! References that are already self-contained (`data:`) or genuinely remote
//! (`http(s):`, protocol-relative) are left untouched, which is also what
//! makes re-inlining an already-inlined document a no-op.
//!
//! An unreadable referenced asset is a hard error for the page — a silently
//! dropped asset would render a visually wrong PDF, which is worse than no
//! PDF at all.
//!
//! The whole pass is synchronous (lol_html handlers read files with
//! `std::fs`); the orchestrator runs it under `spawn_blocking`.

use crate::config::InlineOptions;
use crate::error::PageError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Nested `@import` chains deeper than this are left as-is. Real sites
/// nest one or two levels; the cap only exists to break import cycles.
const MAX_IMPORT_DEPTH: u8 = 8;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']?([^"'()\s;]+)["']?\s*\)?[^;]*;"#)
        .expect("import regex is valid")
});

/// Everything the inliner needs to resolve a page's references on disk.
#[derive(Debug, Clone)]
pub struct InlineContext {
    /// Slug of the page, for diagnostics.
    pub slug: String,
    /// Absolute path of the build output root.
    pub root: PathBuf,
    /// Absolute directory of the page itself; relative references resolve
    /// against this.
    pub page_dir: PathBuf,
    /// Site-root-relative stylesheet href to rewrite (first occurrence).
    pub stylesheet_href: String,
    /// Site-root-relative image prefix to rewrite (every occurrence).
    pub images_prefix: String,
    /// Which asset classes to inline.
    pub options: InlineOptions,
}

/// Inline `html`'s external assets per the context's options.
///
/// Returns the self-contained document, or the first asset/rewrite failure.
pub fn inline_document(html: &str, ctx: &InlineContext) -> Result<String, PageError> {
    let html = rewrite_well_known_paths(html, ctx);

    // lol_html handlers can't return a typed error, so the first real
    // failure is stashed here and the rewrite aborted.
    let failure: Rc<RefCell<Option<PageError>>> = Rc::new(RefCell::new(None));

    let rewritten = rewrite_str(
        &html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("link", {
                    let failure = Rc::clone(&failure);
                    let ctx = ctx.clone();
                    move |el| {
                        if !ctx.options.css {
                            return Ok(());
                        }
                        let rel = el.get_attribute("rel").unwrap_or_default();
                        if !rel.eq_ignore_ascii_case("stylesheet") {
                            return Ok(());
                        }
                        let Some(href) = el.get_attribute("href") else {
                            return Ok(());
                        };
                        let Some(path) = resolve_local(&href, &ctx.page_dir) else {
                            return Ok(());
                        };
                        let css = match read_asset_text(&path, &ctx.slug) {
                            Ok(css) => css,
                            Err(e) => return Err(stash(&failure, e)),
                        };
                        let css = if ctx.options.follow_imports {
                            let dir = path.parent().unwrap_or(ctx.page_dir.as_path());
                            match inline_imports(&css, dir, &ctx.slug, 0) {
                                Ok(css) => css,
                                Err(e) => return Err(stash(&failure, e)),
                            }
                        } else {
                            css
                        };
                        el.replace(&format!("<style>{css}</style>"), ContentType::Html);
                        Ok(())
                    }
                }),
                element!("script", {
                    let failure = Rc::clone(&failure);
                    let ctx = ctx.clone();
                    move |el| {
                        if !ctx.options.js {
                            return Ok(());
                        }
                        let Some(src) = el.get_attribute("src") else {
                            return Ok(());
                        };
                        let Some(path) = resolve_local(&src, &ctx.page_dir) else {
                            return Ok(());
                        };
                        let js = match read_asset_text(&path, &ctx.slug) {
                            Ok(js) => js,
                            Err(e) => return Err(stash(&failure, e)),
                        };
                        el.remove_attribute("src");
                        el.set_inner_content(&js, ContentType::Html);
                        Ok(())
                    }
                }),
                element!("img", {
                    let failure = Rc::clone(&failure);
                    let ctx = ctx.clone();
                    move |el| {
                        if !ctx.options.images {
                            return Ok(());
                        }
                        let Some(src) = el.get_attribute("src") else {
                            return Ok(());
                        };
                        let Some(path) = resolve_local(&src, &ctx.page_dir) else {
                            return Ok(());
                        };
                        let is_svg =
                            path.extension().and_then(|e| e.to_str()) == Some("svg");
                        if is_svg && ctx.options.svg {
                            let markup = match read_asset_text(&path, &ctx.slug) {
                                Ok(markup) => markup,
                                Err(e) => return Err(stash(&failure, e)),
                            };
                            el.replace(&markup, ContentType::Html);
                            return Ok(());
                        }
                        let bytes = match std::fs::read(&path) {
                            Ok(bytes) => bytes,
                            Err(e) => {
                                return Err(stash(
                                    &failure,
                                    PageError::Asset {
                                        slug: ctx.slug.clone(),
                                        asset: path.clone(),
                                        detail: e.to_string(),
                                    },
                                ))
                            }
                        };
                        let uri =
                            format!("data:{};base64,{}", mime_for(&path), BASE64.encode(bytes));
                        el.set_attribute("src", &uri)?;
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    );

    match rewritten {
        Ok(out) => Ok(out),
        Err(e) => {
            // Prefer the typed error stashed by the failing handler.
            if let Some(page_err) = failure.borrow_mut().take() {
                return Err(page_err);
            }
            Err(PageError::Inline {
                slug: ctx.slug.clone(),
                detail: e.to_string(),
            })
        }
    }
}

/// Step 1: rewrite the well-known site-root-relative references to local
/// filesystem paths under the build root.
fn rewrite_well_known_paths(html: &str, ctx: &InlineContext) -> String {
    let local_stylesheet = ctx
        .root
        .join(ctx.stylesheet_href.trim_start_matches('/'))
        .to_string_lossy()
        .into_owned();
    let local_images = format!(
        "{}/",
        ctx.root
            .join(ctx.images_prefix.trim_matches('/'))
            .to_string_lossy()
    );
    html.replacen(&ctx.stylesheet_href, &local_stylesheet, 1)
        .replace(&ctx.images_prefix, &local_images)
}

/// Map a reference to a local filesystem path, or `None` when the reference
/// must stay external (remote, data-embedded, fragment-only).
fn resolve_local(reference: &str, page_dir: &Path) -> Option<PathBuf> {
    if reference.is_empty()
        || reference.starts_with("data:")
        || reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("//")
        || reference.starts_with('#')
    {
        return None;
    }
    let path = Path::new(reference);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(page_dir.join(path))
    }
}

fn read_asset_text(path: &Path, slug: &str) -> Result<String, PageError> {
    std::fs::read_to_string(path).map_err(|e| PageError::Asset {
        slug: slug.to_string(),
        asset: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Recursively splice `@import`ed stylesheets into `css`.
///
/// Remote and data imports stay untouched; local ones are read relative to
/// the importing file's directory and expanded in place, up to
/// [`MAX_IMPORT_DEPTH`].
fn inline_imports(css: &str, dir: &Path, slug: &str, depth: u8) -> Result<String, PageError> {
    if depth >= MAX_IMPORT_DEPTH {
        return Ok(css.to_string());
    }
    let mut out = String::with_capacity(css.len());
    let mut last = 0;
    for caps in IMPORT_RE.captures_iter(css) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&css[last..whole.start()]);
        last = whole.end();

        let target = target.as_str();
        if target.starts_with("http://")
            || target.starts_with("https://")
            || target.starts_with("data:")
        {
            out.push_str(whole.as_str());
            continue;
        }
        let path = if Path::new(target).is_absolute() {
            PathBuf::from(target)
        } else {
            dir.join(target)
        };
        let imported = read_asset_text(&path, slug)?;
        let nested_dir = path.parent().unwrap_or(dir);
        out.push_str(&inline_imports(&imported, nested_dir, slug, depth + 1)?);
    }
    out.push_str(&css[last..]);
    Ok(out)
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn stash(
    failure: &Rc<RefCell<Option<PageError>>>,
    err: PageError,
) -> Box<dyn std::error::Error + Send + Sync> {
    let msg = err.to_string();
    *failure.borrow_mut() = Some(err);
    msg.into()
}
