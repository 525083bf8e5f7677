//! Path translation: from a page's location in the build tree to its slug
//! and PDF output path.
//!
//! Pure functions, no I/O. The slug is the page's path relative to the
//! output root with the trailing index-file suffix removed; the root page
//! maps to a sentinel slug so it never collides with a directory-derived
//! one. PDF filenames are flat — nested slugs collapse their separators to
//! dashes so the output directory never grows subdirectories.

use crate::config::ConversionConfig;
use crate::error::SitePdfError;
use std::path::{Path, PathBuf};

/// Slug and path info for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    /// Logical identifier, e.g. `guide/install`. Used in every diagnostic.
    pub slug: String,
    /// Absolute-or-as-configured path of the HTML file to read.
    pub html_path: PathBuf,
    /// Flat output filename, e.g. `guide-install.pdf`.
    pub pdf_filename: String,
    /// Full write destination for the artifact.
    pub pdf_path: PathBuf,
}

/// Derive the slug and output paths for `page`.
///
/// Fails only when `page` lies outside the configured output root or is not
/// an HTML file — both are caller errors, caught before any page work runs.
pub fn translate(page: &Path, config: &ConversionConfig) -> Result<PageMeta, SitePdfError> {
    let rel = page
        .strip_prefix(&config.output_root)
        .map_err(|_| SitePdfError::OutsideOutputRoot {
            page: page.to_path_buf(),
            root: config.output_root.clone(),
        })?;

    if rel.extension().and_then(|e| e.to_str()) != Some("html") {
        return Err(SitePdfError::NotHtml {
            path: page.to_path_buf(),
        });
    }

    // Join components with '/' regardless of platform so slugs are stable.
    let rel_str = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let slug = if rel_str == "index.html" {
        config.root_slug.clone()
    } else if let Some(stripped) = rel_str.strip_suffix("/index.html") {
        stripped.to_string()
    } else {
        // Flat pages like `guide.html` keep their stem.
        rel_str
            .strip_suffix(".html")
            .unwrap_or(&rel_str)
            .to_string()
    };

    let pdf_filename = format!("{}.pdf", slug.replace('/', "-"));
    let pdf_path = config.pdf_dir().join(&pdf_filename);

    Ok(PageMeta {
        slug,
        html_path: page.to_path_buf(),
        pdf_filename,
        pdf_path,
    })
}
