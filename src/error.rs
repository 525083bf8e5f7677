//! Error types for the sitepdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SitePdfError`] — **Fatal**: the run cannot proceed at all (missing
//!   API key, missing build output root, page reference outside the root).
//!   Returned as `Err(SitePdfError)` from the top-level [`crate::generate`].
//!
//! * [`PageError`] — **Non-fatal**: a single page failed (unreadable asset,
//!   rejected conversion, unwritable artifact) but all other pages are fine.
//!   Stored inside [`crate::output::PageResult`] so callers can inspect
//!   partial success rather than losing the whole run to one bad page.
//!
//! Every [`PageError`] display includes the page's slug, so a failure in a
//! hundred-page run always names the document that caused it.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the sitepdf library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum SitePdfError {
    /// No API key was configured and no converter override was supplied.
    ///
    /// Raised before discovery, so no file or network activity happens on a
    /// misconfigured run.
    #[error("Missing DocRaptor API key\nSet DOCRAPTOR_API_KEY or pass --api-key.")]
    MissingApiKey,

    /// The build output root does not exist or is not a directory.
    #[error("Build output root not found: '{path}'\nRun the site build first.")]
    OutputRootNotFound { path: PathBuf },

    /// A fixed-mode page reference lies outside the build output root.
    #[error("Page '{page}' is outside the output root '{root}'")]
    OutsideOutputRoot { page: PathBuf, root: PathBuf },

    /// A fixed-mode page reference is not an HTML file.
    #[error("Page '{path}' does not have an .html extension")]
    NotHtml { path: PathBuf },

    /// Could not create the shared PDF output directory.
    #[error("Failed to create PDF output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every discovered page failed; no artifact was produced.
    #[error("All {total} pages failed.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageResult`] when a page fails.
/// The overall run continues unless ALL pages fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page's HTML file could not be read.
    #[error("{slug}: failed to read '{path}': {detail}")]
    Read {
        slug: String,
        path: PathBuf,
        detail: String,
    },

    /// A referenced local asset could not be read during inlining.
    #[error("{slug}: unreadable asset '{asset}': {detail}")]
    Asset {
        slug: String,
        asset: PathBuf,
        detail: String,
    },

    /// The HTML document could not be rewritten.
    #[error("{slug}: inlining failed: {detail}")]
    Inline { slug: String, detail: String },

    /// The conversion request never produced an HTTP response.
    #[error("{slug}: conversion request failed: {detail}")]
    Request { slug: String, detail: String },

    /// The conversion service answered with a non-success status.
    #[error("{slug}: {status} {status_text} {body}")]
    Conversion {
        slug: String,
        status: u16,
        status_text: String,
        body: String,
    },

    /// The PDF artifact could not be written.
    #[error("{slug}: failed to write '{path}': {detail}")]
    Write {
        slug: String,
        path: PathBuf,
        detail: String,
    },
}

impl PageError {
    /// The slug of the page this error belongs to.
    pub fn slug(&self) -> &str {
        match self {
            PageError::Read { slug, .. }
            | PageError::Asset { slug, .. }
            | PageError::Inline { slug, .. }
            | PageError::Request { slug, .. }
            | PageError::Conversion { slug, .. }
            | PageError::Write { slug, .. } => slug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_display_carries_slug_status_and_body() {
        let e = PageError::Conversion {
            slug: "guide/install".into(),
            status: 422,
            status_text: "Unprocessable Entity".into(),
            body: "bad document_content".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("guide/install"), "got: {msg}");
        assert!(msg.contains("422"), "got: {msg}");
        assert!(msg.contains("bad document_content"), "got: {msg}");
    }

    #[test]
    fn asset_display_names_the_asset() {
        let e = PageError::Asset {
            slug: "home".into(),
            asset: PathBuf::from("dist/style.css"),
            detail: "No such file or directory".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("home"));
        assert!(msg.contains("dist/style.css"));
    }

    #[test]
    fn all_pages_failed_display() {
        let e = SitePdfError::AllPagesFailed {
            total: 3,
            first_error: "home: 500 Internal Server Error boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 3 pages failed"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn every_page_error_exposes_its_slug() {
        let errors = [
            PageError::Read {
                slug: "a".into(),
                path: PathBuf::from("x"),
                detail: String::new(),
            },
            PageError::Inline {
                slug: "b".into(),
                detail: String::new(),
            },
            PageError::Request {
                slug: "c".into(),
                detail: String::new(),
            },
        ];
        let slugs: Vec<&str> = errors.iter().map(|e| e.slug()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }
}
