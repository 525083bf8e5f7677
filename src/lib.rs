//! # sitepdf
//!
//! Render a static site's built HTML pages to print-ready PDFs.
//!
//! ## Why this crate?
//!
//! A static-site build produces a tree of HTML pages whose stylesheets,
//! scripts, and images live next to them as separate files. A remote
//! HTML-to-PDF service sees none of those files — it receives exactly one
//! HTML string. sitepdf bridges the gap: it discovers the pages in a build
//! output tree, rewrites and inlines each page's local assets into a single
//! self-contained document, submits that document to DocRaptor, and writes
//! the returned PDF next to the build output.
//!
//! ## Pipeline Overview
//!
//! ```text
//! dist/
//!  │
//!  ├─ 1. Discover  fixed page or every *.html under the root
//!  ├─ 2. Translate page path → slug → flat PDF filename
//!  ├─ 3. Inline    stylesheets/scripts/images folded into the document
//!  ├─ 4. Convert   POST to DocRaptor, tagged PDF/UA-1 output
//!  └─ 5. Persist   dist/pdf/<slug>.pdf (atomic write)
//! ```
//!
//! Pages run concurrently and fail independently: one bad page never stops
//! its siblings, and every failure message carries the page's slug.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitepdf::{generate, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .output_root("dist")
//!         .api_key(std::env::var("DOCRAPTOR_API_KEY")?)
//!         .test_mode(true)
//!         .build()?;
//!     let output = generate(&config).await?;
//!     eprintln!("{}/{} pages written",
//!         output.stats.written,
//!         output.stats.discovered);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sitepdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! sitepdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, InlineOptions, PageDiscovery, PdfProfile,
    DOCRAPTOR_ENDPOINT,
};
pub use convert::generate;
pub use error::{PageError, SitePdfError};
pub use output::{PageResult, RunOutput, RunStats};
pub use pipeline::client::{DocRaptorClient, PdfConverter};
pub use pipeline::meta::{translate, PageMeta};
