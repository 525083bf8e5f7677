//! Pipeline stages for HTML-to-PDF generation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. a different conversion backend behind
//! [`client::PdfConverter`]) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ meta ──▶ read ──▶ inline ──▶ client ──▶ write
//! (fixed/glob) (slug)   (fs)    (lol_html)  (DocRaptor) (fs)
//! ```
//!
//! 1. [`discover`] — enumerate the HTML files that need a PDF counterpart
//! 2. [`meta`]     — derive each page's slug and output path; pure, no I/O
//! 3. [`inline`]   — rewrite the document into a self-contained HTML string;
//!    runs in `spawn_blocking` because the rewriter reads assets with
//!    blocking I/O
//! 4. [`client`]   — submit the document to the conversion service; the only
//!    stage with network I/O

pub mod client;
pub mod discover;
pub mod inline;
pub mod meta;
