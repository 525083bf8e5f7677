//! Result types returned by a generation run.
//!
//! [`RunOutput`] collects one [`PageResult`] per discovered page plus the
//! aggregate [`RunStats`]. Everything is `Serialize` so the CLI's `--json`
//! mode can dump a run verbatim for scripting.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one page's pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Logical identifier of the page, derived from its path.
    pub slug: String,
    /// Where the PDF artifact was (or would have been) written.
    pub pdf_path: PathBuf,
    /// Size of the written artifact in bytes. Zero when the page failed.
    pub bytes_written: u64,
    /// Wall-clock time for this page's pipeline, milliseconds.
    pub duration_ms: u64,
    /// The failure that broke this page's chain, if any. `None` means the
    /// artifact was written.
    pub error: Option<PageError>,
}

impl PageResult {
    /// True when the page produced an artifact.
    pub fn is_written(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Pages discovered under the output root.
    pub discovered: usize,
    /// Pages whose PDF artifact was written.
    pub written: usize,
    /// Pages that failed somewhere in their pipeline.
    pub failed: usize,
    /// Total bytes of PDF written.
    pub total_bytes: u64,
    /// Wall-clock time for the whole run, milliseconds.
    pub total_duration_ms: u64,
}

/// Everything a generation run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Per-page outcomes, sorted by slug for stable reporting.
    pub pages: Vec<PageResult>,
    /// Aggregate statistics.
    pub stats: RunStats,
}

impl RunOutput {
    /// The results of pages that failed.
    pub fn failures(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|p| p.error.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_output_round_trips_through_json() {
        let output = RunOutput {
            pages: vec![PageResult {
                slug: "guide".into(),
                pdf_path: PathBuf::from("dist/pdf/guide.pdf"),
                bytes_written: 1024,
                duration_ms: 87,
                error: None,
            }],
            stats: RunStats {
                discovered: 1,
                written: 1,
                failed: 0,
                total_bytes: 1024,
                total_duration_ms: 90,
            },
        };
        let json = serde_json::to_string(&output).unwrap();
        let back: RunOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pages[0].slug, "guide");
        assert!(back.pages[0].is_written());
        assert_eq!(back.stats.written, 1);
    }
}
