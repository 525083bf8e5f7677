//! Page discovery: enumerate the HTML files that need a PDF counterpart.
//!
//! Two modes, selected by [`PageDiscovery`]: a single fixed page reference,
//! or a recursive walk over every HTML file under the build output root.
//! Discovery also performs the path translation up front, so a page
//! reference outside the root fails fatally here — before any page task has
//! started — rather than mid-run.

use crate::config::{ConversionConfig, PageDiscovery};
use crate::error::SitePdfError;
use crate::pipeline::meta::{self, PageMeta};
use tracing::debug;
use walkdir::WalkDir;

/// Resolve the configured discovery mode into concrete page work items.
pub fn discover_pages(config: &ConversionConfig) -> Result<Vec<PageMeta>, SitePdfError> {
    if !config.output_root.is_dir() {
        return Err(SitePdfError::OutputRootNotFound {
            path: config.output_root.clone(),
        });
    }

    let mut pages = match &config.pages {
        PageDiscovery::Fixed(page) => vec![meta::translate(page, config)?],
        PageDiscovery::Glob => {
            let pdf_dir = config.pdf_dir();
            let mut pages = Vec::new();
            let walker = WalkDir::new(&config.output_root)
                .into_iter()
                // Never descend into the PDF output directory itself.
                .filter_entry(|e| e.path() != pdf_dir.as_path());
            for entry in walker {
                let entry = entry.map_err(|e| {
                    SitePdfError::Internal(format!(
                        "failed to walk '{}': {e}",
                        config.output_root.display()
                    ))
                })?;
                if entry.file_type().is_file()
                    && entry.path().extension().and_then(|e| e.to_str()) == Some("html")
                {
                    pages.push(meta::translate(entry.path(), config)?);
                }
            }
            pages
        }
    };

    // Pages run independently; the sort only stabilises logs and reports.
    pages.sort_by(|a, b| a.slug.cmp(&b.slug));
    debug!("Discovered {} page(s)", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn build_tree() -> (TempDir, ConversionConfig) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("dist");
        fs::create_dir_all(root.join("guide")).unwrap();
        fs::create_dir_all(root.join("pdf")).unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::write(root.join("guide/index.html"), "<html></html>").unwrap();
        fs::write(root.join("style.css"), "body{}").unwrap();
        // A stray HTML file inside the output directory must not be picked up.
        fs::write(root.join("pdf/viewer.html"), "<html></html>").unwrap();
        let config = ConversionConfig::builder()
            .output_root(&root)
            .build()
            .unwrap();
        (tmp, config)
    }

    #[test]
    fn glob_mode_finds_every_html_page() {
        let (_tmp, config) = build_tree();
        let pages = discover_pages(&config).unwrap();
        let slugs: Vec<&str> = pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["guide", "home"]);
    }

    #[test]
    fn fixed_mode_yields_exactly_one_page() {
        let (_tmp, config) = build_tree();
        let page = config.output_root.join("guide/index.html");
        let config = ConversionConfig::builder()
            .output_root(&config.output_root)
            .pages(PageDiscovery::Fixed(page))
            .build()
            .unwrap();
        let pages = discover_pages(&config).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].slug, "guide");
    }

    #[test]
    fn missing_root_is_fatal() {
        let config = ConversionConfig::builder()
            .output_root("/definitely/not/a/build/tree")
            .build()
            .unwrap();
        let err = discover_pages(&config).unwrap_err();
        assert!(matches!(err, SitePdfError::OutputRootNotFound { .. }));
    }

    #[test]
    fn fixed_page_outside_root_is_fatal() {
        let (_tmp, config) = build_tree();
        let config = ConversionConfig::builder()
            .output_root(&config.output_root)
            .pages(PageDiscovery::Fixed(PathBuf::from("/etc/passwd.html")))
            .build()
            .unwrap();
        let err = discover_pages(&config).unwrap_err();
        assert!(matches!(err, SitePdfError::OutsideOutputRoot { .. }));
    }
}
