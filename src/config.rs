//! Configuration types for HTML-to-PDF generation.
//!
//! All run behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks, serialise the plain-data parts for
//! logging, and diff two runs to understand why their outputs differ.
//!
//! The API key is an explicit config value — the library never reads it from
//! ambient process state. Only the CLI layer maps environment variables
//! (`DOCRAPTOR_API_KEY`, `DOCRAPTOR_TEST`) into this struct.

use crate::error::SitePdfError;
use crate::pipeline::client::PdfConverter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default conversion endpoint.
pub const DOCRAPTOR_ENDPOINT: &str = "https://docraptor.com/docs";

/// Configuration for one PDF generation run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use sitepdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_root("dist")
///     .api_key("YOUR_API_KEY_HERE")
///     .test_mode(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Root of the static-site build output tree. Default: `dist`.
    ///
    /// Every discovered page must live under this directory; the PDF output
    /// directory is created inside it unless [`pdf_dir`](Self::pdf_dir)
    /// overrides the location.
    pub output_root: PathBuf,

    /// Where PDF artifacts are written. Default: `<output_root>/pdf`.
    pub pdf_dir: Option<PathBuf>,

    /// Which pages to process. Default: every HTML file under the root.
    pub pages: PageDiscovery,

    /// Sentinel slug for the root index page. Default: `home`.
    ///
    /// The root page would otherwise derive an empty slug; the sentinel is
    /// distinct from any directory-derived slug, so `index.pdf` never
    /// collides with a page that actually lives at `/index/`.
    pub root_slug: String,

    /// Site-root-relative href of the shared stylesheet. Default: `/style.css`.
    ///
    /// Rewritten (first occurrence only — each page links it once) to a local
    /// path before inlining, because the inliner resolves references against
    /// the build tree on disk, not the deployed site root.
    pub stylesheet_href: String,

    /// Site-root-relative prefix of the image directory. Default: `/images/`.
    ///
    /// Rewritten at every occurrence — a page may embed any number of images.
    pub images_prefix: String,

    /// Which asset classes the inliner replaces with literal content.
    pub inline: InlineOptions,

    /// DocRaptor API key. Mandatory unless a [`converter`](Self::converter)
    /// override is supplied.
    pub api_key: Option<String>,

    /// Ask the service for a sandboxed (unbilled, watermarked) conversion.
    /// Default: false.
    pub test_mode: bool,

    /// Output profile requested from the converter. Default: PDF/UA-1
    /// (tagged, accessible output).
    pub profile: PdfProfile,

    /// Conversion endpoint. Default: [`DOCRAPTOR_ENDPOINT`]. Overridable so
    /// tests can point the client at a local listener.
    pub endpoint: String,

    /// Number of page pipelines in flight at once. Default: 8.
    ///
    /// The conversion service is network-bound; a small fan-out cuts
    /// wall-clock time on multi-page sites without hammering the endpoint.
    pub concurrency: usize,

    /// Pre-constructed converter. Takes precedence over
    /// [`api_key`](Self::api_key); lets tests stub the remote service.
    pub converter: Option<Arc<dyn PdfConverter>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("dist"),
            pdf_dir: None,
            pages: PageDiscovery::default(),
            root_slug: "home".to_string(),
            stylesheet_href: "/style.css".to_string(),
            images_prefix: "/images/".to_string(),
            inline: InlineOptions::default(),
            api_key: None,
            test_mode: false,
            profile: PdfProfile::default(),
            endpoint: DOCRAPTOR_ENDPOINT.to_string(),
            concurrency: 8,
            converter: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_root", &self.output_root)
            .field("pdf_dir", &self.pdf_dir)
            .field("pages", &self.pages)
            .field("root_slug", &self.root_slug)
            .field("stylesheet_href", &self.stylesheet_href)
            .field("images_prefix", &self.images_prefix)
            .field("inline", &self.inline)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("test_mode", &self.test_mode)
            .field("profile", &self.profile)
            .field("endpoint", &self.endpoint)
            .field("concurrency", &self.concurrency)
            .field("converter", &self.converter.as_ref().map(|_| "<dyn PdfConverter>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The resolved PDF output directory.
    pub fn pdf_dir(&self) -> PathBuf {
        self.pdf_dir
            .clone()
            .unwrap_or_else(|| self.output_root.join("pdf"))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    pub fn pdf_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdf_dir = Some(dir.into());
        self
    }

    pub fn pages(mut self, pages: PageDiscovery) -> Self {
        self.config.pages = pages;
        self
    }

    pub fn root_slug(mut self, slug: impl Into<String>) -> Self {
        self.config.root_slug = slug.into();
        self
    }

    pub fn stylesheet_href(mut self, href: impl Into<String>) -> Self {
        self.config.stylesheet_href = href.into();
        self
    }

    pub fn images_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.images_prefix = prefix.into();
        self
    }

    pub fn inline(mut self, options: InlineOptions) -> Self {
        self.config.inline = options;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn test_mode(mut self, v: bool) -> Self {
        self.config.test_mode = v;
        self
    }

    pub fn profile(mut self, profile: PdfProfile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn converter(mut self, converter: Arc<dyn PdfConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, SitePdfError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(SitePdfError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.stylesheet_href.is_empty() {
            return Err(SitePdfError::InvalidConfig(
                "stylesheet_href must not be empty".into(),
            ));
        }
        if !c.images_prefix.ends_with('/') {
            return Err(SitePdfError::InvalidConfig(format!(
                "images_prefix must end with '/', got '{}'",
                c.images_prefix
            )));
        }
        if c.root_slug.is_empty() || c.root_slug.contains('/') {
            return Err(SitePdfError::InvalidConfig(format!(
                "root_slug must be a non-empty single segment, got '{}'",
                c.root_slug
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the build tree to convert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageDiscovery {
    /// Recursively enumerate every HTML file under the output root (default).
    #[default]
    Glob,
    /// Process a single page reference.
    Fixed(PathBuf),
}

/// Output profile requested via the converter's `prince_options`.
///
/// `Ua1` asks for tagged, accessible output and is the default because the
/// generated documents are published as-is; the archival profiles exist for
/// callers feeding a records system instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PdfProfile {
    /// No profile; the service default.
    None,
    /// PDF/A-1b (archival, visual fidelity).
    A1b,
    /// PDF/A-3b (archival, allows embedded files).
    A3b,
    /// PDF/UA-1 (tagged, accessible). (default)
    #[default]
    Ua1,
}

impl PdfProfile {
    /// The wire value for `prince_options.profile`, if any.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            PdfProfile::None => None,
            PdfProfile::A1b => Some("PDF/A-1b"),
            PdfProfile::A3b => Some("PDF/A-3b"),
            PdfProfile::Ua1 => Some("PDF/UA-1"),
        }
    }
}

/// Which asset classes the inliner replaces with literal content.
///
/// Defaults match the behaviour of the site build this tool grew out of:
/// stylesheets, scripts, and images are inlined, stylesheet `@import` chains
/// are followed, and SVG images are embedded as data URIs rather than
/// injected as inline markup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InlineOptions {
    /// Inline `<link rel="stylesheet">` targets as `<style>` text.
    pub css: bool,
    /// Inline external `<script src>` targets as script text.
    pub js: bool,
    /// Inline `<img src>` targets as base64 data URIs.
    pub images: bool,
    /// Follow `@import` chains inside inlined stylesheets.
    pub follow_imports: bool,
    /// Replace `<img src="*.svg">` with the file's literal SVG markup
    /// instead of a data URI.
    pub svg: bool,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            css: true,
            js: true,
            images: true,
            follow_imports: true,
            svg: false,
        }
    }
}
