//! CLI binary for sitepdf.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ConversionConfig` and prints per-page results. This is the
//! only layer that touches the process environment; the library takes every
//! value explicitly.

use anyhow::{Context, Result};
use clap::Parser;
use sitepdf::{generate, ConversionConfig, InlineOptions, PageDiscovery, PdfProfile};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every page under ./dist (sandboxed, no billing)
  DOCRAPTOR_API_KEY=... sitepdf --test

  # Production conversion of a single page
  sitepdf --page dist/a-study-in-scarlet/index.html

  # Custom build root and output directory
  sitepdf build --out build/print

  # Stats as JSON for scripting
  sitepdf --test --json > run.json

ENVIRONMENT VARIABLES:
  DOCRAPTOR_API_KEY    API key for the conversion service (required)
  DOCRAPTOR_TEST       Set to true for sandboxed, unbilled conversions
  SITEPDF_CONCURRENCY  Page pipelines in flight at once (default: 8)

The root/home page is written as home.pdf; every other page is named after
its slug with path separators collapsed to dashes (guide/install →
guide-install.pdf)."#;

/// Render a static site's built HTML pages to print-ready PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "sitepdf",
    version,
    about = "Render a static site's built HTML pages to print-ready PDFs via DocRaptor",
    long_about = "Discover the HTML pages of a static-site build, inline each page's local \
stylesheets, scripts, and images into a single self-contained document, convert it with \
DocRaptor, and write one PDF per page. Pages run concurrently and fail independently.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Build output root containing the rendered HTML tree.
    #[arg(default_value = "dist")]
    root: PathBuf,

    /// Convert a single page instead of every HTML file under the root.
    #[arg(long)]
    page: Option<PathBuf>,

    /// Write PDFs to this directory instead of <ROOT>/pdf.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// DocRaptor API key.
    #[arg(long, env = "DOCRAPTOR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Ask for sandboxed conversions: unbilled, watermarked output.
    #[arg(long, env = "DOCRAPTOR_TEST")]
    test: bool,

    /// Output profile requested from the converter.
    #[arg(long, value_enum, default_value = "pdf-ua1")]
    profile: ProfileArg,

    /// Number of page pipelines in flight at once.
    #[arg(short, long, env = "SITEPDF_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Site-root-relative href of the shared stylesheet.
    #[arg(long, default_value = "/style.css")]
    stylesheet: String,

    /// Site-root-relative prefix of the image directory.
    #[arg(long, default_value = "/images/")]
    images_prefix: String,

    /// Leave stylesheet references external.
    #[arg(long)]
    no_css: bool,

    /// Leave script references external.
    #[arg(long)]
    no_js: bool,

    /// Leave image references external.
    #[arg(long)]
    no_images: bool,

    /// Do not follow @import chains inside inlined stylesheets.
    #[arg(long)]
    no_imports: bool,

    /// Replace SVG images with literal inline markup instead of data URIs.
    #[arg(long)]
    inline_svg: bool,

    /// Print the run result as JSON instead of per-page lines.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    None,
    PdfA1b,
    PdfA3b,
    PdfUa1,
}

impl From<ProfileArg> for PdfProfile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::None => PdfProfile::None,
            ProfileArg::PdfA1b => PdfProfile::A1b,
            ProfileArg::PdfA3b => PdfProfile::A3b,
            ProfileArg::PdfUa1 => PdfProfile::Ua1,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = generate(&config).await.context("PDF generation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise run output")?
        );
    } else if !cli.quiet {
        for page in &output.pages {
            match &page.error {
                None => eprintln!(
                    "  {} {:<24} → {}  {}",
                    green("✓"),
                    page.slug,
                    page.pdf_path.display(),
                    dim(&format!("{} bytes", page.bytes_written)),
                ),
                Some(e) => eprintln!("  {} {}", red("✗"), red(&e.to_string())),
            }
        }
        eprintln!(
            "{} {}/{} pages written in {}ms",
            if output.stats.failed == 0 {
                green("✔")
            } else {
                red("⚠")
            },
            bold(&output.stats.written.to_string()),
            output.stats.discovered,
            output.stats.total_duration_ms,
        );
    }

    if output.stats.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .output_root(&cli.root)
        .test_mode(cli.test)
        .profile(cli.profile.into())
        .concurrency(cli.concurrency)
        .stylesheet_href(&cli.stylesheet)
        .images_prefix(&cli.images_prefix)
        .inline(InlineOptions {
            css: !cli.no_css,
            js: !cli.no_js,
            images: !cli.no_images,
            follow_imports: !cli.no_imports,
            svg: cli.inline_svg,
        });

    if let Some(ref page) = cli.page {
        builder = builder.pages(PageDiscovery::Fixed(page.clone()));
    }
    if let Some(ref out) = cli.out {
        builder = builder.pdf_dir(out);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }

    builder.build().context("Invalid configuration")
}
