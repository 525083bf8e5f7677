//! Conversion client: send a self-contained HTML document to DocRaptor and
//! get PDF bytes back.
//!
//! The protocol is a single stateless `POST` per page — JSON body in, binary
//! out, Basic authentication from the API key. There is deliberately no
//! retry logic here: the remote service bills per successful conversion, and
//! re-submitting a document on a transient error would change the billing
//! and timing behaviour callers observe. A failure is surfaced once, with
//! the page's slug, and the orchestrator records it.
//!
//! [`PdfConverter`] is the seam the orchestrator depends on, so tests can
//! substitute a stub and exercise the whole pipeline without the network.

use crate::config::{ConversionConfig, PdfProfile};
use crate::error::{PageError, SitePdfError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header;
use serde::Serialize;
use tracing::debug;

/// An opaque function from (HTML document, slug) to PDF bytes.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Convert one document. `slug` is used for diagnostics only.
    async fn convert(&self, html: &str, slug: &str) -> Result<Vec<u8>, PageError>;
}

/// DocRaptor-backed [`PdfConverter`].
#[derive(Debug)]
pub struct DocRaptorClient {
    http: reqwest::Client,
    endpoint: String,
    auth_header: String,
    test_mode: bool,
    profile: PdfProfile,
}

impl DocRaptorClient {
    /// Create a client. Fails with [`SitePdfError::MissingApiKey`] when the
    /// key is absent or empty — before any network activity can happen.
    pub fn new(
        api_key: &str,
        endpoint: impl Into<String>,
        test_mode: bool,
        profile: PdfProfile,
    ) -> Result<Self, SitePdfError> {
        if api_key.is_empty() {
            return Err(SitePdfError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SitePdfError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            auth_header: basic_auth_value(api_key),
            test_mode,
            profile,
        })
    }

    /// Create a client from a run configuration.
    pub fn from_config(config: &ConversionConfig) -> Result<Self, SitePdfError> {
        let key = config.api_key.as_deref().unwrap_or_default();
        Self::new(key, &config.endpoint, config.test_mode, config.profile)
    }
}

/// `Basic` credential the way the service expects it: the bare key,
/// base64-encoded, no `user:password` colon.
fn basic_auth_value(api_key: &str) -> String {
    format!("Basic {}", BASE64.encode(api_key))
}

#[derive(Serialize)]
struct ConversionRequest<'a> {
    test: bool,
    document_content: &'a str,
    #[serde(rename = "type")]
    doc_type: &'static str,
    prince_options: PrinceOptions,
}

#[derive(Serialize)]
struct PrinceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'static str>,
}

#[async_trait]
impl PdfConverter for DocRaptorClient {
    async fn convert(&self, html: &str, slug: &str) -> Result<Vec<u8>, PageError> {
        debug!("Submitting '{}' for conversion ({} bytes)", slug, html.len());

        let body = ConversionRequest {
            test: self.test_mode,
            document_content: html,
            doc_type: "pdf",
            prince_options: PrinceOptions {
                profile: self.profile.as_str(),
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, &self.auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| PageError::Request {
                slug: slug.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PageError::Conversion {
                slug: slug.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        // The payload is returned unvalidated; the service owns PDF
        // correctness.
        let bytes = response.bytes().await.map_err(|e| PageError::Request {
            slug: slug.to_string(),
            detail: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}
