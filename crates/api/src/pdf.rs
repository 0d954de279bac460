//! Client for the external HTML-to-PDF rendering service.
//!
//! The renderer receives the report document as JSON and returns PDF bytes.
//! It is optional: without `PDF_RENDERER_URL` the PDF endpoint answers 503.

use std::time::Duration;

use serde::Serialize;

const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("request to renderer failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("renderer returned {0}: {1}")]
    Status(u16, String),

    #[error("renderer returned an empty document")]
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct PdfConfig {
    pub renderer_url: Option<String>,
}

impl PdfConfig {
    /// Reads `PDF_RENDERER_URL`. Unset or empty disables PDF generation.
    pub fn from_env() -> Self {
        Self {
            renderer_url: std::env::var("PDF_RENDERER_URL")
                .ok()
                .filter(|u| !u.trim().is_empty()),
        }
    }
}

pub struct PdfRenderer {
    client: reqwest::Client,
    url: String,
}

impl PdfRenderer {
    pub fn new(url: impl Into<String>) -> Result<Self, PdfError> {
        let client = reqwest::Client::builder().timeout(RENDER_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Build a renderer when one is configured.
    pub fn from_config(config: &PdfConfig) -> Result<Option<Self>, PdfError> {
        config.renderer_url.as_deref().map(Self::new).transpose()
    }

    /// POST the document and return the rendered PDF bytes.
    pub async fn render<T: Serialize + ?Sized>(&self, document: &T) -> Result<Vec<u8>, PdfError> {
        let response = self.client.post(&self.url).json(document).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PdfError::Status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(PdfError::Empty);
        }
        tracing::debug!(bytes = bytes.len(), "PDF rendered");
        Ok(bytes.to_vec())
    }
}
