//! HTML-to-image rendering via an external render service.
//!
//! The service receives the invoice HTML and returns a full-page PNG or
//! JPEG screenshot. Anything that rasterizes HTML can stand behind the
//! [`Rasterizer`] trait.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::RenderServiceConfig;

/// Viewport width in CSS pixels: A4 at 96 dpi.
pub const A4_VIEWPORT_WIDTH: u32 = 794;

/// Errors from the render service.
#[derive(Debug, Error)]
pub enum RenderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("render service returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The service answered with no image data.
    #[error("render service returned an empty body")]
    Empty,
}

/// Turns an HTML document into raster image bytes.
pub trait Rasterizer: Send + Sync {
    /// Render `html` at `width` CSS pixels wide, returning the encoded image.
    fn rasterize(
        &self,
        html: &str,
        width: u32,
    ) -> impl Future<Output = Result<Vec<u8>, RenderError>> + Send;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    html: &'a str,
    width: u32,
    full_page: bool,
    format: &'static str,
}

/// Render service HTTP client.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct RenderClient {
    inner: Arc<RenderClientInner>,
}

struct RenderClientInner {
    client: reqwest::Client,
    url: Url,
    token: Option<SecretString>,
}

impl RenderClient {
    /// Create a client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &RenderServiceConfig) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(RenderClientInner {
                client,
                url: config.url.clone(),
                token: config.token.clone(),
            }),
        })
    }
}

impl Rasterizer for RenderClient {
    async fn rasterize(&self, html: &str, width: u32) -> Result<Vec<u8>, RenderError> {
        let request = RenderRequest {
            html,
            width,
            full_page: true,
            format: "png",
        };

        let mut builder = self
            .inner
            .client
            .post(self.inner.url.clone())
            .json(&request);
        if let Some(token) = &self.inner.token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RenderError::Status { status, message });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(RenderError::Empty);
        }

        tracing::debug!(bytes = bytes.len(), "Invoice rendered");
        Ok(bytes.to_vec())
    }
}
