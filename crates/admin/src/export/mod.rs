//! Order and invoice exports.
//!
//! - [`csv`]: orders table as CSV
//! - [`pdf`]: raster image to A4 PDF
//! - [`render`]: HTML to raster image via the render service

pub mod csv;
pub mod pdf;
pub mod render;

use thiserror::Error;

pub use pdf::{PageLayout, PdfError, RasterImage, single_image_pdf};
pub use render::{A4_VIEWPORT_WIDTH, Rasterizer, RenderClient, RenderError};

/// Errors while producing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No render service is configured.
    #[error("PDF export is not configured")]
    Unavailable,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("invalid rendered image: {0}")]
    Pdf(#[from] PdfError),
}

/// Rasterize invoice HTML and wrap the image in an A4 PDF.
///
/// # Errors
///
/// Returns [`ExportError`] if rendering fails or the image cannot be
/// embedded.
pub async fn invoice_pdf<R: Rasterizer>(rasterizer: &R, html: &str) -> Result<Vec<u8>, ExportError> {
    let bytes = rasterizer.rasterize(html, A4_VIEWPORT_WIDTH).await?;
    let image = RasterImage::from_bytes(&bytes)?;
    tracing::debug!(width = image.width, height = image.height, "Building invoice PDF");
    Ok(single_image_pdf(&image)?)
}
