//! Invoice page and PDF download.
//!
//! The same template serves both: the browser view adds a toolbar, the PDF
//! variant is sent to the render service as a standalone document.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use shopfloor_core::{BusinessInfo, Order, OrderId, Record, format_price};
use tracing::instrument;

use super::{not_found_page, render};
use crate::error::{AppError, Result};
use crate::export::{self, ExportError};
use crate::filters;
use crate::state::AppState;

/// Business name printed when no business info record exists.
const FALLBACK_BUSINESS_NAME: &str = "Shopfloor";

const INVOICE_DATE_FORMAT: &str = "%d %B %Y";

/// Seller block on the invoice.
#[derive(Debug, Clone)]
pub struct SellerView {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub logo: Option<String>,
}

impl From<&BusinessInfo> for SellerView {
    fn from(info: &BusinessInfo) -> Self {
        Self {
            name: info.name.clone(),
            address: info.full_address(),
            phone: info.phone.clone(),
            email: info.email.clone(),
            website: info.website.clone(),
            logo: Some(info.logo.trim())
                .filter(|l| !l.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Invoice line.
#[derive(Debug, Clone)]
pub struct InvoiceLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub total: String,
}

/// Invoice display data.
#[derive(Debug, Clone)]
pub struct InvoiceView {
    pub order_id: String,
    pub invoice_number: String,
    pub order_number: String,
    pub issued: String,
    pub due: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub lines: Vec<InvoiceLineView>,
    pub subtotal: String,
    pub total: String,
    pub payment_method: &'static str,
    pub payment_status: &'static str,
}

impl InvoiceView {
    #[must_use]
    pub fn new(record: &Record<Order>) -> Self {
        let order = &record.data;
        Self {
            order_id: record.id_str().to_owned(),
            invoice_number: order.invoice_number(),
            order_number: order.order_number.clone(),
            issued: order.order_date().format(INVOICE_DATE_FORMAT).to_string(),
            due: order.due_date().format(INVOICE_DATE_FORMAT).to_string(),
            customer_name: order.customer.full_name(),
            customer_address: order.customer.full_address(),
            customer_email: order.customer.email.clone(),
            customer_phone: order.customer.phone.clone(),
            lines: order
                .items
                .iter()
                .map(|item| InvoiceLineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: format_price(item.price),
                    total: format_price(item.total),
                })
                .collect(),
            subtotal: format_price(order.subtotal),
            total: format_price(order.total),
            payment_method: order.payment_method.label(),
            payment_status: order.payment_status.label(),
        }
    }
}

/// Invoice template.
#[derive(Template)]
#[template(path = "invoice.html")]
pub struct InvoiceTemplate {
    pub seller: SellerView,
    pub invoice: InvoiceView,
    /// Rendering for the PDF: no toolbar
    pub for_pdf: bool,
    pub pdf_enabled: bool,
}

/// Load the order and seller details for an invoice.
async fn load(state: &AppState, id: String) -> Result<Option<(SellerView, InvoiceView)>> {
    let Some(order) = state.store().get::<Order>(&OrderId::new(id)).await? else {
        return Ok(None);
    };

    let seller = match state.business_info().await? {
        Some(record) => SellerView::from(&record.data),
        None => {
            tracing::warn!("No business info record, invoice uses placeholder seller");
            SellerView::from(&BusinessInfo::fallback(FALLBACK_BUSINESS_NAME))
        }
    };

    Ok(Some((seller, InvoiceView::new(&order))))
}

/// Invoice page handler.
///
/// # Errors
///
/// Returns an error if the order or business info cannot be read.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let Some((seller, invoice)) = load(&state, id).await? else {
        return not_found_page("/orders", "Invoice not found.");
    };

    let template = InvoiceTemplate {
        seller,
        invoice,
        for_pdf: false,
        pdf_enabled: state.renderer().is_some(),
    };
    Ok(render(&template)?.into_response())
}

/// Invoice PDF download handler.
///
/// # Errors
///
/// Returns `Export(Unavailable)` (503) without a render service and
/// `Export` (502) when rendering fails.
#[instrument(skip(state))]
pub async fn pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let renderer = state
        .renderer()
        .ok_or(AppError::Export(ExportError::Unavailable))?;

    let Some((seller, invoice)) = load(&state, id).await? else {
        return not_found_page("/orders", "Invoice not found.");
    };

    let filename = format!("{}.pdf", invoice.invoice_number);
    let html = InvoiceTemplate {
        seller,
        invoice,
        for_pdf: true,
        pdf_enabled: true,
    }
    .render()?;

    let pdf = export::invoice_pdf(renderer, &html).await?;
    tracing::info!(filename = %filename, bytes = pdf.len(), "Invoice PDF generated");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
