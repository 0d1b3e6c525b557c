//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfloor_core::{Product, ProductId, Record, Variant, format_price};
use shopfloor_store::DocumentStore;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use super::cart::add_variant;
use super::pages::NotFoundTemplate;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Variant option display data for templates.
#[derive(Clone)]
pub struct VariantView {
    pub index: usize,
    pub label: String,
    pub variant_type: String,
    pub color: String,
    pub size: String,
    pub price: String,
    pub description: String,
    pub stock: u32,
    pub in_stock: bool,
    pub low_stock: bool,
    pub selected: bool,
}

impl VariantView {
    fn new(index: usize, variant: &Variant, selected: bool) -> Self {
        Self {
            index,
            label: variant.label(),
            variant_type: variant.variant_type.clone(),
            color: variant.color.clone(),
            size: variant.size.clone(),
            price: format_price(variant.selling_price),
            description: variant.description.clone(),
            stock: variant.stock_quantity,
            in_stock: variant.in_stock(),
            low_stock: variant.in_stock() && variant.is_low_stock(),
            selected,
        }
    }
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub status: String,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub variants: Vec<VariantView>,
    pub selected: Option<VariantView>,
}

impl ProductView {
    /// Build the view with the variant at `selected` highlighted, falling
    /// back to the first variant.
    fn new(record: &Record<Product>, selected: usize) -> Self {
        let product = &record.data;
        let selected = if selected < product.variants.len() {
            selected
        } else {
            0
        };

        let variants: Vec<VariantView> = product
            .variants
            .iter()
            .enumerate()
            .map(|(i, v)| VariantView::new(i, v, i == selected))
            .collect();

        // Main image first, then the selected variant's images
        let mut images: Vec<String> = product
            .cover_image()
            .map(str::to_owned)
            .into_iter()
            .collect();
        if let Some(variant) = product.variant(selected) {
            let extra: Vec<String> = variant
                .images
                .iter()
                .filter(|url| !images.contains(*url))
                .cloned()
                .collect();
            images.extend(extra);
        }

        Self {
            id: record.id_str().to_owned(),
            name: product.name.clone(),
            category: product.category.clone(),
            supplier: product.supplier.clone(),
            status: product.status.to_string(),
            in_stock: product.in_stock(),
            images,
            selected: variants.iter().find(|v| v.selected).cloned(),
            variants,
        }
    }
}

/// Variant selection query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VariantQuery {
    pub variant: usize,
}

/// Add-to-cart form data on the product page.
#[derive(Debug, Deserialize)]
pub struct AddVariantForm {
    pub variant: usize,
    pub quantity: Option<u32>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductView,
}

/// Display product detail page.
///
/// # Errors
///
/// Returns an error if the product collection cannot be read. A missing
/// product renders the not-found page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<VariantQuery>,
) -> Result<Response> {
    let id = ProductId::new(id);
    let page = PageContext::load(&state, &session).await;

    let Some(record) = DocumentStore::new(state.pool()).get::<Product>(&id).await? else {
        tracing::debug!(product_id = %id, "Product not found");
        return Ok((
            StatusCode::NOT_FOUND,
            NotFoundTemplate {
                page,
                message: "This product is no longer available.".to_owned(),
            },
        )
            .into_response());
    };

    Ok(ProductShowTemplate {
        page,
        product: ProductView::new(&record, query.variant),
    }
    .into_response())
}

/// Add `quantity` units of the selected variant, then show the cart.
///
/// # Errors
///
/// Returns `NotFound` for unknown products or variants and `BadRequest`
/// when the variant is out of stock.
#[instrument(skip(state, session))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<AddVariantForm>,
) -> Result<Redirect> {
    let id = ProductId::new(id);
    let quantity = form.quantity.unwrap_or(1).max(1);
    add_variant(&state, &session, &id, form.variant, quantity).await?;
    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shopfloor_core::ProductStatus;

    use super::*;

    fn variant(color: &str, stock: u32, image: &str) -> Variant {
        Variant {
            variant_type: "Apron".to_owned(),
            color: color.to_owned(),
            size: "Medium".to_owned(),
            selling_price: Decimal::new(24999, 2),
            stock_price: Decimal::new(12000, 2),
            stock_quantity: stock,
            description: String::new(),
            images: vec![image.to_owned()],
        }
    }

    fn record() -> Record<Product> {
        let product = Product {
            product_number: 7,
            name: "Premium Apron".to_owned(),
            category: "Aprons".to_owned(),
            supplier: "Acme".to_owned(),
            product_image: "https://img.example/main.png".to_owned(),
            batch_number: "B-1".to_owned(),
            status: ProductStatus::InStock,
            last_restocked: None,
            variants: vec![
                variant("Navy Blue", 12, "https://img.example/navy.png"),
                variant("Red", 3, "https://img.example/main.png"),
            ],
        };
        Record::new(ProductId::new("p1"), product, Utc::now())
    }

    #[test]
    fn test_product_view_selects_requested_variant() {
        let view = ProductView::new(&record(), 1);
        let selected = view.selected.unwrap();
        assert_eq!(selected.index, 1);
        assert_eq!(selected.color, "Red");
        assert!(selected.low_stock);
        assert_eq!(selected.price, "R249.99");
        // Variant image duplicates the main image and is not repeated
        assert_eq!(view.images, vec!["https://img.example/main.png"]);
    }

    #[test]
    fn test_product_view_falls_back_to_first_variant() {
        let view = ProductView::new(&record(), 9);
        let selected = view.selected.unwrap();
        assert_eq!(selected.index, 0);
        assert!(!selected.low_stock);
        assert_eq!(view.images.len(), 2);
        assert_eq!(view.variants.iter().filter(|v| v.selected).count(), 1);
    }
}
