//! Inventory (product CRUD) route handlers.
//!
//! The product form posts flat `name=value` pairs. Variant fields are named
//! `variants[{index}][{field}]`, and the submit button's `action` value
//! chooses between saving and adding or removing a variant row.

use std::collections::BTreeMap;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use shopfloor_core::{
    CATEGORIES, Collection, ListFilter, Product, ProductDraft, ProductId, ProductStatus, Record,
    VariantDraft, filter_products, format_price, next_product_number,
};
use tracing::instrument;

use super::{SelectOption, not_found_page, render};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Product row for the inventory table.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub product_number: u32,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub image: Option<String>,
    pub variant_count: usize,
    pub stock: u32,
    pub price: Option<String>,
    pub status: &'static str,
    pub low_stock: bool,
}

impl From<&Record<Product>> for ProductRowView {
    fn from(record: &Record<Product>) -> Self {
        let product = &record.data;
        Self {
            id: record.id_str().to_owned(),
            product_number: product.product_number,
            name: product.name.clone(),
            category: product.category.clone(),
            supplier: product.supplier.clone(),
            image: product.cover_image().map(str::to_owned),
            variant_count: product.variants.len(),
            stock: product.total_stock(),
            price: product.display_price().map(format_price),
            status: product.status.label(),
            low_stock: product.is_low_stock(),
        }
    }
}

/// Inventory list template.
#[derive(Template)]
#[template(path = "inventory/index.html")]
pub struct InventoryIndexTemplate {
    pub current_path: String,
    pub products: Vec<ProductRowView>,
    pub total: usize,
    pub low_stock: usize,
    pub search: String,
    pub categories: Vec<SelectOption>,
}

impl InventoryIndexTemplate {
    /// Rows follow the filter; the total and low-stock figures cover the
    /// whole catalog.
    fn new(products: &[Record<Product>], filter: &ListFilter) -> Self {
        Self {
            current_path: "/inventory".to_owned(),
            products: filter_products(products, filter)
                .into_iter()
                .map(ProductRowView::from)
                .collect(),
            total: products.len(),
            low_stock: products.iter().filter(|r| r.data.is_low_stock()).count(),
            search: filter.search.trim().to_owned(),
            categories: category_options(filter.selector_or_all()),
        }
    }
}

/// Variant row in the product form.
#[derive(Debug, Clone)]
pub struct VariantFormRow {
    pub index: usize,
    pub draft: VariantDraft,
}

/// Product create/edit form template.
#[derive(Template)]
#[template(path = "inventory/form.html")]
pub struct ProductFormTemplate {
    pub current_path: String,
    pub title: String,
    /// Form target: `/inventory` or `/inventory/{id}`
    pub action: String,
    pub draft: ProductDraft,
    pub variants: Vec<VariantFormRow>,
    pub categories: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn new(title: String, action: String, draft: ProductDraft, error: Option<String>) -> Self {
        let categories = category_options(&draft.category);
        let selected_status = draft.status.parse::<ProductStatus>().unwrap_or_default();
        let statuses = ProductStatus::all()
            .iter()
            .map(|s| SelectOption::new(s.as_str(), s.label(), *s == selected_status))
            .collect();
        let variants = draft
            .variants
            .iter()
            .enumerate()
            .map(|(index, v)| VariantFormRow {
                index,
                draft: v.clone(),
            })
            .collect();

        Self {
            current_path: "/inventory".to_owned(),
            title,
            action,
            draft,
            variants,
            categories,
            statuses,
            error,
        }
    }
}

fn category_options(selected: &str) -> Vec<SelectOption> {
    CATEGORIES
        .iter()
        .map(|c| SelectOption::new(*c, *c, *c == selected))
        .collect()
}

// =============================================================================
// Form parsing
// =============================================================================

/// What the product form submit asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Save,
    AddVariant,
    RemoveVariant(usize),
}

impl FormAction {
    fn parse(value: &str) -> Self {
        match value {
            "add-variant" => Self::AddVariant,
            other => other
                .strip_prefix("remove-variant-")
                .and_then(|i| i.parse().ok())
                .map_or(Self::Save, Self::RemoveVariant),
        }
    }

    /// Apply a row edit to the draft. Returns `false` for [`FormAction::Save`].
    fn apply(self, draft: &mut ProductDraft) -> bool {
        match self {
            Self::Save => false,
            Self::AddVariant => {
                draft.variants.push(VariantDraft::default());
                true
            }
            Self::RemoveVariant(index) => {
                if index < draft.variants.len() {
                    draft.variants.remove(index);
                }
                true
            }
        }
    }
}

/// Split `variants[3][color]` into `(3, "color")`.
fn variant_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("variants[")?;
    let (index, field) = rest.split_once("][")?;
    Some((index.parse().ok()?, field.strip_suffix(']')?))
}

fn set_variant_field(variant: &mut VariantDraft, field: &str, value: String) {
    match field {
        "variant_type" => variant.variant_type = value,
        "color" => variant.color = value,
        "size" => variant.size = value,
        "selling_price" => variant.selling_price = value,
        "stock_price" => variant.stock_price = value,
        "stock_quantity" => variant.stock_quantity = value,
        "description" => variant.description = value,
        "images" => variant.images = value,
        _ => {}
    }
}

/// Build a draft from posted form pairs. Variant rows keep their index
/// order; unknown fields are ignored.
pub fn parse_product_form(pairs: Vec<(String, String)>) -> (ProductDraft, FormAction) {
    let mut draft = ProductDraft::default();
    let mut variants: BTreeMap<usize, VariantDraft> = BTreeMap::new();
    let mut action = FormAction::Save;

    for (key, value) in pairs {
        if let Some((index, field)) = variant_key(&key) {
            set_variant_field(variants.entry(index).or_default(), field, value);
            continue;
        }
        match key.as_str() {
            "product_number" => draft.product_number = value,
            "name" => draft.name = value,
            "category" => draft.category = value,
            "supplier" => draft.supplier = value,
            "product_image" => draft.product_image = value,
            "batch_number" => draft.batch_number = value,
            "status" => draft.status = value,
            "last_restocked" => draft.last_restocked = value,
            "action" => action = FormAction::parse(&value),
            _ => {}
        }
    }

    draft.variants = variants.into_values().collect();
    (draft, action)
}

// =============================================================================
// Handlers
// =============================================================================

/// Inventory list handler.
///
/// # Errors
///
/// Returns an error if the product collection cannot be read.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Html<String>> {
    let products = state.store().list::<Product>().await?;
    render(&InventoryIndexTemplate::new(&products, &filter))
}

/// New product form handler.
///
/// The product number is prefilled with the next free number.
///
/// # Errors
///
/// Returns an error if the product collection cannot be read.
#[instrument(skip(state))]
pub async fn new_product(State(state): State<AppState>) -> Result<Html<String>> {
    let products = state.store().list::<Product>().await?;
    let draft = ProductDraft {
        product_number: next_product_number(products.iter().map(|r| &r.data)).to_string(),
        status: ProductStatus::InStock.as_str().to_owned(),
        last_restocked: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        variants: vec![VariantDraft::default()],
        ..ProductDraft::default()
    };

    render(&ProductFormTemplate::new(
        "New product".to_owned(),
        "/inventory".to_owned(),
        draft,
        None,
    ))
}

/// Create product handler.
///
/// # Errors
///
/// Returns an error if the product cannot be stored. Validation failures
/// re-render the form with status 422.
#[instrument(skip(state, pairs))]
pub async fn create(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let (mut draft, action) = parse_product_form(pairs);
    let title = "New product".to_owned();
    let target = "/inventory".to_owned();

    if action.apply(&mut draft) {
        return Ok(render(&ProductFormTemplate::new(title, target, draft, None))?.into_response());
    }

    match draft.validate() {
        Ok(product) => {
            let record = state.store().insert(&product).await?;
            tracing::info!(
                product_id = %record.id,
                product_number = product.product_number,
                name = %product.name,
                "Product created"
            );
            Ok(Redirect::to("/inventory").into_response())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Product validation failed");
            let page = render(&ProductFormTemplate::new(
                title,
                target,
                draft,
                Some(e.to_string()),
            ))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Edit product form handler.
///
/// # Errors
///
/// Returns an error if the product cannot be read.
#[instrument(skip(state))]
pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = ProductId::new(id);
    let Some(record) = state.store().get::<Product>(&id).await? else {
        return not_found_page("/inventory", "Product not found.");
    };

    let page = render(&ProductFormTemplate::new(
        format!("Edit {}", record.data.name),
        format!("/inventory/{id}"),
        ProductDraft::from_product(&record.data),
        None,
    ))?;
    Ok(page.into_response())
}

/// Update product handler.
///
/// # Errors
///
/// Returns `NotFound` if the product no longer exists. Validation failures
/// re-render the form with status 422.
#[instrument(skip(state, pairs))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let id = ProductId::new(id);
    let (mut draft, action) = parse_product_form(pairs);
    let title = format!("Edit {}", draft.name.trim());
    let target = format!("/inventory/{id}");

    if action.apply(&mut draft) {
        return Ok(render(&ProductFormTemplate::new(title, target, draft, None))?.into_response());
    }

    match draft.validate() {
        Ok(product) => {
            state.store().replace(&id, &product).await?;
            tracing::info!(product_id = %id, name = %product.name, "Product updated");
            Ok(Redirect::to("/inventory").into_response())
        }
        Err(e) => {
            tracing::debug!(product_id = %id, error = %e, "Product validation failed");
            let page = render(&ProductFormTemplate::new(
                title,
                target,
                draft,
                Some(e.to_string()),
            ))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Delete product handler.
///
/// # Errors
///
/// Returns an error if the delete fails.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    if state.store().delete(Collection::Products, &id).await? {
        tracing::info!(product_id = %id, "Product deleted");
    } else {
        tracing::warn!(product_id = %id, "Delete requested for missing product");
    }
    Ok(Redirect::to("/inventory"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopfloor_core::Variant;

    use super::*;

    fn product(id: &str, name: &str, category: &str, stock: u32) -> Record<Product> {
        let product = Product {
            product_number: 1,
            name: name.to_owned(),
            category: category.to_owned(),
            supplier: String::new(),
            product_image: String::new(),
            batch_number: String::new(),
            status: ProductStatus::InStock,
            last_restocked: None,
            variants: vec![Variant {
                variant_type: category.to_owned(),
                color: "Black".to_owned(),
                size: "Medium".to_owned(),
                selling_price: Decimal::new(9999, 2),
                stock_price: Decimal::new(5000, 2),
                stock_quantity: stock,
                description: String::new(),
                images: Vec::new(),
            }],
        };
        Record::new(ProductId::new(id), product, Utc::now())
    }

    #[test]
    fn test_index_counts_cover_whole_catalog() {
        let products = vec![
            product("p1", "Chef Apron", "Aprons", 2),
            product("p2", "Travel Mug", "Mugs", 40),
            product("p3", "Storm Umbrella", "Umbrellas", 1),
        ];

        let template = InventoryIndexTemplate::new(&products, &ListFilter::new("", "Mugs"));
        assert_eq!(template.products.len(), 1);
        assert_eq!(template.products[0].id, "p2");
        assert!(!template.products[0].low_stock);
        assert_eq!(template.total, 3);
        assert_eq!(template.low_stock, 2);
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_owned(), value.to_owned())
    }

    fn form() -> Vec<(String, String)> {
        vec![
            pair("product_number", "12"),
            pair("name", "Premium Apron"),
            pair("category", "Aprons"),
            pair("supplier", "Acme"),
            pair("product_image", "https://img.example/apron.png"),
            pair("batch_number", "B-7"),
            pair("status", "inStock"),
            pair("last_restocked", "2024-05-01"),
            pair("variants[1][variant_type]", "Apron"),
            pair("variants[1][color]", "Red"),
            pair("variants[1][size]", "Large"),
            pair("variants[1][selling_price]", "259.99"),
            pair("variants[1][stock_price]", "120"),
            pair("variants[1][stock_quantity]", "4"),
            pair("variants[0][variant_type]", "Apron"),
            pair("variants[0][color]", "Navy Blue"),
            pair("variants[0][size]", "Medium"),
            pair("variants[0][selling_price]", "249.99"),
            pair("variants[0][stock_price]", "120"),
            pair("variants[0][stock_quantity]", "12"),
            pair("variants[0][images]", "https://img.example/navy.png"),
            pair("variants[0][unknown]", "ignored"),
        ]
    }

    #[test]
    fn test_variant_key() {
        assert_eq!(variant_key("variants[0][color]"), Some((0, "color")));
        assert_eq!(variant_key("variants[12][stock_price]"), Some((12, "stock_price")));
        assert_eq!(variant_key("variants[x][color]"), None);
        assert_eq!(variant_key("variants[0]"), None);
        assert_eq!(variant_key("name"), None);
    }

    #[test]
    fn test_parse_product_form_orders_variants_by_index() {
        let (draft, action) = parse_product_form(form());
        assert_eq!(action, FormAction::Save);
        assert_eq!(draft.name, "Premium Apron");
        assert_eq!(draft.variants.len(), 2);
        assert_eq!(draft.variants[0].color, "Navy Blue");
        assert_eq!(draft.variants[1].color, "Red");

        let product = draft.validate().unwrap();
        assert_eq!(product.product_number, 12);
        assert_eq!(product.total_stock(), 16);
        assert_eq!(product.variants[0].images, vec!["https://img.example/navy.png"]);
    }

    #[test]
    fn test_form_actions_edit_variant_rows() {
        let mut pairs = form();
        pairs.push(pair("action", "add-variant"));
        let (mut draft, action) = parse_product_form(pairs);
        assert_eq!(action, FormAction::AddVariant);
        assert!(action.apply(&mut draft));
        assert_eq!(draft.variants.len(), 3);

        let action = FormAction::parse("remove-variant-0");
        assert_eq!(action, FormAction::RemoveVariant(0));
        assert!(action.apply(&mut draft));
        assert_eq!(draft.variants[0].color, "Red");

        // Out-of-range removal leaves the rows alone
        assert!(FormAction::RemoveVariant(9).apply(&mut draft));
        assert_eq!(draft.variants.len(), 2);

        assert_eq!(FormAction::parse("save"), FormAction::Save);
        assert!(!FormAction::Save.apply(&mut draft));
    }

    #[test]
    fn test_form_template_marks_selections() {
        let (draft, _) = parse_product_form(form());
        let template =
            ProductFormTemplate::new("Edit".to_owned(), "/inventory/p1".to_owned(), draft, None);
        let selected: Vec<_> = template
            .categories
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["Aprons"]);
        assert!(template.statuses.iter().any(|o| o.selected && o.value == "inStock"));
        assert_eq!(template.variants[1].index, 1);
    }
}
