//! Products and their sellable variants.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::{Collection, Entity};
use crate::types::{ProductId, ProductStatus};
use crate::validation::{ValidationError, parse_required, required};

/// Stock at or below this level is reported as low.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Categories offered in the catalog and inventory filters.
pub const CATEGORIES: &[&str] = &["Aprons", "Mugs", "Umbrellas"];

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Human-facing product number, distinct from the document id.
    #[serde(rename = "productID")]
    pub product_number: u32,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub product_image: String,
    #[serde(default)]
    pub batch_number: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub last_restocked: Option<NaiveDate>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Entity for Product {
    const COLLECTION: Collection = Collection::Products;
    type Id = ProductId;
}

/// A specific sellable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(rename = "type")]
    pub variant_type: String,
    pub color: String,
    pub size: String,
    pub selling_price: Decimal,
    #[serde(default)]
    pub stock_price: Decimal,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Variant {
    /// Short label such as "Medium Navy Blue".
    #[must_use]
    pub fn label(&self) -> String {
        [self.size.as_str(), self.color.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock_quantity <= LOW_STOCK_THRESHOLD
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Margin per unit (selling minus stock price).
    #[must_use]
    pub fn margin(&self) -> Decimal {
        self.selling_price - self.stock_price
    }
}

impl Product {
    /// Sum of stock across all variants.
    #[must_use]
    pub fn total_stock(&self) -> u32 {
        self.variants
            .iter()
            .map(|v| v.stock_quantity)
            .fold(0, u32::saturating_add)
    }

    /// Whether the product can be bought at all.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.status == ProductStatus::InStock && self.total_stock() > 0
    }

    /// Aggregate stock is at or below [`LOW_STOCK_THRESHOLD`].
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.total_stock() <= LOW_STOCK_THRESHOLD
    }

    /// Price shown on listings: the first variant's selling price.
    #[must_use]
    pub fn display_price(&self) -> Option<Decimal> {
        self.variants.first().map(|v| v.selling_price)
    }

    /// Main image, falling back to the first variant image.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        if !self.product_image.is_empty() {
            return Some(&self.product_image);
        }
        self.variants
            .iter()
            .flat_map(|v| v.images.iter())
            .map(String::as_str)
            .next()
    }

    #[must_use]
    pub fn variant(&self, index: usize) -> Option<&Variant> {
        self.variants.get(index)
    }

    /// Identifier used for the cart line of one variant.
    #[must_use]
    pub fn cart_item_id(id: &ProductId, variant_index: usize) -> String {
        format!("{id}:{variant_index}")
    }

    /// Line name for one variant, e.g. "Premium Apron - Medium Navy Blue".
    #[must_use]
    pub fn line_name(&self, variant: &Variant) -> String {
        let label = variant.label();
        if label.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {label}", self.name)
        }
    }
}

/// Next product number: one past the highest existing number.
#[must_use]
pub fn next_product_number<'a>(existing: impl IntoIterator<Item = &'a Product>) -> u32 {
    existing
        .into_iter()
        .map(|p| p.product_number)
        .max()
        .map_or(1, |n| n.saturating_add(1))
}

/// Product form input before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub product_number: String,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub product_image: String,
    pub batch_number: String,
    pub status: String,
    pub last_restocked: String,
    pub variants: Vec<VariantDraft>,
}

/// Variant form input before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub variant_type: String,
    pub color: String,
    pub size: String,
    pub selling_price: String,
    pub stock_price: String,
    pub stock_quantity: String,
    pub description: String,
    /// Image URLs, one per line or comma separated.
    pub images: String,
}

impl ProductDraft {
    /// Prefill a form from a stored product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_number: product.product_number.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            supplier: product.supplier.clone(),
            product_image: product.product_image.clone(),
            batch_number: product.batch_number.clone(),
            status: product.status.as_str().to_owned(),
            last_restocked: product
                .last_restocked
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            variants: product.variants.iter().map(VariantDraft::from_variant).collect(),
        }
    }

    /// Check required fields and parse numbers.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, main fields before variants.
    pub fn validate(&self) -> Result<Product, ValidationError> {
        let product_number =
            parse_required("product number", &self.product_number, "a positive whole number")?;
        if product_number == 0 {
            return Err(ValidationError::Invalid {
                field: "product number",
                expected: "a positive whole number",
            });
        }
        let name = required("name", &self.name)?;
        let category = required("category", &self.category)?;
        let supplier = required("supplier", &self.supplier)?;
        let product_image = required("product image", &self.product_image)?;
        let batch_number = required("batch number", &self.batch_number)?;
        let status = parse_required("status", &self.status, "a known product status")?;
        let last_restocked = required("last restocked", &self.last_restocked)?;
        let last_restocked = NaiveDate::parse_from_str(&last_restocked, "%Y-%m-%d").map_err(|_| {
            ValidationError::Invalid {
                field: "last restocked",
                expected: "a date (YYYY-MM-DD)",
            }
        })?;

        if self.variants.is_empty() {
            return Err(ValidationError::NoVariants);
        }
        let variants = self
            .variants
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.validate().map_err(|e| ValidationError::Variant {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Product {
            product_number,
            name,
            category,
            supplier,
            product_image,
            batch_number,
            status,
            last_restocked: Some(last_restocked),
            variants,
        })
    }
}

impl VariantDraft {
    #[must_use]
    pub fn from_variant(variant: &Variant) -> Self {
        Self {
            variant_type: variant.variant_type.clone(),
            color: variant.color.clone(),
            size: variant.size.clone(),
            selling_price: variant.selling_price.to_string(),
            stock_price: variant.stock_price.to_string(),
            stock_quantity: variant.stock_quantity.to_string(),
            description: variant.description.clone(),
            images: variant.images.join("\n"),
        }
    }

    /// Check required fields and parse numbers.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for the first missing or malformed field.
    pub fn validate(&self) -> Result<Variant, ValidationError> {
        let variant_type = required("type", &self.variant_type)?;
        let color = required("color", &self.color)?;
        let size = required("size", &self.size)?;
        let selling_price = non_negative("selling price", &self.selling_price)?;
        let stock_price = non_negative("stock price", &self.stock_price)?;
        let stock_quantity =
            parse_required("stock quantity", &self.stock_quantity, "a whole number of 0 or more")?;

        let images = self
            .images
            .split(['\n', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Variant {
            variant_type,
            color,
            size,
            selling_price,
            stock_price,
            stock_quantity,
            description: self.description.trim().to_owned(),
            images,
        })
    }
}

fn non_negative(field: &'static str, value: &str) -> Result<Decimal, ValidationError> {
    let amount: Decimal = parse_required(field, value, "a non-negative amount")?;
    if amount.is_sign_negative() {
        return Err(ValidationError::Invalid {
            field,
            expected: "a non-negative amount",
        });
    }
    Ok(amount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn variant(stock: u32, price: i64) -> Variant {
        Variant {
            variant_type: "Perfect".to_owned(),
            color: "Navy Blue".to_owned(),
            size: "Medium".to_owned(),
            selling_price: Decimal::new(price, 2),
            stock_price: Decimal::new(price / 2, 2),
            stock_quantity: stock,
            description: String::new(),
            images: vec![],
        }
    }

    pub(crate) fn product(number: u32, name: &str, category: &str, stocks: &[u32]) -> Product {
        Product {
            product_number: number,
            name: name.to_owned(),
            category: category.to_owned(),
            supplier: "Acme".to_owned(),
            product_image: String::new(),
            batch_number: "B1".to_owned(),
            status: ProductStatus::InStock,
            last_restocked: None,
            variants: stocks.iter().map(|&s| variant(s, 4599)).collect(),
        }
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            product_number: "7".to_owned(),
            name: "Premium Apron".to_owned(),
            category: "Aprons".to_owned(),
            supplier: "Acme".to_owned(),
            product_image: "https://img.example.com/apron.png".to_owned(),
            batch_number: "B-2024-01".to_owned(),
            status: "inStock".to_owned(),
            last_restocked: "2024-05-01".to_owned(),
            variants: vec![VariantDraft {
                variant_type: "Perfect".to_owned(),
                color: "Navy Blue".to_owned(),
                size: "Medium".to_owned(),
                selling_price: "45.99".to_owned(),
                stock_price: "20".to_owned(),
                stock_quantity: "23".to_owned(),
                description: "Cotton".to_owned(),
                images: "https://a.example/1.png,\n https://a.example/2.png".to_owned(),
            }],
        }
    }

    #[test]
    fn test_low_stock_uses_aggregate_at_threshold() {
        assert!(product(1, "A", "Mugs", &[2, 3]).is_low_stock());
        assert!(!product(1, "A", "Mugs", &[3, 3]).is_low_stock());
        assert!(product(1, "A", "Mugs", &[]).is_low_stock());
        assert!(variant(5, 100).is_low_stock());
        assert!(!variant(6, 100).is_low_stock());
    }

    #[test]
    fn test_total_stock_saturates() {
        let p = product(1, "A", "Mugs", &[u32::MAX, 1]);
        assert_eq!(p.total_stock(), u32::MAX);
        assert!(!p.is_low_stock());
    }

    #[test]
    fn test_display_price_and_label() {
        let p = product(1, "Premium Apron", "Aprons", &[10]);
        assert_eq!(p.display_price(), Some(Decimal::new(4599, 2)));
        assert_eq!(p.variants[0].label(), "Medium Navy Blue");
        assert_eq!(p.line_name(&p.variants[0]), "Premium Apron - Medium Navy Blue");
        assert_eq!(product(1, "A", "Mugs", &[]).display_price(), None);
    }

    #[test]
    fn test_in_stock_respects_status() {
        let mut p = product(1, "A", "Mugs", &[1]);
        assert!(p.in_stock());
        p.status = ProductStatus::Discontinued;
        assert!(!p.in_stock());
        assert!(!product(1, "A", "Mugs", &[0]).in_stock());
    }

    #[test]
    fn test_next_product_number() {
        assert_eq!(next_product_number(&[]), 1);
        let products = [product(3, "A", "Mugs", &[]), product(9, "B", "Mugs", &[])];
        assert_eq!(next_product_number(&products), 10);
    }

    #[test]
    fn test_document_shape() {
        let json = serde_json::json!({
            "productID": 2,
            "name": "Coffee Mug Set",
            "category": "Mugs",
            "status": "outOfStock",
            "variants": [{
                "type": "Limited Edition",
                "color": "White",
                "size": "Standard",
                "sellingPrice": 29.99,
                "stockQuantity": 3
            }]
        });
        let p: Product = serde_json::from_value(json).unwrap();
        assert_eq!(p.product_number, 2);
        assert_eq!(p.status, ProductStatus::OutOfStock);
        assert_eq!(p.variants[0].selling_price, Decimal::new(2999, 2));
        assert_eq!(p.total_stock(), 3);
    }

    #[test]
    fn test_draft_validates() {
        let p = draft().validate().unwrap();
        assert_eq!(p.product_number, 7);
        assert_eq!(p.variants[0].selling_price, Decimal::new(4599, 2));
        assert_eq!(p.variants[0].stock_quantity, 23);
        assert_eq!(p.variants[0].images.len(), 2);
        assert_eq!(p.last_restocked, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_draft_requires_main_fields_and_variants() {
        let mut d = draft();
        d.supplier = " ".to_owned();
        assert_eq!(d.validate(), Err(ValidationError::Required("supplier")));

        let mut d = draft();
        d.variants.clear();
        assert_eq!(d.validate(), Err(ValidationError::NoVariants));
    }

    #[test]
    fn test_draft_rejects_bad_variant_numbers() {
        let mut d = draft();
        d.variants[0].selling_price = "-1".to_owned();
        assert!(matches!(
            d.validate(),
            Err(ValidationError::Variant { index: 0, .. })
        ));

        let mut d = draft();
        d.variants[0].stock_quantity = "3.5".to_owned();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_draft_from_product_round_trips() {
        let p = draft().validate().unwrap();
        let again = ProductDraft::from_product(&p).validate().unwrap();
        assert_eq!(p, again);
    }
}
