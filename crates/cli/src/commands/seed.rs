//! Seed products and business info from a YAML catalog file.
//!
//! The file uses the stored document shape (camelCase keys):
//!
//! ```yaml
//! businessInfo:
//!   name: Shopfloor
//!   city: Cape Town
//! products:
//!   - productID: 1
//!     name: Premium Apron
//!     category: Aprons
//!     variants:
//!       - type: Apron
//!         color: Navy Blue
//!         size: Medium
//!         sellingPrice: "249.99"
//! ```
//!
//! Products whose number already exists are skipped, so the command can be
//! re-run after editing the file. Business info is only inserted into an
//! empty collection.

use std::collections::HashSet;

use serde::Deserialize;
use shopfloor_core::{BusinessInfo, BusinessInfoForm, Collection, Product, ProductDraft};
use shopfloor_store::DocumentStore;
use tracing::{info, warn};

use super::{CommandError, connect};

/// Parsed catalog file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedCatalog {
    pub business_info: Option<BusinessInfo>,
    pub products: Vec<Product>,
}

impl SeedCatalog {
    /// Parse and validate a catalog document.
    ///
    /// Every product must pass the same checks as the inventory form.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed YAML or the first invalid record.
    pub fn parse(content: &str) -> Result<Self, CommandError> {
        let catalog: Self = serde_yaml::from_str(content)?;

        for product in &catalog.products {
            ProductDraft::from_product(product)
                .validate()
                .map_err(|source| CommandError::InvalidProduct {
                    product_number: product.product_number,
                    source,
                })?;
        }
        if let Some(info) = &catalog.business_info {
            BusinessInfoForm::from_info(info)
                .validate()
                .map_err(CommandError::InvalidBusinessInfo)?;
        }

        Ok(catalog)
    }
}

/// Products to insert and product numbers skipped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedPlan<'a> {
    pub insert: Vec<&'a Product>,
    pub skipped: Vec<u32>,
}

/// Split the catalog into new products and numbers that already exist,
/// either in the store or earlier in the same file.
#[must_use]
pub fn plan(existing: impl IntoIterator<Item = u32>, products: &[Product]) -> SeedPlan<'_> {
    let mut taken: HashSet<u32> = existing.into_iter().collect();
    let mut plan = SeedPlan::default();

    for product in products {
        if taken.insert(product.product_number) {
            plan.insert.push(product);
        } else {
            plan.skipped.push(product.product_number);
        }
    }
    plan
}

/// Seed the catalog from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a database
/// operation fails.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), CommandError> {
    info!(path = %file_path, "Loading catalog from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CommandError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    let catalog = SeedCatalog::parse(&content)?;
    info!(
        products = catalog.products.len(),
        business_info = catalog.business_info.is_some(),
        "Catalog validated"
    );

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let pool = connect().await?;
    let store = DocumentStore::new(&pool);

    let existing = store.list::<Product>().await?;
    let plan = plan(existing.iter().map(|r| r.data.product_number), &catalog.products);

    for product in &plan.insert {
        let record = store.insert(*product).await?;
        info!(
            product_id = %record.id,
            product_number = product.product_number,
            name = %product.name,
            "Product inserted"
        );
    }
    for number in &plan.skipped {
        warn!(product_number = number, "Product number already exists, skipped");
    }

    if let Some(info) = &catalog.business_info {
        if store.count(Collection::BusinessInfo).await? == 0 {
            let record = store.insert(info).await?;
            info!(business_info_id = %record.id, name = %info.name, "Business info inserted");
        } else {
            info!("Business info already present, skipped");
        }
    }

    info!("Seeding complete!");
    info!("  Products inserted: {}", plan.insert.len());
    info!("  Products skipped (already exist): {}", plan.skipped.len());
    Ok(())
}
