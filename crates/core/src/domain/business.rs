//! Store business details shown in the navbar, footer, invoices and receipts.

use serde::{Deserialize, Serialize};

use super::record::{Collection, Entity};
use crate::types::{BusinessInfoId, Email};
use crate::validation::{ValidationError, required};

/// Business details record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub logo: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub is_active: bool,
}

impl Entity for BusinessInfo {
    const COLLECTION: Collection = Collection::BusinessInfo;
    type Id = BusinessInfoId;
}

impl BusinessInfo {
    /// Placeholder used when no record could be loaded.
    #[must_use]
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Address, city and postal code on one line.
    #[must_use]
    pub fn full_address(&self) -> String {
        [&self.address, &self.city, &self.postal_code]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }
}

/// Business info form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessInfoForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub logo: String,
    pub description: String,
    pub category: String,
    pub status: String,
    /// Checkbox value; present when ticked.
    pub is_active: Option<String>,
}

impl BusinessInfoForm {
    #[must_use]
    pub fn from_info(info: &BusinessInfo) -> Self {
        Self {
            name: info.name.clone(),
            address: info.address.clone(),
            city: info.city.clone(),
            postal_code: info.postal_code.clone(),
            phone: info.phone.clone(),
            email: info.email.clone(),
            website: info.website.clone(),
            logo: info.logo.clone(),
            description: info.description.clone(),
            category: info.category.clone(),
            status: info.status.clone(),
            is_active: info.is_active.then(|| "on".to_owned()),
        }
    }

    /// Only the name is required; a non-empty email must be well formed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name is blank or the email is
    /// malformed.
    pub fn validate(&self) -> Result<BusinessInfo, ValidationError> {
        let name = required("name", &self.name)?;
        let email = self.email.trim();
        if !email.is_empty() {
            Email::parse(email)?;
        }

        Ok(BusinessInfo {
            name,
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            email: email.to_owned(),
            website: self.website.trim().to_owned(),
            logo: self.logo.trim().to_owned(),
            description: self.description.trim().to_owned(),
            category: self.category.trim().to_owned(),
            status: self.status.trim().to_owned(),
            is_active: self.is_active.is_some(),
        })
    }
}

/// Summary counts shown above the business info table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessInfoCounts {
    pub total: usize,
    pub categories: usize,
    pub pending: usize,
    pub active: usize,
}

impl BusinessInfoCounts {
    #[must_use]
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a BusinessInfo>) -> Self {
        let mut counts = Self::default();
        let mut categories = std::collections::HashSet::new();
        for info in records {
            counts.total += 1;
            if !info.category.is_empty() {
                categories.insert(info.category.to_lowercase());
            }
            if info.is_pending() {
                counts.pending += 1;
            }
            if info.is_active {
                counts.active += 1;
            }
        }
        counts.categories = categories.len();
        counts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_name_only() {
        let form = BusinessInfoForm {
            name: " Harbour Prints ".to_owned(),
            is_active: Some("on".to_owned()),
            ..BusinessInfoForm::default()
        };
        let info = form.validate().unwrap();
        assert_eq!(info.name, "Harbour Prints");
        assert!(info.is_active);

        let blank = BusinessInfoForm::default();
        assert_eq!(blank.validate(), Err(ValidationError::Required("name")));
    }

    #[test]
    fn test_form_rejects_bad_email() {
        let form = BusinessInfoForm {
            name: "Shop".to_owned(),
            email: "not-an-email".to_owned(),
            ..BusinessInfoForm::default()
        };
        assert!(matches!(form.validate(), Err(ValidationError::Email(_))));
    }

    #[test]
    fn test_counts() {
        let records = [
            BusinessInfo {
                category: "Retail".to_owned(),
                status: "Pending".to_owned(),
                ..BusinessInfo::fallback("A")
            },
            BusinessInfo {
                category: "retail".to_owned(),
                is_active: true,
                ..BusinessInfo::fallback("B")
            },
            BusinessInfo::fallback("C"),
        ];
        let counts = BusinessInfoCounts::compute(&records);
        assert_eq!(
            counts,
            BusinessInfoCounts {
                total: 3,
                categories: 1,
                pending: 1,
                active: 1
            }
        );
    }

    #[test]
    fn test_full_address_skips_blanks() {
        let info = BusinessInfo {
            address: "1 Long St".to_owned(),
            postal_code: "8001".to_owned(),
            ..BusinessInfo::default()
        };
        assert_eq!(info.full_address(), "1 Long St, 8001");
    }
}
