//! Stored documents and the collections they live in.

use core::fmt;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Orders,
    Customers,
    BusinessInfo,
}

impl Collection {
    /// Collection name as stored in the `documents.collection` column.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Customers => "customers",
            Self::BusinessInfo => "businessInfo",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A document type stored in exactly one collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Collection holding documents of this type.
    const COLLECTION: Collection;

    /// Typed document identifier.
    type Id: From<String> + AsRef<str> + Clone + Debug + PartialEq + Send + Sync;
}

/// A document together with its identifier and bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct Record<E: Entity> {
    pub id: E::Id,
    pub data: E,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<E: Entity> Record<E> {
    /// Wrap a document that has not been persisted yet.
    #[must_use]
    pub fn new(id: E::Id, data: E, now: DateTime<Utc>) -> Self {
        Self {
            id,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identifier as a plain string slice.
    #[must_use]
    pub fn id_str(&self) -> &str {
        self.id.as_ref()
    }
}
