//! Status enums for orders and products.
//!
//! Stored documents carry these as free-form strings that were written by
//! hand over time ("Pending", "pending", "not delivered"), so parsing is
//! case-insensitive and ignores spaces, underscores and hyphens. Serialization
//! always writes the canonical form.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct StatusParseError {
    /// Which status type was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Badge style hint used by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Default,
    Secondary,
    Destructive,
}

impl Badge {
    /// CSS modifier class for the badge.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Default => "badge-default",
            Self::Secondary => "badge-secondary",
            Self::Destructive => "badge-destructive",
        }
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Implements `Display`, `FromStr` and the string conversions serde uses.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $canonical:literal),+ $(,)? }) => {
        impl $name {
            /// Canonical stored form.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $canonical,)+
                }
            }

            /// All variants in display order.
            #[must_use]
            pub const fn all() -> &'static [Self] {
                &[$(Self::$variant,)+]
            }
        }

        impl FromStr for $name {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = normalize(s);
                $(
                    if needle == normalize($canonical) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(StatusParseError {
                    kind: $kind,
                    value: s.to_owned(),
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = StatusParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_owned()
            }
        }
    };
}

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
});

impl PaymentStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
        }
    }

    /// Badge style for the status.
    #[must_use]
    pub const fn badge(&self) -> Badge {
        match self {
            Self::Paid => Badge::Default,
            Self::Pending => Badge::Secondary,
            Self::Failed => Badge::Destructive,
        }
    }
}

/// Order delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum DeliveryStatus {
    #[default]
    NotDelivered,
    Processing,
    Delivered,
}

string_enum!(DeliveryStatus, "delivery status", {
    NotDelivered => "not delivered",
    Processing => "processing",
    Delivered => "delivered",
});

impl DeliveryStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotDelivered => "Not delivered",
            Self::Processing => "Processing",
            Self::Delivered => "Delivered",
        }
    }

    /// Badge style for the status.
    #[must_use]
    pub const fn badge(&self) -> Badge {
        match self {
            Self::Delivered => Badge::Default,
            Self::Processing => Badge::Secondary,
            Self::NotDelivered => Badge::Destructive,
        }
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Yoco,
}

string_enum!(PaymentMethod, "payment method", {
    Cash => "cash",
    Yoco => "yoco",
});

impl PaymentMethod {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Yoco => "Yoco (card)",
        }
    }
}

/// Product availability status set by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum ProductStatus {
    #[default]
    InStock,
    OutOfStock,
    Discontinued,
}

string_enum!(ProductStatus, "product status", {
    InStock => "inStock",
    OutOfStock => "outOfStock",
    Discontinued => "discontinued",
});

impl ProductStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::OutOfStock => "Out of stock",
            Self::Discontinued => "Discontinued",
        }
    }
}

macro_rules! display_as_label {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )+
    };
}

display_as_label!(PaymentStatus, DeliveryStatus, PaymentMethod, ProductStatus);
