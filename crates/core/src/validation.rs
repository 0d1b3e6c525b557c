//! Form validation errors shared by the write paths.

use crate::types::EmailError;

/// A required-field or format check failed before a write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },

    #[error("at least one variant is required")]
    NoVariants,

    #[error("variant {}: {source}", .index + 1)]
    Variant {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// Trim a form field and reject it when blank.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Parse a required form field with `FromStr`.
pub(crate) fn parse_required<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
    expected: &'static str,
) -> Result<T, ValidationError> {
    required(field, value)?
        .parse()
        .map_err(|_| ValidationError::Invalid { field, expected })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Apron ").unwrap(), "Apron");
        assert_eq!(required("name", "   "), Err(ValidationError::Required("name")));
    }

    #[test]
    fn test_variant_error_message_is_one_based() {
        let err = ValidationError::Variant {
            index: 0,
            source: Box::new(ValidationError::Required("color")),
        };
        assert_eq!(err.to_string(), "variant 1: color is required");
    }

    #[test]
    fn test_parse_required() {
        let n: u32 = parse_required("quantity", "12", "a whole number").unwrap();
        assert_eq!(n, 12);
        assert_eq!(
            parse_required::<u32>("quantity", "-1", "a whole number"),
            Err(ValidationError::Invalid {
                field: "quantity",
                expected: "a whole number"
            })
        );
    }
}
