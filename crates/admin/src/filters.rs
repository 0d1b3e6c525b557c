//! Askama filters for the back-office templates.

use std::fmt::Display;

/// Placeholder for optional fields left blank.
pub const NOT_SET: &str = "Not set";

/// Year shown in the sidebar footer.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// The value itself, or [`NOT_SET`] when it is blank.
///
/// Usage in templates: `{{ record.phone|or_not_set }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn or_not_set(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(display_or_not_set(&value))
}

fn display_or_not_set(value: &impl Display) -> String {
    let text = value.to_string();
    if text.trim().is_empty() {
        NOT_SET.to_owned()
    } else {
        text
    }
}
