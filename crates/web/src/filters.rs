//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Year for the footer copyright line: `{{ ""|current_year }}`.
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns `"s"` unless the count is exactly one.
///
/// Usage in templates: `submission{{ count|plural_suffix }}`
#[askama::filter_fn]
pub fn plural_suffix(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(if value.to_string() == "1" { "" } else { "s" })
}
