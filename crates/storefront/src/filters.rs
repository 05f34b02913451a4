//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Percent-encodes a value for use as a single URL path segment.
///
/// Usage in templates: `<a href="/category/{{ category|path_segment }}">`
#[askama::filter_fn]
pub fn path_segment(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(urlencoding::encode(&value.to_string()).into_owned())
}

/// Title-cases a catalog category name for display.
///
/// Usage in templates: `{{ "men's clothing"|category_label }}` renders
/// `Men's Clothing`.
#[askama::filter_fn]
pub fn category_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(title_case(&value.to_string()))
}

/// Capitalize the first letter of each space-separated word.
#[must_use]
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
