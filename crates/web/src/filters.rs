//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::borrow::Borrow;
use std::fmt::Display;

use bazaar_core::Price;

/// Formats a price held in minor units as dollars.
///
/// Usage in templates: `{{ product.price|price }}`
///
/// Takes `Borrow<Price>` so it works on fields (passed by reference) and
/// method-call results (passed by value) alike.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn price(value: impl Borrow<Price>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.borrow().display())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
