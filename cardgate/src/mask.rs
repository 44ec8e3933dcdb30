//! Redaction of sensitive cardholder data.
//!
//! Every value that may reach a log line, an error message or a response body
//! goes through one of these functions first. They are pure and never fail.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Character substituted for hidden card-number digits.
pub const MASK_CHAR: char = 'X';

/// Returned by [`mask_card`] when there is nothing safe to show.
pub const CARD_PLACEHOLDER: &str = "****";

/// Returned by [`mask_expiration`] when the input has no `/` separator.
pub const EXPIRATION_PLACEHOLDER: &str = "**/****";

/// Replaces the year portion of an expiration.
pub const YEAR_PLACEHOLDER: &str = "****";

/// The only thing ever shown in place of a security code.
pub const SECURITY_CODE_PLACEHOLDER: &str = "***";

static CARD_NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{13,19}").expect("static regex"));

/// Masks all but the last four characters of a card number.
///
/// Returns [`CARD_PLACEHOLDER`] when the input is absent, blank, or shorter
/// than four characters.
#[must_use]
pub fn mask_card(card_number: Option<&str>) -> String {
    let Some(number) = card_number.filter(|n| !n.trim().is_empty()) else {
        return CARD_PLACEHOLDER.to_owned();
    };
    let len = number.chars().count();
    if len < 4 {
        return CARD_PLACEHOLDER.to_owned();
    }
    let mut masked: String = std::iter::repeat_n(MASK_CHAR, len - 4).collect();
    masked.extend(number.chars().skip(len - 4));
    masked
}

/// Keeps the month and separator of an `MM/YYYY` expiration and hides the year.
///
/// Returns [`EXPIRATION_PLACEHOLDER`] when the input is absent, blank, or
/// lacks a `/`.
#[must_use]
pub fn mask_expiration(expiration: Option<&str>) -> String {
    expiration
        .filter(|e| !e.trim().is_empty())
        .and_then(|e| e.split_once('/'))
        .map_or_else(
            || EXPIRATION_PLACEHOLDER.to_owned(),
            |(month, _)| format!("{month}/{YEAR_PLACEHOLDER}"),
        )
}

/// Masks a security code. The input is ignored.
#[must_use]
pub const fn mask_security_code<T: ?Sized>(_code: &T) -> &'static str {
    SECURITY_CODE_PLACEHOLDER
}

/// Masks every run of 13 to 19 digits inside free text.
///
/// Used on processor messages and transport error details before they are
/// logged or echoed, since neither is under our control.
#[must_use]
pub fn redact_card_numbers(text: &str) -> Cow<'_, str> {
    CARD_NUMBER_RUN.replace_all(text, |caps: &regex::Captures<'_>| {
        mask_card(Some(&caps[0]))
    })
}
