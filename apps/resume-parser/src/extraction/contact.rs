//! Phone and email detection.
//!
//! Both rules are deliberately loose: any standalone run of ten digits is
//! reported as a phone number, ID numbers included.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ContactInfo;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{10}\b").expect("phone pattern is valid"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").expect("email pattern is valid")
});

/// Returns the leftmost phone-like and email-like substrings of `text`.
pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        phone: PHONE_PATTERN.find(text).map(|m| m.as_str().to_string()),
        email: EMAIL_PATTERN.find(text).map(|m| m.as_str().to_string()),
    }
}
