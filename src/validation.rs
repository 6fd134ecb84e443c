//! Field validation shared by content operations.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{ContentError, ContentResult};

/// Maximum length of a label, in characters.
pub const MAX_LABEL_LENGTH: usize = 8164;

/// Smallest heading size of a text section.
pub const MIN_HEADING_SIZE: u8 = 1;
/// Largest heading size of a text section.
pub const MAX_HEADING_SIZE: u8 = 6;

static ORCID: OnceLock<Regex> = OnceLock::new();
static DOI: OnceLock<Regex> = OnceLock::new();

fn orcid_pattern() -> &'static Regex {
    ORCID.get_or_init(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").expect("static ORCID pattern"))
}

pub(crate) fn doi_pattern() -> &'static Regex {
    DOI.get_or_init(|| Regex::new(r"^10\.\d{4,9}/[-._;()/:A-Za-z0-9]+$").expect("static DOI pattern"))
}

/// Check a single-line label: not blank, no line breaks, bounded length.
pub fn validate_label(field: &str, value: &str) -> ContentResult<()> {
    if value.trim().is_empty() {
        return Err(ContentError::validation(field, "must not be blank"));
    }
    if value.contains(['\n', '\r']) {
        return Err(ContentError::validation(field, "must not contain line breaks"));
    }
    validate_length(field, value)
}

/// Check a free text: not blank, bounded length. Line breaks are allowed.
pub fn validate_text(field: &str, value: &str) -> ContentResult<()> {
    if value.trim().is_empty() {
        return Err(ContentError::validation(field, "must not be blank"));
    }
    validate_length(field, value)
}

fn validate_length(field: &str, value: &str) -> ContentResult<()> {
    if value.chars().count() > MAX_LABEL_LENGTH {
        return Err(ContentError::validation(
            field,
            format!("must be at most {MAX_LABEL_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Check a heading size.
pub fn validate_heading_size(field: &str, size: u8) -> ContentResult<()> {
    if !(MIN_HEADING_SIZE..=MAX_HEADING_SIZE).contains(&size) {
        return Err(ContentError::validation(
            field,
            format!("must be between {MIN_HEADING_SIZE} and {MAX_HEADING_SIZE}"),
        ));
    }
    Ok(())
}

/// Check an ORCID iD (`0000-0002-1825-0097`).
pub fn validate_orcid(field: &str, value: &str) -> ContentResult<()> {
    if !orcid_pattern().is_match(value) {
        return Err(ContentError::validation(field, format!("\"{value}\" is not a valid ORCID")));
    }
    Ok(())
}
