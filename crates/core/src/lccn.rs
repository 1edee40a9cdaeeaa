//! Library of Congress Control Numbers for NDNP transfers.
//!
//! Normalization follows the LCCN namespace rules: blanks are removed,
//! anything after a `/` is dropped, and a hyphenated serial is zero-padded
//! to six digits with the hyphen removed.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Normalized form: up to three prefix letters with a two-digit year, or up
/// to two prefix letters with a four-digit year, followed by a six-digit
/// serial.
const NORMALIZED_PATTERN: &str = r"^(?:[a-z]{0,3}[0-9]{8}|[a-z]{0,2}[0-9]{10})$";

static NORMALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NORMALIZED_PATTERN).expect("valid regex"));

/// Width of the serial portion after normalization.
pub const SERIAL_WIDTH: usize = 6;

/// Maximum length of the stored, joined LCCN list.
pub const MAX_LCCNS_LEN: usize = 255;

/// Normalize a raw LCCN. Does not validate the result.
pub fn normalize_lccn(raw: &str) -> String {
    let mut lccn: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(slash) = lccn.find('/') {
        lccn.truncate(slash);
    }

    if let Some((head, serial)) = lccn.split_once('-') {
        let numeric = !serial.is_empty() && serial.chars().all(|c| c.is_ascii_digit());
        if numeric && serial.len() <= SERIAL_WIDTH {
            return format!("{head}{serial:0>width$}", width = SERIAL_WIDTH);
        }
        return format!("{head}{serial}");
    }

    lccn
}

/// Validate that an already-normalized LCCN has a legal shape.
pub fn validate_lccn(lccn: &str) -> Result<(), CoreError> {
    if NORMALIZED_RE.is_match(lccn) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid LCCN '{lccn}'")))
    }
}

/// Split an LCCN list on commas, semicolons and newlines, normalizing and
/// validating every entry.
///
/// Blanks are not separators: `sn 83030214` is one LCCN in its display form
/// and normalizes to `sn83030214`. An NDNP transfer must name at least one
/// title, so an empty list is an error.
pub fn parse_lccns(text: &str) -> Result<Vec<String>, CoreError> {
    let lccns = text
        .split(|c: char| c == ',' || c == ';' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| {
            let lccn = normalize_lccn(raw);
            validate_lccn(&lccn)?;
            Ok(lccn)
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    if lccns.is_empty() {
        return Err(CoreError::Validation(
            "At least one LCCN is required".to_string(),
        ));
    }
    Ok(lccns)
}

/// Join normalized LCCNs into their stored text form.
pub fn join_lccns(lccns: &[String]) -> String {
    lccns.join(", ")
}

/// Parse a raw LCCN list into its stored text form, enforcing
/// [`MAX_LCCNS_LEN`] on the normalized result.
pub fn format_lccns(text: &str) -> Result<String, CoreError> {
    let stored = join_lccns(&parse_lccns(text)?);
    if stored.len() > MAX_LCCNS_LEN {
        return Err(CoreError::Validation(format!(
            "LCCN list is {} characters once normalized, limit is {MAX_LCCNS_LEN}",
            stored.len()
        )));
    }
    Ok(stored)
}
