//! Package id hints supplied with a transfer.
//!
//! The depositor's list of packages is only a hint. What actually arrives
//! may differ once the delivered packages are examined.

use crate::error::CoreError;

/// Split a package id list on commas and whitespace, dropping empties.
pub fn parse_package_ids(text: &str) -> Vec<&str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Validate that a package id list names at least one package.
pub fn validate_package_ids(text: &str) -> Result<(), CoreError> {
    if parse_package_ids(text).is_empty() {
        return Err(CoreError::Validation(
            "package_ids must name at least one package".to_string(),
        ));
    }
    Ok(())
}
