//! Input validation utilities.
//!
//! Names supplied by clients end up as path segments in Graph drive URLs, so they are checked
//! before any remote call is made.

use crate::constants::MAX_ITEM_NAME_LEN;
use crate::{CoreError, CoreResult};
use docbridge_types::NonEmptyText;

/// Characters the document library rejects in file and folder names.
const FORBIDDEN_NAME_CHARS: &[char] = &['"', '*', ':', '<', '>', '?', '/', '\\', '|'];

/// Validates a file or folder name for the document library.
///
/// - Rejects empty or whitespace-only names
/// - Bounds the length
/// - Rejects characters the library forbids and names made only of dots
/// - Rejects names ending with a dot
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` describing the first rule that failed.
pub fn validate_item_name(name: &str) -> CoreResult<NonEmptyText> {
    let name = NonEmptyText::new(name)
        .map_err(|_| CoreError::InvalidInput("name cannot be empty".into()))?;
    let value = name.as_str();

    if value.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(CoreError::InvalidInput(format!(
            "name exceeds maximum length of {} characters",
            MAX_ITEM_NAME_LEN
        )));
    }

    if value.contains(FORBIDDEN_NAME_CHARS) || value.chars().any(char::is_control) {
        return Err(CoreError::InvalidInput(
            "name contains invalid characters (\" * : < > ? / \\ | are not allowed)".into(),
        ));
    }

    if value.ends_with('.') {
        return Err(CoreError::InvalidInput("name cannot end with '.'".into()));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name_accepts_valid_names() {
        assert_eq!(validate_item_name("Invoices 2024").unwrap().as_str(), "Invoices 2024");
        assert_eq!(validate_item_name("  report.pdf ").unwrap().as_str(), "report.pdf");
    }

    #[test]
    fn test_validate_item_name_rejects_empty() {
        let err = validate_item_name("  ").expect_err("should reject blank");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("cannot be empty")));
    }

    #[test]
    fn test_validate_item_name_rejects_forbidden_characters() {
        for bad in ["a/b", "a:b", "what?", "x|y", "quote\"d", "tab\there"] {
            let err = validate_item_name(bad).expect_err("should reject");
            assert!(
                matches!(err, CoreError::InvalidInput(ref msg) if msg.contains("invalid characters")),
                "{bad} was accepted"
            );
        }
    }

    #[test]
    fn test_validate_item_name_rejects_trailing_dot_and_dot_only() {
        assert!(validate_item_name("draft.").is_err());
        assert!(validate_item_name("..").is_err());
    }

    #[test]
    fn test_validate_item_name_rejects_too_long() {
        let long = "a".repeat(MAX_ITEM_NAME_LEN + 1);
        let err = validate_item_name(&long).expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("maximum length")));
    }
}
