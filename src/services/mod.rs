// Core engine
pub mod dashboard;
pub mod event_sync;
pub mod nutrition;

// Inventory management
pub mod calendar;
pub mod catalog;
pub mod items;

// Household and per-user settings
pub mod household;

use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is trimmed.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
