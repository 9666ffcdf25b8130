//! Typed repositories over the ledger tables.
//!
//! Functions are generic over [`sea_orm::ConnectionTrait`] so the same query runs
//! against a pooled connection or inside a transaction. List operations fix the
//! ordering every caller relies on.

pub mod cars;
pub mod drivers;
pub mod fuel_records;
pub mod service_orders;
pub mod trips;

use crate::error::{AppError, AppResult};

/// Trimmed value of a required text field.
pub(crate) fn required_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn non_negative(value: f64, field: &str) -> AppResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  Corolla ", "Model").unwrap(), "Corolla");
        assert!(matches!(
            required_text("   ", "Model"),
            Err(AppError::Validation(msg)) if msg == "Model is required"
        ));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative(0.0, "Km").is_ok());
        assert!(non_negative(-1.0, "Km").is_err());
        assert!(non_negative(f64::NAN, "Km").is_err());
    }
}
