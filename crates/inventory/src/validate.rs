//! Field-level checks applied where raw input becomes domain values.

use stocktrack_core::{DomainError, DomainResult};

/// Unwrap a required field, naming it in the error when absent.
pub fn required<T>(value: Option<T>, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("Invalid Inventory: missing {field}")))
}

/// Narrow a wire integer to a non-negative count.
pub fn count(field: &str, value: i64) -> DomainResult<u32> {
    if value < 0 {
        return Err(DomainError::validation(format!(
            "Invalid Inventory: {field} cannot be negative (got {value})"
        )));
    }
    u32::try_from(value).map_err(|_| {
        DomainError::validation(format!(
            "Invalid Inventory: {field} must not exceed {}",
            u32::MAX
        ))
    })
}

pub fn product_id(value: i64) -> DomainResult<i64> {
    if value < 0 {
        return Err(DomainError::validation(format!(
            "Invalid Inventory: product_id cannot be negative (got {value})"
        )));
    }
    Ok(value)
}
