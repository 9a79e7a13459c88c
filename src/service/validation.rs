//! Field rules shared by create validation and the partial-update merger.

use crate::error::AppError;

/// Trim `value`. A blank result is rejected as `InvalidParameter(label)`.
pub fn required_text(label: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_parameter(label));
    }
    Ok(trimmed.to_string())
}

/// Apply an optional text field. Absent fields are neither validated nor touched.
pub fn patch_text(label: &str, value: Option<&String>, target: &mut String) -> Result<(), AppError> {
    if let Some(v) = value {
        *target = required_text(label, v)?;
    }
    Ok(())
}
