//! Partial updates: apply only the fields a patch carries, then check
//! cross-field invariants on the merged value.

use crate::error::AppError;

pub trait Patch<E> {
    /// Validate and write each present field into `target`.
    fn apply(&self, target: &mut E) -> Result<(), AppError>;

    /// Invariants that need the fully merged value.
    fn check(&self, _merged: &E) -> Result<(), AppError> {
        Ok(())
    }
}

/// Merge `patch` into a copy of `existing`. Nothing is persisted here.
pub fn merge<E, P>(existing: &E, patch: P) -> Result<E, AppError>
where
    E: Clone,
    P: Patch<E>,
{
    let mut merged = existing.clone();
    patch.apply(&mut merged)?;
    patch.check(&merged)?;
    Ok(merged)
}
