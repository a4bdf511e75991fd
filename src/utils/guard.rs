// src/utils/guard.rs

use crate::error::AppError;

/// Owner check. Plain equality, no administrative override.
pub fn check(entity_owner_id: &str, requester_id: &str) -> bool {
    entity_owner_id == requester_id
}

/// [`check`] as a terminal error for owner-scoped operations.
pub fn require_owner(entity_owner_id: &str, requester_id: &str) -> Result<(), AppError> {
    if check(entity_owner_id, requester_id) {
        Ok(())
    } else {
        Err(AppError::Auth("Owner mismatch".to_string()))
    }
}
