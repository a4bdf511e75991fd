// src/utils/id.rs

use uuid::Uuid;

/// Opaque, URL-safe document id.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
