use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: String,   // Stable platform identity, never changes
    pub name: String, // Display name, mutable via re-registration
}

impl UserModel {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name }
    }
}
