//! User profile model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `profiles` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Role check is case-insensitive ("Admin", "ADMIN" and "admin" all qualify)
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .map(|role| role.eq_ignore_ascii_case("admin"))
            .unwrap_or(false)
    }

    pub fn display_name(&self) -> &str {
        self.fullname.as_deref().unwrap_or("Unknown")
    }
}
