//! University model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct University {
    pub id: i64,
    pub name: String,
    pub domain: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUniversityRequest {
    pub name: String,
    pub domain: Option<String>,
    pub location: Option<String>,
}
