use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row per admin override; `old_value`/`new_value` hold JSON
/// snapshots of the touched fields.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AdminAuditLog {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Uuid,
    pub old_value: String,
    pub new_value: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
