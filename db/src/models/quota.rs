use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row per member per service-calendar day. Never deleted; the table
/// doubles as the historical usage record.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct DailyUsageQuota {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub uploads_used: i32,
    pub queries_used: i32,
    pub uploads_limit: i32,
    pub queries_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
