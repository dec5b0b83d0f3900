use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A subscription row joined with the owning member, as listed by the
/// admin search and expiring views.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubscriptionSearchRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account: String,
    pub email: String,
    pub plan_name: String,
    pub status: String,
    pub subscription_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}
