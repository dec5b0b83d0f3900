use chrono::{DateTime, Utc};
use common::misc::ActionType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a plan replenishes its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaKind {
    /// One budget consumed over the whole subscription lifetime.
    Total,
    /// A fresh allowance every calendar day.
    Daily,
}

impl ToString for QuotaKind {
    fn to_string(&self) -> String {
        match self {
            QuotaKind::Total => "total".to_string(),
            QuotaKind::Daily => "daily".to_string(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub plan_name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_days: i32,
    pub upload_quota_total: Option<i32>,
    pub query_quota_total: Option<i32>,
    pub upload_quota_daily: Option<i32>,
    pub query_quota_daily: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPlan {
    /// The schema guarantees exactly one quota kind per plan.
    pub fn quota_kind(&self) -> QuotaKind {
        if self.upload_quota_daily.is_some() {
            QuotaKind::Daily
        } else {
            QuotaKind::Total
        }
    }

    pub fn daily_limit(&self, action: ActionType) -> i32 {
        match action {
            ActionType::Upload => self.upload_quota_daily.unwrap_or(0),
            ActionType::Query => self.query_quota_daily.unwrap_or(0),
        }
    }

    pub fn total_limit(&self, action: ActionType) -> i32 {
        match action {
            ActionType::Upload => self.upload_quota_total.unwrap_or(0),
            ActionType::Query => self.query_quota_total.unwrap_or(0),
        }
    }
}
