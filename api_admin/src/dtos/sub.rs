use chrono::{DateTime, Utc};
use db::{dtos::sub::SubscriptionSearchRow, models::payment::Payment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ExtendRequest {
    pub subscription_id: Uuid,
    pub extend_days: i64,
    pub admin_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtendResponse {
    pub subscription_id: Uuid,
    pub old_end_date: DateTime<Utc>,
    pub new_end_date: DateTime<Utc>,
    pub extended_days: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AdjustDaysRequest {
    pub subscription_id: Uuid,
    pub days_to_adjust: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdjustDaysResponse {
    pub subscription_id: Uuid,
    pub old_end_date: DateTime<Utc>,
    pub new_end_date: DateTime<Utc>,
    pub days_adjusted: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub subscription_id: Uuid,
    pub new_status: String,
    pub admin_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetStatusResponse {
    pub subscription_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub subscriptions: Vec<SubscriptionSearchRow>,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ExpiringResponse {
    pub count: usize,
    pub subscriptions: Vec<SubscriptionSearchRow>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_subscriptions: i64,
    pub active_subscriptions: i64,
    pub trial_subscriptions: i64,
    pub expired_subscriptions: i64,
    pub vip_members: i64,
    pub total_revenue: i64,
    pub monthly_revenue: i64,
    pub recent_payments: Vec<Payment>,
}
