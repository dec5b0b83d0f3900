use chrono::{DateTime, Utc};
use db::models::message::Message;
use serde::Serialize;
use uuid::Uuid;

/// Full status projection returned to the member dashboard.
#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub subscription_id: Uuid,
    pub plan_name: String,
    pub display_name: String,
    pub status: String,
    pub subscription_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days_remaining: i64,
    pub is_expired: bool,
    pub is_vip: bool,
    pub quota_type: String,
    pub upload_used: i32,
    pub upload_limit: i32,
    pub upload_remaining: i32,
    pub query_used: i32,
    pub query_limit: i32,
    pub query_remaining: i32,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<db::models::plan::SubscriptionPlan>,
}
