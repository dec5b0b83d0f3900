use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::sub::{NotificationsResponse, PlansResponse},
    services,
};

/// Retrieves the sellable subscription plans.
#[get("/plans")]
pub async fn get_plans(pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let plans = db::plan::list_active_plans(&***pool).await?;
    Success::ok(PlansResponse { plans })
}

/// Retrieves the calling member's subscription status.
///
/// # Input
/// - `claims`: JWT claims identifying the member
///
/// # Output
/// - Success: the full status projection: plan, lifecycle status, dates,
///   days remaining, computed expiry flag and per-action quota counters
/// - Error: 404 if the member has no subscription row
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/member/sub/status', {
///   headers: { 'Authorization': `Bearer ${token}` }
/// });
/// if (response.ok) {
///   const status = await response.json();
///   // { plan_name: "vip_monthly", status: "active", is_expired: false,
///   //   days_remaining: 12, upload_remaining: 6, ... }
/// }
/// ```
#[get("/status")]
pub async fn get_status(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let status = services::sub::get_status(&pool, claims.user_id).await?;
    Success::ok(status)
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// Lists the member's system notifications, newest first.
#[get("/notifications")]
pub async fn get_notifications(
    claims: web::ReqData<JwtClaims>,
    query: web::Query<NotificationsQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let notifications =
        services::sub::list_notifications(&pool, claims.user_id, query.unread_only).await?;
    Success::ok(NotificationsResponse { notifications })
}

/// Marks one of the member's notifications as read.
#[post("/notifications/{id}/read")]
pub async fn post_notification_read(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::sub::mark_notification_read(&pool, claims.user_id, path.into_inner()).await?;
    Success::ok(serde_json::json!({ "read": true }))
}
