use std::sync::Arc;

use actix_web::{Responder, get, patch, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::{
    dtos::sub::{
        AdjustDaysRequest, ExpiringQuery, ExpiringResponse, ExtendRequest, SearchQuery,
        SearchResponse, SetStatusRequest,
    },
    services,
};

/// Extends a subscription by 1 to 100 days.
///
/// # Input
/// - `claims`: JWT claims; the caller's role is re-checked against the
///   database before anything is touched
/// - `req`: `{ subscription_id, extend_days, admin_note? }`
///
/// # Output
/// - Success: old and new end date plus a confirmation message
/// - Error: 400 for out-of-range days, 403 without the admin role,
///   404 for an unknown subscription
#[post("/extend")]
pub async fn post_extend(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<ExtendRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::guard::require_admin(&pool, claims.user_id).await?;
    let result = services::sub::extend(&pool, claims.user_id, &req).await?;
    Success::ok(result)
}

/// Moves a subscription's end date by -365 to 365 days. The resulting end
/// date may not fall before the start of today.
#[post("/adjust-days")]
pub async fn post_adjust_days(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<AdjustDaysRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::guard::require_admin(&pool, claims.user_id).await?;
    let result = services::sub::adjust_days(&pool, claims.user_id, &req).await?;
    Success::ok(result)
}

/// Overrides a subscription's lifecycle status.
#[patch("/status")]
pub async fn patch_status(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<SetStatusRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::guard::require_admin(&pool, claims.user_id).await?;
    let result = services::sub::set_status(&pool, claims.user_id, &req).await?;
    Success::ok(result)
}

/// Searches subscriptions by member account.
#[get("/search")]
pub async fn get_search(
    claims: web::ReqData<JwtClaims>,
    query: web::Query<SearchQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::guard::require_admin(&pool, claims.user_id).await?;
    let subscriptions = db::sub::search_by_account(
        &***pool,
        &query.q,
        query.limit.unwrap_or(20).clamp(1, 100),
        query.offset.unwrap_or(0).max(0),
    )
    .await?;
    Success::ok(SearchResponse { subscriptions })
}

/// Lists live subscriptions ending within the next `days` days
/// (default 7).
#[get("/expiring")]
pub async fn get_expiring(
    claims: web::ReqData<JwtClaims>,
    query: web::Query<ExpiringQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::guard::require_admin(&pool, claims.user_id).await?;
    let subscriptions =
        db::sub::expiring_within(&***pool, query.days.unwrap_or(7).clamp(1, 365)).await?;
    Success::ok(ExpiringResponse {
        count: subscriptions.len(),
        subscriptions,
    })
}

/// Subscription and revenue totals for the admin dashboard.
#[get("/stats")]
pub async fn get_stats(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::guard::require_admin(&pool, claims.user_id).await?;
    let stats = services::sub::stats(&pool).await?;
    Success::ok(stats)
}
