use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::{dtos::quota::QuotaRequest, services};

/// Answers whether the member may perform the given action right now.
///
/// # Input
/// - `claims`: JWT claims identifying the member
/// - `req`: JSON payload with `action_type`: "upload" or "query"
///
/// # Output
/// - Success: `{ allowed, used, limit, remaining }`. A member without a
///   live subscription gets `allowed: false` with zero limits.
/// - Error: 400 for an unknown action type
#[post("/check")]
pub async fn post_check(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<QuotaRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let action = services::quota::parse_action(&req.action_type)?;
    let result = services::quota::check(&pool, claims.user_id, action).await?;
    Success::ok(result)
}

/// Consumes one unit of the member's quota for the given action.
///
/// Callers perform the action only after this endpoint confirms the
/// deduction. Exhausted quota answers 403 with a message suitable for an
/// upgrade/renewal prompt; it is not a server error.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/member/quota/deduct', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${token}`
///   },
///   body: JSON.stringify({ action_type: 'upload' })
/// });
/// if (response.status === 403) {
///   // show the renewal prompt
/// }
/// ```
#[post("/deduct")]
pub async fn post_deduct(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<QuotaRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let action = services::quota::parse_action(&req.action_type)?;
    let result = services::quota::deduct(&pool, claims.user_id, action).await?;
    Success::ok(result)
}
