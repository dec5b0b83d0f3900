use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
};
use sqlx::PgPool;

use crate::services;

/// Reconciles a payment against the gateway.
///
/// Asks the gateway's QueryTradeInfo endpoint for the trade's current
/// state. Useful for rows the result callback never reached (merchant
/// server down, deadline passed without payment).
#[get("/{order_number}/gateway-status")]
pub async fn get_gateway_status(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<String>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    services::guard::require_admin(&pool, claims.user_id).await?;

    let order_number = path.into_inner();
    let payment = db::payment::get_payment_by_order_number(&***pool, &order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No payment {}", order_number)))?;

    let http = reqwest::Client::new();
    let gateway = ecpay::client::query_trade_info(&http, &config.ecpay, &order_number).await?;

    Success::ok(serde_json::json!({
        "order_number": payment.order_number,
        "status": payment.status,
        "gateway": gateway,
    }))
}
