use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use actix_web::{HttpResponse, Responder, get, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
};
use ecpay::form;
use sqlx::PgPool;

use crate::{
    dtos::pay::{CheckoutCreateRequest, PaymentsResponse},
    services,
};

/// Creates a payment order and the signed gateway checkout form.
///
/// # Input
/// - `claims`: JWT claims identifying the member
/// - `req`: JSON payload:
///   - `plan_type`: "vip_monthly"
///   - `payment_method`: "atm", "barcode" or "cvs"
///
/// # Output
/// - Success: `{ payment_id, merchant_trade_no, amount, form_data,
///   action_url }`. The frontend renders `form_data` as hidden fields and
///   posts them to `action_url`.
/// - Error: 400 for an unknown plan or payment method
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/member/pay/create', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${token}`
///   },
///   body: JSON.stringify({ plan_type: 'vip_monthly', payment_method: 'atm' })
/// });
/// const { form_data, action_url } = (await response.json());
/// // build and submit a <form method="POST" action={action_url}> with
/// // one hidden input per form_data entry
/// ```
#[post("/create")]
pub async fn post_create(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<CheckoutCreateRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let checkout =
        services::pay::create_checkout(&pool, &config, claims.user_id, &req).await?;
    Success::created(checkout)
}

/// Lists the member's payment records, newest first.
#[get("")]
pub async fn get_payments(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let payments = services::pay::list_payments(&pool, claims.user_id).await?;
    Success::ok(PaymentsResponse { payments })
}

/// Receives the gateway's payment-result notification.
///
/// # Note
/// This endpoint is not called by the frontend. The gateway's servers
/// post a form-encoded parameter set here after each payment event; the
/// body must answer `1|OK` (handled) or `0|Error` in plain text, which is
/// why this handler does not use the JSON error responder.
///
/// A payload whose CheckMacValue does not verify is rejected outright
/// and nothing in it is processed.
#[post("/callback")]
pub async fn post_callback(
    params: web::Form<HashMap<String, String>>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> impl Responder {
    let params: BTreeMap<String, String> = params.into_inner().into_iter().collect();

    match services::pay::handle_callback(&pool, &params, &config).await {
        Ok(()) => HttpResponse::Ok()
            .content_type("text/plain")
            .body(form::ack(true)),
        Err(e) => {
            log::error!("Gateway callback rejected: {}", e);
            let mut response = match &e {
                AppError::BadRequest(_) => HttpResponse::BadRequest(),
                AppError::NotFound(_) => HttpResponse::NotFound(),
                _ => HttpResponse::InternalServerError(),
            };
            response.content_type("text/plain").body(form::ack(false))
        }
    }
}
