use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use common::{
    env_config::Config,
    error::{AppError, Res},
};
use db::{
    dtos::payment::{GatewayResult, PaymentCreateRequest, PendingPaymentInfo},
    models::payment::Payment,
};
use ecpay::{
    form::{self, Callback, CallbackOutcome, CheckoutSpec, PaymentMethod},
    order,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::pay::{CheckoutCreateRequest, CheckoutCreateResponse};

/// The plan members can purchase.
const PURCHASABLE_PLAN: &str = "vip_monthly";

/// Collisions on the millisecond+random trade number are possible, so the
/// insert is retried under fresh numbers a few times before giving up.
const TRADE_NO_INSERT_ATTEMPTS: u32 = 3;

fn parse_payment_method(value: &str) -> Res<PaymentMethod> {
    let method = PaymentMethod::parse(value).ok_or_else(|| {
        AppError::BadRequest("payment_method must be one of: atm, barcode, cvs".to_string())
    })?;
    // Cards are configured but not offered for sale; offline methods only.
    if !method.needs_extra_paid_info() {
        return Err(AppError::BadRequest(
            "payment_method must be one of: atm, barcode, cvs".to_string(),
        ));
    }
    Ok(method)
}

async fn insert_with_fresh_trade_no(
    pool: &PgPool,
    user_id: Uuid,
    amount: i64,
    payment_method: PaymentMethod,
) -> Res<Payment> {
    for attempt in 1..=TRADE_NO_INSERT_ATTEMPTS {
        let trade_no = order::new_trade_no();
        let inserted = db::payment::insert_payment(
            pool,
            PaymentCreateRequest {
                user_id,
                order_number: trade_no,
                amount,
                currency: "TWD".to_string(),
                payment_method: payment_method.to_string(),
            },
        )
        .await;

        match inserted {
            Ok(payment) => return Ok(payment),
            Err(e) if e.is_unique_violation() => {
                log::warn!(
                    "Trade number collision on attempt {} for member {}",
                    attempt,
                    user_id
                );
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(AppError::Internal(
        "Failed to allocate a unique trade number".to_string(),
    ))
}

/// Creates a pending payment and the signed gateway checkout form.
pub async fn create_checkout(
    pool: &PgPool,
    config: &Config,
    user_id: Uuid,
    req: &CheckoutCreateRequest,
) -> Res<CheckoutCreateResponse> {
    if req.plan_type != PURCHASABLE_PLAN {
        return Err(AppError::BadRequest(
            "plan_type must be 'vip_monthly'".to_string(),
        ));
    }
    let payment_method = parse_payment_method(&req.payment_method)?;

    let plan = db::plan::get_active_plan_by_name(pool, PURCHASABLE_PLAN)
        .await?
        .ok_or_else(|| {
            AppError::Internal("The vip_monthly plan is not configured".to_string())
        })?;

    let payment = insert_with_fresh_trade_no(pool, user_id, plan.price, payment_method).await?;

    let base = &config.app_base_url;
    let spec = CheckoutSpec {
        amount: plan.price,
        item_name: plan.display_name.clone(),
        trade_desc: format!("ZhenHaoXun - {}", plan.display_name),
        return_url: format!("{}/api/pay/callback", base),
        payment_method,
        client_back_url: Some(format!("{}/subscription", base)),
        order_result_url: Some(format!("{}/subscription/payment/result", base)),
    };

    let form_data = form::build_checkout_form(
        &config.ecpay,
        &payment.order_number,
        &order::format_trade_date(Utc::now()),
        &spec,
    );

    log::info!(
        "Checkout created: member={} order={} amount={}",
        user_id,
        payment.order_number,
        plan.price
    );

    Ok(CheckoutCreateResponse {
        payment_id: payment.id,
        merchant_trade_no: payment.order_number.clone(),
        amount: plan.price,
        form_data,
        action_url: form::checkout_action_url(&config.ecpay).to_string(),
    })
}

fn gateway_result(callback: &Callback) -> GatewayResult {
    GatewayResult {
        gateway_trade_no: callback.gateway_trade_no.clone(),
        gateway_payment_date: callback.payment_date.clone(),
        gateway_rtn_code: callback.rtn_code,
        gateway_rtn_msg: callback.rtn_msg.clone(),
        simulate_paid: callback.simulate_paid,
    }
}

/// Handles a gateway callback that already passed MAC verification.
///
/// Terminal payment rows are never touched again; the gateway retries
/// delivery, so a duplicate is acknowledged and dropped.
pub async fn handle_callback(
    pool: &PgPool,
    params: &BTreeMap<String, String>,
    config: &Config,
) -> Res<()> {
    let callback = form::parse_callback(params, &config.ecpay.hash_key, &config.ecpay.hash_iv)?;

    let payment = db::payment::get_payment_by_order_number(pool, &callback.merchant_trade_no)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No payment for trade number {}",
                callback.merchant_trade_no
            ))
        })?;

    if payment.is_terminal() {
        log::warn!(
            "Duplicate callback for settled order {} ignored",
            payment.order_number
        );
        return Ok(());
    }

    if callback.trade_amt != payment.amount {
        log::warn!(
            "Callback amount {} differs from order amount {} for {}",
            callback.trade_amt,
            payment.amount,
            payment.order_number
        );
    }

    let result = gateway_result(&callback);
    match callback.outcome {
        CallbackOutcome::Paid => {
            db::payment::mark_paid(pool, payment.id, &result).await?;
            activate_subscription(pool, payment.user_id).await?;
            log::info!(
                "Payment settled: order={} member={}",
                payment.order_number,
                payment.user_id
            );
        }
        CallbackOutcome::Pending => {
            let info = PendingPaymentInfo {
                bank_code: callback.bank_code.clone(),
                virtual_account: callback.virtual_account.clone(),
                payment_no: callback.payment_no.clone(),
                barcode_1: callback.barcode_1.clone(),
                barcode_2: callback.barcode_2.clone(),
                barcode_3: callback.barcode_3.clone(),
                payment_deadline: callback.expire_date.clone(),
            };
            db::payment::store_pending_info(pool, payment.id, &result, &info).await?;
            log::info!(
                "Take-number recorded for order {} ({})",
                payment.order_number,
                callback.rtn_msg
            );
        }
        CallbackOutcome::Failed => {
            db::payment::mark_failed(pool, payment.id, &result).await?;
            log::info!(
                "Payment failed: order={} reason={}",
                payment.order_number,
                callback.rtn_msg
            );
        }
    }

    Ok(())
}

/// Puts the paying member on the VIP plan starting now.
async fn activate_subscription(pool: &PgPool, user_id: Uuid) -> Res<()> {
    let plan = db::plan::get_active_plan_by_name(pool, PURCHASABLE_PLAN)
        .await?
        .ok_or_else(|| {
            AppError::Internal("The vip_monthly plan is not configured".to_string())
        })?;

    let now = Utc::now();
    let end = now + Duration::days(plan.duration_days as i64);
    db::sub::activate_for_user(pool, user_id, &plan, "active", now, end).await?;
    Ok(())
}

pub async fn list_payments(pool: &PgPool, user_id: Uuid) -> Res<Vec<Payment>> {
    db::payment::list_payments_by_user(pool, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_offline_methods_are_accepted() {
        assert!(parse_payment_method("atm").is_ok());
        assert!(parse_payment_method("barcode").is_ok());
        assert!(parse_payment_method("cvs").is_ok());
        assert!(parse_payment_method("credit").is_err());
        assert!(parse_payment_method("webatm").is_err());
        assert!(parse_payment_method("paypal").is_err());
    }
}
