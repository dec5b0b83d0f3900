use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::payment::{GatewayResult, PaymentCreateRequest, PendingPaymentInfo},
    models::payment::Payment,
};

/// Inserts a pending payment row. Fails with a unique violation when the
/// generated order number collides; the caller retries with a fresh one.
pub async fn insert_payment<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: PaymentCreateRequest,
) -> Res<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (user_id, order_number, amount, currency, status, payment_method)
        VALUES ($1, $2, $3, $4, 'pending', $5)
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(&data.order_number)
    .bind(data.amount)
    .bind(&data.currency)
    .bind(&data.payment_method)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_payment_by_order_number<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    order_number: &str,
) -> Res<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_number = $1")
        .bind(order_number)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn mark_paid<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    payment_id: Uuid,
    result: &GatewayResult,
) -> Res<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = 'paid', paid_at = now(),
            gateway_trade_no = $1, gateway_payment_date = $2,
            gateway_rtn_code = $3, gateway_rtn_msg = $4, simulate_paid = $5,
            updated_at = now()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(&result.gateway_trade_no)
    .bind(&result.gateway_payment_date)
    .bind(result.gateway_rtn_code)
    .bind(&result.gateway_rtn_msg)
    .bind(result.simulate_paid)
    .bind(payment_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn mark_failed<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    payment_id: Uuid,
    result: &GatewayResult,
) -> Res<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = 'failed',
            gateway_trade_no = $1, gateway_payment_date = $2,
            gateway_rtn_code = $3, gateway_rtn_msg = $4, simulate_paid = $5,
            updated_at = now()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(&result.gateway_trade_no)
    .bind(&result.gateway_payment_date)
    .bind(result.gateway_rtn_code)
    .bind(&result.gateway_rtn_msg)
    .bind(result.simulate_paid)
    .bind(payment_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Records take-number details after an ATM/CVS/barcode callback; the row
/// stays pending until the member actually pays.
pub async fn store_pending_info<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    payment_id: Uuid,
    result: &GatewayResult,
    info: &PendingPaymentInfo,
) -> Res<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET gateway_trade_no = $1, gateway_payment_date = $2,
            gateway_rtn_code = $3, gateway_rtn_msg = $4, simulate_paid = $5,
            bank_code = $6, virtual_account = $7, payment_no = $8,
            barcode_1 = $9, barcode_2 = $10, barcode_3 = $11,
            payment_deadline = $12, updated_at = now()
        WHERE id = $13
        RETURNING *
        "#,
    )
    .bind(&result.gateway_trade_no)
    .bind(&result.gateway_payment_date)
    .bind(result.gateway_rtn_code)
    .bind(&result.gateway_rtn_msg)
    .bind(result.simulate_paid)
    .bind(&info.bank_code)
    .bind(&info.virtual_account)
    .bind(&info.payment_no)
    .bind(&info.barcode_1)
    .bind(&info.barcode_2)
    .bind(&info.barcode_3)
    .bind(&info.payment_deadline)
    .bind(payment_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn list_payments_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Vec<Payment>> {
    sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn recent_payments<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    limit: i64,
) -> Res<Vec<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY created_at DESC LIMIT $1")
        .bind(limit)
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn total_revenue<'e, E: Executor<'e, Database = Postgres>>(executor: E) -> Res<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments WHERE status = 'paid'",
    )
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn revenue_since<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    since: chrono::DateTime<chrono::Utc>,
) -> Res<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments WHERE status = 'paid' AND paid_at >= $1",
    )
    .bind(since)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
