//! Quota counters.
//!
//! The floor invariant lives here: every deduction is a single
//! conditional UPDATE whose WHERE clause re-checks the remaining budget,
//! so two racing requests can never both win the last unit and no counter
//! ever goes below zero. Callers must not split the check and the
//! decrement into separate statements.

use chrono::NaiveDate;
use common::{
    error::{AppError, Res},
    misc::ActionType,
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::quota::DailyUsageQuota;

/// Creates today's usage row if the member does not have one yet.
/// Limits are frozen from the plan at creation time.
pub async fn ensure_daily_row<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    date: NaiveDate,
    uploads_limit: i32,
    queries_limit: i32,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_usage_quotas (user_id, date, uploads_limit, queries_limit)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(uploads_limit)
    .bind(queries_limit)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_daily_row<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    date: NaiveDate,
) -> Res<Option<DailyUsageQuota>> {
    sqlx::query_as::<_, DailyUsageQuota>(
        "SELECT * FROM daily_usage_quotas WHERE user_id = $1 AND date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Consumes one unit from today's allowance. Returns the new remaining
/// count, or `None` when the allowance was already exhausted (the row is
/// left untouched).
pub async fn deduct_daily<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    date: NaiveDate,
    action: ActionType,
) -> Res<Option<i32>> {
    let sql = match action {
        ActionType::Upload => {
            r#"
            UPDATE daily_usage_quotas
            SET uploads_used = uploads_used + 1, updated_at = now()
            WHERE user_id = $1 AND date = $2 AND uploads_used < uploads_limit
            RETURNING uploads_limit - uploads_used
            "#
        }
        ActionType::Query => {
            r#"
            UPDATE daily_usage_quotas
            SET queries_used = queries_used + 1, updated_at = now()
            WHERE user_id = $1 AND date = $2 AND queries_used < queries_limit
            RETURNING queries_limit - queries_used
            "#
        }
    };

    sqlx::query_scalar::<_, i32>(sql)
        .bind(user_id)
        .bind(date)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Consumes one unit from a lifetime budget. The predicate also re-checks
/// the subscription is still consumable, so a lapsed row that nobody has
/// marked expired yet cannot spend.
pub async fn deduct_total<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
    action: ActionType,
) -> Res<Option<i32>> {
    let sql = match action {
        ActionType::Upload => {
            r#"
            UPDATE member_subscriptions
            SET remaining_upload_quota = remaining_upload_quota - 1, updated_at = now()
            WHERE id = $1
              AND status IN ('trial', 'active')
              AND end_date > now()
              AND remaining_upload_quota > 0
            RETURNING remaining_upload_quota
            "#
        }
        ActionType::Query => {
            r#"
            UPDATE member_subscriptions
            SET remaining_query_quota = remaining_query_quota - 1, updated_at = now()
            WHERE id = $1
              AND status IN ('trial', 'active')
              AND end_date > now()
              AND remaining_query_quota > 0
            RETURNING remaining_query_quota
            "#
        }
    };

    sqlx::query_scalar::<_, i32>(sql)
        .bind(subscription_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}
