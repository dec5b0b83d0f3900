use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::sub::SubscriptionSearchRow,
    models::{plan::SubscriptionPlan, sub::MemberSubscription},
};

pub async fn get_subscription_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<MemberSubscription>> {
    sqlx::query_as::<_, MemberSubscription>(
        "SELECT * FROM member_subscriptions WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_subscription_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
) -> Res<Option<MemberSubscription>> {
    sqlx::query_as::<_, MemberSubscription>("SELECT * FROM member_subscriptions WHERE id = $1")
        .bind(subscription_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Puts the member on the given plan, replacing any previous subscription
/// row. Total-kind counters restart from the plan; daily-kind plans carry
/// no counters on the subscription row.
pub async fn activate_for_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    plan: &SubscriptionPlan,
    status: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Res<MemberSubscription> {
    sqlx::query_as::<_, MemberSubscription>(
        r#"
        INSERT INTO member_subscriptions
            (user_id, plan_id, status, subscription_type, start_date, end_date,
             remaining_upload_quota, remaining_query_quota)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE SET
            plan_id = EXCLUDED.plan_id,
            status = EXCLUDED.status,
            subscription_type = EXCLUDED.subscription_type,
            start_date = EXCLUDED.start_date,
            end_date = EXCLUDED.end_date,
            remaining_upload_quota = EXCLUDED.remaining_upload_quota,
            remaining_query_quota = EXCLUDED.remaining_query_quota,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(plan.id)
    .bind(status)
    .bind(&plan.plan_name)
    .bind(start_date)
    .bind(end_date)
    .bind(plan.upload_quota_total)
    .bind(plan.query_quota_total)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_end_date<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
    end_date: DateTime<Utc>,
) -> Res<MemberSubscription> {
    sqlx::query_as::<_, MemberSubscription>(
        "UPDATE member_subscriptions SET end_date = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(end_date)
    .bind(subscription_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: Uuid,
    status: &str,
) -> Res<MemberSubscription> {
    sqlx::query_as::<_, MemberSubscription>(
        "UPDATE member_subscriptions SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(subscription_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Admin search: subscriptions whose owning account matches the query.
pub async fn search_by_account<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    query: &str,
    limit: i64,
    offset: i64,
) -> Res<Vec<SubscriptionSearchRow>> {
    sqlx::query_as::<_, SubscriptionSearchRow>(
        r#"
        SELECT s.id, s.user_id, u.account, u.email, p.plan_name,
               s.status, s.subscription_type, s.start_date, s.end_date
        FROM member_subscriptions s
        JOIN users u ON u.id = s.user_id
        JOIN subscription_plans p ON p.id = s.plan_id
        WHERE u.account ILIKE $1
        ORDER BY s.end_date DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(format!("%{}%", query))
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

/// Live subscriptions ending within the next `days` days.
pub async fn expiring_within<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    days: i32,
) -> Res<Vec<SubscriptionSearchRow>> {
    sqlx::query_as::<_, SubscriptionSearchRow>(
        r#"
        SELECT s.id, s.user_id, u.account, u.email, p.plan_name,
               s.status, s.subscription_type, s.start_date, s.end_date
        FROM member_subscriptions s
        JOIN users u ON u.id = s.user_id
        JOIN subscription_plans p ON p.id = s.plan_id
        WHERE s.status IN ('trial', 'active')
          AND s.end_date > now()
          AND s.end_date <= now() + make_interval(days => $1)
        ORDER BY s.end_date
        "#,
    )
    .bind(days)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn count_by_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    status: &str,
) -> Res<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM member_subscriptions WHERE status = $1")
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn count_all<'e, E: Executor<'e, Database = Postgres>>(executor: E) -> Res<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM member_subscriptions")
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

/// Members currently on a VIP plan that has not lapsed.
pub async fn count_live_vip<'e, E: Executor<'e, Database = Postgres>>(executor: E) -> Res<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM member_subscriptions
        WHERE subscription_type = 'vip_monthly'
          AND status IN ('trial', 'active')
          AND end_date > now()
        "#,
    )
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
