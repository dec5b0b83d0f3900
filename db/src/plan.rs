use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::plan::SubscriptionPlan;

pub async fn get_active_plan_by_name<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_name: &str,
) -> Res<Option<SubscriptionPlan>> {
    sqlx::query_as::<_, SubscriptionPlan>(
        "SELECT * FROM subscription_plans WHERE plan_name = $1 AND is_active = TRUE",
    )
    .bind(plan_name)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_plan_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_id: Uuid,
) -> Res<SubscriptionPlan> {
    sqlx::query_as::<_, SubscriptionPlan>("SELECT * FROM subscription_plans WHERE id = $1")
        .bind(plan_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_active_plans<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<SubscriptionPlan>> {
    sqlx::query_as::<_, SubscriptionPlan>(
        "SELECT * FROM subscription_plans WHERE is_active = TRUE ORDER BY price",
    )
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
