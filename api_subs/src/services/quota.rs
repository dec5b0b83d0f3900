use chrono::Utc;
use common::{
    error::{AppError, Res},
    misc::{ActionType, service_today},
};
use db::models::{
    plan::{QuotaKind, SubscriptionPlan},
    sub::MemberSubscription,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::quota::{QuotaCheckResponse, QuotaDeductResponse};

/// Builds the check result from a used/limit pair.
fn snapshot(used: i32, limit: i32) -> QuotaCheckResponse {
    let remaining = (limit - used).max(0);
    QuotaCheckResponse {
        allowed: remaining > 0,
        used,
        limit,
        remaining,
    }
}

/// No subscription, or a lapsed one: nothing may be consumed.
fn zero_quota() -> QuotaCheckResponse {
    snapshot(0, 0)
}

fn exhausted_message(action: ActionType, kind: QuotaKind) -> String {
    let action_name = match action {
        ActionType::Upload => "upload",
        ActionType::Query => "query",
    };
    match kind {
        QuotaKind::Total => format!(
            "No {} quota remaining on your current plan. Upgrade to VIP to continue.",
            action_name
        ),
        QuotaKind::Daily => format!(
            "Daily {} quota exhausted. The allowance resets tomorrow.",
            action_name
        ),
    }
}

pub fn parse_action(value: &str) -> Res<ActionType> {
    ActionType::parse(value).ok_or_else(|| {
        AppError::BadRequest("action_type must be either 'upload' or 'query'".to_string())
    })
}

async fn resolve_live_subscription(
    pool: &PgPool,
    user_id: Uuid,
) -> Res<Option<(MemberSubscription, SubscriptionPlan)>> {
    let Some(sub) = db::sub::get_subscription_by_user(pool, user_id).await? else {
        return Ok(None);
    };
    if !sub.is_consumable(Utc::now()) {
        return Ok(None);
    }
    let plan = db::plan::get_plan_by_id(pool, sub.plan_id).await?;
    Ok(Some((sub, plan)))
}

/// Answers "may this member perform the action right now", without
/// consuming anything. Lazily creates today's usage row for daily plans.
pub async fn check(pool: &PgPool, user_id: Uuid, action: ActionType) -> Res<QuotaCheckResponse> {
    let Some((sub, plan)) = resolve_live_subscription(pool, user_id).await? else {
        return Ok(zero_quota());
    };

    match plan.quota_kind() {
        QuotaKind::Daily => {
            let today = service_today();
            db::quota::ensure_daily_row(
                pool,
                user_id,
                today,
                plan.daily_limit(ActionType::Upload),
                plan.daily_limit(ActionType::Query),
            )
            .await?;

            let row = db::quota::get_daily_row(pool, user_id, today)
                .await?
                .ok_or_else(|| AppError::Internal("Daily quota row vanished".to_string()))?;

            let (used, limit) = match action {
                ActionType::Upload => (row.uploads_used, row.uploads_limit),
                ActionType::Query => (row.queries_used, row.queries_limit),
            };
            Ok(snapshot(used, limit))
        }
        QuotaKind::Total => {
            let limit = plan.total_limit(action);
            let remaining = match action {
                ActionType::Upload => sub.remaining_upload_quota.unwrap_or(0),
                ActionType::Query => sub.remaining_query_quota.unwrap_or(0),
            };
            Ok(snapshot(limit - remaining, limit))
        }
    }
}

/// Consumes one unit of quota.
///
/// The decrement and the floor check happen in one conditional UPDATE at
/// the database (`db::quota`), so concurrent calls can never both take
/// the last unit. Exhaustion surfaces as `Forbidden` so callers can show
/// an upgrade prompt instead of an error page.
pub async fn deduct(pool: &PgPool, user_id: Uuid, action: ActionType) -> Res<QuotaDeductResponse> {
    let Some((sub, plan)) = resolve_live_subscription(pool, user_id).await? else {
        return Err(AppError::Forbidden(
            "No active subscription. Subscribe to continue.".to_string(),
        ));
    };

    let kind = plan.quota_kind();
    let deducted = match kind {
        QuotaKind::Daily => {
            let today = service_today();
            db::quota::ensure_daily_row(
                pool,
                user_id,
                today,
                plan.daily_limit(ActionType::Upload),
                plan.daily_limit(ActionType::Query),
            )
            .await?;
            db::quota::deduct_daily(pool, user_id, today, action).await?
        }
        QuotaKind::Total => db::quota::deduct_total(pool, sub.id, action).await?,
    };

    match deducted {
        Some(remaining) => Ok(QuotaDeductResponse {
            success: true,
            remaining,
            message: "Quota deducted".to_string(),
        }),
        None => Err(AppError::Forbidden(exhausted_message(action, kind))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_allows_while_remaining() {
        let result = snapshot(3, 10);
        assert!(result.allowed);
        assert_eq!(result.remaining, 7);
        assert_eq!(result.used, 3);
        assert_eq!(result.limit, 10);
    }

    #[test]
    fn snapshot_denies_at_limit() {
        let result = snapshot(10, 10);
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }

    #[test]
    fn snapshot_never_reports_negative_remaining() {
        // A limit lowered after usage was recorded must not underflow.
        let result = snapshot(12, 10);
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }

    #[test]
    fn zero_quota_denies() {
        assert_eq!(zero_quota(), snapshot(0, 0));
        assert!(!zero_quota().allowed);
    }

    #[test]
    fn action_parsing_rejects_unknown_types() {
        assert!(parse_action("upload").is_ok());
        assert!(parse_action("query").is_ok());
        assert!(matches!(
            parse_action("transfer"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn exhausted_messages_name_the_action() {
        assert!(exhausted_message(ActionType::Upload, QuotaKind::Total).contains("upload"));
        assert!(exhausted_message(ActionType::Query, QuotaKind::Daily).contains("query"));
        assert!(exhausted_message(ActionType::Query, QuotaKind::Daily).contains("resets"));
    }
}
