use chrono::{DateTime, Utc};
use common::{
    error::{AppError, Res},
    misc::{ActionType, service_today},
};
use db::models::{
    message::Message,
    plan::{QuotaKind, SubscriptionPlan},
    quota::DailyUsageQuota,
    sub::MemberSubscription,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::sub::SubscriptionStatusResponse;

/// Assembles the status projection from the rows already fetched.
/// Pure so the boundary cases (lapsed row, missing daily row) are
/// testable without a database.
fn build_status(
    sub: &MemberSubscription,
    plan: &SubscriptionPlan,
    daily: Option<&DailyUsageQuota>,
    now: DateTime<Utc>,
) -> SubscriptionStatusResponse {
    let is_expired = sub.is_expired(now);

    let (upload_used, upload_limit, query_used, query_limit) = match plan.quota_kind() {
        QuotaKind::Daily => match daily {
            Some(row) => (
                row.uploads_used,
                row.uploads_limit,
                row.queries_used,
                row.queries_limit,
            ),
            // Nothing consumed today yet; the row appears on first use.
            None => (
                0,
                plan.daily_limit(ActionType::Upload),
                0,
                plan.daily_limit(ActionType::Query),
            ),
        },
        QuotaKind::Total => {
            let upload_limit = plan.total_limit(ActionType::Upload);
            let query_limit = plan.total_limit(ActionType::Query);
            (
                upload_limit - sub.remaining_upload_quota.unwrap_or(0),
                upload_limit,
                query_limit - sub.remaining_query_quota.unwrap_or(0),
                query_limit,
            )
        }
    };

    SubscriptionStatusResponse {
        subscription_id: sub.id,
        plan_name: plan.plan_name.clone(),
        display_name: plan.display_name.clone(),
        status: sub.status.clone(),
        subscription_type: sub.subscription_type.clone(),
        start_date: sub.start_date,
        end_date: sub.end_date,
        days_remaining: sub.days_remaining(now),
        is_expired,
        is_vip: sub.subscription_type == "vip_monthly" && sub.is_consumable(now),
        quota_type: plan.quota_kind().to_string(),
        upload_used,
        upload_limit,
        upload_remaining: (upload_limit - upload_used).max(0),
        query_used,
        query_limit,
        query_remaining: (query_limit - query_used).max(0),
    }
}

/// The member's current subscription status, with expiry computed from
/// `end_date` rather than the stored status column.
pub async fn get_status(pool: &PgPool, user_id: Uuid) -> Res<SubscriptionStatusResponse> {
    let sub = db::sub::get_subscription_by_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No subscription found for this member".to_string()))?;
    let plan = db::plan::get_plan_by_id(pool, sub.plan_id).await?;

    let daily = match plan.quota_kind() {
        QuotaKind::Daily => db::quota::get_daily_row(pool, user_id, service_today()).await?,
        QuotaKind::Total => None,
    };

    Ok(build_status(&sub, &plan, daily.as_ref(), Utc::now()))
}

pub async fn list_notifications(
    pool: &PgPool,
    user_id: Uuid,
    unread_only: bool,
) -> Res<Vec<Message>> {
    db::message::list_by_receiver(pool, user_id, unread_only).await
}

pub async fn mark_notification_read(pool: &PgPool, user_id: Uuid, message_id: Uuid) -> Res<()> {
    let updated = db::message::mark_read(pool, message_id, user_id).await?;
    if !updated {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn trial_plan() -> SubscriptionPlan {
        SubscriptionPlan {
            id: Uuid::new_v4(),
            plan_name: "free_trial".to_string(),
            display_name: "Free Trial".to_string(),
            description: None,
            price: 0,
            duration_days: 7,
            upload_quota_total: Some(3),
            query_quota_total: Some(10),
            upload_quota_daily: None,
            query_quota_daily: None,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn vip_plan() -> SubscriptionPlan {
        SubscriptionPlan {
            id: Uuid::new_v4(),
            plan_name: "vip_monthly".to_string(),
            display_name: "VIP Monthly".to_string(),
            description: None,
            price: 1500,
            duration_days: 30,
            upload_quota_total: None,
            query_quota_total: None,
            upload_quota_daily: Some(10),
            query_quota_daily: Some(100),
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn subscription(plan: &SubscriptionPlan, status: &str, end_offset_days: i64) -> MemberSubscription {
        MemberSubscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_id: plan.id,
            status: status.to_string(),
            subscription_type: plan.plan_name.clone(),
            start_date: now() - Duration::days(1),
            end_date: now() + Duration::days(end_offset_days),
            remaining_upload_quota: plan.upload_quota_total.map(|_| 2),
            remaining_query_quota: plan.query_quota_total.map(|_| 10),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn trial_status_reports_lifetime_counters() {
        let plan = trial_plan();
        let sub = subscription(&plan, "trial", 5);

        let status = build_status(&sub, &plan, None, now());
        assert_eq!(status.quota_type, "total");
        assert_eq!(status.upload_used, 1);
        assert_eq!(status.upload_remaining, 2);
        assert_eq!(status.query_remaining, 10);
        assert!(!status.is_expired);
        assert!(!status.is_vip);
    }

    #[test]
    fn vip_without_todays_row_shows_full_allowance() {
        let plan = vip_plan();
        let sub = subscription(&plan, "active", 20);

        let status = build_status(&sub, &plan, None, now());
        assert_eq!(status.quota_type, "daily");
        assert_eq!(status.upload_used, 0);
        assert_eq!(status.upload_remaining, 10);
        assert_eq!(status.query_remaining, 100);
        assert!(status.is_vip);
    }

    #[test]
    fn vip_with_todays_row_shows_consumption() {
        let plan = vip_plan();
        let sub = subscription(&plan, "active", 20);
        let row = DailyUsageQuota {
            id: Uuid::new_v4(),
            user_id: sub.user_id,
            date: service_today(),
            uploads_used: 4,
            queries_used: 99,
            uploads_limit: 10,
            queries_limit: 100,
            created_at: now(),
            updated_at: now(),
        };

        let status = build_status(&sub, &plan, Some(&row), now());
        assert_eq!(status.upload_remaining, 6);
        assert_eq!(status.query_remaining, 1);
    }

    #[test]
    fn lapsed_subscription_reports_expired_even_when_status_is_stale() {
        let plan = vip_plan();
        let sub = subscription(&plan, "active", -1);

        let status = build_status(&sub, &plan, None, now());
        assert!(status.is_expired);
        assert!(!status.is_vip);
        assert_eq!(status.days_remaining, 0);
    }
}
