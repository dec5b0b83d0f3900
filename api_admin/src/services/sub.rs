use chrono::{DateTime, Datelike, Duration, Utc};
use common::{
    error::{AppError, Res},
    misc::service_offset,
};
use db::{
    dtos::{audit::AuditCreateRequest, message::MessageCreateRequest},
    models::sub::{ALL_STATUSES, MemberSubscription},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::sub::{
    AdjustDaysRequest, AdjustDaysResponse, ExtendRequest, ExtendResponse, SetStatusRequest,
    SetStatusResponse, StatsResponse,
};

const AUDIT_TARGET: &str = "member_subscription";

const MIN_EXTEND_DAYS: i64 = 1;
const MAX_EXTEND_DAYS: i64 = 100;
const MAX_ADJUST_DAYS: i64 = 365;

fn validate_extend_days(days: i64) -> Res<()> {
    if !(MIN_EXTEND_DAYS..=MAX_EXTEND_DAYS).contains(&days) {
        return Err(AppError::BadRequest(
            "extend_days must be between 1 and 100".to_string(),
        ));
    }
    Ok(())
}

fn validate_adjust_days(days: i64) -> Res<()> {
    if days == 0 {
        return Err(AppError::BadRequest(
            "days_to_adjust must not be 0".to_string(),
        ));
    }
    if !(-MAX_ADJUST_DAYS..=MAX_ADJUST_DAYS).contains(&days) {
        return Err(AppError::BadRequest(
            "days_to_adjust must be between -365 and 365".to_string(),
        ));
    }
    Ok(())
}

/// Midnight today in the service timezone, as a UTC instant. An adjusted
/// end date may not fall before this.
fn start_of_service_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let offset = service_offset();
    let midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    midnight
        .and_local_timezone(offset)
        .unwrap()
        .with_timezone(&Utc)
}

async fn fetch_subscription(pool: &PgPool, subscription_id: Uuid) -> Res<MemberSubscription> {
    db::sub::get_subscription_by_id(pool, subscription_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))
}

async fn write_audit(
    pool: &PgPool,
    admin_id: Uuid,
    action: &str,
    target_id: Uuid,
    old_value: serde_json::Value,
    new_value: serde_json::Value,
    note: Option<String>,
) -> Res<()> {
    db::audit::insert_audit(
        pool,
        AuditCreateRequest {
            admin_id,
            action: action.to_string(),
            target_type: AUDIT_TARGET.to_string(),
            target_id,
            old_value: old_value.to_string(),
            new_value: new_value.to_string(),
            note,
        },
    )
    .await?;
    Ok(())
}

/// A failed notification must not roll back the already-committed
/// override; it is logged and dropped.
async fn notify_member(pool: &PgPool, receiver_id: Uuid, subject: &str, content: String) {
    let result = db::message::insert_system_message(
        pool,
        MessageCreateRequest {
            receiver_id,
            subject: subject.to_string(),
            content,
        },
    )
    .await;

    if let Err(e) = result {
        log::warn!(
            "Failed to notify member {} about a subscription change: {}",
            receiver_id,
            e
        );
    }
}

/// Extends a subscription by 1 to 100 days.
pub async fn extend(pool: &PgPool, admin_id: Uuid, req: &ExtendRequest) -> Res<ExtendResponse> {
    validate_extend_days(req.extend_days)?;

    let sub = fetch_subscription(pool, req.subscription_id).await?;
    let old_end = sub.end_date;
    let new_end = old_end + Duration::days(req.extend_days);

    let updated = db::sub::update_end_date(pool, sub.id, new_end).await?;

    write_audit(
        pool,
        admin_id,
        "extend_subscription",
        sub.id,
        serde_json::json!({ "end_date": old_end }),
        serde_json::json!({ "end_date": updated.end_date, "extended_days": req.extend_days }),
        req.admin_note.clone(),
    )
    .await?;

    notify_member(
        pool,
        sub.user_id,
        "Subscription extended",
        format!(
            "An administrator extended your subscription by {} days.\n\
             Previous end date: {}\nNew end date: {}{}",
            req.extend_days,
            old_end.format("%Y-%m-%d"),
            new_end.format("%Y-%m-%d"),
            req.admin_note
                .as_deref()
                .map(|note| format!("\nNote: {}", note))
                .unwrap_or_default()
        ),
    )
    .await;

    log::info!(
        "Subscription {} extended by {} days by admin {}",
        sub.id,
        req.extend_days,
        admin_id
    );

    Ok(ExtendResponse {
        subscription_id: sub.id,
        old_end_date: old_end,
        new_end_date: updated.end_date,
        extended_days: req.extend_days,
        message: format!("Subscription extended by {} days", req.extend_days),
    })
}

/// Moves a subscription's end date by -365 to 365 days (never to before
/// the start of today).
pub async fn adjust_days(
    pool: &PgPool,
    admin_id: Uuid,
    req: &AdjustDaysRequest,
) -> Res<AdjustDaysResponse> {
    validate_adjust_days(req.days_to_adjust)?;

    let sub = fetch_subscription(pool, req.subscription_id).await?;
    let old_end = sub.end_date;
    let new_end = old_end + Duration::days(req.days_to_adjust);

    if new_end < start_of_service_day(Utc::now()) {
        return Err(AppError::BadRequest(
            "days_to_adjust would move the end date before today".to_string(),
        ));
    }

    let updated = db::sub::update_end_date(pool, sub.id, new_end).await?;

    write_audit(
        pool,
        admin_id,
        "adjust_subscription_days",
        sub.id,
        serde_json::json!({ "end_date": old_end }),
        serde_json::json!({ "end_date": updated.end_date, "days_adjusted": req.days_to_adjust }),
        req.reason.clone(),
    )
    .await?;

    let action_word = if req.days_to_adjust > 0 {
        "extended"
    } else {
        "shortened"
    };
    notify_member(
        pool,
        sub.user_id,
        "Subscription period adjusted",
        format!(
            "An administrator {} your subscription by {} days.\n\
             Previous end date: {}\nNew end date: {}{}",
            action_word,
            req.days_to_adjust.abs(),
            old_end.format("%Y-%m-%d"),
            new_end.format("%Y-%m-%d"),
            req.reason
                .as_deref()
                .map(|reason| format!("\nReason: {}", reason))
                .unwrap_or_default()
        ),
    )
    .await;

    Ok(AdjustDaysResponse {
        subscription_id: sub.id,
        old_end_date: old_end,
        new_end_date: updated.end_date,
        days_adjusted: req.days_to_adjust,
        message: format!(
            "Subscription {} by {} days",
            action_word,
            req.days_to_adjust.abs()
        ),
    })
}

/// Unconditional status override; touches neither `end_date` nor the
/// quota counters.
pub async fn set_status(
    pool: &PgPool,
    admin_id: Uuid,
    req: &SetStatusRequest,
) -> Res<SetStatusResponse> {
    if !ALL_STATUSES.contains(&req.new_status.as_str()) {
        return Err(AppError::BadRequest(
            "new_status must be one of: trial, active, expired, cancelled".to_string(),
        ));
    }

    let sub = fetch_subscription(pool, req.subscription_id).await?;
    let old_status = sub.status.clone();
    let updated = db::sub::update_status(pool, sub.id, &req.new_status).await?;

    write_audit(
        pool,
        admin_id,
        "set_subscription_status",
        sub.id,
        serde_json::json!({ "status": old_status }),
        serde_json::json!({ "status": updated.status }),
        req.admin_note.clone(),
    )
    .await?;

    log::info!(
        "Subscription {} status {} -> {} by admin {}",
        sub.id,
        old_status,
        updated.status,
        admin_id
    );

    Ok(SetStatusResponse {
        subscription_id: sub.id,
        old_status,
        new_status: updated.status,
        message: "Subscription status updated".to_string(),
    })
}

/// First instant of the current month in the service timezone.
fn start_of_service_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let offset = service_offset();
    let first = now
        .with_timezone(&offset)
        .date_naive()
        .with_day(1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    first.and_local_timezone(offset).unwrap().with_timezone(&Utc)
}

pub async fn stats(pool: &PgPool) -> Res<StatsResponse> {
    let total_subscriptions = db::sub::count_all(pool).await?;
    let active_subscriptions = db::sub::count_by_status(pool, "active").await?;
    let trial_subscriptions = db::sub::count_by_status(pool, "trial").await?;
    let expired_subscriptions = db::sub::count_by_status(pool, "expired").await?;
    let vip_members = db::sub::count_live_vip(pool).await?;
    let total_revenue = db::payment::total_revenue(pool).await?;
    let monthly_revenue =
        db::payment::revenue_since(pool, start_of_service_month(Utc::now())).await?;
    let recent_payments = db::payment::recent_payments(pool, 10).await?;

    Ok(StatsResponse {
        total_subscriptions,
        active_subscriptions,
        trial_subscriptions,
        expired_subscriptions,
        vip_members,
        total_revenue,
        monthly_revenue,
        recent_payments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn extend_days_bounds() {
        assert!(validate_extend_days(0).is_err());
        assert!(validate_extend_days(101).is_err());
        assert!(validate_extend_days(-5).is_err());
        assert!(validate_extend_days(1).is_ok());
        assert!(validate_extend_days(100).is_ok());
    }

    #[test]
    fn adjust_days_bounds() {
        assert!(validate_adjust_days(0).is_err());
        assert!(validate_adjust_days(366).is_err());
        assert!(validate_adjust_days(-366).is_err());
        assert!(validate_adjust_days(365).is_ok());
        assert!(validate_adjust_days(-365).is_ok());
        assert!(validate_adjust_days(-1).is_ok());
    }

    #[test]
    fn service_day_starts_at_utc_16_of_previous_day() {
        // 2025-06-01 in the service timezone begins 2025-05-31T16:00Z.
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap();
        let start = start_of_service_day(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 5, 31, 16, 0, 0).unwrap());
    }

    #[test]
    fn service_month_starts_on_the_first() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 3, 0, 0).unwrap();
        let start = start_of_service_month(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 5, 31, 16, 0, 0).unwrap());
    }
}
