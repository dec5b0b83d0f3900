use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_TRIAL: &str = "trial";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_EXPIRED: &str = "expired";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const ALL_STATUSES: [&str; 4] = [STATUS_TRIAL, STATUS_ACTIVE, STATUS_EXPIRED, STATUS_CANCELLED];

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct MemberSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub subscription_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub remaining_upload_quota: Option<i32>,
    pub remaining_query_quota: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberSubscription {
    /// Expiry is observed lazily: the stored status may lag, so every
    /// read path computes this from `end_date` instead of trusting it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    /// Whether quota may still be consumed from this subscription.
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status.as_str(), STATUS_TRIAL | STATUS_ACTIVE) && !self.is_expired(now)
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.end_date - now).num_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn subscription(status: &str, end_offset_hours: i64) -> MemberSubscription {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        MemberSubscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            status: status.to_string(),
            subscription_type: "free_trial".to_string(),
            start_date: now - Duration::days(3),
            end_date: now + Duration::hours(end_offset_hours),
            remaining_upload_quota: Some(3),
            remaining_query_quota: Some(10),
            created_at: now,
            updated_at: now,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn stale_status_does_not_hide_expiry() {
        // Row still says "active" but the end date has passed.
        let sub = subscription(STATUS_ACTIVE, -1);
        assert!(sub.is_expired(now()));
        assert!(!sub.is_consumable(now()));
    }

    #[test]
    fn terminal_statuses_never_consume() {
        for status in [STATUS_EXPIRED, STATUS_CANCELLED] {
            let sub = subscription(status, 24);
            assert!(!sub.is_consumable(now()));
        }
    }

    #[test]
    fn live_trial_and_active_consume() {
        for status in [STATUS_TRIAL, STATUS_ACTIVE] {
            let sub = subscription(status, 24);
            assert!(sub.is_consumable(now()));
        }
    }

    #[test]
    fn days_remaining_floors_at_zero() {
        assert_eq!(subscription(STATUS_ACTIVE, -48).days_remaining(now()), 0);
        assert_eq!(subscription(STATUS_ACTIVE, 49).days_remaining(now()), 2);
    }
}
