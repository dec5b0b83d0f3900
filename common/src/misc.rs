use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Members and the payment gateway both operate on Taiwan time.
pub const SERVICE_UTC_OFFSET_HOURS: i32 = 8;

pub fn service_offset() -> FixedOffset {
    FixedOffset::east_opt(SERVICE_UTC_OFFSET_HOURS * 3600).expect("valid offset")
}

/// The calendar date the given instant falls on in the service timezone.
/// Daily quota rows are keyed by this date.
pub fn service_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&service_offset()).date_naive()
}

pub fn service_today() -> NaiveDate {
    service_date(Utc::now())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Upload,
    Query,
}

impl ActionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "upload" => Some(ActionType::Upload),
            "query" => Some(ActionType::Query),
            _ => None,
        }
    }
}

impl ToString for ActionType {
    fn to_string(&self) -> String {
        match self {
            ActionType::Upload => "upload".to_string(),
            ActionType::Query => "query".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn action_type_parses_known_values_only() {
        assert_eq!(ActionType::parse("upload"), Some(ActionType::Upload));
        assert_eq!(ActionType::parse("query"), Some(ActionType::Query));
        assert_eq!(ActionType::parse("download"), None);
        assert_eq!(ActionType::parse("UPLOAD"), None);
    }

    #[test]
    fn service_date_rolls_over_at_utc_16() {
        // 15:59 UTC is 23:59 in the service timezone: still the same day.
        let before = Utc.with_ymd_and_hms(2025, 3, 1, 15, 59, 0).unwrap();
        assert_eq!(
            service_date(before),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );

        // 16:01 UTC is 00:01 the next service day: a fresh quota row.
        let after = Utc.with_ymd_and_hms(2025, 3, 1, 16, 1, 0).unwrap();
        assert_eq!(
            service_date(after),
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
    }
}
