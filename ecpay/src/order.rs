//! Merchant trade number and trade date helpers.

use chrono::{DateTime, Utc};
use common::misc::service_offset;
use uuid::Uuid;

/// All trade numbers issued by this service carry this prefix.
pub const TRADE_NO_PREFIX: &str = "ZHX";

/// Total length mandated by the gateway.
pub const TRADE_NO_LEN: usize = 20;

/// Generates a merchant trade number: prefix + 13-digit millisecond
/// timestamp + 4-digit random suffix.
///
/// Best-effort uniqueness only. The payment service retries the insert
/// under a fresh number when the unique constraint on `order_number`
/// fires.
pub fn new_trade_no() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix = (Uuid::new_v4().as_u128() % 10_000) as u16;
    format!("{}{}{:04}", TRADE_NO_PREFIX, timestamp, suffix)
}

/// Formats an instant as `yyyy/MM/dd HH:mm:ss` in the gateway's timezone.
pub fn format_trade_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&service_offset())
        .format("%Y/%m/%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn trade_no_has_mandated_shape() {
        let trade_no = new_trade_no();
        assert_eq!(trade_no.len(), TRADE_NO_LEN);
        assert!(trade_no.starts_with(TRADE_NO_PREFIX));
        assert!(
            trade_no[TRADE_NO_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_digit())
        );
    }

    #[test]
    fn trade_date_renders_in_gateway_timezone() {
        let at = Utc.with_ymd_and_hms(2025, 11, 8, 4, 5, 6).unwrap();
        assert_eq!(format_trade_date(at), "2025/11/08 12:05:06");
    }

    #[test]
    fn trade_date_is_zero_padded() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 19, 0, 0).unwrap();
        // 19:00 UTC rolls into 03:00 the next service day.
        assert_eq!(format_trade_date(at), "2025/01/03 03:00:00");
    }
}
