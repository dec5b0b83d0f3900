use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_REFUNDED: &str = "refunded";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The merchant trade number sent to the gateway; unique.
    pub order_number: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub gateway_trade_no: Option<String>,
    pub gateway_payment_date: Option<String>,
    pub gateway_rtn_code: Option<i64>,
    pub gateway_rtn_msg: Option<String>,
    pub simulate_paid: bool,
    pub bank_code: Option<String>,
    pub virtual_account: Option<String>,
    pub payment_no: Option<String>,
    pub barcode_1: Option<String>,
    pub barcode_2: Option<String>,
    pub barcode_3: Option<String>,
    pub payment_deadline: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Terminal rows are immutable; a duplicate callback is acknowledged
    /// without touching them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_str(),
            STATUS_PAID | STATUS_FAILED | STATUS_REFUNDED
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: &str) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_number: "ZHX17311234567890042".to_string(),
            amount: 1500,
            currency: "TWD".to_string(),
            status: status.to_string(),
            payment_method: Some("atm".to_string()),
            gateway_trade_no: None,
            gateway_payment_date: None,
            gateway_rtn_code: None,
            gateway_rtn_msg: None,
            simulate_paid: false,
            bank_code: None,
            virtual_account: None,
            payment_no: None,
            barcode_1: None,
            barcode_2: None,
            barcode_3: None,
            payment_deadline: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_pending_is_mutable() {
        assert!(!payment(STATUS_PENDING).is_terminal());
        assert!(payment(STATUS_PAID).is_terminal());
        assert!(payment(STATUS_FAILED).is_terminal());
        assert!(payment(STATUS_REFUNDED).is_terminal());
    }
}
