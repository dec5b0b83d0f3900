use std::collections::BTreeMap;

use db::models::payment::Payment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CheckoutCreateRequest {
    pub plan_type: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutCreateResponse {
    pub payment_id: Uuid,
    pub merchant_trade_no: String,
    pub amount: i64,
    /// The signed field set the frontend posts to the gateway.
    pub form_data: BTreeMap<String, String>,
    pub action_url: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentsResponse {
    pub payments: Vec<Payment>,
}
