use uuid::Uuid;

pub struct PaymentCreateRequest {
    pub user_id: Uuid,
    pub order_number: String,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
}

/// Gateway fields persisted on every handled callback.
pub struct GatewayResult {
    pub gateway_trade_no: String,
    pub gateway_payment_date: Option<String>,
    pub gateway_rtn_code: i64,
    pub gateway_rtn_msg: String,
    pub simulate_paid: bool,
}

/// Take-number details for an outstanding offline payment.
pub struct PendingPaymentInfo {
    pub bank_code: Option<String>,
    pub virtual_account: Option<String>,
    pub payment_no: Option<String>,
    pub barcode_1: Option<String>,
    pub barcode_2: Option<String>,
    pub barcode_3: Option<String>,
    pub payment_deadline: Option<String>,
}
