//! Checkout form construction and callback interpretation.
//!
//! The gateway is driven by a browser-posted form of opaque string fields
//! plus a CheckMacValue; results come back the same way on the merchant
//! callback URL. Field names and meanings are the gateway's; this module
//! only assembles, signs and classifies them.

use std::collections::BTreeMap;

use common::{
    env_config::EcpayConfig,
    error::{AppError, Res},
};

use crate::mac::{self, CHECK_MAC_FIELD};

/// AioCheckOut endpoint, staging environment.
pub const AIO_URL_TEST: &str = "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5";
/// AioCheckOut endpoint, production.
pub const AIO_URL_PRODUCTION: &str = "https://payment.ecpay.com.tw/Cashier/AioCheckOut/V5";
/// QueryTradeInfo endpoint, staging environment.
pub const QUERY_URL_TEST: &str = "https://payment-stage.ecpay.com.tw/Cashier/QueryTradeInfo/V5";
/// QueryTradeInfo endpoint, production.
pub const QUERY_URL_PRODUCTION: &str = "https://payment.ecpay.com.tw/Cashier/QueryTradeInfo/V5";

/// RtnCode for a settled payment.
const RTN_PAID: i64 = 1;
/// RtnCode for a successful ATM take-number (payment still outstanding).
const RTN_ATM_TAKEN: i64 = 2;
/// RtnCode for a successful CVS/barcode take-number.
const RTN_CVS_TAKEN: i64 = 10100073;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Atm,
    WebAtm,
    Barcode,
    Cvs,
    Credit,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "atm" => Some(PaymentMethod::Atm),
            "webatm" => Some(PaymentMethod::WebAtm),
            "barcode" => Some(PaymentMethod::Barcode),
            "cvs" => Some(PaymentMethod::Cvs),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }

    /// The gateway's ChoosePayment code.
    pub fn gateway_code(&self) -> &'static str {
        match self {
            PaymentMethod::Atm => "ATM",
            PaymentMethod::WebAtm => "WebATM",
            PaymentMethod::Barcode => "BARCODE",
            PaymentMethod::Cvs => "CVS",
            PaymentMethod::Credit => "Credit",
        }
    }

    /// Offline methods get take-number details echoed on the callback.
    pub fn needs_extra_paid_info(&self) -> bool {
        matches!(
            self,
            PaymentMethod::Atm | PaymentMethod::Barcode | PaymentMethod::Cvs
        )
    }
}

impl ToString for PaymentMethod {
    fn to_string(&self) -> String {
        match self {
            PaymentMethod::Atm => "atm".to_string(),
            PaymentMethod::WebAtm => "webatm".to_string(),
            PaymentMethod::Barcode => "barcode".to_string(),
            PaymentMethod::Cvs => "cvs".to_string(),
            PaymentMethod::Credit => "credit".to_string(),
        }
    }
}

/// Everything the caller decides about one checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSpec {
    pub amount: i64,
    pub item_name: String,
    pub trade_desc: String,
    pub return_url: String,
    pub payment_method: PaymentMethod,
    pub client_back_url: Option<String>,
    pub order_result_url: Option<String>,
}

/// Builds the signed parameter set for an AioCheckOut form post.
///
/// The trade number and trade date are supplied by the caller so the
/// payment row can be inserted (and retried on collision) before the form
/// is built.
pub fn build_checkout_form(
    config: &EcpayConfig,
    trade_no: &str,
    trade_date: &str,
    spec: &CheckoutSpec,
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("MerchantID".to_string(), config.merchant_id.clone());
    params.insert("MerchantTradeNo".to_string(), trade_no.to_string());
    params.insert("MerchantTradeDate".to_string(), trade_date.to_string());
    params.insert("PaymentType".to_string(), "aio".to_string());
    params.insert("TotalAmount".to_string(), spec.amount.to_string());
    params.insert("TradeDesc".to_string(), spec.trade_desc.clone());
    params.insert("ItemName".to_string(), spec.item_name.clone());
    params.insert("ReturnURL".to_string(), spec.return_url.clone());
    params.insert(
        "ChoosePayment".to_string(),
        spec.payment_method.gateway_code().to_string(),
    );
    params.insert("EncryptType".to_string(), "1".to_string()); // SHA256

    if let Some(url) = &spec.client_back_url {
        params.insert("ClientBackURL".to_string(), url.clone());
    }
    if let Some(url) = &spec.order_result_url {
        params.insert("OrderResultURL".to_string(), url.clone());
    }
    if spec.payment_method.needs_extra_paid_info() {
        params.insert("NeedExtraPaidInfo".to_string(), "Y".to_string());
    }

    let mac = mac::check_mac_value(&params, &config.hash_key, &config.hash_iv);
    params.insert(CHECK_MAC_FIELD.to_string(), mac);
    params
}

/// The checkout form's target URL for the configured environment.
pub fn checkout_action_url(config: &EcpayConfig) -> &'static str {
    if config.test_mode {
        AIO_URL_TEST
    } else {
        AIO_URL_PRODUCTION
    }
}

pub fn query_url(config: &EcpayConfig) -> &'static str {
    if config.test_mode {
        QUERY_URL_TEST
    } else {
        QUERY_URL_PRODUCTION
    }
}

/// How a verified callback classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// RtnCode 1: money received.
    Paid,
    /// Take-number success: the member still has to pay at the ATM/store.
    Pending,
    /// Anything else.
    Failed,
}

pub fn classify_rtn_code(rtn_code: i64) -> CallbackOutcome {
    match rtn_code {
        RTN_PAID => CallbackOutcome::Paid,
        RTN_ATM_TAKEN | RTN_CVS_TAKEN => CallbackOutcome::Pending,
        _ => CallbackOutcome::Failed,
    }
}

/// A MAC-verified gateway callback.
#[derive(Debug, Clone)]
pub struct Callback {
    pub merchant_trade_no: String,
    pub gateway_trade_no: String,
    pub rtn_code: i64,
    pub rtn_msg: String,
    pub trade_amt: i64,
    pub payment_date: Option<String>,
    pub payment_type: Option<String>,
    pub simulate_paid: bool,
    pub outcome: CallbackOutcome,

    // ATM take-number details
    pub bank_code: Option<String>,
    pub virtual_account: Option<String>,
    // CVS take-number details
    pub payment_no: Option<String>,
    pub barcode_1: Option<String>,
    pub barcode_2: Option<String>,
    pub barcode_3: Option<String>,
    /// Deadline for an outstanding offline payment.
    pub expire_date: Option<String>,
}

/// Verifies and interprets a raw callback parameter set.
///
/// A signature mismatch rejects the whole payload; nothing in it is
/// trusted or partially processed.
pub fn parse_callback(
    params: &BTreeMap<String, String>,
    hash_key: &str,
    hash_iv: &str,
) -> Res<Callback> {
    if !mac::verify_mac(params, hash_key, hash_iv) {
        return Err(AppError::BadRequest(
            "CheckMacValue verification failed".to_string(),
        ));
    }

    let field = |name: &str| params.get(name).cloned();
    let required = |name: &str| {
        field(name).ok_or_else(|| AppError::BadRequest(format!("Missing callback field {}", name)))
    };

    let rtn_code = required("RtnCode")?
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest("RtnCode is not numeric".to_string()))?;
    let trade_amt = required("TradeAmt")?
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest("TradeAmt is not numeric".to_string()))?;

    Ok(Callback {
        merchant_trade_no: required("MerchantTradeNo")?,
        gateway_trade_no: field("TradeNo").unwrap_or_default(),
        rtn_code,
        rtn_msg: field("RtnMsg").unwrap_or_default(),
        trade_amt,
        payment_date: field("PaymentDate"),
        payment_type: field("PaymentType"),
        simulate_paid: field("SimulatePaid").as_deref() == Some("1"),
        outcome: classify_rtn_code(rtn_code),
        bank_code: field("BankCode"),
        virtual_account: field("vAccount"),
        payment_no: field("PaymentNo"),
        barcode_1: field("Barcode1"),
        barcode_2: field("Barcode2"),
        barcode_3: field("Barcode3"),
        expire_date: field("ExpireDate"),
    })
}

/// The body the gateway expects once a callback has been handled.
pub fn ack(success: bool) -> &'static str {
    if success { "1|OK" } else { "0|Error" }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_KEY: &str = "5294y06JbISpM5x9";
    const HASH_IV: &str = "v77hoKGq4kWxNNIS";

    fn test_config() -> EcpayConfig {
        EcpayConfig {
            merchant_id: "2000132".to_string(),
            hash_key: HASH_KEY.to_string(),
            hash_iv: HASH_IV.to_string(),
            test_mode: true,
        }
    }

    fn checkout_spec(method: PaymentMethod) -> CheckoutSpec {
        CheckoutSpec {
            amount: 1500,
            item_name: "VIP membership".to_string(),
            trade_desc: "VIP monthly".to_string(),
            return_url: "http://localhost:8080/api/pay/callback".to_string(),
            payment_method: method,
            client_back_url: None,
            order_result_url: None,
        }
    }

    fn callback_params(rtn_code: i64) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("MerchantID".to_string(), "2000132".to_string());
        params.insert("MerchantTradeNo".to_string(), "ZHX17311234567890042".to_string());
        params.insert("RtnCode".to_string(), rtn_code.to_string());
        params.insert("RtnMsg".to_string(), "Succeeded".to_string());
        params.insert("TradeNo".to_string(), "2511081234567890".to_string());
        params.insert("TradeAmt".to_string(), "1500".to_string());
        params.insert("PaymentDate".to_string(), "2025/11/08 12:34:56".to_string());
        params.insert("PaymentType".to_string(), "ATM_TAISHIN".to_string());
        params.insert("SimulatePaid".to_string(), "0".to_string());
        let mac = mac::check_mac_value(&params, HASH_KEY, HASH_IV);
        params.insert(CHECK_MAC_FIELD.to_string(), mac);
        params
    }

    #[test]
    fn checkout_form_signature_verifies() {
        let form = build_checkout_form(
            &test_config(),
            "ZHX17311234567890042",
            "2025/11/08 12:30:00",
            &checkout_spec(PaymentMethod::Atm),
        );
        assert!(mac::verify_mac(&form, HASH_KEY, HASH_IV));
        assert_eq!(form.get("EncryptType").map(String::as_str), Some("1"));
        assert_eq!(form.get("PaymentType").map(String::as_str), Some("aio"));
    }

    #[test]
    fn offline_methods_request_extra_paid_info() {
        for method in [PaymentMethod::Atm, PaymentMethod::Barcode, PaymentMethod::Cvs] {
            let form = build_checkout_form(
                &test_config(),
                "ZHX17311234567890042",
                "2025/11/08 12:30:00",
                &checkout_spec(method),
            );
            assert_eq!(form.get("NeedExtraPaidInfo").map(String::as_str), Some("Y"));
        }

        let form = build_checkout_form(
            &test_config(),
            "ZHX17311234567890042",
            "2025/11/08 12:30:00",
            &checkout_spec(PaymentMethod::WebAtm),
        );
        assert!(!form.contains_key("NeedExtraPaidInfo"));
    }

    #[test]
    fn rtn_codes_classify() {
        assert_eq!(classify_rtn_code(1), CallbackOutcome::Paid);
        assert_eq!(classify_rtn_code(2), CallbackOutcome::Pending);
        assert_eq!(classify_rtn_code(10100073), CallbackOutcome::Pending);
        assert_eq!(classify_rtn_code(10200095), CallbackOutcome::Failed);
        assert_eq!(classify_rtn_code(0), CallbackOutcome::Failed);
    }

    #[test]
    fn valid_callback_parses() {
        let callback = parse_callback(&callback_params(1), HASH_KEY, HASH_IV).unwrap();
        assert_eq!(callback.outcome, CallbackOutcome::Paid);
        assert_eq!(callback.merchant_trade_no, "ZHX17311234567890042");
        assert_eq!(callback.trade_amt, 1500);
        assert!(!callback.simulate_paid);
    }

    #[test]
    fn tampered_callback_is_rejected_outright() {
        let mut params = callback_params(1);
        params.insert("TradeAmt".to_string(), "1".to_string());
        assert!(parse_callback(&params, HASH_KEY, HASH_IV).is_err());
    }

    #[test]
    fn ack_bodies() {
        assert_eq!(ack(true), "1|OK");
        assert_eq!(ack(false), "0|Error");
    }
}
