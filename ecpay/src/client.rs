//! Server-to-server QueryTradeInfo client.

use std::collections::BTreeMap;

use chrono::Utc;
use common::{
    env_config::EcpayConfig,
    error::{AppError, Res},
};

use crate::{form, mac};

/// Queries the gateway for the current state of a trade.
///
/// Sends a signed form post and returns the gateway's field set after
/// verifying the CheckMacValue it carries. Used by the admin payment view
/// to reconcile rows the callback never reached.
pub async fn query_trade_info(
    http: &reqwest::Client,
    config: &EcpayConfig,
    merchant_trade_no: &str,
) -> Res<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    params.insert("MerchantID".to_string(), config.merchant_id.clone());
    params.insert("MerchantTradeNo".to_string(), merchant_trade_no.to_string());
    params.insert("TimeStamp".to_string(), Utc::now().timestamp().to_string());

    let mac = mac::check_mac_value(&params, &config.hash_key, &config.hash_iv);
    params.insert(mac::CHECK_MAC_FIELD.to_string(), mac);

    let body = serde_urlencoded::to_string(&params)
        .map_err(|e| AppError::Internal(format!("Failed to encode query body: {}", e)))?;

    let response = http
        .post(form::query_url(config))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(AppError::Gateway(format!(
            "QueryTradeInfo returned {}: {}",
            status, text
        )));
    }

    let fields: BTreeMap<String, String> = serde_urlencoded::from_str(&text)
        .map_err(|e| AppError::Gateway(format!("Unparseable QueryTradeInfo response: {}", e)))?;

    if !mac::verify_mac(&fields, &config.hash_key, &config.hash_iv) {
        log::warn!(
            "QueryTradeInfo response failed MAC verification for {}",
            merchant_trade_no
        );
        return Err(AppError::Gateway(
            "QueryTradeInfo response failed CheckMacValue verification".to_string(),
        ));
    }

    Ok(fields)
}
