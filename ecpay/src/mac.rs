//! CheckMacValue computation for the ECPay signed-form protocol.
//!
//! The gateway signs every exchanged parameter set with a SHA-256 digest
//! over a canonical string built from the sorted parameters and the shared
//! HashKey/HashIV pair. Both sides must produce the exact same bytes, so
//! every step here (sort order, the encoding variant, the case folds)
//! mirrors the gateway's reference transform.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Name of the signature field carried alongside the other parameters.
pub const CHECK_MAC_FIELD: &str = "CheckMacValue";

/// Percent-encodes `raw` the way the gateway expects.
///
/// Standard `encodeURIComponent` escaping (alphanumerics and `-_.!~*'()`
/// kept literal, everything else `%XX` per UTF-8 byte), followed by the
/// gateway's six fixed substitutions.
pub(crate) fn gateway_url_encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => encoded.push(byte as char),
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                encoded.push(byte as char)
            }
            _ => {
                encoded.push('%');
                encoded.push_str(&format!("{:02X}", byte));
            }
        }
    }

    encoded
        .replace("%20", "+")
        .replace('!', "%21")
        .replace('\'', "%27")
        .replace('(', "%28")
        .replace(')', "%29")
        .replace('*', "%2A")
}

/// The canonical pre-digest string: signature field stripped, keys sorted
/// case-insensitively (ties broken by the original key so construction
/// order never matters), joined `k=v&...` and wrapped with the secrets.
pub(crate) fn canonical_payload(
    params: &BTreeMap<String, String>,
    hash_key: &str,
    hash_iv: &str,
) -> String {
    let mut entries: Vec<(&String, &String)> = params
        .iter()
        .filter(|(key, _)| key.as_str() != CHECK_MAC_FIELD)
        .collect();
    entries.sort_by(|a, b| {
        a.0.to_lowercase()
            .cmp(&b.0.to_lowercase())
            .then_with(|| a.0.cmp(b.0))
    });

    let joined = entries
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!("HashKey={}&{}&HashIV={}", hash_key, joined, hash_iv)
}

/// Computes the CheckMacValue over `params`.
///
/// Any existing signature field is stripped first, so re-signing an
/// already-signed parameter set reproduces the original value. Returns a
/// 64-character upper-case hex string.
pub fn check_mac_value(params: &BTreeMap<String, String>, hash_key: &str, hash_iv: &str) -> String {
    let raw = canonical_payload(params, hash_key, hash_iv);
    let encoded = gateway_url_encode(&raw).to_lowercase();
    let digest = Sha256::digest(encoded.as_bytes());
    hex::encode(digest).to_uppercase()
}

/// Verifies the signature field carried inside `params`.
///
/// Recomputes the value over the remaining fields and compares
/// byte-for-byte. A parameter set without a signature field never
/// verifies.
pub fn verify_mac(params: &BTreeMap<String, String>, hash_key: &str, hash_iv: &str) -> bool {
    let Some(claimed) = params.get(CHECK_MAC_FIELD) else {
        return false;
    };
    check_mac_value(params, hash_key, hash_iv) == *claimed
}

#[cfg(test)]
mod tests {
    use super::*;

    // The gateway's published staging credentials.
    const HASH_KEY: &str = "5294y06JbISpM5x9";
    const HASH_IV: &str = "v77hoKGq4kWxNNIS";

    fn sample_params() -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("MerchantID".to_string(), "2000132".to_string());
        params.insert("MerchantTradeNo".to_string(), "ZHX17311234567890042".to_string());
        params.insert(
            "MerchantTradeDate".to_string(),
            "2025/11/08 12:30:00".to_string(),
        );
        params.insert("PaymentType".to_string(), "aio".to_string());
        params.insert("TotalAmount".to_string(), "1500".to_string());
        params.insert("TradeDesc".to_string(), "VIP monthly".to_string());
        params.insert("ItemName".to_string(), "VIP membership".to_string());
        params.insert(
            "ReturnURL".to_string(),
            "http://localhost:8080/api/pay/callback".to_string(),
        );
        params.insert("ChoosePayment".to_string(), "ALL".to_string());
        params.insert("EncryptType".to_string(), "1".to_string());
        params
    }

    #[test]
    fn encoding_applies_gateway_substitutions() {
        assert_eq!(gateway_url_encode("a b"), "a+b");
        assert_eq!(gateway_url_encode("!'()*"), "%21%27%28%29%2A");
        assert_eq!(gateway_url_encode("a-_.~z"), "a-_.~z");
        assert_eq!(gateway_url_encode("k=v&x"), "k%3Dv%26x");
    }

    #[test]
    fn mac_is_deterministic() {
        let params = sample_params();
        let first = check_mac_value(&params, HASH_KEY, HASH_IV);
        let second = check_mac_value(&params, HASH_KEY, HASH_IV);
        assert_eq!(first, second);
    }

    #[test]
    fn mac_has_sha256_hex_shape() {
        let mac = check_mac_value(&sample_params(), HASH_KEY, HASH_IV);
        assert_eq!(mac.len(), 64);
        assert!(mac.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn signed_params_verify() {
        let mut params = sample_params();
        let mac = check_mac_value(&params, HASH_KEY, HASH_IV);
        params.insert(CHECK_MAC_FIELD.to_string(), mac);

        assert!(verify_mac(&params, HASH_KEY, HASH_IV));
    }

    #[test]
    fn tampered_params_do_not_verify() {
        let mut params = sample_params();
        let mac = check_mac_value(&params, HASH_KEY, HASH_IV);
        params.insert(CHECK_MAC_FIELD.to_string(), mac);
        params.insert("TotalAmount".to_string(), "1".to_string());

        assert!(!verify_mac(&params, HASH_KEY, HASH_IV));
    }

    #[test]
    fn missing_signature_field_does_not_verify() {
        assert!(!verify_mac(&sample_params(), HASH_KEY, HASH_IV));
    }

    #[test]
    fn resigning_a_signed_set_reproduces_the_value() {
        let mut params = sample_params();
        let mac = check_mac_value(&params, HASH_KEY, HASH_IV);
        params.insert(CHECK_MAC_FIELD.to_string(), mac.clone());

        assert_eq!(check_mac_value(&params, HASH_KEY, HASH_IV), mac);
    }

    #[test]
    fn keys_sort_case_insensitively() {
        let mut params = BTreeMap::new();
        params.insert("B".to_string(), "1".to_string());
        params.insert("a".to_string(), "2".to_string());

        // Byte order would put "B" first; the gateway sorts on the
        // lower-cased key, so "a" must come first.
        let payload = canonical_payload(&params, HASH_KEY, HASH_IV);
        assert_eq!(
            payload,
            format!("HashKey={}&a=2&B=1&HashIV={}", HASH_KEY, HASH_IV)
        );
    }

    #[test]
    fn case_only_key_ties_break_deterministically() {
        let mut params = BTreeMap::new();
        params.insert("Amount".to_string(), "1".to_string());
        params.insert("amount".to_string(), "2".to_string());

        let payload = canonical_payload(&params, HASH_KEY, HASH_IV);
        assert_eq!(
            payload,
            format!("HashKey={}&Amount=1&amount=2&HashIV={}", HASH_KEY, HASH_IV)
        );
    }
}
