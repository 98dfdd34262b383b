//! Decoding of the gateway's payment notifications.
//!
//! After payment the gateway posts `Status`, `MerchantID`, `Version`,
//! `TradeInfo` and `TradeSha` to the merchant's NotifyURL / ReturnURL.
//! `TradeInfo` is encrypted with the same key and IV as the request and,
//! depending on the request's `RespondType`, holds either a JSON envelope or
//! a flat query string.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::crypto::{decrypt_aes_cbc, verify_trade_sha};
use crate::error::{MpgError, Result};
use crate::query::parse_query;

/// Status value of a successful notification.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Payment types that carry credit card details.
pub const CREDIT_PAYMENT_TYPES: [&str; 4] = ["CREDIT", "ANDROIDPAY", "SAMSUNGPAY", "UNIONPAY"];

/// A decrypted payment notification.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeNotification {
    pub status: String,
    pub message: String,
    /// Absent when the gateway reports an error without trade data
    pub result: Option<TradeResult>,
}

impl TradeNotification {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Fields returned for every payment method.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeResult {
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    #[serde(rename = "Amt", deserialize_with = "deserialize_amount")]
    pub amount: u32,
    #[serde(rename = "TradeNo")]
    pub trade_no: String,
    #[serde(rename = "MerchantOrderNo")]
    pub merchant_order_no: String,
    #[serde(rename = "PaymentType", default)]
    pub payment_type: String,
    #[serde(rename = "RespondType", default)]
    pub respond_type: Option<String>,
    #[serde(rename = "PayTime", default)]
    pub pay_time: Option<String>,
    #[serde(rename = "IP", default)]
    pub ip: Option<String>,
    #[serde(rename = "EscrowBank", default)]
    pub escrow_bank: Option<String>,
    /// Populated for credit card style payment types
    #[serde(flatten)]
    pub credit: CreditDetails,
}

impl TradeResult {
    /// Whether `credit` is expected to carry card details.
    pub fn is_credit(&self) -> bool {
        CREDIT_PAYMENT_TYPES.contains(&self.payment_type.as_str())
    }
}

/// Credit card, Google Pay, Samsung Pay and UnionPay fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreditDetails {
    #[serde(rename = "AuthBank", default)]
    pub auth_bank: Option<String>,
    #[serde(rename = "RespondCode", default, deserialize_with = "deserialize_optional_text")]
    pub respond_code: Option<String>,
    #[serde(rename = "Auth", default, deserialize_with = "deserialize_optional_text")]
    pub auth: Option<String>,
    #[serde(rename = "Card6No", default, deserialize_with = "deserialize_optional_text")]
    pub card_first6: Option<String>,
    #[serde(rename = "Card4No", default, deserialize_with = "deserialize_optional_text")]
    pub card_last4: Option<String>,
    #[serde(rename = "Inst", default, deserialize_with = "deserialize_optional_number")]
    pub inst: Option<u32>,
    #[serde(rename = "InstFirst", default, deserialize_with = "deserialize_optional_number")]
    pub inst_first: Option<u32>,
    #[serde(rename = "InstEach", default, deserialize_with = "deserialize_optional_number")]
    pub inst_each: Option<u32>,
    #[serde(rename = "ECI", default, deserialize_with = "deserialize_optional_text")]
    pub eci: Option<String>,
    #[serde(rename = "TokenUseStatus", default, deserialize_with = "deserialize_optional_number")]
    pub token_use_status: Option<u32>,
    #[serde(rename = "RedAmt", default, deserialize_with = "deserialize_optional_number")]
    pub red_amount: Option<u32>,
    #[serde(rename = "PaymentMethod", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "DCC_Amt", default, deserialize_with = "deserialize_optional_number")]
    pub dcc_amount: Option<f64>,
    #[serde(rename = "DCC_Rate", default, deserialize_with = "deserialize_optional_number")]
    pub dcc_rate: Option<f64>,
    #[serde(rename = "DCC_Markup", default, deserialize_with = "deserialize_optional_number")]
    pub dcc_markup: Option<f64>,
    #[serde(rename = "DCC_Currency", default)]
    pub dcc_currency: Option<String>,
    #[serde(rename = "DCC_Currency_Code", default, deserialize_with = "deserialize_optional_number")]
    pub dcc_currency_code: Option<u32>,
}

/// Verify, decrypt and parse a notification's `TradeInfo`.
pub fn decode_notification(
    trade_info: &str,
    trade_sha: &str,
    key: &str,
    iv: &str,
) -> Result<TradeNotification> {
    verify_trade_sha(trade_info, trade_sha, key, iv)?;
    let plaintext = decrypt_aes_cbc(trade_info, key, iv)?;
    let notification = parse_notification(&plaintext)?;

    tracing::debug!(
        status = %notification.status,
        has_result = notification.result.is_some(),
        "Decoded gateway notification"
    );

    Ok(notification)
}

/// Parse decrypted `TradeInfo` in either the JSON or the String respond type.
pub fn parse_notification(plaintext: &str) -> Result<TradeNotification> {
    let trimmed = plaintext.trim();
    let mut fields = if trimmed.starts_with(['{', '[']) {
        match serde_json::from_str::<Value>(trimmed)? {
            Value::Object(map) => map,
            other => {
                return Err(MpgError::InvalidInput(format!(
                    "notification JSON must be an object, got {}",
                    json_kind(&other)
                )))
            }
        }
    } else {
        parse_query(trimmed)?
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    };

    let status = take_string(&mut fields, "Status");
    let message = take_string(&mut fields, "Message");

    // JSON nests the trade data under "Result"; String keeps it flat.
    let result_fields = match fields.remove("Result") {
        Some(Value::Object(map)) => map,
        Some(_) => Map::new(),
        None => fields,
    };

    let result = if result_fields.contains_key("MerchantID") {
        Some(serde_json::from_value(Value::Object(result_fields))?)
    } else {
        None
    };

    Ok(TradeNotification {
        status,
        message,
        result,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_number(deserializer)?
        .ok_or_else(|| <D::Error as serde::de::Error>::custom("Amt is required"))
}

/// Helper to deserialize fields sent either as JSON numbers or as text
fn deserialize_optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

/// Like [`deserialize_optional_text`], then parsed; blank text is `None`.
fn deserialize_optional_number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;

    let Some(text) = deserialize_optional_text(deserializer)? else {
        return Ok(None);
    };

    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<T>()
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid number {:?}: {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt_aes_cbc, trade_sha};

    const KEY: &str = "12345678901234567890123456789012";
    const IV: &str = "1234567890123456";

    const JSON_CREDIT: &str = r#"{
        "Status": "SUCCESS",
        "Message": "授權成功",
        "Result": {
            "MerchantID": "MS123456",
            "Amt": 1500,
            "TradeNo": "24010112000012345",
            "MerchantOrderNo": "ORDER_1",
            "RespondType": "JSON",
            "IP": "203.0.113.7",
            "EscrowBank": "HNCB",
            "PaymentType": "CREDIT",
            "PayTime": "2024-01-01 12:00:00",
            "RespondCode": "00",
            "Auth": 123456,
            "Card6No": "400022",
            "Card4No": "1111",
            "Inst": 0,
            "InstFirst": 0,
            "InstEach": 0,
            "ECI": "",
            "TokenUseStatus": 0,
            "AuthBank": "KGI",
            "PaymentMethod": "CREDIT",
            "DCC_Amt": "47.5",
            "DCC_Rate": 31.58
        }
    }"#;

    #[test]
    fn test_parse_json_credit_notification() {
        let notification = parse_notification(JSON_CREDIT).unwrap();
        assert!(notification.is_success());
        assert_eq!(notification.message, "授權成功");

        let result = notification.result.unwrap();
        assert_eq!(result.merchant_id, "MS123456");
        assert_eq!(result.amount, 1500);
        assert_eq!(result.merchant_order_no, "ORDER_1");
        assert!(result.is_credit());
        assert_eq!(result.credit.auth.as_deref(), Some("123456"));
        assert_eq!(result.credit.card_last4.as_deref(), Some("1111"));
        assert_eq!(result.credit.inst, Some(0));
        assert_eq!(result.credit.dcc_amount, Some(47.5));
        assert_eq!(result.credit.dcc_rate, Some(31.58));
        assert_eq!(result.credit.dcc_currency_code, None);
    }

    #[test]
    fn test_parse_string_notification() {
        let plaintext = "Status=SUCCESS&Message=%E4%BB%98%E6%AC%BE%E6%88%90%E5%8A%9F\
            &MerchantID=MS123456&Amt=300&TradeNo=24010112000099999&MerchantOrderNo=ORDER_2\
            &PaymentType=VACC&PayTime=2024-01-01+12%3A00%3A00&EscrowBank=HNCB";
        let notification = parse_notification(plaintext).unwrap();
        assert!(notification.is_success());
        assert_eq!(notification.message, "付款成功");

        let result = notification.result.unwrap();
        assert_eq!(result.amount, 300);
        assert_eq!(result.payment_type, "VACC");
        assert_eq!(result.pay_time.as_deref(), Some("2024-01-01 12:00:00"));
        assert!(!result.is_credit());
        assert_eq!(result.credit, CreditDetails::default());
    }

    #[test]
    fn test_parse_error_notification_without_result() {
        let notification =
            parse_notification(r#"{"Status":"MPG03009","Message":"交易失敗","Result":[]}"#).unwrap();
        assert!(!notification.is_success());
        assert_eq!(notification.status, "MPG03009");
        assert!(notification.result.is_none());
    }

    #[test]
    fn test_parse_rejects_non_object_json() {
        for plaintext in ["[1,2,3]", "[]", " [{\"Status\":\"SUCCESS\"}]"] {
            assert!(matches!(
                parse_notification(plaintext).unwrap_err(),
                MpgError::InvalidInput(_)
            ));
        }
        // Starts like JSON but is not valid JSON.
        assert!(matches!(
            parse_notification("{not json").unwrap_err(),
            MpgError::Json(_)
        ));
    }

    #[test]
    fn test_text_fields_accept_numbers_and_strings() {
        let notification = parse_notification(
            r#"{"Status":"SUCCESS","Result":{"MerchantID":"MS1","Amt":"10","TradeNo":"T","MerchantOrderNo":"A","RespondCode":0,"Card4No":"0042","Auth":null}}"#,
        )
        .unwrap();
        let credit = notification.result.unwrap().credit;
        assert_eq!(credit.respond_code.as_deref(), Some("0"));
        assert_eq!(credit.card_last4.as_deref(), Some("0042"));
        assert_eq!(credit.auth, None);
    }

    #[test]
    fn test_parse_rejects_bad_amount() {
        let err = parse_notification(
            "Status=SUCCESS&MerchantID=MS1&Amt=abc&TradeNo=1&MerchantOrderNo=A",
        )
        .unwrap_err();
        assert!(matches!(err, MpgError::Json(_)));
    }

    #[test]
    fn test_decode_notification_round_trip() {
        let trade_info = encrypt_aes_cbc(JSON_CREDIT, KEY, IV).unwrap();
        let sha = trade_sha(&trade_info, KEY, IV);

        let notification = decode_notification(&trade_info, &sha, KEY, IV).unwrap();
        assert!(notification.is_success());
        assert_eq!(notification.result.unwrap().trade_no, "24010112000012345");
    }

    #[test]
    fn test_decode_notification_rejects_tampering() {
        let trade_info = encrypt_aes_cbc(JSON_CREDIT, KEY, IV).unwrap();
        let sha = trade_sha(&trade_info, KEY, IV);
        let tampered = format!("{}00000000000000000000000000000000", trade_info);

        assert!(matches!(
            decode_notification(&tampered, &sha, KEY, IV).unwrap_err(),
            MpgError::ChecksumMismatch
        ));
    }
}
