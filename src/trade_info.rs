//! The TradeInfo record sent (encrypted) to the MPG gateway.
//!
//! Field order follows the gateway documentation and is kept explicit in
//! [`TradeInfo::to_fields`]. Unset optional fields are left out so the
//! merchant's platform settings apply.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::config::DEFAULT_VERSION;
use crate::error::{MpgError, Result};
use crate::models::{CvsCom, Installments, LangType, LgsType, RespondType};

/// Maximum length of `MerchantOrderNo`.
pub const MAX_ORDER_NO_LEN: usize = 30;

/// Maximum length of `ItemDesc`.
pub const MAX_ITEM_DESC_LEN: usize = 50;

/// Maximum length of `OrderComment`.
pub const MAX_ORDER_COMMENT_LEN: usize = 300;

/// Order and payment description for one MPG transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TradeInfo {
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    #[serde(rename = "RespondType", default)]
    pub respond_type: RespondType,
    /// Unix seconds; the gateway tolerates 1200 seconds of drift
    #[serde(
        rename = "TimeStamp",
        default = "unix_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: i64,
    #[serde(rename = "Version", default = "default_version")]
    pub version: String,
    #[serde(rename = "LangType", default)]
    pub lang_type: Option<LangType>,
    /// Letters, digits and `_`, unique per merchant
    #[serde(rename = "MerchantOrderNo")]
    pub merchant_order_no: String,
    /// Amount in TWD
    #[serde(rename = "Amt")]
    pub amount: u32,
    #[serde(rename = "ItemDesc")]
    pub item_desc: String,
    /// Seconds before the payment page expires (gateway clamps to 60..=900)
    #[serde(rename = "TradeLimit", default)]
    pub trade_limit: Option<u32>,
    /// Payment deadline for non-realtime methods
    #[serde(rename = "ExpireDate", default, deserialize_with = "deserialize_ymd")]
    pub expire_date: Option<NaiveDate>,
    #[serde(rename = "ReturnURL", default)]
    pub return_url: Option<String>,
    #[serde(rename = "NotifyURL", default)]
    pub notify_url: Option<String>,
    #[serde(rename = "CustomerURL", default)]
    pub customer_url: Option<String>,
    #[serde(rename = "ClientBackURL", default)]
    pub client_back_url: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "EmailModify", default, deserialize_with = "deserialize_flag")]
    pub email_modify: Option<bool>,
    #[serde(rename = "LoginType", default, deserialize_with = "deserialize_flag")]
    pub login_type: Option<bool>,
    #[serde(rename = "OrderComment", default)]
    pub order_comment: Option<String>,
    #[serde(rename = "CREDIT", default, deserialize_with = "deserialize_flag")]
    pub credit: Option<bool>,
    #[serde(rename = "InstFlag", default)]
    pub inst_flag: Option<Installments>,
    #[serde(rename = "CreditRed", default, deserialize_with = "deserialize_flag")]
    pub credit_red: Option<bool>,
    #[serde(rename = "ANDROIDPAY", default, deserialize_with = "deserialize_flag")]
    pub google_pay: Option<bool>,
    #[serde(rename = "SAMSUNGPAY", default, deserialize_with = "deserialize_flag")]
    pub samsung_pay: Option<bool>,
    #[serde(rename = "LINEPAY", default, deserialize_with = "deserialize_flag")]
    pub line_pay: Option<bool>,
    /// Product image shown by LINE Pay (84x84 jpg/png)
    #[serde(rename = "ImageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "UNIONPAY", default, deserialize_with = "deserialize_flag")]
    pub union_pay: Option<bool>,
    #[serde(rename = "WEBATM", default, deserialize_with = "deserialize_flag")]
    pub web_atm: Option<bool>,
    #[serde(rename = "VACC", default, deserialize_with = "deserialize_flag")]
    pub atm_transfer: Option<bool>,
    #[serde(rename = "CVS", default, deserialize_with = "deserialize_flag")]
    pub cvs: Option<bool>,
    #[serde(rename = "BARCODE", default, deserialize_with = "deserialize_flag")]
    pub barcode: Option<bool>,
    #[serde(rename = "ESUNWALLET", default, deserialize_with = "deserialize_flag")]
    pub esun_wallet: Option<bool>,
    #[serde(rename = "TAIWANPAY", default, deserialize_with = "deserialize_flag")]
    pub taiwan_pay: Option<bool>,
    #[serde(rename = "CVSCOM", default)]
    pub cvscom: Option<CvsCom>,
    #[serde(rename = "EZPAY", default, deserialize_with = "deserialize_flag")]
    pub ezpay: Option<bool>,
    #[serde(rename = "EZPWECHAT", default, deserialize_with = "deserialize_flag")]
    pub ezpay_wechat: Option<bool>,
    #[serde(rename = "EZPALIPAY", default, deserialize_with = "deserialize_flag")]
    pub ezpay_alipay: Option<bool>,
    #[serde(rename = "LgsType", default)]
    pub lgs_type: Option<LgsType>,
}

fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn flag(value: bool) -> String {
    let flag = if value { "1" } else { "0" };
    flag.to_string()
}

fn push_field(fields: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<String>) {
    if let Some(value) = value {
        fields.push((name, value));
    }
}

impl TradeInfo {
    /// Start a builder with the four fields every transaction needs.
    pub fn builder(
        merchant_id: impl Into<String>,
        merchant_order_no: impl Into<String>,
        amount: u32,
        item_desc: impl Into<String>,
    ) -> TradeInfoBuilder {
        TradeInfoBuilder::new(merchant_id, merchant_order_no, amount, item_desc)
    }

    /// Parse a JSON object keyed by gateway field names and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let info: TradeInfo = serde_json::from_str(json)?;
        info.validate()?;
        Ok(info)
    }

    /// Ordered `(name, value)` pairs for the query encoder.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("MerchantID", self.merchant_id.clone()),
            ("RespondType", self.respond_type.as_str().to_string()),
            ("TimeStamp", self.timestamp.to_string()),
            ("Version", self.version.clone()),
        ];
        push_field(&mut fields, "LangType", self.lang_type.map(|l| l.as_str().to_string()));
        fields.push(("MerchantOrderNo", self.merchant_order_no.clone()));
        fields.push(("Amt", self.amount.to_string()));
        fields.push(("ItemDesc", self.item_desc.clone()));
        push_field(&mut fields, "TradeLimit", self.trade_limit.map(|t| t.to_string()));
        push_field(
            &mut fields,
            "ExpireDate",
            self.expire_date.map(|d| d.format("%Y%m%d").to_string()),
        );
        push_field(&mut fields, "ReturnURL", self.return_url.clone());
        push_field(&mut fields, "NotifyURL", self.notify_url.clone());
        push_field(&mut fields, "CustomerURL", self.customer_url.clone());
        push_field(&mut fields, "ClientBackURL", self.client_back_url.clone());
        push_field(&mut fields, "Email", self.email.clone());
        push_field(&mut fields, "EmailModify", self.email_modify.map(flag));
        push_field(&mut fields, "LoginType", self.login_type.map(flag));
        push_field(&mut fields, "OrderComment", self.order_comment.clone());
        push_field(&mut fields, "CREDIT", self.credit.map(flag));
        push_field(&mut fields, "InstFlag", self.inst_flag.as_ref().map(|i| i.to_string()));
        push_field(&mut fields, "CreditRed", self.credit_red.map(flag));
        push_field(&mut fields, "ANDROIDPAY", self.google_pay.map(flag));
        push_field(&mut fields, "SAMSUNGPAY", self.samsung_pay.map(flag));
        push_field(&mut fields, "LINEPAY", self.line_pay.map(flag));
        push_field(&mut fields, "ImageUrl", self.image_url.clone());
        push_field(&mut fields, "UNIONPAY", self.union_pay.map(flag));
        push_field(&mut fields, "WEBATM", self.web_atm.map(flag));
        push_field(&mut fields, "VACC", self.atm_transfer.map(flag));
        push_field(&mut fields, "CVS", self.cvs.map(flag));
        push_field(&mut fields, "BARCODE", self.barcode.map(flag));
        push_field(&mut fields, "ESUNWALLET", self.esun_wallet.map(flag));
        push_field(&mut fields, "TAIWANPAY", self.taiwan_pay.map(flag));
        push_field(&mut fields, "CVSCOM", self.cvscom.map(|c| u8::from(c).to_string()));
        push_field(&mut fields, "EZPAY", self.ezpay.map(flag));
        push_field(&mut fields, "EZPWECHAT", self.ezpay_wechat.map(flag));
        push_field(&mut fields, "EZPALIPAY", self.ezpay_alipay.map(flag));
        push_field(&mut fields, "LgsType", self.lgs_type.map(|l| l.as_str().to_string()));
        fields
    }

    /// Check the gateway's documented field rules.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_id.is_empty() {
            return Err(MpgError::InvalidInput("MerchantID is required".to_string()));
        }

        let order_no_re = Regex::new(r"^[A-Za-z0-9_]+$")?;
        let order_no_len = self.merchant_order_no.chars().count();
        if order_no_len == 0
            || order_no_len > MAX_ORDER_NO_LEN
            || !order_no_re.is_match(&self.merchant_order_no)
        {
            return Err(MpgError::InvalidInput(format!(
                "MerchantOrderNo must be 1-{} letters, digits or '_': {:?}",
                MAX_ORDER_NO_LEN, self.merchant_order_no
            )));
        }

        if self.amount == 0 {
            return Err(MpgError::InvalidInput("Amt must be greater than 0".to_string()));
        }

        let desc_len = self.item_desc.chars().count();
        if desc_len == 0 || desc_len > MAX_ITEM_DESC_LEN {
            return Err(MpgError::InvalidInput(format!(
                "ItemDesc must be 1-{} characters, got {}",
                MAX_ITEM_DESC_LEN, desc_len
            )));
        }

        if let Some(comment) = &self.order_comment {
            if comment.chars().count() > MAX_ORDER_COMMENT_LEN {
                return Err(MpgError::InvalidInput(format!(
                    "OrderComment must be at most {} characters",
                    MAX_ORDER_COMMENT_LEN
                )));
            }
        }

        for (name, value) in [
            ("ReturnURL", &self.return_url),
            ("NotifyURL", &self.notify_url),
            ("CustomerURL", &self.customer_url),
            ("ClientBackURL", &self.client_back_url),
        ] {
            if let Some(value) = value {
                validate_callback_url(name, value)?;
            }
        }

        if let Some(image_url) = &self.image_url {
            parse_http_url("ImageUrl", image_url)?;
        }

        if let Some(installments) = &self.inst_flag {
            installments.validate()?;
        }

        Ok(())
    }
}

fn parse_http_url(name: &str, value: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(value)
        .map_err(|e| MpgError::InvalidInput(format!("{} is not a valid URL: {}", name, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(MpgError::InvalidInput(format!(
            "{} must be http or https, got {}",
            name, other
        ))),
    }
}

/// Callback URLs are only reachable by the gateway on ports 80 and 443.
fn validate_callback_url(name: &str, value: &str) -> Result<()> {
    let parsed = parse_http_url(name, value)?;
    match parsed.port_or_known_default() {
        Some(80) | Some(443) => Ok(()),
        port => Err(MpgError::InvalidInput(format!(
            "{} must use port 80 or 443, got {:?}",
            name, port
        ))),
    }
}

/// Builder for [`TradeInfo`].
#[derive(Debug, Clone)]
pub struct TradeInfoBuilder {
    info: TradeInfo,
}

impl TradeInfoBuilder {
    /// Create a new builder with required parameters.
    pub fn new(
        merchant_id: impl Into<String>,
        merchant_order_no: impl Into<String>,
        amount: u32,
        item_desc: impl Into<String>,
    ) -> Self {
        Self {
            info: TradeInfo {
                merchant_id: merchant_id.into(),
                respond_type: RespondType::default(),
                timestamp: unix_timestamp(),
                version: default_version(),
                lang_type: None,
                merchant_order_no: merchant_order_no.into(),
                amount,
                item_desc: item_desc.into(),
                trade_limit: None,
                expire_date: None,
                return_url: None,
                notify_url: None,
                customer_url: None,
                client_back_url: None,
                email: None,
                email_modify: None,
                login_type: None,
                order_comment: None,
                credit: None,
                inst_flag: None,
                credit_red: None,
                google_pay: None,
                samsung_pay: None,
                line_pay: None,
                image_url: None,
                union_pay: None,
                web_atm: None,
                atm_transfer: None,
                cvs: None,
                barcode: None,
                esun_wallet: None,
                taiwan_pay: None,
                cvscom: None,
                ezpay: None,
                ezpay_wechat: None,
                ezpay_alipay: None,
                lgs_type: None,
            },
        }
    }

    pub fn respond_type(mut self, respond_type: RespondType) -> Self {
        self.info.respond_type = respond_type;
        self
    }

    /// Override the Unix timestamp (defaults to now).
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.info.timestamp = timestamp;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.info.version = version.into();
        self
    }

    pub fn lang_type(mut self, lang_type: LangType) -> Self {
        self.info.lang_type = Some(lang_type);
        self
    }

    pub fn trade_limit(mut self, seconds: u32) -> Self {
        self.info.trade_limit = Some(seconds);
        self
    }

    pub fn expire_date(mut self, date: NaiveDate) -> Self {
        self.info.expire_date = Some(date);
        self
    }

    pub fn return_url(mut self, url: impl Into<String>) -> Self {
        self.info.return_url = Some(url.into());
        self
    }

    pub fn notify_url(mut self, url: impl Into<String>) -> Self {
        self.info.notify_url = Some(url.into());
        self
    }

    pub fn customer_url(mut self, url: impl Into<String>) -> Self {
        self.info.customer_url = Some(url.into());
        self
    }

    pub fn client_back_url(mut self, url: impl Into<String>) -> Self {
        self.info.client_back_url = Some(url.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.info.email = Some(email.into());
        self
    }

    /// Whether the payer may edit the email on the payment page.
    pub fn email_modify(mut self, allow: bool) -> Self {
        self.info.email_modify = Some(allow);
        self
    }

    /// Whether the payer must log in to a Newebpay account.
    pub fn login_required(mut self, required: bool) -> Self {
        self.info.login_type = Some(required);
        self
    }

    pub fn order_comment(mut self, comment: impl Into<String>) -> Self {
        self.info.order_comment = Some(comment.into());
        self
    }

    pub fn credit(mut self, enable: bool) -> Self {
        self.info.credit = Some(enable);
        self
    }

    pub fn installments(mut self, installments: Installments) -> Self {
        self.info.inst_flag = Some(installments);
        self
    }

    pub fn credit_red(mut self, enable: bool) -> Self {
        self.info.credit_red = Some(enable);
        self
    }

    pub fn google_pay(mut self, enable: bool) -> Self {
        self.info.google_pay = Some(enable);
        self
    }

    pub fn samsung_pay(mut self, enable: bool) -> Self {
        self.info.samsung_pay = Some(enable);
        self
    }

    pub fn line_pay(mut self, enable: bool) -> Self {
        self.info.line_pay = Some(enable);
        self
    }

    pub fn line_pay_image_url(mut self, url: impl Into<String>) -> Self {
        self.info.image_url = Some(url.into());
        self
    }

    pub fn union_pay(mut self, enable: bool) -> Self {
        self.info.union_pay = Some(enable);
        self
    }

    pub fn web_atm(mut self, enable: bool) -> Self {
        self.info.web_atm = Some(enable);
        self
    }

    pub fn atm_transfer(mut self, enable: bool) -> Self {
        self.info.atm_transfer = Some(enable);
        self
    }

    pub fn cvs(mut self, enable: bool) -> Self {
        self.info.cvs = Some(enable);
        self
    }

    pub fn barcode(mut self, enable: bool) -> Self {
        self.info.barcode = Some(enable);
        self
    }

    pub fn esun_wallet(mut self, enable: bool) -> Self {
        self.info.esun_wallet = Some(enable);
        self
    }

    pub fn taiwan_pay(mut self, enable: bool) -> Self {
        self.info.taiwan_pay = Some(enable);
        self
    }

    pub fn cvscom(mut self, option: CvsCom) -> Self {
        self.info.cvscom = Some(option);
        self
    }

    pub fn ezpay(mut self, enable: bool) -> Self {
        self.info.ezpay = Some(enable);
        self
    }

    pub fn ezpay_wechat(mut self, enable: bool) -> Self {
        self.info.ezpay_wechat = Some(enable);
        self
    }

    pub fn ezpay_alipay(mut self, enable: bool) -> Self {
        self.info.ezpay_alipay = Some(enable);
        self
    }

    pub fn lgs_type(mut self, lgs_type: LgsType) -> Self {
        self.info.lgs_type = Some(lgs_type);
        self
    }

    /// Validate and return the record.
    pub fn build(self) -> Result<TradeInfo> {
        self.info.validate()?;
        Ok(self.info)
    }
}

/// Accepts `true`/`false`, `0`/`1` or `"0"`/`"1"`.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = Option<bool>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a boolean, 0, 1, or null")
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_bool<E>(self, v: bool) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v))
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            match v {
                0 => Ok(Some(false)),
                1 => Ok(Some(true)),
                _ => Err(E::custom(format!("flag must be 0 or 1, got {}", v))),
            }
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            match u64::try_from(v) {
                Ok(v) => self.visit_u64(v),
                Err(_) => Err(E::custom(format!("flag must be 0 or 1, got {}", v))),
            }
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            match v {
                "0" => Ok(Some(false)),
                "1" => Ok(Some(true)),
                _ => Err(E::custom(format!("flag must be \"0\" or \"1\", got {:?}", v))),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// Accepts a number or a numeric string.
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("Unix seconds as a number or string")
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(v).map_err(|_| E::custom(format!("timestamp out of range: {}", v)))
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.parse()
                .map_err(|_| E::custom(format!("invalid timestamp: {:?}", v)))
        }
    }

    deserializer.deserialize_any(TimestampVisitor)
}

/// Accepts `YYYYMMDD`.
fn deserialize_ymd<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y%m%d")
            .map_err(|e| <D::Error as serde::de::Error>::custom(format!("ExpireDate {:?}: {}", s, e)))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TradeInfoBuilder {
        TradeInfo::builder("MS123456", "ORDER_20240101_001", 1500, "Test item").timestamp(1_700_000_000)
    }

    #[test]
    fn test_required_fields_order() {
        let info = base().build().unwrap();
        let names: Vec<&str> = info.to_fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec![
                "MerchantID",
                "RespondType",
                "TimeStamp",
                "Version",
                "MerchantOrderNo",
                "Amt",
                "ItemDesc"
            ]
        );
    }

    #[test]
    fn test_required_field_values() {
        let info = base().build().unwrap();
        let fields = info.to_fields();
        assert_eq!(fields[0], ("MerchantID", "MS123456".to_string()));
        assert_eq!(fields[1], ("RespondType", "JSON".to_string()));
        assert_eq!(fields[2], ("TimeStamp", "1700000000".to_string()));
        assert_eq!(fields[3], ("Version", "2.0".to_string()));
        assert_eq!(fields[5], ("Amt", "1500".to_string()));
    }

    #[test]
    fn test_optional_fields_render_in_place() {
        let info = base()
            .lang_type(LangType::English)
            .expire_date(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap())
            .notify_url("https://shop.example.com/notify")
            .credit(true)
            .installments(Installments::Periods(vec![3, 6]))
            .web_atm(false)
            .cvscom(CvsCom::PickupAndPay)
            .lgs_type(LgsType::C2c)
            .build()
            .unwrap();

        let fields = info.to_fields();
        let names: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec![
                "MerchantID",
                "RespondType",
                "TimeStamp",
                "Version",
                "LangType",
                "MerchantOrderNo",
                "Amt",
                "ItemDesc",
                "ExpireDate",
                "NotifyURL",
                "CREDIT",
                "InstFlag",
                "WEBATM",
                "CVSCOM",
                "LgsType",
            ]
        );
        let get = |name: &str| {
            fields
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("LangType"), Some("en"));
        assert_eq!(get("ExpireDate"), Some("20240620"));
        assert_eq!(get("CREDIT"), Some("1"));
        assert_eq!(get("InstFlag"), Some("3,6"));
        assert_eq!(get("WEBATM"), Some("0"));
        assert_eq!(get("CVSCOM"), Some("2"));
        assert_eq!(get("LgsType"), Some("C2C"));
    }

    #[test]
    fn test_default_timestamp_is_now() {
        let info = TradeInfo::builder("MS1", "A1", 1, "x").build().unwrap();
        let now = chrono::Utc::now().timestamp();
        assert!((now - info.timestamp).abs() < 60);
    }

    #[test]
    fn test_order_no_rules() {
        assert!(TradeInfo::builder("MS1", "bad-order", 1, "x").build().is_err());
        assert!(TradeInfo::builder("MS1", "", 1, "x").build().is_err());
        assert!(TradeInfo::builder("MS1", "A".repeat(31), 1, "x").build().is_err());
        assert!(TradeInfo::builder("MS1", "A".repeat(30), 1, "x").build().is_ok());
    }

    #[test]
    fn test_item_desc_length_counts_characters() {
        assert!(TradeInfo::builder("MS1", "A1", 1, "商".repeat(50)).build().is_ok());
        assert!(TradeInfo::builder("MS1", "A1", 1, "商".repeat(51)).build().is_err());
        assert!(TradeInfo::builder("MS1", "A1", 1, "").build().is_err());
    }

    #[test]
    fn test_amount_must_be_positive() {
        let err = TradeInfo::builder("MS1", "A1", 0, "x").build().unwrap_err();
        assert!(matches!(err, MpgError::InvalidInput(_)));
    }

    #[test]
    fn test_order_comment_length() {
        assert!(base().order_comment("c".repeat(300)).build().is_ok());
        assert!(base().order_comment("c".repeat(301)).build().is_err());
    }

    #[test]
    fn test_callback_url_ports() {
        assert!(base().return_url("https://shop.example.com/return").build().is_ok());
        assert!(base().return_url("http://shop.example.com:80/return").build().is_ok());
        assert!(base().notify_url("https://shop.example.com:8443/notify").build().is_err());
        assert!(base().customer_url("ftp://shop.example.com/").build().is_err());
        assert!(base().client_back_url("not a url").build().is_err());
    }

    #[test]
    fn test_installment_periods_validated() {
        assert!(base().installments(Installments::All).build().is_ok());
        assert!(base()
            .installments(Installments::Periods(vec![3, 7]))
            .build()
            .is_err());
    }

    #[test]
    fn test_from_json() {
        let info = TradeInfo::from_json(
            r#"{
                "MerchantID": "MS123",
                "MerchantOrderNo": "ORDER_1",
                "Amt": 100,
                "ItemDesc": "Test",
                "TimeStamp": "1700000000",
                "LangType": "zh-tw",
                "CREDIT": 1,
                "VACC": "0",
                "EZPALIPAY": true,
                "InstFlag": "3,6,12",
                "CVSCOM": 3,
                "ExpireDate": "20240620",
                "RespondType": "String"
            }"#,
        )
        .unwrap();

        assert_eq!(info.timestamp, 1_700_000_000);
        assert_eq!(info.version, "2.0");
        assert_eq!(info.respond_type, RespondType::String);
        assert_eq!(info.lang_type, Some(LangType::ZhTw));
        assert_eq!(info.credit, Some(true));
        assert_eq!(info.atm_transfer, Some(false));
        assert_eq!(info.ezpay_alipay, Some(true));
        assert_eq!(info.inst_flag, Some(Installments::Periods(vec![3, 6, 12])));
        assert_eq!(info.cvscom, Some(CvsCom::Both));
        assert_eq!(info.expire_date, NaiveDate::from_ymd_opt(2024, 6, 20));
    }

    #[test]
    fn test_from_json_installments_disabled() {
        let info = TradeInfo::from_json(
            r#"{"MerchantID":"MS1","MerchantOrderNo":"A1","Amt":1,"ItemDesc":"x","CREDIT":1,"InstFlag":"0"}"#,
        )
        .unwrap();
        assert_eq!(info.inst_flag, Some(Installments::Disabled));

        let fields = info.to_fields();
        assert!(fields.contains(&("InstFlag", "0".to_string())));
    }

    #[test]
    fn test_from_json_rejects_repeated_installment_periods() {
        let err = TradeInfo::from_json(
            r#"{"MerchantID":"MS1","MerchantOrderNo":"A1","Amt":1,"ItemDesc":"x","InstFlag":"3,3,3"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MpgError::Json(_) | MpgError::InvalidInput(_)));
    }

    #[test]
    fn test_from_json_rejects_bad_records() {
        assert!(TradeInfo::from_json(r#"{"MerchantID":"MS1"}"#).is_err());
        assert!(TradeInfo::from_json(
            r#"{"MerchantID":"MS1","MerchantOrderNo":"A1","Amt":1,"ItemDesc":"x","CREDIT":2}"#
        )
        .is_err());
        assert!(TradeInfo::from_json(
            r#"{"MerchantID":"MS1","MerchantOrderNo":"A-1","Amt":1,"ItemDesc":"x"}"#
        )
        .is_err());
    }
}
