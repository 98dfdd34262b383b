//! Data models for the Newebpay MPG API.

use serde::{Deserialize, Serialize};

use crate::error::{MpgError, Result};

/// Encryption mode announced to the gateway through `EncryptType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EncryptType {
    /// AES/CBC/PKCS7Padding (flag 0, also assumed when the flag is absent)
    #[default]
    AesCbcPkcs7,
    /// AES/GCM (flag 1)
    AesGcm,
}

impl EncryptType {
    /// Returns the flag value sent to the gateway.
    pub fn flag(&self) -> u8 {
        match self {
            EncryptType::AesCbcPkcs7 => 0,
            EncryptType::AesGcm => 1,
        }
    }
}

impl From<EncryptType> for u8 {
    fn from(value: EncryptType) -> Self {
        value.flag()
    }
}

impl TryFrom<u8> for EncryptType {
    type Error = MpgError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(EncryptType::AesCbcPkcs7),
            1 => Ok(EncryptType::AesGcm),
            other => Err(MpgError::InvalidInput(format!(
                "unknown EncryptType flag: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for EncryptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.flag())
    }
}

/// Language of the MPG payment page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LangType {
    #[serde(rename = "zh-tw")]
    ZhTw,
    #[serde(rename = "jp")]
    Japanese,
    #[serde(rename = "en")]
    English,
}

impl LangType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LangType::ZhTw => "zh-tw",
            LangType::Japanese => "jp",
            LangType::English => "en",
        }
    }
}

impl std::fmt::Display for LangType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Format of the gateway's response TradeInfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RespondType {
    #[default]
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "String")]
    String,
}

impl RespondType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RespondType::Json => "JSON",
            RespondType::String => "String",
        }
    }
}

impl std::fmt::Display for RespondType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logistics type for convenience-store pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LgsType {
    /// Bulk warehouse shipping
    #[serde(rename = "B2C")]
    B2c,
    /// Store-to-store shipping
    #[serde(rename = "C2C")]
    C2c,
}

impl LgsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LgsType::B2c => "B2C",
            LgsType::C2c => "C2C",
        }
    }
}

/// Convenience-store pickup options (`CVSCOM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CvsCom {
    /// Pickup without payment
    PickupOnly,
    /// Pickup with payment on collection
    PickupAndPay,
    /// Both of the above
    Both,
}

impl From<CvsCom> for u8 {
    fn from(value: CvsCom) -> Self {
        match value {
            CvsCom::PickupOnly => 1,
            CvsCom::PickupAndPay => 2,
            CvsCom::Both => 3,
        }
    }
}

impl TryFrom<u8> for CvsCom {
    type Error = MpgError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(CvsCom::PickupOnly),
            2 => Ok(CvsCom::PickupAndPay),
            3 => Ok(CvsCom::Both),
            other => Err(MpgError::InvalidInput(format!("unknown CVSCOM value: {}", other))),
        }
    }
}

/// Credit card installment periods accepted by the gateway.
pub const INSTALLMENT_PERIODS: [u8; 6] = [3, 6, 12, 18, 24, 30];

/// Credit card installments (`InstFlag`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Installments {
    /// Installments turned off for this order (`0`)
    Disabled,
    /// Every period the merchant has enabled
    All,
    /// Only the listed periods, e.g. `3,6,12`
    Periods(Vec<u8>),
}

impl Installments {
    /// Check that every period is one the gateway offers.
    pub fn validate(&self) -> Result<()> {
        if let Installments::Periods(periods) = self {
            if periods.is_empty() {
                return Err(MpgError::InvalidInput(
                    "InstFlag needs at least one period".to_string(),
                ));
            }
            if let Some(bad) = periods.iter().find(|p| !INSTALLMENT_PERIODS.contains(p)) {
                return Err(MpgError::InvalidInput(format!(
                    "InstFlag period {} is not one of {:?}",
                    bad, INSTALLMENT_PERIODS
                )));
            }
            if let Some((i, dup)) = periods
                .iter()
                .enumerate()
                .find(|&(i, p)| periods[..i].contains(p))
            {
                return Err(MpgError::InvalidInput(format!(
                    "InstFlag period {} is repeated at position {}",
                    dup,
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Installments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Installments::Disabled => write!(f, "0"),
            Installments::All => write!(f, "1"),
            Installments::Periods(periods) => {
                let joined = periods
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<String>>()
                    .join(",");
                write!(f, "{}", joined)
            }
        }
    }
}

impl From<Installments> for String {
    fn from(value: Installments) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Installments {
    type Error = MpgError;

    fn try_from(value: String) -> Result<Self> {
        match value.trim() {
            "0" => return Ok(Installments::Disabled),
            "1" => return Ok(Installments::All),
            _ => {}
        }
        let periods = value
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<u8>()
                    .map_err(|_| MpgError::InvalidInput(format!("invalid InstFlag: {}", value)))
            })
            .collect::<Result<Vec<u8>>>()?;
        let installments = Installments::Periods(periods);
        installments.validate()?;
        Ok(installments)
    }
}

/// The form payload posted to the MPG gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpgData {
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    /// Uppercase hex AES ciphertext of the encoded trade info
    #[serde(rename = "TradeInfo")]
    pub trade_info: String,
    /// Uppercase hex SHA-256 checksum of the TradeInfo
    #[serde(rename = "TradeSha")]
    pub trade_sha: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "EncryptType")]
    pub encrypt_type: EncryptType,
}

impl MpgData {
    /// Assemble the payload from already computed parts.
    ///
    /// This is a plain field copy: `encrypt_type` is caller-selected metadata
    /// and is not checked against the cipher that produced `trade_info`.
    pub fn assemble(
        merchant_id: impl Into<String>,
        encrypt_type: EncryptType,
        trade_info: impl Into<String>,
        trade_sha: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            trade_info: trade_info.into(),
            trade_sha: trade_sha.into(),
            version: version.into(),
            encrypt_type,
        }
    }

    /// Form fields in the order they are posted.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("MerchantID", self.merchant_id.clone()),
            ("TradeInfo", self.trade_info.clone()),
            ("TradeSha", self.trade_sha.clone()),
            ("Version", self.version.clone()),
            ("EncryptType", self.encrypt_type.to_string()),
        ]
    }
}
