//! Merchant credentials and gateway configuration.

use serde::Deserialize;

use crate::models::EncryptType;

/// Production MPG gateway.
pub const MPG_GATEWAY_URL: &str = "https://core.newebpay.com/MPG/mpg_gateway";

/// Test (sandbox) MPG gateway.
pub const TEST_MPG_GATEWAY_URL: &str = "https://ccore.newebpay.com/MPG/mpg_gateway";

/// MPG protocol version.
pub const DEFAULT_VERSION: &str = "2.0";

/// Merchant ID plus the shared hash key and hash IV.
///
/// The key and IV are used as raw text bytes for AES and are embedded in
/// every TradeSha. `Debug` output redacts them.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "MerchantID", alias = "merchant_id")]
    merchant_id: String,
    #[serde(rename = "HashKey", alias = "hash_key")]
    hash_key: String,
    #[serde(rename = "HashIV", alias = "hash_iv")]
    hash_iv: String,
}

impl Credentials {
    pub fn new(
        merchant_id: impl Into<String>,
        hash_key: impl Into<String>,
        hash_iv: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            hash_key: hash_key.into(),
            hash_iv: hash_iv.into(),
        }
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    pub fn hash_iv(&self) -> &str {
        &self.hash_iv
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("merchant_id", &self.merchant_id)
            .field("hash_key", &"<redacted>")
            .field("hash_iv", &"<redacted>")
            .finish()
    }
}

/// Gateway settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MpgConfig {
    /// Form action URL
    pub gateway_url: String,
    /// Value of the payload `Version` field
    pub version: String,
    /// Encryption mode flag sent with the payload
    pub encrypt_type: EncryptType,
}

impl Default for MpgConfig {
    fn default() -> Self {
        Self {
            gateway_url: TEST_MPG_GATEWAY_URL.to_string(),
            version: DEFAULT_VERSION.to_string(),
            encrypt_type: EncryptType::AesCbcPkcs7,
        }
    }
}

impl MpgConfig {
    /// Defaults pointed at the production gateway.
    pub fn production() -> Self {
        Self {
            gateway_url: MPG_GATEWAY_URL.to_string(),
            ..Self::default()
        }
    }
}
