//! Main Mpg client: turns a TradeInfo into the gateway payload and checkout form.

use crate::callback::{decode_notification, TradeNotification};
use crate::config::{Credentials, MpgConfig, MPG_GATEWAY_URL};
use crate::crypto::{encrypt_trade_info, key_material, trade_sha};
use crate::error::Result;
use crate::form::render_form;
use crate::models::{EncryptType, MpgData};
use crate::query::build_query;
use crate::trade_info::TradeInfo;

/// Builder for creating an Mpg client.
pub struct MpgBuilder {
    credentials: Credentials,
    config: MpgConfig,
}

impl MpgBuilder {
    /// Create a new builder with the merchant's credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            config: MpgConfig::default(),
        }
    }

    /// Replace the whole gateway configuration.
    pub fn config(mut self, config: MpgConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the form action URL.
    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.config.gateway_url = url.into();
        self
    }

    /// Post to the production gateway instead of the test one.
    pub fn production(mut self) -> Self {
        self.config.gateway_url = MPG_GATEWAY_URL.to_string();
        self
    }

    /// Set the payload `Version` value.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the encryption mode.
    pub fn encrypt_type(mut self, encrypt_type: EncryptType) -> Self {
        self.config.encrypt_type = encrypt_type;
        self
    }

    /// Build the Mpg client.
    ///
    /// Fails if the hash key is shorter than 32 bytes or the hash IV is not
    /// 16 bytes.
    pub fn build(self) -> Result<Mpg> {
        key_material(self.credentials.hash_key(), self.credentials.hash_iv())?;

        tracing::debug!(
            merchant_id = self.credentials.merchant_id(),
            gateway_url = %self.config.gateway_url,
            encrypt_type = %self.config.encrypt_type,
            "Mpg client configured"
        );

        Ok(Mpg {
            credentials: self.credentials,
            config: self.config,
        })
    }
}

/// Newebpay MPG client.
///
/// Holds immutable credentials and configuration, so one instance can be
/// shared across threads.
///
/// # Example
/// ```
/// use newebpay_mpg::{Credentials, Mpg, TradeInfo};
///
/// # fn main() -> newebpay_mpg::Result<()> {
/// let mpg = Mpg::builder(Credentials::new(
///     "MS123456",
///     "12345678901234567890123456789012",
///     "1234567890123456",
/// ))
/// .build()?;
///
/// let info = TradeInfo::builder("MS123456", "ORDER_1", 1500, "Test item").build()?;
/// let html = mpg.checkout_form(&info)?;
/// assert!(html.contains("name=\"TradeSha\""));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Mpg {
    credentials: Credentials,
    config: MpgConfig,
}

impl Mpg {
    /// Create a builder for the Mpg client.
    pub fn builder(credentials: Credentials) -> MpgBuilder {
        MpgBuilder::new(credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &MpgConfig {
        &self.config
    }

    /// Encode and encrypt ordered trade-info fields into the TradeInfo hex.
    pub fn encrypt_fields<K, V>(&self, fields: &[(K, V)]) -> Result<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = build_query(fields)?;
        encrypt_trade_info(
            &query,
            self.config.encrypt_type,
            self.credentials.hash_key(),
            self.credentials.hash_iv(),
        )
    }

    /// TradeSha for an encrypted TradeInfo.
    pub fn trade_sha(&self, trade_info: &str) -> String {
        trade_sha(
            trade_info,
            self.credentials.hash_key(),
            self.credentials.hash_iv(),
        )
    }

    /// Build the gateway payload from arbitrary ordered fields.
    ///
    /// The fields are not checked against the gateway's schema.
    pub fn build_payload_from_fields<K, V>(&self, fields: &[(K, V)]) -> Result<MpgData>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encrypted = self.encrypt_fields(fields)?;
        let sha = self.trade_sha(&encrypted);

        tracing::debug!(
            merchant_id = self.credentials.merchant_id(),
            trade_info_len = encrypted.len(),
            encrypt_type = %self.config.encrypt_type,
            "Built MPG payload"
        );

        Ok(MpgData::assemble(
            self.credentials.merchant_id(),
            self.config.encrypt_type,
            encrypted,
            sha,
            self.config.version.clone(),
        ))
    }

    /// Build the gateway payload for a trade.
    pub fn build_payload(&self, info: &TradeInfo) -> Result<MpgData> {
        if info.merchant_id != self.credentials.merchant_id() {
            tracing::warn!(
                trade_merchant_id = %info.merchant_id,
                merchant_id = self.credentials.merchant_id(),
                "TradeInfo MerchantID differs from the configured merchant"
            );
        }
        self.build_payload_from_fields(&info.to_fields())
    }

    /// Render the auto-submitting form for a payload.
    pub fn render_form(&self, data: &MpgData) -> String {
        render_form(&self.config.gateway_url, &data.to_fields())
    }

    /// Build the payload for a trade and render its checkout form.
    pub fn checkout_form(&self, info: &TradeInfo) -> Result<String> {
        let data = self.build_payload(info)?;
        Ok(self.render_form(&data))
    }

    /// Verify and decrypt a notification posted back by the gateway.
    pub fn decode_notification(&self, trade_info: &str, trade_sha: &str) -> Result<TradeNotification> {
        decode_notification(
            trade_info,
            trade_sha,
            self.credentials.hash_key(),
            self.credentials.hash_iv(),
        )
    }
}
