//! # newebpay-mpg
//!
//! A Rust integration helper for the Newebpay MPG (hosted payment page) gateway.
//!
//! ## Features
//!
//! - **TradeInfo encryption**: Encodes the trade record as the gateway's query
//!   string and encrypts it with AES-256-CBC using the merchant's hash key and IV.
//! - **TradeSha checksum**: Binds the ciphertext to the shared secret with SHA-256.
//! - **Checkout form**: Renders an escaped, auto-submitting HTML form that sends
//!   the payer's browser to the gateway.
//! - **Notifications**: Verifies and decrypts the gateway's NotifyURL / ReturnURL posts.
//!
//! ## Quick Start
//!
//! ```
//! use newebpay_mpg::{Credentials, Mpg, TradeInfo};
//!
//! fn main() -> newebpay_mpg::Result<()> {
//!     let mpg = Mpg::builder(Credentials::new(
//!         "MS123456",
//!         "12345678901234567890123456789012",
//!         "1234567890123456",
//!     ))
//!     .build()?;
//!
//!     let info = TradeInfo::builder("MS123456", "ORDER_20240101_001", 1500, "Test item")
//!         .notify_url("https://shop.example.com/newebpay/notify")
//!         .credit(true)
//!         .build()?;
//!
//!     let payload = mpg.build_payload(&info)?;
//!     println!("TradeInfo: {}", payload.trade_info);
//!     println!("TradeSha: {}", payload.trade_sha);
//!
//!     let html = mpg.render_form(&payload);
//!     assert!(html.starts_with("<form"));
//!     Ok(())
//! }
//! ```
//!
//! ## Encryption modes
//!
//! Only `EncryptType::AesCbcPkcs7` is implemented. A client configured with
//! `EncryptType::AesGcm` returns `MpgError::UnsupportedEncryption` instead of
//! sending CBC ciphertext under the GCM flag.

#![allow(missing_docs)]

pub mod callback;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod form;
pub mod models;
pub mod query;
pub mod trade_info;

// Re-exports for convenience
pub use callback::{CreditDetails, TradeNotification, TradeResult};
pub use client::{Mpg, MpgBuilder};
pub use config::{Credentials, MpgConfig};
pub use error::{MpgError, Result};
pub use models::{EncryptType, LangType, MpgData, RespondType};
pub use trade_info::{TradeInfo, TradeInfoBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_type_display() {
        assert_eq!(EncryptType::AesCbcPkcs7.to_string(), "0");
        assert_eq!(EncryptType::AesGcm.to_string(), "1");
    }
}
