//! Cryptography for the MPG TradeInfo / TradeSha parameters.

mod aes_cbc;
mod checksum;

pub use aes_cbc::{decrypt_aes_cbc, encrypt_aes_cbc, IV_LEN, KEY_LEN};
pub use checksum::{trade_sha, verify_trade_sha};

pub(crate) use aes_cbc::key_material;

use crate::error::{MpgError, Result};
use crate::models::EncryptType;

/// Encrypt an encoded query string with the cipher selected by `encrypt_type`.
pub fn encrypt_trade_info(
    query: &str,
    encrypt_type: EncryptType,
    key: &str,
    iv: &str,
) -> Result<String> {
    match encrypt_type {
        EncryptType::AesCbcPkcs7 => encrypt_aes_cbc(query, key, iv),
        // Refuse rather than send CBC output under the GCM flag.
        EncryptType::AesGcm => Err(MpgError::UnsupportedEncryption(encrypt_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "12345678901234567890123456789012";
    const IV: &str = "1234567890123456";

    #[test]
    fn test_encrypt_trade_info_cbc() {
        let encrypted =
            encrypt_trade_info("MerchantID=test&Amt=100", EncryptType::AesCbcPkcs7, KEY, IV)
                .unwrap();
        assert_eq!(
            encrypted,
            encrypt_aes_cbc("MerchantID=test&Amt=100", KEY, IV).unwrap()
        );
    }

    #[test]
    fn test_encrypt_trade_info_gcm_not_implemented() {
        let err = encrypt_trade_info("MerchantID=test", EncryptType::AesGcm, KEY, IV).unwrap_err();
        assert!(matches!(
            err,
            MpgError::UnsupportedEncryption(EncryptType::AesGcm)
        ));
    }
}
