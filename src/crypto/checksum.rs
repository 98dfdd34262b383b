//! TradeSha checksum over the encrypted trade info.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{MpgError, Result};

/// Compute the TradeSha for an encrypted TradeInfo string.
///
/// Uppercase hex of `SHA256("HashKey=" + key + "&" + trade_info + "&HashIV=" + iv)`.
pub fn trade_sha(trade_info: &str, key: &str, iv: &str) -> String {
    hex::encode_upper(trade_digest(trade_info, key, iv))
}

fn trade_digest(trade_info: &str, key: &str, iv: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"HashKey=");
    hasher.update(key.as_bytes());
    hasher.update(b"&");
    hasher.update(trade_info.as_bytes());
    hasher.update(b"&HashIV=");
    hasher.update(iv.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Check a received TradeSha against the TradeInfo it claims to cover.
///
/// Both sides are compared as raw digest bytes in constant time, so hex case
/// does not matter. A value that is not hex fails like any other mismatch.
pub fn verify_trade_sha(trade_info: &str, expected: &str, key: &str, iv: &str) -> Result<()> {
    let actual = trade_digest(trade_info, key, iv);
    let received = hex::decode(expected.trim()).unwrap_or_default();

    if bool::from(actual.as_slice().ct_eq(received.as_slice())) {
        Ok(())
    } else {
        tracing::warn!(received = expected, "TradeSha mismatch");
        Err(MpgError::ChecksumMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "12345678901234567890123456789012";
    const IV: &str = "1234567890123456";
    const TRADE_INFO: &str = "4F195F97AE581C790CC80C85037E7577688CA715089EEDD0239F0F5C33F66FED";

    #[test]
    fn test_trade_sha_known_vector() {
        assert_eq!(
            trade_sha(TRADE_INFO, KEY, IV),
            "89CAC1051A5313289E04EBE22E66BAE02ADF8C8F64C2B14C98D9038086E84133"
        );
    }

    #[test]
    fn test_trade_sha_matches_plain_concatenation() {
        let concatenated = format!("HashKey={}&{}&HashIV={}", KEY, TRADE_INFO, IV);
        let expected = hex::encode_upper(Sha256::digest(concatenated.as_bytes()));
        assert_eq!(trade_sha(TRADE_INFO, KEY, IV), expected);
    }

    #[test]
    fn test_trade_sha_single_character_changes() {
        let base = trade_sha(TRADE_INFO, KEY, IV);

        let key = "12345678901234567890123456789013";
        let iv = "1234567890123457";
        let mut info = TRADE_INFO.to_string();
        info.replace_range(0..1, "5");

        assert_ne!(trade_sha(TRADE_INFO, key, IV), base);
        assert_ne!(trade_sha(TRADE_INFO, KEY, iv), base);
        assert_ne!(trade_sha(&info, KEY, IV), base);
    }

    #[test]
    fn test_trade_sha_shape() {
        let sha = trade_sha("anything", KEY, IV);
        assert_eq!(sha.len(), 64);
        assert!(!sha.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_verify_trade_sha() {
        let sha = trade_sha(TRADE_INFO, KEY, IV);
        assert!(verify_trade_sha(TRADE_INFO, &sha, KEY, IV).is_ok());
        assert!(verify_trade_sha(TRADE_INFO, &sha.to_lowercase(), KEY, IV).is_ok());
        assert!(matches!(
            verify_trade_sha("00", &sha, KEY, IV),
            Err(MpgError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_verify_trade_sha_rejects_malformed_values() {
        let sha = trade_sha(TRADE_INFO, KEY, IV);

        for received in [
            "",
            &sha[..62],
            &sha[..63],
            "ZZCAC1051A5313289E04EBE22E66BAE02ADF8C8F64C2B14C98D9038086E84133",
        ] {
            assert!(matches!(
                verify_trade_sha(TRADE_INFO, received, KEY, IV),
                Err(MpgError::ChecksumMismatch)
            ));
        }

        let extended = format!("{}00", sha);
        assert!(matches!(
            verify_trade_sha(TRADE_INFO, &extended, KEY, IV),
            Err(MpgError::ChecksumMismatch)
        ));
    }
}
