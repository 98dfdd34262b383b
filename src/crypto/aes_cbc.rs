//! AES-256-CBC encryption for the TradeInfo parameter.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::{MpgError, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// CBC initialization vector length in bytes.
pub const IV_LEN: usize = 16;

/// Take the key/IV material straight from the configured strings.
///
/// Only the first 32 bytes of the hash key are used; the hash IV must be
/// exactly 16 bytes. Neither is hex or base64 decoded.
pub(crate) fn key_material<'a>(key: &'a str, iv: &'a str) -> Result<(&'a [u8], &'a [u8])> {
    let key = key.as_bytes();
    if key.len() < KEY_LEN {
        return Err(MpgError::Crypto(format!(
            "hash key must be at least {} bytes, got {}",
            KEY_LEN,
            key.len()
        )));
    }
    let iv = iv.as_bytes();
    if iv.len() != IV_LEN {
        return Err(MpgError::Crypto(format!(
            "hash IV must be {} bytes, got {}",
            IV_LEN,
            iv.len()
        )));
    }
    Ok((&key[..KEY_LEN], iv))
}

/// Encrypt plaintext using AES-256-CBC with PKCS7 padding.
///
/// # Arguments
/// * `plaintext` - The text to encrypt (usually an encoded query string)
/// * `key` - Hash key, at least 32 bytes
/// * `iv` - Hash IV, exactly 16 bytes
///
/// # Returns
/// Uppercase hex of the encrypted bytes
pub fn encrypt_aes_cbc(plaintext: &str, key: &str, iv: &str) -> Result<String> {
    let (key, iv) = key_material(key, iv)?;

    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| MpgError::Crypto(format!("cipher setup failed: {}", e)))?;
    let encrypted = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    tracing::trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = encrypted.len(),
        "AES-256-CBC encrypted"
    );

    Ok(hex::encode_upper(encrypted))
}

/// Decrypt hex produced by [`encrypt_aes_cbc`] with the same key and IV.
///
/// Hex input is accepted in either case.
pub fn decrypt_aes_cbc(ciphertext: &str, key: &str, iv: &str) -> Result<String> {
    let (key, iv) = key_material(key, iv)?;

    let bytes = hex::decode(ciphertext)
        .map_err(|e| MpgError::Crypto(format!("malformed ciphertext hex: {}", e)))?;

    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| MpgError::Crypto(format!("cipher setup failed: {}", e)))?;
    let decrypted = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&bytes)
        .map_err(|_| MpgError::Crypto("decryption failed: bad padding or block length".to_string()))?;

    String::from_utf8(decrypted)
        .map_err(|e| MpgError::Encoding(format!("decrypted data is not UTF-8: {}", e)))
}
