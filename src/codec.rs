//! bcrypt's radix-64 codec.
//!
//! Same bit packing as standard base64 but with the `./A-Za-z0-9` alphabet
//! and no padding. Decoding requires canonical input: unused trailing bits
//! of the last character must be zero, so every byte string has exactly
//! one encoding.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

use crate::error::{BcryptError, Result};
use crate::salt::{SALT_LEN, Salt};

/// Encoded length of a 16-byte salt.
pub const ENCODED_SALT_LEN: usize = 22;
/// Number of digest bytes kept in the hash string.
pub const ENCODED_DIGEST_BYTES: usize = 23;
/// Encoded length of the 23 kept digest bytes.
pub const ENCODED_DIGEST_LEN: usize = 31;

const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

pub fn encode(bytes: &[u8]) -> String {
    BCRYPT_B64.encode(bytes)
}

pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    BCRYPT_B64
        .decode(encoded)
        .map_err(|_| BcryptError::InvalidEncoding)
}

/// Decodes exactly [`ENCODED_SALT_LEN`] characters into a salt.
pub fn decode_salt(encoded: &str) -> Result<Salt> {
    if encoded.len() != ENCODED_SALT_LEN {
        return Err(BcryptError::InvalidEncoding);
    }
    let bytes: [u8; SALT_LEN] = decode(encoded)?
        .try_into()
        .map_err(|_| BcryptError::InvalidEncoding)?;
    Ok(Salt::from(bytes))
}

/// Decodes exactly [`ENCODED_DIGEST_LEN`] characters into the stored digest.
pub fn decode_digest(encoded: &str) -> Result<[u8; ENCODED_DIGEST_BYTES]> {
    if encoded.len() != ENCODED_DIGEST_LEN {
        return Err(BcryptError::InvalidEncoding);
    }
    decode(encoded)?
        .try_into()
        .map_err(|_| BcryptError::InvalidEncoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_bcrypt_alphabet() {
        assert_eq!(encode(&[0, 0, 0]), "....");
        assert_eq!(encode(&[0xff, 0xff, 0xff]), "9999");
        assert_eq!(decode("..").unwrap(), vec![0]);
    }

    #[test]
    fn known_salt_encoding() {
        let salt = decode_salt("/OK.fbVrR/bpIqNJ5ianF.").unwrap();
        assert_eq!(
            salt.as_bytes(),
            &[
                0x05, 0x03, 0x00, 0x85, 0xd5, 0xed, 0x4c, 0x17, 0x6b, 0x2a, 0xc3, 0xcb, 0xee,
                0x47, 0x29, 0x1c
            ]
        );
        assert_eq!(encode(salt.as_bytes()), "/OK.fbVrR/bpIqNJ5ianF.");
    }

    #[test]
    fn fixed_lengths() {
        assert_eq!(encode(&[7u8; SALT_LEN]).len(), ENCODED_SALT_LEN);
        assert_eq!(
            encode(&[7u8; ENCODED_DIGEST_BYTES]).len(),
            ENCODED_DIGEST_LEN
        );
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(decode("ab+d"), Err(BcryptError::InvalidEncoding));
        assert_eq!(decode("ab=="), Err(BcryptError::InvalidEncoding));
        assert!(decode_salt("CCCCCCCCCCCCCCCCCCCC-.").is_err());
    }

    #[test]
    fn rejects_non_canonical_trailing_bits() {
        // 'C' carries bits past the 16th byte
        assert!(decode_salt("CCCCCCCCCCCCCCCCCCCCCC").is_err());
        assert!(decode_salt("CCCCCCCCCCCCCCCCCCCCC.").is_ok());
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert!(decode_salt("CCCCCCCCCCCCCCCCCCCCC").is_err());
        assert!(decode_digest("E5YPO9kmyuRGyh0XouQYb4YMJKvyOe").is_err());
        assert!(decode_digest("E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW").is_ok());
    }
}
