//! bcrypt password hashing.
//!
//! ```no_run
//! let hash = rsbcrypt::hash("correct horse", rsbcrypt::DEFAULT_COST)?;
//! assert!(rsbcrypt::verify("correct horse", &hash)?);
//! # Ok::<(), rsbcrypt::BcryptError>(())
//! ```
//!
//! Passwords longer than 72 bytes are rejected unless a [`Hasher`] is built
//! with [`LengthPolicy::Truncate`]; bcrypt never reads past byte 72.

pub mod codec;
mod cost;
mod crypto;
pub mod dispatch;
mod error;
mod format;
mod hasher;
mod salt;

pub use crate::cost::{
    Cost, DEFAULT_COST, LengthPolicy, MAX_COST, MAX_PASSWORD_LEN, MIN_COST, validate_password,
};
pub use crate::crypto::DIGEST_LEN;
pub use crate::dispatch::{
    AsyncHasher, AutoSpawner, Pending, PendingHash, PendingVerify, Spawn, ThreadSpawner,
    TokioSpawner,
};
pub use crate::error::{BcryptError, Result};
pub use crate::format::{HashParts, Variant, encode_header};
pub use crate::hasher::Hasher;
pub use crate::salt::{FixedSalt, OsSalt, SALT_LEN, Salt, SaltSource, generate_salt};

/// Hashes `password` at `cost` with a fresh random salt, `$2b$` tagged.
pub fn hash(password: impl AsRef<[u8]>, cost: u32) -> Result<String> {
    let hasher = Hasher::new(Cost::new(cost)?);
    Ok(hasher.hash(password)?.to_string())
}

/// Hashes `password` with a caller-supplied salt.
pub fn hash_with_salt(password: impl AsRef<[u8]>, cost: u32, salt: Salt) -> Result<HashParts> {
    Hasher::new(Cost::new(cost)?).hash_with_salt(password, salt)
}

/// Checks `password` against `hash`.
///
/// `Ok(false)` means the password is wrong; a hash that does not parse is an
/// error.
pub fn verify(password: impl AsRef<[u8]>, hash: &str) -> Result<bool> {
    Hasher::default().verify(password, hash)
}

/// [`hash`] off the calling thread: on the tokio blocking pool when a runtime
/// is running, otherwise on a fresh worker thread.
pub async fn hash_async(password: impl Into<Vec<u8>>, cost: u32) -> Result<String> {
    let hasher = AsyncHasher::new(Hasher::new(Cost::new(cost)?));
    Ok(hasher.hash(password).await?.to_string())
}

/// [`verify`] off the calling thread, dispatched like [`hash_async`].
pub async fn verify_async(password: impl Into<Vec<u8>>, hash: impl Into<String>) -> Result<bool> {
    AsyncHasher::new(Hasher::default())
        .verify(password, hash)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verify_roundtrip() {
        let hash = hash("pw", MIN_COST).unwrap();
        assert!(verify("pw", &hash).unwrap());
        assert!(!verify("wp", &hash).unwrap());
    }

    #[test]
    fn cost_out_of_range_fails() {
        assert_eq!(hash("pw", 3), Err(BcryptError::InvalidCost(3)));
        assert_eq!(hash("pw", 32), Err(BcryptError::InvalidCost(32)));
    }

    #[test]
    fn password_of_73_bytes_fails() {
        let password = "x".repeat(73);
        assert_eq!(
            hash(&password, MIN_COST),
            Err(BcryptError::PasswordTooLong { len: 73 })
        );
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(matches!(
            verify("pw", "not-a-hash"),
            Err(BcryptError::MalformedHash(_))
        ));
    }

    #[test]
    fn hash_with_salt_is_deterministic() {
        let salt = Salt::from([1u8; SALT_LEN]);
        let a = hash_with_salt("pw", 4, salt).unwrap();
        let b = hash_with_salt("pw", 4, salt).unwrap();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn verify_accepts_every_variant_tag() {
        let salt = Salt::from([3u8; SALT_LEN]);
        for variant in [
            Variant::Legacy,
            Variant::A,
            Variant::B,
            Variant::X,
            Variant::Y,
        ] {
            let hash = Hasher::new(Cost::new(4).unwrap())
                .with_variant(variant)
                .hash_with_salt("pw", salt)
                .unwrap()
                .to_string();
            assert!(verify("pw", &hash).unwrap(), "{hash}");
        }
    }

    #[tokio::test]
    async fn async_roundtrip() {
        let hash = hash_async("pw", MIN_COST).await.unwrap();
        assert!(verify_async("pw", hash.clone()).await.unwrap());
        assert!(!verify_async("nope", hash).await.unwrap());
    }

    #[tokio::test]
    async fn async_rejects_bad_cost_before_dispatch() {
        assert_eq!(
            hash_async("pw", 40).await,
            Err(BcryptError::InvalidCost(40))
        );
    }
}
