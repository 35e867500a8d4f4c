//! Salt generation.
//!
//! Randomness is reached through the [`SaltSource`] capability so callers
//! (and tests) can swap the OS generator for a fixed salt without touching
//! any global state.

use std::fmt;

use getrandom::fill;

use crate::error::{BcryptError, Result};

/// Length of a bcrypt salt (16 bytes).
pub const SALT_LEN: usize = 16;

/// 16 raw salt bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl From<[u8; SALT_LEN]> for Salt {
    fn from(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Salt {
    type Error = BcryptError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SALT_LEN] = bytes
            .try_into()
            .map_err(|_| BcryptError::malformed(format!("salt must be {SALT_LEN} bytes")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", crate::codec::encode(&self.0))
    }
}

/// Where salts come from.
pub trait SaltSource: Send + Sync {
    fn fill_salt(&self) -> Result<Salt>;
}

/// Draws salts from the operating system CSPRNG.
///
/// Every call reads fresh bytes, so concurrent callers never share or
/// correlate salts. A failing generator is reported as
/// [`BcryptError::EntropyUnavailable`]; there is no fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSalt;

impl SaltSource for OsSalt {
    fn fill_salt(&self) -> Result<Salt> {
        let mut salt = [0u8; SALT_LEN];
        fill(&mut salt).map_err(|_| BcryptError::EntropyUnavailable)?;
        Ok(Salt(salt))
    }
}

/// Always hands out the same salt. Meant for reproducible hashes in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSalt(pub Salt);

impl SaltSource for FixedSalt {
    fn fill_salt(&self) -> Result<Salt> {
        Ok(self.0)
    }
}

/// Draws a fresh salt from the OS CSPRNG.
///
/// Fails with [`BcryptError::EntropyUnavailable`] if the OS generator cannot
/// be read; there is no weaker fallback.
pub fn generate_salt() -> Result<Salt> {
    OsSalt.fill_salt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_salts_differ() {
        let a = generate_salt().unwrap();
        let b = generate_salt().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fixed_salt_is_stable() {
        let salt = Salt::from([9u8; SALT_LEN]);
        let source = FixedSalt(salt);
        assert_eq!(source.fill_salt().unwrap(), salt);
        assert_eq!(source.fill_salt().unwrap(), salt);
    }

    #[test]
    fn salt_from_slice_checks_length() {
        assert!(Salt::try_from(&[0u8; 15][..]).is_err());
        assert!(Salt::try_from(&[0u8; 16][..]).is_ok());
    }
}
