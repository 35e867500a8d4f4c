//! Cost and password length checks.
//!
//! Everything here is a pure check, run before any salt is drawn or any
//! key schedule is built so that bad parameters fail fast.

use serde::Serialize;

use crate::error::{BcryptError, Result};

/// Smallest accepted cost (2^4 expansion rounds).
pub const MIN_COST: u32 = 4;
/// Largest accepted cost (2^31 expansion rounds).
pub const MAX_COST: u32 = 31;
/// Cost used when the caller does not pick one.
pub const DEFAULT_COST: u32 = 12;
/// bcrypt keys are at most 72 bytes, NUL terminator included.
pub const MAX_PASSWORD_LEN: usize = 72;

/// A validated bcrypt cost factor.
///
/// The only way to get one is through [`Cost::new`] (or `Default`), so a
/// `Cost` reaching the key schedule is always inside
/// [`MIN_COST`]..=[`MAX_COST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cost(u32);

impl Default for Cost {
    fn default() -> Self {
        Self(DEFAULT_COST)
    }
}

impl Cost {
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(BcryptError::InvalidCost(cost));
        }
        Ok(Self(cost))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Number of expensive key expansion rounds, `2^cost`.
    pub fn rounds(&self) -> u64 {
        1u64 << self.0
    }
}

impl TryFrom<u32> for Cost {
    type Error = BcryptError;

    fn try_from(cost: u32) -> Result<Self> {
        Cost::new(cost)
    }
}

/// What to do with passwords longer than [`MAX_PASSWORD_LEN`] bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthPolicy {
    /// Fail with [`BcryptError::PasswordTooLong`].
    #[default]
    Reject,
    /// Ignore everything past byte 72, as classic bcrypt does.
    ///
    /// Two passwords sharing their first 72 bytes then hash identically;
    /// callers that need longer secrets should pre-hash them instead.
    Truncate,
}

/// Checks `password` against the 72-byte contract.
///
/// With [`LengthPolicy::Truncate`] the password is returned cut down to the
/// bytes the algorithm actually consumes.
pub fn validate_password(password: &[u8], policy: LengthPolicy) -> Result<&[u8]> {
    if password.len() <= MAX_PASSWORD_LEN {
        return Ok(password);
    }

    match policy {
        LengthPolicy::Reject => Err(BcryptError::PasswordTooLong {
            len: password.len(),
        }),
        LengthPolicy::Truncate => {
            tracing::warn!(
                len = password.len(),
                "password truncated to {MAX_PASSWORD_LEN} bytes"
            );
            Ok(&password[..MAX_PASSWORD_LEN])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_bounds_are_inclusive() {
        assert_eq!(Cost::new(MIN_COST).unwrap().get(), 4);
        assert_eq!(Cost::new(MAX_COST).unwrap().get(), 31);
        assert_eq!(Cost::new(3), Err(BcryptError::InvalidCost(3)));
        assert_eq!(Cost::new(32), Err(BcryptError::InvalidCost(32)));
        assert!(Cost::new(0).is_err());
    }

    #[test]
    fn cost_rounds() {
        assert_eq!(Cost::new(4).unwrap().rounds(), 16);
        assert_eq!(Cost::new(31).unwrap().rounds(), 1 << 31);
        assert_eq!(Cost::default().get(), DEFAULT_COST);
    }

    #[test]
    fn password_length_limit() {
        let ok = [b'a'; MAX_PASSWORD_LEN];
        assert_eq!(validate_password(&ok, LengthPolicy::Reject).unwrap().len(), 72);

        let long = [b'a'; MAX_PASSWORD_LEN + 1];
        assert_eq!(
            validate_password(&long, LengthPolicy::Reject),
            Err(BcryptError::PasswordTooLong { len: 73 })
        );
        assert_eq!(
            validate_password(&long, LengthPolicy::Truncate).unwrap(),
            &long[..72]
        );
    }

    #[test]
    fn empty_password_is_allowed() {
        assert!(validate_password(b"", LengthPolicy::Reject).unwrap().is_empty());
    }
}
