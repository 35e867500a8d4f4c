//! Hash and verify.

use std::fmt;
use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::codec::ENCODED_DIGEST_BYTES;
use crate::cost::{Cost, LengthPolicy, validate_password};
use crate::crypto::{self, DIGEST_LEN};
use crate::error::Result;
use crate::format::{HashParts, Variant};
use crate::salt::{OsSalt, Salt, SaltSource};

/// Configured bcrypt hasher.
///
/// Holds no per-call state; the key schedule is built inside every call, so
/// one `Hasher` can be cloned or shared across threads freely.
#[derive(Clone)]
pub struct Hasher {
    cost: Cost,
    variant: Variant,
    policy: LengthPolicy,
    salts: Arc<dyn SaltSource>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self {
            cost: Cost::default(),
            variant: Variant::default(),
            policy: LengthPolicy::default(),
            salts: Arc::new(OsSalt),
        }
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("cost", &self.cost)
            .field("variant", &self.variant)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Hasher {
    pub fn new(cost: Cost) -> Self {
        Self::default().with_cost(cost)
    }

    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = cost;
        self
    }

    /// Variant tag written into new hashes. Verification always follows the
    /// tag of the hash being checked.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_length_policy(mut self, policy: LengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_salt_source(mut self, salts: impl SaltSource + 'static) -> Self {
        self.salts = Arc::new(salts);
        self
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn length_policy(&self) -> LengthPolicy {
        self.policy
    }

    /// Hashes `password` with a salt drawn from the configured source.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The password is longer than 72 bytes under [`LengthPolicy::Reject`]
    /// - The salt source cannot produce randomness
    pub fn hash(&self, password: impl AsRef<[u8]>) -> Result<HashParts> {
        let password = validate_password(password.as_ref(), self.policy)?;
        let salt = self.salts.fill_salt()?;
        Ok(self.compute(password, salt))
    }

    /// Hashes `password` with a caller-chosen salt. Same inputs always give
    /// the same hash.
    pub fn hash_with_salt(&self, password: impl AsRef<[u8]>, salt: Salt) -> Result<HashParts> {
        let password = validate_password(password.as_ref(), self.policy)?;
        Ok(self.compute(password, salt))
    }

    /// Checks `password` against an encoded hash.
    ///
    /// Returns `Ok(false)` for a wrong password and an error for a hash that
    /// does not parse, so corrupted data is never mistaken for a failed login.
    pub fn verify(&self, password: impl AsRef<[u8]>, hash: &str) -> Result<bool> {
        let expected = HashParts::parse(hash)?;
        self.verify_parts(password, &expected)
    }

    pub fn verify_parts(&self, password: impl AsRef<[u8]>, expected: &HashParts) -> Result<bool> {
        let password = validate_password(password.as_ref(), self.policy)?;

        tracing::debug!(
            variant = %expected.variant(),
            cost = expected.cost().get(),
            "verifying bcrypt hash"
        );

        let raw = derive(password, expected.variant(), expected.cost(), expected.salt());
        let matched = raw[..ENCODED_DIGEST_BYTES].ct_eq(expected.digest());
        Ok(matched.into())
    }

    fn compute(&self, password: &[u8], salt: Salt) -> HashParts {
        tracing::debug!(variant = %self.variant, cost = self.cost.get(), "computing bcrypt hash");

        let raw = derive(password, self.variant, self.cost, &salt);
        let mut digest = [0u8; ENCODED_DIGEST_BYTES];
        digest.copy_from_slice(&raw[..ENCODED_DIGEST_BYTES]);
        HashParts::new(self.variant, self.cost, salt, digest)
    }
}

fn derive(password: &[u8], variant: Variant, cost: Cost, salt: &Salt) -> [u8; DIGEST_LEN] {
    let key = crypto::key_material(password, variant);
    crypto::bcrypt_raw(cost, salt, &key, variant)
}
