//! bcrypt hash string handling.
//!
//! Hash string layout:
//! ```text
//! $ VARIANT $ COST (2 digits) $ SALT (22 chars) DIGEST (31 chars)
//! ```
//! The grammar is strict: anything that does not match it byte for byte is
//! rejected, never repaired.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::codec::{self, ENCODED_DIGEST_BYTES, ENCODED_DIGEST_LEN, ENCODED_SALT_LEN};
use crate::cost::Cost;
use crate::error::{BcryptError, Result};
use crate::salt::Salt;

mod variant;

pub use variant::Variant;

const COST_LEN: usize = 2;
/// Everything after `$<variant>$`: cost, `$`, salt and digest.
const BODY_LEN: usize = COST_LEN + 1 + ENCODED_SALT_LEN + ENCODED_DIGEST_LEN;

/// Renders `$<variant>$<cost>$<salt>`, the part of a hash that fixes its
/// parameters.
pub fn encode_header(variant: Variant, cost: Cost, salt: &Salt) -> String {
    format!(
        "${}${:02}${}",
        variant.tag(),
        cost.get(),
        codec::encode(salt.as_bytes())
    )
}

/// A parsed (or freshly computed) bcrypt hash.
#[derive(Clone, PartialEq, Eq)]
pub struct HashParts {
    variant: Variant,
    cost: Cost,
    salt: Salt,
    digest: [u8; ENCODED_DIGEST_BYTES],
}

impl HashParts {
    pub(crate) fn new(
        variant: Variant,
        cost: Cost,
        salt: Salt,
        digest: [u8; ENCODED_DIGEST_BYTES],
    ) -> Self {
        Self {
            variant,
            cost,
            salt,
            digest,
        }
    }

    /// Parses a hash string.
    ///
    /// # Errors
    ///
    /// Returns [`BcryptError::MalformedHash`] if:
    /// - The string does not start with `$` or has the wrong length
    /// - The variant tag is unknown
    /// - The cost is not exactly two digits or is out of range
    /// - The salt or digest contain characters outside the bcrypt alphabet
    pub fn parse(hash: &str) -> Result<Self> {
        if !hash.is_ascii() {
            return Err(BcryptError::malformed("non-ASCII characters"));
        }

        let rest = hash
            .strip_prefix('$')
            .ok_or_else(|| BcryptError::malformed("missing leading '$'"))?;
        let (tag, body) = rest
            .split_once('$')
            .ok_or_else(|| BcryptError::malformed("missing '$' after variant"))?;
        let variant = Variant::from_tag(tag)
            .ok_or_else(|| BcryptError::malformed(format!("unknown variant tag '{tag}'")))?;

        if body.len() != BODY_LEN {
            return Err(BcryptError::malformed(format!(
                "expected {} characters, got {}",
                1 + tag.len() + 1 + BODY_LEN,
                hash.len()
            )));
        }

        let (cost, body) = body.split_at(COST_LEN);
        if !cost.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BcryptError::malformed("cost must be two digits"));
        }
        let cost = cost
            .parse::<u32>()
            .map_err(|_| BcryptError::malformed("cost must be two digits"))?;
        let cost = Cost::new(cost)
            .map_err(|_| BcryptError::malformed(format!("cost {cost:02} out of range")))?;

        let body = body
            .strip_prefix('$')
            .ok_or_else(|| BcryptError::malformed("missing '$' after cost"))?;
        let (salt, digest) = body.split_at(ENCODED_SALT_LEN);

        let salt = codec::decode_salt(salt)
            .map_err(|_| BcryptError::malformed("salt is not valid bcrypt base64"))?;
        let digest = codec::decode_digest(digest)
            .map_err(|_| BcryptError::malformed("digest is not valid bcrypt base64"))?;

        Ok(Self::new(variant, cost, salt, digest))
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// The 23 digest bytes stored in the hash string.
    pub fn digest(&self) -> &[u8; ENCODED_DIGEST_BYTES] {
        &self.digest
    }

    pub fn header(&self) -> String {
        encode_header(self.variant, self.cost, &self.salt)
    }
}

impl fmt::Display for HashParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.header(), codec::encode(&self.digest))
    }
}

impl fmt::Debug for HashParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashParts")
            .field("variant", &self.variant)
            .field("cost", &self.cost.get())
            .field("salt", &self.salt)
            .finish_non_exhaustive()
    }
}

impl FromStr for HashParts {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self> {
        HashParts::parse(s)
    }
}

impl Serialize for HashParts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr {
            variant: &'static str,
            cost: Cost,
            rounds: u64,
            salt: String,
            digest: String,
        }

        Repr {
            variant: self.variant.tag(),
            cost: self.cost,
            rounds: self.cost.rounds(),
            salt: codec::encode(self.salt.as_bytes()),
            digest: codec::encode(&self.digest),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U_STAR_U: &str = "$2b$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    #[test]
    fn parse_and_render_roundtrip() {
        let parts = HashParts::parse(U_STAR_U).unwrap();

        assert_eq!(parts.variant(), Variant::B);
        assert_eq!(parts.cost().get(), 5);
        assert_eq!(parts.header(), "$2b$05$CCCCCCCCCCCCCCCCCCCCC.");
        assert_eq!(parts.to_string(), U_STAR_U);
        assert_eq!(U_STAR_U.len(), 60);
    }

    #[test]
    fn parses_legacy_tag() {
        let hash = "$2$05$CCCCCCCCCCCCCCCCCCCCC.s9E2NDMJ4Db1NbCC8JPhLL29bHiDQtK";
        let parts: HashParts = hash.parse().unwrap();

        assert_eq!(parts.variant(), Variant::Legacy);
        assert_eq!(parts.to_string(), hash);
        assert_eq!(hash.len(), 59);
    }

    #[test]
    fn encode_header_pads_cost() {
        let salt = Salt::from([0u8; 16]);
        let header = encode_header(Variant::Y, Cost::new(4).unwrap(), &salt);
        assert_eq!(header, "$2y$04$......................");
    }

    #[test]
    fn rejects_garbage() {
        assert!(HashParts::parse("not-a-hash").is_err());
        assert!(HashParts::parse("").is_err());
        assert!(HashParts::parse("$").is_err());
    }

    #[test]
    fn rejects_unknown_variant() {
        let hash = U_STAR_U.replacen("2b", "2c", 1);
        assert!(matches!(
            HashParts::parse(&hash),
            Err(BcryptError::MalformedHash(_))
        ));
    }

    #[test]
    fn rejects_bad_cost() {
        // one digit
        let hash = "$2b$5$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeWW";
        assert!(HashParts::parse(hash).is_err());
        // out of range
        assert!(HashParts::parse(&U_STAR_U.replacen("$05$", "$03$", 1)).is_err());
        assert!(HashParts::parse(&U_STAR_U.replacen("$05$", "$32$", 1)).is_err());
        // sign or letters
        assert!(HashParts::parse(&U_STAR_U.replacen("$05$", "$+5$", 1)).is_err());
        assert!(HashParts::parse(&U_STAR_U.replacen("$05$", "$0a$", 1)).is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(HashParts::parse(&U_STAR_U[..59]).is_err());
        assert!(HashParts::parse(&format!("{U_STAR_U}W")).is_err());
    }

    #[test]
    fn rejects_missing_separator() {
        let hash = U_STAR_U.replacen("$CCC", "CCCC", 1);
        assert!(HashParts::parse(&hash).is_err());
    }

    #[test]
    fn rejects_non_alphabet_characters() {
        let hash = U_STAR_U.replace('E', "+");
        assert!(HashParts::parse(&hash).is_err());

        let hash = U_STAR_U.replace('E', "é");
        assert!(HashParts::parse(&hash).is_err());
    }

    #[test]
    fn serializes_to_json() {
        let parts = HashParts::parse(U_STAR_U).unwrap();
        let json = serde_json::to_value(&parts).unwrap();

        assert_eq!(json["variant"], "2b");
        assert_eq!(json["cost"], 5);
        assert_eq!(json["rounds"], 32);
        assert_eq!(json["salt"], "CCCCCCCCCCCCCCCCCCCCC.");
    }
}
