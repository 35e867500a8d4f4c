use std::fmt;
use std::str::FromStr;

use crate::error::BcryptError;

/// The `$2?$` tag at the front of a bcrypt hash.
///
/// All five tags verify. They differ only in how the password is turned
/// into key material:
///
/// - `$2$` does not append the NUL terminator to the password.
/// - `$2x$` packs password bytes with sign extension, reproducing the old
///   crypt_blowfish bug for bytes >= 0x80.
/// - `$2a$`, `$2b$` and `$2y$` are the corrected algorithm. With passwords
///   capped at 72 bytes they produce identical digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    Legacy,
    A,
    #[default]
    B,
    X,
    Y,
}

impl Variant {
    pub fn tag(&self) -> &'static str {
        match self {
            Variant::Legacy => "2",
            Variant::A => "2a",
            Variant::B => "2b",
            Variant::X => "2x",
            Variant::Y => "2y",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "2" => Some(Variant::Legacy),
            "2a" => Some(Variant::A),
            "2b" => Some(Variant::B),
            "2x" => Some(Variant::X),
            "2y" => Some(Variant::Y),
            _ => None,
        }
    }

    /// Whether the key stream ends with the password's NUL terminator.
    pub(crate) fn appends_nul(&self) -> bool {
        !matches!(self, Variant::Legacy)
    }

    /// Whether key bytes are sign-extended when packed into words.
    pub(crate) fn sign_extends(&self) -> bool {
        matches!(self, Variant::X)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Variant {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim_matches('$');
        Variant::from_tag(tag)
            .ok_or_else(|| BcryptError::malformed(format!("unknown variant tag '{tag}'")))
    }
}
