use std::fmt;

use crate::cost::{MAX_COST, MAX_PASSWORD_LEN, MIN_COST};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcryptError {
    InvalidCost(u32),
    PasswordTooLong { len: usize },
    MalformedHash(String),
    InvalidEncoding,
    EntropyUnavailable,
    TaskDropped,
    SpawnFailed(String),
}

impl BcryptError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        BcryptError::MalformedHash(reason.into())
    }
}

impl fmt::Display for BcryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcryptError::InvalidCost(c) => {
                write!(f, "hash cost {c} out of range [{MIN_COST},{MAX_COST}]")
            }
            BcryptError::PasswordTooLong { len } => write!(
                f,
                "password is {len} bytes, bcrypt only uses the first {MAX_PASSWORD_LEN}"
            ),
            BcryptError::MalformedHash(reason) => write!(f, "malformed bcrypt hash: {reason}"),
            BcryptError::InvalidEncoding => write!(f, "invalid bcrypt base64 encoding"),
            BcryptError::EntropyUnavailable => write!(f, "OS random generator unavailable"),
            BcryptError::TaskDropped => write!(f, "hash task dropped before completing"),
            BcryptError::SpawnFailed(reason) => write!(f, "could not start hash task: {reason}"),
        }
    }
}

impl std::error::Error for BcryptError {}

pub type Result<T> = std::result::Result<T, BcryptError>;
