//! The EksBlowfish core.
//!
//! Expensive key setup followed by 64 rounds of ECB encryption of a fixed
//! magic string. Inputs arriving here have already been validated; a bad
//! length at this point is a bug upstream and panics.

mod blowfish;
mod tables;

use zeroize::Zeroizing;

use crate::cost::{Cost, MAX_PASSWORD_LEN};
use crate::format::Variant;
use crate::salt::Salt;

use blowfish::{KeySchedule, key_words};

/// Length of the raw digest (three 64-bit blocks).
pub const DIGEST_LEN: usize = 24;

/// Plaintext encrypted with the final key schedule.
const MAGIC: &[u8; DIGEST_LEN] = b"OrpheanBeholderScryDoubt";
const MAGIC_ROUNDS: usize = 64;

/// Turns a password into the byte string fed to the key schedule.
///
/// The NUL terminator is appended for every variant but `$2$`, then the
/// whole thing is capped at 72 bytes. A `$2$` empty password still reads
/// its terminator.
pub(crate) fn key_material(password: &[u8], variant: Variant) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(MAX_PASSWORD_LEN + 1));
    key.extend_from_slice(password);
    if variant.appends_nul() || key.is_empty() {
        key.push(0);
    }
    key.truncate(MAX_PASSWORD_LEN);
    key
}

/// Runs EksBlowfishSetup and returns the full 24-byte digest.
pub(crate) fn bcrypt_raw(
    cost: Cost,
    salt: &Salt,
    key: &[u8],
    variant: Variant,
) -> [u8; DIGEST_LEN] {
    assert!(
        !key.is_empty() && key.len() <= MAX_PASSWORD_LEN,
        "key material must be 1..={MAX_PASSWORD_LEN} bytes, got {}",
        key.len()
    );

    let key = Zeroizing::new(key_words(key, variant.sign_extends()));
    let salt_key = key_words(salt.as_bytes(), false);
    let salt_block: [u32; 4] = [salt_key[0], salt_key[1], salt_key[2], salt_key[3]];

    let mut state = KeySchedule::new();
    state.expand_key_with_salt(&key, &salt_block);
    for _ in 0..cost.rounds() {
        state.expand_key(&key);
        state.expand_key(&salt_key);
    }

    let mut words = [0u32; DIGEST_LEN / 4];
    for (word, chunk) in words.iter_mut().zip(MAGIC.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for block in words.chunks_exact_mut(2) {
        let (mut l, mut r) = (block[0], block[1]);
        for _ in 0..MAGIC_ROUNDS {
            (l, r) = state.encrypt_block(l, r);
        }
        block[0] = l;
        block[1] = r;
    }

    let mut digest = [0u8; DIGEST_LEN];
    for (out, word) in digest.chunks_exact_mut(4).zip(words) {
        out.copy_from_slice(&word.to_be_bytes());
    }
    digest
}
