use zeroize::Zeroize;

use super::tables::{INIT_P, INIT_S};

/// Number of subkeys in the P-array.
pub(crate) const P_LEN: usize = 18;
/// Words in each of the four S-boxes.
const S_LEN: usize = 256;

/// Packed key material, one word per P-array entry.
pub(crate) type KeyWords = [u32; P_LEN];

/// Blowfish working state.
///
/// Built fresh for every hash or verify call and wiped when dropped; it is
/// never shared between calls.
pub(crate) struct KeySchedule {
    p: [u32; P_LEN],
    s: [[u32; S_LEN]; 4],
}

impl Drop for KeySchedule {
    fn drop(&mut self) {
        self.p.zeroize();
        self.s.zeroize();
    }
}

impl KeySchedule {
    /// The standard initial state (digits of pi).
    pub(crate) fn new() -> Self {
        Self {
            p: INIT_P,
            s: INIT_S,
        }
    }

    #[inline(always)]
    fn f(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();
        (self.s[0][a as usize].wrapping_add(self.s[1][b as usize]) ^ self.s[2][c as usize])
            .wrapping_add(self.s[3][d as usize])
    }

    /// Encrypts one 64-bit block held as two big-endian halves.
    #[inline]
    pub(crate) fn encrypt_block(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        for i in (0..16).step_by(2) {
            l ^= self.p[i];
            r ^= self.f(l);
            r ^= self.p[i + 1];
            l ^= self.f(r);
        }
        l ^= self.p[16];
        r ^= self.p[17];
        (r, l)
    }

    /// Standard Blowfish key schedule on top of the current state.
    pub(crate) fn expand_key(&mut self, key: &KeyWords) {
        self.xor_key(key);
        self.mix(None);
    }

    /// Key schedule variant that folds the salt into the running block
    /// before every encryption.
    pub(crate) fn expand_key_with_salt(&mut self, key: &KeyWords, salt: &[u32; 4]) {
        self.xor_key(key);
        self.mix(Some(salt));
    }

    fn xor_key(&mut self, key: &KeyWords) {
        for (p, k) in self.p.iter_mut().zip(key) {
            *p ^= k;
        }
    }

    /// Replaces every P and S entry, in order, with successive encryptions
    /// of a block that starts at zero.
    fn mix(&mut self, salt: Option<&[u32; 4]>) {
        let (mut l, mut r) = (0u32, 0u32);
        let mut j = 0;

        let mut next = |state: &Self, l: u32, r: u32| -> (u32, u32) {
            match salt {
                Some(salt) => {
                    let block = state.encrypt_block(l ^ salt[j], r ^ salt[j + 1]);
                    j = (j + 2) % salt.len();
                    block
                }
                None => state.encrypt_block(l, r),
            }
        };

        for i in (0..P_LEN).step_by(2) {
            (l, r) = next(&*self, l, r);
            self.p[i] = l;
            self.p[i + 1] = r;
        }

        for b in 0..4 {
            for i in (0..S_LEN).step_by(2) {
                (l, r) = next(&*self, l, r);
                self.s[b][i] = l;
                self.s[b][i + 1] = r;
            }
        }
    }
}

/// Packs `key` into [`P_LEN`] big-endian words, cycling through it.
///
/// With `sign_extend` each byte is widened as a signed char before being
/// ORed in, which is the `$2x$` behaviour.
pub(crate) fn key_words(key: &[u8], sign_extend: bool) -> KeyWords {
    assert!(!key.is_empty(), "empty key reached the key schedule");

    let mut words = [0u32; P_LEN];
    let mut pos = 0;
    for word in words.iter_mut() {
        for _ in 0..4 {
            let byte = if sign_extend {
                key[pos] as i8 as u32
            } else {
                u32::from(key[pos])
            };
            *word = (*word << 8) | byte;
            pos = (pos + 1) % key.len();
        }
    }
    words
}
