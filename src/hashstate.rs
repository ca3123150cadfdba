//! Runtime-dispatched hashing
//!
//! [`HashState`] selects one of the [`crate::traits::Hash`] implementations
//! by [`HashId`] and exposes the operations the symmetric state needs:
//! multi-part hashing and the two/three-output HKDF. Outputs are written
//! into caller-provided buffers sized by [`crate::constants::MAX_HASH_LEN`];
//! only the first [`HashState::hash_len`] bytes are meaningful.

use zeroize::Zeroize;

use crate::bytearray::ByteArray;
use crate::crypto_impl::blake2::{Blake2b, Blake2s};
use crate::crypto_impl::sha::{Sha256, Sha512};
use crate::protocol::HashId;
use crate::traits::Hash;

/// Hash context bound to one algorithm
#[derive(Clone, Copy, Debug)]
pub struct HashState {
    hash: HashId,
}

impl HashState {
    pub(crate) fn new(hash: HashId) -> Self {
        Self { hash }
    }

    pub fn hash_id(&self) -> HashId {
        self.hash
    }

    /// Hash output length in bytes
    pub fn hash_len(&self) -> usize {
        match self.hash {
            HashId::Sha256 | HashId::Blake2s => 32,
            HashId::Sha512 | HashId::Blake2b => 64,
        }
    }

    /// Hash the concatenation of `parts` into the start of `out`
    pub fn hash_many(&self, parts: &[&[u8]], out: &mut [u8]) {
        match self.hash {
            HashId::Sha256 => hash_many_with::<Sha256>(parts, out),
            HashId::Sha512 => hash_many_with::<Sha512>(parts, out),
            HashId::Blake2s => hash_many_with::<Blake2s>(parts, out),
            HashId::Blake2b => hash_many_with::<Blake2b>(parts, out),
        }
    }

    /// Two-output HKDF into the starts of `out1` and `out2`
    pub fn hkdf2(&self, chaining_key: &[u8], ikm: &[u8], out1: &mut [u8], out2: &mut [u8]) {
        match self.hash {
            HashId::Sha256 => hkdf2_with::<Sha256>(chaining_key, ikm, out1, out2),
            HashId::Sha512 => hkdf2_with::<Sha512>(chaining_key, ikm, out1, out2),
            HashId::Blake2s => hkdf2_with::<Blake2s>(chaining_key, ikm, out1, out2),
            HashId::Blake2b => hkdf2_with::<Blake2b>(chaining_key, ikm, out1, out2),
        }
    }

    /// Three-output HKDF into the starts of `out1`, `out2` and `out3`
    pub fn hkdf3(
        &self,
        chaining_key: &[u8],
        ikm: &[u8],
        out1: &mut [u8],
        out2: &mut [u8],
        out3: &mut [u8],
    ) {
        match self.hash {
            HashId::Sha256 => hkdf3_with::<Sha256>(chaining_key, ikm, out1, out2, out3),
            HashId::Sha512 => hkdf3_with::<Sha512>(chaining_key, ikm, out1, out2, out3),
            HashId::Blake2s => hkdf3_with::<Blake2s>(chaining_key, ikm, out1, out2, out3),
            HashId::Blake2b => hkdf3_with::<Blake2b>(chaining_key, ikm, out1, out2, out3),
        }
    }
}

fn hash_many_with<H: Hash>(parts: &[&[u8]], out: &mut [u8]) {
    let mut h = H::default();
    for part in parts {
        h.input(part);
    }
    out[..H::hash_len()].copy_from_slice(h.result().as_slice());
}

fn hkdf2_with<H: Hash>(chaining_key: &[u8], ikm: &[u8], out1: &mut [u8], out2: &mut [u8]) {
    let (mut a, mut b) = H::hkdf(chaining_key, ikm);
    out1[..H::hash_len()].copy_from_slice(a.as_slice());
    out2[..H::hash_len()].copy_from_slice(b.as_slice());
    a.zeroize();
    b.zeroize();
}

fn hkdf3_with<H: Hash>(
    chaining_key: &[u8],
    ikm: &[u8],
    out1: &mut [u8],
    out2: &mut [u8],
    out3: &mut [u8],
) {
    let (mut a, mut b, mut c) = H::hkdf3(chaining_key, ikm);
    out1[..H::hash_len()].copy_from_slice(a.as_slice());
    out2[..H::hash_len()].copy_from_slice(b.as_slice());
    out3[..H::hash_len()].copy_from_slice(c.as_slice());
    a.zeroize();
    b.zeroize();
    c.zeroize();
}
