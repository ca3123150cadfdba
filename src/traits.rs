//! Common traits implemented by the concrete crypto algorithms
//!
//! The handshake engine itself never names a concrete algorithm; it goes
//! through the runtime dispatch wrappers in [`crate::dhstate`],
//! [`crate::cipherstate`] and [`crate::hashstate`], which in turn select one
//! of the implementations of these traits.

pub use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::bytearray::ByteArray;
use crate::constants::{MAX_KEY_LEN, MAX_TAG_LEN};
use crate::error::HandshakeResult;
use crate::KeyPair;

/// Common trait for all crypto components
pub trait CryptoComponent {
    /// Name of this algorithm as it appears in protocol names
    fn name() -> &'static str;
}

/// Common trait for compatible RNG sources
///
/// Automatically implemented for all types that implement:
/// * [`RngCore`]
/// * [`CryptoRng`]
pub trait Rng: RngCore + CryptoRng {}

/// Automatic implementation for all supported types
impl<T: RngCore + CryptoRng> Rng for T {}

/// Common trait for all Diffie-Hellman groups
pub trait Dh: CryptoComponent {
    /// Private key type
    type SecretKey: ByteArray;
    /// Public key type
    type PubKey: ByteArray;
    /// Shared secret type
    type Output: ByteArray;

    /// Generate a keypair
    fn genkey<R: Rng>(rng: &mut R) -> KeyPair<Self::PubKey, Self::SecretKey>;

    /// Derive the public key from the given private key
    fn pubkey(secret: &Self::SecretKey) -> Self::PubKey;

    /// Perform DH key exchange
    fn dh(secret: &Self::SecretKey, public: &Self::PubKey) -> Self::Output;
}

/// Common trait for all AEAD cipher algorithms
pub trait Cipher: CryptoComponent {
    /// Cipher key type
    type Key: ByteArray;

    /// Key length
    fn key_len() -> usize {
        Self::Key::len()
    }

    /// Cipher tag length
    fn tag_len() -> usize;

    /// In-place AEAD encryption
    ///
    /// Encrypts `plaintext_len` bytes at the start of `in_out` using the
    /// supplied nonce and associated data, appending the authentication tag.
    /// Returns the ciphertext length including the tag.
    ///
    /// # Panics
    /// If `in_out.len()` < `plaintext_len` + [`Self::tag_len`]
    fn encrypt_in_place(
        k: &Self::Key,
        nonce: u64,
        ad: &[u8],
        in_out: &mut [u8],
        plaintext_len: usize,
    ) -> usize;

    /// In-place AEAD decryption
    ///
    /// Decrypts `ciphertext_len` bytes at the start of `in_out` using the
    /// supplied nonce and associated data, verifying the trailing tag.
    /// Returns the plaintext length on success.
    ///
    /// # Panics
    /// If `in_out.len()` < `ciphertext_len` or
    /// `ciphertext_len` < [`Self::tag_len`]
    fn decrypt_in_place(
        k: &Self::Key,
        nonce: u64,
        ad: &[u8],
        in_out: &mut [u8],
        ciphertext_len: usize,
    ) -> HandshakeResult<usize>;

    /// Derive a replacement key as per Noise spec section 4.2
    fn rekey(k: &Self::Key) -> Self::Key {
        let mut buf = [0u8; MAX_KEY_LEN + MAX_TAG_LEN];
        Self::encrypt_in_place(
            k,
            u64::MAX,
            &[],
            &mut buf[..Self::key_len() + Self::tag_len()],
            Self::key_len(),
        );
        let k_out = Self::Key::from_slice(&buf[..Self::key_len()]);
        buf.zeroize();

        k_out
    }
}

/// Common trait for all hash algorithms
pub trait Hash: CryptoComponent + Default {
    /// Hash block type
    type Block: ByteArray;
    /// Hash output type
    type Output: ByteArray;

    /// Hash block length
    fn block_len() -> usize {
        Self::Block::len()
    }

    /// Hash output length in bytes
    fn hash_len() -> usize {
        Self::Output::len()
    }

    /// Update hash state with bytes
    fn input(&mut self, data: &[u8]);

    /// Finalize and produce the hash result
    fn result(self) -> Self::Output;

    /// One-shot hash of the given bytes
    fn hash(data: &[u8]) -> Self::Output {
        let mut h = Self::default();
        h.input(data);
        h.result()
    }

    /// Calculate HMAC over the concatenation of `data` parts
    fn hmac_many(key: &[u8], data: &[&[u8]]) -> Self::Output {
        assert!(key.len() <= Self::block_len());

        let mut ipad = Self::Block::new_with(0x36);
        let mut opad = Self::Block::new_with(0x5c);

        for (i, b) in key.iter().enumerate() {
            ipad.as_mut()[i] ^= b;
            opad.as_mut()[i] ^= b;
        }

        let mut inner = Self::default();
        inner.input(ipad.as_slice());
        for d in data {
            inner.input(d);
        }
        let inner_result = inner.result();

        let mut outer = Self::default();
        outer.input(opad.as_slice());
        outer.input(inner_result.as_slice());
        let out = outer.result();

        ipad.zeroize();
        opad.zeroize();
        out
    }

    /// Calculate HMAC with the given key and message
    fn hmac(key: &[u8], data: &[u8]) -> Self::Output {
        Self::hmac_many(key, &[data])
    }

    /// Two-output HKDF as defined by the Noise specification
    fn hkdf(chaining_key: &[u8], input_key_material: &[u8]) -> (Self::Output, Self::Output) {
        let mut temp_key = Self::hmac(chaining_key, input_key_material);
        let out1 = Self::hmac(temp_key.as_slice(), &[1u8]);
        let out2 = Self::hmac_many(temp_key.as_slice(), &[out1.as_slice(), &[2u8]]);
        temp_key.zeroize();
        (out1, out2)
    }

    /// Three-output HKDF as defined by the Noise specification
    fn hkdf3(
        chaining_key: &[u8],
        input_key_material: &[u8],
    ) -> (Self::Output, Self::Output, Self::Output) {
        let mut temp_key = Self::hmac(chaining_key, input_key_material);
        let out1 = Self::hmac(temp_key.as_slice(), &[1u8]);
        let out2 = Self::hmac_many(temp_key.as_slice(), &[out1.as_slice(), &[2u8]]);
        let out3 = Self::hmac_many(temp_key.as_slice(), &[out2.as_slice(), &[3u8]]);
        temp_key.zeroize();
        (out1, out2, out3)
    }
}
