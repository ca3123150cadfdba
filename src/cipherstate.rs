//! Cipherstate implementation
//!
//! [`CipherState`] pairs an AEAD algorithm with an optional key and the
//! 64-bit Noise nonce counter. During the handshake it lives inside the
//! symmetric state; after the split the two derived instances protect the
//! transport phase. The nonce auto-increments and the state signals an
//! error on every call once the counter has been exhausted.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::bytearray::{ByteArray, SensitiveByteArray};
use crate::constants::MAX_KEY_LEN;
use crate::crypto_impl::aes::AesGcm;
use crate::crypto_impl::chacha::ChaChaPoly;
use crate::error::{Error, HandshakeResult};
use crate::protocol::CipherId;
use crate::traits::Cipher;

/// AEAD cipher context bound to one algorithm
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherState {
    #[zeroize(skip)]
    cipher: CipherId,
    k: Option<SensitiveByteArray<[u8; MAX_KEY_LEN]>>,
    n: u64,
    overflowed: bool,
}

impl CipherState {
    /// Initialize a fresh context with no key installed
    pub(crate) fn new(cipher: CipherId) -> Self {
        Self {
            cipher,
            k: None,
            n: 0,
            overflowed: false,
        }
    }

    pub fn cipher_id(&self) -> CipherId {
        self.cipher
    }

    /// Cipher key length
    pub fn key_len(&self) -> usize {
        match self.cipher {
            CipherId::ChaChaPoly => ChaChaPoly::key_len(),
            CipherId::AesGcm => AesGcm::key_len(),
        }
    }

    /// Authentication tag length
    pub fn mac_len(&self) -> usize {
        match self.cipher {
            CipherId::ChaChaPoly => ChaChaPoly::tag_len(),
            CipherId::AesGcm => AesGcm::tag_len(),
        }
    }

    /// Install a key and reset the nonce to zero
    ///
    /// # Panics
    /// Panics if the key length does not match [`Self::key_len`]
    pub fn install_key(&mut self, key: &[u8]) {
        assert_eq!(key.len(), self.key_len());
        self.k = Some(SensitiveByteArray::from_slice(key));
        self.n = 0;
        self.overflowed = false;
    }

    /// Check whether a key has been installed
    pub fn has_key(&self) -> bool {
        self.k.is_some()
    }

    /// Create a fresh unkeyed context for the same algorithm
    pub fn clone_algo(&self) -> Self {
        Self::new(self.cipher)
    }

    /// Erase the key and reset the nonce state
    pub(crate) fn clear_key(&mut self) {
        self.k = None;
        self.n = 0;
        self.overflowed = false;
    }

    fn nonce_inc_check(&mut self) {
        // "If incrementing n results in 2^64-1, then any further
        // EncryptWithAd() or DecryptWithAd() calls will signal an error
        // to the caller"
        match self.n.checked_add(1) {
            None => self.overflowed = true,
            Some(n) => self.n = n,
        }
    }

    /// In-place AEAD encryption with associated data
    ///
    /// Encrypts `plaintext_len` bytes at the start of `in_out` and appends
    /// the tag, returning the total ciphertext length.
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - no key installed
    /// * [`Error::NonceOverflow`] - nonce counter exhausted
    /// * [`Error::InvalidLength`] - no room for the tag in `in_out`
    pub fn encrypt_with_ad_in_place(
        &mut self,
        ad: &[u8],
        in_out: &mut [u8],
        plaintext_len: usize,
    ) -> HandshakeResult<usize> {
        let k = self.k.as_ref().ok_or(Error::InvalidState)?;
        if self.overflowed {
            return Err(Error::NonceOverflow);
        }
        if plaintext_len
            .checked_add(self.mac_len())
            .map_or(true, |len| len > in_out.len())
        {
            return Err(Error::InvalidLength);
        }

        let size = match self.cipher {
            CipherId::ChaChaPoly => {
                ChaChaPoly::encrypt_in_place(k, self.n, ad, in_out, plaintext_len)
            }
            CipherId::AesGcm => AesGcm::encrypt_in_place(k, self.n, ad, in_out, plaintext_len),
        };
        self.nonce_inc_check();

        Ok(size)
    }

    /// In-place AEAD decryption with associated data
    ///
    /// Decrypts `ciphertext_len` bytes at the start of `in_out`, verifying
    /// and stripping the trailing tag; returns the plaintext length.
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - no key installed
    /// * [`Error::NonceOverflow`] - nonce counter exhausted
    /// * [`Error::InvalidLength`] - `ciphertext_len` shorter than a tag or
    ///   longer than `in_out`
    /// * [`Error::MacFailure`] - authentication failed
    pub fn decrypt_with_ad_in_place(
        &mut self,
        ad: &[u8],
        in_out: &mut [u8],
        ciphertext_len: usize,
    ) -> HandshakeResult<usize> {
        let k = self.k.as_ref().ok_or(Error::InvalidState)?;
        if self.overflowed {
            return Err(Error::NonceOverflow);
        }
        if ciphertext_len > in_out.len() || ciphertext_len < self.mac_len() {
            return Err(Error::InvalidLength);
        }

        let size = match self.cipher {
            CipherId::ChaChaPoly => {
                ChaChaPoly::decrypt_in_place(k, self.n, ad, in_out, ciphertext_len)?
            }
            CipherId::AesGcm => AesGcm::decrypt_in_place(k, self.n, ad, in_out, ciphertext_len)?,
        };
        self.nonce_inc_check();

        Ok(size)
    }

    /// Get current nonce value
    pub fn get_nonce(&self) -> u64 {
        self.n
    }

    /// Set nonce value
    ///
    /// # Warning
    /// **Do not reuse nonces.** Doing so WILL LEAD to a catastrophic
    /// crypto failure.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.n = nonce;
    }

    /// Rekey as per Noise spec sections 4.2 and 11.3
    pub fn rekey(&mut self) {
        if let Some(k) = self.k.take() {
            let new = match self.cipher {
                CipherId::ChaChaPoly => ChaChaPoly::rekey(&k),
                CipherId::AesGcm => AesGcm::rekey(&k),
            };
            self.k = Some(new);
        }
    }
}
