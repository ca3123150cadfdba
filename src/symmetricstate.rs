//! Symmetric state implementation
//!
//! [`SymmetricState`] owns the chaining key `ck`, the transcript hash `h`
//! and the embedded cipher context used while the handshake runs. Both
//! byte strings live in fixed buffers sized by [`MAX_HASH_LEN`]; only the
//! first `hash_len` bytes are meaningful for the negotiated hash.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipherstate::CipherState;
use crate::constants::{MAX_HASH_LEN, PSK_LEN};
use crate::error::{Error, HandshakeResult};
use crate::hashstate::HashState;
use crate::protocol::ProtocolId;

/// Symmetric state used during handshakes to establish the session hash
/// and chaining key
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricState {
    #[zeroize(skip)]
    id: ProtocolId,
    #[zeroize(skip)]
    cipher: Option<CipherState>,
    #[zeroize(skip)]
    hash: HashState,
    ck: [u8; MAX_HASH_LEN],
    h: [u8; MAX_HASH_LEN],
}

impl SymmetricState {
    /// Initialize a new symmetric state for the given protocol
    ///
    /// `h` starts as the protocol name, zero-padded to the hash length if
    /// shorter and hashed down to it otherwise; `ck` starts equal to `h`.
    ///
    /// # Errors
    /// * [`Error::InvalidLength`] - the protocol name overflows the name buffer
    pub fn new(id: ProtocolId) -> HandshakeResult<Self> {
        let hash = HashState::new(id.hash);
        let mut state = Self {
            id,
            cipher: Some(CipherState::new(id.cipher)),
            hash,
            ck: [0u8; MAX_HASH_LEN],
            h: [0u8; MAX_HASH_LEN],
        };
        state.init_name(id)?;
        Ok(state)
    }

    fn init_name(&mut self, id: ProtocolId) -> HandshakeResult<()> {
        let name = id.name()?;
        let name = name.as_bytes();
        let hash_len = self.hash.hash_len();

        let mut h = [0u8; MAX_HASH_LEN];
        if name.len() <= hash_len {
            h[..name.len()].copy_from_slice(name);
        } else {
            self.hash.hash_many(&[name], &mut h);
        }
        self.h = h;
        self.ck = h;
        self.id = id;
        Ok(())
    }

    /// Re-initialize `ck` and `h` for a new protocol id, erasing the cipher
    /// key. Used by the fallback transition.
    pub(crate) fn reinitialize(&mut self, id: ProtocolId) -> HandshakeResult<()> {
        self.init_name(id)?;
        if let Some(cipher) = self.cipher.as_mut() {
            cipher.clear_key();
        }
        Ok(())
    }

    pub fn protocol_id(&self) -> ProtocolId {
        self.id
    }

    /// Current tag length: the cipher's tag length once a key has been
    /// established, zero before that
    pub fn mac_len(&self) -> usize {
        match &self.cipher {
            Some(cipher) if cipher.has_key() => cipher.mac_len(),
            _ => 0,
        }
    }

    /// Check if key material has been established
    pub fn has_key(&self) -> bool {
        self.cipher.as_ref().map_or(false, CipherState::has_key)
    }

    /// `h = HASH(h || data)`
    pub fn mix_hash(&mut self, data: &[u8]) {
        let hash_len = self.hash.hash_len();
        let mut out = [0u8; MAX_HASH_LEN];
        self.hash.hash_many(&[&self.h[..hash_len], data], &mut out);
        self.h = out;
    }

    /// `ck, temp_k = HKDF(ck, input, 2)`; installs `temp_k` as the cipher
    /// key with nonce zero
    pub fn mix_key(&mut self, input_key_material: &[u8]) {
        let hash_len = self.hash.hash_len();
        let mut ck = [0u8; MAX_HASH_LEN];
        let mut temp_k = [0u8; MAX_HASH_LEN];
        self.hash
            .hkdf2(&self.ck[..hash_len], input_key_material, &mut ck, &mut temp_k);
        self.ck = ck;
        if let Some(cipher) = self.cipher.as_mut() {
            let key_len = cipher.key_len();
            cipher.install_key(&temp_k[..key_len]);
        }
        ck.zeroize();
        temp_k.zeroize();
    }

    /// `ck, temp_h, temp_k = HKDF(ck, input, 3)`; mixes `temp_h` into the
    /// transcript and installs `temp_k` as the cipher key
    pub fn mix_key_and_hash(&mut self, input_key_material: &[u8]) {
        let hash_len = self.hash.hash_len();
        let mut ck = [0u8; MAX_HASH_LEN];
        let mut temp_h = [0u8; MAX_HASH_LEN];
        let mut temp_k = [0u8; MAX_HASH_LEN];
        self.hash.hkdf3(
            &self.ck[..hash_len],
            input_key_material,
            &mut ck,
            &mut temp_h,
            &mut temp_k,
        );
        self.ck = ck;
        self.mix_hash(&temp_h[..hash_len]);
        if let Some(cipher) = self.cipher.as_mut() {
            let key_len = cipher.key_len();
            cipher.install_key(&temp_k[..key_len]);
        }
        ck.zeroize();
        temp_h.zeroize();
        temp_k.zeroize();
    }

    /// Mix a pre-shared key into `ck` and `h`:
    /// `ck, temp = HKDF(ck, psk, 2)` followed by `MixHash(temp)`
    pub fn mix_psk(&mut self, psk: &[u8]) {
        let hash_len = self.hash.hash_len();
        let mut ck = [0u8; MAX_HASH_LEN];
        let mut temp = [0u8; MAX_HASH_LEN];
        self.hash.hkdf2(&self.ck[..hash_len], psk, &mut ck, &mut temp);
        self.ck = ck;
        self.mix_hash(&temp[..hash_len]);
        ck.zeroize();
        temp.zeroize();
    }

    /// Encrypt `plaintext_len` bytes at the start of `in_out` in place with
    /// `h` as associated data, then mix the resulting ciphertext into `h`.
    /// Without an established key the data is left as-is and only hashed.
    ///
    /// Returns the processed length (plaintext plus tag when keyed).
    pub fn encrypt_and_hash(
        &mut self,
        in_out: &mut [u8],
        plaintext_len: usize,
    ) -> HandshakeResult<usize> {
        let hash_len = self.hash.hash_len();
        let out_len = match self.cipher.as_mut() {
            Some(cipher) if cipher.has_key() => {
                cipher.encrypt_with_ad_in_place(&self.h[..hash_len], in_out, plaintext_len)?
            }
            _ => plaintext_len,
        };
        self.mix_hash(&in_out[..out_len]);
        Ok(out_len)
    }

    /// Decrypt all of `in_out` in place with `h` as associated data. The
    /// transcript absorbs the ciphertext as received, so it only advances
    /// when authentication succeeds.
    ///
    /// Returns the plaintext length.
    pub fn decrypt_and_hash(&mut self, in_out: &mut [u8]) -> HandshakeResult<usize> {
        let hash_len = self.hash.hash_len();

        let mut new_h = [0u8; MAX_HASH_LEN];
        self.hash
            .hash_many(&[&self.h[..hash_len], in_out], &mut new_h);

        let ciphertext_len = in_out.len();
        let out_len = match self.cipher.as_mut() {
            Some(cipher) if cipher.has_key() => {
                cipher.decrypt_with_ad_in_place(&self.h[..hash_len], in_out, ciphertext_len)?
            }
            _ => ciphertext_len,
        };
        self.h = new_h;
        Ok(out_len)
    }

    /// Derive the two transport cipher contexts from `ck`
    ///
    /// The embedded cipher is moved out to become the first context and a
    /// fresh one is created for the second; afterwards the symmetric state
    /// can no longer encrypt or split again.
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - already split
    /// * [`Error::InvalidLength`] - `secondary_key` is neither empty nor 32 bytes
    pub fn split(
        &mut self,
        secondary_key: Option<&[u8]>,
    ) -> HandshakeResult<(CipherState, CipherState)> {
        let secondary = secondary_key.unwrap_or(&[]);
        if !secondary.is_empty() && secondary.len() != PSK_LEN {
            return Err(Error::InvalidLength);
        }

        let mut c1 = self.cipher.take().ok_or(Error::InvalidState)?;
        let mut c2 = c1.clone_algo();

        let hash_len = self.hash.hash_len();
        let mut k1 = [0u8; MAX_HASH_LEN];
        let mut k2 = [0u8; MAX_HASH_LEN];
        self.hash
            .hkdf2(&self.ck[..hash_len], secondary, &mut k1, &mut k2);

        c1.install_key(&k1[..c1.key_len()]);
        c2.install_key(&k2[..c2.key_len()]);
        k1.zeroize();
        k2.zeroize();

        Ok((c1, c2))
    }

    /// Borrow the transcript hash
    pub fn handshake_hash(&self) -> &[u8] {
        &self.h[..self.hash.hash_len()]
    }

    /// Erase the secrets held by this state
    pub(crate) fn scrub(&mut self) {
        self.ck.zeroize();
        self.h.zeroize();
        if let Some(cipher) = self.cipher.as_mut() {
            cipher.clear_key();
        }
    }
}
