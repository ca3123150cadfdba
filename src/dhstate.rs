//! DH key container
//!
//! A [`DhState`] owns the key material for one slot of a handshake: a full
//! keypair for the local side, or just a public key for the remote side.
//! The handshake allocates one per key the pattern involves and hands the
//! local ones to the application for population.

use crate::bytearray::{ByteArray, SensitiveByteArray};
use crate::constants::MAX_DH_LEN;
use crate::crypto_impl::x25519::X25519;
use crate::error::{Error, HandshakeResult};
use crate::protocol::DhId;
use crate::traits::{Dh, Rng};

/// DH key slot bound to one group
#[derive(Clone)]
pub struct DhState {
    dh: DhId,
    secret: Option<SensitiveByteArray<[u8; MAX_DH_LEN]>>,
    public: Option<[u8; MAX_DH_LEN]>,
}

impl DhState {
    pub(crate) fn new(dh: DhId) -> Self {
        Self {
            dh,
            secret: None,
            public: None,
        }
    }

    pub fn dh_id(&self) -> DhId {
        self.dh
    }

    /// Public key length for this group
    pub fn public_key_len(&self) -> usize {
        match self.dh {
            DhId::Curve25519 => 32,
        }
    }

    /// Private key length for this group
    pub fn private_key_len(&self) -> usize {
        match self.dh {
            DhId::Curve25519 => 32,
        }
    }

    /// Shared secret length for this group
    pub fn shared_key_len(&self) -> usize {
        match self.dh {
            DhId::Curve25519 => 32,
        }
    }

    /// Generate a fresh keypair, replacing any existing key material
    pub fn generate_keypair<R: Rng>(&mut self, rng: &mut R) {
        match self.dh {
            DhId::Curve25519 => {
                let keypair = X25519::genkey(rng);
                self.secret = Some(keypair.secret.clone());
                self.public = Some(keypair.public);
            }
        }
    }

    /// Install a keypair from raw key material
    ///
    /// # Errors
    /// * [`Error::InvalidLength`] - either key has the wrong length
    pub fn set_keypair(&mut self, secret: &[u8], public: &[u8]) -> HandshakeResult<()> {
        if secret.len() != self.private_key_len() || public.len() != self.public_key_len() {
            return Err(Error::InvalidLength);
        }
        self.secret = Some(SensitiveByteArray::from_slice(secret));
        self.public = Some(ByteArray::from_slice(public));
        Ok(())
    }

    /// Install a keypair from the private key alone, deriving the public key
    ///
    /// # Errors
    /// * [`Error::InvalidLength`] - the private key has the wrong length
    pub fn set_keypair_from_private(&mut self, secret: &[u8]) -> HandshakeResult<()> {
        if secret.len() != self.private_key_len() {
            return Err(Error::InvalidLength);
        }
        let secret = SensitiveByteArray::from_slice(secret);
        let public = match self.dh {
            DhId::Curve25519 => X25519::pubkey(&secret),
        };
        self.secret = Some(secret);
        self.public = Some(public);
        Ok(())
    }

    /// Install a bare public key, clearing any private half
    ///
    /// # Errors
    /// * [`Error::InvalidLength`] - the key has the wrong length
    pub fn set_public_key(&mut self, public: &[u8]) -> HandshakeResult<()> {
        if public.len() != self.public_key_len() {
            return Err(Error::InvalidLength);
        }
        self.secret = None;
        self.public = Some(ByteArray::from_slice(public));
        Ok(())
    }

    /// Erase all key material from this slot
    pub fn clear_key(&mut self) {
        self.secret = None;
        self.public = None;
    }

    /// Check whether a full keypair is present
    pub fn has_keypair(&self) -> bool {
        self.secret.is_some() && self.public.is_some()
    }

    /// Check whether a public key is present
    pub fn has_public_key(&self) -> bool {
        self.public.is_some()
    }

    /// Check whether the stored public key is the group's null element
    pub fn is_null_public_key(&self) -> bool {
        match &self.public {
            Some(public) => public.iter().all(|&b| b == 0),
            None => false,
        }
    }

    /// Borrow the public key, if present
    pub fn public_key(&self) -> Option<&[u8]> {
        let len = self.public_key_len();
        self.public.as_ref().map(|p| &p[..len])
    }

    /// Copy the keypair out of another slot of the same group
    pub(crate) fn copy_keypair_from(&mut self, other: &DhState) -> HandshakeResult<()> {
        if !other.has_keypair() {
            return Err(Error::InvalidState);
        }
        self.secret = other.secret.clone();
        self.public = other.public;
        Ok(())
    }

    /// Compute the shared secret between our private key and the other
    /// slot's public key
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - either half of the exchange is missing
    pub(crate) fn dh(
        &self,
        remote: &DhState,
    ) -> HandshakeResult<SensitiveByteArray<[u8; MAX_DH_LEN]>> {
        let secret = self.secret.as_ref().ok_or(Error::InvalidState)?;
        let public = remote.public.as_ref().ok_or(Error::InvalidState)?;
        let shared = match self.dh {
            DhId::Curve25519 => X25519::dh(secret, public),
        };
        Ok(shared)
    }
}
