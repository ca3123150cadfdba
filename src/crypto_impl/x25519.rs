use x25519_dalek::{PublicKey, StaticSecret};

use crate::bytearray::{ByteArray, SensitiveByteArray};
use crate::traits::{CryptoComponent, Dh, Rng};
use crate::KeyPair;

/// X25519 DH implementation
pub struct X25519;

impl CryptoComponent for X25519 {
    fn name() -> &'static str {
        "25519"
    }
}

impl Dh for X25519 {
    type SecretKey = SensitiveByteArray<[u8; 32]>;
    type PubKey = [u8; 32];
    type Output = SensitiveByteArray<[u8; 32]>;

    fn genkey<R: Rng>(rng: &mut R) -> KeyPair<Self::PubKey, Self::SecretKey> {
        let mut secret = Self::SecretKey::new_zero();
        rng.fill_bytes(secret.as_mut());
        let public = Self::pubkey(&secret);
        KeyPair { public, secret }
    }

    fn pubkey(secret: &Self::SecretKey) -> Self::PubKey {
        let s = StaticSecret::from(**secret);
        *PublicKey::from(&s).as_bytes()
    }

    fn dh(secret: &Self::SecretKey, public: &Self::PubKey) -> Self::Output {
        let s = StaticSecret::from(**secret);
        let p = PublicKey::from(*public);
        Self::Output::from_slice(s.diffie_hellman(&p).as_bytes())
    }
}
