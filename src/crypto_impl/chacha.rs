use core::ops::Deref;

use chacha20poly1305::{AeadInPlace, ChaCha20Poly1305, KeyInit};

use crate::bytearray::SensitiveByteArray;
use crate::error::{Error, HandshakeResult};
use crate::traits::{Cipher, CryptoComponent};

/// ChaCha20-Poly1305 cipher implementation
pub struct ChaChaPoly;

impl CryptoComponent for ChaChaPoly {
    fn name() -> &'static str {
        "ChaChaPoly"
    }
}

// Noise nonce layout for ChaChaPoly: four zero bytes followed by the
// 64-bit counter in little-endian order
fn full_nonce(nonce: u64) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[4..].copy_from_slice(&nonce.to_le_bytes());
    out
}

impl Cipher for ChaChaPoly {
    type Key = SensitiveByteArray<[u8; 32]>;

    fn tag_len() -> usize {
        16
    }

    fn encrypt_in_place(
        k: &Self::Key,
        nonce: u64,
        ad: &[u8],
        in_out: &mut [u8],
        plaintext_len: usize,
    ) -> usize {
        assert!(plaintext_len
            .checked_add(Self::tag_len())
            .map_or(false, |len| len <= in_out.len()));

        let out_len = plaintext_len + Self::tag_len();
        let (buffer, tag_out) = in_out[..out_len].split_at_mut(plaintext_len);

        let tag = ChaCha20Poly1305::new(k.deref().into())
            .encrypt_in_place_detached(&full_nonce(nonce).into(), ad, buffer)
            .unwrap();

        tag_out.copy_from_slice(&tag);
        out_len
    }

    fn decrypt_in_place(
        k: &Self::Key,
        nonce: u64,
        ad: &[u8],
        in_out: &mut [u8],
        ciphertext_len: usize,
    ) -> HandshakeResult<usize> {
        assert!(ciphertext_len <= in_out.len());
        assert!(ciphertext_len >= Self::tag_len());

        let (buffer, tag) = in_out[..ciphertext_len].split_at_mut(ciphertext_len - Self::tag_len());

        ChaCha20Poly1305::new(k.deref().into())
            .decrypt_in_place_detached(&full_nonce(nonce).into(), ad, buffer, tag.as_ref().into())
            .map_err(|_| Error::MacFailure)?;

        Ok(buffer.len())
    }
}
