#![cfg_attr(not(feature = "std"), no_std)]
//! # Rustle 🍂
//!
//! `no_std` compatible, pure Rust implementation of the
//! [Noise framework](https://noiseprotocol.org/noise.html) handshake engine.
//!
//! Everything revolves around one type: [`HandshakeState`], a token-driven
//! state machine that turns a negotiated protocol — a handshake pattern plus
//! a DH group, an AEAD cipher and a hash — into a mutually authenticated
//! key agreement. Construct it from a protocol name or a [`ProtocolId`],
//! supply keys through the [`dhstate::DhState`] handles, then follow
//! [`HandshakeState::get_action`]:
//!
//! * [`HandshakeState::write_message`] - produce the next handshake message
//! * [`HandshakeState::read_message`]  - consume the peer's next message
//! * [`HandshakeState::split`]         - derive the transport cipher pair
//!
//! The [`cipherstate::CipherState`] pair returned by `split` protects the
//! transport phase; [`HandshakeState::get_handshake_hash`] yields the
//! session's channel-binding value.
//!
//! Protocols with the `NoisePSK` prefix mix a 32-byte pre-shared key into
//! the handshake ([`HandshakeState::set_pre_shared_key`]), and a failed
//! `IK` session can be rewritten into an `XXfallback` one in place with
//! [`HandshakeState::fallback`], preserving the useful parts of its state
//! (the Noise Pipes flow).
//!
//! ## Supported algorithms
//!
//! | Slot | Algorithms |
//! | ---  | --- |
//! | DH | 25519 |
//! | Cipher | ChaChaPoly, AESGCM |
//! | Hash | SHA256, SHA512, BLAKE2s, BLAKE2b |
//!
//! Algorithms are selected at runtime from the protocol name; the concrete
//! implementations live in the [`crypto`] module and plug in through the
//! traits in [`traits`].
//!
//! ## Example
//!
//! ```
//! use rustle::{Action, DefaultRng, HandshakeState, Role};
//!
//! let name = "Noise_NN_25519_ChaChaPoly_BLAKE2s";
//! let mut alice = HandshakeState::new_by_name(name, Role::Initiator, DefaultRng::default()).unwrap();
//! let mut bob = HandshakeState::new_by_name(name, Role::Responder, DefaultRng::default()).unwrap();
//! alice.start().unwrap();
//! bob.start().unwrap();
//!
//! let mut buf = [0u8; 1024];
//!
//! // -> e
//! let n = alice.write_message(None, &mut buf).unwrap();
//! bob.read_message(&mut buf[..n], None).unwrap();
//!
//! // <- e, ee
//! let n = bob.write_message(None, &mut buf).unwrap();
//! alice.read_message(&mut buf[..n], None).unwrap();
//!
//! assert_eq!(alice.get_action(), Action::Split);
//! let (_alice_send, _alice_recv) = alice.split(None).unwrap();
//! let (_bob_send, _bob_recv) = bob.split(None).unwrap();
//!
//! let mut hash_a = [0u8; 32];
//! let mut hash_b = [0u8; 32];
//! alice.get_handshake_hash(&mut hash_a).unwrap();
//! bob.get_handshake_hash(&mut hash_b).unwrap();
//! assert_eq!(hash_a, hash_b);
//! ```

pub mod bytearray;
pub mod cipherstate;
pub mod constants;
mod crypto_impl;
pub mod dhstate;
pub mod error;
mod handshakepattern;
mod handshakestate;
pub mod hashstate;
pub mod protocol;
pub mod symmetricstate;
pub mod traits;

pub use crypto_impl::random::DefaultRng;
pub use error::Error;
pub use handshakestate::{Action, HandshakeState};
pub use protocol::{ProtocolId, Role};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Concrete crypto implementations
pub mod crypto {

    /// Supported DH algorithms
    pub mod dh {
        pub use crate::crypto_impl::x25519::X25519;
    }

    /// Supported cipher algorithms
    pub mod cipher {
        pub use crate::crypto_impl::aes::AesGcm;
        pub use crate::crypto_impl::chacha::ChaChaPoly;
    }

    /// Supported hash algorithms
    pub mod hash {
        pub use crate::crypto_impl::blake2::{Blake2b, Blake2s};
        pub use crate::crypto_impl::sha::{Sha256, Sha512};
    }
}

/// A zeroize-on-drop container for keys
#[derive(ZeroizeOnDrop)]
pub struct KeyPair<P: Zeroize, S: Zeroize> {
    pub public: P,
    pub secret: S,
}
