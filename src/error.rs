//! Error types used by the handshake engine

use displaydoc::Display;
use thiserror_no_std::Error;

/// Errors that can happen during handshake and cipher operations
///
/// Every boundary operation of the engine returns one of these; nothing is
/// retried internally. `read_message` and `write_message` additionally latch
/// the handshake into a failed state on error.
#[derive(Debug, Error, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Buffer, key or name length is invalid for the requested operation
    InvalidLength,
    /// Requested an operation in an invalid state
    InvalidState,
    /// Operation is not applicable to the selected protocol
    NotApplicable,
    /// A local static keypair is required before the handshake can start
    LocalKeyRequired,
    /// A remote static public key is required before the handshake can start
    RemoteKeyRequired,
    /// A pre-shared key is required before the handshake can start
    PskRequired,
    /// Received ephemeral public key is the null element of the DH group
    InvalidPublicKey,
    /// Message authentication failed
    MacFailure,
    /// Cipher nonce counter has been exhausted
    NonceOverflow,
    /// Protocol name was not recognized
    UnknownName,
}

/// Handshake operation result type
pub type HandshakeResult<T> = Result<T, Error>;
