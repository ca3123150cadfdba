//! Concrete implementations of crypto primitives

// Hashes
pub mod blake2;
pub mod sha;

// Ciphers
pub mod aes;
pub mod chacha;

// DHs
pub mod x25519;

// Default RNG
pub mod random;
