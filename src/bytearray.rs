//! Fixed-size byte array utilities used throughout the crate
//!
//! All key material handled by the crypto traits is expressed through the
//! [`ByteArray`] trait so that algorithm implementations can stay generic
//! over the concrete container. [`SensitiveByteArray`] wraps any such array
//! and guarantees it is zeroized when dropped.

use core::fmt::Debug;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Portable operations over fixed-size byte arrays.
///
/// The associated [`ByteArray::LENGTH`] constant is known at compile time,
/// which lets array lengths participate in const contexts without threading
/// a const generic parameter through every signature.
pub trait ByteArray: Sized + Zeroize + PartialEq + Debug + Clone {
    /// Array length
    const LENGTH: usize;

    /// Initialize a new array filled with zeros
    fn new_zero() -> Self;
    /// Initialize a new array filled with the given byte
    fn new_with(_: u8) -> Self;
    /// Initialize a new array by copying the given slice
    ///
    /// # Panics
    /// Panics if the slice length does not match this array length
    fn from_slice(_: &[u8]) -> Self;
    /// Array length
    fn len() -> usize {
        Self::LENGTH
    }
    /// Borrow this array as a slice
    fn as_slice(&self) -> &[u8];
    /// Borrow this array as a mutable slice
    fn as_mut(&mut self) -> &mut [u8];
}

/// Wrapper for any [`ByteArray`] that is automatically zeroized on drop.
///
/// Implements [`ByteArray`] itself, so it is a drop-in replacement for the
/// plain array types used by the crypto implementations.
#[derive(ZeroizeOnDrop, Zeroize, Clone, PartialEq, Debug)]
pub struct SensitiveByteArray<A: ByteArray>(A);

impl<A: ByteArray> SensitiveByteArray<A> {
    /// Encapsulate the given [`ByteArray`]
    pub fn new(a: A) -> Self {
        Self(a)
    }
}

impl<A: ByteArray> core::ops::Deref for SensitiveByteArray<A> {
    type Target = A;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<A: ByteArray> core::ops::DerefMut for SensitiveByteArray<A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<A: ByteArray> ByteArray for SensitiveByteArray<A> {
    const LENGTH: usize = A::LENGTH;

    fn new_zero() -> Self {
        Self::new(A::new_zero())
    }

    fn new_with(x: u8) -> Self {
        Self::new(A::new_with(x))
    }

    fn from_slice(s: &[u8]) -> Self {
        Self::new(A::from_slice(s))
    }

    fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    fn as_mut(&mut self) -> &mut [u8] {
        self.0.as_mut()
    }
}

impl<const N: usize> ByteArray for [u8; N] {
    const LENGTH: usize = N;

    fn new_zero() -> Self {
        [0u8; N]
    }

    fn new_with(x: u8) -> Self {
        [x; N]
    }

    fn from_slice(data: &[u8]) -> Self {
        assert_eq!(data.len(), N);
        let mut a = [0u8; N];
        a.copy_from_slice(data);
        a
    }

    fn as_slice(&self) -> &[u8] {
        self
    }

    fn as_mut(&mut self) -> &mut [u8] {
        self
    }
}
