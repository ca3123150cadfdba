//! Protocol identifiers and name handling
//!
//! A Noise protocol is identified by five fields: the handshake pattern, the
//! name prefix (plain or pre-shared-key mode), the DH group, the AEAD cipher
//! and the hash. [`ProtocolId`] carries all five and converts to and from
//! the textual form, e.g. `Noise_XX_25519_ChaChaPoly_BLAKE2s` or
//! `NoisePSK_IK_25519_AESGCM_SHA256`.

use core::fmt::Write;

use arrayvec::ArrayString;

use crate::constants::MAX_PROTOCOL_NAME_LEN;
use crate::error::{Error, HandshakeResult};

/// Role of one party in a handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The party that sends the first handshake message
    Initiator,
    /// The party that receives the first handshake message
    Responder,
}

/// Handshake pattern identifier
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternId {
    N,
    K,
    X,
    NN,
    NK,
    NX,
    XN,
    XK,
    XX,
    KN,
    KK,
    KX,
    IN,
    IK,
    IX,
    /// Fallback variant of XX, entered from a failed IK handshake
    XXfallback,
}

impl PatternId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternId::N => "N",
            PatternId::K => "K",
            PatternId::X => "X",
            PatternId::NN => "NN",
            PatternId::NK => "NK",
            PatternId::NX => "NX",
            PatternId::XN => "XN",
            PatternId::XK => "XK",
            PatternId::XX => "XX",
            PatternId::KN => "KN",
            PatternId::KK => "KK",
            PatternId::KX => "KX",
            PatternId::IN => "IN",
            PatternId::IK => "IK",
            PatternId::IX => "IX",
            PatternId::XXfallback => "XXfallback",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        let id = match s {
            "N" => PatternId::N,
            "K" => PatternId::K,
            "X" => PatternId::X,
            "NN" => PatternId::NN,
            "NK" => PatternId::NK,
            "NX" => PatternId::NX,
            "XN" => PatternId::XN,
            "XK" => PatternId::XK,
            "XX" => PatternId::XX,
            "KN" => PatternId::KN,
            "KK" => PatternId::KK,
            "KX" => PatternId::KX,
            "IN" => PatternId::IN,
            "IK" => PatternId::IK,
            "IX" => PatternId::IX,
            "XXfallback" => PatternId::XXfallback,
            _ => return None,
        };
        Some(id)
    }

    /// One-way patterns transfer data in a single direction only
    pub fn is_one_way(&self) -> bool {
        matches!(self, PatternId::N | PatternId::K | PatternId::X)
    }
}

/// Protocol name prefix identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixId {
    /// Plain `Noise` protocols
    Standard,
    /// `NoisePSK` protocols with a 32-byte pre-shared key
    Psk,
}

impl PrefixId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefixId::Standard => "Noise",
            PrefixId::Psk => "NoisePSK",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "Noise" => Some(PrefixId::Standard),
            "NoisePSK" => Some(PrefixId::Psk),
            _ => None,
        }
    }
}

/// DH group identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DhId {
    Curve25519,
}

impl DhId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DhId::Curve25519 => "25519",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "25519" => Some(DhId::Curve25519),
            _ => None,
        }
    }
}

/// AEAD cipher identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CipherId {
    ChaChaPoly,
    AesGcm,
}

impl CipherId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherId::ChaChaPoly => "ChaChaPoly",
            CipherId::AesGcm => "AESGCM",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "ChaChaPoly" => Some(CipherId::ChaChaPoly),
            "AESGCM" => Some(CipherId::AesGcm),
            _ => None,
        }
    }
}

/// Hash algorithm identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashId {
    Sha256,
    Sha512,
    Blake2s,
    Blake2b,
}

impl HashId {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashId::Sha256 => "SHA256",
            HashId::Sha512 => "SHA512",
            HashId::Blake2s => "BLAKE2s",
            HashId::Blake2b => "BLAKE2b",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "SHA256" => Some(HashId::Sha256),
            "SHA512" => Some(HashId::Sha512),
            "BLAKE2s" => Some(HashId::Blake2s),
            "BLAKE2b" => Some(HashId::Blake2b),
            _ => None,
        }
    }
}

/// Full protocol identifier
///
/// Immutable value type; compare with `==`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolId {
    pub pattern: PatternId,
    pub prefix: PrefixId,
    pub dh: DhId,
    pub cipher: CipherId,
    pub hash: HashId,
}

impl ProtocolId {
    /// Parse a protocol id from its textual name
    ///
    /// # Errors
    /// * [`Error::UnknownName`] - any field of the name is not recognized
    pub fn from_name(name: &str) -> HandshakeResult<Self> {
        let mut parts = name.split('_');
        let prefix = parts
            .next()
            .and_then(PrefixId::from_str)
            .ok_or(Error::UnknownName)?;
        let pattern = parts
            .next()
            .and_then(PatternId::from_str)
            .ok_or(Error::UnknownName)?;
        let dh = parts
            .next()
            .and_then(DhId::from_str)
            .ok_or(Error::UnknownName)?;
        let cipher = parts
            .next()
            .and_then(CipherId::from_str)
            .ok_or(Error::UnknownName)?;
        let hash = parts
            .next()
            .and_then(HashId::from_str)
            .ok_or(Error::UnknownName)?;
        if parts.next().is_some() {
            return Err(Error::UnknownName);
        }

        Ok(Self {
            pattern,
            prefix,
            dh,
            cipher,
            hash,
        })
    }

    /// Format the full protocol name
    ///
    /// # Errors
    /// * [`Error::InvalidLength`] - the name does not fit the name buffer
    pub fn name(&self) -> HandshakeResult<ArrayString<MAX_PROTOCOL_NAME_LEN>> {
        let mut name = ArrayString::new();
        write!(
            &mut name,
            "{}_{}_{}_{}_{}",
            self.prefix.as_str(),
            self.pattern.as_str(),
            self.dh.as_str(),
            self.cipher.as_str(),
            self.hash.as_str()
        )
        .map_err(|_| Error::InvalidLength)?;
        Ok(name)
    }
}

impl core::str::FromStr for ProtocolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
