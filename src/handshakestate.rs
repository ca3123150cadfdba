//! Handshake state machine
//!
//! [`HandshakeState`] drives a Noise handshake from configuration through
//! the token program to the final split. The caller constructs it from a
//! protocol id or name, populates keys through the [`DhState`] handles,
//! calls [`HandshakeState::start`] and then alternates
//! [`HandshakeState::write_message`] / [`HandshakeState::read_message`] as
//! dictated by [`HandshakeState::get_action`], finishing with
//! [`HandshakeState::split`].

use zeroize::Zeroize;

use crate::bytearray::SensitiveByteArray;
use crate::cipherstate::CipherState;
use crate::constants::{MAX_DH_LEN, MAX_MESSAGE_LEN, PSK_LEN};
use crate::dhstate::DhState;
use crate::error::{Error, HandshakeResult};
use crate::handshakepattern::{
    self, PatternFlags, Token, LOCAL_EPHEMERAL, LOCAL_EPHEM_REQ, LOCAL_REQUIRED, LOCAL_STATIC,
    REMOTE_EPHEMERAL, REMOTE_EPHEM_REQ, REMOTE_REQUIRED, REMOTE_STATIC,
};
use crate::protocol::{PatternId, PrefixId, ProtocolId, Role};
use crate::symmetricstate::SymmetricState;
use crate::traits::Rng;

/// Next step the application should take
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// The handshake has not been started yet
    None,
    /// Write the next handshake message with [`HandshakeState::write_message`]
    WriteMessage,
    /// Read the peer's next message with [`HandshakeState::read_message`]
    ReadMessage,
    /// The handshake failed; only fallback (when applicable) remains
    Failed,
    /// The handshake is complete; call [`HandshakeState::split`]
    Split,
}

// Requirement bits tracked between construction and start
const REQ_PROLOGUE: u8 = 0x01;
const REQ_LOCAL_REQUIRED: u8 = 0x02;
const REQ_REMOTE_REQUIRED: u8 = 0x04;
const REQ_LOCAL_PREMSG: u8 = 0x08;
const REQ_REMOTE_PREMSG: u8 = 0x10;
const REQ_FALLBACK_PREMSG: u8 = 0x20;
const REQ_PSK: u8 = 0x40;

/// Outstanding obligations derived from the pattern flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Requirements(u8);

impl Requirements {
    /// Compute the initial requirements for a pattern. `flags` must already
    /// be reversed for the responder so that "local" means this party.
    fn derive(flags: PatternFlags, prefix: PrefixId, is_fallback: bool) -> Self {
        let mut req = REQ_PROLOGUE;
        if flags.contains(LOCAL_STATIC) {
            req |= REQ_LOCAL_REQUIRED;
        }
        if flags.contains(LOCAL_REQUIRED) {
            req |= REQ_LOCAL_REQUIRED | REQ_LOCAL_PREMSG;
        }
        if flags.contains(REMOTE_REQUIRED) {
            req |= REQ_REMOTE_REQUIRED | REQ_REMOTE_PREMSG;
        }
        if flags.contains(LOCAL_EPHEM_REQ | REMOTE_EPHEM_REQ) && is_fallback {
            req |= REQ_FALLBACK_PREMSG;
        }
        if prefix == PrefixId::Psk {
            req |= REQ_PSK;
        }
        Self(req)
    }

    fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    fn clear(&mut self, bit: u8) {
        self.0 &= !bit;
    }
}

/// Noise handshake state machine
pub struct HandshakeState<RNG: Rng> {
    symmetric: SymmetricState,
    dh_local_static: Option<DhState>,
    dh_local_ephemeral: Option<DhState>,
    dh_remote_static: Option<DhState>,
    dh_remote_ephemeral: Option<DhState>,
    dh_fixed_ephemeral: Option<DhState>,
    requirements: Requirements,
    tokens: &'static [Token],
    cursor: usize,
    role: Role,
    action: Action,
    rng: RNG,
}

impl<RNG: Rng> HandshakeState<RNG> {
    /// Create a handshake for the given protocol id and role
    ///
    /// The handshake owns `rng`; pass `&mut rng` to keep ownership outside.
    ///
    /// # Errors
    /// * [`Error::InvalidLength`] - the protocol name overflows the name buffer
    pub fn new_by_id(id: ProtocolId, role: Role, rng: RNG) -> HandshakeResult<Self> {
        let (flags, tokens) = handshakepattern::lookup(id.pattern);
        let flags = match role {
            Role::Initiator => flags,
            Role::Responder => flags.reversed(),
        };
        let symmetric = SymmetricState::new(id)?;
        let slot = |present: bool| present.then(|| DhState::new(id.dh));

        Ok(Self {
            symmetric,
            dh_local_static: slot(flags.contains(LOCAL_STATIC)),
            dh_local_ephemeral: slot(flags.contains(LOCAL_EPHEMERAL)),
            dh_remote_static: slot(flags.contains(REMOTE_STATIC)),
            dh_remote_ephemeral: slot(flags.contains(REMOTE_EPHEMERAL)),
            dh_fixed_ephemeral: None,
            requirements: Requirements::derive(flags, id.prefix, false),
            tokens,
            cursor: 0,
            role,
            action: Action::None,
            rng,
        })
    }

    /// Create a handshake from a textual protocol name such as
    /// `Noise_XX_25519_ChaChaPoly_BLAKE2s`
    ///
    /// # Errors
    /// * [`Error::UnknownName`] - the name is not recognized
    pub fn new_by_name(name: &str, role: Role, rng: RNG) -> HandshakeResult<Self> {
        Self::new_by_id(ProtocolId::from_name(name)?, role, rng)
    }

    pub fn get_role(&self) -> Role {
        self.role
    }

    pub fn get_action(&self) -> Action {
        self.action
    }

    pub fn get_protocol_id(&self) -> ProtocolId {
        self.symmetric.protocol_id()
    }

    /// Handle for populating the local static keypair, if the pattern uses one
    pub fn local_keypair_dh(&mut self) -> Option<&mut DhState> {
        self.dh_local_static.as_mut()
    }

    /// Handle for populating the remote static public key, if the pattern
    /// uses one. Also carries the key received during the handshake.
    pub fn remote_public_key_dh(&mut self) -> Option<&mut DhState> {
        self.dh_remote_static.as_mut()
    }

    /// Remote static public key, once known
    pub fn get_remote_static(&self) -> Option<&[u8]> {
        self.dh_remote_static.as_ref().and_then(DhState::public_key)
    }

    /// Handle for installing a fixed ephemeral keypair
    ///
    /// Intended for reproducing test vectors only: the keypair installed
    /// here is used instead of generating a fresh ephemeral. Never use this
    /// in a real application.
    pub fn fixed_ephemeral_dh(&mut self) -> Option<&mut DhState> {
        self.dh_local_ephemeral.as_ref()?;
        if self.dh_fixed_ephemeral.is_none() {
            self.dh_fixed_ephemeral = Some(DhState::new(self.symmetric.protocol_id().dh));
        }
        self.dh_fixed_ephemeral.as_mut()
    }

    /// Does the handshake still need a local static keypair before `start`?
    pub fn needs_local_keypair(&self) -> bool {
        self.requirements.contains(REQ_LOCAL_REQUIRED) && !self.has_local_keypair()
    }

    /// Has a local static keypair been configured?
    pub fn has_local_keypair(&self) -> bool {
        self.dh_local_static
            .as_ref()
            .map_or(false, DhState::has_keypair)
    }

    /// Does the handshake still need the remote static public key before
    /// `start`?
    pub fn needs_remote_public_key(&self) -> bool {
        self.requirements.contains(REQ_REMOTE_REQUIRED) && !self.has_remote_public_key()
    }

    /// Is a remote static public key available?
    pub fn has_remote_public_key(&self) -> bool {
        self.dh_remote_static
            .as_ref()
            .map_or(false, DhState::has_public_key)
    }

    /// Does the handshake still need a pre-shared key?
    pub fn needs_pre_shared_key(&self) -> bool {
        self.requirements.contains(REQ_PSK)
    }

    /// Has the pre-shared key been supplied?
    pub fn has_pre_shared_key(&self) -> bool {
        !self.requirements.contains(REQ_PSK)
            && self.symmetric.protocol_id().prefix == PrefixId::Psk
    }

    /// Mix the prologue into the handshake transcript
    ///
    /// Valid once, before `start`. If never called, an empty prologue is
    /// assumed when the handshake starts.
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - already started, or the prologue was
    ///   already set (possibly implicitly by [`Self::set_pre_shared_key`])
    pub fn set_prologue(&mut self, prologue: &[u8]) -> HandshakeResult<()> {
        if self.action != Action::None {
            return Err(Error::InvalidState);
        }
        if !self.requirements.contains(REQ_PROLOGUE) {
            return Err(Error::InvalidState);
        }
        self.symmetric.mix_hash(prologue);
        self.requirements.clear(REQ_PROLOGUE);
        Ok(())
    }

    /// Mix the 32-byte pre-shared key into the chaining key and transcript
    ///
    /// If the prologue has not been set yet this implicitly sets an empty
    /// one, after which an explicit prologue can no longer be supplied.
    ///
    /// # Errors
    /// * [`Error::InvalidLength`] - the key is not 32 bytes
    /// * [`Error::NotApplicable`] - the protocol has no `NoisePSK` prefix
    /// * [`Error::InvalidState`] - already started or already set
    pub fn set_pre_shared_key(&mut self, key: &[u8]) -> HandshakeResult<()> {
        if key.len() != PSK_LEN {
            return Err(Error::InvalidLength);
        }
        if self.symmetric.protocol_id().prefix != PrefixId::Psk {
            return Err(Error::NotApplicable);
        }
        if self.action != Action::None {
            return Err(Error::InvalidState);
        }
        if !self.requirements.contains(REQ_PSK) {
            return Err(Error::InvalidState);
        }

        if self.requirements.contains(REQ_PROLOGUE) {
            self.set_prologue(&[])?;
        }

        self.symmetric.mix_psk(key);
        self.requirements.clear(REQ_PSK);
        Ok(())
    }

    /// Start the handshake after all parameters have been supplied
    ///
    /// Mixes the premessage public keys into the transcript and arms the
    /// first message.
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - already started
    /// * [`Error::NotApplicable`] - `XXfallback` was constructed directly
    ///   instead of through [`Self::fallback`]
    /// * [`Error::LocalKeyRequired`] - a required local keypair is missing
    /// * [`Error::RemoteKeyRequired`] - a required remote public key is missing
    /// * [`Error::PskRequired`] - the pre-shared key has not been supplied
    pub fn start(&mut self) -> HandshakeResult<()> {
        if self.action != Action::None {
            return Err(Error::InvalidState);
        }
        if self.symmetric.protocol_id().pattern == PatternId::XXfallback
            && !self.requirements.contains(REQ_FALLBACK_PREMSG)
        {
            return Err(Error::NotApplicable);
        }
        if self.requirements.contains(REQ_LOCAL_REQUIRED) && !self.has_local_keypair() {
            return Err(Error::LocalKeyRequired);
        }
        if self.requirements.contains(REQ_REMOTE_REQUIRED) && !self.has_remote_public_key() {
            return Err(Error::RemoteKeyRequired);
        }
        if self.requirements.contains(REQ_PSK) {
            return Err(Error::PskRequired);
        }
        if self.requirements.contains(REQ_PROLOGUE) {
            self.set_prologue(&[])?;
        }

        // Premessage keys enter the transcript in a fixed order: the
        // initiator's premessages first, then the fallback ephemeral
        match self.role {
            Role::Initiator => {
                if self.requirements.contains(REQ_LOCAL_PREMSG) {
                    mix_premessage(&mut self.symmetric, &self.dh_local_static);
                }
                if self.requirements.contains(REQ_REMOTE_PREMSG) {
                    mix_premessage(&mut self.symmetric, &self.dh_remote_static);
                }
                if self.requirements.contains(REQ_FALLBACK_PREMSG) {
                    mix_premessage(&mut self.symmetric, &self.dh_remote_ephemeral);
                }
            }
            Role::Responder => {
                if self.requirements.contains(REQ_REMOTE_PREMSG) {
                    mix_premessage(&mut self.symmetric, &self.dh_remote_static);
                }
                if self.requirements.contains(REQ_LOCAL_PREMSG) {
                    mix_premessage(&mut self.symmetric, &self.dh_local_static);
                }
                if self.requirements.contains(REQ_FALLBACK_PREMSG) {
                    mix_premessage(&mut self.symmetric, &self.dh_local_ephemeral);
                }
            }
        }

        self.action = match self.role {
            Role::Initiator => Action::WriteMessage,
            Role::Responder => Action::ReadMessage,
        };
        Ok(())
    }

    /// Write the next handshake message into `message`
    ///
    /// A `None` payload is equivalent to an empty one: it is still encrypted
    /// and authenticated once key material has been established.
    ///
    /// # Returns
    /// Number of bytes written to `message`
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - it is not this party's turn to write
    /// * [`Error::InvalidLength`] - the message does not fit in `message`
    ///
    /// Any error from inside the write latches the handshake into
    /// [`Action::Failed`]; nothing is written in that case.
    pub fn write_message(
        &mut self,
        payload: Option<&[u8]>,
        message: &mut [u8],
    ) -> HandshakeResult<usize> {
        if self.action != Action::WriteMessage {
            return Err(Error::InvalidState);
        }
        match self.write_tokens(payload, message) {
            Ok(n) => Ok(n),
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    /// Read and process the peer's next handshake message
    ///
    /// Decryption happens in place; `message` is zeroed before this returns,
    /// on success as well as on failure. With `payload_out` of `None` the
    /// payload is authenticated and discarded.
    ///
    /// # Returns
    /// Number of payload bytes written to `payload_out`
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - it is not this party's turn to read
    /// * [`Error::InvalidLength`] - `message` is shorter than the current
    ///   tokens require, or the payload does not fit `payload_out`
    /// * [`Error::MacFailure`] - authentication failed
    /// * [`Error::InvalidPublicKey`] - the peer sent a null ephemeral
    ///
    /// Any error from inside the read latches the handshake into
    /// [`Action::Failed`].
    pub fn read_message(
        &mut self,
        message: &mut [u8],
        payload_out: Option<&mut [u8]>,
    ) -> HandshakeResult<usize> {
        if self.action != Action::ReadMessage {
            return Err(Error::InvalidState);
        }
        let result = self.read_tokens(message, payload_out);
        message.zeroize();
        if result.is_err() {
            self.fail();
        }
        result
    }

    /// Convert a failed or in-flight `IK` handshake into `XXfallback`
    ///
    /// The roles swap: the old responder initiates the fallback handshake.
    /// Useful state (the local static keypair and the old initiator's
    /// ephemeral) is retained; the remote static and the stale ephemeral are
    /// cleared. The caller must re-supply the prologue (and PSK, if any) and
    /// call [`Self::start`] again.
    ///
    /// # Errors
    /// * [`Error::NotApplicable`] - the current pattern is not `IK`
    /// * [`Error::InvalidState`] - the handshake has not reached the
    ///   fallback position, or the needed ephemeral is missing
    pub fn fallback(&mut self) -> HandshakeResult<()> {
        let mut id = self.symmetric.protocol_id();
        if id.pattern != PatternId::IK {
            return Err(Error::NotApplicable);
        }

        // The initiator should be waiting for the response, and the
        // responder should have failed on (or at least read) the first
        // message. Either way the first message's ephemeral must be known.
        match self.role {
            Role::Initiator => {
                if self.action != Action::Failed && self.action != Action::ReadMessage {
                    return Err(Error::InvalidState);
                }
                if !self
                    .dh_local_ephemeral
                    .as_ref()
                    .map_or(false, DhState::has_public_key)
                {
                    return Err(Error::InvalidState);
                }
            }
            Role::Responder => {
                if self.action != Action::Failed && self.action != Action::WriteMessage {
                    return Err(Error::InvalidState);
                }
                if !self
                    .dh_remote_ephemeral
                    .as_ref()
                    .map_or(false, DhState::has_public_key)
                {
                    return Err(Error::InvalidState);
                }
            }
        }

        id.pattern = PatternId::XXfallback;

        if let Some(rs) = self.dh_remote_static.as_mut() {
            rs.clear_key();
        }
        match self.role {
            Role::Initiator => {
                if let Some(re) = self.dh_remote_ephemeral.as_mut() {
                    re.clear_key();
                }
                self.role = Role::Responder;
            }
            Role::Responder => {
                if let Some(e) = self.dh_local_ephemeral.as_mut() {
                    e.clear_key();
                }
                self.role = Role::Initiator;
            }
        }

        let (flags, tokens) = handshakepattern::lookup(id.pattern);
        let flags = match self.role {
            Role::Initiator => flags,
            Role::Responder => flags.reversed(),
        };
        self.requirements = Requirements::derive(flags, id.prefix, true);
        self.tokens = tokens;
        self.cursor = 0;
        self.symmetric.reinitialize(id)?;
        self.action = Action::None;
        Ok(())
    }

    /// Derive the transport cipher contexts once the handshake is complete
    ///
    /// Returns `(send, recv)` from this party's perspective. An optional
    /// secondary symmetric key from a parallel handshake may be mixed in; it
    /// must be empty or exactly 32 bytes. After a successful split the
    /// handshake is inert: only [`Self::get_handshake_hash`] keeps working.
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - the handshake is not in [`Action::Split`],
    ///   or was already split
    /// * [`Error::InvalidLength`] - `secondary_key` has an invalid length
    pub fn split(
        &mut self,
        secondary_key: Option<&[u8]>,
    ) -> HandshakeResult<(CipherState, CipherState)> {
        if self.action != Action::Split {
            return Err(Error::InvalidState);
        }
        let (c1, c2) = self.symmetric.split(secondary_key)?;
        match self.role {
            Role::Initiator => Ok((c1, c2)),
            Role::Responder => Ok((c2, c1)),
        }
    }

    /// Copy the handshake transcript hash into `hash`
    ///
    /// Shorter buffers receive a truncated hash; longer ones are
    /// zero-padded. The value is a unique identifier for the session and
    /// can be used for channel binding.
    ///
    /// # Errors
    /// * [`Error::InvalidState`] - the handshake has not completed
    pub fn get_handshake_hash(&self, hash: &mut [u8]) -> HandshakeResult<()> {
        if self.action != Action::Split {
            return Err(Error::InvalidState);
        }
        let h = self.symmetric.handshake_hash();
        if h.len() <= hash.len() {
            hash[..h.len()].copy_from_slice(h);
            hash[h.len()..].fill(0);
        } else {
            hash.copy_from_slice(&h[..hash.len()]);
        }
        Ok(())
    }

    fn fail(&mut self) {
        self.action = Action::Failed;
        self.symmetric.scrub();
    }

    fn is_psk_mode(&self) -> bool {
        self.symmetric.protocol_id().prefix == PrefixId::Psk
    }

    /// DH tokens are named from the initiator's perspective, so the
    /// responder crosses the wires
    fn map_dh(&self, token: Token) -> HandshakeResult<SensitiveByteArray<[u8; MAX_DH_LEN]>> {
        let (a, b) = match (token, self.role) {
            (Token::EE, _) => (&self.dh_local_ephemeral, &self.dh_remote_ephemeral),
            (Token::ES, Role::Initiator) => (&self.dh_local_ephemeral, &self.dh_remote_static),
            (Token::ES, Role::Responder) => (&self.dh_local_static, &self.dh_remote_ephemeral),
            (Token::SE, Role::Initiator) => (&self.dh_local_static, &self.dh_remote_ephemeral),
            (Token::SE, Role::Responder) => (&self.dh_local_ephemeral, &self.dh_remote_static),
            (Token::SS, _) => (&self.dh_local_static, &self.dh_remote_static),
            _ => unreachable!("not a DH token"),
        };
        let a = a.as_ref().ok_or(Error::InvalidState)?;
        let b = b.as_ref().ok_or(Error::InvalidState)?;
        a.dh(b)
    }

    fn write_tokens(&mut self, payload: Option<&[u8]>, out: &mut [u8]) -> HandshakeResult<usize> {
        let mut cur = 0usize;

        loop {
            match self.tokens[self.cursor] {
                Token::End => {
                    self.action = Action::Split;
                    break;
                }
                Token::FlipDir => {
                    self.cursor += 1;
                    self.action = Action::ReadMessage;
                    break;
                }
                Token::E => {
                    let e = self.dh_local_ephemeral.as_mut().ok_or(Error::InvalidState)?;
                    match self.dh_fixed_ephemeral.as_ref() {
                        Some(fixed) => e.copy_keypair_from(fixed)?,
                        None => e.generate_keypair(&mut self.rng),
                    }

                    let len = e.public_key_len();
                    if out.len() < cur + len {
                        return Err(Error::InvalidLength);
                    }
                    let public = e.public_key().ok_or(Error::InvalidState)?;
                    out[cur..cur + len].copy_from_slice(public);
                    self.symmetric.mix_hash(&out[cur..cur + len]);
                    if self.is_psk_mode() {
                        self.symmetric.mix_key(&out[cur..cur + len]);
                    }
                    cur += len;
                }
                Token::S => {
                    let s = self.dh_local_static.as_ref().ok_or(Error::InvalidState)?;
                    let public = s.public_key().ok_or(Error::InvalidState)?;
                    let len = public.len();
                    let mac = self.symmetric.mac_len();
                    if out.len() < cur + len + mac {
                        return Err(Error::InvalidLength);
                    }
                    out[cur..cur + len].copy_from_slice(public);
                    let n = self
                        .symmetric
                        .encrypt_and_hash(&mut out[cur..cur + len + mac], len)?;
                    cur += n;
                }
                t @ (Token::EE | Token::ES | Token::SE | Token::SS) => {
                    let shared = self.map_dh(t)?;
                    self.symmetric.mix_key(shared.as_slice());
                }
            }
            self.cursor += 1;
        }

        // Append and protect the payload
        let payload = payload.unwrap_or(&[]);
        let mac = self.symmetric.mac_len();
        let total = cur + payload.len() + mac;
        if total > out.len() || total > MAX_MESSAGE_LEN {
            return Err(Error::InvalidLength);
        }
        out[cur..cur + payload.len()].copy_from_slice(payload);
        let n = self
            .symmetric
            .encrypt_and_hash(&mut out[cur..total], payload.len())?;

        Ok(cur + n)
    }

    fn read_tokens(
        &mut self,
        message: &mut [u8],
        payload_out: Option<&mut [u8]>,
    ) -> HandshakeResult<usize> {
        if message.len() > MAX_MESSAGE_LEN {
            return Err(Error::InvalidLength);
        }

        let mut cur = 0usize;

        loop {
            match self.tokens[self.cursor] {
                Token::End => {
                    self.action = Action::Split;
                    break;
                }
                Token::FlipDir => {
                    self.cursor += 1;
                    self.action = Action::WriteMessage;
                    break;
                }
                Token::E => {
                    let re = self
                        .dh_remote_ephemeral
                        .as_mut()
                        .ok_or(Error::InvalidState)?;
                    let len = re.public_key_len();
                    if message.len() < cur + len {
                        return Err(Error::InvalidLength);
                    }
                    re.set_public_key(&message[cur..cur + len])?;
                    // A null ephemeral contributes nothing to the session's
                    // security; reject it outright
                    if re.is_null_public_key() {
                        return Err(Error::InvalidPublicKey);
                    }
                    self.symmetric.mix_hash(&message[cur..cur + len]);
                    if self.is_psk_mode() {
                        self.symmetric.mix_key(&message[cur..cur + len]);
                    }
                    cur += len;
                }
                Token::S => {
                    let rs_len = self
                        .dh_remote_static
                        .as_ref()
                        .ok_or(Error::InvalidState)?
                        .public_key_len();
                    let len = rs_len + self.symmetric.mac_len();
                    if message.len() < cur + len {
                        return Err(Error::InvalidLength);
                    }
                    let n = self.symmetric.decrypt_and_hash(&mut message[cur..cur + len])?;
                    self.dh_remote_static
                        .as_mut()
                        .ok_or(Error::InvalidState)?
                        .set_public_key(&message[cur..cur + n])?;
                    cur += len;
                }
                t @ (Token::EE | Token::ES | Token::SE | Token::SS) => {
                    let shared = self.map_dh(t)?;
                    self.symmetric.mix_key(shared.as_slice());
                }
            }
            self.cursor += 1;
        }

        // Decrypt the remaining bytes as the payload
        if message.len() < cur + self.symmetric.mac_len() {
            return Err(Error::InvalidLength);
        }
        let n = self.symmetric.decrypt_and_hash(&mut message[cur..])?;
        if let Some(out) = payload_out {
            if out.len() < n {
                return Err(Error::InvalidLength);
            }
            out[..n].copy_from_slice(&message[cur..cur + n]);
        }
        Ok(n)
    }
}

fn mix_premessage(symmetric: &mut SymmetricState, dh: &Option<DhState>) {
    if let Some(dh) = dh {
        if let Some(public) = dh.public_key() {
            symmetric.mix_hash(public);
        }
    }
}
