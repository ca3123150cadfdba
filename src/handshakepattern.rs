//! Handshake pattern programs
//!
//! Each pattern compiles to a flags byte describing which keys the pattern
//! involves, plus a flat token program. The program is split into message
//! halves by [`Token::FlipDir`] and terminated by [`Token::End`]; DH tokens
//! are named from the initiator's perspective, so `ES` always means
//! "initiator ephemeral with responder static" regardless of who is
//! processing it.

use crate::protocol::PatternId;

/// A single instruction in a handshake pattern program
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    /// Transmit an ephemeral public key
    E,
    /// Transmit the (possibly encrypted) static public key
    S,
    /// DH between both ephemerals
    EE,
    /// DH between initiator ephemeral and responder static
    ES,
    /// DH between initiator static and responder ephemeral
    SE,
    /// DH between both statics
    SS,
    /// The message is complete; the other party sends next
    FlipDir,
    /// The pattern is complete; the next step is the split
    End,
}

/// Flag bits, initiator perspective. The low nibble describes the local
/// party and the high nibble the remote party so the byte can be reversed
/// for the responder with a nibble swap.
pub(crate) const LOCAL_STATIC: u8 = 0x01;
pub(crate) const LOCAL_EPHEMERAL: u8 = 0x02;
pub(crate) const LOCAL_REQUIRED: u8 = 0x04;
pub(crate) const LOCAL_EPHEM_REQ: u8 = 0x08;
pub(crate) const REMOTE_STATIC: u8 = 0x10;
pub(crate) const REMOTE_EPHEMERAL: u8 = 0x20;
pub(crate) const REMOTE_REQUIRED: u8 = 0x40;
pub(crate) const REMOTE_EPHEM_REQ: u8 = 0x80;

/// Key involvement flags for one handshake pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PatternFlags(u8);

impl PatternFlags {
    pub(crate) fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    /// Swap the local and remote halves so that "local" refers to the
    /// responder instead of the initiator
    pub(crate) fn reversed(self) -> Self {
        Self((self.0 >> 4) | (self.0 << 4))
    }
}

/// Look up the flags byte and token program for a pattern
pub(crate) fn lookup(pattern: PatternId) -> (PatternFlags, &'static [Token]) {
    use Token::*;

    let (flags, tokens): (u8, &'static [Token]) = match pattern {
        // One-way patterns
        PatternId::N => (
            LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_REQUIRED,
            &[E, ES, End],
        ),
        PatternId::K => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | LOCAL_REQUIRED | REMOTE_STATIC | REMOTE_REQUIRED,
            &[E, ES, SS, End],
        ),
        PatternId::X => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_REQUIRED,
            &[E, ES, S, SS, End],
        ),

        // Interactive patterns
        PatternId::NN => (
            LOCAL_EPHEMERAL | REMOTE_EPHEMERAL,
            &[E, FlipDir, E, EE, End],
        ),
        PatternId::NK => (
            LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_EPHEMERAL | REMOTE_REQUIRED,
            &[E, ES, FlipDir, E, EE, End],
        ),
        PatternId::NX => (
            LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_EPHEMERAL,
            &[E, FlipDir, E, EE, S, ES, End],
        ),
        PatternId::XN => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_EPHEMERAL,
            &[E, FlipDir, E, EE, FlipDir, S, SE, End],
        ),
        PatternId::XK => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_EPHEMERAL | REMOTE_REQUIRED,
            &[E, ES, FlipDir, E, EE, FlipDir, S, SE, End],
        ),
        PatternId::XX => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_EPHEMERAL,
            &[E, FlipDir, E, EE, S, ES, FlipDir, S, SE, End],
        ),
        PatternId::KN => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | LOCAL_REQUIRED | REMOTE_EPHEMERAL,
            &[E, FlipDir, E, EE, SE, End],
        ),
        PatternId::KK => (
            LOCAL_STATIC
                | LOCAL_EPHEMERAL
                | LOCAL_REQUIRED
                | REMOTE_STATIC
                | REMOTE_EPHEMERAL
                | REMOTE_REQUIRED,
            &[E, ES, SS, FlipDir, E, EE, SE, End],
        ),
        PatternId::KX => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | LOCAL_REQUIRED | REMOTE_STATIC | REMOTE_EPHEMERAL,
            &[E, FlipDir, E, EE, SE, S, ES, End],
        ),
        PatternId::IN => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_EPHEMERAL,
            &[E, S, FlipDir, E, EE, SE, End],
        ),
        PatternId::IK => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_EPHEMERAL | REMOTE_REQUIRED,
            &[E, ES, S, SS, FlipDir, E, EE, SE, End],
        ),
        PatternId::IX => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_EPHEMERAL,
            &[E, S, FlipDir, E, EE, SE, S, ES, End],
        ),

        // Fallback: the old initiator's ephemeral becomes a premessage and
        // the roles swap, so the program reads from the new initiator's side
        PatternId::XXfallback => (
            LOCAL_STATIC | LOCAL_EPHEMERAL | REMOTE_STATIC | REMOTE_EPHEMERAL | REMOTE_EPHEM_REQ,
            &[E, EE, S, SE, FlipDir, S, ES, End],
        ),
    };

    (PatternFlags(flags), tokens)
}
