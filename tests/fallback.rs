//! Scenario tests: the IK -> XXfallback transition, PSK configuration
//! ordering, state machine rejections and fixed-ephemeral determinism

use rand::rngs::ThreadRng;
use rustle::{Action, Error, HandshakeState, Role};

type Hs = HandshakeState<ThreadRng>;

const PSK: [u8; 32] = [0x5A; 32];

fn build(name: &str, role: Role) -> Hs {
    HandshakeState::new_by_name(name, role, rand::thread_rng()).unwrap()
}

/// Public key for a raw x25519 private key, via a scratch handshake
fn public_for(private: &[u8; 32]) -> Vec<u8> {
    let mut scratch = build("Noise_XX_25519_ChaChaPoly_SHA256", Role::Initiator);
    let dh = scratch.local_keypair_dh().unwrap();
    dh.set_keypair_from_private(private).unwrap();
    dh.public_key().unwrap().to_vec()
}

fn transfer(writer: &mut Hs, reader: &mut Hs, payload: &[u8]) {
    let mut message = [0u8; 4096];
    let n = writer.write_message(Some(payload), &mut message).unwrap();
    let mut received = [0u8; 4096];
    let m = reader
        .read_message(&mut message[..n], Some(&mut received))
        .unwrap();
    assert_eq!(&received[..m], payload);
}

fn finish_fallback_pair(new_initiator: &mut Hs, new_responder: &mut Hs, prologue: &[u8]) {
    new_initiator.set_prologue(prologue).unwrap();
    new_responder.set_prologue(prologue).unwrap();
    new_initiator.start().unwrap();
    new_responder.start().unwrap();

    transfer(new_initiator, new_responder, b"hello again");
    transfer(new_responder, new_initiator, b"welcome back");

    assert_eq!(new_initiator.get_action(), Action::Split);
    assert_eq!(new_responder.get_action(), Action::Split);

    let mut hash_i = [0u8; 64];
    let mut hash_r = [0u8; 64];
    new_initiator.get_handshake_hash(&mut hash_i).unwrap();
    new_responder.get_handshake_hash(&mut hash_r).unwrap();
    assert_eq!(hash_i, hash_r);

    let (mut i_send, mut i_recv) = new_initiator.split(None).unwrap();
    let (mut r_send, mut r_recv) = new_responder.split(None).unwrap();

    let mut buf = [0u8; 128];
    buf[..9].copy_from_slice(b"keys work");
    let n = i_send.encrypt_with_ad_in_place(&[], &mut buf, 9).unwrap();
    let n = r_recv.decrypt_with_ad_in_place(&[], &mut buf, n).unwrap();
    assert_eq!(&buf[..n], b"keys work");

    buf[..8].copy_from_slice(b"both way");
    let n = r_send.encrypt_with_ad_in_place(&[], &mut buf, 8).unwrap();
    let n = i_recv.decrypt_with_ad_in_place(&[], &mut buf, n).unwrap();
    assert_eq!(&buf[..n], b"both way");
}

#[test]
fn ik_falls_back_after_mac_failure() {
    let name = "Noise_IK_25519_AESGCM_SHA256";
    let prologue = b"pipes prologue";
    let mut rng = rand::thread_rng();

    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);
    alice.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    bob.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    let bob_public = bob.local_keypair_dh().unwrap().public_key().unwrap().to_vec();

    // Alice holds a stale key for Bob, so Bob cannot decrypt her static
    let stale = public_for(&[0xEE; 32]);
    alice
        .remote_public_key_dh()
        .unwrap()
        .set_public_key(&stale)
        .unwrap();

    alice.set_prologue(prologue).unwrap();
    bob.set_prologue(prologue).unwrap();
    alice.start().unwrap();
    bob.start().unwrap();

    let mut message = [0u8; 4096];
    let n = alice.write_message(Some(b"attempt"), &mut message).unwrap();
    assert_eq!(
        bob.read_message(&mut message[..n], None),
        Err(Error::MacFailure)
    );
    assert_eq!(bob.get_action(), Action::Failed);

    // Both sides convert the session; roles swap
    bob.fallback().unwrap();
    alice.fallback().unwrap();
    assert_eq!(bob.get_role(), Role::Initiator);
    assert_eq!(alice.get_role(), Role::Responder);
    assert_eq!(
        bob.get_protocol_id().name().unwrap().as_str(),
        "Noise_XXfallback_25519_AESGCM_SHA256"
    );
    assert_eq!(bob.get_action(), Action::None);

    finish_fallback_pair(&mut bob, &mut alice, prologue);

    // Alice has now learned Bob's real static key
    assert_eq!(alice.get_remote_static().unwrap(), &bob_public[..]);
}

#[test]
fn ik_responder_may_fall_back_without_failing() {
    let name = "Noise_IK_25519_ChaChaPoly_BLAKE2b";
    let prologue = b"optimistic";
    let mut rng = rand::thread_rng();

    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);
    alice.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    bob.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    let bob_public = bob.local_keypair_dh().unwrap().public_key().unwrap().to_vec();
    alice
        .remote_public_key_dh()
        .unwrap()
        .set_public_key(&bob_public)
        .unwrap();

    alice.set_prologue(prologue).unwrap();
    bob.set_prologue(prologue).unwrap();
    alice.start().unwrap();
    bob.start().unwrap();

    // Message 1 decrypts fine, but Bob decides to fall back anyway
    let mut message = [0u8; 4096];
    let n = alice.write_message(None, &mut message).unwrap();
    bob.read_message(&mut message[..n], None).unwrap();
    assert_eq!(bob.get_action(), Action::WriteMessage);

    bob.fallback().unwrap();
    alice.fallback().unwrap();

    finish_fallback_pair(&mut bob, &mut alice, prologue);
}

#[test]
fn fallback_rejected_when_not_applicable() {
    let mut rng = rand::thread_rng();

    // Wrong pattern
    let mut hs = build("Noise_XX_25519_ChaChaPoly_SHA256", Role::Initiator);
    hs.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    hs.start().unwrap();
    assert_eq!(hs.fallback(), Err(Error::NotApplicable));

    // Right pattern, but no ephemeral on the wire yet
    let mut hs = build("Noise_IK_25519_ChaChaPoly_SHA256", Role::Initiator);
    hs.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    assert_eq!(hs.fallback(), Err(Error::InvalidState));

    // Responder that has not read anything yet
    let mut hs = build("Noise_IK_25519_ChaChaPoly_SHA256", Role::Responder);
    hs.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    hs.start().unwrap();
    assert_eq!(hs.fallback(), Err(Error::InvalidState));
}

/// Drive a deterministic NoisePSK_XX pair and return the wire transcript
/// and the final handshake hash
fn psk_xx_transcript(explicit_prologue: bool) -> (Vec<Vec<u8>>, [u8; 64]) {
    let name = "NoisePSK_XX_25519_ChaChaPoly_SHA512";
    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);

    alice
        .local_keypair_dh()
        .unwrap()
        .set_keypair_from_private(&[0x11; 32])
        .unwrap();
    bob.local_keypair_dh()
        .unwrap()
        .set_keypair_from_private(&[0x22; 32])
        .unwrap();
    alice
        .fixed_ephemeral_dh()
        .unwrap()
        .set_keypair_from_private(&[0x33; 32])
        .unwrap();
    bob.fixed_ephemeral_dh()
        .unwrap()
        .set_keypair_from_private(&[0x44; 32])
        .unwrap();

    if explicit_prologue {
        alice.set_prologue(&[]).unwrap();
        bob.set_prologue(&[]).unwrap();
    }
    alice.set_pre_shared_key(&PSK).unwrap();
    bob.set_pre_shared_key(&PSK).unwrap();

    alice.start().unwrap();
    bob.start().unwrap();

    let mut transcript = Vec::new();
    loop {
        match (alice.get_action(), bob.get_action()) {
            (Action::Split, Action::Split) => break,
            (Action::WriteMessage, _) => {
                let mut message = [0u8; 4096];
                let n = alice.write_message(Some(b"psk payload"), &mut message).unwrap();
                transcript.push(message[..n].to_vec());
                bob.read_message(&mut message[..n], None).unwrap();
            }
            (_, Action::WriteMessage) => {
                let mut message = [0u8; 4096];
                let n = bob.write_message(Some(b"psk payload"), &mut message).unwrap();
                transcript.push(message[..n].to_vec());
                alice.read_message(&mut message[..n], None).unwrap();
            }
            (a, b) => panic!("deadlock ({a:?}, {b:?})"),
        }
    }

    let mut hash = [0u8; 64];
    alice.get_handshake_hash(&mut hash).unwrap();
    let mut hash_b = [0u8; 64];
    bob.get_handshake_hash(&mut hash_b).unwrap();
    assert_eq!(hash, hash_b);

    (transcript, hash)
}

#[test]
fn psk_configuration_order_is_equivalent() {
    // Explicit empty prologue followed by the PSK, and the PSK alone with
    // its implicit empty prologue, must produce identical sessions
    let (transcript_a, hash_a) = psk_xx_transcript(true);
    let (transcript_b, hash_b) = psk_xx_transcript(false);
    assert_eq!(transcript_a, transcript_b);
    assert_eq!(hash_a, hash_b);
}

#[test]
fn psk_configuration_errors() {
    let name = "NoisePSK_NN_25519_AESGCM_SHA256";
    let mut hs = build(name, Role::Initiator);

    assert_eq!(hs.set_pre_shared_key(&[0u8; 31]), Err(Error::InvalidLength));
    assert!(hs.needs_pre_shared_key());

    hs.set_pre_shared_key(&PSK).unwrap();
    assert!(hs.has_pre_shared_key());

    // Second PSK, and a late explicit prologue, are both rejected
    assert_eq!(hs.set_pre_shared_key(&PSK), Err(Error::InvalidState));
    assert_eq!(hs.set_prologue(b"late"), Err(Error::InvalidState));

    // Standard protocols have no PSK at all
    let mut plain = build("Noise_NN_25519_AESGCM_SHA256", Role::Initiator);
    assert_eq!(plain.set_pre_shared_key(&PSK), Err(Error::NotApplicable));

    // Forgetting the PSK is caught at start
    let mut forgot = build(name, Role::Responder);
    assert_eq!(forgot.start(), Err(Error::PskRequired));
}

#[test]
fn start_precondition_errors() {
    let name = "Noise_IK_25519_ChaChaPoly_SHA256";
    let mut rng = rand::thread_rng();

    let mut hs = build(name, Role::Initiator);
    assert_eq!(hs.start(), Err(Error::LocalKeyRequired));

    hs.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    assert!(!hs.needs_local_keypair());
    assert_eq!(hs.start(), Err(Error::RemoteKeyRequired));

    let remote = public_for(&[0x77; 32]);
    hs.remote_public_key_dh()
        .unwrap()
        .set_public_key(&remote)
        .unwrap();
    assert!(!hs.needs_remote_public_key());
    hs.start().unwrap();

    // Starting twice is invalid
    assert_eq!(hs.start(), Err(Error::InvalidState));
}

#[test]
fn wrong_turn_does_not_mutate() {
    let name = "Noise_NN_25519_ChaChaPoly_BLAKE2s";
    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);
    alice.start().unwrap();
    bob.start().unwrap();

    let mut message = [0u8; 1024];
    let mut scratch = [0u8; 1024];

    // Reading out of turn fails without poisoning the handshake
    assert_eq!(
        alice.read_message(&mut scratch[..48], None),
        Err(Error::InvalidState)
    );
    assert_eq!(alice.get_action(), Action::WriteMessage);

    // Writing out of turn likewise
    assert_eq!(bob.write_message(None, &mut message), Err(Error::InvalidState));
    assert_eq!(bob.get_action(), Action::ReadMessage);

    // The pair still completes normally afterwards
    let n = alice.write_message(None, &mut message).unwrap();
    bob.read_message(&mut message[..n], None).unwrap();
    let n = bob.write_message(None, &mut message).unwrap();
    alice.read_message(&mut message[..n], None).unwrap();
    assert_eq!(alice.get_action(), Action::Split);
    assert_eq!(bob.get_action(), Action::Split);
}

#[test]
fn null_ephemeral_is_rejected_and_scrubbed() {
    let mut bob = build("Noise_NN_25519_ChaChaPoly_SHA256", Role::Responder);
    bob.start().unwrap();

    // A null ephemeral followed by payload bytes
    let mut message = [0u8; 40];
    message[32..].copy_from_slice(b"PAYLOAD!");

    assert_eq!(bob.read_message(&mut message, None), Err(Error::InvalidPublicKey));
    assert_eq!(bob.get_action(), Action::Failed);
    assert_eq!(message, [0u8; 40]);

    // A failed handshake refuses everything except fallback and drop
    let mut out = [0u8; 64];
    assert_eq!(bob.write_message(None, &mut out), Err(Error::InvalidState));
    assert_eq!(bob.read_message(&mut out, None), Err(Error::InvalidState));
    assert!(matches!(bob.split(None), Err(Error::InvalidState)));
}

#[test]
fn truncated_messages_are_rejected() {
    let name = "Noise_XX_25519_AESGCM_SHA512";
    let mut rng = rand::thread_rng();
    let mut alice = build(name, Role::Initiator);
    alice.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    alice.start().unwrap();

    let mut message = [0u8; 1024];
    let n = alice.write_message(None, &mut message).unwrap();

    for cut in [0, 1, 16, 31] {
        let mut bob = build(name, Role::Responder);
        bob.local_keypair_dh().unwrap().generate_keypair(&mut rng);
        bob.start().unwrap();
        let mut truncated = message[..cut].to_vec();
        assert_eq!(
            bob.read_message(&mut truncated, None),
            Err(Error::InvalidLength),
            "cut at {cut} of {n}"
        );
        assert_eq!(bob.get_action(), Action::Failed);
    }
}

#[test]
fn split_and_hash_state_rules() {
    let name = "Noise_NN_25519_AESGCM_BLAKE2b";
    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);
    alice.start().unwrap();
    bob.start().unwrap();

    let mut hash = [0u8; 64];
    assert!(matches!(alice.split(None), Err(Error::InvalidState)));
    assert_eq!(alice.get_handshake_hash(&mut hash), Err(Error::InvalidState));

    let mut message = [0u8; 1024];
    let n = alice.write_message(None, &mut message).unwrap();
    bob.read_message(&mut message[..n], None).unwrap();
    let n = bob.write_message(None, &mut message).unwrap();
    alice.read_message(&mut message[..n], None).unwrap();

    // Secondary key must be empty or exactly 32 bytes
    assert!(matches!(
        alice.split(Some(&[1u8; 16])),
        Err(Error::InvalidLength)
    ));

    let _ = alice.split(Some(&[1u8; 32])).unwrap();

    // The handshake is inert after a split, but the hash survives
    assert!(matches!(alice.split(None), Err(Error::InvalidState)));
    assert!(matches!(
        alice.write_message(None, &mut message),
        Err(Error::InvalidState)
    ));
    alice.get_handshake_hash(&mut hash).unwrap();
    assert_ne!(hash, [0u8; 64]);

    // Hash padding: a long buffer is zero-filled past the hash length
    let mut long = [0xFFu8; 80];
    alice.get_handshake_hash(&mut long).unwrap();
    assert_eq!(&long[64..], &[0u8; 16][..]);

    // And a short buffer receives a truncated hash
    let mut short = [0u8; 16];
    alice.get_handshake_hash(&mut short).unwrap();
    assert_eq!(short, hash[..16]);
}

#[test]
fn fixed_ephemerals_make_the_handshake_deterministic() {
    fn run() -> (Vec<u8>, Vec<u8>, [u8; 32]) {
        let name = "Noise_NN_25519_ChaChaPoly_BLAKE2s";
        let mut alice = build(name, Role::Initiator);
        let mut bob = build(name, Role::Responder);
        alice
            .fixed_ephemeral_dh()
            .unwrap()
            .set_keypair_from_private(&[0x33; 32])
            .unwrap();
        bob.fixed_ephemeral_dh()
            .unwrap()
            .set_keypair_from_private(&[0x44; 32])
            .unwrap();
        alice.start().unwrap();
        bob.start().unwrap();

        let mut m1 = [0u8; 1024];
        let n1 = alice.write_message(Some(b"vector payload"), &mut m1).unwrap();
        let msg1 = m1[..n1].to_vec();
        bob.read_message(&mut m1[..n1], None).unwrap();

        let mut m2 = [0u8; 1024];
        let n2 = bob.write_message(None, &mut m2).unwrap();
        let msg2 = m2[..n2].to_vec();
        alice.read_message(&mut m2[..n2], None).unwrap();

        let mut hash = [0u8; 32];
        alice.get_handshake_hash(&mut hash).unwrap();
        (msg1, msg2, hash)
    }

    let (msg1, msg2, hash) = run();
    let (msg1_again, msg2_again, hash_again) = run();
    assert_eq!(msg1, msg1_again);
    assert_eq!(msg2, msg2_again);
    assert_eq!(hash, hash_again);

    // Message 1 of NN is the bare ephemeral followed by the cleartext
    // payload; no key material exists yet
    assert_eq!(&msg1[..32], &public_for(&[0x33; 32])[..]);
    assert_eq!(&msg1[32..], b"vector payload");

    // Message 2 carries the responder ephemeral and an encrypted (empty)
    // payload with its tag
    assert_eq!(&msg2[..32], &public_for(&[0x44; 32])[..]);
    assert_eq!(msg2.len(), 32 + 16);
}
