//! Scripted initiator/responder pairs over the full protocol matrix

use rand::rngs::ThreadRng;
use rustle::{Action, HandshakeState, Role};

type Hs = HandshakeState<ThreadRng>;

const PSK: [u8; 32] = [0xA5; 32];
const PROLOGUE: &[u8] = b"Spinning round and round";

const PATTERNS: &[&str] = &[
    "N", "K", "X", "NN", "NK", "NX", "XN", "XK", "XX", "KN", "KK", "KX", "IN", "IK", "IX",
];
const CIPHERS: &[&str] = &["ChaChaPoly", "AESGCM"];
const HASHES: &[&str] = &["SHA256", "SHA512", "BLAKE2s", "BLAKE2b"];

fn build(name: &str, role: Role) -> Hs {
    HandshakeState::new_by_name(name, role, rand::thread_rng()).unwrap()
}

/// Install static keys and shared configuration on both parties
fn configure(alice: &mut Hs, bob: &mut Hs) {
    let mut rng = rand::thread_rng();

    if let Some(dh) = alice.local_keypair_dh() {
        dh.generate_keypair(&mut rng);
    }
    if let Some(dh) = bob.local_keypair_dh() {
        dh.generate_keypair(&mut rng);
    }

    if alice.needs_remote_public_key() {
        let public = bob.local_keypair_dh().unwrap().public_key().unwrap().to_vec();
        alice
            .remote_public_key_dh()
            .unwrap()
            .set_public_key(&public)
            .unwrap();
    }
    if bob.needs_remote_public_key() {
        let public = alice
            .local_keypair_dh()
            .unwrap()
            .public_key()
            .unwrap()
            .to_vec();
        bob.remote_public_key_dh()
            .unwrap()
            .set_public_key(&public)
            .unwrap();
    }

    alice.set_prologue(PROLOGUE).unwrap();
    bob.set_prologue(PROLOGUE).unwrap();

    if alice.needs_pre_shared_key() {
        alice.set_pre_shared_key(&PSK).unwrap();
        bob.set_pre_shared_key(&PSK).unwrap();
    }
}

/// Move one handshake message from writer to reader, checking the payload
/// round trip
fn transfer(writer: &mut Hs, reader: &mut Hs, payload: &[u8]) {
    let mut message = [0u8; 4096];
    let n = writer.write_message(Some(payload), &mut message).unwrap();

    let mut received = [0u8; 4096];
    assert_eq!(reader.get_action(), Action::ReadMessage);
    let m = reader
        .read_message(&mut message[..n], Some(&mut received))
        .unwrap();
    assert_eq!(&received[..m], payload);
}

fn run_pair(name: &str) {
    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);
    configure(&mut alice, &mut bob);

    alice.start().unwrap();
    bob.start().unwrap();

    let mut round = 0u8;
    loop {
        match (alice.get_action(), bob.get_action()) {
            (Action::Split, Action::Split) => break,
            (Action::WriteMessage, _) => transfer(&mut alice, &mut bob, &[round; 11]),
            (_, Action::WriteMessage) => transfer(&mut bob, &mut alice, &[round; 23]),
            (a, b) => panic!("{name}: handshake deadlocked ({a:?}, {b:?})"),
        }
        round += 1;
    }

    // Both transcripts must agree
    let mut hash_a = [0u8; 64];
    let mut hash_b = [0u8; 64];
    alice.get_handshake_hash(&mut hash_a).unwrap();
    bob.get_handshake_hash(&mut hash_b).unwrap();
    assert_eq!(hash_a, hash_b, "{name}: handshake hash mismatch");

    // Split keys must pair up across the wire
    let (mut a_send, mut a_recv) = alice.split(None).unwrap();
    let (mut b_send, mut b_recv) = bob.split(None).unwrap();

    let mut buf = [0u8; 256];
    buf[..14].copy_from_slice(b"transport test");
    let n = a_send.encrypt_with_ad_in_place(&[], &mut buf, 14).unwrap();
    let n = b_recv.decrypt_with_ad_in_place(&[], &mut buf, n).unwrap();
    assert_eq!(&buf[..n], b"transport test");

    if !alice.get_protocol_id().pattern.is_one_way() {
        buf[..12].copy_from_slice(b"and backward");
        let n = b_send.encrypt_with_ad_in_place(&[], &mut buf, 12).unwrap();
        let n = a_recv.decrypt_with_ad_in_place(&[], &mut buf, n).unwrap();
        assert_eq!(&buf[..n], b"and backward");
    }
}

#[test]
fn standard_protocols() {
    for pattern in PATTERNS {
        for cipher in CIPHERS {
            for hash in HASHES {
                run_pair(&format!("Noise_{pattern}_25519_{cipher}_{hash}"));
            }
        }
    }
}

#[test]
fn psk_protocols() {
    for pattern in PATTERNS {
        for cipher in CIPHERS {
            for hash in HASHES {
                run_pair(&format!("NoisePSK_{pattern}_25519_{cipher}_{hash}"));
            }
        }
    }
}

#[test]
fn empty_payloads_round_trip() {
    let name = "Noise_XX_25519_ChaChaPoly_SHA256";
    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);
    configure(&mut alice, &mut bob);
    alice.start().unwrap();
    bob.start().unwrap();

    let mut message = [0u8; 1024];

    // None payloads still carry (and authenticate) a zero-length payload
    let n = alice.write_message(None, &mut message).unwrap();
    assert_eq!(bob.read_message(&mut message[..n], None).unwrap(), 0);

    let n = bob.write_message(None, &mut message).unwrap();
    assert_eq!(alice.read_message(&mut message[..n], None).unwrap(), 0);

    let n = alice.write_message(None, &mut message).unwrap();
    assert_eq!(bob.read_message(&mut message[..n], None).unwrap(), 0);

    assert_eq!(alice.get_action(), Action::Split);
    assert_eq!(bob.get_action(), Action::Split);
}

#[test]
fn remote_static_learned_during_handshake() {
    let name = "Noise_XX_25519_AESGCM_BLAKE2b";
    let mut alice = build(name, Role::Initiator);
    let mut bob = build(name, Role::Responder);
    configure(&mut alice, &mut bob);

    let alice_static = alice
        .local_keypair_dh()
        .unwrap()
        .public_key()
        .unwrap()
        .to_vec();
    let bob_static = bob.local_keypair_dh().unwrap().public_key().unwrap().to_vec();

    assert!(alice.get_remote_static().is_none());
    assert!(bob.get_remote_static().is_none());

    alice.start().unwrap();
    bob.start().unwrap();
    while alice.get_action() != Action::Split || bob.get_action() != Action::Split {
        match (alice.get_action(), bob.get_action()) {
            (Action::WriteMessage, _) => transfer(&mut alice, &mut bob, &[]),
            (_, Action::WriteMessage) => transfer(&mut bob, &mut alice, &[]),
            (a, b) => panic!("deadlock ({a:?}, {b:?})"),
        }
    }

    assert_eq!(alice.get_remote_static().unwrap(), &bob_static[..]);
    assert_eq!(bob.get_remote_static().unwrap(), &alice_static[..]);
}

#[test]
fn xxfallback_cannot_be_started_directly() {
    let name = "Noise_XXfallback_25519_ChaChaPoly_SHA256";
    let mut hs = build(name, Role::Initiator);
    let mut rng = rand::thread_rng();
    hs.local_keypair_dh().unwrap().generate_keypair(&mut rng);
    assert_eq!(hs.start(), Err(rustle::Error::NotApplicable));
}

#[test]
fn oversized_payload_rejected() {
    let name = "Noise_NN_25519_ChaChaPoly_SHA256";
    let mut alice = build(name, Role::Initiator);
    alice.start().unwrap();

    // Bigger than any Noise message may be
    let payload = vec![0u8; 70_000];
    let mut message = vec![0u8; 80_000];
    assert_eq!(
        alice.write_message(Some(&payload), &mut message),
        Err(rustle::Error::InvalidLength)
    );
    assert_eq!(alice.get_action(), Action::Failed);
}
