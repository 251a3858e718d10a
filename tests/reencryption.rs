extern crate pre;

use pre::{
    capsule::CAPSULE_SIZE,
    Capsule, DelegationKey, EncryptedEnvelope, Error, Keypair, PublicKey, SecretKey
};

fn keypair() -> Keypair {
    Keypair::new().unwrap()
}

#[test]
fn delegatee_reads_test_message() {
    let alice = keypair();
    let bob = keypair();

    let env = alice.public().encrypt(b"Test").unwrap();
    let dk = alice.rekey(bob.public()).unwrap();
    let env_b = env.reencrypt(&dk).unwrap();

    assert_eq!(env_b.ciphertext, env.ciphertext);
    assert_eq!(bob.secret().decrypt_reencrypted(&env_b, dk.pk_x()).unwrap(), b"Test");
}

#[test]
fn owner_reads_own_message() {
    let alice = keypair();
    let env = alice.public().encrypt(b"Test").unwrap();
    assert_eq!(alice.secret().decrypt(&env).unwrap(), b"Test");
}

#[test]
fn delegation_key_is_reusable() {
    let alice = keypair();
    let bob = keypair();
    let dk = alice.rekey(bob.public()).unwrap();

    for msg in &[&b"first"[..], b"second", b"third", b""] {
        let env = alice.public().encrypt(msg).unwrap().reencrypt(&dk).unwrap();
        assert_eq!(bob.secret().decrypt_reencrypted(&env, dk.pk_x()).unwrap(), *msg)
    }
}

#[test]
fn delegation_keys_are_fresh() {
    let alice = keypair();
    let bob = keypair();
    let dk1 = alice.rekey(bob.public()).unwrap();
    let dk2 = alice.rekey(bob.public()).unwrap();
    assert_ne!(dk1.pk_x(), dk2.pk_x());
    assert_ne!(dk1.rk(), dk2.rk());

    let env = alice.public().encrypt(b"Test").unwrap();
    for dk in &[dk1, dk2] {
        let env_b = env.reencrypt(dk).unwrap();
        assert_eq!(bob.secret().decrypt_reencrypted(&env_b, dk.pk_x()).unwrap(), b"Test")
    }
}

#[test]
fn delegation_does_not_transfer() {
    let alice = keypair();
    let bob = keypair();
    let carol = keypair();
    let dk = alice.rekey(bob.public()).unwrap();

    // A capsule made for carol is well formed, so the proxy transforms it,
    // but bob ends up with the wrong key.
    let env = carol.public().encrypt(b"Test").unwrap();
    let env_b = env.reencrypt(&dk).unwrap();
    assert!(matches!(bob.secret().decrypt_reencrypted(&env_b, dk.pk_x()), Err(Error::Cipher)));

    // Neither can carol use a bundle made for bob.
    let env = alice.public().encrypt(b"Test").unwrap().reencrypt(&dk).unwrap();
    assert!(matches!(carol.secret().decrypt_reencrypted(&env, dk.pk_x()), Err(Error::Cipher)));
}

#[test]
fn transformed_capsule_no_longer_verifies() {
    let alice = keypair();
    let bob = keypair();
    let (_, cap) = alice.public().encapsulate().unwrap();
    let dk = alice.rekey(bob.public()).unwrap();
    let cap_b = dk.re_encapsulate(&cap).unwrap();

    assert!(cap.verify());
    assert!(!cap_b.verify());
    assert_eq!(cap_b.s(), cap.s());
    assert!(matches!(alice.secret().decapsulate(&cap_b), Err(Error::CapsuleMismatch)));
    assert!(matches!(dk.re_encapsulate(&cap_b), Err(Error::CapsuleMismatch)));
}

#[test]
fn capsule_codec_round_trips() {
    let alice = keypair();
    let (k, cap) = alice.public().encapsulate().unwrap();

    let bytes = cap.to_bytes();
    assert_eq!(bytes.len(), CAPSULE_SIZE);
    let decoded = Capsule::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, cap);
    assert!(decoded.verify());
    assert_eq!(alice.secret().decapsulate(&decoded).unwrap(), k);

    let [e, v, s] = cap.to_hex_components();
    assert_eq!(Capsule::from_hex_components(&e, &v, &s).unwrap(), cap);
}

#[test]
fn capsule_codec_rejects_bad_lengths() {
    let cap = keypair().public().encapsulate().unwrap().1;
    let bytes = cap.to_bytes();
    assert!(matches!(Capsule::from_bytes(&bytes[.. CAPSULE_SIZE - 1]), Err(Error::Decode(_))));
    assert!(matches!(Capsule::from_bytes(&[bytes.to_vec(), vec![0]].concat()), Err(Error::Decode(_))));
    assert!(matches!(Capsule::from_bytes(&[]), Err(Error::Decode(_))));
}

#[test]
fn tampered_capsule_is_detected() {
    let alice = keypair();
    let bob = keypair();
    let dk = alice.rekey(bob.public()).unwrap();
    let bytes = alice.public().encapsulate().unwrap().1.to_bytes();

    for i in 0 .. CAPSULE_SIZE {
        let mut b = bytes;
        b[i] ^= 0x01;
        match Capsule::from_bytes(&b) {
            Err(e) => assert!(matches!(e, Error::Decode(_)), "byte {}: {:?}", i, e),
            Ok(cap) => {
                assert!(!cap.verify(), "byte {}", i);
                assert!(matches!(dk.re_encapsulate(&cap), Err(Error::CapsuleMismatch)), "byte {}", i);
                assert!(matches!(alice.secret().decapsulate(&cap), Err(Error::CapsuleMismatch)), "byte {}", i)
            }
        }
    }
}

#[test]
fn tampered_ciphertext_is_detected() {
    let alice = keypair();
    let bob = keypair();
    let dk = alice.rekey(bob.public()).unwrap();
    let mut env = alice.public().encrypt(b"Test").unwrap().reencrypt(&dk).unwrap();
    env.ciphertext[0] ^= 0x80;
    assert!(matches!(bob.secret().decrypt_reencrypted(&env, dk.pk_x()), Err(Error::Cipher)));
}

#[test]
fn envelope_serde() {
    let alice = keypair();
    let env = alice.public().encrypt(b"Test").unwrap();

    let bin = bincode::serialize(&env).unwrap();
    let from_bin: EncryptedEnvelope = bincode::deserialize(&bin).unwrap();
    assert_eq!(from_bin, env);

    let json = serde_json::to_string(&env).unwrap();
    let from_json: EncryptedEnvelope = serde_json::from_str(&json).unwrap();
    assert_eq!(from_json, env);
    assert_eq!(alice.secret().decrypt(&from_json).unwrap(), b"Test");
}

#[test]
fn delegation_key_serde_and_hex() {
    let alice = keypair();
    let bob = keypair();
    let dk = alice.rekey(bob.public()).unwrap();

    let json = serde_json::to_value(&dk).unwrap();
    assert_eq!(json["rk"], dk.rk().to_hex());
    assert_eq!(json["pk_x"], dk.pk_x().to_hex());
    assert_eq!(serde_json::from_value::<DelegationKey>(json).unwrap(), dk);

    let bin = bincode::serialize(&dk).unwrap();
    assert_eq!(bincode::deserialize::<DelegationKey>(&bin).unwrap(), dk);

    let [rk, pk_x] = dk.to_hex_pair();
    assert_eq!(rk.len(), 64);
    assert_eq!(pk_x.len(), 130);
    assert_eq!(DelegationKey::from_hex_pair(&rk, &pk_x).unwrap(), dk);
    assert!(!format!("{:?}", dk).contains(&rk));
}

#[test]
fn keys_survive_hex() {
    let alice = keypair();
    let sk = SecretKey::from_hex(&alice.secret().to_hex()).unwrap();
    assert_eq!(sk.public_key(), *alice.public());

    let pk = PublicKey::from_hex(&alice.public().to_hex()).unwrap();
    assert_eq!(pk, *alice.public());
    assert!(matches!(PublicKey::from_hex("04"), Err(Error::Decode(_))));
    assert!(matches!(PublicKey::from_hex("not hex"), Err(Error::Decode(_))));
}
