extern crate pre;
extern crate rand;

use rand::{distributions::Standard, Rng, thread_rng};

#[test]
fn encapsulate_decapsulate() {
    let alice = pre::Keypair::new().unwrap();
    let (k_e, cap) = alice.public().encapsulate().unwrap();

    let k_d = alice.secret().decapsulate(&cap).unwrap();
    assert_eq!(k_e, k_d);

    let k_r = thread_rng().sample_iter(&Standard).take(32).collect::<Vec<u8>>();
    assert_ne!(&*k_e, k_r.as_slice())
}

#[test]
fn encapsulate_reencrypt_decapsulate() {
    let alice = pre::Keypair::new().unwrap();
    let bob = pre::Keypair::new().unwrap();

    let (k_e, cap) = alice.public().encapsulate().unwrap();
    let dk = alice.rekey(bob.public()).unwrap();
    let cap_b = dk.re_encapsulate(&cap).unwrap();

    assert_eq!(k_e, bob.decapsulate_reencrypted(&cap_b, dk.pk_x()));
    assert_ne!(k_e, alice.decapsulate_reencrypted(&cap_b, dk.pk_x()))
}
