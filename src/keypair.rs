// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

use crate::{
    capsule::Capsule,
    delegation::DelegationKey,
    envelope::{self, EncryptedEnvelope},
    error::Error,
    key::Key,
    point::Point,
    scalar::Scalar,
    util::{derive_scalar, kdf}
};
use rand::{thread_rng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use zeroize::Zeroize;

#[derive(Clone)]
pub struct Keypair {
    secret: SecretKey,
    public: PublicKey
}

impl Keypair {
    /// Creates a fresh public and private key from the thread-local CSPRNG.
    pub fn new() -> Result<Self, Error> {
        Keypair::generate(&mut thread_rng())
    }

    /// The private scalar is uniform on `[1, N)`.
    pub fn generate<R>(rng: &mut R) -> Result<Self, Error>
    where
        R: RngCore + CryptoRng
    {
        let s = Scalar::random(rng)?;
        Ok(Keypair::from_secret(SecretKey { scalar: s }))
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Keypair { secret, public }
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Given the public key of a delegatee, create the re-encryption key bundle which
    /// lets a proxy transform capsules made for this keypair into capsules the
    /// delegatee can open.
    pub fn rekey(&self, pk_b: &PublicKey) -> Result<DelegationKey, Error> {
        self.secret.rekey(pk_b)
    }

    pub fn decapsulate_reencrypted(&self, cap: &Capsule, pk_x: &PublicKey) -> Key {
        self.secret.decapsulate_reencrypted(cap, pk_x)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Keypair").field("public", &self.public).finish()
    }
}


#[derive(Clone)]
pub struct SecretKey {
    scalar: Scalar
}

impl SecretKey {
    /// Rejects zero, which has no public key.
    pub fn from_scalar(scalar: Scalar) -> Result<Self, Error> {
        if scalar.is_zero() {
            return Err(Error::decode("zero secret key"))
        }
        Ok(SecretKey { scalar })
    }

    /// Accepts minimal-length big-endian hex as well as the fixed-width form.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        SecretKey::from_scalar(Scalar::from_hex(s)?)
    }

    pub fn to_hex(&self) -> String {
        self.scalar.to_hex()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey { point: Point::base_mul(&self.scalar) }
    }

    /// Restore the symmetric encryption key from a capsule made for this key.
    pub fn decapsulate(&self, cap: &Capsule) -> Result<Key, Error> {
        if !cap.verify() {
            return Err(Error::CapsuleMismatch)
        }
        Ok(kdf(&((cap.E + cap.V) * self.scalar).to_uncompressed()))
    }

    pub fn decrypt(&self, env: &EncryptedEnvelope) -> Result<Vec<u8>, Error> {
        let k = self.decapsulate(&env.capsule)?;
        envelope::open(&k, &env.ciphertext)
    }

    /// Derive the re-encryption key bundle for delegatee `pk_b`:
    ///
    /// ```text
    ///     (x, X) fresh ephemeral keypair
    ///     d  = derive_scalar(X || pk_b || pk_b·x)
    ///     rk = sk · d⁻¹
    /// ```
    pub fn rekey(&self, pk_b: &PublicKey) -> Result<DelegationKey, Error> {
        self.rekey_with_rng(pk_b, &mut thread_rng())
    }

    /// Like `rekey`, drawing the ephemeral keypair from `rng`. A failing `rng`
    /// surfaces as `Error::KeyGeneration`.
    pub fn rekey_with_rng<R>(&self, pk_b: &PublicKey, rng: &mut R) -> Result<DelegationKey, Error>
    where
        R: RngCore + CryptoRng
    {
        let ephemeral = Keypair::generate(rng).map_err(|e| match e {
            Error::RandomSource(e) => Error::KeyGeneration(e),
            e => e
        })?;
        self.rekey_with(&ephemeral, pk_b)
    }

    fn rekey_with(&self, ephemeral: &Keypair, pk_b: &PublicKey) -> Result<DelegationKey, Error> {
        let d = derive_scalar(&[
            ephemeral.public.point.to_uncompressed(),
            pk_b.point.to_uncompressed(),
            (pk_b.point * ephemeral.secret.scalar).to_uncompressed()
        ]);
        let rk = self.scalar.mul_mod(&d.inv_mod()?);
        debug!(pk_x = ?ephemeral.public, "derived re-encryption key");
        Ok(DelegationKey { rk, pk_x: ephemeral.public })
    }

    /// Restore the symmetric key from a capsule transformed with a bundle made for
    /// this key, given the bundle's ephemeral public key `pk_x`:
    ///
    /// ```text
    ///     d = derive_scalar(X || pk_b || X·sk_b)
    ///     k = kdf((E' + V')·d)
    /// ```
    ///
    /// A capsule that was not transformed for this key yields an unrelated key,
    /// which the AEAD layer then rejects.
    pub fn decapsulate_reencrypted(&self, cap: &Capsule, pk_x: &PublicKey) -> Key {
        let pk_b = self.public_key();
        let S = pk_x.point * self.scalar;
        let d = derive_scalar(&[
            pk_x.point.to_uncompressed(),
            pk_b.point.to_uncompressed(),
            S.to_uncompressed()
        ]);
        kdf(&((cap.E + cap.V) * d).to_uncompressed())
    }

    pub fn decrypt_reencrypted(&self, env: &EncryptedEnvelope, pk_x: &PublicKey) -> Result<Vec<u8>, Error> {
        let k = self.decapsulate_reencrypted(&env.capsule, pk_x);
        envelope::open(&k, &env.ciphertext)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.scalar.0.zeroize()
    }
}


#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey {
    point: Point
}

impl PublicKey {
    pub fn from_point(point: Point) -> Result<Self, Error> {
        if point.is_identity() {
            return Err(Error::decode("point at infinity is not a public key"))
        }
        Ok(PublicKey { point })
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        Ok(PublicKey { point: Point::from_hex(s)? })
    }

    /// Uncompressed SEC1 hex, the identity of a vendor in the delegation table.
    pub fn to_hex(&self) -> String {
        self.point.to_hex()
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    /// Create a symmetric key for this public key together with the capsule
    /// needed to restore it:
    ///
    /// ```text
    ///     (e, E), (v, V) fresh ephemeral keypairs
    ///     s = v + e · derive_scalar(E || V)
    ///     k = kdf(pk · (e + v))
    /// ```
    pub fn encapsulate(&self) -> Result<(Key, Capsule), Error> {
        self.encapsulate_with_rng(&mut thread_rng())
    }

    pub fn encapsulate_with_rng<R>(&self, rng: &mut R) -> Result<(Key, Capsule), Error>
    where
        R: RngCore + CryptoRng
    {
        let e = Scalar::random(rng)?;
        let v = Scalar::random(rng)?;
        Ok(self.encapsulate_with(&e, &v))
    }

    fn encapsulate_with(&self, e: &Scalar, v: &Scalar) -> (Key, Capsule) {
        let E = Point::base_mul(e);
        let V = Point::base_mul(v);
        let h = derive_scalar(&[E.to_uncompressed(), V.to_uncompressed()]);
        let s = v.add_mod(&e.mul_mod(&h));
        let k = kdf(&(self.point * e.add_mod(v)).to_uncompressed());
        (k, Capsule { E, V, s })
    }

    /// Encapsulate and seal `msg` under the derived key.
    pub fn encrypt(&self, msg: &[u8]) -> Result<EncryptedEnvelope, Error> {
        let (k, cap) = self.encapsulate()?;
        let ciphertext = envelope::seal(&k, msg)?;
        Ok(EncryptedEnvelope::new(ciphertext, cap))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.point.to_compressed()[..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(h: &str) -> SecretKey {
        SecretKey::from_hex(h).unwrap()
    }

    fn scalar(h: &str) -> Scalar {
        Scalar::from_hex(h).unwrap()
    }

    const SK_A: &str = "1f2e3d4c5b6a79881f2e3d4c5b6a79881f2e3d4c5b6a79881f2e3d4c5b6a7988";
    const SK_B: &str = "00badc0ffee0ddf00d0badc0ffee0ddf00d0badc0ffee0ddf00d0badc0ffee01";

    #[test]
    fn public_key_matches_reference() {
        assert_eq!(
            secret(SK_A).public_key().to_hex(),
            "04bd7c73b88b2e9b4ceda62022b2da8be13193a5b56edc26e7df7842e24cd0b5eb\
             0605ada7bda83ac6a2b80d7e314040fa47ff16b83bac85cedb014451bb7ce71a"
        )
    }

    #[test]
    fn encapsulation_matches_reference() {
        let pk_a = secret(SK_A).public_key();
        let e = scalar(&"3c".repeat(32));
        let v = scalar(&"5a".repeat(32));
        let (k, cap) = pk_a.encapsulate_with(&e, &v);

        assert_eq!(cap.s.to_hex(), "8d0addab35cbc400fc64b2bc724f42fef7cec0591a522e741debdbb3c4615d3c");
        assert_eq!(hex::encode(&*k), "6a53809c1e523e39a7f574233bb3d5393c3c32a5dd636d5bf83520f8871f3b6b");
        assert!(cap.verify());
        assert_eq!(
            hex::encode(envelope::seal(&k, b"Test").unwrap()),
            "32121b9d91e0c772c89b07f46a17a39ad68247d7"
        );
        assert_eq!(secret(SK_A).decapsulate(&cap).unwrap(), k);
    }

    #[test]
    fn delegation_matches_reference() {
        let sk_b = secret(SK_B);
        let pk_b = sk_b.public_key();
        let ephemeral = Keypair::from_secret(secret(&"77".repeat(32)));
        let dk = secret(SK_A).rekey_with(&ephemeral, &pk_b).unwrap();

        assert_eq!(dk.rk.to_hex(), "0d90e3c30505abbfec2d1c5efbcf7b94ca43175c44d1148d66540612a04ec3ec");
        assert_eq!(
            dk.pk_x.to_hex(),
            "04e45054eb5b1abd976650f7f395bf51d0d8dd193e0174e7a14a1c8c127fbdf2db\
             aefe3293b0445f3f92bf8e108202e009415c899499620c71b7f6df9021132c9c"
        );

        let pk_a = secret(SK_A).public_key();
        let (k, cap) = pk_a.encapsulate_with(&scalar(&"3c".repeat(32)), &scalar(&"5a".repeat(32)));
        let cap_b = dk.re_encapsulate(&cap).unwrap();
        assert_eq!(sk_b.decapsulate_reencrypted(&cap_b, &dk.pk_x), k);
    }

    #[test]
    fn minimal_hex_secret_is_accepted() {
        assert_eq!(secret(&SK_B[1 ..]).public_key(), secret(SK_B).public_key());
        assert_eq!(secret("1").public_key().point(), &Point::generator());
    }

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(std::io::ErrorKind::Other, "entropy source unavailable")))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn failing_random_source_is_reported() {
        let e = Keypair::generate(&mut BrokenRng).unwrap_err();
        assert!(matches!(e, Error::RandomSource(_)));
        assert!(e.is_retryable());

        let pk_a = secret(SK_A).public_key();
        let e = pk_a.encapsulate_with_rng(&mut BrokenRng).unwrap_err();
        assert!(matches!(e, Error::RandomSource(_)));

        let e = secret(SK_A).rekey_with_rng(&secret(SK_B).public_key(), &mut BrokenRng).unwrap_err();
        assert!(matches!(e, Error::KeyGeneration(_)));
        assert!(e.is_retryable());
        assert!(!Error::CapsuleMismatch.is_retryable());
    }

    #[test]
    fn zero_secret_is_rejected() {
        assert!(SecretKey::from_hex("00").is_err());
        assert!(PublicKey::from_point(Point::identity()).is_err());
    }

    #[test]
    fn secret_debug_is_redacted() {
        assert_eq!(format!("{:?}", secret(SK_A)), "SecretKey(..)");
        assert!(!format!("{:?}", Keypair::from_secret(secret(SK_A))).contains(SK_A));
    }
}
