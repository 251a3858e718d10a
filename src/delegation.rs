// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

use crate::{capsule::Capsule, error::Error, keypair::PublicKey, scalar::Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Re-encryption key bundle for one ordered (delegator, delegatee) pair,
/// created by `SecretKey::rekey`.
///
/// It does not depend on any capsule: one bundle re-encrypts every capsule the
/// delegator ever receives. The proxy needs `rk`, the delegatee needs `pk_x`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDelegationKey")]
pub struct DelegationKey {
    pub(crate) rk: Scalar,
    pub(crate) pk_x: PublicKey
}

impl DelegationKey {
    pub fn new(rk: Scalar, pk_x: PublicKey) -> Result<Self, Error> {
        if rk.is_zero() {
            return Err(Error::decode("zero re-encryption key"))
        }
        Ok(DelegationKey { rk, pk_x })
    }

    pub fn rk(&self) -> &Scalar {
        &self.rk
    }

    /// The ephemeral public key `X = x·G`.
    pub fn pk_x(&self) -> &PublicKey {
        &self.pk_x
    }

    pub fn re_encapsulate(&self, cap: &Capsule) -> Result<Capsule, Error> {
        reencrypt(&self.rk, cap)
    }

    /// `[rk, pkX]` as stored in the delegation table.
    pub fn to_hex_pair(&self) -> [String; 2] {
        [self.rk.to_hex(), self.pk_x.to_hex()]
    }

    pub fn from_hex_pair(rk: &str, pk_x: &str) -> Result<Self, Error> {
        DelegationKey::new(Scalar::from_hex(rk)?, PublicKey::from_hex(pk_x)?)
    }
}

#[derive(Deserialize)]
struct UncheckedDelegationKey {
    rk: Scalar,
    pk_x: PublicKey
}

impl TryFrom<UncheckedDelegationKey> for DelegationKey {
    type Error = Error;

    fn try_from(k: UncheckedDelegationKey) -> Result<Self, Error> {
        DelegationKey::new(k.rk, k.pk_x)
    }
}

impl fmt::Debug for DelegationKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DelegationKey")
            .field("rk", &"..")
            .field("pk_x", &self.pk_x)
            .finish()
    }
}

/// Proxy-side transform of a capsule: `(E·rk, V·rk, s)`.
///
/// The capsule is checked first and a capsule failing the check is never
/// transformed. A zero `rk` is rejected, it would map every capsule to the
/// point at infinity.
pub fn reencrypt(rk: &Scalar, cap: &Capsule) -> Result<Capsule, Error> {
    if rk.is_zero() {
        return Err(Error::decode("zero re-encryption key"))
    }
    if !cap.verify() {
        warn!(e = ?cap.E, "refusing to re-encrypt capsule that fails verification");
        return Err(Error::CapsuleMismatch)
    }
    let E_1 = cap.E * *rk;
    let V_1 = cap.V * *rk;
    debug!(e = ?cap.E, "re-encrypted capsule");
    Ok(Capsule { E: E_1, V: V_1, s: cap.s })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::Keypair;

    #[test]
    fn zero_rekey_is_rejected() {
        let alice = Keypair::new().unwrap();
        let cap = alice.public().encapsulate().unwrap().1;
        assert!(matches!(reencrypt(&Scalar::zero(), &cap), Err(Error::Decode(_))));
        assert!(DelegationKey::new(Scalar::zero(), *alice.public()).is_err());
    }

    #[test]
    fn deserialization_checks_rekey() {
        let alice = Keypair::new().unwrap();
        let bob = Keypair::new().unwrap();
        let dk = alice.rekey(bob.public()).unwrap();

        let mut json = serde_json::to_value(&dk).unwrap();
        assert_eq!(serde_json::from_value::<DelegationKey>(json.clone()).unwrap(), dk);

        json["rk"] = serde_json::Value::from(Scalar::zero().to_hex());
        assert!(serde_json::from_value::<DelegationKey>(json).is_err());
    }
}
