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
    error::Error,
    point::{Point, COMPRESSED_POINT_SIZE},
    scalar::{Scalar, SCALAR_SIZE},
    util::derive_scalar
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Binary capsule encoding: compressed `E`, compressed `V`, then `s`.
pub const CAPSULE_SIZE: usize = 2 * COMPRESSED_POINT_SIZE + SCALAR_SIZE;

/// The capsule is created by data producers using `PublicKey::encapsulate`.
/// It will allow deriving the symmetric encryption key again.
///
/// A capsule transformed by `reencrypt` keeps `s` but carries `E·rk` and `V·rk`,
/// so it no longer passes `verify`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capsule {
    pub(crate) E: Point,
    pub(crate) V: Point,
    pub(crate) s: Scalar
}

impl Capsule {
    pub fn e(&self) -> &Point {
        &self.E
    }

    pub fn v(&self) -> &Point {
        &self.V
    }

    pub fn s(&self) -> &Scalar {
        &self.s
    }

    /// Check, that this capsule is valid: `s·G == V + E·h` with `h = derive_scalar(E || V)`.
    pub fn verify(&self) -> bool {
        let expected = Point::base_mul(&self.s);
        let h = derive_scalar(&[self.E.to_uncompressed(), self.V.to_uncompressed()]);
        expected.ct_eq(&(self.V + self.E * h)).into()
    }

    pub fn to_bytes(&self) -> [u8; CAPSULE_SIZE] {
        let mut out = [0; CAPSULE_SIZE];
        let (e, rest) = out.split_at_mut(COMPRESSED_POINT_SIZE);
        let (v, s) = rest.split_at_mut(COMPRESSED_POINT_SIZE);
        e.copy_from_slice(&self.E.to_compressed());
        v.copy_from_slice(&self.V.to_compressed());
        s.copy_from_slice(&self.s.to_bytes());
        out
    }

    /// Decode a capsule. This does not `verify` it; transformed capsules
    /// are legitimately unverifiable.
    pub fn from_bytes(b: &[u8]) -> Result<Self, Error> {
        if b.len() != CAPSULE_SIZE {
            return Err(Error::decode(format!("capsule of {} bytes, expected {}", b.len(), CAPSULE_SIZE)))
        }
        let (e, rest) = b.split_at(COMPRESSED_POINT_SIZE);
        let (v, s) = rest.split_at(COMPRESSED_POINT_SIZE);
        Ok(Capsule {
            E: Point::from_bytes(e)?,
            V: Point::from_bytes(v)?,
            s: Scalar::from_bytes(s)?
        })
    }

    /// The `capsuleE`, `capsuleV`, `capsuleS` strings stored next to a ciphertext.
    pub fn to_hex_components(&self) -> [String; 3] {
        [self.E.to_hex(), self.V.to_hex(), self.s.to_hex()]
    }

    pub fn from_hex_components(e: &str, v: &str, s: &str) -> Result<Self, Error> {
        Ok(Capsule {
            E: Point::from_hex(e)?,
            V: Point::from_hex(v)?,
            s: Scalar::from_hex(s)?
        })
    }
}
