// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

use crate::error::Error;
use p256::{elliptic_curve::{Field, PrimeField}, FieldBytes};
use rand::{CryptoRng, RngCore};
use serde::{
    de::{self, Deserialize, Deserializer, Visitor, Unexpected},
    ser::{Serialize, Serializer}
};
use std::{fmt, ops::Deref};

/// Length of a fixed-width big-endian scalar encoding.
pub const SCALAR_SIZE: usize = 32;

/// An integer mod the P-256 group order `N`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Scalar(pub(crate) p256::Scalar);

impl Scalar {
    /// Draw a scalar uniformly from `[1, N)`.
    ///
    /// Rejection sampling: 32 random bytes are retried until they are canonical and non-zero.
    pub fn random<R>(rng: &mut R) -> Result<Self, Error>
    where
        R: RngCore + CryptoRng
    {
        loop {
            let mut repr = FieldBytes::default();
            rng.try_fill_bytes(&mut repr).map_err(Error::RandomSource)?;
            if let Some(s) = Option::<p256::Scalar>::from(p256::Scalar::from_repr(repr)) {
                if !bool::from(s.is_zero()) {
                    return Ok(Scalar(s))
                }
            }
        }
    }

    /// Interpret `b` as one big-endian unsigned integer of any length and reduce it mod `N`.
    pub fn from_bytes_mod_order(b: &[u8]) -> Self {
        let radix = p256::Scalar::from(256u64);
        let s = b.iter().fold(p256::Scalar::ZERO, |acc, x| acc * radix + p256::Scalar::from(u64::from(*x)));
        Scalar(s)
    }

    /// Decode a canonical big-endian scalar of at most 32 bytes.
    /// Shorter inputs are treated as having leading zeros stripped.
    pub fn from_bytes(b: &[u8]) -> Result<Self, Error> {
        if b.len() > SCALAR_SIZE {
            return Err(Error::decode(format!("scalar of {} bytes exceeds {}", b.len(), SCALAR_SIZE)))
        }
        let mut repr = FieldBytes::default();
        repr[SCALAR_SIZE - b.len() ..].copy_from_slice(b);
        Option::<p256::Scalar>::from(p256::Scalar::from_repr(repr))
            .map(Scalar)
            .ok_or_else(|| Error::decode("scalar is not reduced mod group order"))
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_SIZE] {
        let mut out = [0; SCALAR_SIZE];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Accepts minimal-length hex, including an odd number of digits.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        if s.len() % 2 == 1 {
            return Scalar::from_bytes(&hex::decode(format!("0{}", s))?)
        }
        Scalar::from_bytes(&hex::decode(s)?)
    }

    /// Fixed-width (64 characters) lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn zero() -> Self {
        Scalar(p256::Scalar::ZERO)
    }

    pub fn one() -> Self {
        Scalar(p256::Scalar::ONE)
    }

    pub fn is_zero(&self) -> bool {
        bool::from(self.0.is_zero())
    }

    pub fn add_mod(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 + other.0)
    }

    pub fn sub_mod(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 - other.0)
    }

    pub fn mul_mod(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 * other.0)
    }

    /// Multiplicative inverse mod `N`. Only zero has none, since `N` is prime.
    pub fn inv_mod(&self) -> Result<Scalar, Error> {
        Option::<p256::Scalar>::from(self.0.invert()).map(Scalar).ok_or(Error::NotInvertible)
    }
}

impl Deref for Scalar {
    type Target = p256::Scalar;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Scalar({})", self.to_hex())
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(&self.to_hex())
        } else {
            s.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("scalar value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Scalar::from_hex(v)
                    .map_err(|_| de::Error::invalid_value(Unexpected::Str(v), &"hex encoded scalar"))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                if v.len() != SCALAR_SIZE {
                    return Err(de::Error::invalid_value(Unexpected::Bytes(v), &"32 bytes"))
                }
                Scalar::from_bytes(v)
                    .map_err(|_| de::Error::invalid_value(Unexpected::Bytes(v), &"canonical scalar bytes"))
            }

            fn visit_borrowed_bytes<E: de::Error>(self, v: &'de [u8]) -> Result<Self::Value, E> {
                self.visit_bytes(v)
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                self.visit_bytes(&v)
            }
        }

        if d.is_human_readable() {
            d.deserialize_str(ScalarVisitor)
        } else {
            d.deserialize_bytes(ScalarVisitor)
        }
    }
}
