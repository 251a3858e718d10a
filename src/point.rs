// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

use crate::{error::Error, scalar::Scalar};
use p256::{
    elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
    AffinePoint,
    EncodedPoint,
    ProjectivePoint
};
use serde::{
    de::{self, Deserialize, Deserializer, Visitor, Unexpected},
    ser::{Serialize, Serializer}
};
use std::{fmt, ops::{Add, Deref, Mul}};
use subtle::{Choice, ConstantTimeEq};

/// SEC1 compressed encoding: tag byte and X coordinate.
pub const COMPRESSED_POINT_SIZE: usize = 33;
/// SEC1 uncompressed encoding: `0x04 || X || Y`.
pub const UNCOMPRESSED_POINT_SIZE: usize = 65;

/// A P-256 curve point.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Point(pub(crate) ProjectivePoint);

impl Point {
    pub fn generator() -> Self {
        Point(ProjectivePoint::GENERATOR)
    }

    pub fn identity() -> Self {
        Point(ProjectivePoint::IDENTITY)
    }

    /// `k·G`
    pub fn base_mul(k: &Scalar) -> Self {
        Point(ProjectivePoint::GENERATOR * k.0)
    }

    pub fn is_identity(&self) -> bool {
        self.0 == ProjectivePoint::IDENTITY
    }

    /// The marshal format fed into `derive_scalar` and the KDF.
    ///
    /// The point at infinity has no SEC1 uncompressed form; it marshals as the
    /// all-zero coordinate pair.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_POINT_SIZE] {
        let mut out = [0; UNCOMPRESSED_POINT_SIZE];
        out[0] = 0x04;
        if !self.is_identity() {
            out.copy_from_slice(AffinePoint::from(self.0).to_encoded_point(false).as_bytes())
        }
        out
    }

    /// The point at infinity compresses to 33 zero bytes, which `from_bytes` rejects.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_POINT_SIZE] {
        let mut out = [0; COMPRESSED_POINT_SIZE];
        if !self.is_identity() {
            out.copy_from_slice(AffinePoint::from(self.0).to_encoded_point(true).as_bytes())
        }
        out
    }

    /// Decode a SEC1 compressed or uncompressed point.
    /// Fails for points off the curve and for the point at infinity.
    pub fn from_bytes(b: &[u8]) -> Result<Self, Error> {
        let encoded = EncodedPoint::from_bytes(b)
            .map_err(|e| Error::decode(format!("malformed SEC1 point: {}", e)))?;
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or_else(|| Error::decode("point is not on the curve"))?;
        let p = Point(ProjectivePoint::from(affine));
        if p.is_identity() {
            return Err(Error::decode("point at infinity"))
        }
        Ok(p)
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        Point::from_bytes(&hex::decode(s)?)
    }

    /// Uncompressed hex, the format public keys travel in.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.to_uncompressed()[..])
    }
}

impl Deref for Point {
    type Target = ProjectivePoint;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point(self.0 + other.0)
    }
}

impl Mul<Scalar> for Point {
    type Output = Point;

    fn mul(self, k: Scalar) -> Point {
        Point(self.0 * k.0)
    }
}

impl<'a> Mul<&'a Scalar> for &'a Point {
    type Output = Point;

    fn mul(self, k: &'a Scalar) -> Point {
        Point(self.0 * k.0)
    }
}

impl ConstantTimeEq for Point {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Point({})", hex::encode(&self.to_compressed()[..]))
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(&self.to_hex())
        } else {
            s.serialize_bytes(&self.to_compressed())
        }
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct PointVisitor;

        impl<'de> Visitor<'de> for PointVisitor {
            type Value = Point;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("SEC1 encoded P-256 point")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Point::from_hex(v)
                    .map_err(|_| de::Error::invalid_value(Unexpected::Str(v), &"hex encoded curve point"))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                Point::from_bytes(v)
                    .map_err(|_| de::Error::invalid_value(Unexpected::Bytes(v), &"SEC1 encoded curve point"))
            }

            fn visit_borrowed_bytes<E: de::Error>(self, v: &'de [u8]) -> Result<Self::Value, E> {
                self.visit_bytes(v)
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                self.visit_bytes(&v)
            }
        }

        if d.is_human_readable() {
            d.deserialize_str(PointVisitor)
        } else {
            d.deserialize_bytes(PointVisitor)
        }
    }
}
