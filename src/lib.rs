// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

//! Single-hop, unidirectional proxy re-encryption over P-256.
//!
//! Vendors A and B are represented by their keypairs (a, g^a) and (b, g^b). Data
//! produced for A is encrypted once, under g^a. Entities which encrypt messages using
//! A's public key create a symmetric encryption key:
//!
//! ```text
//!     k = kdf((g^a)^(e+v)) // with e and v being random scalars mod group order
//! ```
//!
//! as well as a key "capsule":
//!
//! ```text
//!     c = (g^e, g^v, v + e * H(g^e, g^v))
//! ```
//!
//! The capsule is stored next to the AES-GCM ciphertext sealed under k. A can restore
//! k from c with her private key a, since (g^e * g^v)^a = (g^a)^(e+v).
//!
//! Given B's public key g^b, A can also create a re-encryption key bundle:
//!
//! ```text
//!     let (x, g^x) be an ephemeral keypair;
//!     d  = H(g^x, g^b, (g^b)^x) // Diffie-Hellman exchange
//!     rk = a / d
//!     (rk, g^x) // the re-encryption key bundle
//! ```
//!
//! A proxy holding rk first checks that g^s == g^v * (g^e)^H(g^e, g^v) and then computes
//!
//! ```text
//!     c' = ((g^e)^rk, (g^v)^rk, s)
//! ```
//!
//! which B, using b and g^x, opens:
//!
//! ```text
//!     d = H(g^x, g^b, (g^x)^b)
//!     k = kdf(((g^e)^rk * (g^v)^rk)^d)
//!       = kdf(((g^e) * (g^v))^((a/d)*d))
//!       = kdf((g^a)^(e+v))
//! ```
//!
//! The bundle does not depend on any message, so it is derived once per ordered pair of
//! vendors and reused for everything A ever produces.
//!
//! Wire compatibility
//! ------------------
//!
//! Deployed producers and consumers fix three choices which are weaker than they should
//! be, and which are kept bit for bit here:
//!
//! * `H` is not a hash. The uncompressed points are concatenated and the byte string is
//!   reduced mod the group order (`util::derive_scalar`).
//! * kdf is SHA3-256 of the uncompressed shared point. The AES-256 key is the first 32
//!   characters of its hex form and the GCM nonce its first 12 bytes, so key and nonce
//!   are not independent (`key::Key`).
//! * Every vendor has one keypair, used for encryption and re-encryption alike.
//!
//! Fixing any of them changes the wire format and needs a new protocol version.

#![allow(non_snake_case)]

pub mod capsule;
pub mod delegation;
pub mod envelope;
pub mod error;
pub mod key;
pub mod keypair;
pub mod observation;
pub mod point;
pub mod registry;
pub mod scalar;
pub mod util;

pub use capsule::Capsule;
pub use delegation::{reencrypt, DelegationKey};
pub use envelope::{open, seal, EncryptedEnvelope};
pub use error::{Error, Result};
pub use key::{Key, Nonce};
pub use keypair::{Keypair, PublicKey, SecretKey};
pub use observation::{Observation, ObservationResponse};
pub use point::Point;
pub use registry::{DelegationStore, MemoryStore, Registry, VendorCredentials};
pub use scalar::Scalar;
pub use util::derive_scalar;
