// Copyright 2018 Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 or MIT license, at your option.
//
// A copy of the Apache License, Version 2.0 is included in the software as
// LICENSE-APACHE and a copy of the MIT license is included in the software
// as LICENSE-MIT. You may also obtain a copy of the Apache License, Version 2.0
// at https://www.apache.org/licenses/LICENSE-2.0 and a copy of the MIT license
// at https://opensource.org/licenses/MIT.

use std::error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The CSPRNG could not produce bytes. Retrying may succeed.
    #[error("random source unavailable: {0}")]
    RandomSource(#[source] rand::Error),

    /// The ephemeral key pair of a re-encryption key could not be generated.
    #[error("failed to generate ephemeral key pair: {0}")]
    KeyGeneration(#[source] rand::Error),

    #[error("scalar is not invertible mod group order")]
    NotInvertible,

    /// The capsule failed its integrity check.
    #[error("capsule mismatch")]
    CapsuleMismatch,

    #[error("decode error: {0}")]
    Decode(String),

    /// AEAD sealing or opening failed (wrong key or corrupted ciphertext).
    #[error("cipher error")]
    Cipher,

    #[error("delegation store error: {0}")]
    Storage(#[source] Box<dyn error::Error + Send + Sync>)
}

impl Error {
    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Only a failing random source is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RandomSource(_) | Error::KeyGeneration(_))
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<ring::error::Unspecified> for Error {
    fn from(_: ring::error::Unspecified) -> Self {
        Error::Cipher
    }
}

pub type Result<T> = std::result::Result<T, Error>;
