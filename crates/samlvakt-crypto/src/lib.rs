#![forbid(unsafe_code)]

//! Cryptographic primitives for samlvakt.
//!
//! Digest computation and public-key signature verification on top of the
//! RustCrypto crates. Only verification is provided: samlvakt never holds
//! a private key.

pub mod digest;
pub mod verify;

pub use verify::{PublicKey, SignatureAlgorithm};
