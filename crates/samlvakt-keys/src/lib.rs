#![forbid(unsafe_code)]

//! Verification key management for samlvakt.
//!
//! Loads trusted identity-provider certificates and public keys, keeps them
//! in a [`TrustedKeys`] store and reads the untrusted `<ds:KeyInfo>` hint a
//! document carries.

pub mod key;
pub mod keyinfo;
pub mod loader;
pub mod manager;

pub use key::VerificationKey;
pub use keyinfo::KeyInfoHint;
pub use manager::TrustedKeys;
