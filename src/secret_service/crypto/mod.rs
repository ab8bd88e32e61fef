//! # Crypto
//!
//! Module dedicated to Secret Service session algorithms and to the
//! encryption of secrets sent over encrypted sessions.

mod algorithm;
#[cfg(feature = "encryption")]
pub mod rust_crypto;

#[doc(inline)]
pub use self::algorithm::*;
