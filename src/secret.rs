//! # Secret
//!
//! Module dedicated to the [`SecretValue`], the transient form of a
//! password before it gets encoded for a Secret Service session.

use secrecy::{ExposeSecret, SecretSlice, SecretString};

use crate::config::SECRET_CONTENT_TYPE;

/// A password as bytes, tagged with its content type.
///
/// The bytes are zeroized when the value is dropped, and never
/// printed by [`Debug`].
#[derive(Debug)]
pub struct SecretValue {
    secret: SecretSlice<u8>,
    content_type: &'static str,
}

impl SecretValue {
    /// Creates a `text/plain` secret value from the UTF-8 bytes of
    /// the given password.
    pub fn new(password: &SecretString) -> Self {
        let bytes = password.expose_secret().as_bytes().to_vec();

        Self {
            secret: bytes.into(),
            content_type: SECRET_CONTENT_TYPE,
        }
    }

    pub fn content_type(&self) -> &str {
        self.content_type
    }

    pub fn is_empty(&self) -> bool {
        self.secret.expose_secret().is_empty()
    }
}

impl ExposeSecret<[u8]> for SecretValue {
    fn expose_secret(&self) -> &[u8] {
        self.secret.expose_secret()
    }
}
