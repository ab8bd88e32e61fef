use std::fmt;

use zbus::zvariant::OwnedObjectPath;

#[cfg(feature = "encryption")]
use super::crypto::rust_crypto::{self, AesKey};
use super::crypto::Algorithm;

/// The way secrets are encoded for a session.
enum Encoding {
    Plain,
    #[cfg(feature = "encryption")]
    Dh(AesKey),
}

/// An open Secret Service session.
///
/// Holds the session object path and, for encrypted sessions, the
/// AES key shared with the service.
pub struct Session {
    pub path: OwnedObjectPath,
    encoding: Encoding,
}

impl Session {
    pub fn new_plain(path: OwnedObjectPath) -> Self {
        Self {
            path,
            encoding: Encoding::Plain,
        }
    }

    #[cfg(feature = "encryption")]
    pub fn new_dh(path: OwnedObjectPath, shared_key: AesKey) -> Self {
        Self {
            path,
            encoding: Encoding::Dh(shared_key),
        }
    }

    pub fn encryption(&self) -> Algorithm {
        match self.encoding {
            Encoding::Plain => Algorithm::Plain,
            #[cfg(feature = "encryption")]
            Encoding::Dh(_) => Algorithm::Dh,
        }
    }

    /// Encodes the given secret for this session.
    ///
    /// Returns the secret parameters and value: no parameter and the
    /// clear bytes for plain sessions, the IV and the encrypted bytes
    /// for encrypted sessions.
    pub fn encode(&self, secret: &[u8]) -> (Vec<u8>, Vec<u8>) {
        match &self.encoding {
            Encoding::Plain => (vec![], secret.to_vec()),
            #[cfg(feature = "encryption")]
            Encoding::Dh(key) => rust_crypto::encrypt(secret, key),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("encryption", &self.encryption())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
