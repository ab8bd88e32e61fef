pub const ALGORITHM_PLAIN: &str = "plain";
#[cfg(feature = "encryption")]
pub const ALGORITHM_DH: &str = "dh-ietf1024-sha256-aes128-cbc-pkcs7";

/// The Secret Service session algorithm.
///
/// Defaults to [`Algorithm::Dh`] when the `encryption` feature is
/// enabled, to [`Algorithm::Plain`] otherwise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Algorithm {
    /// Secrets travel as clear bytes over the session bus.
    #[cfg_attr(not(feature = "encryption"), default)]
    Plain,

    /// Secrets are encrypted with an AES-128 key derived from a
    /// Diffie-Hellman exchange made while opening the session.
    #[cfg(feature = "encryption")]
    #[default]
    Dh,
}

impl AsRef<str> for Algorithm {
    fn as_ref(&self) -> &str {
        match self {
            Self::Plain => ALGORITHM_PLAIN,
            #[cfg(feature = "encryption")]
            Self::Dh => ALGORITHM_DH,
        }
    }
}
