//! # Error
//!
//! Module dedicated to Secret Service errors.
//!
//! It is mostly composed of an [`Error`] enum and a [`Result`] type
//! alias.

use thiserror::Error;

/// The global [`Error`] enum of the Secret Service module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot create session bus connection using Z-Bus")]
    CreateConnectionError(#[source] zbus::Error),

    #[error("cannot build Secret Service service proxy using Z-Bus")]
    BuildServiceProxyError(#[source] zbus::Error),
    #[error("cannot build Secret Service service proxy using Z-Bus: invalid destination")]
    BuildServiceProxyDestinationError(#[source] zbus::Error),
    #[error("cannot build Secret Service service proxy using Z-Bus: invalid path")]
    BuildServiceProxyPathError(#[source] zbus::Error),

    #[error("cannot open Secret Service session using Z-Bus")]
    OpenSessionError(#[source] zbus::Error),
    #[cfg(feature = "encryption")]
    #[error("cannot parse Secret Service session output using Z-Bus")]
    ParseSessionOutputError(#[source] zbus::zvariant::Error),
    #[cfg(feature = "encryption")]
    #[error("cannot derive shared key for Secret Service encrypted session")]
    DeriveSharedKeyError(#[source] hkdf::InvalidLength),

    #[error("cannot read Secret Service collection alias {0} using Z-Bus")]
    ReadAliasError(String, #[source] zbus::Error),

    #[error("cannot parse keyring collection path {0}")]
    ParseCollectionPathError(String, #[source] zbus::zvariant::Error),
    #[error("cannot change keyring master password using Z-Bus")]
    ChangeWithMasterPasswordError(#[source] zbus::Error),
}

impl Error {
    /// Returns the text of the error as reported by the remote
    /// service, when there is one.
    pub fn service_message(&self) -> String {
        let err = match self {
            Self::ChangeWithMasterPasswordError(err) => err,
            err => return err.to_string(),
        };

        match err {
            zbus::Error::MethodError(name, Some(detail), _) => format!("{name}: {detail}"),
            zbus::Error::MethodError(name, None, _) => name.to_string(),
            err => err.to_string(),
        }
    }
}

/// The global [`Result`] type of the Secret Service module.
pub type Result<T> = std::result::Result<T, Error>;
