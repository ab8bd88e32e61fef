//! # API
//!
//! Module dedicated to the Z-Bus proxies and structures of the Secret
//! Service D-Bus API.

use secrecy::zeroize::Zeroize;
use serde::{Deserialize, Serialize};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Type, Value};

#[zbus::proxy(
    interface = "org.freedesktop.Secret.Service",
    default_service = "org.freedesktop.secrets",
    default_path = "/org/freedesktop/secrets"
)]
pub trait OrgFreedesktopSecretService {
    fn open_session(&self, algorithm: &str, input: Value<'_>) -> zbus::Result<OpenSessionResult>;
    fn read_alias(&self, name: &str) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(interface = "org.freedesktop.Secret.Session")]
pub trait OrgFreedesktopSecretSession {
    fn close(&self) -> zbus::Result<()>;
}

/// The session-encoded secret structure `(oayays)`.
///
/// The value buffer is zeroized on drop.
#[derive(Serialize, Deserialize, Type)]
pub struct SecretStruct {
    pub session: OwnedObjectPath,
    pub parameters: Vec<u8>,
    pub value: Vec<u8>,
    pub content_type: String,
}

impl Drop for SecretStruct {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl std::fmt::Debug for SecretStruct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStruct")
            .field("session", &self.session)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize, Type)]
pub struct OpenSessionResult {
    pub output: OwnedValue,
    pub result: OwnedObjectPath,
}
