//! # Config
//!
//! Module dedicated to configuration. It holds the static table of
//! action identifiers and D-Bus addresses this library talks to, and
//! the runtime [`Config`] used by the rotator.

use crate::secret_service::crypto::Algorithm;

pub static ACTION_ENABLE_AUTO_LOGIN: &str = "org.deepin.dde.accounts.enable-auto-login";
pub static ACTION_DISABLE_AUTO_LOGIN: &str = "org.deepin.dde.accounts.disable-auto-login";
pub static ACTION_ENABLE_NOPASS_LOGIN: &str = "org.deepin.dde.accounts.enable-nopass-login";
pub static ACTION_DISABLE_NOPASS_LOGIN: &str = "org.deepin.dde.accounts.disable-nopass-login";
pub static ACTION_ENROLL_FINGERPRINT: &str = "org.deepin.dde.authenticate.Fingerprint.enroll";
pub static ACTION_ENROLL_FACE: &str = "org.deepin.dde.authenticate.Face.enroll";
pub static ACTION_ENROLL_IRIS: &str = "org.deepin.dde.authenticate.Iris.enroll";

pub static SECRETS_DEST: &str = "org.freedesktop.secrets";
pub static SECRETS_PATH: &str = "/org/freedesktop/secrets";

pub static KEYRING_DEST: &str = "org.gnome.keyring";
pub static KEYRING_PATH: &str = "/org/freedesktop/secrets";
pub static KEYRING_INTERFACE: &str = "org.gnome.keyring.InternalUnsupportedGuiltRiddenInterface";
pub static KEYRING_CHANGE_WITH_MASTER_PASSWORD: &str = "ChangeWithMasterPassword";

pub static LOGIN_COLLECTION_PATH: &str = "/org/freedesktop/secrets/collection/login";
pub static DEFAULT_COLLECTION_ALIAS: &str = "default";

pub static SECRET_CONTENT_TYPE: &str = "text/plain";

pub static ACCOUNTS_DEST: &str = "org.deepin.dde.Accounts1";
pub static ACCOUNTS_USER_PATH_PREFIX: &str = "/org/deepin/dde/Accounts1/User";

/// The rotator configuration.
///
/// The default configuration targets the GNOME login keyring through
/// the `default` collection alias, using an encrypted session when
/// the `encryption` feature is enabled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The alias used to check that a default collection exists
    /// before changing its master password.
    pub collection_alias: String,

    /// The object path of the collection whose master password is
    /// changed.
    pub collection_path: String,

    /// The Secret Service session algorithm used to encode secrets.
    pub encryption: Algorithm,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection_alias: DEFAULT_COLLECTION_ALIAS.to_owned(),
            collection_path: LOGIN_COLLECTION_PATH.to_owned(),
            encryption: Algorithm::default(),
        }
    }
}

impl Config {
    /// Changes the collection alias using the builder pattern.
    pub fn with_collection_alias(mut self, alias: impl ToString) -> Self {
        self.collection_alias = alias.to_string();
        self
    }

    /// Changes the collection path using the builder pattern.
    pub fn with_collection_path(mut self, path: impl ToString) -> Self {
        self.collection_path = path.to_string();
        self
    }

    /// Changes the session algorithm using the builder pattern.
    pub fn with_encryption(mut self, encryption: Algorithm) -> Self {
        self.encryption = encryption;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_login_collection() {
        let config = Config::default();

        assert_eq!(config.collection_alias, "default");
        assert_eq!(
            config.collection_path,
            "/org/freedesktop/secrets/collection/login"
        );
    }

    #[test]
    fn builder_overrides_fields() {
        let config = Config::default()
            .with_collection_alias("session")
            .with_collection_path("/org/freedesktop/secrets/collection/session")
            .with_encryption(Algorithm::Plain);

        assert_eq!(config.collection_alias, "session");
        assert_eq!(
            config.collection_path,
            "/org/freedesktop/secrets/collection/session"
        );
        assert_eq!(config.encryption, Algorithm::Plain);
    }
}
