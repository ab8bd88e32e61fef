//! # Accounts
//!
//! Module dedicated to the account service, which knows whether the
//! current user logs in automatically or without password.

use std::{fs, io, os::unix::fs::MetadataExt};

use thiserror::Error;
use tracing::{debug, instrument};
use zbus::{blocking::Connection, proxy::CacheProperties};

use crate::{
    config::{ACCOUNTS_DEST, ACCOUNTS_USER_PATH_PREFIX},
    consent::LoginModeFlags,
};

#[zbus::proxy(
    interface = "org.deepin.dde.Accounts1.User",
    default_service = "org.deepin.dde.Accounts1"
)]
pub trait AccountsUser {
    #[zbus(property)]
    fn no_passwd_login(&self) -> zbus::Result<bool>;
    #[zbus(property)]
    fn automatic_login(&self) -> zbus::Result<bool>;
}

/// The account service errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot get current user id")]
    GetUidError(#[source] io::Error),
    #[error("cannot create system bus connection using Z-Bus")]
    CreateConnectionError(#[source] zbus::Error),
    #[error("cannot build accounts user proxy using Z-Bus")]
    BuildUserProxyError(#[source] zbus::Error),
    #[error("cannot read NoPasswdLogin property using Z-Bus")]
    GetNoPasswdLoginError(#[source] zbus::Error),
    #[error("cannot read AutomaticLogin property using Z-Bus")]
    GetAutomaticLoginError(#[source] zbus::Error),
}

/// The account service [`Result`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// A source of login mode flags.
///
/// Flags are read on demand and never cached.
pub trait AccountService {
    fn login_mode_flags(&self) -> Result<LoginModeFlags>;
}

/// The account service of the current user, reached over the system
/// bus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accounts {
    uid: u32,
}

impl Accounts {
    pub fn new(uid: u32) -> Self {
        Self { uid }
    }

    /// Creates the account service of the user running this process.
    pub fn current_user() -> Result<Self> {
        let uid = fs::metadata("/proc/self")
            .map_err(Error::GetUidError)?
            .uid();
        Ok(Self::new(uid))
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    /// Returns the object path of the user in the account service.
    pub fn user_path(&self) -> String {
        format!("{ACCOUNTS_USER_PATH_PREFIX}{}", self.uid)
    }

    fn proxy(&self, connection: &Connection) -> zbus::Result<AccountsUserProxyBlocking<'static>> {
        AccountsUserProxyBlocking::builder(connection)
            .destination(ACCOUNTS_DEST)?
            .path(self.user_path())?
            .cache_properties(CacheProperties::No)
            .build()
    }
}

impl AccountService for Accounts {
    #[instrument(skip_all, fields(uid = self.uid))]
    fn login_mode_flags(&self) -> Result<LoginModeFlags> {
        let connection = Connection::system().map_err(Error::CreateConnectionError)?;
        let proxy = self
            .proxy(&connection)
            .map_err(Error::BuildUserProxyError)?;

        let no_password_login = proxy
            .no_passwd_login()
            .map_err(Error::GetNoPasswdLoginError)?;
        let auto_login = proxy
            .automatic_login()
            .map_err(Error::GetAutomaticLoginError)?;

        let flags = LoginModeFlags::new(no_password_login, auto_login);
        debug!(?flags, "login mode flags read");
        Ok(flags)
    }
}
