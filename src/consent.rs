//! # Consent
//!
//! Module dedicated to the default state of the "perform rotation"
//! option shown by the host.

use crate::action::Intent;

/// The login modes of the current user, as exposed by the account
/// service.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoginModeFlags {
    /// The user logs in without password.
    pub no_password_login: bool,

    /// The user session starts without login screen.
    pub auto_login: bool,
}

impl LoginModeFlags {
    pub fn new(no_password_login: bool, auto_login: bool) -> Self {
        Self {
            no_password_login,
            auto_login,
        }
    }
}

/// Computes the default value of the rotation option.
///
/// The option is checked for every intent, except when restoring the
/// password while both auto-login and password-less login are active:
/// disabling one of them still leaves the other relying on an empty
/// keyring password.
///
/// The host may override the returned value, only the final confirmed
/// toggle matters for the rotation.
pub fn default_consent(intent: Intent, flags: LoginModeFlags) -> bool {
    let both_modes = flags.auto_login && flags.no_password_login;
    !(intent == Intent::RestorePassword && both_modes)
}
