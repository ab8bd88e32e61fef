//! # Action
//!
//! Module dedicated to privileged account actions and the keyring
//! rotation [`Intent`] they map to.

use secrecy::SecretString;

use crate::config::{
    ACTION_DISABLE_AUTO_LOGIN, ACTION_DISABLE_NOPASS_LOGIN, ACTION_ENABLE_AUTO_LOGIN,
    ACTION_ENABLE_NOPASS_LOGIN, ACTION_ENROLL_FACE, ACTION_ENROLL_FINGERPRINT, ACTION_ENROLL_IRIS,
};

/// The privileged account actions the keyring synchronization
/// reacts to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    EnableAutoLogin,
    DisableAutoLogin,
    EnableNopassLogin,
    DisableNopassLogin,
    EnrollFingerprint,
    EnrollFace,
    EnrollIris,
}

impl Action {
    /// All known actions, in registration order.
    pub const ALL: [Action; 7] = [
        Action::EnableAutoLogin,
        Action::DisableAutoLogin,
        Action::EnableNopassLogin,
        Action::DisableNopassLogin,
        Action::EnrollFingerprint,
        Action::EnrollFace,
        Action::EnrollIris,
    ];

    /// Finds the action matching exactly the given identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }

    /// Returns the identifier the host uses for this action.
    pub fn id(self) -> &'static str {
        match self {
            Self::EnableAutoLogin => ACTION_ENABLE_AUTO_LOGIN,
            Self::DisableAutoLogin => ACTION_DISABLE_AUTO_LOGIN,
            Self::EnableNopassLogin => ACTION_ENABLE_NOPASS_LOGIN,
            Self::DisableNopassLogin => ACTION_DISABLE_NOPASS_LOGIN,
            Self::EnrollFingerprint => ACTION_ENROLL_FINGERPRINT,
            Self::EnrollFace => ACTION_ENROLL_FACE,
            Self::EnrollIris => ACTION_ENROLL_IRIS,
        }
    }

    pub fn intent(self) -> Intent {
        match self {
            Self::EnableAutoLogin
            | Self::EnableNopassLogin
            | Self::EnrollFingerprint
            | Self::EnrollFace
            | Self::EnrollIris => Intent::EmptyPassword,
            Self::DisableAutoLogin | Self::DisableNopassLogin => Intent::RestorePassword,
        }
    }
}

/// The keyring rotation intent derived from an action.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Intent {
    /// Replace the current keyring password with an empty one.
    EmptyPassword,

    /// Replace the empty keyring password with the current one.
    RestorePassword,

    /// The action has nothing to do with the keyring.
    Ignore,
}

impl Intent {
    /// Returns the text of the consent option shown by the host.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::EmptyPassword => Some("Empty keyring password"),
            Self::RestorePassword => Some("Restore keyring password"),
            Self::Ignore => None,
        }
    }

    /// Builds the `(current, new)` keyring password pair from the
    /// user login password.
    ///
    /// Returns `None` for [`Intent::Ignore`].
    pub fn passwords(self, password: SecretString) -> Option<(SecretString, SecretString)> {
        let empty = || SecretString::from(String::new());

        match self {
            Self::EmptyPassword => Some((password, empty())),
            Self::RestorePassword => Some((empty(), password)),
            Self::Ignore => None,
        }
    }

    /// Returns `true` if the intent changes the keyring password.
    pub fn is_rotation(self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

/// Maps the given action identifier to its rotation intent.
///
/// Unknown identifiers map to [`Intent::Ignore`].
pub fn classify(action_id: &str) -> Intent {
    Action::from_id(action_id).map_or(Intent::Ignore, Action::intent)
}

/// Returns the identifiers of the actions the host should notify.
pub fn interested_actions() -> Vec<&'static str> {
    Action::ALL.into_iter().map(Action::id).collect()
}
