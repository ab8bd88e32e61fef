//! # Rotator
//!
//! Module dedicated to the keyring master password rotation.
//!
//! A rotation opens a Secret Service session, checks that a default
//! collection exists, encodes both passwords for the session, then
//! asks the GNOME keyring daemon to change the master password of the
//! login collection. Every handle acquired on the way is released
//! when the rotation returns, whatever the step it stopped at.

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, instrument, trace};
use zbus::zvariant::OwnedObjectPath;

use crate::{
    config::Config,
    secret::SecretValue,
    secret_service::{self, ZbusBackend},
};

/// The rotation errors.
///
/// None of them is meant to reach the user: the keyring
/// synchronization is a best-effort companion of the account action.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open Secret Service session")]
    ServiceUnavailable(#[source] secret_service::Error),
    #[error("cannot look up default keyring collection")]
    CollectionLookupFailed(#[source] secret_service::Error),
    #[error("cannot connect to session bus")]
    BusUnavailable(#[source] secret_service::Error),
    #[error("keyring master password change rejected: {message}")]
    RotationRejected {
        message: String,
        #[source]
        source: secret_service::Error,
    },
}

/// The rotation [`Result`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// The successful rotation outcomes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The master password has been changed.
    Rotated,

    /// There is no default collection, so nothing to rotate.
    CollectionAbsent,
}

/// The rotation progress, from [`State::Idle`] to either
/// [`State::Done`] or [`State::Failed`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum State {
    #[default]
    Idle,
    SessionOpen,
    CollectionResolved,
    SecretsEncoded,
    BusConnected,
    Invoked,
    Done,
    Failed,
}

/// The backend the rotator acquires its handles from.
///
/// Handles are released by dropping them.
pub trait SecretServiceBackend {
    /// The session-encoded secret.
    type Secret;
    type Session: ServiceSession<Secret = Self::Secret>;
    type Bus: ControlBus<Secret = Self::Secret>;

    fn open_session(&self) -> secret_service::Result<Self::Session>;
    fn connect_bus(&self) -> secret_service::Result<Self::Bus>;
}

/// An open Secret Service session.
pub trait ServiceSession {
    type Secret;

    /// Resolves the collection behind the given alias, `None` meaning
    /// the alias points to no collection.
    fn collection_for_alias(&self, alias: &str)
        -> secret_service::Result<Option<OwnedObjectPath>>;

    fn encode(&self, secret: &SecretValue) -> Self::Secret;
}

/// A connection able to change a collection master password.
pub trait ControlBus {
    type Secret;

    fn change_with_master_password(
        &self,
        collection: &str,
        original: &Self::Secret,
        master: &Self::Secret,
    ) -> secret_service::Result<()>;
}

/// The keyring master password rotator.
#[derive(Debug)]
pub struct Rotator<B = ZbusBackend> {
    backend: B,
    config: Config,
    state: State,
}

impl Rotator {
    /// Creates a rotator talking to the Secret Service over the
    /// session bus.
    pub fn new(config: Config) -> Self {
        Self::with_backend(ZbusBackend::new(&config), config)
    }
}

impl<B: SecretServiceBackend> Rotator<B> {
    pub fn with_backend(backend: B, config: Config) -> Self {
        Self {
            backend,
            config,
            state: State::Idle,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the state reached by the last rotation.
    pub fn state(&self) -> State {
        self.state
    }

    /// Replaces the `current` master password of the login
    /// collection with the `new` one.
    ///
    /// This is a single attempt: nothing is retried. The call blocks
    /// until the keyring daemon answers, which may take as long as
    /// the daemon needs to prompt the user.
    #[instrument(skip_all)]
    pub fn rotate(&mut self, current: &SecretString, new: &SecretString) -> Result<Outcome> {
        self.state = State::Idle;

        let result = self.exchange(current, new);

        match &result {
            Ok(_) => self.transition(State::Done),
            Err(_) => self.transition(State::Failed),
        }

        result
    }

    fn exchange(&mut self, current: &SecretString, new: &SecretString) -> Result<Outcome> {
        let session = self
            .backend
            .open_session()
            .map_err(Error::ServiceUnavailable)?;
        self.transition(State::SessionOpen);

        let alias = &self.config.collection_alias;
        let collection = session
            .collection_for_alias(alias)
            .map_err(Error::CollectionLookupFailed)?;
        let Some(collection) = collection else {
            debug!(%alias, "default keyring collection does not exist");
            return Ok(Outcome::CollectionAbsent);
        };
        debug!(%alias, ?collection, "default keyring collection resolved");
        self.transition(State::CollectionResolved);

        let original = session.encode(&SecretValue::new(current));
        let master = session.encode(&SecretValue::new(new));
        self.transition(State::SecretsEncoded);

        let bus = self.backend.connect_bus().map_err(Error::BusUnavailable)?;
        self.transition(State::BusConnected);

        let result =
            bus.change_with_master_password(&self.config.collection_path, &original, &master);
        self.transition(State::Invoked);

        result.map_err(|source| Error::RotationRejected {
            message: source.service_message(),
            source,
        })?;

        debug!(collection = %self.config.collection_path, "keyring master password changed");
        Ok(Outcome::Rotated)
    }

    fn transition(&mut self, state: State) {
        trace!(from = ?self.state, to = ?state, "rotation state changed");
        self.state = state;
    }
}
