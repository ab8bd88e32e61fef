//! # Blocking
//!
//! Module dedicated to the standard, blocking Secret Service backend
//! built on top of Z-Bus blocking connections.

use std::fmt;

use secrecy::ExposeSecret;
use tracing::{debug, instrument, trace, warn};
use zbus::{
    blocking::Connection,
    proxy::CacheProperties,
    zvariant::{ObjectPath, OwnedObjectPath},
};

#[cfg(feature = "encryption")]
use super::crypto::rust_crypto::Keypair;
use super::{
    api::{
        OrgFreedesktopSecretServiceProxyBlocking, OrgFreedesktopSecretSessionProxyBlocking,
        SecretStruct,
    },
    crypto::Algorithm,
    Error, Result, Session,
};
use crate::{
    config::{
        Config, KEYRING_CHANGE_WITH_MASTER_PASSWORD, KEYRING_DEST, KEYRING_INTERFACE, KEYRING_PATH,
        SECRETS_DEST, SECRETS_PATH,
    },
    rotator::{ControlBus, SecretServiceBackend, ServiceSession},
    secret::SecretValue,
};

/// A Secret Service connection holding one open session.
///
/// The session is closed when the value is dropped.
pub struct SecretService {
    connection: Connection,
    session: Session,
}

impl fmt::Debug for SecretService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretService")
            .field("connection", &self.connection.unique_name())
            .field("session", &self.session)
            .finish()
    }
}

impl SecretService {
    fn proxy(connection: &Connection) -> Result<OrgFreedesktopSecretServiceProxyBlocking<'static>> {
        OrgFreedesktopSecretServiceProxyBlocking::builder(connection)
            .destination(SECRETS_DEST)
            .map_err(Error::BuildServiceProxyDestinationError)?
            .path(SECRETS_PATH)
            .map_err(Error::BuildServiceProxyPathError)?
            .cache_properties(CacheProperties::No)
            .build()
            .map_err(Error::BuildServiceProxyError)
    }

    /// Connects to the session bus and opens a Secret Service session
    /// using the given algorithm.
    #[instrument(skip_all)]
    pub fn connect(encryption: Algorithm) -> Result<Self> {
        let connection = Connection::session().map_err(Error::CreateConnectionError)?;
        Self::open(connection, encryption)
    }

    /// Opens a Secret Service session over the given connection.
    ///
    /// An encrypted session the service refuses to open falls back
    /// to a plain one.
    pub fn open(connection: Connection, encryption: Algorithm) -> Result<Self> {
        let proxy = Self::proxy(&connection)?;

        let session = match encryption {
            Algorithm::Plain => Self::open_plain(&proxy)?,
            #[cfg(feature = "encryption")]
            Algorithm::Dh => match Self::open_dh(&connection, &proxy) {
                Ok(session) => session,
                Err(err) => {
                    warn!("cannot open encrypted session, falling back to plain: {err}");
                    debug!("{err:?}");
                    Self::open_plain(&proxy)?
                }
            },
        };

        debug!(?session, "secret service session opened");

        Ok(Self {
            connection,
            session,
        })
    }

    fn open_plain(proxy: &OrgFreedesktopSecretServiceProxyBlocking<'_>) -> Result<Session> {
        let alg = Algorithm::Plain;
        let session = proxy
            .open_session(alg.as_ref(), "".into())
            .map_err(Error::OpenSessionError)?;
        Ok(Session::new_plain(session.result))
    }

    /// Opens an encrypted session.
    ///
    /// The service opens the session before the key exchange can be
    /// checked, so a session whose key cannot be derived is closed
    /// here.
    #[cfg(feature = "encryption")]
    fn open_dh(
        connection: &Connection,
        proxy: &OrgFreedesktopSecretServiceProxyBlocking<'_>,
    ) -> Result<Session> {
        let alg = Algorithm::Dh;
        let keypair = Keypair::generate();
        let reply = proxy
            .open_session(alg.as_ref(), keypair.public_key().into())
            .map_err(Error::OpenSessionError)?;

        let shared_key = Vec::<u8>::try_from(reply.output)
            .map_err(Error::ParseSessionOutputError)
            .and_then(|pubkey| {
                keypair
                    .derive_aes_key(&pubkey)
                    .map_err(Error::DeriveSharedKeyError)
            });

        match shared_key {
            Ok(shared_key) => Ok(Session::new_dh(reply.result, shared_key)),
            Err(err) => {
                close_session(connection, &reply.result);
                Err(err)
            }
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolves the collection behind the given alias.
    ///
    /// Returns `None` when the alias points to no collection.
    #[instrument(skip(self))]
    pub fn read_alias(&self, alias: &str) -> Result<Option<OwnedObjectPath>> {
        let path = Self::proxy(&self.connection)?
            .read_alias(alias)
            .map_err(|err| Error::ReadAliasError(alias.to_owned(), err))?;

        if path.as_str() == "/" {
            Ok(None)
        } else {
            Ok(Some(path))
        }
    }

    /// Encodes the given secret value for the current session.
    pub fn encode(&self, secret: &SecretValue) -> SecretStruct {
        let (parameters, value) = self.session.encode(secret.expose_secret());

        SecretStruct {
            session: self.session.path.clone(),
            parameters,
            value,
            content_type: secret.content_type().to_owned(),
        }
    }
}

/// Closes the given Secret Service session, logging the outcome.
fn close_session(connection: &Connection, path: &OwnedObjectPath) {
    let result = OrgFreedesktopSecretSessionProxyBlocking::builder(connection)
        .destination(SECRETS_DEST)
        .and_then(|builder| builder.path(path.clone()))
        .map(|builder| builder.cache_properties(CacheProperties::No))
        .and_then(|builder| builder.build())
        .and_then(|proxy| proxy.close());

    match result {
        Ok(()) => trace!(%path, "secret service session closed"),
        Err(err) => warn!(%path, ?err, "cannot close secret service session"),
    }
}

impl Drop for SecretService {
    fn drop(&mut self) {
        close_session(&self.connection, &self.session.path);
    }
}

/// A session bus connection to the GNOME keyring daemon.
pub struct KeyringBus {
    connection: Connection,
}

impl fmt::Debug for KeyringBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringBus")
            .field("connection", &self.connection.unique_name())
            .finish()
    }
}

impl KeyringBus {
    #[instrument(skip_all)]
    pub fn connect() -> Result<Self> {
        let connection = Connection::session().map_err(Error::CreateConnectionError)?;
        Ok(Self::new(connection))
    }

    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Changes the master password of the given collection.
    ///
    /// The call carries no timeout: the keyring daemon may prompt
    /// before answering.
    #[instrument(skip(self, original, master))]
    pub fn change_with_master_password(
        &self,
        collection: &str,
        original: &SecretStruct,
        master: &SecretStruct,
    ) -> Result<()> {
        let path = ObjectPath::try_from(collection)
            .map_err(|err| Error::ParseCollectionPathError(collection.to_owned(), err))?;

        self.connection
            .call_method(
                Some(KEYRING_DEST),
                KEYRING_PATH,
                Some(KEYRING_INTERFACE),
                KEYRING_CHANGE_WITH_MASTER_PASSWORD,
                &(path, original, master),
            )
            .map_err(Error::ChangeWithMasterPasswordError)?;

        Ok(())
    }
}

/// The Z-Bus implementation of the rotator backend.
///
/// Every rotation opens its own Secret Service session and keyring
/// bus connection, unless the backend was given a connection to share.
#[derive(Clone, Debug, Default)]
pub struct ZbusBackend {
    encryption: Algorithm,
    connection: Option<Connection>,
}

impl ZbusBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            encryption: config.encryption,
            connection: None,
        }
    }

    /// Creates a backend talking over the given connection instead of
    /// the session bus.
    pub fn with_connection(config: &Config, connection: Connection) -> Self {
        Self {
            encryption: config.encryption,
            connection: Some(connection),
        }
    }
}

impl SecretServiceBackend for ZbusBackend {
    type Secret = SecretStruct;
    type Session = SecretService;
    type Bus = KeyringBus;

    fn open_session(&self) -> Result<Self::Session> {
        match &self.connection {
            Some(connection) => SecretService::open(connection.clone(), self.encryption),
            None => SecretService::connect(self.encryption),
        }
    }

    fn connect_bus(&self) -> Result<Self::Bus> {
        match &self.connection {
            Some(connection) => Ok(KeyringBus::new(connection.clone())),
            None => KeyringBus::connect(),
        }
    }
}

impl ServiceSession for SecretService {
    type Secret = SecretStruct;

    fn collection_for_alias(&self, alias: &str) -> Result<Option<OwnedObjectPath>> {
        self.read_alias(alias)
    }

    fn encode(&self, secret: &SecretValue) -> Self::Secret {
        SecretService::encode(self, secret)
    }
}

impl ControlBus for KeyringBus {
    type Secret = SecretStruct;

    fn change_with_master_password(
        &self,
        collection: &str,
        original: &Self::Secret,
        master: &Self::Secret,
    ) -> Result<()> {
        KeyringBus::change_with_master_password(self, collection, original, master)
    }
}
