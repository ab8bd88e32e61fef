#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    io::{self, stderr},
    rc::Rc,
};

use keyring_sync::{
    accounts::{self, AccountService},
    rotator::{ControlBus, SecretServiceBackend, ServiceSession},
    secret_service::{self, Error},
    AgentProxy, LoginModeFlags, SecretValue,
};
use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zbus::zvariant::OwnedObjectPath;

pub const LOGIN_COLLECTION: &str = "/org/freedesktop/secrets/collection/login";

pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(stderr))
        .with(EnvFilter::from_default_env())
        .try_init();
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    SessionOpened,
    SessionClosed,
    SecretEncoded(usize),
    SecretReleased(usize),
    BusConnected,
    BusClosed,
    Called(Call),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Call {
    pub collection: String,
    pub original: Vec<u8>,
    pub original_content_type: String,
    pub master: Vec<u8>,
    pub master_content_type: String,
}

/// The step at which the mock backend fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Failure {
    #[default]
    Never,
    OpenSession,
    Lookup,
    CollectionAbsent,
    ConnectBus,
    Change,
}

#[derive(Clone, Debug, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Called(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    fn count(&self, event: &Event) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }

    /// Asserts that every acquired handle has been released exactly
    /// once.
    pub fn assert_all_released(&self) {
        assert_eq!(
            self.count(&Event::SessionOpened),
            self.count(&Event::SessionClosed),
            "sessions: {:?}",
            self.events()
        );
        assert_eq!(
            self.count(&Event::BusConnected),
            self.count(&Event::BusClosed),
            "buses: {:?}",
            self.events()
        );

        for event in self.events() {
            if let Event::SecretEncoded(id) = event {
                assert_eq!(
                    self.count(&Event::SecretReleased(id)),
                    1,
                    "secret {id}: {:?}",
                    self.events()
                );
            }
        }
    }

    pub fn secrets_encoded(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::SecretEncoded(_)))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub journal: Journal,
    failure: Failure,
    next_secret_id: Rc<Cell<usize>>,
}

impl MockBackend {
    pub fn new(failure: Failure) -> Self {
        Self {
            failure,
            ..Default::default()
        }
    }
}

impl SecretServiceBackend for MockBackend {
    type Secret = MockSecret;
    type Session = MockSession;
    type Bus = MockBus;

    fn open_session(&self) -> secret_service::Result<Self::Session> {
        if self.failure == Failure::OpenSession {
            return Err(Error::OpenSessionError(zbus::Error::Failure(
                "no secret service".into(),
            )));
        }

        self.journal.push(Event::SessionOpened);

        Ok(MockSession {
            journal: self.journal.clone(),
            failure: self.failure,
            next_secret_id: self.next_secret_id.clone(),
        })
    }

    fn connect_bus(&self) -> secret_service::Result<Self::Bus> {
        if self.failure == Failure::ConnectBus {
            return Err(Error::CreateConnectionError(zbus::Error::Failure(
                "no session bus".into(),
            )));
        }

        self.journal.push(Event::BusConnected);

        Ok(MockBus {
            journal: self.journal.clone(),
            failure: self.failure,
        })
    }
}

#[derive(Debug)]
pub struct MockSession {
    journal: Journal,
    failure: Failure,
    next_secret_id: Rc<Cell<usize>>,
}

impl ServiceSession for MockSession {
    type Secret = MockSecret;

    fn collection_for_alias(
        &self,
        alias: &str,
    ) -> secret_service::Result<Option<OwnedObjectPath>> {
        match self.failure {
            Failure::Lookup => Err(Error::ReadAliasError(
                alias.to_owned(),
                zbus::Error::Failure("lookup failed".into()),
            )),
            Failure::CollectionAbsent => Ok(None),
            _ => Ok(Some(OwnedObjectPath::try_from(LOGIN_COLLECTION).unwrap())),
        }
    }

    fn encode(&self, secret: &SecretValue) -> Self::Secret {
        let id = self.next_secret_id.get();
        self.next_secret_id.set(id + 1);
        self.journal.push(Event::SecretEncoded(id));

        MockSecret {
            id,
            journal: self.journal.clone(),
            value: secret.expose_secret().to_vec(),
            content_type: secret.content_type().to_owned(),
        }
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.journal.push(Event::SessionClosed);
    }
}

#[derive(Debug)]
pub struct MockSecret {
    id: usize,
    journal: Journal,
    value: Vec<u8>,
    content_type: String,
}

impl Drop for MockSecret {
    fn drop(&mut self) {
        self.journal.push(Event::SecretReleased(self.id));
    }
}

#[derive(Debug)]
pub struct MockBus {
    journal: Journal,
    failure: Failure,
}

impl ControlBus for MockBus {
    type Secret = MockSecret;

    fn change_with_master_password(
        &self,
        collection: &str,
        original: &Self::Secret,
        master: &Self::Secret,
    ) -> secret_service::Result<()> {
        self.journal.push(Event::Called(Call {
            collection: collection.to_owned(),
            original: original.value.clone(),
            original_content_type: original.content_type.clone(),
            master: master.value.clone(),
            master_content_type: master.content_type.clone(),
        }));

        if self.failure == Failure::Change {
            return Err(Error::ChangeWithMasterPasswordError(zbus::Error::Failure(
                "original password is incorrect".into(),
            )));
        }

        Ok(())
    }
}

impl Drop for MockBus {
    fn drop(&mut self) {
        self.journal.push(Event::BusClosed);
    }
}

/// An account service answering fixed flags, or failing when none
/// are given.
#[derive(Debug)]
pub struct MockAccounts(pub Option<LoginModeFlags>);

impl AccountService for MockAccounts {
    fn login_mode_flags(&self) -> accounts::Result<LoginModeFlags> {
        self.0.ok_or_else(|| {
            accounts::Error::GetUidError(io::Error::new(io::ErrorKind::Other, "no accounts"))
        })
    }
}

#[derive(Debug)]
pub struct MockProxy {
    pub action_id: String,
    pub password: String,
}

impl MockProxy {
    pub fn new(action_id: &str, password: &str) -> Self {
        Self {
            action_id: action_id.to_owned(),
            password: password.to_owned(),
        }
    }
}

impl AgentProxy for MockProxy {
    fn action_id(&self) -> String {
        self.action_id.clone()
    }

    fn password(&self) -> SecretString {
        SecretString::from(self.password.clone())
    }
}
