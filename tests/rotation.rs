mod common;

use keyring_sync::{Config, Error, Intent, Outcome, Rotator, State};
use secrecy::SecretString;

use common::{init_tracing, Event, Failure, Journal, MockBackend, LOGIN_COLLECTION};

fn rotator(failure: Failure) -> (Rotator<MockBackend>, Journal) {
    init_tracing();
    let backend = MockBackend::new(failure);
    let journal = backend.journal.clone();
    (Rotator::with_backend(backend, Config::default()), journal)
}

fn passwords(intent: Intent) -> (SecretString, SecretString) {
    let password = SecretString::from(String::from("secret123"));
    intent.passwords(password).unwrap()
}

#[test]
fn empty_password_sends_login_password_then_empty() {
    let (mut rotator, journal) = rotator(Failure::Never);
    let (current, new) = passwords(Intent::EmptyPassword);

    let outcome = rotator.rotate(&current, &new).unwrap();

    assert_eq!(outcome, Outcome::Rotated);
    assert_eq!(rotator.state(), State::Done);

    let calls = journal.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].collection, LOGIN_COLLECTION);
    assert_eq!(calls[0].original, b"secret123");
    assert_eq!(calls[0].master, b"");
    assert_eq!(calls[0].original_content_type, "text/plain");
    assert_eq!(calls[0].master_content_type, "text/plain");

    journal.assert_all_released();
}

#[test]
fn restore_password_sends_empty_then_login_password() {
    let (mut rotator, journal) = rotator(Failure::Never);
    let (current, new) = passwords(Intent::RestorePassword);

    let outcome = rotator.rotate(&current, &new).unwrap();

    assert_eq!(outcome, Outcome::Rotated);

    let calls = journal.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].collection, LOGIN_COLLECTION);
    assert_eq!(calls[0].original, b"");
    assert_eq!(calls[0].master, b"secret123");

    journal.assert_all_released();
}

#[test]
fn secrets_are_released_before_session_closes() {
    let (mut rotator, journal) = rotator(Failure::Never);
    let (current, new) = passwords(Intent::EmptyPassword);

    rotator.rotate(&current, &new).unwrap();

    let events = journal.events();
    assert_eq!(events.first(), Some(&Event::SessionOpened));
    assert_eq!(events.last(), Some(&Event::SessionClosed));
}

#[test]
fn absent_collection_skips_the_call() {
    let (mut rotator, journal) = rotator(Failure::CollectionAbsent);
    let (current, new) = passwords(Intent::EmptyPassword);

    let outcome = rotator.rotate(&current, &new).unwrap();

    assert_eq!(outcome, Outcome::CollectionAbsent);
    assert_eq!(rotator.state(), State::Done);
    assert!(journal.calls().is_empty());
    assert_eq!(journal.secrets_encoded(), 0);
    assert!(!journal.events().contains(&Event::BusConnected));

    journal.assert_all_released();
}

#[test]
fn session_failure_acquires_nothing() {
    let (mut rotator, journal) = rotator(Failure::OpenSession);
    let (current, new) = passwords(Intent::EmptyPassword);

    let err = rotator.rotate(&current, &new).unwrap_err();

    assert!(matches!(err, Error::ServiceUnavailable(_)));
    assert_eq!(rotator.state(), State::Failed);
    assert!(journal.events().is_empty());
}

#[test]
fn lookup_failure_closes_the_session() {
    let (mut rotator, journal) = rotator(Failure::Lookup);
    let (current, new) = passwords(Intent::EmptyPassword);

    let err = rotator.rotate(&current, &new).unwrap_err();

    assert!(matches!(err, Error::CollectionLookupFailed(_)));
    assert_eq!(rotator.state(), State::Failed);
    assert_eq!(
        journal.events(),
        vec![Event::SessionOpened, Event::SessionClosed]
    );
}

#[test]
fn bus_failure_releases_secrets_and_session() {
    let (mut rotator, journal) = rotator(Failure::ConnectBus);
    let (current, new) = passwords(Intent::RestorePassword);

    let err = rotator.rotate(&current, &new).unwrap_err();

    assert!(matches!(err, Error::BusUnavailable(_)));
    assert_eq!(rotator.state(), State::Failed);
    assert!(journal.calls().is_empty());
    assert_eq!(journal.secrets_encoded(), 2);

    journal.assert_all_released();
}

#[test]
fn rejected_change_releases_everything() {
    let (mut rotator, journal) = rotator(Failure::Change);
    let (current, new) = passwords(Intent::EmptyPassword);

    let err = rotator.rotate(&current, &new).unwrap_err();

    match &err {
        Error::RotationRejected { message, .. } => {
            assert!(message.contains("original password is incorrect"))
        }
        err => panic!("unexpected error: {err:?}"),
    }
    assert_eq!(rotator.state(), State::Failed);
    assert_eq!(journal.calls().len(), 1);

    journal.assert_all_released();
}

#[test]
fn rotations_are_independent() {
    let (mut rotator, journal) = rotator(Failure::Never);
    let (current, new) = passwords(Intent::EmptyPassword);

    rotator.rotate(&current, &new).unwrap();
    rotator.rotate(&new, &current).unwrap();

    let calls = journal.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].original, b"");
    assert_eq!(calls[1].master, b"secret123");

    let sessions = journal
        .events()
        .into_iter()
        .filter(|e| *e == Event::SessionOpened)
        .count();
    assert_eq!(sessions, 2);

    journal.assert_all_released();
}
