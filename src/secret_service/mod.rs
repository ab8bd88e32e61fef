//! # Secret Service
//!
//! Module dedicated to the Secret Service side of the rotation: the
//! session used to encode secrets, and the GNOME keyring bus used to
//! change the collection master password.

pub mod api;
mod blocking;
pub mod crypto;
mod error;
mod session;

#[doc(inline)]
pub use self::{
    blocking::{KeyringBus, SecretService, ZbusBackend},
    error::{Error, Result},
    session::Session,
};
