//! # Extension
//!
//! Module dedicated to the glue between the privileged action agent
//! and the keyring rotation.
//!
//! The agent drives the [`Extension`] through its lifecycle: it is
//! initialized with a proxy, asked for its options before the
//! authentication dialog shows up, then executed once the user
//! confirmed the action.

use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use crate::{
    accounts::{self, AccountService, Accounts},
    action::{self, Intent},
    config::Config,
    consent::{default_consent, LoginModeFlags},
    rotator::{self, Outcome, Rotator, SecretServiceBackend},
    secret_service::ZbusBackend,
};

/// The agent side of the extension, giving access to the pending
/// action.
pub trait AgentProxy {
    /// Returns the identifier of the pending action.
    fn action_id(&self) -> String;

    /// Returns the login password the user authenticated with.
    fn password(&self) -> SecretString;
}

/// The "perform rotation" checkbox shown by the agent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConsentOption {
    label: &'static str,
    checked: bool,
}

impl ConsentOption {
    pub fn label(&self) -> &str {
        self.label
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}

/// The keyring synchronization extension.
#[derive(Debug)]
pub struct Extension<P, A = Accounts, B = ZbusBackend> {
    proxy: Option<P>,
    accounts: A,
    rotator: Rotator<B>,
    option: Option<ConsentOption>,
}

impl<P: AgentProxy> Extension<P> {
    /// Creates an extension reading the login modes of the current
    /// user and talking to the Secret Service over the session bus.
    pub fn from_config(config: Config) -> accounts::Result<Self> {
        let accounts = Accounts::current_user()?;
        Ok(Self::new(accounts, Rotator::new(config)))
    }
}

impl<P, A, B> Extension<P, A, B>
where
    P: AgentProxy,
    A: AccountService,
    B: SecretServiceBackend,
{
    pub fn new(accounts: A, rotator: Rotator<B>) -> Self {
        Self {
            proxy: None,
            accounts,
            rotator,
            option: None,
        }
    }

    pub fn initialize(&mut self, proxy: P) {
        self.proxy = Some(proxy);
    }

    pub fn finalize(&mut self) {
        self.proxy = None;
        self.option = None;
    }

    pub fn interested_actions(&self) -> Vec<&'static str> {
        action::interested_actions()
    }

    pub fn description(&self) -> &str {
        ""
    }

    pub fn rotator(&self) -> &Rotator<B> {
        &self.rotator
    }

    /// Returns the consent option of the pending action.
    ///
    /// The option is created on first call then reused. Its label and
    /// default toggle are refreshed on every call, since the pending
    /// action may differ from the previous one. Returns `None` when
    /// the extension is not initialized or when the pending action
    /// does not concern the keyring.
    #[instrument(skip_all)]
    pub fn options(&mut self) -> Option<&mut ConsentOption> {
        let proxy = self.proxy.as_ref()?;
        let intent = action::classify(&proxy.action_id());
        let label = intent.label()?;

        let flags = match self.accounts.login_mode_flags() {
            Ok(flags) => flags,
            Err(err) => {
                warn!("cannot read login mode flags, assuming none: {err}");
                debug!("{err:?}");
                LoginModeFlags::default()
            }
        };

        let option = self.option.get_or_insert_with(ConsentOption::default);
        option.label = label;
        option.checked = default_consent(intent, flags);
        debug!(?intent, ?flags, checked = option.checked, "consent option ready");

        Some(option)
    }

    /// Executes the keyring rotation of the pending action, if the
    /// user kept the consent option checked.
    ///
    /// Returns `None` when no rotation was attempted. Rotation errors
    /// are logged and returned, but never meant to fail the action.
    #[instrument(skip_all)]
    pub fn extended_do(&mut self) -> Option<rotator::Result<Outcome>> {
        let proxy = self.proxy.as_ref()?;
        let intent = action::classify(&proxy.action_id());

        if let Intent::Ignore = intent {
            debug!("action does not concern the keyring, skipping");
            return None;
        }

        let Some(option) = &self.option else {
            debug!("consent option never created, skipping rotation");
            return None;
        };

        if !option.checked {
            debug!(?intent, "consent option unchecked, skipping rotation");
            return None;
        }

        let (current, new) = intent.passwords(proxy.password())?;

        match intent {
            Intent::EmptyPassword => debug!("empty keyring password"),
            _ => debug!("restore keyring password"),
        }

        let result = self.rotator.rotate(&current, &new);

        match &result {
            Ok(outcome) => debug!(?outcome, "keyring rotation done"),
            Err(err) => {
                warn!("cannot sync keyring password: {err}");
                debug!("{err:?}");
            }
        }

        Some(result)
    }
}
