#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![doc = include_str!("../README.md")]

pub mod accounts;
pub mod action;
pub mod config;
pub mod consent;
pub mod extension;
pub mod rotator;
pub mod secret;
pub mod secret_service;

#[doc(inline)]
pub use self::{
    action::{classify, interested_actions, Action, Intent},
    config::Config,
    consent::{default_consent, LoginModeFlags},
    extension::{AgentProxy, ConsentOption, Extension},
    rotator::{Error, Outcome, Result, Rotator, State},
    secret::SecretValue,
};
