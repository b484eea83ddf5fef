/// IBAN validation, check digit computation and generation of unique identifiers.
pub mod iban;

/// Account entity and cent rounding with sub-cent remainder tracking.
pub mod account;

/// Account ledger interface, plus "in memory" implementation.
/// Every operation is a transaction guarded by a single lock.
pub mod ledger;

/// Transfer request and account listing payloads.
pub mod envelope;

/// Status labels and error messages in supported languages.
pub mod locale;

pub mod config;

/// Thin layer in front of the ledger that logs every call.
pub mod service;

/// Operations of a ledger script, parsed and checked before they reach the ledger.
pub mod command;

/// Ideally, this module should exist in its own crate, as a way to
/// bootstrap core logic. However, integration tests use it, so it lives here.
pub mod bin_utils;
