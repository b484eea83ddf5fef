use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, AccountKind, Iban},
    iban::IbanError,
};

pub mod in_memory;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Account {iban} does not exist")]
    AccountNotFound { iban: Iban },
    #[error("Account {iban} is blocked")]
    AccountBlocked { iban: Iban },
    #[error("Insufficient balance on account {iban}")]
    InsufficientBalance { iban: Iban },
    #[error("Account {iban} is expected to be {expected:?}, but is {actual:?}")]
    AccountTypeMismatch {
        iban: Iban,
        expected: AccountKind,
        actual: AccountKind,
    },
    #[error("Account stored under {key} has IBAN {actual}")]
    IbanMismatch { key: Iban, actual: Iban },
    #[error("Amount cannot be negative, got {amount}")]
    NegativeAmount { amount: Decimal },
    #[error("Balance of account {iban} cannot absorb {amount}")]
    AmountOverflow { iban: Iban, amount: Decimal },
    #[error("IBAN {iban} is not valid")]
    InvalidIban { iban: Iban },
    #[error("IBAN {iban} is already in use")]
    DuplicateIban { iban: Iban },
    #[error("Impossible to create account")]
    AccountCreationFailed(#[source] IbanError),
    #[error("Cannot represent accounts as JSON")]
    SerializationFailed(#[source] serde_json::Error),
    #[error("Cannot parse transfer request")]
    MalformedRequest(#[source] serde_json::Error),
}

/// Error category without details, used for localized messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AccountNotFound,
    AccountBlocked,
    InsufficientBalance,
    AccountTypeMismatch,
    IbanMismatch,
    NegativeAmount,
    InvalidIban,
    AccountCreationFailed,
    SerializationFailed,
    MalformedRequest,
    DuplicateIban,
    AmountOverflow,
}

impl ErrorKind {
    /// Stable numeric code shown next to error messages.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::AccountNotFound => 0,
            ErrorKind::AccountBlocked => 1,
            ErrorKind::InsufficientBalance => 2,
            ErrorKind::AccountTypeMismatch => 3,
            ErrorKind::IbanMismatch => 4,
            ErrorKind::NegativeAmount => 5,
            ErrorKind::InvalidIban => 6,
            ErrorKind::AccountCreationFailed => 7,
            ErrorKind::SerializationFailed => 8,
            ErrorKind::MalformedRequest => 9,
            ErrorKind::DuplicateIban => 10,
            ErrorKind::AmountOverflow => 11,
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            LedgerError::AccountBlocked { .. } => ErrorKind::AccountBlocked,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::AccountTypeMismatch { .. } => ErrorKind::AccountTypeMismatch,
            LedgerError::IbanMismatch { .. } => ErrorKind::IbanMismatch,
            LedgerError::NegativeAmount { .. } => ErrorKind::NegativeAmount,
            LedgerError::InvalidIban { .. } => ErrorKind::InvalidIban,
            LedgerError::DuplicateIban { .. } => ErrorKind::DuplicateIban,
            LedgerError::AmountOverflow { .. } => ErrorKind::AmountOverflow,
            LedgerError::AccountCreationFailed(_) => ErrorKind::AccountCreationFailed,
            LedgerError::SerializationFailed(_) => ErrorKind::SerializationFailed,
            LedgerError::MalformedRequest(_) => ErrorKind::MalformedRequest,
        }
    }
}

/// Operations of the account ledger.
///
/// Every call is a single transaction: either all of its effects are visible to
/// other callers, or (on error) none of them. Implementations are shared
/// between threads, so all methods take `&self`.
pub trait AccountRepository: Send + Sync {
    fn emission_iban(&self) -> Result<Iban, LedgerError>;

    fn destruction_iban(&self) -> Result<Iban, LedgerError>;

    fn emit_money(&self, amount: Decimal) -> Result<(), LedgerError>;

    /// Moves `amount` from `iban` to the destruction account.
    fn destruct_money(&self, iban: &str, amount: Decimal) -> Result<(), LedgerError>;

    fn open_account(&self) -> Result<Account, LedgerError>;

    fn transfer_money(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError>;

    /// Same as [`AccountRepository::transfer_money`], with the arguments given as
    /// a JSON [`TransferRequest`](crate::envelope::TransferRequest).
    fn transfer_money_from_envelope(&self, request: &str) -> Result<(), LedgerError>;

    /// JSON array of [`AccountDetails`](crate::envelope::AccountDetails), emission
    /// and destruction accounts first.
    fn list_accounts_envelope(&self) -> Result<String, LedgerError>;

    fn block_account(&self, iban: &str) -> Result<(), LedgerError>;

    fn activate_account(&self, iban: &str) -> Result<(), LedgerError>;

    fn account(&self, iban: &str) -> Result<Account, LedgerError>;

    /// Snapshot of all accounts in listing order.
    fn accounts(&self) -> Vec<Account>;
}

impl<T> AccountRepository for Arc<T>
where
    T: AccountRepository + ?Sized,
{
    fn emission_iban(&self) -> Result<Iban, LedgerError> {
        (**self).emission_iban()
    }

    fn destruction_iban(&self) -> Result<Iban, LedgerError> {
        (**self).destruction_iban()
    }

    fn emit_money(&self, amount: Decimal) -> Result<(), LedgerError> {
        (**self).emit_money(amount)
    }

    fn destruct_money(&self, iban: &str, amount: Decimal) -> Result<(), LedgerError> {
        (**self).destruct_money(iban, amount)
    }

    fn open_account(&self) -> Result<Account, LedgerError> {
        (**self).open_account()
    }

    fn transfer_money(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        (**self).transfer_money(sender, recipient, amount)
    }

    fn transfer_money_from_envelope(&self, request: &str) -> Result<(), LedgerError> {
        (**self).transfer_money_from_envelope(request)
    }

    fn list_accounts_envelope(&self) -> Result<String, LedgerError> {
        (**self).list_accounts_envelope()
    }

    fn block_account(&self, iban: &str) -> Result<(), LedgerError> {
        (**self).block_account(iban)
    }

    fn activate_account(&self, iban: &str) -> Result<(), LedgerError> {
        (**self).activate_account(iban)
    }

    fn account(&self, iban: &str) -> Result<Account, LedgerError> {
        (**self).account(iban)
    }

    fn accounts(&self) -> Vec<Account> {
        (**self).accounts()
    }
}
