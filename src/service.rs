use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    account::{Account, Iban},
    ledger::{AccountRepository, LedgerError},
};

fn traced<T>(operation: &str, result: Result<T, LedgerError>) -> Result<T, LedgerError> {
    match &result {
        Ok(_) => debug!(operation, "completed"),
        Err(err) => warn!(operation, kind = ?err.kind(), %err, "rejected"),
    }
    result
}

/// Entry point for callers of the ledger. Forwards every call to the repository
/// and records its outcome.
pub struct AccountService<R> {
    repository: R,
}

impl<R> AccountService<R>
where
    R: AccountRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn emission_iban(&self) -> Result<Iban, LedgerError> {
        traced("emission_iban", self.repository.emission_iban())
    }

    pub fn destruction_iban(&self) -> Result<Iban, LedgerError> {
        traced("destruction_iban", self.repository.destruction_iban())
    }

    pub fn emit_money(&self, amount: Decimal) -> Result<(), LedgerError> {
        debug!(%amount, "emitting money");
        traced("emit_money", self.repository.emit_money(amount))
    }

    pub fn destruct_money(&self, iban: &str, amount: Decimal) -> Result<(), LedgerError> {
        debug!(iban, %amount, "destructing money");
        traced("destruct_money", self.repository.destruct_money(iban, amount))
    }

    pub fn open_account(&self) -> Result<Account, LedgerError> {
        let result = traced("open_account", self.repository.open_account());
        if let Ok(acc) = &result {
            info!(iban = acc.iban(), "account opened");
        }
        result
    }

    pub fn transfer_money(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        debug!(sender, recipient, %amount, "transferring money");
        traced(
            "transfer_money",
            self.repository.transfer_money(sender, recipient, amount),
        )
    }

    pub fn transfer_money_from_envelope(&self, request: &str) -> Result<(), LedgerError> {
        debug!(request, "transferring money");
        traced(
            "transfer_money_from_envelope",
            self.repository.transfer_money_from_envelope(request),
        )
    }

    pub fn list_accounts_envelope(&self) -> Result<String, LedgerError> {
        traced(
            "list_accounts_envelope",
            self.repository.list_accounts_envelope(),
        )
    }

    pub fn block_account(&self, iban: &str) -> Result<(), LedgerError> {
        traced("block_account", self.repository.block_account(iban))
    }

    pub fn activate_account(&self, iban: &str) -> Result<(), LedgerError> {
        traced("activate_account", self.repository.activate_account(iban))
    }

    pub fn account(&self, iban: &str) -> Result<Account, LedgerError> {
        self.repository.account(iban)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.repository.accounts()
    }
}
