use std::collections::HashMap;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::{
    account::{Account, AccountKind, Iban},
    config::LedgerConfig,
    envelope::{AccountDetails, TransferRequest},
    iban::{IbanGenerator, normalize, validate},
    locale::Locale,
};

use super::{AccountRepository, LedgerError};

struct LedgerState {
    emission: Iban,
    destruction: Iban,
    accounts: HashMap<Iban, Account>,
    // ordinary accounts in the order they were opened
    opened: Vec<Iban>,
}

impl LedgerState {
    fn contains(&self, iban: &str) -> bool {
        self.accounts.contains_key(iban)
    }

    fn get(&self, iban: &str) -> Result<&Account, LedgerError> {
        let acc = self
            .accounts
            .get(iban)
            .ok_or_else(|| LedgerError::AccountNotFound {
                iban: iban.to_string(),
            })?;
        if acc.iban() != iban {
            return Err(LedgerError::IbanMismatch {
                key: iban.to_string(),
                actual: acc.iban().to_string(),
            });
        }
        Ok(acc)
    }

    fn get_mut(&mut self, iban: &str) -> Result<&mut Account, LedgerError> {
        let acc = self
            .accounts
            .get_mut(iban)
            .ok_or_else(|| LedgerError::AccountNotFound {
                iban: iban.to_string(),
            })?;
        if acc.iban() != iban {
            return Err(LedgerError::IbanMismatch {
                key: iban.to_string(),
                actual: acc.iban().to_string(),
            });
        }
        Ok(acc)
    }

    fn special(&self, iban: &str, expected: AccountKind) -> Result<&Account, LedgerError> {
        let acc = self.get(iban)?;
        if acc.kind() != expected {
            return Err(LedgerError::AccountTypeMismatch {
                iban: iban.to_string(),
                expected,
                actual: acc.kind(),
            });
        }
        Ok(acc)
    }

    fn emission_account(&self) -> Result<&Account, LedgerError> {
        self.special(&self.emission, AccountKind::Emission)
    }

    fn destruction_account(&self) -> Result<&Account, LedgerError> {
        self.special(&self.destruction, AccountKind::Destruction)
    }

    /// Moves `amount` from one account to another. Both new balances are computed
    /// before either account is touched.
    fn move_money(&mut self, from: &str, to: &str, amount: Decimal) -> Result<(), LedgerError> {
        let source = self.get(from)?;
        let debited = source
            .debited(amount)
            .ok_or_else(|| overflow(source, amount))?;
        let credited = if from == to {
            let mut source = source.clone();
            source.apply(debited);
            source.credited(amount)
        } else {
            self.get(to)?.credited(amount)
        }
        .ok_or_else(|| LedgerError::AmountOverflow {
            iban: to.to_string(),
            amount,
        })?;

        self.get_mut(from)?.apply(debited);
        self.get_mut(to)?.apply(credited);
        Ok(())
    }

    fn ordered(&self) -> impl Iterator<Item = &Account> {
        [&self.emission, &self.destruction]
            .into_iter()
            .chain(self.opened.iter())
            .filter_map(|iban| self.accounts.get(iban))
    }
}

fn ensure_not_negative(amount: Decimal) -> Result<(), LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount { amount });
    }
    Ok(())
}

fn overflow(acc: &Account, amount: Decimal) -> LedgerError {
    LedgerError::AmountOverflow {
        iban: acc.iban().to_string(),
        amount,
    }
}

fn ensure_active(acc: &Account) -> Result<(), LedgerError> {
    if acc.is_blocked() {
        return Err(LedgerError::AccountBlocked {
            iban: acc.iban().to_string(),
        });
    }
    Ok(())
}

/// Ledger keeping all accounts in process memory.
///
/// A single lock guards the whole state and is held for the entire duration of
/// each operation, including IBAN generation for new accounts.
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    generator: IbanGenerator,
    locale: Locale,
}

impl InMemoryLedger {
    /// Creates a ledger with empty, active emission and destruction accounts.
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let emission = normalize(&config.emission_iban);
        let destruction = normalize(&config.destruction_iban);
        for iban in [&emission, &destruction] {
            if !validate(iban) {
                return Err(LedgerError::InvalidIban { iban: iban.clone() });
            }
        }
        if emission == destruction {
            return Err(LedgerError::DuplicateIban { iban: emission });
        }

        let accounts = HashMap::from([
            (
                emission.clone(),
                Account::new(emission.clone(), AccountKind::Emission),
            ),
            (
                destruction.clone(),
                Account::new(destruction.clone(), AccountKind::Destruction),
            ),
        ]);

        Ok(Self {
            state: Mutex::new(LedgerState {
                emission,
                destruction,
                accounts,
                opened: Vec::new(),
            }),
            generator: config.iban_generator(),
            locale: config.locale,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl AccountRepository for InMemoryLedger {
    fn emission_iban(&self) -> Result<Iban, LedgerError> {
        let state = self.state.lock();
        Ok(state.emission_account()?.iban().to_string())
    }

    fn destruction_iban(&self) -> Result<Iban, LedgerError> {
        let state = self.state.lock();
        Ok(state.destruction_account()?.iban().to_string())
    }

    fn emit_money(&self, amount: Decimal) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        let emission = state.emission_account()?;
        ensure_active(emission)?;
        ensure_not_negative(amount)?;
        let credited = emission
            .credited(amount)
            .ok_or_else(|| overflow(emission, amount))?;

        let emission = state.emission.clone();
        state.get_mut(&emission)?.apply(credited);
        Ok(())
    }

    fn destruct_money(&self, iban: &str, amount: Decimal) -> Result<(), LedgerError> {
        let iban = normalize(iban);
        let mut state = self.state.lock();
        ensure_active(state.destruction_account()?)?;
        ensure_not_negative(amount)?;

        let source = state.get(&iban)?;
        ensure_active(source)?;
        if !source.covers(amount) {
            return Err(LedgerError::InsufficientBalance { iban });
        }

        let destruction = state.destruction.clone();
        state.move_money(&iban, &destruction, amount)
    }

    fn open_account(&self) -> Result<Account, LedgerError> {
        let mut state = self.state.lock();
        let iban = self
            .generator
            .generate_unique(|candidate| state.contains(candidate))
            .map_err(LedgerError::AccountCreationFailed)?;

        let acc = Account::new(iban.clone(), AccountKind::Ordinary);
        state.accounts.insert(iban.clone(), acc.clone());
        state.opened.push(iban);
        Ok(acc)
    }

    fn transfer_money(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let sender = normalize(sender);
        let recipient = normalize(recipient);
        let mut state = self.state.lock();

        let sender_acc = state.get(&sender)?;
        ensure_active(sender_acc)?;
        ensure_not_negative(amount)?;
        if !sender_acc.covers(amount) {
            return Err(LedgerError::InsufficientBalance { iban: sender });
        }
        // unlike destruction, an incoming transfer is refused by a blocked recipient
        ensure_active(state.get(&recipient)?)?;

        state.move_money(&sender, &recipient, amount)
    }

    fn transfer_money_from_envelope(&self, request: &str) -> Result<(), LedgerError> {
        let request: TransferRequest =
            serde_json::from_str(request).map_err(LedgerError::MalformedRequest)?;
        self.transfer_money(&request.sender, &request.recipient, request.amount)
    }

    fn list_accounts_envelope(&self) -> Result<String, LedgerError> {
        let state = self.state.lock();
        let details: Vec<AccountDetails> = state
            .ordered()
            .map(|acc| AccountDetails::from_account(acc, self.locale))
            .collect();
        serde_json::to_string(&details).map_err(LedgerError::SerializationFailed)
    }

    fn block_account(&self, iban: &str) -> Result<(), LedgerError> {
        let iban = normalize(iban);
        self.state.lock().get_mut(&iban)?.block();
        Ok(())
    }

    fn activate_account(&self, iban: &str) -> Result<(), LedgerError> {
        let iban = normalize(iban);
        self.state.lock().get_mut(&iban)?.activate();
        Ok(())
    }

    fn account(&self, iban: &str) -> Result<Account, LedgerError> {
        let iban = normalize(iban);
        self.state.lock().get(&iban).cloned()
    }

    fn accounts(&self) -> Vec<Account> {
        self.state.lock().ordered().cloned().collect()
    }
}
