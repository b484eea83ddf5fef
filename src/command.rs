use std::collections::{HashMap, hash_map::Entry};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::account::Iban;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Emit,
    Destruct,
    Open,
    Transfer,
    Block,
    Activate,
}

/// Reference to an account inside an operation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    Emission,
    Destruction,
    /// Name bound by an earlier `open` operation, written as `@name`.
    Alias(String),
    Iban(Iban),
}

impl AccountRef {
    pub fn parse(value: &str) -> Self {
        match value {
            "emission" => Self::Emission,
            "destruction" => Self::Destruction,
            alias if alias.starts_with('@') => Self::Alias(alias.to_string()),
            iban => Self::Iban(iban.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    Emit {
        amount: Decimal,
    },
    Destruct {
        account: AccountRef,
        amount: Decimal,
    },
    Open {
        alias: Option<String>,
    },
    Transfer {
        sender: AccountRef,
        recipient: AccountRef,
        amount: Decimal,
    },
    Block {
        account: AccountRef,
    },
    Activate {
        account: AccountRef,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: OperationKind },
    #[error("Account is required for {kind:?}")]
    AccountRequired { kind: OperationKind },
    #[error("Counterparty is required for {kind:?}")]
    CounterpartyRequired { kind: OperationKind },
    #[error("Alias should start with '@', got {alias:?}")]
    InvalidAlias { alias: String },
    #[error("Alias {alias} is already bound to another account")]
    DuplicateAlias { alias: String },
    #[error("Alias {alias} is not bound to any account")]
    UnknownAlias { alias: String },
}

impl LedgerCommand {
    /// Amounts are not validated here, negative ones are rejected by the ledger.
    pub fn parse_command(
        kind: OperationKind,
        account: Option<&str>,
        counterparty: Option<&str>,
        amount: Option<Decimal>,
    ) -> Result<Self, CommandError> {
        let required_account =
            || account.map(AccountRef::parse).ok_or(CommandError::AccountRequired { kind });
        let required_amount = || amount.ok_or(CommandError::AmountRequired { kind });

        match kind {
            OperationKind::Emit => Ok(Self::Emit {
                amount: required_amount()?,
            }),
            OperationKind::Destruct => Ok(Self::Destruct {
                account: required_account()?,
                amount: required_amount()?,
            }),
            OperationKind::Open => match account {
                None => Ok(Self::Open { alias: None }),
                Some(alias) if alias.len() > 1 && alias.starts_with('@') => Ok(Self::Open {
                    alias: Some(alias.to_string()),
                }),
                Some(alias) => Err(CommandError::InvalidAlias {
                    alias: alias.to_string(),
                }),
            },
            OperationKind::Transfer => Ok(Self::Transfer {
                sender: required_account()?,
                recipient: counterparty
                    .map(AccountRef::parse)
                    .ok_or(CommandError::CounterpartyRequired { kind })?,
                amount: required_amount()?,
            }),
            OperationKind::Block => Ok(Self::Block {
                account: required_account()?,
            }),
            OperationKind::Activate => Ok(Self::Activate {
                account: required_account()?,
            }),
        }
    }
}

/// Names given to accounts opened by a script.
#[derive(Debug, Default)]
pub struct AliasTable {
    aliases: HashMap<String, Iban>,
}

impl AliasTable {
    pub fn bind(&mut self, alias: String, iban: Iban) -> Result<(), CommandError> {
        match self.aliases.entry(alias) {
            Entry::Occupied(entry) => Err(CommandError::DuplicateAlias {
                alias: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(iban);
                Ok(())
            }
        }
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Turns a reference into an IBAN, given the IBANs of the special accounts.
    pub fn resolve(
        &self,
        account: &AccountRef,
        emission: &str,
        destruction: &str,
    ) -> Result<Iban, CommandError> {
        match account {
            AccountRef::Emission => Ok(emission.to_string()),
            AccountRef::Destruction => Ok(destruction.to_string()),
            AccountRef::Alias(alias) => self
                .get(alias)
                .map(ToOwned::to_owned)
                .ok_or_else(|| CommandError::UnknownAlias {
                    alias: alias.clone(),
                }),
            AccountRef::Iban(iban) => Ok(iban.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_account_refs() {
        assert_eq!(AccountRef::parse("emission"), AccountRef::Emission);
        assert_eq!(AccountRef::parse("destruction"), AccountRef::Destruction);
        assert_eq!(
            AccountRef::parse("@alice"),
            AccountRef::Alias("@alice".into())
        );
        assert_eq!(
            AccountRef::parse("BY17 ALFA 1000 0000 0000 0000 0000"),
            AccountRef::Iban("BY17 ALFA 1000 0000 0000 0000 0000".into())
        );
    }

    #[test]
    fn parse_commands() {
        let cmd =
            LedgerCommand::parse_command(OperationKind::Emit, None, None, Some(Decimal::TEN))
                .unwrap();
        assert_eq!(cmd, LedgerCommand::Emit { amount: Decimal::TEN });

        let cmd = LedgerCommand::parse_command(
            OperationKind::Transfer,
            Some("emission"),
            Some("@bob"),
            Some(Decimal::NEGATIVE_ONE),
        )
        .unwrap();
        assert_eq!(
            cmd,
            LedgerCommand::Transfer {
                sender: AccountRef::Emission,
                recipient: AccountRef::Alias("@bob".into()),
                amount: Decimal::NEGATIVE_ONE,
            }
        );

        let cmd = LedgerCommand::parse_command(OperationKind::Open, None, None, None).unwrap();
        assert_eq!(cmd, LedgerCommand::Open { alias: None });
    }

    #[test]
    fn reject_incomplete_commands() {
        let err = LedgerCommand::parse_command(OperationKind::Emit, None, None, None).unwrap_err();
        assert_eq!(
            err,
            CommandError::AmountRequired {
                kind: OperationKind::Emit
            }
        );
        assert_eq!(err.to_string(), "Amount is required for Emit");

        let err = LedgerCommand::parse_command(OperationKind::Block, None, None, None).unwrap_err();
        assert!(matches!(err, CommandError::AccountRequired { .. }));

        let err = LedgerCommand::parse_command(
            OperationKind::Transfer,
            Some("emission"),
            None,
            Some(Decimal::ONE),
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::CounterpartyRequired { .. }));

        let err = LedgerCommand::parse_command(OperationKind::Open, Some("alice"), None, None)
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidAlias { .. }));
    }

    #[test]
    fn bind_and_resolve_aliases() {
        let mut aliases = AliasTable::default();
        aliases.bind("@alice".into(), "IBAN1".into()).unwrap();
        let err = aliases.bind("@alice".into(), "IBAN2".into()).unwrap_err();
        assert!(matches!(err, CommandError::DuplicateAlias { .. }));
        assert_eq!(aliases.get("@alice"), Some("IBAN1"));

        let resolve = |account| aliases.resolve(&account, "E", "D");
        assert_eq!(resolve(AccountRef::Emission).unwrap(), "E");
        assert_eq!(resolve(AccountRef::Destruction).unwrap(), "D");
        assert_eq!(resolve(AccountRef::Alias("@alice".into())).unwrap(), "IBAN1");
        assert_eq!(resolve(AccountRef::Iban("X".into())).unwrap(), "X");
        assert!(matches!(
            resolve(AccountRef::Alias("@bob".into())),
            Err(CommandError::UnknownAlias { .. })
        ));
    }
}
