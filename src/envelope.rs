use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{account::Account, locale::Locale};

/// `{"sender": ..., "recipient": ..., "amount": ...}`, absent fields are empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub sender: String,
    pub recipient: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Single entry of the account listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub iban: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fractions: Decimal,
    pub status: String,
}

impl AccountDetails {
    pub fn from_account(account: &Account, locale: Locale) -> Self {
        Self {
            iban: account.iban().to_string(),
            balance: account.balance(),
            fractions: account.fractions(),
            status: locale.status_label(account.status()).to_string(),
        }
    }
}
