use std::io::Write;

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;

use crate::{account::Account, locale::Locale};

#[derive(Debug, Serialize)]
struct AccountRow {
    iban: String,
    balance: String,
    fractions: String,
    status: &'static str,
}

impl AccountRow {
    fn new(account: &Account, locale: Locale) -> Self {
        Self {
            iban: account.iban().to_string(),
            balance: format!("{:.2}", account.balance()),
            fractions: account.fractions().normalize().to_string(),
            status: locale.status_label(account.status()),
        }
    }
}

/// Writes accounts as CSV, one row per account in the given order.
pub fn print_accounts<W>(output: &mut W, accounts: &[Account], locale: Locale) -> Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        writer
            .serialize(AccountRow::new(acc, locale))
            .with_context(|| format!("Failed to write account {} to CSV", acc.iban()))?;
    }
    writer.flush().context("Failed to flush CSV writer")
}
