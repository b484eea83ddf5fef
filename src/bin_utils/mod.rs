//! Bootstraps the ledger for the command line: runs operation scripts and the
//! demonstration scenario. Kept inside the library so integration tests can use it.

use std::io::{Read, Write};

use crate::{
    command::{AccountRef, AliasTable, CommandError, LedgerCommand},
    config::LedgerConfig,
    ledger::{AccountRepository, LedgerError, in_memory::InMemoryLedger},
    service::AccountService,
};
use anyhow::{Context, Result};
use csv_parser::{CsvScriptParser, ScriptRow};
use csv_printer::print_accounts;
use thiserror::Error;
use tracing::{info, warn};
pub mod csv_parser;
pub mod csv_printer;
pub mod scenario;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Malformed row: {0}")]
    RowErr(#[from] csv::Error),
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Executes a single script row against the ledger.
pub fn execute_row<R>(
    service: &AccountService<R>,
    aliases: &mut AliasTable,
    row: ScriptRow,
) -> Result<(), ScriptError>
where
    R: AccountRepository,
{
    let command = LedgerCommand::parse_command(
        row.op,
        row.account.as_deref(),
        row.counterparty.as_deref(),
        row.amount,
    )?;
    let emission = service.emission_iban()?;
    let destruction = service.destruction_iban()?;
    let resolve = |account: &AccountRef| aliases.resolve(account, &emission, &destruction);

    match command {
        LedgerCommand::Emit { amount } => service.emit_money(amount)?,
        LedgerCommand::Destruct { account, amount } => {
            service.destruct_money(&resolve(&account)?, amount)?
        }
        LedgerCommand::Open { alias } => {
            let acc = service.open_account()?;
            if let Some(alias) = alias {
                aliases.bind(alias, acc.iban().to_string())?;
            }
        }
        LedgerCommand::Transfer {
            sender,
            recipient,
            amount,
        } => service.transfer_money(&resolve(&sender)?, &resolve(&recipient)?, amount)?,
        LedgerCommand::Block { account } => service.block_account(&resolve(&account)?)?,
        LedgerCommand::Activate { account } => service.activate_account(&resolve(&account)?)?,
    }
    Ok(())
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: LedgerConfig,
    pub format: OutputFormat,
    pub error_printer: Box<dyn FnMut(u64, ScriptError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvScriptParser::new(self.input);

        let ledger = InMemoryLedger::new(&self.config).context("Failed to create the ledger")?;
        let service = AccountService::new(ledger);
        let mut aliases = AliasTable::default();
        let (mut rows, mut failed) = (0u64, 0u64);

        for (line, row) in parser {
            rows += 1;
            let result = row
                .map_err(ScriptError::from)
                .and_then(|row| execute_row(&service, &mut aliases, row));
            if let Err(err) = result {
                failed += 1;
                if !matches!(err, ScriptError::LedgerErr(_)) {
                    warn!(line, error = %err, "rejected script row");
                }
                (self.error_printer)(line, err);
            }
        }
        info!(rows, failed, "script finished");

        match self.format {
            OutputFormat::Csv => {
                print_accounts(self.output, &service.accounts(), self.config.locale)
            }
            OutputFormat::Json => {
                let listing = service.list_accounts_envelope()?;
                writeln!(self.output, "{listing}").context("Failed to write accounts")
            }
        }
    }
}
